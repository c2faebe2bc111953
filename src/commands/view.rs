use std::rc::Rc;
use std::time::Duration;

use reqwest::Url;
use tokio::task::LocalSet;
use tracing::warn;

use crate::{
    ViewArgs,
    config::FolioConfig,
    page::{Page, PageContext, PageTemplates, SiteContext},
    preference::{self, FileStore, ThemePreference},
    registry::ProjectRegistry,
    render::{
        DocumentRenderer, MarkdownRenderer, RenderOutcome, RenderedView, SyntaxHighlighter,
        copy::{CopyInstaller, FeedbackDurations, Osc52Clipboard},
        fetch::SourceFetcher,
    },
    view::ProjectView,
};

/// Location of the project page; the project id travels in its query.
const PAGE_LOCATION: &str = "http://localhost/project.html";

pub async fn run(args: &ViewArgs) -> Result<(), anyhow::Error> {
    let config = FolioConfig::load_from_arg(args.config_file.as_deref()).await?;
    let registry = ProjectRegistry::new(config.projects.clone())?;

    let highlighter = SyntaxHighlighter::new(&config.highlight.theme);
    let highlight_css = highlighter.generate_css();
    if highlight_css.is_none() {
        warn!(theme = %config.highlight.theme, "unknown highlight theme, code will be unstyled");
    }

    let templates = PageTemplates::new(config.site.theme_dir.as_deref())?;
    let page = templates.project_page(&PageContext {
        site: SiteContext {
            name: config.site.name.clone(),
        },
        highlight_css,
    })?;

    // A broken preferences file must not stop the page from rendering
    let mut theme = ThemePreference::new(FileStore::new(&config.preferences.path));
    match theme.get() {
        Ok(current) => preference::apply(&page, current),
        Err(e) => warn!(error = %e, "failed to load theme preference"),
    }

    let durations = FeedbackDurations::from(&config.copy);
    let renderer = DocumentRenderer::new(
        MarkdownRenderer::new(&config.markdown, highlighter.clone())?,
        SourceFetcher::from_location(&config.site.docs)?,
        CopyInstaller::new(Rc::new(Osc52Clipboard), durations, highlighter),
    );
    let view = ProjectView::new(registry, renderer);

    let location = match &args.id {
        Some(id) => Url::parse_with_params(PAGE_LOCATION, &[("id", id)])?.to_string(),
        None => PAGE_LOCATION.to_string(),
    };

    // DOM nodes and revert timers live on this thread only
    let local = LocalSet::new();
    let outcome = local
        .run_until(async {
            let outcome = view.open(&page, &location).await;
            if let (Some(n), Ok(RenderOutcome::Rendered(rendered))) = (args.copy, &outcome) {
                copy_block(rendered, n, durations).await?;
            }
            Ok::<_, anyhow::Error>(outcome)
        })
        .await?;

    write_page(&page, args).await?;

    match outcome {
        Ok(RenderOutcome::Rendered(_)) | Ok(RenderOutcome::Superseded) => Ok(()),
        Ok(RenderOutcome::Failed(e)) => Err(e.into()),
        Err(e) => Err(e.into()),
    }
}

/// Activate the `n`-th copy control (1-based) and report its labels until
/// the feedback reverts.
async fn copy_block(
    rendered: &RenderedView<Osc52Clipboard>,
    n: usize,
    durations: FeedbackDurations,
) -> Result<(), anyhow::Error> {
    let control = n
        .checked_sub(1)
        .and_then(|index| rendered.controls.get(index))
        .ok_or_else(|| {
            anyhow::anyhow!(
                "No code block {n}: the document has {count}",
                count = rendered.controls.len()
            )
        })?;

    eprintln!("code block {n}: {}", control.label());
    control.activate().await;
    eprintln!("code block {n}: {}", control.label());

    let longest = durations.copied.max(durations.failed);
    tokio::time::sleep(longest + Duration::from_millis(50)).await;
    eprintln!("code block {n}: {}", control.label());

    Ok(())
}

async fn write_page(page: &Page, args: &ViewArgs) -> Result<(), anyhow::Error> {
    let html = page.to_html();
    match &args.output {
        Some(path) => {
            tokio::fs::write(path, html).await?;
            eprintln!("Wrote {}", path.display());
        }
        None => println!("{html}"),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DEFAULT_CONFIG_FILE;

    fn write_site(dir: &std::path::Path) {
        std::fs::write(
            dir.join(DEFAULT_CONFIG_FILE),
            r#"
site:
  name: Test Portfolio
  docs:
    path: site
preferences:
  path: prefs.json
projects:
  - id: mysh
    title: mysh
    short: A POSIX-style shell
    tech: [C]
    repo: https://github.com/example/mysh
    md_path: projects/mysh.md
"#,
        )
        .unwrap();
        std::fs::create_dir_all(dir.join("site/projects")).unwrap();
        std::fs::write(
            dir.join("site/projects/mysh.md"),
            "# mysh\n\n## Build\n\n```sh\nmake\n```\n",
        )
        .unwrap();
    }

    fn args(dir: &std::path::Path, id: Option<&str>) -> ViewArgs {
        ViewArgs {
            id: id.map(str::to_string),
            config_file: Some(dir.join(DEFAULT_CONFIG_FILE)),
            output: Some(dir.join("out.html")),
            copy: None,
        }
    }

    #[tokio::test]
    async fn test_view_writes_rendered_page() {
        let dir = tempfile::tempdir().unwrap();
        write_site(dir.path());

        run(&args(dir.path(), Some("mysh"))).await.unwrap();

        let html = std::fs::read_to_string(dir.path().join("out.html")).unwrap();
        let page = Page::parse(&html).unwrap();
        assert_eq!(crate::page::dom::select_all(page.toc_list(), "a").len(), 2);
        assert!(html.contains("copy-btn"));
        assert!(html.contains(r#"data-theme="dark""#));
        assert!(dir.path().join("prefs.json").exists());
    }

    #[tokio::test]
    async fn test_view_unknown_project_still_writes_page() {
        let dir = tempfile::tempdir().unwrap();
        write_site(dir.path());

        let err = run(&args(dir.path(), Some("xyz"))).await.unwrap_err();

        assert_eq!(err.to_string(), "Project \"xyz\" not found.");
        let html = std::fs::read_to_string(dir.path().join("out.html")).unwrap();
        assert!(html.contains("Project \"xyz\" not found.") || html.contains("Project &quot;xyz&quot; not found."));
    }
}
