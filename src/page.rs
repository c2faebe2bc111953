//! The host page the document is rendered into.
//!
//! The page chrome comes from a Tera template; the rendered result is
//! parsed into a DOM that the rendering pipeline then mutates in place.

pub mod dom;

use std::path::Path;

use kuchikikiki::NodeRef;
use kuchikikiki::traits::*;
use serde::Serialize;
use tera::{Context, Tera};

/// Container the markdown document is rendered into.
pub const CONTENT_ID: &str = "markdown-content";
/// Layout element wrapping the content container.
pub const DOC_ID: &str = "doc";
/// Container the table of contents is rendered into.
pub const TOC_LIST_ID: &str = "toc-list";

pub const PROJECT_TITLE_ID: &str = "project-title";
pub const PROJECT_SUB_ID: &str = "project-sub";
pub const REPO_LINK_ID: &str = "repo-link";
pub const THEME_TOGGLE_ID: &str = "theme-toggle";

const PROJECT_TEMPLATE: &str = "project.html";
const BUILTIN_PROJECT_TEMPLATE: &str = include_str!("../theme/templates/project.html");

#[derive(thiserror::Error, Debug)]
pub enum PageError {
    #[error("template error: {0}")]
    Template(#[from] tera::Error),

    #[error("theme not found: {0}")]
    ThemeNotFound(String),

    #[error("page is missing required element #{0}")]
    MissingContainer(&'static str),
}

/// The page templates, wrapping Tera.
pub struct PageTemplates {
    tera: Tera,
}

impl PageTemplates {
    /// Create the templates, preferring those in `theme_dir/templates`
    /// and falling back to the built-in ones for anything missing.
    pub fn new(theme_dir: Option<&Path>) -> Result<Self, PageError> {
        let mut builtin = Tera::default();
        builtin.add_raw_template(PROJECT_TEMPLATE, BUILTIN_PROJECT_TEMPLATE)?;

        let Some(theme_dir) = theme_dir else {
            return Ok(Self { tera: builtin });
        };

        let templates_path = theme_dir.join("templates");
        if !templates_path.exists() {
            return Err(PageError::ThemeNotFound(theme_dir.display().to_string()));
        }

        let glob = templates_path.join("**/*.html");
        let mut tera = Tera::new(&glob.to_string_lossy())?;
        tera.extend(&builtin)?;

        Ok(Self { tera })
    }

    /// Render the project page chrome and parse it into a [`Page`].
    pub fn project_page(&self, context: &PageContext) -> Result<Page, PageError> {
        let mut tera_context = Context::new();
        tera_context.insert("site", &context.site);
        tera_context.insert("highlight_css", &context.highlight_css);

        let html = self.tera.render(PROJECT_TEMPLATE, &tera_context)?;
        Page::parse(&html)
    }
}

/// Context passed to page templates.
#[derive(Debug, Serialize)]
pub struct PageContext {
    pub site: SiteContext,
    /// Stylesheet for highlighted code, if the theme could be resolved
    pub highlight_css: Option<String>,
}

/// Site-level information.
#[derive(Debug, Clone, Serialize)]
pub struct SiteContext {
    pub name: String,
}

/// A parsed host page.
///
/// Holds handles to the containers the renderer needs; they stay valid
/// for the life of the page because only their children are replaced.
pub struct Page {
    document: NodeRef,
    content: NodeRef,
    doc: NodeRef,
    toc_list: NodeRef,
}

impl Page {
    /// Parse a page, checking that the required containers exist.
    pub fn parse(html: &str) -> Result<Self, PageError> {
        let document = kuchikikiki::parse_html().one(html);
        let find = |id: &'static str| {
            dom::select_first(&document, &format!("#{id}")).ok_or(PageError::MissingContainer(id))
        };

        let content = find(CONTENT_ID)?;
        let doc = find(DOC_ID)?;
        let toc_list = find(TOC_LIST_ID)?;

        Ok(Self {
            document,
            content,
            doc,
            toc_list,
        })
    }

    pub fn document(&self) -> &NodeRef {
        &self.document
    }

    pub fn content(&self) -> &NodeRef {
        &self.content
    }

    pub fn doc(&self) -> &NodeRef {
        &self.doc
    }

    pub fn toc_list(&self) -> &NodeRef {
        &self.toc_list
    }

    /// Look up any element by id.
    pub fn element(&self, id: &str) -> Option<NodeRef> {
        dom::select_first(&self.document, &format!("#{id}"))
    }

    /// Replace the content container with a plain-text message.
    pub fn show_message(&self, message: &str) {
        dom::set_text(&self.content, message);
    }

    /// Set the document `<title>`.
    pub fn set_title(&self, title: &str) {
        if let Some(node) = dom::select_first(&self.document, "title") {
            dom::set_text(&node, title);
        }
    }

    /// Serialize the whole page.
    pub fn to_html(&self) -> String {
        self.document.to_string()
    }
}

#[cfg(test)]
pub(crate) const TEST_PAGE: &str = r##"<!DOCTYPE html>
<html><head><title>Test</title></head>
<body>
  <h1 id="project-title"></h1><p id="project-sub"></p><a id="repo-link" href="#">Code</a>
  <button id="theme-toggle">Dark</button>
  <nav id="toc-list"></nav>
  <main id="doc"><article id="markdown-content">Loading...</article></main>
</body></html>"##;
