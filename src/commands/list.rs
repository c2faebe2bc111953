use crate::{ListArgs, config::FolioConfig, registry::ProjectRegistry};

pub async fn run(args: &ListArgs) -> Result<(), anyhow::Error> {
    let config = FolioConfig::load_from_arg(args.config_file.as_deref()).await?;
    let registry = ProjectRegistry::new(config.projects)?;

    let kind = if config.site.docs.is_url() { "remote" } else { "local" };
    println!(
        "{name}: {count} projects, documents from {docs} ({kind})",
        name = config.site.name,
        count = registry.len(),
        docs = config.site.docs.describe(),
    );

    if registry.is_empty() {
        println!("  (no projects configured)");
    }
    for project in registry.iter() {
        let tech = if project.tech.is_empty() {
            String::new()
        } else {
            format!(" [{}]", project.tech.join(", "))
        };
        println!(
            "  {id:<16} {title}{tech}  {path}",
            id = project.id,
            title = project.title,
            path = project.md_path,
        );
    }

    Ok(())
}
