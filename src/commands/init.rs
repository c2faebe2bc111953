use std::path::PathBuf;

use crate::{
    InitArgs,
    config::{DEFAULT_CONFIG_FILE, DocsLocation, FolioConfig, SiteConfig},
    registry::ProjectRecord,
};

const SAMPLE_DOC_PATH: &str = "projects/hello.md";

const SAMPLE_DOC: &str = r#"# Hello

A sample project document.

## Build

```sh
cargo build --release
```

## Usage

```rust
fn main() {
    println!("hello");
}
```
"#;

pub async fn run(args: &InitArgs) -> Result<(), anyhow::Error> {
    let path = if args.path.is_relative() {
        std::env::current_dir()?.join(&args.path)
    } else {
        args.path.clone()
    };

    if !path.exists() {
        if args.create {
            tokio::fs::create_dir_all(&path).await?;
            println!("Created directory {path}", path = path.display());
        } else {
            return Err(anyhow::anyhow!(
                "Directory does not exist: {path}",
                path = path.display()
            ));
        }
    }

    let config_file = path.join(DEFAULT_CONFIG_FILE);
    if config_file.exists() {
        return Err(anyhow::anyhow!(
            "Config file already exists: {config_file}",
            config_file = config_file.display()
        ));
    }

    let default_config = FolioConfig {
        site: SiteConfig {
            name: "My Portfolio".into(),
            docs: DocsLocation::Path {
                path: PathBuf::from("site"),
            },
            theme_dir: None,
        },
        markdown: Default::default(),
        highlight: Default::default(),
        copy: Default::default(),
        preferences: Default::default(),
        projects: vec![ProjectRecord {
            id: "hello".into(),
            title: "Hello".into(),
            short: "A sample project".into(),
            tech: vec!["Rust".into()],
            repo: "https://github.com/you/hello".into(),
            md_path: SAMPLE_DOC_PATH.into(),
            date: None,
            thumb: None,
            impact: None,
        }],
    };

    println!("Initializing project in {}", path.display());

    let config_text = serde_yaml::to_string(&default_config)?;
    tokio::fs::write(&config_file, config_text).await?;
    println!(
        "Created config file {config_file}",
        config_file = config_file.display()
    );

    let doc_file = path.join("site").join(SAMPLE_DOC_PATH);
    if let Some(parent) = doc_file.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    tokio::fs::write(&doc_file, SAMPLE_DOC).await?;
    println!("Created sample document {}", doc_file.display());

    Ok(())
}
