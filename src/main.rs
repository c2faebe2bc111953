use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;
mod config;
mod page;
mod preference;
mod registry;
mod render;
mod view;

#[derive(Parser)]
struct Args {
    /// Log progress to stderr (RUST_LOG takes precedence)
    #[arg(short, long, global = true, default_value = "false")]
    verbose: bool,

    /// The command to execute
    #[command(subcommand)]
    command: FolioCommand,
}

#[derive(Parser)]
struct InitArgs {
    /// The path to initialize the project in
    path: PathBuf,

    /// Whether to create the directory if it doesn't exist
    #[arg(short, long, default_value = "false")]
    create: bool,
}

#[derive(Parser)]
struct ListArgs {
    /// The path to the configuration file
    #[arg(short, long, default_value = "folio.yaml")]
    config_file: Option<PathBuf>,
}

#[derive(Parser)]
struct ViewArgs {
    /// The id of the project to open
    id: Option<String>,

    /// The path to the configuration file
    #[arg(short, long, default_value = "folio.yaml")]
    config_file: Option<PathBuf>,

    /// Write the rendered page to this file instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Copy the N-th code block (1-based) to the terminal clipboard
    #[arg(long, value_name = "N")]
    copy: Option<usize>,
}

#[derive(Parser)]
struct ThemeArgs {
    /// What to do with the stored theme (defaults to `get`)
    #[command(subcommand)]
    action: Option<ThemeAction>,

    /// The path to the configuration file
    #[arg(short, long, default_value = "folio.yaml")]
    config_file: Option<PathBuf>,
}

#[derive(Subcommand)]
enum ThemeAction {
    /// Print the stored theme
    Get,

    /// Store a theme
    Set {
        /// `dark` or `light`
        theme: String,
    },

    /// Switch between dark and light
    Toggle,
}

#[derive(Subcommand)]
enum FolioCommand {
    /// Initialize a new portfolio project
    Init(InitArgs),

    /// List the projects in the registry
    List(ListArgs),

    /// Render a project's documentation page
    View(ViewArgs),

    /// Show or change the stored colour theme
    Theme(ThemeArgs),
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "info" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), anyhow::Error> {
    let args = Args::parse();
    init_tracing(args.verbose);

    match args.command {
        FolioCommand::Init(args) => {
            commands::init::run(&args).await?;
        }
        FolioCommand::List(args) => {
            commands::list::run(&args).await?;
        }
        FolioCommand::View(args) => {
            commands::view::run(&args).await?;
        }
        FolioCommand::Theme(args) => {
            commands::theme::run(&args).await?;
        }
    }

    Ok(())
}
