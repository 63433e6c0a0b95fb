mod init;
mod preview;
mod run;
mod tui;

use std::process::ExitCode;

use clap::{Parser, Subcommand};

use cmdtab::config_file::ConfigStore;
use cmdtab::open_store;
use cmdtab::session::Session;

#[derive(Parser, Debug)]
#[command(name = "cmdtab", about = "Tabbed form builder for shell commands")]
struct Cli {
    /// Path to config file (defaults to cmdtab.json in the current directory)
    #[arg(short, long)]
    config: Option<String>,

    /// Log file path (enables file logging in addition to TUI log panel)
    #[arg(long)]
    log_file: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Print the preview script of a tab
    Preview(preview::PreviewArgs),
    /// Launch a tab's command in the background
    Run(run::RunArgs),
    /// Write a default configuration file
    Init(init::InitArgs),
}

fn main() -> ExitCode {
    match run() {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

#[tokio::main]
async fn run() -> Result<ExitCode, Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let store = open_store(cli.config.as_deref());

    match cli.command {
        Some(Commands::Preview(ref args)) => preview::run(args, &load_strict(&store)?),
        Some(Commands::Run(ref args)) => run::run(args, &load_strict(&store)?),
        Some(Commands::Init(ref args)) => init::run(args, &store),
        None => tui::run(store, cli.log_file).await,
    }
}

/// Load the session for a headless command. Unlike the TUI, a broken file is an error.
fn load_strict(store: &ConfigStore) -> Result<Session, Box<dyn std::error::Error>> {
    let loaded = store.load();
    match loaded.error {
        Some(e) => Err(e.into()),
        None => Ok(loaded.session),
    }
}

/// Resolve `--tab` (name or zero-based index), defaulting to the selected tab.
fn resolve_tab(session: &Session, tab: Option<&str>) -> Result<usize, String> {
    match tab {
        Some(name) => session
            .find(name)
            .ok_or_else(|| format!("No tab named '{name}'")),
        None => Ok(session.selected()),
    }
}
