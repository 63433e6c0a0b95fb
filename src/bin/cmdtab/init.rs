use std::process::ExitCode;

use clap::Args;

use cmdtab::config_file::ConfigStore;
use cmdtab::session::Session;

#[derive(Args, Debug)]
pub struct InitArgs {
    /// Overwrite an existing config file
    #[arg(long)]
    force: bool,
}

/// Write a session with one default tab to the config path.
///
/// # Errors
///
/// Returns an error if the file exists (without `--force`) or cannot be written.
pub fn run(args: &InitArgs, store: &ConfigStore) -> Result<ExitCode, Box<dyn std::error::Error>> {
    store.init(&Session::new(), args.force)?;
    println!("Wrote {}", store.path().display());
    Ok(ExitCode::SUCCESS)
}
