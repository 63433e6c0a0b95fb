use std::process::ExitCode;

use clap::Args;

use cmdtab::launch::ShellFamily;
use cmdtab::session::Session;

#[derive(Args, Debug)]
pub struct PreviewArgs {
    /// Tab name or zero-based index (defaults to the last selected tab)
    #[arg(short, long)]
    tab: Option<String>,
}

/// Print the preview script of one tab.
///
/// # Errors
///
/// Returns an error if the tab does not exist or its main command is blank.
pub fn run(args: &PreviewArgs, session: &Session) -> Result<ExitCode, Box<dyn std::error::Error>> {
    let index = super::resolve_tab(session, args.tab.as_deref())?;
    let tab = &session.tabs()[index];
    println!("{}", tab.preview_script(ShellFamily::host())?);
    Ok(ExitCode::SUCCESS)
}
