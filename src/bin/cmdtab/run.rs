use std::io::IsTerminal;
use std::process::ExitCode;

use clap::Args;
use inquire::Select;

use cmdtab::launch::{self, Output};
use cmdtab::session::Session;

#[derive(Args, Debug)]
pub struct RunArgs {
    /// Tab name or zero-based index (prompted for when omitted on a terminal)
    #[arg(short, long)]
    tab: Option<String>,
}

/// Launch one tab's execution command with the terminal's stdio.
///
/// # Errors
///
/// Returns an error if the tab does not exist, the prompt fails, or the command
/// cannot be built or started.
pub fn run(args: &RunArgs, session: &Session) -> Result<ExitCode, Box<dyn std::error::Error>> {
    let index = match args.tab.as_deref() {
        None if session.len() > 1 && std::io::stdin().is_terminal() => pick_tab(session)?,
        tab => super::resolve_tab(session, tab)?,
    };
    let tab = &session.tabs()[index];
    let pid = launch::execute(tab, Output::Inherit)?;
    eprintln!("Started '{}' (pid {pid})", tab.name);
    Ok(ExitCode::SUCCESS)
}

fn pick_tab(session: &Session) -> Result<usize, inquire::InquireError> {
    let names: Vec<&str> = session.tabs().iter().map(|t| t.name.as_str()).collect();
    let choice = Select::new("Tab to run:", names)
        .with_starting_cursor(session.selected())
        .raw_prompt()?;
    Ok(choice.index)
}
