//! Fire-and-forget launch of a tab's command through the host shell

use std::process::{Command as ProcessCommand, Stdio};

use log::{debug, info};
use thiserror::Error;

use crate::form::FormError;
use crate::form::tab::TabPage;

#[derive(Error, Debug)]
pub enum LaunchError {
    #[error(transparent)]
    Form(#[from] FormError),
    #[error("Failed to start `{program}`: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },
}

/// Shell dialect used to wrap the command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShellFamily {
    Posix,
    Windows,
}

impl ShellFamily {
    /// The family of the platform we are running on.
    #[must_use]
    pub fn host() -> Self {
        if cfg!(windows) {
            ShellFamily::Windows
        } else {
            ShellFamily::Posix
        }
    }

    /// Instruction that changes into `dir`.
    #[must_use]
    pub fn change_dir(self, dir: &str) -> String {
        match self {
            ShellFamily::Posix => format!("cd \"{dir}\""),
            ShellFamily::Windows => format!("cd /d \"{dir}\""),
        }
    }
}

/// Where the launched process writes its output
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Output {
    /// Share our stdio (headless use)
    Inherit,
    /// Detach stdio entirely (the TUI owns the terminal)
    Discard,
}

/// A fully prepared host shell invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShellInvocation {
    pub program: String,
    pub args: Vec<String>,
    /// The script as the user would type it, without the background wrapper
    pub script: String,
}

impl ShellInvocation {
    #[must_use]
    pub fn new(shell: ShellFamily, work_dir: Option<&str>, command: &str) -> Self {
        let script = match work_dir {
            Some(dir) => format!("{} && {command}", shell.change_dir(dir)),
            None => command.to_string(),
        };
        match shell {
            ShellFamily::Posix => Self {
                program: "sh".to_string(),
                args: vec!["-c".to_string(), script.clone()],
                script,
            },
            ShellFamily::Windows => Self {
                program: "cmd".to_string(),
                args: vec!["/C".to_string(), format!("start /B cmd /c \"{script}\"")],
                script,
            },
        }
    }

    /// Invocation running the execution variant of `tab`'s command.
    ///
    /// # Errors
    ///
    /// Returns `FormError::MissingMainCommand` if the tab has no main command.
    pub fn for_tab(tab: &TabPage, shell: ShellFamily) -> Result<Self, FormError> {
        let command = tab.build_execution()?;
        Ok(Self::new(shell, tab.work_dir(), &command))
    }
}

/// Start the invocation without waiting for it. Returns the child's process id.
///
/// The exit status is never observed; a background thread only reaps the child.
///
/// # Errors
///
/// Returns `LaunchError::Spawn` if the shell cannot be started.
pub fn spawn_detached(invocation: &ShellInvocation, output: Output) -> Result<u32, LaunchError> {
    let mut command = ProcessCommand::new(&invocation.program);
    #[cfg(windows)]
    {
        use std::os::windows::process::CommandExt;
        for arg in &invocation.args {
            command.raw_arg(arg);
        }
    }
    #[cfg(not(windows))]
    command.args(&invocation.args);

    command.stdin(Stdio::null());
    if output == Output::Discard {
        command.stdout(Stdio::null()).stderr(Stdio::null());
    }

    debug!("Spawning {} {:?}", invocation.program, invocation.args);
    let mut child = command.spawn().map_err(|source| LaunchError::Spawn {
        program: invocation.program.clone(),
        source,
    })?;
    let pid = child.id();
    info!("> {}", invocation.script);
    info!("Command started in background (pid {pid})");

    std::thread::spawn(move || {
        let _ = child.wait();
    });
    Ok(pid)
}

/// Build `tab`'s execution command and launch it detached on the host shell.
///
/// # Errors
///
/// Returns `LaunchError::Form` for a blank main command, `LaunchError::Spawn` if
/// the shell cannot be started.
pub fn execute(tab: &TabPage, output: Output) -> Result<u32, LaunchError> {
    let invocation = ShellInvocation::for_tab(tab, ShellFamily::host())?;
    spawn_detached(&invocation, output)
}
