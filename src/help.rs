//! Read-only help documents: a tab's `help.md` and the project README

use std::path::{Path, PathBuf};

use log::{debug, warn};
use thiserror::Error;

/// Help document looked up inside a tab's working directory
pub const HELP_FILE: &str = "help.md";
/// Documentation shown from the configuration directory
pub const README_FILE: &str = "README.md";

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HelpError {
    #[error("Set a working directory first")]
    NoWorkDir,
}

/// A Markdown document, or the reason it could not be shown
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HelpDocument {
    Content { path: PathBuf, text: String },
    Missing(PathBuf),
    Unreadable { path: PathBuf, message: String },
}

impl HelpDocument {
    /// Read the document at `path`. Never fails: problems become placeholders.
    #[must_use]
    pub fn read(path: &Path) -> Self {
        if !path.exists() {
            debug!("No help document at {}", path.display());
            return HelpDocument::Missing(path.to_path_buf());
        }
        match std::fs::read_to_string(path) {
            Ok(text) => HelpDocument::Content {
                path: path.to_path_buf(),
                text,
            },
            Err(e) => {
                warn!("Failed to read {}: {e}", path.display());
                HelpDocument::Unreadable {
                    path: path.to_path_buf(),
                    message: e.to_string(),
                }
            }
        }
    }

    /// Markdown text to display.
    #[must_use]
    pub fn body(&self) -> String {
        match self {
            HelpDocument::Content { text, .. } => text.clone(),
            HelpDocument::Missing(path) => format!(
                "Help file not found: {}\n\nMake sure it exists in the working directory.",
                path.display()
            ),
            HelpDocument::Unreadable { path, message } => {
                format!("Error reading {}:\n\n{message}", path.display())
            }
        }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        match self {
            HelpDocument::Content { path, .. }
            | HelpDocument::Missing(path)
            | HelpDocument::Unreadable { path, .. } => path,
        }
    }
}

/// The help document of a tab working in `work_dir`.
///
/// # Errors
///
/// Returns `HelpError::NoWorkDir` if no working directory is set.
pub fn tab_help(work_dir: Option<&str>) -> Result<HelpDocument, HelpError> {
    let dir = work_dir.ok_or(HelpError::NoWorkDir)?;
    Ok(HelpDocument::read(&Path::new(dir).join(HELP_FILE)))
}

/// The README next to the configuration file.
#[must_use]
pub fn readme(base_dir: &Path) -> HelpDocument {
    HelpDocument::read(&base_dir.join(README_FILE))
}
