//! Core implementation of cmdtab, a tabbed form builder for shell commands
//!
//! Each tab holds a working directory, a base command and a list of parameter rows.
//! The rows are assembled into a human-readable preview or an execution string, and
//! the execution string is launched detached through the host shell. All tabs are
//! persisted together as one JSON document.

use std::path::PathBuf;

use log::debug;

use crate::config_file::{CONFIG_FILE, ConfigStore};

pub mod config_file;
pub mod form;
pub mod help;
pub mod launch;
pub mod logger;
pub mod paths;
pub mod session;
pub mod theme;
pub mod tui;

/// The configuration store for an optional `--config` path, defaulting to
/// `cmdtab.json` in the current directory.
#[must_use]
pub fn open_store(config_file: Option<&str>) -> ConfigStore {
    let path = config_file.map_or_else(|| PathBuf::from(CONFIG_FILE), PathBuf::from);
    debug!("Using config file {}", path.display());
    ConfigStore::new(path)
}
