//! Parameter rows and tab pages, and the command lines built from them

use thiserror::Error;

pub mod row;
pub mod tab;

/// Errors raised while building a command from a tab
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FormError {
    #[error("Main command is missing")]
    MissingMainCommand,
}
