use thiserror::Error;

use crate::recorder::entities::Category;

/// Errors produced by the recording core. None of them are I/O related, so callers are expected
/// to branch on them directly instead of retrying.
#[derive(Error, Debug)]
pub enum Error {
    /// A value that can't be turned into a category, transition or payload.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// END received for a category that has no open START.
    #[error("END without matching START for {category}")]
    InvalidState { category: Category },

    /// Export was requested with nothing to export.
    #[error("nothing to export")]
    EmptyInput,

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
