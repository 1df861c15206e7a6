//! Error types for htmlchunk operations.

use thiserror::Error;

/// Errors that can occur while converting, extracting or merging.
///
/// Unparseable markup is not an error: the tree builder falls back to a
/// `rawHtml` node instead (see [`crate::tree::build_tree`]).
#[derive(Error, Debug)]
pub enum Error {
    #[error("{operation}: input is not a valid tree: {source}")]
    InvalidTree {
        operation: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid edit map: {0}")]
    InvalidEditMap(String),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    pub(crate) fn invalid_tree(operation: &'static str, source: serde_json::Error) -> Self {
        Error::InvalidTree { operation, source }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
