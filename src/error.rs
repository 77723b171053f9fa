//! Crate-wide error type.
//!
//! Every failure carries the process exit code the `mtm` binary should use:
//!
//! - `2`: bad input (schema, query, registry, unknown indicator)
//! - `3`: nothing to work with (missing source file, empty slice)
//! - `4`: runtime failures (filesystem, corrupt artifacts, remote fetch)

use std::path::{Path, PathBuf};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum MtmError {
    /// Raw file columns cannot be mapped to a single (date, value) pair.
    #[error("schema error in '{}': {message}", path.display())]
    Schema { path: PathBuf, message: String },

    /// A raw or normalized file that the operation needs is not on disk.
    #[error("{what} not found: {}", path.display())]
    MissingSource { what: &'static str, path: PathBuf },

    #[error("invalid query: {0}")]
    InvalidQuery(String),

    #[error("slice for '{indicator_id}' is empty for the requested window")]
    EmptySlice { indicator_id: String },

    #[error("unknown indicator: {0}")]
    UnknownIndicator(String),

    #[error("invalid indicator registry: {0}")]
    Registry(String),

    /// A persisted artifact (normalized series or catalog) could not be parsed.
    #[error("corrupt data in '{}': {message}", path.display())]
    Data { path: PathBuf, message: String },

    #[error("{context} '{}': {source}", path.display())]
    Io {
        context: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("fetch failed: {0}")]
    Fetch(String),
}

impl MtmError {
    pub fn exit_code(&self) -> u8 {
        match self {
            MtmError::Schema { .. }
            | MtmError::InvalidQuery(_)
            | MtmError::UnknownIndicator(_)
            | MtmError::Registry(_) => 2,
            MtmError::MissingSource { .. } | MtmError::EmptySlice { .. } => 3,
            MtmError::Data { .. } | MtmError::Io { .. } | MtmError::Fetch(_) => 4,
        }
    }

    pub(crate) fn io(context: &'static str, path: &Path, source: std::io::Error) -> Self {
        MtmError::Io {
            context,
            path: path.to_path_buf(),
            source,
        }
    }

    pub(crate) fn data(path: &Path, message: impl Into<String>) -> Self {
        MtmError::Data {
            path: path.to_path_buf(),
            message: message.into(),
        }
    }
}
