//! Patch engine errors.

use std::path::PathBuf;
use thiserror::Error;

/// Failures of a single patch computation.
///
/// All variants are raised before any output exists, so a failed patch never
/// leaves partial state behind.
#[derive(Debug, Error)]
pub enum PatchError {
    #[error("failed to read `{}`", .0.display())]
    Io(PathBuf, #[source] std::io::Error),

    #[error("invalid source path `{0}`")]
    InvalidPath(String),

    #[error("failed to parse `{path}`: {message}")]
    Parse { path: String, message: String },

    #[error("component `{component}` not found in `{file}`")]
    ComponentNotFound { component: String, file: String },

    #[error("component `{component}` has no markup node with a text child")]
    NoTextNodeFound { component: String },

    #[error("component `{component}` has no element that can carry `{attr}`")]
    NoTargetAttributeCarrier { component: String, attr: String },
}

impl PatchError {
    /// Whether the caller supplied something unusable (vs. an I/O failure).
    pub const fn is_client_error(&self) -> bool {
        !matches!(self, Self::Io(..))
    }
}
