use std::path::PathBuf;
use thiserror::Error;

/// Selection resolution errors.
#[derive(Debug, Error)]
pub enum LocatorError {
    #[error("no source mapping for `{0}` or any ancestor")]
    NotFound(String),

    #[error("failed to read locator input `{}`", .0.display())]
    Io(PathBuf, #[source] std::io::Error),

    #[error("invalid locator manifest `{}`", .0.display())]
    Manifest(PathBuf, #[source] serde_json::Error),

    #[error("failed to parse markup snapshot")]
    Markup,
}
