//! Persist-then-broadcast update handling.
//!
//! Two request shapes are accepted:
//! - `{filePath, content}`: write `content` under the source root, then
//!   broadcast `file-update`
//! - `{code, language}`: broadcast `code-update`, nothing is written
//!
//! Validation happens before any side effect; broadcast only happens after
//! the write succeeded.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use super::message::PreviewMessage;
use super::registry::{BroadcastReport, ObserverRegistry};
use crate::utils::path::join_relative;

const MISSING_PARAMS: &str =
    "Missing required parameters: either (filePath, content) or (code, language)";

#[derive(Debug, Error)]
pub enum UpdateError {
    #[error("{0}")]
    Malformed(String),

    #[error("invalid file path `{0}`")]
    InvalidPath(String),

    #[error("failed to write `{}`", .0.display())]
    Persist(PathBuf, #[source] std::io::Error),

    #[error("update channel is shut down")]
    Closed,
}

impl UpdateError {
    /// Request-shape errors map to 400, the rest to 500.
    pub const fn is_client_error(&self) -> bool {
        matches!(self, Self::Malformed(_) | Self::InvalidPath(_))
    }
}

/// Raw JSON body of an update request, before validation.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawUpdateBody {
    file_path: Option<String>,
    content: Option<String>,
    code: Option<String>,
    language: Option<String>,
}

/// A validated update request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateRequest {
    File { file_path: String, content: String },
    Code { code: String, language: String },
}

impl TryFrom<RawUpdateBody> for UpdateRequest {
    type Error = UpdateError;

    fn try_from(raw: RawUpdateBody) -> Result<Self, Self::Error> {
        match raw {
            // Empty content is a legitimate file (truncation).
            RawUpdateBody { file_path: Some(file_path), content: Some(content), .. }
                if !file_path.trim().is_empty() =>
            {
                Ok(Self::File { file_path, content })
            }
            RawUpdateBody { code: Some(code), language: Some(language), .. }
                if !code.is_empty() && !language.is_empty() =>
            {
                Ok(Self::Code { code, language })
            }
            _ => Err(UpdateError::Malformed(MISSING_PARAMS.to_string())),
        }
    }
}

impl UpdateRequest {
    /// Parse and validate a JSON request body.
    pub fn from_json(body: &[u8]) -> Result<Self, UpdateError> {
        let raw: RawUpdateBody = serde_json::from_slice(body)
            .map_err(|e| UpdateError::Malformed(format!("invalid JSON body: {e}")))?;
        Self::try_from(raw)
    }
}

/// What an applied update did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateOutcome {
    /// Written file, for `File` requests.
    pub persisted: Option<PathBuf>,
    pub report: BroadcastReport,
    pub message: String,
}

/// Applies update requests for one preview process.
///
/// Not synchronized: callers serialize `apply` calls (see the update actor)
/// to get arrival-order persistence and broadcast.
#[derive(Clone)]
pub struct UpdateChannel {
    source_root: PathBuf,
    registry: ObserverRegistry,
}

impl UpdateChannel {
    pub fn new(source_root: impl Into<PathBuf>, registry: ObserverRegistry) -> Self {
        Self { source_root: source_root.into(), registry }
    }

    pub fn registry(&self) -> &ObserverRegistry {
        &self.registry
    }

    pub fn apply(&self, request: UpdateRequest) -> Result<UpdateOutcome, UpdateError> {
        match request {
            UpdateRequest::File { file_path, content } => {
                let target = join_relative(&self.source_root, &file_path)
                    .ok_or_else(|| UpdateError::InvalidPath(file_path.clone()))?;
                persist(&target, &content)?;

                let report = self.registry.broadcast(&PreviewMessage::file_update(&file_path, content));
                Ok(UpdateOutcome {
                    persisted: Some(target),
                    report,
                    message: format!("File {file_path} updated successfully"),
                })
            }
            UpdateRequest::Code { code, language } => {
                let report = self.registry.broadcast(&PreviewMessage::code_update(code, language));
                Ok(UpdateOutcome {
                    persisted: None,
                    report,
                    message: "Code updated successfully".to_string(),
                })
            }
        }
    }
}

fn persist(target: &Path, content: &str) -> Result<(), UpdateError> {
    if let Some(parent) = target.parent() {
        fs::create_dir_all(parent).map_err(|e| UpdateError::Persist(parent.to_path_buf(), e))?;
    }
    fs::write(target, content).map_err(|e| UpdateError::Persist(target.to_path_buf(), e))
}
