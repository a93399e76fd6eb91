//! Preview Message Protocol
//!
//! JSON messages sent from the preview process to observers, tagged by
//! `type`:
//!
//! - `connection`: welcome, sent once when an observer opens
//! - `file-update`: a source file was persisted
//! - `code-update`: a raw code snippet (not persisted)
//! - `echo`: reply to a message the observer sent

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::utils::date::now_rfc3339;

/// Payload of a `file-update`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileUpdate {
    pub file_path: String,
    pub content: String,
}

/// Payload of a `code-update`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeUpdate {
    pub code: String,
    pub language: String,
}

/// Message sent over the observer channel
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum PreviewMessage {
    Connection { message: String, timestamp: String },
    FileUpdate { data: FileUpdate, timestamp: String },
    CodeUpdate { data: CodeUpdate, timestamp: String },
    Echo { data: Value, timestamp: String },
}

impl PreviewMessage {
    /// Welcome message for a newly opened observer
    pub fn connection() -> Self {
        Self::Connection {
            message: format!("Connected to vina preview {}", env!("CARGO_PKG_VERSION")),
            timestamp: now_rfc3339(),
        }
    }

    pub fn file_update(file_path: impl Into<String>, content: impl Into<String>) -> Self {
        Self::FileUpdate {
            data: FileUpdate { file_path: file_path.into(), content: content.into() },
            timestamp: now_rfc3339(),
        }
    }

    pub fn code_update(code: impl Into<String>, language: impl Into<String>) -> Self {
        Self::CodeUpdate {
            data: CodeUpdate { code: code.into(), language: language.into() },
            timestamp: now_rfc3339(),
        }
    }

    pub fn echo(data: Value) -> Self {
        Self::Echo { data, timestamp: now_rfc3339() }
    }

    /// Message kind as written in the `type` tag
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Connection { .. } => "connection",
            Self::FileUpdate { .. } => "file-update",
            Self::CodeUpdate { .. } => "code-update",
            Self::Echo { .. } => "echo",
        }
    }

    /// Serialize to JSON string
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| format!(r#"{{"type":"{}"}}"#, self.kind()))
    }
}
