//! HTTP client for the preview process.

use std::time::Duration;

use reqwest::StatusCode;
use reqwest::blocking::{Client, Response};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use thiserror::Error;

use crate::config::StudioConfig;

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("preview unreachable at {url}: {message}")]
    Unreachable { url: String, message: String },

    #[error("preview rejected the update ({status}): {message}")]
    Rejected { status: u16, message: String },
}

/// Reply of `POST /api/update`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreviewReply {
    pub success: bool,
    #[serde(default)]
    pub message: String,
}

/// Reply of `GET /health`.
#[derive(Debug, Clone, Deserialize)]
pub struct Health {
    pub ok: bool,
}

/// Blocking client with a bounded timeout on every call.
#[derive(Debug, Clone)]
pub struct PreviewClient {
    base_url: String,
    http: Client,
}

impl PreviewClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, TransportError> {
        let base_url = base_url.trim_end_matches('/').to_string();
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| TransportError::Unreachable { url: base_url.clone(), message: e.to_string() })?;
        Ok(Self { base_url, http })
    }

    pub fn from_config(config: &StudioConfig) -> Result<Self, TransportError> {
        Self::new(&config.preview_url, config.timeout())
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn unreachable(&self, e: impl std::fmt::Display) -> TransportError {
        TransportError::Unreachable { url: self.base_url.clone(), message: e.to_string() }
    }

    pub fn health(&self) -> Result<Health, TransportError> {
        let response = self.http.get(self.url("/health")).send().map_err(|e| self.unreachable(e))?;
        if !response.status().is_success() {
            return Err(self.unreachable(format!("health check returned {}", response.status())));
        }
        response.json().map_err(|e| self.unreachable(e))
    }

    /// Primary protocol: persist `content` at `file_path` and broadcast.
    pub fn push_file(&self, file_path: &str, content: &str) -> Result<PreviewReply, TransportError> {
        self.post_update(&json!({ "filePath": file_path, "content": content }))
    }

    /// Forward a raw update body; returns the preview's status and JSON reply.
    pub fn forward(&self, body: Vec<u8>) -> Result<(u16, Value), TransportError> {
        let response = self
            .http
            .post(self.url("/api/update"))
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .map_err(|e| self.unreachable(e))?;
        let status = response.status().as_u16();
        let text = response.text().map_err(|e| self.unreachable(e))?;
        let value = serde_json::from_str(&text).unwrap_or(Value::String(text));
        Ok((status, value))
    }

    fn post_update(&self, body: &Value) -> Result<PreviewReply, TransportError> {
        let response = self
            .http
            .post(self.url("/api/update"))
            .json(body)
            .send()
            .map_err(|e| self.unreachable(e))?;
        Self::into_reply(response)
    }

    fn into_reply(response: Response) -> Result<PreviewReply, TransportError> {
        let status = response.status();
        let text = response.text().unwrap_or_default();
        let reply: Option<PreviewReply> = serde_json::from_str(&text).ok();

        match reply {
            Some(reply) if status == StatusCode::OK && reply.success => Ok(reply),
            Some(reply) => Err(TransportError::Rejected { status: status.as_u16(), message: reply.message }),
            None => Err(TransportError::Rejected { status: status.as_u16(), message: text }),
        }
    }
}
