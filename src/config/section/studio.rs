//! `[studio]` section configuration.
//!
//! # Example
//!
//! ```toml
//! [studio]
//! port = 3000
//! preview_url = "http://localhost:5173"
//! timeout_secs = 10
//! assets_dir = "public/assets"
//! assets_url_prefix = "/assets"
//! ```

use std::net::{IpAddr, Ipv4Addr};
use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::config::{ConfigDiagnostics, FieldPath};

/// Editing surface settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StudioConfig {
    pub interface: IpAddr,
    pub port: u16,

    /// Base URL of the preview process that receives updates.
    pub preview_url: String,

    /// Upper bound for every call into the preview process.
    pub timeout_secs: u64,

    /// Where uploaded assets are stored (relative to project root).
    pub assets_dir: PathBuf,

    /// URL prefix under which `assets_dir` is served.
    pub assets_url_prefix: String,
}

impl StudioConfig {
    const PREVIEW_URL: FieldPath = FieldPath::new("studio.preview_url");
    const TIMEOUT: FieldPath = FieldPath::new("studio.timeout_secs");

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn validate(&self, diag: &mut ConfigDiagnostics) {
        match url::Url::parse(&self.preview_url) {
            Ok(url) if matches!(url.scheme(), "http" | "https") => {}
            Ok(_) => diag.error(Self::PREVIEW_URL, "must use http or https"),
            Err(e) => diag.error_with_hint(
                Self::PREVIEW_URL,
                format!("invalid url: {e}"),
                "e.g. \"http://localhost:5173\"",
            ),
        }
        if self.timeout_secs == 0 {
            diag.error(Self::TIMEOUT, "timeout must be at least 1 second");
        }
    }
}

impl Default for StudioConfig {
    fn default() -> Self {
        Self {
            interface: IpAddr::V4(Ipv4Addr::new(127, 0, 0, 1)),
            port: 3000,
            preview_url: "http://localhost:5173".to_string(),
            timeout_secs: 10,
            assets_dir: "public/assets".into(),
            assets_url_prefix: "/assets".to_string(),
        }
    }
}
