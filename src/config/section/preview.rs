//! `[preview]` section configuration.
//!
//! Contains preview process settings.
//!
//! # Example
//!
//! ```toml
//! [preview]
//! interface = "127.0.0.1"     # Network interface (127.0.0.1 = localhost only)
//! port = 5173                 # HTTP port number
//! ws_port = 24680             # Observer WebSocket port
//! source_dir = "src"          # Root for `filePath` in update requests
//! serve_dir = "dist"          # Static files served to the browser
//! ```
//!
//! Paths missing from `serve_dir` are looked up under `source_dir`, so a
//! reload after an update always sees the persisted file.
//!
//! Use `interface = "0.0.0.0"` to make the preview accessible from LAN.

use std::net::{IpAddr, Ipv4Addr};
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::config::{ConfigDiagnostics, FieldPath};

/// Preview process settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PreviewConfig {
    /// Network interface to bind.
    /// - `127.0.0.1` (default): localhost only
    /// - `0.0.0.0`: all interfaces (LAN accessible)
    pub interface: IpAddr,

    /// HTTP port number.
    pub port: u16,

    /// Observer WebSocket port.
    pub ws_port: u16,

    /// Source root; update requests name files relative to it.
    pub source_dir: PathBuf,

    /// Directory of static files served to the browser, searched before `source_dir`.
    pub serve_dir: PathBuf,
}

impl PreviewConfig {
    const PORT: FieldPath = FieldPath::new("preview.port");
    const WS_PORT: FieldPath = FieldPath::new("preview.ws_port");

    pub fn validate(&self, diag: &mut ConfigDiagnostics) {
        if self.port == 0 {
            diag.error(Self::PORT, "port must be non-zero");
        }
        if self.ws_port == 0 {
            diag.error(Self::WS_PORT, "port must be non-zero");
        } else if self.ws_port == self.port {
            diag.error_with_hint(
                Self::WS_PORT,
                "observer port collides with the HTTP port",
                "pick a different `ws_port`, e.g. 24680",
            );
        }
    }
}

impl Default for PreviewConfig {
    fn default() -> Self {
        Self {
            interface: IpAddr::V4(Ipv4Addr::new(127, 0, 0, 1)),
            port: 5173,
            ws_port: 24680,
            source_dir: "src".into(),
            serve_dir: "dist".into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};
    use std::path::Path;

    use crate::config::{ConfigDiagnostics, test_parse_config};

    #[test]
    fn test_preview_config() {
        let config = test_parse_config(
            "[preview]\ninterface = \"0.0.0.0\"\nport = 8080\nws_port = 9000\nsource_dir = \"app\"",
        );

        assert_eq!(config.preview.interface, IpAddr::V4(Ipv4Addr::new(0, 0, 0, 0)));
        assert_eq!(config.preview.port, 8080);
        assert_eq!(config.preview.ws_port, 9000);
        assert_eq!(config.preview.source_dir, Path::new("app"));
    }

    #[test]
    fn test_preview_config_defaults() {
        let config = test_parse_config("");

        assert_eq!(config.preview.interface, IpAddr::V4(Ipv4Addr::new(127, 0, 0, 1)));
        assert_eq!(config.preview.port, 5173);
        assert_eq!(config.preview.ws_port, 24680);
        assert_eq!(config.preview.serve_dir, Path::new("dist"));
    }

    #[test]
    fn test_preview_config_ipv6() {
        let config = test_parse_config("[preview]\ninterface = \"::1\"");
        assert_eq!(
            config.preview.interface,
            IpAddr::V6(Ipv6Addr::new(0, 0, 0, 0, 0, 0, 0, 1))
        );
    }

    #[test]
    fn test_preview_port_collision() {
        let config = test_parse_config("[preview]\nport = 7000\nws_port = 7000");
        let mut diag = ConfigDiagnostics::new();
        config.preview.validate(&mut diag);
        assert_eq!(diag.len(), 1);
    }
}
