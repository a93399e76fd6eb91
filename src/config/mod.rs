//! Project configuration management for `vina.toml`.
//!
//! # Module Structure
//!
//! ```text
//! config/
//! ├── section/       # [preview], [studio], [locator]
//! ├── types/         # ConfigError, diagnostics, global handle
//! ├── util.rs        # Config file discovery
//! └── mod.rs         # VinaConfig (this file)
//! ```
//!
//! A missing config file is not an error: every section has defaults and the
//! project root becomes the current directory.

pub mod section;
pub mod types;
mod util;

use util::find_config_file;

pub use section::{LocatorConfig, PreviewConfig, StudioConfig};
pub use types::{ConfigDiagnostics, ConfigError, FieldPath, cfg, init_config};

use crate::{
    cli::{Cli, Commands},
    debug, log,
    utils::path::normalize_path,
};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::{
    fs,
    net::IpAddr,
    path::{Path, PathBuf},
};

/// Root configuration structure representing vina.toml
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VinaConfig {
    /// Absolute path to the config file (internal use only)
    #[serde(skip)]
    pub config_path: PathBuf,

    /// Project root directory - parent of config file (internal use only)
    #[serde(skip)]
    pub root: PathBuf,

    /// Preview process settings
    #[serde(default)]
    pub preview: PreviewConfig,

    /// Editing surface settings
    #[serde(default)]
    pub studio: StudioConfig,

    /// DOM path mapping inputs
    #[serde(default)]
    pub locator: LocatorConfig,
}

impl VinaConfig {
    /// Load configuration for the given CLI invocation.
    ///
    /// Searches upward from cwd for the config file. CLI flags override
    /// file values.
    pub fn load(cli: &Cli) -> Result<Self> {
        let cwd = std::env::current_dir().context("Failed to get current working directory")?;

        let (mut config, config_path) = match find_config_file(&cli.config) {
            Some(path) => (Self::from_path(&path)?, path),
            None => {
                debug!("config"; "{} not found, using defaults", cli.config.display());
                (Self::default(), cwd.join(&cli.config))
            }
        };

        let root = config_path.parent().map_or_else(|| cwd.clone(), Path::to_path_buf);
        config.config_path = normalize_path(&config_path);
        config.set_root(&root);
        config.apply_command_options(cli);
        config.validate()?;

        Ok(config)
    }

    /// Load configuration from file path, warning about unknown fields.
    fn from_path(path: &Path) -> Result<Self> {
        let content =
            fs::read_to_string(path).map_err(|err| ConfigError::Io(path.to_path_buf(), err))?;

        let (config, ignored) = Self::parse_with_ignored(&content)?;
        if !ignored.is_empty() {
            Self::print_unknown_fields_warning(&ignored, path);
        }

        Ok(config)
    }

    /// Parse TOML content, collecting any unknown fields.
    fn parse_with_ignored(content: &str) -> Result<(Self, Vec<String>), ConfigError> {
        let mut ignored = Vec::new();
        let deserializer = toml::Deserializer::new(content);
        let config = serde_ignored::deserialize(deserializer, |path: serde_ignored::Path| {
            ignored.push(path.to_string());
        })?;
        Ok((config, ignored))
    }

    fn print_unknown_fields_warning(fields: &[String], path: &Path) {
        let display_path = path
            .file_name()
            .map(|n| n.to_string_lossy())
            .unwrap_or_else(|| path.to_string_lossy());
        log!("warning"; "unknown fields in {}, ignoring: {}", display_path, fields.join(", "));
    }

    pub fn set_root(&mut self, path: &Path) {
        self.root = normalize_path(path);
    }

    /// Join a path with the root directory.
    pub fn root_join(&self, path: impl AsRef<Path>) -> PathBuf {
        self.root.join(path)
    }

    /// Root against which update and patch `filePath`s resolve.
    pub fn source_root(&self) -> PathBuf {
        self.root_join(&self.preview.source_dir)
    }

    /// Directory served as static files by the preview.
    pub fn serve_root(&self) -> PathBuf {
        self.root_join(&self.preview.serve_dir)
    }

    pub fn assets_root(&self) -> PathBuf {
        self.root_join(&self.studio.assets_dir)
    }

    pub fn manifest_path(&self) -> PathBuf {
        self.root_join(&self.locator.manifest)
    }

    pub fn markup_paths(&self) -> Vec<PathBuf> {
        self.locator.markup.iter().map(|p| self.root_join(p)).collect()
    }

    // ========================================================================
    // cli configuration updates
    // ========================================================================

    fn apply_command_options(&mut self, cli: &Cli) {
        match &cli.command {
            Commands::Preview { interface, port, ws_port } => {
                self.apply_server_options(*interface, *port, true);
                Self::update_option(&mut self.preview.ws_port, ws_port.as_ref());
            }
            Commands::Studio { interface, port, preview_url } => {
                self.apply_server_options(*interface, *port, false);
                Self::update_option(&mut self.studio.preview_url, preview_url.as_ref());
            }
            Commands::Edit { .. } | Commands::Locate { .. } => {}
        }
    }

    fn apply_server_options(&mut self, interface: Option<IpAddr>, port: Option<u16>, preview: bool) {
        let (cfg_interface, cfg_port) = if preview {
            (&mut self.preview.interface, &mut self.preview.port)
        } else {
            (&mut self.studio.interface, &mut self.studio.port)
        };
        Self::update_option(cfg_interface, interface.as_ref());
        Self::update_option(cfg_port, port.as_ref());
    }

    /// Update config option if CLI value is provided.
    fn update_option<T: Clone>(config_option: &mut T, cli_option: Option<&T>) {
        if let Some(option) = cli_option {
            *config_option = option.clone();
        }
    }

    // ========================================================================
    // validation
    // ========================================================================

    /// Validate every section, reporting all errors at once.
    pub fn validate(&self) -> Result<()> {
        let mut diag = ConfigDiagnostics::new();
        self.preview.validate(&mut diag);
        self.studio.validate(&mut diag);
        self.locator.validate(&mut diag);
        diag.into_result().map_err(|e| ConfigError::Diagnostics(e).into())
    }
}

// ============================================================================
// Test Helpers (available to all modules via `use crate::config::test_*`)
// ============================================================================

/// Parse config, panicking on unknown fields (to catch typos in tests).
#[cfg(test)]
pub fn test_parse_config(content: &str) -> VinaConfig {
    let (parsed, ignored) = VinaConfig::parse_with_ignored(content).unwrap();
    assert!(ignored.is_empty(), "test config has unknown fields: {:?}", ignored);
    parsed
}
