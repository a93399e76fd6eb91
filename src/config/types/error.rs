//! Configuration errors and validation diagnostics.

use owo_colors::OwoColorize;
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config `{}`", .0.display())]
    Io(PathBuf, #[source] std::io::Error),

    #[error("invalid config TOML")]
    Toml(#[from] toml::de::Error),

    // Not #[from]: the diagnostics render themselves in full.
    #[error("{0}")]
    Diagnostics(ConfigDiagnostics),
}

/// Dotted path of a config field, e.g. `preview.ws_port`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldPath(&'static str);

impl FieldPath {
    pub const fn new(path: &'static str) -> Self {
        Self(path)
    }

    pub const fn as_str(&self) -> &'static str {
        self.0
    }
}

#[derive(Debug, Clone)]
struct Diagnostic {
    field: FieldPath,
    message: String,
    hint: Option<String>,
}

/// Every problem found while validating, reported in one go.
#[derive(Debug, Default)]
pub struct ConfigDiagnostics {
    entries: Vec<Diagnostic>,
}

impl ConfigDiagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn error(&mut self, field: FieldPath, message: impl Into<String>) {
        self.push(field, message.into(), None);
    }

    pub fn error_with_hint(&mut self, field: FieldPath, message: impl Into<String>, hint: impl Into<String>) {
        self.push(field, message.into(), Some(hint.into()));
    }

    fn push(&mut self, field: FieldPath, message: String, hint: Option<String>) {
        self.entries.push(Diagnostic { field, message, hint });
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn into_result(self) -> Result<(), Self> {
        if self.is_empty() { Ok(()) } else { Err(self) }
    }
}

impl fmt::Display for ConfigDiagnostics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let noun = if self.len() == 1 { "problem" } else { "problems" };
        write!(f, "{} ({} {noun})", "invalid vina.toml".red().bold(), self.len())?;
        for d in &self.entries {
            write!(f, "\n  {} {}", d.field.as_str().cyan(), d.message)?;
            if let Some(hint) = &d.hint {
                write!(f, "\n    {} {hint}", "hint:".yellow())?;
            }
        }
        Ok(())
    }
}

impl std::error::Error for ConfigDiagnostics {}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Error, ErrorKind};

    #[test]
    fn test_io_error_names_file() {
        let err = ConfigError::Io(PathBuf::from("vina.toml"), Error::new(ErrorKind::NotFound, "missing"));
        assert!(err.to_string().contains("vina.toml"));
    }

    #[test]
    fn test_diagnostics_render_every_entry() {
        let mut diag = ConfigDiagnostics::new();
        assert!(diag.is_empty());
        diag.error(FieldPath::new("preview.port"), "port must be non-zero");
        diag.error_with_hint(FieldPath::new("studio.preview_url"), "not a URL", "use http://host:port");
        assert_eq!(diag.len(), 2);

        let rendered = diag.into_result().unwrap_err().to_string();
        assert!(rendered.contains("2 problems"));
        assert!(rendered.contains("preview.port"));
        assert!(rendered.contains("use http://host:port"));
    }
}
