//! `[locator]` section configuration.
//!
//! # Example
//!
//! ```toml
//! [locator]
//! manifest = ".vina/locators.json"
//! markup = ["dist/index.html"]
//! file_attr = "data-vina-file"
//! component_attr = "data-vina-component"
//! ```

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::config::{ConfigDiagnostics, FieldPath};

/// Inputs of the DOM path to source mapping.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LocatorConfig {
    /// JSON manifest emitted by build instrumentation.
    pub manifest: PathBuf,

    /// Rendered HTML snapshots carrying instrumentation attributes.
    pub markup: Vec<PathBuf>,

    pub file_attr: String,
    pub component_attr: String,
    pub line_attr: String,
    pub col_attr: String,
}

impl LocatorConfig {
    pub fn validate(&self, diag: &mut ConfigDiagnostics) {
        let attrs = [
            (FieldPath::new("locator.file_attr"), &self.file_attr),
            (FieldPath::new("locator.component_attr"), &self.component_attr),
        ];
        for (field, value) in attrs {
            if value.trim().is_empty() {
                diag.error(field, "attribute name must not be empty");
            }
        }
    }
}

impl Default for LocatorConfig {
    fn default() -> Self {
        Self {
            manifest: ".vina/locators.json".into(),
            markup: Vec::new(),
            file_attr: "data-vina-file".to_string(),
            component_attr: "data-vina-component".to_string(),
            line_attr: "data-vina-line".to_string(),
            col_attr: "data-vina-col".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use crate::config::test_parse_config;

    #[test]
    fn test_locator_config_defaults() {
        let config = test_parse_config("");
        assert_eq!(config.locator.manifest, Path::new(".vina/locators.json"));
        assert!(config.locator.markup.is_empty());
        assert_eq!(config.locator.component_attr, "data-vina-component");
    }

    #[test]
    fn test_locator_config_markup_list() {
        let config = test_parse_config("[locator]\nmarkup = [\"dist/index.html\", \"dist/about.html\"]");
        assert_eq!(config.locator.markup.len(), 2);
    }
}
