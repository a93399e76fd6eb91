//! AST-guided source patching.
//!
//! Parses a component file, locates the requested component, and computes a
//! minimal textual edit for a text or attribute change. Only the bytes of the
//! edited node change; formatting and comments elsewhere survive verbatim.
//!
//! Patching is pure: [`patch_source`] never writes to disk. Persistence is
//! the update channel's job.

mod attribute;
mod component;
mod error;
mod markup;
mod source;
mod splice;
mod text;

pub use error::PatchError;

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::utils::date::unix_millis;
use crate::utils::path::join_relative;

/// Attribute replacement request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttributeEdit {
    /// Attribute to write; `src` when absent.
    #[serde(default)]
    pub attr_name: Option<String>,
    pub new_value: String,
    /// Also write `alt` on the same element.
    #[serde(default)]
    pub alt_value: Option<String>,
}

/// What to change in the located component.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditIntent {
    ReplaceText(String),
    ReplaceAttribute(AttributeEdit),
}

/// Output of a successful patch.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PatchResult {
    pub updated_source: String,
    /// Unix milliseconds.
    pub applied_at: u64,
}

/// Compute the patched text of `source` for `intent`.
///
/// `path` selects the parser dialect and provides the file stem used by the
/// default-export lookup; it is not read.
pub fn patch_source(
    source: &str,
    path: &Path,
    component: &str,
    intent: &EditIntent,
) -> Result<PatchResult, PatchError> {
    let updated_source = match intent {
        EditIntent::ReplaceText(new_text) => text::replace_text(source, path, component, new_text)?,
        EditIntent::ReplaceAttribute(edit) => {
            attribute::replace_attribute(source, path, component, edit)?
        }
    };
    Ok(PatchResult { updated_source, applied_at: unix_millis() })
}

/// Reads component files under a source root and patches them.
#[derive(Debug, Clone)]
pub struct PatchEngine {
    root: PathBuf,
}

impl PatchEngine {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Read `file_path` (relative to the root) and compute the patch.
    pub fn apply(
        &self,
        file_path: &str,
        component: &str,
        intent: &EditIntent,
    ) -> Result<PatchResult, PatchError> {
        let path = join_relative(&self.root, file_path)
            .ok_or_else(|| PatchError::InvalidPath(file_path.to_string()))?;
        let source = fs::read_to_string(&path).map_err(|e| PatchError::Io(path.clone(), e))?;
        patch_source(&source, Path::new(file_path), component, intent)
    }

    pub fn apply_text_edit(
        &self,
        file_path: &str,
        component: &str,
        new_text: &str,
    ) -> Result<PatchResult, PatchError> {
        self.apply(file_path, component, &EditIntent::ReplaceText(new_text.to_string()))
    }

    pub fn apply_attribute_edit(
        &self,
        file_path: &str,
        component: &str,
        edit: &AttributeEdit,
    ) -> Result<PatchResult, PatchError> {
        self.apply(file_path, component, &EditIntent::ReplaceAttribute(edit.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const HERO: &str = "export function Hero() {\n  return <h1>Old</h1>;\n}\n";

    fn engine_with_hero() -> (TempDir, PatchEngine) {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("components")).unwrap();
        fs::write(dir.path().join("components/Hero.tsx"), HERO).unwrap();
        let engine = PatchEngine::new(dir.path());
        (dir, engine)
    }

    #[test]
    fn test_engine_does_not_write() {
        let (dir, engine) = engine_with_hero();
        let result = engine.apply_text_edit("components/Hero.tsx", "Hero", "New").unwrap();

        assert_eq!(result.updated_source, "export function Hero() {\n  return <h1>New</h1>;\n}\n");
        assert!(result.applied_at > 0);
        let on_disk = fs::read_to_string(dir.path().join("components/Hero.tsx")).unwrap();
        assert_eq!(on_disk, HERO);
    }

    #[test]
    fn test_engine_unknown_component_leaves_file() {
        let (dir, engine) = engine_with_hero();
        let err = engine.apply_text_edit("components/Hero.tsx", "Nope", "x").unwrap_err();
        assert!(matches!(err, PatchError::ComponentNotFound { .. }));
        let on_disk = fs::read_to_string(dir.path().join("components/Hero.tsx")).unwrap();
        assert_eq!(on_disk, HERO);
    }

    #[test]
    fn test_engine_rejects_escaping_path() {
        let (_dir, engine) = engine_with_hero();
        let err = engine.apply_text_edit("../Hero.tsx", "Hero", "x").unwrap_err();
        assert!(matches!(err, PatchError::InvalidPath(_)));
    }

    #[test]
    fn test_engine_missing_file() {
        let (_dir, engine) = engine_with_hero();
        let err = engine.apply_text_edit("components/Nope.tsx", "Hero", "x").unwrap_err();
        assert!(matches!(err, PatchError::Io(..)));
        assert!(!err.is_client_error());
    }

    #[test]
    fn test_engine_attribute_edit() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("Logo.jsx"), "export default () => <img src=\"/a.png\" />;\n").unwrap();
        let engine = PatchEngine::new(dir.path());
        let edit = AttributeEdit {
            attr_name: None,
            new_value: "/assets/b.png".to_string(),
            alt_value: None,
        };
        let result = engine.apply_attribute_edit("Logo.jsx", "Logo", &edit).unwrap();
        assert_eq!(result.updated_source, "export default () => <img src=\"/assets/b.png\" />;\n");
    }
}
