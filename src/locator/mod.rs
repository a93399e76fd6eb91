//! Selection resolver: rendered DOM path -> source locator.
//!
//! Mapping entries come from build instrumentation (a JSON manifest) and
//! from rendered-markup snapshots whose elements carry `data-vina-*`
//! attributes. Lookup tries the exact path, then each ancestor prefix.

mod dom;
mod error;
mod index;

pub use error::LocatorError;
#[cfg(test)]
pub use index::LocatorEntry;
pub use index::LocatorIndex;

use serde::{Deserialize, Serialize};

/// Where a clicked element comes from.
///
/// `component_name` is authoritative for node lookup; `line`/`col` are hints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceLocator {
    /// Relative to the preview source root.
    pub file_path: String,
    pub component_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_attribute: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dom_path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub element_type: Option<String>,
    #[serde(default)]
    pub line: u32,
    #[serde(default)]
    pub col: u32,
    /// Unix milliseconds.
    #[serde(default)]
    pub captured_at: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditKind {
    Text,
    Image,
}

/// Elements that cannot hold text content.
pub const VOID_ELEMENTS: &[&str] = &[
    "img", "input", "br", "hr", "meta", "link", "source", "area", "col", "embed", "track", "wbr",
];

/// Elements offered for image edits.
pub const IMAGE_ELEMENTS: &[&str] = &["img", "div", "section", "header", "main", "aside"];

/// Attributes offered for image edits.
pub const IMAGE_ATTRS: &[&str] = &["src", "image", "imageSrc", "icon", "logo", "href"];

/// Whether the selection supports the given kind of edit.
pub fn is_editable_for(locator: &SourceLocator, kind: EditKind) -> bool {
    let element = locator.element_type.as_deref();
    match kind {
        EditKind::Text => !element.is_some_and(|e| VOID_ELEMENTS.contains(&e)),
        EditKind::Image => {
            element.is_some_and(|e| IMAGE_ELEMENTS.contains(&e))
                || locator
                    .target_attribute
                    .as_deref()
                    .is_some_and(|a| IMAGE_ATTRS.contains(&a))
        }
    }
}

/// One-line human summary: `Component: Hero • File: Hero.tsx • Element: <img> • Attribute: src`.
pub fn format_selection(locator: Option<&SourceLocator>) -> String {
    let Some(locator) = locator else {
        return "No element selected".to_string();
    };

    let mut parts = vec![
        format!("Component: {}", locator.component_name),
        format!("File: {}", locator.file_path),
    ];
    if let Some(element) = &locator.element_type {
        parts.push(format!("Element: <{element}>"));
    }
    if let Some(attr) = &locator.target_attribute {
        parts.push(format!("Attribute: {attr}"));
    }
    parts.join(" • ")
}
