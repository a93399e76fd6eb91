//! DOM path -> source mapping table.

use std::fs;
use std::path::Path;

use rustc_hash::FxHashMap;
use serde::Deserialize;

use super::dom::{DomTree, SEPARATOR, last_segment_tag, normalize_dom_path};
use super::{LocatorError, SourceLocator};
use crate::config::{LocatorConfig, VinaConfig};
use crate::debug;
use crate::utils::date::unix_millis;

/// One mapping, as registered from instrumentation.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocatorEntry {
    pub file: String,
    pub component: String,
    #[serde(default)]
    pub line: Option<u32>,
    #[serde(default)]
    pub col: Option<u32>,
    #[serde(default)]
    pub target_attr: Option<String>,
    #[serde(default)]
    pub element_type: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ManifestEntry {
    #[serde(rename = "domPath")]
    dom_path: String,
    #[serde(flatten)]
    entry: LocatorEntry,
}

#[derive(Debug, Deserialize)]
struct Manifest {
    entries: Vec<ManifestEntry>,
}

#[derive(Debug, Default)]
pub struct LocatorIndex {
    entries: FxHashMap<String, LocatorEntry>,
}

impl LocatorIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the index from the configured manifest and markup snapshots.
    ///
    /// A missing manifest is skipped; a malformed one is an error.
    pub fn from_config(config: &VinaConfig) -> Result<Self, LocatorError> {
        let mut index = Self::new();

        let manifest = config.manifest_path();
        if manifest.exists() {
            let count = index.load_manifest(&manifest)?;
            debug!("locator"; "{} entries from {}", count, manifest.display());
        } else {
            debug!("locator"; "no manifest at {}", manifest.display());
        }

        for path in config.markup_paths() {
            index.load_markup(&path, &config.locator)?;
        }

        Ok(index)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Register `entry` under `dom_path`. Later registrations win.
    pub fn insert(&mut self, dom_path: &str, entry: LocatorEntry) {
        self.entries.insert(normalize_dom_path(dom_path), entry);
    }

    /// Load a JSON manifest (`{"entries": [...]}`). Returns the entry count.
    pub fn load_manifest(&mut self, path: &Path) -> Result<usize, LocatorError> {
        let content = fs::read_to_string(path).map_err(|e| LocatorError::Io(path.to_path_buf(), e))?;
        let manifest: Manifest =
            serde_json::from_str(&content).map_err(|e| LocatorError::Manifest(path.to_path_buf(), e))?;

        let count = manifest.entries.len();
        for ManifestEntry { dom_path, entry } in manifest.entries {
            self.insert(&dom_path, entry);
        }
        Ok(count)
    }

    pub fn load_markup(&mut self, path: &Path, attrs: &LocatorConfig) -> Result<usize, LocatorError> {
        let html = fs::read_to_string(path).map_err(|e| LocatorError::Io(path.to_path_buf(), e))?;
        let count = self.index_markup(&html, attrs)?;
        debug!("locator"; "{} instrumented elements in {}", count, path.display());
        Ok(count)
    }

    /// Register every element carrying file and component attributes.
    pub fn index_markup(&mut self, html: &str, attrs: &LocatorConfig) -> Result<usize, LocatorError> {
        let tree = DomTree::parse(html)?;
        let mut count = 0;

        for (idx, element) in tree.iter() {
            let (Some(file), Some(component)) =
                (element.attr(&attrs.file_attr), element.attr(&attrs.component_attr))
            else {
                continue;
            };
            let entry = LocatorEntry {
                file: file.to_string(),
                component: component.to_string(),
                line: element.attr(&attrs.line_attr).and_then(|v| v.parse().ok()),
                col: element.attr(&attrs.col_attr).and_then(|v| v.parse().ok()),
                target_attr: element.target_attr_hint().map(str::to_string),
                element_type: Some(element.tag.clone()),
            };
            self.insert(&tree.compute_path(idx), entry);
            count += 1;
        }

        Ok(count)
    }

    /// Resolve `dom_path`, falling back to successively shorter ancestors.
    pub fn resolve(&self, dom_path: &str) -> Result<SourceLocator, LocatorError> {
        let normalized = normalize_dom_path(dom_path);
        let mut candidate = normalized.as_str();

        loop {
            if let Some(entry) = self.entries.get(candidate) {
                let exact = candidate.len() == normalized.len();
                return Ok(Self::locator_for(entry, &normalized, exact));
            }
            match candidate.rfind(SEPARATOR) {
                Some(cut) => candidate = &candidate[..cut],
                None => return Err(LocatorError::NotFound(dom_path.to_string())),
            }
        }
    }

    fn locator_for(entry: &LocatorEntry, dom_path: &str, exact: bool) -> SourceLocator {
        // Element details of an ancestor entry describe the ancestor, not the click.
        let element_type = if exact {
            entry.element_type.clone().or_else(|| last_segment_tag(dom_path))
        } else {
            last_segment_tag(dom_path)
        };
        let hinted = if exact { entry.target_attr.clone() } else { None };
        let target_attribute = hinted.or_else(|| (element_type.as_deref() == Some("img")).then(|| "src".to_string()));

        SourceLocator {
            file_path: entry.file.clone(),
            component_name: entry.component.clone(),
            target_attribute,
            dom_path: (!dom_path.is_empty()).then(|| dom_path.to_string()),
            element_type,
            line: entry.line.unwrap_or(0),
            col: entry.col.unwrap_or(0),
            captured_at: unix_millis(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn entry(file: &str, component: &str) -> LocatorEntry {
        LocatorEntry {
            file: file.to_string(),
            component: component.to_string(),
            line: None,
            col: None,
            target_attr: None,
            element_type: None,
        }
    }

    #[test]
    fn test_resolve_exact() {
        let mut index = LocatorIndex::new();
        index.insert("main > section.hero > h1", entry("components/Hero.tsx", "Hero"));

        let loc = index.resolve("main>section.hero >h1").unwrap();
        assert_eq!(loc.file_path, "components/Hero.tsx");
        assert_eq!(loc.component_name, "Hero");
        assert_eq!(loc.element_type.as_deref(), Some("h1"));
        assert_eq!(loc.dom_path.as_deref(), Some("main > section.hero > h1"));
        assert!(loc.captured_at > 0);
    }

    #[test]
    fn test_resolve_ancestor_prefix() {
        let mut index = LocatorIndex::new();
        index.insert("main > section.hero", entry("components/Hero.tsx", "Hero"));

        let loc = index.resolve("main > section.hero > div > img#logo").unwrap();
        assert_eq!(loc.component_name, "Hero");
        assert_eq!(loc.element_type.as_deref(), Some("img"));
        assert_eq!(loc.target_attribute.as_deref(), Some("src"));
    }

    #[test]
    fn test_resolve_not_found() {
        let mut index = LocatorIndex::new();
        index.insert("footer", entry("Footer.tsx", "Footer"));
        let err = index.resolve("main > h1").unwrap_err();
        assert!(matches!(err, LocatorError::NotFound(_)));
    }

    #[test]
    fn test_load_manifest() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("locators.json");
        fs::write(
            &path,
            r#"{"entries":[
                {"domPath":"main > header","file":"Header.tsx","component":"Header","line":3,"col":5},
                {"domPath":"main > header > img","file":"Header.tsx","component":"Logo","targetAttr":"logo"}
            ]}"#,
        )
        .unwrap();

        let mut index = LocatorIndex::new();
        assert_eq!(index.load_manifest(&path).unwrap(), 2);

        let header = index.resolve("main > header > nav").unwrap();
        assert_eq!((header.line, header.col), (3, 5));

        let logo = index.resolve("main > header > img").unwrap();
        assert_eq!(logo.component_name, "Logo");
        assert_eq!(logo.target_attribute.as_deref(), Some("logo"));
    }

    #[test]
    fn test_load_manifest_malformed() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("locators.json");
        fs::write(&path, "{\"entries\": 3}").unwrap();
        let err = LocatorIndex::new().load_manifest(&path).unwrap_err();
        assert!(matches!(err, LocatorError::Manifest(..)));
    }

    #[test]
    fn test_index_markup() {
        let html = r#"<body><main>
            <section class="hero" data-vina-file="components/Hero.tsx" data-vina-component="Hero" data-vina-line="4">
              <h1>Title</h1>
              <img src="/a.png" data-vina-file="components/Hero.tsx" data-vina-component="HeroImage">
            </section>
        </main></body>"#;

        let mut index = LocatorIndex::new();
        let count = index.index_markup(html, &LocatorConfig::default()).unwrap();
        assert_eq!(count, 2);

        let title = index.resolve("main > section.hero > h1").unwrap();
        assert_eq!(title.component_name, "Hero");
        assert_eq!(title.line, 4);

        let image = index.resolve("main > section.hero > img").unwrap();
        assert_eq!(image.component_name, "HeroImage");
        assert_eq!(image.target_attribute.as_deref(), Some("src"));
    }
}
