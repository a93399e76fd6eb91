//! Asset storage: unique naming, upload and listing.
//!
//! Stored names look like `hero-banner-1700000000123-a1b2c3.png`: a slug of
//! the original name, the upload time in unix milliseconds (13 digits) and
//! six hex characters of a content hash. Listings sort by that timestamp.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::VinaConfig;
use crate::utils::date::unix_millis;

const FALLBACK_STEM: &str = "asset";

#[derive(Debug, Error)]
pub enum AssetError {
    #[error("unsupported asset type `{0}` (use jpg, jpeg, png, webp, gif, bmp or svg)")]
    Unsupported(String),

    #[error("empty upload")]
    Empty,

    #[error("asset i/o failed at `{}`", .0.display())]
    Io(PathBuf, #[source] std::io::Error),
}

impl AssetError {
    pub const fn is_client_error(&self) -> bool {
        !matches!(self, Self::Io(..))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssetKind {
    Image,
    Svg,
}

impl AssetKind {
    /// Kind by file extension (case-insensitive).
    pub fn detect(file_name: &str) -> Option<Self> {
        let ext = Path::new(file_name).extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "svg" => Some(Self::Svg),
            "jpg" | "jpeg" | "png" | "webp" | "gif" | "bmp" => Some(Self::Image),
            _ => None,
        }
    }
}

/// A freshly stored asset.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredAsset {
    pub url: String,
    pub kind: AssetKind,
    pub file_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alt: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub view_box: Option<String>,
}

/// One entry of an asset listing.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListedAsset {
    pub url: String,
    pub kind: AssetKind,
    pub file_name: String,
    pub created_at: Option<u64>,
}

fn timestamp_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"-([0-9]{13})-[a-z0-9]{6}\.").expect("valid regex"))
}

fn view_box_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r#"viewBox=["']([^"']+)["']"#).expect("valid regex"))
}

/// Lowercase ASCII slug of a file stem.
fn slugify(stem: &str) -> String {
    let ascii = deunicode::deunicode(stem).to_ascii_lowercase();
    let slug = ascii
        .split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("-");
    if slug.is_empty() { FALLBACK_STEM.to_string() } else { slug }
}

/// `<slug>-<unix ms>-<6 hex>.<ext>` for an upload called `original`.
pub fn unique_name(original: &str, content: &[u8], now_ms: u64) -> Option<String> {
    let path = Path::new(original);
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    let stem = path.file_stem().and_then(|s| s.to_str()).unwrap_or(FALLBACK_STEM);

    let mut hasher = blake3::Hasher::new();
    hasher.update(content);
    hasher.update(&now_ms.to_le_bytes());
    let digest = hex::encode(&hasher.finalize().as_bytes()[..3]);

    Some(format!("{}-{:013}-{}.{}", slugify(stem), now_ms, digest, ext))
}

/// Upload time embedded in a generated name.
pub fn timestamp_of(file_name: &str) -> Option<u64> {
    timestamp_regex()
        .captures(file_name)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

pub fn extract_view_box(svg: &str) -> Option<String> {
    view_box_regex()
        .captures(svg)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

/// Asset directory plus the URL prefix it is served under.
#[derive(Debug, Clone)]
pub struct AssetStore {
    dir: PathBuf,
    url_prefix: String,
}

impl AssetStore {
    pub fn new(dir: impl Into<PathBuf>, url_prefix: impl Into<String>) -> Self {
        Self { dir: dir.into(), url_prefix: url_prefix.into() }
    }

    pub fn from_config(config: &VinaConfig) -> Self {
        Self::new(config.assets_root(), config.studio.assets_url_prefix.clone())
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn url_for(&self, file_name: &str) -> String {
        format!("{}/{}", self.url_prefix.trim_end_matches('/'), file_name)
    }

    /// Store `content` uploaded as `original_name` under a unique name.
    pub fn store(
        &self,
        original_name: &str,
        content: &[u8],
        alt: Option<String>,
    ) -> Result<StoredAsset, AssetError> {
        let kind = AssetKind::detect(original_name)
            .ok_or_else(|| AssetError::Unsupported(original_name.to_string()))?;
        if content.is_empty() {
            return Err(AssetError::Empty);
        }
        let file_name = unique_name(original_name, content, unix_millis())
            .ok_or_else(|| AssetError::Unsupported(original_name.to_string()))?;

        fs::create_dir_all(&self.dir).map_err(|e| AssetError::Io(self.dir.clone(), e))?;
        let target = self.dir.join(&file_name);
        fs::write(&target, content).map_err(|e| AssetError::Io(target.clone(), e))?;

        let view_box = match kind {
            AssetKind::Svg => extract_view_box(&String::from_utf8_lossy(content)),
            AssetKind::Image => None,
        };

        Ok(StoredAsset {
            url: self.url_for(&file_name),
            kind,
            file_name,
            alt: alt.filter(|a| !a.is_empty()),
            view_box,
        })
    }

    /// Known assets, newest first; names without a timestamp sort last by name.
    pub fn list(&self) -> Result<Vec<ListedAsset>, AssetError> {
        let entries = match fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(AssetError::Io(self.dir.clone(), e)),
        };

        let mut assets: Vec<ListedAsset> = entries
            .filter_map(Result::ok)
            .filter(|entry| entry.path().is_file())
            .filter_map(|entry| {
                let file_name = entry.file_name().to_str()?.to_string();
                let kind = AssetKind::detect(&file_name)?;
                Some(ListedAsset {
                    url: self.url_for(&file_name),
                    kind,
                    created_at: timestamp_of(&file_name),
                    file_name,
                })
            })
            .collect();

        assets.sort_by(|a, b| match (a.created_at, b.created_at) {
            (Some(x), Some(y)) => y.cmp(&x),
            (Some(_), None) => std::cmp::Ordering::Less,
            (None, Some(_)) => std::cmp::Ordering::Greater,
            (None, None) => a.file_name.cmp(&b.file_name),
        });
        Ok(assets)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_detect_kind() {
        assert_eq!(AssetKind::detect("a.PNG"), Some(AssetKind::Image));
        assert_eq!(AssetKind::detect("logo.svg"), Some(AssetKind::Svg));
        assert_eq!(AssetKind::detect("doc.pdf"), None);
        assert_eq!(AssetKind::detect("noext"), None);
    }

    #[test]
    fn test_unique_name_shape() {
        let name = unique_name("Héro Banner!.JPG", b"data", 1_700_000_000_123).unwrap();
        assert!(name.starts_with("hero-banner-1700000000123-"), "{name}");
        assert!(name.ends_with(".jpg"));
        assert_eq!(timestamp_of(&name), Some(1_700_000_000_123));
    }

    #[test]
    fn test_unique_name_differs_by_content() {
        let a = unique_name("a.png", b"one", 1).unwrap();
        let b = unique_name("a.png", b"two", 1).unwrap();
        assert_ne!(a, b);
        assert!(unique_name("???.png", b"x", 1).unwrap().starts_with("asset-0000000000001-"));
    }

    #[test]
    fn test_view_box() {
        let svg = r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox='0 0 24 24'></svg>"#;
        assert_eq!(extract_view_box(svg).as_deref(), Some("0 0 24 24"));
        assert_eq!(extract_view_box("<svg/>"), None);
    }

    #[test]
    fn test_store_and_list_newest_first() {
        let dir = TempDir::new().unwrap();
        let store = AssetStore::new(dir.path().join("assets"), "/assets/");

        assert!(store.list().unwrap().is_empty());

        fs::create_dir_all(store.dir()).unwrap();
        fs::write(store.dir().join("old-1600000000000-aaaaaa.png"), "x").unwrap();
        fs::write(store.dir().join("manual.gif"), "x").unwrap();
        fs::write(store.dir().join("notes.txt"), "x").unwrap();

        let stored = store
            .store("logo.svg", br#"<svg viewBox="0 0 10 10"/>"#, Some("Logo".into()))
            .unwrap();
        assert_eq!(stored.kind, AssetKind::Svg);
        assert_eq!(stored.view_box.as_deref(), Some("0 0 10 10"));
        assert!(stored.url.starts_with("/assets/logo-"));

        let names: Vec<String> = store.list().unwrap().into_iter().map(|a| a.file_name).collect();
        assert_eq!(names, vec![stored.file_name.clone(), "old-1600000000000-aaaaaa.png".into(), "manual.gif".into()]);
    }

    #[test]
    fn test_store_rejects_bad_input() {
        let dir = TempDir::new().unwrap();
        let store = AssetStore::new(dir.path(), "/assets");
        assert!(matches!(store.store("a.exe", b"x", None), Err(AssetError::Unsupported(_))));
        assert!(matches!(store.store("a.png", b"", None), Err(AssetError::Empty)));
    }
}
