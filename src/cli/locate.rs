//! `vina locate`: resolve a DOM path against the configured mapping.

use std::path::PathBuf;

use anyhow::Result;

use crate::config::VinaConfig;
use crate::locator::{EditKind, LocatorIndex, SourceLocator, format_selection, is_editable_for};
use crate::{debug, log};

/// Index from config plus any extra markup snapshots.
fn build_index(config: &VinaConfig, markup: &[PathBuf]) -> Result<LocatorIndex> {
    let mut index = LocatorIndex::from_config(config)?;
    for path in markup {
        let added = index.load_markup(path, &config.locator)?;
        debug!("locate"; "{} entries from {}", added, path.display());
    }
    Ok(index)
}

fn edit_kinds(locator: &SourceLocator) -> Vec<&'static str> {
    let mut kinds = Vec::new();
    if is_editable_for(locator, EditKind::Text) {
        kinds.push("text");
    }
    if is_editable_for(locator, EditKind::Image) {
        kinds.push("image");
    }
    kinds
}

pub fn run_locate(dom_path: &str, markup: &[PathBuf], config: &VinaConfig) -> Result<()> {
    let index = build_index(config, markup)?;
    if index.is_empty() {
        log!("locate"; "no mapping entries (check [locator] manifest and markup)");
    }

    let locator = index.resolve(dom_path)?;
    println!("{}", serde_json::to_string_pretty(&locator)?);
    log!("locate"; "{}", format_selection(Some(&locator)));
    log!("locate"; "editable: {}", edit_kinds(&locator).join(", "));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_build_index_with_extra_markup() {
        let dir = TempDir::new().unwrap();
        let mut config = VinaConfig::default();
        config.set_root(dir.path());

        let html = dir.path().join("snapshot.html");
        fs::write(
            &html,
            r#"<html><body><main><h1 data-vina-file="Hero.tsx" data-vina-component="Hero">Hi</h1></main></body></html>"#,
        )
        .unwrap();

        let index = build_index(&config, &[html]).unwrap();
        let locator = index.resolve("main > h1").unwrap();
        assert_eq!(locator.component_name, "Hero");
        assert_eq!(edit_kinds(&locator), vec!["text"]);
    }
}
