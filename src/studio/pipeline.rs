//! Locate -> patch -> deliver.

use serde::Serialize;
use thiserror::Error;

use super::client::{PreviewClient, PreviewReply, TransportError};
use crate::locator::{LocatorError, LocatorIndex, SourceLocator};
use crate::patch::{EditIntent, PatchEngine, PatchError, PatchResult};

/// Stage an edit failed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    Locate,
    Patch,
    Deliver,
}

#[derive(Debug, Error)]
pub enum EditError {
    #[error(transparent)]
    Locate(#[from] LocatorError),

    #[error(transparent)]
    Patch(#[from] PatchError),

    #[error(transparent)]
    Deliver(#[from] TransportError),
}

impl EditError {
    pub const fn stage(&self) -> Stage {
        match self {
            Self::Locate(_) => Stage::Locate,
            Self::Patch(_) => Stage::Patch,
            Self::Deliver(_) => Stage::Deliver,
        }
    }

    /// HTTP status reported at the request boundary.
    pub fn status(&self) -> u16 {
        match self {
            Self::Locate(LocatorError::NotFound(_)) => 404,
            Self::Locate(_) => 500,
            Self::Patch(PatchError::Io(_, e)) if e.kind() == std::io::ErrorKind::NotFound => 404,
            Self::Patch(e) if e.is_client_error() => 422,
            Self::Patch(_) => 500,
            Self::Deliver(TransportError::Unreachable { .. }) => 502,
            Self::Deliver(TransportError::Rejected { .. }) => 502,
        }
    }
}

/// A delivered edit.
#[derive(Debug, Clone)]
pub struct EditOutcome {
    pub patch: PatchResult,
    pub reply: PreviewReply,
}

/// Drives one edit through the patch engine and into the preview.
pub struct EditPipeline {
    engine: PatchEngine,
    client: PreviewClient,
}

impl EditPipeline {
    pub fn new(engine: PatchEngine, client: PreviewClient) -> Self {
        Self { engine, client }
    }

    pub fn client(&self) -> &PreviewClient {
        &self.client
    }

    /// Patch `component` in `file_path` and push the whole file to the preview.
    ///
    /// Nothing is delivered when patching fails.
    pub fn apply(
        &self,
        file_path: &str,
        component: &str,
        intent: &EditIntent,
    ) -> Result<EditOutcome, EditError> {
        let patch = self.engine.apply(file_path, component, intent)?;
        let reply = self.client.push_file(file_path, &patch.updated_source)?;
        Ok(EditOutcome { patch, reply })
    }

    /// Resolve `dom_path` first, then apply as [`apply`](Self::apply).
    ///
    /// An attribute edit without an explicit name targets the attribute hinted
    /// by the locator.
    pub fn apply_at(
        &self,
        index: &LocatorIndex,
        dom_path: &str,
        intent: EditIntent,
    ) -> Result<(SourceLocator, EditOutcome), EditError> {
        let locator = index.resolve(dom_path)?;
        let intent = match intent {
            EditIntent::ReplaceAttribute(mut edit) if edit.attr_name.is_none() => {
                edit.attr_name = locator.target_attribute.clone();
                EditIntent::ReplaceAttribute(edit)
            }
            other => other,
        };
        let outcome = self.apply(&locator.file_path, &locator.component_name, &intent)?;
        Ok((locator, outcome))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::locator::LocatorEntry;
    use std::fs;
    use std::net::TcpListener;
    use std::time::Duration;
    use tempfile::TempDir;

    fn offline_pipeline(dir: &TempDir) -> EditPipeline {
        let port = TcpListener::bind("127.0.0.1:0").unwrap().local_addr().unwrap().port();
        let client = PreviewClient::new(&format!("http://127.0.0.1:{port}"), Duration::from_secs(2)).unwrap();
        EditPipeline::new(PatchEngine::new(dir.path()), client)
    }

    #[test]
    fn test_patch_failure_reported_at_patch_stage() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("Hero.tsx"), "function Hero(){ return <h1>Old</h1> }").unwrap();
        let pipeline = offline_pipeline(&dir);

        let err = pipeline
            .apply("Hero.tsx", "Missing", &EditIntent::ReplaceText("New".into()))
            .unwrap_err();
        assert_eq!(err.stage(), Stage::Patch);
        assert_eq!(err.status(), 422);
    }

    #[test]
    fn test_offline_preview_reported_at_deliver_stage() {
        let dir = TempDir::new().unwrap();
        let source = "function Hero(){ return <h1>Old</h1> }";
        fs::write(dir.path().join("Hero.tsx"), source).unwrap();
        let pipeline = offline_pipeline(&dir);

        let err = pipeline
            .apply("Hero.tsx", "Hero", &EditIntent::ReplaceText("New".into()))
            .unwrap_err();
        assert_eq!(err.stage(), Stage::Deliver);
        assert_eq!(err.status(), 502);
        // The studio never writes; the preview owns the file.
        assert_eq!(fs::read_to_string(dir.path().join("Hero.tsx")).unwrap(), source);
    }

    #[test]
    fn test_unknown_dom_path_reported_at_locate_stage() {
        let dir = TempDir::new().unwrap();
        let pipeline = offline_pipeline(&dir);
        let mut index = LocatorIndex::new();
        index.insert(
            "footer",
            LocatorEntry {
                file: "Footer.tsx".into(),
                component: "Footer".into(),
                line: None,
                col: None,
                target_attr: None,
                element_type: None,
            },
        );

        let err = pipeline
            .apply_at(&index, "main > h1", EditIntent::ReplaceText("x".into()))
            .unwrap_err();
        assert_eq!(err.stage(), Stage::Locate);
        assert_eq!(err.status(), 404);
    }
}
