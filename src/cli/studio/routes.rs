//! Studio route handlers.
//!
//! Each handler computes a [`Reply`] from the request body so the logic can
//! be exercised without a socket.

use std::path::Path;

use anyhow::Result;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use tiny_http::Request;

use super::StudioState;
use crate::cli::common::{query_param, read_body, send_json};
use crate::locator::{EditKind, format_selection, is_editable_for};
use crate::logger::{status_error, status_success};
use crate::patch::{AttributeEdit, EditIntent};
use crate::studio::{AssetKind, EditError};

/// Status plus JSON body.
#[derive(Debug)]
pub(super) struct Reply {
    status: u16,
    body: Value,
}

impl Reply {
    fn ok(body: Value) -> Self {
        Self { status: 200, body }
    }

    fn error(status: u16, message: impl Into<String>) -> Self {
        Self { status, body: json!({ "ok": false, "error": message.into() }) }
    }

    fn edit_error(e: &EditError) -> Self {
        Self {
            status: e.status(),
            body: json!({ "ok": false, "error": e.to_string(), "stage": e.stage() }),
        }
    }

    fn send(self, request: Request) -> Result<()> {
        send_json(request, self.status, &self.body)
    }
}

fn parse_json<T: DeserializeOwned>(body: &[u8]) -> Result<T, Reply> {
    serde_json::from_slice(body).map_err(|e| Reply::error(400, format!("invalid JSON body: {e}")))
}

/// Read the body and run `handler` on it.
fn with_body(
    mut request: Request,
    state: &StudioState,
    handler: impl FnOnce(&[u8], &StudioState) -> Reply,
) -> Result<()> {
    let reply = match read_body(&mut request) {
        Ok(body) => handler(&body, state),
        Err(e) => Reply::error(400, e.to_string()),
    };
    reply.send(request)
}

// =============================================================================
// POST /api/patch
// =============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PatchBody {
    #[serde(default)]
    file: String,
    #[serde(default)]
    component_name: String,
    #[serde(default)]
    new_text: String,
    /// Alternative to `file` + `componentName`, resolved through the index.
    #[serde(default)]
    dom_path: Option<String>,
}

pub(super) fn patch(request: Request, state: &StudioState) -> Result<()> {
    with_body(request, state, patch_reply)
}

fn patch_reply(body: &[u8], state: &StudioState) -> Reply {
    let body: PatchBody = match parse_json(body) {
        Ok(body) => body,
        Err(reply) => return reply,
    };
    let has_target = !body.file.is_empty() && !body.component_name.is_empty();
    let dom_path = body.dom_path.filter(|p| !p.trim().is_empty());
    if body.new_text.is_empty() || (!has_target && dom_path.is_none()) {
        return Reply::error(400, "Missing required parameters: file, componentName, newText");
    }

    let intent = EditIntent::ReplaceText(body.new_text);
    let result = match dom_path {
        Some(dom_path) if !has_target => state
            .pipeline
            .apply_at(&state.index, &dom_path, intent)
            .map(|(locator, outcome)| (locator.file_path, locator.component_name, outcome)),
        _ => state
            .pipeline
            .apply(&body.file, &body.component_name, &intent)
            .map(|outcome| (body.file, body.component_name, outcome)),
    };

    match result {
        Ok((file, component, outcome)) => {
            status_success(&format!("{file} <{component}> {}", outcome.reply.message));
            Reply::ok(json!({ "ok": true, "appliedAt": outcome.patch.applied_at }))
        }
        Err(e) => {
            status_error(&format!("edit failed at {:?} stage", e.stage()), &e.to_string());
            Reply::edit_error(&e)
        }
    }
}

// =============================================================================
// POST /api/assets/apply
// =============================================================================

#[derive(Debug, Deserialize)]
struct AssetRef {
    url: String,
    kind: AssetKind,
    #[serde(default)]
    alt: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApplyAssetBody {
    #[serde(default)]
    file: String,
    #[serde(default)]
    component_name: Option<String>,
    #[serde(default)]
    target_attr: Option<String>,
    asset: Option<AssetRef>,
}

pub(super) fn apply_asset(request: Request, state: &StudioState) -> Result<()> {
    with_body(request, state, apply_asset_reply)
}

fn apply_asset_reply(body: &[u8], state: &StudioState) -> Reply {
    let body: ApplyAssetBody = match parse_json(body) {
        Ok(body) => body,
        Err(reply) => return reply,
    };
    let Some(asset) = body.asset.filter(|_| !body.file.is_empty()) else {
        return Reply::error(400, "Missing required parameters: file, asset");
    };

    // Without a component name the file's default export is edited.
    let component = body.component_name.filter(|c| !c.is_empty()).unwrap_or_else(|| {
        Path::new(&body.file)
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("default")
            .to_string()
    });

    let intent = EditIntent::ReplaceAttribute(AttributeEdit {
        attr_name: body.target_attr.filter(|a| !a.is_empty()),
        new_value: asset.url.clone(),
        alt_value: asset.alt.clone().filter(|a| !a.is_empty()),
    });

    match state.pipeline.apply(&body.file, &component, &intent) {
        Ok(outcome) => {
            status_success(&format!("{} <{}> now uses {}", body.file, component, asset.url));
            Reply::ok(json!({
                "ok": true,
                "message": "Asset applied",
                "appliedAt": outcome.patch.applied_at,
                "asset": { "url": asset.url, "kind": asset.kind },
            }))
        }
        Err(e) => {
            status_error("asset apply failed", &e.to_string());
            Reply::edit_error(&e)
        }
    }
}

// =============================================================================
// POST /api/locate
// =============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LocateBody {
    dom_path: String,
}

pub(super) fn locate(request: Request, state: &StudioState) -> Result<()> {
    with_body(request, state, locate_reply)
}

fn locate_reply(body: &[u8], state: &StudioState) -> Reply {
    let body: LocateBody = match parse_json(body) {
        Ok(body) => body,
        Err(reply) => return reply,
    };

    match state.index.resolve(&body.dom_path) {
        Ok(locator) => Reply::ok(json!({
            "ok": true,
            "summary": format_selection(Some(&locator)),
            "editable": {
                "text": is_editable_for(&locator, EditKind::Text),
                "image": is_editable_for(&locator, EditKind::Image),
            },
            "locator": locator,
        })),
        Err(e) => Reply { status: 404, body: json!({ "ok": false, "error": e.to_string(), "stage": "locate" }) },
    }
}

// =============================================================================
// /api/preview
// =============================================================================

pub(super) fn preview_status(request: Request, state: &StudioState) -> Result<()> {
    preview_status_reply(state).send(request)
}

fn preview_status_reply(state: &StudioState) -> Reply {
    let client = state.pipeline.client();
    match client.health() {
        Ok(health) if health.ok => Reply::ok(json!({
            "status": "online",
            "url": client.base_url(),
            "message": "Preview is online",
        })),
        Ok(_) => offline("health check failed".to_string()),
        Err(e) => offline(e.to_string()),
    }
}

fn offline(error: String) -> Reply {
    Reply {
        status: 503,
        body: json!({
            "status": "offline",
            "message": "Preview offline - start it with `vina preview`",
            "error": error,
        }),
    }
}

pub(super) fn preview_forward(request: Request, state: &StudioState) -> Result<()> {
    with_body(request, state, preview_forward_reply)
}

fn preview_forward_reply(body: &[u8], state: &StudioState) -> Reply {
    match state.pipeline.client().forward(body.to_vec()) {
        Ok((status, body)) => Reply { status, body },
        Err(e) => Reply {
            status: 502,
            body: json!({ "error": "Failed to communicate with preview", "message": e.to_string() }),
        },
    }
}

// =============================================================================
// /api/assets
// =============================================================================

pub(super) fn list_assets(request: Request, state: &StudioState) -> Result<()> {
    let reply = match state.assets.list() {
        Ok(assets) => Reply::ok(json!({ "ok": true, "assets": assets })),
        Err(e) => Reply::error(500, e.to_string()),
    };
    reply.send(request)
}

pub(super) fn upload_asset(request: Request, state: &StudioState) -> Result<()> {
    let name = query_param(&request, "name").unwrap_or_default();
    let alt = query_param(&request, "alt");
    with_body(request, state, |body, state| upload_reply(&name, alt, body, state))
}

fn upload_reply(name: &str, alt: Option<String>, body: &[u8], state: &StudioState) -> Reply {
    if name.is_empty() {
        return Reply::error(400, "Missing required query parameter: name");
    }
    match state.assets.store(name, body, alt) {
        Ok(asset) => {
            status_success(&format!("stored {}", asset.file_name));
            Reply::ok(json!({ "ok": true, "asset": asset }))
        }
        Err(e) => Reply::error(if e.is_client_error() { 400 } else { 500 }, e.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::locator::{LocatorEntry, LocatorIndex};
    use crate::patch::PatchEngine;
    use crate::studio::{AssetStore, EditPipeline, PreviewClient};
    use std::fs;
    use std::net::TcpListener;
    use std::time::Duration;
    use tempfile::TempDir;

    fn offline_state(dir: &TempDir) -> StudioState {
        let port = TcpListener::bind("127.0.0.1:0").unwrap().local_addr().unwrap().port();
        state_for(dir, &format!("http://127.0.0.1:{port}"))
    }

    /// State whose preview accepts exactly one update.
    fn online_state(dir: &TempDir) -> (StudioState, std::thread::JoinHandle<()>) {
        let server = tiny_http::Server::http("127.0.0.1:0").unwrap();
        let addr = server.server_addr().to_ip().unwrap();
        let handle = std::thread::spawn(move || {
            let request = server.recv().unwrap();
            let reply = r#"{"success":true,"message":"File Hero.tsx updated successfully"}"#;
            request.respond(tiny_http::Response::from_string(reply)).unwrap();
        });
        (state_for(dir, &format!("http://{addr}")), handle)
    }

    fn state_for(dir: &TempDir, preview_url: &str) -> StudioState {
        let client = PreviewClient::new(preview_url, Duration::from_secs(2)).unwrap();
        let mut index = LocatorIndex::new();
        index.insert(
            "main > section.hero",
            LocatorEntry {
                file: "components/Hero.tsx".into(),
                component: "Hero".into(),
                line: Some(2),
                col: Some(10),
                target_attr: None,
                element_type: Some("section".into()),
            },
        );
        StudioState {
            pipeline: EditPipeline::new(PatchEngine::new(dir.path()), client),
            assets: AssetStore::new(dir.path().join("assets"), "/assets"),
            index,
        }
    }

    #[test]
    fn test_patch_missing_params() {
        let dir = TempDir::new().unwrap();
        let reply = patch_reply(br#"{"file":"Hero.tsx","componentName":"Hero"}"#, &offline_state(&dir));
        assert_eq!(reply.status, 400);
        assert_eq!(reply.body["ok"], false);
    }

    #[test]
    fn test_patch_unknown_component() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("Hero.tsx"), "function Hero(){ return <h1>Old</h1> }").unwrap();
        let body = br#"{"file":"Hero.tsx","componentName":"Nope","newText":"New"}"#;
        let reply = patch_reply(body, &offline_state(&dir));
        assert_eq!(reply.status, 422);
        assert_eq!(reply.body["stage"], "patch");
    }

    #[test]
    fn test_patch_reports_applied_at() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("Hero.tsx"), "function Hero(){ return <h1>Old</h1> }").unwrap();
        let (state, preview) = online_state(&dir);

        let body = br#"{"file":"Hero.tsx","componentName":"Hero","newText":"New"}"#;
        let reply = patch_reply(body, &state);
        preview.join().unwrap();

        assert_eq!(reply.status, 200);
        assert_eq!(reply.body["ok"], true);
        assert!(reply.body["appliedAt"].as_u64().unwrap() > 0);
    }

    #[test]
    fn test_patch_by_dom_path_unknown() {
        let dir = TempDir::new().unwrap();
        let reply = patch_reply(br#"{"domPath":"footer > p","newText":"x"}"#, &offline_state(&dir));
        assert_eq!(reply.status, 404);
        assert_eq!(reply.body["stage"], "locate");
    }

    #[test]
    fn test_apply_asset_requires_asset() {
        let dir = TempDir::new().unwrap();
        let reply = apply_asset_reply(br#"{"file":"Hero.tsx"}"#, &offline_state(&dir));
        assert_eq!(reply.status, 400);
    }

    #[test]
    fn test_locate_reports_editable_flags() {
        let dir = TempDir::new().unwrap();
        let reply = locate_reply(br#"{"domPath":"main > section.hero > img"}"#, &offline_state(&dir));
        assert_eq!(reply.status, 200);
        assert_eq!(reply.body["locator"]["componentName"], "Hero");
        assert_eq!(reply.body["locator"]["targetAttribute"], "src");
        assert_eq!(reply.body["editable"]["text"], false);
        assert_eq!(reply.body["editable"]["image"], true);

        let missing = locate_reply(br#"{"domPath":"footer"}"#, &offline_state(&dir));
        assert_eq!(missing.status, 404);
    }

    #[test]
    fn test_preview_status_offline() {
        let dir = TempDir::new().unwrap();
        let reply = preview_status_reply(&offline_state(&dir));
        assert_eq!(reply.status, 503);
        assert_eq!(reply.body["status"], "offline");
    }

    #[test]
    fn test_upload_and_list() {
        let dir = TempDir::new().unwrap();
        let state = offline_state(&dir);

        assert_eq!(upload_reply("", None, b"x", &state).status, 400);

        let reply = upload_reply("logo.png", Some("Logo".into()), b"png", &state);
        assert_eq!(reply.status, 200);
        assert_eq!(reply.body["asset"]["kind"], "image");
        assert_eq!(reply.body["asset"]["alt"], "Logo");

        let listed = state.assets.list().unwrap();
        assert_eq!(listed.len(), 1);
    }
}
