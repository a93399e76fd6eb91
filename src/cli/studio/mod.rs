//! Studio server: the HTTP surface of the editing pipeline.
//!
//! ```text
//! POST /api/patch          -> text edit, pushed to the preview
//! POST /api/assets/apply   -> attribute edit with an asset url (+ alt)
//! POST /api/locate         -> dom path -> source locator
//! GET  /api/preview        -> preview online/offline
//! POST /api/preview        -> raw update body forwarded to the preview
//! GET  /api/assets/list    -> stored assets, newest first
//! POST /api/assets/upload  -> raw body stored as ?name= (+ ?alt=)
//! ```

mod routes;

use std::sync::Arc;

use anyhow::Result;
use tiny_http::{Method, Request};

use crate::cli::common::{bind_with_retry, run_request_loop, send_json, send_preflight, send_unavailable, url_path};
use crate::config::cfg;
use crate::locator::LocatorIndex;
use crate::patch::PatchEngine;
use crate::studio::{AssetStore, EditPipeline, PreviewClient};
use crate::{debug, log};

/// Shared by all request workers.
struct StudioState {
    pipeline: EditPipeline,
    assets: AssetStore,
    index: LocatorIndex,
}

/// Bind and serve until Ctrl+C.
pub fn serve() -> Result<()> {
    let config = cfg();
    let index = LocatorIndex::from_config(&config)?;
    debug!("studio"; "{} locator entries", index.len());

    let client = PreviewClient::from_config(&config.studio)?;
    let state = StudioState {
        pipeline: EditPipeline::new(PatchEngine::new(config.source_root()), client),
        assets: AssetStore::from_config(&config),
        index,
    };

    let (server, addr) = bind_with_retry(config.studio.interface, config.studio.port)?;
    let server = Arc::new(server);
    crate::core::register_server(Arc::clone(&server), None);

    log!("studio"; "http://{}", addr);
    log!("studio"; "preview at {}", state.pipeline.client().base_url());

    run_request_loop(&server, move |request| handle_request(request, &state))
}

fn handle_request(request: Request, state: &StudioState) -> Result<()> {
    if crate::core::is_shutdown() {
        return send_unavailable(request);
    }

    let method = request.method().clone();
    let path = url_path(&request).to_string();

    match (method, path.as_str()) {
        (Method::Options, _) => send_preflight(request),
        (Method::Post, "/api/patch") => routes::patch(request, state),
        (Method::Post, "/api/assets/apply") => routes::apply_asset(request, state),
        (Method::Post, "/api/locate") => routes::locate(request, state),
        (Method::Get, "/api/preview") => routes::preview_status(request, state),
        (Method::Post, "/api/preview") => routes::preview_forward(request, state),
        (Method::Get, "/api/assets/list") => routes::list_assets(request, state),
        (Method::Post, "/api/assets/upload") => routes::upload_asset(request, state),
        _ => send_json(request, 404, &serde_json::json!({ "ok": false, "error": "not found" })),
    }
}
