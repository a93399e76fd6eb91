//! HTTP response handlers for the preview process.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;
use serde_json::json;
use tiny_http::Request;

use super::content::maybe_inject_client;
use crate::actor::UpdateHandle;
use crate::cli::common::{Job, is_head, read_body, send_body, send_head, send_json, send_text};
use crate::logger::{status_error, status_success};
use crate::reload::{UpdateError, UpdateOutcome, UpdateRequest};
use crate::utils::date::now_rfc3339;
use crate::utils::mime::types::{HTML, JAVASCRIPT, PLAIN};

/// Body of `POST /api/update` responses.
#[derive(Debug, Serialize)]
struct UpdateResponse {
    success: bool,
    message: String,
}

/// Respond with a static file, injecting the preview client into HTML.
pub fn respond_file(request: Request, path: &Path) -> Result<()> {
    let content_type = crate::utils::mime::from_path(path);

    if is_head(&request) {
        return send_head(request, 200, content_type);
    }

    let body = fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
    let body = maybe_inject_client(body, content_type);
    send_body(request, 200, content_type, body)
}

/// Respond with 404 page (custom `404.html` in the served directory, or plain text).
pub fn respond_not_found(request: Request, serve_root: &Path) -> Result<()> {
    let custom_404 = serve_root.join("404.html");
    let has_custom = custom_404.is_file();

    if is_head(&request) {
        return send_head(request, 404, if has_custom { HTML } else { PLAIN });
    }

    if has_custom && let Ok(body) = fs::read(&custom_404) {
        return send_body(request, 404, HTML, maybe_inject_client(body, HTML));
    }

    send_text(request, 404, "404 Not Found")
}

pub fn respond_client_js(request: Request, ws_port: u16) -> Result<()> {
    use crate::embed::preview::{CLIENT_JS, ClientVars};

    let body = CLIENT_JS.render(&ClientVars { ws_port });
    send_body(request, 200, JAVASCRIPT, body.into_bytes())
}

pub fn respond_health(request: Request) -> Result<()> {
    send_json(request, 200, &json!({ "ok": true, "timestamp": now_rfc3339() }))
}

/// `POST /api/update`, first half: read, validate and queue on the accept
/// thread so updates reach the actor in arrival order.
///
/// Malformed requests are answered with 400 before anything is queued. The
/// returned job waits for the outcome and replies.
pub fn stage_update(mut request: Request, updates: &UpdateHandle) -> Job {
    let body = match read_body(&mut request) {
        Ok(body) => body,
        Err(e) => return Box::new(move || reply(request, 400, false, e.to_string())),
    };

    let update = match UpdateRequest::from_json(&body) {
        Ok(update) => update,
        Err(e) => {
            status_error("update rejected", &e.to_string());
            let message = e.to_string();
            return Box::new(move || reply(request, 400, false, message));
        }
    };

    match updates.enqueue(update) {
        Ok(pending) => Box::new(move || finish_update(request, pending.wait())),
        Err(e) => Box::new(move || finish_update(request, Err(e))),
    }
}

fn finish_update(request: Request, result: Result<UpdateOutcome, UpdateError>) -> Result<()> {
    match result {
        Ok(outcome) => {
            status_success(&format!(
                "{} ({} observers)",
                outcome.message, outcome.report.delivered
            ));
            reply(request, 200, true, outcome.message)
        }
        Err(e) => {
            let status = if e.is_client_error() { 400 } else { 500 };
            status_error("update failed", &e.to_string());
            reply(request, status, false, e.to_string())
        }
    }
}

fn reply(request: Request, status: u16, success: bool, message: String) -> Result<()> {
    send_json(request, status, &UpdateResponse { success, message })
}
