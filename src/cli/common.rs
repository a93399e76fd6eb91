//! HTTP plumbing shared by the `preview` and `studio` servers.

use std::io::Read;
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;

use anyhow::{Result, anyhow};
use serde::Serialize;
use tiny_http::{Header, Method, Request, Response, Server, StatusCode};

use crate::log;
use crate::utils::mime::types::{JSON, PLAIN};

/// Maximum number of port binding attempts.
const MAX_PORT_RETRIES: u16 = 10;

/// Request worker threads.
const WORKER_THREADS: usize = 4;

/// Upper bound of an accepted request body.
const MAX_BODY_BYTES: u64 = 32 * 1024 * 1024;

/// Bind to the specified interface and port, with automatic port retry.
pub fn bind_with_retry(interface: IpAddr, base_port: u16) -> Result<(Server, SocketAddr)> {
    let mut last_error = String::new();

    for offset in 0..MAX_PORT_RETRIES {
        let port = base_port.saturating_add(offset);
        let addr = SocketAddr::new(interface, port);

        match Server::http(addr) {
            Ok(server) => {
                if offset > 0 {
                    log!("serve"; "port {} in use, using {} instead", base_port, port);
                }
                return Ok((server, addr));
            }
            Err(e) => last_error = e.to_string(),
        }
    }

    Err(anyhow!(
        "Failed to bind after {} attempts (ports {}-{}): {}",
        MAX_PORT_RETRIES,
        base_port,
        base_port.saturating_add(MAX_PORT_RETRIES - 1),
        last_error
    ))
}

/// Work left for a pool thread once the accept thread is done with a request.
pub type Job = Box<dyn FnOnce() -> Result<()> + Send>;

/// Serve requests until the server is unblocked.
///
/// `stage` runs on the accept thread, one request at a time in arrival
/// order; the job it returns runs on the worker pool.
pub fn run_staged_loop<S>(server: &Server, mut stage: S) -> Result<()>
where
    S: FnMut(Request) -> Job,
{
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(WORKER_THREADS)
        .build()?;

    for request in server.incoming_requests() {
        let job = stage(request);
        pool.spawn(move || {
            if let Err(e) = job() {
                log!("serve"; "request error: {e}");
            }
        });
    }
    Ok(())
}

/// Serve requests entirely on the worker pool.
pub fn run_request_loop<F>(server: &Server, handler: F) -> Result<()>
where
    F: Fn(Request) -> Result<()> + Send + Sync + 'static,
{
    let handler = Arc::new(handler);
    run_staged_loop(server, move |request| {
        let handler = Arc::clone(&handler);
        Box::new(move || handler(request))
    })
}

// =============================================================================
// Request helpers
// =============================================================================

/// URL path without query string.
pub fn url_path(request: &Request) -> &str {
    let url = request.url();
    url.split_once('?').map_or(url, |(path, _)| path)
}

/// Decoded value of the query parameter `name`.
pub fn query_param(request: &Request, name: &str) -> Option<String> {
    let (_, query) = request.url().split_once('?')?;
    url::form_urlencoded::parse(query.as_bytes())
        .find(|(key, _)| key == name)
        .map(|(_, value)| value.into_owned())
}

/// Read the request body, refusing bodies over [`MAX_BODY_BYTES`].
pub fn read_body(request: &mut Request) -> Result<Vec<u8>> {
    let mut body = Vec::new();
    request
        .as_reader()
        .take(MAX_BODY_BYTES + 1)
        .read_to_end(&mut body)?;
    if body.len() as u64 > MAX_BODY_BYTES {
        return Err(anyhow!("request body exceeds {} bytes", MAX_BODY_BYTES));
    }
    Ok(body)
}

pub fn is_head(request: &Request) -> bool {
    request.method() == &Method::Head
}

// =============================================================================
// Response helpers
// =============================================================================

pub fn with_header<R: Read>(response: Response<R>, key: &str, value: &str) -> Response<R> {
    match Header::from_bytes(key.as_bytes(), value.as_bytes()) {
        Ok(header) => response.with_header(header),
        Err(()) => response,
    }
}

pub fn send_body(request: Request, status: u16, content_type: &str, body: Vec<u8>) -> Result<()> {
    let response = Response::from_data(body).with_status_code(StatusCode(status));
    let response = with_header(response, "Content-Type", content_type);
    let response = with_header(response, "Access-Control-Allow-Origin", "*");
    request.respond(response)?;
    Ok(())
}

pub fn send_head(request: Request, status: u16, content_type: &str) -> Result<()> {
    let response = with_header(Response::empty(StatusCode(status)), "Content-Type", content_type);
    request.respond(response)?;
    Ok(())
}

pub fn send_json<T: Serialize + ?Sized>(request: Request, status: u16, value: &T) -> Result<()> {
    let body = serde_json::to_vec(value)?;
    send_body(request, status, JSON, body)
}

pub fn send_text(request: Request, status: u16, text: &str) -> Result<()> {
    send_body(request, status, PLAIN, text.as_bytes().to_vec())
}

/// Answer a CORS preflight.
pub fn send_preflight(request: Request) -> Result<()> {
    let response = Response::empty(StatusCode(204));
    let response = with_header(response, "Access-Control-Allow-Origin", "*");
    let response = with_header(response, "Access-Control-Allow-Methods", "GET, POST, OPTIONS");
    let response = with_header(response, "Access-Control-Allow-Headers", "Content-Type");
    request.respond(response)?;
    Ok(())
}

/// 503 while shutting down.
pub fn send_unavailable(request: Request) -> Result<()> {
    send_text(request, 503, "503 Service Unavailable")
}
