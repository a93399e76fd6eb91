//! Preview process: static files, update endpoint, observer channel.
//!
//! ```text
//! GET  /health             -> {ok, timestamp}
//! POST /api/update         -> persist + broadcast (UpdateActor)
//! GET  /__vina/client.js   -> embedded preview client
//! GET  /*                  -> serve_dir, then source_dir
//! ```

mod content;
mod lifecycle;
mod path;
mod response;

use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicU16, Ordering};

use anyhow::Result;
use crossbeam::channel;
use tiny_http::{Method, Request, Server};

use crate::actor::{Coordinator, UpdateHandle};
use crate::cli::common::{
    Job, bind_with_retry, run_staged_loop, send_preflight, send_unavailable, url_path,
};
use crate::config::cfg;
use crate::embed::preview::CLIENT_JS_URL;
use crate::reload::{ObserverRegistry, UpdateChannel};
use crate::{debug, log};

/// Observer port actually bound (may differ from the configured one after retry).
static ACTUAL_WS_PORT: AtomicU16 = AtomicU16::new(0);

/// Called by the coordinator after the observer socket is bound.
pub fn set_actual_ws_port(port: u16) {
    ACTUAL_WS_PORT.store(port, Ordering::Relaxed);
}

fn actual_ws_port() -> u16 {
    ACTUAL_WS_PORT.load(Ordering::Relaxed)
}

/// Shared by the accept thread and all request workers.
struct PreviewState {
    serve_root: PathBuf,
    source_root: PathBuf,
    updates: UpdateHandle,
}

impl PreviewState {
    /// Built output first, then the persisted sources.
    fn lookup(&self, url: &str) -> Option<PathBuf> {
        path::resolve_path(url, &self.serve_root).or_else(|| path::resolve_path(url, &self.source_root))
    }
}

/// Bound server ready to accept requests
pub struct BoundServer {
    server: Arc<Server>,
    shutdown_rx: channel::Receiver<()>,
}

pub fn bind_server() -> Result<BoundServer> {
    let config = cfg();
    let (server, addr) = bind_with_retry(config.preview.interface, config.preview.port)?;
    let server = Arc::new(server);

    let (shutdown_tx, shutdown_rx) = channel::unbounded::<()>();
    crate::core::register_server(Arc::clone(&server), Some(shutdown_tx));

    log!("preview"; "http://{}", addr);
    Ok(BoundServer { server, shutdown_rx })
}

impl BoundServer {
    /// Start the actor system and the request loop (blocking).
    pub fn run(self) -> Result<()> {
        let config = cfg();
        let source_root = config.source_root();
        let serve_root = config.serve_root();
        debug!("preview"; "source root: {}", source_root.display());
        debug!("preview"; "serving: {}", serve_root.display());
        if !serve_root.is_dir() {
            log!("preview"; "serve directory {} does not exist yet", serve_root.display());
        }

        set_actual_ws_port(config.preview.ws_port);
        let coordinator = Coordinator::new(UpdateChannel::new(&source_root, ObserverRegistry::new()));
        let state = Arc::new(PreviewState {
            serve_root,
            source_root,
            updates: coordinator.update_handle(),
        });

        let actors = lifecycle::spawn_actors(
            coordinator,
            config.preview.interface,
            config.preview.ws_port,
            self.shutdown_rx,
        );

        run_staged_loop(&self.server, move |request| stage_request(request, &state))?;
        lifecycle::wait_for_shutdown(actors);
        Ok(())
    }
}

/// Runs on the accept thread. Updates are queued here so they reach the
/// actor in arrival order; everything else goes to the pool untouched.
fn stage_request(request: Request, state: &Arc<PreviewState>) -> Job {
    let is_update = request.method() == &Method::Post && url_path(&request) == "/api/update";
    if is_update && !crate::core::is_shutdown() {
        return response::stage_update(request, &state.updates);
    }

    let state = Arc::clone(state);
    Box::new(move || handle_request(request, &state))
}

/// Handle a single HTTP request
fn handle_request(request: Request, state: &PreviewState) -> Result<()> {
    if crate::core::is_shutdown() {
        return send_unavailable(request);
    }

    let method = request.method().clone();
    let path = url_path(&request).to_string();

    match (method, path.as_str()) {
        (Method::Options, _) => send_preflight(request),
        (Method::Get, "/health") => response::respond_health(request),
        (Method::Get, CLIENT_JS_URL) => response::respond_client_js(request, actual_ws_port()),
        (Method::Get | Method::Head, _) => match state.lookup(request.url()) {
            Some(file) => response::respond_file(request, &file),
            None => response::respond_not_found(request, &state.serve_root),
        },
        _ => response::respond_not_found(request, &state.serve_root),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actor::update::UpdateActor;
    use crate::reload::registry::testing::MockPeer;
    use std::fs;
    use std::io::{Read, Write};
    use std::net::{SocketAddr, TcpStream};
    use std::thread;
    use std::time::Duration;
    use tempfile::TempDir;
    use tokio::sync::mpsc;

    struct TestPreview {
        addr: SocketAddr,
        server: Arc<Server>,
        peer: MockPeer,
        source: PathBuf,
        _runtime: tokio::runtime::Runtime,
    }

    impl Drop for TestPreview {
        fn drop(&mut self) {
            self.server.unblock();
        }
    }

    fn start_preview(dir: &TempDir) -> TestPreview {
        let source = dir.path().join("src");
        let serve = dir.path().join("dist");
        fs::create_dir_all(&source).unwrap();
        fs::create_dir_all(&serve).unwrap();

        let peer = MockPeer::default();
        let registry = ObserverRegistry::new();
        registry.attach(peer.sink()).unwrap();

        let (tx, rx) = mpsc::channel(8);
        let runtime = tokio::runtime::Runtime::new().unwrap();
        runtime.spawn(UpdateActor::new(rx, UpdateChannel::new(&source, registry)).run());

        let state = Arc::new(PreviewState {
            serve_root: serve,
            source_root: source.clone(),
            updates: UpdateHandle::new(tx),
        });

        let server = Arc::new(Server::http("127.0.0.1:0").unwrap());
        let addr = server.server_addr().to_ip().unwrap();
        let loop_server = Arc::clone(&server);
        thread::spawn(move || run_staged_loop(&loop_server, move |r| stage_request(r, &state)));

        TestPreview { addr, server, peer, source, _runtime: runtime }
    }

    fn update_head(body_len: usize) -> String {
        format!(
            "POST /api/update HTTP/1.1\r\nHost: localhost\r\nContent-Type: application/json\r\n\
             Content-Length: {body_len}\r\nConnection: close\r\n\r\n"
        )
    }

    fn read_response(mut stream: TcpStream) -> String {
        let mut response = String::new();
        stream.read_to_string(&mut response).unwrap();
        response
    }

    fn get(addr: SocketAddr, path: &str) -> String {
        let mut stream = TcpStream::connect(addr).unwrap();
        write!(stream, "GET {path} HTTP/1.0\r\nHost: localhost\r\n\r\n").unwrap();
        read_response(stream)
    }

    #[test]
    fn test_slow_body_keeps_arrival_order() {
        let dir = TempDir::new().unwrap();
        let preview = start_preview(&dir);

        let first = r#"{"filePath":"App.tsx","content":"first"}"#;
        let second = r#"{"filePath":"App.tsx","content":"second"}"#;
        let (first_head, first_tail) = first.split_at(10);

        // First request: headers and a partial body, the rest arrives late.
        let mut slow = TcpStream::connect(preview.addr).unwrap();
        slow.write_all(update_head(first.len()).as_bytes()).unwrap();
        slow.write_all(first_head.as_bytes()).unwrap();
        slow.flush().unwrap();
        thread::sleep(Duration::from_millis(200));

        // Second request arrives complete while the first is still sending.
        let mut fast = TcpStream::connect(preview.addr).unwrap();
        fast.write_all(update_head(second.len()).as_bytes()).unwrap();
        fast.write_all(second.as_bytes()).unwrap();
        fast.flush().unwrap();
        thread::sleep(Duration::from_millis(200));

        slow.write_all(first_tail.as_bytes()).unwrap();
        slow.flush().unwrap();

        assert!(read_response(slow).contains("\"success\":true"));
        assert!(read_response(fast).contains("\"success\":true"));

        assert_eq!(fs::read_to_string(preview.source.join("App.tsx")).unwrap(), "second");
        let contents: Vec<String> = preview
            .peer
            .sent
            .lock()
            .iter()
            .skip(1)
            .map(|t| {
                let v: serde_json::Value = serde_json::from_str(t).unwrap();
                v["data"]["content"].as_str().unwrap().to_string()
            })
            .collect();
        assert_eq!(contents, vec!["first", "second"]);
    }

    #[test]
    fn test_updated_file_is_served_after_update() {
        let dir = TempDir::new().unwrap();
        let preview = start_preview(&dir);
        fs::write(preview.source.join("page.html"), "<body>old</body>").unwrap();

        let body = r#"{"filePath":"page.html","content":"<body>new</body>"}"#;
        let mut stream = TcpStream::connect(preview.addr).unwrap();
        stream.write_all(update_head(body.len()).as_bytes()).unwrap();
        stream.write_all(body.as_bytes()).unwrap();
        assert!(read_response(stream).contains("\"success\":true"));

        let page = get(preview.addr, "/page.html");
        assert!(page.starts_with("HTTP/1.0 200") || page.starts_with("HTTP/1.1 200"), "{page}");
        assert!(page.contains("new"));
        assert!(!page.contains("old"));
    }

    #[test]
    fn test_malformed_update_rejected_before_queueing() {
        let dir = TempDir::new().unwrap();
        let preview = start_preview(&dir);

        let body = r#"{"nothing":"here"}"#;
        let mut stream = TcpStream::connect(preview.addr).unwrap();
        stream.write_all(update_head(body.len()).as_bytes()).unwrap();
        stream.write_all(body.as_bytes()).unwrap();

        let response = read_response(stream);
        assert!(response.contains(" 400 "), "{response}");
        assert_eq!(preview.peer.sent_types(), vec!["connection"]);
    }
}
