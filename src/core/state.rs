//! Shutdown state for the long-running commands.
//!
//! - `SHUTDOWN`: Ctrl+C received
//! - `SERVER`: HTTP server to unblock on shutdown
//! - `SHUTDOWN_TX`: wakes the actor system (preview only)

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock};

use tiny_http::Server;

static SHUTDOWN: AtomicBool = AtomicBool::new(false);

static SERVER: OnceLock<Arc<Server>> = OnceLock::new();

static SHUTDOWN_TX: OnceLock<crossbeam::channel::Sender<()>> = OnceLock::new();

/// Setup the global Ctrl+C handler. Call once at program start.
///
/// Before `register_server()` the process exits immediately; afterwards the
/// server is unblocked and the actors are notified.
pub fn setup_shutdown_handler() -> anyhow::Result<()> {
    ctrlc::set_handler(|| {
        SHUTDOWN.store(true, Ordering::SeqCst);

        if let Some(tx) = SHUTDOWN_TX.get() {
            let _ = tx.send(());
        }

        if let Some(server) = SERVER.get() {
            crate::log!("serve"; "shutting down...");
            server.unblock();
        } else {
            std::process::exit(0);
        }
    })
    .map_err(|e| anyhow::anyhow!("failed to set Ctrl+C handler: {}", e))
}

/// Register the HTTP server (and the actor shutdown signal, if any).
///
/// Call after binding, before entering the request loop.
pub fn register_server(server: Arc<Server>, shutdown_tx: Option<crossbeam::channel::Sender<()>>) {
    let _ = SERVER.set(server);
    if let Some(tx) = shutdown_tx {
        let _ = SHUTDOWN_TX.set(tx);
    }
}

/// Relaxed: worst case a loop runs one more iteration.
pub fn is_shutdown() -> bool {
    SHUTDOWN.load(Ordering::Relaxed)
}
