//! WebSocket Actor - observer connections.
//!
//! Performs the handshake for accepted streams and hands the resulting
//! sockets to the [`ObserverRegistry`]. A reader thread polls the registry
//! for inbound messages (echo) and peer closes.
//!
//! ```text
//! acceptor --AddClient--> WsActor --attach--> ObserverRegistry <--poll-- reader
//! ```

mod sink;

pub use sink::WsSink;

use std::net::TcpStream;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use tokio::sync::mpsc;

use super::messages::WsMsg;
use crate::reload::ObserverRegistry;

const READ_INTERVAL: Duration = Duration::from_millis(100);

/// Upper bound for a peer to complete the WebSocket handshake.
const HANDSHAKE_TIMEOUT: Duration = Duration::from_secs(5);

pub struct WsActor {
    rx: mpsc::Receiver<WsMsg>,
    registry: ObserverRegistry,
}

impl WsActor {
    pub fn new(rx: mpsc::Receiver<WsMsg>, registry: ObserverRegistry) -> Self {
        Self { rx, registry }
    }

    pub async fn run(mut self) {
        let stop = Arc::new(AtomicBool::new(false));
        let reader = {
            let registry = self.registry.clone();
            let stop = Arc::clone(&stop);
            std::thread::spawn(move || Self::reader_loop(&registry, &stop))
        };

        while let Some(msg) = self.rx.recv().await {
            match msg {
                WsMsg::AddClient(stream) => self.add_client(stream),
                WsMsg::Shutdown => {
                    crate::debug!("ws"; "shutting down");
                    break;
                }
            }
        }

        stop.store(true, Ordering::SeqCst);
        let _ = reader.join();
        self.registry.shutdown();
    }

    /// Handshake off the actor task so a stalled peer delays nobody else.
    fn add_client(&self, stream: TcpStream) {
        let registry = self.registry.clone();
        tokio::task::spawn_blocking(move || {
            let Some(ws) = handshake(stream, HANDSHAKE_TIMEOUT) else {
                return;
            };
            if registry.attach(Box::new(WsSink::new(ws))).is_none() {
                crate::log!("ws"; "observer dropped before welcome");
            }
        });
    }

    fn reader_loop(registry: &ObserverRegistry, stop: &AtomicBool) {
        while !stop.load(Ordering::SeqCst) && !crate::core::is_shutdown() {
            std::thread::sleep(READ_INTERVAL);
            let echoed = registry.service_inbound();
            if echoed > 0 {
                crate::debug!("ws"; "echoed {} messages", echoed);
            }
        }
    }
}

/// Blocking handshake, bounded by `timeout` for reads and writes.
fn handshake(stream: TcpStream, timeout: Duration) -> Option<tungstenite::WebSocket<TcpStream>> {
    let configured = stream
        .set_nonblocking(false)
        .and_then(|()| stream.set_read_timeout(Some(timeout)))
        .and_then(|()| stream.set_write_timeout(Some(timeout)));
    if let Err(e) = configured {
        crate::log!("ws"; "cannot configure observer socket: {}", e);
        return None;
    }

    match tungstenite::accept(stream) {
        Ok(ws) => Some(ws),
        Err(e) => {
            crate::debug!("ws"; "handshake failed: {}", e);
            None
        }
    }
}
