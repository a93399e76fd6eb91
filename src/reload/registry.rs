//! Observer registry.
//!
//! Holds every observer connection of one preview process. The registry is a
//! cheap handle (`Clone`) shared by the update actor, the socket acceptor and
//! the inbound reader thread.
//!
//! Lifecycle per observer: `Connecting` -> `Open` (welcome sent) -> `Closed`.
//! `Closed` is terminal; closed observers are skipped by every send and pruned
//! at the end of the next pass.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::Mutex;
use serde_json::Value;

use super::message::PreviewMessage;
use crate::debug;

/// Upper bound of inbound messages drained from one observer per pass.
const MAX_INBOUND_PER_PASS: usize = 16;

pub type ObserverId = u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObserverState {
    Connecting,
    Open,
    Closed,
}

/// Result of a non-blocking read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Incoming {
    Text(String),
    Idle,
    Closed,
}

/// Transport of a single observer.
///
/// Implementations must not block: a slow peer buffers or fails, it never
/// stalls the caller.
pub trait ObserverSink: Send {
    fn send_text(&mut self, text: &str) -> std::io::Result<()>;
    fn poll(&mut self) -> Incoming;
    fn close(&mut self);
}

struct Observer {
    id: ObserverId,
    state: ObserverState,
    sink: Box<dyn ObserverSink>,
}

impl Observer {
    /// Send to an open observer. A failed send closes it.
    fn deliver(&mut self, text: &str) -> bool {
        if self.state != ObserverState::Open {
            return false;
        }
        match self.sink.send_text(text) {
            Ok(()) => true,
            Err(e) => {
                debug!("ws"; "observer {} dropped: {}", self.id, e);
                self.state = ObserverState::Closed;
                false
            }
        }
    }
}

/// Outcome of one broadcast.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct BroadcastReport {
    pub delivered: usize,
    /// Observers whose send failed during this broadcast.
    pub failed: usize,
}

#[derive(Clone, Default)]
pub struct ObserverRegistry {
    observers: Arc<Mutex<Vec<Observer>>>,
    next_id: Arc<AtomicU64>,
}

impl ObserverRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a connection and send it the welcome message.
    ///
    /// Returns `None` when the welcome cannot be delivered; the connection
    /// is then closed and never registered.
    pub fn attach(&self, sink: Box<dyn ObserverSink>) -> Option<ObserverId> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed) + 1;
        let mut observer = Observer { id, state: ObserverState::Connecting, sink };

        if let Err(e) = observer.sink.send_text(&PreviewMessage::connection().to_json()) {
            debug!("ws"; "welcome to observer {} failed: {}", id, e);
            observer.sink.close();
            return None;
        }
        observer.state = ObserverState::Open;

        let mut observers = self.observers.lock();
        observers.push(observer);
        debug!("ws"; "observer {} open (total: {})", id, observers.len());
        Some(id)
    }

    /// Mark an observer closed. No-op for unknown or already closed ids.
    #[cfg(test)]
    pub fn close(&self, id: ObserverId) {
        let mut observers = self.observers.lock();
        if let Some(observer) = observers.iter_mut().find(|o| o.id == id)
            && observer.state != ObserverState::Closed
        {
            observer.state = ObserverState::Closed;
            observer.sink.close();
        }
    }

    #[cfg(test)]
    pub fn state(&self, id: ObserverId) -> Option<ObserverState> {
        self.observers.lock().iter().find(|o| o.id == id).map(|o| o.state)
    }

    #[cfg(test)]
    pub fn open_count(&self) -> usize {
        self.observers
            .lock()
            .iter()
            .filter(|o| o.state == ObserverState::Open)
            .count()
    }

    /// Send `message` to every open observer.
    ///
    /// Sends are independent: a failure closes only the failing observer.
    pub fn broadcast(&self, message: &PreviewMessage) -> BroadcastReport {
        let text = message.to_json();
        let mut report = BroadcastReport::default();
        let mut observers = self.observers.lock();

        for observer in observers.iter_mut() {
            let was_open = observer.state == ObserverState::Open;
            if observer.deliver(&text) {
                report.delivered += 1;
            } else if was_open {
                report.failed += 1;
            }
        }
        Self::prune(&mut observers);

        debug!("ws"; "{} delivered to {} observers", message.kind(), report.delivered);
        report
    }

    /// Drain inbound messages, echo valid JSON back, and detect closes.
    ///
    /// Returns the number of echoed messages.
    pub fn service_inbound(&self) -> usize {
        let mut echoed = 0;
        let mut observers = self.observers.lock();

        for observer in observers.iter_mut() {
            for _ in 0..MAX_INBOUND_PER_PASS {
                if observer.state != ObserverState::Open {
                    break;
                }
                match observer.sink.poll() {
                    Incoming::Text(text) => {
                        // Non-JSON input is ignored.
                        let Ok(data) = serde_json::from_str::<Value>(&text) else {
                            continue;
                        };
                        if observer.deliver(&PreviewMessage::echo(data).to_json()) {
                            echoed += 1;
                        }
                    }
                    Incoming::Idle => break,
                    Incoming::Closed => {
                        debug!("ws"; "observer {} closed by peer", observer.id);
                        observer.state = ObserverState::Closed;
                    }
                }
            }
        }
        Self::prune(&mut observers);
        echoed
    }

    /// Close and forget every observer.
    pub fn shutdown(&self) {
        let mut observers = self.observers.lock();
        for observer in observers.iter_mut() {
            observer.state = ObserverState::Closed;
            observer.sink.close();
        }
        observers.clear();
    }

    fn prune(observers: &mut Vec<Observer>) {
        observers.retain(|o| o.state != ObserverState::Closed);
    }
}

// ============================================================================
// Test sink
// ============================================================================

#[cfg(test)]
pub(crate) mod testing {
    use std::collections::VecDeque;
    use std::sync::Arc;

    use parking_lot::Mutex;

    use super::{Incoming, ObserverSink};

    /// Shared view of what a [`MockSink`] saw.
    #[derive(Clone, Default)]
    pub struct MockPeer {
        pub sent: Arc<Mutex<Vec<String>>>,
        pub inbound: Arc<Mutex<VecDeque<Incoming>>>,
        pub fail: Arc<Mutex<bool>>,
        pub closed: Arc<Mutex<bool>>,
    }

    impl MockPeer {
        pub fn sink(&self) -> Box<dyn ObserverSink> {
            Box::new(MockSink(self.clone()))
        }

        pub fn sent_types(&self) -> Vec<String> {
            self.sent
                .lock()
                .iter()
                .map(|t| {
                    let v: serde_json::Value = serde_json::from_str(t).unwrap();
                    v["type"].as_str().unwrap().to_string()
                })
                .collect()
        }
    }

    pub struct MockSink(MockPeer);

    impl ObserverSink for MockSink {
        fn send_text(&mut self, text: &str) -> std::io::Result<()> {
            if *self.0.fail.lock() {
                return Err(std::io::Error::from(std::io::ErrorKind::BrokenPipe));
            }
            self.0.sent.lock().push(text.to_string());
            Ok(())
        }

        fn poll(&mut self) -> Incoming {
            self.0.inbound.lock().pop_front().unwrap_or(Incoming::Idle)
        }

        fn close(&mut self) {
            *self.0.closed.lock() = true;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::testing::MockPeer;
    use super::*;

    #[test]
    fn test_attach_sends_welcome() {
        let registry = ObserverRegistry::new();
        let peer = MockPeer::default();
        let id = registry.attach(peer.sink()).unwrap();

        assert_eq!(registry.state(id), Some(ObserverState::Open));
        assert_eq!(peer.sent_types(), vec!["connection"]);
    }

    #[test]
    fn test_attach_failed_welcome_not_registered() {
        let registry = ObserverRegistry::new();
        let peer = MockPeer::default();
        *peer.fail.lock() = true;

        assert_eq!(registry.attach(peer.sink()), None);
        assert_eq!(registry.open_count(), 0);
        assert!(*peer.closed.lock());
    }

    #[test]
    fn test_fan_out_skips_closed() {
        let registry = ObserverRegistry::new();
        let peers: Vec<MockPeer> = (0..4).map(|_| MockPeer::default()).collect();
        let ids: Vec<_> = peers.iter().map(|p| registry.attach(p.sink()).unwrap()).collect();
        registry.close(ids[3]);

        let report = registry.broadcast(&PreviewMessage::file_update("App.tsx", "x"));

        assert_eq!(report, BroadcastReport { delivered: 3, failed: 0 });
        for peer in &peers[..3] {
            assert_eq!(peer.sent_types(), vec!["connection", "file-update"]);
        }
        assert_eq!(peers[3].sent_types(), vec!["connection"]);
        assert_eq!(registry.state(ids[3]), None);
    }

    #[test]
    fn test_failed_send_isolated() {
        let registry = ObserverRegistry::new();
        let good = MockPeer::default();
        let bad = MockPeer::default();
        registry.attach(good.sink()).unwrap();
        let bad_id = registry.attach(bad.sink()).unwrap();
        *bad.fail.lock() = true;

        let report = registry.broadcast(&PreviewMessage::code_update("x", "tsx"));
        assert_eq!(report, BroadcastReport { delivered: 1, failed: 1 });
        assert_eq!(registry.state(bad_id), None);

        let report = registry.broadcast(&PreviewMessage::code_update("y", "tsx"));
        assert_eq!(report, BroadcastReport { delivered: 1, failed: 0 });
        assert_eq!(good.sent_types().len(), 3);
    }

    #[test]
    fn test_close_is_idempotent() {
        let registry = ObserverRegistry::new();
        let peer = MockPeer::default();
        let id = registry.attach(peer.sink()).unwrap();
        registry.close(id);
        registry.close(id);
        registry.close(999);
        assert_eq!(registry.state(id), Some(ObserverState::Closed));
        assert_eq!(registry.open_count(), 0);
    }

    #[test]
    fn test_service_inbound_echo_and_close() {
        let registry = ObserverRegistry::new();
        let chatty = MockPeer::default();
        let leaving = MockPeer::default();
        registry.attach(chatty.sink()).unwrap();
        let leaving_id = registry.attach(leaving.sink()).unwrap();

        chatty.inbound.lock().extend([
            Incoming::Text(r#"{"type":"element-selected"}"#.to_string()),
            Incoming::Text("not json".to_string()),
        ]);
        leaving.inbound.lock().push_back(Incoming::Closed);

        assert_eq!(registry.service_inbound(), 1);
        assert_eq!(chatty.sent_types(), vec!["connection", "echo"]);
        assert_eq!(registry.state(leaving_id), None);
        assert_eq!(registry.open_count(), 1);
    }
}
