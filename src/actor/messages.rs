//! Actor Message Definitions
//!
//! ```text
//! HTTP handler --Apply--> UpdateActor --broadcast--> observers
//! WS acceptor --AddClient--> WsActor --attach--> observers
//! ```

use std::net::TcpStream;

use tokio::sync::oneshot;

use crate::reload::{UpdateError, UpdateOutcome, UpdateRequest};

/// Reply slot of an applied update.
pub type UpdateReply = oneshot::Sender<Result<UpdateOutcome, UpdateError>>;

// =============================================================================
// UpdateActor Messages
// =============================================================================

/// Messages to Update Actor
#[derive(Debug)]
pub enum UpdateMsg {
    /// Persist (for file updates) and broadcast, then reply.
    Apply { request: UpdateRequest, reply: UpdateReply },
    /// Shutdown
    Shutdown,
}

// =============================================================================
// WsActor Messages
// =============================================================================

/// Messages to WebSocket Actor
#[derive(Debug)]
pub enum WsMsg {
    /// Raw TCP stream waiting for the WebSocket handshake
    AddClient(TcpStream),
    /// Close every observer and stop
    Shutdown,
}
