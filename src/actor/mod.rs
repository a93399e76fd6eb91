//! Actor System for the Preview Process
//!
//! ```text
//! HTTP /api/update --Apply--> UpdateActor --+
//!                                           +--> ObserverRegistry --> observers
//! WS acceptor --AddClient--> WsActor -------+
//! ```
//!
//! # Module Structure
//!
//! - `messages` - Message types for inter-actor communication
//! - `update` - Serialized persist + broadcast
//! - `ws` - WebSocket handshake and inbound polling
//! - `coordinator` - Wires up and runs actors

pub mod coordinator;
pub mod messages;
pub mod update;
pub mod ws;

pub use coordinator::Coordinator;
pub use update::UpdateHandle;
