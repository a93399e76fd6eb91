//! Update channel: observer registry, message protocol, and the
//! persist-then-broadcast handler behind `POST /api/update`.
//!
//! # Architecture
//!
//! ```text
//! HTTP handler --UpdateMsg--> UpdateActor --apply--> disk --> ObserverRegistry --> observers
//!                                                               ^
//! acceptor --WsMsg::AddClient--> WsActor --attach---------------+
//! ```
//!
//! # Modules
//!
//! - `channel` - Request validation, persistence and broadcast
//! - `message` - Messages sent to observers
//! - `registry` - Observer set and per-observer lifecycle
//! - `server` - Observer socket acceptor

pub mod channel;
pub mod message;
pub mod registry;
pub mod server;

pub use channel::{UpdateChannel, UpdateError, UpdateOutcome, UpdateRequest};
pub use registry::ObserverRegistry;
