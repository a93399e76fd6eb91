//! Editing surface: drives selection -> patch -> preview delivery.
//!
//! The studio never writes component sources itself. Patched files travel
//! to the preview process, which owns them.

pub mod assets;
pub mod client;
pub mod pipeline;

pub use assets::{AssetKind, AssetStore};
pub use client::PreviewClient;
pub use pipeline::{EditError, EditPipeline};
