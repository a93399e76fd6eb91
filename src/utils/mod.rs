//! Small helpers shared across the preview and studio processes.

pub mod date;
pub mod mime;
pub mod path;
