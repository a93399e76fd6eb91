//! Config error types and the process-wide config handle.

mod error;
mod handle;

pub use error::{ConfigDiagnostics, ConfigError, FieldPath};
pub use handle::{cfg, init_config};
