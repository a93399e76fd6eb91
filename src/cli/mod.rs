//! Command-line interface module.

mod args;
pub mod common;
pub mod edit;
pub mod locate;
pub mod preview;
pub mod studio;

pub use args::{Cli, Commands};
