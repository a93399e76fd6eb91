//! Configuration section definitions.
//!
//! Each module corresponds to a section in `vina.toml`:
//!
//! | Module    | TOML Section  | Purpose                                   |
//! |-----------|---------------|-------------------------------------------|
//! | `preview` | `[preview]`   | Preview process (HTTP, observers, paths)  |
//! | `studio`  | `[studio]`    | Editing surface and its preview client    |
//! | `locator` | `[locator]`   | DOM path to source mapping inputs         |

mod locator;
mod preview;
mod studio;

pub use locator::LocatorConfig;
pub use preview::PreviewConfig;
pub use studio::StudioConfig;
