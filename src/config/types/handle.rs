//! Global config handle.
//!
//! Uses `arc-swap` for lock-free reads from request handler threads.

use crate::config::VinaConfig;
use arc_swap::ArcSwap;
use std::sync::{Arc, LazyLock};

/// Global config storage.
pub static CONFIG: LazyLock<ArcSwap<VinaConfig>> =
    LazyLock::new(|| ArcSwap::from_pointee(VinaConfig::default()));

#[inline]
pub fn cfg() -> Arc<VinaConfig> {
    CONFIG.load_full()
}

#[inline]
pub fn init_config(config: VinaConfig) -> Arc<VinaConfig> {
    let arc = Arc::new(config);
    CONFIG.store(Arc::clone(&arc));
    arc
}
