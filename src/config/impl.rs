use std::sync::{Arc, OnceLock};

use arc_swap::ArcSwap;

use super::StaticConfig;
use crate::errors::Result;

static CONFIG: OnceLock<ArcSwap<StaticConfig>> = OnceLock::new();

/// Get the global configuration instance
///
/// Returns an Arc pointer to the configuration, which is cheap to clone
/// and doesn't hold any locks.
pub fn get_config() -> Arc<StaticConfig> {
    CONFIG
        .get()
        .expect("Config not initialized. Call init_config() first.")
        .load_full()
}

/// Get the global configuration if it has been initialized
pub fn try_get_config() -> Option<Arc<StaticConfig>> {
    CONFIG.get().map(|c| c.load_full())
}

/// Initialize the global configuration
///
/// Loads "config.toml" (optional) plus `CP__*` environment variables and
/// validates the result. Missing backend URL or API key is returned as a
/// fatal `ClickpulseError::Config`.
pub fn init_config() -> Result<Arc<StaticConfig>> {
    init_config_from(super::DEFAULT_CONFIG_PATH)
}

/// Same as [`init_config`] with an explicit TOML path
pub fn init_config_from(path: &str) -> Result<Arc<StaticConfig>> {
    let config = StaticConfig::load_from(path)?;
    config.validate()?;
    Ok(install_config(config))
}

/// Install an already-built configuration (embedding hosts and tests)
///
/// The first call wins for the `OnceLock`; later calls swap the content.
pub fn install_config(config: StaticConfig) -> Arc<StaticConfig> {
    let config = Arc::new(config);
    match CONFIG.get() {
        Some(slot) => slot.store(config.clone()),
        None => {
            if let Err(swap) = CONFIG.set(ArcSwap::new(config.clone())) {
                // 并发初始化时另一方已写入，覆盖为本次内容
                if let Some(slot) = CONFIG.get() {
                    slot.store(swap.load_full());
                }
            }
        }
    }
    config
}
