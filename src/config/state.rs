// Application state module
// Shared, read-only per-process state handed to every connection

use super::types::Config;
use crate::storage::ConfigStore;

/// Application state
pub struct AppState {
    pub config: Config,
    pub store: ConfigStore,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        let store = ConfigStore::new(&config.storage.config_file, config.storage.atomic_writes);
        Self { config, store }
    }
}

/// State for tests: stock settings, config file redirected into `dir`
#[cfg(test)]
pub fn test_state(dir: &std::path::Path) -> std::sync::Arc<AppState> {
    let mut config = Config::load_from("settings-file-that-does-not-exist").unwrap();
    config.storage.config_file = dir.join("config.json").to_string_lossy().into_owned();
    config.logging.access_log = false;
    std::sync::Arc::new(AppState::new(config))
}
