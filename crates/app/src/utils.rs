//! Configuration paths and settings store setup.

use shared::store::{JsonFileStore, KeyValueStore, MemoryStore};
use std::path::PathBuf;

/// Overrides the directory holding `settings.json`.
pub const CONFIG_DIR_ENV: &str = "MY_LLM_CONFIG_DIR";

pub fn config_dir() -> Option<PathBuf> {
    config_dir_from(std::env::var(CONFIG_DIR_ENV).ok())
}

fn config_dir_from(override_dir: Option<String>) -> Option<PathBuf> {
    if let Some(dir) = override_dir.filter(|d| !d.trim().is_empty()) {
        return Some(PathBuf::from(dir));
    }
    directories::ProjectDirs::from("com.local", "My-LLM", "MyLLM")
        .map(|proj| proj.config_dir().to_path_buf())
}

/// The persistent settings store, or an in-memory one when no config
/// directory can be determined.
pub fn settings_store() -> Box<dyn KeyValueStore + Send> {
    match config_dir() {
        Some(dir) => {
            let path = dir.join("settings.json");
            tracing::info!("settings file: {}", path.display());
            Box::new(JsonFileStore::new(path))
        }
        None => {
            tracing::warn!("no config directory available; settings will not persist");
            Box::new(MemoryStore::new())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_override_wins() {
        assert_eq!(
            config_dir_from(Some("/tmp/my-llm".into())),
            Some(PathBuf::from("/tmp/my-llm"))
        );
    }

    #[test]
    fn test_blank_override_is_ignored() {
        assert_ne!(config_dir_from(Some("  ".into())), Some(PathBuf::from("  ")));
    }

    #[test]
    fn test_file_store_round_trip_through_app_state() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");

        let (mut state, _) = crate::types::AppState::new(Box::new(JsonFileStore::new(&path)));
        let mut new = state.settings.clone();
        new.server_address = "192.168.1.5".into();
        new.wake_word = "computer".into();
        new.verbose = true;
        state.save_settings(new.clone());

        let (reloaded, _) = crate::types::AppState::new(Box::new(JsonFileStore::new(&path)));
        assert_eq!(reloaded.settings, new);
    }

    #[test]
    fn test_save_repairs_corrupt_settings_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, b"{ not json").unwrap();

        let (mut state, _) = crate::types::AppState::new(Box::new(JsonFileStore::new(&path)));
        assert!(state.log.last().unwrap().starts_with("Failed to load settings:"));

        let mut new = state.settings.clone();
        new.wake_word = "computer".into();
        state.save_settings(new.clone());
        assert_eq!(state.log.last(), Some("Settings saved."));

        let (reloaded, _) = crate::types::AppState::new(Box::new(JsonFileStore::new(&path)));
        assert_eq!(reloaded.settings, new);
        assert!(reloaded.log.is_empty());
    }
}
