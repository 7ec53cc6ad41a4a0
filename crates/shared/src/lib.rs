pub mod store;
pub mod theme;

pub mod status {
    use serde::{Deserialize, Serialize};

    /// Reachability of the inference server, derived from the last probe.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
    pub enum ServerStatus {
        #[default]
        Checking,
        Online,
        Offline,
    }

    impl ServerStatus {
        pub fn label(&self) -> &'static str {
            match self {
                ServerStatus::Checking => "Checking server...",
                ServerStatus::Online => "Server Online",
                ServerStatus::Offline => "Server Offline",
            }
        }
    }
}

pub mod settings {
    use crate::store::{KeyValueStore, StoreError};
    use serde::{Deserialize, Serialize};

    pub const KEY_SERVER_ADDRESS: &str = "llmIpAddress";
    pub const KEY_WAKE_WORD: &str = "wakeWord";
    pub const KEY_VERBOSE: &str = "verbose";
    pub const KEY_DARK_MODE: &str = "darkMode";

    /// User preferences persisted between sessions.
    #[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
    pub struct ConnectionSettings {
        /// Host name or IP of the Ollama server, without scheme or port.
        pub server_address: String,
        pub wake_word: String,
        /// Ask the server to stream its reply as JSON lines.
        pub verbose: bool,
        pub dark_mode: bool,
    }

    impl ConnectionSettings {
        /// The configured address, or `None` when it is blank.
        pub fn address(&self) -> Option<&str> {
            let trimmed = self.server_address.trim();
            (!trimmed.is_empty()).then_some(trimmed)
        }

        /// Read the four keys. Keys that are absent keep their defaults.
        pub fn load<S: KeyValueStore + ?Sized>(store: &S) -> Result<Self, StoreError> {
            let entries = store.read_all()?;
            let mut settings = Self::default();
            if let Some(v) = entries.get(KEY_SERVER_ADDRESS) {
                settings.server_address = v.clone();
            }
            if let Some(v) = entries.get(KEY_WAKE_WORD) {
                settings.wake_word = v.clone();
            }
            if let Some(v) = entries.get(KEY_VERBOSE) {
                settings.verbose = v == "true";
            }
            if let Some(v) = entries.get(KEY_DARK_MODE) {
                settings.dark_mode = v == "true";
            }
            Ok(settings)
        }

        /// Write all four keys in one transaction.
        pub fn save<S: KeyValueStore>(&self, store: &mut S) -> Result<(), StoreError> {
            let mut tx = store.transaction()?;
            tx.set(KEY_SERVER_ADDRESS, self.server_address.as_str())
                .set(KEY_WAKE_WORD, self.wake_word.as_str())
                .set(KEY_VERBOSE, bool_str(self.verbose))
                .set(KEY_DARK_MODE, bool_str(self.dark_mode));
            tx.commit()
        }
    }

    fn bool_str(value: bool) -> &'static str {
        if value {
            "true"
        } else {
            "false"
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;
        use crate::store::{JsonFileStore, MemoryStore};

        #[test]
        fn test_load_tolerates_missing_keys() {
            let store = MemoryStore::with_entries([(KEY_WAKE_WORD, "computer")]);
            let settings = ConnectionSettings::load(&store).unwrap();
            assert_eq!(settings.wake_word, "computer");
            assert_eq!(settings.server_address, "");
            assert!(!settings.verbose);
            assert!(!settings.dark_mode);
        }

        #[test]
        fn test_non_true_strings_read_as_false() {
            let store = MemoryStore::with_entries([(KEY_VERBOSE, "yes"), (KEY_DARK_MODE, "TRUE")]);
            let settings = ConnectionSettings::load(&store).unwrap();
            assert!(!settings.verbose);
            assert!(!settings.dark_mode);
        }

        #[test]
        fn test_save_then_load_recovers_values() {
            let dir = tempfile::tempdir().unwrap();
            let path = dir.path().join("settings.json");
            let saved = ConnectionSettings {
                server_address: "192.168.1.5".into(),
                wake_word: "computer".into(),
                verbose: true,
                dark_mode: false,
            };

            let mut store = JsonFileStore::new(&path);
            saved.save(&mut store).unwrap();

            let entries = JsonFileStore::new(&path).read_all().unwrap();
            assert_eq!(entries.len(), 4);
            assert_eq!(entries[KEY_SERVER_ADDRESS], "192.168.1.5");
            assert_eq!(entries[KEY_WAKE_WORD], "computer");
            assert_eq!(entries[KEY_VERBOSE], "true");
            assert_eq!(entries[KEY_DARK_MODE], "false");

            let loaded = ConnectionSettings::load(&JsonFileStore::new(&path)).unwrap();
            assert_eq!(loaded, saved);
        }

        #[test]
        fn test_blank_address_is_unset() {
            let mut settings = ConnectionSettings::default();
            assert_eq!(settings.address(), None);
            settings.server_address = "  ".into();
            assert_eq!(settings.address(), None);
            settings.server_address = " 10.0.0.7 ".into();
            assert_eq!(settings.address(), Some("10.0.0.7"));
        }
    }
}

pub mod agent_api {
    use serde::{Deserialize, Serialize};

    /// Port the Ollama server listens on.
    pub const OLLAMA_PORT: u16 = 11434;
    /// Model used for every generation request.
    pub const DEFAULT_MODEL: &str = "qwen3:4b";

    /// Body of `POST /api/generate`.
    #[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
    pub struct GenerateRequest {
        pub model: String,
        pub prompt: String,
        pub stream: bool,
    }

    impl GenerateRequest {
        pub fn new(prompt: impl Into<String>, stream: bool) -> Self {
            Self {
                model: DEFAULT_MODEL.to_string(),
                prompt: prompt.into(),
                stream,
            }
        }
    }

    /// One line of a `/api/generate` response.
    #[derive(Debug, Clone, Default, Deserialize)]
    pub struct GenerateRecord {
        #[serde(default)]
        pub response: Option<String>,
        #[serde(default)]
        pub error: Option<String>,
    }
}
