//! JSON file store.
//!
//! Layout under the data directory:
//!
//! ```text
//! sessions.json            the session registry
//! preferences/<key>.json   one small record per preference
//! ```
//!
//! Unparseable files read as empty: the registry is moved aside to
//! `sessions.json.corrupt` (or a timestamped variant when that name is taken)
//! so the next save does not destroy it.

use super::atomic::{read_optional, write_atomic};
use agentic_application::{PreferenceStore, SessionStore, StoreError};
use agentic_domain::SessionRegistry;
use async_trait::async_trait;
use serde_json::Value;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

const REGISTRY_FILE: &str = "sessions.json";
const PREFERENCES_DIR: &str = "preferences";

pub struct JsonFileStore {
    dir: PathBuf,
}

impl JsonFileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn registry_path(&self) -> PathBuf {
        self.dir.join(REGISTRY_FILE)
    }

    fn preference_path(&self, key: &str) -> PathBuf {
        let safe: String = key
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '_' || c == '-' { c } else { '_' })
            .collect();
        self.dir.join(PREFERENCES_DIR).join(format!("{}.json", safe))
    }
}

#[async_trait]
impl SessionStore for JsonFileStore {
    async fn load_registry(&self) -> Result<SessionRegistry, StoreError> {
        let path = self.registry_path();
        let Some(content) = read_optional(&path).await? else {
            debug!("No session registry at {}", path.display());
            return Ok(SessionRegistry::new());
        };

        match serde_json::from_str(&content) {
            Ok(registry) => Ok(registry),
            Err(e) => {
                warn!("Session registry {} is unreadable: {}", path.display(), e);
                move_aside(&path).await;
                Ok(SessionRegistry::new())
            }
        }
    }

    async fn save_registry(&self, registry: &SessionRegistry) -> Result<(), StoreError> {
        let json = serde_json::to_vec(registry)
            .map_err(|e| StoreError::Corrupt(e.to_string()))?;
        write_atomic(&self.registry_path(), &json).await
    }
}

#[async_trait]
impl PreferenceStore for JsonFileStore {
    async fn get(&self, key: &str) -> Result<Option<Value>, StoreError> {
        let path = self.preference_path(key);
        let Some(content) = read_optional(&path).await? else {
            return Ok(None);
        };
        match serde_json::from_str(&content) {
            Ok(value) => Ok(Some(value)),
            Err(e) => {
                warn!("Preference {} is unreadable: {}", path.display(), e);
                Ok(None)
            }
        }
    }

    async fn set(&self, key: &str, value: Value) -> Result<(), StoreError> {
        let json = serde_json::to_vec_pretty(&value)
            .map_err(|e| StoreError::Corrupt(e.to_string()))?;
        write_atomic(&self.preference_path(key), &json).await
    }

    async fn remove(&self, key: &str) -> Result<(), StoreError> {
        let path = self.preference_path(key);
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StoreError::Write(format!("{}: {}", path.display(), e))),
        }
    }
}

/// Rename an unreadable file out of the way, trying a timestamped name when
/// the plain `.corrupt` name cannot be used.
async fn move_aside(path: &Path) {
    let candidates = [
        path.with_extension("json.corrupt"),
        path.with_extension(format!(
            "json.corrupt-{}",
            chrono::Utc::now().format("%Y%m%d%H%M%S%3f")
        )),
    ];
    for aside in &candidates {
        match tokio::fs::rename(path, aside).await {
            Ok(()) => {
                warn!("Moved unreadable registry to {}", aside.display());
                return;
            }
            Err(e) => {
                debug!("Could not move registry to {}: {}", aside.display(), e);
            }
        }
    }
    warn!(
        "Could not move unreadable registry {} aside; the next save will overwrite it",
        path.display()
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use agentic_domain::{Message, ModelBinding, Session, SessionState};
    use serde_json::json;

    #[tokio::test]
    async fn test_registry_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path());

        let mut state = SessionState::new();
        let ids = state
            .forest
            .create_roots(&[ModelBinding::new("openai/gpt-5.1", "GPT-5.1")], "hello");
        state.forest.append(&ids[0], Message::assistant("hi")).unwrap();
        state.expand.set(&ids[0], true);

        let mut session = Session::new("session-1", "Session 1");
        session.capture(&state);
        let mut registry = SessionRegistry::new();
        registry.insert_front(session);

        store.save_registry(&registry).await.unwrap();
        let loaded = store.load_registry().await.unwrap();
        assert_eq!(loaded, registry);

        let raw: Value =
            serde_json::from_str(&std::fs::read_to_string(dir.path().join(REGISTRY_FILE)).unwrap())
                .unwrap();
        assert_eq!(raw["currentSessionId"], "session-1");
        assert_eq!(raw["sessions"]["session-1"]["conversations"][0]["modelId"], "openai/gpt-5.1");
    }

    #[tokio::test]
    async fn test_missing_registry_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("never-created"));
        assert!(store.load_registry().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_corrupt_registry_is_moved_aside() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(REGISTRY_FILE), "{ not json").unwrap();
        let store = JsonFileStore::new(dir.path());

        assert!(store.load_registry().await.unwrap().is_empty());
        assert!(dir.path().join("sessions.json.corrupt").exists());
        assert!(!dir.path().join(REGISTRY_FILE).exists());
    }

    #[tokio::test]
    async fn test_corrupt_registry_gets_timestamped_name_when_plain_is_taken() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(REGISTRY_FILE), "{ not json").unwrap();
        // A directory in the way makes the plain rename fail.
        std::fs::create_dir(dir.path().join("sessions.json.corrupt")).unwrap();
        std::fs::write(dir.path().join("sessions.json.corrupt").join("keep"), "x").unwrap();
        let store = JsonFileStore::new(dir.path());

        assert!(store.load_registry().await.unwrap().is_empty());
        assert!(!dir.path().join(REGISTRY_FILE).exists());
        let preserved: Vec<String> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .filter(|name| name.starts_with("sessions.json.corrupt-"))
            .collect();
        assert_eq!(preserved.len(), 1);
        let content =
            std::fs::read_to_string(dir.path().join(&preserved[0])).unwrap();
        assert_eq!(content, "{ not json");
    }

    #[tokio::test]
    async fn test_legacy_registry_loads() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join(REGISTRY_FILE),
            r#"{
                "sessions": {
                    "s1": {
                        "id": "s1",
                        "name": "Session 1",
                        "createdAt": 1700000000000,
                        "lastModified": 1700000000000,
                        "agentHistory": [{"role": "user", "content": "hi", "timestamp": 1}],
                        "conversations": [],
                        "currentConversationIndex": 0
                    }
                },
                "currentSessionId": "s1",
                "sessionOrder": ["s1"]
            }"#,
        )
        .unwrap();
        let store = JsonFileStore::new(dir.path());

        let registry = store.load_registry().await.unwrap();
        let state = registry.get("s1").unwrap().state();
        assert_eq!(state.agent_chats.len(), 1);
        assert_eq!(state.agent_chats.history()[0].content, "hi");
    }

    #[tokio::test]
    async fn test_preferences() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path());

        assert_eq!(store.get("agent_model").await.unwrap(), None);
        store.set("agent_model", json!("openai/gpt-5-mini")).await.unwrap();
        assert_eq!(
            store.get("agent_model").await.unwrap(),
            Some(json!("openai/gpt-5-mini"))
        );

        store.remove("agent_model").await.unwrap();
        store.remove("agent_model").await.unwrap();
        assert_eq!(store.get("agent_model").await.unwrap(), None);

        std::fs::write(store.preference_path("broken"), "{").unwrap();
        assert_eq!(store.get("broken").await.unwrap(), None);
    }

    #[test]
    fn test_preference_keys_stay_inside_the_directory() {
        let store = JsonFileStore::new("/data");
        assert_eq!(
            store.preference_path("../../etc/passwd"),
            PathBuf::from("/data/preferences/______etc_passwd.json")
        );
    }
}
