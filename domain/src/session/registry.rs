//! Session registry

use super::entities::Session;
use crate::core::error::DomainError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// The single persisted record holding every session.
///
/// `session_order` lists ids most-recently-used first.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionRegistry {
    #[serde(default)]
    pub sessions: HashMap<String, Session>,
    #[serde(default)]
    pub current_session_id: Option<String>,
    #[serde(default)]
    pub session_order: Vec<String>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&Session> {
        self.sessions.get(id)
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut Session> {
        self.sessions.get_mut(id)
    }

    pub fn current(&self) -> Option<&Session> {
        self.current_session_id
            .as_deref()
            .and_then(|id| self.sessions.get(id))
    }

    /// Default name for the next session
    pub fn next_name(&self) -> String {
        format!("Session {}", self.sessions.len() + 1)
    }

    /// Store a new session at the front of the recency list and make it current
    pub fn insert_front(&mut self, session: Session) {
        let id = session.id.clone();
        self.session_order.retain(|s| s != &id);
        self.session_order.insert(0, id.clone());
        self.sessions.insert(id.clone(), session);
        self.current_session_id = Some(id);
    }

    /// Make `id` current and most recent
    pub fn promote(&mut self, id: &str) -> Result<&Session, DomainError> {
        if !self.sessions.contains_key(id) {
            return Err(DomainError::session_not_found(id));
        }
        self.session_order.retain(|s| s != id);
        self.session_order.insert(0, id.to_string());
        self.current_session_id = Some(id.to_string());
        self.sessions
            .get(id)
            .ok_or_else(|| DomainError::session_not_found(id))
    }

    /// Remove a session.
    ///
    /// When it was current, the front of the recency list becomes current, or
    /// nothing if the registry is now empty. Returns the new current id.
    pub fn remove(&mut self, id: &str) -> Result<Option<String>, DomainError> {
        if self.sessions.remove(id).is_none() {
            return Err(DomainError::session_not_found(id));
        }
        self.session_order.retain(|s| s != id);
        if self.current_session_id.as_deref() == Some(id) {
            self.current_session_id = self.session_order.first().cloned();
        }
        Ok(self.current_session_id.clone())
    }

    pub fn rename(&mut self, id: &str, name: impl Into<String>) -> Result<(), DomainError> {
        let session = self
            .sessions
            .get_mut(id)
            .ok_or_else(|| DomainError::session_not_found(id))?;
        session.name = name.into();
        session.last_modified = chrono::Utc::now().timestamp_millis();
        Ok(())
    }

    /// Sessions in recency order; order entries without a session are skipped
    pub fn ordered(&self) -> Vec<&Session> {
        self.session_order
            .iter()
            .filter_map(|id| self.sessions.get(id))
            .collect()
    }

    /// Session a cold start should open: the stored current one if it still
    /// exists, else the most recent.
    pub fn restore_target(&self) -> Option<&str> {
        if let Some(session) = self.current() {
            return Some(session.id.as_str());
        }
        self.session_order
            .iter()
            .find(|id| self.sessions.contains_key(id.as_str()))
            .map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry_with(ids: &[&str]) -> SessionRegistry {
        let mut registry = SessionRegistry::new();
        for id in ids {
            let name = registry.next_name();
            registry.insert_front(Session::new(*id, name));
        }
        registry
    }

    #[test]
    fn test_recency_after_load() {
        let mut registry = registry_with(&["s1", "s2", "s3"]);
        assert_eq!(registry.session_order, vec!["s3", "s2", "s1"]);

        registry.promote("s1").unwrap();
        assert_eq!(registry.session_order, vec!["s1", "s3", "s2"]);
        assert_eq!(registry.current_session_id.as_deref(), Some("s1"));
    }

    #[test]
    fn test_names_count_existing_sessions() {
        let registry = registry_with(&["s1", "s2"]);
        assert_eq!(registry.get("s2").unwrap().name, "Session 2");
        assert_eq!(registry.next_name(), "Session 3");
    }

    #[test]
    fn test_promote_unknown() {
        let mut registry = registry_with(&["s1"]);
        assert!(registry.promote("nope").unwrap_err().is_not_found());
        assert_eq!(registry.current_session_id.as_deref(), Some("s1"));
    }

    #[test]
    fn test_remove_current_promotes_most_recent() {
        let mut registry = registry_with(&["s1", "s2", "s3"]);
        assert_eq!(registry.remove("s3").unwrap().as_deref(), Some("s2"));
        assert_eq!(registry.remove("s1").unwrap().as_deref(), Some("s2"));
        assert_eq!(registry.remove("s2").unwrap(), None);
        assert!(registry.is_empty());
        assert!(registry.remove("s2").is_err());
    }

    #[test]
    fn test_restore_target() {
        let mut registry = registry_with(&["s1", "s2"]);
        assert_eq!(registry.restore_target(), Some("s2"));

        registry.current_session_id = Some("gone".to_string());
        assert_eq!(registry.restore_target(), Some("s2"));

        registry.session_order = vec!["gone".to_string(), "s1".to_string()];
        assert_eq!(registry.restore_target(), Some("s1"));

        assert_eq!(SessionRegistry::new().restore_target(), None);
    }

    #[test]
    fn test_registry_json_layout() {
        let registry = registry_with(&["s1"]);
        let json = serde_json::to_value(&registry).unwrap();
        assert_eq!(json["currentSessionId"], "s1");
        assert_eq!(json["sessionOrder"][0], "s1");
        assert_eq!(json["sessions"]["s1"]["name"], "Session 1");
    }
}
