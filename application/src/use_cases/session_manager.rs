//! Session manager
//!
//! Keeps the session registry, swaps the live working state when the user
//! changes session, and writes snapshots through a [`SessionStore`].
//!
//! Switching away from a session always saves it first. The registry stays
//! in memory between calls and is written back whole.

use crate::ports::events::{EventBus, StateEvent};
use crate::ports::session_store::{SessionStore, StoreError};
use crate::workspace::Workspace;
use agentic_domain::{DomainError, Session, SessionRegistry, SessionState};
use serde::Serialize;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

#[derive(Error, Debug)]
pub enum SessionError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// One row of the session list
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionSummary {
    pub id: String,
    pub name: String,
    pub created_at: i64,
    pub last_modified: i64,
    pub message_count: usize,
    pub conversation_count: usize,
    pub is_current: bool,
}

pub struct SessionManager {
    store: Arc<dyn SessionStore>,
    workspace: Workspace,
    events: EventBus,
    registry: Mutex<SessionRegistry>,
}

impl SessionManager {
    pub fn new(store: Arc<dyn SessionStore>, workspace: Workspace, events: EventBus) -> Self {
        Self {
            store,
            workspace,
            events,
            registry: Mutex::new(SessionRegistry::new()),
        }
    }

    pub fn workspace(&self) -> &Workspace {
        &self.workspace
    }

    /// Open the session a cold start should resume.
    ///
    /// Falls back to a fresh session when nothing usable is stored or the
    /// store cannot be read. Never fails; a failed write of the fresh session
    /// is only logged.
    pub async fn restore_most_recent(&self) -> Session {
        let loaded = match self.store.load_registry().await {
            Ok(registry) => registry,
            Err(e) => {
                warn!("Could not read sessions, starting fresh: {}", e);
                SessionRegistry::new()
            }
        };

        let mut registry = self.registry.lock().await;
        *registry = loaded;

        let target = registry.restore_target().map(str::to_string);
        if let Some(id) = target {
            if let Ok(session) = registry.promote(&id) {
                let session = session.clone();
                info!("Restored session {} ({})", session.name, session.id);
                self.workspace.replace(session.state());
                self.events.publish(StateEvent::SessionSwitched {
                    session_id: session.id.clone(),
                });
                return session;
            }
        }

        let session = self.start_new(&mut registry);
        if let Err(e) = self.store.save_registry(&registry).await {
            warn!("Could not save new session: {}", e);
        }
        session
    }

    /// Save the current session, then start and switch to a new empty one
    pub async fn create(&self) -> Result<Session, SessionError> {
        let mut registry = self.registry.lock().await;
        self.capture_current(&mut registry);
        let session = self.start_new(&mut registry);
        self.store.save_registry(&registry).await?;
        Ok(session)
    }

    /// Switch to `id`, saving the session being left
    pub async fn load(&self, id: &str) -> Result<Session, SessionError> {
        let mut registry = self.registry.lock().await;
        if registry.get(id).is_none() {
            return Err(DomainError::session_not_found(id).into());
        }
        if registry.current_session_id.as_deref() != Some(id) {
            self.capture_current(&mut registry);
        }

        let session = registry.promote(id)?.clone();
        self.workspace.replace(session.state());
        self.store.save_registry(&registry).await?;

        info!("Loaded session {} ({})", session.name, session.id);
        self.events.publish(StateEvent::SessionSwitched {
            session_id: session.id.clone(),
        });
        Ok(session)
    }

    /// Delete `id`. Returns the id that is current afterwards.
    ///
    /// Deleting the current session switches to the most recent remaining
    /// one. When none remain the working state is cleared and `None` is
    /// returned; starting a new session is up to the caller.
    pub async fn delete(&self, id: &str) -> Result<Option<String>, SessionError> {
        let mut registry = self.registry.lock().await;
        let was_current = registry.current_session_id.as_deref() == Some(id);
        let new_current = registry.remove(id)?;

        if was_current {
            let state = new_current
                .as_deref()
                .and_then(|next| registry.get(next))
                .map(Session::state)
                .unwrap_or_default();
            self.workspace.replace(state);
            if let Some(next) = &new_current {
                self.events.publish(StateEvent::SessionSwitched {
                    session_id: next.clone(),
                });
            }
        }

        self.store.save_registry(&registry).await?;
        info!("Deleted session {}", id);
        Ok(new_current)
    }

    /// Snapshot the working state into the current session and persist
    pub async fn save(&self) -> Result<(), SessionError> {
        let mut registry = self.registry.lock().await;
        if !self.capture_current(&mut registry) {
            debug!("No current session to save");
            return Ok(());
        }
        self.store.save_registry(&registry).await?;
        debug!("Saved session {:?}", registry.current_session_id);
        Ok(())
    }

    pub async fn rename(&self, id: &str, name: &str) -> Result<(), SessionError> {
        let mut registry = self.registry.lock().await;
        registry.rename(id, name)?;
        self.store.save_registry(&registry).await?;
        Ok(())
    }

    /// Sessions, most recently used first
    pub async fn list(&self) -> Vec<SessionSummary> {
        let registry = self.registry.lock().await;
        let current = registry.current_session_id.clone();
        registry
            .ordered()
            .into_iter()
            .map(|s| SessionSummary {
                id: s.id.clone(),
                name: s.name.clone(),
                created_at: s.created_at,
                last_modified: s.last_modified,
                message_count: s.message_count(),
                conversation_count: s.conversations.len(),
                is_current: current.as_deref() == Some(s.id.as_str()),
            })
            .collect()
    }

    pub async fn current_id(&self) -> Option<String> {
        self.registry.lock().await.current_session_id.clone()
    }

    /// Copy the live state into the current session. False when there is none.
    fn capture_current(&self, registry: &mut SessionRegistry) -> bool {
        let Some(id) = registry.current_session_id.clone() else {
            return false;
        };
        let state = self.workspace.snapshot();
        match registry.get_mut(&id) {
            Some(session) => {
                session.capture(&state);
                true
            }
            None => false,
        }
    }

    fn start_new(&self, registry: &mut SessionRegistry) -> Session {
        let session = Session::new(
            format!("session-{}", uuid::Uuid::new_v4()),
            registry.next_name(),
        );
        registry.insert_front(session.clone());
        self.workspace.replace(SessionState::new());
        info!("Created session {} ({})", session.name, session.id);
        self.events.publish(StateEvent::SessionSwitched {
            session_id: session.id.clone(),
        });
        session
    }
}
