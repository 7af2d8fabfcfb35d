//! Scripted doubles shared by the use case tests

use crate::ports::model_transport::{
    CompletionOptions, GatewayError, ModelTransport, StreamEvent, StreamHandle,
};
use crate::ports::session_store::{PreferenceStore, SessionStore, StoreError};
use crate::workspace::Workspace;
use agentic_domain::{SessionRegistry, SessionState, WireMessage};
use async_trait::async_trait;
use serde_json::Value;
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tokio::sync::mpsc;

/// A scripted reply
#[derive(Debug, Clone)]
pub(crate) enum Scripted {
    Text(String),
    Error(GatewayError),
    /// Streamed as one delta per piece
    Chunks(Vec<String>),
    /// Answer after a delay (use with a paused clock)
    Delayed(Duration, String),
}

#[derive(Debug, Clone)]
pub(crate) struct RecordedCall {
    pub model_id: String,
    pub messages: Vec<WireMessage>,
    pub streaming: bool,
    pub options: CompletionOptions,
}

/// Transport that answers from per-model queues, then from a fallback
/// queue, then with `reply from <model>`.
pub(crate) struct ScriptedTransport {
    queues: Mutex<HashMap<String, VecDeque<Scripted>>>,
    fallback: Mutex<VecDeque<Scripted>>,
    streamed: Mutex<VecDeque<Scripted>>,
    calls: Mutex<Vec<RecordedCall>>,
    configured: bool,
    /// Swap in an empty session when this model is called
    switch_on: Option<(String, Workspace)>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self {
            queues: Mutex::new(HashMap::new()),
            fallback: Mutex::new(VecDeque::new()),
            streamed: Mutex::new(VecDeque::new()),
            calls: Mutex::new(Vec::new()),
            configured: true,
            switch_on: None,
        }
    }

    pub fn unconfigured() -> Self {
        Self {
            configured: false,
            ..Self::new()
        }
    }

    pub fn script(self, model_id: &str, reply: Scripted) -> Self {
        self.queues
            .lock()
            .unwrap()
            .entry(model_id.to_string())
            .or_default()
            .push_back(reply);
        self
    }

    pub fn fallback(self, reply: Scripted) -> Self {
        self.fallback.lock().unwrap().push_back(reply);
        self
    }

    /// Reply used by the next streaming call, ahead of every other queue
    pub fn streamed(self, reply: Scripted) -> Self {
        self.streamed.lock().unwrap().push_back(reply);
        self
    }

    /// Replace the workspace's session while `model_id`'s call is in flight
    pub fn switch_session_on(mut self, model_id: &str, workspace: &Workspace) -> Self {
        self.switch_on = Some((model_id.to_string(), workspace.clone()));
        self
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    fn next(&self, model_id: &str) -> Scripted {
        if let Some(reply) = self
            .queues
            .lock()
            .unwrap()
            .get_mut(model_id)
            .and_then(|q| q.pop_front())
        {
            return reply;
        }
        if let Some(reply) = self.fallback.lock().unwrap().pop_front() {
            return reply;
        }
        Scripted::Text(format!("reply from {}", model_id))
    }

    fn record(&self, model_id: &str, messages: &[WireMessage], options: &CompletionOptions, streaming: bool) {
        self.calls.lock().unwrap().push(RecordedCall {
            model_id: model_id.to_string(),
            messages: messages.to_vec(),
            streaming,
            options: options.clone(),
        });
    }
}

#[async_trait]
impl ModelTransport for ScriptedTransport {
    fn is_configured(&self) -> bool {
        self.configured
    }

    async fn send_completion(
        &self,
        model_id: &str,
        messages: &[WireMessage],
        options: &CompletionOptions,
    ) -> Result<String, GatewayError> {
        self.record(model_id, messages, options, false);
        if let Some((on, workspace)) = &self.switch_on {
            if on == model_id {
                workspace.replace(SessionState::new());
            }
        }
        match self.next(model_id) {
            Scripted::Text(t) => Ok(t),
            Scripted::Error(e) => Err(e),
            Scripted::Chunks(pieces) => Ok(pieces.concat()),
            Scripted::Delayed(delay, t) => {
                tokio::time::sleep(delay).await;
                Ok(t)
            }
        }
    }

    async fn send_streaming(
        &self,
        model_id: &str,
        messages: &[WireMessage],
        options: &CompletionOptions,
    ) -> Result<StreamHandle, GatewayError> {
        self.record(model_id, messages, options, true);
        let scripted = self.streamed.lock().unwrap().pop_front();
        let events = match scripted.unwrap_or_else(|| self.next(model_id)) {
            Scripted::Text(t) => vec![StreamEvent::Completed(t)],
            Scripted::Error(e) => return Err(e),
            Scripted::Chunks(pieces) => pieces
                .into_iter()
                .map(StreamEvent::Delta)
                .chain(std::iter::once(StreamEvent::Completed(String::new())))
                .collect(),
            Scripted::Delayed(delay, t) => {
                tokio::time::sleep(delay).await;
                vec![StreamEvent::Completed(t)]
            }
        };
        let (tx, rx) = mpsc::channel(events.len().max(1));
        for event in events {
            let _ = tx.send(event).await;
        }
        Ok(StreamHandle::new(rx))
    }
}

/// In-memory session registry and preference records
pub(crate) struct MemoryStore {
    registry: Mutex<SessionRegistry>,
    prefs: Mutex<HashMap<String, Value>>,
    saves: AtomicUsize,
    fail_reads: bool,
    fail_writes: Mutex<Option<StoreError>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            registry: Mutex::new(SessionRegistry::new()),
            prefs: Mutex::new(HashMap::new()),
            saves: AtomicUsize::new(0),
            fail_reads: false,
            fail_writes: Mutex::new(None),
        }
    }

    pub fn failing_reads() -> Self {
        Self {
            fail_reads: true,
            ..Self::new()
        }
    }

    pub fn fail_writes_with(&self, error: Option<StoreError>) {
        *self.fail_writes.lock().unwrap() = error;
    }

    pub fn save_count(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }

    pub fn stored(&self) -> SessionRegistry {
        self.registry.lock().unwrap().clone()
    }
}

#[async_trait]
impl SessionStore for MemoryStore {
    async fn load_registry(&self) -> Result<SessionRegistry, StoreError> {
        if self.fail_reads {
            return Err(StoreError::Read("sessions".to_string()));
        }
        Ok(self.registry.lock().unwrap().clone())
    }

    async fn save_registry(&self, registry: &SessionRegistry) -> Result<(), StoreError> {
        if let Some(err) = self.fail_writes.lock().unwrap().clone() {
            return Err(err);
        }
        self.saves.fetch_add(1, Ordering::SeqCst);
        *self.registry.lock().unwrap() = registry.clone();
        Ok(())
    }
}

#[async_trait]
impl PreferenceStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<Value>, StoreError> {
        Ok(self.prefs.lock().unwrap().get(key).cloned())
    }

    async fn set(&self, key: &str, value: Value) -> Result<(), StoreError> {
        if let Some(err) = self.fail_writes.lock().unwrap().clone() {
            return Err(err);
        }
        self.prefs.lock().unwrap().insert(key.to_string(), value);
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), StoreError> {
        self.prefs.lock().unwrap().remove(key);
        Ok(())
    }
}
