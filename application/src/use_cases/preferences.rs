//! User preferences
//!
//! Small key/value records kept outside the session registry: the API key,
//! the active model list, the agent model and the tree expand state.
//! Unreadable records read as their defaults.

use crate::ports::session_store::{PreferenceStore, StoreError};
use agentic_domain::{ConversationId, DomainError, ModelBinding};
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, warn};

pub const CREDENTIALS_KEY: &str = "credentials";
pub const ACTIVE_MODELS_KEY: &str = "active_models";
pub const AGENT_MODEL_KEY: &str = "agent_model";
pub const EXPANDED_KEY: &str = "tree_expanded";

#[derive(Error, Debug)]
pub enum PreferenceError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

#[derive(Clone)]
pub struct Preferences {
    store: Arc<dyn PreferenceStore>,
    default_models: Vec<ModelBinding>,
    default_agent_model: String,
}

impl Preferences {
    pub fn new(store: Arc<dyn PreferenceStore>) -> Self {
        Self {
            store,
            default_models: ModelBinding::default_active_models(),
            default_agent_model: ModelBinding::default_agent_model().to_string(),
        }
    }

    /// Replace the first-run defaults, e.g. with the ones from a config file
    pub fn with_defaults(mut self, models: Vec<ModelBinding>, agent_model: impl Into<String>) -> Self {
        self.default_models = models;
        self.default_agent_model = agent_model.into();
        self
    }

    async fn read<V: DeserializeOwned>(&self, key: &str) -> Option<V> {
        match self.store.get(key).await {
            Ok(Some(value)) => match serde_json::from_value(value) {
                Ok(v) => Some(v),
                Err(e) => {
                    warn!("Ignoring unreadable preference '{}': {}", key, e);
                    None
                }
            },
            Ok(None) => None,
            Err(e) => {
                warn!("Could not read preference '{}': {}", key, e);
                None
            }
        }
    }

    // ==================== Credentials ====================

    pub async fn api_key(&self) -> Option<String> {
        self.read::<String>(CREDENTIALS_KEY)
            .await
            .filter(|k| !k.trim().is_empty())
    }

    pub async fn set_api_key(&self, key: &str) -> Result<(), PreferenceError> {
        self.store
            .set(CREDENTIALS_KEY, Value::String(key.trim().to_string()))
            .await?;
        Ok(())
    }

    pub async fn clear_api_key(&self) -> Result<(), PreferenceError> {
        self.store.remove(CREDENTIALS_KEY).await?;
        Ok(())
    }

    // ==================== Active models ====================

    /// The active model list; the first read stores the defaults
    pub async fn active_models(&self) -> Vec<ModelBinding> {
        if let Some(models) = self.read::<Vec<ModelBinding>>(ACTIVE_MODELS_KEY).await {
            return models;
        }
        let defaults = self.default_models.clone();
        if let Err(e) = self.write_models(&defaults).await {
            warn!("Could not store default models: {}", e);
        }
        defaults
    }

    /// Add a model. Returns false when it is already active.
    pub async fn add_active_model(&self, model: ModelBinding) -> Result<bool, PreferenceError> {
        let mut models = self.active_models().await;
        if models.iter().any(|m| m.id == model.id) {
            return Ok(false);
        }
        info!("Activating model {}", model.id);
        models.push(model);
        self.write_models(&models).await?;
        Ok(true)
    }

    pub async fn remove_active_model(&self, model_id: &str) -> Result<ModelBinding, PreferenceError> {
        let mut models = self.active_models().await;
        let index = models
            .iter()
            .position(|m| m.id == model_id)
            .ok_or_else(|| DomainError::NotFound {
                kind: "Model",
                id: model_id.to_string(),
            })?;
        let removed = models.remove(index);
        self.write_models(&models).await?;
        info!("Deactivated model {}", removed.id);
        Ok(removed)
    }

    async fn write_models(&self, models: &[ModelBinding]) -> Result<(), StoreError> {
        self.store.set(ACTIVE_MODELS_KEY, json!(models)).await
    }

    // ==================== Agent model ====================

    pub async fn agent_model(&self) -> String {
        self.read::<String>(AGENT_MODEL_KEY)
            .await
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| self.default_agent_model.clone())
    }

    pub async fn set_agent_model(&self, model_id: &str) -> Result<(), PreferenceError> {
        self.store
            .set(AGENT_MODEL_KEY, Value::String(model_id.to_string()))
            .await?;
        Ok(())
    }

    // ==================== Tree expand state ====================

    pub async fn expanded_ids(&self) -> Vec<ConversationId> {
        self.read(EXPANDED_KEY).await.unwrap_or_default()
    }

    pub async fn set_expanded_ids(&self, ids: &[ConversationId]) -> Result<(), PreferenceError> {
        self.store.set(EXPANDED_KEY, json!(ids)).await?;
        Ok(())
    }
}
