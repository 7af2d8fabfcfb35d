//! Interpret Command use case
//!
//! Asks the agent model what a free-text request should do and turns the
//! answer into a [`ResolvedAction`].

use crate::config::ChatParams;
use crate::ports::conversation_logger::{ConversationEvent, ConversationLogger, NoConversationLogger};
use crate::ports::model_transport::{CompletionOptions, GatewayError, ModelTransport};
use crate::workspace::Workspace;
use agentic_domain::core::message::to_wire;
use agentic_domain::{
    AgentAction, AgentPromptTemplate, DomainError, Message, ModelBinding, NO_ACTIVE_MODELS_REPLY,
    ResolvedAction, WireMessage,
};
use serde_json::json;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info};

#[derive(Error, Debug)]
pub enum InterpretError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error(transparent)]
    Transport(#[from] GatewayError),
}

/// Input for the InterpretCommand use case
#[derive(Debug, Clone)]
pub struct InterpretInput {
    /// The new request
    pub message: String,
    /// Earlier agent chat turns, oldest first, not including `message`
    pub history: Vec<Message>,
    pub active_models: Vec<ModelBinding>,
    pub agent_model: String,
}

pub struct InterpretCommandUseCase<T: ModelTransport + 'static> {
    transport: Arc<T>,
    workspace: Workspace,
    params: ChatParams,
    logger: Arc<dyn ConversationLogger>,
}

impl<T: ModelTransport + 'static> InterpretCommandUseCase<T> {
    pub fn new(transport: Arc<T>, workspace: Workspace, params: ChatParams) -> Self {
        Self {
            transport,
            workspace,
            params,
            logger: Arc::new(NoConversationLogger),
        }
    }

    pub fn with_logger(mut self, logger: Arc<dyn ConversationLogger>) -> Self {
        self.logger = logger;
        self
    }

    /// Whether the transport has credentials to call the agent model
    pub fn is_configured(&self) -> bool {
        self.transport.is_configured()
    }

    pub async fn execute(&self, input: InterpretInput) -> Result<ResolvedAction, InterpretError> {
        if !self.transport.is_configured() {
            return Err(super::missing_credentials().into());
        }
        if input.active_models.is_empty() {
            info!("No active models, answering without calling the agent model");
            return Ok(ResolvedAction::Chat {
                response: NO_ACTIVE_MODELS_REPLY.to_string(),
            });
        }

        let messages = self.build_messages(&input);
        let options = if self.params.json_response_format {
            CompletionOptions::json_object()
        } else {
            CompletionOptions::default()
        };

        debug!(
            "Interpreting request with {} ({} history messages)",
            input.agent_model,
            input.history.len()
        );
        let raw = self
            .transport
            .send_completion(&input.agent_model, &messages, &options)
            .await?;
        let action = AgentAction::parse(&raw)?.resolve(&input.active_models);

        info!("Agent chose {}", action.kind());
        self.logger.log(ConversationEvent::new(
            "agent_action",
            json!({
                "model": input.agent_model,
                "request": input.message,
                "action": action.kind(),
                "raw": raw,
            }),
        ));
        Ok(action)
    }

    fn build_messages(&self, input: &InterpretInput) -> Vec<WireMessage> {
        let system = self.workspace.read(|s| {
            AgentPromptTemplate::system(&input.active_models, s.forest.nodes())
        });
        let limit = self.params.agent_history_limit;
        let recent = &input.history[input.history.len().saturating_sub(limit)..];

        let mut messages = Vec::with_capacity(recent.len() + 2);
        messages.push(WireMessage::system(system));
        messages.extend(to_wire(recent));
        messages.push(WireMessage::user(input.message.as_str()));
        messages
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::use_cases::test_support::{Scripted, ScriptedTransport};
    use agentic_domain::{Role, SessionState};

    fn models() -> Vec<ModelBinding> {
        vec![
            ModelBinding::new("m1", "Model One"),
            ModelBinding::new("m2", "Model Two"),
        ]
    }

    fn input(message: &str, active_models: Vec<ModelBinding>) -> InterpretInput {
        InterpretInput {
            message: message.to_string(),
            history: Vec::new(),
            active_models,
            agent_model: "agent".to_string(),
        }
    }

    fn use_case(transport: ScriptedTransport) -> (InterpretCommandUseCase<ScriptedTransport>, Arc<ScriptedTransport>) {
        let transport = Arc::new(transport);
        let use_case = InterpretCommandUseCase::new(
            Arc::clone(&transport),
            Workspace::new(),
            ChatParams::default(),
        );
        (use_case, transport)
    }

    #[tokio::test]
    async fn test_create_gets_round_robin_models() {
        let reply = r#"{"action":"create_conversations","conversationCount":3,"initialPrompt":"tell a joke","response":"On it"}"#;
        let (interpreter, transport) =
            use_case(ScriptedTransport::new().script("agent", Scripted::Text(reply.to_string())));

        let action = interpreter
            .execute(input("three jokes please", models()))
            .await
            .unwrap();

        match action {
            ResolvedAction::Create {
                models,
                initial_prompt,
                response,
            } => {
                let ids: Vec<&str> = models.iter().map(|m| m.id.as_str()).collect();
                assert_eq!(ids, vec!["m1", "m2", "m1"]);
                assert_eq!(initial_prompt, "tell a joke");
                assert_eq!(response.as_deref(), Some("On it"));
            }
            other => panic!("unexpected action {:?}", other),
        }

        let calls = transport.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].model_id, "agent");
        assert!(calls[0].options.response_format.is_some());
        assert_eq!(calls[0].messages.first().unwrap().role, Role::System);
        assert_eq!(calls[0].messages.last().unwrap().content, "three jokes please");
    }

    #[tokio::test]
    async fn test_no_active_models_skips_transport() {
        let (interpreter, transport) = use_case(ScriptedTransport::new());
        let action = interpreter.execute(input("hi", Vec::new())).await.unwrap();
        assert_eq!(
            action,
            ResolvedAction::Chat {
                response: NO_ACTIVE_MODELS_REPLY.to_string()
            }
        );
        assert_eq!(transport.call_count(), 0);
    }

    #[tokio::test]
    async fn test_missing_credentials() {
        let (interpreter, _) = use_case(ScriptedTransport::unconfigured());
        let err = interpreter.execute(input("hi", models())).await.unwrap_err();
        assert!(matches!(
            err,
            InterpretError::Domain(DomainError::Configuration(_))
        ));
    }

    #[tokio::test]
    async fn test_malformed_reply_is_invalid_action() {
        let (interpreter, _) = use_case(
            ScriptedTransport::new().script("agent", Scripted::Text("sure thing!".to_string())),
        );
        let err = interpreter.execute(input("hi", models())).await.unwrap_err();
        assert!(matches!(err, InterpretError::Domain(DomainError::InvalidAction(_))));
    }

    #[tokio::test]
    async fn test_transport_failure_propagates() {
        let (interpreter, _) = use_case(
            ScriptedTransport::new().script("agent", Scripted::Error(GatewayError::Timeout)),
        );
        let err = interpreter.execute(input("hi", models())).await.unwrap_err();
        assert_eq!(err.to_string(), "Timeout");
    }

    #[tokio::test]
    async fn test_prompt_lists_conversations_and_trims_history() {
        let mut state = SessionState::new();
        state
            .forest
            .create_roots(&[ModelBinding::new("m1", "Model One")], "capital of peru?");
        let transport = Arc::new(ScriptedTransport::new().script(
            "agent",
            Scripted::Text(r#"{"action":"chat","response":"hello"}"#.to_string()),
        ));
        let interpreter = InterpretCommandUseCase::new(
            Arc::clone(&transport),
            Workspace::from_state(state),
            ChatParams::default()
                .with_agent_history_limit(2)
                .with_json_response_format(false),
        );

        let mut request = input("hi", models());
        request.history = (0..5)
            .map(|i| Message::assistant(format!("old {}", i)))
            .collect();
        let action = interpreter.execute(request).await.unwrap();
        assert_eq!(
            action,
            ResolvedAction::Chat {
                response: "hello".to_string()
            }
        );

        let call = &transport.calls()[0];
        assert!(call.options.response_format.is_none());
        assert!(call.messages[0].content.contains("capital of peru?"));
        // system + two history messages + request
        assert_eq!(call.messages.len(), 4);
        assert_eq!(call.messages[1].content, "old 3");
    }
}
