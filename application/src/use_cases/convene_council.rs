//! Convene Council use case
//!
//! Runs a council over the latest replies of existing root conversations and
//! posts the outcome to the current agent chat.

use super::agent_chats::AgentChatService;
use super::run_council::{CouncilError, RunCouncilInput, RunCouncilUseCase};
use crate::ports::model_transport::ModelTransport;
use crate::ports::progress::{NoProgress, ProgressNotifier};
use crate::workspace::Workspace;
use agentic_domain::{
    ConversationId, ConversationNode, CouncilResponse, CouncilResult, DomainError, Message,
};
use tracing::info;

/// Input for the ConveneCouncil use case
#[derive(Debug, Clone, Default)]
pub struct ConveneCouncilInput {
    /// Conversations to compare; empty means every root with a usable reply
    pub conversation_ids: Vec<ConversationId>,
    pub chairman_model_id: Option<String>,
}

pub struct ConveneCouncilUseCase<T: ModelTransport + 'static> {
    council: RunCouncilUseCase<T>,
    workspace: Workspace,
    agent_chats: AgentChatService,
}

impl<T: ModelTransport + 'static> ConveneCouncilUseCase<T> {
    pub fn new(
        council: RunCouncilUseCase<T>,
        workspace: Workspace,
        agent_chats: AgentChatService,
    ) -> Self {
        Self {
            council,
            workspace,
            agent_chats,
        }
    }

    pub async fn execute(&self, input: ConveneCouncilInput) -> Result<CouncilResult, CouncilError> {
        self.execute_with_progress(input, &NoProgress).await
    }

    pub async fn execute_with_progress(
        &self,
        input: ConveneCouncilInput,
        progress: &dyn ProgressNotifier,
    ) -> Result<CouncilResult, CouncilError> {
        let (query, responses) = self.gather(&input.conversation_ids)?;
        info!(
            "Convening council over {} conversations",
            responses.len()
        );

        let generation = self.agent_chats.generation();
        let mut run = RunCouncilInput::new(query, responses);
        run.chairman_model_id = input.chairman_model_id;
        let result = self.council.execute_with_progress(run, progress).await?;

        self.agent_chats.push_if_generation(
            generation,
            Message::assistant(result.synthesis.content.clone()).with_council(result.clone()),
        );
        Ok(result)
    }

    /// Collect the query and one answer per selected conversation.
    ///
    /// Conversations without a successful reply are left out.
    fn gather(
        &self,
        ids: &[ConversationId],
    ) -> Result<(String, Vec<CouncilResponse>), DomainError> {
        self.workspace.read(|s| {
            let selected: Vec<&ConversationNode> = if ids.is_empty() {
                s.forest.roots().collect()
            } else {
                ids.iter()
                    .map(|id| {
                        s.forest
                            .get(id)
                            .ok_or_else(|| DomainError::conversation_not_found(id.as_str()))
                    })
                    .collect::<Result<_, _>>()?
            };

            let answered: Vec<&ConversationNode> = selected
                .into_iter()
                .filter(|n| n.last_reply().is_some_and(|m| !m.is_error()))
                .collect();

            let query = answered
                .first()
                .and_then(|n| n.first_prompt())
                .unwrap_or_default()
                .to_string();
            let responses = answered
                .iter()
                .filter_map(|n| {
                    n.last_reply().map(|reply| {
                        CouncilResponse::new(&n.model_id, &n.model_name, &reply.content)
                    })
                })
                .collect();
            Ok((query, responses))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::events::EventBus;
    use crate::use_cases::test_support::{Scripted, ScriptedTransport};
    use agentic_domain::{MessageSource, ModelBinding, SessionState};
    use std::sync::Arc;

    fn workspace_with_roots(replies: &[(&str, Option<Message>)]) -> (Workspace, Vec<ConversationId>) {
        let mut state = SessionState::new();
        let bindings: Vec<ModelBinding> = replies
            .iter()
            .map(|(m, _)| ModelBinding::new(*m, format!("Model {}", m)))
            .collect();
        let ids = state.forest.create_roots(&bindings, "what is rust?");
        for (id, (_, reply)) in ids.iter().zip(replies) {
            if let Some(reply) = reply {
                state.forest.append(id, reply.clone()).unwrap();
            }
        }
        (Workspace::from_state(state), ids)
    }

    fn use_case(
        transport: ScriptedTransport,
        workspace: &Workspace,
    ) -> (ConveneCouncilUseCase<ScriptedTransport>, Arc<ScriptedTransport>) {
        let transport = Arc::new(transport);
        let chats = AgentChatService::new(workspace.clone(), EventBus::default());
        (
            ConveneCouncilUseCase::new(
                RunCouncilUseCase::new(Arc::clone(&transport)),
                workspace.clone(),
                chats,
            ),
            transport,
        )
    }

    #[tokio::test]
    async fn test_default_selection_skips_errors_and_pending() {
        let (workspace, _) = workspace_with_roots(&[
            ("a", Some(Message::assistant("answer a"))),
            ("b", Some(Message::error("boom"))),
            ("c", None),
            ("d", Some(Message::assistant("answer d"))),
        ]);
        let transport = ScriptedTransport::new().script("a", Scripted::Text("FINAL RANKING:\n1. Response B\n2. Response A".to_string()));
        let (convene, transport) = use_case(transport, &workspace);

        let result = convene.execute(ConveneCouncilInput::default()).await.unwrap();

        assert_eq!(result.label_to_model.len(), 2);
        assert_eq!(result.label_to_model["Response B"].model_id, "d");
        assert_eq!(result.winner().unwrap().model_id, "d");
        // two rankings plus the chairman
        assert_eq!(transport.call_count(), 3);
        assert!(transport.calls()[0].messages[0].content.contains("Question: what is rust?"));

        let posted = workspace.read(|s| s.agent_chats.history().last().cloned()).unwrap();
        assert_eq!(posted.content, result.synthesis.content);
        assert!(posted.council.is_some());
    }

    #[tokio::test]
    async fn test_unknown_conversation() {
        let (workspace, _) = workspace_with_roots(&[("a", Some(Message::assistant("x")))]);
        let (convene, transport) = use_case(ScriptedTransport::new(), &workspace);
        let err = convene
            .execute(ConveneCouncilInput {
                conversation_ids: vec![ConversationId::new("99")],
                chairman_model_id: None,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, CouncilError::Domain(ref e) if e.is_not_found()));
        assert_eq!(transport.call_count(), 0);
    }

    #[tokio::test]
    async fn test_too_few_answers_posts_nothing() {
        let (workspace, _) = workspace_with_roots(&[
            ("a", Some(Message::assistant("only one"))),
            ("b", None),
        ]);
        let (convene, transport) = use_case(ScriptedTransport::new(), &workspace);
        let err = convene.execute(ConveneCouncilInput::default()).await.unwrap_err();
        assert!(matches!(
            err,
            CouncilError::Domain(DomainError::InsufficientResponses { count: 1 })
        ));
        assert_eq!(transport.call_count(), 0);
        assert!(workspace.read(|s| s.agent_chats.history().is_empty()));
    }

    #[tokio::test]
    async fn test_explicit_selection_includes_branches() {
        let (workspace, ids) = workspace_with_roots(&[("a", Some(Message::assistant("root")))]);
        let branch = workspace.write(|s| {
            let b = s
                .forest
                .create_branches(&ids[0], 1, &["more".to_string()], MessageSource::Agent)
                .unwrap();
            s.forest.append(&b[0], Message::assistant("branch")).unwrap();
            b[0].clone()
        });
        let (convene, _) = use_case(ScriptedTransport::new(), &workspace);

        let result = convene
            .execute(ConveneCouncilInput {
                conversation_ids: vec![ids[0].clone(), branch],
                chairman_model_id: Some("judge".to_string()),
            })
            .await
            .unwrap();
        assert_eq!(result.rankings.len(), 2);
        assert_eq!(result.synthesis.model_name, "Chairman");
    }

    #[tokio::test]
    async fn test_result_dropped_when_session_switches_mid_run() {
        let (workspace, _) = workspace_with_roots(&[
            ("a", Some(Message::assistant("answer a"))),
            ("b", Some(Message::assistant("answer b"))),
        ]);
        // `b` only ranks, so the switch lands before the synthesis is posted.
        let transport = ScriptedTransport::new().switch_session_on("b", &workspace);
        let (convene, _) = use_case(transport, &workspace);

        let result = convene.execute(ConveneCouncilInput::default()).await.unwrap();

        assert_eq!(result.rankings.len(), 2);
        assert!(workspace.read(|s| s.agent_chats.history().is_empty()));
    }
}
