//! Run Council use case
//!
//! Stage 2 asks every answering model to rank the anonymized answers, in
//! parallel. Stage 3 asks the chairman for one consolidated answer and only
//! starts once every ranking has settled.

use crate::ports::conversation_logger::{ConversationEvent, ConversationLogger, NoConversationLogger};
use crate::ports::model_transport::{CompletionOptions, ModelTransport};
use crate::ports::progress::{CouncilStage, NoProgress, ProgressNotifier};
use agentic_domain::council::MAX_COUNCIL_RESPONSES;
use agentic_domain::{
    CouncilPromptTemplate, CouncilResponse, CouncilResult, DomainError, RankingEntry, Synthesis,
    WireMessage, calculate_aggregate_rankings, parse_ranking,
};
use futures::future::join_all;
use serde_json::json;
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, warn};

/// Errors that can occur during a council run
#[derive(Error, Debug)]
pub enum CouncilError {
    #[error(transparent)]
    Domain(#[from] DomainError),
}

/// Input for the RunCouncil use case
#[derive(Debug, Clone)]
pub struct RunCouncilInput {
    /// The question every answer responds to
    pub query: String,
    /// Completed answers, in label order
    pub responses: Vec<CouncilResponse>,
    /// Defaults to the first answer's model
    pub chairman_model_id: Option<String>,
}

impl RunCouncilInput {
    pub fn new(query: impl Into<String>, responses: Vec<CouncilResponse>) -> Self {
        Self {
            query: query.into(),
            responses,
            chairman_model_id: None,
        }
    }

    pub fn with_chairman(mut self, model_id: impl Into<String>) -> Self {
        self.chairman_model_id = Some(model_id.into());
        self
    }
}

/// Use case for running a council over completed answers
pub struct RunCouncilUseCase<T: ModelTransport + 'static> {
    transport: Arc<T>,
    logger: Arc<dyn ConversationLogger>,
}

impl<T: ModelTransport + 'static> RunCouncilUseCase<T> {
    pub fn new(transport: Arc<T>) -> Self {
        Self {
            transport,
            logger: Arc::new(NoConversationLogger),
        }
    }

    pub fn with_logger(mut self, logger: Arc<dyn ConversationLogger>) -> Self {
        self.logger = logger;
        self
    }

    /// Execute the use case with default (no-op) progress
    pub async fn execute(&self, input: RunCouncilInput) -> Result<CouncilResult, CouncilError> {
        self.execute_with_progress(input, &NoProgress).await
    }

    /// Execute the use case with progress callbacks
    pub async fn execute_with_progress(
        &self,
        input: RunCouncilInput,
        progress: &dyn ProgressNotifier,
    ) -> Result<CouncilResult, CouncilError> {
        let count = input.responses.len();
        if count < 2 {
            return Err(DomainError::InsufficientResponses { count }.into());
        }
        if count > MAX_COUNCIL_RESPONSES {
            return Err(DomainError::TooManyResponses { count }.into());
        }
        if !self.transport.is_configured() {
            return Err(super::missing_credentials().into());
        }

        let chairman = input
            .chairman_model_id
            .clone()
            .unwrap_or_else(|| input.responses[0].model_id.clone());
        info!("Starting council with {} responses, chairman {}", count, chairman);

        let rankings = self.collect_rankings(&input, progress).await;
        let label_to_model = CouncilResult::label_map(&input.responses);
        let aggregate_rankings = calculate_aggregate_rankings(&rankings, &label_to_model);
        let synthesis = self.synthesize(&input, &rankings, &chairman, progress).await;

        let result = CouncilResult {
            rankings,
            label_to_model,
            aggregate_rankings,
            synthesis,
        };
        self.logger.log(ConversationEvent::new(
            "council_completed",
            json!({
                "query": input.query,
                "chairman": result.synthesis.model_id,
                "winner": result.winner().map(|w| w.model_id.clone()),
                "rankings": result.rankings.len(),
            }),
        ));
        Ok(result)
    }

    /// Stage 2: every answering model ranks all answers.
    ///
    /// A failed call keeps its slot with the error text and an empty parse.
    async fn collect_rankings(
        &self,
        input: &RunCouncilInput,
        progress: &dyn ProgressNotifier,
    ) -> Vec<RankingEntry> {
        info!("Stage 2: Peer Ranking");
        progress.on_stage_start(CouncilStage::Ranking, input.responses.len());

        let messages = vec![WireMessage::user(CouncilPromptTemplate::ranking(
            &input.query,
            &input.responses,
        ))];
        let options = CompletionOptions::default();

        let calls = input.responses.iter().map(|r| {
            let transport = Arc::clone(&self.transport);
            let messages = &messages;
            let options = &options;
            async move {
                let result = transport
                    .send_completion(&r.model_id, messages, options)
                    .await;
                (r, result)
            }
        });

        let mut rankings = Vec::with_capacity(input.responses.len());
        for (response, result) in join_all(calls).await {
            let entry = match result {
                Ok(text) => {
                    progress.on_task_complete(CouncilStage::Ranking, &response.model_name, true);
                    RankingEntry {
                        model_id: response.model_id.clone(),
                        model_name: response.model_name.clone(),
                        parsed_ranking: parse_ranking(&text),
                        full_ranking: text,
                    }
                }
                Err(e) => {
                    warn!("Ranking from {} failed: {}", response.model_name, e);
                    progress.on_task_complete(CouncilStage::Ranking, &response.model_name, false);
                    RankingEntry {
                        model_id: response.model_id.clone(),
                        model_name: response.model_name.clone(),
                        full_ranking: format!("Error: {}", e),
                        parsed_ranking: Vec::new(),
                    }
                }
            };
            rankings.push(entry);
        }

        progress.on_stage_complete(CouncilStage::Ranking);
        rankings
    }

    /// Stage 3: chairman synthesis. Failure becomes the synthesis text.
    async fn synthesize(
        &self,
        input: &RunCouncilInput,
        rankings: &[RankingEntry],
        chairman: &str,
        progress: &dyn ProgressNotifier,
    ) -> Synthesis {
        info!("Stage 3: Chairman Synthesis");
        progress.on_stage_start(CouncilStage::Synthesis, 1);

        let messages = vec![WireMessage::user(CouncilPromptTemplate::synthesis(
            &input.query,
            &input.responses,
            rankings,
        ))];
        let chairman_name = input
            .responses
            .iter()
            .find(|r| r.model_id == chairman)
            .map(|r| r.model_name.clone());

        let synthesis = match self
            .transport
            .send_completion(chairman, &messages, &CompletionOptions::default())
            .await
        {
            Ok(content) => {
                progress.on_task_complete(
                    CouncilStage::Synthesis,
                    chairman_name.as_deref().unwrap_or("Chairman"),
                    true,
                );
                Synthesis {
                    model_id: chairman.to_string(),
                    model_name: chairman_name.unwrap_or_else(|| "Chairman".to_string()),
                    content,
                }
            }
            Err(e) => {
                warn!("Chairman synthesis failed: {}", e);
                progress.on_task_complete(CouncilStage::Synthesis, "Chairman", false);
                Synthesis {
                    model_id: chairman.to_string(),
                    model_name: "Chairman".to_string(),
                    content: format!("Error synthesizing response: {}", e),
                }
            }
        };

        progress.on_stage_complete(CouncilStage::Synthesis);
        synthesis
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::model_transport::GatewayError;
    use crate::use_cases::test_support::{Scripted, ScriptedTransport};
    use std::sync::Mutex;

    fn responses(n: usize) -> Vec<CouncilResponse> {
        (0..n)
            .map(|i| {
                CouncilResponse::new(
                    format!("m{}", i),
                    format!("Model {}", i),
                    format!("answer {}", i),
                )
            })
            .collect()
    }

    #[derive(Default)]
    struct RecordingProgress {
        events: Mutex<Vec<String>>,
    }

    impl ProgressNotifier for RecordingProgress {
        fn on_stage_start(&self, stage: CouncilStage, total: usize) {
            self.events
                .lock()
                .unwrap()
                .push(format!("start {} {}", stage, total));
        }
        fn on_task_complete(&self, stage: CouncilStage, model: &str, success: bool) {
            self.events
                .lock()
                .unwrap()
                .push(format!("done {} {} {}", stage, model, success));
        }
        fn on_stage_complete(&self, stage: CouncilStage) {
            self.events.lock().unwrap().push(format!("end {}", stage));
        }
    }

    #[tokio::test]
    async fn test_single_response_issues_no_calls() {
        let transport = Arc::new(ScriptedTransport::new());
        let use_case = RunCouncilUseCase::new(Arc::clone(&transport));
        let err = use_case
            .execute(RunCouncilInput::new("q", responses(1)))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            CouncilError::Domain(DomainError::InsufficientResponses { count: 1 })
        ));
        assert_eq!(transport.call_count(), 0);
    }

    #[tokio::test]
    async fn test_too_many_responses() {
        let transport = Arc::new(ScriptedTransport::new());
        let use_case = RunCouncilUseCase::new(Arc::clone(&transport));
        let err = use_case
            .execute(RunCouncilInput::new("q", responses(27)))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            CouncilError::Domain(DomainError::TooManyResponses { count: 27 })
        ));
        assert_eq!(transport.call_count(), 0);
    }

    #[tokio::test]
    async fn test_full_run() {
        let transport = ScriptedTransport::new()
            .script("m0", Scripted::Text("B is better.\nFINAL RANKING:\n1. Response B\n2. Response A".to_string()))
            .script("m1", Scripted::Text("FINAL RANKING:\n1. Response B\n2. Response A".to_string()))
            .script("m0", Scripted::Text("The consolidated answer".to_string()));
        let transport = Arc::new(transport);
        let use_case = RunCouncilUseCase::new(Arc::clone(&transport));
        let progress = RecordingProgress::default();

        let result = use_case
            .execute_with_progress(RunCouncilInput::new("why?", responses(2)), &progress)
            .await
            .unwrap();

        assert_eq!(result.rankings.len(), 2);
        assert_eq!(result.rankings[0].model_id, "m0");
        assert_eq!(result.rankings[0].parsed_ranking, vec!["Response B", "Response A"]);
        assert_eq!(result.aggregate_rankings[0].model_id, "m1");
        assert_eq!(result.aggregate_rankings[0].avg_rank, 1.0);
        assert_eq!(result.synthesis.model_id, "m0");
        assert_eq!(result.synthesis.model_name, "Model 0");
        assert_eq!(result.synthesis.content, "The consolidated answer");

        // Two ranking calls, then the chairman call last.
        let calls = transport.calls();
        assert_eq!(calls.len(), 3);
        assert!(calls[0].messages[0].content.contains("Response A:\nanswer 0"));
        assert!(calls[2].messages[0].content.contains("STAGE 2 - Peer Rankings"));

        let events = progress.events.lock().unwrap();
        assert_eq!(events.first().unwrap(), "start Peer Ranking 2");
        assert_eq!(events.last().unwrap(), "end Chairman Synthesis");
    }

    #[tokio::test]
    async fn test_failed_ranking_keeps_slot() {
        let transport = ScriptedTransport::new()
            .script("m1", Scripted::Error(GatewayError::Timeout))
            .script("m0", Scripted::Text("FINAL RANKING:\n1. Response A\n2. Response B".to_string()));
        let use_case = RunCouncilUseCase::new(Arc::new(transport));

        let result = use_case
            .execute(RunCouncilInput::new("q", responses(2)))
            .await
            .unwrap();
        assert_eq!(result.rankings[1].full_ranking, "Error: Timeout");
        assert!(result.rankings[1].parsed_ranking.is_empty());
        assert_eq!(result.aggregate_rankings.len(), 2);
        assert_eq!(result.aggregate_rankings[0].rankings_count, 1);
    }

    #[tokio::test]
    async fn test_outside_chairman_and_failed_synthesis() {
        let transport = ScriptedTransport::new().script(
            "judge",
            Scripted::Error(GatewayError::Api {
                status: 500,
                message: "upstream down".to_string(),
            }),
        );
        let use_case = RunCouncilUseCase::new(Arc::new(transport));

        let result = use_case
            .execute(RunCouncilInput::new("q", responses(3)).with_chairman("judge"))
            .await
            .unwrap();
        assert_eq!(result.synthesis.model_id, "judge");
        assert_eq!(result.synthesis.model_name, "Chairman");
        assert_eq!(result.synthesis.content, "Error synthesizing response: upstream down");
    }

    #[tokio::test]
    async fn test_outside_chairman_success_is_named_chairman() {
        let transport = ScriptedTransport::new().script("judge", Scripted::Text("ok".to_string()));
        let use_case = RunCouncilUseCase::new(Arc::new(transport));
        let result = use_case
            .execute(RunCouncilInput::new("q", responses(2)).with_chairman("judge"))
            .await
            .unwrap();
        assert_eq!(result.synthesis.model_name, "Chairman");
        assert_eq!(result.synthesis.content, "ok");
    }
}
