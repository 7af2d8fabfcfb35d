//! Prompt templates for the orchestrator agent

use crate::conversation::ConversationNode;
use crate::core::message::{MessageSource, Role};
use crate::core::model::ModelBinding;

/// Templates for generating orchestrator prompts
pub struct AgentPromptTemplate;

impl AgentPromptTemplate {
    /// System prompt describing the active models, every existing
    /// conversation with its full transcript, and the JSON reply format.
    pub fn system(active_models: &[ModelBinding], conversations: &[ConversationNode]) -> String {
        let models_list = active_models
            .iter()
            .map(|m| format!("- {} ({})", m.name, m.id))
            .collect::<Vec<_>>()
            .join("\n");

        let conversations_list = if conversations.is_empty() {
            "No existing conversations".to_string()
        } else {
            conversations
                .iter()
                .enumerate()
                .map(|(i, c)| Self::describe_conversation(i, c))
                .collect::<Vec<_>>()
                .join("\n\n")
        };

        format!(
            r#"You are an AI agent orchestrator that helps users explore multiple AI models.

## AVAILABLE ACTIVE MODELS
{models_list}

## EXISTING CONVERSATIONS
{conversations_list}

## YOUR ACTIONS

1. **create_conversations**: Create N separate conversations for exploration
   - "create 3 jokes" -> create 3 conversations with the active models
   - "give me 5 code examples" -> create 5 conversations
   - Conversations are distributed across active models (models may repeat)
   - Write the initial prompt that every new conversation receives

2. **continue_conversations**: Branch from an existing conversation
   - "i like the joke of conversation 1, ask for 2 more similar jokes"
   - Identify the source conversation by ID or model name
   - Create N branches from it, with one new prompt per branch
   - The source conversation is left untouched

3. **chat**: Answer questions about the system itself
   - "how does this work?" -> explain
   - "what models do I have active?" -> list them
   - Nothing is created

## PROMPT GENERATION
- Turn the user's request into the prompt the models will actually see
- "create 3 jokes" -> "Generate a funny joke"
- "give me 5 code examples for sorting" -> "Provide a code example for sorting an array"

## RESPONSE FORMAT

For create_conversations:
{{
  "action": "create_conversations",
  "conversationCount": 3,
  "initialPrompt": "Generate a funny joke",
  "response": "Created 3 conversations!"
}}

For continue_conversations:
{{
  "action": "continue_conversations",
  "sourceConversationId": "1",
  "branchCount": 2,
  "prompts": ["Tell me another similar joke", "Give me one more joke like that"],
  "response": "Created 2 branches from conversation 1!"
}}

For chat:
{{
  "action": "chat",
  "response": "Your helpful response here"
}}

Always return valid JSON only. Be concise and helpful."#
        )
    }

    fn describe_conversation(index: usize, conversation: &ConversationNode) -> String {
        let history = conversation
            .history
            .iter()
            .map(|msg| {
                let sender = match (msg.role, msg.source) {
                    (Role::User, Some(MessageSource::Agent)) => "Agent",
                    (Role::User, _) => "User",
                    _ => conversation.model_name.as_str(),
                };
                format!("    {}: {}", sender, msg.content)
            })
            .collect::<Vec<_>>()
            .join("\n");
        format!(
            "- Conversation {}: {} (ID: {})\n{}",
            index + 1,
            conversation.model_name,
            conversation.id,
            history
        )
    }
}
