//! Prompt templates for the council stages

use crate::council::{CouncilResponse, FINAL_RANKING_MARKER, RankingEntry, response_label};

/// Templates for the ranking and synthesis stages
pub struct CouncilPromptTemplate;

impl CouncilPromptTemplate {
    /// Peer-ranking prompt over anonymized answers
    pub fn ranking(query: &str, responses: &[CouncilResponse]) -> String {
        let responses_text = responses
            .iter()
            .enumerate()
            .map(|(i, r)| format!("{}:\n{}", response_label(i), r.content))
            .collect::<Vec<_>>()
            .join("\n\n");

        format!(
            r#"You are evaluating different responses to the following question:

Question: {query}

Here are the responses from different models (anonymized):

{responses_text}

Your task:
1. First, evaluate each response individually. For each response, explain what it does well and what it does poorly.
2. Then, at the very end of your response, provide a final ranking.

IMPORTANT: Your final ranking MUST be formatted EXACTLY as follows:
- Start with the line "{marker}" (all caps, with colon)
- Then list the responses from best to worst as a numbered list
- Each line should be: number, period, space, then ONLY the response label (e.g., "1. Response A")
- Do not add any other text or explanations in the ranking section

Example of the correct format for your ENTIRE response:

Response A provides good detail on X but misses Y...
Response B is accurate but lacks depth on Z...
Response C offers the most comprehensive answer...

{marker}
1. Response C
2. Response A
3. Response B

Now provide your evaluation and ranking:"#,
            marker = FINAL_RANKING_MARKER
        )
    }

    /// Chairman prompt embedding every answer and every ranking verbatim
    pub fn synthesis(query: &str, responses: &[CouncilResponse], rankings: &[RankingEntry]) -> String {
        let stage1 = responses
            .iter()
            .map(|r| format!("Model: {}\nResponse: {}", r.model_name, r.content))
            .collect::<Vec<_>>()
            .join("\n\n");
        let stage2 = rankings
            .iter()
            .map(|r| format!("Model: {}\nRanking: {}", r.model_name, r.full_ranking))
            .collect::<Vec<_>>()
            .join("\n\n");

        format!(
            r#"You are the Chairman of an LLM Council. Multiple AI models have provided responses to a user's question, and then ranked each other's responses.

Original Question: {query}

STAGE 1 - Individual Responses:
{stage1}

STAGE 2 - Peer Rankings:
{stage2}

Your task as Chairman is to synthesize all of this information into a single, comprehensive, accurate answer to the user's original question. Consider:
- The individual responses and their insights
- The peer rankings and what they reveal about response quality
- Any patterns of agreement or disagreement

Provide a clear, well-reasoned final answer that represents the council's collective wisdom:"#
        )
    }
}
