//! Council data shapes

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Labels run `A..=Z`, so a council takes at most this many answers.
pub const MAX_COUNCIL_RESPONSES: usize = 26;

/// Anonymized label for the `index`-th answer: `Response A`, `Response B`, ...
///
/// Callers must keep `index` below [`MAX_COUNCIL_RESPONSES`].
///
/// ```
/// use agentic_domain::council::response_label;
///
/// assert_eq!(response_label(0), "Response A");
/// assert_eq!(response_label(2), "Response C");
/// ```
pub fn response_label(index: usize) -> String {
    let letter = (b'A' + (index % MAX_COUNCIL_RESPONSES) as u8) as char;
    format!("Response {}", letter)
}

/// One completed answer entering the council
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CouncilResponse {
    pub model_id: String,
    pub model_name: String,
    pub content: String,
}

impl CouncilResponse {
    pub fn new(
        model_id: impl Into<String>,
        model_name: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        Self {
            model_id: model_id.into(),
            model_name: model_name.into(),
            content: content.into(),
        }
    }
}

/// Model behind an anonymized label
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LabeledModel {
    pub model_id: String,
    pub model_name: String,
}

/// One ranker's verdict
///
/// A failed ranking call is kept with the error text in `full_ranking` and an
/// empty `parsed_ranking`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RankingEntry {
    pub model_id: String,
    pub model_name: String,
    pub full_ranking: String,
    pub parsed_ranking: Vec<String>,
}

/// Consensus position of one label
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregateEntry {
    pub label: String,
    pub model_id: String,
    pub model_name: String,
    /// Mean 1-based position, rounded to two decimals
    pub avg_rank: f64,
    pub rankings_count: usize,
}

/// The chairman's consolidated answer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Synthesis {
    pub model_id: String,
    pub model_name: String,
    pub content: String,
}

/// Outcome of a full council run, embedded in one agent chat message
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CouncilResult {
    pub rankings: Vec<RankingEntry>,
    pub label_to_model: BTreeMap<String, LabeledModel>,
    pub aggregate_rankings: Vec<AggregateEntry>,
    pub synthesis: Synthesis,
}

impl CouncilResult {
    /// Label-to-model map for a list of answers, in answer order
    pub fn label_map(responses: &[CouncilResponse]) -> BTreeMap<String, LabeledModel> {
        responses
            .iter()
            .enumerate()
            .map(|(i, r)| {
                (
                    response_label(i),
                    LabeledModel {
                        model_id: r.model_id.clone(),
                        model_name: r.model_name.clone(),
                    },
                )
            })
            .collect()
    }

    /// Best-ranked entry, if any ranker produced a usable list
    pub fn winner(&self) -> Option<&AggregateEntry> {
        self.aggregate_rankings.first()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_map() {
        let responses = vec![
            CouncilResponse::new("a", "Model A", "one"),
            CouncilResponse::new("b", "Model B", "two"),
        ];
        let map = CouncilResult::label_map(&responses);
        assert_eq!(map.len(), 2);
        assert_eq!(map["Response A"].model_id, "a");
        assert_eq!(map["Response B"].model_name, "Model B");
    }

    #[test]
    fn test_labels_cover_alphabet() {
        assert_eq!(response_label(25), "Response Z");
    }

    #[test]
    fn test_result_serializes_camel_case() {
        let result = CouncilResult {
            rankings: vec![],
            label_to_model: BTreeMap::new(),
            aggregate_rankings: vec![],
            synthesis: Synthesis {
                model_id: "a".to_string(),
                model_name: "A".to_string(),
                content: "final".to_string(),
            },
        };
        let json = serde_json::to_value(&result).unwrap();
        assert!(json.get("labelToModel").is_some());
        assert!(json.get("aggregateRankings").is_some());
        assert_eq!(json["synthesis"]["modelId"], "a");
    }
}
