//! Rank aggregation across rankers

use super::entities::{AggregateEntry, LabeledModel, RankingEntry};
use std::collections::{BTreeMap, HashMap};

/// Average each label's 1-based position over the rankings that mention it.
///
/// Labels no ranker mentioned are left out rather than counted as last, as
/// are labels absent from `label_to_model`. The result is sorted by average
/// position ascending; ties go to the label with more rankings, then to the
/// earlier label.
pub fn calculate_aggregate_rankings(
    rankings: &[RankingEntry],
    label_to_model: &BTreeMap<String, LabeledModel>,
) -> Vec<AggregateEntry> {
    let mut positions: HashMap<&str, Vec<usize>> = HashMap::new();
    for ranking in rankings {
        for (position, label) in ranking.parsed_ranking.iter().enumerate() {
            positions
                .entry(label.as_str())
                .or_default()
                .push(position + 1);
        }
    }

    let mut aggregate: Vec<AggregateEntry> = positions
        .into_iter()
        .filter_map(|(label, positions)| {
            let model = label_to_model.get(label)?;
            let sum: usize = positions.iter().sum();
            let avg = sum as f64 / positions.len() as f64;
            Some(AggregateEntry {
                label: label.to_string(),
                model_id: model.model_id.clone(),
                model_name: model.model_name.clone(),
                avg_rank: (avg * 100.0).round() / 100.0,
                rankings_count: positions.len(),
            })
        })
        .collect();

    aggregate.sort_by(|a, b| {
        a.avg_rank
            .total_cmp(&b.avg_rank)
            .then_with(|| b.rankings_count.cmp(&a.rankings_count))
            .then_with(|| a.label.cmp(&b.label))
    });
    aggregate
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::council::{CouncilResponse, CouncilResult};

    fn ranking(labels: &[&str]) -> RankingEntry {
        RankingEntry {
            model_id: "m".to_string(),
            model_name: "M".to_string(),
            full_ranking: String::new(),
            parsed_ranking: labels.iter().map(|l| l.to_string()).collect(),
        }
    }

    fn labels(n: usize) -> BTreeMap<String, LabeledModel> {
        let responses: Vec<_> = (0..n)
            .map(|i| CouncilResponse::new(format!("model-{}", i), format!("Model {}", i), "x"))
            .collect();
        CouncilResult::label_map(&responses)
    }

    #[test]
    fn test_average_positions() {
        let rankings = vec![
            ranking(&["Response A", "Response B"]),
            ranking(&["Response B", "Response A"]),
            ranking(&["Response A", "Response B"]),
        ];
        let result = calculate_aggregate_rankings(&rankings, &labels(2));
        assert_eq!(result.len(), 2);
        assert_eq!(result[0].label, "Response A");
        assert_eq!(result[0].avg_rank, 1.33);
        assert_eq!(result[0].model_id, "model-0");
        assert_eq!(result[1].label, "Response B");
        assert_eq!(result[1].avg_rank, 1.67);
        assert_eq!(result[1].rankings_count, 3);
    }

    #[test]
    fn test_unmentioned_labels_excluded() {
        let rankings = vec![ranking(&["Response B"]), ranking(&[])];
        let result = calculate_aggregate_rankings(&rankings, &labels(3));
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].label, "Response B");
        assert_eq!(result[0].avg_rank, 1.0);
    }

    #[test]
    fn test_unknown_labels_excluded() {
        let rankings = vec![ranking(&["Response Q", "Response A"])];
        let result = calculate_aggregate_rankings(&rankings, &labels(2));
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].avg_rank, 2.0);
    }

    #[test]
    fn test_ties_prefer_more_rankings_then_label() {
        let rankings = vec![
            ranking(&["Response C", "Response B"]),
            ranking(&["Response A", "Response B"]),
            ranking(&["Response B", "Response A"]),
        ];
        // A: (1+2)/2 = 1.5 over 2, B: (2+2+1)/3 = 1.67, C: 1.0 over 1
        let result = calculate_aggregate_rankings(&rankings, &labels(3));
        let order: Vec<_> = result.iter().map(|e| e.label.as_str()).collect();
        assert_eq!(order, vec!["Response C", "Response A", "Response B"]);

        let rankings = vec![ranking(&["Response B"]), ranking(&["Response A"])];
        let result = calculate_aggregate_rankings(&rankings, &labels(2));
        let order: Vec<_> = result.iter().map(|e| e.label.as_str()).collect();
        assert_eq!(order, vec!["Response A", "Response B"]);
    }

    #[test]
    fn test_empty_rankings() {
        assert!(calculate_aggregate_rankings(&[], &labels(2)).is_empty());
    }
}
