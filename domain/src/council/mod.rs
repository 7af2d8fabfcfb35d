//! Council domain
//!
//! Peer ranking of anonymized answers followed by a chairman synthesis.
//! This module holds the data shapes and the pure parts of the workflow:
//! labelling, ranking parsing and rank aggregation. Model calls live in the
//! application layer.

mod aggregate;
mod entities;
mod parsing;

pub use aggregate::calculate_aggregate_rankings;
pub use entities::{
    AggregateEntry, CouncilResponse, CouncilResult, LabeledModel, RankingEntry, Synthesis,
    MAX_COUNCIL_RESPONSES, response_label,
};
pub use parsing::{FINAL_RANKING_MARKER, parse_ranking};
