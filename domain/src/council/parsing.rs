//! Ranking extraction from free-form ranker output
//!
//! Rankers are asked to end with a `FINAL RANKING:` section listing
//! `1. Response C` style lines, but often do not. Extraction falls back in
//! three tiers:
//!
//! 1. numbered `N. Response X` lines after the first marker
//! 2. any `Response X` after the first marker
//! 3. any `Response X` anywhere, when the marker is missing

use regex::Regex;
use std::sync::LazyLock;

pub const FINAL_RANKING_MARKER: &str = "FINAL RANKING:";

static NUMBERED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d+\.\s*(Response [A-Z])").expect("static regex"));
static LABEL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Response [A-Z]").expect("static regex"));

/// Extract ranked labels, best first.
///
/// ```
/// use agentic_domain::council::parse_ranking;
///
/// let text = "A is thin.\n\nFINAL RANKING:\n1. Response C\n2. Response A";
/// assert_eq!(parse_ranking(text), vec!["Response C", "Response A"]);
/// assert!(parse_ranking("").is_empty());
/// ```
pub fn parse_ranking(text: &str) -> Vec<String> {
    if let Some((_, section)) = text.split_once(FINAL_RANKING_MARKER) {
        // Only the text between the first and second marker counts.
        let section = section
            .split_once(FINAL_RANKING_MARKER)
            .map_or(section, |(head, _)| head);

        let numbered: Vec<String> = NUMBERED
            .captures_iter(section)
            .map(|c| c[1].to_string())
            .collect();
        if !numbered.is_empty() {
            return numbered;
        }
        return all_labels(section);
    }
    all_labels(text)
}

fn all_labels(text: &str) -> Vec<String> {
    LABEL
        .find_iter(text)
        .map(|m| m.as_str().to_string())
        .collect()
}
