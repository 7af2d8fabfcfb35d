//! Resolving free-text conversation references

use super::entities::ConversationNode;

/// Resolve a reference produced by the orchestrator.
///
/// Tries, in order: an exact id, a case-insensitive model name substring, and
/// finally the first number in the text as a 1-based position ("conversation 2").
pub fn find_target_conversation<'a>(
    reference: &str,
    nodes: &'a [ConversationNode],
) -> Option<&'a ConversationNode> {
    let reference = reference.trim();
    if reference.is_empty() {
        return None;
    }
    if let Some(node) = nodes.iter().find(|n| n.id.as_str() == reference) {
        return Some(node);
    }

    let needle = reference.to_lowercase();
    if let Some(node) = nodes
        .iter()
        .find(|n| n.model_name.to_lowercase().contains(&needle))
    {
        return Some(node);
    }

    let digits: String = reference
        .chars()
        .skip_while(|c| !c.is_ascii_digit())
        .take_while(|c| c.is_ascii_digit())
        .collect();
    let position: usize = digits.parse().ok()?;
    position.checked_sub(1).and_then(|i| nodes.get(i))
}

/// Search by id, model name or model id
pub fn find_conversation<'a>(
    term: &str,
    nodes: &'a [ConversationNode],
) -> Option<&'a ConversationNode> {
    let needle = term.to_lowercase();
    nodes.iter().find(|n| {
        n.id.as_str() == term
            || n.model_name.to_lowercase().contains(&needle)
            || n.model_id.to_lowercase().contains(&needle)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conversation::forest::ConversationForest;
    use crate::core::model::ModelBinding;

    fn forest() -> ConversationForest {
        let mut forest = ConversationForest::new();
        forest.create_roots(
            &[
                ModelBinding::new("openai/gpt-5.1", "GPT-5.1"),
                ModelBinding::new("x-ai/grok-4-fast", "Grok 4 Fast"),
            ],
            "q",
        );
        forest
    }

    #[test]
    fn test_exact_id_first() {
        let forest = forest();
        let node = find_target_conversation("2", forest.nodes()).unwrap();
        assert_eq!(node.model_name, "Grok 4 Fast");
    }

    #[test]
    fn test_model_name_substring() {
        let forest = forest();
        let node = find_target_conversation("grok", forest.nodes()).unwrap();
        assert_eq!(node.id.as_str(), "2");
    }

    #[test]
    fn test_positional_reference() {
        let forest = forest();
        let node = find_target_conversation("conversation 1", forest.nodes()).unwrap();
        assert_eq!(node.model_name, "GPT-5.1");
        assert!(find_target_conversation("conversation 9", forest.nodes()).is_none());
        assert!(find_target_conversation("conversation 0", forest.nodes()).is_none());
        assert!(find_target_conversation("nothing", forest.nodes()).is_none());
    }

    #[test]
    fn test_find_by_model_id() {
        let forest = forest();
        let node = find_conversation("x-ai", forest.nodes()).unwrap();
        assert_eq!(node.id.as_str(), "2");
    }
}
