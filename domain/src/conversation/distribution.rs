//! Round-robin distribution of conversations over active models

use crate::core::model::ModelBinding;

/// Assign a model to each of `count` conversations.
///
/// `result[i] = active[i % active.len()]`: repeats are allowed and the caller's
/// order is preserved. With no active models the result is empty.
pub fn distribute_models(active: &[ModelBinding], count: usize) -> Vec<ModelBinding> {
    if active.is_empty() {
        return Vec::new();
    }
    (0..count).map(|i| active[i % active.len()].clone()).collect()
}
