//! Progress notification port
//!
//! Defines the interface for reporting progress during a council run.

/// The two model-calling stages of a council
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CouncilStage {
    /// Every answering model ranks the anonymized answers
    Ranking,
    /// The chairman writes the final answer
    Synthesis,
}

impl CouncilStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            CouncilStage::Ranking => "Peer Ranking",
            CouncilStage::Synthesis => "Chairman Synthesis",
        }
    }
}

impl std::fmt::Display for CouncilStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Callback for progress updates during a council run
///
/// Implementations live in the presentation layer.
pub trait ProgressNotifier: Send + Sync {
    /// Called when a stage starts
    fn on_stage_start(&self, stage: CouncilStage, total_tasks: usize);

    /// Called when one model call within a stage settles
    fn on_task_complete(&self, stage: CouncilStage, model_name: &str, success: bool);

    /// Called when a stage completes
    fn on_stage_complete(&self, stage: CouncilStage);
}

/// No-op progress notifier for when progress reporting is not needed
pub struct NoProgress;

impl ProgressNotifier for NoProgress {
    fn on_stage_start(&self, _stage: CouncilStage, _total_tasks: usize) {}
    fn on_task_complete(&self, _stage: CouncilStage, _model_name: &str, _success: bool) {}
    fn on_stage_complete(&self, _stage: CouncilStage) {}
}
