//! Progress reporting for council runs

use agentic_application::{CouncilStage, ProgressNotifier};
use colored::Colorize;
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use std::sync::Mutex;

/// Reports council progress with one bar per stage
pub struct ProgressReporter {
    multi: MultiProgress,
    stage_bar: Mutex<Option<ProgressBar>>,
}

impl ProgressReporter {
    pub fn new() -> Self {
        Self {
            multi: MultiProgress::new(),
            stage_bar: Mutex::new(None),
        }
    }

    fn stage_style() -> ProgressStyle {
        ProgressStyle::default_bar()
            .template("{spinner:.green} {prefix:.bold.cyan} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("=>-")
    }

    fn stage_display_name(stage: CouncilStage) -> &'static str {
        match stage {
            CouncilStage::Ranking => "Stage 1: Peer Ranking",
            CouncilStage::Synthesis => "Stage 2: Chairman Synthesis",
        }
    }

    fn bar(&self) -> std::sync::MutexGuard<'_, Option<ProgressBar>> {
        self.stage_bar.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl Default for ProgressReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressNotifier for ProgressReporter {
    fn on_stage_start(&self, stage: CouncilStage, total_tasks: usize) {
        let pb = self.multi.add(ProgressBar::new(total_tasks as u64));
        pb.set_style(Self::stage_style());
        pb.set_prefix(Self::stage_display_name(stage));
        pb.set_message("Starting...");

        *self.bar() = Some(pb);
    }

    fn on_task_complete(&self, _stage: CouncilStage, model_name: &str, success: bool) {
        if let Some(pb) = self.bar().as_ref() {
            let status = if success {
                format!("{} {}", "v".green(), model_name)
            } else {
                format!("{} {}", "x".red(), model_name)
            };
            pb.set_message(status);
            pb.inc(1);
        }
    }

    fn on_stage_complete(&self, stage: CouncilStage) {
        if let Some(pb) = self.bar().take() {
            pb.finish_with_message(format!("{} complete!", stage.as_str().green()));
        }
    }
}

/// Simple text-based progress (no fancy UI)
pub struct SimpleProgress;

impl ProgressNotifier for SimpleProgress {
    fn on_stage_start(&self, stage: CouncilStage, total_tasks: usize) {
        println!(
            "{} {} ({} tasks)",
            "->".cyan(),
            ProgressReporter::stage_display_name(stage).bold(),
            total_tasks
        );
    }

    fn on_task_complete(&self, _stage: CouncilStage, model_name: &str, success: bool) {
        if success {
            println!("  {} {}", "v".green(), model_name);
        } else {
            println!("  {} {} (failed)", "x".red(), model_name);
        }
    }

    fn on_stage_complete(&self, _stage: CouncilStage) {
        println!();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reporter_tracks_one_stage_at_a_time() {
        let reporter = ProgressReporter::new();
        reporter.on_stage_start(CouncilStage::Ranking, 3);
        reporter.on_task_complete(CouncilStage::Ranking, "One", true);
        reporter.on_task_complete(CouncilStage::Ranking, "Two", false);
        assert_eq!(reporter.bar().as_ref().map(|pb| pb.position()), Some(2));

        reporter.on_stage_complete(CouncilStage::Ranking);
        assert!(reporter.bar().is_none());
    }

    #[test]
    fn test_task_without_stage_is_ignored() {
        let reporter = ProgressReporter::default();
        reporter.on_task_complete(CouncilStage::Synthesis, "Chair", true);
        assert!(reporter.bar().is_none());
    }
}
