// file: src/pipeline/progress.rs
// description: progress tracking and statistics reporting for pipeline execution
// reference: uses indicatif for progress bars and tracks per-stage timings

use super::observer::{PipelineObserver, StageArtifact};
use crate::error::PipelineError;
use crate::stages::StageKind;
use crate::utils::Validator;
use crate::utils::logging::{format_artifact, format_error, format_step, format_success};
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Mutex;
use std::time::Duration;

const ARTIFACT_PREVIEW_CHARS: usize = 600;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PipelineStats {
    pub stage_millis: BTreeMap<StageKind, u64>,
    pub total_millis: u64,
}

impl PipelineStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, stage: StageKind, elapsed: Duration) {
        let millis = elapsed.as_millis() as u64;
        self.stage_millis.insert(stage, millis);
        self.total_millis += millis;
    }

    pub fn stages_completed(&self) -> usize {
        self.stage_millis.len()
    }

    pub fn slowest_stage(&self) -> Option<(StageKind, u64)> {
        self.stage_millis
            .iter()
            .max_by_key(|(_, millis)| **millis)
            .map(|(stage, millis)| (*stage, *millis))
    }

    /// Share of total time spent in `stage`, as a percentage.
    pub fn share(&self, stage: StageKind) -> f64 {
        if self.total_millis == 0 {
            return 0.0;
        }
        let millis = self.stage_millis.get(&stage).copied().unwrap_or(0);
        (millis as f64 / self.total_millis as f64) * 100.0
    }
}

/// Spinner per stage plus an optional printout of each intermediate artifact.
pub struct ProgressTracker {
    multi_progress: MultiProgress,
    current: Mutex<Option<ProgressBar>>,
    colored: bool,
    show_artifacts: bool,
}

impl ProgressTracker {
    pub fn new(show_artifacts: bool) -> Self {
        Self::with_color(show_artifacts, true)
    }

    pub fn with_color(show_artifacts: bool, colored: bool) -> Self {
        Self {
            multi_progress: MultiProgress::new(),
            current: Mutex::new(None),
            colored,
            show_artifacts,
        }
    }

    fn take_current(&self) -> Option<ProgressBar> {
        self.current.lock().ok().and_then(|mut guard| guard.take())
    }

    fn print(&self, line: String) {
        self.multi_progress.println(line).ok();
    }
}

impl PipelineObserver for ProgressTracker {
    fn stage_started(&self, stage: StageKind) {
        let bar = self.multi_progress.add(create_spinner(self.colored));
        bar.set_message(format_step(
            stage.position(),
            StageKind::ALL.len(),
            stage.progress_label(),
        ));
        bar.enable_steady_tick(Duration::from_millis(100));

        if let Ok(mut guard) = self.current.lock() {
            *guard = Some(bar);
        }
    }

    fn stage_completed(&self, artifact: StageArtifact<'_>, elapsed: Duration) {
        let stage = artifact.stage();

        if let Some(bar) = self.take_current() {
            bar.finish_with_message(format_success(&format!(
                "[{}/{}] {} ({} ms)",
                stage.position(),
                StageKind::ALL.len(),
                stage.artifact_label(),
                elapsed.as_millis()
            )));
        }

        if self.show_artifacts {
            let body = Validator::truncate_text(&artifact.describe(), ARTIFACT_PREVIEW_CHARS);
            self.print(format_artifact(stage.artifact_label(), &body));
        }
    }

    fn run_failed(&self, stage: StageKind, error: &PipelineError) {
        let message = format_error(&format!("{} failed: {}", stage.artifact_label(), error));

        match self.take_current() {
            Some(bar) => bar.abandon_with_message(message),
            None => self.print(message),
        }
    }
}

impl Drop for ProgressTracker {
    fn drop(&mut self) {
        if let Some(bar) = self.take_current() {
            bar.finish_and_clear();
        }
    }
}

fn create_spinner(colored: bool) -> ProgressBar {
    let template = if colored {
        "{spinner:.green} [{elapsed_precise}] {msg}"
    } else {
        "{spinner} [{elapsed_precise}] {msg}"
    };

    let bar = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner().template(template) {
        bar.set_style(style);
    }
    bar
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Summary;

    #[test]
    fn test_pipeline_stats_calculations() {
        let mut stats = PipelineStats::new();
        stats.record(StageKind::Decompose, Duration::from_millis(300));
        stats.record(StageKind::Search, Duration::from_millis(100));
        stats.record(StageKind::Export, Duration::from_millis(100));

        assert_eq!(stats.total_millis, 500);
        assert_eq!(stats.stages_completed(), 3);
        assert_eq!(stats.slowest_stage(), Some((StageKind::Decompose, 300)));
        assert!((stats.share(StageKind::Search) - 20.0).abs() < 1e-9);
    }

    #[test]
    fn test_pipeline_stats_empty() {
        let stats = PipelineStats::new();
        assert_eq!(stats.share(StageKind::Extract), 0.0);
        assert!(stats.slowest_stage().is_none());
    }

    #[test]
    fn test_tracker_survives_full_stage_cycle() {
        let tracker = ProgressTracker::with_color(true, false);
        let summary = Summary::new("fine");

        tracker.stage_started(StageKind::Summarize);
        tracker.stage_completed(StageArtifact::Summary(&summary), Duration::from_millis(5));
        tracker.stage_started(StageKind::Export);
        tracker.run_failed(
            StageKind::Export,
            &PipelineError::Serialization("uneven".to_string()),
        );

        assert!(tracker.take_current().is_none());
    }

    #[test]
    fn test_stats_serialize_with_stage_names() {
        let mut stats = PipelineStats::new();
        stats.record(StageKind::Summarize, Duration::from_millis(7));

        let json = serde_json::to_value(&stats).unwrap();
        assert_eq!(json["stage_millis"]["summarize"], 7);
    }
}
