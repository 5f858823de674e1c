// file: src/pipeline/state.rs
// description: run state machine for a single pipeline execution
// reference: explicit transition table

use crate::error::{PipelineError, Result};
use crate::stages::StageKind;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PipelineState {
    Idle,
    Decomposing,
    Searching,
    Extracting,
    Summarizing,
    Exporting,
    Done,
    Failed,
    Cancelled,
}

impl PipelineState {
    pub fn for_stage(stage: StageKind) -> Self {
        match stage {
            StageKind::Decompose => PipelineState::Decomposing,
            StageKind::Search => PipelineState::Searching,
            StageKind::Extract => PipelineState::Extracting,
            StageKind::Summarize => PipelineState::Summarizing,
            StageKind::Export => PipelineState::Exporting,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            PipelineState::Done | PipelineState::Failed | PipelineState::Cancelled
        )
    }

    fn successor(&self) -> Option<PipelineState> {
        match self {
            PipelineState::Idle => Some(PipelineState::Decomposing),
            PipelineState::Decomposing => Some(PipelineState::Searching),
            PipelineState::Searching => Some(PipelineState::Extracting),
            PipelineState::Extracting => Some(PipelineState::Summarizing),
            PipelineState::Summarizing => Some(PipelineState::Exporting),
            PipelineState::Exporting => Some(PipelineState::Done),
            _ => None,
        }
    }

    pub fn can_transition_to(&self, next: PipelineState) -> bool {
        if self.is_terminal() {
            return false;
        }

        match next {
            PipelineState::Failed | PipelineState::Cancelled => true,
            other => self.successor() == Some(other),
        }
    }
}

impl fmt::Display for PipelineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PipelineState::Idle => "idle",
            PipelineState::Decomposing => "decomposing",
            PipelineState::Searching => "searching",
            PipelineState::Extracting => "extracting",
            PipelineState::Summarizing => "summarizing",
            PipelineState::Exporting => "exporting",
            PipelineState::Done => "done",
            PipelineState::Failed => "failed",
            PipelineState::Cancelled => "cancelled",
        };
        f.write_str(name)
    }
}

/// Tracks one run from `Idle` to a terminal state. Never reused across runs.
#[derive(Debug, Clone)]
pub struct RunStateMachine {
    state: PipelineState,
    history: Vec<PipelineState>,
}

impl RunStateMachine {
    pub fn new() -> Self {
        Self {
            state: PipelineState::Idle,
            history: vec![PipelineState::Idle],
        }
    }

    pub fn state(&self) -> PipelineState {
        self.state
    }

    pub fn history(&self) -> &[PipelineState] {
        &self.history
    }

    pub fn transition_to(&mut self, next: PipelineState) -> Result<()> {
        if !self.state.can_transition_to(next) {
            return Err(PipelineError::InvalidTransition {
                from: self.state.to_string(),
                to: next.to_string(),
            });
        }

        self.state = next;
        self.history.push(next);
        Ok(())
    }

    pub fn enter_stage(&mut self, stage: StageKind) -> Result<()> {
        self.transition_to(PipelineState::for_stage(stage))
    }
}

impl Default for RunStateMachine {
    fn default() -> Self {
        Self::new()
    }
}
