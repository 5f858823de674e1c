// file: src/pipeline/mod.rs
// description: pipeline module exports and public api
// reference: pipeline orchestration

mod observer;
mod orchestrator;
mod progress;
mod state;

pub use observer::{NoopObserver, PipelineObserver, StageArtifact};
pub use orchestrator::{PipelineCoordinator, StageClients};
pub use progress::{PipelineStats, ProgressTracker};
pub use state::{PipelineState, RunStateMachine};
