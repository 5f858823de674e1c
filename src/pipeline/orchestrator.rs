// file: src/pipeline/orchestrator.rs
// description: drives decompose, search, extract, summarize and export strictly in order
// reference: orchestrates the sequential agent workflow

use super::observer::{NoopObserver, PipelineObserver, StageArtifact};
use super::progress::PipelineStats;
use super::state::{PipelineState, RunStateMachine};
use crate::config::{Config, StageBindings};
use crate::error::{PipelineError, Result};
use crate::models::PipelineReport;
use crate::providers::{ModelClient, ProviderRegistry};
use crate::stages::{
    DecomposeStage, ExportStage, ExtractStage, SearchStage, Stage, StageKind, SummarizeStage,
};
use crate::utils::Validator;
use chrono::Utc;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};
use uuid::Uuid;

/// The model client each model-driven stage talks to.
#[derive(Clone)]
pub struct StageClients {
    pub decompose: Arc<dyn ModelClient>,
    pub search: Arc<dyn ModelClient>,
    pub extract: Arc<dyn ModelClient>,
    pub summarize: Arc<dyn ModelClient>,
}

impl StageClients {
    pub fn from_registry(registry: &ProviderRegistry, bindings: &StageBindings) -> Result<Self> {
        Ok(Self {
            decompose: registry.resolve_str(&bindings.decompose)?,
            search: registry.resolve_str(&bindings.search)?,
            extract: registry.resolve_str(&bindings.extract)?,
            summarize: registry.resolve_str(&bindings.summarize)?,
        })
    }

    /// Same client for every stage.
    pub fn uniform(client: Arc<dyn ModelClient>) -> Self {
        Self {
            decompose: client.clone(),
            search: client.clone(),
            extract: client.clone(),
            summarize: client,
        }
    }
}

struct RunContext<'a> {
    run_id: Uuid,
    machine: RunStateMachine,
    stats: PipelineStats,
    observer: &'a dyn PipelineObserver,
    cancel: &'a CancellationToken,
}

pub struct PipelineCoordinator {
    decompose: DecomposeStage,
    search: SearchStage,
    extract: ExtractStage,
    summarize: SummarizeStage,
    export: ExportStage,
}

impl PipelineCoordinator {
    pub fn new(clients: StageClients, output_path: impl Into<PathBuf>) -> Self {
        Self {
            decompose: DecomposeStage::new(clients.decompose),
            search: SearchStage::new(clients.search),
            extract: ExtractStage::new(clients.extract),
            summarize: SummarizeStage::new(clients.summarize),
            export: ExportStage::new(output_path),
        }
    }

    /// Resolves every stage binding up front so a bad binding fails before any run.
    pub fn from_config(config: &Config, output_path: Option<PathBuf>) -> Result<Self> {
        let registry = ProviderRegistry::new(config.clone());
        let clients = StageClients::from_registry(&registry, &config.stages)?;
        let output_path = output_path.unwrap_or_else(|| config.export.output_path.clone());

        info!(
            "Pipeline bindings: decompose={} search={} extract={} summarize={}",
            config.stages.decompose,
            config.stages.search,
            config.stages.extract,
            config.stages.summarize
        );

        Ok(Self::new(clients, output_path))
    }

    pub fn output_path(&self) -> &Path {
        self.export.exporter().path()
    }

    pub async fn run(&self, query: &str) -> Result<PipelineReport> {
        self.run_with(query, &NoopObserver, &CancellationToken::new())
            .await
    }

    pub async fn run_with(
        &self,
        query: &str,
        observer: &dyn PipelineObserver,
        cancel: &CancellationToken,
    ) -> Result<PipelineReport> {
        Validator::validate_query(query)?;
        Validator::validate_output_path(self.output_path())?;

        let started_at = Utc::now();
        let mut ctx = RunContext {
            run_id: Uuid::new_v4(),
            machine: RunStateMachine::new(),
            stats: PipelineStats::new(),
            observer,
            cancel,
        };

        info!(run_id = %ctx.run_id, "Starting pipeline run for query: {}", query);

        let decomposed = self
            .step(&mut ctx, &self.decompose, query, |q| StageArtifact::Decomposed(q))
            .await?;
        let search_results = self
            .step(&mut ctx, &self.search, &decomposed, |r| StageArtifact::SearchResults(r))
            .await?;
        let extracted = self
            .step(&mut ctx, &self.extract, &search_results, |d| StageArtifact::Extracted(d))
            .await?;
        let summary = self
            .step(&mut ctx, &self.summarize, &extracted, |s| StageArtifact::Summary(s))
            .await?;
        let artifact = self
            .step(&mut ctx, &self.export, &extracted, |a| StageArtifact::Exported(a))
            .await?;

        ctx.machine.transition_to(PipelineState::Done)?;

        info!(
            run_id = %ctx.run_id,
            "Pipeline run complete in {} ms",
            ctx.stats.total_millis
        );

        Ok(PipelineReport {
            run_id: ctx.run_id,
            started_at,
            query: query.to_string(),
            decomposed,
            search_results,
            extracted,
            summary,
            artifact,
            state: ctx.machine.state(),
            stats: ctx.stats,
        })
    }

    async fn step<S>(
        &self,
        ctx: &mut RunContext<'_>,
        stage: &S,
        input: &S::Input,
        present: fn(&S::Output) -> StageArtifact<'_>,
    ) -> Result<S::Output>
    where
        S: Stage,
    {
        let kind = stage.kind();

        if ctx.cancel.is_cancelled() {
            return Err(cancel_run(ctx, kind)?);
        }

        ctx.machine.enter_stage(kind)?;
        ctx.observer.stage_started(kind);
        info!(run_id = %ctx.run_id, stage = %kind, "{}", kind.progress_label());

        let cancel = ctx.cancel;
        let started = Instant::now();

        // A stalled provider call is abandoned as soon as the token fires.
        let outcome = tokio::select! {
            biased;
            _ = cancel.cancelled() => None,
            result = stage.run(input) => Some(result),
        };
        let Some(outcome) = outcome else {
            return Err(cancel_run(ctx, kind)?);
        };

        match outcome {
            Ok(output) => {
                let elapsed = started.elapsed();
                ctx.stats.record(kind, elapsed);
                ctx.observer.stage_completed(present(&output), elapsed);
                info!(
                    run_id = %ctx.run_id,
                    stage = %kind,
                    "Stage complete in {} ms",
                    elapsed.as_millis()
                );
                Ok(output)
            }
            Err(source) => {
                ctx.machine.transition_to(PipelineState::Failed)?;
                let err = PipelineError::Stage {
                    stage: kind.name(),
                    source: Box::new(source),
                };
                error!(run_id = %ctx.run_id, stage = %kind, "{}", err);
                ctx.observer.run_failed(kind, &err);
                Err(err)
            }
        }
    }
}

/// Moves the run to `Cancelled` and builds the error naming the stage that did not finish.
fn cancel_run(ctx: &mut RunContext<'_>, kind: StageKind) -> Result<PipelineError> {
    ctx.machine.transition_to(PipelineState::Cancelled)?;
    let err = PipelineError::Cancelled(kind.name());
    warn!(run_id = %ctx.run_id, stage = %kind, "Pipeline run cancelled");
    ctx.observer.run_failed(kind, &err);
    Ok(err)
}
