//! Five-agent generation pipeline.
//!
//! A run walks six strictly sequential stages:
//!
//! | Stage | Role | Progress after stage |
//! |-------|------|----------------------|
//! | Planning | coordinator | 25 |
//! | Architecture | architect | 40 |
//! | Frontend | frontend | 60 |
//! | Backend | backend | 80 |
//! | Review | reviewer | 90 |
//! | Synthesis | coordinator | 100 |
//!
//! Synthesis makes no model call: it extracts files from the frontend and
//! backend replies, merges them and fills in the default files.

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use serde_json::{Map, Value};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use vibe_core::{
    ensure_defaults, extract, extract_structured, extract_structured_as, AgentRole, FileSet, Stage,
};

use crate::agent::Agent;
use crate::error::{ChatError, ChatResult};
use crate::prompts::{self, BACKEND_SENTINEL};
use crate::provider::TextProvider;
use crate::types::{AgentRunRecord, ArchitecturePlan, DevelopmentPlan, ReviewReport};

/// Receives `(status_text, overall)` after every completed stage.
pub trait ProgressObserver: Send + Sync {
    fn on_progress(&self, status: &str, overall: u8);
}

impl<F> ProgressObserver for F
where
    F: Fn(&str, u8) + Send + Sync,
{
    fn on_progress(&self, status: &str, overall: u8) {
        self(status, overall)
    }
}

/// Observer that ignores every tick.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoProgress;

impl ProgressObserver for NoProgress {
    fn on_progress(&self, _status: &str, _overall: u8) {}
}

/// Orchestrator configuration
#[derive(Debug, Clone, Default)]
pub struct OrchestratorConfig {
    /// Upper bound for a single agent call. `None` waits indefinitely.
    pub stage_timeout: Option<Duration>,
}

impl OrchestratorConfig {
    pub fn with_stage_timeout(mut self, timeout: Duration) -> Self {
        self.stage_timeout = Some(timeout);
        self
    }
}

/// Input of a pipeline run.
#[derive(Debug, Clone, Default)]
pub struct PipelineRequest {
    pub user_prompt: String,
    /// Extra context handed to every agent, such as the current project
    pub context: Option<String>,
}

impl PipelineRequest {
    pub fn new(user_prompt: impl Into<String>) -> Self {
        Self {
            user_prompt: user_prompt.into(),
            context: None,
        }
    }

    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }
}

/// Outcome of a pipeline run.
///
/// `success == false` means no usable files were produced; `files` is then
/// empty and `summary` holds the error text.
#[derive(Debug, Clone, Serialize)]
pub struct PipelineResult {
    pub success: bool,
    pub files: FileSet,
    /// Run logs of all five agents, in role order
    #[serde(rename = "runRecords")]
    pub run_records: Vec<AgentRunRecord>,
    pub summary: String,
    /// Coordinator plan, when its reply contained one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub plan: Option<DevelopmentPlan>,
    /// Architect description, when its reply contained one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub architecture: Option<ArchitecturePlan>,
    /// Reviewer verdict, defaulted when its reply could not be parsed
    pub review: ReviewReport,
}

impl PipelineResult {
    fn failure(error: &ChatError, run_records: Vec<AgentRunRecord>) -> Self {
        Self {
            success: false,
            files: FileSet::new(),
            run_records,
            summary: format!("Error: {}", error),
            plan: None,
            architecture: None,
            review: ReviewReport::default(),
        }
    }
}

/// Runs the five-agent pipeline against a shared provider.
///
/// Each call to [`Orchestrator::orchestrate`] builds a fresh team of agents,
/// so concurrent runs share nothing but the provider handle.
#[derive(Clone)]
pub struct Orchestrator {
    provider: Arc<dyn TextProvider>,
    config: OrchestratorConfig,
}

impl Orchestrator {
    pub fn new(provider: Arc<dyn TextProvider>) -> Self {
        Self::with_config(provider, OrchestratorConfig::default())
    }

    pub fn with_config(provider: Arc<dyn TextProvider>, config: OrchestratorConfig) -> Self {
        Self { provider, config }
    }

    pub fn config(&self) -> &OrchestratorConfig {
        &self.config
    }

    /// Run every stage and synthesize the project.
    ///
    /// Never fails: errors in any stage, cancellation included, produce a
    /// result with `success == false`.
    pub async fn orchestrate(
        &self,
        request: &PipelineRequest,
        observer: &dyn ProgressObserver,
        cancel: &CancellationToken,
    ) -> PipelineResult {
        info!("Starting pipeline for: {}", request.user_prompt);
        let mut team = Team::new(&self.provider);

        match self.run_stages(&mut team, request, observer, cancel).await {
            Ok(outcome) => {
                let summary = summarize(&outcome);
                info!("Pipeline complete: {} files", outcome.files.len());
                PipelineResult {
                    success: true,
                    files: outcome.files,
                    run_records: team.into_records(),
                    summary,
                    plan: outcome.plan,
                    architecture: outcome.architecture,
                    review: outcome.review,
                }
            }
            Err(e) => {
                warn!("Pipeline failed: {}", e);
                PipelineResult::failure(&e, team.into_records())
            }
        }
    }

    async fn run_stages(
        &self,
        team: &mut Team,
        request: &PipelineRequest,
        observer: &dyn ProgressObserver,
        cancel: &CancellationToken,
    ) -> ChatResult<Outcome> {
        let user_prompt = request.user_prompt.as_str();
        let context = request.context.as_deref();

        let plan_output = self
            .run_stage(team, Stage::Planning, &prompts::planning_task(user_prompt), context, cancel)
            .await?;
        let plan = extract_structured_as::<DevelopmentPlan>(&plan_output);
        if plan.is_none() {
            debug!("No structured plan in coordinator reply");
        }
        complete(observer, Stage::Planning);

        let architecture_output = self
            .run_stage(
                team,
                Stage::Architecture,
                &prompts::architecture_task(user_prompt),
                context,
                cancel,
            )
            .await?;
        let raw_architecture = extract_structured(&architecture_output);
        let architecture = raw_architecture
            .clone()
            .and_then(|map| serde_json::from_value::<ArchitecturePlan>(Value::Object(map)).ok());
        let architecture_json = serde_json::to_string_pretty(&Value::Object(
            raw_architecture.unwrap_or_else(|| {
                debug!("No structured architecture in architect reply, using empty file list");
                empty_architecture()
            }),
        ))?;
        complete(observer, Stage::Architecture);

        let frontend_output = self
            .run_stage(
                team,
                Stage::Frontend,
                &prompts::frontend_task(user_prompt, &architecture_json),
                context,
                cancel,
            )
            .await?;
        complete(observer, Stage::Frontend);

        let backend_output = self
            .run_stage(
                team,
                Stage::Backend,
                &prompts::backend_task(user_prompt, &architecture_json),
                context,
                cancel,
            )
            .await?;
        complete(observer, Stage::Backend);

        let review_output = self
            .run_stage(
                team,
                Stage::Review,
                &prompts::review_task(user_prompt, &frontend_output, &backend_output),
                context,
                cancel,
            )
            .await?;
        let review = extract_structured_as::<ReviewReport>(&review_output).unwrap_or_default();
        complete(observer, Stage::Review);

        check_cancelled(cancel)?;
        info!("Stage {} started", Stage::Synthesis);
        let files = synthesize(&frontend_output, &backend_output);
        complete(observer, Stage::Synthesis);

        Ok(Outcome {
            files,
            plan,
            architecture,
            review,
        })
    }

    /// Run the agent owning `stage`, honoring cancellation and the timeout.
    async fn run_stage(
        &self,
        team: &mut Team,
        stage: Stage,
        task: &str,
        context: Option<&str>,
        cancel: &CancellationToken,
    ) -> ChatResult<String> {
        check_cancelled(cancel)?;
        info!("Stage {} started ({})", stage, stage.role().display_name());

        let agent = team.agent_mut(stage.role());
        let call = agent.run(task, context, cancel);

        match self.config.stage_timeout {
            Some(limit) => tokio::time::timeout(limit, call)
                .await
                .map_err(|_| ChatError::Timeout {
                    stage: stage.to_string(),
                    limit,
                })?,
            None => call.await,
        }
    }
}

/// Extract files from the frontend and backend replies and complete them.
///
/// Backend files override frontend files on the same path. A backend reply
/// containing the "no backend" phrase contributes nothing.
pub fn synthesize(frontend_output: &str, backend_output: &str) -> FileSet {
    let mut files = extract(frontend_output).unwrap_or_default();

    if is_backend_skipped(backend_output) {
        debug!("Backend reported no logic required");
    } else if let Some(backend_files) = extract(backend_output) {
        files.merge(backend_files);
    }

    let added = ensure_defaults(&mut files);
    if !added.is_empty() {
        debug!("Filled default files: {:?}", added);
    }
    files
}

/// Whether the backend reply is the "no backend needed" sentinel.
pub fn is_backend_skipped(backend_output: &str) -> bool {
    backend_output
        .to_ascii_lowercase()
        .contains(&BACKEND_SENTINEL.to_ascii_lowercase())
}

struct Outcome {
    files: FileSet,
    plan: Option<DevelopmentPlan>,
    architecture: Option<ArchitecturePlan>,
    review: ReviewReport,
}

fn summarize(outcome: &Outcome) -> String {
    let verdict = if outcome.review.approved {
        "Code review passed."
    } else {
        "Code review completed with suggestions."
    };
    let mut summary = format!(
        "Project created successfully with {} files. {}",
        outcome.files.len(),
        verdict
    );
    if let Some(plan) = outcome.plan.as_ref().filter(|p| !p.plan.trim().is_empty()) {
        summary.push_str("\n\nPlan: ");
        summary.push_str(plan.plan.trim());
    }
    summary
}

fn empty_architecture() -> Map<String, Value> {
    let mut map = Map::new();
    map.insert("files".to_string(), Value::Array(Vec::new()));
    map
}

fn complete(observer: &dyn ProgressObserver, stage: Stage) {
    observer.on_progress(stage.completion(), stage.band().hi);
}

fn check_cancelled(cancel: &CancellationToken) -> ChatResult<()> {
    if cancel.is_cancelled() {
        Err(ChatError::Cancelled)
    } else {
        Ok(())
    }
}

/// The five agents of one run.
struct Team {
    coordinator: Agent,
    architect: Agent,
    frontend: Agent,
    backend: Agent,
    reviewer: Agent,
}

impl Team {
    fn new(provider: &Arc<dyn TextProvider>) -> Self {
        Self {
            coordinator: Agent::new(AgentRole::Coordinator, Arc::clone(provider)),
            architect: Agent::new(AgentRole::Architect, Arc::clone(provider)),
            frontend: Agent::new(AgentRole::Frontend, Arc::clone(provider)),
            backend: Agent::new(AgentRole::Backend, Arc::clone(provider)),
            reviewer: Agent::new(AgentRole::Reviewer, Arc::clone(provider)),
        }
    }

    fn agent_mut(&mut self, role: AgentRole) -> &mut Agent {
        match role {
            AgentRole::Coordinator => &mut self.coordinator,
            AgentRole::Architect => &mut self.architect,
            AgentRole::Frontend => &mut self.frontend,
            AgentRole::Backend => &mut self.backend,
            AgentRole::Reviewer => &mut self.reviewer,
        }
    }

    fn into_records(self) -> Vec<AgentRunRecord> {
        [
            self.coordinator,
            self.architect,
            self.frontend,
            self.backend,
            self.reviewer,
        ]
        .into_iter()
        .flat_map(Agent::into_records)
        .collect()
    }
}
