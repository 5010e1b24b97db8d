//! Pipeline Executor — runs one idea through the ordered agent list.
//!
//! The executor:
//! 1. Resolves every agent's specialist prompt and deadline up front
//! 2. Feeds the idea to the first agent
//! 3. Hands each agent's response to the next agent as its input
//! 4. Records every transition in the workflow log
//! 5. Stops (or continues, per `OnFailure`) when an agent fails or times out
//!
//! Agents never run concurrently within a run. The executor holds no per-run
//! state, so one instance can serve many concurrent runs.

use std::sync::Arc;
use std::time::Instant;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio_util::sync::CancellationToken;
use tracing::Instrument;

use crate::error::PipelineError;
use crate::workflow::capability::{AgentCapability, AgentSpec, CapabilityError};
use crate::workflow::codec::{format_entry, validate_agent_name, EncodeError, WorkflowLogEntry};
use crate::workflow::schema::{OnFailure, PipelineDefinition};
use crate::workflow::specialist::SpecialistLoader;

/// Append-only trace of one run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct WorkflowLog {
    entries: Vec<WorkflowLogEntry>,
}

impl WorkflowLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push(&mut self, entry: WorkflowLogEntry) -> Result<(), EncodeError> {
        validate_agent_name(&entry.agent)?;
        self.entries.push(entry);
        Ok(())
    }

    pub fn entries(&self) -> &[WorkflowLogEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn last(&self) -> Option<&WorkflowLogEntry> {
        self.entries.last()
    }

    /// Wire form: one encoded entry per element.
    pub fn to_lines(&self) -> Vec<String> {
        self.entries.iter().map(format_entry).collect()
    }

    /// Serialized log text (entries joined with `\n`).
    pub fn to_text(&self) -> String {
        self.to_lines().join("\n")
    }

    pub fn into_entries(self) -> Vec<WorkflowLogEntry> {
        self.entries
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineStatus {
    /// Every agent responded
    Success,
    /// At least one agent failed under the `continue` policy, others responded
    PartialFailure,
    /// The run stopped at a failing agent, or no agent responded
    Failure,
    /// The caller went away; no further agents were scheduled
    Cancelled,
}

/// Outcome of one run. Ownership passes to the caller.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PipelineResult {
    pub run_id: String,
    pub pipeline: String,
    pub log: WorkflowLog,
    pub status: PipelineStatus,
    /// First agent that failed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failed_at: Option<String>,
    /// Error reported by `failed_at`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl PipelineResult {
    pub fn is_success(&self) -> bool {
        self.status == PipelineStatus::Success
    }

    /// The JSON body handed to clients: `{"workflow": [...]}` on success, plus
    /// `error`, `failedAt` and `status` otherwise.
    pub fn to_response_body(&self) -> serde_json::Value {
        let mut body = serde_json::json!({ "workflow": self.log.to_lines() });
        if !self.is_success() {
            body["status"] = serde_json::to_value(self.status).unwrap_or_default();
            body["error"] = serde_json::Value::String(self.error.clone().unwrap_or_else(|| {
                match self.status {
                    PipelineStatus::Cancelled => "Pipeline run was cancelled".to_string(),
                    _ => "Pipeline run failed".to_string(),
                }
            }));
            if let Some(ref agent) = self.failed_at {
                body["failedAt"] = serde_json::Value::String(agent.clone());
            }
        }
        body
    }
}

/// The pipeline executor engine.
pub struct PipelineExecutor {
    name: String,
    agents: Vec<AgentSpec>,
    on_failure: OnFailure,
    capability: Arc<dyn AgentCapability>,
}

impl PipelineExecutor {
    /// Resolve a definition against the specialist catalogue.
    pub fn new(
        definition: &PipelineDefinition,
        specialists: &SpecialistLoader,
        capability: Arc<dyn AgentCapability>,
    ) -> Result<Self, PipelineError> {
        definition.validate()?;

        let agents = definition
            .agents
            .iter()
            .map(|step| {
                let specialist_id = step.specialist_id();
                let system_prompt = match (&step.system_prompt, specialists.get(&specialist_id)) {
                    (Some(prompt), _) => prompt.clone(),
                    (None, Some(specialist)) => specialist.system_prompt.clone(),
                    (None, None) => {
                        let mut available: Vec<_> = specialists.all().keys().collect();
                        available.sort();
                        return Err(PipelineError::InvalidDefinition(format!(
                            "agent '{}': unknown specialist '{}'. Available: {:?}",
                            step.name, specialist_id, available
                        )));
                    }
                };
                let timeout_secs = step.timeout_secs.unwrap_or(definition.timeout_secs);
                Ok(AgentSpec {
                    name: step.name.clone(),
                    specialist: specialist_id,
                    system_prompt,
                    timeout: std::time::Duration::from_secs(timeout_secs),
                })
            })
            .collect::<Result<Vec<_>, PipelineError>>()?;

        Ok(Self {
            name: definition.name.clone(),
            agents,
            on_failure: definition.on_failure,
            capability,
        })
    }

    /// Build an executor from already-resolved agents.
    pub fn from_agents(
        name: impl Into<String>,
        agents: Vec<AgentSpec>,
        capability: Arc<dyn AgentCapability>,
    ) -> Result<Self, PipelineError> {
        if agents.is_empty() {
            return Err(PipelineError::InvalidDefinition("pipeline has no agents".to_string()));
        }
        for agent in &agents {
            validate_agent_name(&agent.name)?;
        }
        Ok(Self {
            name: name.into(),
            agents,
            on_failure: OnFailure::Stop,
            capability,
        })
    }

    pub fn with_failure_policy(mut self, on_failure: OnFailure) -> Self {
        self.on_failure = on_failure;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn agents(&self) -> &[AgentSpec] {
        &self.agents
    }

    pub fn failure_policy(&self) -> OnFailure {
        self.on_failure
    }

    /// Run the pipeline to completion.
    pub async fn run(&self, idea: &str) -> Result<PipelineResult, PipelineError> {
        self.run_until_cancelled(idea, &CancellationToken::new()).await
    }

    /// Run the pipeline, checking `cancel` before each agent.
    ///
    /// An agent call already in flight is allowed to finish (or time out);
    /// cancellation only prevents the next agent from starting.
    pub async fn run_until_cancelled(
        &self,
        idea: &str,
        cancel: &CancellationToken,
    ) -> Result<PipelineResult, PipelineError> {
        let idea = idea.trim();
        if idea.is_empty() {
            return Err(PipelineError::EmptyIdea);
        }

        let run_id = uuid::Uuid::new_v4().to_string();
        let span = tracing::info_span!("pipeline_run", run_id = %run_id, pipeline = %self.name);
        self.drive(run_id, idea, cancel).instrument(span).await
    }

    async fn drive(
        &self,
        run_id: String,
        idea: &str,
        cancel: &CancellationToken,
    ) -> Result<PipelineResult, PipelineError> {
        let started_at = Utc::now();
        let clock = Instant::now();

        tracing::info!(
            "[Pipeline] Starting '{}' with {} agent(s)",
            self.name,
            self.agents.len()
        );

        let mut log = WorkflowLog::new();
        let mut context = idea.to_string();
        let mut failure: Option<(String, CapabilityError)> = None;
        let mut responded = 0usize;
        let mut cancelled = false;

        for (i, agent) in self.agents.iter().enumerate() {
            if cancel.is_cancelled() {
                tracing::warn!(
                    "[Pipeline] Cancelled before agent {}/{} ({})",
                    i + 1,
                    self.agents.len(),
                    agent.name
                );
                cancelled = true;
                break;
            }

            tracing::info!(
                "[Pipeline] Agent {}/{}: {} received {} chars",
                i + 1,
                self.agents.len(),
                agent.name,
                context.len()
            );
            log.push(WorkflowLogEntry::received(&agent.name, context.as_str()))?;

            match self.invoke(agent, &context).await {
                Ok(response) => {
                    tracing::info!(
                        "[Pipeline] Agent {} responded with {} chars",
                        agent.name,
                        response.len()
                    );
                    log.push(WorkflowLogEntry::response(&agent.name, response.as_str()))?;
                    context = response;
                    responded += 1;
                }
                Err(e) => {
                    tracing::warn!("[Pipeline] Agent {} failed: {}", agent.name, e);
                    if failure.is_none() {
                        failure = Some((agent.name.clone(), e));
                    }
                    if self.on_failure == OnFailure::Stop {
                        break;
                    }
                }
            }
        }

        let status = if cancelled {
            PipelineStatus::Cancelled
        } else {
            match (&failure, self.on_failure) {
                (None, _) => PipelineStatus::Success,
                (Some(_), OnFailure::Continue) if responded > 0 => PipelineStatus::PartialFailure,
                (Some(_), _) => PipelineStatus::Failure,
            }
        };

        tracing::info!(
            "[Pipeline] Finished '{}' with status {:?}: {} entries, {}/{} agents responded in {:.1}s",
            self.name,
            status,
            log.len(),
            responded,
            self.agents.len(),
            clock.elapsed().as_secs_f64()
        );

        let (failed_at, error) = match failure {
            Some((agent, e)) => (Some(agent), Some(e.to_string())),
            None => (None, None),
        };

        Ok(PipelineResult {
            run_id,
            pipeline: self.name.clone(),
            log,
            status,
            failed_at,
            error,
            started_at,
            finished_at: Utc::now(),
        })
    }

    /// One capability call, bounded by the agent's deadline.
    async fn invoke(&self, agent: &AgentSpec, context: &str) -> Result<String, CapabilityError> {
        match tokio::time::timeout(agent.timeout, self.capability.invoke(agent, context)).await {
            Ok(result) => result,
            Err(_) => Err(CapabilityError::Timeout(agent.timeout)),
        }
    }
}
