//! Agent capability — the one seam between the pipeline and whatever produces
//! an agent's text.
//!
//! The executor only knows this trait. `LlmAgentCaller` (see `agent_caller`)
//! talks to a model over HTTP; `EchoCapability` and `ScriptedCapability` are
//! deterministic stand-ins for dry runs and tests.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;

/// A resolved pipeline agent, ready to be invoked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentSpec {
    /// Name written into the workflow log markers
    pub name: String,
    /// Specialist the prompt came from
    pub specialist: String,
    pub system_prompt: String,
    /// Deadline for a single invocation
    pub timeout: Duration,
}

impl AgentSpec {
    pub fn new(name: impl Into<String>, system_prompt: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            specialist: name.to_lowercase(),
            name,
            system_prompt: system_prompt.into(),
            timeout: Duration::from_secs(super::schema::DEFAULT_TIMEOUT_SECS),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CapabilityError {
    #[error("HTTP request failed: {0}")]
    Http(String),

    #[error("API returned {status}: {body}")]
    Api { status: u16, body: String },

    #[error("Failed to parse response: {0}")]
    Parse(String),

    #[error("Agent returned an empty response")]
    EmptyResponse,

    #[error("Agent timed out after {}s", .0.as_secs())]
    Timeout(Duration),

    #[error("Capability misconfigured: {0}")]
    Config(String),

    #[error("Agent failed: {0}")]
    Failed(String),
}

/// Turns the accumulated context into one agent's response.
///
/// Implementations must be stateless with respect to a run: the same
/// capability is shared by every concurrent pipeline run.
#[async_trait]
pub trait AgentCapability: Send + Sync {
    async fn invoke(&self, agent: &AgentSpec, context: &str) -> Result<String, CapabilityError>;
}

/// Offline capability that answers `"<Agent> says: ok"`.
#[derive(Debug, Clone, Copy, Default)]
pub struct EchoCapability;

#[async_trait]
impl AgentCapability for EchoCapability {
    async fn invoke(&self, agent: &AgentSpec, _context: &str) -> Result<String, CapabilityError> {
        Ok(format!("{} says: ok", agent.name))
    }
}

#[derive(Debug, Clone)]
enum Script {
    Reply(String),
    Fail(String),
    Hang,
}

/// Capability with a fixed outcome per agent name.
///
/// Agents without a script fall back to the `EchoCapability` reply.
#[derive(Debug, Clone, Default)]
pub struct ScriptedCapability {
    scripts: HashMap<String, Script>,
}

impl ScriptedCapability {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reply(mut self, agent: &str, text: impl Into<String>) -> Self {
        self.scripts.insert(agent.to_string(), Script::Reply(text.into()));
        self
    }

    pub fn fail(mut self, agent: &str, message: impl Into<String>) -> Self {
        self.scripts.insert(agent.to_string(), Script::Fail(message.into()));
        self
    }

    /// Never resolve for this agent; only the executor's deadline ends the call.
    pub fn hang(mut self, agent: &str) -> Self {
        self.scripts.insert(agent.to_string(), Script::Hang);
        self
    }
}

#[async_trait]
impl AgentCapability for ScriptedCapability {
    async fn invoke(&self, agent: &AgentSpec, context: &str) -> Result<String, CapabilityError> {
        match self.scripts.get(&agent.name) {
            Some(Script::Reply(text)) => Ok(text.clone()),
            Some(Script::Fail(message)) => Err(CapabilityError::Failed(message.clone())),
            Some(Script::Hang) => std::future::pending().await,
            None => EchoCapability.invoke(agent, context).await,
        }
    }
}
