//! YAML schema types for pipeline definitions.
//!
//! A pipeline is an ordered list of named agents; each agent's output becomes
//! the next agent's input:
//!
//! ```yaml
//! name: "Idea Strategy"
//! description: "Design → Marketing → Sales → Support"
//! on_failure: stop        # stop | continue
//! timeout_secs: 300
//!
//! agents:
//!   - name: Design
//!     specialist: design
//!   - name: Marketing
//!     specialist: marketing
//!     timeout_secs: 120
//!   - name: Sales
//!   - name: Support
//!     system_prompt: |
//!       You are a Chief Customer Officer...
//! ```

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::PipelineError;
use crate::workflow::codec::validate_agent_name;

/// Per-agent deadline used when neither the agent nor the pipeline sets one.
pub const DEFAULT_TIMEOUT_SECS: u64 = 300;

/// Top-level pipeline definition loaded from a YAML file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineDefinition {
    /// Pipeline name
    pub name: String,

    /// Optional description
    #[serde(default)]
    pub description: Option<String>,

    /// Version string
    #[serde(default = "default_version")]
    pub version: String,

    /// What happens to the rest of the run when an agent fails
    #[serde(default)]
    pub on_failure: OnFailure,

    /// Default deadline for each agent invocation
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// Ordered list of agents
    pub agents: Vec<AgentStep>,
}

fn default_version() -> String {
    "1.0".to_string()
}

fn default_timeout() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

/// What to do when an agent fails or times out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum OnFailure {
    /// Stop the run at the failing agent (default)
    #[default]
    Stop,
    /// Leave the failed agent's input in the log and hand the same input to
    /// the next agent
    Continue,
}

/// A single agent in the pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentStep {
    /// Agent name, as written into the workflow log (`[Name] received: ...`)
    pub name: String,

    /// Specialist ID — defaults to the lowercased agent name
    #[serde(default)]
    pub specialist: Option<String>,

    /// System prompt override (if not using the specialist's prompt)
    #[serde(default)]
    pub system_prompt: Option<String>,

    /// Deadline override for this agent
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

impl AgentStep {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            specialist: None,
            system_prompt: None,
            timeout_secs: None,
        }
    }

    /// The specialist this agent draws its prompt from.
    pub fn specialist_id(&self) -> String {
        self.specialist
            .clone()
            .unwrap_or_else(|| self.name.to_lowercase())
    }
}

impl PipelineDefinition {
    /// The built-in Design → Marketing → Sales → Support strategy pipeline.
    pub fn default_strategy() -> Self {
        Self {
            name: "Idea Strategy".to_string(),
            description: Some("Design → Marketing → Sales → Support".to_string()),
            version: default_version(),
            on_failure: OnFailure::Stop,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            agents: ["Design", "Marketing", "Sales", "Support"]
                .into_iter()
                .map(AgentStep::new)
                .collect(),
        }
    }

    /// Parse a pipeline definition from a YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self, PipelineError> {
        let definition: Self = serde_yaml::from_str(yaml)?;
        definition.validate()?;
        Ok(definition)
    }

    /// Load a pipeline definition from a file path.
    pub fn from_file(path: &str) -> Result<Self, PipelineError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            PipelineError::InvalidDefinition(format!("Failed to read pipeline file '{}': {}", path, e))
        })?;
        Self::from_yaml(&content)
    }

    /// Structural checks that do not need the specialist catalogue.
    pub fn validate(&self) -> Result<(), PipelineError> {
        if self.agents.is_empty() {
            return Err(PipelineError::InvalidDefinition(format!(
                "pipeline '{}' has no agents",
                self.name
            )));
        }
        if self.timeout_secs == 0 {
            return Err(PipelineError::InvalidDefinition(
                "timeout_secs must be greater than zero".to_string(),
            ));
        }

        let mut seen = HashSet::new();
        for agent in &self.agents {
            validate_agent_name(&agent.name).map_err(|e| {
                PipelineError::InvalidDefinition(format!("agent '{}': {}", agent.name, e))
            })?;
            if !seen.insert(agent.name.as_str()) {
                return Err(PipelineError::InvalidDefinition(format!(
                    "agent '{}' appears more than once",
                    agent.name
                )));
            }
            if agent.timeout_secs == Some(0) {
                return Err(PipelineError::InvalidDefinition(format!(
                    "agent '{}': timeout_secs must be greater than zero",
                    agent.name
                )));
            }
        }
        Ok(())
    }

    pub fn agent_names(&self) -> Vec<&str> {
        self.agents.iter().map(|a| a.name.as_str()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_strategy_order() {
        let def = PipelineDefinition::default_strategy();
        assert_eq!(def.agent_names(), vec!["Design", "Marketing", "Sales", "Support"]);
        assert_eq!(def.on_failure, OnFailure::Stop);
        assert!(def.validate().is_ok());
    }

    #[test]
    fn test_parse_minimal_pipeline() {
        let yaml = r#"
name: "Two Step"
agents:
  - name: Design
  - name: Marketing
    specialist: brand-strategist
    timeout_secs: 45
"#;
        let def = PipelineDefinition::from_yaml(yaml).unwrap();
        assert_eq!(def.name, "Two Step");
        assert_eq!(def.version, "1.0");
        assert_eq!(def.timeout_secs, DEFAULT_TIMEOUT_SECS);
        assert_eq!(def.agents[0].specialist_id(), "design");
        assert_eq!(def.agents[1].specialist_id(), "brand-strategist");
        assert_eq!(def.agents[1].timeout_secs, Some(45));
    }

    #[test]
    fn test_parse_continue_policy() {
        let yaml = r#"
name: "Lenient"
on_failure: continue
agents:
  - name: Sales
"#;
        let def = PipelineDefinition::from_yaml(yaml).unwrap();
        assert_eq!(def.on_failure, OnFailure::Continue);
    }

    #[test]
    fn test_rejects_empty_and_duplicate_agents() {
        let empty = "name: \"Empty\"\nagents: []\n";
        assert!(matches!(
            PipelineDefinition::from_yaml(empty),
            Err(PipelineError::InvalidDefinition(_))
        ));

        let dup = "name: \"Dup\"\nagents:\n  - name: Sales\n  - name: Sales\n";
        assert!(matches!(
            PipelineDefinition::from_yaml(dup),
            Err(PipelineError::InvalidDefinition(_))
        ));
    }

    #[test]
    fn test_rejects_marker_breaking_names() {
        let yaml = "name: \"Bad\"\nagents:\n  - name: \"[Sales]\"\n";
        assert!(matches!(
            PipelineDefinition::from_yaml(yaml),
            Err(PipelineError::InvalidDefinition(_))
        ));
    }

    #[test]
    fn test_rejects_unknown_policy() {
        let yaml = "name: \"Retry\"\non_failure: retry\nagents:\n  - name: Sales\n";
        assert!(matches!(
            PipelineDefinition::from_yaml(yaml),
            Err(PipelineError::Yaml(_))
        ));
    }
}
