//! LLM Agent Caller — the HTTP-backed agent capability.
//!
//! Each invocation is a single-turn completion: the agent's specialist prompt
//! goes in as the system message and the accumulated context as the user
//! message. Two wire formats are supported:
//!
//! - `openai`: OpenAI-compatible `POST {base_url}/chat/completions` (Groq by default)
//! - `anthropic`: Anthropic Messages `POST {base_url}/v1/messages`
//!
//! Upstream errors are returned as `CapabilityError`s and never written into
//! the workflow log as if they were agent output.

use std::str::FromStr;
use std::time::Duration;

use async_trait::async_trait;

use crate::workflow::capability::{AgentCapability, AgentSpec, CapabilityError};

pub const DEFAULT_BASE_URL: &str = "https://api.groq.com/openai/v1";
pub const DEFAULT_MODEL: &str = "llama-3.3-70b-versatile";

/// Wire format spoken by the upstream API.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Adapter {
    OpenAi,
    Anthropic,
}

impl FromStr for Adapter {
    type Err = CapabilityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "openai" | "groq" => Ok(Adapter::OpenAi),
            "anthropic" => Ok(Adapter::Anthropic),
            other => Err(CapabilityError::Config(format!(
                "Unknown adapter type: '{}'",
                other
            ))),
        }
    }
}

/// Configuration for the HTTP agent capability.
#[derive(Debug, Clone)]
pub struct CallerConfig {
    pub adapter: Adapter,
    /// API base URL
    pub base_url: String,
    /// API key / auth token
    pub api_key: String,
    /// Model ID
    pub model: String,
    pub temperature: Option<f64>,
    pub max_tokens: u32,
    /// Transport-level timeout; the executor applies its own per-agent deadline
    pub request_timeout: Duration,
}

impl Default for CallerConfig {
    fn default() -> Self {
        Self {
            adapter: Adapter::OpenAi,
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: String::new(),
            model: DEFAULT_MODEL.to_string(),
            temperature: None,
            max_tokens: 8192,
            request_timeout: Duration::from_secs(300),
        }
    }
}

impl CallerConfig {
    /// Read the configuration from the environment.
    ///
    /// - `IDEAFLOW_ADAPTER` — `openai` (default) or `anthropic`
    /// - `IDEAFLOW_BASE_URL` — API base URL
    /// - `IDEAFLOW_API_KEY`, falling back to `GROQ_API_KEY` / `ANTHROPIC_API_KEY`
    /// - `LLM_MODEL` — model ID
    /// - `IDEAFLOW_TEMPERATURE` — optional sampling temperature
    pub fn from_env() -> Result<Self, CapabilityError> {
        let defaults = Self::default();

        let adapter = match std::env::var("IDEAFLOW_ADAPTER") {
            Ok(value) => value.parse()?,
            Err(_) => defaults.adapter,
        };

        let base_url = std::env::var("IDEAFLOW_BASE_URL").unwrap_or_else(|_| match adapter {
            Adapter::OpenAi => defaults.base_url.clone(),
            Adapter::Anthropic => "https://api.anthropic.com".to_string(),
        });

        let api_key = std::env::var("IDEAFLOW_API_KEY")
            .or_else(|_| match adapter {
                Adapter::OpenAi => std::env::var("GROQ_API_KEY"),
                Adapter::Anthropic => std::env::var("ANTHROPIC_API_KEY"),
            })
            .unwrap_or_default();

        if api_key.is_empty() {
            return Err(CapabilityError::Config(
                "No API key found. Set IDEAFLOW_API_KEY or GROQ_API_KEY \
                 (ANTHROPIC_API_KEY for the anthropic adapter)."
                    .to_string(),
            ));
        }

        let temperature = match std::env::var("IDEAFLOW_TEMPERATURE") {
            Ok(value) => Some(value.parse::<f64>().map_err(|e| {
                CapabilityError::Config(format!("Invalid IDEAFLOW_TEMPERATURE '{}': {}", value, e))
            })?),
            Err(_) => None,
        };

        Ok(Self {
            adapter,
            base_url,
            api_key,
            model: std::env::var("LLM_MODEL").unwrap_or(defaults.model),
            temperature,
            ..defaults
        })
    }
}

/// Calls an LLM over HTTP on behalf of a pipeline agent.
pub struct LlmAgentCaller {
    client: reqwest::Client,
    config: CallerConfig,
}

impl LlmAgentCaller {
    pub fn new(config: CallerConfig) -> Self {
        Self {
            client: reqwest::Client::builder()
                .timeout(config.request_timeout)
                .build()
                .unwrap_or_else(|_| reqwest::Client::new()),
            config,
        }
    }

    pub fn from_env() -> Result<Self, CapabilityError> {
        Ok(Self::new(CallerConfig::from_env()?))
    }

    pub fn config(&self) -> &CallerConfig {
        &self.config
    }

    fn request_body(&self, agent: &AgentSpec, context: &str) -> serde_json::Value {
        let mut body = match self.config.adapter {
            Adapter::OpenAi => {
                let mut messages = Vec::new();
                if !agent.system_prompt.is_empty() {
                    messages.push(serde_json::json!({
                        "role": "system",
                        "content": agent.system_prompt
                    }));
                }
                messages.push(serde_json::json!({ "role": "user", "content": context }));
                serde_json::json!({
                    "model": self.config.model,
                    "messages": messages
                })
            }
            Adapter::Anthropic => {
                let mut body = serde_json::json!({
                    "model": self.config.model,
                    "max_tokens": self.config.max_tokens,
                    "messages": [{ "role": "user", "content": context }]
                });
                if !agent.system_prompt.is_empty() {
                    body["system"] = serde_json::Value::String(agent.system_prompt.clone());
                }
                body
            }
        };

        if let Some(temp) = self.config.temperature {
            if let Some(number) = serde_json::Number::from_f64(temp) {
                body["temperature"] = serde_json::Value::Number(number);
            }
        }
        body
    }

    fn endpoint(&self) -> String {
        let base = self.config.base_url.trim_end_matches('/');
        match self.config.adapter {
            Adapter::OpenAi => format!("{}/chat/completions", base),
            Adapter::Anthropic => format!("{}/v1/messages", base),
        }
    }
}

#[async_trait]
impl AgentCapability for LlmAgentCaller {
    async fn invoke(&self, agent: &AgentSpec, context: &str) -> Result<String, CapabilityError> {
        let url = self.endpoint();
        let body = self.request_body(agent, context);

        tracing::info!(
            "[AgentCaller] Calling {} for agent {} (model: {})",
            url,
            agent.name,
            self.config.model
        );

        let request = self.client.post(&url).json(&body);
        let request = match self.config.adapter {
            Adapter::OpenAi => request.bearer_auth(&self.config.api_key),
            Adapter::Anthropic => request
                .header("x-api-key", &self.config.api_key)
                .header("anthropic-version", "2023-06-01"),
        };

        let response = request
            .send()
            .await
            .map_err(|e| CapabilityError::Http(e.to_string()))?;

        let status = response.status();
        let response_text = response
            .text()
            .await
            .map_err(|e| CapabilityError::Http(format!("Failed to read response body: {}", e)))?;

        if !status.is_success() {
            return Err(CapabilityError::Api {
                status: status.as_u16(),
                body: response_text,
            });
        }

        let json: serde_json::Value = serde_json::from_str(&response_text)
            .map_err(|e| CapabilityError::Parse(e.to_string()))?;

        let content = match self.config.adapter {
            Adapter::OpenAi => extract_openai_content(&json),
            Adapter::Anthropic => extract_anthropic_content(&json),
        }
        .ok_or_else(|| CapabilityError::Parse("no text content in response".to_string()))?;

        let content = content.trim();
        if content.is_empty() {
            return Err(CapabilityError::EmptyResponse);
        }
        Ok(content.to_string())
    }
}

/// `choices[0].message.content` from an OpenAI-compatible response.
fn extract_openai_content(json: &serde_json::Value) -> Option<String> {
    json.get("choices")
        .and_then(|c| c.as_array())
        .and_then(|arr| arr.first())
        .and_then(|choice| choice.get("message"))
        .and_then(|msg| msg.get("content"))
        .and_then(|c| c.as_str())
        .map(|s| s.to_string())
}

/// All `text` blocks of an Anthropic Messages response, joined by newlines.
fn extract_anthropic_content(json: &serde_json::Value) -> Option<String> {
    json.get("content")
        .and_then(|c| c.as_array())
        .and_then(|arr| {
            arr.iter()
                .filter(|block| block.get("type").and_then(|t| t.as_str()) == Some("text"))
                .filter_map(|block| block.get("text").and_then(|t| t.as_str()))
                .map(|s| s.to_string())
                .reduce(|a, b| format!("{}\n{}", a, b))
        })
}
