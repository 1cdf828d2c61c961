//! LLM client contract
//!
//! The orchestration engine treats model invocation as a black box behind
//! `LlmClient`: prompt assembly details and transport belong to the
//! implementor. Routing and form-synthesis calls return raw JSON values; the
//! engine interprets them and degrades gracefully when they do not parse.

use crate::context::ContextSet;
use crate::error::Result;
use crate::message::Message;
use serde::{Deserialize, Serialize};

/// Model invocation parameters for one agent
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ModelParams {
    /// Model identifier (provider-specific)
    pub model: String,
    /// Sampling temperature
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    /// Maximum tokens to generate
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
}

impl ModelParams {
    /// Create parameters for the given model
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            ..Default::default()
        }
    }

    /// Set temperature
    #[must_use]
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    /// Set max tokens
    #[must_use]
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }
}

/// One agent reasoning step
#[derive(Debug, Clone)]
pub struct AgentInvocation {
    /// Name of the acting agent
    pub agent_name: String,
    /// System prompt assembled from the agent's role and team objectives
    pub system_prompt: String,
    /// Model parameters for this agent
    pub params: ModelParams,
    /// The message the agent is asked to act on
    pub message: String,
    /// History slice provided to the agent (empty for stateless agents)
    pub history: Vec<Message>,
    /// Context sets visible to this agent
    pub context: Vec<ContextSet>,
}

/// Result of one agent reasoning step
#[derive(Debug, Clone)]
pub struct AgentReply {
    /// Free-text response
    pub text: String,
    /// Structured directive object, when the model emitted one
    pub directives: Option<serde_json::Value>,
}

impl AgentReply {
    /// Create a plain text reply
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            directives: None,
        }
    }

    /// Attach a directive object
    #[must_use]
    pub fn with_directives(mut self, directives: serde_json::Value) -> Self {
        self.directives = Some(directives);
        self
    }
}

/// Input to the auxiliary routing model
#[derive(Debug, Clone)]
pub struct RoutingRequest {
    /// The conversation message being routed
    pub latest_message: String,
    /// Classified source of that message (user, agent, manager, system)
    pub message_source: String,
    /// Bounded history digest, one line per entry
    pub history_digest: String,
    /// Names of every agent on the roster
    pub roster: Vec<String>,
    /// Context sets visible to the routing model
    pub context: Vec<ContextSet>,
}

/// Black-box LLM invocation layer
///
/// Mirrors the three calls the engine consumes: agent turns, the auxiliary
/// routing decision, and information-request form synthesis.
#[async_trait::async_trait]
pub trait LlmClient: Send + Sync {
    /// Get the client name
    fn name(&self) -> &str;

    /// Execute one agent reasoning step
    async fn invoke_agent(&self, request: AgentInvocation) -> Result<AgentReply>;

    /// Ask the auxiliary routing model for a decision
    ///
    /// The returned value is expected to match the engine's routing schema.
    /// Malformed output is not an error; the engine recovers from it.
    async fn invoke_routing(&self, request: RoutingRequest) -> Result<serde_json::Value>;

    /// Synthesize a structured form from an information-request message
    async fn synthesize_form(&self, message: &str) -> Result<serde_json::Value>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_model_params_builder() {
        let params = ModelParams::new("gpt-4")
            .with_temperature(0.7)
            .with_max_tokens(1024);

        assert_eq!(params.model, "gpt-4");
        assert_eq!(params.temperature, Some(0.7));
        assert_eq!(params.max_tokens, Some(1024));
    }

    #[test]
    fn test_agent_reply_builder() {
        let reply = AgentReply::text("Done").with_directives(serde_json::json!({"x": 1}));
        assert_eq!(reply.text, "Done");
        assert!(reply.directives.is_some());
    }
}
