//! Routing decision schema and message-source classification

use crate::orchestrator::OrchestrationConfig;
use ensemble_llm::{ContextSet, Message, MessageRole};
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Classified origin of the message being routed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageSource {
    /// Sent by the user
    User,
    /// Produced by a non-manager agent on the roster
    Agent,
    /// Produced by the manager agent
    Manager,
    /// Anything else (system notices, unknown authors)
    System,
}

impl MessageSource {
    /// String form for prompts and logs
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Agent => "agent",
            Self::Manager => "manager",
            Self::System => "system",
        }
    }
}

/// Classify the source of a message against the roster
#[must_use]
pub fn classify_source(message: &Message, config: &OrchestrationConfig) -> MessageSource {
    match message.role {
        MessageRole::User => MessageSource::User,
        MessageRole::System => MessageSource::System,
        MessageRole::Assistant => {
            match message.agent_name.as_deref().and_then(|n| config.find_agent(n)) {
                Some(agent) if agent.is_manager() => MessageSource::Manager,
                Some(_) => MessageSource::Agent,
                None => MessageSource::System,
            }
        }
    }
}

/// Decision returned by the auxiliary routing model
///
/// Transient, recomputed every round and never persisted. Every field
/// defaults so a sparse object still parses.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RoutingResult {
    /// Agent that should receive the message next
    pub next_agent_name: Option<String>,
    /// Message rewritten for the next recipient
    pub rewritten_message: Option<String>,
    /// Control should return to the user
    pub redirect_to_user: bool,
    /// The message asks the user for specific structured values
    pub info_request: bool,
    /// The workflow goal is reached
    pub workflow_complete: bool,
    /// `new_context` carries a complete replacement context collection
    pub context_request: bool,
    /// Full replacement context sets (not a diff)
    pub new_context: Option<Vec<ContextSet>>,
    /// Model's stated reason, kept for observability
    pub reason_for_decision: String,
}

impl RoutingResult {
    /// Parse a raw routing value, falling back to an empty decision
    #[must_use]
    pub fn from_value(value: serde_json::Value) -> Self {
        serde_json::from_value(value).unwrap_or_else(|e| {
            warn!(error = %e, "Malformed routing decision, using defaults");
            Self::default()
        })
    }
}
