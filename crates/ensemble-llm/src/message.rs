//! Message types for team conversations
//!
//! This module defines the conversation record shared between the
//! orchestration engine and the LLM invocation layer.

use crate::context::ContextSet;
use serde::{Deserialize, Serialize};

/// Role in a conversation message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    /// System message (instructions, turn notices)
    System,
    /// User message
    User,
    /// Assistant message (an agent turn)
    Assistant,
}

impl MessageRole {
    /// Returns the string representation of the role
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageRole::System => "system",
            MessageRole::User => "user",
            MessageRole::Assistant => "assistant",
        }
    }
}

/// A message in a team conversation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    /// Role of the message sender
    pub role: MessageRole,
    /// Message content
    pub content: String,
    /// Name of the agent that produced this message (assistant turns only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agent_name: Option<String>,
    /// Raw structured directives emitted alongside the turn, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub directives: Option<serde_json::Value>,
    /// Context sets attached to this message for display, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context_snapshot: Option<Vec<ContextSet>>,
}

impl Message {
    /// Create a system message
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::System,
            content: content.into(),
            agent_name: None,
            directives: None,
            context_snapshot: None,
        }
    }

    /// Create a user message
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::User,
            content: content.into(),
            agent_name: None,
            directives: None,
            context_snapshot: None,
        }
    }

    /// Create an assistant message with no agent attribution
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::Assistant,
            content: content.into(),
            agent_name: None,
            directives: None,
            context_snapshot: None,
        }
    }

    /// Create an assistant message attributed to a named agent
    pub fn from_agent(agent_name: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::Assistant,
            content: content.into(),
            agent_name: Some(agent_name.into()),
            directives: None,
            context_snapshot: None,
        }
    }

    /// Attach the raw directive value the agent emitted with this turn
    #[must_use]
    pub fn with_directives(mut self, directives: serde_json::Value) -> Self {
        self.directives = Some(directives);
        self
    }

    /// Attach a context snapshot for display alongside this message
    #[must_use]
    pub fn with_context_snapshot(mut self, snapshot: Vec<ContextSet>) -> Self {
        self.context_snapshot = Some(snapshot);
        self
    }

    /// Whether this message was produced by the named agent
    #[must_use]
    pub fn is_from_agent(&self, name: &str) -> bool {
        self.role == MessageRole::Assistant
            && self
                .agent_name
                .as_deref()
                .is_some_and(|a| a.eq_ignore_ascii_case(name))
    }
}
