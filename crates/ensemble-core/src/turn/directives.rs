//! Structured agent directives
//!
//! An agent turn may carry a structured decision object alongside its text.
//! In manager-directed mode this object is the routing decision itself; in
//! the other modes only its context mutations are honored. Parsing is
//! lenient: a malformed object degrades to "no directives" rather than
//! failing the turn.

use crate::context::{ContextDelta, ContextEdit};
use ensemble_llm::ContextSet;
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Structured decision object emitted by an agent turn
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AgentDirectives {
    /// The workflow has reached its goal
    pub workflow_complete: bool,
    /// Control should return to the user
    pub redirect_to_user: bool,
    /// Agent that should act next
    pub next_agent_name: Option<String>,
    /// Message handed to the next agent
    pub message_for_next_agent: Option<String>,
    /// Brand-new context sets to append
    pub updated_context_sets: Vec<ContextSet>,
    /// Edits to existing context sets
    pub edited_context_sets: Vec<ContextEdit>,
    /// Full context snapshot; takes precedence over the incremental fields
    pub all_context_sets: Option<Vec<ContextSet>>,
}

impl AgentDirectives {
    /// Parse a raw directive value, degrading to `None` when malformed
    #[must_use]
    pub fn from_value(value: &serde_json::Value) -> Option<Self> {
        match serde_json::from_value(value.clone()) {
            Ok(parsed) => Some(parsed),
            Err(e) => {
                warn!(error = %e, "Malformed agent directives, ignoring");
                None
            }
        }
    }

    /// Whether any routing signal is present
    #[must_use]
    pub fn has_routing_signal(&self) -> bool {
        self.workflow_complete || self.redirect_to_user || self.next_agent_name.is_some()
    }

    /// Context mutations as a round delta (the snapshot wins over increments)
    #[must_use]
    pub fn context_delta(&self) -> ContextDelta {
        if let Some(snapshot) = &self.all_context_sets {
            return ContextDelta {
                replace_all: Some(snapshot.clone()),
                ..ContextDelta::default()
            };
        }
        ContextDelta {
            replace_all: None,
            added: self.updated_context_sets.clone(),
            edits: self.edited_context_sets.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sparse_object_parses_with_defaults() {
        let value = serde_json::json!({"nextAgentName": "Analyst"});
        let directives = AgentDirectives::from_value(&value).unwrap();

        assert_eq!(directives.next_agent_name.as_deref(), Some("Analyst"));
        assert!(!directives.workflow_complete);
        assert!(directives.has_routing_signal());
    }

    #[test]
    fn test_malformed_object_degrades_to_none() {
        let value = serde_json::json!({"nextAgentName": 42});
        assert!(AgentDirectives::from_value(&value).is_none());
    }

    #[test]
    fn test_snapshot_precedence_in_context_delta() {
        let directives = AgentDirectives {
            updated_context_sets: vec![ContextSet::new("ignored", "x")],
            all_context_sets: Some(vec![ContextSet::new("snapshot", "y")]),
            ..AgentDirectives::default()
        };

        let delta = directives.context_delta();
        assert!(delta.replace_all.is_some());
        assert!(delta.added.is_empty());
    }

    #[test]
    fn test_no_routing_signal() {
        let directives = AgentDirectives {
            updated_context_sets: vec![ContextSet::new("notes", "x")],
            ..AgentDirectives::default()
        };
        assert!(!directives.has_routing_signal());
        assert!(!directives.context_delta().is_empty());
    }
}
