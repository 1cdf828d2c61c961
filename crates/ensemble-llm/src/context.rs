//! Context sets
//!
//! Named, team-scoped text blocks that agents read and write across rounds.
//! Visibility can be masked per agent; disabled sets are withheld from every
//! agent prompt but kept in the run record.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// A named, addressable text block shared across a team
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContextSet {
    /// Unique name within the team (edits may rename it)
    pub set_name: String,
    /// Text payload
    pub text: String,
    /// Disabled sets are retained but not shown to any agent
    #[serde(default)]
    pub is_disabled: bool,
    /// Agent names this set is hidden from
    #[serde(default)]
    pub hidden_from_agents: HashSet<String>,
}

impl ContextSet {
    /// Create a new visible context set
    pub fn new(set_name: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            set_name: set_name.into(),
            text: text.into(),
            is_disabled: false,
            hidden_from_agents: HashSet::new(),
        }
    }

    /// Hide this set from the named agent
    #[must_use]
    pub fn hidden_from(mut self, agent_name: impl Into<String>) -> Self {
        self.hidden_from_agents.insert(agent_name.into());
        self
    }

    /// Mark this set as disabled
    #[must_use]
    pub fn disabled(mut self) -> Self {
        self.is_disabled = true;
        self
    }

    /// Whether the named agent may see this set
    #[must_use]
    pub fn is_visible_to(&self, agent_name: &str) -> bool {
        !self.is_disabled && !self.hidden_from_agents.contains(agent_name)
    }
}
