//! Run configuration
//!
//! `OrchestrationConfig` is immutable for the lifetime of a run; the roster
//! cannot change mid-run.

use crate::error::{Error, Result};
use ensemble_llm::{ContextSet, ModelParams};
use serde::{Deserialize, Serialize};

/// Default round cap per run
pub(crate) const DEFAULT_MAX_ROUNDS: usize = 15;

/// Roster role of an agent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AgentKind {
    /// Routing authority in manager-directed mode
    Manager,
    /// Specialist agent
    Agent,
}

/// One agent on the team roster
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentDescriptor {
    /// Unique name within a run
    pub name: String,
    /// Roster role
    pub kind: AgentKind,
    /// Display title
    pub title: String,
    /// Role description injected into the agent's system prompt
    #[serde(default)]
    pub role_description: String,
    /// Model invocation parameters
    #[serde(default)]
    pub params: ModelParams,
}

impl AgentDescriptor {
    /// Create a descriptor with the name doubling as the title
    pub fn new(name: impl Into<String>, kind: AgentKind) -> Self {
        let name = name.into();
        Self {
            title: name.clone(),
            name,
            kind,
            role_description: String::new(),
            params: ModelParams::default(),
        }
    }

    /// Set the display title
    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Set the role description
    #[must_use]
    pub fn with_role_description(mut self, role_description: impl Into<String>) -> Self {
        self.role_description = role_description.into();
        self
    }

    /// Set the model parameters
    #[must_use]
    pub fn with_params(mut self, params: ModelParams) -> Self {
        self.params = params;
        self
    }

    /// Whether this agent is the manager
    #[must_use]
    pub fn is_manager(&self) -> bool {
        self.kind == AgentKind::Manager
    }

    /// System prompt assembled from the agent's role and the team objectives
    #[must_use]
    pub fn system_prompt(&self, objectives: &str) -> String {
        format!(
            "You are {} ({}).\n{}\n\n## Team Objectives\n{}",
            self.title, self.name, self.role_description, objectives
        )
    }
}

/// Immutable per-run configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrchestrationConfig {
    /// Message that seeds the conversation
    pub initial_message: String,
    /// Team name, used for record keying and logging
    pub team_name: String,
    /// Team objectives injected into every agent prompt
    #[serde(default)]
    pub objectives: String,
    /// Ordered roster
    pub agents: Vec<AgentDescriptor>,
    /// Explicit agent order used by direct mode (the first entry acts)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agent_order: Option<Vec<String>>,
    /// Round cap; reaching it is a graceful stop, not a failure
    #[serde(default = "default_max_rounds")]
    pub max_rounds: usize,
    /// User owning the run
    #[serde(default)]
    pub user_id: String,
    /// Context sets seeded into the run
    #[serde(default)]
    pub initial_context: Vec<ContextSet>,
}

fn default_max_rounds() -> usize {
    DEFAULT_MAX_ROUNDS
}

impl OrchestrationConfig {
    /// Create a configuration for a team and initial message
    pub fn new(team_name: impl Into<String>, initial_message: impl Into<String>) -> Self {
        Self {
            initial_message: initial_message.into(),
            team_name: team_name.into(),
            objectives: String::new(),
            agents: Vec::new(),
            agent_order: None,
            max_rounds: DEFAULT_MAX_ROUNDS,
            user_id: String::new(),
            initial_context: Vec::new(),
        }
    }

    /// Set the team objectives
    #[must_use]
    pub fn with_objectives(mut self, objectives: impl Into<String>) -> Self {
        self.objectives = objectives.into();
        self
    }

    /// Add an agent to the roster
    #[must_use]
    pub fn with_agent(mut self, agent: AgentDescriptor) -> Self {
        self.agents.push(agent);
        self
    }

    /// Set the explicit agent order used by direct mode
    #[must_use]
    pub fn with_agent_order(mut self, order: Vec<String>) -> Self {
        self.agent_order = Some(order);
        self
    }

    /// Set the round cap
    #[must_use]
    pub fn with_max_rounds(mut self, max_rounds: usize) -> Self {
        self.max_rounds = max_rounds;
        self
    }

    /// Set the owning user
    #[must_use]
    pub fn with_user(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = user_id.into();
        self
    }

    /// Seed context sets into the run
    #[must_use]
    pub fn with_initial_context(mut self, context: Vec<ContextSet>) -> Self {
        self.initial_context = context;
        self
    }

    /// Find a roster agent by name (case-insensitive)
    #[must_use]
    pub fn find_agent(&self, name: &str) -> Option<&AgentDescriptor> {
        self.agents.iter().find(|a| a.name.eq_ignore_ascii_case(name))
    }

    /// The manager agent, if any
    #[must_use]
    pub fn manager(&self) -> Option<&AgentDescriptor> {
        self.agents.iter().find(|a| a.is_manager())
    }

    /// The single manager required by manager-dependent strategies
    pub fn require_single_manager(&self) -> Result<&AgentDescriptor> {
        let mut managers = self.agents.iter().filter(|a| a.is_manager());
        let first = managers.next().ok_or_else(|| {
            Error::Configuration(format!("team '{}' has no manager agent", self.team_name))
        })?;
        if managers.next().is_some() {
            return Err(Error::Configuration(format!(
                "team '{}' has more than one manager agent",
                self.team_name
            )));
        }
        Ok(first)
    }
}
