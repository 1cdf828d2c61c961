//! Run state
//!
//! `OrchestrationState` is the single mutable record of one run. The
//! controller owns it exclusively; strategies read it and return deltas.

use super::config::{AgentDescriptor, OrchestrationConfig};
use ensemble_llm::{ContextSet, Message};
use serde::{Deserialize, Serialize};

/// Run status state machine
///
/// `initializing → running ⇄ paused → {completed | cancelled | error |
/// awaiting_user}`. Terminal states are absorbing. An `awaiting_user` run is
/// resumed by seeding a new run with its final history plus a fresh user
/// message. `stopped` is the fallback when the loop exits without an
/// explicit terminal status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    /// Configuration is being validated
    Initializing,
    /// Rounds are executing
    Running,
    /// Paused at a round boundary, waiting for a continue or cancel signal
    Paused,
    /// The workflow goal was reached (or the round cap, see the error field)
    Completed,
    /// Cancelled by request
    Cancelled,
    /// A fatal error ended the run
    Error,
    /// The loop exited without an explicit terminal status
    Stopped,
    /// Suspended waiting for user input
    AwaitingUser,
}

impl RunStatus {
    /// Whether the run can make no further progress
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::Completed | Self::Cancelled | Self::Error | Self::Stopped | Self::AwaitingUser
        )
    }

    /// Returns the string representation of the status
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Initializing => "initializing",
            Self::Running => "running",
            Self::Paused => "paused",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
            Self::Error => "error",
            Self::Stopped => "stopped",
            Self::AwaitingUser => "awaiting_user",
        }
    }
}

/// The single mutable record of one run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrchestrationState {
    /// Immutable run configuration
    pub config: OrchestrationConfig,
    /// Current status
    pub status: RunStatus,
    /// Rounds committed so far (monotonic, bounded by `max_rounds`)
    pub current_round: usize,
    /// Agent scheduled for the next round, when the strategy tracks one
    pub current_agent: Option<AgentDescriptor>,
    /// Conversation history, append-only apart from the amend-last exception
    pub conversation_history: Vec<Message>,
    /// Team context sets as of the last committed round
    pub context_sets: Vec<ContextSet>,
    /// Error string for error and round-cap outcomes
    pub error: Option<String>,
}

impl OrchestrationState {
    /// Build the initial state for a run
    ///
    /// An empty `initial_history` is seeded with the configured initial
    /// message. A non-empty one (resuming past `awaiting_user`) is taken
    /// as-is and must already end with the new user message.
    #[must_use]
    pub fn new(config: OrchestrationConfig, initial_history: Vec<Message>) -> Self {
        let conversation_history = if initial_history.is_empty() {
            vec![Message::user(&config.initial_message)]
        } else {
            initial_history
        };
        let context_sets = config.initial_context.clone();
        Self {
            config,
            status: RunStatus::Initializing,
            current_round: 0,
            current_agent: None,
            conversation_history,
            context_sets,
            error: None,
        }
    }

    /// Most recently appended message
    #[must_use]
    pub fn last_message(&self) -> Option<&Message> {
        self.conversation_history.last()
    }
}
