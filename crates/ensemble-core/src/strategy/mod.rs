//! Routing strategies
//!
//! Three interchangeable implementations of the per-round contract:
//! - `direct`: a single fixed agent, no routing decision
//! - `llm_routed`: an auxiliary routing call picks the next recipient
//! - `manager`: the manager agent's own output is the routing decision
//!
//! The controller is strategy-agnostic: it validates once, asks the active
//! strategy for exactly one round at a time against a read-only view of the
//! state, and commits the returned delta itself.

mod direct;
mod llm_routed;
mod manager;
mod parsing;
mod routing;


pub use direct::DirectStrategy;
pub use llm_routed::LlmRoutedStrategy;
pub use manager::ManagerStrategy;
pub use parsing::{extract_mention, parse_manager_text};
pub use routing::{classify_source, MessageSource, RoutingResult};

use crate::context::ContextDelta;
use crate::error::Result;
use crate::orchestrator::{AgentDescriptor, OrchestrationConfig, OrchestrationState};
use ensemble_llm::Message;

/// Delta produced by one strategy round
#[derive(Debug, Clone, Default)]
pub struct RoundOutcome {
    /// Messages to append to the conversation, in order
    pub messages: Vec<Message>,
    /// Replacement content for the most recently appended history entry
    ///
    /// The single exception to append-only history: converting a manager
    /// message into a user-facing information request. Applied before
    /// `messages` are appended.
    pub amend_last: Option<String>,
    /// Context mutations, visible from the next round onward
    pub context: ContextDelta,
    /// Agent scheduled to act next round
    pub next_agent: Option<AgentDescriptor>,
    /// Terminal: the workflow goal is reached
    pub workflow_complete: bool,
    /// Suspend: control returns to the user
    pub redirect_to_user: bool,
}

/// One interchangeable routing strategy
#[async_trait::async_trait]
pub trait RoutingStrategy: Send + Sync {
    /// Strategy name for logs
    fn name(&self) -> &'static str;

    /// Check the configuration before any round executes
    fn validate(&self, config: &OrchestrationConfig) -> Result<()>;

    /// Execute exactly one round against a read-only view of the run state
    async fn execute_round(&self, state: &OrchestrationState) -> Result<RoundOutcome>;
}
