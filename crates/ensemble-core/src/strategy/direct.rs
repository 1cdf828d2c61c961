//! Direct interaction strategy
//!
//! A single fixed agent (the first name in `agent_order`) takes exactly one
//! turn and the run completes. No routing decision is computed.

use std::sync::Arc;

use tracing::info;

use super::{RoundOutcome, RoutingStrategy};
use crate::error::{Error, Result};
use crate::history;
use crate::orchestrator::{AgentDescriptor, OrchestrationConfig, OrchestrationState};
use crate::turn::{AgentDirectives, TurnExecutor};

/// Routes every round to one fixed agent and then completes
pub struct DirectStrategy {
    executor: Arc<TurnExecutor>,
}

impl DirectStrategy {
    /// Create the strategy
    #[must_use]
    pub fn new(executor: Arc<TurnExecutor>) -> Self {
        Self { executor }
    }

    fn designated_agent(config: &OrchestrationConfig) -> Result<&AgentDescriptor> {
        let order = config
            .agent_order
            .as_ref()
            .filter(|o| !o.is_empty())
            .ok_or_else(|| {
                Error::Configuration("direct mode requires a non-empty agent order".to_string())
            })?;
        config.find_agent(&order[0]).ok_or_else(|| {
            Error::Configuration(format!(
                "agent '{}' from the agent order is not on the roster",
                order[0]
            ))
        })
    }
}

#[async_trait::async_trait]
impl RoutingStrategy for DirectStrategy {
    fn name(&self) -> &'static str {
        "direct"
    }

    fn validate(&self, config: &OrchestrationConfig) -> Result<()> {
        if config.team_name.trim().is_empty() {
            return Err(Error::Configuration("team name is required".to_string()));
        }
        Self::designated_agent(config).map(|_| ())
    }

    async fn execute_round(&self, state: &OrchestrationState) -> Result<RoundOutcome> {
        let agent = Self::designated_agent(&state.config)?;
        let message = state
            .last_message()
            .map(|m| m.content.clone())
            .unwrap_or_else(|| state.config.initial_message.clone());
        info!(agent = %agent.name, "Direct turn");

        let window = history::manager_window(&state.conversation_history);
        let turn = self
            .executor
            .execute(
                agent,
                &state.config.objectives,
                &message,
                &window,
                &state.context_sets,
            )
            .await?;

        let context = turn
            .directives
            .as_ref()
            .map(AgentDirectives::context_delta)
            .unwrap_or_default();

        Ok(RoundOutcome {
            messages: vec![turn.message],
            context,
            workflow_complete: true,
            ..RoundOutcome::default()
        })
    }
}
