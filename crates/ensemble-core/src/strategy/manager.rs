//! Manager-directed strategy
//!
//! No auxiliary routing call: the manager's own structured output is the
//! routing decision, with deterministic text parsing as the fallback. After
//! any specialist turn control returns to the manager unconditionally; the
//! manager is the sole routing authority. A specialist turn error is
//! reported to the manager as a message rather than aborting the run.

use std::sync::Arc;

use ensemble_llm::Message;
use tracing::{info, warn};

use super::parsing::{extract_mention, parse_manager_text};
use super::{RoundOutcome, RoutingStrategy};
use crate::error::Result;
use crate::history;
use crate::orchestrator::{AgentDescriptor, OrchestrationConfig, OrchestrationState};
use crate::turn::{AgentDirectives, TurnExecutor};

/// Lets the manager agent's own output drive the routing
pub struct ManagerStrategy {
    executor: Arc<TurnExecutor>,
}

impl ManagerStrategy {
    /// Create the strategy
    #[must_use]
    pub fn new(executor: Arc<TurnExecutor>) -> Self {
        Self { executor }
    }

    /// The message a routed specialist should act on
    ///
    /// Prefers the manager's structured handoff, then the text after a
    /// mention, then the manager message verbatim.
    fn handoff_message(last: &Message, config: &OrchestrationConfig) -> String {
        if let Some(directives) = last.directives.as_ref().and_then(AgentDirectives::from_value)
        {
            if let Some(message) = directives.message_for_next_agent {
                return message;
            }
        }
        if let Some((_, rest)) = extract_mention(&last.content, config) {
            if !rest.is_empty() {
                return rest;
            }
        }
        last.content.clone()
    }

    /// One manager turn; its output decides what happens next
    ///
    /// Manager turn errors propagate and abort the run.
    async fn manager_round(
        &self,
        state: &OrchestrationState,
        manager: &AgentDescriptor,
    ) -> Result<RoundOutcome> {
        let config = &state.config;
        let message = state
            .last_message()
            .map(|m| m.content.clone())
            .unwrap_or_else(|| config.initial_message.clone());
        let window = history::manager_window(&state.conversation_history);

        let turn = self
            .executor
            .execute(
                manager,
                &config.objectives,
                &message,
                &window,
                &state.context_sets,
            )
            .await?;

        // structured directives win; otherwise parse the reply text, keeping
        // any context mutations the structured object did carry
        let directives = match &turn.directives {
            Some(d) if d.has_routing_signal() => d.clone(),
            Some(d) => {
                let mut parsed = parse_manager_text(&turn.message.content, config);
                parsed.updated_context_sets = d.updated_context_sets.clone();
                parsed.edited_context_sets = d.edited_context_sets.clone();
                parsed.all_context_sets = d.all_context_sets.clone();
                parsed
            }
            None => parse_manager_text(&turn.message.content, config),
        };
        let context = directives.context_delta();

        if directives.workflow_complete {
            info!("Manager declared the workflow complete");
            return Ok(RoundOutcome {
                messages: vec![turn.message],
                context,
                workflow_complete: true,
                ..RoundOutcome::default()
            });
        }

        if directives.redirect_to_user {
            info!("Manager redirected to the user");
            let message = turn
                .message
                .with_context_snapshot(state.context_sets.clone());
            return Ok(RoundOutcome {
                messages: vec![message],
                context,
                next_agent: Some(manager.clone()),
                redirect_to_user: true,
                ..RoundOutcome::default()
            });
        }

        let next = match directives.next_agent_name.as_deref() {
            Some(name) => match config.find_agent(name) {
                Some(agent) if !agent.is_manager() => agent.clone(),
                Some(_) => manager.clone(),
                None => {
                    warn!(agent = %name, "Manager named an unknown agent, keeping the floor");
                    manager.clone()
                }
            },
            // no routing signal: the manager keeps the floor
            None => manager.clone(),
        };
        info!(next = %next.name, "Manager routed");

        Ok(RoundOutcome {
            messages: vec![turn.message],
            context,
            next_agent: Some(next),
            ..RoundOutcome::default()
        })
    }

    /// One specialist turn; control always returns to the manager
    ///
    /// A failed specialist turn becomes an informational message for the
    /// manager so the run keeps making progress.
    async fn specialist_round(
        &self,
        state: &OrchestrationState,
        agent: &AgentDescriptor,
        manager: &AgentDescriptor,
    ) -> Result<RoundOutcome> {
        let config = &state.config;
        let message = state
            .last_message()
            .map(|m| Self::handoff_message(m, config))
            .unwrap_or_else(|| config.initial_message.clone());

        // specialists act statelessly: one message plus visible context
        match self
            .executor
            .execute(agent, &config.objectives, &message, &[], &state.context_sets)
            .await
        {
            Ok(turn) => {
                let context = turn
                    .directives
                    .as_ref()
                    .map(AgentDirectives::context_delta)
                    .unwrap_or_default();
                Ok(RoundOutcome {
                    messages: vec![turn.message],
                    context,
                    next_agent: Some(manager.clone()),
                    ..RoundOutcome::default()
                })
            }
            Err(e) => {
                warn!(agent = %agent.name, error = %e, "Specialist turn failed, reporting to manager");
                let notice = Message::system(format!(
                    "Agent '{}' failed to complete its turn: {e}. Decide how to proceed.",
                    agent.name
                ));
                Ok(RoundOutcome {
                    messages: vec![notice],
                    next_agent: Some(manager.clone()),
                    ..RoundOutcome::default()
                })
            }
        }
    }
}

#[async_trait::async_trait]
impl RoutingStrategy for ManagerStrategy {
    fn name(&self) -> &'static str {
        "manager_directed"
    }

    fn validate(&self, config: &OrchestrationConfig) -> Result<()> {
        config.require_single_manager().map(|_| ())
    }

    async fn execute_round(&self, state: &OrchestrationState) -> Result<RoundOutcome> {
        let manager = state.config.require_single_manager()?;
        match &state.current_agent {
            Some(agent) if !agent.is_manager() => {
                self.specialist_round(state, agent, manager).await
            }
            _ => self.manager_round(state, manager).await,
        }
    }
}
