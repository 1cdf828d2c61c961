//! LLM-routed strategy
//!
//! Each round an auxiliary routing call inspects the latest message and
//! picks the next recipient. The routing model advises; a fixed set of
//! deterministic rules has the final say:
//! - a user message always goes to the manager, never back to the user
//! - an explicit roster `@mention` short-circuits the routing call
//! - an unknown agent name falls back to the manager instead of failing
//! - `workflow_complete` is honored only when the decision asserts it
//! - an information request synthesizes a form context set and suspends
//!   the run; synthesis failure degrades to a manager notice

use std::sync::Arc;

use ensemble_llm::{ContextSet, LlmClient, Message, RoutingRequest};
use tracing::{debug, info, warn};

use super::parsing::extract_mention;
use super::routing::{classify_source, MessageSource, RoutingResult};
use super::{RoundOutcome, RoutingStrategy};
use crate::context::{visible_for, ContextDelta};
use crate::error::Result;
use crate::history;
use crate::orchestrator::{AgentDescriptor, OrchestrationConfig, OrchestrationState};
use crate::turn::TurnExecutor;

/// Name prefix for synthesized information-request form sets
const FORM_SET_PREFIX: &str = "info-request";

/// Note appended to a manager message converted into an information request
const FORM_ATTACHED_NOTE: &str = "[An input form has been attached for the requested information.]";

/// Routes each round through an auxiliary routing model
pub struct LlmRoutedStrategy {
    executor: Arc<TurnExecutor>,
    client: Arc<dyn LlmClient>,
}

impl LlmRoutedStrategy {
    /// Create the strategy
    #[must_use]
    pub fn new(executor: Arc<TurnExecutor>, client: Arc<dyn LlmClient>) -> Self {
        Self { executor, client }
    }

    /// Produce the routing decision for the latest message
    ///
    /// User messages and explicit roster mentions are decided without
    /// calling the model.
    async fn decide(
        &self,
        state: &OrchestrationState,
        latest: &Message,
        source: MessageSource,
        manager: &AgentDescriptor,
    ) -> Result<RoutingResult> {
        if source == MessageSource::User {
            return Ok(RoutingResult {
                next_agent_name: Some(manager.name.clone()),
                reason_for_decision: "user messages always route to the manager".to_string(),
                ..RoutingResult::default()
            });
        }

        if let Some((agent, rest)) = extract_mention(&latest.content, &state.config) {
            return Ok(RoutingResult {
                next_agent_name: Some(agent.name.clone()),
                rewritten_message: Some(rest),
                reason_for_decision: "explicit mention".to_string(),
                ..RoutingResult::default()
            });
        }

        let request = RoutingRequest {
            latest_message: latest.content.clone(),
            message_source: source.as_str().to_string(),
            history_digest: history::annotate(
                &state.conversation_history,
                history::DEFAULT_ANNOTATION_ENTRIES,
            ),
            roster: state.config.agents.iter().map(|a| a.name.clone()).collect(),
            context: visible_for(&state.context_sets, &manager.name),
        };

        let value = self.client.invoke_routing(request).await?;
        Ok(RoutingResult::from_value(value))
    }

    /// Attach a synthesized form as a context set and suspend the run
    ///
    /// On synthesis failure the decision is rewritten to send an explanatory
    /// notice to the manager instead; the round still makes progress.
    async fn handle_info_request(
        &self,
        state: &OrchestrationState,
        latest: &Message,
        manager: &AgentDescriptor,
        decision: &mut RoutingResult,
        context: &mut ContextDelta,
    ) -> Option<RoundOutcome> {
        match self.client.synthesize_form(&latest.content).await {
            Ok(form) => {
                let set_name = format!("{FORM_SET_PREFIX}-round-{}", state.current_round);
                context.added.push(ContextSet::new(set_name, form.to_string()));
                info!("Information request form synthesized, suspending for user input");
                Some(RoundOutcome {
                    amend_last: Some(format!("{}\n\n{FORM_ATTACHED_NOTE}", latest.content)),
                    context: std::mem::take(context),
                    next_agent: Some(manager.clone()),
                    redirect_to_user: true,
                    ..RoundOutcome::default()
                })
            }
            Err(e) => {
                warn!(error = %e, "Form synthesis failed, returning to the manager");
                decision.redirect_to_user = false;
                decision.next_agent_name = Some(manager.name.clone());
                decision.rewritten_message = Some(format!(
                    "The information request could not be turned into a form ({e}). \
                     Rephrase the request or continue without it."
                ));
                None
            }
        }
    }
}

#[async_trait::async_trait]
impl RoutingStrategy for LlmRoutedStrategy {
    fn name(&self) -> &'static str {
        "llm_routed"
    }

    fn validate(&self, config: &OrchestrationConfig) -> Result<()> {
        config.require_single_manager().map(|_| ())
    }

    async fn execute_round(&self, state: &OrchestrationState) -> Result<RoundOutcome> {
        let config = &state.config;
        let manager = config.require_single_manager()?;
        let latest = match state.last_message() {
            Some(m) => m.clone(),
            None => Message::user(&config.initial_message),
        };
        let source = classify_source(&latest, config);
        debug!(source = source.as_str(), "Classified latest message");

        let mut decision = self.decide(state, &latest, source, manager).await?;

        // deterministic override: user input never bounces back to the user
        if source == MessageSource::User {
            decision.redirect_to_user = false;
            decision.info_request = false;
            decision.next_agent_name = Some(manager.name.clone());
        }

        // the context delta is built before any terminal return so a
        // completing decision still commits its replacement sets
        let mut context = ContextDelta::default();
        if decision.context_request {
            if let Some(new_context) = decision.new_context.take() {
                context.replace_all = Some(new_context);
            }
        }

        if decision.workflow_complete {
            info!(reason = %decision.reason_for_decision, "Routing decision: workflow complete");
            return Ok(RoundOutcome {
                context,
                workflow_complete: true,
                ..RoundOutcome::default()
            });
        }

        if decision.info_request {
            if let Some(outcome) = self
                .handle_info_request(state, &latest, manager, &mut decision, &mut context)
                .await
            {
                return Ok(outcome);
            }
        }

        if decision.redirect_to_user {
            info!(reason = %decision.reason_for_decision, "Routing decision: redirect to user");
            return Ok(RoundOutcome {
                context,
                next_agent: Some(manager.clone()),
                redirect_to_user: true,
                ..RoundOutcome::default()
            });
        }

        // resolve the next actor; unknown names fall back to the manager
        let next = match decision
            .next_agent_name
            .as_deref()
            .and_then(|n| config.find_agent(n))
        {
            Some(agent) => agent,
            None => {
                if let Some(name) = decision.next_agent_name.as_deref() {
                    warn!(agent = %name, "Routing named an unknown agent, falling back to manager");
                }
                manager
            }
        };

        let routed_message = decision
            .rewritten_message
            .clone()
            .unwrap_or_else(|| latest.content.clone());
        let window = if next.is_manager() {
            history::manager_window(&state.conversation_history)
        } else {
            Vec::new()
        };
        info!(agent = %next.name, source = source.as_str(), "Routing turn");

        let turn = self
            .executor
            .execute(
                next,
                &config.objectives,
                &routed_message,
                &window,
                &state.context_sets,
            )
            .await?;

        if let Some(directives) = &turn.directives {
            context.merge(directives.context_delta());
        }

        Ok(RoundOutcome {
            messages: vec![turn.message],
            context,
            next_agent: Some(next.clone()),
            ..RoundOutcome::default()
        })
    }
}
