//! Orchestration controller
//!
//! Owns the run loop: one strategy round at a time, commit the returned
//! delta, apply control signals at the round boundary, enforce the round
//! cap, and produce the final result. A failed round is captured into the
//! result rather than propagated.

use std::sync::Arc;

use dashmap::DashMap;
use ensemble_llm::{LlmClient, Message};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::config::OrchestrationConfig;
use super::signals::RunSignals;
use super::state::{OrchestrationState, RunStatus};
use super::types::OrchestrationFinalResult;
use crate::context::apply_delta;
use crate::event_bus::{EventBus, RunEvent};
use crate::strategy::{
    DirectStrategy, LlmRoutedStrategy, ManagerStrategy, RoundOutcome, RoutingStrategy,
};
use crate::turn::TurnExecutor;

/// Error string reported when the round cap ends a run
pub const ROUND_LIMIT_MESSAGE: &str = "Maximum round limit reached";

/// Which routing strategy drives a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyKind {
    /// Single fixed agent, no routing decision
    Direct,
    /// Auxiliary routing model picks the next recipient
    LlmRouted,
    /// The manager agent's own output is the routing decision
    ManagerDirected,
}

/// Drives orchestration runs and owns the active-run registry
#[derive(Clone)]
pub struct Controller {
    client: Arc<dyn LlmClient>,
    event_bus: Option<Arc<EventBus>>,
    pub(super) active_runs: Arc<DashMap<Uuid, RunSignals>>,
}

impl Controller {
    /// Create a controller over an LLM client
    #[must_use]
    pub fn new(client: Arc<dyn LlmClient>) -> Self {
        Self {
            client,
            event_bus: None,
            active_runs: Arc::new(DashMap::new()),
        }
    }

    /// Attach an event bus for real-time run events
    #[must_use]
    pub fn with_event_bus(mut self, bus: Arc<EventBus>) -> Self {
        self.event_bus = Some(bus);
        self
    }

    /// Number of runs currently registered
    #[must_use]
    pub fn active_run_count(&self) -> usize {
        self.active_runs.len()
    }

    /// Cancel a registered run by id
    ///
    /// Returns whether a run with that id was found.
    pub fn cancel_run(&self, run_id: Uuid) -> bool {
        if let Some(entry) = self.active_runs.get(&run_id) {
            entry.request_cancel();
            info!(run_id = %run_id, "Run cancellation requested");
            true
        } else {
            false
        }
    }

    fn emit(&self, event: RunEvent) {
        if let Some(bus) = &self.event_bus {
            bus.publish(event);
        }
    }

    fn build_strategy(&self, kind: StrategyKind) -> Box<dyn RoutingStrategy> {
        let executor = Arc::new(TurnExecutor::new(Arc::clone(&self.client)));
        match kind {
            StrategyKind::Direct => Box::new(DirectStrategy::new(executor)),
            StrategyKind::LlmRouted => {
                Box::new(LlmRoutedStrategy::new(executor, Arc::clone(&self.client)))
            }
            StrategyKind::ManagerDirected => Box::new(ManagerStrategy::new(executor)),
        }
    }

    /// Run one orchestration to its final result, in place
    ///
    /// Prefer [`Controller::spawn_run`] from UI and session layers; this
    /// form is the loop itself and what tests drive directly.
    pub async fn run(
        &self,
        kind: StrategyKind,
        config: OrchestrationConfig,
        initial_history: Vec<Message>,
        signals: &RunSignals,
    ) -> OrchestrationFinalResult {
        let run_id = Uuid::new_v4();
        self.run_inner(run_id, kind, config, initial_history, signals)
            .await
    }

    pub(super) async fn run_inner(
        &self,
        run_id: Uuid,
        kind: StrategyKind,
        config: OrchestrationConfig,
        initial_history: Vec<Message>,
        signals: &RunSignals,
    ) -> OrchestrationFinalResult {
        let strategy = self.build_strategy(kind);
        let mut state = OrchestrationState::new(config, initial_history);
        let mut watch = signals.watch();

        info!(
            run_id = %run_id,
            team = %state.config.team_name,
            strategy = strategy.name(),
            max_rounds = state.config.max_rounds,
            "Starting run"
        );
        self.emit(RunEvent::RunStarted {
            run_id,
            team_name: state.config.team_name.clone(),
        });

        // configuration errors surface before any agent is invoked
        if let Err(e) = strategy.validate(&state.config) {
            warn!(run_id = %run_id, error = %e, "Configuration rejected");
            state.status = RunStatus::Error;
            state.error = Some(e.to_string());
            return self.finalize(run_id, state);
        }

        state.status = RunStatus::Running;

        loop {
            // round cap: a graceful stop, not a failure
            if state.current_round >= state.config.max_rounds {
                info!(run_id = %run_id, rounds = state.current_round, "Round limit reached");
                state.status = RunStatus::Completed;
                state.error = Some(ROUND_LIMIT_MESSAGE.to_string());
                break;
            }

            if watch.flags().cancel_requested {
                info!(run_id = %run_id, round = state.current_round, "Run cancelled");
                state.status = RunStatus::Cancelled;
                break;
            }

            if watch.flags().pause_requested {
                state.status = RunStatus::Paused;
                info!(run_id = %run_id, round = state.current_round, "Run paused");
                self.emit(RunEvent::RunPaused { run_id });

                let cancelled = watch.wait_while_paused().await;
                if cancelled || watch.flags().cancel_requested {
                    info!(run_id = %run_id, "Run cancelled while paused");
                    state.status = RunStatus::Cancelled;
                    break;
                }
                state.status = RunStatus::Running;
                info!(run_id = %run_id, "Run resumed");
                self.emit(RunEvent::RunResumed { run_id });
            }

            self.emit(RunEvent::RoundStarted {
                run_id,
                round: state.current_round,
            });
            debug!(run_id = %run_id, round = state.current_round, "Executing round");

            match strategy.execute_round(&state).await {
                Ok(outcome) => {
                    let workflow_complete = outcome.workflow_complete;
                    let redirect_to_user = outcome.redirect_to_user;
                    self.commit(run_id, &mut state, outcome);

                    if workflow_complete {
                        state.status = RunStatus::Completed;
                        break;
                    }
                    if redirect_to_user {
                        // suspend point; a new run seeded with this history resumes
                        state.status = RunStatus::AwaitingUser;
                        break;
                    }
                    state.current_round += 1;
                }
                Err(e) => {
                    warn!(
                        run_id = %run_id,
                        round = state.current_round,
                        error = %e,
                        "Round failed"
                    );
                    state.status = RunStatus::Error;
                    state.error = Some(e.to_string());
                    break;
                }
            }
        }

        if !state.status.is_terminal() {
            // the loop exited without an explicit terminal status
            state.status = RunStatus::Stopped;
        }

        self.finalize(run_id, state)
    }

    /// Commit a round delta into the state
    fn commit(&self, run_id: Uuid, state: &mut OrchestrationState, outcome: RoundOutcome) {
        if let Some(content) = outcome.amend_last {
            if let Some(last) = state.conversation_history.last_mut() {
                last.content = content;
            }
        }
        for message in &outcome.messages {
            if let Some(agent) = &message.agent_name {
                self.emit(RunEvent::TurnCompleted {
                    run_id,
                    round: state.current_round,
                    agent_name: agent.clone(),
                });
            }
        }
        state.conversation_history.extend(outcome.messages);
        apply_delta(&mut state.context_sets, outcome.context);
        if outcome.next_agent.is_some() {
            state.current_agent = outcome.next_agent;
        }
    }

    fn finalize(&self, run_id: Uuid, state: OrchestrationState) -> OrchestrationFinalResult {
        match state.status {
            RunStatus::Completed => self.emit(RunEvent::RunCompleted {
                run_id,
                total_rounds: state.current_round,
            }),
            RunStatus::Cancelled => self.emit(RunEvent::RunCancelled { run_id }),
            RunStatus::AwaitingUser => self.emit(RunEvent::AwaitingUser { run_id }),
            RunStatus::Error => self.emit(RunEvent::RunFailed {
                run_id,
                error: state.error.clone().unwrap_or_default(),
            }),
            _ => {}
        }

        info!(
            run_id = %run_id,
            status = state.status.as_str(),
            rounds = state.current_round,
            "Run finished"
        );

        OrchestrationFinalResult {
            status: state.status,
            final_conversation_history: state.conversation_history,
            final_context_sets: state.context_sets,
            error: state.error,
            total_rounds: state.current_round,
        }
    }
}
