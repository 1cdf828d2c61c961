//! Spawned runs and their handles
//!
//! `spawn_run` moves the round loop onto a tokio task and returns a handle
//! carrying the per-run signals and the eventual final result. The run is
//! registered in the controller's active-run registry until it finishes so
//! cancel-by-id works across concurrent runs.

use ensemble_llm::Message;
use tokio::task::JoinHandle;
use tracing::debug;
use uuid::Uuid;

use super::controller::{Controller, StrategyKind};
use super::config::OrchestrationConfig;
use super::signals::RunSignals;
use super::types::OrchestrationFinalResult;
use crate::error::{Error, Result};

/// Handle to a spawned run
pub struct RunHandle {
    run_id: Uuid,
    signals: RunSignals,
    task: JoinHandle<OrchestrationFinalResult>,
}

impl RunHandle {
    /// Run identifier
    #[must_use]
    pub fn run_id(&self) -> Uuid {
        self.run_id
    }

    /// Request a cooperative pause at the next round boundary
    pub fn request_pause(&self) {
        self.signals.request_pause();
    }

    /// Request cancellation; an in-flight LLM call may complete first
    pub fn request_cancel(&self) {
        self.signals.request_cancel();
    }

    /// Release a paused run
    pub fn signal_continue(&self) {
        self.signals.signal_continue();
    }

    /// Await the final result
    pub async fn final_result(self) -> Result<OrchestrationFinalResult> {
        self.task
            .await
            .map_err(|e| Error::Internal(format!("run task failed: {e}")))
    }
}

impl Controller {
    /// Spawn a run as a tokio task and return its handle
    #[must_use]
    pub fn spawn_run(
        &self,
        kind: StrategyKind,
        config: OrchestrationConfig,
        initial_history: Vec<Message>,
    ) -> RunHandle {
        let run_id = Uuid::new_v4();
        let signals = RunSignals::new();
        self.active_runs.insert(run_id, signals.clone());

        let controller = self.clone();
        let run_signals = signals.clone();
        let task = tokio::spawn(async move {
            let result = controller
                .run_inner(run_id, kind, config, initial_history, &run_signals)
                .await;
            controller.active_runs.remove(&run_id);
            debug!(run_id = %run_id, "Run deregistered");
            result
        });

        RunHandle {
            run_id,
            signals,
            task,
        }
    }
}
