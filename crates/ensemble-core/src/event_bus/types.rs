//! Run lifecycle events
//!
//! Events stay light: consumers fetch history and context through the final
//! result or their own store, keyed by `run_id`.

use serde::Serialize;
use uuid::Uuid;

/// Events emitted while a run progresses
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RunEvent {
    /// A run started executing
    RunStarted {
        /// Run identifier
        run_id: Uuid,
        /// Team the run belongs to
        team_name: String,
    },
    /// A round began
    RoundStarted {
        /// Run identifier
        run_id: Uuid,
        /// Zero-based round counter
        round: usize,
    },
    /// An agent finished its turn
    TurnCompleted {
        /// Run identifier
        run_id: Uuid,
        /// Round the turn belongs to
        round: usize,
        /// Agent that acted
        agent_name: String,
    },
    /// The run paused at a round boundary
    RunPaused {
        /// Run identifier
        run_id: Uuid,
    },
    /// The run resumed after a pause
    RunResumed {
        /// Run identifier
        run_id: Uuid,
    },
    /// The run suspended waiting for user input
    AwaitingUser {
        /// Run identifier
        run_id: Uuid,
    },
    /// The run completed
    RunCompleted {
        /// Run identifier
        run_id: Uuid,
        /// Rounds committed before completion
        total_rounds: usize,
    },
    /// The run was cancelled
    RunCancelled {
        /// Run identifier
        run_id: Uuid,
    },
    /// The run failed
    RunFailed {
        /// Run identifier
        run_id: Uuid,
        /// Failure description
        error: String,
    },
}

impl RunEvent {
    /// The run this event belongs to
    #[must_use]
    pub fn run_id(&self) -> Uuid {
        match self {
            RunEvent::RunStarted { run_id, .. }
            | RunEvent::RoundStarted { run_id, .. }
            | RunEvent::TurnCompleted { run_id, .. }
            | RunEvent::RunPaused { run_id }
            | RunEvent::RunResumed { run_id }
            | RunEvent::AwaitingUser { run_id }
            | RunEvent::RunCompleted { run_id, .. }
            | RunEvent::RunCancelled { run_id }
            | RunEvent::RunFailed { run_id, .. } => *run_id,
        }
    }
}
