//! Orchestration controller and run state machine
//!
//! # Module Structure
//!
//! - `config`: per-run configuration and the agent roster
//! - `state`: the run state machine and mutable run record
//! - `signals`: per-run pause/cancel/continue control signals
//! - `controller`: the round loop
//! - `handle`: spawned runs and their handles
//! - `types`: the final result contract

mod config;
mod controller;
mod handle;
mod signals;
mod state;
mod types;


pub use config::{AgentDescriptor, AgentKind, OrchestrationConfig};
pub use controller::{Controller, StrategyKind, ROUND_LIMIT_MESSAGE};
pub use handle::RunHandle;
pub use signals::{RunSignals, SignalFlags};
pub use state::{OrchestrationState, RunStatus};
pub use types::{record_key, OrchestrationFinalResult};
