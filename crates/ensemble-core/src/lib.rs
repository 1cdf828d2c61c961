//! Ensemble Core - Multi-Agent Orchestration Engine
//!
//! This crate provides the decision loop for multi-agent team runs,
//! including:
//! - Orchestrator: the round loop, run state machine, and control signals
//! - Strategy: interchangeable routing strategies (direct, LLM-routed,
//!   manager-directed)
//! - Turn: single agent turn execution against the LLM layer
//! - History: bounded conversation summaries for routing and manager prompts
//! - Context: context sets with per-agent visibility and merge/edit rules
//! - Event bus: real-time run lifecycle events for UI and session layers

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod context;
pub mod error;
pub mod event_bus;
pub mod history;
pub mod orchestrator;
pub mod strategy;
pub mod turn;

pub use context::{apply_delta, visible_for, ContextDelta, ContextEdit};
pub use error::{Error, Result};
pub use event_bus::{EventBus, RunEvent};
pub use orchestrator::{
    record_key, AgentDescriptor, AgentKind, Controller, OrchestrationConfig,
    OrchestrationFinalResult, OrchestrationState, RunHandle, RunSignals, RunStatus, SignalFlags,
    StrategyKind, ROUND_LIMIT_MESSAGE,
};
pub use strategy::{
    DirectStrategy, LlmRoutedStrategy, ManagerStrategy, MessageSource, RoundOutcome, RoutingResult,
    RoutingStrategy,
};
pub use turn::{AgentDirectives, TurnExecutor, TurnOutcome};
