//! Ensemble LLM - invocation layer contract
//!
//! This crate defines the boundary between the orchestration engine and the
//! LLM invocation layer, including:
//! - Messages: conversation message types shared across the engine
//! - Context: named, team-scoped text blocks handed to agents
//! - Client: the `LlmClient` trait the engine calls out through
//! - Errors: the invocation failure taxonomy

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod client;
pub mod context;
pub mod error;
pub mod message;

pub use client::{AgentInvocation, AgentReply, LlmClient, ModelParams, RoutingRequest};
pub use context::ContextSet;
pub use error::{Error, Result};
pub use message::{Message, MessageRole};
