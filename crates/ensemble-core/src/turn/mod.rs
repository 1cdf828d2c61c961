//! Single agent turn execution
//!
//! # Module Structure
//! - `directives`: the structured decision object an agent turn may carry
//! - `executor`: one reasoning step against the LLM layer

mod directives;
mod executor;

pub use directives::AgentDirectives;
pub use executor::{TurnExecutor, TurnOutcome};
