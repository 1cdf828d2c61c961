//! Agent turn execution
//!
//! One reasoning step for one agent: assemble the visible context and the
//! provided history slice, call out to the LLM layer, and wrap the reply as
//! a conversation message plus any parsed directives.

use std::sync::Arc;

use ensemble_llm::{AgentInvocation, ContextSet, LlmClient, Message};
use tracing::debug;

use super::directives::AgentDirectives;
use crate::context::visible_for;
use crate::error::{Error, Result};
use crate::orchestrator::AgentDescriptor;

/// Result of one executed turn
#[derive(Debug, Clone)]
pub struct TurnOutcome {
    /// The agent's message, ready to append to the conversation
    pub message: Message,
    /// Parsed structured directives, when present and well formed
    pub directives: Option<AgentDirectives>,
}

/// Executes single agent turns against the LLM layer
pub struct TurnExecutor {
    client: Arc<dyn LlmClient>,
}

impl TurnExecutor {
    /// Create a new executor over an LLM client
    #[must_use]
    pub fn new(client: Arc<dyn LlmClient>) -> Self {
        Self { client }
    }

    /// Execute one turn for the given agent
    ///
    /// The history slice is chosen by the caller: strategies hand managers a
    /// summarized window and specialist agents nothing at all.
    pub async fn execute(
        &self,
        agent: &AgentDescriptor,
        objectives: &str,
        message: &str,
        history: &[Message],
        context: &[ContextSet],
    ) -> Result<TurnOutcome> {
        let visible = visible_for(context, &agent.name);
        debug!(
            agent = %agent.name,
            visible_sets = visible.len(),
            history_len = history.len(),
            "Executing agent turn"
        );

        let invocation = AgentInvocation {
            agent_name: agent.name.clone(),
            system_prompt: agent.system_prompt(objectives),
            params: agent.params.clone(),
            message: message.to_string(),
            history: history.to_vec(),
            context: visible,
        };

        let reply = self
            .client
            .invoke_agent(invocation)
            .await
            .map_err(|e| Error::Turn {
                agent: agent.name.clone(),
                message: e.to_string(),
            })?;

        let directives = reply.directives.as_ref().and_then(AgentDirectives::from_value);
        let mut turn_message = Message::from_agent(&agent.name, reply.text);
        if let Some(raw) = reply.directives {
            turn_message = turn_message.with_directives(raw);
        }

        Ok(TurnOutcome {
            message: turn_message,
            directives,
        })
    }
}
