//! Final result contract

use super::state::RunStatus;
use chrono::NaiveDate;
use ensemble_llm::{ContextSet, Message, MessageRole};
use serde::{Deserialize, Serialize};

/// Outcome of a finished or suspended run
///
/// Serializable so an external persistence layer can store it and reload the
/// history to seed a follow-up run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrchestrationFinalResult {
    /// Terminal status
    pub status: RunStatus,
    /// Full conversation history
    pub final_conversation_history: Vec<Message>,
    /// Context sets as of the last committed round
    pub final_context_sets: Vec<ContextSet>,
    /// Error string, set for `error` outcomes and the round-cap stop
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Rounds committed before the run ended
    pub total_rounds: usize,
}

impl OrchestrationFinalResult {
    /// The last agent message, surfaced to the user for `awaiting_user` and
    /// `error` outcomes
    #[must_use]
    pub fn last_assistant_message(&self) -> Option<&Message> {
        self.final_conversation_history
            .iter()
            .rev()
            .find(|m| m.role == MessageRole::Assistant)
    }
}

/// Storage key for a team's run records on a given day
#[must_use]
pub fn record_key(team_name: &str, day: NaiveDate) -> String {
    format!("{}:{}", team_name, day.format("%Y-%m-%d"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_key_format() {
        let day = NaiveDate::from_ymd_opt(2026, 3, 9).unwrap();
        assert_eq!(record_key("growth-team", day), "growth-team:2026-03-09");
    }

    #[test]
    fn test_last_assistant_message() {
        let result = OrchestrationFinalResult {
            status: RunStatus::AwaitingUser,
            final_conversation_history: vec![
                Message::user("hi"),
                Message::from_agent("Manager", "What city are you in?"),
                Message::system("notice"),
            ],
            final_context_sets: vec![],
            error: None,
            total_rounds: 1,
        };

        let last = result.last_assistant_message().unwrap();
        assert_eq!(last.agent_name.as_deref(), Some("Manager"));
    }
}
