//! Fallback text parsing for routing decisions
//!
//! When a manager reply carries no structured directives, the text itself is
//! scanned: an `@AgentName` mention routes to that agent, a
//! `Message to user:` line redirects to the user, and a completion phrase
//! finishes the workflow. No signal means the manager keeps the floor.

use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

use crate::orchestrator::{AgentDescriptor, OrchestrationConfig};
use crate::turn::AgentDirectives;

/// Pre-compiled regex for @mention parsing (e.g., "@Analyst dig into Q3")
static MENTION_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"@(\w+)").expect("mention regex is valid"));

/// Line prefix that redirects the conversation to the user
const MESSAGE_TO_USER_PREFIX: &str = "Message to user:";

/// Phrases that signal workflow completion in free text
const COMPLETION_PHRASES: &[&str] = &[
    "workflow complete",
    "workflow is complete",
    "all tasks are complete",
];

/// Extract the first roster `@mention` and the text following it
///
/// Returns the canonical roster descriptor and the remainder with the
/// mention stripped. Mentions of names not on the roster are ignored.
#[must_use]
pub fn extract_mention<'a>(
    text: &str,
    config: &'a OrchestrationConfig,
) -> Option<(&'a AgentDescriptor, String)> {
    for caps in MENTION_REGEX.captures_iter(text) {
        let name = &caps[1];
        if let Some(agent) = config.find_agent(name) {
            let whole = caps.get(0).expect("capture group 0 always present");
            let rest = text[whole.end()..].trim().to_string();
            debug!(agent = %agent.name, "Mention detected");
            return Some((agent, rest));
        }
    }
    None
}

/// Parse a manager reply's text into directives (the fallback path)
#[must_use]
pub fn parse_manager_text(text: &str, config: &OrchestrationConfig) -> AgentDirectives {
    let mut directives = AgentDirectives::default();

    if let Some((agent, rest)) = extract_mention(text, config) {
        directives.next_agent_name = Some(agent.name.clone());
        directives.message_for_next_agent = Some(rest);
        return directives;
    }

    for line in text.lines() {
        if let Some(rest) = line.trim_start().strip_prefix(MESSAGE_TO_USER_PREFIX) {
            directives.redirect_to_user = true;
            directives.message_for_next_agent = Some(rest.trim().to_string());
            return directives;
        }
    }

    let lower = text.to_lowercase();
    if COMPLETION_PHRASES.iter().any(|p| lower.contains(p)) {
        directives.workflow_complete = true;
    }

    directives
}
