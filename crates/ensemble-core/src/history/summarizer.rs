//! History summarization
//!
//! Both operations here are pure functions of the history: calling them
//! twice on the same input yields the same output, and neither mutates its
//! input.

use ensemble_llm::Message;

/// Max entries rendered by [`annotate`]
pub const DEFAULT_ANNOTATION_ENTRIES: usize = 10;
/// Recent messages kept with the full budget by [`window`]
pub const DEFAULT_KEEP_RECENT: usize = 5;
/// Char budget for recent entries in [`window`]
pub const DEFAULT_RECENT_BUDGET: usize = 1500;
/// Char budget applied to older surviving entries in [`window`]
pub const DEFAULT_OLDER_BUDGET: usize = 200;

/// Max entries retained by the default manager window
const DEFAULT_WINDOW_ENTRIES: usize = 20;

/// Render the most recent messages as compact single-line annotations
///
/// Each line is `[author] first sentence`, oldest first, where the author is
/// the agent name or the role for user/system entries. Intended for routing
/// prompts.
#[must_use]
pub fn annotate(history: &[Message], max_entries: usize) -> String {
    let start = history.len().saturating_sub(max_entries);
    history[start..]
        .iter()
        .map(|m| {
            let author = m.agent_name.as_deref().unwrap_or_else(|| m.role.as_str());
            format!(
                "[{}] {}",
                author,
                first_sentence(&m.content, DEFAULT_OLDER_BUDGET)
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Bounded message window for a manager's working memory
///
/// Keeps at most `max_entries` most recent messages. The newest
/// `keep_recent` keep `recent_budget` chars; older survivors are truncated
/// in place to `older_budget` chars. Order and metadata are preserved.
#[must_use]
pub fn window(
    history: &[Message],
    max_entries: usize,
    keep_recent: usize,
    recent_budget: usize,
    older_budget: usize,
) -> Vec<Message> {
    let start = history.len().saturating_sub(max_entries);
    let slice = &history[start..];
    let recent_from = slice.len().saturating_sub(keep_recent);

    slice
        .iter()
        .enumerate()
        .map(|(i, m)| {
            let budget = if i >= recent_from {
                recent_budget
            } else {
                older_budget
            };
            let mut msg = m.clone();
            msg.content = truncate_chars(&m.content, budget);
            msg
        })
        .collect()
}

/// [`window`] with the default manager budgets
#[must_use]
pub fn manager_window(history: &[Message]) -> Vec<Message> {
    window(
        history,
        DEFAULT_WINDOW_ENTRIES,
        DEFAULT_KEEP_RECENT,
        DEFAULT_RECENT_BUDGET,
        DEFAULT_OLDER_BUDGET,
    )
}

fn first_sentence(text: &str, budget: usize) -> String {
    let trimmed = text.trim();
    // sentence terminators are single-byte, so byte slicing is safe here
    let end = trimmed
        .find(['.', '!', '?'])
        .map_or(trimmed.len(), |i| i + 1);
    truncate_chars(&trimmed[..end], budget)
}

fn truncate_chars(text: &str, budget: usize) -> String {
    if text.chars().count() <= budget {
        text.to_string()
    } else {
        let mut out: String = text.chars().take(budget).collect();
        out.push('…');
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ensemble_llm::Message;

    fn sample_history() -> Vec<Message> {
        vec![
            Message::user("Prepare the Q3 report. Include revenue."),
            Message::from_agent("Manager", "@Analyst pull the Q3 numbers"),
            Message::from_agent("Analyst", "Revenue is up 12%! Details follow."),
        ]
    }

    #[test]
    fn test_annotate_format() {
        let history = sample_history();
        let digest = annotate(&history, 10);
        let lines: Vec<&str> = digest.lines().collect();

        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], "[user] Prepare the Q3 report.");
        assert_eq!(lines[2], "[Analyst] Revenue is up 12%!");
    }

    #[test]
    fn test_annotate_respects_max_entries() {
        let history = sample_history();
        let digest = annotate(&history, 1);
        assert_eq!(digest.lines().count(), 1);
        assert!(digest.starts_with("[Analyst]"));
    }

    #[test]
    fn test_annotate_is_idempotent() {
        let history = sample_history();
        let first = annotate(&history, 10);
        let second = annotate(&history, 10);
        assert_eq!(first, second);
        // input untouched
        assert_eq!(history[0].content, "Prepare the Q3 report. Include revenue.");
    }

    #[test]
    fn test_annotate_empty_history() {
        assert_eq!(annotate(&[], 10), "");
    }

    #[test]
    fn test_window_truncates_older_entries() {
        let mut history = vec![Message::user("a".repeat(500))];
        for i in 0..5 {
            history.push(Message::from_agent("Agent", format!("turn {i}")));
        }

        let windowed = window(&history, 20, 5, 1500, 200);
        assert_eq!(windowed.len(), 6);
        // oldest entry truncated to the older budget plus the marker
        assert_eq!(windowed[0].content.chars().count(), 201);
        assert!(windowed[0].content.ends_with('…'));
        // recent entries untouched
        assert_eq!(windowed[5].content, "turn 4");
    }

    #[test]
    fn test_window_caps_entry_count() {
        let history: Vec<Message> = (0..30)
            .map(|i| Message::user(format!("message {i}")))
            .collect();

        let windowed = window(&history, 20, 5, 1500, 200);
        assert_eq!(windowed.len(), 20);
        assert_eq!(windowed[0].content, "message 10");
        assert_eq!(windowed[19].content, "message 29");
    }

    #[test]
    fn test_window_preserves_metadata() {
        let history = vec![Message::from_agent("Analyst", "short")];
        let windowed = manager_window(&history);
        assert_eq!(windowed[0].agent_name.as_deref(), Some("Analyst"));
    }

    #[test]
    fn test_window_is_idempotent_on_small_histories() {
        let history = sample_history();
        let once = manager_window(&history);
        let twice = manager_window(&once);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_truncation_is_char_boundary_safe() {
        let text = "héllo wörld".repeat(50);
        let out = truncate_chars(&text, 10);
        assert_eq!(out.chars().count(), 11);
    }
}
