//! Visibility filtering over a team's context sets

use ensemble_llm::ContextSet;

/// Context sets the named agent may see
///
/// Disabled sets and sets hiding the agent are withheld; order is preserved.
#[must_use]
pub fn visible_for(sets: &[ContextSet], agent_name: &str) -> Vec<ContextSet> {
    sets.iter()
        .filter(|s| s.is_visible_to(agent_name))
        .cloned()
        .collect()
}

/// Find a set by its current name
#[must_use]
pub fn find_set<'a>(sets: &'a [ContextSet], set_name: &str) -> Option<&'a ContextSet> {
    sets.iter().find(|s| s.set_name == set_name)
}
