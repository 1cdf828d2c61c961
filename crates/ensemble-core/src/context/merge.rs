//! Context delta application
//!
//! A round produces a `ContextDelta`; the controller commits it after the
//! round's messages are appended. Mutations from round N become visible to
//! agents at round N+1, never within round N itself.

use ensemble_llm::ContextSet;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::{debug, warn};

/// Edit to an existing context set, keyed by its current name
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContextEdit {
    /// Name of the set being edited
    pub original_set_name: String,
    /// New name, when renaming
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub set_name: Option<String>,
    /// Replacement text
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    /// Replacement visibility mask
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hidden_from_agents: Option<HashSet<String>>,
}

/// Context changes produced by one round
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContextDelta {
    /// Full snapshot; takes precedence over the incremental fields
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub replace_all: Option<Vec<ContextSet>>,
    /// Brand-new sets to append
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub added: Vec<ContextSet>,
    /// Edits applied by original name
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub edits: Vec<ContextEdit>,
}

impl ContextDelta {
    /// Whether this delta changes anything
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.replace_all.is_none() && self.added.is_empty() && self.edits.is_empty()
    }

    /// Merge another delta into this one (the other's snapshot wins)
    pub fn merge(&mut self, other: ContextDelta) {
        if other.replace_all.is_some() {
            self.replace_all = other.replace_all;
        }
        self.added.extend(other.added);
        self.edits.extend(other.edits);
    }
}

/// Apply a round's context delta in place
///
/// A full snapshot replaces the collection wholesale. Otherwise brand-new
/// sets are appended and edits are applied by `original_set_name`; an edit
/// naming a missing set is logged and skipped, never an error.
pub fn apply_delta(sets: &mut Vec<ContextSet>, delta: ContextDelta) {
    if let Some(snapshot) = delta.replace_all {
        debug!(sets = snapshot.len(), "Replacing context sets with snapshot");
        *sets = snapshot;
        return;
    }

    for added in delta.added {
        if sets.iter().any(|s| s.set_name == added.set_name) {
            warn!(set_name = %added.set_name, "Context set already exists, skipping append");
            continue;
        }
        debug!(set_name = %added.set_name, "Adding context set");
        sets.push(added);
    }

    for edit in delta.edits {
        match sets
            .iter_mut()
            .find(|s| s.set_name == edit.original_set_name)
        {
            Some(set) => {
                if let Some(name) = edit.set_name {
                    set.set_name = name;
                }
                if let Some(text) = edit.text {
                    set.text = text;
                }
                if let Some(hidden) = edit.hidden_from_agents {
                    set.hidden_from_agents = hidden;
                }
            }
            None => {
                warn!(
                    set_name = %edit.original_set_name,
                    "Context edit targets an unknown set, skipping"
                );
            }
        }
    }
}
