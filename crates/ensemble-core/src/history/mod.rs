//! Bounded conversation history summaries
//!
//! Routing and manager prompts must not grow with the conversation. This
//! module provides two pure views over the history: one-line annotations for
//! routing prompts, and a truncated working-memory window for manager turns.

mod summarizer;

pub use summarizer::{
    annotate, manager_window, window, DEFAULT_ANNOTATION_ENTRIES, DEFAULT_KEEP_RECENT,
    DEFAULT_OLDER_BUDGET, DEFAULT_RECENT_BUDGET,
};
