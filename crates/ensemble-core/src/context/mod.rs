//! Context set storage and merge/edit rules
//!
//! # Module Structure
//! - `store`: visibility filtering over a team's context sets
//! - `merge`: the per-round delta the controller commits

mod merge;
mod store;


pub use merge::{apply_delta, ContextDelta, ContextEdit};
pub use store::{find_set, visible_for};
