//! Run lifecycle event bus
//!
//! # Module Structure
//! - `bus`: broadcast channel wrapper
//! - `types`: the `RunEvent` enum

mod bus;
mod types;


pub use bus::{EventBus, DEFAULT_EVENT_CAPACITY};
pub use types::RunEvent;
