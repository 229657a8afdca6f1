//! Scene state: lookup tables, the single-writer scene store, the orchestrator state machine and
//! the illustration mounter that follows it.

pub mod illustration;
pub mod orchestrator;
pub mod registry;
pub mod store;
