//! The assembled page and its page-level reactions.

pub mod micro;
pub mod runtime;
pub mod trace;
