//! Headless page model.

/// Element arena, listeners and dispatch.
pub mod document;
/// SVG/XML serialization of subtrees.
pub mod svg;
/// Deferred document mutations.
pub mod task;
