//! Viewport geometry and the scroll observer.

pub mod geometry;
pub mod observer;
