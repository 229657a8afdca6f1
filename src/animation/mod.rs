//! Easing curves and transition timing.

pub mod ease;
pub mod timing;
