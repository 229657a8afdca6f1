//! Visualization controllers.
//!
//! [`contract::VizController`] is the lifecycle every chart family implements; the families are
//! built on [`chart::ChartController`], which owns the shared mount/queue/teardown logic.

pub mod chart;
pub mod community;
pub mod contract;
pub mod data;
pub mod emitter;
pub mod emotion;
pub mod ingredients;
pub mod planets;
pub mod ranking;
pub mod registry;
pub mod schedule;
pub mod stopwatch;
