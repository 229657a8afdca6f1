//! Offline rendering of scene illustrations.
//!
//! The page itself never rasterizes anything; this is the `tides illustrate` path and a way to
//! eyeball factory output.

pub mod raster;
