//! Static page configuration.

pub mod manifest;
