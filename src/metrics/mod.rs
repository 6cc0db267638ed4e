//! Metrics registry and Prometheus text exposition.
//!
//! This module owns the registry the NameNode collector is registered with

mod registry;

pub use registry::Metrics;
