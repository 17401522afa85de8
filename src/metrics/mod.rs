//! Prometheus metrics for the Jenkins Restore Operator
//!
//! This module exposes metrics for monitoring operator health and performance.

mod prometheus;

pub use self::prometheus::*;
