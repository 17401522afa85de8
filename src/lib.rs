//! Jenkins Restore Operator
//!
//! This operator applies previously taken Jenkins backups to a running
//! Jenkins master. A `Restore` names a `Backup`; the operator follows the
//! chain Backup → BackupConfig → Jenkins to the live pod and copies the
//! selected parts of the backup into JENKINS_HOME.

pub mod adapters;
pub mod config;
pub mod controllers;
pub mod crd;
pub mod error;
pub mod metrics;
pub mod reconcilers;

pub use error::{Error, Result};
