//! Restore reconciliation
//!
//! This module contains the business logic behind the Restore controller:
//! - Reference resolution (Restore → Backup → BackupConfig → Jenkins)
//! - Locating the live Jenkins pod
//! - Building the copy plan from the backup options
//! - Running the plan inside the pod

pub mod locator;
pub mod plan;
pub mod restore;
pub mod sequencer;

use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::error::{Error, Result};

/// Cancellation and deadline state threaded through one reconcile
#[derive(Clone, Debug, Default)]
pub struct ReconcileScope {
    cancel: CancellationToken,
    exec_timeout: Option<Duration>,
}

impl ReconcileScope {
    pub fn new(cancel: CancellationToken, exec_timeout: Option<Duration>) -> Self {
        Self {
            cancel,
            exec_timeout,
        }
    }

    /// Fail with [`Error::Cancelled`] once the scope has been cancelled
    pub fn ensure_active(&self) -> Result<()> {
        if self.cancel.is_cancelled() {
            return Err(Error::Cancelled);
        }
        Ok(())
    }

    pub fn cancel_token(&self) -> &CancellationToken {
        &self.cancel
    }

    /// Deadline applied to each remote command
    pub fn exec_timeout(&self) -> Option<Duration> {
        self.exec_timeout
    }
}
