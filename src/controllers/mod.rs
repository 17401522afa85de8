//! Kubernetes controllers for the Jenkins restore CRDs
//!
//! The controller watches Restore objects and hands each change to the
//! restore reconciler.

mod restore_controller;

pub use restore_controller::run as run_restore_controller;

use std::future::Future;

use kube::Client;
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::adapters::{KubeExecClient, KubeResolver};
use crate::config::RestoreSettings;
use crate::metrics;

/// Shared context for all controllers
pub struct Context {
    /// Object lookups
    pub resolver: KubeResolver,
    /// Command execution in Jenkins pods
    pub executor: KubeExecClient,
    /// Restore settings
    pub settings: RestoreSettings,
    /// Cancelled when the operator shuts down
    pub shutdown: CancellationToken,
}

impl Context {
    /// Create a new context
    pub fn new(client: Client, settings: RestoreSettings, shutdown: CancellationToken) -> Self {
        Self {
            resolver: KubeResolver::new(client.clone()),
            executor: KubeExecClient::new(client, settings.container.clone()),
            settings,
            shutdown,
        }
    }
}

/// Wait for `signal`, then mark the operator unhealthy and cancel `shutdown`
///
/// Runs beside the controller, so reconciles still in flight observe the
/// cancellation while the controller drains.
pub async fn cancel_on_signal<F>(signal: F, shutdown: CancellationToken)
where
    F: Future<Output = ()>,
{
    signal.await;
    info!("Shutdown requested, cancelling in-flight restores");
    metrics::mark_unhealthy();
    shutdown.cancel();
}
