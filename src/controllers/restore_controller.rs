//! Restore controller
//!
//! Watches Restore resources and triggers reconciliation. kube-runtime runs at
//! most one reconcile per Restore at a time.

use std::sync::Arc;
use std::time::Duration;

use futures::StreamExt;
use kube::{
    api::ListParams,
    runtime::{
        controller::{Action, Controller},
        watcher::Config as WatcherConfig,
    },
    Api, Client, ResourceExt,
};
use tracing::{error, info, warn};

use crate::config::CopyFailurePolicy;
use crate::controllers::Context;
use crate::crd::Restore;
use crate::error::{Error, Result};
use crate::metrics;
use crate::reconcilers::restore::{self as restore_reconciler, RestoreOutcome};
use crate::reconcilers::ReconcileScope;

/// Run the Restore controller
pub async fn run(client: Client, context: Arc<Context>) {
    let api: Api<Restore> = Api::all(client.clone());

    // Verify CRD is installed
    if let Err(e) = api.list(&ListParams::default().limit(1)).await {
        error!("Restore CRD not installed: {}", e);
        return;
    }

    info!("Starting Restore controller");

    // Drains in-flight reconciles on SIGTERM; they are cancelled through
    // `Context::shutdown` by `cancel_on_signal`
    Controller::new(api, WatcherConfig::default())
        .shutdown_on_signal()
        .run(reconcile, error_policy, context)
        .for_each(|result| async move {
            match result {
                Ok((obj, _action)) => {
                    info!(
                        name = %obj.name,
                        namespace = obj.namespace.as_deref().unwrap_or("default"),
                        "Reconciled Restore"
                    );
                }
                Err(e) => {
                    error!(error = %e, "Reconciliation error");
                    metrics::RECONCILIATION_ERRORS.with_label_values(&["Restore"]).inc();
                }
            }
        })
        .await;
}

/// Main reconciliation function
async fn reconcile(obj: Arc<Restore>, ctx: Arc<Context>) -> Result<Action> {
    let _timer = metrics::RECONCILE_DURATION
        .with_label_values(&["Restore"])
        .start_timer();
    metrics::RECONCILIATIONS.with_label_values(&["Restore"]).inc();

    let name = obj.name_any();
    let namespace = obj.namespace().unwrap_or_else(|| "default".to_string());
    let scope = ReconcileScope::new(ctx.shutdown.child_token(), ctx.settings.exec_timeout);

    let outcome = restore_reconciler::reconcile(
        &namespace,
        &name,
        &ctx.resolver,
        &ctx.executor,
        &ctx.settings,
        &scope,
    )
    .await?;

    action_for(outcome, ctx.settings.copy_failure_policy)
}

/// Map a reconcile outcome to the controller action under `policy`
///
/// Restores are one-shot, so every handled outcome waits for the next change
/// to the object. A failed copy becomes an error only under
/// [`CopyFailurePolicy::Retry`].
pub fn action_for(outcome: RestoreOutcome, policy: CopyFailurePolicy) -> Result<Action> {
    match outcome {
        RestoreOutcome::Skipped(_) | RestoreOutcome::Restored { .. } => Ok(Action::await_change()),
        RestoreOutcome::CopyFailed {
            target,
            failed_index,
            error,
            ..
        } => match policy {
            CopyFailurePolicy::Ignore => {
                warn!(pod = %target, error = %error, "Copy failure ignored, restore will not be retried");
                Ok(Action::await_change())
            }
            CopyFailurePolicy::Retry => Err(Error::CopyFailed {
                index: failed_index,
                message: error,
            }),
        },
    }
}

/// Error policy for the controller
fn error_policy(obj: Arc<Restore>, error: &Error, _ctx: Arc<Context>) -> Action {
    let name = obj.name_any();
    error!(
        name = %name,
        error = %error,
        "Reconciliation failed, scheduling retry"
    );

    Action::requeue(requeue_after(error))
}

/// Backoff applied after a failed reconcile
pub fn requeue_after(error: &Error) -> Duration {
    match error {
        Error::Kube(_) | Error::Transport(_) | Error::Serialization(_) => Duration::from_secs(30),
        e if e.is_locator_error() => Duration::from_secs(60),
        Error::CopyFailed { .. } | Error::Exec(_) | Error::Timeout(_) => Duration::from_secs(120),
        Error::Config(_) => Duration::from_secs(300),
        _ => Duration::from_secs(30),
    }
}
