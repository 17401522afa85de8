//! Restore plan execution
//!
//! Runs copy operations one after the other inside the Jenkins pod. The first
//! failing operation stops the sequence; later operations are never issued.

use k8s_openapi::api::core::v1::Pod;
use kube::ResourceExt;
use tracing::{error, info, warn};

use crate::adapters::RemoteExecutor;
use crate::error::{Error, Result};
use crate::metrics;

use super::plan::CopyOperation;
use super::ReconcileScope;

/// Result of running a restore plan
#[derive(Debug)]
pub enum SequenceOutcome {
    /// Every operation completed
    FullSuccess { applied: usize },
    /// Operation `failed_index` failed; `applied` operations before it completed
    PartialFailure {
        failed_index: usize,
        applied: usize,
        error: String,
    },
}

/// Run `plan` against `target` through `executor`
///
/// Cancellation of the scope is fatal and checked before every operation and
/// while a command is in flight. A command exceeding the scope's exec timeout
/// counts as a failure of that operation.
pub async fn execute_plan<E: RemoteExecutor + ?Sized>(
    executor: &E,
    target: &Pod,
    label: &str,
    plan: &[CopyOperation],
    scope: &ReconcileScope,
) -> Result<SequenceOutcome> {
    let pod_name = target.name_any();

    for (index, operation) in plan.iter().enumerate() {
        scope.ensure_active()?;

        let command = operation.command();
        info!(
            pod = %pod_name,
            backup = label,
            subtree = %operation.subtree,
            step = index + 1,
            total = plan.len(),
            "Restoring {}",
            operation.source
        );

        let result = tokio::select! {
            _ = scope.cancel_token().cancelled() => {
                warn!(pod = %pod_name, step = index + 1, "Restore cancelled mid-operation");
                return Err(Error::Cancelled);
            }
            result = run_with_timeout(executor, target, label, &command, scope) => result,
        };

        if let Err(e) = result {
            error!(
                pod = %pod_name,
                source = %operation.source,
                error = %e,
                "Failed to restore from {}",
                operation.source
            );
            metrics::COPY_OPERATIONS_TOTAL
                .with_label_values(&[operation.subtree.as_str(), "failure"])
                .inc();
            return Ok(SequenceOutcome::PartialFailure {
                failed_index: index,
                applied: index,
                error: e.to_string(),
            });
        }

        metrics::COPY_OPERATIONS_TOTAL
            .with_label_values(&[operation.subtree.as_str(), "success"])
            .inc();
    }

    Ok(SequenceOutcome::FullSuccess {
        applied: plan.len(),
    })
}

async fn run_with_timeout<E: RemoteExecutor + ?Sized>(
    executor: &E,
    target: &Pod,
    label: &str,
    command: &str,
    scope: &ReconcileScope,
) -> Result<()> {
    match scope.exec_timeout() {
        Some(limit) => tokio::time::timeout(limit, executor.run(target, label, command))
            .await
            .map_err(|_| Error::Timeout(limit))?,
        None => executor.run(target, label, command).await,
    }
}
