//! Restore reconciler
//!
//! Handles the business logic for a single Restore:
//! - Reference resolution (Backup, BackupConfig, Jenkins), where a missing
//!   object ends the reconcile quietly
//! - Jenkins pod lookup
//! - Copy plan construction and execution

use std::fmt;

use kube::ResourceExt;
use tracing::{debug, info, instrument, warn};

use crate::adapters::{ObjectKind, RemoteExecutor, Resolver};
use crate::config::RestoreSettings;
use crate::crd::{Backup, BackupConfig, Jenkins, Restore};
use crate::error::Result;
use crate::metrics;

use super::locator::locate_pod;
use super::plan::build_plan;
use super::sequencer::{execute_plan, SequenceOutcome};
use super::ReconcileScope;

/// A reference that did not resolve; the reconcile ends without side effects
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SoftMiss {
    Restore(String),
    Backup(String),
    BackupConfig(String),
    Jenkins(String),
}

impl SoftMiss {
    pub fn kind(&self) -> &'static str {
        match self {
            SoftMiss::Restore(_) => "Restore",
            SoftMiss::Backup(_) => "Backup",
            SoftMiss::BackupConfig(_) => "BackupConfig",
            SoftMiss::Jenkins(_) => "Jenkins",
        }
    }

    pub fn name(&self) -> &str {
        match self {
            SoftMiss::Restore(n)
            | SoftMiss::Backup(n)
            | SoftMiss::BackupConfig(n)
            | SoftMiss::Jenkins(n) => n,
        }
    }
}

impl fmt::Display for SoftMiss {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} '{}' not found", self.kind(), self.name())
    }
}

/// Result of one Restore reconcile
#[derive(Debug)]
pub enum RestoreOutcome {
    /// A referenced object was missing; nothing was done
    Skipped(SoftMiss),
    /// Every planned copy completed (possibly none)
    Restored { target: String, applied: usize },
    /// A copy failed; the remaining copies were not attempted
    CopyFailed {
        target: String,
        failed_index: usize,
        applied: usize,
        error: String,
    },
}

impl RestoreOutcome {
    fn metric_label(&self) -> &'static str {
        match self {
            RestoreOutcome::Skipped(_) => "skipped",
            RestoreOutcome::Restored { .. } => "success",
            RestoreOutcome::CopyFailed { .. } => "failure",
        }
    }
}

/// Fetch an object, turning a miss into `None` and keeping transport errors fatal
async fn fetch<K: ObjectKind, R: Resolver>(
    resolver: &R,
    namespace: &str,
    name: &str,
    scope: &ReconcileScope,
) -> Result<Option<K>> {
    scope.ensure_active()?;
    let resolution = resolver.resolve::<K>(namespace, name).await;
    if resolution.is_not_found() {
        debug!(kind = %K::kind(&()), namespace, name, "Referenced object not found");
    }
    resolution.into_result()
}

fn skipped(miss: SoftMiss, namespace: &str) -> RestoreOutcome {
    info!(namespace, kind = miss.kind(), name = miss.name(), "{}, skipping restore", miss);
    metrics::SOFT_MISSES_TOTAL
        .with_label_values(&[miss.kind()])
        .inc();
    RestoreOutcome::Skipped(miss)
}

/// Reconcile the Restore identified by `namespace`/`name`
///
/// Missing references end the reconcile successfully. Lookup transport
/// failures and pod discovery failures are returned as errors. Copy failures
/// are reported in the outcome; acting on them is left to the caller.
#[instrument(skip_all, fields(namespace = %namespace, restore = %name))]
pub async fn reconcile<R: Resolver, E: RemoteExecutor + ?Sized>(
    namespace: &str,
    name: &str,
    resolver: &R,
    executor: &E,
    settings: &RestoreSettings,
    scope: &ReconcileScope,
) -> Result<RestoreOutcome> {
    let outcome = run(namespace, name, resolver, executor, settings, scope).await?;
    metrics::RESTORES_TOTAL
        .with_label_values(&[outcome.metric_label(), namespace])
        .inc();
    Ok(outcome)
}

async fn run<R: Resolver, E: RemoteExecutor + ?Sized>(
    namespace: &str,
    name: &str,
    resolver: &R,
    executor: &E,
    settings: &RestoreSettings,
    scope: &ReconcileScope,
) -> Result<RestoreOutcome> {
    // Objects deleted between trigger and processing are not an error
    let Some(restore) = fetch::<Restore, _>(resolver, namespace, name, scope).await? else {
        return Ok(skipped(SoftMiss::Restore(name.to_string()), namespace));
    };
    info!(backup = %restore.spec.backup_ref, "Jenkins Restore {} has been created", name);

    let backup_name = restore.spec.backup_ref.as_str();
    let Some(backup) = fetch::<Backup, _>(resolver, namespace, backup_name, scope).await? else {
        return Ok(skipped(SoftMiss::Backup(backup_name.to_string()), namespace));
    };

    let config_name = backup.config_name(&settings.default_backup_config);
    let Some(backup_config) =
        fetch::<BackupConfig, _>(resolver, namespace, config_name, scope).await?
    else {
        return Ok(skipped(SoftMiss::BackupConfig(config_name.to_string()), namespace));
    };

    let jenkins_name = backup_config.spec.jenkins_ref.as_str();
    let Some(jenkins) = fetch::<Jenkins, _>(resolver, namespace, jenkins_name, scope).await? else {
        return Ok(skipped(SoftMiss::Jenkins(jenkins_name.to_string()), namespace));
    };
    info!(
        jenkins = %jenkins.name_any(),
        backup = %backup.name_any(),
        config = config_name,
        "Restore in progress for Jenkins instance"
    );

    let pod = locate_pod(resolver, &jenkins, scope).await?;
    let target = pod.name_any();

    let plan = build_plan(
        &backup_config.spec.options,
        &backup.name_any(),
        &settings.backup_volume_path,
        &settings.jenkins_home,
    );
    if plan.is_empty() {
        info!(pod = %target, "BackupConfig selects nothing to restore");
        return Ok(RestoreOutcome::Restored { target, applied: 0 });
    }

    executor.init().await?;

    match execute_plan(executor, &pod, &backup.name_any(), &plan, scope).await? {
        SequenceOutcome::FullSuccess { applied } => {
            info!(pod = %target, applied, "Restore completed");
            Ok(RestoreOutcome::Restored { target, applied })
        }
        SequenceOutcome::PartialFailure {
            failed_index,
            applied,
            error,
        } => {
            warn!(
                pod = %target,
                failed_step = failed_index + 1,
                total = plan.len(),
                error = %error,
                "Restore stopped after a failed copy"
            );
            Ok(RestoreOutcome::CopyFailed {
                target,
                failed_index,
                applied,
                error,
            })
        }
    }
}
