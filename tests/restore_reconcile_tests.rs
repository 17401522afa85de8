//! Integration tests for the restore reconciler
//!
//! These tests drive the full Restore → Backup → BackupConfig → Jenkins →
//! Pod chain against the in-memory resolver and a recording executor.

use std::collections::BTreeMap;

use k8s_openapi::api::apps::v1::{Deployment, DeploymentSpec, ReplicaSet, ReplicaSetSpec};
use k8s_openapi::api::core::v1::{Pod, PodStatus};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::{LabelSelector, ObjectMeta};
use jenkins_restore_operator::adapters::{InMemoryResolver, RecordingExecutor};
use jenkins_restore_operator::config::RestoreSettings;
use jenkins_restore_operator::crd::{
    Backup, BackupConfig, BackupConfigSpec, BackupOptions, BackupSpec, Jenkins, JenkinsSpec,
    Restore, RestoreSpec,
};
use jenkins_restore_operator::reconcilers::restore::{reconcile, RestoreOutcome, SoftMiss};
use jenkins_restore_operator::reconcilers::ReconcileScope;
use jenkins_restore_operator::Error;
use tokio_test::{assert_err, assert_ok};

const NS: &str = "ci";
const POD: &str = "jenkins-j1-7d9f-x2k4";

// ============================================================================
// Test Helpers
// ============================================================================

fn labels(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

fn selector(pairs: &[(&str, &str)]) -> LabelSelector {
    LabelSelector {
        match_labels: Some(labels(pairs)),
        match_expressions: None,
    }
}

fn metadata(name: &str, pairs: &[(&str, &str)]) -> ObjectMeta {
    ObjectMeta {
        name: Some(name.to_string()),
        namespace: Some(NS.to_string()),
        labels: Some(labels(pairs)),
        ..Default::default()
    }
}

fn restore(name: &str, backup_ref: &str) -> Restore {
    let mut r = Restore::new(
        name,
        RestoreSpec {
            backup_ref: backup_ref.to_string(),
        },
    );
    r.metadata.namespace = Some(NS.to_string());
    r
}

fn backup(name: &str, config_ref: Option<&str>) -> Backup {
    let mut b = Backup::new(
        name,
        BackupSpec {
            config_ref: config_ref.map(str::to_string),
        },
    );
    b.metadata.namespace = Some(NS.to_string());
    b
}

fn backup_config(name: &str, jenkins_ref: &str, options: BackupOptions) -> BackupConfig {
    let mut c = BackupConfig::new(
        name,
        BackupConfigSpec {
            jenkins_ref: jenkins_ref.to_string(),
            options,
        },
    );
    c.metadata.namespace = Some(NS.to_string());
    c
}

fn jenkins(name: &str) -> Jenkins {
    let mut j = Jenkins::new(name, JenkinsSpec::default());
    j.metadata.namespace = Some(NS.to_string());
    j
}

fn options(config: bool, jobs: bool, plugins: bool) -> BackupOptions {
    BackupOptions {
        config,
        jobs,
        plugins,
    }
}

/// Deployment, ReplicaSet and one running Pod for Jenkins `j1`
fn insert_jenkins_runtime(resolver: &InMemoryResolver) {
    resolver
        .insert(Deployment {
            metadata: metadata("jenkins-j1", &[("app", "jenkins")]),
            spec: Some(DeploymentSpec {
                selector: selector(&[("app", "jenkins"), ("jenkins-cr", "j1")]),
                ..Default::default()
            }),
            ..Default::default()
        })
        .unwrap();
    resolver
        .insert(ReplicaSet {
            metadata: metadata(
                "jenkins-j1-7d9f",
                &[("app", "jenkins"), ("jenkins-cr", "j1"), ("pod-template-hash", "7d9f")],
            ),
            spec: Some(ReplicaSetSpec {
                selector: selector(&[
                    ("app", "jenkins"),
                    ("jenkins-cr", "j1"),
                    ("pod-template-hash", "7d9f"),
                ]),
                ..Default::default()
            }),
            ..Default::default()
        })
        .unwrap();
    resolver
        .insert(Pod {
            metadata: metadata(
                POD,
                &[("app", "jenkins"), ("jenkins-cr", "j1"), ("pod-template-hash", "7d9f")],
            ),
            status: Some(PodStatus {
                phase: Some("Running".to_string()),
                ..Default::default()
            }),
            ..Default::default()
        })
        .unwrap();
}

/// Full chain r1 → b1 → default config → j1 with the given options
fn full_chain(opts: BackupOptions) -> InMemoryResolver {
    let resolver = InMemoryResolver::new();
    resolver.insert(restore("r1", "b1")).unwrap();
    resolver.insert(backup("b1", None)).unwrap();
    resolver.insert(backup_config("default", "j1", opts)).unwrap();
    resolver.insert(jenkins("j1")).unwrap();
    insert_jenkins_runtime(&resolver);
    resolver
}

async fn run(
    resolver: &InMemoryResolver,
    executor: &RecordingExecutor,
) -> jenkins_restore_operator::Result<RestoreOutcome> {
    reconcile(
        NS,
        "r1",
        resolver,
        executor,
        &RestoreSettings::default(),
        &ReconcileScope::default(),
    )
    .await
}

// ============================================================================
// End-to-end
// ============================================================================

#[tokio::test]
async fn jobs_only_restore_issues_exactly_one_copy() {
    let resolver = full_chain(options(false, true, false));
    let executor = RecordingExecutor::new();

    let outcome = assert_ok!(run(&resolver, &executor).await);

    assert!(matches!(
        outcome,
        RestoreOutcome::Restored { ref target, applied: 1 } if target == POD
    ));
    let calls = executor.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].pod, POD);
    assert_eq!(calls[0].label, "b1");
    assert_eq!(
        calls[0].command,
        "cp -r /jenkins-backups/b1/jobs /var/lib/jenkins/jobs"
    );
    assert_eq!(executor.init_count(), 1);
}

#[tokio::test]
async fn all_options_restore_in_fixed_order() {
    let resolver = full_chain(options(true, true, true));
    let executor = RecordingExecutor::new();

    let outcome = assert_ok!(run(&resolver, &executor).await);

    assert!(matches!(outcome, RestoreOutcome::Restored { applied: 3, .. }));
    assert_eq!(
        executor.commands(),
        vec![
            "cp -r /jenkins-backups/b1/*.xml /var/lib/jenkins/",
            "cp -r /jenkins-backups/b1/jobs /var/lib/jenkins/jobs",
            "cp -r /jenkins-backups/b1/plugins /var/lib/jenkins/plugins",
        ]
    );
}

#[tokio::test]
async fn custom_settings_change_paths() {
    let resolver = full_chain(options(false, false, true));
    let executor = RecordingExecutor::new();
    let settings = RestoreSettings {
        backup_volume_path: "/mnt/backups/".to_string(),
        jenkins_home: "/home/jenkins".to_string(),
        ..RestoreSettings::default()
    };

    assert_ok!(
        reconcile(NS, "r1", &resolver, &executor, &settings, &ReconcileScope::default()).await
    );
    assert_eq!(
        executor.commands(),
        vec!["cp -r /mnt/backups/b1/plugins /home/jenkins/plugins"]
    );
}

#[tokio::test]
async fn no_options_is_a_successful_no_op() {
    let resolver = full_chain(options(false, false, false));
    let executor = RecordingExecutor::new();

    let outcome = assert_ok!(run(&resolver, &executor).await);

    assert!(matches!(outcome, RestoreOutcome::Restored { applied: 0, .. }));
    assert!(executor.calls().is_empty());
    assert_eq!(executor.init_count(), 0);
}

// ============================================================================
// Soft misses
// ============================================================================

#[tokio::test]
async fn missing_restore_is_skipped() {
    let resolver = InMemoryResolver::new();
    let executor = RecordingExecutor::new();

    let outcome = assert_ok!(run(&resolver, &executor).await);

    assert!(matches!(outcome, RestoreOutcome::Skipped(SoftMiss::Restore(ref n)) if n == "r1"));
    assert!(executor.calls().is_empty());
}

#[tokio::test]
async fn unresolved_backup_ref_issues_no_copies() {
    let resolver = full_chain(options(true, true, true));
    resolver.remove::<Backup>(NS, "b1");
    let executor = RecordingExecutor::new();

    let outcome = assert_ok!(run(&resolver, &executor).await);

    assert_eq!(
        match outcome {
            RestoreOutcome::Skipped(miss) => miss,
            other => panic!("expected skip, got {:?}", other),
        },
        SoftMiss::Backup("b1".to_string())
    );
    assert!(executor.calls().is_empty());
    assert_eq!(executor.init_count(), 0);
    assert_eq!(resolver.lookups_of_kind("BackupConfig"), 0);
}

#[tokio::test]
async fn missing_backup_config_is_skipped() {
    let resolver = full_chain(options(true, true, true));
    resolver.remove::<BackupConfig>(NS, "default");
    let executor = RecordingExecutor::new();

    let outcome = assert_ok!(run(&resolver, &executor).await);

    assert!(matches!(
        outcome,
        RestoreOutcome::Skipped(SoftMiss::BackupConfig(ref n)) if n == "default"
    ));
    assert!(executor.calls().is_empty());
}

#[tokio::test]
async fn missing_jenkins_is_skipped() {
    let resolver = full_chain(options(true, true, true));
    resolver.remove::<Jenkins>(NS, "j1");
    let executor = RecordingExecutor::new();

    let outcome = assert_ok!(run(&resolver, &executor).await);

    assert!(matches!(outcome, RestoreOutcome::Skipped(SoftMiss::Jenkins(ref n)) if n == "j1"));
    assert!(executor.calls().is_empty());
    assert_eq!(resolver.lookups_of_kind("Deployment"), 0);
}

// ============================================================================
// Config reference defaulting
// ============================================================================

#[tokio::test]
async fn empty_config_ref_uses_default_name_once() {
    let resolver = full_chain(options(false, true, false));
    resolver.insert(backup("b1", Some(""))).unwrap();
    let executor = RecordingExecutor::new();

    assert_ok!(run(&resolver, &executor).await);

    assert_eq!(resolver.lookups_of("BackupConfig", "default"), 1);
    assert_eq!(resolver.lookups_of_kind("BackupConfig"), 1);
}

#[tokio::test]
async fn explicit_config_ref_is_followed() {
    let resolver = full_chain(options(false, true, false));
    resolver.insert(backup("b1", Some("nightly"))).unwrap();
    resolver
        .insert(backup_config("nightly", "j1", options(false, false, true)))
        .unwrap();
    let executor = RecordingExecutor::new();

    assert_ok!(run(&resolver, &executor).await);

    assert_eq!(resolver.lookups_of("BackupConfig", "default"), 0);
    assert_eq!(
        executor.commands(),
        vec!["cp -r /jenkins-backups/b1/plugins /var/lib/jenkins/plugins"]
    );
}

// ============================================================================
// Fatal errors
// ============================================================================

#[tokio::test]
async fn transport_failure_is_not_a_soft_miss() {
    let resolver = full_chain(options(true, true, true));
    resolver.fail_kind("Backup");
    let executor = RecordingExecutor::new();

    let err = assert_err!(run(&resolver, &executor).await);

    assert!(matches!(err, Error::Transport(_)));
    assert!(executor.calls().is_empty());
}

async fn assert_transport_failure_is_fatal(kind: &str) {
    let resolver = full_chain(options(true, true, true));
    resolver.fail_kind(kind);
    let executor = RecordingExecutor::new();

    let err = assert_err!(run(&resolver, &executor).await);

    assert!(
        matches!(err, Error::Transport(_)),
        "{} lookup failure should be fatal, got {:?}",
        kind,
        err
    );
    assert_eq!(executor.init_count(), 0);
    assert!(executor.calls().is_empty());
}

#[tokio::test]
async fn restore_lookup_transport_failure_is_not_a_soft_miss() {
    assert_transport_failure_is_fatal("Restore").await;
}

#[tokio::test]
async fn backup_config_lookup_transport_failure_is_not_a_soft_miss() {
    assert_transport_failure_is_fatal("BackupConfig").await;
}

#[tokio::test]
async fn jenkins_lookup_transport_failure_is_not_a_soft_miss() {
    assert_transport_failure_is_fatal("Jenkins").await;
}

#[tokio::test]
async fn deployment_without_replica_sets_is_fatal() {
    let resolver = full_chain(options(true, true, true));
    resolver.remove::<ReplicaSet>(NS, "jenkins-j1-7d9f");
    let executor = RecordingExecutor::new();

    let err = assert_err!(run(&resolver, &executor).await);

    assert!(matches!(err, Error::NoReplicaGroup(ref n) if n == "jenkins-j1"));
    assert!(executor.calls().is_empty());
}

#[tokio::test]
async fn replica_set_without_pods_is_fatal() {
    let resolver = full_chain(options(true, true, true));
    resolver.remove::<Pod>(NS, POD);
    let executor = RecordingExecutor::new();

    let err = assert_err!(run(&resolver, &executor).await);

    assert!(matches!(err, Error::NoInstance(_)));
}

#[tokio::test]
async fn missing_deployment_is_fatal() {
    let resolver = full_chain(options(true, true, true));
    resolver.remove::<Deployment>(NS, "jenkins-j1");
    let executor = RecordingExecutor::new();

    let err = assert_err!(run(&resolver, &executor).await);

    assert!(matches!(err, Error::DeploymentNotFound(_)));
}

#[tokio::test]
async fn executor_init_failure_is_fatal() {
    let resolver = full_chain(options(true, false, false));
    let executor = RecordingExecutor::new().failing_init();

    let err = assert_err!(run(&resolver, &executor).await);

    assert!(matches!(err, Error::Exec(_)));
    assert!(executor.calls().is_empty());
}

// ============================================================================
// Copy failures
// ============================================================================

#[tokio::test]
async fn first_copy_failure_stops_remaining_copies() {
    let resolver = full_chain(options(true, true, true));
    let executor = RecordingExecutor::new().failing_on(0);

    let outcome = assert_ok!(run(&resolver, &executor).await);

    assert!(matches!(
        outcome,
        RestoreOutcome::CopyFailed {
            failed_index: 0,
            applied: 0,
            ..
        }
    ));
    assert_eq!(executor.calls().len(), 1);
}

#[tokio::test]
async fn last_copy_failure_reports_applied_operations() {
    let resolver = full_chain(options(true, true, true));
    let executor = RecordingExecutor::new().failing_on(2);

    let outcome = assert_ok!(run(&resolver, &executor).await);

    assert!(matches!(
        outcome,
        RestoreOutcome::CopyFailed {
            failed_index: 2,
            applied: 2,
            ..
        }
    ));
    assert_eq!(executor.calls().len(), 3);
}
