//! Jenkins pod discovery
//!
//! Walks Jenkins → Deployment → ReplicaSet → Pod, matching label selectors
//! at each hop. Every failure here is fatal for the reconcile.
//!
//! When a selector matches several objects the choice is deterministic: the
//! newest ReplicaSet wins. Pods are filtered before the tie-break: terminating
//! pods are dropped, so a ReplicaSet whose only pod is terminating has no
//! instance. Among the rest a running pod wins over a pending one, then the
//! newest. Remaining ties go to the greatest name.

use chrono::{DateTime, Utc};
use k8s_openapi::api::apps::v1::{Deployment, ReplicaSet};
use k8s_openapi::api::core::v1::Pod;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::LabelSelector;
use kube::{Resource, ResourceExt};
use tracing::debug;

use crate::adapters::{Resolution, Resolver};
use crate::crd::Jenkins;
use crate::error::{Error, Result};

use super::ReconcileScope;

/// Find the pod running the given Jenkins master
pub async fn locate_pod<R: Resolver>(
    resolver: &R,
    jenkins: &Jenkins,
    scope: &ReconcileScope,
) -> Result<Pod> {
    let namespace = jenkins
        .namespace()
        .ok_or_else(|| Error::config(format!("Jenkins {} has no namespace", jenkins.name_any())))?;

    scope.ensure_active()?;
    let deployment = get_deployment(resolver, jenkins, &namespace).await?;

    scope.ensure_active()?;
    let replica_set = get_replica_set(resolver, &deployment, &namespace).await?;

    scope.ensure_active()?;
    get_pod(resolver, &replica_set, &namespace).await
}

/// Fetch the Deployment of a Jenkins master
pub async fn get_deployment<R: Resolver>(
    resolver: &R,
    jenkins: &Jenkins,
    namespace: &str,
) -> Result<Deployment> {
    let name = jenkins.deployment_name();
    debug!(jenkins = %jenkins.name_any(), deployment = %name, "Querying Jenkins deployment");

    match resolver.resolve::<Deployment>(namespace, &name).await {
        Resolution::Found(deployment) => Ok(deployment),
        Resolution::NotFound => Err(Error::DeploymentNotFound(format!("{}/{}", namespace, name))),
        Resolution::TransientError(e) => Err(e),
    }
}

/// Pick the ReplicaSet currently backing `deployment`
pub async fn get_replica_set<R: Resolver>(
    resolver: &R,
    deployment: &Deployment,
    namespace: &str,
) -> Result<ReplicaSet> {
    let name = deployment.name_any();
    let selector = deployment
        .spec
        .as_ref()
        .map(|spec| &spec.selector)
        .ok_or_else(|| Error::invalid_selector(format!("deployment {} has no spec", name)))?;

    let candidates: Vec<ReplicaSet> = resolver.list(namespace, selector).await?;
    debug!(deployment = %name, candidates = candidates.len(), "Listed replica sets");

    let replica_set = select_replica_set(candidates).ok_or(Error::NoReplicaGroup(name))?;
    debug!(replica_set = %replica_set.name_any(), "Selected replica set");
    Ok(replica_set)
}

/// Pick the pod to restore into from the pods of `replica_set`
pub async fn get_pod<R: Resolver>(
    resolver: &R,
    replica_set: &ReplicaSet,
    namespace: &str,
) -> Result<Pod> {
    let name = replica_set.name_any();
    let selector: &LabelSelector = replica_set
        .spec
        .as_ref()
        .map(|spec| &spec.selector)
        .ok_or_else(|| Error::invalid_selector(format!("replica set {} has no spec", name)))?;

    let candidates: Vec<Pod> = resolver.list(namespace, selector).await?;
    debug!(replica_set = %name, candidates = candidates.len(), "Listed pods");

    let pod = select_pod(candidates).ok_or(Error::NoInstance(name))?;
    debug!(pod = %pod.name_any(), "Selected pod");
    Ok(pod)
}

fn created_at<K: Resource>(obj: &K) -> Option<DateTime<Utc>> {
    obj.meta().creation_timestamp.as_ref().map(|t| t.0)
}

/// Newest ReplicaSet, ties broken by name
pub fn select_replica_set(candidates: Vec<ReplicaSet>) -> Option<ReplicaSet> {
    candidates
        .into_iter()
        .max_by_key(|rs| (created_at(rs), rs.name_any()))
}

/// Drop terminating pods, then prefer running, then newest, then name
///
/// Returns `None` when every candidate is terminating.
pub fn select_pod(candidates: Vec<Pod>) -> Option<Pod> {
    candidates
        .into_iter()
        .filter(|pod| pod.metadata.deletion_timestamp.is_none())
        .max_by_key(|pod| {
            let running = pod
                .status
                .as_ref()
                .and_then(|s| s.phase.as_deref())
                .is_some_and(|phase| phase == "Running");
            (running, created_at(pod), pod.name_any())
        })
}
