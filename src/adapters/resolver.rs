//! Generic lookup-by-reference over namespaced Kubernetes objects
//!
//! Every reference followed by the restore path (Restore → Backup →
//! BackupConfig → Jenkins → Deployment → ReplicaSet → Pod) goes through the
//! [`Resolver`] capability, so "object does not exist" can be told apart from
//! "the API server could not answer".

use std::fmt::Debug;

use async_trait::async_trait;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::LabelSelector;
use k8s_openapi::NamespaceResourceScope;
use kube::{api::ListParams, Api, Client, Resource};
use serde::{de::DeserializeOwned, Serialize};
use tracing::debug;

use crate::error::{Error, Result};

use super::selector;

/// Bounds shared by every object kind the resolver can fetch
pub trait ObjectKind:
    Resource<Scope = NamespaceResourceScope, DynamicType = ()>
    + Clone
    + Debug
    + DeserializeOwned
    + Serialize
    + Send
    + Sync
    + 'static
{
}

impl<K> ObjectKind for K where
    K: Resource<Scope = NamespaceResourceScope, DynamicType = ()>
        + Clone
        + Debug
        + DeserializeOwned
        + Serialize
        + Send
        + Sync
        + 'static
{
}

/// Outcome of resolving a single reference
#[derive(Debug)]
pub enum Resolution<K> {
    /// The object exists
    Found(K),
    /// The object does not exist (yet, or anymore)
    NotFound,
    /// The lookup itself failed; must never be treated as a miss
    TransientError(Error),
}

impl<K> Resolution<K> {
    /// Collapse into `Ok(Some)`, `Ok(None)` for a miss, or the transient error
    pub fn into_result(self) -> Result<Option<K>> {
        match self {
            Resolution::Found(obj) => Ok(Some(obj)),
            Resolution::NotFound => Ok(None),
            Resolution::TransientError(e) => Err(e),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Resolution::NotFound)
    }
}

/// Lookup capability over namespaced objects
#[async_trait]
pub trait Resolver: Send + Sync {
    /// Fetch a single object by name
    async fn resolve<K: ObjectKind>(&self, namespace: &str, name: &str) -> Resolution<K>;

    /// List objects in `namespace` whose labels satisfy `selector`
    async fn list<K: ObjectKind>(&self, namespace: &str, selector: &LabelSelector)
        -> Result<Vec<K>>;
}

/// Resolver backed by the Kubernetes API server
#[derive(Clone)]
pub struct KubeResolver {
    client: Client,
}

impl KubeResolver {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Resolver for KubeResolver {
    async fn resolve<K: ObjectKind>(&self, namespace: &str, name: &str) -> Resolution<K> {
        let api: Api<K> = Api::namespaced(self.client.clone(), namespace);
        match api.get(name).await {
            Ok(obj) => Resolution::Found(obj),
            Err(kube::Error::Api(api_err)) if api_err.code == 404 => {
                debug!(kind = %K::kind(&()), namespace, name, "Object not found");
                Resolution::NotFound
            }
            Err(other) => Resolution::TransientError(Error::Kube(other)),
        }
    }

    async fn list<K: ObjectKind>(
        &self,
        namespace: &str,
        selector: &LabelSelector,
    ) -> Result<Vec<K>> {
        let selector = selector::parse(selector)?;
        let api: Api<K> = Api::namespaced(self.client.clone(), namespace);
        let items = api.list(&ListParams::default().labels_from(&selector)).await?.items;
        debug!(
            kind = %K::kind(&()),
            namespace,
            selector = %selector,
            count = items.len(),
            "Listed objects"
        );
        Ok(items)
    }
}
