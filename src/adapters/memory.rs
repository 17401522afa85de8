//! In-memory resolver used by tests and local dry runs

use std::collections::{BTreeMap, HashSet};
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::LabelSelector;
use kube::core::SelectorExt;
use kube::ResourceExt;

use crate::error::{Error, Result};

use super::resolver::{ObjectKind, Resolution, Resolver};
use super::selector;

#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
struct ObjectKey {
    kind: String,
    namespace: String,
    name: String,
}

/// Resolver holding objects in memory
///
/// Objects are stored as JSON so any kind can share one store. Lookups are
/// recorded and whole kinds can be switched into a failing state to model an
/// unreachable API server.
#[derive(Default)]
pub struct InMemoryResolver {
    objects: Mutex<BTreeMap<ObjectKey, serde_json::Value>>,
    failing_kinds: Mutex<HashSet<String>>,
    lookups: Mutex<Vec<ObjectKey>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl InMemoryResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store an object; it must carry a name and a namespace
    pub fn insert<K: ObjectKind>(&self, obj: K) -> Result<()> {
        let namespace = obj
            .namespace()
            .ok_or_else(|| Error::config(format!("{} has no namespace", obj.name_any())))?;
        let key = ObjectKey {
            kind: K::kind(&()).to_string(),
            namespace,
            name: obj.name_any(),
        };
        let value = serde_json::to_value(&obj)?;
        lock(&self.objects).insert(key, value);
        Ok(())
    }

    /// Builder-style [`insert`](Self::insert)
    pub fn with<K: ObjectKind>(self, obj: K) -> Result<Self> {
        self.insert(obj)?;
        Ok(self)
    }

    /// Remove an object, returning whether it existed
    pub fn remove<K: ObjectKind>(&self, namespace: &str, name: &str) -> bool {
        let key = ObjectKey {
            kind: K::kind(&()).to_string(),
            namespace: namespace.to_string(),
            name: name.to_string(),
        };
        lock(&self.objects).remove(&key).is_some()
    }

    /// Make every lookup of `kind` fail with a transport error
    pub fn fail_kind(&self, kind: &str) {
        lock(&self.failing_kinds).insert(kind.to_string());
    }

    /// Number of single-object lookups of `kind`/`name`
    pub fn lookups_of(&self, kind: &str, name: &str) -> usize {
        lock(&self.lookups)
            .iter()
            .filter(|k| k.kind == kind && k.name == name)
            .count()
    }

    /// Number of single-object lookups of `kind`, any name
    pub fn lookups_of_kind(&self, kind: &str) -> usize {
        lock(&self.lookups).iter().filter(|k| k.kind == kind).count()
    }

    fn check_available(&self, kind: &str) -> Result<()> {
        if lock(&self.failing_kinds).contains(kind) {
            return Err(Error::transport(format!("{} backend unavailable", kind)));
        }
        Ok(())
    }
}

#[async_trait]
impl Resolver for InMemoryResolver {
    async fn resolve<K: ObjectKind>(&self, namespace: &str, name: &str) -> Resolution<K> {
        let key = ObjectKey {
            kind: K::kind(&()).to_string(),
            namespace: namespace.to_string(),
            name: name.to_string(),
        };
        lock(&self.lookups).push(key.clone());

        if let Err(e) = self.check_available(&key.kind) {
            return Resolution::TransientError(e);
        }

        let value = lock(&self.objects).get(&key).cloned();
        match value {
            Some(value) => match serde_json::from_value(value) {
                Ok(obj) => Resolution::Found(obj),
                Err(e) => Resolution::TransientError(Error::Serialization(e)),
            },
            None => Resolution::NotFound,
        }
    }

    async fn list<K: ObjectKind>(
        &self,
        namespace: &str,
        selector: &LabelSelector,
    ) -> Result<Vec<K>> {
        let kind = K::kind(&()).to_string();
        self.check_available(&kind)?;
        let selector = selector::parse(selector)?;

        let values: Vec<serde_json::Value> = lock(&self.objects)
            .iter()
            .filter(|(k, _)| k.kind == kind && k.namespace == namespace)
            .map(|(_, v)| v.clone())
            .collect();

        let mut items = Vec::new();
        for value in values {
            let obj: K = serde_json::from_value(value)?;
            if selector.matches(obj.labels()) {
                items.push(obj);
            }
        }
        Ok(items)
    }
}
