//! Label selector handling
//!
//! Both resolvers turn a `metav1.LabelSelector` into kube's [`Selector`]:
//! the API-backed one renders it as a `labelSelector` query, the in-memory
//! one evaluates it with [`SelectorExt::matches`](kube::core::SelectorExt).

use k8s_openapi::apimachinery::pkg::apis::meta::v1::LabelSelector;
use kube::core::Selector;

use crate::error::{Error, Result};

/// Convert a selector, rejecting malformed expressions
pub fn parse(selector: &LabelSelector) -> Result<Selector> {
    Selector::try_from(selector.clone()).map_err(|e| Error::invalid_selector(e.to_string()))
}
