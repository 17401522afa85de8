//! Restore Custom Resource Definition

use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Restore resource specification
///
/// A Restore is a one-shot request: the operator reads it, applies the
/// referenced backup and never writes back to it.
#[derive(CustomResource, Clone, Debug, Default, Deserialize, Serialize, JsonSchema)]
#[kube(
    group = "jenkins.io",
    version = "v1alpha2",
    kind = "Restore",
    plural = "restores",
    singular = "restore",
    namespaced,
    printcolumn = r#"{"name": "Backup", "type": "string", "jsonPath": ".spec.backupRef"}"#,
    printcolumn = r#"{"name": "Age", "type": "date", "jsonPath": ".metadata.creationTimestamp"}"#
)]
#[serde(rename_all = "camelCase")]
pub struct RestoreSpec {
    /// Name of the Backup to restore (same namespace)
    pub backup_ref: String,
}
