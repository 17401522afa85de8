//! Backup Custom Resource Definition

use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Backup resource specification
///
/// The Backup name doubles as the directory holding the backup on the
/// backup volume.
#[derive(CustomResource, Clone, Debug, Default, Deserialize, Serialize, JsonSchema)]
#[kube(
    group = "jenkins.io",
    version = "v1alpha2",
    kind = "Backup",
    plural = "backups",
    singular = "backup",
    namespaced,
    printcolumn = r#"{"name": "Config", "type": "string", "jsonPath": ".spec.configRef"}"#,
    printcolumn = r#"{"name": "Age", "type": "date", "jsonPath": ".metadata.creationTimestamp"}"#
)]
#[serde(rename_all = "camelCase")]
pub struct BackupSpec {
    /// BackupConfig used to produce this backup (defaults to the well-known config)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config_ref: Option<String>,
}

impl Backup {
    /// Name of the BackupConfig this backup refers to, falling back to
    /// `default_name` when the reference is absent or empty
    pub fn config_name<'a>(&'a self, default_name: &'a str) -> &'a str {
        match self.spec.config_ref.as_deref() {
            Some(name) if !name.is_empty() => name,
            _ => default_name,
        }
    }
}
