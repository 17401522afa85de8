//! BackupConfig Custom Resource Definition

use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// BackupConfig resource specification
#[derive(CustomResource, Clone, Debug, Default, Deserialize, Serialize, JsonSchema)]
#[kube(
    group = "jenkins.io",
    version = "v1alpha2",
    kind = "BackupConfig",
    plural = "backupconfigs",
    singular = "backupconfig",
    namespaced,
    printcolumn = r#"{"name": "Jenkins", "type": "string", "jsonPath": ".spec.jenkinsRef"}"#,
    printcolumn = r#"{"name": "Age", "type": "date", "jsonPath": ".metadata.creationTimestamp"}"#
)]
#[serde(rename_all = "camelCase")]
pub struct BackupConfigSpec {
    /// Jenkins instance the backups belong to
    pub jenkins_ref: String,

    /// Subtrees of JENKINS_HOME captured by the backup
    #[serde(default)]
    pub options: BackupOptions,
}

/// Subtree selection flags
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct BackupOptions {
    /// Top-level `*.xml` configuration files
    #[serde(default)]
    pub config: bool,

    /// Job definitions
    #[serde(default)]
    pub jobs: bool,

    /// Installed plugins
    #[serde(default)]
    pub plugins: bool,
}
