//! Jenkins Custom Resource Definition
//!
//! Only the fields the restore path reads are modelled here; the master
//! itself is deployed by the Jenkins controller.

use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Prefix of the Deployment running a Jenkins master
pub const JENKINS_DEPLOYMENT_PREFIX: &str = "jenkins";

/// Jenkins resource specification
#[derive(CustomResource, Clone, Debug, Default, Deserialize, Serialize, JsonSchema)]
#[kube(
    group = "jenkins.io",
    version = "v1alpha2",
    kind = "Jenkins",
    plural = "jenkins",
    singular = "jenkins",
    namespaced,
    printcolumn = r#"{"name": "Age", "type": "date", "jsonPath": ".metadata.creationTimestamp"}"#
)]
#[serde(rename_all = "camelCase")]
pub struct JenkinsSpec {
    /// Jenkins master image
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

impl Jenkins {
    /// Name of the Deployment running this Jenkins master
    pub fn deployment_name(&self) -> String {
        use kube::ResourceExt;
        format!("{}-{}", JENKINS_DEPLOYMENT_PREFIX, self.name_any())
    }
}
