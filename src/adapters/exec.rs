//! Remote command execution inside the Jenkins pod
//!
//! Commands are run through the pod `exec` subresource with `sh -c`, so
//! glob patterns such as `*.xml` are expanded by the shell in the container.

use async_trait::async_trait;
use k8s_openapi::api::core::v1::Pod;
use kube::api::{Api, AttachParams};
use kube::{Client, ResourceExt};
use tokio::io::AsyncReadExt;
use tracing::{debug, info};

use crate::error::{Error, Result};

/// Capability to run a shell command in a live pod
#[async_trait]
pub trait RemoteExecutor: Send + Sync {
    /// Prepare the executor; called once before the first command of a plan
    async fn init(&self) -> Result<()>;

    /// Run `command` in `target`, blocking until it exits.
    ///
    /// `label` identifies the request in logs (the backup being restored).
    async fn run(&self, target: &Pod, label: &str, command: &str) -> Result<()>;
}

/// Executor backed by the Kubernetes exec subresource
#[derive(Clone)]
pub struct KubeExecClient {
    client: Client,
    container: String,
}

impl KubeExecClient {
    pub fn new(client: Client, container: impl Into<String>) -> Self {
        Self {
            client,
            container: container.into(),
        }
    }
}

#[async_trait]
impl RemoteExecutor for KubeExecClient {
    async fn init(&self) -> Result<()> {
        let version = self.client.apiserver_version().await?;
        debug!(
            major = %version.major,
            minor = %version.minor,
            "Exec client connected to API server"
        );
        Ok(())
    }

    async fn run(&self, target: &Pod, label: &str, command: &str) -> Result<()> {
        let pod_name = target.name_any();
        let namespace = target
            .namespace()
            .ok_or_else(|| Error::exec(format!("pod {} has no namespace", pod_name)))?;
        let pods: Api<Pod> = Api::namespaced(self.client.clone(), &namespace);

        let params = AttachParams::default()
            .container(self.container.clone())
            .stdin(false)
            .stdout(false)
            .stderr(true);

        info!(pod = %pod_name, label, command, "Executing remote command");

        let mut attached = pods
            .exec(&pod_name, vec!["sh", "-c", command], &params)
            .await?;

        let mut stderr = String::new();
        if let Some(mut reader) = attached.stderr() {
            reader.read_to_string(&mut stderr).await?;
        }

        let status = match attached.take_status() {
            Some(status) => status.await,
            None => None,
        };
        attached
            .join()
            .await
            .map_err(|e| Error::exec(format!("exec session for {} failed: {}", pod_name, e)))?;

        match status {
            Some(s) if s.status.as_deref() != Some("Success") => {
                let message = s.message.unwrap_or_default();
                Err(Error::exec(format!(
                    "'{}' in pod {} exited with {}: {} {}",
                    command,
                    pod_name,
                    s.reason.unwrap_or_else(|| "failure".to_string()),
                    message,
                    stderr.trim()
                )))
            }
            _ => {
                debug!(pod = %pod_name, label, "Remote command succeeded");
                Ok(())
            }
        }
    }
}
