//! Error types for the Jenkins Restore Operator

use thiserror::Error;

/// Result type alias using the operator's Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Operator error types
#[derive(Error, Debug)]
pub enum Error {
    /// Kubernetes API error
    #[error("Kubernetes API error: {0}")]
    Kube(#[from] kube::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Lookup backend unreachable or failing
    #[error("Transport error: {0}")]
    Transport(String),

    /// Label selector could not be interpreted
    #[error("Invalid label selector: {0}")]
    InvalidSelector(String),

    /// Jenkins master deployment missing
    #[error("Deployment not found: {0}")]
    DeploymentNotFound(String),

    /// Deployment selector matched no ReplicaSet
    #[error("Deployment {0} has no ReplicaSet attached yet")]
    NoReplicaGroup(String),

    /// ReplicaSet selector matched no usable Pod
    #[error("ReplicaSet {0} has no Pod attached yet")]
    NoInstance(String),

    /// Remote command failed inside the target pod
    #[error("Exec error: {0}")]
    Exec(String),

    /// Remote command exceeded its deadline
    #[error("Command timed out after {0:?}")]
    Timeout(std::time::Duration),

    /// Reconcile was cancelled before it finished
    #[error("Reconcile cancelled")]
    Cancelled,

    /// A copy operation failed and the configured policy asks for a retry
    #[error("Copy operation {index} failed: {message}")]
    CopyFailed { index: usize, message: String },

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Error::Config(msg.into())
    }

    /// Create a transport error
    pub fn transport(msg: impl Into<String>) -> Self {
        Error::Transport(msg.into())
    }

    /// Create an invalid selector error
    pub fn invalid_selector(msg: impl Into<String>) -> Self {
        Error::InvalidSelector(msg.into())
    }

    /// Create an exec error
    pub fn exec(msg: impl Into<String>) -> Self {
        Error::Exec(msg.into())
    }

    /// Whether the error comes from resolving the Jenkins pod rather than
    /// from talking to the API server
    pub fn is_locator_error(&self) -> bool {
        matches!(
            self,
            Error::InvalidSelector(_)
                | Error::DeploymentNotFound(_)
                | Error::NoReplicaGroup(_)
                | Error::NoInstance(_)
        )
    }
}
