//! Operator configuration
//!
//! Settings are read from environment variables once at startup. Parsing is
//! done against a lookup function so the rules can be exercised without
//! touching the process environment.

use std::time::Duration;

use crate::error::{Error, Result};

/// Default metrics port
pub const DEFAULT_METRICS_PORT: u16 = 8080;

/// Mount path of the backup volume inside the Jenkins pod
pub const DEFAULT_BACKUP_VOLUME_PATH: &str = "/jenkins-backups";

/// JENKINS_HOME inside the Jenkins pod
pub const DEFAULT_JENKINS_HOME: &str = "/var/lib/jenkins";

/// Container running the Jenkins master
pub const DEFAULT_JENKINS_CONTAINER: &str = "jenkins";

/// BackupConfig used when a Backup does not name one
pub const DEFAULT_BACKUP_CONFIG_NAME: &str = "default";

/// What the controller does when a copy operation fails
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum CopyFailurePolicy {
    /// Log the failure and report the reconcile as successful
    #[default]
    Ignore,
    /// Surface the failure so the controller requeues with backoff
    Retry,
}

impl std::str::FromStr for CopyFailurePolicy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "ignore" => Ok(CopyFailurePolicy::Ignore),
            "retry" => Ok(CopyFailurePolicy::Retry),
            other => Err(Error::config(format!(
                "Unknown copy failure policy '{}' (expected ignore or retry)",
                other
            ))),
        }
    }
}

/// Settings used by the restore reconciler
#[derive(Clone, Debug)]
pub struct RestoreSettings {
    /// Root of the backup volume; backups live in `<root>/<backup name>`
    pub backup_volume_path: String,
    /// Restore destination root
    pub jenkins_home: String,
    /// Container commands are executed in
    pub container: String,
    /// BackupConfig name substituted for an empty `configRef`
    pub default_backup_config: String,
    /// Deadline for a single copy command
    pub exec_timeout: Option<Duration>,
    /// Retry policy for failed copy operations
    pub copy_failure_policy: CopyFailurePolicy,
}

impl Default for RestoreSettings {
    fn default() -> Self {
        Self {
            backup_volume_path: DEFAULT_BACKUP_VOLUME_PATH.to_string(),
            jenkins_home: DEFAULT_JENKINS_HOME.to_string(),
            container: DEFAULT_JENKINS_CONTAINER.to_string(),
            default_backup_config: DEFAULT_BACKUP_CONFIG_NAME.to_string(),
            exec_timeout: None,
            copy_failure_policy: CopyFailurePolicy::default(),
        }
    }
}

/// Top-level operator configuration
#[derive(Clone, Debug)]
pub struct OperatorConfig {
    pub metrics_port: u16,
    pub restore: RestoreSettings,
}

impl OperatorConfig {
    /// Load configuration from the process environment
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration using `lookup` to resolve variable names
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let defaults = RestoreSettings::default();

        let metrics_port = match get("METRICS_PORT") {
            Some(raw) => raw
                .trim()
                .parse::<u16>()
                .map_err(|e| Error::config(format!("Invalid METRICS_PORT '{}': {}", raw, e)))?,
            None => DEFAULT_METRICS_PORT,
        };

        let exec_timeout = match get("RESTORE_EXEC_TIMEOUT_SECS") {
            Some(raw) => {
                let secs = raw.trim().parse::<u64>().map_err(|e| {
                    Error::config(format!("Invalid RESTORE_EXEC_TIMEOUT_SECS '{}': {}", raw, e))
                })?;
                (secs > 0).then(|| Duration::from_secs(secs))
            }
            None => None,
        };

        let copy_failure_policy = match get("RESTORE_COPY_FAILURE_POLICY") {
            Some(raw) => raw.parse()?,
            None => CopyFailurePolicy::default(),
        };

        Ok(Self {
            metrics_port,
            restore: RestoreSettings {
                backup_volume_path: get("JENKINS_BACKUP_VOLUME_PATH")
                    .unwrap_or(defaults.backup_volume_path),
                jenkins_home: get("JENKINS_HOME").unwrap_or(defaults.jenkins_home),
                container: get("JENKINS_CONTAINER_NAME").unwrap_or(defaults.container),
                default_backup_config: get("DEFAULT_BACKUP_CONFIG")
                    .unwrap_or(defaults.default_backup_config),
                exec_timeout,
                copy_failure_policy,
            },
        })
    }
}
