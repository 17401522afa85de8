//! Restore plan construction
//!
//! Turns the BackupConfig options into the ordered list of copies to run in
//! the Jenkins pod. The order is always config, jobs, plugins.

use std::fmt;

use crate::crd::BackupOptions;

/// Part of JENKINS_HOME restored by one copy
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Subtree {
    Config,
    Jobs,
    Plugins,
}

impl Subtree {
    pub fn as_str(&self) -> &'static str {
        match self {
            Subtree::Config => "config",
            Subtree::Jobs => "jobs",
            Subtree::Plugins => "plugins",
        }
    }
}

impl fmt::Display for Subtree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single recursive copy from the backup volume into JENKINS_HOME
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CopyOperation {
    pub subtree: Subtree,
    pub source: String,
    pub destination: String,
}

impl CopyOperation {
    /// Shell command performing the copy
    pub fn command(&self) -> String {
        format!("cp -r {} {}", self.source, self.destination)
    }
}

/// Build the copy plan for `backup_name`
///
/// Sources live under `<storage_root>/<backup_name>`, destinations under
/// `destination_root`. No option set yields an empty plan.
pub fn build_plan(
    options: &BackupOptions,
    backup_name: &str,
    storage_root: &str,
    destination_root: &str,
) -> Vec<CopyOperation> {
    let source_root = format!("{}/{}", storage_root.trim_end_matches('/'), backup_name);
    let destination_root = destination_root.trim_end_matches('/');

    let mut plan = Vec::with_capacity(3);
    if options.config {
        plan.push(CopyOperation {
            subtree: Subtree::Config,
            source: format!("{}/*.xml", source_root),
            destination: format!("{}/", destination_root),
        });
    }
    for (enabled, subtree) in [
        (options.jobs, Subtree::Jobs),
        (options.plugins, Subtree::Plugins),
    ] {
        if enabled {
            plan.push(CopyOperation {
                subtree,
                source: format!("{}/{}", source_root, subtree),
                destination: format!("{}/{}", destination_root, subtree),
            });
        }
    }
    plan
}
