//! Custom Resource Definitions for the Jenkins Restore Operator

mod backup;
mod backup_config;
mod jenkins;
mod restore;

pub use backup::*;
pub use backup_config::*;
pub use jenkins::*;
pub use restore::*;

use kube::CustomResourceExt;

/// Generate all CRD YAML manifests
pub fn generate_crds() -> Result<Vec<String>, serde_yaml::Error> {
    Ok(vec![
        serde_yaml::to_string(&Restore::crd())?,
        serde_yaml::to_string(&Backup::crd())?,
        serde_yaml::to_string(&BackupConfig::crd())?,
        serde_yaml::to_string(&Jenkins::crd())?,
    ])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backup_config_name_defaults_when_absent_or_empty() {
        let mut backup = Backup::new("b1", BackupSpec { config_ref: None });
        assert_eq!(backup.config_name("default"), "default");

        backup.spec.config_ref = Some(String::new());
        assert_eq!(backup.config_name("default"), "default");

        backup.spec.config_ref = Some("nightly".to_string());
        assert_eq!(backup.config_name("default"), "nightly");
    }

    #[test]
    fn test_jenkins_deployment_name() {
        let jenkins = Jenkins::new("j1", JenkinsSpec::default());
        assert_eq!(jenkins.deployment_name(), "jenkins-j1");
    }

    #[test]
    fn test_backup_options_default_to_false() {
        let spec: BackupConfigSpec =
            serde_json::from_value(serde_json::json!({ "jenkinsRef": "j1", "options": { "jobs": true } }))
                .unwrap();
        assert_eq!(
            spec.options,
            BackupOptions {
                config: false,
                jobs: true,
                plugins: false
            }
        );
    }

    #[test]
    fn test_generate_crds_renders_all_kinds() {
        let crds = generate_crds().unwrap();
        assert_eq!(crds.len(), 4);
        assert!(crds[0].contains("restores.jenkins.io"));
        assert!(crds[3].contains("jenkins.jenkins.io"));
    }
}
