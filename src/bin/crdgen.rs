//! CRD YAML Generator
//!
//! This binary generates Kubernetes CRD manifests for all custom resources
//! read by the jenkins-restore-operator.
//!
//! Usage: cargo run --bin crdgen > deploy/crds/all.yaml

use jenkins_restore_operator::crd::generate_crds;

fn main() -> anyhow::Result<()> {
    for crd in generate_crds()? {
        println!("---");
        print!("{}", crd);
    }
    Ok(())
}
