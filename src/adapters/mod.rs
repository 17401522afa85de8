//! Adapters between the restore logic and the cluster
//!
//! Object lookups and remote command execution are capabilities with a live
//! Kubernetes implementation and an in-memory one for tests.

mod exec;
mod memory;
mod recording;
mod resolver;
pub mod selector;

pub use exec::*;
pub use memory::*;
pub use recording::*;
pub use resolver::*;
