//! Recording executor used by tests

use std::collections::HashSet;
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use async_trait::async_trait;
use k8s_openapi::api::core::v1::Pod;
use kube::ResourceExt;

use crate::error::{Error, Result};

use super::exec::RemoteExecutor;

/// A command issued through [`RecordingExecutor`]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RecordedCommand {
    pub pod: String,
    pub label: String,
    pub command: String,
}

/// Executor that records every call instead of reaching a pod
#[derive(Default)]
pub struct RecordingExecutor {
    calls: Mutex<Vec<RecordedCommand>>,
    init_calls: Mutex<usize>,
    failing_calls: HashSet<usize>,
    fail_init: bool,
    delay: Option<Duration>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl RecordingExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail the call with the given zero-based index
    pub fn failing_on(mut self, call_index: usize) -> Self {
        self.failing_calls.insert(call_index);
        self
    }

    /// Fail `init`
    pub fn failing_init(mut self) -> Self {
        self.fail_init = true;
        self
    }

    /// Sleep this long inside every `run`
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Commands issued so far, in order
    pub fn calls(&self) -> Vec<RecordedCommand> {
        lock(&self.calls).clone()
    }

    /// Just the command strings issued so far
    pub fn commands(&self) -> Vec<String> {
        lock(&self.calls).iter().map(|c| c.command.clone()).collect()
    }

    pub fn init_count(&self) -> usize {
        *lock(&self.init_calls)
    }
}

#[async_trait]
impl RemoteExecutor for RecordingExecutor {
    async fn init(&self) -> Result<()> {
        *lock(&self.init_calls) += 1;
        if self.fail_init {
            return Err(Error::exec("exec client initialization failed"));
        }
        Ok(())
    }

    async fn run(&self, target: &Pod, label: &str, command: &str) -> Result<()> {
        let index = {
            let mut calls = lock(&self.calls);
            calls.push(RecordedCommand {
                pod: target.name_any(),
                label: label.to_string(),
                command: command.to_string(),
            });
            calls.len() - 1
        };

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        if self.failing_calls.contains(&index) {
            return Err(Error::exec(format!("command {} failed: {}", index, command)));
        }
        Ok(())
    }
}
