use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use crate::error::{ProviderError, Result};
use crate::vmrun::ControlUtility;

/// A control utility call recorded by [`MockControl`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockCall {
    Start { path: PathBuf, headless: bool },
    Stop(PathBuf),
    Suspend(PathBuf),
}

/// In-memory stand-in for `vmrun`: tracks which machines run and records
/// every state change asked of it.
#[derive(Debug, Default)]
pub struct MockControl {
    running: Mutex<Vec<PathBuf>>,
    calls: Mutex<Vec<MockCall>>,
    failure: Mutex<Option<String>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl MockControl {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_running<I, P>(paths: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        let mock = Self::default();
        *lock(&mock.running) = paths.into_iter().map(Into::into).collect();
        mock
    }

    /// Make every following state change fail with `message`.
    pub fn fail_with(&self, message: impl Into<String>) {
        *lock(&self.failure) = Some(message.into());
    }

    pub fn calls(&self) -> Vec<MockCall> {
        lock(&self.calls).clone()
    }

    fn record(&self, call: MockCall) -> Result<()> {
        if let Some(message) = lock(&self.failure).clone() {
            return Err(ProviderError::CommandFailed(message));
        }
        lock(&self.calls).push(call);
        Ok(())
    }
}

impl ControlUtility for MockControl {
    fn running_vms(&self) -> Result<Vec<PathBuf>> {
        Ok(lock(&self.running).clone())
    }

    fn start(&self, path: &Path, headless: bool) -> Result<()> {
        self.record(MockCall::Start {
            path: path.to_path_buf(),
            headless,
        })?;
        lock(&self.running).push(path.to_path_buf());
        Ok(())
    }

    fn stop(&self, path: &Path) -> Result<()> {
        self.record(MockCall::Stop(path.to_path_buf()))?;
        lock(&self.running).retain(|p| p != path);
        Ok(())
    }

    fn suspend(&self, path: &Path) -> Result<()> {
        self.record(MockCall::Suspend(path.to_path_buf()))?;
        lock(&self.running).retain(|p| p != path);
        Ok(())
    }
}
