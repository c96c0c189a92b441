//! Error types for inventory and control operations.

use std::path::PathBuf;
use thiserror::Error;
use vmx_config::ConfigError;
use vmx_core::error::VmxError;

/// Errors that can occur while driving guest machines.
#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("Not executable: {}", .0.display())]
    NotExecutable(PathBuf),

    #[error("Command failed: {0}")]
    CommandFailed(String),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

impl ProviderError {
    /// Convert provider error to user-friendly message with suggestions
    pub fn user_friendly(&self) -> String {
        match self {
            Self::NotExecutable(_) => format!(
                "{}\n💡 Set application_path in ~/.vmx/config.yaml to the hypervisor application bundle",
                self
            ),
            Self::IoError(e) if e.kind() == std::io::ErrorKind::PermissionDenied => {
                format!("{}\n💡 Check permissions of the machine directory", self)
            }
            _ => self.to_string(),
        }
    }
}

impl From<ProviderError> for VmxError {
    fn from(err: ProviderError) -> Self {
        match err {
            ProviderError::Config(e) => VmxError::Config(e.to_string()),
            ProviderError::IoError(e) => VmxError::Io(e),
            ProviderError::CommandFailed(s) => VmxError::Command(s),
            other => VmxError::Provider(other.to_string()),
        }
    }
}

pub type Result<T> = std::result::Result<T, ProviderError>;
