use std::fmt::{self, Display, Formatter};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum VmxError {
    Config(String),
    Provider(String),
    Io(#[from] std::io::Error),
    Command(String),
}

impl Display for VmxError {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match self {
            VmxError::Config(s) => write!(f, "Configuration error: {}", s),
            VmxError::Provider(s) => write!(f, "Provider error: {}", s),
            VmxError::Io(e) => write!(f, "I/O error: {}", e),
            VmxError::Command(s) => write!(f, "Command failed: {}", s),
        }
    }
}

pub type Result<T> = std::result::Result<T, VmxError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_prefixes() {
        let err = VmxError::Config("bad key".to_string());
        assert_eq!(err.to_string(), "Configuration error: bad key");

        let err = VmxError::Command("vmrun list".to_string());
        assert_eq!(err.to_string(), "Command failed: vmrun list");
    }

    #[test]
    fn test_io_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err: VmxError = io.into();
        assert!(matches!(err, VmxError::Io(_)));
        assert!(err.to_string().starts_with("I/O error:"));
    }
}
