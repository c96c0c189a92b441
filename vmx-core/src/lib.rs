pub mod command;
pub mod error;
pub mod file_system;

pub use command::{run_captured, CommandOutput};
pub use error::{Result, VmxError};
