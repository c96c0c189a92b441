//! Captured execution of external programs.
//!
//! Control utilities report their results through exit status and a few
//! lines of text, so commands here are run to completion with both streams
//! captured instead of streamed to the console.

// Standard library
use std::ffi::OsStr;
use std::path::Path;

// External crates
use crate::error::{Result, VmxError};
use duct::cmd;
use tracing::debug;

/// Exit status and decoded output of a finished command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutput {
    pub status: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.status == Some(0)
    }

    /// Stdout followed by stderr, each right-trimmed and newline terminated.
    /// Empty streams are left out.
    pub fn combined(&self) -> String {
        let mut message = String::new();
        for stream in [&self.stdout, &self.stderr] {
            let trimmed = stream.trim_end();
            if !trimmed.is_empty() {
                message.push_str(trimmed);
                message.push('\n');
            }
        }
        message
    }
}

/// Run `program` with `args`, waiting for it to exit.
///
/// A non-zero exit is not an error here; callers inspect
/// [`CommandOutput::success`] and decide. Failure to spawn is.
pub fn run_captured<A: AsRef<OsStr>>(program: &Path, args: &[A]) -> Result<CommandOutput> {
    let full_command = format!(
        "{} {}",
        program.display(),
        args.iter()
            .map(|a| a.as_ref().to_string_lossy())
            .collect::<Vec<_>>()
            .join(" ")
    );
    debug!(command = %full_command, "running command");

    let output = cmd(program, args)
        .stdin_null()
        .stdout_capture()
        .stderr_capture()
        .unchecked()
        .run()
        .map_err(|e| VmxError::Command(format!("{}: {}", full_command, e)))?;

    Ok(CommandOutput {
        status: output.status.code(),
        stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
        stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_combined_skips_empty_streams() {
        let output = CommandOutput {
            status: Some(1),
            stdout: String::new(),
            stderr: "Error: vm not found\n\n".to_string(),
        };
        assert!(!output.success());
        assert_eq!(output.combined(), "Error: vm not found\n");
    }

    #[test]
    fn test_combined_orders_stdout_first() {
        let output = CommandOutput {
            status: Some(0),
            stdout: "out  \n".to_string(),
            stderr: "err".to_string(),
        };
        assert!(output.success());
        assert_eq!(output.combined(), "out\nerr\n");
    }

    #[cfg(unix)]
    #[test]
    fn test_run_captured_reports_exit_code() {
        let output = run_captured(Path::new("/bin/sh"), &["-c", "echo hello; exit 3"]).unwrap();
        assert_eq!(output.status, Some(3));
        assert_eq!(output.stdout.trim(), "hello");
    }

    #[test]
    fn test_run_captured_missing_program() {
        let result = run_captured(Path::new("/nonexistent/vmx-test-binary"), &["list"]);
        assert!(matches!(result, Err(VmxError::Command(_))));
    }
}
