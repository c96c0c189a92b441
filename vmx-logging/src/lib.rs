use std::{
    env,
    io::{self, Write},
    path::{Path, PathBuf},
};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt::MakeWriter, prelude::*, registry, EnvFilter};

// --- Custom "Tee" Writer ---
struct Tee<A, B> {
    a: A,
    b: B,
}

impl<A, B> Write for Tee<A, B>
where
    A: Write,
    B: Write,
{
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let res_a = self.a.write(buf);
        let res_b = self.b.write(buf);
        res_a.or(res_b)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.a.flush()?;
        self.b.flush()
    }
}

#[derive(Clone)]
struct MakeTee<A, B> {
    make_a: A,
    make_b: B,
}

impl<'a, A, B, W1, W2> MakeWriter<'a> for MakeTee<A, B>
where
    A: MakeWriter<'a, Writer = W1>,
    B: MakeWriter<'a, Writer = W2>,
    W1: Write + 'a,
    W2: Write + 'a,
{
    type Writer = Tee<W1, W2>;
    fn make_writer(&'a self) -> Self::Writer {
        Tee {
            a: self.make_a.make_writer(),
            b: self.make_b.make_writer(),
        }
    }
}

/// Where log lines go.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogOutput {
    Console,
    File,
    Both,
    None,
}

impl LogOutput {
    fn parse(value: &str) -> Self {
        match value {
            "console" => LogOutput::Console,
            "file" => LogOutput::File,
            "both" => LogOutput::Both,
            _ => LogOutput::None,
        }
    }

    fn console(self) -> bool {
        matches!(self, LogOutput::Console | LogOutput::Both)
    }

    fn file(self) -> bool {
        matches!(self, LogOutput::File | LogOutput::Both)
    }
}

/// Logging settings read from `VMX_LOG_*` environment variables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogSettings {
    pub level: String,
    pub output: LogOutput,
    pub json: bool,
    pub file_path: PathBuf,
}

impl LogSettings {
    pub fn from_env() -> Self {
        let level = env::var("VMX_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());
        let output = env::var("VMX_LOG_OUTPUT").unwrap_or_else(|_| "console".to_string());
        let format = env::var("VMX_LOG_FORMAT").unwrap_or_else(|_| "human".to_string());
        let file_path = env::var("VMX_LOG_FILE").unwrap_or_else(|_| "/tmp/vmx.log".to_string());

        Self {
            level,
            output: LogOutput::parse(&output),
            json: format == "json",
            file_path: PathBuf::from(file_path),
        }
    }

    fn file_parts(&self) -> (&Path, &Path) {
        let dir = self.file_path.parent().unwrap_or_else(|| Path::new("/tmp"));
        let name = self
            .file_path
            .file_name()
            .map(Path::new)
            .unwrap_or_else(|| Path::new("vmx.log"));
        (dir, name)
    }
}

/// Initializes the global tracing subscriber based on environment variables.
///
/// `RUST_LOG` wins over `VMX_LOG_LEVEL` when set. The returned guard must be
/// held for as long as file logging should keep flushing. Calling this twice
/// in one process is a no-op the second time.
pub fn init_subscriber() -> Option<WorkerGuard> {
    init_with(&LogSettings::from_env())
}

pub fn init_with(settings: &LogSettings) -> Option<WorkerGuard> {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&settings.level));

    let subscriber = registry().with(env_filter);
    let mut guard: Option<WorkerGuard> = None;
    let (log_dir, log_filename) = settings.file_parts();

    let result = if settings.output.console() && settings.output.file() {
        let file_appender = tracing_appender::rolling::daily(log_dir, log_filename);
        let (non_blocking, file_guard) = tracing_appender::non_blocking(file_appender);
        guard = Some(file_guard);

        let tee_writer = MakeTee {
            make_a: std::io::stderr,
            make_b: non_blocking,
        };

        let fmt_layer = tracing_subscriber::fmt::layer().with_writer(tee_writer);
        if settings.json {
            subscriber.with(fmt_layer.json()).try_init()
        } else {
            subscriber.with(fmt_layer).try_init()
        }
    } else if settings.output.console() {
        let fmt_layer = tracing_subscriber::fmt::layer().with_writer(std::io::stderr);
        if settings.json {
            subscriber.with(fmt_layer.json()).try_init()
        } else {
            subscriber.with(fmt_layer).try_init()
        }
    } else if settings.output.file() {
        let file_appender = tracing_appender::rolling::daily(log_dir, log_filename);
        let (non_blocking, file_guard) = tracing_appender::non_blocking(file_appender);
        guard = Some(file_guard);

        let fmt_layer = tracing_subscriber::fmt::layer()
            .with_ansi(false)
            .with_writer(non_blocking);
        if settings.json {
            subscriber.with(fmt_layer.json()).try_init()
        } else {
            subscriber.with(fmt_layer).try_init()
        }
    } else {
        subscriber.try_init()
    };

    if result.is_err() {
        // A subscriber was already installed; keep it.
        return None;
    }

    guard
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    fn clear_env() {
        for key in [
            "VMX_LOG_LEVEL",
            "VMX_LOG_OUTPUT",
            "VMX_LOG_FORMAT",
            "VMX_LOG_FILE",
        ] {
            env::remove_var(key);
        }
    }

    #[test]
    #[serial]
    fn test_settings_defaults() {
        clear_env();
        let settings = LogSettings::from_env();
        assert_eq!(settings.level, "info");
        assert_eq!(settings.output, LogOutput::Console);
        assert!(!settings.json);
        assert_eq!(settings.file_path, PathBuf::from("/tmp/vmx.log"));
    }

    #[test]
    #[serial]
    fn test_settings_from_env() {
        clear_env();
        env::set_var("VMX_LOG_LEVEL", "debug");
        env::set_var("VMX_LOG_OUTPUT", "both");
        env::set_var("VMX_LOG_FORMAT", "json");
        env::set_var("VMX_LOG_FILE", "/var/tmp/inventory.log");

        let settings = LogSettings::from_env();
        assert_eq!(settings.level, "debug");
        assert_eq!(settings.output, LogOutput::Both);
        assert!(settings.json);

        let (dir, name) = settings.file_parts();
        assert_eq!(dir, Path::new("/var/tmp"));
        assert_eq!(name, Path::new("inventory.log"));
        clear_env();
    }

    #[test]
    #[serial]
    fn test_unknown_output_disables_writers() {
        clear_env();
        env::set_var("VMX_LOG_OUTPUT", "syslog");
        assert_eq!(LogSettings::from_env().output, LogOutput::None);
        clear_env();
    }

    #[test]
    #[serial]
    fn test_second_init_is_noop() {
        let settings = LogSettings {
            level: "warn".to_string(),
            output: LogOutput::None,
            json: false,
            file_path: PathBuf::from("/tmp/vmx-test.log"),
        };
        let _ = init_with(&settings);
        assert!(init_with(&settings).is_none());
        tracing::warn!("still logging after second init");
    }
}
