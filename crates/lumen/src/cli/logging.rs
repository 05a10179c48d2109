//! Tracing setup.
//!
//! The interactive UI owns the terminal, so it logs to a file. Headless
//! commands log warnings to stderr.

use std::ffi::OsStr;
use std::fs::{self, File, OpenOptions};
use std::io::{self, IsTerminal};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use lumen_core::Config;

const LOG_ENV: &str = "LUMEN_LOG";
const LOG_FILE_ENV: &str = "LUMEN_LOG_FILE";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Interactive,
    Headless,
}

impl Mode {
    /// Guess from the command line whether the terminal UI will run.
    pub fn detect() -> Self {
        let first = std::env::args_os().nth(1);
        Self::for_command(first.as_deref(), io::stdout().is_terminal())
    }

    fn for_command(first: Option<&OsStr>, stdout_is_terminal: bool) -> Self {
        match first.and_then(OsStr::to_str) {
            None | Some("filter") => Mode::Interactive,
            Some("run") if stdout_is_terminal => Mode::Interactive,
            _ => Mode::Headless,
        }
    }
}

pub fn init(config: &Config, mode: Mode) {
    match mode {
        Mode::Interactive => {
            let path = std::env::var_os(LOG_FILE_ENV)
                .map(PathBuf::from)
                .unwrap_or_else(|| config.log_path());

            // Without a writable log file the UI runs unlogged.
            let Ok(file) = open_log(&path) else {
                return;
            };

            tracing_subscriber::registry()
                .with(env_filter("lumen=info"))
                .with(fmt::layer().with_ansi(false).with_writer(Mutex::new(file)))
                .init();
        }
        Mode::Headless => {
            tracing_subscriber::registry()
                .with(env_filter("lumen=warn"))
                .with(fmt::layer().with_writer(io::stderr))
                .init();
        }
    }
}

fn env_filter(default: &str) -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(default))
}

fn open_log(path: &Path) -> io::Result<File> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    OpenOptions::new().create(true).append(true).open(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_follows_command() {
        let mode = |arg: Option<&str>, tty| Mode::for_command(arg.map(OsStr::new), tty);

        assert_eq!(mode(None, true), Mode::Interactive);
        assert_eq!(mode(Some("filter"), false), Mode::Interactive);
        assert_eq!(mode(Some("run"), true), Mode::Interactive);
        assert_eq!(mode(Some("run"), false), Mode::Headless);
        assert_eq!(mode(Some("extension"), true), Mode::Headless);
        assert_eq!(mode(Some("--help"), true), Mode::Headless);
    }

    #[test]
    fn test_open_log_creates_parent() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state").join("lumen.log");
        open_log(&path).unwrap();
        assert!(path.is_file());
    }
}
