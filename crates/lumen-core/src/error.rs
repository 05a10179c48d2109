use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur in Lumen
#[derive(Debug, Error)]
pub enum LumenError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("No {manifest} found in {dir}")]
    ManifestNotFound { dir: PathBuf, manifest: &'static str },

    #[error("Ambiguous manifest in {dir}: found {}", format_paths(.candidates))]
    AmbiguousManifest {
        dir: PathBuf,
        candidates: Vec<PathBuf>,
    },

    #[error("Invalid manifest in {path}: {message}")]
    ManifestInvalid { path: PathBuf, message: String },

    #[error("Extension '{0}' not found")]
    ExtensionNotFound(String),

    #[error("Command '{command}' not found in extension '{extension}'")]
    CommandNotFound { extension: String, command: String },

    #[error("'{0}' declares neither an entrypoint nor subcommands")]
    NoEntrypoint(String),

    #[error("{message}")]
    Usage { message: String },

    #[error("Subcommand not found: {0}")]
    SubcommandNotFound(String),

    #[error("Resolution of '{0}' nests too deeply")]
    ResolutionDepth(String),

    #[error("Unsupported type '{kind}' for param '{param}' of command '{command}'")]
    UnsupportedParamType {
        command: String,
        param: String,
        kind: String,
    },

    #[error("Invalid default value for param '{param}' of command '{command}': {value}")]
    InvalidDefault {
        command: String,
        param: String,
        value: serde_json::Value,
    },

    #[error("Could not fetch script: {0}")]
    Fetch(String),

    #[error("Could not fetch script: HTTP {0}")]
    FetchStatus(u16),

    #[error("Failed to execute {program}: {source}")]
    Spawn {
        program: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{program} exited with status {code}: {stderr}")]
    ExitStatus {
        program: PathBuf,
        code: i32,
        stderr: String,
    },

    #[error("Invalid page output: {0}")]
    InvalidPage(String),

    #[error("No rows in input")]
    EmptyInput,

    #[error("Clipboard error: {0}")]
    Clipboard(String),

    #[error("Platform error: {0}")]
    Platform(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Config parse error: {0}")]
    TomlParse(#[from] toml::de::Error),
}

impl LumenError {
    /// Exit code the CLI reports for this error.
    ///
    /// Usage errors exit with 1, a failing child keeps its own code, and
    /// everything else exits with 2. A child exiting with 1 is therefore
    /// indistinguishable from a usage error by code alone; the usage message
    /// on stderr tells them apart.
    pub fn exit_code(&self) -> i32 {
        match self {
            LumenError::Usage { .. } => 1,
            LumenError::ExitStatus { code, .. } if *code != 0 => *code,
            _ => 2,
        }
    }
}

fn format_paths(paths: &[PathBuf]) -> String {
    paths
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Result type alias for Lumen operations
pub type LumenResult<T> = Result<T, LumenError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_usage_exit_code() {
        let err = LumenError::Usage {
            message: "No subcommand provided".to_string(),
        };
        assert_eq!(err.exit_code(), 1);
    }

    #[test]
    fn test_child_exit_code_is_propagated() {
        let err = LumenError::ExitStatus {
            program: PathBuf::from("script.sh"),
            code: 42,
            stderr: String::new(),
        };
        assert_eq!(err.exit_code(), 42);
        assert_eq!(LumenError::SubcommandNotFound("x".into()).exit_code(), 2);
    }

    #[test]
    fn test_child_exit_code_one_matches_usage_code() {
        let child = LumenError::ExitStatus {
            program: PathBuf::from("script.sh"),
            code: 1,
            stderr: "bad flag".to_string(),
        };
        let usage = LumenError::Usage {
            message: "No subcommand provided".to_string(),
        };
        assert_eq!(child.exit_code(), usage.exit_code());
        assert_ne!(child.to_string(), usage.to_string());
    }

    #[test]
    fn test_ambiguous_message_lists_candidates() {
        let err = LumenError::AmbiguousManifest {
            dir: PathBuf::from("/ext"),
            candidates: vec![PathBuf::from("/ext/a/lumen.json"), PathBuf::from("/ext/b/lumen.json")],
        };
        let message = err.to_string();
        assert!(message.contains("/ext/a/lumen.json"));
        assert!(message.contains("/ext/b/lumen.json"));
    }
}
