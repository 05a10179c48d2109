use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::LumenResult;
use crate::manifest::RootItem;

const APP_DIR: &str = "lumen";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub paths: PathsConfig,
    /// Extra extensions keyed by name, pointing at a directory or manifest.
    pub extensions: BTreeMap<String, String>,
    /// Extra entries for the root list.
    pub root_items: Vec<RootItem>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    pub state_dir: Option<String>,
    pub data_dir: Option<String>,
}

impl Config {
    /// Get the config file path
    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| home_fallback(".config"))
            .join(APP_DIR)
            .join("config.toml")
    }

    /// Load config from the default location, or return defaults if not found
    pub fn load() -> LumenResult<Self> {
        Self::load_from(&Self::config_path())
    }

    /// Load config from `path`. A missing file yields defaults, a broken one
    /// is an error.
    pub fn load_from(path: &Path) -> LumenResult<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Directory for history and logs (`~/.local/state/lumen` on Linux).
    pub fn state_dir(&self) -> PathBuf {
        match self.paths.state_dir {
            Some(ref dir) => expand(dir),
            None => dirs::state_dir()
                .unwrap_or_else(|| home_fallback(".local/state"))
                .join(APP_DIR),
        }
    }

    /// Directory holding installed extensions (`~/.local/share/lumen`).
    pub fn data_dir(&self) -> PathBuf {
        match self.paths.data_dir {
            Some(ref dir) => expand(dir),
            None => dirs::data_dir()
                .unwrap_or_else(|| home_fallback(".local/share"))
                .join(APP_DIR),
        }
    }

    pub fn history_path(&self) -> PathBuf {
        self.state_dir().join("history.json")
    }

    pub fn log_path(&self) -> PathBuf {
        self.state_dir().join("lumen.log")
    }

    pub fn extensions_dir(&self) -> PathBuf {
        self.data_dir().join("extensions")
    }

    /// Configured extension origins with `~` expanded.
    pub fn extension_origins(&self) -> impl Iterator<Item = (&str, PathBuf)> {
        self.extensions
            .iter()
            .map(|(name, origin)| (name.as_str(), expand(origin)))
    }
}

fn expand(path: &str) -> PathBuf {
    PathBuf::from(shellexpand::tilde(path).into_owned())
}

fn home_fallback(relative: &str) -> PathBuf {
    dirs::home_dir()
        .map(|h| h.join(relative))
        .unwrap_or_else(|| PathBuf::from("/tmp"))
}
