//! Extension manifest parsing.
//!
//! Each extension ships a `lumen.json` manifest that defines:
//! - Extension metadata (title, description)
//! - Root items seeding the launcher's top-level list
//! - Commands with their typed params
//! - How the extension is executed: a direct `entrypoint`, or a map of
//!   `subcommands` each with its own entrypoint

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{LumenError, LumenResult};

/// Canonical manifest file name.
pub const MANIFEST_NAME: &str = "lumen.json";

/// Complete extension manifest parsed from `lumen.json`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Manifest {
    /// Human-readable display name.
    #[serde(default)]
    pub title: String,

    /// Short description.
    #[serde(default)]
    pub description: String,

    /// Execution entry used when the manifest itself is run.
    #[serde(flatten)]
    pub entry: Entry,

    /// Entries added to the root list.
    #[serde(default)]
    pub root_items: Vec<RootItem>,

    /// Commands keyed by name.
    #[serde(default)]
    pub commands: BTreeMap<String, Command>,
}

impl Manifest {
    /// Load and parse a manifest file.
    pub fn load(path: &Path) -> LumenResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::parse(&content).map_err(|e| LumenError::ManifestInvalid {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    /// Parse manifest JSON. Commands without an explicit `name` take their key.
    pub fn parse(content: &str) -> Result<Self, serde_json::Error> {
        let mut manifest: Manifest = serde_json::from_str(content)?;
        for (key, command) in manifest.commands.iter_mut() {
            if command.name.is_empty() {
                command.name = key.clone();
            }
        }
        Ok(manifest)
    }

    pub fn command(&self, name: &str) -> Option<&Command> {
        self.commands.get(name)
    }
}

/// How something is executed: one direct entrypoint, or a dispatcher over
/// named subcommands.
///
/// The two are mutually exclusive; when both are declared the entrypoint is
/// used.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entrypoint: Option<String>,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub subcommands: BTreeMap<String, Subcommand>,
}

impl Entry {
    pub fn is_empty(&self) -> bool {
        self.entrypoint.is_none() && self.subcommands.is_empty()
    }
}

/// A dispatcher target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subcommand {
    pub entrypoint: String,
}

/// A manifest-declared entry of the root list.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RootItem {
    /// Owning extension. Filled in by the registry for manifest items.
    #[serde(default)]
    pub extension: String,

    pub command: String,

    /// Params bound when the item is run.
    #[serde(default)]
    pub with: Map<String, Value>,

    pub title: String,
}

/// Command configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Command {
    /// Command identifier, unique within the extension.
    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub title: String,

    #[serde(default)]
    pub description: String,

    /// Hidden commands are invokable but not listed in help.
    #[serde(default)]
    pub hidden: bool,

    #[serde(flatten)]
    pub entry: Entry,

    #[serde(default)]
    pub params: Vec<Param>,
}

/// A command parameter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Param {
    pub name: String,

    /// Declared type. Only `string` and `boolean` are supported; anything
    /// else is rejected when the command surface is built.
    #[serde(rename = "type")]
    pub kind: String,

    #[serde(default)]
    pub description: String,

    #[serde(default)]
    pub default: Option<Value>,

    #[serde(default)]
    pub optional: bool,
}
