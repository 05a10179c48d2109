//! Extension registry.
//!
//! Extensions are discovered once at startup, from every subdirectory of
//! `<data_dir>/extensions` and from the `[extensions]` table of the config
//! file. The registry is read-only afterwards.

use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::config::Config;
use crate::error::{LumenError, LumenResult};
use crate::manifest::{Command, Manifest, MANIFEST_NAME};
use crate::resolver::{locate_manifest, Origin, Resolved, Resolver};
use crate::runner;

/// Payload written to a command's stdin.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommandInput {
    pub command: String,
    #[serde(default)]
    pub params: Map<String, Value>,
}

/// A registered extension.
#[derive(Debug, Clone)]
pub struct Extension {
    pub name: String,
    pub manifest: Manifest,
    pub manifest_path: PathBuf,
}

impl Extension {
    /// Load an extension from a directory or a manifest file.
    pub fn load(name: &str, origin: &Path) -> LumenResult<Self> {
        let manifest_path = if origin.is_dir() {
            locate_manifest(origin)?
        } else if origin.file_name().and_then(|n| n.to_str()) == Some(MANIFEST_NAME) {
            origin.to_path_buf()
        } else {
            return Err(LumenError::ManifestNotFound {
                dir: origin.to_path_buf(),
                manifest: MANIFEST_NAME,
            });
        };

        let manifest = Manifest::load(&manifest_path)?;
        Ok(Self::new(name, manifest, manifest_path))
    }

    pub fn new(name: impl Into<String>, manifest: Manifest, manifest_path: PathBuf) -> Self {
        Self {
            name: name.into(),
            manifest,
            manifest_path,
        }
    }

    /// Directory the manifest lives in; entrypoints are relative to it.
    pub fn dir(&self) -> &Path {
        self.manifest_path.parent().unwrap_or(Path::new(""))
    }

    /// Display title, falling back to the extension name.
    pub fn title(&self) -> &str {
        if self.manifest.title.is_empty() {
            &self.name
        } else {
            &self.manifest.title
        }
    }

    pub fn command(&self, name: &str) -> LumenResult<&Command> {
        self.manifest
            .command(name)
            .ok_or_else(|| LumenError::CommandNotFound {
                extension: self.name.clone(),
                command: name.to_string(),
            })
    }

    /// Resolve a command into an invocation.
    ///
    /// The command's own entrypoint runs without arguments. Any other entry,
    /// the command's own subcommands or the manifest-level entry, gets the
    /// command name as its first argument, which also selects the subcommand
    /// of a dispatcher. The params travel as JSON on stdin.
    pub fn resolve_command(
        &self,
        resolver: &Resolver,
        command: &str,
        params: Map<String, Value>,
    ) -> LumenResult<Resolved> {
        let spec = self.command(command)?;
        let dir = self.dir().to_path_buf();
        let label = format!("{}:{}", self.name, spec.name);

        let (origin, args) = if spec.entry.entrypoint.is_some() {
            (Origin::from_entry(&spec.entry, dir, &label)?, Vec::new())
        } else if !spec.entry.subcommands.is_empty() {
            (
                Origin::from_entry(&spec.entry, dir, &label)?,
                vec![spec.name.clone()],
            )
        } else if !self.manifest.entry.is_empty() {
            (
                Origin::from_entry(&self.manifest.entry, dir, &label)?,
                vec![spec.name.clone()],
            )
        } else {
            return Err(LumenError::NoEntrypoint(label));
        };

        let input = serde_json::to_vec(&CommandInput {
            command: spec.name.clone(),
            params,
        })?;

        let mut resolved = resolver.resolve_origin(origin, args, Some(input))?;
        resolved
            .invocation
            .env
            .insert("LUMEN_EXTENSION".to_string(), self.name.clone());
        resolved
            .invocation
            .env
            .insert("LUMEN_COMMAND".to_string(), spec.name.clone());
        Ok(resolved)
    }

    /// Resolve and run a command, returning its stdout.
    pub fn run(
        &self,
        resolver: &Resolver,
        command: &str,
        params: Map<String, Value>,
    ) -> LumenResult<Vec<u8>> {
        let resolved = self.resolve_command(resolver, command, params)?;
        tracing::info!(extension = %self.name, command, "running command");
        runner::run(&resolved.invocation)
    }
}

/// An entry of the root list, bound to an extension command.
#[derive(Debug, Clone, PartialEq)]
pub struct RootEntry {
    /// History key: `<extension>:<title>`, or `config:<title>` for items
    /// declared in the config file. Repeated keys get a `#2`, `#3`, ..
    /// suffix in list order.
    pub id: String,
    pub title: String,
    pub extension: String,
    pub command: String,
    pub params: Map<String, Value>,
}

/// All registered extensions, keyed by name.
#[derive(Debug, Clone, Default)]
pub struct Registry {
    extensions: BTreeMap<String, Extension>,
}

impl Registry {
    /// Discover every extension. Any broken manifest aborts the load.
    pub fn load(config: &Config) -> LumenResult<Self> {
        let mut extensions = Vec::new();

        let dir = config.extensions_dir();
        if dir.is_dir() {
            let mut entries: Vec<_> = std::fs::read_dir(&dir)?
                .filter_map(|e| e.ok())
                .filter(|e| e.path().is_dir())
                .collect();
            entries.sort_by_key(|e| e.file_name());

            for entry in entries {
                let name = entry.file_name().to_string_lossy().into_owned();
                if name.starts_with('.') {
                    continue;
                }
                extensions.push(Extension::load(&name, &entry.path())?);
            }
        }

        for (name, origin) in config.extension_origins() {
            extensions.push(Extension::load(name, &origin)?);
        }

        let registry = Self::from_extensions(extensions);
        tracing::debug!(count = registry.len(), "loaded extensions");
        Ok(registry)
    }

    /// Build a registry from already loaded extensions. Later entries
    /// replace earlier ones with the same name.
    pub fn from_extensions(extensions: impl IntoIterator<Item = Extension>) -> Self {
        let extensions = extensions
            .into_iter()
            .map(|e| (e.name.clone(), e))
            .collect();
        Self { extensions }
    }

    pub fn get(&self, name: &str) -> LumenResult<&Extension> {
        self.extensions
            .get(name)
            .ok_or_else(|| LumenError::ExtensionNotFound(name.to_string()))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Extension> {
        self.extensions.values()
    }

    pub fn len(&self) -> usize {
        self.extensions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.extensions.is_empty()
    }

    /// Root list entries: manifest root items first, in registry order, then
    /// the extra items declared in the config file.
    pub fn root_entries(&self, extra: &[crate::manifest::RootItem]) -> Vec<RootEntry> {
        let mut entries = Vec::new();

        for extension in self.iter() {
            for item in &extension.manifest.root_items {
                let owner = if item.extension.is_empty() {
                    extension.name.clone()
                } else {
                    item.extension.clone()
                };
                entries.push(RootEntry {
                    id: format!("{}:{}", extension.name, item.title),
                    title: item.title.clone(),
                    extension: owner,
                    command: item.command.clone(),
                    params: item.with.clone(),
                });
            }
        }

        for item in extra {
            if !self.extensions.contains_key(&item.extension) {
                tracing::warn!(extension = %item.extension, title = %item.title, "skipping root item of unknown extension");
                continue;
            }
            entries.push(RootEntry {
                id: format!("config:{}", item.title),
                title: item.title.clone(),
                extension: item.extension.clone(),
                command: item.command.clone(),
                params: item.with.clone(),
            });
        }

        let mut taken = HashSet::new();
        for entry in &mut entries {
            let base = entry.id.clone();
            let mut n = 1;
            while !taken.insert(entry.id.clone()) {
                n += 1;
                entry.id = format!("{}#{}", base, n);
            }
        }

        entries
    }
}
