//! Headless command surface.
//!
//! Every registered extension becomes a CLI subcommand with one subcommand
//! per manifest command and one flag per param. The descriptors here are
//! validated eagerly and are independent of the argument parser; the binary
//! turns them into parser definitions.

use serde_json::Value;

use crate::error::{LumenError, LumenResult};
use crate::manifest::{Command, Param};
use crate::registry::{Extension, Registry};

/// Supported param types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlagKind {
    String,
    Boolean,
}

impl FlagKind {
    fn parse(command: &str, param: &Param) -> LumenResult<Self> {
        match param.kind.as_str() {
            "string" => Ok(FlagKind::String),
            "boolean" => Ok(FlagKind::Boolean),
            other => Err(LumenError::UnsupportedParamType {
                command: command.to_string(),
                param: param.name.clone(),
                kind: other.to_string(),
            }),
        }
    }
}

/// A single flag of a command.
#[derive(Debug, Clone, PartialEq)]
pub struct FlagSpec {
    pub name: String,
    pub kind: FlagKind,
    pub description: String,
    /// Value used when the flag is omitted: the declared default, else `""`
    /// or `false`.
    pub default: Value,
    pub required: bool,
}

impl FlagSpec {
    fn from_param(command: &str, param: &Param) -> LumenResult<Self> {
        let kind = FlagKind::parse(command, param)?;

        let default = match (kind, &param.default) {
            (FlagKind::String, None) => Value::String(String::new()),
            (FlagKind::Boolean, None) => Value::Bool(false),
            (FlagKind::String, Some(value @ Value::String(_)))
            | (FlagKind::Boolean, Some(value @ Value::Bool(_))) => value.clone(),
            (_, Some(value)) => {
                return Err(LumenError::InvalidDefault {
                    command: command.to_string(),
                    param: param.name.clone(),
                    value: value.clone(),
                })
            }
        };

        Ok(Self {
            name: param.name.clone(),
            kind,
            description: param.description.clone(),
            default,
            required: !param.optional,
        })
    }
}

/// Subcommand descriptor for one manifest command.
#[derive(Debug, Clone, PartialEq)]
pub struct CommandSurface {
    pub name: String,
    pub title: String,
    pub description: String,
    pub hidden: bool,
    pub flags: Vec<FlagSpec>,
}

impl CommandSurface {
    pub fn build(command: &Command) -> LumenResult<Self> {
        let flags = command
            .params
            .iter()
            .map(|param| FlagSpec::from_param(&command.name, param))
            .collect::<LumenResult<Vec<_>>>()?;

        Ok(Self {
            name: command.name.clone(),
            title: command.title.clone(),
            description: command.description.clone(),
            hidden: command.hidden,
            flags,
        })
    }
}

/// Subcommand descriptor for one extension.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtensionSurface {
    pub name: String,
    pub title: String,
    pub description: String,
    pub commands: Vec<CommandSurface>,
}

/// Build the surface of a single extension.
pub fn build_surface(extension: &Extension) -> LumenResult<ExtensionSurface> {
    let commands = extension
        .manifest
        .commands
        .values()
        .map(CommandSurface::build)
        .collect::<LumenResult<Vec<_>>>()?;

    Ok(ExtensionSurface {
        name: extension.name.clone(),
        title: extension.title().to_string(),
        description: extension.manifest.description.clone(),
        commands,
    })
}

/// Build the surfaces of every registered extension. The first invalid
/// command aborts the whole registration.
pub fn build_surfaces(registry: &Registry) -> LumenResult<Vec<ExtensionSurface>> {
    registry.iter().map(build_surface).collect()
}
