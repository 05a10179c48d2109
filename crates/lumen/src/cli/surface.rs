//! Extension subcommands.
//!
//! Each extension becomes `lumen <extension>`, each of its commands a nested
//! subcommand, and each param a `--<name>` flag. Values are gathered into a
//! JSON object and the raw command output goes to stdout.

use std::io::{self, Write};

use anyhow::Context;
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use serde_json::{Map, Value};

use lumen_core::{
    CommandSurface, Extension, ExtensionSurface, FlagKind, FlagSpec, LumenError, Resolver,
};
use lumen_platform::Platform;

/// Names clap reserves for itself.
const RESERVED: &[&str] = &["help"];

/// Append one subcommand per extension surface to `cli`. Extensions whose
/// name collides with an existing command are skipped.
pub fn attach(mut cli: Command, surfaces: &[ExtensionSurface]) -> Command {
    for surface in surfaces {
        if RESERVED.contains(&surface.name.as_str()) || cli.find_subcommand(&surface.name).is_some() {
            tracing::warn!(extension = %surface.name, "extension name shadows a built-in command, skipped");
            continue;
        }
        cli = cli.subcommand(extension_command(surface));
    }
    cli
}

fn extension_command(surface: &ExtensionSurface) -> Command {
    let mut command = Command::new(surface.name.clone())
        .about(surface.title.clone())
        .subcommand_required(true)
        .arg_required_else_help(true);
    if !surface.description.is_empty() {
        command = command.long_about(surface.description.clone());
    }

    command.subcommands(surface.commands.iter().map(command_subcommand))
}

fn command_subcommand(spec: &CommandSurface) -> Command {
    let about = if spec.title.is_empty() {
        spec.name.clone()
    } else {
        spec.title.clone()
    };

    let mut command = Command::new(spec.name.clone())
        .about(about)
        .hide(spec.hidden);
    if !spec.description.is_empty() {
        command = command.long_about(spec.description.clone());
    }

    command.args(spec.flags.iter().map(flag_arg))
}

fn flag_arg(flag: &FlagSpec) -> Arg {
    let arg = Arg::new(flag.name.clone())
        .long(flag.name.clone())
        .help(flag.description.clone())
        .required(flag.required)
        .action(ArgAction::Set);

    match flag.kind {
        FlagKind::String => {
            let arg = arg.value_parser(value_parser!(String));
            match flag.default.as_str() {
                Some(default) if !flag.required => arg.default_value(default.to_string()),
                _ => arg,
            }
        }
        FlagKind::Boolean => {
            // `--flag` alone means true; `--flag false` is accepted too.
            let arg = arg
                .value_parser(value_parser!(bool))
                .num_args(0..=1)
                .default_missing_value("true");
            if flag.required {
                arg
            } else if flag.default == Value::Bool(true) {
                arg.default_value("true")
            } else {
                arg.default_value("false")
            }
        }
    }
}

/// Gather the flag values of one command invocation.
fn params(spec: &CommandSurface, matches: &ArgMatches) -> Map<String, Value> {
    spec.flags
        .iter()
        .map(|flag| {
            let value = match flag.kind {
                FlagKind::String => matches
                    .get_one::<String>(&flag.name)
                    .cloned()
                    .map(Value::String),
                FlagKind::Boolean => matches.get_one::<bool>(&flag.name).copied().map(Value::Bool),
            };
            (flag.name.clone(), value.unwrap_or_else(|| flag.default.clone()))
        })
        .collect()
}

/// Run the extension command selected in `matches` and write its output.
pub fn invoke(extension: &Extension, platform: &Platform, matches: &ArgMatches) -> anyhow::Result<()> {
    let Some((name, sub)) = matches.subcommand() else {
        return Err(LumenError::Usage {
            message: format!("No command given for extension '{}'", extension.name),
        }
        .into());
    };

    let spec = CommandSurface::build(extension.command(name)?)?;
    let resolver = Resolver::new(platform.fetcher.clone());
    let output = extension
        .run(&resolver, name, params(&spec, sub))
        .with_context(|| format!("{}:{} failed", extension.name, name))?;

    let mut stdout = io::stdout().lock();
    stdout.write_all(&output)?;
    stdout.flush()?;
    Ok(())
}
