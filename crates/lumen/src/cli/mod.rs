//! Command-line interface.
//!
//! The core commands are declared with clap's derive API. Every registered
//! extension is appended to the same parser as a builder-made subcommand, so
//! `lumen <extension> <command> --<param> ..` runs headless.

mod extension;
mod filter;
mod logging;
mod run;
mod surface;

use std::sync::Arc;

use anyhow::Context;
use clap::{CommandFactory, FromArgMatches, Parser, Subcommand};

use lumen_core::{build_surfaces, Config, HistoryStore, Registry};
use lumen_platform::Platform;
use lumen_tui::{Model, Page, Session};

#[derive(Parser)]
#[command(name = "lumen", version)]
#[command(about = "Terminal command launcher", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run a script URL, extension directory, manifest, or executable
    Run {
        /// Where the program comes from
        origin: String,

        /// Arguments passed to the resolved program
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        args: Vec<String>,
    },

    /// Pick one of the rows read from stdin and print it
    Filter(filter::FilterArgs),

    /// Inspect registered extensions
    Extension {
        #[command(subcommand)]
        what: ExtensionCommands,
    },
}

#[derive(Subcommand)]
pub enum ExtensionCommands {
    /// List registered extensions
    List,
}

/// Parse the command line and run the chosen command. Without a command the
/// interactive root list opens.
pub fn run() -> anyhow::Result<()> {
    let config = Config::load().context("failed to load config")?;
    logging::init(&config, logging::Mode::detect());

    let registry = Registry::load(&config).context("failed to load extensions")?;
    let surfaces =
        build_surfaces(&registry).context("failed to register extension commands")?;
    let matches = surface::attach(Cli::command(), &surfaces).get_matches();

    let platform = Platform::current();

    if let Some((name, sub)) = matches.subcommand() {
        if !Commands::has_subcommand(name) {
            let extension = registry.get(name)?;
            return surface::invoke(extension, &platform, sub);
        }
    }

    let cli = Cli::from_arg_matches(&matches).unwrap_or_else(|e| e.exit());
    match cli.command {
        None => {
            let history = HistoryStore::load(config.history_path());
            let session = Session::new(registry, platform, history);
            let root = lumen_tui::root_page(&session, &config.root_items);
            interactive(session, root)
        }
        Some(Commands::Run { origin, args }) => run::run(platform, &origin, args),
        Some(Commands::Filter(args)) => filter::run(platform, args),
        Some(Commands::Extension {
            what: ExtensionCommands::List,
        }) => extension::list(&registry),
    }
}

/// Drive the terminal UI from `root` and print whatever it asked to print.
fn interactive(session: Arc<Session>, root: Page) -> anyhow::Result<()> {
    let model = Model::new(session, root);
    if let Some(output) = lumen_tui::run(model).context("terminal UI failed")? {
        println!("{}", output);
    }
    Ok(())
}
