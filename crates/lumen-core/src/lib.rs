pub mod config;
pub mod error;
pub mod filter;
pub mod history;
pub mod manifest;
pub mod page;
pub mod registry;
pub mod resolver;
pub mod rows;
pub mod runner;
pub mod surface;

pub use config::Config;
pub use error::{LumenError, LumenResult};
pub use filter::{most_recent_first, Comparator, Filter, FilterItem, Scorer, SkimScorer};
pub use history::HistoryStore;
pub use manifest::{Manifest, RootItem, MANIFEST_NAME};
pub use page::{Action, DetailDocument, Effect, ListDocument, ListItem, PageDocument, RunTarget};
pub use registry::{CommandInput, Extension, Registry, RootEntry};
pub use resolver::{FetchResponse, Origin, Resolved, Resolver, ScriptFetch};
pub use rows::{parse_rows, RowFormat};
pub use runner::Invocation;
pub use surface::{build_surfaces, CommandSurface, ExtensionSurface, FlagKind, FlagSpec};
