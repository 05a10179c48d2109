//! The root list: every root item of every extension, most recently run
//! first.

use std::sync::Arc;

use lumen_core::{most_recent_first, Action, Effect, ListItem, RootItem, RunTarget};

use crate::pages::{ListPage, Page};
use crate::session::Session;

pub const ROOT_TITLE: &str = "Lumen";

/// Build the root page from the registry and the extra config items.
pub fn root_page(session: &Arc<Session>, extra: &[RootItem]) -> Page {
    let items: Vec<ListItem> = session
        .registry
        .root_entries(extra)
        .into_iter()
        .map(|entry| {
            let subtitle = session
                .registry
                .get(&entry.extension)
                .map(|ext| ext.title().to_string())
                .unwrap_or_default();

            let run = RunTarget {
                extension: entry.extension.clone(),
                command: entry.command,
                params: entry.params,
                history_id: Some(entry.id.clone()),
            };

            ListItem {
                id: entry.id,
                title: entry.title,
                subtitle,
                accessories: vec![entry.extension],
                actions: vec![Action::new("Run Command", Effect::Run(run)).with_shortcut("enter")],
            }
        })
        .collect();

    tracing::debug!(count = items.len(), "built root list");

    let history = session.clone();
    Page::List(
        ListPage::new(ROOT_TITLE, items)
            .with_comparator(most_recent_first(move |id: &str| history.last_run(id))),
    )
}
