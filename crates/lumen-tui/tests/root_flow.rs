//! Selecting a root item runs its command and shows the resulting page.

#![cfg(unix)]

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::Path;
use std::sync::Arc;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use lumen_core::{
    history, Extension, FetchResponse, HistoryStore, LumenError, LumenResult, Registry,
    ScriptFetch, MANIFEST_NAME,
};
use lumen_platform::{ClipboardAccess, Platform, SystemOpen};
use lumen_tui::{root_page, Event, Model, Session, Task};

struct Offline;

impl ClipboardAccess for Offline {
    fn set_text(&self, _content: &str) -> LumenResult<()> {
        Ok(())
    }
}

impl SystemOpen for Offline {
    fn open_url(&self, _url: &str) -> LumenResult<()> {
        Ok(())
    }
}

impl ScriptFetch for Offline {
    fn get(&self, url: &str) -> LumenResult<FetchResponse> {
        Err(LumenError::Fetch(url.to_string()))
    }
}

fn platform() -> Platform {
    let offline = Arc::new(Offline);
    Platform {
        clipboard: offline.clone(),
        opener: offline.clone(),
        fetcher: offline,
    }
}

fn write_extension(dir: &Path) {
    fs::write(
        dir.join(MANIFEST_NAME),
        r#"{
            "title": "Stub",
            "rootItems": [
                {"command": "list", "title": "Recent"},
                {"command": "list", "title": "Never Run", "with": {"filter": "all"}}
            ],
            "commands": {
                "list": {"title": "List", "entrypoint": "list.sh"}
            }
        }"#,
    )
    .unwrap();

    let script = dir.join("list.sh");
    fs::write(
        &script,
        "#!/bin/sh\ncat > /dev/null\nprintf '%s' '{\"type\": \"list\", \"title\": \"Results\", \"items\": [{\"id\": \"one\", \"title\": \"First\"}, {\"id\": \"two\", \"title\": \"Second\"}]}'\n",
    )
    .unwrap();
    fs::set_permissions(&script, fs::Permissions::from_mode(0o755)).unwrap();
}

fn press(code: KeyCode) -> Event {
    Event::Key(KeyEvent::new(code, KeyModifiers::NONE))
}

/// Feed every event produced by `task` back into the model until no work is
/// left.
async fn settle(model: &mut Model, task: Task) {
    let mut pending = vec![task];
    while let Some(task) = pending.pop() {
        for event in task.collect().await {
            pending.push(model.handle_event(event));
        }
    }
}

#[tokio::test]
async fn test_selecting_root_item_shows_command_output() {
    let extension_dir = tempfile::tempdir().unwrap();
    let state_dir = tempfile::tempdir().unwrap();
    write_extension(extension_dir.path());

    let history_path = state_dir.path().join("nested").join("history.json");
    let five_minutes_ago = history::now() - 300;
    let mut store = HistoryStore::load(&history_path);
    store.record_and_persist("stub:Recent", five_minutes_ago);

    let registry = Registry::from_extensions([Extension::load("stub", extension_dir.path()).unwrap()]);
    let session = Session::new(registry, platform(), HistoryStore::load(&history_path));
    let mut model = Model::new(session.clone(), root_page(&session, &[]));
    let task = model.init();
    settle(&mut model, task).await;
    model.handle_event(Event::Resize {
        width: 80,
        height: 24,
    });

    let root = model.active().as_list().unwrap();
    let order: Vec<&str> = root.visible().map(|item| item.id.as_str()).collect();
    assert_eq!(order, ["stub:Recent", "stub:Never Run"]);

    let before = history::now();
    model.handle_event(press(KeyCode::Down));
    let task = model.handle_event(press(KeyCode::Enter));
    settle(&mut model, task).await;

    assert_eq!(model.depth(), 1);
    let page = model.active().as_list().expect("command output list");
    assert_eq!(page.title(), "Results");
    let titles: Vec<&str> = page.visible().map(|item| item.title.as_str()).collect();
    assert_eq!(titles, ["First", "Second"]);
    assert_eq!(model.active().size(), (80, 24));

    let persisted = HistoryStore::load(&history_path);
    assert!(persisted.last_run("stub:Never Run") >= before);
    assert_eq!(persisted.last_run("stub:Recent"), five_minutes_ago);
}

#[tokio::test]
async fn test_failing_command_shows_error_page() {
    let extension_dir = tempfile::tempdir().unwrap();
    fs::write(
        extension_dir.path().join(MANIFEST_NAME),
        r#"{"rootItems": [{"command": "missing", "title": "Broken"}]}"#,
    )
    .unwrap();

    let registry = Registry::from_extensions([Extension::load("stub", extension_dir.path()).unwrap()]);
    let session = Session::new(registry, platform(), HistoryStore::new());
    let mut model = Model::new(session.clone(), root_page(&session, &[]));

    let task = model.handle_event(press(KeyCode::Enter));
    settle(&mut model, task).await;

    let page = model.active().as_detail().expect("error page");
    assert_eq!(page.title(), "Error");
    assert!(page.text().contains("missing"));
    assert!(!model.is_hidden());
}
