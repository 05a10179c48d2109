use std::sync::{Arc, Mutex};

use lumen_core::{FetchResponse, HistoryStore, LumenError, LumenResult, Registry, ScriptFetch};
use lumen_platform::{ClipboardAccess, Platform, SystemOpen};

use crate::session::Session;

/// Records what would have been sent to the system.
#[derive(Default)]
pub struct Recorder {
    pub copied: Mutex<Vec<String>>,
    pub opened: Mutex<Vec<String>>,
    pub fail: bool,
}

impl ClipboardAccess for Recorder {
    fn set_text(&self, content: &str) -> LumenResult<()> {
        if self.fail {
            return Err(LumenError::Clipboard("no display".into()));
        }
        self.copied.lock().unwrap().push(content.to_string());
        Ok(())
    }
}

impl SystemOpen for Recorder {
    fn open_url(&self, url: &str) -> LumenResult<()> {
        if self.fail {
            return Err(LumenError::Platform("no browser".into()));
        }
        self.opened.lock().unwrap().push(url.to_string());
        Ok(())
    }
}

impl ScriptFetch for Recorder {
    fn get(&self, url: &str) -> LumenResult<FetchResponse> {
        Err(LumenError::Fetch(url.to_string()))
    }
}

pub fn platform(recorder: Arc<Recorder>) -> Platform {
    Platform {
        clipboard: recorder.clone(),
        opener: recorder.clone(),
        fetcher: recorder,
    }
}

pub fn session() -> Arc<Session> {
    Session::new(
        Registry::default(),
        platform(Arc::new(Recorder::default())),
        HistoryStore::new(),
    )
}
