use std::sync::Arc;

use lumen_core::{LumenResult, ScriptFetch};

use crate::shared::{ArboardClipboard, OpenCrateOpener, ReqwestFetcher};

/// Write to the system clipboard
pub trait ClipboardAccess: Send + Sync {
    fn set_text(&self, content: &str) -> LumenResult<()>;
}

/// Open URLs with the system default handler
pub trait SystemOpen: Send + Sync {
    fn open_url(&self, url: &str) -> LumenResult<()>;
}

/// Aggregate struct holding all platform implementations
#[derive(Clone)]
pub struct Platform {
    pub clipboard: Arc<dyn ClipboardAccess>,
    pub opener: Arc<dyn SystemOpen>,
    pub fetcher: Arc<dyn ScriptFetch>,
}

impl Platform {
    /// Create a Platform instance backed by the real system
    pub fn current() -> Self {
        Self {
            clipboard: Arc::new(ArboardClipboard::new()),
            opener: Arc::new(OpenCrateOpener),
            fetcher: Arc::new(ReqwestFetcher::new()),
        }
    }
}
