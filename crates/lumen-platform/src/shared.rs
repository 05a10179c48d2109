use std::sync::Mutex;
use std::time::Duration;

use lumen_core::{FetchResponse, LumenError, LumenResult, ScriptFetch};

use crate::traits::{ClipboardAccess, SystemOpen};

/// Cross-platform clipboard using arboard.
///
/// The connection is opened on first use so that environments without a
/// display can still run headless commands.
#[derive(Default)]
pub struct ArboardClipboard {
    clipboard: Mutex<Option<arboard::Clipboard>>,
}

impl ArboardClipboard {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ClipboardAccess for ArboardClipboard {
    fn set_text(&self, content: &str) -> LumenResult<()> {
        let mut guard = self
            .clipboard
            .lock()
            .map_err(|e| LumenError::Clipboard(e.to_string()))?;

        if guard.is_none() {
            let clipboard =
                arboard::Clipboard::new().map_err(|e| LumenError::Clipboard(e.to_string()))?;
            *guard = Some(clipboard);
        }

        match guard.as_mut() {
            Some(clipboard) => clipboard
                .set_text(content)
                .map_err(|e| LumenError::Clipboard(e.to_string())),
            None => Err(LumenError::Clipboard("clipboard unavailable".to_string())),
        }
    }
}

/// Cross-platform URL opening using the `open` crate
pub struct OpenCrateOpener;

impl SystemOpen for OpenCrateOpener {
    fn open_url(&self, url: &str) -> LumenResult<()> {
        open::that(url).map_err(|e| LumenError::Platform(e.to_string()))
    }
}

/// HTTPS script downloads using a blocking reqwest client.
///
/// Must not be called from inside an async context; the launcher only calls
/// it before the runtime starts or from blocking tasks.
pub struct ReqwestFetcher {
    timeout: Duration,
}

impl ReqwestFetcher {
    pub fn new() -> Self {
        Self {
            timeout: Duration::from_secs(30),
        }
    }
}

impl Default for ReqwestFetcher {
    fn default() -> Self {
        Self::new()
    }
}

impl ScriptFetch for ReqwestFetcher {
    fn get(&self, url: &str) -> LumenResult<FetchResponse> {
        let client = reqwest::blocking::Client::builder()
            .timeout(self.timeout)
            .https_only(true)
            .build()
            .map_err(|e| LumenError::Fetch(e.to_string()))?;

        tracing::debug!(url, "downloading script");
        let response = client
            .get(url)
            .send()
            .map_err(|e| LumenError::Fetch(e.to_string()))?;

        let status = response.status().as_u16();
        let body = response
            .bytes()
            .map_err(|e| LumenError::Fetch(e.to_string()))?
            .to_vec();

        Ok(FetchResponse { status, body })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_http_is_refused() {
        let result = ReqwestFetcher::new().get("http://127.0.0.1:9/script.sh");
        assert!(matches!(result, Err(LumenError::Fetch(_))));
    }
}
