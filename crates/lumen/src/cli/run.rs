use std::io::{self, IsTerminal, Read, Write};
use std::path::Path;

use anyhow::Context;

use lumen_core::{runner, HistoryStore, Registry, Resolver};
use lumen_platform::Platform;
use lumen_tui::{Page, RunnerPage, Session};

/// `lumen run`: resolve the origin up front, then either stream the raw
/// output or show it in the UI.
pub fn run(platform: Platform, origin: &str, args: Vec<String>) -> anyhow::Result<()> {
    let input = read_piped_stdin()?;
    let resolver = Resolver::new(platform.fetcher.clone());
    let resolved = resolver
        .resolve(origin, args, input)
        .with_context(|| format!("failed to resolve {}", origin))?;

    if !io::stdout().is_terminal() {
        tracing::debug!(origin, "stdout is not a terminal, writing raw output");
        let output = runner::run(&resolved.invocation)?;
        let mut stdout = io::stdout().lock();
        stdout.write_all(&output)?;
        stdout.flush()?;
        return Ok(());
    }

    let session = Session::new(Registry::default(), platform, HistoryStore::new());
    let page = RunnerPage::prepared(session.clone(), title(origin), resolved);
    super::interactive(session, Page::Runner(page))
}

fn read_piped_stdin() -> anyhow::Result<Option<Vec<u8>>> {
    let stdin = io::stdin();
    if stdin.is_terminal() {
        return Ok(None);
    }

    let mut input = Vec::new();
    stdin
        .lock()
        .read_to_end(&mut input)
        .context("failed to read stdin")?;
    Ok(Some(input))
}

/// Short label for an origin: the last path or URL segment.
fn title(origin: &str) -> String {
    let trimmed = origin.trim_end_matches('/');
    Path::new(trimmed)
        .file_name()
        .and_then(|name| name.to_str())
        .filter(|name| !name.is_empty())
        .unwrap_or(origin)
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_title_is_last_segment() {
        assert_eq!(title("./tools/deploy.sh"), "deploy.sh");
        assert_eq!(title("~/extensions/github/"), "github");
        assert_eq!(title("https://example.com/scripts/hello.sh"), "hello.sh");
        assert_eq!(title("/"), "/");
    }
}
