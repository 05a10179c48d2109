use std::sync::Arc;

use crossterm::event::KeyCode;
use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Color, Style};
use ratatui::widgets::{Paragraph, Widget};

use lumen_core::{runner, LumenResult, PageDocument, Resolved, RunTarget};

use super::{DetailPage, Page};
use crate::event::Event;
use crate::session::Session;
use crate::task::Task;

/// What a runner page executes.
pub enum RunSource {
    /// A command of a registered extension.
    Command(RunTarget),
    /// An invocation resolved up front by `lumen run`.
    Prepared(Resolved),
}

/// Placeholder page that runs a command and turns into its output page.
pub struct RunnerPage {
    id: u64,
    title: String,
    session: Arc<Session>,
    /// Taken when the work starts.
    source: Option<RunSource>,
    /// Extension owning the output, for binding its `run` actions.
    extension: Option<String>,
    /// Show output that is not a page document as plain text.
    raw_fallback: bool,
    width: u16,
    height: u16,
}

impl RunnerPage {
    pub fn command(session: Arc<Session>, target: RunTarget) -> Self {
        let title = session
            .registry
            .get(&target.extension)
            .ok()
            .and_then(|ext| ext.manifest.command(&target.command))
            .map(|command| command.title.clone())
            .filter(|title| !title.is_empty())
            .unwrap_or_else(|| target.command.clone());

        Self {
            id: session.next_runner_id(),
            title,
            extension: Some(target.extension.clone()),
            raw_fallback: false,
            source: Some(RunSource::Command(target)),
            session,
            width: 0,
            height: 0,
        }
    }

    pub fn prepared(session: Arc<Session>, title: impl Into<String>, resolved: Resolved) -> Self {
        Self {
            id: session.next_runner_id(),
            title: title.into(),
            extension: None,
            raw_fallback: true,
            source: Some(RunSource::Prepared(resolved)),
            session,
            width: 0,
            height: 0,
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn init(&mut self) -> Task {
        let Some(source) = self.source.take() else {
            return Task::none();
        };
        let runner = self.id;
        let session = self.session.clone();

        Task::blocking(move || {
            let result = match source {
                RunSource::Command(target) => session
                    .registry
                    .get(&target.extension)
                    .and_then(|ext| ext.run(&session.resolver, &target.command, target.params)),
                // The scratch directory of a fetched script lives until the
                // process is done.
                RunSource::Prepared(resolved) => runner::run(&resolved.invocation),
            };
            Event::RunnerOutput { runner, result }
        })
    }

    pub fn update(self, event: Event) -> (Page, Task) {
        match event {
            Event::RunnerOutput { runner, result } if runner == self.id => {
                let mut page = self.output_page(result);
                page.resize(self.width, self.height);
                let task = page.init();
                (page, task)
            }
            Event::RunnerOutput { runner, .. } => {
                tracing::debug!(runner, expected = self.id, "ignoring output of another runner");
                (Page::Runner(self), Task::none())
            }
            Event::Key(key) if key.code == KeyCode::Esc => (Page::Runner(self), Task::done(Event::Pop)),
            _ => (Page::Runner(self), Task::none()),
        }
    }

    fn output_page(&self, result: LumenResult<Vec<u8>>) -> Page {
        let output = match result {
            Ok(output) => output,
            Err(e) => {
                tracing::warn!(title = %self.title, error = %e, "command failed");
                return Page::Detail(DetailPage::error(e.to_string()));
            }
        };

        match PageDocument::parse(&output) {
            Ok(mut document) => {
                if let Some(ref extension) = self.extension {
                    document.bind_extension(extension);
                }
                Page::from_document(document)
            }
            Err(_) if self.raw_fallback => Page::Detail(DetailPage::new(
                self.title.clone(),
                String::from_utf8_lossy(&output).into_owned(),
            )),
            Err(e) => Page::Detail(DetailPage::error(e.to_string())),
        }
    }

    pub fn resize(&mut self, width: u16, height: u16) {
        self.width = width;
        self.height = height;
    }

    pub fn size(&self) -> (u16, u16) {
        (self.width, self.height)
    }

    pub fn render(&self, area: Rect, buf: &mut Buffer) {
        Paragraph::new(format!("Running {}...", self.title))
            .style(Style::default().fg(Color::DarkGray))
            .render(area, buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::session;

    fn target() -> RunTarget {
        RunTarget {
            extension: "stub".into(),
            command: "list".into(),
            ..Default::default()
        }
    }

    #[test]
    fn test_ignores_output_of_other_runner() {
        let runner = RunnerPage::command(session(), target());
        let id = runner.id();

        let (page, task) = Page::Runner(runner).update(Event::RunnerOutput {
            runner: id + 100,
            result: Ok(br#"{"type": "detail", "text": "late"}"#.to_vec()),
        });
        assert!(page.is_runner());
        assert!(task.is_none());
    }

    #[test]
    fn test_output_becomes_list_page_with_size() {
        let mut runner = RunnerPage::command(session(), target());
        runner.resize(80, 24);
        let id = runner.id();

        let (page, _) = Page::Runner(runner).update(Event::RunnerOutput {
            runner: id,
            result: Ok(
                br#"{"type": "list", "title": "Repos", "items": [
                    {"title": "lumen", "actions": [{"type": "run", "title": "Issues", "command": "issues"}]}
                ]}"#
                .to_vec(),
            ),
        });

        let list = page.as_list().expect("list page");
        assert_eq!(list.title(), "Repos");
        assert_eq!(page.size(), (80, 24));

        let item = list.visible().next().unwrap();
        match item.actions[0].effect {
            lumen_core::Effect::Run(ref target) => assert_eq!(target.extension, "stub"),
            ref other => panic!("expected run action, got {:?}", other),
        }
    }

    #[test]
    fn test_failure_becomes_error_page() {
        let runner = RunnerPage::command(session(), target());
        let id = runner.id();

        let (page, _) = Page::Runner(runner).update(Event::RunnerOutput {
            runner: id,
            result: Err(lumen_core::LumenError::ExtensionNotFound("stub".into())),
        });

        let detail = page.as_detail().expect("detail page");
        assert_eq!(detail.title(), "Error");
        assert!(detail.text().contains("stub"));
    }

    #[test]
    fn test_runner_ids_are_unique() {
        let session = session();
        let a = RunnerPage::command(session.clone(), target());
        let b = RunnerPage::command(session, target());
        assert_ne!(a.id(), b.id());
    }
}
