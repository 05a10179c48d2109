//! Navigation stack.
//!
//! The model owns a root page and a stack of pushed pages. Exactly one page
//! is active: the top of the stack, or the root when the stack is empty.
//! Navigation, side effects and errors are handled here; everything else
//! goes to the active page.

use std::sync::Arc;

use crossterm::event::{KeyCode, KeyModifiers};
use ratatui::buffer::Buffer;
use ratatui::layout::Rect;

use crate::event::Event;
use crate::pages::{DetailPage, Page, RunnerPage};
use crate::session::Session;
use crate::task::Task;

pub struct Model {
    session: Arc<Session>,
    root: Page,
    pages: Vec<Page>,
    width: u16,
    height: u16,
    /// Set once the UI is done; nothing is drawn afterwards.
    hidden: bool,
    /// Text to write to stdout after the terminal is restored.
    output: Option<String>,
}

impl Model {
    pub fn new(session: Arc<Session>, root: Page) -> Self {
        Self {
            session,
            root,
            pages: Vec::new(),
            width: 0,
            height: 0,
            hidden: false,
            output: None,
        }
    }

    pub fn init(&mut self) -> Task {
        self.root.init()
    }

    pub fn handle_event(&mut self, event: Event) -> Task {
        tracing::trace!(event = event.name(), depth = self.pages.len(), "handling event");

        match event {
            Event::Resize { width, height } => {
                self.resize(width, height);
                Task::none()
            }
            Event::Interrupt => self.exit(),
            Event::Key(key)
                if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) =>
            {
                self.exit()
            }
            Event::OpenUrl(url) => match self.session.platform.opener.open_url(&url) {
                Ok(()) => self.exit(),
                Err(e) => Task::done(Event::Error(e)),
            },
            Event::CopyText(text) => match self.session.platform.clipboard.set_text(&text) {
                Ok(()) => self.exit(),
                Err(e) => Task::done(Event::Error(e)),
            },
            Event::Print(text) => {
                self.output = Some(text);
                self.exit()
            }
            Event::Push(page) => self.push(page),
            Event::Pop => {
                if self.pages.pop().is_none() {
                    return Task::quit();
                }
                // History may have changed while the page was open.
                self.active_mut().refresh();
                Task::none()
            }
            Event::Run(target) => {
                let session = self.session.clone();
                match target.history_id.clone() {
                    Some(id) => Task::blocking(move || {
                        session.record_run(&id);
                        Event::Push(Page::Runner(RunnerPage::command(session, target)))
                    }),
                    None => self.push(Page::Runner(RunnerPage::command(session, target))),
                }
            }
            Event::Error(err) => {
                tracing::warn!(error = %err, "showing error page");
                let mut detail = Page::Detail(DetailPage::error(err.to_string()));
                detail.resize(self.width, self.height);
                let task = detail.init();
                *self.active_mut() = detail;
                task
            }
            event => {
                let active = std::mem::take(self.active_mut());
                let (page, task) = active.update(event);
                *self.active_mut() = page;
                task
            }
        }
    }

    pub fn render(&self, area: Rect, buf: &mut Buffer) {
        if self.hidden {
            return;
        }
        self.active().render(area, buf);
    }

    pub fn push(&mut self, mut page: Page) -> Task {
        page.resize(self.width, self.height);
        self.pages.push(page);
        match self.pages.last_mut() {
            Some(page) => page.init(),
            None => Task::none(),
        }
    }

    pub fn active(&self) -> &Page {
        self.pages.last().unwrap_or(&self.root)
    }

    fn active_mut(&mut self) -> &mut Page {
        match self.pages.last_mut() {
            Some(page) => page,
            None => &mut self.root,
        }
    }

    /// Root first, then the stack from bottom to top.
    pub fn pages(&self) -> impl Iterator<Item = &Page> {
        std::iter::once(&self.root).chain(self.pages.iter())
    }

    /// Number of pushed pages.
    pub fn depth(&self) -> usize {
        self.pages.len()
    }

    pub fn is_hidden(&self) -> bool {
        self.hidden
    }

    pub fn take_output(&mut self) -> Option<String> {
        self.output.take()
    }

    fn resize(&mut self, width: u16, height: u16) {
        self.width = width;
        self.height = height;
        self.root.resize(width, height);
        for page in &mut self.pages {
            page.resize(width, height);
        }
    }

    fn exit(&mut self) -> Task {
        self.hidden = true;
        Task::quit()
    }
}
