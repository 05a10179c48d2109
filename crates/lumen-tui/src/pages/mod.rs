//! Pages shown by the launcher.
//!
//! A page owns its rendering state and its size, and is driven only through
//! [`Page::init`], [`Page::update`], [`Page::render`] and [`Page::resize`].

mod actions;
mod detail;
mod list;
mod runner;

pub use actions::ActionPanel;
pub use detail::DetailPage;
pub use list::ListPage;
pub use runner::{RunSource, RunnerPage};

use ratatui::buffer::Buffer;
use ratatui::layout::Rect;

use lumen_core::{Action, Effect, PageDocument};

use crate::event::Event;
use crate::task::Task;

/// Tagged union of every page kind.
pub enum Page {
    List(ListPage),
    Detail(DetailPage),
    Runner(RunnerPage),
}

impl Page {
    /// Build a page from an extension document.
    pub fn from_document(document: PageDocument) -> Self {
        match document {
            PageDocument::List(list) => Page::List(ListPage::new(list.title, list.items)),
            PageDocument::Detail(detail) => {
                Page::Detail(DetailPage::new(detail.title, detail.text).with_actions(detail.actions))
            }
        }
    }

    pub fn init(&mut self) -> Task {
        match self {
            Page::List(_) | Page::Detail(_) => Task::none(),
            Page::Runner(runner) => runner.init(),
        }
    }

    /// Handle an event. The returned page replaces this one and may be of a
    /// different kind.
    pub fn update(self, event: Event) -> (Page, Task) {
        match self {
            Page::List(mut list) => {
                let task = list.update(event);
                (Page::List(list), task)
            }
            Page::Detail(mut detail) => {
                let task = detail.update(event);
                (Page::Detail(detail), task)
            }
            Page::Runner(runner) => runner.update(event),
        }
    }

    pub fn render(&self, area: Rect, buf: &mut Buffer) {
        match self {
            Page::List(list) => list.render(area, buf),
            Page::Detail(detail) => detail.render(area, buf),
            Page::Runner(runner) => runner.render(area, buf),
        }
    }

    pub fn resize(&mut self, width: u16, height: u16) {
        match self {
            Page::List(list) => list.resize(width, height),
            Page::Detail(detail) => detail.resize(width, height),
            Page::Runner(runner) => runner.resize(width, height),
        }
    }

    /// Re-sort a list page; other pages are unaffected.
    pub fn refresh(&mut self) {
        if let Page::List(list) = self {
            list.refresh();
        }
    }

    pub fn size(&self) -> (u16, u16) {
        match self {
            Page::List(list) => list.size(),
            Page::Detail(detail) => detail.size(),
            Page::Runner(runner) => runner.size(),
        }
    }

    pub fn title(&self) -> &str {
        match self {
            Page::List(list) => list.title(),
            Page::Detail(detail) => detail.title(),
            Page::Runner(runner) => runner.title(),
        }
    }

    pub fn as_list(&self) -> Option<&ListPage> {
        match self {
            Page::List(list) => Some(list),
            _ => None,
        }
    }

    pub fn as_detail(&self) -> Option<&DetailPage> {
        match self {
            Page::Detail(detail) => Some(detail),
            _ => None,
        }
    }

    pub fn is_runner(&self) -> bool {
        matches!(self, Page::Runner(_))
    }
}

impl Default for Page {
    fn default() -> Self {
        Page::Detail(DetailPage::default())
    }
}

/// Deferred work for a selected action.
pub fn action_task(action: &Action) -> Task {
    let event = match action.effect {
        Effect::Run(ref target) => Event::Run(target.clone()),
        Effect::Copy { ref text } => Event::CopyText(text.clone()),
        Effect::Open { ref url } => Event::OpenUrl(url.clone()),
        Effect::Push { ref page } => Event::Push(Page::from_document((**page).clone())),
        Effect::Pop => Event::Pop,
        Effect::Print { ref text } => Event::Print(text.clone()),
    };
    Task::done(event)
}

#[cfg(test)]
pub(crate) fn buffer_text(buf: &Buffer) -> String {
    let width = buf.area.width as usize;
    buf.content
        .chunks(width.max(1))
        .map(|row| row.iter().map(|cell| cell.symbol()).collect::<String>())
        .collect::<Vec<_>>()
        .join("\n")
}
