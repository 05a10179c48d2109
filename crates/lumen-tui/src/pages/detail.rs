use crossterm::event::{KeyCode, KeyEvent};
use ratatui::buffer::Buffer;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::Line;
use ratatui::widgets::{Paragraph, Widget, Wrap};

use lumen_core::Action;

use super::actions::{shortcut_index, ActionPanel, PanelOutcome};
use super::action_task;
use crate::event::Event;
use crate::task::Task;

/// Scrollable block of text.
#[derive(Default)]
pub struct DetailPage {
    title: String,
    text: String,
    actions: Vec<Action>,
    scroll: u16,
    panel: Option<ActionPanel>,
    width: u16,
    height: u16,
}

impl DetailPage {
    pub fn new(title: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            text: text.into(),
            ..Default::default()
        }
    }

    /// Page reporting an error message.
    pub fn error(message: impl Into<String>) -> Self {
        Self::new("Error", message)
    }

    pub fn with_actions(mut self, actions: Vec<Action>) -> Self {
        self.actions = actions;
        self
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn resize(&mut self, width: u16, height: u16) {
        self.width = width;
        self.height = height;
    }

    pub fn size(&self) -> (u16, u16) {
        (self.width, self.height)
    }

    pub fn update(&mut self, event: Event) -> Task {
        match event {
            Event::Key(key) => self.handle_key(key),
            _ => Task::none(),
        }
    }

    fn handle_key(&mut self, key: KeyEvent) -> Task {
        if let Some(mut panel) = self.panel.take() {
            return match panel.handle_key(&key, &self.actions) {
                PanelOutcome::Ignored => {
                    self.panel = Some(panel);
                    Task::none()
                }
                PanelOutcome::Close => Task::none(),
                PanelOutcome::Select(index) => action_task(&self.actions[index]),
            };
        }

        if let Some(index) = shortcut_index(&key, &self.actions) {
            return action_task(&self.actions[index]);
        }

        match key.code {
            KeyCode::Up => self.scroll = self.scroll.saturating_sub(1),
            KeyCode::Down => {
                let max = self.text.lines().count().saturating_sub(1) as u16;
                self.scroll = (self.scroll + 1).min(max);
            }
            KeyCode::Enter => {
                if let Some(action) = self.actions.first() {
                    return action_task(action);
                }
            }
            KeyCode::Tab if !self.actions.is_empty() => {
                self.panel = Some(ActionPanel::default());
            }
            KeyCode::Esc => return Task::done(Event::Pop),
            _ => {}
        }

        Task::none()
    }

    pub fn render(&self, area: Rect, buf: &mut Buffer) {
        let [header, body] =
            Layout::vertical([Constraint::Length(2), Constraint::Min(0)]).areas(area);

        Paragraph::new(vec![
            Line::styled(
                self.title.clone(),
                Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
            ),
            Line::styled(
                "─".repeat(area.width as usize),
                Style::default().fg(Color::DarkGray),
            ),
        ])
        .render(header, buf);

        Paragraph::new(self.text.as_str())
            .wrap(Wrap { trim: false })
            .scroll((self.scroll, 0))
            .render(body, buf);

        if let Some(ref panel) = self.panel {
            panel.render(&self.actions, area, buf);
        }
    }
}
