use crossterm::event::{KeyCode, KeyEvent};
use ratatui::buffer::Buffer;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{List, ListItem as ListRow, ListState, Paragraph};
use ratatui::widgets::{StatefulWidget, Widget};

use lumen_core::{Comparator, Filter, ListItem};

use super::actions::{shortcut_index, ActionPanel, PanelOutcome};
use super::action_task;
use crate::event::Event;
use crate::keys;
use crate::task::Task;

/// Filterable list of items with actions.
pub struct ListPage {
    title: String,
    filter: Filter<ListItem>,
    selected: usize,
    panel: Option<ActionPanel>,
    width: u16,
    height: u16,
}

impl ListPage {
    pub fn new(title: impl Into<String>, items: Vec<ListItem>) -> Self {
        Self {
            title: title.into(),
            filter: Filter::new(items),
            selected: 0,
            panel: None,
            width: 0,
            height: 0,
        }
    }

    pub fn with_comparator(mut self, comparator: Comparator<ListItem>) -> Self {
        self.filter = self.filter.with_comparator(comparator);
        self
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn query(&self) -> &str {
        self.filter.query()
    }

    /// Visible items in display order.
    pub fn visible(&self) -> impl Iterator<Item = &ListItem> {
        self.filter.visible()
    }

    pub fn selected_item(&self) -> Option<&ListItem> {
        self.filter.get(self.selected)
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
            let Some(item) = self.selected_item() else {
                return Task::none();
            };
            return match panel.handle_key(&key, &item.actions) {
                PanelOutcome::Ignored => {
                    self.panel = Some(panel);
                    Task::none()
                }
                PanelOutcome::Close => Task::none(),
                PanelOutcome::Select(index) => action_task(&item.actions[index]),
            };
        }

        if keys::typed_char(&key).is_none() {
            if let Some(item) = self.selected_item() {
                if let Some(index) = shortcut_index(&key, &item.actions) {
                    return action_task(&item.actions[index]);
                }
            }
        }

        match key.code {
            KeyCode::Up => self.select_previous(),
            KeyCode::Down => self.select_next(),
            _ if keys::is_ctrl(&key, 'p') => self.select_previous(),
            _ if keys::is_ctrl(&key, 'n') => self.select_next(),
            KeyCode::Enter => {
                return match self.selected_item().and_then(|item| item.actions.first()) {
                    Some(action) => action_task(action),
                    None => Task::none(),
                };
            }
            KeyCode::Tab => {
                if self.selected_item().is_some_and(|item| !item.actions.is_empty()) {
                    self.panel = Some(ActionPanel::default());
                }
            }
            KeyCode::Esc => {
                if self.filter.query().is_empty() {
                    return Task::done(Event::Pop);
                }
                self.set_query(String::new());
            }
            KeyCode::Backspace => {
                let mut query = self.filter.query().to_string();
                if query.pop().is_some() {
                    self.set_query(query);
                }
            }
            _ => {
                if let Some(c) = keys::typed_char(&key) {
                    let mut query = self.filter.query().to_string();
                    query.push(c);
                    self.set_query(query);
                }
            }
        }

        Task::none()
    }

    /// Re-apply the ordering, keeping the selected item selected when it is
    /// still visible.
    pub fn refresh(&mut self) {
        let selected = self.selected_item().map(|item| item.id.clone());
        self.filter.refresh();
        self.selected = selected
            .and_then(|id| self.filter.visible().position(|item| item.id == id))
            .unwrap_or(0);
    }

    fn set_query(&mut self, query: String) {
        self.filter.set_query(query);
        self.selected = 0;
    }

    fn select_previous(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    fn select_next(&mut self) {
        if !self.filter.is_empty() {
            self.selected = (self.selected + 1).min(self.filter.len() - 1);
        }
    }

    pub fn render(&self, area: Rect, buf: &mut Buffer) {
        let [header, body, footer] = Layout::vertical([
            Constraint::Length(2),
            Constraint::Min(0),
            Constraint::Length(1),
        ])
        .areas(area);

        Paragraph::new(vec![
            Line::from(vec![
                Span::styled(
                    self.title.clone(),
                    Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
                ),
                Span::raw("  "),
                Span::raw(self.filter.query().to_string()),
                Span::styled("█", Style::default().fg(Color::DarkGray)),
            ]),
            Line::styled(
                "─".repeat(area.width as usize),
                Style::default().fg(Color::DarkGray),
            ),
        ])
        .render(header, buf);

        if self.filter.is_empty() {
            Paragraph::new("No items")
                .style(Style::default().fg(Color::DarkGray))
                .render(body, buf);
        } else {
            let rows: Vec<ListRow> = self.filter.visible().map(item_row).collect();
            let list = List::new(rows)
                .highlight_style(Style::default().bg(Color::Rgb(42, 88, 116)).fg(Color::White))
                .highlight_symbol("▸ ");
            let mut state = ListState::default();
            state.select(Some(self.selected));
            StatefulWidget::render(list, body, buf, &mut state);
        }

        let hint = match self.selected_item().and_then(|item| item.actions.first()) {
            Some(action) => format!(" {}  enter · actions  tab", action.title),
            None => String::new(),
        };
        Paragraph::new(hint)
            .style(Style::default().fg(Color::DarkGray))
            .render(footer, buf);

        if let (Some(panel), Some(item)) = (&self.panel, self.selected_item()) {
            panel.render(&item.actions, area, buf);
        }
    }
}

fn item_row(item: &ListItem) -> ListRow<'static> {
    let mut spans = vec![Span::styled(
        item.title.clone(),
        Style::default().add_modifier(Modifier::BOLD),
    )];
    if !item.subtitle.is_empty() {
        spans.push(Span::raw("  "));
        spans.push(Span::styled(
            item.subtitle.clone(),
            Style::default().fg(Color::DarkGray),
        ));
    }
    for accessory in &item.accessories {
        spans.push(Span::raw("  "));
        spans.push(Span::styled(accessory.clone(), Style::default().fg(Color::Cyan)));
    }
    ListRow::new(Line::from(spans))
}
