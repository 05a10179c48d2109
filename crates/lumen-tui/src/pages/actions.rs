use crossterm::event::{KeyCode, KeyEvent};
use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Borders, Clear, List, ListItem as ListRow, ListState};
use ratatui::widgets::{StatefulWidget, Widget};

use lumen_core::Action;

use crate::keys;

/// Result of a key press inside the action panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanelOutcome {
    Ignored,
    Close,
    Select(usize),
}

/// Popup listing the actions of the selected item.
#[derive(Debug, Clone, Default)]
pub struct ActionPanel {
    selected: usize,
}

impl ActionPanel {
    pub fn handle_key(&mut self, key: &KeyEvent, actions: &[Action]) -> PanelOutcome {
        if actions.is_empty() {
            return PanelOutcome::Close;
        }

        match key.code {
            KeyCode::Esc | KeyCode::Tab => PanelOutcome::Close,
            KeyCode::Enter => PanelOutcome::Select(self.selected.min(actions.len() - 1)),
            KeyCode::Up => {
                self.selected = self.selected.saturating_sub(1);
                PanelOutcome::Ignored
            }
            KeyCode::Down => {
                self.selected = (self.selected + 1).min(actions.len() - 1);
                PanelOutcome::Ignored
            }
            _ if keys::is_ctrl(key, 'p') => {
                self.selected = self.selected.saturating_sub(1);
                PanelOutcome::Ignored
            }
            _ if keys::is_ctrl(key, 'n') => {
                self.selected = (self.selected + 1).min(actions.len() - 1);
                PanelOutcome::Ignored
            }
            _ => match shortcut_index(key, actions) {
                Some(index) => PanelOutcome::Select(index),
                None => PanelOutcome::Ignored,
            },
        }
    }

    pub fn render(&self, actions: &[Action], area: Rect, buf: &mut Buffer) {
        let height = (actions.len() as u16 + 2).min(area.height);
        let width = area.width.min(48);
        let popup = Rect {
            x: area.x + area.width.saturating_sub(width),
            y: area.y + area.height.saturating_sub(height + 1),
            width,
            height,
        };

        let rows: Vec<ListRow> = actions
            .iter()
            .map(|action| {
                let mut spans = vec![Span::raw(action.title.clone())];
                if let Some(ref shortcut) = action.shortcut {
                    spans.push(Span::styled(
                        format!("  {}", shortcut),
                        Style::default().fg(Color::DarkGray),
                    ));
                }
                ListRow::new(Line::from(spans))
            })
            .collect();

        let list = List::new(rows)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_type(BorderType::Rounded)
                    .title("Actions"),
            )
            .highlight_style(Style::default().add_modifier(Modifier::REVERSED));

        let mut state = ListState::default();
        state.select(Some(self.selected));

        Clear.render(popup, buf);
        StatefulWidget::render(list, popup, buf, &mut state);
    }
}

/// Index of the action whose shortcut `key` triggers.
pub fn shortcut_index(key: &KeyEvent, actions: &[Action]) -> Option<usize> {
    actions.iter().position(|action| {
        action
            .shortcut
            .as_deref()
            .is_some_and(|shortcut| keys::matches_shortcut(shortcut, key))
    })
}
