//! # Prompt Overlay
//!
//! One-line text entry drawn over the conversation. Used for the image
//! path when attaching (Ctrl+A) and for the new title when renaming a
//! thread from the sidebar.

use ratatui::Frame;
use ratatui::layout::{Constraint, Flex, Layout, Rect};
use ratatui::style::{Color, Style};
use ratatui::text::Line;
use ratatui::widgets::{Block, Borders, Clear, Padding, Paragraph};
use unicode_width::UnicodeWidthStr;

use crate::core::composer::{next_char_boundary, prev_char_boundary};
use crate::core::locale::{Locale, labels};
use crate::core::types::ThreadId;
use crate::tui::component::{Component, EventHandler};
use crate::tui::event::TuiEvent;

#[derive(Debug, Clone, PartialEq)]
pub enum PromptKind {
    AttachImage,
    Rename(ThreadId),
}

#[derive(Debug, Clone, PartialEq)]
pub enum PromptEvent {
    Submit { kind: PromptKind, value: String },
    Dismiss,
}

pub struct PromptState {
    pub kind: PromptKind,
    pub value: String,
    cursor: usize,
}

impl PromptState {
    pub fn new(kind: PromptKind, initial: &str) -> Self {
        Self {
            kind,
            value: initial.to_string(),
            cursor: initial.len(),
        }
    }
}

impl EventHandler for PromptState {
    type Event = PromptEvent;

    fn handle_event(&mut self, event: &TuiEvent) -> Option<PromptEvent> {
        match event {
            TuiEvent::InputChar('\n') => None,
            TuiEvent::InputChar(c) => {
                self.value.insert(self.cursor, *c);
                self.cursor += c.len_utf8();
                None
            }
            TuiEvent::Paste(text) => {
                // Paths dragged into a terminal arrive quoted or with a trailing newline
                let text = text.trim().trim_matches(|c| c == '\'' || c == '"');
                self.value.insert_str(self.cursor, text);
                self.cursor += text.len();
                None
            }
            TuiEvent::Backspace if self.cursor > 0 => {
                let prev = prev_char_boundary(&self.value, self.cursor);
                self.value.drain(prev..self.cursor);
                self.cursor = prev;
                None
            }
            TuiEvent::Delete if self.cursor < self.value.len() => {
                let next = next_char_boundary(&self.value, self.cursor);
                self.value.drain(self.cursor..next);
                None
            }
            TuiEvent::CursorLeft if self.cursor > 0 => {
                self.cursor = prev_char_boundary(&self.value, self.cursor);
                None
            }
            TuiEvent::CursorRight if self.cursor < self.value.len() => {
                self.cursor = next_char_boundary(&self.value, self.cursor);
                None
            }
            TuiEvent::CursorHome => {
                self.cursor = 0;
                None
            }
            TuiEvent::CursorEnd => {
                self.cursor = self.value.len();
                None
            }
            TuiEvent::Submit => Some(PromptEvent::Submit {
                kind: self.kind.clone(),
                value: self.value.trim().to_string(),
            }),
            TuiEvent::Escape => Some(PromptEvent::Dismiss),
            _ => None,
        }
    }
}

pub struct Prompt<'a> {
    pub state: &'a PromptState,
    pub locale: Locale,
}

impl Component for Prompt<'_> {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let labels = labels(self.locale);
        let title = match self.state.kind {
            PromptKind::AttachImage => labels.attach_placeholder,
            PromptKind::Rename(_) => labels.rename_placeholder,
        };

        let [row] = Layout::vertical([Constraint::Length(3)])
            .flex(Flex::Center)
            .areas(area);
        let [overlay] = Layout::horizontal([Constraint::Percentage(70)])
            .flex(Flex::Center)
            .areas(row);

        frame.render_widget(Clear, overlay);
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan))
            .title(format!(" {title} "))
            .title_bottom(Line::from(" Enter OK  Esc Cancel ").centered())
            .padding(Padding::horizontal(1));
        let inner = block.inner(overlay);

        // Keep the tail (and the cursor) visible when the path is long
        let before = &self.state.value[..self.state.cursor];
        let width = inner.width.saturating_sub(1) as usize;
        let mut start = 0;
        while before[start..].width() > width {
            start = next_char_boundary(before, start);
        }

        frame.render_widget(
            Paragraph::new(&self.state.value[start..]).block(block),
            overlay,
        );
        let cursor_x = inner.x + before[start..].width() as u16;
        frame.set_cursor_position((cursor_x.min(inner.right()), inner.y));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;

    #[test]
    fn test_typing_and_submit() {
        let mut state = PromptState::new(PromptKind::AttachImage, "");
        for c in "/tmp/a.png".chars() {
            assert_eq!(state.handle_event(&TuiEvent::InputChar(c)), None);
        }
        state.handle_event(&TuiEvent::Backspace);
        assert_eq!(
            state.handle_event(&TuiEvent::Submit),
            Some(PromptEvent::Submit {
                kind: PromptKind::AttachImage,
                value: "/tmp/a.pn".into()
            })
        );
    }

    #[test]
    fn test_paste_strips_quotes() {
        let mut state = PromptState::new(PromptKind::AttachImage, "");
        state.handle_event(&TuiEvent::Paste("'/home/me/L vs I.png'\n".into()));
        assert_eq!(state.value, "/home/me/L vs I.png");
    }

    #[test]
    fn test_rename_starts_with_current_title() {
        let mut state = PromptState::new(PromptKind::Rename("t1".into()), "Old");
        state.handle_event(&TuiEvent::InputChar('!'));
        assert_eq!(state.value, "Old!");
        assert_eq!(state.handle_event(&TuiEvent::Escape), Some(PromptEvent::Dismiss));
    }

    #[test]
    fn test_render_shows_title_and_value() {
        let state = PromptState::new(PromptKind::Rename("t1".into()), "Inductor check");
        let backend = TestBackend::new(60, 9);
        let mut terminal = Terminal::new(backend).unwrap();
        terminal
            .draw(|f| {
                Prompt {
                    state: &state,
                    locale: Locale::En,
                }
                .render(f, f.area())
            })
            .unwrap();
        let text: String = terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|c| c.symbol())
            .collect();
        assert!(text.contains("New name"));
        assert!(text.contains("Inductor check"));
    }
}
