//! # Composer Component
//!
//! Draws the outgoing message: attached image chips, the wrapped text and
//! the cursor. The text itself lives in the core `Composer`; keystrokes are
//! turned into [`Action`]s here and applied by `update()`.
//!
//! ```text
//! ╭ [DC Bias] DC Bias Saturation ────────────────────────────╮
//! │ ▣ l_vs_i.png  ▣ datasheet.jpg  Ctrl+X ✕                  │
//! │ Where does this part saturate?▏                           │
//! ╰ Ctrl+N New  Ctrl+O Chats  Ctrl+A Attach  Ctrl+L Language ╯
//! ```

mod cursor;
mod text_wrap;

use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{
    Block, BorderType, Padding, Paragraph, Scrollbar, ScrollbarOrientation, ScrollbarState,
};

use crate::core::action::Action;
use crate::core::composer::{Composer, Edit};
use crate::core::locale::{Locale, labels};
use crate::tui::component::{Component, EventHandler};
use crate::tui::event::TuiEvent;

pub use cursor::ComposerViewState;
use text_wrap::{MAX_VISIBLE_LINES, VERTICAL_OVERHEAD, inner_width, wrap_line_count, wrap_options};

/// Transient wrapper around the persistent scroll state and the core draft.
pub struct ComposerView<'a> {
    pub state: &'a mut ComposerViewState,
    pub composer: &'a Composer,
    pub locale: Locale,
    /// A reply is pending for the active thread, so sending is blocked
    pub busy: bool,
    pub focused: bool,
}

impl ComposerView<'_> {
    fn chip_rows(&self) -> u16 {
        u16::from(!self.composer.images.is_empty())
    }

    /// Height for the current draft, clamped to the visible line limit.
    pub fn calculate_height(&self, content_width: u16) -> u16 {
        let width = inner_width(content_width);
        let lines = wrap_line_count(&self.composer.text, width).min(MAX_VISIBLE_LINES);
        lines + self.chip_rows() + VERTICAL_OVERHEAD
    }

    fn visible_text(&self, content_width: u16) -> Vec<Line<'static>> {
        let text = &self.composer.text;
        if text.is_empty() {
            return vec![Line::from(Span::styled(
                self.composer.mode.description(self.locale),
                Style::default().fg(Color::DarkGray),
            ))];
        }

        let width = inner_width(content_width);
        if width == 0 {
            return Vec::new();
        }
        let start = self.state.scroll_offset as usize;
        textwrap::wrap(text, wrap_options(width))
            .into_iter()
            .skip(start)
            .take(MAX_VISIBLE_LINES as usize)
            .map(|l| Line::from(l.into_owned()))
            .collect()
    }

    fn chips(&self) -> Line<'static> {
        let mut spans: Vec<Span> = self
            .composer
            .images
            .iter()
            .flat_map(|image| {
                [
                    Span::styled(
                        format!("▣ {}", image.file_name()),
                        Style::default().fg(Color::Black).bg(Color::Cyan),
                    ),
                    Span::raw("  "),
                ]
            })
            .collect();
        spans.push(Span::styled(
            "Ctrl+X ✕",
            Style::default().fg(Color::DarkGray),
        ));
        Line::from(spans)
    }

    fn render_scrollbar(&self, frame: &mut Frame, area: Rect) {
        let width = inner_width(area.width);
        let total_lines = wrap_line_count(&self.composer.text, width);
        if total_lines <= MAX_VISIBLE_LINES {
            return;
        }

        // content_length is the max scroll position, not the line count
        let max_scroll = total_lines.saturating_sub(MAX_VISIBLE_LINES);
        let mut scrollbar_state = ScrollbarState::default()
            .content_length(max_scroll as usize)
            .position(self.state.scroll_offset as usize);

        let scrollbar_area = Rect {
            x: area.x + area.width.saturating_sub(1),
            y: area.y + 1,
            width: 1,
            height: area.height.saturating_sub(2),
        };
        frame.render_stateful_widget(
            Scrollbar::new(ScrollbarOrientation::VerticalRight),
            scrollbar_area,
            &mut scrollbar_state,
        );
    }
}

impl Component for ComposerView<'_> {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let labels = labels(self.locale);
        let composer = self.composer;
        let text = &composer.text;
        let pos = composer.cursor;
        self.state.last_content_width = area.width;
        self.state.update_scroll_offset(text, pos, area.width);

        let accent = if self.busy {
            Style::default().fg(Color::DarkGray)
        } else if self.focused {
            Style::default().fg(Color::Green)
        } else {
            Style::default().fg(Color::Green).add_modifier(Modifier::DIM)
        };
        let mode = composer.mode;
        let title = Line::from(vec![
            Span::styled(format!(" [{}] ", mode.badge()), Style::default().fg(Color::Magenta)),
            Span::styled(format!("{} ", mode.title(self.locale)), accent),
        ]);
        let block = Block::bordered()
            .border_type(BorderType::Rounded)
            .border_style(accent)
            .title(title)
            .title_bottom(Line::styled(labels.composer_help, Style::default().fg(Color::DarkGray)))
            .padding(Padding::horizontal(1));
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let chip_rows = self.chip_rows();
        if chip_rows > 0 {
            frame.render_widget(Paragraph::new(self.chips()), Rect { height: 1, ..inner });
        }
        let text_rect = Rect {
            y: inner.y + chip_rows,
            height: inner.height.saturating_sub(chip_rows),
            ..inner
        };
        frame.render_widget(Paragraph::new(self.visible_text(area.width)), text_rect);
        self.render_scrollbar(frame, area);

        if self.focused {
            // Shift the bordered frame down past the chip row so the cursor lands on text
            let text_frame = Rect {
                y: area.y + chip_rows,
                height: area.height.saturating_sub(chip_rows),
                ..area
            };
            let (x, y) = self.state.screen_pos(text, pos, text_frame);
            frame.set_cursor_position((x, y));
        }
    }
}

impl EventHandler for ComposerView<'_> {
    type Event = Action;

    fn handle_event(&mut self, event: &TuiEvent) -> Option<Action> {
        let edit = match event {
            TuiEvent::InputChar(c) => Edit::Insert(*c),
            TuiEvent::Paste(text) => Edit::Paste(text.clone()),
            TuiEvent::Backspace => Edit::Backspace,
            TuiEvent::Delete => Edit::Delete,
            TuiEvent::CursorLeft => Edit::Left,
            TuiEvent::CursorRight => Edit::Right,
            TuiEvent::WordLeft => Edit::WordLeft,
            TuiEvent::WordRight => Edit::WordRight,
            TuiEvent::CursorHome => Edit::Home,
            TuiEvent::CursorEnd => Edit::End,
            TuiEvent::CursorUp | TuiEvent::CursorDown => {
                let direction = if *event == TuiEvent::CursorUp { -1 } else { 1 };
                let target = self.state.vertical_target(
                    &self.composer.text,
                    self.composer.cursor,
                    direction,
                )?;
                Edit::MoveTo(target)
            }
            TuiEvent::Submit => return Some(Action::Submit),
            _ => return None,
        };
        Some(Action::Edit(edit))
    }
}
