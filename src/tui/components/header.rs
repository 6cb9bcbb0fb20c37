//! # Header Component
//!
//! Single-line bar across the top of the screen.
//!
//! ```text
//! WK Insight · Precision Measurement Intelligence │ [DUT] Inductor check │ JSON copied      中文
//! ```
//!
//! Left to right: brand, the active thread's mode badge and title, then the
//! transient status (or the "analyzing" indicator while the thread is
//! typing, or "↓ New" when there is unseen content below the scroll). The
//! locale toggle label sits flush right.
//!
//! Stateless: every field is a prop copied from `App` each frame.

use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use unicode_width::UnicodeWidthStr;

use crate::core::format::truncate;
use crate::core::locale::{Locale, labels};
use crate::core::types::AnalysisMode;
use crate::tui::component::Component;

pub struct Header<'a> {
    pub locale: Locale,
    pub mode: AnalysisMode,
    pub thread_title: &'a str,
    pub status_message: Option<&'a str>,
    pub is_typing: bool,
    pub has_unseen_content: bool,
}

impl Header<'_> {
    fn status(&self) -> Option<Span<'static>> {
        let labels = labels(self.locale);
        if self.is_typing {
            return Some(Span::styled(
                labels.analyzing.to_string(),
                Style::default().fg(Color::Yellow),
            ));
        }
        if let Some(status) = self.status_message.filter(|s| !s.is_empty()) {
            return Some(Span::styled(
                status.to_string(),
                Style::default().fg(Color::Cyan),
            ));
        }
        None
    }
}

impl Component for Header<'_> {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let labels = labels(self.locale);
        let toggle = format!(" {} ", self.locale.toggle_label());
        let [left, right] = Layout::horizontal([
            Constraint::Min(0),
            Constraint::Length(toggle.width() as u16 + 1),
        ])
        .areas(area);

        let sep = Span::styled(" │ ", Style::default().fg(Color::DarkGray));
        let mut spans = vec![
            Span::styled(
                labels.brand,
                Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
            ),
            Span::styled(
                format!(" · {}", labels.brand_subtitle),
                Style::default().fg(Color::DarkGray),
            ),
            sep.clone(),
            Span::styled(
                format!("[{}] ", self.mode.badge()),
                Style::default().fg(Color::Magenta),
            ),
            Span::raw(truncate(self.thread_title, 40)),
        ];
        if let Some(status) = self.status() {
            spans.push(sep.clone());
            spans.push(status);
        }
        if self.has_unseen_content {
            spans.push(sep);
            spans.push(Span::styled("↓ New", Style::default().fg(Color::Green)));
        }

        frame.render_widget(Paragraph::new(Line::from(spans)), left);
        frame.render_widget(
            Paragraph::new(Line::from(Span::styled(
                toggle,
                Style::default().add_modifier(Modifier::REVERSED),
            )))
            .right_aligned(),
            right,
        );
    }
}
