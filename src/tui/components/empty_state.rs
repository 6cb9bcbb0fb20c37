//! # Empty State Component
//!
//! Shown in place of the message list while the active thread has no
//! messages: a short call to action and the three workflows with their
//! picker shortcuts.

use ratatui::Frame;
use ratatui::layout::{Constraint, Flex, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Paragraph, Wrap};

use crate::core::locale::{Locale, labels};
use crate::core::types::AnalysisMode;
use crate::tui::component::Component;

pub struct EmptyState {
    pub locale: Locale,
    /// Mode the draft is currently tagged with
    pub mode: AnalysisMode,
}

impl EmptyState {
    fn lines(&self) -> Vec<Line<'static>> {
        let labels = labels(self.locale);
        let mut lines = vec![
            Line::from(Span::styled(
                labels.empty_eyebrow.to_uppercase(),
                Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
            )),
            Line::from(Span::styled(
                labels.empty_title,
                Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
            )),
            Line::from(Span::styled(
                labels.empty_subtitle,
                Style::default().fg(Color::DarkGray),
            )),
            Line::default(),
        ];

        for (i, mode) in AnalysisMode::ALL.iter().enumerate() {
            let marker = if *mode == self.mode { "▸ " } else { "  " };
            lines.push(Line::from(vec![
                Span::styled(marker, Style::default().fg(Color::Cyan)),
                Span::styled(format!("{}. ", i + 1), Style::default().fg(Color::Yellow)),
                Span::styled(
                    mode.title(self.locale),
                    Style::default().add_modifier(Modifier::BOLD),
                ),
                Span::styled(format!("  [{}]", mode.badge()), Style::default().fg(Color::Magenta)),
            ]));
            lines.push(Line::from(Span::styled(
                format!("     {}", mode.description(self.locale)),
                Style::default().fg(Color::DarkGray),
            )));
        }
        lines
    }
}

impl Component for EmptyState {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let lines = self.lines();
        let [column] = Layout::horizontal([Constraint::Max(80)])
            .flex(Flex::Center)
            .areas(area);
        let [body] = Layout::vertical([Constraint::Length(lines.len() as u16)])
            .flex(Flex::Center)
            .areas(column);

        frame.render_widget(Paragraph::new(lines).wrap(Wrap { trim: false }), body);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;

    #[test]
    fn test_lists_workflows_and_marks_current() {
        let backend = TestBackend::new(100, 20);
        let mut terminal = Terminal::new(backend).unwrap();
        terminal
            .draw(|f| {
                EmptyState {
                    locale: Locale::En,
                    mode: AnalysisMode::InterpretGraph,
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
        assert!(text.contains("QUICK START"));
        assert!(text.contains("Start a new measurement analysis"));
        assert!(text.contains("▸ 2. Equivalent Circuit"));
        assert!(text.contains("3. DC Bias Saturation"));
    }
}
