//! # Tool Picker Component
//!
//! Overlay for starting a conversation in one of the three workflows.
//! Opened with Ctrl+N. Confirming retags the draft thread (or creates one).
//!
//! Follows the persistent state + transient wrapper pattern:
//! - `ToolPickerState` lives in `TuiState`
//! - `ToolPicker` is created each frame with borrowed state

use ratatui::Frame;
use ratatui::layout::{Alignment, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, List, ListItem, ListState, Padding};

use super::centered_rect;
use crate::core::locale::{Locale, labels};
use crate::core::types::AnalysisMode;
use crate::tui::component::Component;
use crate::tui::event::TuiEvent;

/// Persistent state for the tool picker overlay.
pub struct ToolPickerState {
    pub selected: usize,
    pub list_state: ListState,
}

impl ToolPickerState {
    /// Open with `current` preselected.
    pub fn new(current: AnalysisMode) -> Self {
        let selected = AnalysisMode::ALL
            .iter()
            .position(|m| *m == current)
            .unwrap_or(0);
        Self {
            selected,
            list_state: ListState::default().with_selected(Some(selected)),
        }
    }

    pub fn handle_event(&mut self, event: &TuiEvent) -> Option<ToolPickerEvent> {
        match event {
            TuiEvent::Escape => Some(ToolPickerEvent::Dismiss),
            TuiEvent::CursorUp => {
                self.selected = self.selected.saturating_sub(1);
                self.list_state.select(Some(self.selected));
                None
            }
            TuiEvent::CursorDown => {
                self.selected = (self.selected + 1).min(AnalysisMode::ALL.len() - 1);
                self.list_state.select(Some(self.selected));
                None
            }
            // Number keys jump straight to a workflow
            TuiEvent::InputChar(c @ '1'..='3') => {
                let idx = (*c as usize) - ('1' as usize);
                Some(ToolPickerEvent::Select(AnalysisMode::ALL[idx]))
            }
            TuiEvent::Submit => Some(ToolPickerEvent::Select(AnalysisMode::ALL[self.selected])),
            _ => None,
        }
    }
}

/// Events emitted by the tool picker.
#[derive(Debug, Clone, PartialEq)]
pub enum ToolPickerEvent {
    Select(AnalysisMode),
    Dismiss,
}

/// Transient render wrapper for the tool picker overlay.
pub struct ToolPicker<'a> {
    pub state: &'a mut ToolPickerState,
    pub locale: Locale,
}

impl Component for ToolPicker<'_> {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let labels = labels(self.locale);
        let overlay = centered_rect(70, 60, area);

        // Clear underlying content
        frame.render_widget(Clear, overlay);

        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::DarkGray))
            .title(labels.picker_title)
            .title_alignment(Alignment::Left)
            .title_bottom(Line::from(labels.picker_help).centered())
            .padding(Padding::uniform(1));

        let items: Vec<ListItem> = AnalysisMode::ALL
            .iter()
            .enumerate()
            .map(|(i, mode)| {
                let (title_style, desc_style) = if i == self.state.selected {
                    let s = Style::default()
                        .fg(Color::White)
                        .add_modifier(Modifier::BOLD | Modifier::REVERSED);
                    (s, s.remove_modifier(Modifier::BOLD))
                } else {
                    (
                        Style::default().fg(Color::Gray).add_modifier(Modifier::BOLD),
                        Style::default().fg(Color::DarkGray),
                    )
                };
                ListItem::new(vec![
                    Line::from(vec![
                        Span::styled(format!("{} ", i + 1), Style::default().fg(Color::Yellow)),
                        Span::styled(mode.title(self.locale), title_style),
                        Span::styled(format!("  [{}]", mode.badge()), Style::default().fg(Color::Magenta)),
                    ]),
                    Line::from(Span::styled(format!("  {}", mode.description(self.locale)), desc_style)),
                    Line::from(""),
                ])
            })
            .collect();

        frame.render_stateful_widget(List::new(items).block(block), overlay, &mut self.state.list_state);
    }
}
