//! # Sidebar Component
//!
//! Left-hand column: brand, the three workflows, a search box and the
//! recent threads. Opened for keyboard use with Ctrl+O, left with Esc.
//!
//! Follows the persistent state + transient wrapper pattern:
//! - `SidebarState` lives in `TuiState`
//! - `Sidebar` is created each frame with borrowed state and the store
//!
//! The visible thread ids are snapshotted into the state by [`SidebarState::refresh`]
//! so key handling can map the selection back to a thread without seeing
//! the store.

use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, List, ListItem, ListState, Padding, Paragraph, Wrap};

use crate::core::format::{format_time, truncate};
use crate::core::locale::{Locale, labels};
use crate::core::thread::ThreadStore;
use crate::core::types::{AnalysisMode, ThreadId};
use crate::tui::component::Component;
use crate::tui::event::TuiEvent;

/// Persistent state for the sidebar.
#[derive(Default)]
pub struct SidebarState {
    pub entries: Vec<ThreadId>,
    pub selected: usize,
    pub confirm_delete: bool,
    pub query: String,
    pub searching: bool,
    pub list_state: ListState,
}

impl SidebarState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Re-read the filtered thread list from the store.
    pub fn refresh(&mut self, store: &ThreadStore) {
        self.entries = store
            .filter_threads(&self.query)
            .into_iter()
            .map(|t| t.id.clone())
            .collect();
        if self.entries.is_empty() {
            self.selected = 0;
            self.list_state.select(None);
        } else {
            self.selected = self.selected.min(self.entries.len() - 1);
            self.list_state.select(Some(self.selected));
        }
    }

    /// Put the selection on `id` if it is listed.
    pub fn select_id(&mut self, id: &str) {
        if let Some(idx) = self.entries.iter().position(|e| e == id) {
            self.selected = idx;
            self.list_state.select(Some(idx));
        }
    }

    fn selected_id(&self) -> Option<ThreadId> {
        self.entries.get(self.selected).cloned()
    }

    /// Handle a key event, returning a SidebarEvent if the app should act.
    pub fn handle_event(&mut self, event: &TuiEvent) -> Option<SidebarEvent> {
        if self.searching {
            return self.handle_search(event);
        }

        // Reset delete confirmation on any non-delete key
        let is_delete_key = matches!(event, TuiEvent::InputChar('d'));
        if !is_delete_key {
            self.confirm_delete = false;
        }

        match event {
            TuiEvent::Escape => Some(SidebarEvent::Dismiss),
            TuiEvent::CursorUp => {
                self.selected = self.selected.saturating_sub(1);
                None
            }
            TuiEvent::CursorDown => {
                if !self.entries.is_empty() {
                    self.selected = (self.selected + 1).min(self.entries.len() - 1);
                }
                None
            }
            TuiEvent::Submit => self.selected_id().map(SidebarEvent::Open),
            TuiEvent::InputChar('n') => Some(SidebarEvent::NewChat),
            TuiEvent::InputChar('r') => self.selected_id().map(SidebarEvent::Rename),
            TuiEvent::InputChar('s') => self.selected_id().map(SidebarEvent::Share),
            TuiEvent::InputChar('/') => {
                self.searching = true;
                None
            }
            TuiEvent::InputChar('d') => {
                let id = self.selected_id()?;
                if self.confirm_delete {
                    self.confirm_delete = false;
                    Some(SidebarEvent::Delete(id))
                } else {
                    self.confirm_delete = true;
                    None
                }
            }
            _ => None,
        }
    }

    fn handle_search(&mut self, event: &TuiEvent) -> Option<SidebarEvent> {
        match event {
            TuiEvent::InputChar(c) => {
                self.query.push(*c);
                self.selected = 0;
            }
            TuiEvent::Paste(text) => {
                self.query.push_str(text.trim());
                self.selected = 0;
            }
            TuiEvent::Backspace => {
                self.query.pop();
                self.selected = 0;
            }
            TuiEvent::Submit => self.searching = false,
            TuiEvent::Escape => {
                self.searching = false;
                self.query.clear();
            }
            _ => {}
        }
        None
    }
}

/// Events emitted by the sidebar.
#[derive(Debug, Clone, PartialEq)]
pub enum SidebarEvent {
    Open(ThreadId),
    NewChat,
    Rename(ThreadId),
    Delete(ThreadId),
    Share(ThreadId),
    Dismiss,
}

/// Transient render wrapper for the sidebar.
pub struct Sidebar<'a> {
    pub state: &'a mut SidebarState,
    pub store: &'a ThreadStore,
    pub locale: Locale,
    pub focused: bool,
}

impl Component for Sidebar<'_> {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let labels = labels(self.locale);
        let active_id = self.store.active_id();
        let active_mode = self
            .store
            .active_thread()
            .map(|t| t.mode)
            .unwrap_or_default();

        let help_text = if !self.focused {
            ""
        } else if self.state.confirm_delete {
            labels.confirm_delete
        } else {
            labels.sidebar_help
        };
        let border = if self.focused { Color::Cyan } else { Color::DarkGray };
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(border))
            .title_bottom(Line::from(help_text))
            .padding(Padding::horizontal(1));
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let [brand_area, tools_area, new_area, search_area, list_area, note_area] =
            Layout::vertical([
                Constraint::Length(3),
                Constraint::Length(AnalysisMode::ALL.len() as u16 + 2),
                Constraint::Length(2),
                Constraint::Length(2),
                Constraint::Min(0),
                Constraint::Length(3),
            ])
            .areas(inner);

        let heading = Style::default().fg(Color::DarkGray).add_modifier(Modifier::BOLD);
        let dim = Style::default().fg(Color::DarkGray);

        frame.render_widget(
            Paragraph::new(vec![
                Line::from(Span::styled(
                    labels.brand,
                    Style::default().add_modifier(Modifier::BOLD),
                )),
                Line::from(Span::styled(labels.brand_subtitle, dim)),
            ]),
            brand_area,
        );

        let mut tool_lines = vec![Line::from(Span::styled(labels.core_workflows, heading))];
        for mode in AnalysisMode::ALL {
            let (marker, style) = if mode == active_mode {
                ("▸ ", Style::default().fg(Color::White).add_modifier(Modifier::BOLD))
            } else {
                ("  ", Style::default().fg(Color::Gray))
            };
            tool_lines.push(Line::from(Span::styled(
                format!("{marker}{}", mode.title(self.locale)),
                style,
            )));
        }
        frame.render_widget(Paragraph::new(tool_lines), tools_area);

        frame.render_widget(
            Paragraph::new(Line::from(vec![
                Span::styled(" + ", Style::default().add_modifier(Modifier::REVERSED)),
                Span::raw(format!(" {}", labels.new_chat)),
            ])),
            new_area,
        );

        let search_line = if self.state.searching || !self.state.query.is_empty() {
            let cursor = if self.state.searching { "▏" } else { "" };
            Line::from(vec![
                Span::styled("/ ", Style::default().fg(Color::Yellow)),
                Span::raw(format!("{}{cursor}", self.state.query)),
            ])
        } else {
            Line::from(Span::styled(format!("/ {}", labels.search_chats), dim))
        };
        frame.render_widget(Paragraph::new(search_line), search_area);

        let [recent_heading, list_body] =
            Layout::vertical([Constraint::Length(1), Constraint::Min(0)]).areas(list_area);
        frame.render_widget(
            Paragraph::new(Span::styled(labels.recent_chats, heading)),
            recent_heading,
        );

        if self.state.entries.is_empty() {
            frame.render_widget(Paragraph::new(Span::styled(labels.no_results, dim)), list_body);
        } else {
            let title_width = list_body.width.saturating_sub(2) as usize;
            let items: Vec<ListItem> = self
                .state
                .entries
                .iter()
                .enumerate()
                .filter_map(|(i, id)| self.store.thread(id).map(|t| (i, t)))
                .map(|(i, thread)| {
                    let is_active = thread.id == active_id;
                    let marker = if is_active { "● " } else { "  " };
                    let style = if self.focused && i == self.state.selected {
                        let fg = if self.state.confirm_delete {
                            Color::Red
                        } else {
                            Color::White
                        };
                        Style::default()
                            .fg(fg)
                            .add_modifier(Modifier::BOLD | Modifier::REVERSED)
                    } else if is_active {
                        Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
                    } else {
                        Style::default().fg(Color::Gray)
                    };
                    ListItem::new(vec![
                        Line::from(Span::styled(
                            format!("{marker}{}", truncate(&thread.title, title_width)),
                            style,
                        )),
                        Line::from(Span::styled(
                            format!(
                                "  {} {} · {}",
                                labels.updated,
                                format_time(thread.updated_at),
                                thread.mode.badge()
                            ),
                            dim,
                        )),
                    ])
                })
                .collect();
            self.state.list_state.select(Some(self.state.selected));
            frame.render_stateful_widget(List::new(items), list_body, &mut self.state.list_state);
        }

        frame.render_widget(
            Paragraph::new(Span::styled(labels.prototype_note, dim)).wrap(Wrap { trim: true }),
            note_area,
        );
    }
}
