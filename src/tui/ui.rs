//! Frame layout.
//!
//! ```text
//! ┌ header ──────────────────────────────────────────────────────────┐
//! ├ sidebar ──────┬ messages / empty state ──────────────────────────┤
//! │               │                                                  │
//! │               ├ composer ────────────────────────────────────────┤
//! └───────────────┴──────────────────────────────────────────────────┘
//! ```
//!
//! The sidebar is always shown on wide terminals and only while focused on
//! narrow ones. Overlays (tool picker, prompt) draw last, over everything.

use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};

use crate::core::state::App;
use crate::core::thread::TurnState;
use crate::tui::component::Component;
use crate::tui::components::{
    ComposerView, EmptyState, Header, MessageList, Prompt, Sidebar, ToolPicker,
};
use crate::tui::{Focus, TuiState};

/// Terminals at least this wide keep the sidebar open.
pub const SIDEBAR_BREAKPOINT: u16 = 110;
const SIDEBAR_WIDTH: u16 = 34;

/// Split the body into (sidebar, main). The sidebar rect is `None` when hidden.
pub fn body_areas(body: Rect, focus: Focus) -> (Option<Rect>, Rect) {
    if body.width >= SIDEBAR_BREAKPOINT || focus == Focus::Sidebar {
        let [sidebar, main] =
            Layout::horizontal([Constraint::Length(SIDEBAR_WIDTH.min(body.width)), Constraint::Min(0)])
                .areas(body);
        (Some(sidebar), main)
    } else {
        (None, body)
    }
}

pub fn draw_ui(frame: &mut Frame, app: &App, tui: &mut TuiState) {
    let [header_area, body] =
        Layout::vertical([Constraint::Length(1), Constraint::Min(0)]).areas(frame.area());
    let (sidebar_area, main_area) = body_areas(body, tui.focus);

    let thread = app.store.active_thread();
    Header {
        locale: app.locale,
        mode: thread.map(|t| t.mode).unwrap_or(app.composer.mode),
        thread_title: thread.map(|t| t.title.as_str()).unwrap_or_default(),
        status_message: app.status_message.as_deref(),
        is_typing: app.active_is_typing(),
        has_unseen_content: tui.message_list.has_unseen_content,
    }
    .render(frame, header_area);

    if let Some(area) = sidebar_area {
        tui.sidebar.refresh(&app.store);
        Sidebar {
            state: &mut tui.sidebar,
            store: &app.store,
            locale: app.locale,
            focused: tui.focus == Focus::Sidebar,
        }
        .render(frame, area);
    }

    let overlay_open = tui.tool_picker.is_some() || tui.prompt.is_some();
    let mut composer = ComposerView {
        state: &mut tui.composer,
        composer: &app.composer,
        locale: app.locale,
        busy: app.active_is_typing(),
        focused: tui.focus == Focus::Composer && !overlay_open,
    };
    let composer_height = composer.calculate_height(main_area.width);
    let [messages_area, composer_area] =
        Layout::vertical([Constraint::Min(0), Constraint::Length(composer_height)])
            .areas(main_area);
    composer.render(frame, composer_area);

    let turn = app.store.turn(app.store.active_id());
    if app.active_messages().is_empty() && *turn == TurnState::Idle {
        EmptyState {
            locale: app.locale,
            mode: app.composer.mode,
        }
        .render(frame, messages_area);
    } else {
        MessageList {
            state: &mut tui.message_list,
            app,
            pulse_value: tui.pulse_value,
        }
        .render(frame, messages_area);
    }

    if let Some(picker) = tui.tool_picker.as_mut() {
        ToolPicker {
            state: picker,
            locale: app.locale,
        }
        .render(frame, frame.area());
    }
    if let Some(prompt) = tui.prompt.as_ref() {
        Prompt {
            state: prompt,
            locale: app.locale,
        }
        .render(frame, frame.area());
    }
}
