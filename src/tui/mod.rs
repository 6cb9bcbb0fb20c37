//! # TUI Adapter
//!
//! The ratatui-specific layer. Handles terminal I/O, renders the UI,
//! and translates keyboard events into core::Action values.
//!
//! This is the only module that knows about ratatui and crossterm.
//!
//! ## Event Routing
//!
//! [`dispatch`] is a pure function from a [`TuiEvent`] to an optional
//! [`Action`]. Overlays get first refusal, then global shortcuts, then
//! whichever pane has focus. The [`runtime::EffectRunner`] applies the
//! action and performs the effect `update()` returns.
//!
//! ## Redraw Strategy
//!
//! The event loop uses conditional redraw to avoid unnecessary work:
//!
//! - **Animating** (a reply is pending in the visible thread): draws every
//!   ~80ms so the typing indicator pulses.
//! - **Idle**: sleeps up to 500ms, only redraws on events, finished
//!   analyses or terminal resize.
//!
//! A `SteadyBlock` cursor style is used instead of a blinking cursor because
//! ratatui's `set_cursor_position` resets the terminal's blink timer on every
//! `draw()` call, making blinking cursors appear erratic during continuous redraws.

mod component;
mod components;
mod event;
mod ui;

pub mod clipboard;
pub mod runtime;

use log::{debug, info};
use std::io::stdout;
use std::path::PathBuf;
use std::sync::{Arc, mpsc};
use std::time::{Duration, Instant};

use crossterm::cursor::{Hide, SetCursorStyle, Show};
use crossterm::event::{
    DisableBracketedPaste, DisableMouseCapture, EnableBracketedPaste, EnableMouseCapture,
    KeyboardEnhancementFlags, PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
};
use crossterm::execute;

use crate::analysis::MockProvider;
use crate::core::action::Action;
use crate::core::config::ResolvedConfig;
use crate::core::state::App;
use crate::core::types::ThreadId;
use crate::tui::clipboard::SystemClipboard;
use crate::tui::component::EventHandler;
use crate::tui::components::{
    ComposerView, ComposerViewState, MessageListState, PromptEvent, PromptKind, PromptState,
    SidebarEvent, SidebarState, ToolPickerEvent, ToolPickerState,
};
use crate::tui::event::{TuiEvent, poll_event_immediate, poll_event_timeout};
use crate::tui::runtime::EffectRunner;

/// Which pane receives editing keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Composer,
    Sidebar,
}

/// TUI-specific presentation state (not part of core business logic)
pub struct TuiState {
    // Persistent component states
    pub message_list: MessageListState,
    pub composer: ComposerViewState,
    pub sidebar: SidebarState,
    pub focus: Focus,
    // Overlays (None = hidden)
    pub tool_picker: Option<ToolPickerState>,
    pub prompt: Option<PromptState>,
    // Animation state
    pub pulse_value: f32,
    last_thread: ThreadId,
}

impl TuiState {
    pub fn new(app: &App) -> Self {
        let mut sidebar = SidebarState::new();
        sidebar.refresh(&app.store);
        Self {
            message_list: MessageListState::new(),
            composer: ComposerViewState::default(),
            sidebar,
            focus: Focus::Composer, // User expects to type immediately
            tool_picker: None,
            prompt: None,
            pulse_value: 0.0,
            last_thread: app.store.active_id().to_string(),
        }
    }

    /// Reset per-thread view state when the active thread changed.
    pub fn sync(&mut self, app: &App) {
        let active = app.store.active_id();
        if self.last_thread != active {
            debug!("Active thread changed to {active}; resetting view state");
            self.message_list = MessageListState::new();
            self.composer.scroll_offset = 0;
            self.last_thread = active.to_string();
        }
    }
}

struct TerminalModeGuard;

impl TerminalModeGuard {
    fn new() -> std::io::Result<Self> {
        // Kitty keyboard protocol lets Shift+Enter through; terminals without it ignore the request
        execute!(
            stdout(),
            EnableMouseCapture,
            EnableBracketedPaste,
            Show,
            SetCursorStyle::SteadyBlock,
            PushKeyboardEnhancementFlags(
                KeyboardEnhancementFlags::DISAMBIGUATE_ESCAPE_CODES
                    | KeyboardEnhancementFlags::REPORT_EVENT_TYPES
            )
        )?;
        info!("Terminal modes enabled (mouse, bracketed paste, steady block cursor, keyboard enhancement)");
        Ok(Self)
    }
}

impl Drop for TerminalModeGuard {
    fn drop(&mut self) {
        let _ = execute!(
            stdout(),
            PopKeyboardEnhancementFlags,
            DisableMouseCapture,
            DisableBracketedPaste,
            Hide
        );
    }
}

/// Route one terminal event. Returns the action for `update()`, if any.
pub fn dispatch(tui: &mut TuiState, app: &App, event: TuiEvent) -> Option<Action> {
    match event {
        TuiEvent::Quit => return Some(Action::Quit),
        TuiEvent::Resize => return None,
        _ => {}
    }

    if let Some(prompt) = tui.prompt.as_mut() {
        let prompt_event = prompt.handle_event(&event)?;
        tui.prompt = None;
        return match prompt_event {
            PromptEvent::Submit {
                kind: PromptKind::AttachImage,
                value,
            } if !value.is_empty() => Some(Action::AttachImage(PathBuf::from(value))),
            PromptEvent::Submit {
                kind: PromptKind::Rename(thread_id),
                value,
            } => Some(Action::RenameThread {
                thread_id,
                title: value,
            }),
            _ => None,
        };
    }

    if let Some(picker) = tui.tool_picker.as_mut() {
        let picker_event = picker.handle_event(&event)?;
        tui.tool_picker = None;
        return match picker_event {
            ToolPickerEvent::Select(mode) => {
                tui.focus = Focus::Composer;
                Some(Action::SelectMode(mode))
            }
            ToolPickerEvent::Dismiss => None,
        };
    }

    match event {
        TuiEvent::ScrollUp
        | TuiEvent::ScrollDown
        | TuiEvent::ScrollPageUp
        | TuiEvent::ScrollPageDown
        | TuiEvent::ScrollToBottom => {
            tui.message_list.handle_event(&event);
            return None;
        }
        TuiEvent::OpenToolPicker => {
            tui.tool_picker = Some(ToolPickerState::new(app.composer.mode));
            return None;
        }
        TuiEvent::ToggleSidebar => {
            tui.focus = match tui.focus {
                Focus::Composer => {
                    tui.sidebar.refresh(&app.store);
                    tui.sidebar.select_id(app.store.active_id());
                    Focus::Sidebar
                }
                Focus::Sidebar => Focus::Composer,
            };
            return None;
        }
        TuiEvent::OpenAttachPrompt => {
            tui.prompt = Some(PromptState::new(PromptKind::AttachImage, ""));
            return None;
        }
        TuiEvent::Retry => return Some(Action::Retry),
        TuiEvent::ToggleLocale => return Some(Action::ToggleLocale),
        TuiEvent::ExportThread => return Some(Action::ExportThread),
        TuiEvent::ClearThread => return Some(Action::ClearThread),
        TuiEvent::CopySummary => return Some(Action::CopyResultSummary),
        TuiEvent::CopyJson => return Some(Action::CopyResultJson),
        TuiEvent::InsertSummary => return Some(Action::InsertSummary),
        TuiEvent::RemoveLastImage => return Some(Action::RemoveLastImage),
        _ => {}
    }

    match tui.focus {
        Focus::Sidebar => {
            // The store may have changed since the last frame
            tui.sidebar.refresh(&app.store);
            match tui.sidebar.handle_event(&event)? {
                SidebarEvent::Open(id) => {
                    tui.focus = Focus::Composer;
                    Some(Action::SelectThread(id))
                }
                SidebarEvent::NewChat => {
                    tui.focus = Focus::Composer;
                    Some(Action::NewChat)
                }
                SidebarEvent::Rename(id) => {
                    let title = app
                        .store
                        .thread(&id)
                        .map(|t| t.title.clone())
                        .unwrap_or_default();
                    tui.prompt = Some(PromptState::new(PromptKind::Rename(id), &title));
                    None
                }
                SidebarEvent::Delete(id) => Some(Action::DeleteThread(id)),
                SidebarEvent::Share(id) => Some(Action::ShareThread(id)),
                SidebarEvent::Dismiss => {
                    tui.focus = Focus::Composer;
                    None
                }
            }
        }
        Focus::Composer => {
            if event == TuiEvent::Escape {
                return None;
            }
            ComposerView {
                state: &mut tui.composer,
                composer: &app.composer,
                locale: app.locale,
                busy: app.active_is_typing(),
                focused: true,
            }
            .handle_event(&event)
        }
    }
}

pub fn run(config: ResolvedConfig) -> std::io::Result<()> {
    let provider = Arc::new(MockProvider::new(config.typing_delay));
    let timeout = config.analysis_timeout;
    let mut app = App::new(provider, config);
    let mut tui = TuiState::new(&app);

    let mut terminal = ratatui::init();
    let _terminal_mode_guard = TerminalModeGuard::new();

    // Channel for actions from background tasks
    let (tx, rx) = mpsc::channel();
    let mut runner = EffectRunner::new(tx, SystemClipboard::default(), timeout);

    let start_time = Instant::now();
    let mut needs_redraw = true; // Force first frame

    loop {
        tui.sync(&app);
        let animating = app.active_is_typing();
        if animating {
            needs_redraw = true;
        }

        if needs_redraw {
            let elapsed = start_time.elapsed().as_secs_f32();
            tui.pulse_value = (elapsed * 5.0).sin() * 0.5 + 0.5;
            terminal.draw(|f| ui::draw_ui(f, &app, &mut tui))?;
            needs_redraw = false;
        }

        // Dynamic poll timeout: short when animating (~12fps), long when idle
        let timeout = if animating {
            Duration::from_millis(80)
        } else {
            Duration::from_millis(500)
        };
        let first_event = poll_event_timeout(timeout);
        if first_event.is_some() {
            needs_redraw = true;
        }

        // Process first event + drain ALL pending events before next draw
        let mut should_quit = false;
        for event in first_event
            .into_iter()
            .chain(std::iter::from_fn(poll_event_immediate))
        {
            if let Some(action) = dispatch(&mut tui, &app, event)
                && runner.dispatch(&mut app, action)
            {
                should_quit = true;
                break;
            }
        }

        // Finished analyses from background tasks
        while let Ok(action) = rx.try_recv() {
            needs_redraw = true;
            runner.dispatch(&mut app, action);
        }

        if should_quit {
            info!("Quitting with {} analyses in flight", runner.in_flight());
            runner.abort_all();
            break;
        }
    }

    ratatui::restore();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::action::update;
    use crate::core::composer::Edit;
    use crate::core::types::AnalysisMode;
    use crate::test_support::test_app;

    fn send(tui: &mut TuiState, app: &App, events: &[TuiEvent]) -> Vec<Action> {
        events
            .iter()
            .filter_map(|e| dispatch(tui, app, e.clone()))
            .collect()
    }

    #[test]
    fn test_typing_goes_to_composer() {
        let app = test_app();
        let mut tui = TuiState::new(&app);
        let actions = send(
            &mut tui,
            &app,
            &[TuiEvent::InputChar('h'), TuiEvent::Escape, TuiEvent::Submit],
        );
        assert_eq!(
            actions,
            vec![Action::Edit(Edit::Insert('h')), Action::Submit]
        );
    }

    #[test]
    fn test_shortcuts_map_directly() {
        let app = test_app();
        let mut tui = TuiState::new(&app);
        let actions = send(
            &mut tui,
            &app,
            &[
                TuiEvent::Quit,
                TuiEvent::CopyJson,
                TuiEvent::CopySummary,
                TuiEvent::ToggleLocale,
                TuiEvent::Resize,
            ],
        );
        assert_eq!(
            actions,
            vec![
                Action::Quit,
                Action::CopyResultJson,
                Action::CopyResultSummary,
                Action::ToggleLocale
            ]
        );
    }

    #[test]
    fn test_tool_picker_selects_mode() {
        let app = test_app();
        let mut tui = TuiState::new(&app);
        assert_eq!(dispatch(&mut tui, &app, TuiEvent::OpenToolPicker), None);
        assert!(tui.tool_picker.is_some());

        // Keys are swallowed by the overlay until it closes
        assert_eq!(dispatch(&mut tui, &app, TuiEvent::InputChar('x')), None);
        assert_eq!(
            dispatch(&mut tui, &app, TuiEvent::InputChar('3')),
            Some(Action::SelectMode(AnalysisMode::DcBiasSaturation))
        );
        assert!(tui.tool_picker.is_none());
        assert_eq!(tui.focus, Focus::Composer);
    }

    #[test]
    fn test_attach_prompt_submits_path() {
        let app = test_app();
        let mut tui = TuiState::new(&app);
        dispatch(&mut tui, &app, TuiEvent::OpenAttachPrompt);
        dispatch(&mut tui, &app, TuiEvent::Paste("'/tmp/curve.png'\n".into()));
        assert_eq!(
            dispatch(&mut tui, &app, TuiEvent::Submit),
            Some(Action::AttachImage(PathBuf::from("/tmp/curve.png")))
        );
        assert!(tui.prompt.is_none());
    }

    #[test]
    fn test_empty_attach_prompt_does_nothing() {
        let app = test_app();
        let mut tui = TuiState::new(&app);
        dispatch(&mut tui, &app, TuiEvent::OpenAttachPrompt);
        assert_eq!(dispatch(&mut tui, &app, TuiEvent::Submit), None);
        assert!(tui.prompt.is_none());
    }

    #[test]
    fn test_sidebar_rename_flow() {
        let mut app = test_app();
        update(&mut app, Action::Edit(Edit::Paste("Inductor check".into())));
        update(&mut app, Action::Submit);
        let active = app.store.active_id().to_string();
        let mut tui = TuiState::new(&app);

        dispatch(&mut tui, &app, TuiEvent::ToggleSidebar);
        assert_eq!(tui.focus, Focus::Sidebar);
        assert_eq!(dispatch(&mut tui, &app, TuiEvent::InputChar('r')), None);
        let prompt = tui.prompt.as_ref().unwrap();
        assert_eq!(prompt.kind, PromptKind::Rename(active.clone()));
        assert_eq!(prompt.value, app.store.active_thread().unwrap().title);

        dispatch(&mut tui, &app, TuiEvent::CursorEnd);
        dispatch(&mut tui, &app, TuiEvent::InputChar('!'));
        let expected = format!("{}!", app.store.active_thread().unwrap().title);
        assert_eq!(
            dispatch(&mut tui, &app, TuiEvent::Submit),
            Some(Action::RenameThread {
                thread_id: active,
                title: expected
            })
        );
    }

    #[test]
    fn test_sidebar_open_returns_focus() {
        let app = test_app();
        let mut tui = TuiState::new(&app);
        dispatch(&mut tui, &app, TuiEvent::ToggleSidebar);
        let id = app.store.active_id().to_string();
        assert_eq!(
            dispatch(&mut tui, &app, TuiEvent::Submit),
            Some(Action::SelectThread(id))
        );
        assert_eq!(tui.focus, Focus::Composer);

        dispatch(&mut tui, &app, TuiEvent::ToggleSidebar);
        assert_eq!(dispatch(&mut tui, &app, TuiEvent::Escape), None);
        assert_eq!(tui.focus, Focus::Composer);
    }

    #[test]
    fn test_sidebar_delete_needs_confirmation() {
        let app = test_app();
        let mut tui = TuiState::new(&app);
        dispatch(&mut tui, &app, TuiEvent::ToggleSidebar);
        let id = app.store.active_id().to_string();
        assert_eq!(dispatch(&mut tui, &app, TuiEvent::InputChar('d')), None);
        assert_eq!(
            dispatch(&mut tui, &app, TuiEvent::InputChar('d')),
            Some(Action::DeleteThread(id))
        );
    }

    #[test]
    fn test_sync_resets_view_on_thread_change() {
        let mut app = test_app();
        update(&mut app, Action::Edit(Edit::Insert('a')));
        update(&mut app, Action::Submit);
        let mut tui = TuiState::new(&app);
        tui.message_list.stick_to_bottom = false;

        tui.sync(&app);
        assert!(!tui.message_list.stick_to_bottom);

        update(&mut app, Action::NewChat);
        tui.sync(&app);
        assert!(tui.message_list.stick_to_bottom);
    }
}
