use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseEventKind};
use log::warn;

/// TUI-specific input events
#[derive(Debug, Clone, PartialEq)]
pub enum TuiEvent {
    // Passed straight to core::update
    Quit,
    Submit,
    Retry,
    ToggleLocale,
    ExportThread,
    ClearThread,
    CopySummary,
    CopyJson,
    InsertSummary,
    RemoveLastImage,

    // Overlays and focus
    OpenToolPicker,
    ToggleSidebar,
    OpenAttachPrompt,
    Escape,
    Resize,

    // Editing (routed to whichever widget has focus)
    InputChar(char),
    Paste(String), // Bracketed paste - preserves newlines
    Backspace,
    Delete,
    CursorLeft,
    CursorRight,
    WordLeft,
    WordRight,
    CursorHome,
    CursorEnd,
    CursorUp,
    CursorDown,

    // Message list
    ScrollUp,
    ScrollDown,
    ScrollPageUp,
    ScrollPageDown,
    ScrollToBottom,
}

/// Poll for an event without blocking (returns immediately)
pub fn poll_event_immediate() -> Option<TuiEvent> {
    poll_event_timeout(Duration::ZERO)
}

/// Poll for an event, blocking up to `timeout`.
///
/// Terminal read errors are logged and treated as "no event" so a flaky
/// tty never takes the loop down.
pub fn poll_event_timeout(timeout: Duration) -> Option<TuiEvent> {
    match event::poll(timeout) {
        Ok(true) => {}
        Ok(false) => return None,
        Err(e) => {
            warn!("event poll failed: {e}");
            return None;
        }
    }
    match event::read() {
        Ok(Event::Key(key)) => map_key(key),
        Ok(Event::Mouse(mouse)) => match mouse.kind {
            MouseEventKind::ScrollUp => Some(TuiEvent::ScrollUp),
            MouseEventKind::ScrollDown => Some(TuiEvent::ScrollDown),
            _ => None,
        },
        Ok(Event::Paste(data)) => Some(TuiEvent::Paste(data)),
        Ok(Event::Resize(_, _)) => Some(TuiEvent::Resize),
        Ok(_) => None,
        Err(e) => {
            warn!("event read failed: {e}");
            None
        }
    }
}

/// Translate a key press into a [`TuiEvent`].
pub fn map_key(key: KeyEvent) -> Option<TuiEvent> {
    // The keyboard enhancement protocol also reports releases
    if key.kind == KeyEventKind::Release {
        return None;
    }
    log::debug!("Key event: {:?} with modifiers {:?}", key.code, key.modifiers);

    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    let alt = key.modifiers.contains(KeyModifiers::ALT);

    if ctrl {
        return match key.code {
            KeyCode::Char('c') => Some(TuiEvent::Quit),
            KeyCode::Char('n') => Some(TuiEvent::OpenToolPicker),
            KeyCode::Char('o') => Some(TuiEvent::ToggleSidebar),
            KeyCode::Char('a') => Some(TuiEvent::OpenAttachPrompt),
            KeyCode::Char('x') => Some(TuiEvent::RemoveLastImage),
            KeyCode::Char('l') => Some(TuiEvent::ToggleLocale),
            KeyCode::Char('e') => Some(TuiEvent::ExportThread),
            KeyCode::Char('k') => Some(TuiEvent::ClearThread),
            KeyCode::Char('y') => Some(TuiEvent::CopySummary),
            KeyCode::Char('g') => Some(TuiEvent::CopyJson),
            KeyCode::Char('t') => Some(TuiEvent::InsertSummary),
            KeyCode::Char('r') => Some(TuiEvent::Retry),
            // ASCII LF; Ctrl+Enter sends this in most terminals
            KeyCode::Char('j') | KeyCode::Enter => Some(TuiEvent::InputChar('\n')),
            KeyCode::Left => Some(TuiEvent::WordLeft),
            KeyCode::Right => Some(TuiEvent::WordRight),
            KeyCode::End => Some(TuiEvent::ScrollToBottom),
            _ => None,
        };
    }

    match key.code {
        KeyCode::Left if alt => Some(TuiEvent::WordLeft),
        KeyCode::Right if alt => Some(TuiEvent::WordRight),
        KeyCode::Char('b') if alt => Some(TuiEvent::WordLeft),
        KeyCode::Char('f') if alt => Some(TuiEvent::WordRight),
        KeyCode::Enter if key.modifiers.contains(KeyModifiers::SHIFT) => {
            Some(TuiEvent::InputChar('\n'))
        }
        KeyCode::Char(c) => Some(TuiEvent::InputChar(c)),
        KeyCode::Enter => Some(TuiEvent::Submit),
        KeyCode::Esc => Some(TuiEvent::Escape),
        KeyCode::Backspace => Some(TuiEvent::Backspace),
        KeyCode::Delete => Some(TuiEvent::Delete),
        KeyCode::Left => Some(TuiEvent::CursorLeft),
        KeyCode::Right => Some(TuiEvent::CursorRight),
        KeyCode::Home => Some(TuiEvent::CursorHome),
        KeyCode::End => Some(TuiEvent::CursorEnd),
        KeyCode::Up => Some(TuiEvent::CursorUp),
        KeyCode::Down => Some(TuiEvent::CursorDown),
        KeyCode::PageUp => Some(TuiEvent::ScrollPageUp),
        KeyCode::PageDown => Some(TuiEvent::ScrollPageDown),
        _ => None,
    }
}
