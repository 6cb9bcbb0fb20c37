//! System clipboard backed by `arboard`.
//!
//! The handle is opened on first use: headless sessions (no X11/Wayland
//! display) only pay for the failure when the user actually copies.

use log::{debug, warn};

use crate::core::export::{Clipboard, ClipboardError};

#[derive(Default)]
pub struct SystemClipboard {
    inner: Option<arboard::Clipboard>,
}

impl SystemClipboard {
    fn handle(&mut self) -> Result<&mut arboard::Clipboard, ClipboardError> {
        if self.inner.is_none() {
            let cb = arboard::Clipboard::new().map_err(|e| {
                warn!("clipboard unavailable: {e}");
                ClipboardError::Unavailable(e.to_string())
            })?;
            self.inner = Some(cb);
        }
        self.inner
            .as_mut()
            .ok_or_else(|| ClipboardError::Unavailable("not initialized".into()))
    }
}

impl Clipboard for SystemClipboard {
    fn set_text(&mut self, text: &str) -> Result<(), ClipboardError> {
        let cb = self.handle()?;
        cb.set_text(text.to_owned())
            .map_err(|e| ClipboardError::Write(e.to_string()))?;
        debug!("copied {} bytes to clipboard", text.len());
        Ok(())
    }
}
