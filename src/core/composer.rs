//! # Composer
//!
//! The outgoing message being edited: free text with a cursor, attached
//! local images, and the analysis mode the send will be tagged with.
//!
//! Attached images get a `local://<uuid>` handle registered in
//! [`ImageHandles`]. Removing an image or discarding the draft releases its
//! handle; a successful send hands the handles over to the sent messages.

use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};

use log::debug;

use super::types::{AnalysisMode, LocalImage, new_id};

pub const HANDLE_SCHEME: &str = "local://";

#[derive(Debug, Clone, PartialEq)]
pub enum ComposerError {
    ImageNotFound(PathBuf),
    NotAFile(PathBuf),
}

impl fmt::Display for ComposerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ComposerError::ImageNotFound(path) => write!(f, "image not found: {}", path.display()),
            ComposerError::NotAFile(path) => write!(f, "not a file: {}", path.display()),
        }
    }
}

impl std::error::Error for ComposerError {}

/// Maps `local://` handles to the files they stand for.
#[derive(Debug, Default)]
pub struct ImageHandles {
    live: HashMap<String, PathBuf>,
}

impl ImageHandles {
    pub fn register(&mut self, path: &Path) -> String {
        let url = format!("{HANDLE_SCHEME}{}", new_id());
        self.live.insert(url.clone(), path.to_path_buf());
        url
    }

    /// Returns `true` if the handle was live.
    pub fn release(&mut self, url: &str) -> bool {
        self.live.remove(url).is_some()
    }

    pub fn resolve(&self, url: &str) -> Option<&Path> {
        self.live.get(url).map(PathBuf::as_path)
    }

    pub fn len(&self) -> usize {
        self.live.len()
    }

    pub fn is_empty(&self) -> bool {
        self.live.is_empty()
    }
}

/// A single editing keystroke applied at the cursor.
#[derive(Debug, Clone, PartialEq)]
pub enum Edit {
    Insert(char),
    Paste(String),
    Backspace,
    Delete,
    Left,
    Right,
    WordLeft,
    WordRight,
    Home,
    End,
    /// Jump to a byte offset, e.g. after moving between wrapped lines.
    /// Offsets past the end or inside a character are ignored.
    MoveTo(usize),
}

#[derive(Debug, Default)]
pub struct Composer {
    pub text: String,
    /// Byte offset into `text`, always on a char boundary.
    pub cursor: usize,
    pub images: Vec<LocalImage>,
    pub mode: AnalysisMode,
    pub handles: ImageHandles,
}

impl Composer {
    pub fn new(mode: AnalysisMode) -> Self {
        Self {
            mode,
            ..Self::default()
        }
    }

    pub fn set_text(&mut self, text: &str) {
        self.text = text.to_string();
        self.cursor = self.text.len();
    }

    /// Apply one editing operation. Returns `true` if anything changed.
    pub fn edit(&mut self, edit: Edit) -> bool {
        let before = (self.text.len(), self.cursor);
        match edit {
            Edit::Insert(c) => {
                self.text.insert(self.cursor, c);
                self.cursor += c.len_utf8();
                return true;
            }
            Edit::Paste(s) => {
                // Terminals send CR for newlines inside bracketed paste.
                let s = s.replace("\r\n", "\n").replace('\r', "\n");
                self.text.insert_str(self.cursor, &s);
                self.cursor += s.len();
                return !s.is_empty();
            }
            Edit::Backspace if self.cursor > 0 => {
                let prev = prev_char_boundary(&self.text, self.cursor);
                self.text.drain(prev..self.cursor);
                self.cursor = prev;
            }
            Edit::Delete if self.cursor < self.text.len() => {
                let next = next_char_boundary(&self.text, self.cursor);
                self.text.drain(self.cursor..next);
            }
            Edit::Left if self.cursor > 0 => {
                self.cursor = prev_char_boundary(&self.text, self.cursor);
            }
            Edit::Right if self.cursor < self.text.len() => {
                self.cursor = next_char_boundary(&self.text, self.cursor);
            }
            Edit::WordLeft => self.cursor = prev_word_boundary(&self.text, self.cursor),
            Edit::WordRight => self.cursor = next_word_boundary(&self.text, self.cursor),
            Edit::Home => {
                self.cursor = self.text[..self.cursor].rfind('\n').map(|i| i + 1).unwrap_or(0);
            }
            Edit::End => {
                self.cursor = self.text[self.cursor..]
                    .find('\n')
                    .map(|i| self.cursor + i)
                    .unwrap_or(self.text.len());
            }
            Edit::MoveTo(pos) if self.text.is_char_boundary(pos) => self.cursor = pos,
            _ => {}
        }
        before != (self.text.len(), self.cursor)
    }

    /// Attach a file from disk. The path must exist and be a regular file.
    pub fn add_image(&mut self, path: &Path) -> Result<&LocalImage, ComposerError> {
        let meta = std::fs::metadata(path)
            .map_err(|_| ComposerError::ImageNotFound(path.to_path_buf()))?;
        if !meta.is_file() {
            return Err(ComposerError::NotAFile(path.to_path_buf()));
        }
        let url = self.handles.register(path);
        debug!("attached {} as {url}", path.display());
        self.images.push(LocalImage {
            id: new_id(),
            url,
            path: path.to_path_buf(),
        });
        Ok(&self.images[self.images.len() - 1])
    }

    /// Detach an image and release its handle. Unknown ids are ignored.
    pub fn remove_image(&mut self, id: &str) -> bool {
        let Some(idx) = self.images.iter().position(|img| img.id == id) else {
            return false;
        };
        let image = self.images.remove(idx);
        self.handles.release(&image.url);
        true
    }

    /// Clear text and images after a send. Handles stay live for the
    /// messages that now reference them.
    pub fn reset(&mut self) {
        self.text.clear();
        self.cursor = 0;
        self.images.clear();
    }

    /// Throw the draft away, releasing every outstanding handle.
    pub fn discard(&mut self) {
        for image in self.images.drain(..) {
            self.handles.release(&image.url);
        }
        self.text.clear();
        self.cursor = 0;
    }

    /// Append `summary` on a new line, or use it as the whole draft if empty.
    pub fn insert_summary(&mut self, summary: &str) {
        if self.text.is_empty() {
            self.text = summary.to_string();
        } else {
            self.text.push('\n');
            self.text.push_str(summary);
        }
        self.cursor = self.text.len();
    }

    pub fn has_content(&self) -> bool {
        !self.text.trim().is_empty() || !self.images.is_empty()
    }

    /// Whether a send is allowed while the owning thread is (or isn't) typing.
    pub fn can_send(&self, typing: bool) -> bool {
        self.has_content() && !typing
    }
}

/// Find the byte offset of the previous character boundary before `pos` in `text`.
pub fn prev_char_boundary(text: &str, pos: usize) -> usize {
    text[..pos]
        .char_indices()
        .next_back()
        .map(|(i, _)| i)
        .unwrap_or(0)
}

/// Find the byte offset of the next character boundary after `pos` in `text`.
pub fn next_char_boundary(text: &str, pos: usize) -> usize {
    text[pos..]
        .char_indices()
        .nth(1)
        .map(|(i, _)| pos + i)
        .unwrap_or(text.len())
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// Readline `backward-word`: skip separators, then the word before them.
pub fn prev_word_boundary(text: &str, pos: usize) -> usize {
    let mut chars = text[..pos].char_indices().rev().peekable();
    while chars.peek().is_some_and(|&(_, c)| !is_word_char(c)) {
        chars.next();
    }
    let mut boundary = 0;
    while let Some(&(i, c)) = chars.peek() {
        if !is_word_char(c) {
            boundary = i + c.len_utf8();
            break;
        }
        boundary = i;
        chars.next();
    }
    boundary
}

/// Readline `forward-word`.
pub fn next_word_boundary(text: &str, pos: usize) -> usize {
    let mut chars = text[pos..].char_indices().peekable();
    while chars.peek().is_some_and(|&(_, c)| !is_word_char(c)) {
        chars.next();
    }
    while chars.peek().is_some_and(|&(_, c)| is_word_char(c)) {
        chars.next();
    }
    match chars.peek() {
        Some(&(i, _)) => pos + i,
        None => text.len(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::temp_image;

    #[test]
    fn test_editing_multibyte_text() {
        let mut composer = Composer::default();
        for c in "電感 ok".chars() {
            composer.edit(Edit::Insert(c));
        }
        assert!(composer.edit(Edit::Backspace));
        assert_eq!(composer.text, "電感 o");
        composer.edit(Edit::Home);
        assert_eq!(composer.cursor, 0);
        composer.edit(Edit::Delete);
        assert_eq!(composer.text, "感 o");
        assert!(!composer.edit(Edit::Left));
    }

    #[test]
    fn test_paste_normalizes_carriage_returns() {
        let mut composer = Composer::default();
        composer.edit(Edit::Paste("a\r\nb\rc".into()));
        assert_eq!(composer.text, "a\nb\nc");
        composer.edit(Edit::Home);
        assert_eq!(composer.cursor, 4);
    }

    #[test]
    fn test_move_to_rejects_bad_offsets() {
        let mut composer = Composer::default();
        composer.set_text("電感");
        assert!(composer.edit(Edit::MoveTo(3)));
        assert_eq!(composer.cursor, 3);
        assert!(!composer.edit(Edit::MoveTo(4)));
        assert!(!composer.edit(Edit::MoveTo(99)));
        assert_eq!(composer.cursor, 3);
    }

    #[test]
    fn test_word_motion() {
        assert_eq!(prev_word_boundary("hello world", 11), 6);
        assert_eq!(prev_word_boundary("foo.bar", 7), 4);
        assert_eq!(next_word_boundary("hello world", 5), 11);
        assert_eq!(next_word_boundary("café latte", 0), 5);
    }

    #[test]
    fn test_can_send() {
        let mut composer = Composer::default();
        assert!(!composer.can_send(false));
        composer.set_text("   \n ");
        assert!(!composer.can_send(false));
        composer.set_text("measure this");
        assert!(composer.can_send(false));
        assert!(!composer.can_send(true));
    }

    #[test]
    fn test_add_image_registers_handle() {
        let path = temp_image("inductor.png");
        let mut composer = Composer::default();
        let url = composer.add_image(&path).unwrap().url.clone();
        assert!(url.starts_with(HANDLE_SCHEME));
        assert_eq!(composer.handles.resolve(&url), Some(path.as_path()));
        assert!(composer.can_send(false));
    }

    #[test]
    fn test_add_image_rejects_missing_and_directories() {
        let mut composer = Composer::default();
        let missing = std::env::temp_dir().join("wk-insight-definitely-missing.png");
        assert_eq!(
            composer.add_image(&missing).unwrap_err(),
            ComposerError::ImageNotFound(missing.clone())
        );
        let dir = temp_image("x.png").parent().unwrap().to_path_buf();
        assert_eq!(composer.add_image(&dir).unwrap_err(), ComposerError::NotAFile(dir));
        assert!(composer.images.is_empty());
        assert!(composer.handles.is_empty());
    }

    #[test]
    fn test_remove_image_releases_handle() {
        let path = temp_image("sweep.png");
        let mut composer = Composer::default();
        let id = composer.add_image(&path).unwrap().id.clone();
        assert_eq!(composer.handles.len(), 1);
        assert!(composer.remove_image(&id));
        assert!(composer.handles.is_empty());
        assert!(!composer.remove_image(&id));
    }

    #[test]
    fn test_reset_keeps_handles_discard_releases() {
        let path = temp_image("curve.png");
        let mut composer = Composer::default();
        composer.add_image(&path).unwrap();
        composer.set_text("L vs I");
        composer.reset();
        assert!(composer.text.is_empty() && composer.images.is_empty());
        assert_eq!(composer.handles.len(), 1);

        composer.add_image(&path).unwrap();
        composer.discard();
        assert_eq!(composer.handles.len(), 1);
    }

    #[test]
    fn test_insert_summary() {
        let mut composer = Composer::default();
        composer.insert_summary("Inductor.");
        assert_eq!(composer.text, "Inductor.");
        composer.insert_summary("Resonance ~6.8 MHz");
        assert_eq!(composer.text, "Inductor.\nResonance ~6.8 MHz");
        assert_eq!(composer.cursor, composer.text.len());
    }
}
