//! Cursor geometry for the composer.
//!
//! The text and the cursor byte offset belong to the core `Composer`; this
//! module only tracks how the view is scrolled and turns offsets into screen
//! positions. Every method takes `buffer` and `pos` explicitly.

use ratatui::layout::Rect;
use unicode_width::UnicodeWidthStr;

use super::text_wrap::{
    BORDER_OFFSET, CONTENT_OFFSET_X, MAX_VISIBLE_LINES, inner_width, wrap_line_count, wrap_options,
};

/// Scroll state for the composer, persisted across frames.
#[derive(Debug)]
pub struct ComposerViewState {
    /// Line offset for internal scrolling (0 when content fits in viewport)
    pub scroll_offset: u16,
    /// Content width from the last render (used for vertical movement)
    pub last_content_width: u16,
}

impl Default for ComposerViewState {
    fn default() -> Self {
        Self {
            scroll_offset: 0,
            last_content_width: Self::DEFAULT_WIDTH,
        }
    }
}

impl ComposerViewState {
    const DEFAULT_WIDTH: u16 = 80;

    /// Byte offset one wrapped line up (`direction < 0`) or down, keeping
    /// the column where possible. `None` at the first or last line.
    pub fn vertical_target(&self, buffer: &str, pos: usize, direction: i16) -> Option<usize> {
        let width = inner_width(self.last_content_width);
        if width == 0 || buffer.is_empty() {
            return None;
        }

        let lines = textwrap::wrap(buffer, wrap_options(width));
        if lines.is_empty() {
            return None;
        }

        // Byte length of a wrapped line including its trailing newline (if present)
        let line_byte_span = |line: &str, offset: usize| -> usize {
            let has_newline = offset + line.len() < buffer.len()
                && buffer.as_bytes()[offset + line.len()] == b'\n';
            line.len() + usize::from(has_newline)
        };

        let mut byte_offset = 0;
        let mut current_line = 0;
        let mut column = 0;
        for (idx, line) in lines.iter().enumerate() {
            if byte_offset + line.len() >= pos {
                current_line = idx;
                column = pos - byte_offset;
                break;
            }
            byte_offset += line_byte_span(line, byte_offset);
        }

        let target_line = if direction < 0 {
            current_line.checked_sub(1)?
        } else if current_line + 1 < lines.len() {
            current_line + 1
        } else {
            return None;
        };

        let mut target_start = 0;
        for line in lines.iter().take(target_line) {
            target_start += line_byte_span(line, target_start);
        }

        // Same column clamped to the target line, backed off to a char boundary
        let target = &lines[target_line];
        let mut col = column.min(target.len());
        while !target.is_char_boundary(col) {
            col -= 1;
        }
        Some(target_start + col)
    }

    /// Which wrapped line (0-based) the cursor is on.
    pub fn calculate_line(&self, buffer: &str, pos: usize, content_width: u16) -> u16 {
        let width = inner_width(content_width);
        if width == 0 {
            return 0;
        }

        let before = &buffer[..pos];
        let lines = textwrap::wrap(before, wrap_options(width));
        let mut line = lines.len().saturating_sub(1) as u16;

        // Cursor right after a newline that textwrap didn't represent
        if pos > 0
            && buffer.as_bytes()[pos - 1] == b'\n'
            && !lines.last().is_some_and(|l| l.is_empty())
        {
            line += 1;
        }
        line
    }

    /// Keep the cursor line inside the visible window.
    pub fn update_scroll_offset(&mut self, buffer: &str, pos: usize, content_width: u16) {
        let width = inner_width(content_width);
        if wrap_line_count(buffer, width) <= MAX_VISIBLE_LINES {
            self.scroll_offset = 0;
            return;
        }

        let line = self.calculate_line(buffer, pos, content_width);
        if line < self.scroll_offset {
            self.scroll_offset = line;
        } else if line >= self.scroll_offset + MAX_VISIBLE_LINES {
            self.scroll_offset = line.saturating_sub(MAX_VISIBLE_LINES - 1);
        }
    }

    /// Screen (column, row) of the cursor inside the bordered `area`.
    pub fn screen_pos(&self, buffer: &str, pos: usize, area: Rect) -> (u16, u16) {
        let width = inner_width(area.width);
        if width == 0 {
            return (area.x + BORDER_OFFSET, area.y + BORDER_OFFSET);
        }

        let options = wrap_options(width);
        let before = &buffer[..pos];
        let line = self.calculate_line(buffer, pos, area.width);

        // Measure from the last newline so trailing spaces count; textwrap trims them
        let line_start = before.rfind('\n').map(|i| i + 1).unwrap_or(0);
        let logical = &before[line_start..];
        let segments = textwrap::wrap(logical, options);
        let col = match segments.split_last() {
            None => 0,
            Some((_, earlier)) => {
                let consumed: usize = earlier.iter().map(|s| s.width()).sum();
                logical.width().saturating_sub(consumed) as u16
            }
        };

        let visible_line = line.saturating_sub(self.scroll_offset);
        (
            (area.x + CONTENT_OFFSET_X + col).min(area.right().saturating_sub(BORDER_OFFSET + 1)),
            area.y + BORDER_OFFSET + visible_line,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state(width: u16) -> ComposerViewState {
        ComposerViewState {
            scroll_offset: 0,
            last_content_width: width,
        }
    }

    #[test]
    fn vertical_target_keeps_column() {
        let s = state(80);
        let text = "first line\nsecond";
        // From "fir|st" down to "sec|ond"
        assert_eq!(s.vertical_target(text, 3, 1), Some(14));
        assert_eq!(s.vertical_target(text, 14, -1), Some(3));
    }

    #[test]
    fn vertical_target_clamps_to_shorter_line() {
        let s = state(80);
        let text = "a long first line\nab";
        assert_eq!(s.vertical_target(text, 15, 1), Some(text.len()));
    }

    #[test]
    fn vertical_target_stops_at_edges() {
        let s = state(80);
        assert_eq!(s.vertical_target("one\ntwo", 1, -1), None);
        assert_eq!(s.vertical_target("one\ntwo", 5, 1), None);
        assert_eq!(s.vertical_target("", 0, 1), None);
    }

    #[test]
    fn calculate_line_after_newline() {
        let s = state(80);
        assert_eq!(s.calculate_line("abc\n", 4, 80), 1);
        assert_eq!(s.calculate_line("abc", 3, 80), 0);
    }

    #[test]
    fn scroll_follows_cursor_past_visible_window() {
        let mut s = state(80);
        let text = "1\n2\n3\n4\n5\n6\n7";
        s.update_scroll_offset(text, text.len(), 80);
        assert_eq!(s.scroll_offset, 2);
        s.update_scroll_offset(text, 0, 80);
        assert_eq!(s.scroll_offset, 0);
    }

    #[test]
    fn screen_pos_counts_trailing_spaces_and_wide_glyphs() {
        let s = state(40);
        let area = Rect::new(0, 10, 40, 4);
        assert_eq!(s.screen_pos("ab  ", 4, area), (6, 11));
        // Two CJK glyphs are four columns
        assert_eq!(s.screen_pos("電感", 6, area), (6, 11));
        assert_eq!(s.screen_pos("x\ny", 3, area), (3, 12));
    }
}
