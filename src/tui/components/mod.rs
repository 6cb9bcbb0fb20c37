//! # TUI Components
//!
//! ## Component Architecture
//!
//! Components follow two patterns:
//!
//! ### Stateless Components (Props-Based Rendering)
//!
//! Built each frame from values copied or borrowed out of `App`:
//! - `Header`: brand, active thread, transient status, locale toggle
//! - `Message`: one chat bubble or result card
//! - `EmptyState`: call to action for a thread with no messages
//!
//! ### Stateful Components (Event-Driven)
//!
//! A persistent `*State` lives in `TuiState`; a transient wrapper borrows
//! it for rendering. Event handling lives on whichever side has the data
//! it needs:
//! - `MessageList` / `MessageListState`: scrolling and layout caching
//! - `ComposerView` / `ComposerViewState`: draft text, chips and cursor
//! - `Sidebar` / `SidebarState`: thread list, search, rename, delete
//! - `ToolPicker` / `ToolPickerState`: workflow overlay
//! - `Prompt` / `PromptState`: one-line entry for paths and titles
//!
//! Components receive external data as props, never by reaching into
//! global state, so each one can be rendered on its own in tests.
//!
//! ```text
//! components/
//! ├── header.rs        (top bar)
//! ├── sidebar.rs       (threads + workflows)
//! ├── message.rs       (single message renderer)
//! ├── result_card.rs   (DUT / sweep / DC-bias card bodies)
//! ├── message_list.rs  (scrollable message container)
//! ├── empty_state.rs   (no messages yet)
//! ├── composer/        (draft editor)
//! ├── tool_picker.rs   (workflow overlay)
//! └── prompt.rs        (one-line overlay)
//! ```

use ratatui::layout::{Constraint, Flex, Layout, Rect};

pub mod composer;
pub mod empty_state;
pub mod header;
pub mod message;
pub mod message_list;
pub mod prompt;
pub mod result_card;
pub mod sidebar;
pub mod tool_picker;

pub use composer::{ComposerView, ComposerViewState};
pub use empty_state::EmptyState;
pub use header::Header;
pub use message_list::{MessageList, MessageListState};
pub use prompt::{Prompt, PromptEvent, PromptKind, PromptState};
pub use sidebar::{Sidebar, SidebarEvent, SidebarState};
pub use tool_picker::{ToolPicker, ToolPickerEvent, ToolPickerState};

/// Rect covering `percent_x` by `percent_y` of `outer`, centered.
pub(crate) fn centered_rect(percent_x: u16, percent_y: u16, outer: Rect) -> Rect {
    let [row] = Layout::vertical([Constraint::Percentage(percent_y)])
        .flex(Flex::Center)
        .areas(outer);
    let [center] = Layout::horizontal([Constraint::Percentage(percent_x)])
        .flex(Flex::Center)
        .areas(row);
    center
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_centered_rect_is_inside_and_centered() {
        let outer = Rect::new(0, 0, 100, 40);
        let rect = centered_rect(70, 50, outer);
        assert_eq!((rect.width, rect.height), (70, 20));
        assert_eq!((rect.x, rect.y), (15, 10));
    }
}
