//! # MessageList Component
//!
//! Scrollable view of the active thread.
//!
//! ## Responsibilities
//!
//! - Display the thread's messages, then a trailing typing or failure row
//! - Manage scrolling (sticky bottom, page keys, mouse wheel)
//! - Cache message heights so only visible messages are built and drawn
//!
//! ## Architecture
//!
//! `MessageList` is a transient component (created each frame) that wraps
//! `&'a mut MessageListState` (persistent state) and `&'a App` (props).
//!
//! Since `Component::render` takes `&mut self`, the layout cache and scroll
//! state are updated during the render pass, like a `StatefulWidget`.

use std::ops::Range;

use ratatui::Frame;
use ratatui::layout::{Position, Rect, Size};
use tui_scrollview::{ScrollView, ScrollViewState, ScrollbarVisibility};

use super::message::{Message, MessageProps};
use crate::core::locale::Locale;
use crate::core::state::App;
use crate::core::thread::TurnState;
use crate::core::types::Message as ChatMessage;
use crate::tui::component::{Component, EventHandler};
use crate::tui::event::TuiEvent;

/// Layout and scroll state for the message list.
/// Must be persisted in the parent TuiState.
pub struct MessageListState {
    pub scroll_state: ScrollViewState,
    pub layout: LayoutCache,
    /// When true, auto-scroll to bottom on new content
    pub stick_to_bottom: bool,
    /// Content arrived below the viewport while scrolled up
    pub has_unseen_content: bool,
    /// Last known viewport height (for scroll clamping between frames)
    pub viewport_height: u16,
    last_total_height: u16,
}

impl Default for MessageListState {
    fn default() -> Self {
        Self::new()
    }
}

impl MessageListState {
    pub fn new() -> Self {
        Self {
            scroll_state: ScrollViewState::default(),
            layout: LayoutCache::new(),
            stick_to_bottom: true,
            has_unseen_content: false,
            viewport_height: 0,
            last_total_height: 0,
        }
    }

    fn max_offset(&self) -> u16 {
        self.layout.total_height().saturating_sub(self.viewport_height)
    }

    /// Clamp scroll offset so it never exceeds the content bounds.
    pub fn clamp_scroll(&mut self) {
        let max_y = self.max_offset();
        let current = self.scroll_state.offset();
        if current.y > max_y {
            self.scroll_state.set_offset(Position {
                x: current.x,
                y: max_y,
            });
        }
    }

    /// Re-engage auto-scroll once the user has scrolled back to the bottom.
    pub fn repin_if_at_bottom(&mut self) {
        let max_y = self.max_offset();
        let current = self.scroll_state.offset();
        if current.y >= max_y {
            self.pin_to_bottom();
        }
    }

    pub fn pin_to_bottom(&mut self) {
        self.stick_to_bottom = true;
        self.has_unseen_content = false;
        self.scroll_state.scroll_to_bottom();
    }
}

impl EventHandler for MessageListState {
    type Event = ();

    fn handle_event(&mut self, event: &TuiEvent) -> Option<()> {
        match event {
            TuiEvent::ScrollUp => {
                self.scroll_state.scroll_up();
                self.stick_to_bottom = false;
            }
            TuiEvent::ScrollDown => {
                self.scroll_state.scroll_down();
                self.repin_if_at_bottom();
            }
            TuiEvent::ScrollPageUp => {
                self.scroll_state.scroll_page_up();
                self.stick_to_bottom = false;
            }
            TuiEvent::ScrollPageDown => {
                self.scroll_state.scroll_page_down();
                self.repin_if_at_bottom();
            }
            TuiEvent::ScrollToBottom => self.pin_to_bottom(),
            _ => {}
        }
        None
    }
}

/// Scrollable conversation view component.
/// Created fresh each frame with references to state and data.
pub struct MessageList<'a> {
    pub state: &'a mut MessageListState,
    pub app: &'a App,
    pub pulse_value: f32,
}

impl MessageList<'_> {
    fn trailing(&self) -> Option<Message> {
        match self.app.store.turn(self.app.store.active_id()) {
            TurnState::Idle => None,
            TurnState::Typing => Some(Message::typing(self.app.locale, self.pulse_value)),
            TurnState::Failed { error } => Some(Message::failed(self.app.locale, error)),
        }
    }
}

impl Component for MessageList<'_> {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let content_width = area.width.saturating_sub(1); // -1 for scrollbar safe area
        let app = self.app;
        let messages: &[ChatMessage] = app.active_messages();
        let latest_result = messages.iter().rposition(ChatMessage::is_result);
        let props_for = |i: usize| MessageProps {
            locale: app.locale,
            drop_percent: app.config.drop_percent,
            handles: &app.composer.handles,
            show_actions: latest_result == Some(i),
        };

        // 1. Update layout cache
        let key = LayoutKey {
            thread_id: app.store.active_id().to_string(),
            message_count: messages.len(),
            content_width,
            locale: app.locale,
            latest_result,
        };
        let trailing = self.trailing();
        let layout = &mut self.state.layout;
        let reusable = layout.reusable_count(&key);
        layout.heights.truncate(reusable);
        for (i, message) in messages.iter().enumerate().skip(layout.heights.len()) {
            layout
                .heights
                .push(Message::from_chat(message, &props_for(i)).height(content_width));
        }
        layout.trailing_height = trailing.as_ref().map_or(0, |m| m.height(content_width));
        layout.rebuild_prefix_heights();
        layout.key = Some(key);

        let total_height = layout.total_height();
        if total_height > self.state.last_total_height && !self.state.stick_to_bottom {
            self.state.has_unseen_content = true;
        }
        self.state.last_total_height = total_height;

        // 2. Clamp scroll offset to prevent overscrolling past content
        self.state.viewport_height = area.height;
        if !self.state.stick_to_bottom {
            self.state.clamp_scroll();
        }

        let scroll_offset = self.state.scroll_state.offset().y;
        let visible = self.state.layout.visible_range(scroll_offset, area.height);

        // 3. Render visible messages into a ScrollView
        let mut scroll_view = ScrollView::new(Size::new(content_width, total_height))
            .vertical_scrollbar_visibility(ScrollbarVisibility::Automatic)
            .horizontal_scrollbar_visibility(ScrollbarVisibility::Never);

        let layout = &self.state.layout;
        let mut y_offset = layout.top_of(visible.start);
        for i in visible {
            let height = layout.heights[i];
            let message = Message::from_chat(&messages[i], &props_for(i));
            scroll_view.render_widget(&message, Rect::new(0, y_offset, content_width, height));
            y_offset += height;
        }
        if let Some(message) = &trailing {
            let top = layout.content_height();
            scroll_view.render_widget(message, Rect::new(0, top, content_width, layout.trailing_height));
        }

        if self.state.stick_to_bottom {
            self.state.scroll_state.scroll_to_bottom();
            self.state.has_unseen_content = false;
        }

        frame.render_stateful_widget(scroll_view, area, &mut self.state.scroll_state);
    }
}

/// Everything a cached height depends on besides the message itself.
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutKey {
    pub thread_id: String,
    pub message_count: usize,
    pub content_width: u16,
    pub locale: Locale,
    /// Index of the card that carries the action hints
    pub latest_result: Option<usize>,
}

/// Cached layout measurements
#[derive(Default)]
pub struct LayoutCache {
    pub heights: Vec<u16>,
    pub prefix_heights: Vec<u16>,
    /// Typing or failure row drawn after the last message
    pub trailing_height: u16,
    key: Option<LayoutKey>,
}

impl LayoutCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// How many cached heights are still valid for `key`.
    ///
    /// Messages never change once appended, so heights only go stale when
    /// the thread, width or locale changes, when messages were removed, or
    /// when the action hints move to a newer result card.
    pub fn reusable_count(&self, key: &LayoutKey) -> usize {
        let Some(cached) = &self.key else {
            return 0;
        };
        if cached.thread_id != key.thread_id
            || cached.content_width != key.content_width
            || cached.locale != key.locale
            || key.message_count < cached.message_count
        {
            return 0;
        }
        let mut reusable = cached.message_count.min(self.heights.len());
        if cached.latest_result != key.latest_result
            && let Some(old) = cached.latest_result
        {
            reusable = reusable.min(old);
        }
        reusable
    }

    pub fn rebuild_prefix_heights(&mut self) {
        self.prefix_heights = self
            .heights
            .iter()
            .scan(0u16, |acc, &h| {
                *acc = acc.saturating_add(h);
                Some(*acc)
            })
            .collect();
    }

    /// Height of the messages alone.
    pub fn content_height(&self) -> u16 {
        self.prefix_heights.last().copied().unwrap_or(0)
    }

    pub fn total_height(&self) -> u16 {
        self.content_height().saturating_add(self.trailing_height)
    }

    fn top_of(&self, index: usize) -> u16 {
        if index == 0 {
            0
        } else {
            self.prefix_heights[index - 1]
        }
    }

    /// Messages overlapping the viewport, padded by half a screen each way.
    pub fn visible_range(&self, scroll_offset: u16, viewport_height: u16) -> Range<usize> {
        let buffer = viewport_height / 2;
        let buffered_start = scroll_offset.saturating_sub(buffer);
        let buffered_end = scroll_offset
            .saturating_add(viewport_height)
            .saturating_add(buffer);

        let start = self
            .prefix_heights
            .partition_point(|&end| end <= buffered_start);
        let end = self
            .prefix_heights
            .partition_point(|&end| end < buffered_end)
            .saturating_add(1)
            .min(self.prefix_heights.len());

        start..end.max(start)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::action::{Action, update};
    use crate::test_support::test_app;
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;

    fn key(count: usize, width: u16) -> LayoutKey {
        LayoutKey {
            thread_id: "t1".into(),
            message_count: count,
            content_width: width,
            locale: Locale::En,
            latest_result: None,
        }
    }

    fn cache_with(count: usize, width: u16) -> LayoutCache {
        let mut cache = LayoutCache::new();
        cache.heights = vec![3; count];
        cache.rebuild_prefix_heights();
        cache.key = Some(key(count, width));
        cache
    }

    #[test]
    fn test_layout_cache_reusable() {
        let cache = cache_with(5, 80);

        // Same everything -> all reusable
        assert_eq!(cache.reusable_count(&key(5, 80)), 5);
        // Appended message -> the old ones survive
        assert_eq!(cache.reusable_count(&key(7, 80)), 5);
        // Width changed -> nothing
        assert_eq!(cache.reusable_count(&key(5, 40)), 0);
        // Cleared thread -> nothing
        assert_eq!(cache.reusable_count(&key(0, 80)), 0);

        let mut other_thread = key(5, 80);
        other_thread.thread_id = "t2".into();
        assert_eq!(cache.reusable_count(&other_thread), 0);

        let mut zh = key(5, 80);
        zh.locale = Locale::Zh;
        assert_eq!(cache.reusable_count(&zh), 0);
    }

    #[test]
    fn test_moving_actions_invalidates_old_card() {
        let mut cache = cache_with(4, 80);
        if let Some(k) = cache.key.as_mut() {
            k.latest_result = Some(2);
        }
        let mut next = key(6, 80);
        next.latest_result = Some(5);
        assert_eq!(cache.reusable_count(&next), 2);
    }

    #[test]
    fn test_empty_cache_reuses_nothing() {
        assert_eq!(LayoutCache::new().reusable_count(&key(3, 80)), 0);
    }

    #[test]
    fn test_visible_range() {
        // 10 messages, each 3 rows → prefix ends 3, 6, ..., 30
        let cache = cache_with(10, 80);

        // Viewport of 6 rows at the top, buffer 3 → rows 0..9 → messages 0..=2
        assert_eq!(cache.visible_range(0, 6), 0..3);
        // Scrolled to row 15 → buffered rows 12..24 → messages 4..=7
        assert_eq!(cache.visible_range(15, 6), 4..8);
        // Past the end → clamps to the last message
        assert_eq!(cache.visible_range(100, 6), 10..10);
    }

    #[test]
    fn test_totals_include_trailing_row() {
        let mut cache = cache_with(2, 80);
        cache.trailing_height = 3;
        assert_eq!(cache.content_height(), 6);
        assert_eq!(cache.total_height(), 9);
    }

    #[test]
    fn test_scroll_up_unpins_and_bottom_repins() {
        let mut state = MessageListState::new();
        state.handle_event(&TuiEvent::ScrollUp);
        assert!(!state.stick_to_bottom);
        state.has_unseen_content = true;
        state.handle_event(&TuiEvent::ScrollToBottom);
        assert!(state.stick_to_bottom);
        assert!(!state.has_unseen_content);
    }

    fn render(state: &mut MessageListState, app: &App, width: u16, height: u16) -> String {
        let backend = TestBackend::new(width, height);
        let mut terminal = Terminal::new(backend).unwrap();
        terminal
            .draw(|f| {
                MessageList {
                    state,
                    app,
                    pulse_value: 0.5,
                }
                .render(f, f.area())
            })
            .unwrap();
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|c| c.symbol())
            .collect()
    }

    #[tokio::test]
    async fn test_renders_messages_and_typing_row() {
        let mut app = test_app();
        app.composer.set_text("Check this inductor");
        update(&mut app, Action::Submit);

        let mut state = MessageListState::new();
        let text = render(&mut state, &app, 80, 20);
        assert!(text.contains("Check this inductor"));
        assert!(text.contains("Analyzing"));
        assert_eq!(state.layout.heights.len(), 1);
        assert!(state.layout.trailing_height > 0);
    }

    #[tokio::test]
    async fn test_failed_turn_shows_retry_hint() {
        let mut app = test_app();
        app.composer.set_text("Sweep please");
        update(&mut app, Action::Submit);
        let id = app.store.active_id().to_string();
        app.store.fail_assistant_response(&id, "boom");

        let mut state = MessageListState::new();
        let text = render(&mut state, &app, 80, 20);
        assert!(text.contains("Analysis failed: boom"));
        assert!(text.contains("Ctrl+R to retry"));
    }

    #[tokio::test]
    async fn test_unseen_content_flag_when_scrolled_up() {
        let mut app = test_app();
        app.composer.set_text("first");
        update(&mut app, Action::Submit);

        let mut state = MessageListState::new();
        render(&mut state, &app, 60, 6);
        state.stick_to_bottom = false;

        let id = app.store.active_id().to_string();
        app.store.fail_assistant_response(&id, "a much longer failure so the trailing row grows taller than before");
        render(&mut state, &app, 60, 6);
        assert!(state.has_unseen_content);
    }
}
