//! # Application State
//!
//! Core business state for WK Insight. This module contains domain logic
//! only, no TUI-specific types. Presentation state lives in the `tui` module.
//!
//! ```text
//! App
//! ├── provider: Arc<dyn AnalysisProvider>   // produces assistant replies
//! ├── store: ThreadStore                    // threads, messages, turn state
//! ├── composer: Composer                    // outgoing draft + image handles
//! ├── locale: Locale                        // zh | en
//! ├── config: ResolvedConfig                // delay, timeout, drop percent
//! ├── pending: HashMap<ThreadId, Request>   // sent or failed, kept for retry
//! └── status_message: Option<String>        // transient feedback line
//! ```
//!
//! State changes only happen through `update(state, action)` in action.rs.

use std::collections::HashMap;
use std::sync::Arc;

use crate::analysis::summary::{dut_summary, graph_summary};
use crate::analysis::{AnalysisProvider, AnalysisRequest};
use crate::core::composer::Composer;
use crate::core::config::ResolvedConfig;
use crate::core::export::{ClipboardError, dut_json, graph_json};
use crate::core::locale::{Labels, Locale, labels};
use crate::core::thread::ThreadStore;
use crate::core::types::{Message, MessageBody, ThreadId};

pub struct App {
    pub provider: Arc<dyn AnalysisProvider>,
    pub store: ThreadStore,
    pub composer: Composer,
    pub locale: Locale,
    pub config: ResolvedConfig,
    pub pending: HashMap<ThreadId, AnalysisRequest>,
    pub status_message: Option<String>,
}

impl App {
    pub fn new(provider: Arc<dyn AnalysisProvider>, config: ResolvedConfig) -> Self {
        Self {
            provider,
            store: if config.seed_examples {
                ThreadStore::with_examples(config.locale, config.default_mode)
            } else {
                ThreadStore::new(config.locale, config.default_mode)
            },
            composer: Composer::new(config.default_mode),
            locale: config.locale,
            config,
            pending: HashMap::new(),
            status_message: None,
        }
    }

    pub fn labels(&self) -> &'static Labels {
        labels(self.locale)
    }

    pub fn active_messages(&self) -> &[Message] {
        self.store.messages(self.store.active_id())
    }

    pub fn active_is_typing(&self) -> bool {
        self.store.is_typing(self.store.active_id())
    }

    pub fn can_send(&self) -> bool {
        self.composer.can_send(self.active_is_typing())
    }

    /// Most recent result card in the active thread.
    pub fn latest_result(&self) -> Option<&MessageBody> {
        self.active_messages()
            .iter()
            .rev()
            .find(|m| m.is_result())
            .map(|m| &m.body)
    }

    pub fn latest_summary(&self) -> Option<String> {
        match self.latest_result()? {
            MessageBody::DutResult { result } => Some(dut_summary(result, self.locale)),
            MessageBody::GraphResult { result } => Some(graph_summary(result, self.locale)),
            _ => None,
        }
    }

    pub fn latest_json(&self) -> Option<Result<String, ClipboardError>> {
        match self.latest_result()? {
            MessageBody::DutResult { result } => Some(dut_json(result)),
            MessageBody::GraphResult { result } => Some(graph_json(result)),
            _ => None,
        }
    }

    /// Release the `local://` handles referenced by messages being dropped.
    pub(crate) fn release_images(&mut self, messages: &[Message]) {
        for message in messages {
            if let MessageBody::UserImage { image_url, .. } = &message.body {
                self.composer.handles.release(image_url);
            }
        }
    }

    /// Point the composer at the active thread's mode.
    pub(crate) fn sync_composer_mode(&mut self) {
        if let Some(thread) = self.store.active_thread() {
            self.composer.mode = thread.mode;
        }
    }
}
