//! # Conversation Thread Store
//!
//! Owns every thread, its messages and its turn state.
//!
//! ```text
//! ThreadStore
//! ├── threads: Vec<Thread>                  // display order, newest first
//! ├── messages: HashMap<ThreadId, Vec<Message>>
//! ├── turns: HashMap<ThreadId, TurnState>   // Idle | Typing | Failed
//! └── active: ThreadId                      // always names a thread in `threads`
//! ```
//!
//! Per-thread lifecycle:
//!
//! ```text
//! Draft ──send──▶ Active(has messages) ──clear──▶ Active(empty)
//!
//! turn:  Idle ──send──▶ Typing ──reply──▶ Idle
//!                         │
//!                         └──error──▶ Failed ──retry──▶ Typing
//! ```
//!
//! Invariants kept by every operation:
//! - at most one thread has `is_draft`
//! - `active` always names an existing thread
//! - replies addressed to a deleted thread are dropped

use std::collections::HashMap;
use std::fmt;

use chrono::{TimeDelta, Utc};
use log::{debug, info};

use super::format::{collapse_whitespace, truncate};
use super::locale::{Locale, labels};
use super::types::{AnalysisMode, LocalImage, Message, MessageBody, Thread, ThreadId, new_id};
use crate::analysis::{AnalysisReply, AnalysisResult, canned_reply};

/// Maximum characters in an auto-generated title, ellipsis included.
pub const TITLE_MAX_CHARS: usize = 32;

#[derive(Debug, Clone, PartialEq)]
pub enum StoreError {
    /// Neither text nor images.
    EmptySubmission,
    /// Rename to a blank title.
    EmptyTitle,
    UnknownThread(ThreadId),
    /// The thread is still waiting for a reply.
    Busy(ThreadId),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::EmptySubmission => write!(f, "nothing to send"),
            StoreError::EmptyTitle => write!(f, "title cannot be empty"),
            StoreError::UnknownThread(id) => write!(f, "unknown thread: {id}"),
            StoreError::Busy(id) => write!(f, "thread {id} is waiting for a reply"),
        }
    }
}

impl std::error::Error for StoreError {}

#[derive(Debug, Clone, Default, PartialEq)]
pub enum TurnState {
    #[default]
    Idle,
    Typing,
    Failed {
        error: String,
    },
}

pub struct ThreadStore {
    threads: Vec<Thread>,
    messages: HashMap<ThreadId, Vec<Message>>,
    turns: HashMap<ThreadId, TurnState>,
    active: ThreadId,
    locale: Locale,
    /// Mode of the draft synthesized when the last thread is deleted.
    default_mode: AnalysisMode,
}

impl ThreadStore {
    /// A store holding a single empty draft.
    pub fn new(locale: Locale, mode: AnalysisMode) -> Self {
        let draft = Self::draft(locale, mode);
        let active = draft.id.clone();
        Self {
            messages: HashMap::from([(active.clone(), Vec::new())]),
            turns: HashMap::new(),
            threads: vec![draft],
            active,
            locale,
            default_mode: mode,
        }
    }

    /// Like [`ThreadStore::new`], followed by one finished example
    /// conversation per analysis mode. The draft stays first and active.
    pub fn with_examples(locale: Locale, mode: AnalysisMode) -> Self {
        let mut store = Self::new(locale, mode);
        let now = Utc::now();
        for (age, (example_mode, image_url, caption)) in EXAMPLES.iter().enumerate() {
            let thread = Thread {
                id: new_id(),
                title: example_mode.title(locale).to_string(),
                mode: *example_mode,
                updated_at: now - TimeDelta::minutes(age as i64 + 1),
                is_draft: false,
                placeholder_title: false,
            };
            let mut messages = vec![Message::new(MessageBody::UserImage {
                image_url: image_url.to_string(),
                caption: Some(caption.to_string()),
                mode: *example_mode,
            })];
            messages.extend(reply_messages(canned_reply(*example_mode)));
            store.messages.insert(thread.id.clone(), messages);
            store.threads.push(thread);
        }
        debug!("seeded {} example threads", EXAMPLES.len());
        store
    }

    fn draft(locale: Locale, mode: AnalysisMode) -> Thread {
        Thread {
            id: new_id(),
            title: labels(locale).new_chat.to_string(),
            mode,
            updated_at: Utc::now(),
            is_draft: true,
            placeholder_title: true,
        }
    }

    // ── Queries ─────────────────────────────────────────────────────────────

    pub fn threads(&self) -> &[Thread] {
        &self.threads
    }

    pub fn thread(&self, id: &str) -> Option<&Thread> {
        self.threads.iter().find(|t| t.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.thread(id).is_some()
    }

    pub fn active_id(&self) -> &str {
        &self.active
    }

    pub fn active_thread(&self) -> Option<&Thread> {
        self.thread(&self.active)
    }

    pub fn messages(&self, id: &str) -> &[Message] {
        self.messages.get(id).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn turn(&self, id: &str) -> &TurnState {
        static IDLE: TurnState = TurnState::Idle;
        self.turns.get(id).unwrap_or(&IDLE)
    }

    pub fn is_typing(&self, id: &str) -> bool {
        matches!(self.turn(id), TurnState::Typing)
    }

    pub fn draft_id(&self) -> Option<&str> {
        self.threads.iter().find(|t| t.is_draft).map(|t| t.id.as_str())
    }

    /// Threads whose title contains `query`, case-insensitively. A blank
    /// query matches everything.
    pub fn filter_threads(&self, query: &str) -> Vec<&Thread> {
        let needle = query.trim().to_lowercase();
        self.threads
            .iter()
            .filter(|t| needle.is_empty() || t.title.to_lowercase().contains(&needle))
            .collect()
    }

    // ── Thread lifecycle ────────────────────────────────────────────────────

    /// Start a conversation in `mode` and make it active.
    ///
    /// An existing draft is reused (retagged, retitled, moved to the front)
    /// so there is never more than one.
    pub fn create_thread(&mut self, mode: AnalysisMode) -> ThreadId {
        let placeholder = labels(self.locale).new_chat.to_string();
        let id = match self.threads.iter().position(|t| t.is_draft) {
            Some(idx) => {
                let mut draft = self.threads.remove(idx);
                draft.mode = mode;
                draft.title = placeholder;
                draft.placeholder_title = true;
                draft.updated_at = Utc::now();
                let id = draft.id.clone();
                self.threads.insert(0, draft);
                id
            }
            None => {
                let draft = Self::draft(self.locale, mode);
                let id = draft.id.clone();
                self.messages.insert(id.clone(), Vec::new());
                self.threads.insert(0, draft);
                id
            }
        };
        debug!("create_thread {id} ({mode:?})");
        self.active = id.clone();
        id
    }

    /// Activate the existing draft, or create one in `mode`.
    pub fn new_chat(&mut self, mode: AnalysisMode) -> ThreadId {
        match self.draft_id() {
            Some(id) => {
                let id = id.to_string();
                self.active = id.clone();
                id
            }
            None => self.create_thread(mode),
        }
    }

    /// Returns `false` (and changes nothing) for an unknown id.
    pub fn select_thread(&mut self, id: &str) -> bool {
        if !self.contains(id) {
            return false;
        }
        self.active = id.to_string();
        true
    }

    /// Remove a thread and everything it owns. Returns its messages, or
    /// `None` if it did not exist.
    ///
    /// Deleting the active thread activates the first remaining one, or a
    /// fresh draft when none remain.
    pub fn delete_thread(&mut self, id: &str) -> Option<Vec<Message>> {
        let idx = self.threads.iter().position(|t| t.id == id)?;
        let thread = self.threads.remove(idx);
        self.turns.remove(id);
        let removed = self.messages.remove(id).unwrap_or_default();
        info!("deleted thread {} ({} messages)", thread.id, removed.len());

        if self.active == id {
            match self.threads.first() {
                Some(next) => self.active = next.id.clone(),
                None => {
                    let draft = Self::draft(self.locale, self.default_mode);
                    self.active = draft.id.clone();
                    self.messages.insert(draft.id.clone(), Vec::new());
                    self.threads.push(draft);
                }
            }
        }
        Some(removed)
    }

    pub fn rename_thread(&mut self, id: &str, title: &str) -> Result<(), StoreError> {
        let title = title.trim();
        if title.is_empty() {
            return Err(StoreError::EmptyTitle);
        }
        let thread = self
            .threads
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or_else(|| StoreError::UnknownThread(id.to_string()))?;
        thread.title = title.to_string();
        thread.placeholder_title = false;
        self.touch(id);
        Ok(())
    }

    /// Empty a thread's messages. Title and mode are kept.
    pub fn clear_thread(&mut self, id: &str) -> Option<Vec<Message>> {
        let messages = self.messages.get_mut(id)?;
        Some(std::mem::take(messages))
    }

    /// Give untouched placeholder titles the label of `locale`.
    pub fn retitle_placeholders(&mut self, locale: Locale) {
        self.locale = locale;
        let title = labels(locale).new_chat;
        for thread in self.threads.iter_mut().filter(|t| t.placeholder_title) {
            thread.title = title.to_string();
        }
    }

    // ── Turns ───────────────────────────────────────────────────────────────

    /// Append the user's side of a turn: one text message (if any text),
    /// then one image message per image, captioned with the text.
    ///
    /// A thread still showing its placeholder takes its title from the text,
    /// or from the mode when only images were sent.
    pub fn append_user_message(
        &mut self,
        thread_id: &str,
        text: &str,
        images: &[LocalImage],
    ) -> Result<AnalysisMode, StoreError> {
        let text = text.trim();
        if text.is_empty() && images.is_empty() {
            return Err(StoreError::EmptySubmission);
        }
        if self.is_typing(thread_id) {
            return Err(StoreError::Busy(thread_id.to_string()));
        }
        let locale = self.locale;
        let thread = self
            .threads
            .iter_mut()
            .find(|t| t.id == thread_id)
            .ok_or_else(|| StoreError::UnknownThread(thread_id.to_string()))?;
        let mode = thread.mode;

        if thread.placeholder_title {
            let sample = if text.is_empty() {
                mode.title(locale).to_string()
            } else {
                collapse_whitespace(text)
            };
            thread.title = truncate(&sample, TITLE_MAX_CHARS);
            thread.placeholder_title = false;
        }
        thread.is_draft = false;

        let caption = (!text.is_empty()).then(|| text.to_string());
        let messages = self.messages.entry(thread_id.to_string()).or_default();
        if !text.is_empty() {
            messages.push(Message::new(MessageBody::UserText {
                text: text.to_string(),
            }));
        }
        for image in images {
            messages.push(Message::new(MessageBody::UserImage {
                image_url: image.url.clone(),
                caption: caption.clone(),
                mode,
            }));
        }
        self.touch(thread_id);
        Ok(mode)
    }

    pub fn begin_assistant_response(&mut self, thread_id: &str) -> bool {
        if !self.contains(thread_id) {
            return false;
        }
        self.turns.insert(thread_id.to_string(), TurnState::Typing);
        true
    }

    /// Append the assistant text and result card. Returns `false` if the
    /// thread no longer exists.
    pub fn complete_assistant_response(&mut self, thread_id: &str, reply: AnalysisReply) -> bool {
        let Some(messages) = self.messages.get_mut(thread_id) else {
            debug!("dropping reply for deleted thread {thread_id}");
            return false;
        };
        messages.extend(reply_messages(reply));
        self.turns.insert(thread_id.to_string(), TurnState::Idle);
        if let Some(thread) = self.threads.iter_mut().find(|t| t.id == thread_id) {
            thread.is_draft = false;
        }
        self.touch(thread_id);
        true
    }

    pub fn fail_assistant_response(&mut self, thread_id: &str, error: &str) -> bool {
        if !self.contains(thread_id) {
            return false;
        }
        self.turns.insert(
            thread_id.to_string(),
            TurnState::Failed {
                error: error.to_string(),
            },
        );
        true
    }

    /// Failed → Typing. Any other state is left alone.
    pub fn retry_assistant_response(&mut self, thread_id: &str) -> bool {
        match self.turns.get_mut(thread_id) {
            Some(turn @ TurnState::Failed { .. }) => {
                *turn = TurnState::Typing;
                true
            }
            _ => false,
        }
    }

    /// Stamp `id` as just updated, move it to the front, then order the
    /// rest by last update.
    fn touch(&mut self, id: &str) {
        let Some(idx) = self.threads.iter().position(|t| t.id == id) else {
            return;
        };
        let mut thread = self.threads.remove(idx);
        thread.updated_at = Utc::now();
        self.threads.insert(0, thread);
        self.threads.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
    }
}

/// Example conversations: mode, image and caption.
const EXAMPLES: [(AnalysisMode, &str, &str); 3] = [
    (AnalysisMode::IdentifyDut, "demo://tdk-power-inductor.jpg", "TDK power inductor"),
    (AnalysisMode::InterpretGraph, "demo://impedance-sweep.png", "Sweep graph"),
    (AnalysisMode::DcBiasSaturation, "demo://dc-bias-curve.png", "L vs DC bias scan"),
];

/// Assistant text followed by the result card.
fn reply_messages(reply: AnalysisReply) -> [Message; 2] {
    let card = match reply.result {
        AnalysisResult::ComponentIdentification(result) => MessageBody::DutResult { result },
        AnalysisResult::GraphInterpretation(result) => MessageBody::GraphResult { result },
    };
    [
        Message::new(MessageBody::AssistantText { text: reply.text }),
        Message::new(card),
    ]
}
