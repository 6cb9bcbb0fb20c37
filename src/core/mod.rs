//! # Core Application Logic
//!
//! This module contains WK Insight's business logic.
//! It knows nothing about any specific UI technology.
//!
//! ```text
//!                    ┌─────────────────────────┐
//!                    │         CORE            │
//!                    │  (this module)          │
//!                    │                         │
//!                    │  • State (app data)     │
//!                    │  • Action (events)      │
//!                    │  • update() (reducer)   │
//!                    │                         │
//!                    │  No terminal. No tasks. │
//!                    └───────────┬─────────────┘
//!                                │
//!                    ┌───────────┴───────────┐
//!                    ▼                       ▼
//!             ┌────────────┐          ┌────────────┐
//!             │    TUI     │          │  analysis  │
//!             │  Adapter   │          │  provider  │
//!             │ (ratatui)  │          │  (mock)    │
//!             └────────────┘          └────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`state`]: The `App` struct, all application state in one place
//! - [`action`]: The `Action` enum and the `update()` reducer
//! - [`thread`]: Threads, messages and per-thread turn state
//! - [`composer`]: The outgoing draft and its image handles
//! - [`export`]: JSON payloads for copy/export/share and the clipboard seam
//! - [`config`]: Layered configuration
//! - [`locale`], [`types`], [`format`]: shared vocabulary

pub mod action;
pub mod composer;
pub mod config;
pub mod export;
pub mod format;
pub mod locale;
pub mod state;
pub mod thread;
pub mod types;
