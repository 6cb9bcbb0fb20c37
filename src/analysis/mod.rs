//! # Analysis Pipeline
//!
//! The seam between the chat UI and whatever produces analysis results.
//!
//! ```text
//! AnalysisRequest ──▶ AnalysisProvider::analyze ──▶ AnalysisReply
//!                      (MockProvider: sleep, then   ├── text   (LocalizedText)
//!                       canned_reply(mode))         └── result (DUT | Graph)
//! ```
//!
//! `summary` and `dc_bias` are pure helpers over the result payloads.

pub mod dc_bias;
pub mod mock;
pub mod provider;
pub mod summary;
pub mod types;

pub use mock::{MockProvider, canned_reply};
pub use provider::{AnalysisError, AnalysisProvider, AnalysisRequest};
pub use types::{AnalysisReply, AnalysisResult, DutResult, GraphResult};
