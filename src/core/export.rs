//! # Export and Share
//!
//! Clipboard payloads for result cards and whole threads, and the
//! [`Clipboard`] seam the terminal adapter implements.
//!
//! Thread export and share produce the same document:
//!
//! ```json
//! { "thread": { "id": "...", "title": "...", ... }, "messages": [ ... ] }
//! ```

use std::fmt;

use serde::Serialize;

use super::types::{Message, Thread};
use crate::analysis::{DutResult, GraphResult};

/// What a clipboard write was for. Decides the status line shown afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CopyKind {
    ResultJson,
    ResultSummary,
    ThreadExport,
    ThreadShare,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ClipboardError {
    Unavailable(String),
    Write(String),
    Encode(String),
}

impl fmt::Display for ClipboardError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClipboardError::Unavailable(msg) => write!(f, "clipboard unavailable: {msg}"),
            ClipboardError::Write(msg) => write!(f, "clipboard write failed: {msg}"),
            ClipboardError::Encode(msg) => write!(f, "could not encode payload: {msg}"),
        }
    }
}

impl std::error::Error for ClipboardError {}

impl From<serde_json::Error> for ClipboardError {
    fn from(err: serde_json::Error) -> Self {
        ClipboardError::Encode(err.to_string())
    }
}

/// Somewhere text can be copied to.
pub trait Clipboard {
    fn set_text(&mut self, text: &str) -> Result<(), ClipboardError>;
}

#[derive(Serialize)]
struct ThreadDocument<'a> {
    thread: &'a Thread,
    messages: &'a [Message],
}

/// Pretty-printed `{ thread, messages }` document.
pub fn thread_json(thread: &Thread, messages: &[Message]) -> Result<String, ClipboardError> {
    Ok(serde_json::to_string_pretty(&ThreadDocument { thread, messages })?)
}

pub fn dut_json(result: &DutResult) -> Result<String, ClipboardError> {
    Ok(serde_json::to_string_pretty(result)?)
}

pub fn graph_json(result: &GraphResult) -> Result<String, ClipboardError> {
    Ok(serde_json::to_string_pretty(result)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::{AnalysisResult, canned_reply};
    use crate::core::locale::Locale;
    use crate::core::thread::ThreadStore;
    use crate::core::types::AnalysisMode;

    #[test]
    fn test_thread_json_shape() {
        let mut store = ThreadStore::new(Locale::En, AnalysisMode::IdentifyDut);
        let id = store.active_id().to_string();
        store.append_user_message(&id, "TDK inductor", &[]).unwrap();
        store.complete_assistant_response(&id, canned_reply(AnalysisMode::IdentifyDut));

        let json = thread_json(store.thread(&id).unwrap(), store.messages(&id)).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["thread"]["title"], "TDK inductor");
        assert_eq!(value["thread"]["mode"], "identify_dut");
        let messages = value["messages"].as_array().unwrap();
        assert_eq!(messages.len(), 3);
        assert_eq!(messages[0]["type"], "text");
        assert_eq!(messages[2]["type"], "dut_result");
        assert_eq!(messages[2]["result"]["componentType"], "Inductor");
    }

    #[test]
    fn test_graph_json_is_camel_case() {
        let AnalysisResult::GraphInterpretation(graph) =
            canned_reply(AnalysisMode::DcBiasSaturation).result
        else {
            panic!("expected a graph result");
        };
        let json = graph_json(&graph).unwrap();
        assert!(json.contains("\"dcBiasMeta\""));
        assert!(json.contains("\"graphTypeGuess\""));
    }
}
