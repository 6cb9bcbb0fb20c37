use std::fmt;
use std::time::Duration;

use async_trait::async_trait;

use super::types::AnalysisReply;
use crate::core::types::{AnalysisMode, LocalImage, ThreadId};

/// Errors that can occur while analyzing a submission.
/// Every variant leaves the turn in a failed, retryable state.
#[derive(Debug, Clone, PartialEq)]
pub enum AnalysisError {
    /// Could not reach the analysis service.
    Transport(String),
    /// The service answered with an error.
    Service(String),
    /// No answer within the configured timeout.
    Timeout(Duration),
}

impl fmt::Display for AnalysisError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AnalysisError::Transport(msg) => write!(f, "transport error: {msg}"),
            AnalysisError::Service(msg) => write!(f, "service error: {msg}"),
            AnalysisError::Timeout(after) => {
                write!(f, "no reply after {:.1}s", after.as_secs_f64())
            }
        }
    }
}

impl std::error::Error for AnalysisError {}

/// One user submission, captured at send time.
///
/// `thread_id` is where the reply lands, regardless of which thread is
/// active when it arrives.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisRequest {
    pub thread_id: ThreadId,
    pub mode: AnalysisMode,
    pub text: String,
    pub images: Vec<LocalImage>,
}

#[async_trait]
pub trait AnalysisProvider: Send + Sync {
    /// Returns the name of the provider.
    fn name(&self) -> &str;

    /// Produce the assistant reply for a submission.
    async fn analyze(&self, request: &AnalysisRequest) -> Result<AnalysisReply, AnalysisError>;
}
