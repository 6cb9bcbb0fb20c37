//! Test utilities shared across the crate.
//!
//! This module is only compiled during tests (`#[cfg(test)]`).

use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use crate::analysis::{
    AnalysisError, AnalysisProvider, AnalysisReply, AnalysisRequest, MockProvider,
};
use crate::core::config::ResolvedConfig;
use crate::core::locale::Locale;
use crate::core::state::App;
use crate::core::types::new_id;

/// A provider that always fails with the given error.
pub struct FailingProvider(pub AnalysisError);

#[async_trait]
impl AnalysisProvider for FailingProvider {
    fn name(&self) -> &str {
        "failing"
    }

    async fn analyze(&self, _request: &AnalysisRequest) -> Result<AnalysisReply, AnalysisError> {
        Err(self.0.clone())
    }
}

/// English config with no typing delay and no example threads.
pub fn test_config() -> ResolvedConfig {
    ResolvedConfig {
        locale: Locale::En,
        typing_delay: Duration::ZERO,
        seed_examples: false,
        ..ResolvedConfig::default()
    }
}

/// Creates a test App backed by an instant MockProvider.
pub fn test_app() -> App {
    App::new(Arc::new(MockProvider::new(Duration::ZERO)), test_config())
}

/// Write a tiny file into a fresh temp directory and return its path.
pub fn temp_image(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("wk-insight-{}", new_id()));
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join(name);
    let mut file = std::fs::File::create(&path).unwrap();
    file.write_all(b"\x89PNG\r\n").unwrap();
    path
}
