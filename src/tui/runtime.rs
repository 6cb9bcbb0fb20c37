//! # Effect Runtime
//!
//! Performs the I/O that `update()` asks for. Analyses run as tokio tasks
//! and report back over a std channel that the event loop drains between
//! frames; clipboard writes happen inline and are fed back as
//! `Action::ClipboardDone`.
//!
//! One task per thread at most. Starting a new analysis for a thread aborts
//! the previous one, and deleting a thread aborts its task.

use std::collections::HashMap;
use std::sync::{Arc, mpsc};
use std::time::Duration;

use log::{debug, info, warn};
use tokio::task::AbortHandle;

use crate::analysis::{AnalysisError, AnalysisProvider, AnalysisRequest};
use crate::core::action::{Action, Effect, update};
use crate::core::export::Clipboard;
use crate::core::state::App;
use crate::core::types::ThreadId;

pub struct EffectRunner<C: Clipboard> {
    tx: mpsc::Sender<Action>,
    clipboard: C,
    timeout: Duration,
    in_flight: HashMap<ThreadId, AbortHandle>,
}

impl<C: Clipboard> EffectRunner<C> {
    pub fn new(tx: mpsc::Sender<Action>, clipboard: C, timeout: Duration) -> Self {
        Self {
            tx,
            clipboard,
            timeout,
            in_flight: HashMap::new(),
        }
    }

    /// Apply `action` and run its effect. Returns `true` when the app should quit.
    ///
    /// Must be called inside a tokio runtime, since analyses are spawned.
    pub fn dispatch(&mut self, app: &mut App, action: Action) -> bool {
        if let Action::AnalysisFinished { thread_id, .. } = &action {
            self.in_flight.remove(thread_id);
        }
        match update(app, action) {
            Effect::None => false,
            Effect::Quit => true,
            Effect::SpawnAnalysis(request) => {
                self.spawn_analysis(app.provider.clone(), request);
                false
            }
            Effect::CancelAnalysis(thread_id) => {
                if let Some(handle) = self.in_flight.remove(&thread_id) {
                    info!("Aborting analysis for thread {thread_id}");
                    handle.abort();
                }
                false
            }
            Effect::WriteClipboard { text, kind } => {
                let result = self.clipboard.set_text(&text);
                self.dispatch(app, Action::ClipboardDone { kind, result })
            }
        }
    }

    /// Threads with an analysis task still running.
    pub fn in_flight(&self) -> usize {
        self.in_flight.len()
    }

    pub fn clipboard(&self) -> &C {
        &self.clipboard
    }

    /// Abort every running task, e.g. on shutdown.
    pub fn abort_all(&mut self) {
        for (thread_id, handle) in self.in_flight.drain() {
            debug!("Aborting analysis for thread {thread_id} on shutdown");
            handle.abort();
        }
    }

    fn spawn_analysis(&mut self, provider: Arc<dyn AnalysisProvider>, request: AnalysisRequest) {
        info!(
            "Spawning {} analysis for thread {} ({:?})",
            provider.name(),
            request.thread_id,
            request.mode
        );
        let thread_id = request.thread_id.clone();
        let tx = self.tx.clone();
        let timeout = self.timeout;

        let handle = tokio::spawn(async move {
            let outcome = match tokio::time::timeout(timeout, provider.analyze(&request)).await {
                Ok(outcome) => outcome,
                Err(_) => {
                    warn!(
                        "Analysis for thread {} timed out after {:?}",
                        request.thread_id, timeout
                    );
                    Err(AnalysisError::Timeout(timeout))
                }
            };
            let action = Action::AnalysisFinished {
                thread_id: request.thread_id,
                outcome,
            };
            if tx.send(action).is_err() {
                warn!("Failed to deliver analysis result: receiver dropped");
            }
        });

        if let Some(previous) = self.in_flight.insert(thread_id, handle.abort_handle()) {
            previous.abort();
        }
    }
}

impl<C: Clipboard> Drop for EffectRunner<C> {
    fn drop(&mut self) {
        self.abort_all();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::export::ClipboardError;
    use crate::core::thread::TurnState;
    use crate::test_support::{FailingProvider, test_app};

    #[derive(Default)]
    struct MemoryClipboard {
        writes: Vec<String>,
        fail: bool,
    }

    impl Clipboard for MemoryClipboard {
        fn set_text(&mut self, text: &str) -> Result<(), ClipboardError> {
            if self.fail {
                return Err(ClipboardError::Unavailable("headless".into()));
            }
            self.writes.push(text.to_string());
            Ok(())
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_submit_spawns_and_reply_arrives() {
        let (tx, rx) = mpsc::channel();
        let mut runner = EffectRunner::new(tx, MemoryClipboard::default(), Duration::from_secs(5));
        let mut app = test_app();
        app.composer.set_text("What is this part?");

        assert!(!runner.dispatch(&mut app, Action::Submit));
        assert_eq!(runner.in_flight(), 1);
        assert!(app.active_is_typing());

        tokio::time::sleep(Duration::from_millis(10)).await;
        let action = rx.try_recv().unwrap();
        runner.dispatch(&mut app, action);
        assert_eq!(runner.in_flight(), 0);
        assert!(!app.active_is_typing());
        assert!(app.latest_result().is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn test_provider_error_fails_the_turn() {
        let (tx, rx) = mpsc::channel();
        let mut runner = EffectRunner::new(tx, MemoryClipboard::default(), Duration::from_secs(5));
        let mut app = test_app();
        app.provider = Arc::new(FailingProvider(AnalysisError::Transport("unplugged".into())));
        app.composer.set_text("What is this part?");
        runner.dispatch(&mut app, Action::Submit);

        tokio::time::sleep(Duration::from_millis(10)).await;
        let action = rx.try_recv().unwrap();
        runner.dispatch(&mut app, action);
        let thread_id = app.store.active_id().to_string();
        assert!(matches!(
            app.store.turn(&thread_id),
            TurnState::Failed { error } if error.contains("unplugged")
        ));
        assert!(app.pending.contains_key(&thread_id));
        assert!(app.latest_result().is_none());
    }

    #[tokio::test]
    async fn test_clipboard_result_is_fed_back() {
        let (tx, _rx) = mpsc::channel();
        let mut runner = EffectRunner::new(tx, MemoryClipboard::default(), Duration::from_secs(5));
        let mut app = test_app();
        app.composer.set_text("hello");
        update(&mut app, Action::Submit);

        runner.dispatch(&mut app, Action::ExportThread);
        assert_eq!(runner.clipboard.writes.len(), 1);
        assert!(runner.clipboard.writes[0].contains("hello"));
        assert_eq!(app.status_message.as_deref(), Some(app.labels().exported));
    }

    #[tokio::test]
    async fn test_clipboard_failure_sets_status() {
        let (tx, _rx) = mpsc::channel();
        let clipboard = MemoryClipboard {
            fail: true,
            ..Default::default()
        };
        let mut runner = EffectRunner::new(tx, clipboard, Duration::from_secs(5));
        let mut app = test_app();
        app.composer.set_text("hello");
        update(&mut app, Action::Submit);

        runner.dispatch(&mut app, Action::ExportThread);
        assert_eq!(app.status_message.as_deref(), Some(app.labels().copy_failed));
    }
}
