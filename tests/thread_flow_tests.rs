use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, mpsc};
use std::time::Duration;

use async_trait::async_trait;
use wk_insight::analysis::{
    AnalysisError, AnalysisProvider, AnalysisReply, AnalysisRequest, MockProvider, canned_reply,
};
use wk_insight::core::action::Action;
use wk_insight::core::composer::Edit;
use wk_insight::core::config::ResolvedConfig;
use wk_insight::core::export::{Clipboard, ClipboardError};
use wk_insight::core::locale::Locale;
use wk_insight::core::state::App;
use wk_insight::core::thread::TurnState;
use wk_insight::core::types::MessageBody;
use wk_insight::tui::runtime::EffectRunner;

// ============================================================================
// Helper Functions
// ============================================================================

const DELAY: Duration = Duration::from_millis(800);
const TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Default)]
struct RecordingClipboard {
    writes: Vec<String>,
}

impl Clipboard for RecordingClipboard {
    fn set_text(&mut self, text: &str) -> Result<(), ClipboardError> {
        self.writes.push(text.to_string());
        Ok(())
    }
}

/// Fails the first `failures` calls, then answers like the mock.
struct FlakyProvider {
    failures: usize,
    calls: AtomicUsize,
}

#[async_trait]
impl AnalysisProvider for FlakyProvider {
    fn name(&self) -> &str {
        "flaky"
    }

    async fn analyze(&self, request: &AnalysisRequest) -> Result<AnalysisReply, AnalysisError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        tokio::time::sleep(DELAY).await;
        if call < self.failures {
            Err(AnalysisError::Service("instrument offline".into()))
        } else {
            Ok(canned_reply(request.mode))
        }
    }
}

fn config() -> ResolvedConfig {
    ResolvedConfig {
        locale: Locale::En,
        typing_delay: DELAY,
        analysis_timeout: TIMEOUT,
        seed_examples: false,
        ..ResolvedConfig::default()
    }
}

fn setup(
    provider: Arc<dyn AnalysisProvider>,
) -> (App, EffectRunner<RecordingClipboard>, mpsc::Receiver<Action>) {
    let config = config();
    let (tx, rx) = mpsc::channel();
    let runner = EffectRunner::new(tx, RecordingClipboard::default(), config.analysis_timeout);
    (App::new(provider, config), runner, rx)
}

fn send(app: &mut App, runner: &mut EffectRunner<RecordingClipboard>, text: &str) {
    runner.dispatch(app, Action::Edit(Edit::Paste(text.into())));
    runner.dispatch(app, Action::Submit);
}

/// Let the paused clock run past `by`, then apply everything that arrived.
async fn settle(
    app: &mut App,
    runner: &mut EffectRunner<RecordingClipboard>,
    rx: &mpsc::Receiver<Action>,
    by: Duration,
) -> usize {
    tokio::time::sleep(by).await;
    let mut delivered = 0;
    while let Ok(action) = rx.try_recv() {
        runner.dispatch(app, action);
        delivered += 1;
    }
    delivered
}

fn has_result(app: &App, thread_id: &str) -> bool {
    app.store.messages(thread_id).iter().any(|m| {
        matches!(
            m.body,
            MessageBody::DutResult { .. } | MessageBody::GraphResult { .. }
        )
    })
}

// ============================================================================
// Tests
// ============================================================================

#[tokio::test(start_paused = true)]
async fn test_two_threads_analyze_concurrently() {
    let (mut app, mut runner, rx) = setup(Arc::new(MockProvider::new(DELAY)));

    send(&mut app, &mut runner, "What is this inductor?");
    let first = app.store.active_id().to_string();

    runner.dispatch(&mut app, Action::NewChat);
    let second = app.store.active_id().to_string();
    assert_ne!(first, second);
    send(&mut app, &mut runner, "Read this sweep");

    assert_eq!(runner.in_flight(), 2);
    assert!(app.store.is_typing(&first));
    assert!(app.store.is_typing(&second));

    let delivered = settle(&mut app, &mut runner, &rx, DELAY * 2).await;
    assert_eq!(delivered, 2);
    assert_eq!(runner.in_flight(), 0);
    assert!(has_result(&app, &first));
    assert!(has_result(&app, &second));
    // Replies land in their own thread, not the visible one
    assert_eq!(app.store.active_id(), second);
}

#[tokio::test(start_paused = true)]
async fn test_deleting_thread_drops_its_reply() {
    let (mut app, mut runner, rx) = setup(Arc::new(MockProvider::new(DELAY)));

    send(&mut app, &mut runner, "Identify this DUT");
    let doomed = app.store.active_id().to_string();
    runner.dispatch(&mut app, Action::DeleteThread(doomed.clone()));
    assert_eq!(runner.in_flight(), 0);

    let delivered = settle(&mut app, &mut runner, &rx, DELAY * 2).await;
    assert_eq!(delivered, 0);
    assert!(!app.store.contains(&doomed));
    assert!(app.active_messages().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_failure_then_retry() {
    let provider = Arc::new(FlakyProvider {
        failures: 1,
        calls: AtomicUsize::new(0),
    });
    let (mut app, mut runner, rx) = setup(provider.clone());

    send(&mut app, &mut runner, "Where does it saturate?");
    let thread_id = app.store.active_id().to_string();
    settle(&mut app, &mut runner, &rx, DELAY * 2).await;

    assert!(matches!(
        app.store.turn(&thread_id),
        TurnState::Failed { error } if error.contains("instrument offline")
    ));
    assert!(app.status_message.is_some());
    assert!(!has_result(&app, &thread_id));

    runner.dispatch(&mut app, Action::Retry);
    assert!(app.store.is_typing(&thread_id));
    settle(&mut app, &mut runner, &rx, DELAY * 2).await;

    assert_eq!(provider.calls.load(Ordering::SeqCst), 2);
    assert_eq!(*app.store.turn(&thread_id), TurnState::Idle);
    assert!(has_result(&app, &thread_id));
    // The user message is not duplicated by the retry
    let user_messages = app
        .store
        .messages(&thread_id)
        .iter()
        .filter(|m| matches!(m.body, MessageBody::UserText { .. }))
        .count();
    assert_eq!(user_messages, 1);
}

#[tokio::test(start_paused = true)]
async fn test_slow_provider_times_out() {
    let (mut app, mut runner, rx) = setup(Arc::new(MockProvider::new(TIMEOUT * 10)));

    send(&mut app, &mut runner, "Identify this DUT");
    let thread_id = app.store.active_id().to_string();
    let delivered = settle(&mut app, &mut runner, &rx, TIMEOUT + DELAY).await;

    assert_eq!(delivered, 1);
    assert!(matches!(app.store.turn(&thread_id), TurnState::Failed { .. }));
    assert!(!has_result(&app, &thread_id));
}

#[tokio::test(start_paused = true)]
async fn test_export_after_reply_reaches_clipboard() {
    let (mut app, mut runner, rx) = setup(Arc::new(MockProvider::new(DELAY)));

    send(&mut app, &mut runner, "Identify this DUT");
    settle(&mut app, &mut runner, &rx, DELAY * 2).await;

    runner.dispatch(&mut app, Action::CopyResultJson);
    runner.dispatch(&mut app, Action::ExportThread);
    assert_eq!(app.status_message.as_deref(), Some(app.labels().exported));

    runner.dispatch(&mut app, Action::CopyResultSummary);

    let writes = &runner.clipboard().writes;
    assert_eq!(writes.len(), 3);
    let json: serde_json::Value = serde_json::from_str(&writes[0]).unwrap();
    assert!(json.is_object());
    assert!(writes[1].contains("Identify this DUT"));
}
