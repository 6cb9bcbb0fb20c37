//! # Actions
//!
//! Everything that can happen in WK Insight becomes an `Action`.
//! User presses Enter? That's `Action::Submit`.
//! The analysis task finishes? That's `Action::AnalysisFinished { .. }`.
//!
//! `update()` applies an action to the state and returns an [`Effect`]
//! describing the I/O the adapter should perform. No side effects here.
//!
//! ```text
//! State + Action  →  update()  →  New State + Effect
//! ```

use std::path::PathBuf;

use log::{debug, info, warn};

use crate::analysis::{AnalysisError, AnalysisReply, AnalysisRequest};
use crate::core::composer::Edit;
use crate::core::export::{ClipboardError, CopyKind, thread_json};
use crate::core::state::App;
use crate::core::thread::StoreError;
use crate::core::types::{AnalysisMode, ThreadId};

#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// Edit the composer text.
    Edit(Edit),
    /// Send the composer contents to the active thread.
    Submit,
    AnalysisFinished {
        thread_id: ThreadId,
        outcome: Result<AnalysisReply, AnalysisError>,
    },
    /// Resend the last request of the active thread after a failure.
    Retry,
    /// Go to the draft thread, creating one if needed.
    NewChat,
    /// Start (or retag the draft) in a specific mode.
    SelectMode(AnalysisMode),
    SelectThread(ThreadId),
    DeleteThread(ThreadId),
    RenameThread {
        thread_id: ThreadId,
        title: String,
    },
    ClearThread,
    ToggleLocale,
    AttachImage(PathBuf),
    RemoveImage(String),
    RemoveLastImage,
    InsertSummary,
    CopyResultJson,
    CopyResultSummary,
    ExportThread,
    ShareThread(ThreadId),
    ClipboardDone {
        kind: CopyKind,
        result: Result<(), ClipboardError>,
    },
    Quit,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    None,
    Quit,
    /// Run the analysis in the background and report back with
    /// `Action::AnalysisFinished`.
    SpawnAnalysis(AnalysisRequest),
    /// Abort any in-flight analysis for the thread.
    CancelAnalysis(ThreadId),
    WriteClipboard {
        text: String,
        kind: CopyKind,
    },
}

pub fn update(app: &mut App, action: Action) -> Effect {
    match action {
        Action::Edit(edit) => {
            app.composer.edit(edit);
            Effect::None
        }
        Action::Submit => submit(app),
        Action::AnalysisFinished { thread_id, outcome } => {
            match outcome {
                Ok(reply) => {
                    if app.store.complete_assistant_response(&thread_id, reply) {
                        app.pending.remove(&thread_id);
                    } else {
                        debug!("discarding reply for missing thread {thread_id}");
                    }
                }
                Err(err) => {
                    warn!("analysis for thread {thread_id} failed: {err}");
                    if app.store.fail_assistant_response(&thread_id, &err.to_string()) {
                        app.status_message = Some(format!("{}: {err}", app.labels().failed));
                    }
                }
            }
            Effect::None
        }
        Action::Retry => {
            let thread_id = app.store.active_id().to_string();
            let Some(request) = app.pending.get(&thread_id).cloned() else {
                return Effect::None;
            };
            if !app.store.retry_assistant_response(&thread_id) {
                return Effect::None;
            }
            info!("retrying analysis for thread {thread_id}");
            app.status_message = None;
            Effect::SpawnAnalysis(request)
        }
        Action::NewChat => {
            app.store.new_chat(app.config.default_mode);
            app.composer.discard();
            app.sync_composer_mode();
            Effect::None
        }
        Action::SelectMode(mode) => {
            app.store.create_thread(mode);
            app.composer.discard();
            app.sync_composer_mode();
            Effect::None
        }
        Action::SelectThread(thread_id) => {
            if app.store.select_thread(&thread_id) {
                app.sync_composer_mode();
            }
            Effect::None
        }
        Action::DeleteThread(thread_id) => {
            let Some(removed) = app.store.delete_thread(&thread_id) else {
                return Effect::None;
            };
            app.release_images(&removed);
            app.pending.remove(&thread_id);
            app.sync_composer_mode();
            Effect::CancelAnalysis(thread_id)
        }
        Action::RenameThread { thread_id, title } => {
            if let Err(err) = app.store.rename_thread(&thread_id, &title) {
                app.status_message = Some(err.to_string());
            }
            Effect::None
        }
        Action::ClearThread => {
            let thread_id = app.store.active_id().to_string();
            if let Some(removed) = app.store.clear_thread(&thread_id) {
                app.release_images(&removed);
                app.status_message = Some(app.labels().cleared.to_string());
            }
            Effect::None
        }
        Action::ToggleLocale => {
            app.locale = app.locale.toggle();
            app.store.retitle_placeholders(app.locale);
            app.status_message = None;
            Effect::None
        }
        Action::AttachImage(path) => {
            match app.composer.add_image(&path) {
                Ok(_) => app.status_message = None,
                Err(err) => app.status_message = Some(err.to_string()),
            }
            Effect::None
        }
        Action::RemoveImage(id) => {
            app.composer.remove_image(&id);
            Effect::None
        }
        Action::RemoveLastImage => {
            if let Some(id) = app.composer.images.last().map(|img| img.id.clone()) {
                app.composer.remove_image(&id);
            }
            Effect::None
        }
        Action::InsertSummary => {
            if let Some(summary) = app.latest_summary() {
                app.composer.insert_summary(&summary);
                app.status_message = Some(app.labels().inserted.to_string());
            }
            Effect::None
        }
        Action::CopyResultJson => match app.latest_json() {
            Some(Ok(text)) => Effect::WriteClipboard {
                text,
                kind: CopyKind::ResultJson,
            },
            Some(Err(err)) => copy_failed(app, &err),
            None => Effect::None,
        },
        Action::CopyResultSummary => match app.latest_summary() {
            Some(text) => Effect::WriteClipboard {
                text,
                kind: CopyKind::ResultSummary,
            },
            None => Effect::None,
        },
        Action::ExportThread => {
            let thread_id = app.store.active_id().to_string();
            thread_document(app, &thread_id, CopyKind::ThreadExport)
        }
        Action::ShareThread(thread_id) => thread_document(app, &thread_id, CopyKind::ThreadShare),
        Action::ClipboardDone { kind, result } => {
            match result {
                Ok(()) => {
                    let labels = app.labels();
                    let label = match kind {
                        CopyKind::ResultJson => labels.copied_json,
                        CopyKind::ResultSummary => labels.copied_summary,
                        CopyKind::ThreadExport => labels.exported,
                        CopyKind::ThreadShare => labels.shared,
                    };
                    app.status_message = Some(label.to_string());
                }
                Err(err) => {
                    copy_failed(app, &err);
                }
            }
            Effect::None
        }
        Action::Quit => Effect::Quit,
    }
}

fn submit(app: &mut App) -> Effect {
    let thread_id = app.store.active_id().to_string();
    let text = app.composer.text.trim().to_string();
    let images = app.composer.images.clone();

    match app.store.append_user_message(&thread_id, &text, &images) {
        Ok(mode) => {
            app.composer.reset();
            app.store.begin_assistant_response(&thread_id);
            app.status_message = None;
            let request = AnalysisRequest {
                thread_id: thread_id.clone(),
                mode,
                text,
                images,
            };
            info!("submitted to thread {thread_id} ({mode:?})");
            app.pending.insert(thread_id, request.clone());
            Effect::SpawnAnalysis(request)
        }
        Err(StoreError::EmptySubmission) => Effect::None,
        Err(err) => {
            app.status_message = Some(err.to_string());
            Effect::None
        }
    }
}

fn thread_document(app: &mut App, thread_id: &str, kind: CopyKind) -> Effect {
    let Some(thread) = app.store.thread(thread_id) else {
        return Effect::None;
    };
    match thread_json(thread, app.store.messages(thread_id)) {
        Ok(text) => Effect::WriteClipboard { text, kind },
        Err(err) => copy_failed(app, &err),
    }
}

fn copy_failed(app: &mut App, err: &ClipboardError) -> Effect {
    warn!("copy failed: {err}");
    app.status_message = Some(app.labels().copy_failed.to_string());
    Effect::None
}
