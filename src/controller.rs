//! The controller: named UI handlers wired to selector, builder,
//! interpreter and renderer.
//!
//! ```text
//! UiEvent ──► handler ──► SelectorState ──► Visibility ──► sink
//!                                    │
//! submit ──► build ──► Transport ──► interpret ──► render ──► sink
//! ```
//!
//! At most one submission is in flight. The trigger flips to
//! [`TriggerState::Processing`] for the duration of [`Controller::submit`]
//! and a drop guard flips it back on every exit path, including the future
//! being dropped half-way.

use crate::artifact::{ArtifactLink, ArtifactStore};
use crate::config::ClientConfig;
use crate::document::DocumentFile;
use crate::error::{DocGeniusError, ValidationError};
use crate::interpret::{interpret, ResponseEnvelope};
use crate::operation::{OperationKind, SubOperation};
use crate::render::{render, ResultView};
use crate::request::{build, OperationOptions};
use crate::selector::{SelectorState, Visibility};
use crate::sink::{NoopSink, SharedSink, TriggerState};
use crate::transport::Transport;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Instant;
use tracing::{debug, info, warn};

/// Where a file selection came from. Both are treated the same.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileSource {
    Picker,
    DragAndDrop,
}

/// A typed UI event.
#[derive(Debug, Clone)]
pub enum UiEvent {
    OperationChanged(OperationKind),
    BatchStepToggled(SubOperation, bool),
    ZipOutputToggled(bool),
    TargetLanguageChanged(String),
    OutputFormatChanged(String),
    FilesSelected {
        source: FileSource,
        files: Vec<DocumentFile>,
    },
}

/// Operation-dispatch and result-rendering state machine.
pub struct Controller {
    transport: Arc<dyn Transport>,
    sink: SharedSink,
    state: Mutex<SelectorState>,
    files: Mutex<Vec<DocumentFile>>,
    in_flight: AtomicBool,
    artifacts: Option<tokio::sync::Mutex<ArtifactStore>>,
}

impl Controller {
    pub fn new(config: &ClientConfig, transport: Arc<dyn Transport>, sink: SharedSink) -> Self {
        Self {
            transport,
            sink,
            state: Mutex::new(config.initial_state()),
            files: Mutex::new(Vec::new()),
            in_flight: AtomicBool::new(false),
            artifacts: None,
        }
    }

    /// Controller with no sink; callers read the returned views directly.
    pub fn headless(config: &ClientConfig, transport: Arc<dyn Transport>) -> Self {
        Self::new(config, transport, Arc::new(NoopSink))
    }

    /// Publish binary results through `store`, one live link at a time.
    pub fn with_artifact_store(mut self, store: ArtifactStore) -> Self {
        self.artifacts = Some(tokio::sync::Mutex::new(store));
        self
    }

    // ── Queries ──────────────────────────────────────────────────────────

    pub fn state(&self) -> SelectorState {
        lock(&self.state).clone()
    }

    pub fn visibility(&self) -> Visibility {
        lock(&self.state).visibility()
    }

    pub fn selected_files(&self) -> Vec<DocumentFile> {
        lock(&self.files).clone()
    }

    pub fn trigger(&self) -> TriggerState {
        if self.in_flight.load(Ordering::SeqCst) {
            TriggerState::Processing
        } else {
            TriggerState::Ready
        }
    }

    /// Link to the artifact of the most recent binary result, if still live.
    pub async fn current_download(&self) -> Option<ArtifactLink> {
        let store = self.artifacts.as_ref()?;
        let link = store.lock().await.current().cloned();
        link
    }

    // ── Handlers ─────────────────────────────────────────────────────────

    /// Route a typed event to its handler.
    pub fn dispatch(&self, event: UiEvent) {
        match event {
            UiEvent::OperationChanged(kind) => {
                self.on_operation_change(kind);
            }
            UiEvent::BatchStepToggled(sub, enabled) => {
                self.on_batch_toggle(sub, enabled);
            }
            UiEvent::ZipOutputToggled(enabled) => self.on_zip_toggle(enabled),
            UiEvent::TargetLanguageChanged(lang) => self.on_target_language(lang),
            UiEvent::OutputFormatChanged(fmt) => self.on_output_format(fmt),
            UiEvent::FilesSelected { source, files } => self.on_files_selected(source, files),
        }
    }

    pub fn on_operation_change(&self, kind: OperationKind) -> Visibility {
        let v = lock(&self.state).set_operation(kind);
        debug!("Operation set to {kind}");
        self.sink.update_visibility(v);
        v
    }

    pub fn on_batch_toggle(&self, sub: SubOperation, enabled: bool) -> Visibility {
        let v = lock(&self.state).toggle_batch_sub(sub, enabled);
        self.sink.update_visibility(v);
        v
    }

    pub fn on_zip_toggle(&self, enabled: bool) {
        lock(&self.state).set_zip_output(enabled);
    }

    pub fn on_target_language(&self, lang: impl Into<String>) {
        lock(&self.state).set_target_language(lang);
    }

    pub fn on_output_format(&self, fmt: impl Into<String>) {
        lock(&self.state).set_output_format(fmt);
    }

    /// Replace the current selection. Empty selections are ignored, the way
    /// a cancelled file dialog leaves the previous choice in place.
    pub fn on_files_selected(&self, source: FileSource, files: Vec<DocumentFile>) {
        if files.is_empty() {
            return;
        }
        debug!("{} file(s) selected via {:?}", files.len(), source);
        *lock(&self.files) = files;
    }

    // ── Submit ───────────────────────────────────────────────────────────

    /// Build, dispatch, interpret and render one submission.
    ///
    /// Returns `Err` only when nothing was sent (no files, empty batch,
    /// already busy); the host has already been notified. Every other
    /// outcome, including transport and service failures, is an `Ok` view.
    pub async fn submit(&self) -> Result<ResultView, ValidationError> {
        if self
            .in_flight
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            self.sink.notify(&ValidationError::Busy.to_string());
            return Err(ValidationError::Busy);
        }

        let (kind, options) = {
            let state = lock(&self.state);
            (state.operation, OperationOptions::from(&*state))
        };
        let files = self.selected_files();

        let descriptor = match build(kind, &files, &options) {
            Ok(d) => d,
            Err(e) => {
                let reason = match e {
                    DocGeniusError::Validation(v) => v,
                    other => {
                        // build() only fails validation; anything else is a bug.
                        warn!("Unexpected build failure: {other}");
                        ValidationError::NoFiles
                    }
                };
                self.in_flight.store(false, Ordering::SeqCst);
                self.sink.notify(&reason.to_string());
                return Err(reason);
            }
        };

        let _guard = TriggerGuard::engage(&self.in_flight, &self.sink);

        let started = Instant::now();
        let envelope = match self.transport.send(&descriptor).await {
            Ok(raw) => interpret(&descriptor.expectation(), &raw),
            Err(e) => {
                warn!("{} request did not complete: {}", kind, e);
                ResponseEnvelope::from_error(&e)
            }
        };
        info!(
            "{} finished in {}ms ({})",
            kind,
            started.elapsed().as_millis(),
            if envelope.is_failure() { "failed" } else { "ok" }
        );

        self.track_artifact(&envelope).await;

        let view = render(kind, &envelope);
        self.sink.show_result(&view);
        Ok(view)
    }

    async fn track_artifact(&self, envelope: &ResponseEnvelope) {
        let Some(store) = &self.artifacts else { return };
        let mut store = store.lock().await;
        match envelope {
            ResponseEnvelope::Binary { artifact, .. } => {
                if let Err(e) = store.publish(artifact).await {
                    warn!("Could not publish artifact {}: {}", artifact.file_name(), e);
                }
            }
            _ => {
                store.revoke_current().await;
            }
        }
    }
}

impl fmt::Debug for Controller {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Controller")
            .field("state", &*lock(&self.state))
            .field("files", &lock(&self.files).len())
            .field("trigger", &self.trigger())
            .finish()
    }
}

/// Holds the trigger in `Processing`; dropping it restores `Ready`.
struct TriggerGuard<'a> {
    flag: &'a AtomicBool,
    sink: &'a SharedSink,
}

impl<'a> TriggerGuard<'a> {
    fn engage(flag: &'a AtomicBool, sink: &'a SharedSink) -> Self {
        sink.set_trigger(TriggerState::Processing);
        Self { flag, sink }
    }
}

impl Drop for TriggerGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::SeqCst);
        self.sink.set_trigger(TriggerState::Ready);
    }
}

// Handlers never panic while holding a lock, but a host callback might.
fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}
