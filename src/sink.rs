//! Render-sink trait: how the controller talks back to its host.
//!
//! Inject an [`Arc<dyn RenderSink>`] into
//! [`crate::controller::Controller::new`] to receive views, trigger-state
//! changes and blocking notices. A web host maps these onto DOM updates, the
//! CLI maps them onto a spinner and stdout. All methods default to no-ops so
//! hosts only override what they render.
//!
//! # Example
//!
//! ```rust
//! use docgenius_client::{RenderSink, ResultView};
//! use std::sync::Mutex;
//!
//! #[derive(Default)]
//! struct LastTitle(Mutex<Option<String>>);
//!
//! impl RenderSink for LastTitle {
//!     fn show_result(&self, view: &ResultView) {
//!         *self.0.lock().unwrap() = Some(view.title.clone());
//!     }
//! }
//! ```

use crate::render::ResultView;
use crate::selector::Visibility;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// State of the submit control.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TriggerState {
    /// Enabled, showing its normal label.
    #[default]
    Ready,
    /// Disabled while a request is in flight.
    Processing,
}

/// Receives render instructions from the controller.
pub trait RenderSink: Send + Sync {
    /// Auxiliary-field visibility changed (or was recomputed).
    fn update_visibility(&self, visibility: Visibility) {
        let _ = visibility;
    }

    /// Submit control moved between ready and processing.
    fn set_trigger(&self, state: TriggerState) {
        let _ = state;
    }

    /// Blocking notice for input problems; no request was sent.
    fn notify(&self, message: &str) {
        let _ = message;
    }

    /// A result (success or failure) is ready to display.
    fn show_result(&self, view: &ResultView) {
        let _ = view;
    }
}

/// Sink that discards everything. Default when the host renders by polling.
pub struct NoopSink;

impl RenderSink for NoopSink {}

/// Convenience alias for the shared sink handle.
pub type SharedSink = Arc<dyn RenderSink>;
