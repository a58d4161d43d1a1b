//! # docgenius-client
//!
//! Client-side core for a remote document-processing service: pick an
//! operation, attach documents, send them, and turn whatever comes back
//! (JSON, a binary artifact, or an error) into a safe, structured view.
//!
//! ## Flow
//!
//! ```text
//! UI events
//!  │
//!  ├─ 1. Select     operation + batch steps → field visibility   (selector)
//!  ├─ 2. Build      files + options → RequestDescriptor          (request)
//!  ├─ 3. Send       descriptor → RawResponse                     (transport)
//!  ├─ 4. Interpret  RawResponse → ResponseEnvelope               (interpret)
//!  └─ 5. Render     envelope → ResultView                        (render)
//! ```
//!
//! [`Controller`] wires the steps together behind named handlers and keeps
//! at most one request in flight.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use docgenius_client::{
//!     ClientConfig, Controller, DocumentFile, FileSource, HttpTransport, OperationKind,
//! };
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ClientConfig::builder().base_url("http://127.0.0.1:8000").build()?;
//!     let transport = Arc::new(HttpTransport::new(&config)?);
//!     let controller = Controller::headless(&config, transport);
//!
//!     controller.on_operation_change(OperationKind::Translate);
//!     controller.on_target_language("fr");
//!     controller.on_files_selected(
//!         FileSource::Picker,
//!         vec![DocumentFile::from_path("report.txt").await?],
//!     );
//!
//!     let view = controller.submit().await?;
//!     print!("{}", view.to_plain_text());
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `docgenius` binary (clap + anyhow + tracing-subscriber) |

// ── Modules ──────────────────────────────────────────────────────────────

pub mod artifact;
pub mod config;
pub mod controller;
pub mod document;
pub mod error;
pub mod interpret;
pub mod operation;
pub mod render;
pub mod request;
pub mod selector;
pub mod sink;
pub mod transport;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use artifact::{Artifact, ArtifactLink, ArtifactStore};
pub use config::{ClientConfig, ClientConfigBuilder};
pub use controller::{Controller, FileSource, UiEvent};
pub use document::DocumentFile;
pub use error::{DocGeniusError, FailureKind, ValidationError};
pub use interpret::{interpret, RawResponse, ResponseEnvelope};
pub use operation::{BatchSelection, OperationKind, SubOperation};
pub use render::{render, ResultView, Tone, ViewBlock};
pub use request::{build, FileField, OperationOptions, RequestDescriptor, ResponseExpectation};
pub use selector::{SelectorState, Visibility};
pub use sink::{NoopSink, RenderSink, SharedSink, TriggerState};
pub use transport::{HealthStatus, HttpTransport, Transport};
