//! Request builder: operation + files + options → [`RequestDescriptor`].
//!
//! The descriptor is transport-agnostic. Nothing here touches the network;
//! [`crate::transport`] turns a descriptor into an HTTP call.

use crate::document::DocumentFile;
use crate::error::{DocGeniusError, ValidationError};
use crate::operation::{BatchSelection, OperationKind, SubOperation};
use crate::selector::SelectorState;
use once_cell::sync::Lazy;
use reqwest::Url;
use tracing::debug;

// Throwaway origin so `Url` can do the query encoding for relative paths.
static ENCODING_BASE: Lazy<Url> = Lazy::new(|| Url::parse("http://localhost").unwrap());

/// Comma-separated report formats always requested for a batch.
pub const BATCH_REPORT_FORMATS: &str = "json,md,csv";

/// Per-submission options. Only the fields relevant to the chosen
/// operation end up in the query string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperationOptions {
    pub target_language: String,
    pub output_format: String,
    pub batch: BatchSelection,
    pub zip_output: bool,
}

impl Default for OperationOptions {
    fn default() -> Self {
        Self::from(&SelectorState::default())
    }
}

impl From<&SelectorState> for OperationOptions {
    fn from(state: &SelectorState) -> Self {
        Self {
            target_language: state.target_language.clone(),
            output_format: state.output_format.clone(),
            batch: state.batch.clone(),
            zip_output: state.zip_output,
        }
    }
}

/// How files are attached to the multipart body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileField {
    /// Exactly one file under `file`.
    Single,
    /// Every file under the repeated field `files`.
    Repeated,
}

impl FileField {
    pub fn name(&self) -> &'static str {
        match self {
            FileField::Single => "file",
            FileField::Repeated => "files",
        }
    }
}

/// What the interpreter should expect back for a given request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseExpectation {
    pub operation: OperationKind,
    pub zip_output: bool,
    pub output_format: Option<String>,
}

impl ResponseExpectation {
    /// Convert, or a batch that asked for a zip archive.
    pub fn expects_binary(&self) -> bool {
        match self.operation {
            OperationKind::Convert => true,
            OperationKind::Batch => self.zip_output,
            _ => false,
        }
    }

    /// File name used when the service omits Content-Disposition.
    pub fn fallback_file_name(&self) -> String {
        match self.operation {
            OperationKind::Batch => "batch_results.zip".to_string(),
            _ => format!(
                "converted.{}",
                self.output_format.as_deref().unwrap_or("bin")
            ),
        }
    }
}

/// A fully-resolved submission, ready for a transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestDescriptor {
    pub operation: OperationKind,
    pub endpoint: &'static str,
    /// Insertion-ordered query parameters.
    pub query_params: Vec<(String, String)>,
    pub files: Vec<DocumentFile>,
    pub file_field: FileField,
}

impl RequestDescriptor {
    /// Look up a query parameter by name.
    pub fn param(&self, key: &str) -> Option<&str> {
        self.query_params
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Endpoint plus URL-encoded query, e.g. `/translate?target_language=fr`.
    pub fn path_and_query(&self) -> String {
        let mut url = ENCODING_BASE.clone();
        url.set_path(self.endpoint);
        if !self.query_params.is_empty() {
            url.query_pairs_mut().extend_pairs(self.query_params.iter());
        }
        match url.query() {
            Some(q) => format!("{}?{}", url.path(), q),
            None => url.path().to_string(),
        }
    }

    /// Resolve against the service base URL, keeping any base path prefix.
    pub fn url(&self, base: &Url) -> Result<Url, DocGeniusError> {
        if base.cannot_be_a_base() {
            return Err(DocGeniusError::InvalidUrl {
                url: base.to_string(),
                reason: "URL cannot carry a path".into(),
            });
        }
        let mut url = base.clone();
        let prefix = base.path().trim_end_matches('/');
        url.set_path(&format!("{prefix}{}", self.endpoint));
        url.set_query(None);
        url.set_fragment(None);
        if !self.query_params.is_empty() {
            url.query_pairs_mut().extend_pairs(self.query_params.iter());
        }
        Ok(url)
    }

    pub fn expectation(&self) -> ResponseExpectation {
        ResponseExpectation {
            operation: self.operation,
            zip_output: self.param("zip_output") == Some("true"),
            output_format: self.param("output_format").map(str::to_string),
        }
    }
}

/// Build the descriptor for one submission.
///
/// # Errors
/// [`ValidationError::NoFiles`] when `files` is empty and
/// [`ValidationError::EmptyBatchSelection`] for a batch with no steps.
pub fn build(
    kind: OperationKind,
    files: &[DocumentFile],
    options: &OperationOptions,
) -> Result<RequestDescriptor, DocGeniusError> {
    if files.is_empty() {
        return Err(ValidationError::NoFiles.into());
    }

    let mut params: Vec<(String, String)> = Vec::new();
    let mut push = |k: &str, v: &str| params.push((k.to_string(), v.to_string()));

    let (files, file_field) = match kind {
        OperationKind::Summarize | OperationKind::Analyze => {
            (vec![files[0].clone()], FileField::Single)
        }
        OperationKind::Translate => {
            push("target_language", &options.target_language);
            (vec![files[0].clone()], FileField::Single)
        }
        OperationKind::Convert => {
            push("output_format", &options.output_format);
            (vec![files[0].clone()], FileField::Single)
        }
        OperationKind::Batch => {
            if options.batch.is_empty() {
                return Err(ValidationError::EmptyBatchSelection.into());
            }
            push("operations", &options.batch.to_csv());
            push("report", "true");
            push("report_formats", BATCH_REPORT_FORMATS);
            push("zip_output", if options.zip_output { "true" } else { "false" });
            if options.batch.contains(SubOperation::Translate) {
                push("target_language", &options.target_language);
            }
            if options.batch.contains(SubOperation::Convert) {
                push("output_format", &options.output_format);
            }
            (files.to_vec(), FileField::Repeated)
        }
    };

    debug!(
        "Built {} request: {} file(s), {} param(s)",
        kind,
        files.len(),
        params.len()
    );

    Ok(RequestDescriptor {
        operation: kind,
        endpoint: kind.endpoint(),
        query_params: params,
        files,
        file_field,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ClientConfig;

    fn doc(name: &str) -> DocumentFile {
        DocumentFile::new(name, b"content".to_vec())
    }

    #[test]
    fn empty_files_is_validation_error() {
        for kind in OperationKind::ALL {
            let err = build(kind, &[], &OperationOptions::default()).unwrap_err();
            assert!(
                matches!(err, DocGeniusError::Validation(ValidationError::NoFiles)),
                "{kind}: {err:?}"
            );
        }
    }

    #[test]
    fn batch_summarize_convert_zip() {
        let opts = OperationOptions {
            batch: BatchSelection::new()
                .with(SubOperation::Summarize)
                .with(SubOperation::Convert),
            zip_output: true,
            output_format: "docx".into(),
            ..Default::default()
        };
        let d = build(OperationKind::Batch, &[doc("a.txt"), doc("b.txt")], &opts).unwrap();
        assert_eq!(d.endpoint, "/batch");
        assert_eq!(d.param("operations"), Some("summarize,convert"));
        assert_eq!(d.param("zip_output"), Some("true"));
        assert_eq!(d.param("report"), Some("true"));
        assert_eq!(d.param("report_formats"), Some("json,md,csv"));
        assert_eq!(d.param("output_format"), Some("docx"));
        assert_eq!(d.param("target_language"), None);
        assert_eq!(d.files.len(), 2);
        assert_eq!(d.file_field.name(), "files");
    }

    #[test]
    fn batch_without_steps_is_rejected() {
        let err = build(OperationKind::Batch, &[doc("a.txt")], &OperationOptions::default())
            .unwrap_err();
        assert!(matches!(
            err,
            DocGeniusError::Validation(ValidationError::EmptyBatchSelection)
        ));
    }

    #[test]
    fn translate_carries_language_only() {
        let opts = OperationOptions {
            target_language: "fr".into(),
            ..Default::default()
        };
        let d = build(OperationKind::Translate, &[doc("a.txt")], &opts).unwrap();
        assert_eq!(d.path_and_query(), "/translate?target_language=fr");
        assert_eq!(d.param("output_format"), None);
    }

    #[test]
    fn non_batch_attaches_only_first_file() {
        let d = build(
            OperationKind::Summarize,
            &[doc("first.txt"), doc("second.txt")],
            &OperationOptions::default(),
        )
        .unwrap();
        assert_eq!(d.files.len(), 1);
        assert_eq!(d.files[0].name(), "first.txt");
        assert_eq!(d.file_field, FileField::Single);
        assert!(d.query_params.is_empty());
        assert_eq!(d.path_and_query(), "/summarize");
    }

    #[test]
    fn url_keeps_base_prefix() {
        let opts = OperationOptions {
            output_format: "pdf".into(),
            ..Default::default()
        };
        let d = build(OperationKind::Convert, &[doc("a.md")], &opts).unwrap();
        let base = Url::parse("http://svc.local:8000/api/").unwrap();
        assert_eq!(
            d.url(&base).unwrap().as_str(),
            "http://svc.local:8000/api/convert?output_format=pdf"
        );
    }

    #[test]
    fn expectation_follows_zip_flag() {
        let mut opts = OperationOptions {
            batch: BatchSelection::new().with(SubOperation::Analyze),
            ..Default::default()
        };
        let d = build(OperationKind::Batch, &[doc("a.txt")], &opts).unwrap();
        assert!(!d.expectation().expects_binary());

        opts.zip_output = true;
        let d = build(OperationKind::Batch, &[doc("a.txt")], &opts).unwrap();
        let exp = d.expectation();
        assert!(exp.expects_binary());
        assert_eq!(exp.fallback_file_name(), "batch_results.zip");
    }

    #[test]
    fn default_options_agree_with_fresh_state_and_config() {
        let from_config = OperationOptions::from(&ClientConfig::default().initial_state());
        assert_eq!(OperationOptions::default(), from_config);
        assert_eq!(OperationOptions::default().target_language, "en");
        assert_eq!(OperationOptions::default().output_format, "md");
        assert!(OperationOptions::default().batch.is_empty());
    }
}
