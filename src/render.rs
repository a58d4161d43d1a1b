//! Result renderer: operation + envelope → [`ResultView`].
//!
//! The view is a structured list of blocks. Service-controlled strings only
//! ever land in [`ViewBlock::Text`] or [`ViewBlock::Preformatted`], which
//! hosts must insert as plain text. No markup is assembled here.

use crate::artifact::Artifact;
use crate::interpret::ResponseEnvelope;
use crate::operation::OperationKind;
use serde::Serialize;
use serde_json::Value;

/// Visual emphasis hint, mirroring alert styles in a web host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Tone {
    Success,
    Info,
    Primary,
    Danger,
}

/// One renderable unit of the result body.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ViewBlock {
    /// Paragraph of plain text.
    Text { text: String },
    /// Monospaced, whitespace-preserving text (pretty-printed JSON).
    Preformatted { text: String },
    /// Download affordance for a binary artifact.
    Download {
        label: String,
        file_name: String,
        #[serde(skip)]
        artifact: Artifact,
    },
}

/// Operation-tagged view-model for one result.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResultView {
    pub operation: OperationKind,
    pub tone: Tone,
    pub title: String,
    pub blocks: Vec<ViewBlock>,
    /// Secondary line `request_id: <id>` when the service sent one.
    pub request_id_line: Option<String>,
}

impl ResultView {
    fn new(operation: OperationKind, tone: Tone, title: &str, blocks: Vec<ViewBlock>) -> Self {
        Self {
            operation,
            tone,
            title: title.to_string(),
            blocks,
            request_id_line: None,
        }
    }

    pub fn is_error(&self) -> bool {
        self.tone == Tone::Danger
    }

    /// The artifact behind the first download block, if any.
    pub fn artifact(&self) -> Option<&Artifact> {
        self.blocks.iter().find_map(|b| match b {
            ViewBlock::Download { artifact, .. } => Some(artifact),
            _ => None,
        })
    }

    /// Terminal rendering: title line, blocks, then the request id.
    pub fn to_plain_text(&self) -> String {
        let mut out = String::new();
        out.push_str(&self.title);
        out.push('\n');
        for block in &self.blocks {
            match block {
                ViewBlock::Text { text } | ViewBlock::Preformatted { text } => {
                    out.push_str(text);
                    out.push('\n');
                }
                ViewBlock::Download {
                    label, file_name, ..
                } => {
                    out.push_str(&format!("{label}: {file_name}\n"));
                }
            }
        }
        if let Some(line) = &self.request_id_line {
            out.push_str(line);
            out.push('\n');
        }
        out
    }
}

/// Render a result. Pure: same inputs, same view.
pub fn render(kind: OperationKind, envelope: &ResponseEnvelope) -> ResultView {
    let mut view = match envelope {
        ResponseEnvelope::Failure { message, .. } => ResultView::new(
            kind,
            Tone::Danger,
            "Error",
            vec![text(message.clone())],
        ),
        ResponseEnvelope::Binary { artifact, .. } => match kind {
            OperationKind::Batch => ResultView::new(
                kind,
                Tone::Success,
                "Batch complete",
                vec![download("Download results", artifact)],
            ),
            _ => ResultView::new(
                kind,
                Tone::Success,
                "Conversion complete",
                vec![download("Download file", artifact)],
            ),
        },
        ResponseEnvelope::Json { payload, .. } => render_json(kind, payload),
    };

    view.request_id_line = envelope.request_id().map(|id| format!("request_id: {id}"));
    view
}

fn render_json(kind: OperationKind, payload: &Value) -> ResultView {
    match kind {
        OperationKind::Summarize => ResultView::new(
            kind,
            Tone::Success,
            "Summary",
            vec![text(string_field(payload, "summary"))],
        ),
        OperationKind::Translate => ResultView::new(
            kind,
            Tone::Info,
            "Translation result",
            vec![text(string_field(payload, "translation"))],
        ),
        OperationKind::Analyze => ResultView::new(
            kind,
            Tone::Primary,
            "Analysis result",
            vec![preformatted(payload)],
        ),
        // The service may inline converted text instead of sending a file.
        OperationKind::Convert => {
            let block = match payload.get("converted_content").and_then(Value::as_str) {
                Some(content) => text(content.to_string()),
                None => preformatted(payload),
            };
            ResultView::new(kind, Tone::Success, "Conversion complete", vec![block])
        }
        OperationKind::Batch => ResultView::new(
            kind,
            Tone::Primary,
            "Batch report",
            vec![preformatted(payload)],
        ),
    }
}

fn string_field(payload: &Value, key: &str) -> String {
    payload
        .get(key)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

fn text(text: String) -> ViewBlock {
    ViewBlock::Text { text }
}

// serde_json's default map is ordered, so the dump is deterministic.
fn preformatted(payload: &Value) -> ViewBlock {
    let text = serde_json::to_string_pretty(payload).unwrap_or_else(|_| payload.to_string());
    ViewBlock::Preformatted { text }
}

fn download(label: &str, artifact: &Artifact) -> ViewBlock {
    ViewBlock::Download {
        label: label.to_string(),
        file_name: artifact.file_name().to_string(),
        artifact: artifact.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FailureKind;
    use serde_json::json;

    fn json_env(payload: Value, request_id: Option<&str>) -> ResponseEnvelope {
        ResponseEnvelope::Json {
            request_id: request_id.map(str::to_string),
            payload,
        }
    }

    #[test]
    fn summary_view() {
        let view = render(OperationKind::Summarize, &json_env(json!({"summary": "x"}), None));
        assert_eq!(view.title, "Summary");
        assert_eq!(view.blocks, vec![ViewBlock::Text { text: "x".into() }]);
        assert_eq!(view.request_id_line, None);
    }

    #[test]
    fn missing_summary_renders_empty_text() {
        let view = render(OperationKind::Summarize, &json_env(json!({}), None));
        assert_eq!(view.blocks, vec![ViewBlock::Text { text: String::new() }]);
    }

    #[test]
    fn translation_view_with_request_id() {
        let env = json_env(json!({"translation": "hola"}), Some("r9"));
        let view = render(OperationKind::Translate, &env);
        assert_eq!(view.title, "Translation result");
        assert_eq!(view.request_id_line.as_deref(), Some("request_id: r9"));
    }

    #[test]
    fn analysis_is_pretty_printed() {
        let env = json_env(json!({"word_count": 3, "language": "en"}), None);
        let view = render(OperationKind::Analyze, &env);
        assert_eq!(view.title, "Analysis result");
        match &view.blocks[0] {
            ViewBlock::Preformatted { text } => {
                assert!(text.contains("\"word_count\": 3"));
                assert!(text.contains('\n'));
            }
            other => panic!("expected preformatted, got {other:?}"),
        }
    }

    #[test]
    fn markup_in_payload_stays_text() {
        let env = json_env(json!({"summary": "<script>alert(1)</script>"}), None);
        let view = render(OperationKind::Summarize, &env);
        assert_eq!(
            view.blocks[0],
            ViewBlock::Text {
                text: "<script>alert(1)</script>".into()
            }
        );
    }

    #[test]
    fn binary_views() {
        let env = ResponseEnvelope::Binary {
            request_id: None,
            artifact: Artifact::new("out.pdf", b"%PDF".to_vec()),
        };
        let convert = render(OperationKind::Convert, &env);
        assert_eq!(convert.title, "Conversion complete");
        assert_eq!(convert.artifact().map(|a| a.file_name()), Some("out.pdf"));

        let batch = render(OperationKind::Batch, &env);
        assert_eq!(batch.title, "Batch complete");
        assert!(batch.to_plain_text().contains("Download results: out.pdf"));
    }

    #[test]
    fn batch_json_is_a_report() {
        let view = render(OperationKind::Batch, &json_env(json!({"files": 2}), None));
        assert_eq!(view.title, "Batch report");
        assert!(view.artifact().is_none());
    }

    #[test]
    fn inline_conversion_text() {
        let env = json_env(json!({"converted_content": "# Doc"}), None);
        let view = render(OperationKind::Convert, &env);
        assert_eq!(view.blocks, vec![ViewBlock::Text { text: "# Doc".into() }]);
    }

    #[test]
    fn failure_view_for_any_kind() {
        let env = ResponseEnvelope::Failure {
            message: "boom (r1)".into(),
            request_id: Some("r1".into()),
            http_status: 500,
            kind: FailureKind::Service,
        };
        for kind in OperationKind::ALL {
            let view = render(kind, &env);
            assert_eq!(view.title, "Error");
            assert!(view.is_error());
            assert_eq!(view.request_id_line.as_deref(), Some("request_id: r1"));
        }
    }

    #[test]
    fn render_is_idempotent() {
        let env = json_env(json!({"b": [1, 2], "a": {"z": null}}), Some("id"));
        assert_eq!(
            render(OperationKind::Analyze, &env),
            render(OperationKind::Analyze, &env)
        );
    }

    #[test]
    fn plain_text_layout() {
        let env = json_env(json!({"summary": "short"}), Some("r2"));
        let out = render(OperationKind::Summarize, &env).to_plain_text();
        assert_eq!(out, "Summary\nshort\nrequest_id: r2\n");
    }
}
