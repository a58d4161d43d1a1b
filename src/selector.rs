//! Operation selector: current operation, batch options, and the derived
//! visibility of auxiliary inputs.
//!
//! Visibility is never stored. [`Visibility::of`] is recomputed from
//! `(operation, batch)` on every read, so switching from Translate to
//! Summarize can never leave a stale language picker on screen.

use crate::config::{DEFAULT_OUTPUT_FORMAT, DEFAULT_TARGET_LANGUAGE};
use crate::operation::{BatchSelection, OperationKind, SubOperation};
use serde::{Deserialize, Serialize};

/// Which auxiliary controls the host should show.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Visibility {
    /// Target-language picker (and the value is required).
    pub target_language: bool,
    /// Output-format picker (and the value is required).
    pub output_format: bool,
    /// File picker accepts more than one file.
    pub multi_file: bool,
    /// Batch sub-operation checkboxes and the zip toggle.
    pub batch_options: bool,
}

impl Visibility {
    pub fn of(kind: OperationKind, batch: &BatchSelection) -> Self {
        let is_batch = kind == OperationKind::Batch;
        Self {
            target_language: kind == OperationKind::Translate
                || (is_batch && batch.contains(SubOperation::Translate)),
            output_format: kind == OperationKind::Convert
                || (is_batch && batch.contains(SubOperation::Convert)),
            multi_file: is_batch,
            batch_options: is_batch,
        }
    }
}

/// User-controlled selection state.
///
/// Mutated only through the handler methods below; serialisable so hosts
/// can snapshot or restore a form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectorState {
    pub operation: OperationKind,
    pub batch: BatchSelection,
    pub zip_output: bool,
    pub target_language: String,
    pub output_format: String,
}

impl SelectorState {
    pub fn new(target_language: impl Into<String>, output_format: impl Into<String>) -> Self {
        Self {
            operation: OperationKind::default(),
            batch: BatchSelection::default(),
            zip_output: false,
            target_language: target_language.into(),
            output_format: output_format.into(),
        }
    }

    pub fn visibility(&self) -> Visibility {
        Visibility::of(self.operation, &self.batch)
    }

    pub fn set_operation(&mut self, kind: OperationKind) -> Visibility {
        self.operation = kind;
        self.visibility()
    }

    pub fn toggle_batch_sub(&mut self, sub: SubOperation, enabled: bool) -> Visibility {
        self.batch.set(sub, enabled);
        self.visibility()
    }

    pub fn set_zip_output(&mut self, enabled: bool) {
        self.zip_output = enabled;
    }

    pub fn set_target_language(&mut self, lang: impl Into<String>) {
        self.target_language = lang.into();
    }

    pub fn set_output_format(&mut self, fmt: impl Into<String>) {
        self.output_format = fmt.into();
    }
}

impl Default for SelectorState {
    fn default() -> Self {
        Self::new(DEFAULT_TARGET_LANGUAGE, DEFAULT_OUTPUT_FORMAT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summarize_and_analyze_hide_both_fields() {
        for kind in [OperationKind::Summarize, OperationKind::Analyze] {
            let v = Visibility::of(kind, &BatchSelection::new());
            assert!(!v.target_language, "{kind}");
            assert!(!v.output_format, "{kind}");
            assert!(!v.multi_file, "{kind}");
        }
    }

    #[test]
    fn translate_shows_language_only() {
        let v = Visibility::of(OperationKind::Translate, &BatchSelection::new());
        assert!(v.target_language);
        assert!(!v.output_format);
    }

    #[test]
    fn convert_shows_format_only() {
        let v = Visibility::of(OperationKind::Convert, &BatchSelection::new());
        assert!(!v.target_language);
        assert!(v.output_format);
    }

    #[test]
    fn batch_with_translate_and_convert_shows_both() {
        let sel = BatchSelection::new()
            .with(SubOperation::Translate)
            .with(SubOperation::Convert);
        let v = Visibility::of(OperationKind::Batch, &sel);
        assert!(v.target_language);
        assert!(v.output_format);
        assert!(v.multi_file);
        assert!(v.batch_options);
    }

    #[test]
    fn batch_selection_is_ignored_outside_batch() {
        let sel = BatchSelection::new().with(SubOperation::Translate);
        let v = Visibility::of(OperationKind::Summarize, &sel);
        assert!(!v.target_language);
    }

    #[test]
    fn toggle_on_then_off_restores_visibility() {
        let mut state = SelectorState::default();
        state.set_operation(OperationKind::Batch);
        let before = state.visibility();
        state.toggle_batch_sub(SubOperation::Convert, true);
        assert!(state.visibility().output_format);
        let after = state.toggle_batch_sub(SubOperation::Convert, false);
        assert_eq!(before, after);
    }

    #[test]
    fn switching_operation_recomputes_from_scratch() {
        let mut state = SelectorState::default();
        state.set_operation(OperationKind::Translate);
        assert!(state.visibility().target_language);
        let v = state.set_operation(OperationKind::Summarize);
        assert_eq!(v, Visibility::default());
    }

    #[test]
    fn state_round_trips_through_json() {
        let mut state = SelectorState::default();
        state.set_operation(OperationKind::Batch);
        state.toggle_batch_sub(SubOperation::Analyze, true);
        let json = serde_json::to_string(&state).unwrap();
        let back: SelectorState = serde_json::from_str(&json).unwrap();
        assert_eq!(state, back);
    }
}
