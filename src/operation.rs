//! Operation kinds and the batch sub-operation set.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

/// One of the five document-processing actions a user can request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationKind {
    #[default]
    Summarize,
    Translate,
    Analyze,
    Convert,
    Batch,
}

impl OperationKind {
    pub const ALL: [OperationKind; 5] = [
        OperationKind::Summarize,
        OperationKind::Translate,
        OperationKind::Analyze,
        OperationKind::Convert,
        OperationKind::Batch,
    ];

    /// Wire name, also used as the endpoint path segment.
    pub fn as_str(&self) -> &'static str {
        match self {
            OperationKind::Summarize => "summarize",
            OperationKind::Translate => "translate",
            OperationKind::Analyze => "analyze",
            OperationKind::Convert => "convert",
            OperationKind::Batch => "batch",
        }
    }

    /// Fixed endpoint table.
    pub fn endpoint(&self) -> &'static str {
        match self {
            OperationKind::Summarize => "/summarize",
            OperationKind::Translate => "/translate",
            OperationKind::Analyze => "/analyze",
            OperationKind::Convert => "/convert",
            OperationKind::Batch => "/batch",
        }
    }
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OperationKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "summarize" | "summary" => Ok(OperationKind::Summarize),
            "translate" => Ok(OperationKind::Translate),
            "analyze" | "analyse" => Ok(OperationKind::Analyze),
            "convert" => Ok(OperationKind::Convert),
            "batch" => Ok(OperationKind::Batch),
            other => Err(format!("unknown operation '{other}'")),
        }
    }
}

/// An operation that can run as one step of a batch.
///
/// Variant order is the order used on the wire (`Ord` is derived from it).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubOperation {
    Summarize,
    Translate,
    Analyze,
    Convert,
}

impl SubOperation {
    pub const ALL: [SubOperation; 4] = [
        SubOperation::Summarize,
        SubOperation::Translate,
        SubOperation::Analyze,
        SubOperation::Convert,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SubOperation::Summarize => "summarize",
            SubOperation::Translate => "translate",
            SubOperation::Analyze => "analyze",
            SubOperation::Convert => "convert",
        }
    }
}

impl fmt::Display for SubOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SubOperation {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match OperationKind::from_str(s)? {
            OperationKind::Summarize => Ok(SubOperation::Summarize),
            OperationKind::Translate => Ok(SubOperation::Translate),
            OperationKind::Analyze => Ok(SubOperation::Analyze),
            OperationKind::Convert => Ok(SubOperation::Convert),
            OperationKind::Batch => Err("'batch' cannot be nested inside a batch".to_string()),
        }
    }
}

/// The set of sub-operations enabled for a batch submission.
///
/// Backed by a `BTreeSet`, so iteration is always in wire order regardless
/// of the order the user ticked the boxes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchSelection(BTreeSet<SubOperation>);

impl BatchSelection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, sub: SubOperation, enabled: bool) {
        if enabled {
            self.0.insert(sub);
        } else {
            self.0.remove(&sub);
        }
    }

    pub fn with(mut self, sub: SubOperation) -> Self {
        self.0.insert(sub);
        self
    }

    pub fn contains(&self, sub: SubOperation) -> bool {
        self.0.contains(&sub)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = SubOperation> + '_ {
        self.0.iter().copied()
    }

    /// Comma-joined wire names, e.g. `summarize,convert`.
    pub fn to_csv(&self) -> String {
        self.iter()
            .map(|s| s.as_str())
            .collect::<Vec<_>>()
            .join(",")
    }

    /// Parse a comma-separated list such as `translate,summarize`.
    pub fn parse_csv(s: &str) -> Result<Self, String> {
        s.split(',')
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .map(SubOperation::from_str)
            .collect()
    }
}

impl FromIterator<SubOperation> for BatchSelection {
    fn from_iter<I: IntoIterator<Item = SubOperation>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}
