//! Card payloads.
//!
//! A card is the normalized unit the dashboard renders. Payloads are produced
//! per request by parsers and never persisted.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

pub mod options;

pub use options::{MultiChoiceField, Options, SingleField, TimeSpanField, TimeUnit};

/// The built-in card kinds.
///
/// Card kinds are plain strings in parser declarations; these are the ones
/// whose payload shape is known.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CardKind {
    #[serde(rename = "Line Graph")]
    LineGraph,
    #[serde(rename = "Matrix")]
    Matrix,
    #[serde(rename = "Iframe")]
    IFrame,
    #[serde(rename = "Single Value")]
    SingleValue,
}

impl CardKind {
    pub const ALL: [CardKind; 4] = [
        CardKind::LineGraph,
        CardKind::Matrix,
        CardKind::IFrame,
        CardKind::SingleValue,
    ];

    /// Name used for the persisted card type.
    pub fn name(self) -> &'static str {
        match self {
            CardKind::LineGraph => "Line Graph",
            CardKind::Matrix => "Matrix",
            CardKind::IFrame => "Iframe",
            CardKind::SingleValue => "Single Value",
        }
    }

    /// Whether cards of this kind combine several sources by default.
    pub fn aggregated(self) -> bool {
        matches!(self, CardKind::LineGraph | CardKind::SingleValue)
    }
}

impl fmt::Display for CardKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for CardKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CardKind::ALL
            .into_iter()
            .find(|kind| kind.name() == s)
            .ok_or_else(|| format!("unknown card kind: {s}"))
    }
}

/// Parallel label and value sequences.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineGraph {
    pub labels: Vec<String>,
    pub data: Vec<f64>,
}

/// Build result of one matrix cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum MatrixResult {
    Success,
    Warning,
    Failure,
    Running,
    NotRun,
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatrixCell {
    pub result: MatrixResult,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

impl MatrixCell {
    pub fn new(result: MatrixResult) -> Self {
        Self { result, url: None }
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }
}

/// Row and column labels plus a sparse grid, indexed `values[column][row]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Matrix {
    pub columns: Vec<String>,
    pub rows: Vec<String>,
    #[serde(default)]
    pub values: BTreeMap<String, BTreeMap<String, MatrixCell>>,
}

impl Matrix {
    pub fn cell(&self, column: &str, row: &str) -> Option<&MatrixCell> {
        self.values.get(column).and_then(|rows| rows.get(row))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IFrame {
    pub url: String,
}

/// A name and an opaque value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SingleValue {
    pub name: String,
    pub value: serde_json::Value,
}

/// Payload returned by a parser for one source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CardData {
    Matrix(Matrix),
    LineGraph(LineGraph),
    SingleValue(SingleValue),
    IFrame(IFrame),
}

impl CardData {
    pub fn kind(&self) -> CardKind {
        match self {
            CardData::LineGraph(_) => CardKind::LineGraph,
            CardData::Matrix(_) => CardKind::Matrix,
            CardData::IFrame(_) => CardKind::IFrame,
            CardData::SingleValue(_) => CardKind::SingleValue,
        }
    }

    /// Whether this payload may answer a request for `card_type`.
    ///
    /// Card types outside the built-in kinds accept any shape.
    pub fn fits(&self, card_type: &str) -> bool {
        match card_type.parse::<CardKind>() {
            Ok(kind) => kind == self.kind(),
            Err(_) => true,
        }
    }
}
