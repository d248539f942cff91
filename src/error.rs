//! Structured error types for the Trellis layout engine.
//!
//! Every variant is fatal. A failed measurement or render means the tree was
//! built wrong, so nothing here is meant to be caught and retried.

use std::fmt;

use thiserror::Error;

use crate::element::Incomplete;

/// The unified error type returned by all public Trellis API functions.
#[derive(Debug, Error)]
pub enum TrellisError {
    /// Measurement or render was attempted on a tree with missing content.
    #[error("element incomplete: {0}")]
    ElementIncomplete(Incomplete),

    /// The resolver was queried for a key that no tier contains.
    #[error("no such param: {0}")]
    ParameterNotFound(String),

    /// A required parameter was absent from every tier.
    #[error("required param is missing for {element}: {name}")]
    MissingParameter { element: &'static str, name: String },

    /// A resolved parameter had the wrong shape.
    #[error("bad value for {name}: expected {expected}, found {found}")]
    InvalidParameter {
        name: String,
        expected: &'static str,
        found: String,
    },

    /// An enumerated parameter held a value outside its fixed set.
    #[error("bad {param}: {value}. Valid are: [{}]", .valid.join(", "))]
    InvalidEnumValue {
        param: &'static str,
        value: String,
        valid: &'static [&'static str],
    },

    /// Explicit column widths disagree with the explicit total width.
    #[error("{0}")]
    DimensionMismatch(DimensionMismatch),

    /// The truncation budget cannot even hold the trailer.
    #[error("cannot truncate to {maxlen} chars with trailer {trailer:?}")]
    TruncationImpossible { maxlen: usize, trailer: String },

    /// A cell was appended to a row that already has all its columns.
    #[error("cannot add more cells: row already has {columns} columns")]
    TooManyCells { columns: usize },

    /// An image source could not be read or probed.
    #[error("image error: {0}")]
    Image(String),

    /// JSON input failed to parse as a valid Trellis document.
    #[error("failed to parse document: {source}{}", hint_suffix(.hint))]
    Parse {
        source: serde_json::Error,
        hint: String,
    },

    /// Writing the SVG output failed.
    #[error("svg error: {0}")]
    Svg(String),
}

/// Details of a column-width disagreement.
#[derive(Debug, Clone, PartialEq)]
pub enum DimensionMismatch {
    /// The column widths don't add up to the declared total width.
    Sum { col_widths: Vec<f64>, width: f64 },
    /// The column-width vector has the wrong number of entries.
    Count { col_widths: Vec<f64>, columns: usize },
}

impl fmt::Display for DimensionMismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DimensionMismatch::Sum { col_widths, width } => write!(
                f,
                "sum of given col widths ({:?}) doesn't match total element width ({})",
                col_widths, width
            ),
            DimensionMismatch::Count {
                col_widths,
                columns,
            } => write!(
                f,
                "given col widths ({:?}) don't match the column count ({})",
                col_widths, columns
            ),
        }
    }
}

fn hint_suffix(hint: &str) -> String {
    if hint.is_empty() {
        String::new()
    } else {
        format!("\n  Hint: {}", hint)
    }
}

impl From<serde_json::Error> for TrellisError {
    fn from(e: serde_json::Error) -> Self {
        let hint = match e.classify() {
            serde_json::error::Category::Syntax => {
                "Check for trailing commas, missing quotes, or unescaped characters.".to_string()
            }
            serde_json::error::Category::Data => {
                "The JSON is valid but doesn't match the Trellis document schema. Check field names and types.".to_string()
            }
            serde_json::error::Category::Eof => {
                "Unexpected end of input, is the JSON truncated?".to_string()
            }
            serde_json::error::Category::Io => String::new(),
        };
        TrellisError::Parse { source: e, hint }
    }
}

pub type Result<T> = std::result::Result<T, TrellisError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_enum_error_names_value_and_valid_set() {
        let err = TrellisError::InvalidEnumValue {
            param: "x_reposition",
            value: "up".to_string(),
            valid: &["left", "right", "center", "none"],
        };
        assert_eq!(
            err.to_string(),
            "bad x_reposition: up. Valid are: [left, right, center, none]"
        );
    }

    #[test]
    fn test_parse_error_carries_hint() {
        let err: TrellisError = serde_json::from_str::<serde_json::Value>("{\"a\": 1,}")
            .unwrap_err()
            .into();
        let msg = err.to_string();
        assert!(msg.starts_with("failed to parse document"));
        assert!(msg.contains("Hint: Check for trailing commas"));
    }

    #[test]
    fn test_dimension_mismatch_message() {
        let err = TrellisError::DimensionMismatch(DimensionMismatch::Sum {
            col_widths: vec![10.0, 20.0],
            width: 40.0,
        });
        assert!(err.to_string().contains("doesn't match total element width (40)"));
    }
}
