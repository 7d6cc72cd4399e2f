//! Inline output expectations parsed from annotated source files.
//!
//! Example sources annotate the lines they print with a trailing
//! `//$ <expected>` comment. Two reserved tokens match by shape rather
//! than by text: `[number]` accepts any base-10 integer, `[nullptr]`
//! accepts the integer zero or the literal `(nil)` (how a null pointer
//! prints on common platforms).

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Marker substring that introduces an expected-output annotation.
pub const MARKER: &str = "//$";

/// A single output expectation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Expectation {
    /// The `[number]` wildcard: any base-10 integer.
    Number,

    /// The `[nullptr]` wildcard: the integer zero or the literal `(nil)`.
    NullPtr,

    /// Exact text match.
    Exact(String),
}

impl Expectation {
    /// Interpret annotation text, recognising the reserved wildcards.
    pub fn from_annotation(text: &str) -> Self {
        match text {
            "[number]" => Expectation::Number,
            "[nullptr]" => Expectation::NullPtr,
            other => Expectation::Exact(other.to_string()),
        }
    }

    /// Whether a trimmed observed line satisfies this expectation.
    pub fn matches(&self, observed: &str) -> bool {
        match self {
            Expectation::Number => parse_int(observed).is_some(),
            Expectation::NullPtr => parse_int(observed) == Some(0) || observed == "(nil)",
            Expectation::Exact(text) => observed == text,
        }
    }

    /// The expectation as it appeared in the annotation.
    pub fn text(&self) -> &str {
        match self {
            Expectation::Number => "[number]",
            Expectation::NullPtr => "[nullptr]",
            Expectation::Exact(text) => text,
        }
    }
}

/// Base-10 integer parse, whole string only.
fn parse_int(s: &str) -> Option<i64> {
    s.parse::<i64>().ok()
}

/// An expectation paired with its source location.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ExpectedLine {
    /// 1-based line number in the annotated source file.
    pub line: u32,

    /// The expected output for this position.
    pub expectation: Expectation,
}

/// Extract all expectations from annotated source text, in file order.
///
/// Every line containing the marker yields one entry; the text after the
/// first marker occurrence, trimmed, is the expectation. Lines without
/// the marker are ignored.
pub fn parse_expectations(source: &str) -> Vec<ExpectedLine> {
    source
        .lines()
        .enumerate()
        .filter_map(|(idx, line)| {
            line.find(MARKER).map(|pos| ExpectedLine {
                line: (idx + 1) as u32,
                expectation: Expectation::from_annotation(line[pos + MARKER.len()..].trim()),
            })
        })
        .collect()
}

/// Read and parse an annotated source file.
pub fn load_expectations(path: &Path) -> Result<Vec<ExpectedLine>> {
    let source = std::fs::read_to_string(path)?;
    Ok(parse_expectations(&source))
}
