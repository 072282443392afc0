//! Step types for dotted/bracketed path expressions.

use std::fmt;

/// One step of a parsed path: an object key or an array index.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Step {
    /// Identifier or computed string key addressing an object member.
    Key(String),
    /// Integer index addressing an array element.
    ///
    /// Negative values parse fine (`[-1]` is a valid JSON literal) and
    /// resolve to nothing, like `arr[-1]` would.
    Index(i64),
}

impl Step {
    /// The object key, if this step is one.
    pub fn as_key(&self) -> Option<&str> {
        match self {
            Step::Key(key) => Some(key),
            Step::Index(_) => None,
        }
    }

    /// The array index, if this step is one.
    pub fn as_index(&self) -> Option<i64> {
        match self {
            Step::Key(_) => None,
            Step::Index(index) => Some(*index),
        }
    }

    /// Check if this step addresses an array element.
    pub fn is_index(&self) -> bool {
        matches!(self, Step::Index(_))
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Step::Key(key) => f.write_str(key),
            Step::Index(index) => write!(f, "{index}"),
        }
    }
}

impl From<i64> for Step {
    fn from(index: i64) -> Self {
        Step::Index(index)
    }
}

impl From<&str> for Step {
    fn from(key: &str) -> Self {
        Step::Key(key.to_string())
    }
}

impl From<String> for Step {
    fn from(key: String) -> Self {
        Step::Key(key)
    }
}

/// A parsed step plus the byte span of its source text.
///
/// The span starts at the step's leading `.` or `[`, so `&path[..start]` is
/// exactly the valid prefix before the step. Resolution failures report that
/// prefix as `last_valid`.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedStep {
    pub step: Step,
    pub start: usize,
    pub end: usize,
}

impl ParsedStep {
    /// The source text of this step, including its leading `.` or brackets.
    pub fn raw<'a>(&self, source: &'a str) -> &'a str {
        &source[self.start..self.end]
    }
}
