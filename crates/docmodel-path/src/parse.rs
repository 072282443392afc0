//! Scanner for dotted/bracketed path expressions.

use serde_json::Value;
use thiserror::Error;

use crate::types::{ParsedStep, Step};

/// Malformed path token or unparsable bracketed literal. Always fatal.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum PathSyntaxError {
    #[error("unexpected character `{found}` at offset {offset} in path `{path}`")]
    UnexpectedChar {
        path: String,
        offset: usize,
        found: char,
    },
    #[error("unexpected end of path `{path}`")]
    UnexpectedEnd { path: String },
    #[error("unclosed `[` at offset {offset} in path `{path}`")]
    UnclosedBracket { path: String, offset: usize },
    #[error("invalid bracket literal `{literal}` in path `{path}`")]
    InvalidLiteral { path: String, literal: String },
}

pub(crate) fn is_ident_start(b: u8) -> bool {
    b.is_ascii_alphabetic() || b == b'_' || b == b'$'
}

pub(crate) fn is_ident_continue(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_' || b == b'$'
}

/// Scanner over a path expression.
///
/// Steps come in two kinds: a `.`-optional identifier
/// (`[A-Za-z_$][A-Za-z0-9_$]*`) addressing an object member, or a bracketed
/// JSON literal (`[0]`, `[-2]`, `["a key"]`) addressing a computed key.
///
/// # Example
///
/// ```
/// use docmodel_path::{PathParser, Step};
///
/// let mut parser = PathParser::new("a.b[2]");
/// assert_eq!(parser.next_step().unwrap().unwrap().step, Step::Key("a".to_string()));
/// assert_eq!(parser.next_step().unwrap().unwrap().step, Step::Key("b".to_string()));
/// assert_eq!(parser.next_step().unwrap().unwrap().step, Step::Index(2));
/// assert!(parser.next_step().is_none());
/// ```
pub struct PathParser<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> PathParser<'a> {
    pub fn new(input: &'a str) -> Self {
        Self { input, pos: 0 }
    }

    pub fn is_at_end(&self) -> bool {
        self.pos >= self.input.len()
    }

    /// Byte offset of the next unconsumed step.
    pub fn offset(&self) -> usize {
        self.pos
    }

    /// Consume the next step; `None` at end of input.
    pub fn next_step(&mut self) -> Option<Result<ParsedStep, PathSyntaxError>> {
        if self.is_at_end() {
            return None;
        }
        if self.input.as_bytes()[self.pos] == b'[' {
            Some(self.bracket_step())
        } else {
            Some(self.ident_step())
        }
    }

    fn ident_step(&mut self) -> Result<ParsedStep, PathSyntaxError> {
        let start = self.pos;
        let bytes = self.input.as_bytes();
        let mut pos = self.pos;
        if bytes[pos] == b'.' {
            pos += 1;
        }
        if pos >= bytes.len() {
            return Err(PathSyntaxError::UnexpectedEnd {
                path: self.input.to_string(),
            });
        }
        if !is_ident_start(bytes[pos]) {
            return Err(self.unexpected_at(pos));
        }
        let mut end = pos + 1;
        while end < bytes.len() && is_ident_continue(bytes[end]) {
            end += 1;
        }
        let key = self.input[pos..end].to_string();
        self.pos = end;
        Ok(ParsedStep {
            step: Step::Key(key),
            start,
            end,
        })
    }

    fn bracket_step(&mut self) -> Result<ParsedStep, PathSyntaxError> {
        let start = self.pos;
        let body = &self.input[start + 1..];
        let close = match body.find(']') {
            Some(offset) => offset,
            None => {
                return Err(PathSyntaxError::UnclosedBracket {
                    path: self.input.to_string(),
                    offset: start,
                })
            }
        };
        let literal = &body[..close];
        let end = start + 1 + close + 1;
        let step = match serde_json::from_str::<Value>(literal) {
            Ok(Value::String(key)) => Step::Key(key),
            Ok(Value::Number(n)) => match n.as_i64() {
                Some(index) => Step::Index(index),
                None => return Err(self.invalid_literal(literal)),
            },
            _ => return Err(self.invalid_literal(literal)),
        };
        self.pos = end;
        Ok(ParsedStep { step, start, end })
    }

    fn unexpected_at(&self, offset: usize) -> PathSyntaxError {
        let found = self.input[offset..].chars().next().unwrap_or('\0');
        PathSyntaxError::UnexpectedChar {
            path: self.input.to_string(),
            offset,
            found,
        }
    }

    fn invalid_literal(&self, literal: &str) -> PathSyntaxError {
        PathSyntaxError::InvalidLiteral {
            path: self.input.to_string(),
            literal: literal.to_string(),
        }
    }
}

/// Parse a whole path expression into steps.
///
/// The empty path parses to zero steps and addresses the container itself.
///
/// # Example
///
/// ```
/// use docmodel_path::{parse_path, Step};
///
/// let steps: Vec<Step> = parse_path("likes[0].level")
///     .unwrap()
///     .into_iter()
///     .map(|p| p.step)
///     .collect();
/// assert_eq!(
///     steps,
///     vec![
///         Step::Key("likes".to_string()),
///         Step::Index(0),
///         Step::Key("level".to_string()),
///     ]
/// );
/// ```
pub fn parse_path(input: &str) -> Result<Vec<ParsedStep>, PathSyntaxError> {
    let mut parser = PathParser::new(input);
    let mut steps = Vec::new();
    while let Some(step) = parser.next_step() {
        steps.push(step?);
    }
    Ok(steps)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn steps(input: &str) -> Vec<Step> {
        parse_path(input)
            .unwrap()
            .into_iter()
            .map(|p| p.step)
            .collect()
    }

    #[test]
    fn test_single_identifier() {
        assert_eq!(steps("name"), vec![Step::Key("name".to_string())]);
    }

    #[test]
    fn test_leading_dot_allowed() {
        assert_eq!(steps(".name"), vec![Step::Key("name".to_string())]);
    }

    #[test]
    fn test_dotted_chain() {
        assert_eq!(
            steps("owner.online.website"),
            vec![
                Step::Key("owner".to_string()),
                Step::Key("online".to_string()),
                Step::Key("website".to_string()),
            ]
        );
    }

    #[test]
    fn test_bracket_index() {
        assert_eq!(
            steps("likes[2]"),
            vec![Step::Key("likes".to_string()), Step::Index(2)]
        );
    }

    #[test]
    fn test_negative_index() {
        assert_eq!(
            steps("likes[-1]"),
            vec![Step::Key("likes".to_string()), Step::Index(-1)]
        );
    }

    #[test]
    fn test_bracket_string_key() {
        assert_eq!(
            steps("a[\"white space\"]"),
            vec![
                Step::Key("a".to_string()),
                Step::Key("white space".to_string()),
            ]
        );
    }

    #[test]
    fn test_dollar_and_underscore_identifiers() {
        assert_eq!(
            steps("$a._b"),
            vec![Step::Key("$a".to_string()), Step::Key("_b".to_string())]
        );
    }

    #[test]
    fn test_empty_path_is_zero_steps() {
        assert_eq!(steps(""), Vec::<Step>::new());
    }

    #[test]
    fn test_spans_cover_leading_punctuation() {
        let parsed = parse_path("a.b[2]").unwrap();
        assert_eq!(parsed[0].raw("a.b[2]"), "a");
        assert_eq!(parsed[1].raw("a.b[2]"), ".b");
        assert_eq!(parsed[2].raw("a.b[2]"), "[2]");
        assert_eq!(&"a.b[2]"[..parsed[1].start], "a");
    }

    #[test]
    fn test_double_dot_is_error() {
        assert!(matches!(
            parse_path("a..b"),
            Err(PathSyntaxError::UnexpectedChar { offset: 2, .. })
        ));
    }

    #[test]
    fn test_trailing_dot_is_error() {
        assert!(matches!(
            parse_path("a."),
            Err(PathSyntaxError::UnexpectedEnd { .. })
        ));
    }

    #[test]
    fn test_unclosed_bracket() {
        assert!(matches!(
            parse_path("a[0"),
            Err(PathSyntaxError::UnclosedBracket { offset: 1, .. })
        ));
    }

    #[test]
    fn test_bad_literal() {
        assert!(matches!(
            parse_path("a[xyz]"),
            Err(PathSyntaxError::InvalidLiteral { .. })
        ));
    }

    #[test]
    fn test_float_literal_rejected() {
        assert!(matches!(
            parse_path("a[1.5]"),
            Err(PathSyntaxError::InvalidLiteral { .. })
        ));
    }

    #[test]
    fn test_empty_brackets_rejected() {
        assert!(matches!(
            parse_path("a[]"),
            Err(PathSyntaxError::InvalidLiteral { .. })
        ));
    }

    #[test]
    fn test_digit_start_is_error() {
        assert!(matches!(
            parse_path("0abc"),
            Err(PathSyntaxError::UnexpectedChar { offset: 0, .. })
        ));
    }
}
