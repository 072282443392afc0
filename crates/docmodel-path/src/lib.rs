//! Dotted/bracketed path expressions for nested documents.
//!
//! A path addresses a location inside a nested tree of objects and arrays:
//! identifier steps (`a.b`) address object members, bracketed JSON literals
//! (`[2]`, `[-1]`, `["a key"]`) address computed keys. Paths compose by
//! concatenation, which is how sub-document views anchor themselves inside a
//! root document.
//!
//! # Example
//!
//! ```
//! use docmodel_path::{format_steps, parse_path, Step};
//!
//! let steps: Vec<Step> = parse_path("a.b[2].c")
//!     .unwrap()
//!     .into_iter()
//!     .map(|p| p.step)
//!     .collect();
//! assert_eq!(format_steps(&steps), "a.b[2].c");
//! ```

mod parse;
mod types;

pub use parse::{parse_path, PathParser, PathSyntaxError};
pub use types::{ParsedStep, Step};

/// Check if a string is a bare path identifier (`[A-Za-z_$][A-Za-z0-9_$]*`).
///
/// Identifier keys render as `.key` in formatted paths and flattened
/// validation-error paths; anything else renders as a bracketed JSON string.
///
/// # Example
///
/// ```
/// use docmodel_path::is_identifier;
///
/// assert!(is_identifier("name"));
/// assert!(is_identifier("_private$"));
/// assert!(!is_identifier("0name"));
/// assert!(!is_identifier("white space"));
/// assert!(!is_identifier(""));
/// ```
pub fn is_identifier(s: &str) -> bool {
    let bytes = s.as_bytes();
    match bytes.first() {
        Some(&b) if parse::is_ident_start(b) => {}
        _ => return false,
    }
    bytes[1..].iter().all(|&b| parse::is_ident_continue(b))
}

/// Append one step to a path string, writing `.key`, `["key"]`, or `[n]`.
///
/// The leading `.` is skipped when `out` is empty so the result stays
/// parseable from the first byte.
pub fn push_step(out: &mut String, step: &Step) {
    match step {
        Step::Key(key) if is_identifier(key) => {
            if !out.is_empty() {
                out.push('.');
            }
            out.push_str(key);
        }
        Step::Key(key) => {
            out.push('[');
            // serde_json string serialization cannot fail
            out.push_str(&serde_json::Value::String(key.clone()).to_string());
            out.push(']');
        }
        Step::Index(index) => {
            out.push('[');
            out.push_str(&index.to_string());
            out.push(']');
        }
    }
}

/// Format a step sequence back into a path expression.
///
/// # Example
///
/// ```
/// use docmodel_path::{format_steps, Step};
///
/// let steps = vec![
///     Step::Key("likes".to_string()),
///     Step::Index(0),
///     Step::Key("level".to_string()),
/// ];
/// assert_eq!(format_steps(&steps), "likes[0].level");
/// ```
pub fn format_steps(steps: &[Step]) -> String {
    let mut out = String::new();
    for step in steps {
        push_step(&mut out, step);
    }
    out
}

/// Join a base-path prefix with a path suffix.
///
/// A sub-model view carries a base path ending in `.` (for example
/// `"owner."` or `"likes[0]."`); joining it with a local path produces the
/// absolute path into the root store.
///
/// # Example
///
/// ```
/// use docmodel_path::join_path;
///
/// assert_eq!(join_path("", "website"), "website");
/// assert_eq!(join_path("owner.", "website"), "owner.website");
/// assert_eq!(join_path("likes[0].", "level"), "likes[0].level");
/// assert_eq!(join_path("likes.", "[0]"), "likes[0]");
/// ```
pub fn join_path(base: &str, path: &str) -> String {
    if base.is_empty() {
        return path.to_string();
    }
    let mut out = String::with_capacity(base.len() + path.len());
    out.push_str(base);
    let suffix = path.strip_prefix('.').unwrap_or(path);
    if suffix.starts_with('[') && out.ends_with('.') {
        out.pop();
    }
    out.push_str(suffix);
    out
}

/// Drop a trailing `.` from a base-path prefix, yielding a plain path.
///
/// # Example
///
/// ```
/// use docmodel_path::trim_base;
///
/// assert_eq!(trim_base("owner."), "owner");
/// assert_eq!(trim_base("owner"), "owner");
/// assert_eq!(trim_base(""), "");
/// ```
pub fn trim_base(base: &str) -> &str {
    base.strip_suffix('.').unwrap_or(base)
}
