//! Textual rewrites inside already-serialized output
//!
//! Both operations here work on raw text, so they are kept small and strict:
//! the placeholder must occur exactly once per asset, and asset references
//! are only rewritten where they are delimited like a string literal or a
//! URL path segment.

use regex::{Captures, Regex};

use crate::hash::base_name;
use crate::{Result, StylexError};

/// Literal token a CSS source uses to mark where the stylesheet goes.
pub const PLACEHOLDER_MARKER: &str = "@stylex stylesheet;";

pub fn count_markers(source: &str) -> usize {
    source.matches(PLACEHOLDER_MARKER).count()
}

/// Replace the single placeholder in `source` with `css`.
pub fn splice_marker(asset: &str, source: &str, css: &str) -> Result<String> {
    match count_markers(source) {
        1 => Ok(source.replacen(PLACEHOLDER_MARKER, css, 1)),
        count => Err(StylexError::DuplicateMarker {
            asset: asset.to_string(),
            count,
        }),
    }
}

fn reference_pattern(file_name: &str) -> Regex {
    let pattern = format!(
        r#"(?P<pre>["'`/(])(?P<name>{})(?P<post>["'`)?#])"#,
        regex::escape(base_name(file_name))
    );
    Regex::new(&pattern).expect("escaped file name always forms a valid pattern")
}

/// Whether `code` references `file_name` as a quoted string or URL segment.
pub fn references_asset(code: &str, file_name: &str) -> bool {
    reference_pattern(file_name).is_match(code)
}

/// Rewrite every scoped reference to `old_file` in `code` to `new_file`.
///
/// Returns `None` when nothing matched.
pub fn rewrite_asset_references(code: &str, old_file: &str, new_file: &str) -> Option<String> {
    let pattern = reference_pattern(old_file);
    if !pattern.is_match(code) {
        return None;
    }
    let new_base = base_name(new_file);
    let rewritten = pattern.replace_all(code, |caps: &Captures<'_>| {
        format!("{}{}{}", &caps["pre"], new_base, &caps["post"])
    });
    Some(rewritten.into_owned())
}
