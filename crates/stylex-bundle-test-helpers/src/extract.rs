//! Line-oriented stand-in for the StyleX compiler
//!
//! Module sources declare their rules with directives:
//!
//! ```text
//! @style <class> <priority> <css...>
//! @error <message...>
//! ```
//!
//! Every other line passes through to the compiled code unchanged.

use parking_lot::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use stylex_bundle_core::extractor::{ExtractError, ExtractRequest, Extraction, StyleExtractor};
use stylex_bundle_core::rules::{PriorityMerger, RuleRecord, StylesheetMerger};

/// Import line the default module filter looks for.
pub const STYLEX_IMPORT: &str = "import * as stylex from '@stylexjs/stylex';";

/// Build a module source declaring `rules` as `(class, priority, css)`.
pub fn module_source(rules: &[(&str, f64, &str)]) -> String {
    let mut source = String::from(STYLEX_IMPORT);
    for (class_name, priority, css) in rules {
        source.push_str(&format!("\n@style {class_name} {priority} {css}"));
    }
    source.push_str("\nexport default {};\n");
    source
}

#[derive(Debug, Default)]
pub struct FakeExtractor {
    calls: AtomicUsize,
    seen: Mutex<Vec<String>>,
}

impl FakeExtractor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Module ids handed to the extractor, in call order.
    pub fn seen(&self) -> Vec<String> {
        self.seen.lock().clone()
    }
}

impl StyleExtractor for FakeExtractor {
    fn extract(&self, request: &ExtractRequest<'_>) -> Result<Option<Extraction>, ExtractError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.seen.lock().push(request.module_id.to_string());

        let mut rules = Vec::new();
        let mut code = Vec::new();
        for line in request.source.lines() {
            let trimmed = line.trim();
            if let Some(message) = trimmed.strip_prefix("@error ") {
                return Err(ExtractError::new(message));
            }
            match trimmed.strip_prefix("@style ") {
                Some(directive) => rules.push(parse_style(directive)?),
                None => code.push(line),
            }
        }

        if rules.is_empty() {
            return Ok(None);
        }
        Ok(Some(Extraction {
            code: code.join("\n"),
            rules,
        }))
    }
}

fn parse_style(directive: &str) -> Result<RuleRecord, ExtractError> {
    let mut parts = directive.splitn(3, ' ');
    let (Some(class_name), Some(priority), Some(css)) = (parts.next(), parts.next(), parts.next())
    else {
        return Err(ExtractError::new(format!("malformed @style directive: {directive}")));
    };
    let priority = priority
        .parse::<f64>()
        .map_err(|_| ExtractError::new(format!("bad priority `{priority}`")))?;
    Ok(RuleRecord::new(class_name, css, priority))
}

/// [`PriorityMerger`] that counts how often it runs.
#[derive(Debug, Default)]
pub struct CountingMerger {
    calls: AtomicUsize,
}

impl CountingMerger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl StylesheetMerger for CountingMerger {
    fn merge(&self, rules: &[RuleRecord], use_layers: bool) -> stylex_bundle_core::Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        PriorityMerger.merge(rules, use_layers)
    }
}
