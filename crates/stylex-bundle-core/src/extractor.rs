//! Style extractor adapter
//!
//! The extractor is the external compiler that rewrites a module and returns
//! the atomic rules it declared. This module defines the contract, decides
//! which modules are worth handing to it, and maps its authoring errors to
//! user-facing build errors.

use thiserror::Error;

use crate::config::{AliasTable, ExtractorOptions, StylexOptions};
use crate::rules::RuleRecord;
use crate::StylexError;

/// How the current build consumes the extracted code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompileMode {
    Production,
    Development,
    ServerRendering,
}

impl CompileMode {
    pub fn is_dev(self) -> bool {
        matches!(self, CompileMode::Development)
    }
}

/// Everything the extractor needs for one module.
#[derive(Debug, Clone, Copy)]
pub struct ExtractRequest<'a> {
    pub module_id: &'a str,
    pub source: &'a str,
    pub mode: CompileMode,
    pub aliases: &'a AliasTable,
    pub options: &'a ExtractorOptions,
}

/// Rewritten module code plus the rules it contributes.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Extraction {
    pub code: String,
    pub rules: Vec<RuleRecord>,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct ExtractError {
    pub message: String,
}

impl ExtractError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// The external style-extraction compiler.
///
/// Implementations must be pure per call: the same request yields the same
/// result and no state is shared between calls.
pub trait StyleExtractor: Send + Sync {
    /// `Ok(None)` means the module declares no styles.
    fn extract(
        &self,
        request: &ExtractRequest<'_>,
    ) -> std::result::Result<Option<Extraction>, ExtractError>;
}

const NON_STATIC_VALUE_PATTERNS: &[&str] = &[
    "Only static values are allowed",
    "Referenced constant is not defined",
];

const NON_STATIC_VALUE_GUIDANCE: &str = "Style values must be resolvable at build time. \
To share a value between files, declare it with `stylex.defineVars` in a `.stylex.ts` \
(or `.stylex.js`) file and import the variable instead of a runtime constant.";

/// Wrap an extractor failure into the fatal build error, attaching guidance
/// for errors with a known remedy.
pub fn authoring_error(module_id: &str, err: ExtractError) -> StylexError {
    let guidance = NON_STATIC_VALUE_PATTERNS
        .iter()
        .any(|pattern| err.message.contains(pattern))
        .then(|| NON_STATIC_VALUE_GUIDANCE.to_string());

    StylexError::Extract {
        module_id: module_id.to_string(),
        message: err.message,
        guidance,
    }
}

const SCRIPT_EXTENSIONS: &[&str] = &["js", "jsx", "mjs", "cjs", "ts", "tsx", "mts", "cts"];

/// Decides which modules are handed to the extractor.
#[derive(Debug, Clone)]
pub struct ModuleFilter {
    import_modules: Vec<String>,
    libraries: Vec<String>,
}

impl ModuleFilter {
    pub fn new(options: &StylexOptions) -> Self {
        Self {
            import_modules: options.import_modules().map(str::to_string).collect(),
            libraries: options.libraries.clone(),
        }
    }

    pub fn should_transform(&self, module_id: &str, source: &str) -> bool {
        if module_id.starts_with('\0') {
            return false;
        }

        let path = strip_query(module_id);
        let has_script_extension = path
            .rsplit_once('.')
            .is_some_and(|(_, ext)| SCRIPT_EXTENSIONS.contains(&ext));
        if !has_script_extension {
            return false;
        }

        if path.contains("/node_modules/") && !self.is_library(path) {
            return false;
        }

        self.import_modules
            .iter()
            .any(|module| source.contains(module.as_str()))
    }

    fn is_library(&self, path: &str) -> bool {
        self.libraries
            .iter()
            .any(|library| path.contains(&format!("/node_modules/{library}/")))
    }
}

/// Module ids may carry a query (`Card.tsx?v=123`); the file part decides
/// the module kind.
pub fn strip_query(module_id: &str) -> &str {
    module_id
        .split_once('?')
        .map_or(module_id, |(path, _)| path)
}
