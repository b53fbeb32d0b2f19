use std::path::PathBuf;
use thiserror::Error;

use crate::bundle::RenameError;

/// Fatal errors surfaced to the host build tool.
///
/// Anything recoverable (missing root stylesheet, version skew) is reported
/// through [`crate::diagnostics::DiagnosticHandler`] instead and never
/// becomes one of these.
#[derive(Debug, Error)]
pub enum StylexError {
    /// The extractor rejected a module's style declarations.
    #[error("{module_id}: {message}{}", guidance_suffix(.guidance))]
    Extract {
        module_id: String,
        message: String,
        guidance: Option<String>,
    },

    /// A stylesheet was spliced but nothing in the bundle loads it.
    #[error(
        "could not find the chunk that loads `{asset}`; the generated stylesheet would be unreachable"
    )]
    RelatedChunkNotFound { asset: String },

    /// More CSS assets carry the placeholder than the active variant supports.
    #[error("found the stylesheet placeholder in {found} assets ({assets}), but only {expected} is supported")]
    TooManyPlaceholders {
        found: usize,
        expected: usize,
        assets: String,
    },

    /// One asset contains the placeholder marker more than once.
    #[error("`{asset}` contains the stylesheet placeholder {count} times; expected exactly once")]
    DuplicateMarker { asset: String, count: usize },

    /// A second module declared the placeholder in a single-placeholder session.
    #[error(
        "the stylesheet placeholder is already declared in `{existing}`; `{duplicate}` cannot declare it too"
    )]
    DuplicatePlaceholder { existing: String, duplicate: String },

    /// The host never produced a reloadable representation for a target.
    #[error("timed out reloading `{target}` after {attempts} attempts")]
    ReloadTimeout { target: String, attempts: u32 },

    /// The originating request was aborted while waiting on pending transforms.
    #[error("stylesheet request was cancelled")]
    Cancelled,

    #[error(transparent)]
    Bundle(#[from] RenameError),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl From<serde_json::Error> for StylexError {
    fn from(err: serde_json::Error) -> Self {
        StylexError::Config(err.to_string())
    }
}

impl From<serde_yaml::Error> for StylexError {
    fn from(err: serde_yaml::Error) -> Self {
        StylexError::Config(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, StylexError>;

fn guidance_suffix(guidance: &Option<String>) -> String {
    match guidance {
        Some(text) => format!("\n\n{text}"),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_error_appends_guidance() {
        let err = StylexError::Extract {
            module_id: "src/Card.tsx".to_string(),
            message: "bad value".to_string(),
            guidance: Some("move it to a .stylex.ts file".to_string()),
        };

        let text = err.to_string();
        assert!(text.starts_with("src/Card.tsx: bad value"));
        assert!(text.ends_with("move it to a .stylex.ts file"));
    }

    #[test]
    fn test_extract_error_without_guidance() {
        let err = StylexError::Extract {
            module_id: "a.ts".to_string(),
            message: "boom".to_string(),
            guidance: None,
        };

        assert_eq!(err.to_string(), "a.ts: boom");
    }

    #[test]
    fn test_config_error_from_json() {
        let json_err = serde_json::from_str::<u32>("nope").unwrap_err();
        let err: StylexError = json_err.into();
        assert!(matches!(err, StylexError::Config(_)));
    }
}
