//! Non-fatal diagnostics
//!
//! Warnings never abort a build. They are handed to a [`DiagnosticHandler`]
//! supplied by the embedding host; the default handler forwards them to
//! `tracing`.

use parking_lot::Mutex;
use rustc_hash::FxHashSet;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiagnosticLevel {
    Warning,
    Info,
}

/// Stable identifiers for every warning this crate can emit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiagnosticCode {
    /// SharedRoot: no CSS asset carries the placeholder marker.
    RootStylesheetNotFound,
    /// PerChunk: no CSS asset carries the placeholder marker.
    PlaceholderNotFound,
    /// The integration and the extractor disagree on major/minor version.
    VersionMismatch,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub level: DiagnosticLevel,
    pub code: DiagnosticCode,
    pub message: String,
}

impl Diagnostic {
    pub fn warning(code: DiagnosticCode, message: impl Into<String>) -> Self {
        Self {
            level: DiagnosticLevel::Warning,
            code,
            message: message.into(),
        }
    }
}

/// Sink for diagnostics produced by the pipeline
pub trait DiagnosticHandler: Send + Sync {
    fn report(&self, diagnostic: Diagnostic);
}

/// Forwards diagnostics to the `tracing` subscriber installed by the host.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingDiagnosticHandler;

impl DiagnosticHandler for TracingDiagnosticHandler {
    fn report(&self, diagnostic: Diagnostic) {
        match diagnostic.level {
            DiagnosticLevel::Warning => {
                tracing::warn!(code = ?diagnostic.code, "{}", diagnostic.message)
            }
            DiagnosticLevel::Info => {
                tracing::info!(code = ?diagnostic.code, "{}", diagnostic.message)
            }
        }
    }
}

/// Stores every diagnostic it receives.
#[derive(Debug, Default)]
pub struct CollectingDiagnosticHandler {
    diagnostics: Mutex<Vec<Diagnostic>>,
}

impl CollectingDiagnosticHandler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn diagnostics(&self) -> Vec<Diagnostic> {
        self.diagnostics.lock().clone()
    }

    pub fn has_code(&self, code: DiagnosticCode) -> bool {
        self.diagnostics.lock().iter().any(|d| d.code == code)
    }

    pub fn count(&self) -> usize {
        self.diagnostics.lock().len()
    }
}

impl DiagnosticHandler for CollectingDiagnosticHandler {
    fn report(&self, diagnostic: Diagnostic) {
        self.diagnostics.lock().push(diagnostic);
    }
}

/// Per-session reporter that suppresses repeats of once-only warnings.
#[derive(Clone)]
pub struct Diagnostics {
    handler: Arc<dyn DiagnosticHandler>,
    reported_once: Arc<Mutex<FxHashSet<DiagnosticCode>>>,
}

impl Diagnostics {
    pub fn new(handler: Arc<dyn DiagnosticHandler>) -> Self {
        Self {
            handler,
            reported_once: Arc::new(Mutex::new(FxHashSet::default())),
        }
    }

    pub fn report(&self, diagnostic: Diagnostic) {
        self.handler.report(diagnostic);
    }

    /// Report `diagnostic` unless one with the same code was already reported
    /// through this method during the session.
    pub fn report_once(&self, diagnostic: Diagnostic) -> bool {
        if !self.reported_once.lock().insert(diagnostic.code) {
            return false;
        }
        self.handler.report(diagnostic);
        true
    }
}

impl Default for Diagnostics {
    fn default() -> Self {
        Self::new(Arc::new(TracingDiagnosticHandler))
    }
}

impl std::fmt::Debug for Diagnostics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Diagnostics")
            .field("reported_once", &self.reported_once.lock().len())
            .finish()
    }
}
