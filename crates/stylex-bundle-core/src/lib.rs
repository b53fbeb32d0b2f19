//! StyleX bundler integration core
//!
//! Collects the atomic style rules each source module declares, merges them
//! into one deterministic stylesheet, and places that stylesheet into the
//! host bundler's output, either as a standalone asset or spliced into a
//! framework-owned CSS file.
//!
//! The crate is host-agnostic: a thin adapter maps the host's lifecycle hooks
//! onto [`Pipeline`] (builds) and [`dev::DevSession`] (dev servers), and
//! supplies a [`StyleExtractor`] backed by the real StyleX compiler.

pub mod bundle;
pub mod compiler;
pub mod config;
pub mod dev;
pub mod diagnostics;
pub mod error;
pub mod extractor;
pub mod hash;
pub mod html;
pub mod pipeline;
pub mod placement;
pub mod registry;
pub mod rules;
pub mod version;

pub use bundle::{OutputAsset, OutputBundle, OutputChunk, RenameError};
pub use compiler::VersionedCompiler;
pub use config::{HostAlias, StylexOptions};
pub use diagnostics::{Diagnostic, DiagnosticCode, DiagnosticHandler, Diagnostics};
pub use error::{Result, StylexError};
pub use extractor::{CompileMode, ExtractError, ExtractRequest, Extraction, StyleExtractor};
pub use pipeline::{Pipeline, PipelineBuilder, TransformOutput};
pub use placement::{FrameworkVariant, PlacementOutcome, PLACEHOLDER_MARKER};
pub use registry::{Epoch, StyleRegistry};
pub use rules::{PriorityMerger, RuleRecord, StylesheetMerger};

/// Public id of the virtual stylesheet module in standalone dev mode.
pub const VIRTUAL_MODULE_ID: &str = "virtual:stylex.css";

/// Internal id the host resolves [`VIRTUAL_MODULE_ID`] to.
pub const RESOLVED_VIRTUAL_MODULE_ID: &str = "\0virtual:stylex.css";
