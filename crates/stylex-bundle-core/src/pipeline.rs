//! Phase-ordered build pipeline
//!
//! A [`Pipeline`] owns all mutable state for one build or dev session and
//! exposes one method per host lifecycle phase:
//!
//! 1. [`Pipeline::on_build_start`] resets the registry and resolves the
//!    placement variant,
//! 2. [`Pipeline::on_transform`] (or [`Pipeline::on_transform_batch`]) runs
//!    the extractor and records rules per module,
//! 3. [`Pipeline::on_generate_assets`] places the merged stylesheet into the
//!    output bundle,
//! 4. [`Pipeline::transform_index_html`] links a standalone stylesheet.
//!
//! An adapter layer maps these onto whatever hooks the host provides.

use parking_lot::Mutex;
use rayon::prelude::*;
use std::sync::Arc;

use crate::bundle::OutputBundle;
use crate::compiler::VersionedCompiler;
use crate::config::{AliasTable, HostAlias, StylexOptions};
use crate::diagnostics::{DiagnosticHandler, Diagnostics};
use crate::extractor::{
    authoring_error, CompileMode, ExtractRequest, Extraction, ModuleFilter, StyleExtractor,
};
use crate::html::{inject_stylesheet_link, public_path};
use crate::placement::{
    default_detectors, resolve_variant, strategy_for, FrameworkVariant, PlacementContext,
    PlacementOutcome, VariantDetector,
};
use crate::registry::{Epoch, StyleRegistry};
use crate::rules::{PriorityMerger, StylesheetMerger};
use crate::version::check_extractor_version;
use crate::Result;

/// Everything that changes while a pipeline runs.
#[derive(Debug, Default)]
pub struct PipelineState {
    pub registry: StyleRegistry,
    compiler: VersionedCompiler,
    variant: Option<FrameworkVariant>,
    standalone_asset: Option<String>,
}

/// Result of running one module through the pipeline.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TransformOutput {
    /// Rewritten module code; `None` leaves the module untouched
    pub code: Option<String>,
    /// Whether the module's rule set changed (and the epoch advanced)
    pub rules_changed: bool,
}

pub struct PipelineBuilder {
    options: StylexOptions,
    extractor: Arc<dyn StyleExtractor>,
    merger: Arc<dyn StylesheetMerger>,
    mode: CompileMode,
    host_aliases: Vec<HostAlias>,
    detectors: Vec<VariantDetector>,
    diagnostics: Diagnostics,
}

impl PipelineBuilder {
    pub fn merger(mut self, merger: Arc<dyn StylesheetMerger>) -> Self {
        self.merger = merger;
        self
    }

    pub fn mode(mut self, mode: CompileMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn host_aliases(mut self, aliases: impl IntoIterator<Item = HostAlias>) -> Self {
        self.host_aliases.extend(aliases);
        self
    }

    /// Replace the default framework detectors.
    pub fn detectors(mut self, detectors: Vec<VariantDetector>) -> Self {
        self.detectors = detectors;
        self
    }

    pub fn diagnostics(mut self, handler: Arc<dyn DiagnosticHandler>) -> Self {
        self.diagnostics = Diagnostics::new(handler);
        self
    }

    pub fn build(self) -> Pipeline {
        let aliases = self.options.merged_aliases(&self.host_aliases);
        Pipeline {
            filter: ModuleFilter::new(&self.options),
            aliases,
            options: self.options,
            extractor: self.extractor,
            merger: self.merger,
            mode: self.mode,
            detectors: self.detectors,
            diagnostics: self.diagnostics,
            state: Mutex::new(PipelineState::default()),
        }
    }
}

pub struct Pipeline {
    options: StylexOptions,
    aliases: AliasTable,
    filter: ModuleFilter,
    extractor: Arc<dyn StyleExtractor>,
    merger: Arc<dyn StylesheetMerger>,
    mode: CompileMode,
    detectors: Vec<VariantDetector>,
    diagnostics: Diagnostics,
    state: Mutex<PipelineState>,
}

impl Pipeline {
    pub fn builder(options: StylexOptions, extractor: Arc<dyn StyleExtractor>) -> PipelineBuilder {
        PipelineBuilder {
            options,
            extractor,
            merger: Arc::new(PriorityMerger),
            mode: CompileMode::Production,
            host_aliases: Vec::new(),
            detectors: default_detectors(),
            diagnostics: Diagnostics::default(),
        }
    }

    pub fn options(&self) -> &StylexOptions {
        &self.options
    }

    pub fn mode(&self) -> CompileMode {
        self.mode
    }

    pub fn aliases(&self) -> &AliasTable {
        &self.aliases
    }

    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    pub fn epoch(&self) -> Epoch {
        self.state.lock().registry.epoch()
    }

    /// Variant of the current build; standalone until a build has started
    /// with an explicit or detected variant.
    pub fn variant(&self) -> FrameworkVariant {
        self.state
            .lock()
            .variant
            .unwrap_or(FrameworkVariant::Standalone)
    }

    pub fn with_registry<R>(&self, f: impl FnOnce(&StyleRegistry) -> R) -> R {
        f(&self.state.lock().registry)
    }

    /// Warn once per session if the installed extractor is out of step.
    pub fn check_extractor_version(&self, expected: &str, installed: &str) -> bool {
        check_extractor_version(expected, installed, &self.diagnostics)
    }

    /// Start a build pass: clear the registry and fix the placement variant
    /// from the host's active integrations.
    pub fn on_build_start(&self, integrations: &[&str]) -> FrameworkVariant {
        let variant = resolve_variant(self.options.framework, integrations, &self.detectors);
        let mut state = self.state.lock();
        state.registry.reset();
        state.variant = Some(variant);
        state.standalone_asset = None;
        tracing::info!(%variant, mode = ?self.mode, "build started");
        variant
    }

    pub fn on_transform(&self, module_id: &str, source: &str) -> Result<TransformOutput> {
        let extraction = self.extract(module_id, source)?;
        Ok(self.record(module_id, extraction))
    }

    /// Transform independent modules, extracting in parallel.
    ///
    /// Registry writes happen afterwards in input order, so the result does
    /// not depend on scheduling. The first extraction error aborts the batch
    /// before any module is recorded.
    pub fn on_transform_batch(&self, modules: &[(String, String)]) -> Result<Vec<TransformOutput>> {
        let extractions = modules
            .par_iter()
            .map(|(module_id, source)| self.extract(module_id, source))
            .collect::<Result<Vec<_>>>()?;

        Ok(modules
            .iter()
            .zip(extractions)
            .map(|((module_id, _), extraction)| self.record(module_id, extraction))
            .collect())
    }

    /// Drop a module's rules (the file was deleted).
    pub fn remove_module(&self, module_id: &str) -> bool {
        self.state.lock().registry.remove(module_id)
    }

    /// The merged stylesheet for the registry's current content.
    pub fn compile_stylesheet(&self) -> Result<Arc<str>> {
        let mut state = self.state.lock();
        let PipelineState {
            registry, compiler, ..
        } = &mut *state;
        compiler.compile(registry, self.merger.as_ref(), self.options.use_css_layers)
    }

    /// Place the merged stylesheet into the host's output.
    pub fn on_generate_assets(&self, bundle: &mut OutputBundle) -> Result<PlacementOutcome> {
        let mut state = self.state.lock();
        let variant = state.variant.unwrap_or(FrameworkVariant::Standalone);
        let PipelineState {
            registry, compiler, ..
        } = &mut *state;
        let css = compiler.compile(registry, self.merger.as_ref(), self.options.use_css_layers)?;
        let has_rules = registry.has_rules();

        let mut ctx = PlacementContext {
            bundle,
            css: &css,
            has_rules,
            options: &self.options,
            diagnostics: &self.diagnostics,
        };
        let outcome = strategy_for(variant).place(&mut ctx)?;
        state.standalone_asset = outcome.emitted_file().map(str::to_string);
        Ok(outcome)
    }

    /// Link the standalone stylesheet from an HTML entry, if one was emitted.
    pub fn transform_index_html(&self, html: &str) -> String {
        match &self.state.lock().standalone_asset {
            Some(file_name) => {
                inject_stylesheet_link(html, &public_path(&self.options.base, file_name))
            }
            None => html.to_string(),
        }
    }

    pub fn standalone_asset(&self) -> Option<String> {
        self.state.lock().standalone_asset.clone()
    }

    /// Run the filter and the extractor; no registry access.
    fn extract(&self, module_id: &str, source: &str) -> Result<Option<Extraction>> {
        if !self.filter.should_transform(module_id, source) {
            return Ok(None);
        }
        let request = ExtractRequest {
            module_id,
            source,
            mode: self.mode,
            aliases: &self.aliases,
            options: &self.options.extractor,
        };
        self.extractor
            .extract(&request)
            .map_err(|err| authoring_error(module_id, err))
    }

    fn record(&self, module_id: &str, extraction: Option<Extraction>) -> TransformOutput {
        let mut state = self.state.lock();
        match extraction {
            Some(Extraction { code, rules }) => TransformOutput {
                rules_changed: state.registry.set(module_id, rules),
                code: Some(code),
            },
            // A module that stopped declaring styles must not keep its old rules.
            None => TransformOutput {
                rules_changed: state.registry.set(module_id, Vec::new()),
                code: None,
            },
        }
    }
}

impl std::fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline")
            .field("mode", &self.mode)
            .field("options", &self.options)
            .field("state", &*self.state.lock())
            .finish()
    }
}
