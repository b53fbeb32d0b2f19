//! Versioned stylesheet compiler
//!
//! The merge step is a whole-graph operation. It is memoized against the
//! registry epoch so repeated requests between edits cost nothing.

use std::sync::Arc;

use crate::registry::{Epoch, StyleRegistry};
use crate::rules::StylesheetMerger;
use crate::Result;

/// Merged stylesheet tagged with the registry epoch and layer setting it
/// was built with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledStylesheet {
    pub epoch: Epoch,
    pub use_layers: bool,
    pub css: Arc<str>,
}

impl CompiledStylesheet {
    pub fn is_current(&self, registry: &StyleRegistry, use_layers: bool) -> bool {
        self.epoch == registry.epoch() && self.use_layers == use_layers
    }
}

#[derive(Debug, Default, Clone)]
pub struct VersionedCompiler {
    cached: Option<CompiledStylesheet>,
}

impl VersionedCompiler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cached(&self) -> Option<&CompiledStylesheet> {
        self.cached.as_ref()
    }

    pub fn invalidate(&mut self) {
        self.cached = None;
    }

    /// Return the stylesheet for the registry's current epoch, merging only
    /// when the cached result is stale.
    pub fn compile(
        &mut self,
        registry: &StyleRegistry,
        merger: &dyn StylesheetMerger,
        use_layers: bool,
    ) -> Result<Arc<str>> {
        if let Some(cached) = self.cached.as_ref().filter(|c| c.is_current(registry, use_layers)) {
            return Ok(Arc::clone(&cached.css));
        }

        let rules = registry.all_rules();
        let css: Arc<str> = if rules.is_empty() {
            Arc::from("")
        } else {
            tracing::debug!(
                epoch = %registry.epoch(),
                rules = rules.len(),
                "merging stylesheet"
            );
            Arc::from(merger.merge(&rules, use_layers)?)
        };

        self.cached = Some(CompiledStylesheet {
            epoch: registry.epoch(),
            use_layers,
            css: Arc::clone(&css),
        });
        Ok(css)
    }
}
