use super::{
    dependents_of, rewire_text_references, splice_and_rehash, AssetPlacementRecord,
    DependentLookup, FrameworkVariant, PlacementContext, PlacementOutcome, PlacementStrategy,
    SkipReason, PLACEHOLDER_MARKER,
};
use crate::diagnostics::{Diagnostic, DiagnosticCode};
use crate::{Result, StylexError};

/// Splices into the one root stylesheet the framework emits for the whole
/// app (Remix-style `root.css`).
#[derive(Debug, Default, Clone, Copy)]
pub struct SharedRootStrategy;

impl PlacementStrategy for SharedRootStrategy {
    fn variant(&self) -> FrameworkVariant {
        FrameworkVariant::SharedRoot
    }

    fn place(&self, ctx: &mut PlacementContext<'_>) -> Result<PlacementOutcome> {
        let marked = ctx.bundle.css_assets_containing(PLACEHOLDER_MARKER);
        let root = match marked.as_slice() {
            [] => {
                ctx.diagnostics.report(Diagnostic::warning(
                    DiagnosticCode::RootStylesheetNotFound,
                    format!(
                        "root stylesheet not found; did you add `{PLACEHOLDER_MARKER}` to a CSS file imported at your app root?"
                    ),
                ));
                return Ok(PlacementOutcome::Skipped {
                    reason: SkipReason::MarkerNotFound,
                });
            }
            [root] => root.clone(),
            _ => {
                return Err(StylexError::TooManyPlaceholders {
                    found: marked.len(),
                    expected: 1,
                    assets: marked.join(", "),
                })
            }
        };

        if ctx.bundle.chunks_importing_css(&root).is_empty() {
            return Err(StylexError::RelatedChunkNotFound { asset: root });
        }

        let new_name = splice_and_rehash(ctx.bundle, &root, ctx.css)?;
        // `?url` imports keep the file name in chunk code as well.
        let renamed_chunks = rewire_text_references(ctx.bundle, &root, &new_name)?;
        let dependents = dependents_of(ctx.bundle, &new_name, &renamed_chunks);
        tracing::info!(asset = %new_name, dependents = dependents.len(), "spliced stylesheet into root asset");

        Ok(PlacementOutcome::Spliced {
            records: vec![AssetPlacementRecord {
                old_name: root,
                new_name,
                dependents,
                lookup: DependentLookup::CssIndex,
                renamed_chunks,
            }],
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bundle::{OutputAsset, OutputBundle, OutputChunk};
    use crate::config::StylexOptions;
    use crate::diagnostics::{CollectingDiagnosticHandler, Diagnostics};
    use std::sync::Arc;

    fn run(bundle: &mut OutputBundle, css: &str) -> (Result<PlacementOutcome>, Arc<CollectingDiagnosticHandler>) {
        let options = StylexOptions::default();
        let collector = Arc::new(CollectingDiagnosticHandler::new());
        let diagnostics = Diagnostics::new(collector.clone());
        let mut ctx = PlacementContext {
            bundle,
            css,
            has_rules: !css.is_empty(),
            options: &options,
            diagnostics: &diagnostics,
        };
        (SharedRootStrategy.place(&mut ctx), collector)
    }

    #[test]
    fn test_missing_root_warns_and_skips() {
        let mut bundle = OutputBundle::new();
        bundle.insert_asset(OutputAsset::new("assets/other.css", "p{}"));

        let (outcome, collector) = run(&mut bundle, ".a{}");
        assert_eq!(
            outcome.unwrap(),
            PlacementOutcome::Skipped {
                reason: SkipReason::MarkerNotFound
            }
        );
        assert!(collector.has_code(DiagnosticCode::RootStylesheetNotFound));
    }

    #[test]
    fn test_two_roots_is_fatal() {
        let mut bundle = OutputBundle::new();
        bundle.insert_asset(OutputAsset::new("a.css", PLACEHOLDER_MARKER));
        bundle.insert_asset(OutputAsset::new("b.css", PLACEHOLDER_MARKER));

        let (outcome, _) = run(&mut bundle, ".a{}");
        assert!(matches!(
            outcome,
            Err(StylexError::TooManyPlaceholders { found: 2, .. })
        ));
    }

    #[test]
    fn test_root_without_dependent_chunk_is_fatal_and_untouched() {
        let mut bundle = OutputBundle::new();
        bundle.insert_asset(OutputAsset::new("assets/root-aaaaaaaa.css", PLACEHOLDER_MARKER));
        bundle.insert_chunk(OutputChunk::new("assets/entry.js", ""));
        let before = bundle.clone();

        let (outcome, _) = run(&mut bundle, ".a{}");
        assert!(matches!(outcome, Err(StylexError::RelatedChunkNotFound { .. })));
        assert_eq!(bundle, before);
    }
}
