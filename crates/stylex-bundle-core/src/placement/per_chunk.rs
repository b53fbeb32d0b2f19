use super::{
    chunks_referencing, dependents_of, resolve_final_chunk_names, rewire_text_references,
    splice_and_rehash, AssetPlacementRecord, DependentLookup, FrameworkVariant, PlacementContext,
    PlacementOutcome, PlacementStrategy, SkipReason, PLACEHOLDER_MARKER,
};
use crate::diagnostics::{Diagnostic, DiagnosticCode};
use crate::{Result, StylexError};

/// Splices into every stylesheet carrying the placeholder, for frameworks
/// that emit one stylesheet per route or layout.
///
/// Dependents are found through the CSS index first. Hosts that load CSS at
/// runtime by file name embed the asset name in chunk code instead; every
/// chunk naming the stylesheet that way is rewritten and rehashed, whether
/// or not the index also lists it.
#[derive(Debug, Default, Clone, Copy)]
pub struct PerChunkStrategy;

impl PlacementStrategy for PerChunkStrategy {
    fn variant(&self) -> FrameworkVariant {
        FrameworkVariant::PerChunk
    }

    fn place(&self, ctx: &mut PlacementContext<'_>) -> Result<PlacementOutcome> {
        let marked = ctx.bundle.css_assets_containing(PLACEHOLDER_MARKER);
        if marked.is_empty() {
            ctx.diagnostics.report(Diagnostic::warning(
                DiagnosticCode::PlaceholderNotFound,
                format!("no stylesheet contains `{PLACEHOLDER_MARKER}`; StyleX styles were not injected"),
            ));
            return Ok(PlacementOutcome::Skipped {
                reason: SkipReason::MarkerNotFound,
            });
        }

        let mut records = Vec::with_capacity(marked.len());
        for asset in marked {
            let indexed = !ctx.bundle.chunks_importing_css(&asset).is_empty();
            if !indexed && chunks_referencing(ctx.bundle, &asset).is_empty() {
                return Err(StylexError::RelatedChunkNotFound { asset });
            }

            let new_name = splice_and_rehash(ctx.bundle, &asset, ctx.css)?;
            let renamed_chunks = rewire_text_references(ctx.bundle, &asset, &new_name)?;
            records.push(AssetPlacementRecord {
                dependents: dependents_of(ctx.bundle, &new_name, &renamed_chunks),
                old_name: asset,
                new_name,
                lookup: if indexed {
                    DependentLookup::CssIndex
                } else {
                    DependentLookup::TextReference
                },
                renamed_chunks,
            });
        }
        resolve_final_chunk_names(&mut records);

        tracing::info!(assets = records.len(), "spliced stylesheet into per-chunk assets");
        Ok(PlacementOutcome::Spliced { records })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bundle::{OutputAsset, OutputBundle, OutputChunk};
    use crate::config::StylexOptions;
    use crate::diagnostics::{CollectingDiagnosticHandler, Diagnostics};
    use crate::hash::base_name;
    use crate::placement::references_asset;
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
        (PerChunkStrategy.place(&mut ctx), collector)
    }

    fn spliced(outcome: Result<PlacementOutcome>) -> Vec<AssetPlacementRecord> {
        match outcome.unwrap() {
            PlacementOutcome::Spliced { records } => records,
            other => panic!("expected a splice, got {other:?}"),
        }
    }

    fn assert_no_chunk_names(bundle: &OutputBundle, file_name: &str) {
        let stale: Vec<_> = bundle
            .chunks()
            .filter(|chunk| references_asset(&chunk.code, file_name))
            .map(|chunk| chunk.file_name.clone())
            .collect();
        assert!(stale.is_empty(), "chunks still naming `{file_name}`: {stale:?}");
    }

    #[test]
    fn test_no_marker_warns_and_skips() {
        let mut bundle = OutputBundle::new();
        let (outcome, collector) = run(&mut bundle, ".a{}");

        assert_eq!(
            outcome.unwrap(),
            PlacementOutcome::Skipped {
                reason: SkipReason::MarkerNotFound
            }
        );
        assert!(collector.has_code(DiagnosticCode::PlaceholderNotFound));
    }

    #[test]
    fn test_text_reference_fallback_renames_chunk() {
        let mut bundle = OutputBundle::new();
        bundle.insert_asset(OutputAsset::new(
            "assets/root-aaaaaaaa.css",
            format!("body{{}}{PLACEHOLDER_MARKER}"),
        ));
        bundle.insert_chunk(OutputChunk::new(
            "assets/root-11111111.js",
            r#"export const links = () => [{ rel: "stylesheet", href: "/assets/root-aaaaaaaa.css" }];"#,
        ));
        bundle.insert_chunk(OutputChunk::new(
            "assets/manifest-22222222.js",
            r#"import("/assets/root-11111111.js")"#,
        ).with_dynamic_import("assets/root-11111111.js"));

        let records = spliced(run(&mut bundle, ".a{color:red}").0);
        let record = &records[0];

        assert_eq!(record.lookup, DependentLookup::TextReference);
        let [rename] = record.renamed_chunks.as_slice() else {
            panic!("expected one renamed chunk, got {:?}", record.renamed_chunks);
        };
        assert_eq!(rename.old_name, "assets/root-11111111.js");
        assert_eq!(record.dependents, vec![rename.new_name.clone()]);
        assert!(!bundle.contains(&rename.old_name));
        assert!(!bundle.contains(&record.old_name));

        let chunk = bundle.chunk(&rename.new_name).unwrap();
        assert!(chunk.code.contains(&format!("\"/{}\"", record.new_name)));
        assert!(!chunk.code.contains("root-aaaaaaaa.css"));

        let manifest = bundle.chunk("assets/manifest-22222222.js").unwrap();
        assert!(manifest.dynamic_imports.contains(rename.new_name.as_str()));
        assert!(manifest.code.contains(rename.new_name.as_str()));
    }

    #[test]
    fn test_every_chunk_naming_the_stylesheet_is_rewritten() {
        let mut bundle = OutputBundle::new();
        bundle.insert_asset(OutputAsset::new(
            "assets/0.AbCd1234.css",
            format!("{PLACEHOLDER_MARKER}nav{{}}"),
        ));
        for chunk in ["nodes/0.Zx98Yw76.js", "nodes/2.Gh34Jk56.js"] {
            bundle.insert_chunk(OutputChunk::new(
                chunk,
                r#"export const css = ["../assets/0.AbCd1234.css"];"#,
            ));
        }

        let records = spliced(run(&mut bundle, ".a{color:red}").0);
        let record = &records[0];

        let old_chunks: Vec<_> = record
            .renamed_chunks
            .iter()
            .map(|rename| rename.old_name.as_str())
            .collect();
        assert_eq!(old_chunks, vec!["nodes/0.Zx98Yw76.js", "nodes/2.Gh34Jk56.js"]);
        assert_eq!(record.dependents.len(), 2);
        assert_no_chunk_names(&bundle, "0.AbCd1234.css");
        for dependent in &record.dependents {
            let code = &bundle.chunk(dependent).unwrap().code;
            assert!(code.contains(base_name(&record.new_name)), "{dependent} lost its stylesheet");
        }
    }

    #[test]
    fn test_indexed_chunk_with_url_literal_is_rewritten_too() {
        let mut bundle = OutputBundle::new();
        bundle.insert_asset(OutputAsset::new(
            "assets/root-AbCd1234.css",
            format!("html{{}}{PLACEHOLDER_MARKER}"),
        ));
        bundle.insert_chunk(
            OutputChunk::new(
                "assets/root-Xy12Ab34.js",
                r#"import href from "/assets/root-AbCd1234.css?url"; export const links = () => [{ href }];"#,
            )
            .with_css("assets/root-AbCd1234.css"),
        );
        bundle.insert_chunk(
            OutputChunk::new("assets/_index-Qw12Er34.js", "export default function Index() {}")
                .with_css("assets/root-AbCd1234.css"),
        );

        let records = spliced(run(&mut bundle, ".a{color:red}").0);
        let record = &records[0];

        assert_eq!(record.lookup, DependentLookup::CssIndex);
        assert_no_chunk_names(&bundle, "root-AbCd1234.css");
        let [rename] = record.renamed_chunks.as_slice() else {
            panic!("expected one renamed chunk, got {:?}", record.renamed_chunks);
        };
        assert_eq!(rename.old_name, "assets/root-Xy12Ab34.js");

        let root = bundle.chunk(&rename.new_name).unwrap();
        assert!(root.imported_css.contains(record.new_name.as_str()));
        assert!(root
            .code
            .contains(&format!("/{}?url", base_name(&record.new_name))));
        assert!(bundle.chunk("assets/_index-Qw12Er34.js").is_some());
        assert_eq!(
            record.dependents,
            vec![rename.new_name.clone(), "assets/_index-Qw12Er34.js".to_string()]
        );
    }

    #[test]
    fn test_chunk_naming_two_stylesheets_reports_its_final_name() {
        let mut bundle = OutputBundle::new();
        bundle.insert_asset(OutputAsset::new("assets/a-AbCd1234.css", PLACEHOLDER_MARKER));
        bundle.insert_asset(OutputAsset::new("assets/b-EfGh5678.css", PLACEHOLDER_MARKER));
        bundle.insert_chunk(OutputChunk::new(
            "assets/page-Zx98Yw76.js",
            r#"export const css = ["/assets/a-AbCd1234.css", "/assets/b-EfGh5678.css"];"#,
        ));

        let records = spliced(run(&mut bundle, ".a{color:red}").0);
        assert_eq!(records.len(), 2);

        let final_chunk = bundle
            .chunks()
            .map(|chunk| chunk.file_name.clone())
            .next()
            .unwrap();
        for record in &records {
            assert_eq!(record.dependents, vec![final_chunk.clone()]);
            assert_eq!(record.renamed_chunks[0].new_name, final_chunk);
        }
        let code = &bundle.chunk(&final_chunk).unwrap().code;
        for record in &records {
            assert!(code.contains(base_name(&record.new_name)));
        }
    }

    #[test]
    fn test_unreferenced_asset_is_fatal() {
        let mut bundle = OutputBundle::new();
        bundle.insert_asset(OutputAsset::new("assets/orphan.css", PLACEHOLDER_MARKER));
        bundle.insert_chunk(OutputChunk::new("assets/entry.js", "console.log(1)"));

        let (outcome, _) = run(&mut bundle, "");
        assert!(matches!(
            outcome,
            Err(StylexError::RelatedChunkNotFound { asset }) if asset == "assets/orphan.css"
        ));
        assert!(bundle.contains("assets/orphan.css"));
    }
}
