use super::{FrameworkVariant, PlacementContext, PlacementOutcome, PlacementStrategy, SkipReason};
use crate::bundle::OutputAsset;
use crate::hash::content_hash;
use crate::Result;

/// Emits the stylesheet as its own asset, `assets/<prefix>.<hash>.css`.
#[derive(Debug, Default, Clone, Copy)]
pub struct StandaloneStrategy;

pub fn standalone_file_name(prefix: &str, css: &str) -> String {
    format!("assets/{prefix}.{}.css", content_hash(css.as_bytes()))
}

impl PlacementStrategy for StandaloneStrategy {
    fn variant(&self) -> FrameworkVariant {
        FrameworkVariant::Standalone
    }

    fn place(&self, ctx: &mut PlacementContext<'_>) -> Result<PlacementOutcome> {
        if !ctx.has_rules {
            tracing::debug!("no style rules registered, skipping stylesheet asset");
            return Ok(PlacementOutcome::Skipped {
                reason: SkipReason::NoRules,
            });
        }

        let file_name = standalone_file_name(&ctx.options.stylesheet_prefix, ctx.css);
        ctx.bundle
            .insert_asset(OutputAsset::new(file_name.clone(), ctx.css));
        tracing::info!(asset = %file_name, "emitted stylesheet");
        Ok(PlacementOutcome::Emitted { file_name })
    }
}
