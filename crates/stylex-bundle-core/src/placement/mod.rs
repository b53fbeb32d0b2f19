//! Build-time placement of the merged stylesheet
//!
//! One [`FrameworkVariant`] is resolved per build and maps to one
//! [`PlacementStrategy`]. Strategies mutate the host's [`OutputBundle`]:
//! they either emit a fresh asset or splice the stylesheet into assets the
//! host already produced, renaming them by content hash and rewiring every
//! chunk that pointed at the old names.

mod detect;
mod per_chunk;
mod shared_root;
mod splice;
mod standalone;

pub use detect::{default_detectors, resolve_variant, FrameworkVariant, VariantDetector};
pub use per_chunk::PerChunkStrategy;
pub use shared_root::SharedRootStrategy;
pub use splice::{
    count_markers, references_asset, rewrite_asset_references, splice_marker, PLACEHOLDER_MARKER,
};
pub use standalone::{standalone_file_name, StandaloneStrategy};

use crate::bundle::{OutputBundle, RenameError};
use crate::config::StylexOptions;
use crate::diagnostics::Diagnostics;
use crate::hash::{content_hash, rehash_file_name};
use crate::Result;
use rustc_hash::FxHashMap;

/// Inputs shared by every strategy.
pub struct PlacementContext<'a> {
    pub bundle: &'a mut OutputBundle,
    /// Compiled stylesheet (empty when no rules are registered)
    pub css: &'a str,
    /// Whether the registry held any rules when `css` was compiled
    pub has_rules: bool,
    pub options: &'a StylexOptions,
    pub diagnostics: &'a Diagnostics,
}

/// A chunk rehashed because its code named a renamed stylesheet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChunkRename {
    pub old_name: String,
    /// Final file name once every placement in the build has run
    pub new_name: String,
}

/// How the chunks that depend on a renamed stylesheet were found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DependentLookup {
    /// Through the chunks' recorded CSS dependencies
    CssIndex,
    /// Only through literal references in chunk code; every such chunk is
    /// listed in the record's `renamed_chunks`
    TextReference,
}

/// One spliced stylesheet and the chunks kept pointing at it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetPlacementRecord {
    pub old_name: String,
    pub new_name: String,
    /// Dependent chunks, by their final file names
    pub dependents: Vec<String>,
    pub lookup: DependentLookup,
    /// Chunks whose code was rewritten to the new name and rehashed,
    /// whichever lookup found the stylesheet's dependents
    pub renamed_chunks: Vec<ChunkRename>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    NoRules,
    MarkerNotFound,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlacementOutcome {
    Emitted { file_name: String },
    Spliced { records: Vec<AssetPlacementRecord> },
    Skipped { reason: SkipReason },
}

impl PlacementOutcome {
    /// File name of a standalone stylesheet, if one was emitted.
    pub fn emitted_file(&self) -> Option<&str> {
        match self {
            PlacementOutcome::Emitted { file_name } => Some(file_name),
            _ => None,
        }
    }
}

pub trait PlacementStrategy: Send + Sync {
    fn variant(&self) -> FrameworkVariant;

    fn place(&self, ctx: &mut PlacementContext<'_>) -> Result<PlacementOutcome>;
}

pub fn strategy_for(variant: FrameworkVariant) -> Box<dyn PlacementStrategy> {
    match variant {
        FrameworkVariant::Standalone => Box::new(StandaloneStrategy),
        FrameworkVariant::SharedRoot => Box::new(SharedRootStrategy),
        FrameworkVariant::PerChunk => Box::new(PerChunkStrategy),
    }
}

/// Splice `css` into `asset`, then rename it after its new content hash.
///
/// Returns the new file name. The rename also rewrites every chunk's
/// dependency sets.
fn splice_and_rehash(bundle: &mut OutputBundle, asset: &str, css: &str) -> Result<String> {
    let Some(entry) = bundle.asset(asset) else {
        return Err(RenameError::Missing(asset.to_string()).into());
    };
    let source = splice_marker(asset, &entry.source, css)?;
    let new_name = rehash_file_name(asset, &content_hash(source.as_bytes()));
    if new_name != asset && bundle.contains(&new_name) {
        return Err(RenameError::Occupied(new_name).into());
    }

    if let Some(entry) = bundle.asset_mut(asset) {
        entry.source = source;
    }
    bundle.rename(asset, &new_name)?;
    tracing::debug!(old = asset, new = %new_name, "stylesheet spliced");
    Ok(new_name)
}

/// Chunks whose code names `file_name` as a quoted string or URL segment.
fn chunks_referencing(bundle: &OutputBundle, file_name: &str) -> Vec<String> {
    bundle
        .chunks()
        .filter(|chunk| references_asset(&chunk.code, file_name))
        .map(|chunk| chunk.file_name.clone())
        .collect()
}

/// Rewrite every literal reference to `old_asset` in chunk code, then
/// rehash and rename each rewritten chunk.
///
/// Chunks that listed the asset only in their CSS dependencies are left
/// alone; `OutputBundle::rename` already moved those.
fn rewire_text_references(
    bundle: &mut OutputBundle,
    old_asset: &str,
    new_asset: &str,
) -> Result<Vec<ChunkRename>> {
    let referencing = chunks_referencing(bundle, old_asset);
    let mut renamed = Vec::with_capacity(referencing.len());

    for chunk in referencing {
        let Some(entry) = bundle.chunk_mut(&chunk) else {
            continue;
        };
        let Some(code) = rewrite_asset_references(&entry.code, old_asset, new_asset) else {
            continue;
        };
        entry.code = code;
        let new_chunk = rehash_file_name(&chunk, &content_hash(entry.code.as_bytes()));
        bundle.rename(&chunk, &new_chunk)?;
        rewrite_chunk_references(bundle, &chunk, &new_chunk);

        tracing::debug!(asset = new_asset, chunk = %new_chunk, "rewired stylesheet through chunk code");
        renamed.push(ChunkRename {
            old_name: chunk,
            new_name: new_chunk,
        });
    }
    Ok(renamed)
}

/// Point literal imports of a renamed chunk at its new name.
fn rewrite_chunk_references(bundle: &mut OutputBundle, old_chunk: &str, new_chunk: &str) {
    let importers: Vec<String> = chunks_referencing(bundle, old_chunk)
        .into_iter()
        .filter(|importer| importer != new_chunk)
        .collect();

    for importer in importers {
        if let Some(entry) = bundle.chunk_mut(&importer) {
            if let Some(code) = rewrite_asset_references(&entry.code, old_chunk, new_chunk) {
                entry.code = code;
            }
        }
    }
}

/// Chunks depending on `asset` after its splice: the CSS index plus every
/// chunk rewritten by reference, without repeats.
fn dependents_of(bundle: &OutputBundle, asset: &str, renamed: &[ChunkRename]) -> Vec<String> {
    let mut dependents = bundle.chunks_importing_css(asset);
    for rename in renamed {
        if !dependents.contains(&rename.new_name) {
            dependents.push(rename.new_name.clone());
        }
    }
    dependents
}

/// Replace chunk names in `records` by the names they ended up with.
///
/// A chunk can be renamed again by a later placement in the same build
/// when it names more than one spliced stylesheet.
fn resolve_final_chunk_names(records: &mut [AssetPlacementRecord]) {
    let renames: FxHashMap<String, String> = records
        .iter()
        .flat_map(|record| &record.renamed_chunks)
        .map(|rename| (rename.old_name.clone(), rename.new_name.clone()))
        .collect();
    if renames.is_empty() {
        return;
    }

    let resolve = |name: &mut String| {
        for _ in 0..renames.len() {
            match renames.get(name.as_str()) {
                Some(next) if next.as_str() != name.as_str() => *name = next.clone(),
                _ => break,
            }
        }
    };
    for record in records.iter_mut() {
        record.dependents.iter_mut().for_each(resolve);
        record
            .renamed_chunks
            .iter_mut()
            .for_each(|rename| resolve(&mut rename.new_name));
    }
}
