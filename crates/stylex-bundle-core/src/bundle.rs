//! In-memory view of the host's output bundle
//!
//! The host hands its generated assets and chunks to the placement step as
//! an [`OutputBundle`]; the placement step mutates it in place and the host
//! writes it back out. Entries are keyed by file name.

use indexmap::{IndexMap, IndexSet};
use rustc_hash::FxBuildHasher;

pub type NameSet = IndexSet<String, FxBuildHasher>;

/// A non-code output file (stylesheets, images, ...).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputAsset {
    pub file_name: String,
    pub source: String,
}

impl OutputAsset {
    pub fn new(file_name: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            file_name: file_name.into(),
            source: source.into(),
        }
    }

    pub fn is_css(&self) -> bool {
        self.file_name.ends_with(".css")
    }
}

/// A generated code file together with its recorded dependencies.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct OutputChunk {
    pub file_name: String,
    pub code: String,
    pub is_entry: bool,

    /// Static imports of other chunks, by file name
    pub imports: NameSet,

    /// Dynamic imports of other chunks, by file name
    pub dynamic_imports: NameSet,

    /// CSS assets this chunk loads (the host's CSS dependency index)
    pub imported_css: NameSet,

    /// Other assets this chunk references
    pub imported_assets: NameSet,
}

impl OutputChunk {
    pub fn new(file_name: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            file_name: file_name.into(),
            code: code.into(),
            ..Self::default()
        }
    }

    pub fn entry(mut self) -> Self {
        self.is_entry = true;
        self
    }

    pub fn with_css(mut self, css_file: impl Into<String>) -> Self {
        self.imported_css.insert(css_file.into());
        self
    }

    pub fn with_import(mut self, chunk_file: impl Into<String>) -> Self {
        self.imports.insert(chunk_file.into());
        self
    }

    pub fn with_dynamic_import(mut self, chunk_file: impl Into<String>) -> Self {
        self.dynamic_imports.insert(chunk_file.into());
        self
    }

    /// Replace `old` with `new` in every dependency set, keeping positions.
    fn rename_dependency(&mut self, old: &str, new: &str) -> bool {
        let mut changed = false;
        for set in [
            &mut self.imports,
            &mut self.dynamic_imports,
            &mut self.imported_css,
            &mut self.imported_assets,
        ] {
            changed |= replace_in_set(set, old, new);
        }
        changed
    }
}

fn replace_in_set(set: &mut NameSet, old: &str, new: &str) -> bool {
    let Some(index) = set.get_index_of(old) else {
        return false;
    };
    if set.contains(new) {
        set.shift_remove_index(index);
    } else {
        set.insert(new.to_string());
        // `insert` appended the new name; move it into the old slot.
        let last = set.len() - 1;
        set.move_index(last, index);
        set.shift_remove_index(index + 1);
    }
    true
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputItem {
    Asset(OutputAsset),
    Chunk(OutputChunk),
}

impl OutputItem {
    pub fn file_name(&self) -> &str {
        match self {
            OutputItem::Asset(asset) => &asset.file_name,
            OutputItem::Chunk(chunk) => &chunk.file_name,
        }
    }

    fn set_file_name(&mut self, file_name: String) {
        match self {
            OutputItem::Asset(asset) => asset.file_name = file_name,
            OutputItem::Chunk(chunk) => chunk.file_name = file_name,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OutputBundle {
    items: IndexMap<String, OutputItem, FxBuildHasher>,
}

impl OutputBundle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn contains(&self, file_name: &str) -> bool {
        self.items.contains_key(file_name)
    }

    pub fn get(&self, file_name: &str) -> Option<&OutputItem> {
        self.items.get(file_name)
    }

    pub fn insert_asset(&mut self, asset: OutputAsset) {
        self.items
            .insert(asset.file_name.clone(), OutputItem::Asset(asset));
    }

    pub fn insert_chunk(&mut self, chunk: OutputChunk) {
        self.items
            .insert(chunk.file_name.clone(), OutputItem::Chunk(chunk));
    }

    pub fn asset(&self, file_name: &str) -> Option<&OutputAsset> {
        match self.items.get(file_name) {
            Some(OutputItem::Asset(asset)) => Some(asset),
            _ => None,
        }
    }

    pub fn asset_mut(&mut self, file_name: &str) -> Option<&mut OutputAsset> {
        match self.items.get_mut(file_name) {
            Some(OutputItem::Asset(asset)) => Some(asset),
            _ => None,
        }
    }

    pub fn chunk(&self, file_name: &str) -> Option<&OutputChunk> {
        match self.items.get(file_name) {
            Some(OutputItem::Chunk(chunk)) => Some(chunk),
            _ => None,
        }
    }

    pub fn chunk_mut(&mut self, file_name: &str) -> Option<&mut OutputChunk> {
        match self.items.get_mut(file_name) {
            Some(OutputItem::Chunk(chunk)) => Some(chunk),
            _ => None,
        }
    }

    pub fn assets(&self) -> impl Iterator<Item = &OutputAsset> {
        self.items.values().filter_map(|item| match item {
            OutputItem::Asset(asset) => Some(asset),
            OutputItem::Chunk(_) => None,
        })
    }

    pub fn chunks(&self) -> impl Iterator<Item = &OutputChunk> {
        self.items.values().filter_map(|item| match item {
            OutputItem::Chunk(chunk) => Some(chunk),
            OutputItem::Asset(_) => None,
        })
    }

    pub fn file_names(&self) -> impl Iterator<Item = &str> {
        self.items.keys().map(String::as_str)
    }

    /// CSS assets whose source contains `needle`, in bundle order.
    pub fn css_assets_containing(&self, needle: &str) -> Vec<String> {
        self.assets()
            .filter(|asset| asset.is_css() && asset.source.contains(needle))
            .map(|asset| asset.file_name.clone())
            .collect()
    }

    /// Chunks that list `css_file` in their CSS dependency index.
    pub fn chunks_importing_css(&self, css_file: &str) -> Vec<String> {
        self.chunks()
            .filter(|chunk| chunk.imported_css.contains(css_file))
            .map(|chunk| chunk.file_name.clone())
            .collect()
    }

    /// Move the entry at `old` to `new` in one step.
    ///
    /// The entry keeps its position, its own `file_name` is updated, and
    /// every chunk dependency set naming `old` is rewritten to `new`. Returns
    /// the files whose dependency sets were rewritten. Fails without touching
    /// the bundle if `old` is missing or `new` is taken by another entry.
    pub fn rename(&mut self, old: &str, new: &str) -> Result<Vec<String>, RenameError> {
        if old == new {
            return Ok(Vec::new());
        }
        if self.items.contains_key(new) {
            return Err(RenameError::Occupied(new.to_string()));
        }
        let Some(index) = self.items.get_index_of(old) else {
            return Err(RenameError::Missing(old.to_string()));
        };

        let Some((_, mut item)) = self.items.shift_remove_index(index) else {
            return Err(RenameError::Missing(old.to_string()));
        };
        item.set_file_name(new.to_string());
        let (last, _) = self.items.insert_full(new.to_string(), item);
        self.items.move_index(last, index);

        let mut rewired = Vec::new();
        for item in self.items.values_mut() {
            if let OutputItem::Chunk(chunk) = item {
                if chunk.rename_dependency(old, new) {
                    rewired.push(chunk.file_name.clone());
                }
            }
        }
        Ok(rewired)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RenameError {
    #[error("no bundle entry named `{0}`")]
    Missing(String),
    #[error("bundle entry `{0}` already exists")]
    Occupied(String),
}
