//! Integration options
//!
//! Options are usually written in the host's own config file and handed
//! over as JSON or YAML. Extractor pass-through options sit at the top level
//! next to the integration's own keys.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::placement::FrameworkVariant;
use crate::{Result, StylexError};

pub const DEFAULT_IMPORT_SOURCES: &[&str] = &["stylex", "@stylexjs/stylex"];
pub const DEFAULT_LIBRARIES: &[&str] = &["@stylexjs/open-props"];
pub const DEFAULT_CLASS_NAME_PREFIX: &str = "x";
pub const DEFAULT_STYLESHEET_PREFIX: &str = "stylex";

/// An import statement that marks a module as style-bearing.
///
/// Either a bare specifier (`import * as stylex from "@stylexjs/stylex"`) or
/// a named import from a re-exporting package
/// (`import { css } from "react-strict-dom"` is `{ from: "react-strict-dom", as: "css" }`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ImportSource {
    Specifier(String),
    Named {
        from: String,
        #[serde(rename = "as")]
        as_name: String,
    },
}

impl ImportSource {
    pub fn module(&self) -> &str {
        match self {
            ImportSource::Specifier(from) => from,
            ImportSource::Named { from, .. } => from,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ModuleResolution {
    #[serde(rename = "commonJS")]
    CommonJs {
        #[serde(rename = "rootDir", default, skip_serializing_if = "Option::is_none")]
        root_dir: Option<String>,
    },
    #[serde(rename = "haste")]
    Haste,
}

/// Options forwarded verbatim to the extractor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractorOptions {
    /// Emit readable, test-friendly class names
    #[serde(default)]
    pub test: bool,

    #[serde(default = "default_class_name_prefix")]
    pub class_name_prefix: String,

    #[serde(rename = "unstable_moduleResolution", default)]
    pub module_resolution: Option<ModuleResolution>,

    /// Convert `px` font sizes to `rem`
    #[serde(default)]
    pub use_rem_for_font_size: bool,
}

impl Default for ExtractorOptions {
    fn default() -> Self {
        Self {
            test: false,
            class_name_prefix: default_class_name_prefix(),
            module_resolution: None,
            use_rem_for_font_size: false,
        }
    }
}

/// A path alias taken from the host's resolver config (`"@"` → `"/app/src"`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostAlias {
    pub find: String,
    pub replacement: String,
}

impl HostAlias {
    pub fn new(find: impl Into<String>, replacement: impl Into<String>) -> Self {
        Self {
            find: find.into(),
            replacement: replacement.into(),
        }
    }
}

/// Ordered alias table passed to the extractor: pattern → candidate paths
pub type AliasTable = IndexMap<String, Vec<String>>;

/// Hints the host needs so library styles are compiled rather than bundled
/// as opaque dependencies.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct HostHints {
    pub ssr_no_external: Vec<String>,
    pub optimize_deps_exclude: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StylexOptions {
    #[serde(default = "default_import_sources")]
    pub import_sources: Vec<ImportSource>,

    #[serde(default)]
    pub aliases: AliasTable,

    /// Packages shipping uncompiled StyleX sources
    #[serde(default = "default_libraries")]
    pub libraries: Vec<String>,

    #[serde(rename = "useCSSLayers", default = "default_true")]
    pub use_css_layers: bool,

    /// Skip detection and force a placement variant
    #[serde(default)]
    pub framework: Option<FrameworkVariant>,

    /// Name prefix of the standalone stylesheet asset
    #[serde(default = "default_stylesheet_prefix")]
    pub stylesheet_prefix: String,

    /// Public base path used for injected `<link>` tags
    #[serde(default = "default_base")]
    pub base: String,

    #[serde(flatten)]
    pub extractor: ExtractorOptions,
}

impl Default for StylexOptions {
    fn default() -> Self {
        Self {
            import_sources: default_import_sources(),
            aliases: AliasTable::default(),
            libraries: default_libraries(),
            use_css_layers: true,
            framework: None,
            stylesheet_prefix: default_stylesheet_prefix(),
            base: default_base(),
            extractor: ExtractorOptions::default(),
        }
    }
}

impl StylexOptions {
    pub fn from_json_str(text: &str) -> Result<Self> {
        let options: Self = serde_json::from_str(text)?;
        options.validate()
    }

    pub fn from_yaml_str(text: &str) -> Result<Self> {
        let options: Self = serde_yaml::from_str(text)?;
        options.validate()
    }

    /// Load options from a `.json`, `.yaml` or `.yml` file
    pub fn from_path(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|source| StylexError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => Self::from_json_str(&text),
            Some("yaml") | Some("yml") => Self::from_yaml_str(&text),
            other => Err(StylexError::Config(format!(
                "unsupported config format {:?} for {}",
                other.unwrap_or(""),
                path.display()
            ))),
        }
    }

    fn validate(self) -> Result<Self> {
        if self.import_sources.is_empty() {
            return Err(StylexError::Config(
                "importSources must list at least one module".to_string(),
            ));
        }
        if self.stylesheet_prefix.is_empty() || self.stylesheet_prefix.contains('/') {
            return Err(StylexError::Config(format!(
                "stylesheetPrefix `{}` must be a plain file name",
                self.stylesheet_prefix
            )));
        }
        Ok(self)
    }

    /// Alias table for the extractor: host aliases first, explicit entries
    /// overriding any host entry with the same pattern.
    pub fn merged_aliases(&self, host_aliases: &[HostAlias]) -> AliasTable {
        let mut merged = AliasTable::default();
        for alias in host_aliases {
            let find = alias.find.trim_end_matches('/');
            let replacement = alias.replacement.trim_end_matches('/');
            merged.insert(format!("{find}/*"), vec![format!("{replacement}/*")]);
        }
        for (pattern, candidates) in &self.aliases {
            merged.insert(pattern.clone(), candidates.clone());
        }
        merged
    }

    pub fn host_hints(&self) -> HostHints {
        HostHints {
            ssr_no_external: self.libraries.clone(),
            optimize_deps_exclude: self.libraries.clone(),
        }
    }

    pub fn import_modules(&self) -> impl Iterator<Item = &str> {
        self.import_sources.iter().map(ImportSource::module)
    }
}

fn default_import_sources() -> Vec<ImportSource> {
    DEFAULT_IMPORT_SOURCES
        .iter()
        .map(|s| ImportSource::Specifier(s.to_string()))
        .collect()
}

fn default_libraries() -> Vec<String> {
    DEFAULT_LIBRARIES.iter().map(|s| s.to_string()).collect()
}

fn default_class_name_prefix() -> String {
    DEFAULT_CLASS_NAME_PREFIX.to_string()
}

fn default_stylesheet_prefix() -> String {
    DEFAULT_STYLESHEET_PREFIX.to_string()
}

fn default_base() -> String {
    "/".to_string()
}

fn default_true() -> bool {
    true
}
