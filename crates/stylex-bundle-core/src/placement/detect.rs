use serde::{Deserialize, Serialize};
use std::fmt;

/// Where the merged stylesheet ends up in the build output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FrameworkVariant {
    /// Emit a new hashed asset and link it from the HTML entry
    Standalone,
    /// Splice into the single root stylesheet the framework already emits
    SharedRoot,
    /// Splice into every per-route stylesheet carrying the placeholder
    PerChunk,
}

impl FrameworkVariant {
    /// How many CSS assets may legitimately carry the placeholder.
    pub fn max_placeholders(self) -> Option<usize> {
        match self {
            FrameworkVariant::Standalone | FrameworkVariant::SharedRoot => Some(1),
            FrameworkVariant::PerChunk => None,
        }
    }
}

impl fmt::Display for FrameworkVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FrameworkVariant::Standalone => "standalone",
            FrameworkVariant::SharedRoot => "shared-root",
            FrameworkVariant::PerChunk => "per-chunk",
        };
        f.write_str(name)
    }
}

type Predicate = Box<dyn Fn(&str) -> bool + Send + Sync>;

/// Maps an active host integration to a placement variant.
pub struct VariantDetector {
    label: String,
    variant: FrameworkVariant,
    predicate: Predicate,
}

impl VariantDetector {
    pub fn new(
        label: impl Into<String>,
        variant: FrameworkVariant,
        predicate: impl Fn(&str) -> bool + Send + Sync + 'static,
    ) -> Self {
        Self {
            label: label.into(),
            variant,
            predicate: Box::new(predicate),
        }
    }

    /// Detector matching one integration by its exact name.
    pub fn integration(name: &str, variant: FrameworkVariant) -> Self {
        let expected = name.to_string();
        Self::new(name, variant, move |integration| integration == expected)
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn variant(&self) -> FrameworkVariant {
        self.variant
    }

    pub fn matches(&self, integration: &str) -> bool {
        (self.predicate)(integration)
    }
}

impl fmt::Debug for VariantDetector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VariantDetector")
            .field("label", &self.label)
            .field("variant", &self.variant)
            .finish()
    }
}

/// Detectors for the frameworks whose CSS pipelines are known.
pub fn default_detectors() -> Vec<VariantDetector> {
    vec![
        VariantDetector::integration("remix", FrameworkVariant::SharedRoot),
        VariantDetector::integration("sveltekit", FrameworkVariant::PerChunk),
        VariantDetector::integration("qwik-city", FrameworkVariant::PerChunk),
    ]
}

/// Pick the variant for this build.
///
/// An explicit choice wins. Otherwise the first detector (in list order)
/// matching any active integration decides; with no match the stylesheet
/// is emitted standalone.
pub fn resolve_variant(
    explicit: Option<FrameworkVariant>,
    integrations: &[&str],
    detectors: &[VariantDetector],
) -> FrameworkVariant {
    if let Some(variant) = explicit {
        return variant;
    }
    detectors
        .iter()
        .find(|detector| integrations.iter().any(|name| detector.matches(name)))
        .map_or(FrameworkVariant::Standalone, |detector| {
            tracing::debug!(detector = detector.label(), variant = %detector.variant(), "placement variant detected");
            detector.variant()
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_explicit_variant_wins() {
        let variant = resolve_variant(
            Some(FrameworkVariant::PerChunk),
            &["remix"],
            &default_detectors(),
        );
        assert_eq!(variant, FrameworkVariant::PerChunk);
    }

    #[test]
    fn test_default_detectors() {
        let detectors = default_detectors();
        assert_eq!(
            resolve_variant(None, &["react", "remix"], &detectors),
            FrameworkVariant::SharedRoot
        );
        assert_eq!(
            resolve_variant(None, &["sveltekit"], &detectors),
            FrameworkVariant::PerChunk
        );
        assert_eq!(
            resolve_variant(None, &["react"], &detectors),
            FrameworkVariant::Standalone
        );
    }

    #[test]
    fn test_exact_name_match_only() {
        let detectors = default_detectors();
        assert_eq!(
            resolve_variant(None, &["remix-devtools"], &detectors),
            FrameworkVariant::Standalone
        );
    }

    #[test]
    fn test_detector_order_decides() {
        let detectors = vec![
            VariantDetector::new("any-ssr", FrameworkVariant::PerChunk, |name| {
                name.ends_with("-ssr")
            }),
            VariantDetector::integration("solid-ssr", FrameworkVariant::SharedRoot),
        ];
        assert_eq!(
            resolve_variant(None, &["solid-ssr"], &detectors),
            FrameworkVariant::PerChunk
        );
    }

    #[test]
    fn test_variant_serde_names() {
        let variant: FrameworkVariant = serde_json::from_str(r#""sharedRoot""#).unwrap();
        assert_eq!(variant, FrameworkVariant::SharedRoot);
        assert_eq!(FrameworkVariant::PerChunk.to_string(), "per-chunk");
        assert_eq!(FrameworkVariant::SharedRoot.max_placeholders(), Some(1));
        assert_eq!(FrameworkVariant::PerChunk.max_placeholders(), None);
    }
}
