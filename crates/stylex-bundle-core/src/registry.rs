//! Module style registry
//!
//! Holds the rules each module contributed during the current build pass,
//! and the epoch counter that versions the registry's content.

use indexmap::IndexMap;
use rustc_hash::FxBuildHasher;
use std::fmt;

use crate::rules::{dedup_rules, RuleRecord};

/// Version of the registry's content.
///
/// Advanced exactly once per change that affects the merged stylesheet.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Epoch(u64);

impl Epoch {
    pub const ZERO: Epoch = Epoch(0);

    pub fn value(self) -> u64 {
        self.0
    }

    fn next(self) -> Epoch {
        Epoch(self.0 + 1)
    }
}

impl fmt::Display for Epoch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Default, Clone)]
pub struct StyleRegistry {
    /// module id -> rules, in first-registration order
    modules: IndexMap<String, Vec<RuleRecord>, FxBuildHasher>,
    epoch: Epoch,
}

impl StyleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn epoch(&self) -> Epoch {
        self.epoch
    }

    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }

    pub fn has_rules(&self) -> bool {
        self.modules.values().any(|rules| !rules.is_empty())
    }

    pub fn rules_for(&self, module_id: &str) -> Option<&[RuleRecord]> {
        self.modules.get(module_id).map(Vec::as_slice)
    }

    /// Drop every entry. Called at the start of each build pass.
    ///
    /// Clearing a non-empty registry changes the stylesheet, so the epoch
    /// moves; clearing an empty one is a no-op.
    pub fn reset(&mut self) {
        if self.modules.is_empty() {
            return;
        }
        self.modules.clear();
        self.epoch = self.epoch.next();
        tracing::debug!(epoch = %self.epoch, "style registry reset");
    }

    /// Replace the rules for `module_id`.
    ///
    /// Returns `true` and advances the epoch only when the rule list differs
    /// in length or rule identity from the stored one. A module with no rules
    /// and no previous entry is not recorded at all.
    pub fn set(&mut self, module_id: &str, rules: Vec<RuleRecord>) -> bool {
        let unchanged = match self.modules.get(module_id) {
            Some(previous) => {
                previous.len() == rules.len()
                    && previous
                        .iter()
                        .zip(&rules)
                        .all(|(old, new)| old.same_identity(new))
            }
            None => rules.is_empty(),
        };
        if unchanged {
            return false;
        }

        self.modules.insert(module_id.to_string(), rules);
        self.epoch = self.epoch.next();
        tracing::debug!(module_id, epoch = %self.epoch, "style rules changed");
        true
    }

    /// Forget a module entirely (for example, a file deleted during dev).
    pub fn remove(&mut self, module_id: &str) -> bool {
        if self.modules.shift_remove(module_id).is_none() {
            return false;
        }
        self.epoch = self.epoch.next();
        true
    }

    /// Every registered rule, flattened in registry order with repeated
    /// identities collapsed to their first occurrence.
    pub fn all_rules(&self) -> Vec<RuleRecord> {
        dedup_rules(self.modules.values().flatten())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rule(name: &str) -> RuleRecord {
        RuleRecord::new(name, format!(".{name}{{color:red}}"), 3000.0)
    }

    #[test]
    fn test_set_new_module_advances_epoch() {
        let mut registry = StyleRegistry::new();
        assert!(registry.set("a.tsx", vec![rule("a")]));
        assert_eq!(registry.epoch().value(), 1);
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_set_identical_rules_is_noop() {
        let mut registry = StyleRegistry::new();
        registry.set("a.tsx", vec![rule("a"), rule("b")]);
        let epoch = registry.epoch();

        assert!(!registry.set("a.tsx", vec![rule("a"), rule("b")]));
        assert_eq!(registry.epoch(), epoch);
    }

    #[test]
    fn test_set_detects_identity_and_length_changes() {
        let mut registry = StyleRegistry::new();
        registry.set("a.tsx", vec![rule("a")]);

        assert!(registry.set("a.tsx", vec![rule("b")]));
        assert!(registry.set("a.tsx", vec![rule("b"), rule("c")]));
        assert!(registry.set("a.tsx", vec![]));
        assert_eq!(registry.epoch().value(), 4);
        assert_eq!(registry.rules_for("a.tsx"), Some(&[][..]));
    }

    #[test]
    fn test_set_empty_for_unknown_module_is_noop() {
        let mut registry = StyleRegistry::new();
        assert!(!registry.set("plain.ts", vec![]));
        assert!(registry.is_empty());
        assert_eq!(registry.epoch(), Epoch::ZERO);
    }

    #[test]
    fn test_reset_clears_and_advances_only_when_non_empty() {
        let mut registry = StyleRegistry::new();
        registry.reset();
        assert_eq!(registry.epoch(), Epoch::ZERO);

        registry.set("a.tsx", vec![rule("a")]);
        registry.reset();
        assert!(registry.is_empty());
        assert_eq!(registry.epoch().value(), 2);
    }

    #[test]
    fn test_has_rules_ignores_emptied_modules() {
        let mut registry = StyleRegistry::new();
        registry.set("a.tsx", vec![rule("a")]);
        assert!(registry.has_rules());

        registry.set("a.tsx", vec![]);
        assert_eq!(registry.len(), 1);
        assert!(!registry.has_rules());
    }

    #[test]
    fn test_remove() {
        let mut registry = StyleRegistry::new();
        registry.set("a.tsx", vec![rule("a")]);

        assert!(registry.remove("a.tsx"));
        assert!(!registry.remove("a.tsx"));
        assert!(registry.all_rules().is_empty());
        assert_eq!(registry.epoch().value(), 2);
    }

    #[test]
    fn test_all_rules_flattens_in_registry_order_and_dedups() {
        let mut registry = StyleRegistry::new();
        registry.set("b.tsx", vec![rule("b"), rule("shared")]);
        registry.set("a.tsx", vec![rule("shared"), rule("a")]);

        let names: Vec<_> = registry
            .all_rules()
            .into_iter()
            .map(|r| r.class_name)
            .collect();
        assert_eq!(names, vec!["b", "shared", "a"]);
    }
}
