//! Rule records and the stylesheet merge step
//!
//! A [`RuleRecord`] is one atomic declaration produced by the extractor. The
//! pipeline treats records as opaque apart from their identity (the class
//! name); turning a set of records into CSS text is the job of a
//! [`StylesheetMerger`].

use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::Result;

/// One atomic style rule, as emitted by the extractor.
///
/// On the wire a rule is the tuple `[className, { ltr, rtl }, priority]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "RuleWire", into = "RuleWire")]
pub struct RuleRecord {
    /// Generated class name; doubles as the rule's identity
    pub class_name: String,

    /// Rule text for left-to-right documents
    pub ltr: String,

    /// Mirrored rule text for right-to-left documents, when it differs
    pub rtl: Option<String>,

    /// Ordering weight; lower priorities are emitted first
    pub priority: f64,
}

impl RuleRecord {
    pub fn new(class_name: impl Into<String>, ltr: impl Into<String>, priority: f64) -> Self {
        Self {
            class_name: class_name.into(),
            ltr: ltr.into(),
            rtl: None,
            priority,
        }
    }

    pub fn with_rtl(mut self, rtl: impl Into<String>) -> Self {
        self.rtl = Some(rtl.into());
        self
    }

    /// Two records are the same rule when their class names match.
    pub fn same_identity(&self, other: &RuleRecord) -> bool {
        self.class_name == other.class_name
    }
}

#[derive(Serialize, Deserialize)]
struct RuleText {
    ltr: String,
    #[serde(default)]
    rtl: Option<String>,
}

#[derive(Serialize, Deserialize)]
struct RuleWire(String, RuleText, f64);

impl From<RuleWire> for RuleRecord {
    fn from(RuleWire(class_name, text, priority): RuleWire) -> Self {
        Self {
            class_name,
            ltr: text.ltr,
            rtl: text.rtl,
            priority,
        }
    }
}

impl From<RuleRecord> for RuleWire {
    fn from(rule: RuleRecord) -> Self {
        RuleWire(
            rule.class_name,
            RuleText {
                ltr: rule.ltr,
                rtl: rule.rtl,
            },
            rule.priority,
        )
    }
}

/// Collapse repeated rule identities, keeping the first occurrence.
pub fn dedup_rules<'a>(rules: impl IntoIterator<Item = &'a RuleRecord>) -> Vec<RuleRecord> {
    let mut seen = FxHashSet::default();
    rules
        .into_iter()
        .filter(|rule| seen.insert(rule.class_name.as_str()))
        .cloned()
        .collect()
}

/// Turns the registry's rules into one stylesheet.
///
/// Implementations may be expensive; the versioned compiler guarantees they
/// run at most once per registry epoch.
pub trait StylesheetMerger: Send + Sync {
    fn merge(&self, rules: &[RuleRecord], use_layers: bool) -> Result<String>;
}

/// Orders rules by priority and optionally groups them into `@layer` blocks.
///
/// This is a reference merger, not an optimizer: rule text is emitted
/// verbatim, `rtl` text directly after its `ltr` counterpart.
#[derive(Debug, Default, Clone, Copy)]
pub struct PriorityMerger;

impl PriorityMerger {
    /// Priorities are bucketed per thousand, mirroring the extractor's
    /// priority bands (at-rules, pseudo-classes and so on).
    fn layer_index(priority: f64) -> i64 {
        (priority / 1000.0).floor() as i64
    }

    fn push_rule(out: &mut String, rule: &RuleRecord) {
        out.push_str(&rule.ltr);
        out.push('\n');
        if let Some(rtl) = &rule.rtl {
            out.push_str(rtl);
            out.push('\n');
        }
    }
}

impl StylesheetMerger for PriorityMerger {
    fn merge(&self, rules: &[RuleRecord], use_layers: bool) -> Result<String> {
        let mut ordered: Vec<&RuleRecord> = rules.iter().collect();
        ordered.sort_by(|a, b| a.priority.total_cmp(&b.priority));

        let mut out = String::new();
        if !use_layers {
            for rule in ordered {
                Self::push_rule(&mut out, rule);
            }
            return Ok(out);
        }

        let mut layers: BTreeMap<i64, Vec<&RuleRecord>> = BTreeMap::new();
        for rule in ordered {
            layers
                .entry(Self::layer_index(rule.priority))
                .or_default()
                .push(rule);
        }

        let names: Vec<String> = (1..=layers.len()).map(|n| format!("priority{n}")).collect();
        if names.is_empty() {
            return Ok(out);
        }
        out.push_str(&format!("@layer {};\n", names.join(", ")));
        for (name, rules) in names.iter().zip(layers.values()) {
            out.push_str(&format!("@layer {name}{{\n"));
            for rule in rules {
                Self::push_rule(&mut out, rule);
            }
            out.push_str("}\n");
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rule_deserializes_from_wire_tuple() {
        let json = r#"["x1e2nbdu", {"ltr": ".x1e2nbdu{color:red}", "rtl": null}, 3000]"#;
        let rule: RuleRecord = serde_json::from_str(json).unwrap();

        assert_eq!(rule.class_name, "x1e2nbdu");
        assert_eq!(rule.ltr, ".x1e2nbdu{color:red}");
        assert_eq!(rule.rtl, None);
        assert_eq!(rule.priority, 3000.0);
    }

    #[test]
    fn test_rule_serializes_to_wire_tuple() {
        let rule = RuleRecord::new("xa", ".xa{margin-left:1px}", 4000.0)
            .with_rtl(".xa{margin-right:1px}");
        let json = serde_json::to_string(&rule).unwrap();

        assert_eq!(
            json,
            r#"["xa",{"ltr":".xa{margin-left:1px}","rtl":".xa{margin-right:1px}"},4000.0]"#
        );
    }

    #[test]
    fn test_dedup_keeps_first_occurrence() {
        let rules = [
            RuleRecord::new("a", ".a{color:red}", 1.0),
            RuleRecord::new("b", ".b{color:blue}", 1.0),
            RuleRecord::new("a", ".a{color:red}", 1.0),
        ];

        let deduped = dedup_rules(&rules);
        let names: Vec<_> = deduped.iter().map(|r| r.class_name.as_str()).collect();
        assert_eq!(names, vec!["a", "b"]);
    }

    #[test]
    fn test_merge_without_layers_orders_by_priority() {
        let rules = [
            RuleRecord::new("hover", ".hover:hover{color:red}", 3130.0),
            RuleRecord::new("base", ".base{color:blue}", 3000.0),
        ];

        let css = PriorityMerger.merge(&rules, false).unwrap();
        assert_eq!(css, ".base{color:blue}\n.hover:hover{color:red}\n");
    }

    #[test]
    fn test_merge_with_layers_groups_by_band() {
        let rules = [
            RuleRecord::new("a", ".a{margin:0}", 1000.0),
            RuleRecord::new("b", ".b{color:red}", 3000.0),
            RuleRecord::new("c", ".c{color:blue}", 3100.0),
        ];

        let css = PriorityMerger.merge(&rules, true).unwrap();
        insta::assert_snapshot!(css, @r"
        @layer priority1, priority2;
        @layer priority1{
        .a{margin:0}
        }
        @layer priority2{
        .b{color:red}
        .c{color:blue}
        }
        ");
    }

    #[test]
    fn test_merge_emits_rtl_after_ltr() {
        let rules = [RuleRecord::new("m", ".m{margin-left:4px}", 4000.0)
            .with_rtl(".m{margin-right:4px}")];

        let css = PriorityMerger.merge(&rules, false).unwrap();
        assert_eq!(css, ".m{margin-left:4px}\n.m{margin-right:4px}\n");
    }

    #[test]
    fn test_merge_empty_rules_is_empty() {
        assert_eq!(PriorityMerger.merge(&[], true).unwrap(), "");
    }
}
