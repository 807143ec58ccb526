//! Deterministic structural editing of cut lists.

use crate::cut::{CompositeCut, Cut};
use crate::error::Result;

/// How a removal criterion matches a cut's tag.
///
/// Exact matching is the default expectation; substring matching is an
/// explicit opt-in, since a substring criterion may unintentionally match
/// future unrelated cuts sharing that substring.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TagMatcher {
    Exact(String),
    Contains(String),
}

impl TagMatcher {
    /// Exact-tag criterion.
    pub fn exact(tag: impl Into<String>) -> Self {
        TagMatcher::Exact(tag.into())
    }

    /// Substring criterion.
    pub fn contains(fragment: impl Into<String>) -> Self {
        TagMatcher::Contains(fragment.into())
    }

    /// Whether a tag satisfies the criterion.
    pub fn matches(&self, tag: &str) -> bool {
        match self {
            TagMatcher::Exact(t) => tag == t,
            TagMatcher::Contains(fragment) => tag.contains(fragment),
        }
    }
}

/// Builds a named selection by editing a snapshot of a base cut list.
///
/// Edits are recorded and applied at [`SelectionBuilder::build`] time in a
/// fixed order: substitutions, then appends, then removals. The base list
/// is owned by the builder (a snapshot, never a shared reference), so a
/// derived selection can never mutate its parent's children.
pub struct SelectionBuilder {
    name: String,
    version: u32,
    base: Vec<Box<dyn Cut>>,
    substitutions: Vec<(String, Box<dyn Cut>)>,
    appended: Vec<Box<dyn Cut>>,
    removals: Vec<TagMatcher>,
}

impl SelectionBuilder {
    /// Start a selection from a base child list.
    pub fn from_base(name: impl Into<String>, version: u32, base: Vec<Box<dyn Cut>>) -> Self {
        Self {
            name: name.into(),
            version,
            base,
            substitutions: Vec::new(),
            appended: Vec::new(),
            removals: Vec::new(),
        }
    }

    /// Start a selection from an existing composite's children.
    pub fn from_selection(name: impl Into<String>, version: u32, parent: CompositeCut) -> Self {
        Self::from_base(name, version, parent.into_children())
    }

    /// Replace the entry whose tag equals `tag`, in place, with
    /// `replacement`. Silent no-op if no entry matches; some base lists do
    /// not contain every optional cut.
    pub fn substitute(mut self, tag: impl Into<String>, replacement: Box<dyn Cut>) -> Self {
        self.substitutions.push((tag.into(), replacement));
        self
    }

    /// Append cuts to the end of the list, preserving their relative order.
    pub fn append(mut self, cuts: Vec<Box<dyn Cut>>) -> Self {
        self.appended.extend(cuts);
        self
    }

    /// Remove every entry whose tag satisfies the matcher. Operates on the
    /// list as already substituted and extended.
    pub fn remove(mut self, matcher: TagMatcher) -> Self {
        self.removals.push(matcher);
        self
    }

    /// Apply the recorded edits and wrap the result as a new named
    /// composite. Fails if the final list is empty.
    pub fn build(self) -> Result<CompositeCut> {
        let mut children = self.base;

        for (tag, replacement) in self.substitutions {
            if let Some(position) = children.iter().position(|c| c.tag() == tag) {
                children[position] = replacement;
            }
        }

        children.extend(self.appended);

        for matcher in &self.removals {
            children.retain(|c| !matcher.matches(c.tag()));
        }

        CompositeCut::new(self.name, self.version, children)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cut::IntervalCut;
    use crate::error::CutflowError;

    fn named(tag: &str) -> Box<dyn Cut> {
        Box::new(IntervalCut::new(tag, 0, "x", 0.0, 1.0))
    }

    fn base() -> Vec<Box<dyn Cut>> {
        vec![named("A"), named("B"), named("C")]
    }

    #[test]
    fn substitute_extend_filter_in_fixed_order() {
        let selection = SelectionBuilder::from_base("Derived", 1, base())
            .substitute("B", named("B2"))
            .append(vec![named("D")])
            .remove(TagMatcher::contains("C"))
            .build()
            .unwrap();
        assert_eq!(selection.child_tags(), vec!["A", "B2", "D"]);
    }

    #[test]
    fn substitute_missing_tag_is_a_no_op() {
        let selection = SelectionBuilder::from_base("Derived", 1, base())
            .substitute("Nope", named("X"))
            .build()
            .unwrap();
        assert_eq!(selection.child_tags(), vec!["A", "B", "C"]);
    }

    #[test]
    fn substitute_preserves_position() {
        let selection = SelectionBuilder::from_base("Derived", 1, base())
            .substitute("A", named("A2"))
            .build()
            .unwrap();
        assert_eq!(selection.child_tags(), vec!["A2", "B", "C"]);
    }

    #[test]
    fn removal_applies_to_appended_entries_too() {
        let selection = SelectionBuilder::from_base("Derived", 1, base())
            .append(vec![named("CX")])
            .remove(TagMatcher::contains("C"))
            .build()
            .unwrap();
        assert_eq!(selection.child_tags(), vec!["A", "B"]);
    }

    #[test]
    fn exact_matcher_does_not_match_substrings() {
        let selection = SelectionBuilder::from_base("Derived", 1, base())
            .append(vec![named("CX")])
            .remove(TagMatcher::exact("C"))
            .build()
            .unwrap();
        assert_eq!(selection.child_tags(), vec!["A", "B", "CX"]);
    }

    #[test]
    fn removing_everything_is_a_configuration_error() {
        let err = SelectionBuilder::from_base("Derived", 1, base())
            .remove(TagMatcher::contains(""))
            .build()
            .unwrap_err();
        assert!(matches!(err, CutflowError::Configuration(_)));
    }

    #[test]
    fn building_twice_from_fresh_snapshots_is_identical() {
        let build = || {
            SelectionBuilder::from_base("Derived", 1, base())
                .substitute("B", named("B2"))
                .append(vec![named("D")])
                .build()
                .unwrap()
        };
        assert_eq!(build().child_tags(), build().child_tags());
    }
}
