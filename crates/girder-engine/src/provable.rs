//! Provable trees and the flat proof sequence.
//!
//! Commands and helpers build trees of properties; flattening projects
//! a tree onto numbered steps. Groups keep their children on one step,
//! sequences stack children onto successive steps.

use girder_sva::{stream_to_string, TokenStream};

use crate::scope::{Scope, Wiring};

/// Antecedent-to-consequent operator of a rendered property.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StepOp {
    /// `|->`: consequent in the same cycle.
    #[default]
    Overlapped,
    /// `|=>`: consequent one cycle later.
    NonOverlapped,
}

impl StepOp {
    pub fn as_str(self) -> &'static str {
        match self {
            StepOp::Overlapped => "|->",
            StepOp::NonOverlapped => "|=>",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Property {
    pub name: String,
    pub pre_conditions: Vec<TokenStream>,
    pub post_condition: TokenStream,
    pub step: StepOp,
    /// Cycle-delay prefix (`##wait`) set by k-induction lag copies.
    pub wait: usize,
}

impl Property {
    /// A property whose preconditions snapshot the scope's accumulated
    /// conditions at generation time.
    pub fn new(name: impl Into<String>, post_condition: TokenStream, scope: &Scope) -> Property {
        Property {
            name: name.into(),
            pre_conditions: scope.preconditions(),
            post_condition,
            step: StepOp::Overlapped,
            wait: 0,
        }
    }

    pub fn prefix(&mut self, prefix: &str) {
        if self.name.is_empty() {
            self.name = prefix.to_string();
        } else {
            self.name = format!("{prefix}_{}", self.name);
        }
    }

    pub fn suffix(&mut self, suffix: &str) {
        if self.name.is_empty() {
            self.name = suffix.to_string();
        } else {
            self.name = format!("{}_{suffix}", self.name);
        }
    }

    /// Add a precondition unless a structurally equal one is present.
    pub fn condition(&mut self, cond: TokenStream) {
        if !self.pre_conditions.contains(&cond) {
            self.pre_conditions.push(cond);
        }
    }
}

/// A single property, an unordered group, or an ordered sequence.
/// `Clone` is the deep copy used whenever a helper duplicates its
/// input; clones share nothing mutable with the original.
#[derive(Debug, Clone, PartialEq)]
pub enum Provable {
    Property(Property),
    Group(Vec<Provable>),
    Seq(Vec<Provable>),
}

impl Provable {
    /// Append to a group's children, splicing nested groups.
    pub fn push_group(items: &mut Vec<Provable>, prop: Provable) {
        match prop {
            Provable::Group(children) => items.extend(children),
            other => items.push(other),
        }
    }

    /// Append to a sequence's children, splicing nested sequences.
    pub fn push_seq(items: &mut Vec<Provable>, prop: Provable) {
        match prop {
            Provable::Seq(children) => items.extend(children),
            other => items.push(other),
        }
    }

    /// Visit every contained property once, in containment order.
    pub fn walk_props(&mut self, f: &mut impl FnMut(&mut Property)) {
        match self {
            Provable::Property(prop) => f(prop),
            Provable::Group(items) | Provable::Seq(items) => {
                for item in items {
                    item.walk_props(f);
                }
            }
        }
    }

    pub fn first_property(&self) -> Option<&Property> {
        match self {
            Provable::Property(prop) => Some(prop),
            Provable::Group(items) | Provable::Seq(items) => {
                items.iter().find_map(Provable::first_property)
            }
        }
    }

    pub fn prefix(&mut self, prefix: &str) {
        self.walk_props(&mut |prop| prop.prefix(prefix));
    }

    pub fn suffix(&mut self, suffix: &str) {
        self.walk_props(&mut |prop| prop.suffix(suffix));
    }

    pub fn condition(&mut self, cond: &TokenStream) {
        self.walk_props(&mut |prop| prop.condition(cond.clone()));
    }

    /// Project the tree onto the flat sequence starting at `step`;
    /// returns the last step used.
    pub fn flatten_into(self, seq: &mut FlatProofSequence, step: usize) -> usize {
        match self {
            Provable::Property(prop) => {
                seq.add_to(step, prop);
                step
            }
            Provable::Group(items) => {
                let mut max = step;
                for item in items {
                    max = max.max(item.flatten_into(seq, step));
                }
                max
            }
            Provable::Seq(items) => {
                let mut next = step;
                for item in items {
                    next = item.flatten_into(seq, next) + 1;
                }
                next.saturating_sub(1)
            }
        }
    }
}

/// The flattened, step-indexed proof sequence handed to the emitters.
#[derive(Debug, Clone, Default)]
pub struct FlatProofSequence {
    pub props: Vec<Vec<Property>>,
    pub wires: Vec<Wiring>,
}

impl FlatProofSequence {
    pub fn add_to(&mut self, step: usize, prop: Property) {
        while self.props.len() <= step {
            self.props.push(Vec::new());
        }
        self.props[step].push(prop);
    }

    /// Name k-induction lag copies from their `wait`, then make all
    /// names non-empty and pairwise distinct. Renames are warnings,
    /// not errors; one counter feeds both kinds.
    pub fn check_names(&mut self) {
        let mut names: Vec<String> = Vec::new();
        let mut renamed = 0usize;
        for group in &mut self.props {
            for prop in group {
                if prop.wait > 0 && !prop.name.is_empty() {
                    prop.name = format!("{}Ind_{}", prop.wait, prop.name);
                }
                if prop.name.is_empty() {
                    renamed += 1;
                    tracing::warn!(
                        "unnamed property with post condition {}, giving it name Unnamed_{}",
                        stream_to_string(&prop.post_condition),
                        renamed
                    );
                    prop.name = format!("Unnamed_{renamed}");
                } else if names.contains(&prop.name) {
                    renamed += 1;
                    tracing::warn!(
                        "multiple properties with name {}, renaming to {}_{}",
                        prop.name,
                        prop.name,
                        renamed
                    );
                    prop.name = format!("{}_{renamed}", prop.name);
                }
                names.push(prop.name.clone());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use girder_sva::tokenize;

    fn prop(name: &str, post: &str) -> Provable {
        Provable::Property(Property {
            name: name.to_string(),
            pre_conditions: Vec::new(),
            post_condition: tokenize(post).unwrap(),
            step: StepOp::Overlapped,
            wait: 0,
        })
    }

    fn flat_names(provable: Provable) -> Vec<Vec<String>> {
        let mut seq = FlatProofSequence::default();
        provable.flatten_into(&mut seq, 0);
        seq.props
            .iter()
            .map(|step| step.iter().map(|p| p.name.clone()).collect())
            .collect()
    }

    #[test]
    fn group_children_share_a_step() {
        let tree = Provable::Group(vec![prop("a", "x"), prop("b", "y")]);
        assert_eq!(flat_names(tree), vec![vec!["a", "b"]]);
    }

    #[test]
    fn sequence_children_stack_steps() {
        let tree = Provable::Seq(vec![prop("a", "x"), prop("b", "y")]);
        assert_eq!(flat_names(tree), vec![vec!["a"], vec!["b"]]);
    }

    #[test]
    fn nested_sequence_inside_group_advances_the_group() {
        let tree = Provable::Group(vec![
            Provable::Seq(vec![prop("a", "x"), prop("b", "y")]),
            prop("c", "z"),
        ]);
        // The group returns the max step of its children.
        let mut seq = FlatProofSequence::default();
        let last = tree.flatten_into(&mut seq, 0);
        assert_eq!(last, 1);
        assert_eq!(seq.props[0].len(), 2);
        assert_eq!(seq.props[1].len(), 1);
    }

    #[test]
    fn clone_then_flatten_matches_flatten() {
        let tree = Provable::Seq(vec![
            Provable::Group(vec![prop("a", "x"), prop("b", "y")]),
            prop("c", "z"),
        ]);
        assert_eq!(flat_names(tree.clone()), flat_names(tree));
    }

    #[test]
    fn clones_do_not_alias_preconditions() {
        let mut original = prop("a", "x");
        let mut copy = original.clone();
        copy.condition(&tokenize("q").unwrap());
        original.walk_props(&mut |p| assert!(p.pre_conditions.is_empty()));
    }

    #[test]
    fn prefix_and_suffix_compose_names() {
        let mut tree = prop("H", "x");
        tree.prefix("L");
        tree.suffix("Case0");
        assert_eq!(tree.first_property().unwrap().name, "L_H_Case0");
    }

    #[test]
    fn prefix_of_unnamed_property_is_the_prefix_itself() {
        let mut tree = prop("", "x");
        tree.prefix("L");
        assert_eq!(tree.first_property().unwrap().name, "L");
    }

    #[test]
    fn condition_deduplicates_structurally() {
        let mut tree = prop("H", "x");
        tree.condition(&tokenize("a && b").unwrap());
        tree.condition(&tokenize("a && b").unwrap());
        tree.condition(&tokenize("c").unwrap());
        assert_eq!(tree.first_property().unwrap().pre_conditions.len(), 2);
    }

    #[test]
    fn check_names_renames_unnamed_and_duplicates() {
        let mut seq = FlatProofSequence::default();
        let unnamed = Property {
            name: String::new(),
            pre_conditions: Vec::new(),
            post_condition: tokenize("x").unwrap(),
            step: StepOp::Overlapped,
            wait: 0,
        };
        seq.add_to(0, unnamed.clone());
        let mut named = unnamed.clone();
        named.name = "p".to_string();
        seq.add_to(0, named.clone());
        seq.add_to(1, named);
        seq.check_names();

        let names: Vec<&str> = seq
            .props
            .iter()
            .flatten()
            .map(|p| p.name.as_str())
            .collect();
        assert_eq!(names, vec!["Unnamed_1", "p", "p_2"]);
    }

    #[test]
    fn check_names_decorates_lag_copies() {
        let mut seq = FlatProofSequence::default();
        let mut lag = Property {
            name: "L_H".to_string(),
            pre_conditions: Vec::new(),
            post_condition: tokenize("x").unwrap(),
            step: StepOp::Overlapped,
            wait: 2,
        };
        seq.add_to(0, lag.clone());
        lag.wait = 0;
        seq.add_to(0, lag);
        seq.check_names();
        let names: Vec<&str> = seq
            .props
            .iter()
            .flatten()
            .map(|p| p.name.as_str())
            .collect();
        assert_eq!(names, vec!["2Ind_L_H", "L_H"]);
    }
}
