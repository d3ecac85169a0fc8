//! Proof helpers: transformers from provable to provable.
//!
//! A helper consumes its input; callers that still need the original
//! clone first. Case splits return `[cases-group, original]` as a
//! sequence so the cases discharge one step before the original they
//! justify.

use girder_dsl::ast::{ProofHelper, SplitCase, VerbatimOrState};
use girder_sva::rewrite::{disjoin, negate};
use girder_sva::Token;

use crate::errors::GenError;
use crate::graph::gen_common_property;
use crate::provable::{Property, Provable};
use crate::scope::Scope;

pub fn apply_helper(
    helper: &ProofHelper,
    scope: &mut Scope,
    prop: Provable,
) -> Result<Provable, GenError> {
    match helper {
        ProofHelper::Sequence(helpers) => {
            let mut prop = prop;
            for helper in helpers {
                prop = apply_helper(helper, scope, prop)?;
            }
            Ok(prop)
        }
        ProofHelper::Split { check, cases } => apply_split(*check, cases, scope, prop),
        ProofHelper::SplitBool { pivots, helper } => {
            apply_split_bool(pivots, helper, scope, prop)
        }
        ProofHelper::KInduction {
            label,
            k,
            wire_sets,
        } => apply_k_induction(label, *k, wire_sets, scope, prop),
        ProofHelper::GraphInduction(gi) => {
            let common = gen_common_property(gi, scope)?;
            Ok(Provable::Seq(vec![common, prop]))
        }
    }
}

fn apply_split(
    check: bool,
    cases: &[SplitCase],
    scope: &mut Scope,
    prop: Provable,
) -> Result<Provable, GenError> {
    let mut group: Vec<Provable> = Vec::new();

    for (i, case) in cases.iter().enumerate() {
        let mut copy = prop.clone();
        copy = apply_helper(&case.helper, scope, copy)?;
        copy.condition(&scope.resolve(&case.condition)?);
        let label = if !case.label.is_empty() {
            case.label.clone()
        } else if !case.condition.label.is_empty() {
            case.condition.label.clone()
        } else {
            format!("Case{i}")
        };
        copy.suffix(&label);
        Provable::push_group(&mut group, copy);
    }

    if check {
        // Well-formedness: the case conditions cover the state.
        let mut conditions = Vec::new();
        for case in cases {
            conditions.push(scope.resolve(&case.condition)?);
        }
        let base = prop
            .first_property()
            .map(|p| p.name.clone())
            .unwrap_or_default();
        let mut obligation = Property::new(base, disjoin(&conditions), scope);
        obligation.suffix("Check");
        group.push(Provable::Property(obligation));
    }

    Ok(Provable::Seq(vec![Provable::Group(group), prop]))
}

fn apply_split_bool(
    pivots: &[VerbatimOrState],
    inner: &ProofHelper,
    scope: &mut Scope,
    prop: Provable,
) -> Result<Provable, GenError> {
    if pivots.len() > 16 {
        return Err(GenError::TooManyPivots {
            count: pivots.len(),
        });
    }

    let mut group: Vec<Provable> = Vec::new();
    for mask in 0u32..(1u32 << pivots.len()) {
        let mut copy = prop.clone();
        for (bit, pivot) in pivots.iter().enumerate() {
            let stream = scope.resolve(pivot)?;
            let tag = pivot_tag(pivot, &stream);
            if mask & (1 << bit) != 0 {
                copy.condition(&stream);
                copy.suffix(tag.as_deref().unwrap_or("1"));
            } else {
                copy.condition(&negate(&stream));
                match tag {
                    Some(tag) => copy.suffix(&format!("Not_{tag}")),
                    None => copy.suffix("0"),
                }
            }
        }
        Provable::push_group(&mut group, copy);
    }

    apply_helper(inner, scope, Provable::Group(group))
}

/// Naming tag for a pivot: its written label, or the identifier itself
/// for lone-name pivots.
fn pivot_tag(pivot: &VerbatimOrState, stream: &[Token]) -> Option<String> {
    if !pivot.label.is_empty() {
        return Some(pivot.label.clone());
    }
    let mut names = stream.iter().filter(|t| !matches!(t, Token::Whitespace));
    match (names.next(), names.next()) {
        (Some(Token::Name(name)), None) => Some(name.clone()),
        _ => None,
    }
}

fn apply_k_induction(
    label: &str,
    k: usize,
    wire_sets: &[String],
    scope: &mut Scope,
    prop: Provable,
) -> Result<Provable, GenError> {
    for name in wire_sets {
        let stream = scope.get_state(name)?;
        scope.add_wiring(name.clone(), stream);
    }

    let mut group: Vec<Provable> = Vec::new();
    for i in 1..=k {
        let mut copy = prop.clone();
        // The lag copy's `<i>Ind_` name lands at emission time, from
        // `wait`, so it stays outermost under later prefixing.
        copy.walk_props(&mut |p| p.wait = i);
        Provable::push_group(&mut group, copy);
    }
    Provable::push_group(&mut group, prop);

    let mut group = Provable::Group(group);
    if !label.is_empty() {
        group.prefix(label);
    }
    Ok(group)
}
