//! Proof command evaluation.
//!
//! Every command turns into a provable tree under the current scope.
//! Labels compose so that each generated property's final name traces
//! back to its defining directive: block/lemma/each labels prefix,
//! case and pivot labels suffix.

use girder_dsl::ast::{
    Lemma, LocalScope, ProofCommand, SequencedProofSteps, StreamRef,
};
use girder_sva::rewrite::subs;

use crate::errors::GenError;
use crate::graph::gen_common_property;
use crate::helpers::apply_helper;
use crate::provable::{Property, Provable};
use crate::scope::Scope;

/// Evaluate a sequence of slices: single-command slices splice into
/// the sequence, multi-command slices form a group sharing one step.
pub fn gen_sequence(
    seq: &SequencedProofSteps,
    scope: &mut Scope,
) -> Result<Provable, GenError> {
    scope.with_scope(seq.scope.clone(), |scope| {
        let mut out: Vec<Provable> = Vec::new();
        for slice in &seq.sequence {
            if slice.is_empty() {
                continue;
            }
            if slice.len() == 1 {
                Provable::push_seq(&mut out, gen_command(&slice[0], scope)?);
                continue;
            }
            let mut group: Vec<Provable> = Vec::new();
            for cmd in slice {
                Provable::push_group(&mut group, gen_command(cmd, scope)?);
            }
            out.push(Provable::Group(group));
        }
        Ok(Provable::Seq(out))
    })
}

/// Evaluate a lemma body. The provable is prefixed with the lemma's
/// label, falling back to its name.
pub fn gen_lemma(lemma: &Lemma, scope: &mut Scope) -> Result<Provable, GenError> {
    let mut prop = gen_sequence(&lemma.seq, scope)?;
    let prefix = if lemma.label.is_empty() {
        &lemma.name
    } else {
        &lemma.label
    };
    if !prefix.is_empty() {
        prop.prefix(prefix);
    }
    Ok(prop)
}

pub fn gen_command(cmd: &ProofCommand, scope: &mut Scope) -> Result<Provable, GenError> {
    match cmd {
        ProofCommand::Block { label, seq } => {
            let mut prop = gen_sequence(seq, scope)?;
            if !label.is_empty() {
                prop.prefix(label);
            }
            Ok(prop)
        }
        ProofCommand::Lemma { label, name } => {
            let lemma = scope
                .lemmas
                .get(name)
                .cloned()
                .ok_or_else(|| GenError::UnknownLemma { name: name.clone() })?;
            // Lemmas inherit the root tables but not the caller's
            // stack or preconditions.
            let mut fresh = scope.clone_root();
            let mut prop = gen_lemma(&lemma, &mut fresh)?;
            scope.absorb_wires(fresh);
            if !label.is_empty() {
                prop.prefix(label);
            }
            Ok(prop)
        }
        ProofCommand::Have {
            label,
            condition,
            helper,
        } => {
            let prop = Provable::Property(Property::new(label.clone(), condition.clone(), scope));
            apply_helper(helper, scope, prop)
        }
        ProofCommand::InStates { label, states, seq } => {
            let mut group: Vec<Provable> = Vec::new();
            for state in states {
                let stream = scope.resolve(state)?;
                let local = LocalScope {
                    states: Default::default(),
                    conditions: vec![stream],
                };
                let mut prop = scope.with_scope(local, |scope| gen_sequence(seq, scope))?;
                if !state.label.is_empty() {
                    prop.prefix(&state.label);
                }
                Provable::push_group(&mut group, prop);
            }
            let mut group = Provable::Group(group);
            if !label.is_empty() {
                group.prefix(label);
            }
            Ok(group)
        }
        ProofCommand::Use { name, helper } => {
            let def = scope
                .defs
                .get(name)
                .cloned()
                .ok_or_else(|| GenError::UnknownDef { name: name.clone() })?;
            let prop = gen_sequence(&def, scope)?;
            apply_helper(helper, scope, prop)
        }
        ProofCommand::Each {
            label,
            ident,
            subs: substituends,
            seq,
        } => {
            let mut group: Vec<Provable> = Vec::new();
            for sub in substituends {
                let replacement = scope.resolve(sub)?;
                let mut prop = gen_sequence(seq, scope)?;
                prop.walk_props(&mut |p| {
                    p.post_condition = subs(&p.post_condition, ident, &replacement);
                    for pre in &mut p.pre_conditions {
                        *pre = subs(pre, ident, &replacement);
                    }
                });
                let tag = if !sub.label.is_empty() {
                    sub.label.clone()
                } else if let StreamRef::State(state) = &sub.value {
                    state.clone()
                } else {
                    String::new()
                };
                if !tag.is_empty() {
                    prop.prefix(&tag);
                }
                Provable::push_group(&mut group, prop);
            }
            let mut group = Provable::Group(group);
            if !label.is_empty() {
                group.prefix(label);
            }
            Ok(group)
        }
        ProofCommand::GraphInduction { proof } => gen_common_property(proof, scope),
    }
}
