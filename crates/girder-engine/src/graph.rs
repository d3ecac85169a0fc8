//! Graph-induction obligation synthesis.
//!
//! From a user-declared state graph this produces, per run: base-case
//! obligations for the entry nodes, a step obligation per node with
//! successors, an invariant-preservation obligation per edge, and
//! (with `+rev`) a reverse-reachability obligation per node.

use girder_dsl::ast::{GraphInduction, GraphNode};
use girder_sva::rewrite::{disjoin, negate, past};
use girder_sva::{Bracket, Token, TokenStream};

use crate::errors::GenError;
use crate::helpers::apply_helper;
use crate::provable::{Property, Provable, StepOp};
use crate::scope::Scope;

/// Uppercase each `_`-separated word: `idle_wait` becomes `IdleWait`.
pub fn camel_case(s: &str) -> String {
    s.split('_')
        .filter(|part| !part.is_empty())
        .map(|part| {
            let mut chars = part.chars();
            match chars.next() {
                Some(first) => {
                    let mut out = first.to_uppercase().to_string();
                    out.extend(chars);
                    out
                }
                None => String::new(),
            }
        })
        .collect()
}

fn find_node<'a>(gi: &'a GraphInduction, name: &str) -> Result<&'a GraphNode, GenError> {
    gi.nodes.get(name).ok_or_else(|| GenError::UnknownNode {
        name: name.to_string(),
    })
}

fn invariant_of<'a>(
    gi: &'a GraphInduction,
    node_name: &str,
    node: &GraphNode,
) -> Result<&'a TokenStream, GenError> {
    gi.invariants
        .get(&node.invariant)
        .ok_or_else(|| GenError::UnknownInvariant {
            node: node_name.to_string(),
            name: node.invariant.clone(),
        })
}

/// Disjunction of the listed nodes' conditions.
fn union_node_conds(
    gi: &GraphInduction,
    scope: &Scope,
    nodes: &[String],
) -> Result<TokenStream, GenError> {
    let mut conds = Vec::new();
    for name in nodes {
        conds.push(scope.resolve(&find_node(gi, name)?.condition)?);
    }
    Ok(disjoin(&conds))
}

/// `$onehot({cond_a, cond_b, ...})` over every node condition.
fn onehot_obligation(conds: Vec<TokenStream>) -> TokenStream {
    let mut list = TokenStream::new();
    for (i, cond) in conds.into_iter().enumerate() {
        if i != 0 {
            list.push(Token::operator(","));
            list.push(Token::Whitespace);
        }
        list.extend(cond);
    }
    vec![
        Token::name("$onehot"),
        Token::Bracketed(Bracket {
            open: '(',
            close: ')',
            content: vec![Token::Bracketed(Bracket {
                open: '{',
                close: '}',
                content: list,
            })],
        }),
    ]
}

pub fn gen_common_property(
    gi: &GraphInduction,
    scope: &mut Scope,
) -> Result<Provable, GenError> {
    scope.with_scope(gi.scope.clone(), |scope| {
        let mut group: Vec<Provable> = Vec::new();

        if !gi.entry_nodes.is_empty() {
            let mut entry_group: Vec<Provable> = Vec::new();

            // The entry condition lands in one of the entry nodes.
            let mut initial = Property::new(
                "Initial",
                union_node_conds(gi, scope, &gi.entry_nodes)?,
                scope,
            );
            initial.condition(gi.entry_condition.clone());
            entry_group.push(Provable::Property(initial));

            // Whichever entry node we start in, its invariant holds.
            for name in &gi.entry_nodes {
                let node = find_node(gi, name)?;
                let mut prop = Property::new(
                    format!("Initial_{}", camel_case(name)),
                    invariant_of(gi, name, node)?.clone(),
                    scope,
                );
                prop.condition(scope.resolve(&node.condition)?);
                prop.condition(gi.entry_condition.clone());
                entry_group.push(Provable::Property(prop));
            }

            if gi.complete {
                let all: Vec<String> = gi.nodes.keys().cloned().collect();
                let prop =
                    Property::new("Complete", union_node_conds(gi, scope, &all)?, scope);
                entry_group.push(Provable::Property(prop));
            }
            if gi.onehot {
                let mut conds = Vec::new();
                for node in gi.nodes.values() {
                    conds.push(scope.resolve(&node.condition)?);
                }
                let prop = Property::new("OneHot", onehot_obligation(conds), scope);
                entry_group.push(Provable::Property(prop));
            }

            let entry = apply_helper(&gi.entry_helper, scope, Provable::Group(entry_group))?;
            Provable::push_group(&mut group, entry);
        }

        for (name, node) in &gi.nodes {
            let mut sub: Vec<Provable> = Vec::new();

            if !node.step_transitions.is_empty() {
                // One of my successors' conditions holds next cycle,
                // unless we leave the domain of the graph altogether.
                let nexts = union_node_conds(gi, scope, &node.step_transitions)?;
                let mut terms = vec![nexts];
                for pre in scope.preconditions() {
                    terms.push(negate(&pre));
                }
                let mut step = Property::new(
                    format!("{}_Step", camel_case(name)),
                    disjoin(&terms),
                    scope,
                );
                step.step = StepOp::NonOverlapped;
                step.condition(scope.resolve(&node.condition)?);
                sub.push(Provable::Property(step));

                for dst_name in &node.step_transitions {
                    let dst = find_node(gi, dst_name)?;
                    // My invariant last cycle carries the successor's
                    // invariant across the handoff.
                    let mut prop = Property::new(
                        format!("{}_{}_Inv", camel_case(name), camel_case(dst_name)),
                        invariant_of(gi, dst_name, dst)?.clone(),
                        scope,
                    );
                    prop.condition(past(&scope.resolve(&node.condition)?, 1));
                    prop.condition(scope.resolve(&dst.condition)?);
                    prop.condition(past(invariant_of(gi, name, node)?, 1));
                    sub.push(Provable::Property(prop));
                }
            }

            if gi.backward {
                // If I am active now, last cycle one of my incoming
                // nodes was active (or the chain just entered here).
                let incoming: Vec<String> = gi
                    .nodes
                    .iter()
                    .filter(|(_, other)| other.step_transitions.contains(name))
                    .map(|(other_name, _)| other_name.clone())
                    .collect();
                let mut back = past(&union_node_conds(gi, scope, &incoming)?, 1);
                if gi.entry_nodes.contains(name) {
                    back = disjoin(&[back, gi.entry_condition.clone()]);
                }
                let mut prop =
                    Property::new(format!("{}_Rev", camel_case(name)), back, scope);
                prop.condition(scope.resolve(&node.condition)?);
                sub.push(Provable::Property(prop));
            }

            let helped = apply_helper(&node.helper, scope, Provable::Group(sub))?;
            Provable::push_group(&mut group, helped);
        }

        let mut group = Provable::Group(group);
        if !gi.label.is_empty() {
            group.prefix(&gi.label);
        }
        Ok(group)
    })
}
