//! The generation-time scope stack.

use girder_dsl::ast::{Lemma, LocalScope, SequencedProofSteps, StreamRef, VerbatimOrState};
use girder_sva::TokenStream;
use indexmap::IndexMap;

use crate::errors::GenError;

/// A named helper signal materialised as a `wire` declaration ahead of
/// the generated properties.
#[derive(Debug, Clone, PartialEq)]
pub struct Wiring {
    pub name: String,
    pub stream: TokenStream,
}

/// Root lemma/def tables plus the stack of lexical scopes. The stack
/// is strictly LIFO; [`Scope::with_scope`] pairs every push with a pop
/// on all exit paths.
#[derive(Debug, Clone, Default)]
pub struct Scope {
    pub lemmas: IndexMap<String, Lemma>,
    pub defs: IndexMap<String, SequencedProofSteps>,
    stack: Vec<LocalScope>,
    wires: Vec<Wiring>,
}

impl Scope {
    pub fn new(
        lemmas: IndexMap<String, Lemma>,
        defs: IndexMap<String, SequencedProofSteps>,
    ) -> Scope {
        Scope {
            lemmas,
            defs,
            stack: Vec::new(),
            wires: Vec::new(),
        }
    }

    /// Fresh root scope for evaluating a referenced lemma: the tables
    /// carry over, the lexical stack and its preconditions do not.
    pub fn clone_root(&self) -> Scope {
        Scope::new(self.lemmas.clone(), self.defs.clone())
    }

    pub fn push(&mut self, local: LocalScope) {
        self.stack.push(local);
    }

    pub fn pop(&mut self) {
        self.stack.pop();
    }

    /// Run `f` under `local`, popping again on every exit path.
    pub fn with_scope<T>(
        &mut self,
        local: LocalScope,
        f: impl FnOnce(&mut Scope) -> Result<T, GenError>,
    ) -> Result<T, GenError> {
        self.push(local);
        let out = f(self);
        self.pop();
        out
    }

    /// Resolve a state name, searching inner scopes first.
    pub fn get_state(&self, name: &str) -> Result<TokenStream, GenError> {
        for local in self.stack.iter().rev() {
            if let Some(stream) = local.states.get(name) {
                return Ok(stream.clone());
            }
        }
        Err(GenError::UnknownState {
            name: name.to_string(),
        })
    }

    /// All accumulated preconditions, outermost scope first.
    pub fn preconditions(&self) -> Vec<TokenStream> {
        self.stack
            .iter()
            .flat_map(|local| local.conditions.iter().cloned())
            .collect()
    }

    pub fn resolve(&self, vos: &VerbatimOrState) -> Result<TokenStream, GenError> {
        match &vos.value {
            StreamRef::Verbatim(stream) => Ok(stream.clone()),
            StreamRef::State(name) => self.get_state(name),
        }
    }

    pub fn add_wiring(&mut self, name: String, stream: TokenStream) {
        if !self.wires.iter().any(|w| w.name == name) {
            self.wires.push(Wiring { name, stream });
        }
    }

    /// Merge wires registered while evaluating a referenced lemma back
    /// into the caller.
    pub fn absorb_wires(&mut self, other: Scope) {
        for wiring in other.wires {
            self.add_wiring(wiring.name, wiring.stream);
        }
    }

    pub fn take_wires(&mut self) -> Vec<Wiring> {
        std::mem::take(&mut self.wires)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use girder_sva::tokenize;

    fn local(states: &[(&str, &str)], conditions: &[&str]) -> LocalScope {
        LocalScope {
            states: states
                .iter()
                .map(|(name, expr)| (name.to_string(), tokenize(expr).unwrap()))
                .collect(),
            conditions: conditions.iter().map(|c| tokenize(c).unwrap()).collect(),
        }
    }

    #[test]
    fn get_state_searches_inner_scopes_first() {
        let mut scope = Scope::default();
        scope.push(local(&[("s", "outer")], &[]));
        scope.push(local(&[("s", "inner")], &[]));
        assert_eq!(scope.get_state("s").unwrap(), tokenize("inner").unwrap());
        scope.pop();
        assert_eq!(scope.get_state("s").unwrap(), tokenize("outer").unwrap());
    }

    #[test]
    fn unknown_state_is_fatal() {
        let scope = Scope::default();
        assert!(matches!(
            scope.get_state("ghost"),
            Err(GenError::UnknownState { .. })
        ));
    }

    #[test]
    fn preconditions_concatenate_outer_to_inner() {
        let mut scope = Scope::default();
        scope.push(local(&[], &["a", "b"]));
        scope.push(local(&[], &["c"]));
        let pres = scope.preconditions();
        assert_eq!(pres.len(), 3);
        assert_eq!(pres[0], tokenize("a").unwrap());
        assert_eq!(pres[2], tokenize("c").unwrap());
    }

    #[test]
    fn with_scope_pops_on_the_error_path() {
        let mut scope = Scope::default();
        let result: Result<(), GenError> =
            scope.with_scope(local(&[("s", "x")], &[]), |scope| {
                assert!(scope.get_state("s").is_ok());
                Err(GenError::UnknownDef {
                    name: "boom".to_string(),
                })
            });
        assert!(result.is_err());
        assert!(scope.get_state("s").is_err());
        assert!(scope.preconditions().is_empty());
    }

    #[test]
    fn clone_root_drops_the_stack() {
        let mut scope = Scope::default();
        scope.push(local(&[("s", "x")], &["c"]));
        let fresh = scope.clone_root();
        assert!(fresh.get_state("s").is_err());
        assert!(fresh.preconditions().is_empty());
    }

    #[test]
    fn wirings_deduplicate_by_name() {
        let mut scope = Scope::default();
        scope.add_wiring("w".to_string(), tokenize("a ^ b").unwrap());
        scope.add_wiring("w".to_string(), tokenize("other").unwrap());
        let wires = scope.take_wires();
        assert_eq!(wires.len(), 1);
        assert_eq!(wires[0].stream, tokenize("a ^ b").unwrap());
    }
}
