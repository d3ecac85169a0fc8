//! The proof-document AST.
//!
//! Documents hold lemmas and reusable defs; lemma bodies are sequences
//! of slices (groups of commands separated by `/`), and commands wrap
//! proof helpers that transform the obligations a command generates.

use girder_sva::TokenStream;
use indexmap::IndexMap;

/// A literal token stream, or a state name resolved against the scope
/// stack at generation time.
#[derive(Debug, Clone, PartialEq)]
pub enum StreamRef {
    Verbatim(TokenStream),
    State(String),
}

/// A [`StreamRef`] with an optional label used as a naming affix.
#[derive(Debug, Clone, PartialEq)]
pub struct VerbatimOrState {
    pub label: String,
    pub value: StreamRef,
}

/// One lexical scope: named state streams plus the preconditions
/// accumulated by enclosing directives.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LocalScope {
    pub states: IndexMap<String, TokenStream>,
    pub conditions: Vec<TokenStream>,
}

/// Slices of proof commands, with the scope their `state`/`cond`
/// directives populated at build time.
#[derive(Debug, Clone, PartialEq)]
pub struct SequencedProofSteps {
    pub scope: LocalScope,
    pub sequence: Vec<Vec<ProofCommand>>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ProofCommand {
    Block {
        label: String,
        seq: SequencedProofSteps,
    },
    /// Reference to a lemma, evaluated under a fresh root scope.
    Lemma { label: String, name: String },
    Have {
        label: String,
        condition: TokenStream,
        helper: ProofHelper,
    },
    InStates {
        label: String,
        states: Vec<VerbatimOrState>,
        seq: SequencedProofSteps,
    },
    Use {
        name: String,
        helper: ProofHelper,
    },
    /// Macro expansion: evaluate the body once per substituend with
    /// `ident` deeply substituted in every generated stream.
    Each {
        label: String,
        ident: String,
        subs: Vec<VerbatimOrState>,
        seq: SequencedProofSteps,
    },
    GraphInduction { proof: GraphInduction },
}

#[derive(Debug, Clone, PartialEq)]
pub struct SplitCase {
    pub label: String,
    pub condition: VerbatimOrState,
    pub helper: ProofHelper,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ProofHelper {
    /// Compose helpers left-to-right. Empty is the no-op helper.
    Sequence(Vec<ProofHelper>),
    Split {
        check: bool,
        cases: Vec<SplitCase>,
    },
    SplitBool {
        pivots: Vec<VerbatimOrState>,
        helper: Box<ProofHelper>,
    },
    KInduction {
        label: String,
        k: usize,
        wire_sets: Vec<String>,
    },
    GraphInduction(Box<GraphInduction>),
}

impl ProofHelper {
    pub fn nop() -> ProofHelper {
        ProofHelper::Sequence(Vec::new())
    }
}

/// One node of a user-declared state graph. Step transitions fire on
/// the next cycle (`=>`), eps transitions in the same cycle (`->`).
#[derive(Debug, Clone, PartialEq)]
pub struct GraphNode {
    pub exit: bool,
    pub invariant: String,
    pub condition: VerbatimOrState,
    pub step_transitions: Vec<String>,
    pub eps_transitions: Vec<String>,
    pub helper: ProofHelper,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GraphInduction {
    pub label: String,
    /// Emit reverse-reachability obligations (`+rev`).
    pub backward: bool,
    /// Emit the node-condition coverage obligation (`+complete`).
    pub complete: bool,
    /// Emit the `$onehot` obligation over node conditions (`+onehot`).
    pub onehot: bool,
    pub invariants: IndexMap<String, TokenStream>,
    pub entry_condition: TokenStream,
    pub entry_nodes: Vec<String>,
    pub entry_helper: ProofHelper,
    pub nodes: IndexMap<String, GraphNode>,
    pub scope: LocalScope,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Lemma {
    pub label: String,
    pub name: String,
    pub seq: SequencedProofSteps,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProofDocument {
    pub defs: IndexMap<String, SequencedProofSteps>,
    pub lemmas: IndexMap<String, Lemma>,
}
