use miette::Diagnostic;
use thiserror::Error;

/// Fatal generation errors: failed lookups and shape violations.
#[derive(Debug, Error, Diagnostic)]
pub enum GenError {
    #[error("could not find state `{name}`")]
    #[diagnostic(code(girder::gen::unknown_state))]
    UnknownState { name: String },

    #[error("lemma does not exist: `{name}`")]
    #[diagnostic(code(girder::gen::unknown_lemma))]
    UnknownLemma { name: String },

    #[error("undefined def `{name}`")]
    #[diagnostic(code(girder::gen::unknown_def))]
    UnknownDef { name: String },

    #[error("graph induction refers to unknown node `{name}`")]
    #[diagnostic(code(girder::gen::unknown_node))]
    UnknownNode { name: String },

    #[error("node `{node}` refers to unknown invariant `{name}`")]
    #[diagnostic(code(girder::gen::unknown_invariant))]
    UnknownInvariant { node: String, name: String },

    #[error("too many pivots in split_bool: {count} (limit 16)")]
    #[diagnostic(code(girder::gen::too_many_pivots))]
    TooManyPivots { count: usize },
}
