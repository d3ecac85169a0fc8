use miette::Diagnostic;
use thiserror::Error;

/// Fatal proof-script parse errors.
///
/// Line numbers are 1-based and refer to the first physical line of
/// the command (continuation lines fold into it).
#[derive(Debug, Error, Diagnostic)]
pub enum ParseError {
    #[error("line {line}: unexpected indent")]
    #[diagnostic(code(girder::parse::indent))]
    UnexpectedIndent { line: usize },

    #[error("line {line}: unclosed verbatim")]
    #[diagnostic(code(girder::parse::unclosed_verbatim))]
    UnclosedVerbatim { line: usize },

    #[error("line {line}: malformed verbatim")]
    #[diagnostic(code(girder::parse::verbatim))]
    Verbatim {
        line: usize,
        #[source]
        source: girder_sva::SvaError,
    },

    #[error("line {line}: expecting {expected} arguments to {operator}, found {found}")]
    #[diagnostic(code(girder::parse::arity))]
    Arity {
        operator: String,
        expected: usize,
        found: usize,
        line: usize,
    },

    #[error("line {line}: malformed argument, expecting {expected} at index {index} to {operator}")]
    #[diagnostic(code(girder::parse::argument))]
    Argument {
        operator: String,
        expected: &'static str,
        index: usize,
        line: usize,
    },

    #[error("line {line}: malformed arguments, expected trailing {expected} list to {operator}")]
    #[diagnostic(code(girder::parse::trailing))]
    Trailing {
        operator: String,
        expected: &'static str,
        line: usize,
    },

    #[error("line {line}: unknown operator `{operator}`")]
    #[diagnostic(code(girder::parse::unknown_operator))]
    UnknownOperator { operator: String, line: usize },

    #[error("line {line}: `{operator}` is not a proof helper")]
    #[diagnostic(code(girder::parse::unknown_helper))]
    UnknownHelper { operator: String, line: usize },

    #[error("line {line}: non-case command `{operator}` inside split")]
    #[diagnostic(code(girder::parse::split_case))]
    NonCaseInSplit { operator: String, line: usize },

    #[error("line {line}: expected an integer for k, found `{found}`")]
    #[diagnostic(code(girder::parse::k_value))]
    BadK { found: String, line: usize },

    #[error("line {line}: `edge` refers to unknown node `{name}`")]
    #[diagnostic(code(girder::parse::unknown_node))]
    UnknownEdgeNode { name: String, line: usize },

    #[error("duplicate {kind} `{name}`")]
    #[diagnostic(code(girder::parse::duplicate))]
    Duplicate { kind: &'static str, name: String },

    #[error("line {line}: bad top-level operator `{operator}`, expected `lemma` or `def`")]
    #[diagnostic(code(girder::parse::top_level))]
    BadTopLevel { operator: String, line: usize },
}
