//! Structural rewrites over token streams.
//!
//! All rewriters are pure: they clone what they keep and build fresh
//! tokens for what they change, so inputs stay shareable.

use crate::token::{paren, Bracket, Token, TokenStream};

/// Rewrite every identifier to its value `n` cycles ago.
///
/// Only `Name` tokens are rewritten (to the bare verbatim
/// `$past(name)` or `$past(name, n)`); brackets are recursed into and
/// everything else passes through, so operator structure is preserved.
pub fn past(stream: &[Token], n: usize) -> TokenStream {
    let suffix = if n == 1 {
        String::new()
    } else {
        format!(", {n}")
    };

    stream
        .iter()
        .map(|token| match token {
            Token::Name(name) => Token::Name(format!("$past({name}{suffix})")),
            Token::Bracketed(bracket) => Token::Bracketed(Bracket {
                open: bracket.open,
                close: bracket.close,
                content: past(&bracket.content, n),
            }),
            other => other.clone(),
        })
        .collect()
}

/// Deep substitution of the identifier `ident` by `replacement`,
/// recursing into brackets.
pub fn subs(stream: &[Token], ident: &str, replacement: &[Token]) -> TokenStream {
    let mut out = TokenStream::new();
    for token in stream {
        match token {
            Token::Name(name) if name == ident => out.extend(replacement.iter().cloned()),
            Token::Bracketed(bracket) => out.push(Token::Bracketed(Bracket {
                open: bracket.open,
                close: bracket.close,
                content: subs(&bracket.content, ident, replacement),
            })),
            other => out.push(other.clone()),
        }
    }
    out
}

fn is_conjunction_operator(op: &str) -> bool {
    op == "&" || op == "&&"
}

fn is_disjunction_operator(op: &str) -> bool {
    op == "|" || op == "||"
}

fn is_unary_operator(op: &str) -> bool {
    op == "~" || op == "-" || op == "`"
}

/// Whether every operator in the stream is unary.
pub fn is_unary(stream: &[Token]) -> bool {
    stream.iter().all(|token| match token {
        Token::Operator(op) => is_unary_operator(op),
        _ => true,
    })
}

/// Whether the stream is a conjunction of unary terms (and so can be
/// spliced into a larger conjunction without parentheses).
pub fn is_conjunction(stream: &[Token]) -> bool {
    stream.iter().all(|token| match token {
        Token::Operator(op) => is_unary_operator(op) || is_conjunction_operator(op),
        _ => true,
    })
}

/// Dual of [`is_conjunction`].
pub fn is_disjunction(stream: &[Token]) -> bool {
    stream.iter().all(|token| match token {
        Token::Operator(op) => is_unary_operator(op) || is_disjunction_operator(op),
        _ => true,
    })
}

fn is_blank(stream: &[Token]) -> bool {
    stream.iter().all(|token| matches!(token, Token::Whitespace))
}

fn join(
    terms: &[TokenStream],
    op: &str,
    empty: &str,
    keeps_shape: fn(&[Token]) -> bool,
) -> TokenStream {
    let terms: Vec<&TokenStream> = terms.iter().filter(|t| !is_blank(t.as_slice())).collect();
    if terms.is_empty() {
        return vec![Token::Number(empty.to_string())];
    }

    let mut out = TokenStream::new();
    for (i, term) in terms.into_iter().enumerate() {
        if i != 0 {
            out.push(Token::Whitespace);
            out.push(Token::operator(op));
            out.push(Token::Whitespace);
        }
        if keeps_shape(term) {
            out.extend(term.iter().cloned());
        } else {
            out.push(paren(term.clone()));
        }
    }
    out
}

/// Conjoin terms with ` && `, parenthesising only terms that are not
/// already conjunctions. Blank terms are dropped; no terms at all is
/// the constant `1`.
pub fn conjoin(terms: &[TokenStream]) -> TokenStream {
    join(terms, "&&", "1", is_conjunction)
}

/// Dual of [`conjoin`]: ` || ` and the constant `0`.
pub fn disjoin(terms: &[TokenStream]) -> TokenStream {
    join(terms, "||", "0", is_disjunction)
}

/// Split a homogeneous conjunction or disjunction at its binary
/// operators. Unary operators stay inside their term.
fn terms_of(stream: &[Token]) -> Vec<TokenStream> {
    let mut terms = Vec::new();
    let mut current = TokenStream::new();
    for token in stream {
        match token {
            Token::Operator(op) if !is_unary_operator(op) => {
                terms.push(std::mem::take(&mut current))
            }
            other => current.push(other.clone()),
        }
    }
    terms.push(current);
    terms
}

fn rejoin_negated(stream: &[Token], new_op: &str) -> TokenStream {
    let mut out = TokenStream::new();
    for (i, term) in terms_of(stream).iter().enumerate() {
        if i != 0 {
            out.push(Token::operator(new_op));
        }
        out.extend(negate(term));
    }
    out
}

/// Negate a term.
///
/// Pure unary terms toggle a single leading `~`; conjunctions and
/// disjunctions distribute through De Morgan; anything else is wrapped
/// once in `~( ... )`. Double negation restores the original term up
/// to syntactic normalisation.
pub fn negate(term: &[Token]) -> TokenStream {
    if is_unary(term) {
        let mut out: TokenStream = term.to_vec();
        let i = out
            .iter()
            .position(|t| !matches!(t, Token::Whitespace))
            .unwrap_or(out.len());
        if let Some(Token::Operator(op)) = out.get(i) {
            if op == "~" {
                out.remove(i);
                return out;
            }
        }
        out.insert(i, Token::operator("~"));
        out
    } else if is_conjunction(term) {
        rejoin_negated(term, "||")
    } else if is_disjunction(term) {
        rejoin_negated(term, "&&")
    } else {
        vec![Token::operator("~"), paren(term.to_vec())]
    }
}
