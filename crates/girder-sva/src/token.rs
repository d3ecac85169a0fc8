//! Token model and tokeniser for embedded SystemVerilog expressions.
//!
//! Streams are values: every rewrite builds new tokens rather than
//! mutating in place, so streams can be shared freely between
//! properties.

use std::fmt;

use miette::Diagnostic;
use thiserror::Error;

/// Errors produced while tokenising an embedded expression.
#[derive(Debug, Error, Diagnostic)]
pub enum SvaError {
    #[error("unknown base in sized literal `{literal}'{base}`")]
    #[diagnostic(code(girder::sva::unknown_base))]
    UnknownBase { literal: String, base: char },

    #[error("mismatched bracket: expected `{expected}`, found `{found}`")]
    #[diagnostic(code(girder::sva::mismatched_bracket))]
    MismatchedBracket { expected: char, found: char },

    #[error("unbalanced expression: `{open}` is never closed")]
    #[diagnostic(code(girder::sva::unclosed_bracket))]
    UnclosedBracket { open: char },

    #[error("trailing input after expression: `{rest}`")]
    #[diagnostic(code(girder::sva::trailing_input))]
    TrailingInput { rest: String },
}

/// A balanced bracket pair and its inner stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bracket {
    pub open: char,
    pub close: char,
    pub content: TokenStream,
}

/// One token of an SVA-ish expression stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    /// Identifier. Rewriters also stash bare verbatims such as
    /// `$past(foo)` here, which keeps them atomic for later passes.
    Name(String),
    /// Integer literal, including sized forms such as `4'b1010`.
    Number(String),
    /// Operator, stored as written. `&` and `|` render doubled.
    Operator(String),
    /// A collapsed run of whitespace.
    Whitespace,
    /// Balanced `()`, `[]`, or `{}` with its inner stream.
    Bracketed(Bracket),
}

pub type TokenStream = Vec<Token>;

/// Multi-character operators, tried longest-first before falling back
/// to a single-character operator.
const OPERATORS: [&str; 10] = ["|->", "|=>", "&&", "&", "||", "|", "->", "~", "``", "`"];

impl Token {
    pub fn name(s: impl Into<String>) -> Token {
        Token::Name(s.into())
    }

    pub fn operator(s: impl Into<String>) -> Token {
        Token::Operator(s.into())
    }
}

/// Wrap a stream in parentheses.
pub fn paren(content: TokenStream) -> Token {
    Token::Bracketed(Bracket {
        open: '(',
        close: ')',
        content,
    })
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Name(name) => f.write_str(name),
            Token::Number(num) => f.write_str(num),
            Token::Operator(op) => match op.as_str() {
                "&" => f.write_str("&&"),
                "|" => f.write_str("||"),
                other => f.write_str(other),
            },
            Token::Whitespace => f.write_str(" "),
            Token::Bracketed(bracket) => write!(
                f,
                "{}{}{}",
                bracket.open,
                stream_to_string(&bracket.content),
                bracket.close
            ),
        }
    }
}

pub fn stream_to_string(stream: &[Token]) -> String {
    stream.iter().map(Token::to_string).collect()
}

fn is_ident_start(c: u8) -> bool {
    c.is_ascii_alphabetic() || c == b'_' || c == b'$' || c == b'`'
}

fn is_ident_step(c: u8) -> bool {
    is_ident_start(c) || c.is_ascii_digit() || c == b'.'
}

fn is_dec_step(c: u8) -> bool {
    c.is_ascii_digit() || c == b'_'
}

fn is_bin_step(c: u8) -> bool {
    c == b'0' || c == b'1' || c == b'_'
}

fn is_oct_step(c: u8) -> bool {
    (b'0'..=b'7').contains(&c) || c == b'_'
}

fn is_hex_step(c: u8) -> bool {
    c.is_ascii_hexdigit() || c == b'_'
}

/// Tokenise a complete expression. Stray closing brackets surface as
/// [`SvaError::TrailingInput`]; everything else must consume cleanly.
pub fn tokenize(input: &str) -> Result<TokenStream, SvaError> {
    let (rest, stream) = scan(input)?;
    if !rest.is_empty() {
        return Err(SvaError::TrailingInput {
            rest: rest.to_string(),
        });
    }
    Ok(stream)
}

/// Scan until end of input or an unmatched closing bracket, which is
/// left in the returned remainder for the caller to match.
fn scan(mut s: &str) -> Result<(&str, TokenStream), SvaError> {
    let mut stream = TokenStream::new();

    while let Some(&first) = s.as_bytes().first() {
        if first.is_ascii_whitespace() {
            s = s.trim_start_matches(|c: char| c.is_ascii_whitespace());
            stream.push(Token::Whitespace);
            continue;
        }

        if matches!(first, b')' | b']' | b'}') {
            break;
        }

        if let Some(idx) = [b'(', b'[', b'{'].iter().position(|&open| open == first) {
            let open = first as char;
            let close = [')', ']', '}'][idx];
            let (rest, content) = scan(&s[1..])?;
            match rest.as_bytes().first() {
                None => return Err(SvaError::UnclosedBracket { open }),
                Some(&found) if found as char != close => {
                    return Err(SvaError::MismatchedBracket {
                        expected: close,
                        found: found as char,
                    })
                }
                Some(_) => {}
            }
            s = &rest[1..];
            stream.push(Token::Bracketed(Bracket {
                open,
                close,
                content,
            }));
            continue;
        }

        if is_ident_start(first) {
            let end = s
                .bytes()
                .position(|c| !is_ident_step(c))
                .unwrap_or(s.len());
            stream.push(Token::Name(s[..end].to_string()));
            s = &s[end..];
            continue;
        }

        if first.is_ascii_digit() {
            let (rest, token) = scan_number(s)?;
            stream.push(token);
            s = rest;
            continue;
        }

        let end = OPERATORS
            .iter()
            .find(|op| s.starts_with(**op))
            .map(|op| op.len())
            .unwrap_or_else(|| {
                s.chars().next().map(char::len_utf8).unwrap_or(1)
            });
        stream.push(Token::Operator(s[..end].to_string()));
        s = &s[end..];
    }

    Ok((s, stream))
}

fn scan_number(s: &str) -> Result<(&str, Token), SvaError> {
    let bytes = s.as_bytes();
    let mut i = 1;
    while i < bytes.len() && is_dec_step(bytes[i]) {
        i += 1;
    }

    if i + 2 < bytes.len() && bytes[i] == b'\'' {
        let base = bytes[i + 1];
        let step = match base {
            b'b' => is_bin_step,
            b'o' => is_oct_step,
            b'd' => is_dec_step,
            b'h' => is_hex_step,
            _ => {
                return Err(SvaError::UnknownBase {
                    literal: s[..i].to_string(),
                    base: base as char,
                })
            }
        };
        i += 2;
        while i < bytes.len() && step(bytes[i]) {
            i += 1;
        }
    }

    Ok((&s[i..], Token::Number(s[..i].to_string())))
}
