//! SVA-ish expression plumbing for girder.
//!
//! Proof scripts embed SystemVerilog expressions verbatim. This crate
//! tokenises them into bracket-nested streams, rewrites them
//! (`$past` shifting, negation, conjunction/disjunction joining,
//! identifier substitution), and renders them back out under a
//! line-width budget with a priority-driven line breaker.

pub mod format;
pub mod rewrite;
pub mod token;

pub use format::format_stream;
pub use token::{paren, stream_to_string, tokenize, Bracket, SvaError, Token, TokenStream};
