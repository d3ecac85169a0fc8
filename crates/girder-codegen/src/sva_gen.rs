//! SystemVerilog rendering.

use girder_engine::{FlatProofSequence, Property, Wiring};
use girder_sva::format_stream;
use girder_sva::rewrite::conjoin;
use girder_sva::{paren, Bracket, Token, TokenStream};

/// Rendering options shared by the emitters.
#[derive(Debug, Clone)]
pub struct EmitOptions {
    /// Step emitted as the assertion slice. Steps below it become
    /// assumptions and steps above it are omitted; -1 emits every
    /// step as assertions.
    pub slice: isize,
    /// Target line width for the pretty-printer.
    pub line_width: usize,
    /// Prefix each property with
    /// `@(posedge clk_i) disable iff (~rst_ni)`.
    pub clocking: bool,
}

impl Default for EmitOptions {
    fn default() -> EmitOptions {
        EmitOptions {
            slice: -1,
            line_width: 100,
            clocking: false,
        }
    }
}

fn clocking_prefix() -> TokenStream {
    vec![
        Token::operator("@"),
        Token::Bracketed(Bracket {
            open: '(',
            close: ')',
            content: vec![
                Token::name("posedge"),
                Token::Whitespace,
                Token::name("clk_i"),
            ],
        }),
        Token::Whitespace,
        Token::name("disable"),
        Token::Whitespace,
        Token::name("iff"),
        Token::Whitespace,
        Token::Bracketed(Bracket {
            open: '(',
            close: ')',
            content: vec![Token::operator("~"), Token::name("rst_ni")],
        }),
        Token::Whitespace,
    ]
}

/// Render one property as `name: assume|assert property ( ... );`.
pub fn property_to_sva(prop: &Property, assume: bool, opts: &EmitOptions) -> String {
    let keyword = if assume { "assume" } else { "assert" };
    let lead = format!("{}: {keyword} property ", prop.name);

    let mut inner = TokenStream::new();
    if opts.clocking {
        inner.extend(clocking_prefix());
    }
    if prop.wait != 0 {
        inner.push(Token::operator(format!("##{}", prop.wait)));
        inner.push(Token::Whitespace);
    }
    if !prop.pre_conditions.is_empty() {
        inner.extend(conjoin(&prop.pre_conditions));
        inner.push(Token::Whitespace);
        inner.push(Token::operator(prop.step.as_str()));
        inner.push(Token::Whitespace);
    }
    inner.extend(prop.post_condition.iter().cloned());

    format_stream(
        &[Token::Name(lead), paren(inner), Token::operator(";")],
        opts.line_width,
    )
}

fn wiring_to_sva(wiring: &Wiring, line_width: usize) -> String {
    let mut stream = vec![
        Token::Name(format!("wire {} = ", wiring.name)),
    ];
    stream.extend(wiring.stream.iter().cloned());
    stream.push(Token::operator(";"));
    format_stream(&stream, line_width)
}

/// Render the whole sequence, one `` `ifndef REMOVE_SLICE_<i> ``
/// guard per step. No module wrapper: the file is meant for a bind
/// unit.
pub fn flat_to_sva(seq: &FlatProofSequence, opts: &EmitOptions) -> String {
    let mut out = String::new();

    for wiring in &seq.wires {
        out.push_str(&wiring_to_sva(wiring, opts.line_width));
        out.push('\n');
    }
    if !seq.wires.is_empty() {
        out.push('\n');
    }

    for (i, step) in seq.props.iter().enumerate() {
        if opts.slice != -1 && i as isize > opts.slice {
            break;
        }
        out.push_str(&format!("`ifndef REMOVE_SLICE_{i}\n"));
        for prop in step {
            let assume = opts.slice != -1 && i as isize != opts.slice;
            out.push_str(&property_to_sva(prop, assume, opts));
            out.push('\n');
        }
        out.push_str("`endif\n\n");
    }

    out
}
