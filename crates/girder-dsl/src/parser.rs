//! Indent-aware script parsing.
//!
//! A line's depth is its leading-space count. The first child of a
//! parent line fixes the nested depth; every sibling must match it
//! exactly, and a shallower line ends the block. Each logical line is
//! one command: `[label:] operator [args] [+flags] [-> | => words]`.
//! A trailing `\` joins the next line; a trailing `:` joins it too
//! (label-only continuation lines) unless the next line opens a nested
//! block, in which case the colon is header sugar and is dropped.

use girder_sva::{tokenize, TokenStream};
use indexmap::IndexMap;

use crate::ast::*;
use crate::errors::ParseError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TrailingMode {
    #[default]
    None,
    /// `->`: same-cycle word list.
    Now,
    /// `=>`: next-cycle word list.
    Step,
}

#[derive(Debug, Clone, PartialEq)]
pub enum CommandArg {
    Word { label: String, word: String },
    Verbatim { label: String, stream: TokenStream },
}

impl CommandArg {
    pub fn to_verbatim_or_state(&self) -> VerbatimOrState {
        match self {
            CommandArg::Word { label, word } => VerbatimOrState {
                label: label.clone(),
                value: StreamRef::State(word.clone()),
            },
            CommandArg::Verbatim { label, stream } => VerbatimOrState {
                label: label.clone(),
                value: StreamRef::Verbatim(stream.clone()),
            },
        }
    }
}

/// One parsed command line.
#[derive(Debug, Clone, PartialEq)]
pub struct Command {
    pub line: usize,
    pub label: String,
    pub operator: String,
    pub flags: Vec<String>,
    pub args: Vec<CommandArg>,
    pub trailing_mode: TrailingMode,
    pub trailing: String,
}

impl Command {
    pub fn has_flag(&self, flag: &str) -> bool {
        self.flags.iter().any(|f| f == flag)
    }

    fn arg(&self, i: usize) -> Result<&CommandArg, ParseError> {
        self.args.get(i).ok_or_else(|| ParseError::Arity {
            operator: self.operator.clone(),
            expected: i + 1,
            found: self.args.len(),
            line: self.line,
        })
    }

    pub fn word_arg(&self, i: usize) -> Result<&str, ParseError> {
        match self.arg(i)? {
            CommandArg::Word { word, .. } => Ok(word),
            CommandArg::Verbatim { .. } => Err(ParseError::Argument {
                operator: self.operator.clone(),
                expected: "word",
                index: i,
                line: self.line,
            }),
        }
    }

    pub fn verbatim_arg(&self, i: usize) -> Result<TokenStream, ParseError> {
        match self.arg(i)? {
            CommandArg::Verbatim { stream, .. } => Ok(stream.clone()),
            CommandArg::Word { .. } => Err(ParseError::Argument {
                operator: self.operator.clone(),
                expected: "verbatim",
                index: i,
                line: self.line,
            }),
        }
    }

    pub fn verbatim_or_state_arg(&self, i: usize) -> Result<VerbatimOrState, ParseError> {
        Ok(self.arg(i)?.to_verbatim_or_state())
    }

    pub fn fix_args(&self, n: usize) -> Result<(), ParseError> {
        if self.args.len() != n {
            return Err(ParseError::Arity {
                operator: self.operator.clone(),
                expected: n,
                found: self.args.len(),
                line: self.line,
            });
        }
        Ok(())
    }

    pub fn now_words(&self) -> Result<Vec<String>, ParseError> {
        self.trailing_words(TrailingMode::Now, "now")
    }

    pub fn step_words(&self) -> Result<Vec<String>, ParseError> {
        self.trailing_words(TrailingMode::Step, "step")
    }

    fn trailing_words(
        &self,
        mode: TrailingMode,
        expected: &'static str,
    ) -> Result<Vec<String>, ParseError> {
        if self.trailing_mode == TrailingMode::None {
            return Ok(Vec::new());
        }
        if self.trailing_mode != mode {
            return Err(ParseError::Trailing {
                operator: self.operator.clone(),
                expected,
                line: self.line,
            });
        }
        Ok(self
            .trailing
            .split_whitespace()
            .map(str::to_string)
            .collect())
    }
}

/// A command and its nested body.
#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    pub first: Command,
    pub body: Vec<Block>,
}

struct RawLine<'a> {
    number: usize,
    text: &'a str,
}

fn strip_comment(line: &str) -> &str {
    match line.find("# ") {
        Some(i) => &line[..i],
        None => line,
    }
}

fn trim_line(line: &str) -> &str {
    line.trim_matches(|c| c == ' ' || c == '\t')
}

/// Leading-space count, or -1 for an all-blank line.
fn line_depth(line: &str) -> isize {
    for (i, c) in line.char_indices() {
        if c != ' ' {
            return i as isize;
        }
    }
    -1
}

fn is_content(line: &str) -> bool {
    let trimmed = trim_line(strip_comment(line));
    !trimmed.is_empty() && trimmed != "#"
}

/// Depth of the next content line at or after `from`, or -1.
fn next_content_depth(lines: &[RawLine<'_>], from: usize) -> isize {
    for raw in &lines[from..] {
        if is_content(raw.text) {
            return line_depth(strip_comment(raw.text));
        }
    }
    -1
}

/// Parse a whole script into its top-level blocks.
pub fn parse_blocks(source: &str) -> Result<Vec<Block>, ParseError> {
    let lines: Vec<RawLine<'_>> = source
        .lines()
        .enumerate()
        .map(|(i, text)| RawLine {
            number: i + 1,
            text,
        })
        .collect();
    let (_, blocks) = parse_nested(&lines, -1)?;
    Ok(blocks)
}

fn parse_nested(
    lines: &[RawLine<'_>],
    parent_depth: isize,
) -> Result<(usize, Vec<Block>), ParseError> {
    let mut blocks = Vec::new();
    let mut nested_depth = -1;
    let mut l = 0;

    while l < lines.len() {
        let raw = &lines[l];
        let stripped = strip_comment(raw.text);
        let depth = line_depth(stripped);
        let trimmed = trim_line(stripped);

        if trimmed.is_empty() || trimmed == "#" {
            l += 1;
            continue;
        }

        if depth > parent_depth && nested_depth == -1 {
            nested_depth = depth;
        }
        if depth <= parent_depth {
            return Ok((l, blocks));
        }
        // Siblings must share the depth the first child established.
        if depth != nested_depth {
            return Err(ParseError::UnexpectedIndent { line: raw.number });
        }

        // Fold continuation lines into one logical line.
        let number = raw.number;
        let mut text = trimmed.to_string();
        loop {
            if text.ends_with('\\') {
                text.pop();
                l += 1;
                if let Some(next) = lines.get(l) {
                    text.push_str(trim_line(strip_comment(next.text)));
                }
            } else if text.ends_with(':') {
                if next_content_depth(lines, l + 1) > depth {
                    // Block header: the colon is sugar, the body follows.
                    text.pop();
                    break;
                }
                l += 1;
                match lines.get(l) {
                    Some(next) => text.push_str(trim_line(strip_comment(next.text))),
                    None => {
                        text.pop();
                        break;
                    }
                }
            } else {
                break;
            }
        }

        let first = parse_command(&text, number)?;
        let rest = lines.get(l + 1..).unwrap_or(&[]);
        let (consumed, body) = parse_nested(rest, nested_depth)?;
        blocks.push(Block { first, body });
        l += 1 + consumed;
    }

    Ok((l, blocks))
}

/// Split a leading `label:` off a command or argument. Labels are
/// single identifiers; anything else leaves the input untouched.
fn split_label(s: &str) -> (String, &str) {
    if let Some(idx) = s.find(':') {
        let head = &s[..idx];
        if !head.is_empty()
            && head
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_')
        {
            return (head.to_string(), trim_line(&s[idx + 1..]));
        }
    }
    (String::new(), s)
}

/// Parse one argument: a parenthesised verbatim (tokenised on the
/// spot) or a bare word running to the next space.
fn parse_arg<'a>(s: &'a str, line: usize) -> Result<(&'a str, CommandArg), ParseError> {
    let (label, s) = split_label(s);

    if let Some(body) = s.strip_prefix('(') {
        let mut depth = 1usize;
        let mut end = None;
        for (i, c) in body.char_indices() {
            match c {
                '(' => depth += 1,
                ')' => {
                    depth -= 1;
                    if depth == 0 {
                        end = Some(i);
                        break;
                    }
                }
                _ => {}
            }
        }
        let Some(end) = end else {
            return Err(ParseError::UnclosedVerbatim { line });
        };
        let stream =
            tokenize(&body[..end]).map_err(|source| ParseError::Verbatim { line, source })?;
        return Ok((&body[end + 1..], CommandArg::Verbatim { label, stream }));
    }

    let end = s.find(' ').unwrap_or(s.len());
    Ok((
        &s[end..],
        CommandArg::Word {
            label,
            word: s[..end].to_string(),
        },
    ))
}

/// Parse one logical line into a command.
pub fn parse_command(text: &str, line: usize) -> Result<Command, ParseError> {
    let (label, rest) = split_label(text);
    let (operator, mut s) = match rest.find(' ') {
        Some(i) => (rest[..i].to_string(), &rest[i + 1..]),
        None => (rest.to_string(), ""),
    };

    let mut args = Vec::new();
    let mut flags = Vec::new();
    let mut trailing = String::new();
    let mut trailing_mode = TrailingMode::None;

    loop {
        s = s.trim_start_matches(' ');
        if s.is_empty() {
            break;
        }
        if let Some(rest) = s.strip_prefix("=>") {
            trailing = trim_line(rest).to_string();
            trailing_mode = TrailingMode::Step;
            break;
        }
        if let Some(rest) = s.strip_prefix("->") {
            trailing = trim_line(rest).to_string();
            trailing_mode = TrailingMode::Now;
            break;
        }
        if let Some(rest) = s.strip_prefix('+') {
            let end = rest.find(' ').unwrap_or(rest.len());
            flags.push(rest[..end].to_string());
            s = &rest[end..];
            continue;
        }
        let (rest, arg) = parse_arg(s, line)?;
        args.push(arg);
        s = rest;
    }

    Ok(Command {
        line,
        label,
        operator,
        flags,
        args,
        trailing_mode,
        trailing,
    })
}

/// Parse a script and append its lemmas and defs to `doc`.
pub fn parse_document_into(source: &str, doc: &mut ProofDocument) -> Result<(), ParseError> {
    let blocks = parse_blocks(source)?;
    for block in blocks {
        match block.first.operator.as_str() {
            "lemma" => {
                block.first.fix_args(1)?;
                let name = block.first.word_arg(0)?.to_string();
                let lemma = Lemma {
                    label: block.first.label.clone(),
                    name: name.clone(),
                    seq: blocks_to_sequence(block.body)?,
                };
                if doc.lemmas.insert(name.clone(), lemma).is_some() {
                    return Err(ParseError::Duplicate {
                        kind: "lemma",
                        name,
                    });
                }
            }
            "def" => {
                block.first.fix_args(1)?;
                let name = block.first.word_arg(0)?.to_string();
                let seq = blocks_to_sequence(block.body)?;
                if doc.defs.insert(name.clone(), seq).is_some() {
                    return Err(ParseError::Duplicate { kind: "def", name });
                }
            }
            other => {
                return Err(ParseError::BadTopLevel {
                    operator: other.to_string(),
                    line: block.first.line,
                })
            }
        }
    }
    Ok(())
}

/// Parse a single script into a fresh document.
pub fn parse_document(source: &str) -> Result<ProofDocument, ParseError> {
    let mut doc = ProofDocument::default();
    parse_document_into(source, &mut doc)?;
    Ok(doc)
}

fn blocks_to_sequence(blocks: Vec<Block>) -> Result<SequencedProofSteps, ParseError> {
    let mut scope = LocalScope::default();
    let mut sequence: Vec<Vec<ProofCommand>> = Vec::new();
    let mut current: Vec<ProofCommand> = Vec::new();

    for block in blocks {
        if block.first.operator == "/" {
            if !current.is_empty() {
                sequence.push(std::mem::take(&mut current));
            }
            continue;
        }
        if let Some(cmd) = block_to_command(block, &mut scope)? {
            current.push(cmd);
        }
    }
    sequence.push(current);

    Ok(SequencedProofSteps { scope, sequence })
}

fn block_to_command(
    block: Block,
    scope: &mut LocalScope,
) -> Result<Option<ProofCommand>, ParseError> {
    let Block { first, body } = block;
    match first.operator.as_str() {
        "block" => {
            first.fix_args(0)?;
            Ok(Some(ProofCommand::Block {
                label: first.label.clone(),
                seq: blocks_to_sequence(body)?,
            }))
        }
        "each" => {
            let ident = first.word_arg(0)?.to_string();
            let subs = first.args[1..]
                .iter()
                .map(CommandArg::to_verbatim_or_state)
                .collect();
            Ok(Some(ProofCommand::Each {
                label: first.label.clone(),
                ident,
                subs,
                seq: blocks_to_sequence(body)?,
            }))
        }
        "in" => {
            let states = first
                .args
                .iter()
                .map(CommandArg::to_verbatim_or_state)
                .collect();
            Ok(Some(ProofCommand::InStates {
                label: first.label.clone(),
                states,
                seq: blocks_to_sequence(body)?,
            }))
        }
        "lemma" => {
            first.fix_args(1)?;
            Ok(Some(ProofCommand::Lemma {
                label: first.label.clone(),
                name: first.word_arg(0)?.to_string(),
            }))
        }
        "have" => {
            // `H: have (cond)` or the short form `have H (cond)`.
            let (label, condition) = match first.args.len() {
                1 => (first.label.clone(), first.verbatim_arg(0)?),
                2 => {
                    let name = first.word_arg(0)?.to_string();
                    let label = if first.label.is_empty() {
                        name
                    } else {
                        first.label.clone()
                    };
                    (label, first.verbatim_arg(1)?)
                }
                found => {
                    return Err(ParseError::Arity {
                        operator: first.operator.clone(),
                        expected: if found == 0 { 1 } else { 2 },
                        found,
                        line: first.line,
                    })
                }
            };
            Ok(Some(ProofCommand::Have {
                label,
                condition,
                helper: blocks_to_helper(body)?,
            }))
        }
        "cond" => {
            first.fix_args(1)?;
            scope.conditions.push(first.verbatim_arg(0)?);
            Ok(None)
        }
        "state" => {
            first.fix_args(2)?;
            let name = first.word_arg(0)?.to_string();
            let stream = first.verbatim_arg(1)?;
            scope.states.insert(name, stream);
            Ok(None)
        }
        "use" => {
            first.fix_args(1)?;
            Ok(Some(ProofCommand::Use {
                name: first.word_arg(0)?.to_string(),
                helper: blocks_to_helper(body)?,
            }))
        }
        "graph_induction" => {
            first.fix_args(0)?;
            Ok(Some(ProofCommand::GraphInduction {
                proof: blocks_to_graph_induction(&first, body)?,
            }))
        }
        other => Err(ParseError::UnknownOperator {
            operator: other.to_string(),
            line: first.line,
        }),
    }
}

fn blocks_to_helper(blocks: Vec<Block>) -> Result<ProofHelper, ParseError> {
    let mut helpers = Vec::new();

    for block in blocks {
        match block.first.operator.as_str() {
            "split_bool" => {
                let pivots = block
                    .first
                    .args
                    .iter()
                    .map(CommandArg::to_verbatim_or_state)
                    .collect();
                helpers.push(ProofHelper::SplitBool {
                    pivots,
                    helper: Box::new(blocks_to_helper(block.body)?),
                });
            }
            "split" => {
                let mut cases: Vec<SplitCase> = block
                    .first
                    .args
                    .iter()
                    .map(|arg| SplitCase {
                        label: String::new(),
                        condition: arg.to_verbatim_or_state(),
                        helper: ProofHelper::nop(),
                    })
                    .collect();

                for case in block.body {
                    if case.first.operator != "case" {
                        return Err(ParseError::NonCaseInSplit {
                            operator: case.first.operator.clone(),
                            line: case.first.line,
                        });
                    }
                    case.first.fix_args(1)?;
                    cases.push(SplitCase {
                        label: case.first.label.clone(),
                        condition: case.first.verbatim_or_state_arg(0)?,
                        helper: blocks_to_helper(case.body)?,
                    });
                }

                helpers.push(ProofHelper::Split {
                    check: !block.first.has_flag("nocheck"),
                    cases,
                });
            }
            "k_induction" => {
                let word = block.first.word_arg(0)?;
                let k: usize = word.parse().map_err(|_| ParseError::BadK {
                    found: word.to_string(),
                    line: block.first.line,
                })?;
                let mut wire_sets = Vec::new();
                for i in 1..block.first.args.len() {
                    wire_sets.push(block.first.word_arg(i)?.to_string());
                }
                helpers.push(ProofHelper::KInduction {
                    label: block.first.label.clone(),
                    k,
                    wire_sets,
                });
            }
            "graph_induction" => {
                block.first.fix_args(0)?;
                let proof = blocks_to_graph_induction(&block.first, block.body)?;
                helpers.push(ProofHelper::GraphInduction(Box::new(proof)));
            }
            other => {
                return Err(ParseError::UnknownHelper {
                    operator: other.to_string(),
                    line: block.first.line,
                })
            }
        }
    }

    if helpers.len() == 1 {
        Ok(helpers.remove(0))
    } else {
        Ok(ProofHelper::Sequence(helpers))
    }
}

fn blocks_to_graph_induction(
    first: &Command,
    body: Vec<Block>,
) -> Result<GraphInduction, ParseError> {
    let mut gi = GraphInduction {
        label: first.label.clone(),
        backward: first.has_flag("rev"),
        complete: first.has_flag("complete"),
        onehot: first.has_flag("onehot"),
        invariants: IndexMap::new(),
        entry_condition: TokenStream::new(),
        entry_nodes: Vec::new(),
        entry_helper: ProofHelper::nop(),
        nodes: IndexMap::new(),
        scope: LocalScope::default(),
    };

    for block in body {
        match block.first.operator.as_str() {
            "inv" => {
                block.first.fix_args(2)?;
                let name = block.first.word_arg(0)?.to_string();
                gi.invariants.insert(name, block.first.verbatim_arg(1)?);
            }
            "entry" => {
                block.first.fix_args(1)?;
                gi.entry_condition = block.first.verbatim_arg(0)?;
                gi.entry_nodes.extend(block.first.now_words()?);
                gi.entry_helper = blocks_to_helper(block.body)?;
            }
            "node" => {
                block.first.fix_args(3)?;
                let name = block.first.word_arg(0)?.to_string();
                let mut node = GraphNode {
                    exit: block.first.has_flag("exit"),
                    invariant: block.first.word_arg(1)?.to_string(),
                    condition: block.first.verbatim_or_state_arg(2)?,
                    step_transitions: Vec::new(),
                    eps_transitions: Vec::new(),
                    helper: blocks_to_helper(block.body)?,
                };
                match block.first.trailing_mode {
                    TrailingMode::Now => node.eps_transitions.extend(block.first.now_words()?),
                    TrailingMode::Step => node.step_transitions.extend(block.first.step_words()?),
                    TrailingMode::None => {}
                }
                gi.nodes.insert(name, node);
            }
            "edge" => {
                block.first.fix_args(1)?;
                let name = block.first.word_arg(0)?;
                let Some(node) = gi.nodes.get_mut(name) else {
                    return Err(ParseError::UnknownEdgeNode {
                        name: name.to_string(),
                        line: block.first.line,
                    });
                };
                match block.first.trailing_mode {
                    TrailingMode::Now => node.eps_transitions.extend(block.first.now_words()?),
                    TrailingMode::Step => node.step_transitions.extend(block.first.step_words()?),
                    TrailingMode::None => {}
                }
            }
            "cond" => {
                block.first.fix_args(1)?;
                gi.scope.conditions.push(block.first.verbatim_arg(0)?);
            }
            other => {
                return Err(ParseError::UnknownOperator {
                    operator: other.to_string(),
                    line: block.first.line,
                })
            }
        }
    }

    Ok(gi)
}
