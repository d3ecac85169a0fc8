//! Priority-driven line breaking for rendered properties.
//!
//! Whitespace and operators carry a break location and priority; the
//! breaker repeatedly splits the widest offending line at its highest
//! priority in-range token, closest to the line's midpoint. Content
//! inside a bracket cannot be broken unless the bracket itself is
//! broken first.

use crate::token::{stream_to_string, Bracket, Token, TokenStream};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BreakLoc {
    /// The token is removed and the line split where it stood.
    Replace,
    /// The line is split in front of the token.
    Before,
    /// The line is split after the token.
    After,
    /// The token becomes its own line.
    Around,
}

#[derive(Debug, Clone, Copy)]
struct BreakMode {
    loc: BreakLoc,
    prio: i32,
}

fn break_mode(token: &Token) -> BreakMode {
    match token {
        Token::Whitespace => BreakMode {
            loc: BreakLoc::Replace,
            prio: 2,
        },
        Token::Operator(op) => match op.as_str() {
            "|->" | "|=>" | "->" => BreakMode {
                loc: BreakLoc::Around,
                prio: 5,
            },
            "&&" | "&" | "|" | "||" => BreakMode {
                loc: BreakLoc::After,
                prio: 4,
            },
            "(" | ")" | ";" => BreakMode {
                loc: BreakLoc::After,
                prio: -1,
            },
            _ => BreakMode {
                loc: BreakLoc::After,
                prio: 1,
            },
        },
        _ => BreakMode {
            loc: BreakLoc::After,
            prio: -1,
        },
    }
}

/// Splice names joined by the preprocessor glue operator `` `` `` into
/// a single name, recursing into brackets.
pub fn concat_tokens(stream: &[Token]) -> TokenStream {
    let mut out = TokenStream::new();
    let mut i = 0;
    while i < stream.len() {
        if let (Some(Token::Name(prev)), Token::Operator(op), Some(Token::Name(next))) =
            (out.last(), &stream[i], stream.get(i + 1))
        {
            if op == "``" {
                let merged = Token::Name(format!("{prev}{next}"));
                out.pop();
                out.push(merged);
                i += 2;
                continue;
            }
        }
        match &stream[i] {
            Token::Bracketed(bracket) => out.push(Token::Bracketed(Bracket {
                open: bracket.open,
                close: bracket.close,
                content: concat_tokens(&bracket.content),
            })),
            other => out.push(other.clone()),
        }
        i += 1;
    }
    out
}

#[derive(Debug, Clone)]
struct Line {
    tokens: TokenStream,
    break_start: usize,
    break_end: usize,
    indent: usize,
}

impl Line {
    fn new(tokens: TokenStream, indent: usize) -> Line {
        Line {
            break_start: 0,
            break_end: tokens.len(),
            tokens,
            indent,
        }
    }

    fn eligible(&self) -> &[Token] {
        let end = self.break_end.min(self.tokens.len());
        let start = self.break_start.min(end);
        &self.tokens[start..end]
    }

    /// Split a bracketed token into prefix+opener, indented content,
    /// and closer+suffix.
    fn break_bracket(&self, i: usize, bracket: &Bracket, new_lines: &mut Vec<Line>) {
        let mut first = Line {
            tokens: self.tokens[..i].to_vec(),
            break_start: self.break_start,
            break_end: i + 1,
            indent: self.indent,
        };
        first.tokens.push(Token::operator(bracket.open.to_string()));

        let middle = Line::new(bracket.content.clone(), self.indent + 1);

        let mut last = Line {
            tokens: vec![Token::operator(bracket.close.to_string())],
            break_start: 0,
            break_end: self.break_end.saturating_sub(i),
            indent: self.indent,
        };
        last.tokens.extend(self.tokens[i + 1..].iter().cloned());

        new_lines.extend([first, middle, last]);
    }

    /// Break the first bracket whose own content is wider than the
    /// limit, if any.
    fn check_brackets(&self, new_lines: &mut Vec<Line>, width: usize) -> bool {
        for (i, token) in self.tokens.iter().enumerate() {
            if let Token::Bracketed(bracket) = token {
                if stream_to_string(&bracket.content).len() > width {
                    self.break_bracket(i, bracket, new_lines);
                    return true;
                }
            }
        }
        false
    }

    fn highest_prio(&self) -> i32 {
        self.eligible()
            .iter()
            .map(|t| break_mode(t).prio)
            .max()
            .unwrap_or(-1)
    }

    /// Among in-range tokens of the highest priority, pick the one
    /// whose break position is closest to the middle of the line.
    fn choose_break(&self, line_len: usize) -> Option<usize> {
        let highest = self.highest_prio();
        if highest == -1 {
            return None;
        }

        let target = line_len as i64 / 2;
        let mut col = 0i64;
        let mut best = None;
        let mut best_distance = i64::MAX;
        for (i, token) in self.tokens.iter().enumerate() {
            let mode = break_mode(token);
            let add = token.to_string().len() as i64;
            if i < self.break_start || i >= self.break_end || mode.prio != highest {
                col += add;
                continue;
            }

            let distance = match mode.loc {
                BreakLoc::Before | BreakLoc::Around | BreakLoc::Replace => (target - col).abs(),
                BreakLoc::After => (target - (col + add)).abs(),
            };
            if distance < best_distance {
                best_distance = distance;
                best = Some(i);
            }
            col += add;
        }
        best
    }

    fn break_at(self, idx: usize, new_lines: &mut Vec<Line>) {
        let loc = break_mode(&self.tokens[idx]).loc;
        let mut first = Line {
            tokens: self.tokens[..idx].to_vec(),
            break_start: self.break_start,
            break_end: idx,
            indent: self.indent,
        };
        let mut second = Line {
            tokens: self.tokens[idx + 1..].to_vec(),
            break_start: 0,
            break_end: self.tokens.len() - idx - 1,
            indent: self.indent,
        };
        let token = self.tokens[idx].clone();

        match loc {
            BreakLoc::After => {
                first.tokens.push(token);
                new_lines.extend([first, second]);
            }
            BreakLoc::Before => {
                second.tokens.insert(0, token);
                first.break_start += 1;
                first.break_end += 1;
                new_lines.extend([first, second]);
            }
            BreakLoc::Around => {
                let middle = Line {
                    tokens: vec![token],
                    break_start: 0,
                    break_end: 0,
                    indent: self.indent,
                };
                new_lines.extend([first, middle, second]);
            }
            BreakLoc::Replace => new_lines.extend([first, second]),
        }
    }

    fn widest_bracket(&self) -> Option<(usize, &Bracket)> {
        let mut best = None;
        let mut best_width = 0;
        for (i, token) in self.tokens.iter().enumerate() {
            if let Token::Bracketed(bracket) = token {
                let width = token.to_string().len();
                if width >= best_width {
                    best_width = width;
                    best = Some((i, bracket));
                }
            }
        }
        best
    }
}

/// Render a stream as newline-separated text with each line's visible
/// width at most `width` where possible. Indentation steps are four
/// spaces; lines never re-flow into earlier ones.
pub fn format_stream(stream: &[Token], width: usize) -> String {
    let mut lines = vec![Line::new(concat_tokens(stream), 0)];

    let mut all_fit = false;
    let mut changed = true;
    while !all_fit && changed {
        let mut new_lines = Vec::new();
        all_fit = true;
        changed = false;
        for line in lines {
            let line_len = line.indent * 4 + stream_to_string(&line.tokens).len();
            if line_len <= width {
                new_lines.push(line);
                continue;
            }
            all_fit = false;

            if line.check_brackets(&mut new_lines, width) {
                changed = true;
                continue;
            }
            if let Some(idx) = line.choose_break(line_len) {
                line.break_at(idx, &mut new_lines);
                changed = true;
                continue;
            }
            if let Some((idx, bracket)) = line.widest_bracket() {
                line.break_bracket(idx, bracket, &mut new_lines);
                changed = true;
                continue;
            }
            new_lines.push(line);
        }
        lines = new_lines;
    }

    lines
        .iter()
        .map(|line| {
            let body = stream_to_string(&line.tokens);
            format!("{}{}", "    ".repeat(line.indent), body.trim_matches(' '))
        })
        .collect::<Vec<_>>()
        .join("\n")
}
