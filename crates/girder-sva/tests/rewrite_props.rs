//! Property tests for the expression rewriters.
//!
//! Negation is checked semantically: a generated boolean expression is
//! rendered to a token stream, rewritten, and re-evaluated under a
//! three-valued (0/1/x) interpretation over every assignment of its
//! variables. Structural equality is deliberately not required.

use proptest::prelude::*;

use girder_sva::rewrite::{conjoin, is_conjunction, negate, past};
use girder_sva::{tokenize, Token, TokenStream};

const VARS: [&str; 3] = ["a", "b", "c"];

type Trit = Option<bool>;

fn not3(v: Trit) -> Trit {
    v.map(|b| !b)
}

fn and3(l: Trit, r: Trit) -> Trit {
    match (l, r) {
        (Some(false), _) | (_, Some(false)) => Some(false),
        (Some(true), Some(true)) => Some(true),
        _ => None,
    }
}

fn or3(l: Trit, r: Trit) -> Trit {
    match (l, r) {
        (Some(true), _) | (_, Some(true)) => Some(true),
        (Some(false), Some(false)) => Some(false),
        _ => None,
    }
}

/// Recursive-descent evaluator over a token stream: `||`/`|` lowest,
/// `&&`/`&` next, `~` and atoms highest.
struct Eval<'a> {
    tokens: &'a [Token],
    pos: usize,
}

fn eval_stream(tokens: &[Token], env: &[Trit; 3]) -> Trit {
    let mut eval = Eval { tokens, pos: 0 };
    let value = eval.or_expr(env);
    assert!(eval.peek().is_none(), "unconsumed tokens in {tokens:?}");
    value
}

impl<'a> Eval<'a> {
    fn peek(&mut self) -> Option<&'a Token> {
        while matches!(self.tokens.get(self.pos), Some(Token::Whitespace)) {
            self.pos += 1;
        }
        self.tokens.get(self.pos)
    }

    fn next(&mut self) -> Option<&'a Token> {
        let token = self.peek();
        self.pos += 1;
        token
    }

    fn or_expr(&mut self, env: &[Trit; 3]) -> Trit {
        let mut value = self.and_expr(env);
        while matches!(self.peek(), Some(Token::Operator(op)) if op == "||" || op == "|") {
            self.next();
            value = or3(value, self.and_expr(env));
        }
        value
    }

    fn and_expr(&mut self, env: &[Trit; 3]) -> Trit {
        let mut value = self.atom(env);
        while matches!(self.peek(), Some(Token::Operator(op)) if op == "&&" || op == "&") {
            self.next();
            value = and3(value, self.atom(env));
        }
        value
    }

    fn atom(&mut self, env: &[Trit; 3]) -> Trit {
        match self.next() {
            Some(Token::Name(name)) => {
                let idx = VARS
                    .iter()
                    .position(|v| v == name)
                    .unwrap_or_else(|| panic!("unknown variable {name}"));
                env[idx]
            }
            Some(Token::Number(num)) => Some(num == "1"),
            Some(Token::Bracketed(bracket)) => eval_stream(&bracket.content, env),
            Some(Token::Operator(op)) if op == "~" => not3(self.atom(env)),
            other => panic!("unexpected token {other:?}"),
        }
    }
}

#[derive(Debug, Clone)]
enum Expr {
    Var(usize),
    Not(Box<Expr>),
    And(Box<Expr>, Box<Expr>),
    Or(Box<Expr>, Box<Expr>),
}

impl Expr {
    fn eval(&self, env: &[Trit; 3]) -> Trit {
        match self {
            Expr::Var(i) => env[*i],
            Expr::Not(e) => not3(e.eval(env)),
            Expr::And(l, r) => and3(l.eval(env), r.eval(env)),
            Expr::Or(l, r) => or3(l.eval(env), r.eval(env)),
        }
    }

    fn render(&self) -> String {
        match self {
            Expr::Var(i) => VARS[*i].to_string(),
            Expr::Not(e) => match **e {
                Expr::Var(_) | Expr::Not(_) => format!("~{}", e.render()),
                _ => format!("~({})", e.render()),
            },
            Expr::And(l, r) => format!("{} && {}", paren_or(l), paren_or(r)),
            Expr::Or(l, r) => format!("{} || {}", l.render(), r.render()),
        }
    }
}

/// Parenthesise a disjunction appearing under a conjunction.
fn paren_or(e: &Expr) -> String {
    match e {
        Expr::Or(_, _) => format!("({})", e.render()),
        _ => e.render(),
    }
}

fn arb_expr() -> impl Strategy<Value = Expr> {
    let leaf = (0..VARS.len()).prop_map(Expr::Var);
    leaf.prop_recursive(4, 32, 2, |inner| {
        prop_oneof![
            inner.clone().prop_map(|e| Expr::Not(Box::new(e))),
            (inner.clone(), inner.clone())
                .prop_map(|(l, r)| Expr::And(Box::new(l), Box::new(r))),
            (inner.clone(), inner).prop_map(|(l, r)| Expr::Or(Box::new(l), Box::new(r))),
        ]
    })
}

fn environments() -> Vec<[Trit; 3]> {
    let trits = [Some(false), Some(true), None];
    let mut envs = Vec::new();
    for i in 0..27 {
        envs.push([trits[i % 3], trits[i / 3 % 3], trits[i / 9 % 3]]);
    }
    envs
}

/// Token-kind skeleton of a stream, used to check that `past` touches
/// nothing but names.
fn shape(stream: &[Token]) -> String {
    stream
        .iter()
        .map(|token| match token {
            Token::Name(_) => "N".to_string(),
            Token::Number(n) => format!("#{n}"),
            Token::Operator(op) => format!("O{op}"),
            Token::Whitespace => "W".to_string(),
            Token::Bracketed(b) => format!("{}{}{}", b.open, shape(&b.content), b.close),
        })
        .collect()
}

fn names_of(stream: &[Token]) -> Vec<String> {
    let mut names = Vec::new();
    for token in stream {
        match token {
            Token::Name(n) => names.push(n.clone()),
            Token::Bracketed(b) => names.extend(names_of(&b.content)),
            _ => {}
        }
    }
    names
}

proptest! {
    #[test]
    fn renderer_and_evaluator_agree(expr in arb_expr()) {
        let stream = tokenize(&expr.render()).unwrap();
        for env in environments() {
            prop_assert_eq!(eval_stream(&stream, &env), expr.eval(&env));
        }
    }

    #[test]
    fn negate_flips_three_valued_semantics(expr in arb_expr()) {
        let stream = tokenize(&expr.render()).unwrap();
        let negated = negate(&stream);
        for env in environments() {
            prop_assert_eq!(eval_stream(&negated, &env), not3(expr.eval(&env)));
        }
    }

    #[test]
    fn negate_twice_preserves_three_valued_semantics(expr in arb_expr()) {
        let stream = tokenize(&expr.render()).unwrap();
        let restored = negate(&negate(&stream));
        for env in environments() {
            prop_assert_eq!(eval_stream(&restored, &env), expr.eval(&env));
        }
    }

    #[test]
    fn past_rewrites_names_and_preserves_structure(expr in arb_expr(), n in 1usize..4) {
        let stream = tokenize(&expr.render()).unwrap();
        let shifted = past(&stream, n);
        prop_assert_eq!(shape(&shifted), shape(&stream));
        for name in names_of(&shifted) {
            prop_assert!(name.starts_with("$past("), "unshifted name {}", name);
        }
        prop_assert_eq!(names_of(&shifted).len(), names_of(&stream).len());
    }

    #[test]
    fn conjoin_keeps_conjunction_shape(expr in arb_expr()) {
        let stream = tokenize(&expr.render()).unwrap();
        // Joining a single term changes nothing but an optional outer
        // parenthesis, and the result is always splice-safe.
        let joined = conjoin(std::slice::from_ref(&stream));
        prop_assert!(is_conjunction(&joined));
        for env in environments() {
            prop_assert_eq!(eval_stream(&joined, &env), expr.eval(&env));
        }
    }
}

#[test]
fn conjoin_of_nothing_is_the_constant_one() {
    let joined = conjoin(&[]);
    assert_eq!(joined, vec![Token::Number("1".to_string())]);
    for env in environments() {
        assert_eq!(eval_stream(&joined, &env), Some(true));
    }
}

#[test]
fn whitespace_only_terms_do_not_contribute() {
    let blank: TokenStream = vec![Token::Whitespace];
    let var = tokenize("a").unwrap();
    assert_eq!(conjoin(&[blank, var.clone()]), var);
}
