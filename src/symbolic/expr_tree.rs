// Copyright (c)  by Gleb E. Zaslavkiy
//MIT License
//! Expression tree shared by the parser, evaluator, differentiator and simplifier.
//!
//! Leaves are numeric constants or symbol names; operator nodes own their children.
//! No subtree is ever shared between two parents: rewrite rules that need the same
//! operand twice (the quotient rule, for example) clone it explicitly.
use crate::symbolic::lexer::{Token, TokenKind};
use crate::symbolic::operators::{Builtin, OpId};
use std::collections::BTreeSet;
use std::fmt;
use std::ops::{Add, Div, Mul, Neg, Sub};

#[derive(Clone, Debug, PartialEq)]
pub enum Node {
    Const(f64),
    Var(String),
    Unary(OpId, Box<Node>),
    Binary(OpId, Box<Node>, Box<Node>),
}

impl Node {
    pub fn var(name: &str) -> Node {
        Node::Var(name.to_string())
    }

    pub fn c(value: f64) -> Node {
        Node::Const(value)
    }

    pub fn boxed(self) -> Box<Node> {
        Box::new(self)
    }

    /// Leaf built from a lexical token. Number-class text that does not parse as `f64`
    /// stays a symbol and surfaces later as an unresolved name.
    pub fn from_token(token: &Token) -> Node {
        match token.kind {
            TokenKind::Number => match token.text.parse::<f64>() {
                Ok(value) => Node::Const(value),
                Err(_) => Node::Var(token.text.clone()),
            },
            _ => Node::Var(token.text.clone()),
        }
    }

    pub fn unary(op: impl Into<OpId>, arg: Node) -> Node {
        Node::Unary(op.into(), arg.boxed())
    }

    pub fn binary(op: impl Into<OpId>, left: Node, right: Node) -> Node {
        Node::Binary(op.into(), left.boxed(), right.boxed())
    }

    pub fn pow(base: Node, exponent: Node) -> Node {
        Node::binary(Builtin::Pow, base, exponent)
    }

    pub fn comma(left: Node, right: Node) -> Node {
        Node::binary(Builtin::Comma, left, right)
    }

    /// Children of a binary node, moved out.
    pub fn into_operands(mut self) -> Option<(Node, Node)> {
        match &mut self {
            Node::Binary(_, l, r) => Some((take_child(l), take_child(r))),
            _ => None,
        }
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self, Node::Const(_) | Node::Var(_))
    }

    pub fn is_const(&self) -> bool {
        matches!(self, Node::Const(_))
    }

    pub fn as_const(&self) -> Option<f64> {
        match self {
            Node::Const(c) => Some(*c),
            _ => None,
        }
    }

    pub fn op(&self) -> Option<&OpId> {
        match self {
            Node::Unary(op, _) | Node::Binary(op, _, _) => Some(op),
            _ => None,
        }
    }

    pub fn builtin(&self) -> Option<Builtin> {
        self.op().and_then(|op| op.builtin())
    }

    pub fn is_comma(&self) -> bool {
        self.op().is_some_and(|op| op.is_comma())
    }

    /// Leaf text or operator name.
    pub fn name(&self) -> String {
        match self {
            Node::Const(c) => format_number(*c),
            Node::Var(name) => name.clone(),
            Node::Unary(op, _) | Node::Binary(op, _, _) => op.name().to_string(),
        }
    }

    pub fn children(&self) -> Vec<&Node> {
        match self {
            Node::Const(_) | Node::Var(_) => Vec::new(),
            Node::Unary(_, a) => vec![a.as_ref()],
            Node::Binary(_, l, r) => vec![l.as_ref(), r.as_ref()],
        }
    }

    /// true if any leaf of the tree is the symbol `var`
    pub fn contains_var(&self, var: &str) -> bool {
        match self {
            Node::Const(_) => false,
            Node::Var(name) => name == var,
            Node::Unary(_, a) => a.contains_var(var),
            Node::Binary(_, l, r) => l.contains_var(var) || r.contains_var(var),
        }
    }

    /// Sorted unique symbol names.
    pub fn variables(&self) -> Vec<String> {
        fn collect<'a>(node: &'a Node, acc: &mut BTreeSet<&'a str>) {
            match node {
                Node::Const(_) => {}
                Node::Var(name) => {
                    acc.insert(name);
                }
                Node::Unary(_, a) => collect(a, acc),
                Node::Binary(_, l, r) => {
                    collect(l, acc);
                    collect(r, acc);
                }
            }
        }
        let mut acc = BTreeSet::new();
        collect(self, &mut acc);
        acc.into_iter().map(String::from).collect()
    }

    /// Number of levels, a leaf has depth 1. Iterative so it is safe on any input.
    pub fn depth(&self) -> usize {
        let mut max = 0;
        let mut stack = vec![(self, 1usize)];
        while let Some((node, d)) = stack.pop() {
            max = max.max(d);
            for child in node.children() {
                stack.push((child, d + 1));
            }
        }
        max
    }

    pub fn size(&self) -> usize {
        1 + self.children().iter().map(|c| c.size()).sum::<usize>()
    }

    /// Re-parseable infix rendering.
    ///
    /// Infix operators wrap operator children in parentheses, unary operators print as
    /// `name(arg)`, word-named binary operators in front form `name(a, b)` and negative
    /// constants as `neg(c)` because the grammar has no unary minus.
    pub fn infix(&self) -> String {
        match self {
            Node::Const(c) if c.is_sign_negative() && !c.is_nan() => {
                format!("neg({})", format_number(-c))
            }
            Node::Const(c) => format_number(*c),
            Node::Var(name) => name.clone(),
            Node::Unary(op, a) => format!("{}({})", op, a.infix()),
            Node::Binary(op, l, r) if op.is_comma() => {
                format!("{}, {}", l.wrapped(), r.wrapped())
            }
            Node::Binary(op, l, r) if op.is(Builtin::Caret) => {
                format!("{}^{}", l.power_wrapped(), r.power_wrapped())
            }
            Node::Binary(op, l, r) if op.is_infix() => {
                format!("{}{}{}", l.wrapped(), op, r.wrapped())
            }
            Node::Binary(op, l, r) => {
                format!("{}({}, {})", op, l.comma_wrapped(), r.comma_wrapped())
            }
        }
    }

    fn wrapped(&self) -> String {
        match self {
            Node::Binary(op, _, _) if op.is_infix() => format!("({})", self.infix()),
            _ => self.infix(),
        }
    }

    /// `^` binds as tightly as function calls, so any operand that is not a plain
    /// symbol or non-negative number is parenthesised.
    fn power_wrapped(&self) -> String {
        match self {
            Node::Var(_) => self.infix(),
            Node::Const(c) if !c.is_sign_negative() => self.infix(),
            _ => format!("({})", self.infix()),
        }
    }

    fn comma_wrapped(&self) -> String {
        if self.is_comma() {
            format!("({})", self.infix())
        } else {
            self.infix()
        }
    }

    /// Indented levelled dump: one `name ----> subtree` line per operator node,
    /// leaves one level below their parent.
    pub fn dump_ast(&self) -> String {
        const INDENT: &str = " | ";
        fn walk(node: &Node, level: usize, out: &mut String) {
            match node {
                Node::Const(_) | Node::Var(_) => {
                    out.push_str(&INDENT.repeat(level));
                    out.push_str(&node.infix());
                    out.push('\n');
                }
                _ => {
                    out.push_str(&format!(
                        "{}{} \t ----> {}\n",
                        INDENT.repeat(level),
                        node.name(),
                        node.infix()
                    ));
                    for child in node.children() {
                        walk(child, level + 1, out);
                    }
                }
            }
        }
        if self.is_leaf() {
            return self.infix();
        }
        let mut out = String::new();
        walk(self, 0, &mut out);
        out
    }
}

fn take_child(child: &mut Box<Node>) -> Node {
    std::mem::replace(child.as_mut(), Node::Const(0.0))
}

/// Tear-down with an explicit work list: dropping a tree of any depth must not
/// recurse once per level.
impl Drop for Node {
    fn drop(&mut self) {
        fn detach(node: &mut Node, pending: &mut Vec<Node>) {
            match node {
                Node::Const(_) | Node::Var(_) => {}
                Node::Unary(_, a) => {
                    if !a.is_leaf() {
                        pending.push(take_child(a));
                    }
                }
                Node::Binary(_, l, r) => {
                    if !l.is_leaf() {
                        pending.push(take_child(l));
                    }
                    if !r.is_leaf() {
                        pending.push(take_child(r));
                    }
                }
            }
        }
        if self.is_leaf() {
            return;
        }
        let mut pending = Vec::new();
        detach(self, &mut pending);
        while let Some(mut node) = pending.pop() {
            detach(&mut node, &mut pending);
        }
    }
}

/// `2` for whole numbers, shortest round-trip text otherwise.
pub fn format_number(value: f64) -> String {
    if value == 0.0 {
        return "0".to_string();
    }
    format!("{}", value)
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.infix())
    }
}

impl Add for Node {
    type Output = Node;
    fn add(self, rhs: Node) -> Node {
        Node::binary(Builtin::Add, self, rhs)
    }
}

impl Sub for Node {
    type Output = Node;
    fn sub(self, rhs: Node) -> Node {
        Node::binary(Builtin::Sub, self, rhs)
    }
}

impl Mul for Node {
    type Output = Node;
    fn mul(self, rhs: Node) -> Node {
        Node::binary(Builtin::Mul, self, rhs)
    }
}

impl Div for Node {
    type Output = Node;
    fn div(self, rhs: Node) -> Node {
        Node::binary(Builtin::Div, self, rhs)
    }
}

impl Neg for Node {
    type Output = Node;
    fn neg(self) -> Node {
        Node::unary(Builtin::Neg, self)
    }
}
