//! Structural simplification.
//!
//! One pass rebuilds the tree bottom-up and applies the local rewrite rules at every
//! operator node until none of them fires any more. Passes repeat until the tree stops
//! changing, so the result of [`simplify`] is a fixpoint and simplifying it again is a
//! no-op. Numeric coefficients are kept on the left of `*` and `+` so like terms meet.
//!
//! Identity rules such as `x*0 -> 0` and `x-x -> 0` produce a positive zero whatever
//! the sign the unsimplified expression would have had at a given binding.
use crate::symbolic::evaluate::{Bindings, evaluate};
use crate::symbolic::expr_tree::Node;
use crate::symbolic::operators::{Builtin, OpId};
use crate::symbolic::registry::Registry;
use log::{debug, warn};

const MAX_PASSES: usize = 64;
const MAX_LOCAL_REWRITES: usize = 256;

/// Structural equality with bitwise comparison of constants.
pub fn same(a: &Node, b: &Node) -> bool {
    match (a, b) {
        (Node::Const(x), Node::Const(y)) => x.to_bits() == y.to_bits(),
        (Node::Var(x), Node::Var(y)) => x == y,
        (Node::Unary(o1, a1), Node::Unary(o2, a2)) => o1 == o2 && same(a1, a2),
        (Node::Binary(o1, l1, r1), Node::Binary(o2, l2, r2)) => {
            o1 == o2 && same(l1, l2) && same(r1, r2)
        }
        _ => false,
    }
}

/// Simplifies `node`. With `force_numeric_first` the tree is first evaluated against
/// an empty binding set, which replaces named constants by their values.
pub fn simplify(node: &Node, registry: &Registry, force_numeric_first: bool) -> Node {
    let mut current = if force_numeric_first {
        evaluate(node, &Bindings::new(), registry).into_node()
    } else {
        node.clone()
    };
    for pass_no in 0..MAX_PASSES {
        let next = pass(&current);
        if same(&next, &current) {
            debug!("simplified in {} passes: {}", pass_no + 1, next);
            return next;
        }
        current = next;
    }
    warn!("simplification did not settle after {} passes", MAX_PASSES);
    current
}

fn pass(node: &Node) -> Node {
    let rebuilt = match node {
        Node::Const(_) | Node::Var(_) => return node.clone(),
        Node::Unary(op, a) => Node::Unary(op.clone(), pass(a).boxed()),
        Node::Binary(op, l, r) => Node::Binary(op.clone(), pass(l).boxed(), pass(r).boxed()),
    };
    let mut current = rebuilt;
    for _ in 0..MAX_LOCAL_REWRITES {
        match rewrite(&current) {
            Some(next) => current = next,
            None => break,
        }
    }
    current
}

/// Constant folding commits only finite results. A folded `-0` keeps its sign.
fn fold(value: f64) -> Option<Node> {
    if !value.is_finite() {
        return None;
    }
    Some(Node::Const(value))
}

fn is_value(node: &Node, value: f64) -> bool {
    node.as_const() == Some(value)
}

/// `c*rest` -> (c, rest), anything else -> (1, node)
fn term(node: &Node) -> (f64, &Node) {
    match node {
        Node::Binary(op, l, r) if op.is(Builtin::Mul) => match l.as_ref() {
            Node::Const(c) => (*c, r.as_ref()),
            _ => (1.0, node),
        },
        _ => (1.0, node),
    }
}

fn make_term(c: f64, base: &Node) -> Option<Node> {
    if !c.is_finite() {
        return None;
    }
    Some(if c == 0.0 {
        Node::c(0.0)
    } else if c == 1.0 {
        base.clone()
    } else {
        Node::c(c) * base.clone()
    })
}

fn binary_of(node: &Node, b: Builtin) -> Option<(&Node, &Node)> {
    match node {
        Node::Binary(op, l, r) if op.is(b) => Some((l.as_ref(), r.as_ref())),
        _ => None,
    }
}

/// `c op rest` with a constant left operand
fn const_led(node: &Node, b: Builtin) -> Option<(f64, &Node)> {
    let (l, r) = binary_of(node, b)?;
    Some((l.as_const()?, r))
}

/// `pow(base, n)` or `base^n` with a constant exponent
fn const_power(node: &Node) -> Option<(&OpId, &Node, f64)> {
    match node {
        Node::Binary(op, base, exponent) if op.builtin().is_some_and(Builtin::is_power) => {
            Some((op, base.as_ref(), exponent.as_const()?))
        }
        _ => None,
    }
}

fn rewrite(node: &Node) -> Option<Node> {
    match node {
        Node::Unary(OpId::Builtin(b), a) => unary_rule(*b, a),
        Node::Binary(OpId::Builtin(b), l, r) => match b {
            Builtin::Add => add_rule(l, r),
            Builtin::Sub => sub_rule(l, r),
            Builtin::Mul => mul_rule(l, r),
            Builtin::Div => div_rule(l, r),
            Builtin::Pow | Builtin::Caret => pow_rule(l, r),
            _ => None,
        },
        _ => None,
    }
}

fn unary_rule(op: Builtin, a: &Node) -> Option<Node> {
    match op {
        Builtin::Identity => Some(a.clone()),
        Builtin::Neg => match a {
            Node::Const(c) => fold(-c),
            _ => match const_led(a, Builtin::Mul) {
                Some((c, rest)) => make_term(-c, rest),
                None => Some(Node::c(-1.0) * a.clone()),
            },
        },
        _ => None,
    }
}

fn add_rule(l: &Node, r: &Node) -> Option<Node> {
    if let (Some(a), Some(b)) = (l.as_const(), r.as_const()) {
        return fold(a + b);
    }
    if is_value(l, 0.0) {
        return Some(r.clone());
    }
    if is_value(r, 0.0) {
        return Some(l.clone());
    }
    if r.is_const() {
        return Some(r.clone() + l.clone());
    }
    if let (Some(c1), Some((c2, rest))) = (l.as_const(), const_led(r, Builtin::Add)) {
        return Some(fold(c1 + c2)? + rest.clone());
    }
    if l.is_const() {
        return None;
    }
    // (c+a)+b -> c+(a+b), a+(c+b) -> c+(a+b)
    if let Some((c, a)) = const_led(l, Builtin::Add) {
        return Some(Node::c(c) + (a.clone() + r.clone()));
    }
    if let Some((c, b)) = const_led(r, Builtin::Add) {
        return Some(Node::c(c) + (l.clone() + b.clone()));
    }

    let (c1, base1) = term(l);
    let (c2, base2) = term(r);
    if same(base1, base2) {
        return make_term(c1 + c2, base1);
    }

    // shared symbolic factor in any position
    if let (Some((a1, x1)), Some((a2, x2))) = (binary_of(l, Builtin::Mul), binary_of(r, Builtin::Mul)) {
        if same(x1, x2) {
            return Some((a1.clone() + a2.clone()) * x1.clone());
        }
        if same(a1, a2) {
            return Some((x1.clone() + x2.clone()) * a1.clone());
        }
        if same(x1, a2) {
            return Some((a1.clone() + x2.clone()) * x1.clone());
        }
        if same(a1, x2) {
            return Some((x1.clone() + a2.clone()) * a1.clone());
        }
    }
    None
}

fn sub_rule(l: &Node, r: &Node) -> Option<Node> {
    if same(l, r) {
        return Some(Node::c(0.0));
    }
    if let (Some(a), Some(b)) = (l.as_const(), r.as_const()) {
        return fold(a - b);
    }
    if is_value(r, 0.0) {
        return Some(l.clone());
    }
    if is_value(l, 0.0) {
        if let Node::Unary(op, y) = r {
            if op.is(Builtin::Neg) {
                return Some(y.as_ref().clone());
            }
        }
        if let Some((zero, y)) = binary_of(r, Builtin::Sub) {
            if is_value(zero, 0.0) {
                return Some(y.clone());
            }
        }
        if let Some((c, y)) = const_led(r, Builtin::Mul) {
            return make_term(-c, y);
        }
        return Some(Node::c(-1.0) * r.clone());
    }
    if l.is_const() || r.is_const() {
        return None;
    }
    let (c1, base1) = term(l);
    let (c2, base2) = term(r);
    if same(base1, base2) {
        return make_term(c1 - c2, base1);
    }
    None
}

fn mul_rule(l: &Node, r: &Node) -> Option<Node> {
    if let (Some(a), Some(b)) = (l.as_const(), r.as_const()) {
        return fold(a * b);
    }
    if is_value(l, 0.0) || is_value(r, 0.0) {
        return Some(Node::c(0.0));
    }
    if is_value(l, 1.0) {
        return Some(r.clone());
    }
    if is_value(r, 1.0) {
        return Some(l.clone());
    }
    if r.is_const() {
        return Some(r.clone() * l.clone());
    }
    if let (Some(c1), Some((c2, rest))) = (l.as_const(), const_led(r, Builtin::Mul)) {
        return make_term(c1 * c2, rest);
    }
    if l.is_const() {
        return None;
    }
    // (c*a)*b -> c*(a*b), a*(c*b) -> c*(a*b)
    if let Some((c, a)) = const_led(l, Builtin::Mul) {
        return Some(Node::c(c) * (a.clone() * r.clone()));
    }
    if let Some((c, b)) = const_led(r, Builtin::Mul) {
        return Some(Node::c(c) * (l.clone() * b.clone()));
    }

    match (const_power(l), const_power(r)) {
        (Some((op, x1, n)), Some((_, x2, m))) if same(x1, x2) => {
            return Some(Node::Binary(op.clone(), x1.clone().boxed(), fold(n + m)?.boxed()));
        }
        (Some((op, x, n)), _) if same(x, r) => {
            return Some(Node::Binary(op.clone(), x.clone().boxed(), fold(n + 1.0)?.boxed()));
        }
        (_, Some((op, x, n))) if same(x, l) => {
            return Some(Node::Binary(op.clone(), x.clone().boxed(), fold(n + 1.0)?.boxed()));
        }
        _ => {}
    }
    if same(l, r) {
        return Some(Node::pow(l.clone(), Node::c(2.0)));
    }
    None
}

fn div_rule(l: &Node, r: &Node) -> Option<Node> {
    if same(l, r) {
        return Some(Node::c(1.0));
    }
    if let (Some(a), Some(b)) = (l.as_const(), r.as_const()) {
        return fold(a / b);
    }
    if is_value(r, 1.0) {
        return Some(l.clone());
    }
    None
}

fn pow_rule(base: &Node, exponent: &Node) -> Option<Node> {
    if let (Some(a), Some(b)) = (base.as_const(), exponent.as_const()) {
        return fold(a.powf(b));
    }
    if is_value(exponent, 1.0) {
        return Some(base.clone());
    }
    if is_value(exponent, 0.0) {
        return Some(Node::c(1.0));
    }
    None
}
