//! Symbolic differentiation.
//!
//! `None` means "no derivative rule": factorials, bare comma tuples and custom
//! operators registered without a rule. A missing derivative anywhere below a node
//! makes the derivative of the whole tree missing.
use crate::symbolic::expr_tree::Node;
use crate::symbolic::operators::{Builtin, OpId};
use crate::symbolic::registry::Registry;
use log::trace;

fn f(op: Builtin, arg: Node) -> Node {
    Node::unary(op, arg)
}

/// Chain rule wrapper: `proto * arg'`, or `proto` alone when `arg` is the variable itself.
fn chain(proto: Node, arg: &Node, var: &str, registry: &Registry) -> Option<Node> {
    if arg.is_leaf() {
        return Some(proto);
    }
    Some(proto * derivate(arg, var, registry)?)
}

/// Derivative of `node` with respect to the symbol `var`.
pub fn derivate(node: &Node, var: &str, registry: &Registry) -> Option<Node> {
    let result = match node {
        Node::Const(_) => Some(Node::c(0.0)),
        Node::Var(name) => Some(Node::c(if name == var { 1.0 } else { 0.0 })),
        _ if !node.contains_var(var) => Some(Node::c(0.0)),
        Node::Unary(op, arg) => {
            // front form that reached the tree without being split: `pow(x, 2)` as a
            // unary node over a comma tuple
            if registry.arity(op) == 2 {
                if let Node::Binary(comma, l, r) = arg.as_ref() {
                    if comma.is_comma() {
                        let split = Node::Binary(op.clone(), l.clone(), r.clone());
                        return derivate(&split, var, registry);
                    }
                }
            }
            match op {
                OpId::Builtin(b) => unary_rule(*b, arg, var, registry),
                OpId::Custom { .. } => custom_rule(op, &[arg.as_ref()], var, registry),
            }
        }
        Node::Binary(op, l, r) => match op {
            OpId::Builtin(b) => binary_rule(*b, l, r, var, registry),
            OpId::Custom { .. } => custom_rule(op, &[l.as_ref(), r.as_ref()], var, registry),
        },
    };
    if result.is_none() {
        trace!("no derivative of {} by {}", node, var);
    }
    result
}

fn custom_rule(op: &OpId, args: &[&Node], var: &str, registry: &Registry) -> Option<Node> {
    let rule = registry.diff_rule(op)?;
    let derivs = args
        .iter()
        .map(|a| derivate(a, var, registry))
        .collect::<Option<Vec<Node>>>()?;
    rule(args, &derivs)
}

fn unary_rule(op: Builtin, arg: &Node, var: &str, registry: &Registry) -> Option<Node> {
    use Builtin::*;
    let a = arg.clone();
    let proto = match op {
        Identity => return derivate(arg, var, registry),
        Neg => return Some(Node::c(0.0) - derivate(arg, var, registry)?),
        Sin => f(Cos, a),
        Cos => -f(Sin, a),
        Tan => f(Square, f(Sec, a)),
        Cot => -f(Square, f(Csc, a)),
        Sec => f(Sec, a.clone()) * f(Tan, a),
        Csc => -(f(Csc, a.clone()) * f(Cot, a)),
        Sinh => f(Cosh, a),
        Cosh => f(Sinh, a),
        Arcsin => Node::c(1.0) / f(Sqrt, Node::c(1.0) - Node::pow(a, Node::c(2.0))),
        Arccos => -(Node::c(1.0) / f(Sqrt, Node::c(1.0) - Node::pow(a, Node::c(2.0)))),
        Arctan => Node::c(1.0) / (Node::c(1.0) + Node::pow(a, Node::c(2.0))),
        Arccot => -(Node::c(1.0) / (Node::c(1.0) + Node::pow(a, Node::c(2.0)))),
        Exp => f(Exp, a),
        Ln => Node::c(1.0) / a,
        Sqrt => Node::c(0.5) * Node::pow(a, Node::c(-0.5)),
        Square => Node::c(2.0) * a,
        _ => return None,
    };
    chain(proto, arg, var, registry)
}

fn binary_rule(op: Builtin, l: &Node, r: &Node, var: &str, registry: &Registry) -> Option<Node> {
    use Builtin::*;
    match op {
        Add | Sub => Some(Node::binary(
            op,
            derivate(l, var, registry)?,
            derivate(r, var, registry)?,
        )),
        Mul => {
            let dl = derivate(l, var, registry)?;
            let dr = derivate(r, var, registry)?;
            Some(dl * r.clone() + l.clone() * dr)
        }
        Div => {
            let dl = derivate(l, var, registry)?;
            let dr = derivate(r, var, registry)?;
            Some((dl * r.clone() - l.clone() * dr) / (r.clone() * r.clone()))
        }
        Pow | Caret => power_rule(op, l, r, var, registry),
        Log => {
            if l.contains_var(var) {
                // change of base when the base moves too
                let quotient = f(Ln, r.clone()) / f(Ln, l.clone());
                return derivate(&quotient, var, registry);
            }
            let proto = Node::c(1.0) / (f(Ln, l.clone()) * r.clone());
            chain(proto, r, var, registry)
        }
        Expa => {
            if l.contains_var(var) {
                return power_rule(Pow, l, r, var, registry);
            }
            let proto = f(Ln, l.clone()) * Node::binary(Expa, l.clone(), r.clone());
            chain(proto, r, var, registry)
        }
        _ => None,
    }
}

/// `x^y` for the three dependency cases of base and exponent.
fn power_rule(op: Builtin, x: &Node, y: &Node, var: &str, registry: &Registry) -> Option<Node> {
    let base_moves = x.contains_var(var);
    let exponent_moves = y.contains_var(var);
    match (base_moves, exponent_moves) {
        (true, false) => {
            let lowered = match y.as_const() {
                Some(c) => Node::c(c - 1.0),
                None => y.clone() - Node::c(1.0),
            };
            let proto = y.clone() * Node::binary(op, x.clone(), lowered);
            chain(proto, x, var, registry)
        }
        (false, true) => {
            let proto = Node::binary(op, x.clone(), y.clone()) * f(Builtin::Ln, x.clone());
            chain(proto, y, var, registry)
        }
        _ => {
            let dx = derivate(x, var, registry)?;
            let dy = derivate(y, var, registry)?;
            let inner = dy * f(Builtin::Ln, x.clone()) + y.clone() * dx / x.clone();
            Some(Node::binary(op, x.clone(), y.clone()) * inner)
        }
    }
}
