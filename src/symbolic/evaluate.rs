//! Numeric evaluation of expression trees with partial (symbolic) results.
use crate::symbolic::expr_tree::{Node, format_number};
use crate::symbolic::operators::{Builtin, OpId};
use crate::symbolic::registry::Registry;
use std::collections::HashMap;
use std::f64::consts::{E, PI, TAU};
use std::fmt;

/// variable name -> numeric value
pub type Bindings = HashMap<String, f64>;

/// Result of evaluation: a number, a flattened comma tuple, or the symbolic residual
/// left over when some leaves could not be resolved.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Number(f64),
    Tuple(Vec<f64>),
    Expr(Node),
}

impl Value {
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(x) => Some(*x),
            _ => None,
        }
    }

    pub fn is_symbolic(&self) -> bool {
        matches!(self, Value::Expr(_))
    }

    /// Back to a tree. Tuples become left-nested comma chains, as the parser builds them.
    pub fn into_node(self) -> Node {
        match self {
            Value::Number(x) => Node::Const(x),
            Value::Tuple(values) => {
                let mut items = values.into_iter().map(Node::Const);
                match items.next() {
                    Some(first) => items.fold(first, Node::comma),
                    None => Node::Const(0.0),
                }
            }
            Value::Expr(node) => node,
        }
    }

    /// numbers of a numeric value, `None` for a symbolic residual
    fn numbers(&self) -> Option<Vec<f64>> {
        match self {
            Value::Number(x) => Some(vec![*x]),
            Value::Tuple(values) => Some(values.clone()),
            Value::Expr(_) => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Number(x) => write!(f, "{}", format_number(*x)),
            Value::Tuple(values) => {
                let parts: Vec<String> = values.iter().map(|v| format_number(*v)).collect();
                write!(f, "({})", parts.join(", "))
            }
            Value::Expr(node) => write!(f, "{}", node),
        }
    }
}

/// Named mathematical constants recognised in leaves.
pub fn constant(name: &str) -> Option<f64> {
    match name {
        "PI" | "pi" => Some(PI),
        "E" | "e" => Some(E),
        "TAU" | "tau" => Some(TAU),
        _ => None,
    }
}

/// Iterative product over `1..=floor(x)`; `x <= 0` yields 1.
pub fn factorial(x: f64) -> f64 {
    if x.is_nan() {
        return f64::NAN;
    }
    if x > 170.0 {
        return f64::INFINITY;
    }
    let n = x.floor();
    if n <= 0.0 {
        return 1.0;
    }
    (1..=n as u64).map(|k| k as f64).product()
}

pub fn apply_unary(op: Builtin, x: f64) -> Option<f64> {
    use Builtin::*;
    let value = match op {
        Sinh => x.sinh(),
        Sin => x.sin(),
        Csc => 1.0 / x.sin(),
        Cosh => x.cosh(),
        Cos => x.cos(),
        Sec => 1.0 / x.cos(),
        Tan => x.tan(),
        Cot => 1.0 / x.tan(),
        Arcsin => x.asin(),
        Arccos => x.acos(),
        Arctan => x.atan(),
        Arccot => 1.0_f64.atan2(x),
        Exp => x.exp(),
        Neg => -x,
        Identity => x,
        Ln => x.ln(),
        Sqrt => x.sqrt(),
        Square => x * x,
        Fact | Bang => factorial(x),
        _ => return None,
    };
    Some(value)
}

pub fn apply_binary(op: Builtin, a: f64, b: f64) -> Option<f64> {
    use Builtin::*;
    let value = match op {
        Add => a + b,
        Sub => a - b,
        Mul => a * b,
        Div => a / b,
        Pow | Caret | Expa => a.powf(b),
        Log => b.ln() / a.ln(),
        _ => return None,
    };
    Some(value)
}

/// Applies `op` to numeric operands. `None` when the operand count does not match the
/// operator's arity or a custom operator has no evaluation rule.
pub fn apply(op: &OpId, args: &[f64], registry: &Registry) -> Option<f64> {
    if args.len() != registry.arity(op) {
        return None;
    }
    match op {
        OpId::Custom { .. } => registry.eval_rule(op).map(|rule| rule(args)),
        OpId::Builtin(b) => match args {
            [x] => apply_unary(*b, *x),
            [x, y] => apply_binary(*b, *x, *y),
            _ => None,
        },
    }
}

fn tuple(left: Value, right: Value) -> Value {
    match (left.numbers(), right.numbers()) {
        (Some(mut l), Some(r)) => {
            l.extend(r);
            Value::Tuple(l)
        }
        _ => Value::Expr(Node::comma(left.into_node(), right.into_node())),
    }
}

/// Evaluates `node` bottom-up. Leaves resolve through `bindings`, then through the
/// named constants, and otherwise stay symbolic; an operator whose operands are all
/// numeric is applied, any other operator is rebuilt over the resolved operands.
pub fn evaluate(node: &Node, bindings: &Bindings, registry: &Registry) -> Value {
    match node {
        Node::Const(x) => Value::Number(*x),
        Node::Var(name) => bindings
            .get(name)
            .copied()
            .or_else(|| constant(name))
            .map(Value::Number)
            .unwrap_or_else(|| Value::Expr(node.clone())),
        Node::Unary(op, a) => {
            let arg = evaluate(a, bindings, registry);
            let result = arg.numbers().and_then(|args| apply(op, &args, registry));
            match result {
                Some(x) => Value::Number(x),
                None => Value::Expr(Node::Unary(op.clone(), arg.into_node().boxed())),
            }
        }
        Node::Binary(op, l, r) => {
            let left = evaluate(l, bindings, registry);
            let right = evaluate(r, bindings, registry);
            if op.is_comma() {
                return tuple(left, right);
            }
            let args = match (left.numbers(), right.numbers()) {
                (Some(mut a), Some(b)) => {
                    a.extend(b);
                    Some(a)
                }
                _ => None,
            };
            match args.and_then(|args| apply(op, &args, registry)) {
                Some(x) => Value::Number(x),
                None => Value::Expr(Node::Binary(
                    op.clone(),
                    left.into_node().boxed(),
                    right.into_node().boxed(),
                )),
            }
        }
    }
}
