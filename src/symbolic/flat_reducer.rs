//! Flat two-stack reducer for priority-normalized, bracket-free sequences.
use crate::symbolic::bracket_reducer::{Term, format_terms};
use crate::symbolic::errors::AlgebraError;
use crate::symbolic::expr_tree::Node;
use crate::symbolic::operators::OpId;
use crate::symbolic::registry::Registry;
use log::trace;

fn insufficient(op: &OpId) -> AlgebraError {
    AlgebraError::StructuralParse(format!("not enough operands for `{}`", op))
}

fn split_comma(op: OpId, tuple: Node) -> Result<Node, AlgebraError> {
    match tuple.into_operands() {
        Some((l, r)) => Ok(Node::Binary(op, l.boxed(), r.boxed())),
        None => Err(insufficient(&op)),
    }
}

/// Left-to-right operand/operator stack pass.
///
/// Unapplied operators are stacked. A data item immediately feeds the operator on
/// top: unary operators fold with it, binary ones with the previous operand (or, when
/// no operand is waiting, with the two halves of a comma tuple). Whatever is left on
/// the operator stack is drained at the end, which resolves composed unary chains.
pub fn reduce(registry: &Registry, terms: Vec<Term>) -> Result<Node, AlgebraError> {
    trace!("reduce {}", format_terms(&terms));
    let mut elems: Vec<Node> = Vec::new();
    let mut ops: Vec<OpId> = Vec::new();

    for term in terms {
        if !term.is_data(registry) {
            let name = term.text();
            let op = registry
                .lookup(&name)
                .ok_or_else(|| AlgebraError::StructuralParse(format!("`{}` is not an operator", name)))?;
            ops.push(op);
            continue;
        }
        let node = term.into_node();
        let Some(top) = ops.last() else {
            elems.push(node);
            continue;
        };
        if registry.arity(top) == 1 {
            if let Some(op) = ops.pop() {
                elems.push(Node::Unary(op, node.boxed()));
            }
        } else if let Some(left) = elems.pop() {
            if let Some(op) = ops.pop() {
                elems.push(Node::Binary(op, left.boxed(), node.boxed()));
            }
        } else if node.is_comma() {
            if let Some(op) = ops.pop() {
                elems.push(split_comma(op, node)?);
            }
        } else {
            elems.push(node);
        }
    }

    while let Some(op) = ops.pop() {
        let folded = if registry.arity(&op) == 1 {
            let arg = elems.pop().ok_or_else(|| insufficient(&op))?;
            Node::Unary(op, arg.boxed())
        } else {
            let right = elems.pop();
            let left = elems.pop();
            match (left, right) {
                (Some(l), Some(r)) => Node::Binary(op, l.boxed(), r.boxed()),
                (None, Some(r)) if r.is_comma() => split_comma(op, r)?,
                _ => return Err(insufficient(&op)),
            }
        };
        elems.push(folded);
    }

    let result = elems.pop().ok_or(AlgebraError::EmptyExpression)?;
    if !elems.is_empty() {
        let rest: Vec<String> = elems.iter().map(|e| e.infix()).collect();
        return Err(AlgebraError::StructuralParse(format!(
            "operands without operator: {} next to {}",
            rest.join(", "),
            result
        )));
    }
    trace!("reduced to {}", result);
    Ok(result)
}
