//! Precedence pre-reducer.
//!
//! Works on a flat, bracket-free sequence of working items. Each step finds the
//! first pair of adjacent unapplied operators whose right member binds tighter than
//! the left one (a priority inversion), follows the inversion forward through
//! chains of adjacent or composed operators (priority transit), and folds the
//! operator at the resolved position together with its operands into one sub-tree.
//! Steps repeat until priorities along the sequence are monotonic.
use crate::symbolic::bracket_reducer::{Term, format_terms};
use crate::symbolic::errors::AlgebraError;
use crate::symbolic::expr_tree::Node;
use crate::symbolic::operators::OpId;
use crate::symbolic::registry::Registry;
use itertools::Itertools;
use log::trace;
use std::cmp::Ordering;

/// Priority comparison of two adjacent unapplied operators at sequence positions
/// `left` and `right`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompareGroup {
    pub ordering: Ordering,
    pub left: usize,
    pub right: usize,
}

/// Compares every adjacent pair of unapplied operators. Returns `None` when the
/// sequence holds only commas (or no operators at all), otherwise the index of the
/// target group after priority transit together with all groups.
pub fn compare_groups(registry: &Registry, terms: &[Term]) -> Option<(usize, Vec<CompareGroup>)> {
    let operators: Vec<(usize, String)> = terms
        .iter()
        .enumerate()
        .filter(|(_, t)| !t.is_data(registry))
        .map(|(i, t)| (i, t.text()))
        .collect();
    if operators.iter().all(|(_, name)| name == ",") {
        return None;
    }

    let groups: Vec<CompareGroup> = operators
        .iter()
        .tuple_windows()
        .map(|((i, a), (j, b))| CompareGroup {
            ordering: registry.compare(a, b),
            left: *i,
            right: *j,
        })
        .collect();
    for g in &groups {
        trace!(
            "compare ({}, {}) vs ({}, {}) -> {:?}",
            g.left,
            terms[g.left],
            g.right,
            terms[g.right],
            g.ordering
        );
    }

    let n = groups.len();
    let mut i = groups
        .iter()
        .position(|g| g.ordering == Ordering::Less)
        .unwrap_or(0);
    if n > 0 && groups[i].ordering == Ordering::Less {
        while i + 1 < n {
            let g1 = groups[i];
            let g2 = groups[i + 1];
            let transit = g1.ordering == Ordering::Less && g2.ordering == Ordering::Less;
            let adjacent = g1.right == g2.left;
            // sin cos tan ...: operators follow each other directly
            let composed = g2.left + 1 == g2.right;
            if (transit && adjacent) || composed {
                i += 1;
            } else {
                break;
            }
        }
    }
    Some((i, groups))
}

enum Fold {
    /// one operand to the right
    Unary { arg: usize },
    /// binary operator fed by a comma tuple to its right (front form)
    Split { arg: usize },
    Binary { left: usize, right: usize },
}

fn missing_operand(op: &OpId, side: &str) -> AlgebraError {
    AlgebraError::StructuralParse(format!("operator `{}` has no {} operand", op, side))
}

/// Front-form or unary reading: the operand is the item right after the operator.
fn plan_right_operand(
    registry: &Registry,
    terms: &[Term],
    index: usize,
    op: &OpId,
    arity: usize,
) -> Result<Fold, AlgebraError> {
    let arg = terms
        .get(index + 1)
        .filter(|t| t.is_data(registry))
        .ok_or_else(|| missing_operand(op, "right"))?;
    if arity == 2 {
        if arg.is_comma() {
            Ok(Fold::Split { arg: index + 1 })
        } else {
            Err(AlgebraError::StructuralParse(format!(
                "operator `{}` called in front form needs two comma separated arguments, got `{}`",
                op, arg
            )))
        }
    } else {
        Ok(Fold::Unary { arg: index + 1 })
    }
}

/// One pre-reduction step. Returns the new sequence and whether anything was folded.
pub fn pre_process_step(
    registry: &Registry,
    terms: Vec<Term>,
) -> Result<(Vec<Term>, bool), AlgebraError> {
    let Some((target, groups)) = compare_groups(registry, &terms) else {
        return Ok((terms, false));
    };
    if groups.iter().all(|g| g.ordering != Ordering::Less) {
        return Ok((terms, false));
    }

    let index = groups[target].right;
    let name = terms[index].text();
    let op = registry
        .lookup(&name)
        .ok_or_else(|| AlgebraError::StructuralParse(format!("`{}` is not an operator", name)))?;
    let arity = registry.arity(&op);

    let plan = if arity == 2 {
        let left = if index >= 1 { terms.get(index - 1) } else { None };
        let right = terms.get(index + 1).ok_or_else(|| missing_operand(&op, "right"))?;
        let front_form = match left {
            None => true,
            Some(l) => !l.is_data(registry) && right.is_comma(),
        };
        if front_form {
            plan_right_operand(registry, &terms, index, &op, arity)?
        } else {
            if !left.is_some_and(|l| l.is_data(registry)) {
                return Err(missing_operand(&op, "left"));
            }
            if !right.is_data(registry) {
                return Err(missing_operand(&op, "right"));
            }
            Fold::Binary {
                left: index - 1,
                right: index + 1,
            }
        }
    } else {
        plan_right_operand(registry, &terms, index, &op, arity)?
    };

    let mut slots: Vec<Option<Term>> = terms.into_iter().map(Some).collect();
    let mut take = |i: usize| slots[i].take().map(Term::into_node);
    let (node, position) = match plan {
        Fold::Unary { arg } => {
            let arg = take(arg).ok_or_else(|| missing_operand(&op, "right"))?;
            (Node::Unary(op.clone(), arg.boxed()), index)
        }
        Fold::Split { arg } => match take(arg).and_then(Node::into_operands) {
            Some((l, r)) => (Node::Binary(op.clone(), l.boxed(), r.boxed()), index),
            None => return Err(missing_operand(&op, "right")),
        },
        Fold::Binary { left, right } => {
            let l = take(left).ok_or_else(|| missing_operand(&op, "left"))?;
            let r = take(right).ok_or_else(|| missing_operand(&op, "right"))?;
            (Node::Binary(op.clone(), l.boxed(), r.boxed()), index - 1)
        }
    };
    slots[index] = None;
    trace!("folded `{}` into {}", op, node);

    let mut out: Vec<Term> = slots.into_iter().flatten().collect();
    out.insert(position, Term::Node(node));
    Ok((out, true))
}

/// Repeats [`pre_process_step`] until no priority inversion is left.
pub fn pre_process(registry: &Registry, terms: Vec<Term>) -> Result<Vec<Term>, AlgebraError> {
    let mut terms = terms;
    loop {
        let (next, changed) = pre_process_step(registry, terms)?;
        terms = next;
        if !changed {
            trace!("priorities are monotonic: {}", format_terms(&terms));
            return Ok(terms);
        }
    }
}
