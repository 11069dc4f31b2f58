//! Hierarchical bracket reducer.
//!
//! Walks a flat sequence of working items that may contain bracket markers and
//! collapses the innermost bracket-delimited run through a caller-supplied
//! reduction callback, until the remaining sequence is bracket free.
use crate::symbolic::errors::AlgebraError;
use crate::symbolic::expr_tree::Node;
use crate::symbolic::lexer::Token;
use crate::symbolic::registry::Registry;
use log::trace;
use std::collections::VecDeque;
use std::fmt;

/// Working item of the parser: a raw token (operator name, bracket marker or leaf
/// text) or an already folded sub-tree.
#[derive(Clone, Debug, PartialEq)]
pub enum Term {
    Token(Token),
    Node(Node),
}

impl Term {
    /// Token text or the sub-tree's root name.
    pub fn text(&self) -> String {
        match self {
            Term::Token(t) => t.text.clone(),
            Term::Node(n) => n.name(),
        }
    }

    pub fn is_token_text(&self, text: &str) -> bool {
        matches!(self, Term::Token(t) if t.text == text)
    }

    pub fn is_comma(&self) -> bool {
        matches!(self, Term::Node(n) if n.is_comma())
    }

    /// A raw token naming a registered operator is an operator waiting for operands;
    /// everything else (leaves and folded sub-trees) is data.
    pub fn is_data(&self, registry: &Registry) -> bool {
        match self {
            Term::Token(t) => !registry.is_operator(&t.text),
            Term::Node(_) => true,
        }
    }

    pub fn into_node(self) -> Node {
        match self {
            Term::Token(t) => Node::from_token(&t),
            Term::Node(n) => n,
        }
    }
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Term::Token(t) => write!(f, "{}", t.text),
            Term::Node(n) => write!(f, "{}", n),
        }
    }
}

pub fn format_terms(terms: &[Term]) -> String {
    let parts: Vec<String> = terms.iter().map(|t| t.to_string()).collect();
    format!("[{}]", parts.join(" "))
}

/// Reduces `data` onto `stack`.
///
/// Ordinary items are pushed. A closing marker, or the last item of `data`, pops
/// items back into a batch until the matching opener is found (a closer) or the
/// stack is exhausted (end of input), hands the batch to `reduce_action` and pushes
/// the result. An opener that is itself a registered operator goes back on the
/// stack so the reduced group becomes its operand; plain grouping openers are dropped.
pub fn handle<F>(
    registry: &Registry,
    data: Vec<Term>,
    stack: &mut Vec<Term>,
    mut reduce_action: F,
) -> Result<(), AlgebraError>
where
    F: FnMut(Vec<Term>) -> Result<Node, AlgebraError>,
{
    trace!("handle: {}", format_terms(&data));
    let n = data.len();
    for (i, current) in data.into_iter().enumerate() {
        let is_last = i + 1 == n;
        let opener = match &current {
            Term::Token(t) => registry.brackets.opener_of(&t.text).map(str::to_string),
            Term::Node(_) => None,
        };
        if !is_last && opener.is_none() {
            stack.push(current);
            continue;
        }

        let mut batch = VecDeque::new();
        let mut matched = None;
        while let Some(top) = stack.pop() {
            if let Some(open) = &opener {
                if top.is_token_text(open) {
                    matched = Some(top);
                    break;
                }
            }
            batch.push_front(top);
        }

        match (&opener, matched) {
            (Some(open), None) => {
                return Err(AlgebraError::BracketMismatch(format!(
                    "`{}` closes a group that was never opened with `{}`",
                    current, open
                )));
            }
            (Some(open), Some(opener_term)) => {
                if registry.is_operator(open) {
                    stack.push(opener_term);
                }
            }
            (None, _) => batch.push_back(current),
        }

        let batch: Vec<Term> = batch.into();
        trace!("reducing batch {}", format_terms(&batch));
        let node = reduce_action(batch)?;
        stack.push(Term::Node(node));
    }
    Ok(())
}
