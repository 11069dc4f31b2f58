//! Engine facade: parse, evaluate, differentiate and simplify with one set of
//! operator, priority and bracket registries.
//!
//! # Example
//! ```
//! use RustedAlgebra::symbolic::algebra_engine::AlgebraEngine;
//! use RustedAlgebra::symbolic::evaluate::Bindings;
//!
//! let engine = AlgebraEngine::new();
//! let tree = engine.parse("pow(x, 3) + 2*x").unwrap();
//! let d = engine.derivate(&tree, "x").unwrap().unwrap();
//! let mut bindings = Bindings::new();
//! bindings.insert("x".to_string(), 2.0);
//! let value = engine.evaluate(&d, &bindings).unwrap();
//! assert_eq!(value.as_number(), Some(14.0));
//! ```
use crate::Utils::engine_config::{DEFAULT_MAX_DEPTH, EngineConfig};
use crate::symbolic::bracket_reducer::{Term, format_terms, handle};
use crate::symbolic::derivatives;
use crate::symbolic::errors::AlgebraError;
use crate::symbolic::evaluate::{self, Bindings, Value};
use crate::symbolic::expr_tree::Node;
use crate::symbolic::flat_reducer::reduce;
use crate::symbolic::lexer::{Token, token_table, tokenize};
use crate::symbolic::operators::{DiffRule, EvalRule, OpId};
use crate::symbolic::pre_reducer::pre_process;
use crate::symbolic::registry::Registry;
use log::{Level, debug, info, log_enabled, trace, warn};
use rayon::prelude::*;

#[derive(Debug, Clone)]
pub struct AlgebraEngine {
    registry: Registry,
    max_depth: usize,
}

impl Default for AlgebraEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl AlgebraEngine {
    pub fn new() -> Self {
        AlgebraEngine {
            registry: Registry::new(),
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    /// Engine with the depth limit, priority overrides and bracket pairs of `config`.
    pub fn with_config(config: &EngineConfig) -> Self {
        let mut engine = AlgebraEngine::new();
        engine.max_depth = config.max_depth;
        for (name, priority) in &config.priorities {
            engine.set_priority(name, *priority);
        }
        for (open, close) in &config.brackets {
            engine.register_bracket(open, close);
        }
        info!(
            "engine configured: max_depth {}, {} priority overrides, {} extra bracket pairs",
            engine.max_depth,
            config.priorities.len(),
            config.brackets.len()
        );
        engine
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    pub fn set_max_depth(&mut self, max_depth: usize) {
        self.max_depth = max_depth;
    }

    pub fn register_operator(
        &mut self,
        name: &str,
        arity: usize,
        priority: Option<f64>,
        eval_rule: Option<EvalRule>,
        diff_rule: Option<DiffRule>,
    ) -> Result<OpId, AlgebraError> {
        self.registry
            .register_operator(name, arity, priority, eval_rule, diff_rule)
    }

    pub fn set_priority(&mut self, name: &str, priority: f64) {
        debug!("priority of {} set to {}", name, priority);
        self.registry.set_priority(name, priority);
    }

    pub fn register_bracket(&mut self, open: &str, close: &str) {
        debug!("bracket pair {} {} registered", open, close);
        self.registry.register_bracket(open, close);
    }

    pub fn tokenize(&self, text: &str) -> Vec<Token> {
        tokenize(text, &self.registry.brackets)
    }

    fn check_depth(&self, node: &Node) -> Result<(), AlgebraError> {
        let depth = node.depth();
        if depth > self.max_depth {
            warn!("expression depth {} exceeds limit {}", depth, self.max_depth);
            return Err(AlgebraError::DepthExceeded {
                depth,
                limit: self.max_depth,
            });
        }
        Ok(())
    }

    /// Bracket nesting deeper than the limit is rejected before any tree is built;
    /// the parser stages walk groups recursively.
    fn check_nesting(&self, tokens: &[Token]) -> Result<(), AlgebraError> {
        let nesting = tokens.iter().map(|t| t.level.max(0) as usize).max().unwrap_or(0);
        if nesting > self.max_depth {
            warn!("bracket nesting {} exceeds limit {}", nesting, self.max_depth);
            return Err(AlgebraError::DepthExceeded {
                depth: nesting,
                limit: self.max_depth,
            });
        }
        Ok(())
    }

    /// Reduction callback of the bracket reducer: rejects stray bracket markers, then
    /// normalises priorities and folds the flat batch into one tree.
    fn build_tree(&self, batch: Vec<Term>) -> Result<Node, AlgebraError> {
        let stray = batch.iter().find(|t| match t {
            Term::Token(token) => {
                self.registry.brackets.is_marker(&token.text)
                    && !self.registry.is_operator(&token.text)
            }
            Term::Node(_) => false,
        });
        if let Some(marker) = stray {
            return Err(AlgebraError::BracketMismatch(format!(
                "`{}` is never closed in {}",
                marker,
                format_terms(&batch)
            )));
        }
        if batch.is_empty() {
            return Err(AlgebraError::StructuralParse("empty group".to_string()));
        }
        let normalised = pre_process(&self.registry, batch)?;
        reduce(&self.registry, normalised)
    }

    /// Folds a token sequence into one tree.
    pub fn analyze(&self, tokens: Vec<Token>) -> Result<Node, AlgebraError> {
        if tokens.is_empty() {
            return Err(AlgebraError::EmptyExpression);
        }
        let terms: Vec<Term> = tokens.into_iter().map(Term::Token).collect();
        let mut stack = Vec::new();
        handle(&self.registry, terms, &mut stack, |batch| self.build_tree(batch))?;
        if stack.len() > 1 {
            trace!("second reduction over {}", format_terms(&stack));
            let rest = std::mem::take(&mut stack);
            handle(&self.registry, rest, &mut stack, |batch| self.build_tree(batch))?;
        }
        if stack.len() > 1 {
            return Err(AlgebraError::StructuralParse(format!(
                "{} top-level items remain: {}",
                stack.len(),
                format_terms(&stack)
            )));
        }
        stack
            .pop()
            .map(Term::into_node)
            .ok_or(AlgebraError::EmptyExpression)
    }

    pub fn parse(&self, text: &str) -> Result<Node, AlgebraError> {
        let tokens = self.tokenize(text);
        if log_enabled!(Level::Debug) {
            debug!(
                "tokens of `{}`:\n{}",
                text,
                token_table(&tokens, |t| self.registry.is_operator(t))
            );
        }
        self.check_nesting(&tokens)?;
        let tree = self.analyze(tokens).inspect_err(|e| {
            warn!("cannot parse `{}`: {}", text, e);
        })?;
        self.check_depth(&tree)?;
        debug!("parsed `{}` as {}", text, tree);
        Ok(tree)
    }

    pub fn evaluate(&self, node: &Node, bindings: &Bindings) -> Result<Value, AlgebraError> {
        self.check_depth(node)?;
        Ok(evaluate::evaluate(node, bindings, &self.registry))
    }

    /// Parses and evaluates `text`; a non-numeric result is an error.
    pub fn evaluate_text(&self, text: &str, bindings: &Bindings) -> Result<f64, AlgebraError> {
        let tree = self.parse(text)?;
        match self.evaluate(&tree, bindings)? {
            Value::Number(x) => Ok(x),
            Value::Tuple(values) => Err(AlgebraError::StructuralParse(format!(
                "`{}` evaluates to a tuple of {} values",
                text,
                values.len()
            ))),
            Value::Expr(residual) => {
                let names = residual.variables();
                let detail = if names.is_empty() {
                    residual.to_string()
                } else {
                    format!("{} in {}", names.join(", "), residual)
                };
                Err(AlgebraError::UnresolvedSymbols(detail))
            }
        }
    }

    /// Evaluates one tree against many binding sets in parallel.
    pub fn evaluate_batch(
        &self,
        node: &Node,
        bindings: &[Bindings],
    ) -> Result<Vec<Value>, AlgebraError> {
        self.check_depth(node)?;
        Ok(bindings
            .par_iter()
            .map(|b| evaluate::evaluate(node, b, &self.registry))
            .collect())
    }

    /// `Ok(None)` when some operator in the tree has no derivative rule.
    pub fn derivate(&self, node: &Node, var: &str) -> Result<Option<Node>, AlgebraError> {
        self.check_depth(node)?;
        let derivative = derivatives::derivate(node, var, &self.registry);
        match &derivative {
            Some(d) => debug!("d/d{} {} = {}", var, node, d),
            None => warn!("no derivative rule for some operator in {}", node),
        }
        Ok(derivative)
    }

    pub fn simplify(&self, node: &Node, force_numeric_first: bool) -> Result<Node, AlgebraError> {
        self.check_depth(node)?;
        Ok(crate::symbolic::simplify::simplify(
            node,
            &self.registry,
            force_numeric_first,
        ))
    }
}
