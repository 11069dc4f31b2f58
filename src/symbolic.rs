#![allow(non_camel_case_types)]
#![allow(non_snake_case)]
/// built-in operator table and interned operator identifiers
pub mod operators;
/// per-engine operator, priority and bracket registries layered over the shared defaults
pub mod registry;
/// a module turns a String expression into tokens tagged with bracket nesting level
///
///# Example
/// ```
/// use RustedAlgebra::symbolic::lexer::{tokenize, TokenKind};
/// use RustedAlgebra::symbolic::registry::BracketRegistry;
/// let tokens = tokenize("sin(x) + 2.5", &BracketRegistry::default());
/// let texts: Vec<&str> = tokens.iter().map(|t| t.text.as_str()).collect();
/// assert_eq!(texts, vec!["sin", "(", "x", ")", "+", "2.5"]);
/// assert_eq!(tokens[5].kind, TokenKind::Number);
/// assert_eq!(tokens[2].level, 1);
/// ```
pub mod lexer;
///____________________________________________________________________________________________________________________________
/// # Expression tree
/// leaves are numbers or symbols, operator nodes own their children.
///# Example
/// ```
/// use RustedAlgebra::symbolic::expr_tree::Node;
/// use RustedAlgebra::symbolic::operators::Builtin;
/// let expr = Node::unary(Builtin::Sin, Node::var("x") * Node::c(2.0)) + Node::var("y");
/// assert_eq!(expr.infix(), "sin(x*2)+y");
/// assert_eq!(expr.variables(), vec!["x".to_string(), "y".to_string()]);
/// // levelled dump of the tree
/// println!("{}", expr.dump_ast());
/// ```
pub mod expr_tree;
/// the three parser stages: bracket groups, priority inversions and the flat operand/operator stacks
pub mod bracket_reducer;
pub mod flat_reducer;
pub mod pre_reducer;
///____________________________________________________________________________________________________________________________
/// # Algebra engine
/// a module
/// 1) turns a String expression into an expression tree
/// 2) evaluates the tree numerically, leaving unresolved symbols in place
/// 3) differentiates the tree and simplifies the result
///# Example#
/// ```
/// use RustedAlgebra::symbolic::algebra_engine::AlgebraEngine;
/// use RustedAlgebra::symbolic::evaluate::Bindings;
/// let engine = AlgebraEngine::new();
/// let tree = engine.parse("x/(x+1)").unwrap();
/// let d = engine.derivate(&tree, "x").unwrap().unwrap();
/// let d = engine.simplify(&d, false).unwrap();
/// let mut bindings = Bindings::new();
/// bindings.insert("x".to_string(), 1.0);
/// let value = engine.evaluate(&d, &bindings).unwrap().as_number().unwrap();
/// assert!((value - 0.25).abs() < 1e-12);
/// ```
/// Example2#
/// ```
/// use RustedAlgebra::symbolic::algebra_engine::AlgebraEngine;
/// use RustedAlgebra::symbolic::evaluate::Bindings;
/// use std::sync::Arc;
/// let mut engine = AlgebraEngine::new();
/// // custom binary operator with its own priority and numeric rule
/// engine.register_operator("mod", 2, Some(2.0), Some(Arc::new(|a: &[f64]| a[0].rem_euclid(a[1]))), None).unwrap();
/// engine.register_bracket("[", "]");
/// let value = engine.evaluate_text("[1+9] mod 4", &Bindings::new()).unwrap();
/// assert_eq!(value, 2.0);
/// ```
pub mod algebra_engine;
/// numeric evaluation with partial results
pub mod evaluate;
/// symbolic derivatives, `None` when some operator has no rule
pub mod derivatives;
///______________________________________________________________________________________________________________________________________________
/// structural simplification: identities, constant folding, like-term coalescing
/// _____________________________________________________________________________________________________________________________________________
pub mod simplify;
pub mod errors;
mod algebra_engine_tests;
mod proptests;
