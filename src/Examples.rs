//! examples of usage of RustedAlgebra
/// parsing, evaluation, derivatives, simplification and custom operators
pub mod algebra_examples;
