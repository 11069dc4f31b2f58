//! Property-based tests for parsing, differentiation and simplification.
