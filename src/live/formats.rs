//! Output formats for syntax trees
//!
//! The printer is the only formatter: it turns a [`Program`](crate::live::ast::Program) back
//! into source text. Its output is canonical (one statement per line, fixed spacing, fixed
//! indentation), which is what normalization relies on.

pub mod printer;

pub use printer::{print_expression, print_program, PrintOptions};
