//! Syntax tree definitions for sketch sources
//!
//!     This module holds the typed syntax tree the parser produces, the location types that
//!     tie literal and identifier nodes back to source lines, and the literal walker shared
//!     by extraction and collection.
//!
//! Shape
//!
//!     A [`Program`] is a list of statements. Statements and expressions are closed enums, so
//!     each consumer (printer, walker, differ) matches every node kind explicitly. Operators,
//!     names and flags are plain attributes on the variants.
//!
//! Locations
//!
//!     Only literals and identifiers carry a [`Range`]. Key derivation needs the declared name's
//!     line and the literal's own line/column; nothing else reads locations, and the structural
//!     differ ignores them entirely.

pub mod nodes;
pub mod range;
pub mod walk;

pub use nodes::{
    ArrowBody, AssignmentOperator, BinaryOperator, DeclarationKind, Expression, ForInit,
    Function, FunctionDeclaration, Identifier, Literal, LiteralValue, MemberProperty, Program,
    Property, PropertyKey, Statement, UnaryOperator, UpdateOperator, VariableDeclaration,
    VariableDeclarator,
};
pub use range::{Position, Range, SourceLocation};
pub use walk::{rewrite_program, walk_program, LiteralContext, LiteralRewriter, LiteralVisitor};
