//! Parsing module for sketch sources
//!
//! Turns a source string into the typed syntax tree in [`crate::live::ast`]. The pipeline is
//! two stages:
//!
//!     source ── lexing::tokenize ──> (Token, span) stream ── grammar ──> Program
//!
//! Lexing errors and grammar errors both surface as [`ParseError`], located by line/column.
//!
//! Normalization
//!
//!     Everything downstream (key derivation, structural comparison) works on the
//!     normalized tree: the program is parsed, printed with the canonical printer, and parsed
//!     again. Locations in the normalized tree therefore depend only on structure, so adding
//!     blank lines or reindenting a sketch does not move any literal.

mod grammar;

use chumsky::prelude::*;
use chumsky::Stream;
use std::sync::Arc;

use crate::live::ast::{Program, SourceLocation};
use crate::live::error::ParseError;
use crate::live::formats::{print_program, PrintOptions};
use crate::live::lexing::tokenize;

/// Parse a sketch source into a [`Program`]
///
/// An empty (or comment-only) source is a valid, empty program.
pub fn parse_program(source: &str) -> Result<Program, ParseError> {
    let tokens = tokenize(source).map_err(|error| ParseError::from_lex_error(error, source))?;
    let locator = Arc::new(SourceLocation::new(source));
    let end_of_input = source.len()..source.len();

    grammar::program(locator.clone())
        .parse(Stream::from_iter(end_of_input, tokens.into_iter()))
        .map_err(|errors| grammar::to_parse_error(errors, &locator))
}

/// Parse `source`, print it canonically, and parse the printed text again
pub fn normalize(source: &str, options: &PrintOptions) -> Result<Program, ParseError> {
    let program = parse_program(source)?;
    let printed = print_program(&program, options);
    parse_program(&printed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::live::ast::{
        BinaryOperator, Expression, LiteralValue, MemberProperty, Position, Statement,
    };

    fn parse_ok(source: &str) -> Program {
        parse_program(source).unwrap_or_else(|e| panic!("failed to parse {:?}: {}", source, e))
    }

    fn single_expression(source: &str) -> Expression {
        match parse_ok(source).body.into_iter().next() {
            Some(Statement::Expression(expression)) => expression,
            other => panic!("expected expression statement, got {:?}", other),
        }
    }

    #[test]
    fn test_empty_program() {
        assert!(parse_ok("").body.is_empty());
        assert!(parse_ok("// nothing here\n").body.is_empty());
    }

    #[test]
    fn test_declaration_locations() {
        let program = parse_ok("\nlet speed = 2.5;");
        let Statement::Variable(declaration) = &program.body[0] else {
            panic!("expected declaration");
        };
        let declarator = &declaration.declarators[0];
        assert_eq!(declarator.id.name, "speed");
        assert_eq!(declarator.id.location.start, Position::new(1, 4));
        let Some(Expression::Literal(literal)) = &declarator.init else {
            panic!("expected literal initializer");
        };
        assert_eq!(literal.value, LiteralValue::Number(2.5));
        assert_eq!(literal.raw, "2.5");
        assert_eq!(literal.location.start, Position::new(1, 12));
    }

    #[test]
    fn test_semicolons_are_optional() {
        let program = parse_ok("let a = 1\nlet b = 2\nm(a, b)");
        assert_eq!(program.body.len(), 3);
    }

    #[test]
    fn test_multiplication_binds_tighter_than_addition() {
        let Expression::Binary {
            operator, right, ..
        } = single_expression("1 + 2 * 3;")
        else {
            panic!("expected binary expression");
        };
        assert_eq!(operator, BinaryOperator::Add);
        assert!(matches!(
            *right,
            Expression::Binary {
                operator: BinaryOperator::Multiply,
                ..
            }
        ));
    }

    #[test]
    fn test_call_member_chain() {
        let Expression::Call { callee, arguments } = single_expression("console.log('a', 'b');")
        else {
            panic!("expected call");
        };
        assert_eq!(arguments.len(), 2);
        let Expression::Member { property, .. } = *callee else {
            panic!("expected member callee");
        };
        assert!(matches!(property, MemberProperty::Named(ref id) if id.name == "log"));
    }

    #[test]
    fn test_arrow_functions() {
        assert!(matches!(
            single_expression("x => x * 2;"),
            Expression::Arrow { .. }
        ));
        assert!(matches!(
            single_expression("(a, b) => { return a + b; };"),
            Expression::Arrow { .. }
        ));
        // A parenthesized expression is not an arrow
        assert!(matches!(
            single_expression("(a);"),
            Expression::Identifier(_)
        ));
    }

    #[test]
    fn test_sketch_program() {
        let source = r#"
            function setup() {
                createCanvas(400, 400);
            }

            function draw() {
                background(220);
                for (let i = 0; i < 10; i++) {
                    if (i % 2 === 0) {
                        ellipse(i * 40, 200, 20, 20);
                    } else {
                        rect(i * 40, 190, 20, 20);
                    }
                }
                const colors = ['red', "blue"];
                let config = { size: 4, 'label': null };
                let p = new Particle(1, -2);
                p.pos.x += 0x10;
            }
        "#;
        let program = parse_ok(source);
        assert_eq!(program.body.len(), 2);
    }

    #[test]
    fn test_unbalanced_bracket_is_an_error() {
        let err = parse_program("m(1;\nlet a = 2;").unwrap_err();
        assert_eq!(err.location.start.line, 0);
    }

    #[test]
    fn test_invalid_assignment_target() {
        assert!(parse_program("1 = a;").is_err());
        assert!(parse_program("f() = a;").is_err());
        assert!(parse_program("a.b = 1; a[0] = 2;").is_ok());
    }

    #[test]
    fn test_lex_errors_become_parse_errors() {
        let err = parse_program("let a = 1;\nlet b = #;").unwrap_err();
        assert_eq!(err.location.start, Position::new(1, 8));
    }

    #[test]
    fn test_normalize_discards_layout() {
        let options = PrintOptions::default();
        let compact = normalize("let a = 1; console.log(a);", &options).unwrap();
        let spread = normalize("let a = 1;\n\n   console.log(a);", &options).unwrap();
        assert_eq!(compact, spread);
    }
}
