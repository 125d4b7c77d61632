//! Literal walker - pre-order traversal that hands every literal to a visitor
//!
//! The walker owns the traversal order and the parent context of each literal; visitors only
//! decide what to do with a literal once they see it. [`walk_program`] borrows the tree and
//! [`rewrite_program`] may replace literals in place. Both are generated from one traversal,
//! which is what keeps collected and rewritten keys in sync.
//!
//! Traversal is depth-first, pre-order, left to right, visiting children in source order
//! (callee before arguments, test before branches, and so on). A literal replaced by the visitor
//! is not descended into.

use super::nodes::{
    ArrowBody, Expression, ForInit, Literal, MemberProperty, Program, Statement,
    VariableDeclaration,
};

/// Where a literal sits relative to its parent
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LiteralContext<'a> {
    /// Direct initializer of `name` declared on `line` (1-based)
    Declarator { name: &'a str, line: usize },
    /// Positional argument of a call or `new`. `index` skips sibling arguments before it that
    /// are literals or already-rewritten table accesses.
    Argument { index: usize },
    /// Any other position
    Other,
}

/// Read-only visitor for literals found by [`walk_program`]
pub trait LiteralVisitor {
    /// Called once per literal, in traversal order
    fn visit_literal(&mut self, literal: &Literal, context: LiteralContext<'_>);

    /// Whether `expression` is a literal that has already been rewritten into a table access
    fn is_rewritten(&self, _expression: &Expression) -> bool {
        false
    }
}

/// Visitor for [`rewrite_program`] that may replace the literals it sees
pub trait LiteralRewriter {
    /// Called once per literal, in traversal order. Returning `Some` replaces the literal node.
    fn rewrite_literal(&mut self, literal: &Literal, context: LiteralContext<'_>)
        -> Option<Expression>;

    fn is_rewritten(&self, _expression: &Expression) -> bool {
        false
    }
}

/// Visit every literal of `program` without modifying it
pub fn walk_program(program: &Program, visitor: &mut dyn LiteralVisitor) {
    visit::walk_statements(&program.body, visitor);
}

/// Visit every literal of `program`, replacing the ones the rewriter hands back a node for
pub fn rewrite_program(program: &mut Program, rewriter: &mut dyn LiteralRewriter) {
    visit_mut::walk_statements(&mut program.body, rewriter);
}

/// Generates the traversal once per mutability, so both walks visit the same literals in the
/// same order. The caller supplies `visit_slot`, which decides what happens to a literal.
macro_rules! literal_walker {
    ($module:ident, $visitor:ident, { $($mutability:tt)? }, $visit_slot:item) => {
        mod $module {
            use super::*;

            $visit_slot

            pub(super) fn walk_statements(
                statements: &$($mutability)? [Statement],
                visitor: &mut dyn $visitor,
            ) {
                for statement in statements {
                    walk_statement(statement, visitor);
                }
            }

            fn walk_statement(statement: &$($mutability)? Statement, visitor: &mut dyn $visitor) {
                match statement {
                    Statement::Variable(declaration) => walk_declaration(declaration, visitor),
                    Statement::Function(function) => {
                        walk_statements(&$($mutability)? function.body, visitor)
                    }
                    Statement::Expression(expression) => {
                        visit_slot(expression, LiteralContext::Other, visitor)
                    }
                    Statement::Block(body) => walk_statements(body, visitor),
                    Statement::If {
                        test,
                        consequent,
                        alternate,
                    } => {
                        visit_slot(test, LiteralContext::Other, visitor);
                        walk_statement(consequent, visitor);
                        if let Some(alternate) = alternate {
                            walk_statement(alternate, visitor);
                        }
                    }
                    Statement::For {
                        init,
                        test,
                        update,
                        body,
                    } => {
                        match init {
                            Some(ForInit::Variable(declaration)) => {
                                walk_declaration(declaration, visitor)
                            }
                            Some(ForInit::Expression(expression)) => {
                                visit_slot(expression, LiteralContext::Other, visitor)
                            }
                            None => {}
                        }
                        if let Some(test) = test {
                            visit_slot(test, LiteralContext::Other, visitor);
                        }
                        if let Some(update) = update {
                            visit_slot(update, LiteralContext::Other, visitor);
                        }
                        walk_statement(body, visitor);
                    }
                    Statement::While { test, body } => {
                        visit_slot(test, LiteralContext::Other, visitor);
                        walk_statement(body, visitor);
                    }
                    Statement::Return(argument) => {
                        if let Some(argument) = argument {
                            visit_slot(argument, LiteralContext::Other, visitor);
                        }
                    }
                    Statement::Break | Statement::Continue | Statement::Empty => {}
                }
            }

            fn walk_declaration(
                declaration: &$($mutability)? VariableDeclaration,
                visitor: &mut dyn $visitor,
            ) {
                for declarator in &$($mutability)? declaration.declarators {
                    let Some(init) = &$($mutability)? declarator.init else {
                        continue;
                    };
                    let context = LiteralContext::Declarator {
                        name: &declarator.id.name,
                        line: declarator.id.location.start.line_number(),
                    };
                    visit_slot(init, context, visitor);
                }
            }

            fn walk_expression(expression: &$($mutability)? Expression, visitor: &mut dyn $visitor) {
                match expression {
                    Expression::Literal(_) | Expression::Identifier(_) | Expression::This => {}
                    Expression::Array(elements) => {
                        for element in elements {
                            visit_slot(element, LiteralContext::Other, visitor);
                        }
                    }
                    Expression::Object(properties) => {
                        for property in properties {
                            visit_slot(&$($mutability)? property.value, LiteralContext::Other, visitor);
                        }
                    }
                    Expression::Function(function) => {
                        walk_statements(&$($mutability)? function.body, visitor)
                    }
                    Expression::Arrow { body, .. } => match body {
                        ArrowBody::Expression(expression) => {
                            visit_slot(expression, LiteralContext::Other, visitor)
                        }
                        ArrowBody::Block(statements) => walk_statements(statements, visitor),
                    },
                    Expression::Unary { argument, .. } | Expression::Update { argument, .. } => {
                        visit_slot(argument, LiteralContext::Other, visitor)
                    }
                    Expression::Binary { left, right, .. } => {
                        visit_slot(left, LiteralContext::Other, visitor);
                        visit_slot(right, LiteralContext::Other, visitor);
                    }
                    Expression::Assignment { target, value, .. } => {
                        visit_slot(target, LiteralContext::Other, visitor);
                        visit_slot(value, LiteralContext::Other, visitor);
                    }
                    Expression::Conditional {
                        test,
                        consequent,
                        alternate,
                    } => {
                        visit_slot(test, LiteralContext::Other, visitor);
                        visit_slot(consequent, LiteralContext::Other, visitor);
                        visit_slot(alternate, LiteralContext::Other, visitor);
                    }
                    Expression::Call { callee, arguments } | Expression::New { callee, arguments } => {
                        visit_slot(callee, LiteralContext::Other, visitor);
                        walk_arguments(arguments, visitor);
                    }
                    Expression::Member { object, property } => {
                        visit_slot(object, LiteralContext::Other, visitor);
                        if let MemberProperty::Computed(property) = property {
                            visit_slot(property, LiteralContext::Other, visitor);
                        }
                    }
                }
            }

            fn walk_arguments(arguments: &$($mutability)? [Expression], visitor: &mut dyn $visitor) {
                let mut position = 0;
                let mut skipped = 0;
                for argument in arguments {
                    if matches!(argument, Expression::Literal(_)) {
                        let context = LiteralContext::Argument {
                            index: position - skipped,
                        };
                        visit_slot(argument, context, visitor);
                        skipped += 1;
                    } else if visitor.is_rewritten(argument) {
                        skipped += 1;
                    } else {
                        walk_expression(argument, visitor);
                    }
                    position += 1;
                }
            }
        }
    };
}

literal_walker!(visit, LiteralVisitor, {}, fn visit_slot(
    slot: &Expression,
    context: LiteralContext<'_>,
    visitor: &mut dyn LiteralVisitor,
) {
    match slot {
        Expression::Literal(literal) => visitor.visit_literal(literal, context),
        _ => walk_expression(slot, visitor),
    }
});

literal_walker!(visit_mut, LiteralRewriter, { mut }, fn visit_slot(
    slot: &mut Expression,
    context: LiteralContext<'_>,
    visitor: &mut dyn LiteralRewriter,
) {
    if let Expression::Literal(literal) = &*slot {
        if let Some(replacement) = visitor.rewrite_literal(literal, context) {
            *slot = replacement;
        }
        return;
    }
    walk_expression(slot, visitor);
});

#[cfg(test)]
mod tests {
    use super::*;
    use crate::live::parsing::parse_program;

    /// Records (raw, context) pairs without rewriting anything
    #[derive(Default)]
    struct Recorder {
        seen: Vec<(String, String)>,
    }

    impl LiteralVisitor for Recorder {
        fn visit_literal(&mut self, literal: &Literal, context: LiteralContext<'_>) {
            self.seen.push((literal.raw.clone(), format!("{:?}", context)));
        }
    }

    fn record(source: &str) -> Vec<(String, String)> {
        let program = parse_program(source).expect("parse failed");
        let mut recorder = Recorder::default();
        walk_program(&program, &mut recorder);
        recorder.seen
    }

    #[test]
    fn test_declarator_context() {
        let seen = record("let a = 1;");
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].0, "1");
        assert_eq!(seen[0].1, r#"Declarator { name: "a", line: 1 }"#);
    }

    #[test]
    fn test_argument_indices_skip_earlier_literals() {
        let seen = record("m(1, x, 2);");
        assert_eq!(seen[0].1, "Argument { index: 0 }");
        // `1` is skipped, `x` is not
        assert_eq!(seen[1].1, "Argument { index: 1 }");
    }

    #[test]
    fn test_nested_literals_are_other() {
        let seen = record("let a = [1, -2];\nm(f(3));");
        let contexts: Vec<&str> = seen.iter().map(|(_, c)| c.as_str()).collect();
        assert_eq!(contexts, vec!["Other", "Other", "Argument { index: 0 }"]);
    }

    #[test]
    fn test_pre_order_visits_callee_first() {
        let seen = record("f(1)[2](3);");
        let raws: Vec<&str> = seen.iter().map(|(raw, _)| raw.as_str()).collect();
        assert_eq!(raws, vec!["1", "2", "3"]);
    }

    #[test]
    fn test_replacement_is_not_descended() {
        struct Replacer;
        impl LiteralRewriter for Replacer {
            fn rewrite_literal(
                &mut self,
                _literal: &Literal,
                _context: LiteralContext<'_>,
            ) -> Option<Expression> {
                Some(Expression::member("t", "k"))
            }
        }

        let mut program = parse_program("let a = 1; m(2, 3);").expect("parse failed");
        rewrite_program(&mut program, &mut Replacer);

        let mut recorder = Recorder::default();
        walk_program(&program, &mut recorder);
        assert!(recorder.seen.is_empty());
    }

    #[test]
    fn test_rewrite_sees_the_same_contexts_as_walk() {
        struct Keeper(Vec<String>);
        impl LiteralRewriter for Keeper {
            fn rewrite_literal(
                &mut self,
                literal: &Literal,
                context: LiteralContext<'_>,
            ) -> Option<Expression> {
                self.0.push(format!("{} {:?}", literal.raw, context));
                None
            }
        }

        let source = "let a = 1;\nfor (let i = 0; i < 3; i++) { m(i, 'x', [2]); }\nx = { k: -4 } ? f(5) : 6;";
        let mut program = parse_program(source).expect("parse failed");
        let mut keeper = Keeper(Vec::new());
        rewrite_program(&mut program, &mut keeper);

        let walked: Vec<String> = record(source)
            .into_iter()
            .map(|(raw, context)| format!("{} {}", raw, context))
            .collect();
        assert_eq!(keeper.0, walked);
        assert_eq!(walked.len(), 8);
    }
}
