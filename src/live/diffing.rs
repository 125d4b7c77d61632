//! Structural comparison of two syntax trees
//!
//! Two programs are structurally equal when they differ at most in literal values and source
//! locations. Everything else counts: identifier names, operators, declaration kinds, property
//! keys, statement and argument counts, and node kinds.
//!
//! A literal compared with a literal is always equal, whatever the values (even a number
//! against a string). A literal compared with any other expression is a change.
//!
//! The comparison is a lock-step walk: every node kind implements [`Structure`] and matches the
//! pair of variants exhaustively, so there is no attribute the walk can skip by accident.

use crate::live::ast::{
    ArrowBody, Expression, ForInit, Function, FunctionDeclaration, Identifier, MemberProperty,
    Program, Property, Statement, VariableDeclaration, VariableDeclarator,
};

/// Whether `current` differs from `previous` in anything but literal values and locations
pub fn has_structural_change(current: &Program, previous: &Program) -> bool {
    let changed = current.differs_from(previous);
    tracing::debug!(
        component = module_path!(),
        op = "has_structural_change",
        event = "end",
        changed,
        statements = current.body.len(),
        previous_statements = previous.body.len(),
    );
    changed
}

/// Lock-step structural comparison
trait Structure {
    fn differs_from(&self, previous: &Self) -> bool;
}

impl<T: Structure> Structure for [T] {
    fn differs_from(&self, previous: &Self) -> bool {
        self.len() != previous.len()
            || self
                .iter()
                .zip(previous)
                .any(|(current, previous)| current.differs_from(previous))
    }
}

impl<T: Structure> Structure for Vec<T> {
    fn differs_from(&self, previous: &Self) -> bool {
        self.as_slice().differs_from(previous.as_slice())
    }
}

impl<T: Structure + ?Sized> Structure for Box<T> {
    fn differs_from(&self, previous: &Self) -> bool {
        self.as_ref().differs_from(previous.as_ref())
    }
}

impl<T: Structure> Structure for Option<T> {
    fn differs_from(&self, previous: &Self) -> bool {
        match (self, previous) {
            (Some(current), Some(previous)) => current.differs_from(previous),
            (None, None) => false,
            _ => true,
        }
    }
}

impl Structure for Program {
    fn differs_from(&self, previous: &Self) -> bool {
        self.body.differs_from(&previous.body)
    }
}

impl Structure for Identifier {
    fn differs_from(&self, previous: &Self) -> bool {
        self.name != previous.name
    }
}

impl Structure for VariableDeclaration {
    fn differs_from(&self, previous: &Self) -> bool {
        self.kind != previous.kind || self.declarators.differs_from(&previous.declarators)
    }
}

impl Structure for VariableDeclarator {
    fn differs_from(&self, previous: &Self) -> bool {
        self.id.differs_from(&previous.id) || self.init.differs_from(&previous.init)
    }
}

impl Structure for FunctionDeclaration {
    fn differs_from(&self, previous: &Self) -> bool {
        self.id.differs_from(&previous.id)
            || self.params.differs_from(&previous.params)
            || self.body.differs_from(&previous.body)
    }
}

impl Structure for Function {
    fn differs_from(&self, previous: &Self) -> bool {
        self.id.differs_from(&previous.id)
            || self.params.differs_from(&previous.params)
            || self.body.differs_from(&previous.body)
    }
}

impl Structure for ForInit {
    fn differs_from(&self, previous: &Self) -> bool {
        match (self, previous) {
            (ForInit::Variable(current), ForInit::Variable(previous)) => {
                current.differs_from(previous)
            }
            (ForInit::Expression(current), ForInit::Expression(previous)) => {
                current.differs_from(previous)
            }
            _ => true,
        }
    }
}

impl Structure for ArrowBody {
    fn differs_from(&self, previous: &Self) -> bool {
        match (self, previous) {
            (ArrowBody::Expression(current), ArrowBody::Expression(previous)) => {
                current.differs_from(previous)
            }
            (ArrowBody::Block(current), ArrowBody::Block(previous)) => {
                current.differs_from(previous)
            }
            _ => true,
        }
    }
}

impl Structure for Property {
    fn differs_from(&self, previous: &Self) -> bool {
        self.key != previous.key || self.value.differs_from(&previous.value)
    }
}

impl Structure for MemberProperty {
    fn differs_from(&self, previous: &Self) -> bool {
        match (self, previous) {
            (MemberProperty::Named(current), MemberProperty::Named(previous)) => {
                current.differs_from(previous)
            }
            (MemberProperty::Computed(current), MemberProperty::Computed(previous)) => {
                current.differs_from(previous)
            }
            _ => true,
        }
    }
}

impl Structure for Statement {
    fn differs_from(&self, previous: &Self) -> bool {
        use Statement as S;

        match (self, previous) {
            (S::Variable(a), S::Variable(b)) => a.differs_from(b),
            (S::Function(a), S::Function(b)) => a.differs_from(b),
            (S::Expression(a), S::Expression(b)) => a.differs_from(b),
            (S::Block(a), S::Block(b)) => a.differs_from(b),
            (
                S::If {
                    test,
                    consequent,
                    alternate,
                },
                S::If {
                    test: previous_test,
                    consequent: previous_consequent,
                    alternate: previous_alternate,
                },
            ) => {
                test.differs_from(previous_test)
                    || consequent.differs_from(previous_consequent)
                    || alternate.differs_from(previous_alternate)
            }
            (
                S::For {
                    init,
                    test,
                    update,
                    body,
                },
                S::For {
                    init: previous_init,
                    test: previous_test,
                    update: previous_update,
                    body: previous_body,
                },
            ) => {
                init.differs_from(previous_init)
                    || test.differs_from(previous_test)
                    || update.differs_from(previous_update)
                    || body.differs_from(previous_body)
            }
            (
                S::While { test, body },
                S::While {
                    test: previous_test,
                    body: previous_body,
                },
            ) => test.differs_from(previous_test) || body.differs_from(previous_body),
            (S::Return(a), S::Return(b)) => a.differs_from(b),
            (S::Break, S::Break) | (S::Continue, S::Continue) | (S::Empty, S::Empty) => false,
            _ => true,
        }
    }
}

impl Structure for Expression {
    fn differs_from(&self, previous: &Self) -> bool {
        use Expression as E;

        match (self, previous) {
            (E::Literal(_), E::Literal(_)) => false,
            (E::Identifier(a), E::Identifier(b)) => a.differs_from(b),
            (E::This, E::This) => false,
            (E::Array(a), E::Array(b)) => a.differs_from(b),
            (E::Object(a), E::Object(b)) => a.differs_from(b),
            (E::Function(a), E::Function(b)) => a.differs_from(b),
            (
                E::Arrow { params, body },
                E::Arrow {
                    params: previous_params,
                    body: previous_body,
                },
            ) => params.differs_from(previous_params) || body.differs_from(previous_body),
            (
                E::Unary { operator, argument },
                E::Unary {
                    operator: previous_operator,
                    argument: previous_argument,
                },
            ) => operator != previous_operator || argument.differs_from(previous_argument),
            (
                E::Update {
                    operator,
                    prefix,
                    argument,
                },
                E::Update {
                    operator: previous_operator,
                    prefix: previous_prefix,
                    argument: previous_argument,
                },
            ) => {
                operator != previous_operator
                    || prefix != previous_prefix
                    || argument.differs_from(previous_argument)
            }
            (
                E::Binary {
                    operator,
                    left,
                    right,
                },
                E::Binary {
                    operator: previous_operator,
                    left: previous_left,
                    right: previous_right,
                },
            ) => {
                operator != previous_operator
                    || left.differs_from(previous_left)
                    || right.differs_from(previous_right)
            }
            (
                E::Assignment {
                    operator,
                    target,
                    value,
                },
                E::Assignment {
                    operator: previous_operator,
                    target: previous_target,
                    value: previous_value,
                },
            ) => {
                operator != previous_operator
                    || target.differs_from(previous_target)
                    || value.differs_from(previous_value)
            }
            (
                E::Conditional {
                    test,
                    consequent,
                    alternate,
                },
                E::Conditional {
                    test: previous_test,
                    consequent: previous_consequent,
                    alternate: previous_alternate,
                },
            ) => {
                test.differs_from(previous_test)
                    || consequent.differs_from(previous_consequent)
                    || alternate.differs_from(previous_alternate)
            }
            (
                E::Call { callee, arguments },
                E::Call {
                    callee: previous_callee,
                    arguments: previous_arguments,
                },
            )
            | (
                E::New { callee, arguments },
                E::New {
                    callee: previous_callee,
                    arguments: previous_arguments,
                },
            ) => callee.differs_from(previous_callee) || arguments.differs_from(previous_arguments),
            (
                E::Member { object, property },
                E::Member {
                    object: previous_object,
                    property: previous_property,
                },
            ) => object.differs_from(previous_object) || property.differs_from(previous_property),
            (current, previous) => {
                tracing::trace!(
                    component = module_path!(),
                    op = "has_structural_change",
                    event = "node_type_changed",
                    current = current.node_type(),
                    previous = previous.node_type(),
                );
                true
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::live::formats::PrintOptions;
    use crate::live::parsing::normalize;

    fn changed(previous: &str, current: &str) -> bool {
        let options = PrintOptions::default();
        let previous = normalize(previous, &options).expect("previous parses");
        let current = normalize(current, &options).expect("current parses");
        has_structural_change(&current, &previous)
    }

    #[test]
    fn test_identical_programs() {
        assert!(!changed("let a = 1;", "let a = 1;"));
    }

    #[test]
    fn test_literal_values_are_ignored() {
        assert!(!changed(
            "let a = 1;\nconsole.log('a');",
            "let a = 11;\nconsole.log('b');"
        ));
        // Literal kind does not matter either
        assert!(!changed("f(1);", "f('one');"));
    }

    #[test]
    fn test_formatting_is_ignored() {
        assert!(!changed(
            "let a = 1; console.log(a);",
            "let a = 1;\n\n   console.log(a);"
        ));
    }

    #[test]
    fn test_renamed_declaration() {
        assert!(changed("let a = 1;", "let b = 1;"));
    }

    #[test]
    fn test_argument_count() {
        assert!(changed("console.log('a');", "console.log('a', 'b');"));
    }

    #[test]
    fn test_literal_replaced_by_expression() {
        assert!(changed("let a = 1;", "let a = b;"));
        assert!(changed("let a = b;", "let a = 1;"));
        assert!(changed("let a = 1;", "let a = -1;"));
    }

    #[test]
    fn test_primitive_attributes_are_structural() {
        assert!(changed("a + b;", "a - b;"));
        assert!(changed("let a = 1;", "const a = 1;"));
        assert!(changed("i++;", "++i;"));
        assert!(changed("x = { a: 1 };", "x = { b: 1 };"));
        assert!(changed("f(a.x);", "f(a.y);"));
        assert!(changed("function f(a) {}", "function f(b) {}"));
    }

    #[test]
    fn test_added_and_removed_statements() {
        assert!(changed("let a = 1;", "let a = 1;\nlet b = 2;"));
        assert!(changed("let a = 1;\nlet b = 2;", "let a = 1;"));
        assert!(changed("if (a) f();", "if (a) f(); else g();"));
    }

    #[test]
    fn test_empty_program_against_non_empty() {
        assert!(changed("let a = 1;", ""));
        assert!(!changed("", "// just a comment"));
    }

    #[test]
    fn test_node_type_change_inside_call() {
        assert!(changed("f(a.b);", "f(a());"));
        assert!(changed("f(this);", "f([]);"));
    }
}
