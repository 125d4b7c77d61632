//! Canonical pretty printer
//!
//! Prints the tree with minimal parentheses: an expression is wrapped only when its binding
//! power is lower than what its position requires. Literals are printed from their raw source
//! text, so `0xFF` stays `0xFF` and quote style is preserved.
//!
//! Printed output always re-parses to a structurally identical tree.

use crate::live::ast::{
    ArrowBody, Expression, ForInit, Identifier, MemberProperty, Program, PropertyKey, Statement,
    VariableDeclaration,
};

const ASSIGNMENT: u8 = 1;
const CONDITIONAL: u8 = 2;
const LOGICAL_OR: u8 = 3;
const UNARY: u8 = 9;
const POSTFIX: u8 = 10;
const CALL: u8 = 11;
const PRIMARY: u8 = 12;

/// Printer settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrintOptions {
    /// One level of indentation
    pub indent: String,
}

impl Default for PrintOptions {
    fn default() -> Self {
        Self {
            indent: "  ".to_string(),
        }
    }
}

/// Print a whole program, one top-level statement per line
pub fn print_program(program: &Program, options: &PrintOptions) -> String {
    let printer = Printer { options };
    let mut output = String::new();
    for statement in &program.body {
        output.push_str(&printer.statement(statement, 0));
        output.push('\n');
    }
    output
}

/// Print a single expression at the top indentation level
pub fn print_expression(expression: &Expression, options: &PrintOptions) -> String {
    Printer { options }.expression(expression, ASSIGNMENT, 0)
}

struct Printer<'a> {
    options: &'a PrintOptions,
}

impl Printer<'_> {
    fn indentation(&self, depth: usize) -> String {
        self.options.indent.repeat(depth)
    }

    fn block(&self, statements: &[Statement], depth: usize) -> String {
        if statements.is_empty() {
            return "{}".to_string();
        }
        let mut output = String::from("{\n");
        for statement in statements {
            output.push_str(&self.indentation(depth + 1));
            output.push_str(&self.statement(statement, depth + 1));
            output.push('\n');
        }
        output.push_str(&self.indentation(depth));
        output.push('}');
        output
    }

    fn statement(&self, statement: &Statement, depth: usize) -> String {
        match statement {
            Statement::Variable(declaration) => {
                format!("{};", self.declaration(declaration, depth))
            }
            Statement::Function(function) => format!(
                "function {}({}) {}",
                function.id.name,
                params(&function.params),
                self.block(&function.body, depth)
            ),
            Statement::Expression(expression) => {
                let text = self.expression(expression, ASSIGNMENT, depth);
                if starts_ambiguously(&text) {
                    format!("({});", text)
                } else {
                    format!("{};", text)
                }
            }
            Statement::Block(body) => self.block(body, depth),
            Statement::If {
                test,
                consequent,
                alternate,
            } => {
                let mut output = format!(
                    "if ({}) {}",
                    self.expression(test, ASSIGNMENT, depth),
                    self.statement(consequent, depth)
                );
                if let Some(alternate) = alternate {
                    output.push_str(" else ");
                    output.push_str(&self.statement(alternate, depth));
                }
                output
            }
            Statement::For {
                init,
                test,
                update,
                body,
            } => {
                let init = match init {
                    Some(ForInit::Variable(declaration)) => self.declaration(declaration, depth),
                    Some(ForInit::Expression(expression)) => {
                        self.expression(expression, ASSIGNMENT, depth)
                    }
                    None => String::new(),
                };
                let test = self.optional(test.as_ref(), depth);
                let update = self.optional(update.as_ref(), depth);
                format!(
                    "for ({}; {}; {}) {}",
                    init,
                    test,
                    update,
                    self.statement(body, depth)
                )
            }
            Statement::While { test, body } => format!(
                "while ({}) {}",
                self.expression(test, ASSIGNMENT, depth),
                self.statement(body, depth)
            ),
            Statement::Return(None) => "return;".to_string(),
            Statement::Return(Some(argument)) => {
                format!("return {};", self.expression(argument, ASSIGNMENT, depth))
            }
            Statement::Break => "break;".to_string(),
            Statement::Continue => "continue;".to_string(),
            Statement::Empty => ";".to_string(),
        }
    }

    fn optional(&self, expression: Option<&Expression>, depth: usize) -> String {
        expression
            .map(|expression| self.expression(expression, ASSIGNMENT, depth))
            .unwrap_or_default()
    }

    fn declaration(&self, declaration: &VariableDeclaration, depth: usize) -> String {
        let declarators: Vec<String> = declaration
            .declarators
            .iter()
            .map(|declarator| match &declarator.init {
                Some(init) => format!(
                    "{} = {}",
                    declarator.id.name,
                    self.expression(init, ASSIGNMENT, depth)
                ),
                None => declarator.id.name.clone(),
            })
            .collect();
        format!("{} {}", declaration.kind.as_str(), declarators.join(", "))
    }

    /// Print `expression`, parenthesized if it binds looser than `min_precedence`
    fn expression(&self, expression: &Expression, min_precedence: u8, depth: usize) -> String {
        let text = self.bare_expression(expression, depth);
        if precedence(expression) < min_precedence {
            format!("({})", text)
        } else {
            text
        }
    }

    fn bare_expression(&self, expression: &Expression, depth: usize) -> String {
        match expression {
            Expression::Literal(literal) => literal.raw.clone(),
            Expression::Identifier(identifier) => identifier.name.clone(),
            Expression::This => "this".to_string(),
            Expression::Array(elements) => format!("[{}]", self.list(elements, depth)),
            Expression::Object(properties) => {
                if properties.is_empty() {
                    return "{}".to_string();
                }
                let properties: Vec<String> = properties
                    .iter()
                    .map(|property| {
                        let key = match &property.key {
                            PropertyKey::Identifier(text)
                            | PropertyKey::String(text)
                            | PropertyKey::Number(text) => text,
                        };
                        format!(
                            "{}: {}",
                            key,
                            self.expression(&property.value, ASSIGNMENT, depth)
                        )
                    })
                    .collect();
                format!("{{ {} }}", properties.join(", "))
            }
            Expression::Function(function) => {
                let name = function
                    .id
                    .as_ref()
                    .map(|id| format!(" {}", id.name))
                    .unwrap_or_default();
                format!(
                    "function{}({}) {}",
                    name,
                    params(&function.params),
                    self.block(&function.body, depth)
                )
            }
            Expression::Arrow { params: list, body } => {
                let body = match body {
                    ArrowBody::Block(statements) => self.block(statements, depth),
                    ArrowBody::Expression(expression) => {
                        let text = self.expression(expression, ASSIGNMENT, depth);
                        if text.starts_with('{') {
                            format!("({})", text)
                        } else {
                            text
                        }
                    }
                };
                format!("({}) => {}", params(list), body)
            }
            Expression::Unary { operator, argument } => {
                let operator = operator.to_string();
                let argument = self.expression(argument, UNARY, depth);
                join_prefix(&operator, &argument)
            }
            Expression::Update {
                operator,
                prefix: true,
                argument,
            } => join_prefix(&operator.to_string(), &self.expression(argument, UNARY, depth)),
            Expression::Update {
                operator,
                prefix: false,
                argument,
            } => format!("{}{}", self.expression(argument, CALL, depth), operator),
            Expression::Binary {
                operator,
                left,
                right,
            } => {
                let level = operator.precedence();
                format!(
                    "{} {} {}",
                    self.expression(left, level, depth),
                    operator,
                    self.expression(right, level + 1, depth)
                )
            }
            Expression::Assignment {
                operator,
                target,
                value,
            } => format!(
                "{} {} {}",
                self.expression(target, CALL, depth),
                operator,
                self.expression(value, ASSIGNMENT, depth)
            ),
            Expression::Conditional {
                test,
                consequent,
                alternate,
            } => format!(
                "{} ? {} : {}",
                self.expression(test, LOGICAL_OR, depth),
                self.expression(consequent, ASSIGNMENT, depth),
                self.expression(alternate, ASSIGNMENT, depth)
            ),
            Expression::Call { callee, arguments } => format!(
                "{}({})",
                self.expression(callee, CALL, depth),
                self.list(arguments, depth)
            ),
            Expression::New { callee, arguments } => {
                let callee_text = self.expression(callee, CALL, depth);
                let callee_text = if contains_call(callee) {
                    format!("({})", callee_text)
                } else {
                    callee_text
                };
                format!("new {}({})", callee_text, self.list(arguments, depth))
            }
            Expression::Member { object, property } => {
                let object = self.expression(object, CALL, depth);
                match property {
                    MemberProperty::Named(name) => format!("{}.{}", object, name.name),
                    MemberProperty::Computed(property) => format!(
                        "{}[{}]",
                        object,
                        self.expression(property, ASSIGNMENT, depth)
                    ),
                }
            }
        }
    }

    fn list(&self, expressions: &[Expression], depth: usize) -> String {
        expressions
            .iter()
            .map(|expression| self.expression(expression, ASSIGNMENT, depth))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

fn precedence(expression: &Expression) -> u8 {
    match expression {
        Expression::Assignment { .. } | Expression::Arrow { .. } => ASSIGNMENT,
        Expression::Conditional { .. } => CONDITIONAL,
        Expression::Binary { operator, .. } => operator.precedence(),
        Expression::Unary { .. } | Expression::Update { prefix: true, .. } => UNARY,
        Expression::Update { prefix: false, .. } => POSTFIX,
        Expression::Call { .. } | Expression::New { .. } | Expression::Member { .. } => CALL,
        Expression::Literal(_)
        | Expression::Identifier(_)
        | Expression::This
        | Expression::Array(_)
        | Expression::Object(_)
        | Expression::Function(_) => PRIMARY,
    }
}

/// A `new` callee may not contain a call outside parentheses: `new (f())()` is not `new f()()`
fn contains_call(callee: &Expression) -> bool {
    match callee {
        Expression::Call { .. } | Expression::New { .. } => true,
        Expression::Member { object, .. } => contains_call(object),
        _ => false,
    }
}

/// Prefix operators need a space when the operand would otherwise fuse into another token
fn join_prefix(operator: &str, argument: &str) -> String {
    let fuses = operator.chars().all(char::is_alphabetic)
        || matches!(
            (operator.chars().last(), argument.chars().next()),
            (Some(last), Some(first)) if last == first && matches!(last, '+' | '-')
        );
    if fuses {
        format!("{} {}", operator, argument)
    } else {
        format!("{}{}", operator, argument)
    }
}

/// Statements may not start with `{` or the `function` keyword without changing meaning
fn starts_ambiguously(text: &str) -> bool {
    if text.starts_with('{') {
        return true;
    }
    match text.strip_prefix("function") {
        Some(rest) => !rest.starts_with(|c: char| c.is_alphanumeric() || c == '_' || c == '$'),
        None => false,
    }
}

fn params(params: &[Identifier]) -> String {
    params
        .iter()
        .map(|param| param.name.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::live::parsing::parse_program;

    fn reprint(source: &str) -> String {
        let program = parse_program(source).expect("parse failed");
        print_program(&program, &PrintOptions::default())
    }

    #[test]
    fn test_prints_declarations_and_calls() {
        insta::assert_snapshot!(reprint("let a=1;const b='x',c;console.log(a,b)"), @r###"
        let a = 1;
        const b = 'x', c;
        console.log(a, b);
        "###);
    }

    #[test]
    fn test_prints_nested_blocks() {
        insta::assert_snapshot!(reprint("function draw(){for(let i=0;i<3;i++){if(i){f(i)}else g()}}"), @r###"
        function draw() {
          for (let i = 0; i < 3; i++) {
            if (i) {
              f(i);
            } else g();
          }
        }
        "###);
    }

    #[test]
    fn test_minimal_parentheses() {
        insta::assert_snapshot!(reprint("(1 + 2) * 3; 1 + (2 * 3); a - (b - c); (a - b) - c;"), @r###"
        (1 + 2) * 3;
        1 + 2 * 3;
        a - (b - c);
        a - b - c;
        "###);
    }

    #[test]
    fn test_prefix_operators_do_not_fuse() {
        insta::assert_snapshot!(reprint("-(-x); +(+y); !(!z); typeof w; - (--v);"), @r###"
        - -x;
        + +y;
        !!z;
        typeof w;
        - --v;
        "###);
    }

    #[test]
    fn test_ambiguous_statement_starts_are_wrapped() {
        insta::assert_snapshot!(reprint("({ a: 1 }).a; (function () {})(); f = () => ({});"), @r###"
        ({ a: 1 }.a);
        (function() {}());
        f = () => ({});
        "###);
    }

    #[test]
    fn test_new_callee_with_call_is_wrapped() {
        insta::assert_snapshot!(reprint("new (f())(); new a.B(1); new C;"), @r###"
        new (f())();
        new a.B(1);
        new C();
        "###);
    }

    #[test]
    fn test_custom_indent() {
        let program = parse_program("if (a) { b(); }").expect("parse failed");
        let options = PrintOptions {
            indent: "\t".to_string(),
        };
        assert_eq!(print_program(&program, &options), "if (a) {\n\tb();\n}\n");
    }

    #[test]
    fn test_print_expression() {
        let program = parse_program("x = a ? b : c;").expect("parse failed");
        let Statement::Expression(expression) = &program.body[0] else {
            panic!("expected expression statement");
        };
        assert_eq!(
            print_expression(expression, &PrintOptions::default()),
            "x = a ? b : c"
        );
    }

    #[test]
    fn test_printed_output_reparses_to_the_same_tree() {
        let sources = [
            "let p = new Particle(1, -2).move(3)[0]++;",
            "x => ({ a: [1, 'two', null] });",
            "a = b = c ? d : e ? f : g;",
            "while (!done) { i += 2; if (i > 10) break; else continue; }",
            "for (;;) ;",
            "(a || b) && c;",
        ];
        for source in sources {
            let first = parse_program(source).expect("parse failed");
            let printed = print_program(&first, &PrintOptions::default());
            let second = parse_program(&printed).expect("reparse failed");
            let reprinted = print_program(&second, &PrintOptions::default());
            assert_eq!(printed, reprinted, "printing is not stable for {:?}", source);
        }
    }
}
