//! Parser combinators for the sketch language.
//!
//! Statements and expressions are mutually recursive (function bodies are statement blocks,
//! statements contain expressions), so the expression grammar is built inside the statement
//! recursion and receives the block parser as an argument.
//!
//! Expression precedence, loosest first:
//!
//!     arrow / assignment  →  conditional  →  ||  →  &&  →  equality  →  relational
//!     →  additive  →  multiplicative  →  prefix  →  postfix  →  call / member / new  →  primary

use chumsky::error::SimpleReason;
use chumsky::prelude::*;
use std::ops::Range as ByteRange;
use std::sync::Arc;

use crate::live::ast::{
    ArrowBody, AssignmentOperator, BinaryOperator, DeclarationKind, Expression, ForInit,
    Function, FunctionDeclaration, Identifier, Literal, LiteralValue, MemberProperty, Program,
    Property, PropertyKey, SourceLocation, Statement, UnaryOperator, UpdateOperator,
    VariableDeclaration, VariableDeclarator,
};
use crate::live::error::ParseError;
use crate::live::lexing::Token;

type Span = ByteRange<usize>;

/// Type alias for parser error
pub(crate) type TokenError = Simple<Token>;

type Boxed<O> = BoxedParser<'static, Token, O, TokenError>;

/// Whole-program parser; all input must be consumed
pub(crate) fn program(
    locator: Arc<SourceLocation>,
) -> impl Parser<Token, Program, Error = TokenError> {
    statement(locator)
        .repeated()
        .then_ignore(end())
        .map(|body| Program { body })
}

/// Convert chumsky errors into a single located [`ParseError`] (the first one reported)
pub(crate) fn to_parse_error(errors: Vec<TokenError>, locator: &SourceLocation) -> ParseError {
    match errors.into_iter().next() {
        Some(error) => {
            let location = locator.byte_range_to_ast_range(&error.span());
            ParseError::new(describe(&error), location)
        }
        None => ParseError::new("parse failed", Default::default()),
    }
}

fn describe(error: &TokenError) -> String {
    if let SimpleReason::Custom(message) = error.reason() {
        return message.clone();
    }

    let found = match error.found() {
        Some(token) => format!("`{}`", token),
        None => "end of input".to_string(),
    };
    let mut expected: Vec<String> = error
        .expected()
        .map(|token| match token {
            Some(token) => format!("`{}`", token),
            None => "end of input".to_string(),
        })
        .collect();
    expected.sort();
    expected.dedup();

    let mut message = match error.reason() {
        SimpleReason::Unclosed { delimiter, .. } => format!("unclosed `{}`", delimiter),
        _ => format!("unexpected {}", found),
    };
    if let Some(label) = error.label() {
        message.push_str(&format!(" while parsing {}", label));
    }
    if !expected.is_empty() {
        message.push_str(&format!(", expected {}", expected.join(" or ")));
    }
    message
}

fn identifier(locator: Arc<SourceLocation>) -> impl Parser<Token, Identifier, Error = TokenError> + Clone {
    select! { Token::Identifier(name) => name }
        .map_with_span(move |name, span: Span| Identifier {
            name,
            location: locator.byte_range_to_ast_range(&span),
        })
        .labelled("identifier")
}

fn literal(locator: Arc<SourceLocation>) -> impl Parser<Token, Literal, Error = TokenError> + Clone {
    let keyword = select! {
        Token::Null => (LiteralValue::Null, "null".to_string()),
        Token::True => (LiteralValue::Boolean(true), "true".to_string()),
        Token::False => (LiteralValue::Boolean(false), "false".to_string()),
    };

    let number = select! { Token::Number(raw) => raw }.try_map(|raw: String, span: Span| {
        match parse_number(&raw) {
            Some(value) => Ok((LiteralValue::Number(value), raw)),
            None => Err(Simple::custom(span, format!("invalid number `{}`", raw))),
        }
    });

    let string =
        select! { Token::Str(raw) => raw }.map(|raw: String| (LiteralValue::String(unescape(&raw)), raw));

    choice((keyword, number, string))
        .map_with_span(move |(value, raw), span: Span| Literal {
            value,
            raw,
            location: locator.byte_range_to_ast_range(&span),
        })
        .labelled("literal")
}

fn statement(locator: Arc<SourceLocation>) -> impl Parser<Token, Statement, Error = TokenError> + Clone {
    recursive(move |statement| {
        let block: Boxed<Vec<Statement>> = statement
            .clone()
            .repeated()
            .delimited_by(just(Token::OpenBrace), just(Token::CloseBrace))
            .boxed();
        let expr = expression(locator.clone(), block.clone());
        let ident = identifier(locator.clone());
        let semicolon = just(Token::Semicolon).or_not().ignored();
        let parenthesized = expr
            .clone()
            .delimited_by(just(Token::OpenParen), just(Token::CloseParen));

        let declaration_kind = choice((
            just(Token::Var).to(DeclarationKind::Var),
            just(Token::Let).to(DeclarationKind::Let),
            just(Token::Const).to(DeclarationKind::Const),
        ));
        let declarator = ident
            .clone()
            .then(just(Token::Assign).ignore_then(expr.clone()).or_not())
            .map(|(id, init)| VariableDeclarator { id, init });
        let declaration = declaration_kind
            .then(declarator.separated_by(just(Token::Comma)).at_least(1))
            .map(|(kind, declarators)| VariableDeclaration { kind, declarators })
            .boxed();

        let variable = declaration
            .clone()
            .then_ignore(semicolon.clone())
            .map(Statement::Variable);

        let function = just(Token::Function)
            .ignore_then(ident.clone())
            .then(parameters(ident.clone()))
            .then(block.clone())
            .map(|((id, params), body)| {
                Statement::Function(FunctionDeclaration { id, params, body })
            });

        let if_statement = just(Token::If)
            .ignore_then(parenthesized.clone())
            .then(statement.clone())
            .then(just(Token::Else).ignore_then(statement.clone()).or_not())
            .map(|((test, consequent), alternate)| Statement::If {
                test,
                consequent: Box::new(consequent),
                alternate: alternate.map(Box::new),
            });

        let for_init = declaration
            .map(ForInit::Variable)
            .or(expr.clone().map(ForInit::Expression));
        let for_statement = just(Token::For)
            .ignore_then(
                for_init
                    .or_not()
                    .then_ignore(just(Token::Semicolon))
                    .then(expr.clone().or_not())
                    .then_ignore(just(Token::Semicolon))
                    .then(expr.clone().or_not())
                    .delimited_by(just(Token::OpenParen), just(Token::CloseParen)),
            )
            .then(statement.clone())
            .map(|(((init, test), update), body)| Statement::For {
                init,
                test,
                update,
                body: Box::new(body),
            });

        let while_statement = just(Token::While)
            .ignore_then(parenthesized)
            .then(statement.clone())
            .map(|(test, body)| Statement::While {
                test,
                body: Box::new(body),
            });

        let return_statement = just(Token::Return)
            .ignore_then(expr.clone().or_not())
            .then_ignore(semicolon.clone())
            .map(Statement::Return);

        let break_statement = just(Token::Break)
            .then_ignore(semicolon.clone())
            .to(Statement::Break);
        let continue_statement = just(Token::Continue)
            .then_ignore(semicolon.clone())
            .to(Statement::Continue);

        let empty = just(Token::Semicolon).to(Statement::Empty);

        let expression_statement = expr.then_ignore(semicolon).map(Statement::Expression);

        choice((
            variable,
            function,
            if_statement,
            for_statement,
            while_statement,
            return_statement,
            break_statement,
            continue_statement,
            block.map(Statement::Block),
            empty,
            expression_statement,
        ))
        .labelled("statement")
    })
}

fn parameters(ident: impl Parser<Token, Identifier, Error = TokenError> + Clone + 'static) -> Boxed<Vec<Identifier>> {
    ident
        .separated_by(just(Token::Comma))
        .allow_trailing()
        .delimited_by(just(Token::OpenParen), just(Token::CloseParen))
        .boxed()
}

/// What can follow a callee or object in a call/member chain
#[derive(Debug, Clone)]
enum Suffix {
    Call(Vec<Expression>),
    Named(Identifier),
    Computed(Expression),
}

fn apply_suffix(target: Expression, suffix: Suffix) -> Expression {
    match suffix {
        Suffix::Call(arguments) => Expression::Call {
            callee: Box::new(target),
            arguments,
        },
        Suffix::Named(name) => Expression::Member {
            object: Box::new(target),
            property: MemberProperty::Named(name),
        },
        Suffix::Computed(property) => Expression::Member {
            object: Box::new(target),
            property: MemberProperty::Computed(Box::new(property)),
        },
    }
}

#[derive(Debug, Clone)]
enum Prefix {
    Unary(UnaryOperator),
    Update(UpdateOperator),
}

fn binary_level<P, O>(operand: P, operator: O) -> Boxed<Expression>
where
    P: Parser<Token, Expression, Error = TokenError> + Clone + 'static,
    O: Parser<Token, BinaryOperator, Error = TokenError> + Clone + 'static,
{
    operand
        .clone()
        .then(operator.then(operand).repeated())
        .foldl(|left, (operator, right)| Expression::Binary {
            operator,
            left: Box::new(left),
            right: Box::new(right),
        })
        .boxed()
}

fn is_assignable(target: &Expression) -> bool {
    matches!(target, Expression::Identifier(_) | Expression::Member { .. })
}

fn expression(
    locator: Arc<SourceLocation>,
    block: Boxed<Vec<Statement>>,
) -> impl Parser<Token, Expression, Error = TokenError> + Clone {
    recursive(move |expr| {
        let ident = identifier(locator.clone());
        let params = parameters(ident.clone());

        let arguments = expr
            .clone()
            .separated_by(just(Token::Comma))
            .allow_trailing()
            .delimited_by(just(Token::OpenParen), just(Token::CloseParen))
            .boxed();

        let array = expr
            .clone()
            .separated_by(just(Token::Comma))
            .allow_trailing()
            .delimited_by(just(Token::OpenBracket), just(Token::CloseBracket))
            .map(Expression::Array);

        let property_key = select! {
            Token::Identifier(name) => PropertyKey::Identifier(name),
            Token::Str(raw) => PropertyKey::String(raw),
            Token::Number(raw) => PropertyKey::Number(raw),
        };
        let object = property_key
            .then_ignore(just(Token::Colon))
            .then(expr.clone())
            .map(|(key, value)| Property { key, value })
            .separated_by(just(Token::Comma))
            .allow_trailing()
            .delimited_by(just(Token::OpenBrace), just(Token::CloseBrace))
            .map(Expression::Object);

        let function = just(Token::Function)
            .ignore_then(ident.clone().or_not())
            .then(params.clone())
            .then(block.clone())
            .map(|((id, params), body)| Expression::Function(Function { id, params, body }));

        let primary = choice((
            literal(locator.clone()).map(Expression::Literal),
            ident.clone().map(Expression::Identifier),
            just(Token::This).to(Expression::This),
            expr.clone()
                .delimited_by(just(Token::OpenParen), just(Token::CloseParen)),
            array,
            object,
            function,
        ))
        .boxed();

        let member_suffix = just(Token::Dot)
            .ignore_then(ident.clone())
            .map(Suffix::Named)
            .or(expr
                .clone()
                .delimited_by(just(Token::OpenBracket), just(Token::CloseBracket))
                .map(Suffix::Computed));

        let new_callee = primary
            .clone()
            .then(member_suffix.clone().repeated())
            .foldl(apply_suffix);
        let new_expression = just(Token::New)
            .ignore_then(new_callee)
            .then(arguments.clone().or_not())
            .map(|(callee, arguments)| Expression::New {
                callee: Box::new(callee),
                arguments: arguments.unwrap_or_default(),
            });

        let call_member = new_expression
            .or(primary)
            .then(
                arguments
                    .map(Suffix::Call)
                    .or(member_suffix)
                    .repeated(),
            )
            .foldl(apply_suffix)
            .boxed();

        let update_operator = just(Token::PlusPlus)
            .to(UpdateOperator::Increment)
            .or(just(Token::MinusMinus).to(UpdateOperator::Decrement));

        let postfix = call_member
            .then(update_operator.clone().or_not())
            .map(|(argument, operator)| match operator {
                Some(operator) => Expression::Update {
                    operator,
                    prefix: false,
                    argument: Box::new(argument),
                },
                None => argument,
            });

        let prefix = choice((
            just(Token::Bang).to(Prefix::Unary(UnaryOperator::Not)),
            just(Token::Minus).to(Prefix::Unary(UnaryOperator::Minus)),
            just(Token::Plus).to(Prefix::Unary(UnaryOperator::Plus)),
            just(Token::Typeof).to(Prefix::Unary(UnaryOperator::Typeof)),
            update_operator.map(Prefix::Update),
        ));

        let unary = prefix
            .repeated()
            .then(postfix)
            .foldr(|prefix, argument| match prefix {
                Prefix::Unary(operator) => Expression::Unary {
                    operator,
                    argument: Box::new(argument),
                },
                Prefix::Update(operator) => Expression::Update {
                    operator,
                    prefix: true,
                    argument: Box::new(argument),
                },
            })
            .boxed();

        let product = binary_level(
            unary,
            choice((
                just(Token::Star).to(BinaryOperator::Multiply),
                just(Token::Slash).to(BinaryOperator::Divide),
                just(Token::Percent).to(BinaryOperator::Remainder),
            )),
        );
        let sum = binary_level(
            product,
            choice((
                just(Token::Plus).to(BinaryOperator::Add),
                just(Token::Minus).to(BinaryOperator::Subtract),
            )),
        );
        let relational = binary_level(
            sum,
            choice((
                just(Token::Less).to(BinaryOperator::Less),
                just(Token::Greater).to(BinaryOperator::Greater),
                just(Token::LessEq).to(BinaryOperator::LessOrEqual),
                just(Token::GreaterEq).to(BinaryOperator::GreaterOrEqual),
            )),
        );
        let equality = binary_level(
            relational,
            choice((
                just(Token::EqEq).to(BinaryOperator::Equal),
                just(Token::NotEq).to(BinaryOperator::NotEqual),
                just(Token::EqEqEq).to(BinaryOperator::StrictEqual),
                just(Token::NotEqEq).to(BinaryOperator::StrictNotEqual),
            )),
        );
        let and = binary_level(equality, just(Token::AndAnd).to(BinaryOperator::And));
        let or = binary_level(and, just(Token::OrOr).to(BinaryOperator::Or));

        let conditional = or
            .then(
                just(Token::Question)
                    .ignore_then(expr.clone())
                    .then_ignore(just(Token::Colon))
                    .then(expr.clone())
                    .or_not(),
            )
            .map(|(test, branches)| match branches {
                Some((consequent, alternate)) => Expression::Conditional {
                    test: Box::new(test),
                    consequent: Box::new(consequent),
                    alternate: Box::new(alternate),
                },
                None => test,
            });

        let assignment_operator = choice((
            just(Token::Assign).to(AssignmentOperator::Assign),
            just(Token::PlusAssign).to(AssignmentOperator::AddAssign),
            just(Token::MinusAssign).to(AssignmentOperator::SubtractAssign),
            just(Token::StarAssign).to(AssignmentOperator::MultiplyAssign),
            just(Token::SlashAssign).to(AssignmentOperator::DivideAssign),
            just(Token::PercentAssign).to(AssignmentOperator::RemainderAssign),
        ));

        let assignment = conditional
            .then(assignment_operator.then(expr.clone()).or_not())
            .try_map(|(target, assigned), span: Span| match assigned {
                None => Ok(target),
                Some((operator, value)) if is_assignable(&target) => {
                    Ok(Expression::Assignment {
                        operator,
                        target: Box::new(target),
                        value: Box::new(value),
                    })
                }
                Some(_) => Err(Simple::custom(span, "invalid assignment target")),
            });

        let arrow_params = ident.map(|id| vec![id]).or(params);
        let arrow_body = block
            .clone()
            .map(ArrowBody::Block)
            .or(expr.map(|body| ArrowBody::Expression(Box::new(body))));
        let arrow = arrow_params
            .then_ignore(just(Token::Arrow))
            .then(arrow_body)
            .map(|(params, body)| Expression::Arrow { params, body });

        arrow.or(assignment).labelled("expression")
    })
}

fn parse_number(raw: &str) -> Option<f64> {
    if let Some(hex) = raw.strip_prefix("0x").or_else(|| raw.strip_prefix("0X")) {
        return u64::from_str_radix(hex, 16).ok().map(|value| value as f64);
    }
    raw.parse::<f64>().ok()
}

/// Decode the escapes of a quoted string token (quotes included in `raw`)
fn unescape(raw: &str) -> String {
    let inner = &raw[1..raw.len() - 1];
    let mut value = String::with_capacity(inner.len());
    let mut chars = inner.chars();

    while let Some(ch) = chars.next() {
        if ch != '\\' {
            value.push(ch);
            continue;
        }
        match chars.next() {
            Some('n') => value.push('\n'),
            Some('t') => value.push('\t'),
            Some('r') => value.push('\r'),
            Some('b') => value.push('\u{8}'),
            Some('f') => value.push('\u{c}'),
            Some('v') => value.push('\u{b}'),
            Some('0') => value.push('\0'),
            Some('u') => {
                let hex: String = chars.by_ref().take(4).collect();
                match u32::from_str_radix(&hex, 16).ok().and_then(char::from_u32) {
                    Some(decoded) => value.push(decoded),
                    None => {
                        value.push('u');
                        value.push_str(&hex);
                    }
                }
            }
            Some(other) => value.push(other),
            None => {}
        }
    }

    value
}
