//! Syntax tree node types
//!
//! The tree is a closed set of tagged variants. Every consumer (printer, literal walker,
//! structural differ) matches exhaustively on them, so adding a node kind is a compile error
//! everywhere it has to be handled.
//!
//! Only [`Literal`] and [`Identifier`] carry a source [`Range`]: those are the only locations
//! key derivation needs.

use super::range::Range;
use std::fmt;

/// A whole program: the root of the tree
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Program {
    pub body: Vec<Statement>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    Variable(VariableDeclaration),
    Function(FunctionDeclaration),
    Expression(Expression),
    Block(Vec<Statement>),
    If {
        test: Expression,
        consequent: Box<Statement>,
        alternate: Option<Box<Statement>>,
    },
    For {
        init: Option<ForInit>,
        test: Option<Expression>,
        update: Option<Expression>,
        body: Box<Statement>,
    },
    While {
        test: Expression,
        body: Box<Statement>,
    },
    Return(Option<Expression>),
    Break,
    Continue,
    Empty,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ForInit {
    Variable(VariableDeclaration),
    Expression(Expression),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeclarationKind {
    Var,
    Let,
    Const,
}

impl DeclarationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeclarationKind::Var => "var",
            DeclarationKind::Let => "let",
            DeclarationKind::Const => "const",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct VariableDeclaration {
    pub kind: DeclarationKind,
    pub declarators: Vec<VariableDeclarator>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct VariableDeclarator {
    pub id: Identifier,
    pub init: Option<Expression>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FunctionDeclaration {
    pub id: Identifier,
    pub params: Vec<Identifier>,
    pub body: Vec<Statement>,
}

/// Anonymous or named `function` expression
#[derive(Debug, Clone, PartialEq)]
pub struct Function {
    pub id: Option<Identifier>,
    pub params: Vec<Identifier>,
    pub body: Vec<Statement>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ArrowBody {
    Expression(Box<Expression>),
    Block(Vec<Statement>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Identifier {
    pub name: String,
    pub location: Range,
}

impl Identifier {
    /// An identifier with no source location (synthesized by a rewrite)
    pub fn synthetic(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            location: Range::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Literal {
    pub value: LiteralValue,
    /// Source text of the literal, quotes included
    pub raw: String,
    pub location: Range,
}

#[derive(Debug, Clone, PartialEq)]
pub enum LiteralValue {
    Null,
    Boolean(bool),
    Number(f64),
    String(String),
}

impl LiteralValue {
    /// JSON form of the value; `None` for numbers JSON cannot carry (infinities)
    pub fn to_json(&self) -> Option<serde_json::Value> {
        match self {
            LiteralValue::Null => Some(serde_json::Value::Null),
            LiteralValue::Boolean(value) => Some(serde_json::Value::Bool(*value)),
            LiteralValue::Number(value) => number_to_json(*value),
            LiteralValue::String(value) => Some(serde_json::Value::String(value.clone())),
        }
    }
}

fn number_to_json(value: f64) -> Option<serde_json::Value> {
    if value.fract() == 0.0 && value.abs() < 9_007_199_254_740_992.0 {
        return Some(serde_json::Value::from(value as i64));
    }
    serde_json::Number::from_f64(value).map(serde_json::Value::Number)
}

#[derive(Debug, Clone, PartialEq)]
pub struct Property {
    pub key: PropertyKey,
    pub value: Expression,
}

/// Object literal keys are plain attributes, not literal sites
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PropertyKey {
    Identifier(String),
    /// Quoted key, kept raw (quotes included)
    String(String),
    Number(String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum MemberProperty {
    Named(Identifier),
    Computed(Box<Expression>),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    Literal(Literal),
    Identifier(Identifier),
    This,
    Array(Vec<Expression>),
    Object(Vec<Property>),
    Function(Function),
    Arrow {
        params: Vec<Identifier>,
        body: ArrowBody,
    },
    Unary {
        operator: UnaryOperator,
        argument: Box<Expression>,
    },
    Update {
        operator: UpdateOperator,
        prefix: bool,
        argument: Box<Expression>,
    },
    Binary {
        operator: BinaryOperator,
        left: Box<Expression>,
        right: Box<Expression>,
    },
    Assignment {
        operator: AssignmentOperator,
        target: Box<Expression>,
        value: Box<Expression>,
    },
    Conditional {
        test: Box<Expression>,
        consequent: Box<Expression>,
        alternate: Box<Expression>,
    },
    Call {
        callee: Box<Expression>,
        arguments: Vec<Expression>,
    },
    New {
        callee: Box<Expression>,
        arguments: Vec<Expression>,
    },
    Member {
        object: Box<Expression>,
        property: MemberProperty,
    },
}

impl Expression {
    /// `object.name` member access with synthetic locations
    pub fn member(object: &str, name: &str) -> Self {
        Expression::Member {
            object: Box::new(Expression::Identifier(Identifier::synthetic(object))),
            property: MemberProperty::Named(Identifier::synthetic(name)),
        }
    }

    /// Whether this is `<table>.<key>`, i.e. a literal that has already been rewritten
    pub fn is_table_access(&self, table: &str) -> bool {
        matches!(
            self,
            Expression::Member {
                object,
                property: MemberProperty::Named(_),
            } if matches!(object.as_ref(), Expression::Identifier(id) if id.name == table)
        )
    }

    /// Node type name, for logs and diagnostics
    pub fn node_type(&self) -> &'static str {
        match self {
            Expression::Literal(_) => "Literal",
            Expression::Identifier(_) => "Identifier",
            Expression::This => "ThisExpression",
            Expression::Array(_) => "ArrayExpression",
            Expression::Object(_) => "ObjectExpression",
            Expression::Function(_) => "FunctionExpression",
            Expression::Arrow { .. } => "ArrowFunctionExpression",
            Expression::Unary { .. } => "UnaryExpression",
            Expression::Update { .. } => "UpdateExpression",
            Expression::Binary { .. } => "BinaryExpression",
            Expression::Assignment { .. } => "AssignmentExpression",
            Expression::Conditional { .. } => "ConditionalExpression",
            Expression::Call { .. } => "CallExpression",
            Expression::New { .. } => "NewExpression",
            Expression::Member { .. } => "MemberExpression",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOperator {
    Not,
    Minus,
    Plus,
    Typeof,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateOperator {
    Increment,
    Decrement,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOperator {
    Multiply,
    Divide,
    Remainder,
    Add,
    Subtract,
    Less,
    Greater,
    LessOrEqual,
    GreaterOrEqual,
    Equal,
    NotEqual,
    StrictEqual,
    StrictNotEqual,
    And,
    Or,
}

impl BinaryOperator {
    /// Binding power used by the printer; higher binds tighter
    pub fn precedence(&self) -> u8 {
        match self {
            BinaryOperator::Or => 3,
            BinaryOperator::And => 4,
            BinaryOperator::Equal
            | BinaryOperator::NotEqual
            | BinaryOperator::StrictEqual
            | BinaryOperator::StrictNotEqual => 5,
            BinaryOperator::Less
            | BinaryOperator::Greater
            | BinaryOperator::LessOrEqual
            | BinaryOperator::GreaterOrEqual => 6,
            BinaryOperator::Add | BinaryOperator::Subtract => 7,
            BinaryOperator::Multiply | BinaryOperator::Divide | BinaryOperator::Remainder => 8,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssignmentOperator {
    Assign,
    AddAssign,
    SubtractAssign,
    MultiplyAssign,
    DivideAssign,
    RemainderAssign,
}

impl fmt::Display for UnaryOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let symbol = match self {
            UnaryOperator::Not => "!",
            UnaryOperator::Minus => "-",
            UnaryOperator::Plus => "+",
            UnaryOperator::Typeof => "typeof",
        };
        f.write_str(symbol)
    }
}

impl fmt::Display for UpdateOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UpdateOperator::Increment => f.write_str("++"),
            UpdateOperator::Decrement => f.write_str("--"),
        }
    }
}

impl fmt::Display for BinaryOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let symbol = match self {
            BinaryOperator::Multiply => "*",
            BinaryOperator::Divide => "/",
            BinaryOperator::Remainder => "%",
            BinaryOperator::Add => "+",
            BinaryOperator::Subtract => "-",
            BinaryOperator::Less => "<",
            BinaryOperator::Greater => ">",
            BinaryOperator::LessOrEqual => "<=",
            BinaryOperator::GreaterOrEqual => ">=",
            BinaryOperator::Equal => "==",
            BinaryOperator::NotEqual => "!=",
            BinaryOperator::StrictEqual => "===",
            BinaryOperator::StrictNotEqual => "!==",
            BinaryOperator::And => "&&",
            BinaryOperator::Or => "||",
        };
        f.write_str(symbol)
    }
}

impl fmt::Display for AssignmentOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let symbol = match self {
            AssignmentOperator::Assign => "=",
            AssignmentOperator::AddAssign => "+=",
            AssignmentOperator::SubtractAssign => "-=",
            AssignmentOperator::MultiplyAssign => "*=",
            AssignmentOperator::DivideAssign => "/=",
            AssignmentOperator::RemainderAssign => "%=",
        };
        f.write_str(symbol)
    }
}
