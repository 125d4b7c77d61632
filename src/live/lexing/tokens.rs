//! Token definitions for the sketch language
//!
//! Tokens are produced by the logos derive macro. Whitespace and comments are skipped at this
//! level, so the parser never sees them; source layout only survives through token spans.
//!
//! Numbers and strings keep their raw source text. The raw text is what the printer re-emits and
//! what call-argument keys are derived from, so it must not be normalized here.

use logos::Logos;
use std::fmt;

#[derive(Logos, Debug, Clone, PartialEq, Eq, Hash)]
#[logos(skip r"[ \t\r\n\f]+")]
#[logos(skip r"//[^\n]*")]
#[logos(skip r"/\*([^*]|\*+[^*/])*\*+/")]
pub enum Token {
    // Keywords
    #[token("var")]
    Var,
    #[token("let")]
    Let,
    #[token("const")]
    Const,
    #[token("function")]
    Function,
    #[token("return")]
    Return,
    #[token("if")]
    If,
    #[token("else")]
    Else,
    #[token("for")]
    For,
    #[token("while")]
    While,
    #[token("break")]
    Break,
    #[token("continue")]
    Continue,
    #[token("new")]
    New,
    #[token("this")]
    This,
    #[token("typeof")]
    Typeof,
    #[token("true")]
    True,
    #[token("false")]
    False,
    #[token("null")]
    Null,

    #[regex(r"[A-Za-z_$][A-Za-z0-9_$]*", |lex| lex.slice().to_string())]
    Identifier(String),

    #[regex(r"[0-9]+(\.[0-9]+)?([eE][+-]?[0-9]+)?", |lex| lex.slice().to_string())]
    #[regex(r"\.[0-9]+([eE][+-]?[0-9]+)?", |lex| lex.slice().to_string())]
    #[regex(r"0[xX][0-9a-fA-F]+", |lex| lex.slice().to_string())]
    Number(String),

    #[regex(r#""([^"\\\n]|\\.)*""#, |lex| lex.slice().to_string())]
    #[regex(r#"'([^'\\\n]|\\.)*'"#, |lex| lex.slice().to_string())]
    Str(String),

    // Punctuation
    #[token("(")]
    OpenParen,
    #[token(")")]
    CloseParen,
    #[token("{")]
    OpenBrace,
    #[token("}")]
    CloseBrace,
    #[token("[")]
    OpenBracket,
    #[token("]")]
    CloseBracket,
    #[token(";")]
    Semicolon,
    #[token(",")]
    Comma,
    #[token(".")]
    Dot,
    #[token(":")]
    Colon,
    #[token("?")]
    Question,
    #[token("=>")]
    Arrow,

    // Operators
    #[token("=")]
    Assign,
    #[token("+=")]
    PlusAssign,
    #[token("-=")]
    MinusAssign,
    #[token("*=")]
    StarAssign,
    #[token("/=")]
    SlashAssign,
    #[token("%=")]
    PercentAssign,
    #[token("++")]
    PlusPlus,
    #[token("--")]
    MinusMinus,
    #[token("+")]
    Plus,
    #[token("-")]
    Minus,
    #[token("*")]
    Star,
    #[token("/")]
    Slash,
    #[token("%")]
    Percent,
    #[token("!")]
    Bang,
    #[token("==")]
    EqEq,
    #[token("!=")]
    NotEq,
    #[token("===")]
    EqEqEq,
    #[token("!==")]
    NotEqEq,
    #[token("<")]
    Less,
    #[token(">")]
    Greater,
    #[token("<=")]
    LessEq,
    #[token(">=")]
    GreaterEq,
    #[token("&&")]
    AndAnd,
    #[token("||")]
    OrOr,
}

impl Token {
    /// Check if this token is a reserved word
    pub fn is_keyword(&self) -> bool {
        matches!(
            self,
            Token::Var
                | Token::Let
                | Token::Const
                | Token::Function
                | Token::Return
                | Token::If
                | Token::Else
                | Token::For
                | Token::While
                | Token::Break
                | Token::Continue
                | Token::New
                | Token::This
                | Token::Typeof
                | Token::True
                | Token::False
                | Token::Null
        )
    }

    pub fn as_str(&self) -> &str {
        match self {
            Token::Var => "var",
            Token::Let => "let",
            Token::Const => "const",
            Token::Function => "function",
            Token::Return => "return",
            Token::If => "if",
            Token::Else => "else",
            Token::For => "for",
            Token::While => "while",
            Token::Break => "break",
            Token::Continue => "continue",
            Token::New => "new",
            Token::This => "this",
            Token::Typeof => "typeof",
            Token::True => "true",
            Token::False => "false",
            Token::Null => "null",
            Token::Identifier(text) | Token::Number(text) | Token::Str(text) => text,
            Token::OpenParen => "(",
            Token::CloseParen => ")",
            Token::OpenBrace => "{",
            Token::CloseBrace => "}",
            Token::OpenBracket => "[",
            Token::CloseBracket => "]",
            Token::Semicolon => ";",
            Token::Comma => ",",
            Token::Dot => ".",
            Token::Colon => ":",
            Token::Question => "?",
            Token::Arrow => "=>",
            Token::Assign => "=",
            Token::PlusAssign => "+=",
            Token::MinusAssign => "-=",
            Token::StarAssign => "*=",
            Token::SlashAssign => "/=",
            Token::PercentAssign => "%=",
            Token::PlusPlus => "++",
            Token::MinusMinus => "--",
            Token::Plus => "+",
            Token::Minus => "-",
            Token::Star => "*",
            Token::Slash => "/",
            Token::Percent => "%",
            Token::Bang => "!",
            Token::EqEq => "==",
            Token::NotEq => "!=",
            Token::EqEqEq => "===",
            Token::NotEqEq => "!==",
            Token::Less => "<",
            Token::Greater => ">",
            Token::LessEq => "<=",
            Token::GreaterEq => ">=",
            Token::AndAnd => "&&",
            Token::OrOr => "||",
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lex_all(source: &str) -> Vec<Token> {
        Token::lexer(source)
            .map(|result| result.expect("unexpected lex error"))
            .collect()
    }

    #[test]
    fn test_keywords_and_identifiers() {
        assert_eq!(
            lex_all("let letter = this"),
            vec![
                Token::Let,
                Token::Identifier("letter".to_string()),
                Token::Assign,
                Token::This,
            ]
        );
    }

    #[test]
    fn test_numbers_keep_raw_text() {
        assert_eq!(
            lex_all("1 2.50 .5 1e3 0xFF"),
            vec![
                Token::Number("1".to_string()),
                Token::Number("2.50".to_string()),
                Token::Number(".5".to_string()),
                Token::Number("1e3".to_string()),
                Token::Number("0xFF".to_string()),
            ]
        );
    }

    #[test]
    fn test_strings_keep_quotes() {
        assert_eq!(
            lex_all(r#"'a' "b\"c""#),
            vec![
                Token::Str("'a'".to_string()),
                Token::Str(r#""b\"c""#.to_string()),
            ]
        );
    }

    #[test]
    fn test_longest_operator_wins() {
        assert_eq!(
            lex_all("a === b !== c => d++"),
            vec![
                Token::Identifier("a".to_string()),
                Token::EqEqEq,
                Token::Identifier("b".to_string()),
                Token::NotEqEq,
                Token::Identifier("c".to_string()),
                Token::Arrow,
                Token::Identifier("d".to_string()),
                Token::PlusPlus,
            ]
        );
    }

    #[test]
    fn test_comments_are_skipped() {
        assert_eq!(
            lex_all("a // line\n/* block\n * more */ b"),
            vec![
                Token::Identifier("a".to_string()),
                Token::Identifier("b".to_string()),
            ]
        );
    }

    #[test]
    fn test_unknown_character_is_an_error() {
        let results: Vec<_> = Token::lexer("a # b").collect();
        assert!(results.iter().any(|r| r.is_err()));
    }
}
