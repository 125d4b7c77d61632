//! Lexer
//!
//!     Raw tokenization of sketch sources using the logos lexer. This is the entry point where
//!     source strings become token streams; the parser consumes the stream together with the
//!     byte span of every token.
//!
//!     Whitespace and comments never reach the parser. The only trace of layout left after
//!     lexing is the token spans, which the parser converts into line/column ranges for the
//!     nodes that need them.

pub mod tokens;

pub use tokens::Token;

use logos::Logos;
use std::ops::Range;
use thiserror::Error;

/// A character sequence no token matches
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unexpected input `{text}`")]
pub struct LexError {
    pub text: String,
    pub span: Range<usize>,
}

/// Tokenize source code with location information
///
/// Stops at the first unrecognized input. Sketch sources are re-lexed on every edit, so
/// reporting the first problem is enough for the caller to decide to keep the last good state.
pub fn tokenize(source: &str) -> Result<Vec<(Token, Range<usize>)>, LexError> {
    let mut lexer = Token::lexer(source);
    let mut tokens = Vec::new();

    while let Some(result) = lexer.next() {
        match result {
            Ok(token) => tokens.push((token, lexer.span())),
            Err(()) => {
                return Err(LexError {
                    text: lexer.slice().to_string(),
                    span: lexer.span(),
                })
            }
        }
    }

    Ok(tokens)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokenizes_with_spans() {
        let tokens = tokenize("let a = 1;").expect("lex failed");
        assert_eq!(
            tokens,
            vec![
                (Token::Let, 0..3),
                (Token::Identifier("a".to_string()), 4..5),
                (Token::Assign, 6..7),
                (Token::Number("1".to_string()), 8..9),
                (Token::Semicolon, 9..10),
            ]
        );
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(tokenize("").expect("lex failed"), vec![]);
        assert_eq!(tokenize("  \n// only a comment\n").expect("lex failed"), vec![]);
    }

    #[test]
    fn test_reports_first_bad_character() {
        let err = tokenize("let a = 1;\nlet b = #;").unwrap_err();
        assert_eq!(err.text, "#");
        assert_eq!(err.span, 19..20);
    }

    #[test]
    fn test_unterminated_string() {
        assert!(tokenize("let s = 'abc").is_err());
    }
}
