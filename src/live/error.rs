//! Error types for parsing and live sessions

use crate::live::ast::range::Range;
use crate::live::lexing::LexError;
use thiserror::Error;

#[cfg(test)]
use crate::live::ast::range::Position;

/// Result type alias using LiveError
pub type Result<T> = std::result::Result<T, LiveError>;

/// The source could not be turned into a syntax tree
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message} at {location}")]
pub struct ParseError {
    pub message: String,
    pub location: Range,
}

impl ParseError {
    pub fn new(message: impl Into<String>, location: Range) -> Self {
        Self {
            message: message.into(),
            location,
        }
    }

    /// The error message followed by the offending lines of `source`
    pub fn context(&self, source: &str) -> String {
        format!(
            "{}\n{}",
            self,
            format_source_context(source, &self.location)
        )
    }

    pub(crate) fn from_lex_error(error: LexError, source: &str) -> Self {
        let locator = crate::live::ast::range::SourceLocation::new(source);
        let location = locator.byte_range_to_ast_range(&error.span);
        Self::new(error.to_string(), location)
    }
}

/// Errors surfaced by [`LiveSession`](crate::live::session::LiveSession)
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LiveError {
    #[error(transparent)]
    Parse(#[from] ParseError),

    /// Structural comparison needs a baseline from a previous successful extraction
    #[error("no snapshot to compare against: extract a program first")]
    NoSnapshot,
}

/// Format source code context around an error location
///
/// Shows 2 lines before the error, the error line with >> marker, and 2 lines after.
/// All lines are numbered for easy reference.
pub fn format_source_context(source: &str, range: &Range) -> String {
    let lines: Vec<&str> = source.lines().collect();
    let error_line = range.start.line;

    let start_line = error_line.saturating_sub(2);
    let end_line = (error_line + 3).min(lines.len());

    let mut context = String::new();

    for (line_num, line) in lines.iter().enumerate().take(end_line).skip(start_line) {
        let marker = if line_num == error_line { ">>" } else { "  " };
        context.push_str(&format!("{} {:3} | {}\n", marker, line_num + 1, line));
    }

    context
}
