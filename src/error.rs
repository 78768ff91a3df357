//! Structured parse failure reporting.

use thiserror::Error;

/// Where in the input a parse error was found.
///
/// `line` counts lines over the parser's whole lifetime; `column` is the
/// byte offset within the offending line. Both are 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Position {
    pub line: u64,
    pub column: usize,
}

impl Position {
    /// Creates a position value.
    pub fn new(line: u64, column: usize) -> Self {
        Self { line, column }
    }
}

impl std::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "line {}, column {}", self.line, self.column)
    }
}

/// The parse error categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ParseErrorKind {
    /// A token did not match the grammar: a bad sigil, a missing comma,
    /// a mismatched brace or bracket, or an unkeyed tuple member.
    #[error("unexpected token")]
    UnexpectedToken,
    /// A quoted string reached end of line without a closing quote.
    #[error("unterminated string")]
    UnterminatedString,
    /// The line ended while the grammar still expected input.
    #[error("unexpected end of line")]
    UnexpectedEndOfLine,
}

/// A GDB/MI parse failure.
///
/// Carries everything a host needs to diagnose bad input: the complete
/// offending line (newline included), a copy of the offending lexeme, and
/// the position the failure was detected at. After one of these is
/// reported the parser discards the partial output command and skips
/// input up to the next `(gdb)` prompt, so later well-formed output
/// commands still flow.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind} `{}` at {position}", String::from_utf8_lossy(.token))]
pub struct ParseError {
    /// What went wrong.
    pub kind: ParseErrorKind,
    /// A copy of the complete input line the error was found in.
    pub line: Vec<u8>,
    /// A copy of the offending lexeme as it appeared on the wire.
    pub token: Vec<u8>,
    /// Where the offending lexeme starts.
    pub position: Position,
}

impl ParseError {
    /// Creates a parse error.
    pub fn new(kind: ParseErrorKind, line: &[u8], token: &[u8], position: Position) -> Self {
        Self {
            kind,
            line: line.to_vec(),
            token: token.to_vec(),
            position,
        }
    }

    /// The offending line as text, lossily decoded for display.
    pub fn line_lossy(&self) -> String {
        String::from_utf8_lossy(&self.line).into_owned()
    }

    /// The offending lexeme as text, lossily decoded for display.
    pub fn token_lossy(&self) -> String {
        String::from_utf8_lossy(&self.token).into_owned()
    }
}
