//! Grammar engine for the GDB/MI output stream.
//!
//! The engine is fed one scanned line at a time and reduces it according
//! to the MI output grammar:
//!
//! ```text
//! output     ::= (oob_record)* [ result_record ] "(gdb)" nl
//! oob_record ::= stream_record | async_record
//! stream_record ::= ("~"|"@"|"&") cstring nl
//! async_record  ::= [token] ("*"|"+"|"=") class ("," result)* nl
//! result_record ::= [token] "^" class ("," result)* nl
//! result     ::= [variable "="] value
//! value      ::= cstring | tuple | list
//! ```
//!
//! Records accumulate inside the engine until the `(gdb)` prompt closes
//! the output command. On a grammar violation the partial output command
//! is discarded and input is skipped up to the next prompt line.

use crate::error::{ParseError, ParseErrorKind, Position};
use crate::scanner::{scan_line, ScanError, Token, TokenKind};
use crate::types::{
    AsyncClass, AsyncKind, AsyncRecord, OobRecord, Output, ResultClass, ResultEntry, ResultRecord,
    StreamKind, StreamRecord, Value,
};

/// Reduces scanned lines into complete output commands.
pub struct GrammarEngine {
    oob_records: Vec<OobRecord>,
    result_record: Option<ResultRecord>,
    line_number: u64,
    recovering: bool,
}

impl GrammarEngine {
    /// Creates an engine with no partial output command.
    pub fn new() -> Self {
        Self {
            oob_records: Vec::new(),
            result_record: None,
            line_number: 0,
            recovering: false,
        }
    }

    /// Feeds one EOL-terminated line.
    ///
    /// Returns `Ok(Some(output))` when the line was a prompt and closed an
    /// output command, `Ok(None)` when the line added a record to the
    /// in-progress output command (or was consumed by error recovery), and
    /// `Err` when the line violated the grammar. After an error the engine
    /// has already discarded the partial output command and entered
    /// recovery; the caller only needs to report the error and keep
    /// pushing lines.
    pub fn feed_line(&mut self, line: &[u8]) -> Result<Option<Output>, ParseError> {
        self.line_number += 1;

        if self.recovering {
            if is_prompt_line(line) {
                log::debug!("prompt reached, resuming after parse error");
                self.recovering = false;
            }
            return Ok(None);
        }

        let tokens = match scan_line(line) {
            Ok(tokens) => tokens,
            Err(error) => return Err(self.fail(line, error)),
        };

        let mut cursor = Cursor::new(&tokens);
        match self.reduce_line(&mut cursor) {
            Ok(output) => Ok(output),
            Err(error) => Err(self.fail(line, error)),
        }
    }

    /// Promotes a line-local failure to a positioned [`ParseError`],
    /// discarding the partial output command and entering recovery.
    fn fail(&mut self, line: &[u8], error: ScanError) -> ParseError {
        self.oob_records.clear();
        self.result_record = None;
        self.recovering = true;
        ParseError::new(
            error.kind,
            line,
            &error.token,
            Position::new(self.line_number, error.column),
        )
    }

    fn reduce_line(&mut self, cursor: &mut Cursor<'_>) -> Result<Option<Output>, ScanError> {
        let first = match cursor.peek() {
            Some(token) => token,
            None => return Err(end_of_tokens()),
        };

        match first.kind {
            TokenKind::Prompt => {
                cursor.advance();
                self.expect_newline(cursor)?;
                let output = Output {
                    oob_records: std::mem::take(&mut self.oob_records),
                    result_record: self.result_record.take(),
                };
                log::debug!(
                    "output command complete: {} oob record(s), result record: {}",
                    output.oob_records.len(),
                    output.result_record.is_some()
                );
                Ok(Some(output))
            }
            TokenKind::Tilde | TokenKind::At | TokenKind::Ampersand => {
                self.reduce_stream_record(cursor)?;
                Ok(None)
            }
            _ => {
                self.reduce_record(cursor)?;
                Ok(None)
            }
        }
    }

    fn reduce_stream_record(&mut self, cursor: &mut Cursor<'_>) -> Result<(), ScanError> {
        let sigil = cursor.advance().expect("peeked sigil must be consumable");
        let kind = match sigil.kind {
            TokenKind::Tilde => StreamKind::Console,
            TokenKind::At => StreamKind::Target,
            TokenKind::Ampersand => StreamKind::Log,
            _ => unreachable!("caller matched the stream sigil"),
        };

        let content = match cursor.peek() {
            Some(Token {
                kind: TokenKind::CString(content),
                ..
            }) => {
                let content = content.clone();
                cursor.advance();
                content
            }
            _ => return Err(cursor.unexpected()),
        };
        self.expect_newline(cursor)?;

        log::trace!("stream record: kind {:?}, {} byte(s)", kind, content.len());
        self.oob_records
            .push(OobRecord::Stream(StreamRecord { kind, content }));
        Ok(())
    }

    /// Reduces an async or result record line, including the optional
    /// correlation token prefix.
    fn reduce_record(&mut self, cursor: &mut Cursor<'_>) -> Result<(), ScanError> {
        let token = match cursor.peek() {
            Some(Token {
                kind: TokenKind::Integer(value),
                ..
            }) => {
                let value = *value;
                cursor.advance();
                Some(value)
            }
            _ => None,
        };

        let sigil = match cursor.advance() {
            Some(sigil) => sigil,
            None => return Err(end_of_tokens()),
        };

        let async_kind = match sigil.kind {
            TokenKind::Caret => {
                let class = ResultClass::from_name(&self.expect_class_name(cursor)?);
                let results = self.parse_results(cursor)?;
                self.expect_newline(cursor)?;

                if self.result_record.is_some() {
                    log::warn!(
                        "result record replaced before prompt at line {}",
                        self.line_number
                    );
                }
                log::trace!("result record: class {}", class);
                self.result_record = Some(ResultRecord {
                    token,
                    class,
                    results,
                });
                return Ok(());
            }
            TokenKind::Asterisk => AsyncKind::Exec,
            TokenKind::Plus => AsyncKind::Status,
            TokenKind::Equal => AsyncKind::Notify,
            _ => return Err(unexpected(sigil)),
        };

        let class = AsyncClass::from_name(&self.expect_class_name(cursor)?);
        let results = self.parse_results(cursor)?;
        self.expect_newline(cursor)?;

        log::trace!("async record: kind {:?}, class {}", async_kind, class);
        self.oob_records.push(OobRecord::Async(AsyncRecord {
            token,
            kind: async_kind,
            class,
            results,
        }));
        Ok(())
    }

    fn expect_class_name(&self, cursor: &mut Cursor<'_>) -> Result<String, ScanError> {
        match cursor.peek() {
            Some(Token {
                kind: TokenKind::Identifier(name),
                ..
            }) => {
                let name = name.clone();
                cursor.advance();
                Ok(name)
            }
            _ => Err(cursor.unexpected()),
        }
    }

    /// Parses the `("," result)*` tail of a record line.
    fn parse_results(&self, cursor: &mut Cursor<'_>) -> Result<Vec<ResultEntry>, ScanError> {
        let mut results = Vec::new();
        while matches!(
            cursor.peek(),
            Some(Token {
                kind: TokenKind::Comma,
                ..
            })
        ) {
            cursor.advance();
            results.push(self.parse_result(cursor)?);
        }
        Ok(results)
    }

    fn parse_result(&self, cursor: &mut Cursor<'_>) -> Result<ResultEntry, ScanError> {
        let variable = match (cursor.peek(), cursor.peek_at(1)) {
            (
                Some(Token {
                    kind: TokenKind::Identifier(name),
                    ..
                }),
                Some(Token {
                    kind: TokenKind::Equal,
                    ..
                }),
            ) => {
                let name = name.clone();
                cursor.advance();
                cursor.advance();
                Some(name)
            }
            _ => None,
        };

        let value = self.parse_value(cursor)?;
        Ok(ResultEntry { variable, value })
    }

    fn parse_value(&self, cursor: &mut Cursor<'_>) -> Result<Value, ScanError> {
        let first = match cursor.peek() {
            Some(token) => token,
            None => return Err(end_of_tokens()),
        };

        match &first.kind {
            TokenKind::CString(content) => {
                let content = content.clone();
                cursor.advance();
                Ok(Value::CString(content))
            }
            TokenKind::OpenBrace => {
                cursor.advance();
                let entries =
                    self.parse_sequence(cursor, TokenKind::CloseBrace, Self::parse_tuple_member)?;
                Ok(Value::Tuple(entries))
            }
            TokenKind::OpenBracket => {
                cursor.advance();
                let entries =
                    self.parse_sequence(cursor, TokenKind::CloseBracket, Self::parse_result)?;
                Ok(Value::List(entries))
            }
            _ => Err(cursor.unexpected()),
        }
    }

    /// Parses `close` immediately, or `member ("," member)* close`.
    fn parse_sequence(
        &self,
        cursor: &mut Cursor<'_>,
        close: TokenKind,
        member: fn(&Self, &mut Cursor<'_>) -> Result<ResultEntry, ScanError>,
    ) -> Result<Vec<ResultEntry>, ScanError> {
        let mut entries = Vec::new();

        if cursor.peek().map(|token| &token.kind) == Some(&close) {
            cursor.advance();
            return Ok(entries);
        }

        entries.push(member(self, cursor)?);
        loop {
            match cursor.peek() {
                Some(token) if token.kind == close => {
                    cursor.advance();
                    return Ok(entries);
                }
                Some(Token {
                    kind: TokenKind::Comma,
                    ..
                }) => {
                    cursor.advance();
                    entries.push(member(self, cursor)?);
                }
                _ => return Err(cursor.unexpected()),
            }
        }
    }

    /// A tuple member is a result whose variable is required.
    fn parse_tuple_member(&self, cursor: &mut Cursor<'_>) -> Result<ResultEntry, ScanError> {
        let start = match cursor.peek() {
            Some(token) => (token.text.clone(), token.column),
            None => return Err(end_of_tokens()),
        };

        let entry = self.parse_result(cursor)?;
        if entry.variable.is_none() {
            return Err(ScanError {
                kind: ParseErrorKind::UnexpectedToken,
                token: start.0,
                column: start.1,
            });
        }
        Ok(entry)
    }

    fn expect_newline(&self, cursor: &mut Cursor<'_>) -> Result<(), ScanError> {
        match cursor.peek() {
            Some(Token {
                kind: TokenKind::Newline,
                ..
            }) => {
                cursor.advance();
                Ok(())
            }
            _ => Err(cursor.unexpected()),
        }
    }
}

impl Default for GrammarEngine {
    fn default() -> Self {
        Self::new()
    }
}

/// Recovery-mode prompt check: whitespace and the line terminator aside,
/// the line must be exactly `(gdb)`.
fn is_prompt_line(line: &[u8]) -> bool {
    let mut line = line;
    if let [rest @ .., b'\n'] = line {
        line = rest;
    }
    if let [rest @ .., b'\r'] = line {
        line = rest;
    }
    while let [b' ' | b'\t', rest @ ..] = line {
        line = rest;
    }
    while let [rest @ .., b' ' | b'\t'] = line {
        line = rest;
    }
    line == b"(gdb)"
}

fn unexpected(token: &Token) -> ScanError {
    let kind = if token.kind == TokenKind::Newline {
        ParseErrorKind::UnexpectedEndOfLine
    } else {
        ParseErrorKind::UnexpectedToken
    };
    ScanError {
        kind,
        token: token.text.clone(),
        column: token.column,
    }
}

fn end_of_tokens() -> ScanError {
    ScanError {
        kind: ParseErrorKind::UnexpectedEndOfLine,
        token: Vec::new(),
        column: 1,
    }
}

/// Forward-only view over one line's tokens.
struct Cursor<'a> {
    tokens: &'a [Token],
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn new(tokens: &'a [Token]) -> Self {
        Self { tokens, pos: 0 }
    }

    fn peek(&self) -> Option<&'a Token> {
        self.tokens.get(self.pos)
    }

    fn peek_at(&self, n: usize) -> Option<&'a Token> {
        self.tokens.get(self.pos + n)
    }

    fn advance(&mut self) -> Option<&'a Token> {
        let token = self.tokens.get(self.pos);
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    /// An error naming the current token, or the end of the line when the
    /// tokens are exhausted.
    fn unexpected(&self) -> ScanError {
        match self.peek() {
            Some(token) => unexpected(token),
            None => end_of_tokens(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn feed(engine: &mut GrammarEngine, line: &[u8]) -> Option<Output> {
        engine.feed_line(line).unwrap()
    }

    #[test]
    fn test_prompt_alone_is_an_empty_output() {
        let mut engine = GrammarEngine::new();
        let output = feed(&mut engine, b"(gdb) \n").unwrap();
        assert!(output.oob_records.is_empty());
        assert!(output.result_record.is_none());
    }

    #[test]
    fn test_records_accumulate_until_prompt() {
        let mut engine = GrammarEngine::new();
        assert!(feed(&mut engine, b"~\"hello\"\n").is_none());
        assert!(feed(&mut engine, b"^done\n").is_none());

        let output = feed(&mut engine, b"(gdb) \n").unwrap();
        assert_eq!(output.oob_records.len(), 1);
        assert_eq!(
            output.result_record.map(|record| record.class),
            Some(ResultClass::Done)
        );

        // The prompt resets the engine for the next output command.
        let output = feed(&mut engine, b"(gdb) \n").unwrap();
        assert!(output.oob_records.is_empty());
        assert!(output.result_record.is_none());
    }

    #[test]
    fn test_error_discards_partial_output() {
        let mut engine = GrammarEngine::new();
        assert!(feed(&mut engine, b"~\"kept so far\"\n").is_none());

        let error = engine.feed_line(b"^done extra\n").unwrap_err();
        assert_eq!(error.kind, ParseErrorKind::UnexpectedToken);
        assert_eq!(error.token, b"extra".to_vec());
        assert_eq!(error.position, Position::new(2, 7));

        // Recovery eats everything up to and including the next prompt.
        assert!(feed(&mut engine, b"~\"dropped\"\n").is_none());
        assert!(feed(&mut engine, b"(gdb) \n").is_none());

        // The next well-formed output command flows again.
        assert!(feed(&mut engine, b"^exit\n").is_none());
        let output = feed(&mut engine, b"(gdb) \n").unwrap();
        assert!(output.oob_records.is_empty());
        assert_eq!(output.result_record.unwrap().class, ResultClass::Exit);
    }

    #[test]
    fn test_line_numbers_span_the_engine_lifetime() {
        let mut engine = GrammarEngine::new();
        assert!(feed(&mut engine, b"^done\n").is_none());
        feed(&mut engine, b"(gdb) \n").unwrap();

        let error = engine.feed_line(b"$oops\n").unwrap_err();
        assert_eq!(error.position, Position::new(3, 1));
        assert_eq!(error.line, b"$oops\n".to_vec());
    }

    #[test]
    fn test_second_result_record_replaces_the_first() {
        let mut engine = GrammarEngine::new();
        assert!(feed(&mut engine, b"^running\n").is_none());
        assert!(feed(&mut engine, b"^done\n").is_none());

        let output = feed(&mut engine, b"(gdb) \n").unwrap();
        assert_eq!(output.result_record.unwrap().class, ResultClass::Done);
    }

    #[test]
    fn test_tuple_member_requires_a_variable() {
        let mut engine = GrammarEngine::new();
        let error = engine.feed_line(b"^done,bad={\"value\"}\n").unwrap_err();
        assert_eq!(error.kind, ParseErrorKind::UnexpectedToken);
        assert_eq!(error.token, b"\"value\"".to_vec());
    }

    #[test]
    fn test_empty_line_is_a_syntax_error() {
        let mut engine = GrammarEngine::new();
        let error = engine.feed_line(b"\n").unwrap_err();
        assert_eq!(error.kind, ParseErrorKind::UnexpectedEndOfLine);
        assert_eq!(error.position, Position::new(1, 1));
    }
}
