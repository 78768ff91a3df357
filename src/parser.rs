//! Push-mode driver for the GDB/MI parser.
//!
//! The driver accepts arbitrary byte fragments, cuts them into
//! EOL-terminated lines, and hands each line to the grammar engine.
//! Completed output commands are delivered through the host's
//! [`OutputHandler`] exactly once, in input order, before `push` returns.

use crate::error::ParseError;
use crate::grammar::GrammarEngine;
use crate::types::Output;

/// Host callbacks for the push driver.
///
/// `parse_error` has a default empty body, so hosts that only care about
/// well-formed output commands implement `output` alone. For throwaway
/// consumers a plain closure does the job through [`Parser::from_fn`].
pub trait OutputHandler {
    /// One complete output command. Called once per `(gdb)` prompt; the
    /// handler owns the tree from here on.
    fn output(&mut self, output: Output);

    /// A line failed to parse. The partial output command was discarded
    /// and input is skipped up to the next prompt.
    fn parse_error(&mut self, _error: &ParseError) {}
}

/// Adapts a closure to [`OutputHandler`]; parse errors are ignored.
pub struct OutputFn<F>(pub F);

impl<F: FnMut(Output)> OutputHandler for OutputFn<F> {
    fn output(&mut self, output: Output) {
        (self.0)(output)
    }
}

/// A streaming GDB/MI parser.
///
/// Feed it whatever GDB's output channel produced, in fragments of any
/// size; callbacks fire synchronously from inside [`Parser::push`] as
/// soon as each output command completes. The parser never blocks, never
/// performs I/O, and holds at most one incomplete line plus the current
/// partial output command. Dropping the parser discards any unfinished
/// line.
pub struct Parser<H: OutputHandler> {
    handler: H,
    engine: GrammarEngine,
    buffer: Vec<u8>,
}

impl<F: FnMut(Output)> Parser<OutputFn<F>> {
    /// Creates a parser that hands each completed output command to a
    /// closure and ignores parse errors.
    pub fn from_fn(f: F) -> Self {
        Parser::new(OutputFn(f))
    }
}

impl<H: OutputHandler> Parser<H> {
    /// Creates a parser delivering to `handler`.
    pub fn new(handler: H) -> Self {
        Self {
            handler,
            engine: GrammarEngine::new(),
            buffer: Vec::new(),
        }
    }

    /// Pushes a fragment of GDB output.
    ///
    /// Every newline-terminated line contained in the buffered input is
    /// reduced and dispatched before this returns; a trailing partial
    /// line is kept for the next push. Pushing an empty slice is a no-op.
    pub fn push(&mut self, data: &[u8]) {
        self.buffer.extend_from_slice(data);
        log::trace!(
            "push: {} byte(s) received, {} byte(s) buffered",
            data.len(),
            self.buffer.len()
        );

        while let Some(newline) = self.buffer.iter().position(|&byte| byte == b'\n') {
            let line: Vec<u8> = self.buffer.drain(..=newline).collect();
            match self.engine.feed_line(&line) {
                Ok(Some(output)) => self.handler.output(output),
                Ok(None) => {}
                Err(error) => {
                    log::debug!("parse error: {}", error);
                    self.handler.parse_error(&error);
                }
            }
        }
    }

    /// Shared access to the handler.
    pub fn handler(&self) -> &H {
        &self.handler
    }

    /// Exclusive access to the handler.
    pub fn handler_mut(&mut self) -> &mut H {
        &mut self.handler
    }

    /// Consumes the parser and returns the handler.
    pub fn into_handler(self) -> H {
        self.handler
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ResultClass;

    #[test]
    fn test_outputs_are_collected_through_a_closure() {
        let mut outputs = Vec::new();
        {
            let mut parser = Parser::from_fn(|output| outputs.push(output));
            parser.push(b"^done\n(gdb) \n*running,thread-id=\"all\"\n(gdb) \n");
        }

        assert_eq!(outputs.len(), 2);
        assert_eq!(
            outputs[0].result_record.as_ref().unwrap().class,
            ResultClass::Done
        );
        assert_eq!(outputs[1].oob_records.len(), 1);
    }

    #[test]
    fn test_partial_lines_wait_for_their_newline() {
        let mut parser = Parser::from_fn(|_| panic!("no output expected yet"));
        parser.push(b"^do");
        parser.push(b"ne");

        let mut parser = Parser::from_fn(|output: Output| {
            assert_eq!(
                output.result_record.as_ref().unwrap().class,
                ResultClass::Done
            );
        });
        parser.push(b"^done\n(gdb) ");
        parser.push(b"\n");
    }

    #[test]
    fn test_byte_at_a_time_push() {
        let mut count = 0;
        {
            let mut parser = Parser::from_fn(|_output| count += 1);
            for &byte in b"~\"hi\"\n^done\n(gdb) \n".iter() {
                parser.push(&[byte]);
            }
        }
        assert_eq!(count, 1);
    }

    #[test]
    fn test_empty_push_is_a_no_op() {
        let mut parser = Parser::from_fn(|_| panic!("no output expected"));
        parser.push(b"");
    }
}
