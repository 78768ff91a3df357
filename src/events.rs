//! Event dispatch over completed output commands.
//!
//! A convenience layer on top of [`Parser`]: instead of whole output
//! trees, the host receives one callback per record, in record order,
//! plus a prompt callback closing each output command. All record
//! arguments are borrowed views; the tree is released as soon as the
//! callbacks for its output command have returned.

use crate::error::ParseError;
use crate::parser::{OutputHandler, Parser};
use crate::types::{AsyncRecord, OobRecord, Output, ResultRecord, StreamRecord};

/// The prompt text handed to [`EventHandler::on_prompt`].
pub const PROMPT: &str = "(gdb) \n";

/// Typed host callbacks for the dispatch layer.
///
/// Every method has a default empty body, so a host implements only the
/// events it cares about. Callbacks run synchronously on the thread that
/// called [`EventDispatcher::push_data`]; the borrowed records are valid
/// for the duration of the call only.
pub trait EventHandler {
    /// Console, target, or log text arrived.
    fn on_stream(&mut self, _record: &StreamRecord) {}

    /// A status, exec, or notify async record arrived.
    fn on_async(&mut self, _record: &AsyncRecord) {}

    /// The output command carried a result record.
    fn on_result(&mut self, _record: &ResultRecord) {}

    /// `(gdb)` closed the current output command.
    fn on_prompt(&mut self, _prompt: &str) {}

    /// A line failed to parse; no other callback fires for that line.
    fn on_parse_error(&mut self, _error: &ParseError) {}
}

/// Fans each completed output command out to an [`EventHandler`].
pub struct EventDispatcher<H: EventHandler> {
    parser: Parser<Fanout<H>>,
}

impl<H: EventHandler> EventDispatcher<H> {
    /// Creates a dispatcher delivering to `handler`.
    pub fn new(handler: H) -> Self {
        Self {
            parser: Parser::new(Fanout { handler }),
        }
    }

    /// Pushes a fragment of GDB output; see [`Parser::push`].
    pub fn push_data(&mut self, data: &[u8]) {
        self.parser.push(data);
    }

    /// Shared access to the handler.
    pub fn handler(&self) -> &H {
        &self.parser.handler().handler
    }

    /// Exclusive access to the handler.
    pub fn handler_mut(&mut self) -> &mut H {
        &mut self.parser.handler_mut().handler
    }

    /// Consumes the dispatcher and returns the handler.
    pub fn into_handler(self) -> H {
        self.parser.into_handler().handler
    }
}

/// Adapts an [`EventHandler`] to the driver's [`OutputHandler`] seam.
struct Fanout<H: EventHandler> {
    handler: H,
}

impl<H: EventHandler> OutputHandler for Fanout<H> {
    fn output(&mut self, output: Output) {
        for record in &output.oob_records {
            match record {
                OobRecord::Stream(stream) => self.handler.on_stream(stream),
                OobRecord::Async(record) => self.handler.on_async(record),
            }
        }
        if let Some(record) = &output.result_record {
            self.handler.on_result(record);
        }
        self.handler.on_prompt(PROMPT);
        // `output` drops here, as soon as the callbacks have returned.
    }

    fn parse_error(&mut self, error: &ParseError) {
        self.handler.on_parse_error(error);
    }
}
