//! Streaming parser for the GDB/MI protocol.
//!
//! GDB's machine interface writes a line-oriented textual protocol on its
//! output channel. This crate consumes that byte stream incrementally and
//! hands the host structured records as soon as each output command is
//! complete: feed bytes in with [`Parser::push`] (or
//! [`EventDispatcher::push_data`] for per-record callbacks) and the
//! callbacks fire synchronously, in input order, before the push returns.
//!
//! The crate is parse-only. It never spawns GDB, opens a pipe, or
//! interprets MI semantics; it turns bytes into [`Output`] trees and
//! leaves the meaning to the host.
//!
//! ```
//! use gdbmi_wire::{Output, Parser, ResultClass};
//!
//! let mut outputs = Vec::new();
//! let mut parser = Parser::from_fn(|output| outputs.push(output));
//! parser.push(b"^done,value=\"42\"\n(gdb) \n");
//!
//! assert_eq!(outputs.len(), 1);
//! let record = outputs[0].result_record.as_ref().unwrap();
//! assert_eq!(record.class, ResultClass::Done);
//! assert_eq!(record.find("value").unwrap().as_str(), Some("42"));
//! ```

pub mod error;
pub mod events;
pub mod grammar;
pub mod parser;
pub mod scanner;
pub mod types;

pub use error::{ParseError, ParseErrorKind, Position};
pub use events::{EventDispatcher, EventHandler, PROMPT};
pub use grammar::GrammarEngine;
pub use parser::{OutputFn, OutputHandler, Parser};
pub use types::{
    AsyncClass, AsyncKind, AsyncRecord, OobRecord, Output, ResultClass, ResultEntry, ResultRecord,
    StreamKind, StreamRecord, Value,
};
