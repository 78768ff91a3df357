//! GDB/MI parse tree types.
//!
//! This module defines the data structures used to represent a GDB/MI
//! output command: the records it is made of and the recursive result
//! values they carry.

use serde::{Deserialize, Serialize};

/// A complete GDB/MI output command.
///
/// An output command is everything GDB emits between two `(gdb)` prompts:
/// any number of out-of-band records followed by at most one result record.
/// The parser delivers one `Output` per prompt, in input order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Output {
    /// Out-of-band records in the order they were received.
    pub oob_records: Vec<OobRecord>,
    /// The result record, if the output command contained one.
    pub result_record: Option<ResultRecord>,
}

/// A record GDB emits without the front end asking for it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum OobRecord {
    /// Console, target, or log text.
    Stream(StreamRecord),
    /// A status, exec, or notify state change.
    Async(AsyncRecord),
}

/// A GDB/MI stream record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreamRecord {
    /// Which of GDB's output channels produced the text.
    pub kind: StreamKind,
    /// The decoded payload. GDB escapes arbitrary bytes into the wire
    /// form, so the decoded content is not guaranteed to be UTF-8.
    pub content: Vec<u8>,
}

impl StreamRecord {
    /// The payload as UTF-8 text, if it is valid UTF-8.
    pub fn content_str(&self) -> Option<&str> {
        std::str::from_utf8(&self.content).ok()
    }
}

/// The stream record channels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StreamKind {
    /// CLI console response text (`~` prefix).
    Console,
    /// Output produced by the target program (`@` prefix).
    Target,
    /// Text from GDB's internals (`&` prefix).
    Log,
}

/// A GDB/MI asynchronous record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AsyncRecord {
    /// Correlation token, if one prefixed the record.
    ///
    /// The GDB manual reserves the right to emit tokens on async output
    /// but in practice omits them, so this is almost always `None`.
    pub token: Option<u64>,
    /// Which async sigil introduced the record.
    pub kind: AsyncKind,
    /// The recognized async class name.
    pub class: AsyncClass,
    /// The results carried by the record, in input order.
    pub results: Vec<ResultEntry>,
}

impl AsyncRecord {
    /// Looks up the first result with the given variable name.
    pub fn find(&self, variable: &str) -> Option<&Value> {
        find_entry(&self.results, variable)
    }
}

/// The asynchronous record kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AsyncKind {
    /// On-going progress of a slow operation (`+` prefix).
    Status,
    /// Asynchronous state change of the target (`*` prefix).
    Exec,
    /// Supplementary notification, e.g. new breakpoint data (`=` prefix).
    Notify,
}

/// The GDB/MI async class names.
///
/// Any class name outside this catalog parses to [`AsyncClass::Unsupported`];
/// the surrounding record is still delivered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AsyncClass {
    // Status async records
    Download,

    // Exec async records
    Stopped,
    Running,

    // Notify async records
    ThreadGroupAdded,
    ThreadGroupRemoved,
    ThreadGroupStarted,
    ThreadGroupExited,
    ThreadCreated,
    ThreadExited,
    ThreadSelected,
    LibraryLoaded,
    LibraryUnloaded,
    TraceframeChanged,
    TsvCreated,
    TsvModified,
    TsvDeleted,
    BreakpointCreated,
    BreakpointModified,
    BreakpointDeleted,
    RecordStarted,
    RecordStopped,
    CmdParamChanged,
    MemoryChanged,

    /// A class name the catalog does not recognize.
    Unsupported,
}

impl AsyncClass {
    /// Recognizes an async class by its wire name.
    ///
    /// One table serves all three async kinds; `+download` is the only
    /// known status class and is undocumented in the GDB manual.
    pub fn from_name(name: &str) -> Self {
        match name {
            "download" => AsyncClass::Download,
            "stopped" => AsyncClass::Stopped,
            "running" => AsyncClass::Running,
            "thread-group-added" => AsyncClass::ThreadGroupAdded,
            "thread-group-removed" => AsyncClass::ThreadGroupRemoved,
            "thread-group-started" => AsyncClass::ThreadGroupStarted,
            "thread-group-exited" => AsyncClass::ThreadGroupExited,
            "thread-created" => AsyncClass::ThreadCreated,
            "thread-exited" => AsyncClass::ThreadExited,
            "thread-selected" => AsyncClass::ThreadSelected,
            "library-loaded" => AsyncClass::LibraryLoaded,
            "library-unloaded" => AsyncClass::LibraryUnloaded,
            "traceframe-changed" => AsyncClass::TraceframeChanged,
            "tsv-created" => AsyncClass::TsvCreated,
            "tsv-modified" => AsyncClass::TsvModified,
            "tsv-deleted" => AsyncClass::TsvDeleted,
            "breakpoint-created" => AsyncClass::BreakpointCreated,
            "breakpoint-modified" => AsyncClass::BreakpointModified,
            "breakpoint-deleted" => AsyncClass::BreakpointDeleted,
            "record-started" => AsyncClass::RecordStarted,
            "record-stopped" => AsyncClass::RecordStopped,
            "cmd-param-changed" => AsyncClass::CmdParamChanged,
            "memory-changed" => AsyncClass::MemoryChanged,
            _ => AsyncClass::Unsupported,
        }
    }
}

impl std::fmt::Display for AsyncClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            AsyncClass::Download => "download",
            AsyncClass::Stopped => "stopped",
            AsyncClass::Running => "running",
            AsyncClass::ThreadGroupAdded => "thread-group-added",
            AsyncClass::ThreadGroupRemoved => "thread-group-removed",
            AsyncClass::ThreadGroupStarted => "thread-group-started",
            AsyncClass::ThreadGroupExited => "thread-group-exited",
            AsyncClass::ThreadCreated => "thread-created",
            AsyncClass::ThreadExited => "thread-exited",
            AsyncClass::ThreadSelected => "thread-selected",
            AsyncClass::LibraryLoaded => "library-loaded",
            AsyncClass::LibraryUnloaded => "library-unloaded",
            AsyncClass::TraceframeChanged => "traceframe-changed",
            AsyncClass::TsvCreated => "tsv-created",
            AsyncClass::TsvModified => "tsv-modified",
            AsyncClass::TsvDeleted => "tsv-deleted",
            AsyncClass::BreakpointCreated => "breakpoint-created",
            AsyncClass::BreakpointModified => "breakpoint-modified",
            AsyncClass::BreakpointDeleted => "breakpoint-deleted",
            AsyncClass::RecordStarted => "record-started",
            AsyncClass::RecordStopped => "record-stopped",
            AsyncClass::CmdParamChanged => "cmd-param-changed",
            AsyncClass::MemoryChanged => "memory-changed",
            AsyncClass::Unsupported => "unsupported",
        };
        write!(f, "{}", s)
    }
}

/// A GDB/MI result record, the reply to a front-end command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultRecord {
    /// Correlation token, if one prefixed the record.
    ///
    /// The token is the identifier the front end attached to its input
    /// command; GDB echoes it back so the reply can be matched up.
    pub token: Option<u64>,
    /// The recognized result class.
    pub class: ResultClass,
    /// The results carried by the record, in input order.
    pub results: Vec<ResultEntry>,
}

impl ResultRecord {
    /// Looks up the first result with the given variable name.
    pub fn find(&self, variable: &str) -> Option<&Value> {
        find_entry(&self.results, variable)
    }
}

/// The GDB/MI result classes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResultClass {
    /// The synchronous operation was successful (`^done`).
    Done,
    /// Historic equivalent of `^done` for commands that resumed the
    /// target (`^running`). Front ends should rely on the `*running`
    /// async record instead, but the class is preserved as seen.
    Running,
    /// GDB has connected to a remote target (`^connected`).
    Connected,
    /// The command failed (`^error`); the `msg` result carries the text.
    Error,
    /// GDB is about to exit (`^exit`).
    Exit,
    /// A class name the catalog does not recognize. Never folded into
    /// `Done`: a future MI revision may retire `running`/`connected`,
    /// and new names must stay observable.
    Unsupported,
}

impl ResultClass {
    /// Recognizes a result class by its wire name.
    pub fn from_name(name: &str) -> Self {
        match name {
            "done" => ResultClass::Done,
            "running" => ResultClass::Running,
            "connected" => ResultClass::Connected,
            "error" => ResultClass::Error,
            "exit" => ResultClass::Exit,
            _ => ResultClass::Unsupported,
        }
    }
}

impl std::fmt::Display for ResultClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ResultClass::Done => "done",
            ResultClass::Running => "running",
            ResultClass::Connected => "connected",
            ResultClass::Error => "error",
            ResultClass::Exit => "exit",
            ResultClass::Unsupported => "unsupported",
        };
        write!(f, "{}", s)
    }
}

/// One result in a record: an optionally named value.
///
/// Results are the key/value elements GDB uses to communicate structured
/// data. Inside a tuple every entry carries a variable; inside a list the
/// variable may be absent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultEntry {
    /// The variable naming the value, when present.
    pub variable: Option<String>,
    /// The value itself.
    pub value: Value,
}

impl ResultEntry {
    /// Creates a result entry.
    pub fn new(variable: Option<&str>, value: Value) -> Self {
        Self {
            variable: variable.map(str::to_owned),
            value,
        }
    }
}

/// A GDB/MI value: a decoded C string, a tuple, or a list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Value {
    /// A decoded quoted string. Byte-transparent; see
    /// [`StreamRecord::content`].
    CString(Vec<u8>),
    /// `{ ... }` — every child entry carries a variable.
    Tuple(Vec<ResultEntry>),
    /// `[ ... ]` — child entries may or may not carry variables.
    List(Vec<ResultEntry>),
}

impl Value {
    /// The value as UTF-8 text, if it is a cstring holding valid UTF-8.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::CString(bytes) => std::str::from_utf8(bytes).ok(),
            _ => None,
        }
    }

    /// The value's raw bytes, if it is a cstring.
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Value::CString(bytes) => Some(bytes),
            _ => None,
        }
    }

    /// The value's children, if it is a tuple.
    pub fn as_tuple(&self) -> Option<&[ResultEntry]> {
        match self {
            Value::Tuple(entries) => Some(entries),
            _ => None,
        }
    }

    /// The value's children, if it is a list.
    pub fn as_list(&self) -> Option<&[ResultEntry]> {
        match self {
            Value::List(entries) => Some(entries),
            _ => None,
        }
    }

    /// Looks up the first child entry with the given variable name in a
    /// tuple or list.
    pub fn find(&self, variable: &str) -> Option<&Value> {
        match self {
            Value::Tuple(entries) | Value::List(entries) => find_entry(entries, variable),
            Value::CString(_) => None,
        }
    }
}

fn find_entry<'a>(entries: &'a [ResultEntry], variable: &str) -> Option<&'a Value> {
    entries
        .iter()
        .find(|entry| entry.variable.as_deref() == Some(variable))
        .map(|entry| &entry.value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_async_class_round_trip() {
        let names = [
            "download",
            "stopped",
            "running",
            "thread-group-added",
            "thread-group-removed",
            "thread-group-started",
            "thread-group-exited",
            "thread-created",
            "thread-exited",
            "thread-selected",
            "library-loaded",
            "library-unloaded",
            "traceframe-changed",
            "tsv-created",
            "tsv-modified",
            "tsv-deleted",
            "breakpoint-created",
            "breakpoint-modified",
            "breakpoint-deleted",
            "record-started",
            "record-stopped",
            "cmd-param-changed",
            "memory-changed",
        ];

        for name in names {
            let class = AsyncClass::from_name(name);
            assert_ne!(class, AsyncClass::Unsupported, "catalog miss for {}", name);
            assert_eq!(class.to_string(), name);
        }

        assert_eq!(
            AsyncClass::from_name("frame-changed"),
            AsyncClass::Unsupported
        );
    }

    #[test]
    fn test_result_class_round_trip() {
        let names = ["done", "running", "connected", "error", "exit"];

        for name in names {
            let class = ResultClass::from_name(name);
            assert_ne!(class, ResultClass::Unsupported);
            assert_eq!(class.to_string(), name);
        }

        assert_eq!(ResultClass::from_name("finished"), ResultClass::Unsupported);
        // New classes must stay observable, not collapse into Done.
        assert_ne!(ResultClass::from_name("finished"), ResultClass::Done);
    }

    #[test]
    fn test_value_accessors() {
        let value = Value::Tuple(vec![
            ResultEntry::new(Some("number"), Value::CString(b"2".to_vec())),
            ResultEntry::new(Some("line"), Value::CString(b"9".to_vec())),
        ]);

        assert!(value.as_str().is_none());
        assert_eq!(value.as_tuple().map(<[_]>::len), Some(2));
        assert_eq!(value.find("line").and_then(Value::as_str), Some("9"));
        assert!(value.find("missing").is_none());
    }
}
