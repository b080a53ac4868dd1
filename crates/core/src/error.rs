//! Error type shared by the value and list layers
//!
//! Recoverable failures are returned as [`ListError`]. Contract violations
//! (coercing an arbitrary value into an abstract list, duplicating from a
//! foreign representation, asking for the wrong payload kind) are not errors:
//! they panic with a diagnostic, because no correct program reaches them.
//!
//! Each variant carries a Tcl-style error code (see [`ListError::error_code`])
//! so an interpreter can surface a machine-readable classification next to
//! the human message.

use crate::abstract_list::ProcType;
use std::fmt;

/// Errors produced by value conversion and list dispatch
#[derive(Debug, Clone, PartialEq)]
pub enum ListError {
    /// The operation needs an abstract list but the value holds another
    /// representation (`found` is its type name, `"string"` for pure text)
    NotAbstractList { found: &'static str },

    /// The sequence kind did not register the requested operation
    Unsupported { kind: &'static str, proc: ProcType },

    /// A kind tried to publish an object without one of the slots every
    /// abstract list must answer (`length` and `index`)
    MissingRequiredProc { kind: &'static str, proc: ProcType },

    /// The element array could not be allocated
    OutOfMemory { requested: u64 },

    /// `index` returned nothing for a position inside `[0, length)`
    MissingElement { kind: &'static str, index: i64 },

    /// Text could not be read as the expected number type
    InvalidNumber { expected: &'static str, text: String },

    /// Text is not a valid list index
    InvalidIndex(String),

    /// Text could not be parsed as a list
    MalformedList(String),

    /// Kind-defined domain failure
    Domain(String),

    /// Wrong number or shape of command arguments
    Usage(String),
}

impl ListError {
    /// Machine-readable classification, outermost category first
    pub fn error_code(&self) -> &'static [&'static str] {
        match self {
            ListError::NotAbstractList { .. } => &["LSEQ", "VALUE", "UNKNOWN"],
            ListError::Unsupported { .. } => &["LSEQ", "OPERATION", "UNSUPPORTED"],
            ListError::MissingRequiredProc { .. } => &["LSEQ", "OPERATION", "MISSING"],
            ListError::OutOfMemory { .. } => &["LSEQ", "MEMORY"],
            ListError::MissingElement { .. } => &["LSEQ", "VALUE", "ELEMENT"],
            ListError::InvalidNumber { .. } => &["LSEQ", "VALUE", "NUMBER"],
            ListError::InvalidIndex(_) => &["LSEQ", "VALUE", "INDEX"],
            ListError::MalformedList(_) => &["LSEQ", "VALUE", "LIST"],
            ListError::Domain(_) => &["LSEQ", "DOMAIN"],
            ListError::Usage(_) => &["LSEQ", "WRONGARGS"],
        }
    }
}

impl fmt::Display for ListError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ListError::NotAbstractList { found } => {
                write!(f, "value is not an abstract list (found {})", found)
            }
            ListError::Unsupported { kind, proc } => {
                write!(f, "{} does not support the {} operation", kind, proc)
            }
            ListError::MissingRequiredProc { kind, proc } => {
                write!(f, "{} must register a {} operation", kind, proc)
            }
            ListError::OutOfMemory { requested } => {
                write!(
                    f,
                    "max length of a list exceeded ({} elements requested)",
                    requested
                )
            }
            ListError::MissingElement { kind, index } => {
                write!(f, "{} produced no element at index {}", kind, index)
            }
            ListError::InvalidNumber { expected, text } => {
                write!(f, "expected {} but got \"{}\"", expected, text)
            }
            ListError::InvalidIndex(text) => {
                write!(
                    f,
                    "bad index \"{}\": must be integer?[+-]integer? or end?[+-]integer?",
                    text
                )
            }
            ListError::MalformedList(msg) => write!(f, "{}", msg),
            ListError::Domain(msg) => write!(f, "{}", msg),
            ListError::Usage(msg) => write!(f, "wrong # args: should be \"{}\"", msg),
        }
    }
}

impl std::error::Error for ListError {}
