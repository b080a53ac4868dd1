//! lseq runtime: concrete sequences and list commands
//!
//! Key pieces:
//! - ArithSeries: the `lseq` abstract list kind (start, step, length)
//! - list_ops: list commands that treat abstract and materialized lists alike
//! - serialize: owned snapshots of values for persistence and exchange

pub mod arith_series;
pub mod list_ops;
pub mod serialize;

// Re-export key types and functions
pub use arith_series::{ARITH_SERIES_KIND, ArithSeries, Number, new_arith_series_obj};
pub use list_ops::{
    list_copy, list_elements, list_index, list_length, list_range, list_reverse, lseq,
    parse_index,
};

// Serialization types (for persistence/exchange with external systems)
pub use serialize::{ObjSerialize, SerializeError, TypedValue};

// The value layer, so callers need a single dependency
pub use lseq_core::{ListError, Obj, ObjRef};
