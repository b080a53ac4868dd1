//! Lseq Core: values that can be lists without storing their elements
//!
//! Key design principles:
//! - Obj: every value caches a text form and a structured form, and can
//!   always rebuild the first from the second
//! - Abstract list: a structured form whose elements come from an operation
//!   table registered by a sequence kind, materialized only on request
//! - Interchangeable: list accessors accept materialized and abstract lists
//!   alike
//!
//! # Modules
//!
//! - `obj`: Value objects, object-type registry, numbers
//! - `list`: Materialized lists, list text quoting and parsing
//! - `abstract_list`: Sequence descriptor, operation table, dispatch,
//!   stringification
//! - `error`: Error type shared by all of the above

pub mod abstract_list;
pub mod error;
pub mod list;
pub mod obj;

pub use obj::{
    DOUBLE_TYPE, INT_TYPE, InternalRep, Obj, ObjRef, ObjType, format_double, parse_double, parse_int,
};

pub use list::{LIST_TYPE, list_obj_get_elements, new_list_obj, parse_list, quote_element};

pub use abstract_list::{
    ABSTRACT_LIST_TYPE, ABSTRACT_LIST_VERSION_1, AbstractList, AbstractListBuilder,
    AbstractListProc, ListPayload, ProcTable, ProcType, abstract_list_get_elements,
    abstract_list_index, abstract_list_length, abstract_list_obj_copy, abstract_list_payload,
    abstract_list_payload_mut, abstract_list_range, abstract_list_rep, abstract_list_reverse,
    abstract_list_set_proc, abstract_list_type_name, is_abstract_list, new_abstract_list_obj,
};

pub use error::ListError;
