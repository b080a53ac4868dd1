//! Serialization of value objects
//!
//! `TypedValue` is an owned, serde-friendly snapshot of a value object. It
//! enables exchange with external systems without exposing the shared,
//! interior-mutable object graph.
//!
//! # Abstract lists
//!
//! An abstract list has no serializable structure of its own: it is
//! written out as its elements, so a series of a million integers becomes a
//! `List` of a million `Int`s. Reading it back yields a materialized list
//! with the same text form.
//!
//! # Formats
//!
//! bincode for compact binary snapshots, serde_json for interchange, and
//! `TypedValue::to_debug_string()` for humans.

use lseq_core::{
    InternalRep, ListError, Obj, ObjRef, abstract_list_get_elements, format_double,
    is_abstract_list, new_list_obj,
};
use serde::{Deserialize, Serialize};
use std::rc::Rc;

/// Error during serialization/deserialization
#[derive(Debug)]
pub enum SerializeError {
    /// Non-finite float (NaN or Infinity)
    NonFiniteFloat(f64),
    /// Bincode encoding/decoding error (preserves original error for debugging)
    Bincode(Box<bincode::Error>),
    /// JSON encoding/decoding error
    Json(serde_json::Error),
    /// The value could not be read as a list
    List(ListError),
}

impl std::fmt::Display for SerializeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SerializeError::NonFiniteFloat(v) => {
                write!(f, "Cannot serialize non-finite float: {}", format_double(*v))
            }
            SerializeError::Bincode(e) => write!(f, "Bincode error: {}", e),
            SerializeError::Json(e) => write!(f, "JSON error: {}", e),
            SerializeError::List(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for SerializeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SerializeError::Bincode(e) => Some(e.as_ref()),
            SerializeError::Json(e) => Some(e),
            SerializeError::List(e) => Some(e),
            SerializeError::NonFiniteFloat(_) => None,
        }
    }
}

impl From<bincode::Error> for SerializeError {
    fn from(e: bincode::Error) -> Self {
        SerializeError::Bincode(Box::new(e))
    }
}

impl From<serde_json::Error> for SerializeError {
    fn from(e: serde_json::Error) -> Self {
        SerializeError::Json(e)
    }
}

impl From<ListError> for SerializeError {
    fn from(e: ListError) -> Self {
        SerializeError::List(e)
    }
}

/// Serializable representation of a value object
///
/// Pure text values become `String`; numbers keep their type; lists of
/// either representation become `List`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum TypedValue {
    Int(i64),
    Double(f64),
    String(String),
    List(Vec<TypedValue>),
}

impl TypedValue {
    /// Convert from a value object
    ///
    /// Abstract lists are materialized. Returns an error for non-finite
    /// doubles, which have no portable encoding.
    pub fn from_obj(obj: &Obj) -> Result<Self, SerializeError> {
        if is_abstract_list(obj) {
            let elements = abstract_list_get_elements(obj)?;
            return TypedValue::from_elements(&elements);
        }
        let elements = match &*obj.rep() {
            InternalRep::Int(v) => return Ok(TypedValue::Int(*v)),
            InternalRep::Double(v) => {
                if !v.is_finite() {
                    return Err(SerializeError::NonFiniteFloat(*v));
                }
                return Ok(TypedValue::Double(*v));
            }
            InternalRep::List(elements) => Rc::clone(elements),
            InternalRep::None | InternalRep::AbstractList(_) => {
                return Ok(TypedValue::String(obj.get_string().to_string()));
            }
        };
        TypedValue::from_elements(&elements)
    }

    fn from_elements(elements: &[ObjRef]) -> Result<Self, SerializeError> {
        let mut typed = Vec::with_capacity(elements.len());
        for element in elements {
            typed.push(TypedValue::from_obj(element)?);
        }
        Ok(TypedValue::List(typed))
    }

    /// Convert to a value object; lists come back materialized
    pub fn to_obj(&self) -> ObjRef {
        match self {
            TypedValue::Int(v) => Obj::new_int(*v),
            TypedValue::Double(v) => Obj::new_double(*v),
            TypedValue::String(s) => Obj::new_string(s.as_str()),
            TypedValue::List(items) => new_list_obj(items.iter().map(|v| v.to_obj()).collect()),
        }
    }

    /// Serialize to binary format (bincode)
    pub fn to_bytes(&self) -> Result<Vec<u8>, SerializeError> {
        bincode::serialize(self).map_err(SerializeError::from)
    }

    /// Deserialize from binary format (bincode)
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, SerializeError> {
        bincode::deserialize(bytes).map_err(SerializeError::from)
    }

    /// Serialize to JSON
    pub fn to_json(&self) -> Result<String, SerializeError> {
        serde_json::to_string(self).map_err(SerializeError::from)
    }

    /// Deserialize from JSON
    pub fn from_json(text: &str) -> Result<Self, SerializeError> {
        serde_json::from_str(text).map_err(SerializeError::from)
    }

    /// Convert to human-readable debug string
    pub fn to_debug_string(&self) -> String {
        match self {
            TypedValue::Int(v) => format!("{}", v),
            TypedValue::Double(v) => format_double(*v),
            TypedValue::String(v) => format!("{:?}", v),
            TypedValue::List(items) => {
                let item_strs: Vec<String> = items.iter().map(|v| v.to_debug_string()).collect();
                format!("[{}]", item_strs.join(", "))
            }
        }
    }
}

/// Extension trait for Obj to add serialization methods
pub trait ObjSerialize {
    /// Convert to serializable TypedValue
    fn to_typed(&self) -> Result<TypedValue, SerializeError>;

    /// Serialize directly to bytes
    fn to_bytes(&self) -> Result<Vec<u8>, SerializeError>;
}

impl ObjSerialize for Obj {
    fn to_typed(&self) -> Result<TypedValue, SerializeError> {
        TypedValue::from_obj(self)
    }

    fn to_bytes(&self) -> Result<Vec<u8>, SerializeError> {
        TypedValue::from_obj(self)?.to_bytes()
    }
}
