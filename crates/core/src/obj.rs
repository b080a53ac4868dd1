//! Value objects with a dual representation
//!
//! Every runtime value is an [`Obj`] behind a shared [`ObjRef`] handle. An
//! object caches up to two forms of the same value:
//!
//! - a text form (`bytes`), immutable once produced
//! - a structured form (`rep`), typed by the [`ObjType`] it maps to
//!
//! At least one of the two is valid at all times. When only the structured
//! form exists, the text form is derived on demand by the type's
//! `update_string` hook and cached until the structured form is replaced.
//!
//! # Ownership
//!
//! `ObjRef` is an `Rc`, so the reference count is the strong count and the
//! structured form is dropped together with the last handle. Object graphs
//! are confined to one execution context; nothing here is `Send`.

use crate::abstract_list::{ABSTRACT_LIST_TYPE, AbstractList};
use crate::error::ListError;
use crate::list::LIST_TYPE;
use std::cell::{Ref, RefCell};
use std::fmt;
use std::rc::Rc;

/// Shared handle to a value object
pub type ObjRef = Rc<Obj>;

/// Registration record for one structured representation
///
/// The hooks are plain function pointers so a representation can be
/// identified by the address of its static record (see [`Obj::has_type`]).
pub struct ObjType {
    /// Name used in diagnostics
    pub name: &'static str,

    /// Release resources held by the structured form before it is dropped
    pub free_internal_rep: Option<fn(&Obj)>,

    /// Install a copy of `src`'s structured form on `copy`
    pub dup_internal_rep: fn(src: &Obj, copy: &Obj),

    /// Derive the canonical text form from the structured form
    pub update_string: fn(&Obj) -> String,

    /// Convert any value into this representation
    pub set_from_any: fn(&Obj) -> Result<(), ListError>,
}

impl fmt::Debug for ObjType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObjType").field("name", &self.name).finish()
    }
}

/// Structured form of a value
#[derive(Debug)]
pub enum InternalRep {
    /// Pure text value
    None,
    Int(i64),
    Double(f64),
    /// Materialized list
    List(Rc<[ObjRef]>),
    /// Lazily computed sequence
    AbstractList(Box<AbstractList>),
}

impl InternalRep {
    /// The registration record this representation belongs to
    pub fn obj_type(&self) -> Option<&'static ObjType> {
        match self {
            InternalRep::None => None,
            InternalRep::Int(_) => Some(&INT_TYPE),
            InternalRep::Double(_) => Some(&DOUBLE_TYPE),
            InternalRep::List(_) => Some(&LIST_TYPE),
            InternalRep::AbstractList(_) => Some(&ABSTRACT_LIST_TYPE),
        }
    }
}

pub static INT_TYPE: ObjType = ObjType {
    name: "int",
    free_internal_rep: None,
    dup_internal_rep: dup_number_rep,
    update_string: update_string_of_int,
    set_from_any: set_int_from_any,
};

pub static DOUBLE_TYPE: ObjType = ObjType {
    name: "double",
    free_internal_rep: None,
    dup_internal_rep: dup_number_rep,
    update_string: update_string_of_double,
    set_from_any: set_double_from_any,
};

/// A runtime value
pub struct Obj {
    bytes: RefCell<Option<Rc<str>>>,
    rep: RefCell<InternalRep>,
}

impl Obj {
    /// Empty string value
    pub fn new_empty() -> ObjRef {
        Obj::new_string("")
    }

    /// Pure text value
    pub fn new_string(text: impl Into<Rc<str>>) -> ObjRef {
        Rc::new(Obj {
            bytes: RefCell::new(Some(text.into())),
            rep: RefCell::new(InternalRep::None),
        })
    }

    pub fn new_int(value: i64) -> ObjRef {
        Obj::from_rep(InternalRep::Int(value))
    }

    pub fn new_double(value: f64) -> ObjRef {
        Obj::from_rep(InternalRep::Double(value))
    }

    /// Value holding only a structured form; its text is derived on demand
    pub fn from_rep(rep: InternalRep) -> ObjRef {
        Rc::new(Obj {
            bytes: RefCell::new(None),
            rep: RefCell::new(rep),
        })
    }

    /// Registration record of the current structured form
    pub fn obj_type(&self) -> Option<&'static ObjType> {
        self.rep.borrow().obj_type()
    }

    /// Name of the current representation (`"string"` for pure text)
    pub fn type_name(&self) -> &'static str {
        self.obj_type().map_or("string", |ty| ty.name)
    }

    /// Whether the structured form belongs to `ty`
    pub fn has_type(&self, ty: &'static ObjType) -> bool {
        self.obj_type().is_some_and(|own| std::ptr::eq(own, ty))
    }

    /// Borrow the structured form
    pub fn rep(&self) -> Ref<'_, InternalRep> {
        self.rep.borrow()
    }

    pub(crate) fn rep_cell(&self) -> &RefCell<InternalRep> {
        &self.rep
    }

    pub fn has_string_rep(&self) -> bool {
        self.bytes.borrow().is_some()
    }

    /// Text form, generated from the structured form if it is not cached
    pub fn get_string(&self) -> Rc<str> {
        if let Some(bytes) = self.bytes.borrow().as_ref() {
            return Rc::clone(bytes);
        }
        let text: Rc<str> = match self.obj_type() {
            Some(ty) => (ty.update_string)(self).into(),
            // Pure text values always carry bytes; an empty rep with none is
            // only reachable mid-teardown.
            None => Rc::from(""),
        };
        *self.bytes.borrow_mut() = Some(Rc::clone(&text));
        text
    }

    /// Drop the cached text form; the structured form must be valid
    pub fn invalidate_string_rep(&self) {
        debug_assert!(
            self.obj_type().is_some(),
            "invalidating the only representation of a pure string"
        );
        *self.bytes.borrow_mut() = None;
    }

    /// Replace the structured form, freeing the previous one first
    ///
    /// The cached text form is left untouched; callers changing the value
    /// itself must also invalidate it.
    pub fn store_internal_rep(&self, rep: InternalRep) {
        self.release_internal_rep();
        *self.rep.borrow_mut() = rep;
    }

    /// Discard the structured form, keeping the value as pure text
    pub fn free_internal_rep(&self) {
        if self.obj_type().is_none() {
            return;
        }
        self.get_string();
        self.release_internal_rep();
    }

    fn release_internal_rep(&self) {
        let Some(ty) = self.obj_type() else {
            return;
        };
        if let Some(free) = ty.free_internal_rep {
            free(self);
        }
        let old = std::mem::replace(&mut *self.rep.borrow_mut(), InternalRep::None);
        // Dropped outside the borrow: releasing elements can run other
        // objects' free hooks.
        drop(old);
    }

    /// New object with the same value
    ///
    /// The text form is shared (it is immutable) and the structured form is
    /// copied by the type's dup hook.
    pub fn duplicate(&self) -> ObjRef {
        let copy = Rc::new(Obj {
            bytes: RefCell::new(self.bytes.borrow().clone()),
            rep: RefCell::new(InternalRep::None),
        });
        if let Some(ty) = self.obj_type() {
            (ty.dup_internal_rep)(self, &copy);
        }
        copy
    }

    /// Convert to `ty`, a no-op when the value already holds it
    pub fn convert_to_type(&self, ty: &'static ObjType) -> Result<(), ListError> {
        if self.has_type(ty) {
            return Ok(());
        }
        (ty.set_from_any)(self)
    }

    /// Integer value, parsing the text form if needed
    pub fn get_int(&self) -> Result<i64, ListError> {
        if let InternalRep::Int(value) = *self.rep() {
            return Ok(value);
        }
        self.convert_to_type(&INT_TYPE)?;
        match *self.rep() {
            InternalRep::Int(value) => Ok(value),
            _ => unreachable!("set_int_from_any installed another representation"),
        }
    }

    /// Floating-point value; integers widen
    pub fn get_double(&self) -> Result<f64, ListError> {
        match *self.rep() {
            InternalRep::Double(value) => return Ok(value),
            InternalRep::Int(value) => return Ok(value as f64),
            _ => {}
        }
        self.convert_to_type(&DOUBLE_TYPE)?;
        match *self.rep() {
            InternalRep::Double(value) => Ok(value),
            _ => unreachable!("set_double_from_any installed another representation"),
        }
    }
}

impl Drop for Obj {
    fn drop(&mut self) {
        self.release_internal_rep();
    }
}

impl fmt::Debug for Obj {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Obj")
            .field("type", &self.type_name())
            .field("bytes", &self.bytes.borrow())
            .finish()
    }
}

impl fmt::Display for Obj {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.get_string())
    }
}

fn dup_number_rep(src: &Obj, copy: &Obj) {
    let rep = match *src.rep() {
        InternalRep::Int(value) => InternalRep::Int(value),
        InternalRep::Double(value) => InternalRep::Double(value),
        ref other => panic!("dup_number_rep called on {:?}", other.obj_type()),
    };
    copy.store_internal_rep(rep);
}

fn update_string_of_int(obj: &Obj) -> String {
    match *obj.rep() {
        InternalRep::Int(value) => value.to_string(),
        _ => unreachable!("update_string_of_int on a non-int"),
    }
}

fn update_string_of_double(obj: &Obj) -> String {
    match *obj.rep() {
        InternalRep::Double(value) => format_double(value),
        _ => unreachable!("update_string_of_double on a non-double"),
    }
}

fn set_int_from_any(obj: &Obj) -> Result<(), ListError> {
    let text = obj.get_string();
    let value = parse_int(&text).ok_or_else(|| ListError::InvalidNumber {
        expected: "integer",
        text: text.to_string(),
    })?;
    obj.store_internal_rep(InternalRep::Int(value));
    Ok(())
}

fn set_double_from_any(obj: &Obj) -> Result<(), ListError> {
    let text = obj.get_string();
    let value = parse_double(&text).ok_or_else(|| ListError::InvalidNumber {
        expected: "floating-point number",
        text: text.to_string(),
    })?;
    obj.store_internal_rep(InternalRep::Double(value));
    Ok(())
}

/// Parse an integer: optional sign, optional `0x`/`0o`/`0b` radix prefix,
/// surrounding whitespace allowed
pub fn parse_int(text: &str) -> Option<i64> {
    let trimmed = text.trim();
    let (negative, digits) = match trimmed.as_bytes().first()? {
        b'-' => (true, &trimmed[1..]),
        b'+' => (false, &trimmed[1..]),
        _ => (false, trimmed),
    };
    let (radix, digits) = match digits.get(..2) {
        Some("0x") | Some("0X") => (16, &digits[2..]),
        Some("0o") | Some("0O") => (8, &digits[2..]),
        Some("0b") | Some("0B") => (2, &digits[2..]),
        _ => (10, digits),
    };
    if digits.is_empty() || digits.starts_with(['+', '-']) {
        return None;
    }
    // Parse through i128 so i64::MIN round-trips.
    let magnitude = i128::from_str_radix(digits, radix).ok()?;
    let value = if negative { -magnitude } else { magnitude };
    i64::try_from(value).ok()
}

/// Parse a floating-point number, accepting `Inf` and `NaN` spellings
pub fn parse_double(text: &str) -> Option<f64> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return None;
    }
    if let Some(value) = parse_int(trimmed) {
        return Some(value as f64);
    }
    trimmed.parse::<f64>().ok()
}

/// Canonical text of a double
///
/// Shortest round-trip digits, always with a fractional part or exponent so
/// the text reads back as a double: `1.0`, `0.1`, `1e+300`, `1e-7`.
pub fn format_double(value: f64) -> String {
    if value.is_nan() {
        return "NaN".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "Inf" } else { "-Inf" }.to_string();
    }
    let text = format!("{:?}", value);
    match text.split_once('e') {
        Some((mantissa, exp)) if !exp.starts_with('-') => format!("{}e+{}", mantissa, exp),
        _ => text,
    }
}
