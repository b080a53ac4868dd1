//! Abstract lists: list values computed on demand
//!
//! An abstract list answers every list question (length, element at, slice,
//! reverse, text form) through an operation table registered by a concrete
//! sequence kind, instead of storing its elements. A numeric range of a
//! billion integers costs a handful of words until someone asks for all of
//! its elements at once.
//!
//! # Extension contract
//!
//! A kind builds its object in one step with [`AbstractListBuilder`]
//! (construct + register), or in several with [`new_abstract_list_obj`]
//! followed by [`abstract_list_set_proc`]. Its private fields live in the
//! descriptor's payload and are reached from its procs through
//! [`abstract_list_payload`].
//!
//! ```rust,ignore
//! let obj = AbstractListBuilder::new("countdown", Countdown { from: 3 })
//!     .with_proc(AbstractListProc::Length(countdown_length))
//!     .with_proc(AbstractListProc::Index(countdown_index))
//!     .build()?;
//! ```
//!
//! # Dispatch
//!
//! The generic functions never look inside the payload. They copy the slot
//! they need out of the descriptor and call it with no borrow held, so a
//! kind is free to read (or lazily update) its own payload from inside a
//! proc. An empty slot is reported as [`ListError::Unsupported`]; whatever a
//! registered proc returns, including its own errors, passes through
//! unchanged.
//!
//! # Element cache
//!
//! [`abstract_list_get_elements`] is the one place the generic layer forces
//! full materialization. The array is built at most once per object and kept
//! until the object is freed. Copies made by [`abstract_list_obj_copy`] or
//! [`Obj::duplicate`] start with an empty cache.

use crate::error::ListError;
use crate::obj::{InternalRep, Obj, ObjRef, ObjType};
use std::any::Any;
use std::cell::{Ref, RefMut};
use std::fmt;
use std::rc::Rc;
use tracing::{debug, trace};

/// Descriptor layout version
pub const ABSTRACT_LIST_VERSION_1: u32 = 1;

pub static ABSTRACT_LIST_TYPE: ObjType = ObjType {
    name: "abstractlist",
    free_internal_rep: Some(free_abstract_list_rep),
    dup_internal_rep: dup_abstract_list_rep,
    update_string: update_string_of_abstract_list,
    set_from_any: set_abstract_list_from_any,
};

/// Kind-specific constructor from command arguments
pub type NewObjProc = fn(args: &[ObjRef]) -> Result<ObjRef, ListError>;
/// Fix up a freshly copied payload; `copy` already holds a shallow copy
pub type DupRepProc = fn(src: &Obj, copy: &Obj);
pub type LengthProc = fn(&Obj) -> i64;
/// Element at an index, `None` when the kind has no element there
pub type IndexProc = fn(&Obj, i64) -> Option<ObjRef>;
/// Inclusive sub-range
pub type SliceProc = fn(&Obj, i64, i64) -> Result<ObjRef, ListError>;
pub type ReverseProc = fn(&Obj) -> Result<ObjRef, ListError>;

/// Names one slot of the operation table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProcType {
    New,
    DupRep,
    Length,
    Index,
    Slice,
    Reverse,
}

impl fmt::Display for ProcType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ProcType::New => "new",
            ProcType::DupRep => "duplicate",
            ProcType::Length => "length",
            ProcType::Index => "index",
            ProcType::Slice => "slice",
            ProcType::Reverse => "reverse",
        };
        f.write_str(name)
    }
}

/// One operation, ready to be installed in its slot
#[derive(Clone, Copy)]
pub enum AbstractListProc {
    New(NewObjProc),
    DupRep(DupRepProc),
    Length(LengthProc),
    Index(IndexProc),
    Slice(SliceProc),
    Reverse(ReverseProc),
}

impl AbstractListProc {
    pub fn proc_type(&self) -> ProcType {
        match self {
            AbstractListProc::New(_) => ProcType::New,
            AbstractListProc::DupRep(_) => ProcType::DupRep,
            AbstractListProc::Length(_) => ProcType::Length,
            AbstractListProc::Index(_) => ProcType::Index,
            AbstractListProc::Slice(_) => ProcType::Slice,
            AbstractListProc::Reverse(_) => ProcType::Reverse,
        }
    }
}

impl fmt::Debug for AbstractListProc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AbstractListProc::{:?}", self.proc_type())
    }
}

/// Operation table of a sequence kind; an empty slot means unsupported
#[derive(Clone, Copy, Default)]
pub struct ProcTable {
    pub new_obj: Option<NewObjProc>,
    pub dup_rep: Option<DupRepProc>,
    pub length: Option<LengthProc>,
    pub index: Option<IndexProc>,
    pub slice: Option<SliceProc>,
    pub reverse: Option<ReverseProc>,
}

impl ProcTable {
    pub fn set(&mut self, proc: AbstractListProc) {
        match proc {
            AbstractListProc::New(f) => self.new_obj = Some(f),
            AbstractListProc::DupRep(f) => self.dup_rep = Some(f),
            AbstractListProc::Length(f) => self.length = Some(f),
            AbstractListProc::Index(f) => self.index = Some(f),
            AbstractListProc::Slice(f) => self.slice = Some(f),
            AbstractListProc::Reverse(f) => self.reverse = Some(f),
        }
    }

    pub fn has(&self, proc: ProcType) -> bool {
        match proc {
            ProcType::New => self.new_obj.is_some(),
            ProcType::DupRep => self.dup_rep.is_some(),
            ProcType::Length => self.length.is_some(),
            ProcType::Index => self.index.is_some(),
            ProcType::Slice => self.slice.is_some(),
            ProcType::Reverse => self.reverse.is_some(),
        }
    }
}

impl fmt::Debug for ProcTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let registered: Vec<ProcType> = [
            ProcType::New,
            ProcType::DupRep,
            ProcType::Length,
            ProcType::Index,
            ProcType::Slice,
            ProcType::Reverse,
        ]
        .into_iter()
        .filter(|proc| self.has(*proc))
        .collect();
        f.debug_struct("ProcTable")
            .field("registered", &registered)
            .finish()
    }
}

/// Private state of a sequence kind
///
/// Implemented for every `Clone + Debug + 'static` type. Cloning is the
/// shallow half of duplication; a kind whose fields must not be shared
/// between copies fixes them up in its `DupRep` proc.
pub trait ListPayload: Any + fmt::Debug {
    fn clone_payload(&self) -> Box<dyn ListPayload>;
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
    fn payload_size(&self) -> usize;
}

impl<T: Any + Clone + fmt::Debug> ListPayload for T {
    fn clone_payload(&self) -> Box<dyn ListPayload> {
        Box::new(self.clone())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn payload_size(&self) -> usize {
        std::mem::size_of::<T>()
    }
}

/// Structured form of an abstract list
#[derive(Debug)]
pub struct AbstractList {
    version: u32,
    type_name: &'static str,
    rep_size: usize,
    procs: ProcTable,
    elements: Option<Rc<[ObjRef]>>,
    payload: Box<dyn ListPayload>,
}

impl AbstractList {
    fn new(type_name: &'static str, payload: Box<dyn ListPayload>) -> Self {
        let rep_size = std::mem::size_of::<AbstractList>() + (*payload).payload_size();
        AbstractList {
            version: ABSTRACT_LIST_VERSION_1,
            type_name,
            rep_size,
            procs: ProcTable::default(),
            elements: None,
            payload,
        }
    }

    pub fn version(&self) -> u32 {
        self.version
    }

    /// Kind identifier, for diagnostics
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Header plus payload size in bytes
    pub fn rep_size(&self) -> usize {
        self.rep_size
    }

    pub fn procs(&self) -> ProcTable {
        self.procs
    }

    /// Whether the element array has been materialized
    pub fn has_elements(&self) -> bool {
        self.elements.is_some()
    }

    pub fn payload(&self) -> &dyn ListPayload {
        &*self.payload
    }
}

/// Create an abstract list with an empty operation table
///
/// The object is not usable until at least `length` and `index` are
/// registered; prefer [`AbstractListBuilder`], which enforces that.
pub fn new_abstract_list_obj<T: ListPayload>(type_name: &'static str, payload: T) -> ObjRef {
    new_abstract_list_obj_boxed(type_name, Box::new(payload))
}

fn new_abstract_list_obj_boxed(type_name: &'static str, payload: Box<dyn ListPayload>) -> ObjRef {
    let rep = AbstractList::new(type_name, payload);
    trace!(kind = type_name, rep_size = rep.rep_size, "new abstract list");
    Obj::from_rep(InternalRep::AbstractList(Box::new(rep)))
}

/// Builds an abstract list and refuses to publish it half-registered
pub struct AbstractListBuilder {
    type_name: &'static str,
    payload: Box<dyn ListPayload>,
    procs: Vec<AbstractListProc>,
}

impl AbstractListBuilder {
    pub fn new<T: ListPayload>(type_name: &'static str, payload: T) -> Self {
        AbstractListBuilder {
            type_name,
            payload: Box::new(payload),
            procs: Vec::new(),
        }
    }

    pub fn with_proc(mut self, proc: AbstractListProc) -> Self {
        self.procs.push(proc);
        self
    }

    /// Construct the object and register every proc
    ///
    /// Fails with [`ListError::MissingRequiredProc`] unless both `length`
    /// and `index` were supplied.
    pub fn build(self) -> Result<ObjRef, ListError> {
        for required in [ProcType::Length, ProcType::Index] {
            if !self.procs.iter().any(|p| p.proc_type() == required) {
                return Err(ListError::MissingRequiredProc {
                    kind: self.type_name,
                    proc: required,
                });
            }
        }
        let obj = new_abstract_list_obj_boxed(self.type_name, self.payload);
        for proc in self.procs {
            abstract_list_set_proc(&obj, proc)?;
        }
        Ok(obj)
    }
}

pub fn is_abstract_list(obj: &Obj) -> bool {
    obj.has_type(&ABSTRACT_LIST_TYPE)
}

/// Kind of an abstract list, `None` for other values
pub fn abstract_list_type_name(obj: &Obj) -> Option<&'static str> {
    match &*obj.rep() {
        InternalRep::AbstractList(rep) => Some(rep.type_name),
        _ => None,
    }
}

/// Borrow the descriptor of an abstract list
pub fn abstract_list_rep(obj: &Obj) -> Result<Ref<'_, AbstractList>, ListError> {
    Ref::filter_map(obj.rep(), |rep| match rep {
        InternalRep::AbstractList(rep) => Some(rep.as_ref()),
        _ => None,
    })
    .map_err(|rep| ListError::NotAbstractList {
        found: rep.obj_type().map_or("string", |ty| ty.name),
    })
}

fn abstract_list_rep_mut(obj: &Obj) -> Result<RefMut<'_, AbstractList>, ListError> {
    RefMut::filter_map(obj.rep_cell().borrow_mut(), |rep| match rep {
        InternalRep::AbstractList(rep) => Some(rep.as_mut()),
        _ => None,
    })
    .map_err(|rep| ListError::NotAbstractList {
        found: rep.obj_type().map_or("string", |ty| ty.name),
    })
}

/// Typed view of a kind's payload
///
/// # Panics
///
/// When `obj` is not an abstract list or its payload is not a `T`. Procs
/// are only ever called on objects of their own kind, so either case is a
/// broken registration.
pub fn abstract_list_payload<T: 'static>(obj: &Obj) -> Ref<'_, T> {
    let rep = abstract_list_rep(obj)
        .unwrap_or_else(|err| panic!("abstract_list_payload: {}", err));
    let kind = rep.type_name;
    Ref::filter_map(rep, |rep| (*rep.payload).as_any().downcast_ref::<T>()).unwrap_or_else(|_| {
        panic!(
            "abstract_list_payload: {} payload is not a {}",
            kind,
            std::any::type_name::<T>()
        )
    })
}

/// Mutable typed view of a kind's payload
///
/// # Panics
///
/// Same conditions as [`abstract_list_payload`].
pub fn abstract_list_payload_mut<T: 'static>(obj: &Obj) -> RefMut<'_, T> {
    let rep = abstract_list_rep_mut(obj)
        .unwrap_or_else(|err| panic!("abstract_list_payload_mut: {}", err));
    let kind = rep.type_name;
    RefMut::filter_map(rep, |rep| (*rep.payload).as_any_mut().downcast_mut::<T>()).unwrap_or_else(
        |_| {
            panic!(
                "abstract_list_payload_mut: {} payload is not a {}",
                kind,
                std::any::type_name::<T>()
            )
        },
    )
}

/// Install one operation on an abstract list
pub fn abstract_list_set_proc(obj: &Obj, proc: AbstractListProc) -> Result<(), ListError> {
    let mut rep = abstract_list_rep_mut(obj)?;
    trace!(kind = rep.type_name, proc = %proc.proc_type(), "register proc");
    rep.procs.set(proc);
    Ok(())
}

fn procs_of(obj: &Obj) -> Result<(&'static str, ProcTable), ListError> {
    let rep = abstract_list_rep(obj)?;
    Ok((rep.type_name, rep.procs))
}

/// Number of elements
pub fn abstract_list_length(obj: &Obj) -> Result<i64, ListError> {
    let (kind, procs) = procs_of(obj)?;
    let length = procs.length.ok_or(ListError::Unsupported {
        kind,
        proc: ProcType::Length,
    })?;
    Ok(length(obj))
}

/// Element at `index`
///
/// The index is passed to the kind unchecked; `Ok(None)` means the kind has
/// no element there.
pub fn abstract_list_index(obj: &Obj, index: i64) -> Result<Option<ObjRef>, ListError> {
    let (kind, procs) = procs_of(obj)?;
    let index_proc = procs.index.ok_or(ListError::Unsupported {
        kind,
        proc: ProcType::Index,
    })?;
    Ok(index_proc(obj, index))
}

/// Inclusive sub-range `[from, to]`, as decided by the kind
pub fn abstract_list_range(obj: &Obj, from: i64, to: i64) -> Result<ObjRef, ListError> {
    let (kind, procs) = procs_of(obj)?;
    let slice = procs.slice.ok_or(ListError::Unsupported {
        kind,
        proc: ProcType::Slice,
    })?;
    slice(obj, from, to)
}

/// Elements in reverse order, as decided by the kind
pub fn abstract_list_reverse(obj: &Obj) -> Result<ObjRef, ListError> {
    let (kind, procs) = procs_of(obj)?;
    let reverse = procs.reverse.ok_or(ListError::Unsupported {
        kind,
        proc: ProcType::Reverse,
    })?;
    reverse(obj)
}

/// Every element, materialized once and cached on the object
///
/// Later calls return the same array. On failure the cache stays empty and
/// any elements fetched so far are released.
pub fn abstract_list_get_elements(obj: &Obj) -> Result<Rc<[ObjRef]>, ListError> {
    let (kind, procs) = procs_of(obj)?;
    if let Some(elements) = abstract_list_rep(obj)?.elements.as_ref() {
        return Ok(Rc::clone(elements));
    }

    let length = procs.length.ok_or(ListError::Unsupported {
        kind,
        proc: ProcType::Length,
    })?;
    let index = procs.index.ok_or(ListError::Unsupported {
        kind,
        proc: ProcType::Index,
    })?;

    let count = length(obj).max(0);
    let requested = count as u64;
    let mut elements: Vec<ObjRef> = Vec::new();
    usize::try_from(count)
        .ok()
        .and_then(|n| elements.try_reserve_exact(n).ok())
        .ok_or(ListError::OutOfMemory { requested })?;

    debug!(kind, count, "materializing abstract list");
    for i in 0..count {
        let element = index(obj, i).ok_or(ListError::MissingElement { kind, index: i })?;
        elements.push(element);
    }

    let elements: Rc<[ObjRef]> = elements.into();
    abstract_list_rep_mut(obj)?.elements = Some(Rc::clone(&elements));
    Ok(elements)
}

/// Copy of an abstract list with an empty cache and no text form
///
/// Counterpart of taking the full range `[0, end]` without materializing.
///
/// # Panics
///
/// When `obj` is not an abstract list: nothing can be converted into one.
pub fn abstract_list_obj_copy(obj: &Obj) -> ObjRef {
    if !is_abstract_list(obj) {
        // Always fatal, with the diagnostic we want.
        let _ = set_abstract_list_from_any(obj);
    }
    let copy = Obj::from_rep(InternalRep::None);
    dup_abstract_list_rep(obj, &copy);
    copy
}

fn free_abstract_list_rep(obj: &Obj) {
    let elements = {
        let mut rep = obj.rep_cell().borrow_mut();
        match &mut *rep {
            InternalRep::AbstractList(rep) => {
                trace!(
                    kind = rep.type_name,
                    cached = rep.elements.as_ref().map_or(0, |e| e.len()),
                    "free abstract list"
                );
                rep.elements.take()
            }
            _ => None,
        }
    };
    // Released with no borrow held: an element may be the last handle to
    // another abstract list.
    drop(elements);
}

fn dup_abstract_list_rep(src: &Obj, copy: &Obj) {
    let (dup_rep, kind) = {
        let src_rep = abstract_list_rep(src)
            .unwrap_or_else(|err| panic!("dup_abstract_list_rep: {}", err));
        let copy_rep = AbstractList {
            version: src_rep.version,
            type_name: src_rep.type_name,
            rep_size: src_rep.rep_size,
            procs: src_rep.procs,
            elements: None,
            payload: (*src_rep.payload).clone_payload(),
        };
        copy.store_internal_rep(InternalRep::AbstractList(Box::new(copy_rep)));
        (src_rep.procs.dup_rep, src_rep.type_name)
    };
    debug!(kind, fixup = dup_rep.is_some(), "duplicated abstract list");
    if let Some(dup_rep) = dup_rep {
        dup_rep(src, copy);
    }
}

/// Two passes over the elements: size, then fill
///
/// Every element is fetched twice and converted to text in both passes;
/// `index` must be a pure function of the position.
fn update_string_of_abstract_list(obj: &Obj) -> String {
    let (kind, procs) =
        procs_of(obj).unwrap_or_else(|err| panic!("update_string_of_abstract_list: {}", err));
    let (Some(length), Some(index)) = (procs.length, procs.index) else {
        panic!("update_string_of_abstract_list: {} lacks length or index", kind);
    };
    let element_at = |i: i64| -> ObjRef {
        index(obj, i).unwrap_or_else(|| {
            panic!(
                "update_string_of_abstract_list: {} has no element at {}",
                kind, i
            )
        })
    };

    let count = length(obj);
    if count <= 0 {
        return String::new();
    }

    let mut total = 0usize;
    for i in 0..count {
        let element = element_at(i);
        total += element.get_string().len() + 1;
    }

    let mut text = String::with_capacity(total);
    for i in 0..count {
        let element = element_at(i);
        text.push_str(&element.get_string());
        text.push(' ');
    }
    // The last separator becomes the terminator.
    text.pop();
    debug_assert_eq!(text.len(), total - 1);
    trace!(kind, count, bytes = text.len(), "stringified abstract list");
    text
}

fn set_abstract_list_from_any(obj: &Obj) -> Result<(), ListError> {
    panic!(
        "set_abstract_list_from_any: cannot convert a {} into an abstract list",
        obj.type_name()
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    /// Squares of 0..n
    #[derive(Debug, Clone)]
    struct Squares {
        n: i64,
    }

    fn squares_length(obj: &Obj) -> i64 {
        abstract_list_payload::<Squares>(obj).n
    }

    fn squares_index(obj: &Obj, index: i64) -> Option<ObjRef> {
        let n = abstract_list_payload::<Squares>(obj).n;
        (0..n).contains(&index).then(|| Obj::new_int(index * index))
    }

    fn squares(n: i64) -> ObjRef {
        AbstractListBuilder::new("squares", Squares { n })
            .with_proc(AbstractListProc::Length(squares_length))
            .with_proc(AbstractListProc::Index(squares_index))
            .build()
            .unwrap()
    }

    #[test]
    fn test_new_obj_starts_empty() {
        let obj = new_abstract_list_obj("squares", Squares { n: 2 });
        assert!(is_abstract_list(&obj));
        assert!(!obj.has_string_rep());
        let rep = abstract_list_rep(&obj).unwrap();
        assert_eq!(rep.version(), ABSTRACT_LIST_VERSION_1);
        assert_eq!(rep.type_name(), "squares");
        assert!(!rep.has_elements());
        assert!(!rep.procs().has(ProcType::Length));
        assert!(rep.rep_size() >= std::mem::size_of::<AbstractList>());
    }

    #[test]
    fn test_unregistered_slot_is_unsupported() {
        let obj = new_abstract_list_obj("squares", Squares { n: 2 });
        assert_eq!(
            abstract_list_length(&obj),
            Err(ListError::Unsupported {
                kind: "squares",
                proc: ProcType::Length
            })
        );
        abstract_list_set_proc(&obj, AbstractListProc::Length(squares_length)).unwrap();
        assert_eq!(abstract_list_length(&obj), Ok(2));
        assert!(matches!(
            abstract_list_reverse(&obj),
            Err(ListError::Unsupported {
                proc: ProcType::Reverse,
                ..
            })
        ));
    }

    #[test]
    fn test_set_proc_on_foreign_value() {
        let obj = Obj::new_int(1);
        assert_eq!(
            abstract_list_set_proc(&obj, AbstractListProc::Length(squares_length)),
            Err(ListError::NotAbstractList { found: "int" })
        );
    }

    #[test]
    fn test_builder_requires_length_and_index() {
        let err = AbstractListBuilder::new("squares", Squares { n: 1 })
            .with_proc(AbstractListProc::Length(squares_length))
            .build()
            .unwrap_err();
        assert_eq!(
            err,
            ListError::MissingRequiredProc {
                kind: "squares",
                proc: ProcType::Index
            }
        );
    }

    #[test]
    fn test_index_passes_kind_result_through() {
        let obj = squares(4);
        let element = abstract_list_index(&obj, 3).unwrap().unwrap();
        assert_eq!(&*element.get_string(), "9");
        assert!(abstract_list_index(&obj, 4).unwrap().is_none());
        assert!(abstract_list_index(&obj, -1).unwrap().is_none());
    }

    #[test]
    fn test_to_string() {
        let obj = squares(4);
        assert_eq!(&*obj.get_string(), "0 1 4 9");
        assert_eq!(&*squares(0).get_string(), "");
    }

    #[test]
    fn test_get_elements_is_cached() {
        let obj = squares(3);
        let first = abstract_list_get_elements(&obj).unwrap();
        let second = abstract_list_get_elements(&obj).unwrap();
        assert!(Rc::ptr_eq(&first, &second));
        assert_eq!(first.len(), 3);
        assert!(abstract_list_rep(&obj).unwrap().has_elements());
    }

    #[test]
    fn test_get_elements_on_foreign_value() {
        let obj = Obj::new_string("a b");
        assert_eq!(
            abstract_list_get_elements(&obj).unwrap_err(),
            ListError::NotAbstractList { found: "string" }
        );
    }

    thread_local! {
        static HOLES_SEEN: Cell<i64> = const { Cell::new(0) };
    }

    /// Claims four elements but has none at index 2
    fn holey_index(_obj: &Obj, index: i64) -> Option<ObjRef> {
        HOLES_SEEN.with(|seen| seen.set(seen.get() + 1));
        (index != 2).then(|| Obj::new_int(index))
    }

    #[test]
    fn test_get_elements_failure_leaves_no_cache() {
        let obj = AbstractListBuilder::new("holey", Squares { n: 4 })
            .with_proc(AbstractListProc::Length(squares_length))
            .with_proc(AbstractListProc::Index(holey_index))
            .build()
            .unwrap();
        HOLES_SEEN.with(|seen| seen.set(0));
        assert_eq!(
            abstract_list_get_elements(&obj).unwrap_err(),
            ListError::MissingElement {
                kind: "holey",
                index: 2
            }
        );
        assert_eq!(HOLES_SEEN.with(|seen| seen.get()), 3);
        assert!(!abstract_list_rep(&obj).unwrap().has_elements());
    }

    #[test]
    fn test_obj_copy_has_no_text_and_no_cache() {
        let obj = squares(3);
        obj.get_string();
        abstract_list_get_elements(&obj).unwrap();

        let copy = abstract_list_obj_copy(&obj);
        assert!(!copy.has_string_rep());
        assert!(!abstract_list_rep(&copy).unwrap().has_elements());
        assert_eq!(&*copy.get_string(), "0 1 4");
    }

    #[test]
    #[should_panic(expected = "cannot convert a string into an abstract list")]
    fn test_obj_copy_of_foreign_value_is_fatal() {
        let obj = Obj::new_string("1 2 3");
        abstract_list_obj_copy(&obj);
    }

    #[test]
    #[should_panic(expected = "cannot convert a int into an abstract list")]
    fn test_coerce_is_fatal() {
        let obj = Obj::new_int(3);
        let _ = obj.convert_to_type(&ABSTRACT_LIST_TYPE);
    }

    #[test]
    #[should_panic(expected = "payload is not a")]
    fn test_wrong_payload_kind_is_fatal() {
        let obj = squares(1);
        let _ = abstract_list_payload::<String>(&obj);
    }

    #[test]
    fn test_free_internal_rep_keeps_text() {
        let obj = squares(3);
        abstract_list_get_elements(&obj).unwrap();
        obj.free_internal_rep();
        assert!(!is_abstract_list(&obj));
        assert_eq!(&*obj.get_string(), "0 1 4");
    }

    #[test]
    fn test_proc_table_debug_lists_registered_slots() {
        let obj = squares(1);
        let procs = abstract_list_rep(&obj).unwrap().procs();
        assert_eq!(
            format!("{:?}", procs),
            "ProcTable { registered: [Length, Index] }"
        );
    }
}
