//! List commands
//!
//! Interpreter-level list operations. They accept materialized lists, text
//! and abstract lists alike: an abstract list is asked through its
//! operation table first, and only materialized when its kind lacks the
//! operation.
//!
//! # Examples
//!
//! ```text
//! lseq 5                  => 0 1 2 3 4
//! lseq 1 10 by 3          => 1 4 7 10
//! lseq 5 to 1             => 5 4 3 2 1
//! lseq 0 count 3 by 0.5   => 0.0 0.5 1.0
//! ```

use crate::arith_series::{ArithSeries, Number, new_arith_series_obj};
use lseq_core::{
    ListError, Obj, ObjRef, ProcType, abstract_list_index, abstract_list_length,
    abstract_list_obj_copy, abstract_list_range, abstract_list_reverse, is_abstract_list,
    list_obj_get_elements, new_list_obj, parse_int,
};
use std::rc::Rc;
use tracing::debug;

const LSEQ_USAGE: &str = "lseq n ??op? n ??by? n??";

/// Resolve an index expression against a list of `len` elements
///
/// Accepts `N`, `end`, `end-N`, `end+N`, `N+M` and `N-M`. The result is
/// not range-checked.
pub fn parse_index(text: &str, len: i64) -> Result<i64, ListError> {
    let bad_index = || ListError::InvalidIndex(text.to_string());
    let trimmed = text.trim();

    if let Some(rest) = trimmed.strip_prefix("end") {
        let last = len - 1;
        if rest.is_empty() {
            return Ok(last);
        }
        if !rest.starts_with(['+', '-']) {
            return Err(bad_index());
        }
        let offset = parse_int(rest).ok_or_else(bad_index)?;
        return Ok(last.saturating_add(offset));
    }

    if let Some(value) = parse_int(trimmed) {
        return Ok(value);
    }

    // N+M / N-M: split at the first operator after the leading sign
    let split = trimmed
        .char_indices()
        .skip(1)
        .find(|(_, c)| *c == '+' || *c == '-')
        .map(|(pos, _)| pos)
        .ok_or_else(bad_index)?;
    let (left, right) = trimmed.split_at(split);
    let left = parse_int(left).ok_or_else(bad_index)?;
    let right = parse_int(right).ok_or_else(bad_index)?;
    Ok(left.saturating_add(right))
}

/// Number of elements
pub fn list_length(obj: &Obj) -> Result<i64, ListError> {
    if is_abstract_list(obj) {
        return abstract_list_length(obj);
    }
    Ok(list_obj_get_elements(obj)?.len() as i64)
}

/// Element at an index expression; out of range gives an empty value
pub fn list_index(obj: &Obj, index: &str) -> Result<ObjRef, ListError> {
    let len = list_length(obj)?;
    let index = parse_index(index, len)?;
    if !(0..len).contains(&index) {
        return Ok(Obj::new_empty());
    }
    if is_abstract_list(obj) {
        return Ok(abstract_list_index(obj, index)?.unwrap_or_else(Obj::new_empty));
    }
    let elements = list_obj_get_elements(obj)?;
    Ok(Rc::clone(&elements[index as usize]))
}

/// Elements `first` through `last` inclusive, clamped to the list
pub fn list_range(obj: &Obj, first: &str, last: &str) -> Result<ObjRef, ListError> {
    let len = list_length(obj)?;
    let from = parse_index(first, len)?.max(0);
    let to = parse_index(last, len)?.min(len - 1);
    if from > to {
        return Ok(new_list_obj(Vec::new()));
    }

    if is_abstract_list(obj) {
        if from == 0 && to == len - 1 {
            return Ok(abstract_list_obj_copy(obj));
        }
        match abstract_list_range(obj, from, to) {
            Err(ListError::Unsupported {
                kind,
                proc: ProcType::Slice,
            }) => debug!(kind, from, to, "slice unsupported, materializing"),
            result => return result,
        }
    }

    let elements = list_obj_get_elements(obj)?;
    Ok(new_list_obj(
        elements[from as usize..=to as usize].to_vec(),
    ))
}

/// Elements in reverse order
pub fn list_reverse(obj: &Obj) -> Result<ObjRef, ListError> {
    if is_abstract_list(obj) {
        match abstract_list_reverse(obj) {
            Err(ListError::Unsupported {
                kind,
                proc: ProcType::Reverse,
            }) => debug!(kind, "reverse unsupported, materializing"),
            result => return result,
        }
    }
    let elements = list_obj_get_elements(obj)?;
    Ok(new_list_obj(elements.iter().rev().cloned().collect()))
}

/// Every element of a list value
pub fn list_elements(obj: &Obj) -> Result<Rc<[ObjRef]>, ListError> {
    list_obj_get_elements(obj)
}

/// Unshared copy of a list value
///
/// Abstract lists stay abstract and start with no text form.
pub fn list_copy(obj: &Obj) -> ObjRef {
    if is_abstract_list(obj) {
        abstract_list_obj_copy(obj)
    } else {
        obj.duplicate()
    }
}

fn is_keyword(obj: &Obj, keywords: &[&str]) -> bool {
    let text = obj.get_string();
    keywords.contains(&&*text)
}

fn count_of(obj: &Obj) -> Result<i64, ListError> {
    obj.get_int()
}

/// The `lseq` command: build an arithmetic series
///
/// ```text
/// lseq count ?by step?
/// lseq start ?to|..? end ??by? step?
/// lseq start count n ??by? step?
/// ```
pub fn lseq(args: &[ObjRef]) -> Result<ObjRef, ListError> {
    let usage = || ListError::Usage(LSEQ_USAGE.to_string());
    let number = |obj: &ObjRef| Number::from_obj(obj);

    let series = match args {
        [count] => ArithSeries::from_count(Number::Int(0), count_of(count)?, None)?,
        [count, by, step] if is_keyword(by, &["by"]) => {
            ArithSeries::from_count(Number::Int(0), count_of(count)?, Some(number(step)?))?
        }
        [start, op, count, rest @ ..] if is_keyword(op, &["count"]) => {
            let step = optional_step(rest).ok_or_else(usage)?;
            let step = step.map(number).transpose()?;
            ArithSeries::from_count(number(start)?, count_of(count)?, step)?
        }
        [start, op, end, rest @ ..] if is_keyword(op, &["to", ".."]) => {
            let step = optional_step(rest).ok_or_else(usage)?;
            let step = step.map(number).transpose()?;
            ArithSeries::from_range(number(start)?, number(end)?, step)?
        }
        [start, end, rest @ ..] if !is_keyword(end, &["by", "count", "to", ".."]) => {
            let step = optional_step(rest).ok_or_else(usage)?;
            let step = step.map(number).transpose()?;
            ArithSeries::from_range(number(start)?, number(end)?, step)?
        }
        _ => return Err(usage()),
    };
    debug!(len = series.len(), "lseq");
    Ok(new_arith_series_obj(series))
}

/// Trailing `?by? step`: `Some(None)` when absent, `None` when malformed
fn optional_step(rest: &[ObjRef]) -> Option<Option<&ObjRef>> {
    match rest {
        [] => Some(None),
        [step] if !is_keyword(step, &["by"]) => Some(Some(step)),
        [by, step] if is_keyword(by, &["by"]) => Some(Some(step)),
        _ => None,
    }
}
