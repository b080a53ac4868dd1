//! Materialized lists
//!
//! The ordinary list representation: an immutable array of element handles.
//! Abstract lists stand in for this type everywhere, so the accessors here
//! accept either representation and only parse text when the value is
//! neither.
//!
//! # Text form
//!
//! Elements are joined with single spaces. An element that would not read
//! back as one word (empty, containing whitespace or list metacharacters)
//! is wrapped in braces, or backslash-escaped when its braces are
//! unbalanced.

use crate::abstract_list::{abstract_list_get_elements, is_abstract_list};
use crate::error::ListError;
use crate::obj::{InternalRep, Obj, ObjRef, ObjType};
use std::rc::Rc;

pub static LIST_TYPE: ObjType = ObjType {
    name: "list",
    free_internal_rep: None,
    dup_internal_rep: dup_list_rep,
    update_string: update_string_of_list,
    set_from_any: set_list_from_any,
};

pub fn new_list_obj(elements: Vec<ObjRef>) -> ObjRef {
    Obj::from_rep(InternalRep::List(elements.into()))
}

/// Elements of any list-like value
///
/// Abstract lists keep their representation and hand out their
/// materialized cache; text values are parsed and converted.
pub fn list_obj_get_elements(obj: &Obj) -> Result<Rc<[ObjRef]>, ListError> {
    if let InternalRep::List(elements) = &*obj.rep() {
        return Ok(Rc::clone(elements));
    }
    if is_abstract_list(obj) {
        return abstract_list_get_elements(obj);
    }
    obj.convert_to_type(&LIST_TYPE)?;
    match &*obj.rep() {
        InternalRep::List(elements) => Ok(Rc::clone(elements)),
        _ => unreachable!("set_list_from_any installed another representation"),
    }
}

fn dup_list_rep(src: &Obj, copy: &Obj) {
    // Elements are immutable, so the array itself can be shared.
    let elements = match &*src.rep() {
        InternalRep::List(elements) => Rc::clone(elements),
        other => panic!("dup_list_rep called on {:?}", other.obj_type()),
    };
    copy.store_internal_rep(InternalRep::List(elements));
}

fn update_string_of_list(obj: &Obj) -> String {
    let elements = match &*obj.rep() {
        InternalRep::List(elements) => Rc::clone(elements),
        _ => unreachable!("update_string_of_list on a non-list"),
    };
    let mut text = String::new();
    for (i, element) in elements.iter().enumerate() {
        if i > 0 {
            text.push(' ');
        }
        quote_element(&element.get_string(), &mut text);
    }
    text
}

fn set_list_from_any(obj: &Obj) -> Result<(), ListError> {
    let elements: Rc<[ObjRef]> = if is_abstract_list(obj) {
        abstract_list_get_elements(obj)?
    } else {
        let text = obj.get_string();
        parse_list(&text)?
            .into_iter()
            .map(Obj::new_string)
            .collect::<Vec<_>>()
            .into()
    };
    obj.store_internal_rep(InternalRep::List(elements));
    Ok(())
}

const METACHARS: [char; 8] = ['{', '}', '"', '\\', '[', ']', '$', ';'];

fn needs_quoting(element: &str) -> bool {
    element.is_empty()
        || element.starts_with('#')
        || element
            .chars()
            .any(|c| c.is_whitespace() || METACHARS.contains(&c))
}

fn braces_balanced(element: &str) -> bool {
    let mut depth = 0usize;
    let mut chars = element.chars();
    while let Some(c) = chars.next() {
        match c {
            '\\' => {
                chars.next();
            }
            '{' => depth += 1,
            '}' => {
                if depth == 0 {
                    return false;
                }
                depth -= 1;
            }
            _ => {}
        }
    }
    depth == 0
}

/// Append `element` to `out` so that it parses back as a single word
pub fn quote_element(element: &str, out: &mut String) {
    if !needs_quoting(element) {
        out.push_str(element);
        return;
    }
    if braces_balanced(element) && !element.ends_with('\\') {
        out.push('{');
        out.push_str(element);
        out.push('}');
        return;
    }
    for c in element.chars() {
        match c {
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            '\r' => out.push_str("\\r"),
            c if c.is_whitespace() || METACHARS.contains(&c) => {
                out.push('\\');
                out.push(c);
            }
            c => out.push(c),
        }
    }
}

/// Split list text into its words
pub fn parse_list(text: &str) -> Result<Vec<String>, ListError> {
    let chars: Vec<char> = text.chars().collect();
    let mut words = Vec::new();
    let mut pos = 0;
    while pos < chars.len() {
        if chars[pos].is_whitespace() {
            pos += 1;
            continue;
        }
        let (word, next) = match chars[pos] {
            '{' => parse_braced(&chars, pos)?,
            '"' => parse_quoted(&chars, pos)?,
            _ => parse_bare(&chars, pos),
        };
        words.push(word);
        pos = next;
    }
    Ok(words)
}

fn parse_braced(chars: &[char], start: usize) -> Result<(String, usize), ListError> {
    let mut depth = 1usize;
    let mut pos = start + 1;
    loop {
        match chars.get(pos) {
            None => {
                return Err(ListError::MalformedList(
                    "unmatched open brace in list".to_string(),
                ));
            }
            Some('\\') => pos += 1,
            Some('{') => depth += 1,
            Some('}') => {
                depth -= 1;
                if depth == 0 {
                    break;
                }
            }
            Some(_) => {}
        }
        pos += 1;
    }
    let word: String = chars[start + 1..pos].iter().collect();
    let next = pos + 1;
    expect_separator(chars, next, "braces")?;
    Ok((word, next))
}

fn parse_quoted(chars: &[char], start: usize) -> Result<(String, usize), ListError> {
    let mut word = String::new();
    let mut pos = start + 1;
    loop {
        match chars.get(pos) {
            None => {
                return Err(ListError::MalformedList(
                    "unmatched open quote in list".to_string(),
                ));
            }
            Some('"') => break,
            Some('\\') => {
                pos += 1;
                match chars.get(pos) {
                    Some(c) => word.push(unescape(*c)),
                    None => word.push('\\'),
                }
            }
            Some(c) => word.push(*c),
        }
        pos += 1;
    }
    let next = pos + 1;
    expect_separator(chars, next, "quotes")?;
    Ok((word, next))
}

fn parse_bare(chars: &[char], start: usize) -> (String, usize) {
    let mut word = String::new();
    let mut pos = start;
    while let Some(&c) = chars.get(pos) {
        if c.is_whitespace() {
            break;
        }
        if c == '\\' {
            pos += 1;
            match chars.get(pos) {
                Some(&escaped) => word.push(unescape(escaped)),
                None => word.push('\\'),
            }
        } else {
            word.push(c);
        }
        pos += 1;
    }
    (word, pos)
}

fn expect_separator(chars: &[char], pos: usize, delimiter: &str) -> Result<(), ListError> {
    match chars.get(pos) {
        None => Ok(()),
        Some(c) if c.is_whitespace() => Ok(()),
        Some(_) => {
            let trailing: String = chars[pos..]
                .iter()
                .take_while(|c| !c.is_whitespace())
                .collect();
            Err(ListError::MalformedList(format!(
                "list element in {} followed by \"{}\" instead of space",
                delimiter, trailing
            )))
        }
    }
}

fn unescape(c: char) -> char {
    match c {
        'n' => '\n',
        't' => '\t',
        'r' => '\r',
        other => other,
    }
}
