//! Rule checks over a tokenized document.
//!
//! Rules are independent and additive: one item may collect several errors.
//! Nothing here fails; every violation becomes an [`Error`] on the item or
//! reference it concerns.

use crate::error::{Error, ErrorCode};
use crate::item::{Entry, ItemType, ParseItem, Reference};
use crate::variables;
use std::collections::HashSet;

/// Attaches errors to `items` and returns whether the document is clean.
pub fn validate(items: &mut [ParseItem], entries: &[Entry]) -> bool {
    for item in items.iter_mut() {
        match item.item_type {
            ItemType::Unknown => item.errors.push(Error::new(ErrorCode::PL001)),
            ItemType::RegistryKey => check_key(item),
            ItemType::PropertyName => check_name(item),
            ItemType::PropertyValue => check_value(item),
            _ => {}
        }

        for reference in item.references.iter_mut() {
            check_reference(reference);
        }
    }

    check_duplicate_keys(items, entries);

    items.iter().all(ParseItem::is_valid)
}

fn check_key(item: &mut ParseItem) {
    let text = item.trimmed();

    let unclosed = !text.ends_with(']');
    let forward_slash = has_unescaped_slash(text);

    if unclosed {
        item.errors.push(Error::new(ErrorCode::PL002));
    }
    if forward_slash {
        item.errors.push(Error::new(ErrorCode::PL003));
    }
}

fn has_unescaped_slash(text: &str) -> bool {
    let bytes = text.as_bytes();
    bytes
        .iter()
        .enumerate()
        .any(|(i, &b)| b == b'/' && (i == 0 || bytes[i - 1] != b'\\'))
}

// Only earlier keys count, so the first occurrence stays clean.
fn check_duplicate_keys(items: &mut [ParseItem], entries: &[Entry]) {
    let mut seen = HashSet::with_capacity(entries.len());

    for entry in entries {
        let key = &mut items[entry.key.index()];
        let normalized = key.trimmed().to_lowercase();

        if !seen.insert(normalized) {
            let error = Error::with_arg(ErrorCode::PL008, key.trimmed());
            key.errors.push(error);
        }
    }
}

fn check_name(item: &mut ParseItem) {
    let name = item.trimmed();

    if name == "\"@\"" {
        item.errors.push(Error::new(ErrorCode::PL004));
    } else if !is_quoted(name) {
        item.errors.push(Error::new(ErrorCode::PL005));
    }
}

fn is_quoted(text: &str) -> bool {
    text.len() >= 2 && text.starts_with('"') && text.ends_with('"')
}

fn check_value(item: &mut ParseItem) {
    let value = item.trimmed();

    let code = match ValueKind::of(value) {
        ValueKind::String => (!is_quoted(value)).then_some(ErrorCode::PL005),
        ValueKind::Dword(digits) => (!is_hex_of_len(digits, 8)).then_some(ErrorCode::PL009),
        ValueKind::Qword(digits) => (!is_hex_of_len(digits, 16)).then_some(ErrorCode::PL010),
        ValueKind::Hex(bytes) => (!is_hex_byte_list(bytes)).then_some(ErrorCode::PL011),
        ValueKind::Other => Some(ErrorCode::PL005),
    };

    if let Some(code) = code {
        item.errors.push(Error::new(code));
    }
}

fn check_reference(reference: &mut Reference) {
    if !reference.text().trim().ends_with('$') {
        reference.errors.push(Error::new(ErrorCode::PL007));
    }

    if !variables::is_defined(reference.name()) {
        let error = Error::with_arg(ErrorCode::PL006, reference.name());
        reference.errors.push(error);
    }
}

/// Sub-classification of a property value by its leading tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind<'a> {
    String,
    Dword(&'a str),
    Qword(&'a str),
    Hex(&'a str),
    Other,
}

impl<'a> ValueKind<'a> {
    /// Classifies a trimmed value. Tags are matched case-insensitively.
    pub fn of(value: &'a str) -> Self {
        if value.starts_with('"') {
            return ValueKind::String;
        }
        if let Some(rest) = strip_prefix_ignore_case(value, "dword:") {
            return ValueKind::Dword(rest);
        }
        if let Some(rest) = strip_prefix_ignore_case(value, "qword:") {
            return ValueKind::Qword(rest);
        }
        if let Some(rest) = strip_hex_tag(value) {
            return ValueKind::Hex(rest);
        }
        ValueKind::Other
    }
}

fn strip_prefix_ignore_case<'a>(text: &'a str, prefix: &str) -> Option<&'a str> {
    let head = text.get(..prefix.len())?;
    head.eq_ignore_ascii_case(prefix).then(|| &text[prefix.len()..])
}

// `hex:` or `hex(n):` where n is a hex type number.
fn strip_hex_tag(text: &str) -> Option<&str> {
    let rest = strip_prefix_ignore_case(text, "hex")?;
    if let Some(rest) = rest.strip_prefix(':') {
        return Some(rest);
    }

    let inner = rest.strip_prefix('(')?;
    let close = inner.find(')')?;
    let kind = &inner[..close];
    if kind.is_empty() || !kind.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    inner[close + 1..].strip_prefix(':')
}

fn is_hex_of_len(digits: &str, len: usize) -> bool {
    digits.len() == len && digits.chars().all(|c| c.is_ascii_hexdigit())
}

fn is_hex_byte_list(bytes: &str) -> bool {
    let bytes = bytes.trim();
    if bytes.is_empty() {
        return true;
    }
    bytes.split(',').all(|b| is_hex_of_len(b.trim(), 2))
}
