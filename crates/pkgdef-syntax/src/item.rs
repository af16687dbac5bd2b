//! Typed slices of document text and the groupings built from them.

use crate::error::{Error, Span};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ItemType {
    Comment,
    EmptyLine,
    RegistryKey,
    PropertyName,
    PropertyValue,
    /// The `=` separator, or the bare `@` default-value marker.
    Operator,
    Preprocessor,
    Unknown,
    ReferenceBraces,
    ReferenceName,
    Entry,
}

impl ItemType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ItemType::Comment => "comment",
            ItemType::EmptyLine => "empty line",
            ItemType::RegistryKey => "registry key",
            ItemType::PropertyName => "property name",
            ItemType::PropertyValue => "property value",
            ItemType::Operator => "operator",
            ItemType::Preprocessor => "preprocessor",
            ItemType::Unknown => "unknown",
            ItemType::ReferenceBraces => "reference braces",
            ItemType::ReferenceName => "reference name",
            ItemType::Entry => "entry",
        }
    }
}

impl fmt::Display for ItemType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Position of an item in its document's flat item sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ItemId(pub usize);

impl ItemId {
    pub fn index(&self) -> usize {
        self.0
    }
}

/// An immutable, typed slice of the document text.
///
/// `id` is the item's index in the owning document. Reference parts are not
/// part of that sequence and carry their host item's id instead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseItem {
    pub id: ItemId,
    pub item_type: ItemType,
    pub span: Span,
    pub text: String,
    pub references: Vec<Reference>,
    pub errors: Vec<Error>,
}

impl ParseItem {
    pub fn new(id: ItemId, item_type: ItemType, start: usize, text: impl Into<String>) -> Self {
        let text = text.into();
        Self {
            id,
            item_type,
            span: Span::with_len(start, text.chars().count()),
            text,
            references: Vec::new(),
            errors: Vec::new(),
        }
    }

    pub fn span(&self) -> Span {
        self.span
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// The text without surrounding whitespace and line breaks.
    pub fn trimmed(&self) -> &str {
        self.text.trim()
    }

    pub fn is(&self, item_type: ItemType) -> bool {
        self.item_type == item_type
    }

    /// True when neither the item nor any of its references carries an error.
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty() && self.references.iter().all(Reference::is_valid)
    }

    pub fn has_error(&self, code: crate::ErrorCode) -> bool {
        self.errors.iter().any(|e| e.code == code)
    }

    /// The reference part under `offset`, if any.
    pub fn reference_part_at(&self, offset: usize) -> Option<&ParseItem> {
        self.references.iter().find_map(|r| r.part_at(offset))
    }
}

/// A `$Name$` occurrence inside a host item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reference {
    pub open: ParseItem,
    pub value: ParseItem,
    /// Missing when the reference is not terminated.
    pub close: Option<ParseItem>,
    pub errors: Vec<Error>,
}

impl Reference {
    pub fn span(&self) -> Span {
        match &self.close {
            Some(close) => self.open.span.merge(&close.span),
            None => self.open.span.merge(&self.value.span),
        }
    }

    /// The full reference text, e.g. `$RootKey$`.
    pub fn text(&self) -> String {
        let mut text = String::with_capacity(self.span().len());
        text.push_str(&self.open.text);
        text.push_str(&self.value.text);
        if let Some(close) = &self.close {
            text.push_str(&close.text);
        }
        text
    }

    pub fn name(&self) -> &str {
        &self.value.text
    }

    pub fn is_closed(&self) -> bool {
        self.close.as_ref().is_some_and(|c| !c.span.is_empty())
    }

    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn has_error(&self, code: crate::ErrorCode) -> bool {
        self.errors.iter().any(|e| e.code == code)
    }

    /// The innermost part containing `offset`. An empty name matches on its
    /// own position so the caret between `$$` resolves to it.
    pub fn part_at(&self, offset: usize) -> Option<&ParseItem> {
        if self.value.span.contains(offset) {
            return Some(&self.value);
        }
        if self.open.span.contains(offset) {
            return Some(&self.open);
        }
        self.close.as_ref().filter(|c| c.span.contains(offset))
    }
}

/// A name/value pair under a registry key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Property {
    pub name: ItemId,
    pub value: ItemId,
}

/// A registry key and its ordered properties.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    pub key: ItemId,
    pub properties: Vec<Property>,
}

impl Entry {
    pub fn new(key: ItemId) -> Self {
        Self {
            key,
            properties: Vec::new(),
        }
    }

    /// From the key's start to the last value's end, or the key's own end.
    pub fn span(&self, items: &[ParseItem]) -> Span {
        let key = items[self.key.index()].span;
        match self.properties.last() {
            Some(last) => Span::new(key.start, items[last.value.index()].span.end),
            None => key,
        }
    }
}
