//! The immutable result of one tokenize → organize → validate pass.

use crate::error::{ErrorReport, Span};
use crate::item::{Entry, ItemId, ItemType, ParseItem, Property, Reference};
use crate::{lexer, organizer, validator};
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

/// Hash of the line content, used to skip passes over unchanged text.
pub fn content_hash<S: AsRef<str>>(lines: &[S]) -> u64 {
    let mut hasher = DefaultHasher::new();
    lines.len().hash(&mut hasher);
    for line in lines {
        line.as_ref().hash(&mut hasher);
    }
    hasher.finish()
}

/// Runs a full pass over `lines`.
pub fn parse<S: AsRef<str>>(lines: &[S]) -> ParsedDocument {
    let mut items = lexer::tokenize(lines);
    let entries = organizer::organize(&items);
    let is_valid = validator::validate(&mut items, &entries);

    let mut line_starts = Vec::with_capacity(lines.len() + 1);
    let mut offset = 0;
    line_starts.push(0);
    for line in lines {
        offset += line.as_ref().chars().count();
        if line.as_ref().ends_with('\n') {
            line_starts.push(offset);
        }
    }

    ParsedDocument {
        items,
        entries,
        line_starts,
        len: offset,
        is_valid,
        hash: content_hash(lines),
    }
}

/// What the caret sits in, for completion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompletionContext {
    /// Inside a `$` reference; `prefix` is the name typed so far.
    Variable { prefix: String, span: Span },
    Key,
    PropertyName,
    PropertyValue,
    None,
}

/// A validated document snapshot. Never mutated once built.
///
/// Every offset taken or returned is a character position in the text the
/// snapshot was built from.
#[derive(Debug, Clone)]
pub struct ParsedDocument {
    items: Vec<ParseItem>,
    entries: Vec<Entry>,
    line_starts: Vec<usize>,
    len: usize,
    is_valid: bool,
    hash: u64,
}

/// The empty document: no items, nothing wrong with it.
impl Default for ParsedDocument {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            entries: Vec::new(),
            line_starts: vec![0],
            len: 0,
            is_valid: true,
            hash: content_hash::<&str>(&[]),
        }
    }
}

impl ParsedDocument {
    pub fn items(&self) -> &[ParseItem] {
        &self.items
    }

    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    /// True iff no item and no reference carries an error.
    pub fn is_valid(&self) -> bool {
        self.is_valid
    }

    pub fn hash(&self) -> u64 {
        self.hash
    }

    /// Length of the document text in characters.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn item(&self, id: ItemId) -> &ParseItem {
        &self.items[id.index()]
    }

    pub fn previous(&self, item: &ParseItem) -> Option<&ParseItem> {
        item.id.index().checked_sub(1).and_then(|i| self.items.get(i))
    }

    pub fn next(&self, item: &ParseItem) -> Option<&ParseItem> {
        self.items.get(item.id.index() + 1)
    }

    pub fn key(&self, entry: &Entry) -> &ParseItem {
        self.item(entry.key)
    }

    pub fn property(&self, property: &Property) -> (&ParseItem, &ParseItem) {
        (self.item(property.name), self.item(property.value))
    }

    pub fn entry_span(&self, entry: &Entry) -> Span {
        entry.span(&self.items)
    }

    /// The entry as a single item covering its key and properties.
    pub fn entry_item(&self, entry: &Entry) -> ParseItem {
        let span = self.entry_span(entry);
        let text: String = self
            .items
            .iter()
            .skip(entry.key.index())
            .take_while(|i| i.span.start < span.end)
            .map(|i| i.text.as_str())
            .collect();
        ParseItem::new(entry.key, ItemType::Entry, span.start, text)
    }

    /// The entry whose key or properties cover `offset`.
    pub fn entry_at(&self, offset: usize) -> Option<&Entry> {
        self.entries
            .iter()
            .find(|e| self.entry_span(e).contains(offset))
    }

    /// Index of the item whose span holds `offset`.
    fn index_at(&self, offset: usize) -> Option<usize> {
        let idx = self
            .items
            .partition_point(|item| item.span.start <= offset)
            .checked_sub(1)?;
        self.items[idx].span.contains(offset).then_some(idx)
    }

    /// The innermost item whose span contains `offset`.
    ///
    /// A reference part wins over its host item. An offset at the very end
    /// of the document resolves to the last item.
    pub fn find_item_from_position(&self, offset: usize) -> Option<&ParseItem> {
        let idx = match self.index_at(offset) {
            Some(idx) => idx,
            None if offset == self.len && !self.items.is_empty() => self.items.len() - 1,
            None => return None,
        };

        let host = &self.items[idx];
        Some(host.reference_part_at(offset).unwrap_or(host))
    }

    /// The reference the caret is in or directly after.
    pub fn reference_at(&self, offset: usize) -> Option<&Reference> {
        self.hosts_around(offset)
            .flat_map(|host| host.references.iter())
            .find(|r| r.span().touches(offset))
    }

    fn hosts_around(&self, offset: usize) -> impl Iterator<Item = &ParseItem> {
        let here = self.index_at(offset);
        let before = offset.checked_sub(1).and_then(|o| self.index_at(o));
        let before = before.filter(|b| Some(*b) != here);
        here.into_iter().chain(before).map(|i| &self.items[i])
    }

    pub fn completion_context(&self, offset: usize) -> CompletionContext {
        for host in self.hosts_around(offset) {
            for reference in &host.references {
                let name = reference.value.span;
                if name.touches(offset) {
                    let prefix = reference
                        .value
                        .text
                        .chars()
                        .take(offset - name.start)
                        .collect();
                    return CompletionContext::Variable { prefix, span: name };
                }
            }

            // A lone `$` is not a reference yet, but it starts one.
            let closes_reference = host
                .references
                .iter()
                .any(|r| r.close.as_ref().is_some_and(|c| c.span.end == offset));
            let before = offset
                .checked_sub(host.span.start + 1)
                .and_then(|rel| host.text.chars().nth(rel));
            if before == Some('$') && !closes_reference {
                return CompletionContext::Variable {
                    prefix: String::new(),
                    span: Span::new(offset, offset),
                };
            }
        }

        match self.find_item_from_position(offset).map(|i| i.item_type) {
            Some(ItemType::RegistryKey) => CompletionContext::Key,
            Some(ItemType::PropertyName) => CompletionContext::PropertyName,
            Some(ItemType::PropertyValue) => CompletionContext::PropertyValue,
            _ => CompletionContext::None,
        }
    }

    /// Zero-based line and character column of `offset`.
    pub fn line_col(&self, offset: usize) -> (usize, usize) {
        let line = self
            .line_starts
            .partition_point(|&start| start <= offset)
            .saturating_sub(1);
        let start = self.line_starts.get(line).copied().unwrap_or(0);
        (line, offset.saturating_sub(start))
    }

    /// Every error in document order, resolved to line and column.
    pub fn reports(&self) -> Vec<ErrorReport> {
        let mut reports = Vec::new();

        for item in &self.items {
            let span = trimmed_span(item);
            for error in &item.errors {
                reports.push(self.report(error, span));
            }
            for reference in &item.references {
                for error in &reference.errors {
                    reports.push(self.report(error, reference.span()));
                }
            }
        }

        reports.sort_by_key(|r| (r.span.start, r.code));
        reports
    }

    fn report(&self, error: &crate::Error, span: Span) -> ErrorReport {
        let (line, column) = self.line_col(span.start);
        ErrorReport {
            code: error.code,
            message: error.message.clone(),
            severity: error.severity(),
            category: error.category(),
            span,
            line,
            column,
        }
    }

    pub fn error_count(&self) -> usize {
        self.items
            .iter()
            .map(|i| i.errors.len() + i.references.iter().map(|r| r.errors.len()).sum::<usize>())
            .sum()
    }
}

fn trimmed_span(item: &ParseItem) -> Span {
    let leading = item.text.chars().take_while(|c| c.is_whitespace()).count();
    Span::with_len(item.span.start + leading, item.trimmed().chars().count())
}
