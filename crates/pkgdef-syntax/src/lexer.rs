use crate::item::{ItemId, ItemType, ParseItem, Reference};
use once_cell::sync::Lazy;
use regex::Regex;

// The closing `$` is optional so unterminated references still surface.
static REFERENCE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\$\w+\$?|\$\$").expect("Valid regex pattern for variable references")
});

/// Splits a buffer into lines that keep their own `\n` or `\r\n` terminator.
pub fn split_lines(text: &str) -> Vec<String> {
    text.split_inclusive('\n').map(str::to_string).collect()
}

/// Turns lines into a flat, position-ordered item sequence.
///
/// Offsets are absolute character positions: each line starts where the
/// previous one ended. Every character of the input belongs to exactly one item and no line is ever
/// rejected; anything unrecognised becomes an [`ItemType::Unknown`] item.
pub fn tokenize<S: AsRef<str>>(lines: &[S]) -> Vec<ParseItem> {
    let mut lexer = Lexer {
        items: Vec::with_capacity(lines.len() + lines.len() / 2),
        in_block_comment: false,
    };

    let mut offset = 0;
    for line in lines {
        let line = line.as_ref();
        lexer.line(line, offset);
        offset += line.chars().count();
    }

    lexer.items
}

struct Lexer {
    items: Vec<ParseItem>,
    in_block_comment: bool,
}

impl Lexer {
    fn line(&mut self, line: &str, start: usize) {
        let trimmed = line.trim();

        if self.in_block_comment {
            if line.contains("*/") {
                self.in_block_comment = false;
            }
            self.push(ItemType::Comment, start, line);
            return;
        }

        if let Some(rest) = trimmed.strip_prefix("/*") {
            if !rest.contains("*/") {
                self.in_block_comment = true;
            }
            self.push(ItemType::Comment, start, line);
        } else if trimmed.starts_with(';') || trimmed.starts_with("//") {
            self.push(ItemType::Comment, start, line);
        } else if trimmed.is_empty() {
            self.push(ItemType::EmptyLine, start, line);
        } else if trimmed.starts_with('#') {
            self.push(ItemType::Preprocessor, start, line);
        } else if trimmed.starts_with('[') {
            let id = self.push(ItemType::RegistryKey, start, line);
            self.extract_references(id);
        } else if !self.property(line, start) {
            self.push(ItemType::Unknown, start, line);
        }
    }

    /// Splits `name = value` into name, operator and value items.
    /// Returns false when the line does not have that shape.
    fn property(&mut self, line: &str, start: usize) -> bool {
        let Some(eq) = line.find('=') else {
            return false;
        };

        let name = line[..eq].trim_end();
        if name.trim_start().is_empty() {
            return false;
        }

        let after_eq = &line[eq + 1..];
        let value_rel = after_eq.len() - after_eq.trim_start_matches([' ', '\t']).len();
        let value_start = eq + 1 + value_rel;
        let value = &line[value_start..];
        if value.trim().is_empty() {
            return false;
        }

        let name_type = if name.trim_start() == "@" {
            ItemType::Operator
        } else {
            ItemType::PropertyName
        };

        let name_id = self.push(name_type, start, name);
        if name_type == ItemType::PropertyName {
            self.extract_references(name_id);
        }
        let operator = &line[name.len()..value_start];
        let operator_start = start + name.chars().count();
        self.push(ItemType::Operator, operator_start, operator);
        let value_id = self.push(
            ItemType::PropertyValue,
            operator_start + operator.chars().count(),
            value,
        );
        self.extract_references(value_id);

        true
    }

    fn push(&mut self, item_type: ItemType, start: usize, text: &str) -> ItemId {
        let id = ItemId(self.items.len());
        self.items.push(ParseItem::new(id, item_type, start, text));
        id
    }

    fn extract_references(&mut self, id: ItemId) {
        let host = &self.items[id.index()];
        let references = find_references(id, host.span.start, &host.text);
        self.items[id.index()].references = references;
    }
}

fn find_references(host: ItemId, host_start: usize, text: &str) -> Vec<Reference> {
    REFERENCE
        .find_iter(text)
        .map(|m| {
            let start = host_start + text[..m.start()].chars().count();
            let matched = m.as_str();
            let closed = matched.len() >= 2 && matched.ends_with('$');
            let name = if closed {
                &matched[1..matched.len() - 1]
            } else {
                &matched[1..]
            };
            let name_len = name.chars().count();

            let open = ParseItem::new(host, ItemType::ReferenceBraces, start, "$");
            let value = ParseItem::new(host, ItemType::ReferenceName, start + 1, name);
            let close = closed.then(|| {
                ParseItem::new(host, ItemType::ReferenceBraces, start + 1 + name_len, "$")
            });

            Reference {
                open,
                value,
                close,
                errors: Vec::new(),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Span;

    #[test]
    fn adjacent_references_are_separate() {
        let refs = find_references(ItemId(0), 0, "$A$$B$");
        let spans: Vec<_> = refs.iter().map(Reference::span).collect();
        assert_eq!(spans, vec![Span::new(0, 3), Span::new(3, 6)]);
    }

    #[test]
    fn reference_offsets_count_characters() {
        let refs = find_references(ItemId(0), 0, "[é$Aé$]");
        assert_eq!(refs.len(), 1);
        assert_eq!(refs[0].open.span, Span::new(2, 3));
        assert_eq!(refs[0].value.span, Span::new(3, 5));
        assert_eq!(refs[0].close.as_ref().map(|c| c.span), Some(Span::new(5, 6)));
        assert_eq!(refs[0].name(), "Aé");
    }

    #[test]
    fn empty_reference_is_matched() {
        let refs = find_references(ItemId(0), 10, "x$$y");
        assert_eq!(refs.len(), 1);
        assert_eq!(refs[0].name(), "");
        assert_eq!(refs[0].value.span, Span::new(12, 12));
        assert!(refs[0].close.is_some());
    }

    #[test]
    fn unterminated_reference_has_no_close() {
        let refs = find_references(ItemId(0), 0, r"[$RootKey\test]");
        assert_eq!(refs.len(), 1);
        assert_eq!(refs[0].name(), "RootKey");
        assert!(refs[0].close.is_none());
        assert_eq!(refs[0].text(), "$RootKey");
    }
}
