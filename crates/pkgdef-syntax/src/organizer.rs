use crate::item::{Entry, ItemType, ParseItem, Property};

/// Groups the flat item sequence into entries.
///
/// A registry key opens a new entry; each `name = value` triple that follows
/// becomes a property of the most recent entry. Properties before the first
/// key are left unattached.
pub fn organize(items: &[ParseItem]) -> Vec<Entry> {
    let mut entries: Vec<Entry> = Vec::new();
    let mut i = 0;

    while i < items.len() {
        let item = &items[i];

        if item.is(ItemType::RegistryKey) {
            entries.push(Entry::new(item.id));
            i += 1;
            continue;
        }

        if is_property_name(item)
            && let (Some(op), Some(value)) = (items.get(i + 1), items.get(i + 2))
            && op.is(ItemType::Operator)
            && value.is(ItemType::PropertyValue)
        {
            if let Some(entry) = entries.last_mut() {
                entry.properties.push(Property {
                    name: item.id,
                    value: value.id,
                });
            }
            i += 3;
            continue;
        }

        i += 1;
    }

    entries
}

/// A quoted or unquoted name, or the bare `@` default-value marker.
pub(crate) fn is_property_name(item: &ParseItem) -> bool {
    match item.item_type {
        ItemType::PropertyName => true,
        ItemType::Operator => item.trimmed() == "@",
        _ => false,
    }
}
