use crate::value::{Table, Value};

/// Deep-merge `incoming` on top of `base`, returning a fresh value.
///
/// If both sides are tables, recurse key by key.
/// If both sides are arrays, concatenate: `base` elements, then `incoming`.
/// Otherwise the present `incoming` value wins. An absent side yields a
/// copy of the other.
///
/// Neither input is modified and the result shares no container with them.
pub fn deep_merge(base: Option<&Value>, incoming: Option<&Value>) -> Option<Value> {
    match (base, incoming) {
        (None, None) => None,
        (Some(base), None) => Some(base.clone()),
        (None, Some(incoming)) => Some(incoming.clone()),
        (Some(Value::Table(base_tbl)), Some(Value::Table(incoming_tbl))) => {
            Some(Value::Table(merge_tables(base_tbl, incoming_tbl)))
        }
        (Some(Value::Array(base_items)), Some(Value::Array(incoming_items))) => {
            let mut items = Vec::with_capacity(base_items.len() + incoming_items.len());
            items.extend(base_items.iter().cloned());
            items.extend(incoming_items.iter().cloned());
            Some(Value::Array(items))
        }
        (Some(_), Some(incoming)) => Some(incoming.clone()),
    }
}

/// Deep-merge two tables over the union of their keys.
///
/// Keys keep `base` order, followed by keys that only `incoming` has.
pub fn merge_tables(base: &Table, incoming: &Table) -> Table {
    let mut merged = Table::with_capacity(base.len() + incoming.len());
    for (key, base_val) in base {
        if let Some(value) = deep_merge(Some(base_val), incoming.get(key)) {
            merged.insert(key.clone(), value);
        }
    }
    for (key, incoming_val) in incoming {
        if !merged.contains_key(key) {
            merged.insert(key.clone(), incoming_val.clone());
        }
    }
    merged
}
