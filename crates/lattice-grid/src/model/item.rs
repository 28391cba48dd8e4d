//! Collection items.
//!
//! A collection handled by the pipeline holds either primitive values or
//! keyed records. Grouping adds synthetic header pseudo-items, which are
//! never selectable, never focusable and never matched by a filter.

use std::borrow::Cow;

use super::value::{ItemValue, Record, UNDEFINED};

/// Field name under which a header reports itself as a header.
pub const IS_HEADER_FIELD: &str = "isHeader";

/// A group header pseudo-item.
///
/// Reading either the group key or the value key yields the group value, and
/// reading [`IS_HEADER_FIELD`] yields `true`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct GroupHeader {
    group_key: String,
    value_key: Option<String>,
    value: ItemValue,
}

impl GroupHeader {
    /// Create a header for one group value.
    pub fn new(group_key: impl Into<String>, value_key: Option<String>, value: ItemValue) -> Self {
        Self {
            group_key: group_key.into(),
            value_key,
            value,
        }
    }

    /// The field the collection was grouped by.
    pub fn group_key(&self) -> &str {
        &self.group_key
    }

    /// The value shared by every member of this group.
    pub fn value(&self) -> &ItemValue {
        &self.value
    }

    fn field(&self, name: &str) -> &ItemValue {
        if name == self.group_key || self.value_key.as_deref() == Some(name) {
            &self.value
        } else if name == IS_HEADER_FIELD {
            static TRUE: ItemValue = ItemValue::Bool(true);
            &TRUE
        } else {
            &UNDEFINED
        }
    }
}

/// One element of a collection.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Item {
    /// A primitive item: the item is its own value.
    Value(ItemValue),
    /// A keyed object item.
    Record(Record),
    /// A synthetic group header.
    Header(GroupHeader),
}

impl Item {
    /// Returns `true` for group headers.
    pub fn is_header(&self) -> bool {
        matches!(self, Item::Header(_))
    }

    /// Access the record, if this is one.
    pub fn as_record(&self) -> Option<&Record> {
        match self {
            Item::Record(r) => Some(r),
            _ => None,
        }
    }

    /// Read a field. Primitive items have no fields.
    pub fn field(&self, name: &str) -> &ItemValue {
        match self {
            Item::Value(_) => &UNDEFINED,
            Item::Record(r) => r.get(name),
            Item::Header(h) => h.field(name),
        }
    }

    /// The value an expression is evaluated against.
    ///
    /// With a field name this is the field. Without one a primitive item
    /// evaluates as itself and a record as its raw text.
    pub fn resolve(&self, field: Option<&str>) -> Cow<'_, ItemValue> {
        match (field, self) {
            (Some(name), item) => Cow::Borrowed(item.field(name)),
            (None, Item::Value(v)) => Cow::Borrowed(v),
            (None, Item::Record(r)) => Cow::Owned(ItemValue::String(r.raw_text())),
            (None, Item::Header(h)) => Cow::Borrowed(&h.value),
        }
    }

    /// The selection key of this item.
    ///
    /// With a value key the key is that field, otherwise the whole item.
    /// Headers have no key.
    pub fn key(&self, value_key: Option<&str>) -> Option<Item> {
        match (self, value_key) {
            (Item::Header(_), _) => None,
            (Item::Record(r), Some(vk)) => Some(Item::Value(r.get(vk).clone())),
            (item, _) => Some(item.clone()),
        }
    }

    /// Text shown for this item.
    pub fn display_text(&self, display_key: Option<&str>) -> String {
        match (self, display_key) {
            (Item::Value(v), _) => v.to_text(),
            (Item::Header(h), _) => h.value.to_text(),
            (Item::Record(r), Some(dk)) => r.get(dk).to_text(),
            (Item::Record(r), None) => r.raw_text(),
        }
    }

    /// Convert a JSON value: objects become records, anything else a primitive.
    pub fn from_json(json: &serde_json::Value) -> Self {
        match json {
            serde_json::Value::Object(map) => Item::Record(Record::from_json_map(map)),
            other => Item::Value(ItemValue::from_json(other)),
        }
    }

    /// Parse a JSON array into a collection.
    pub fn collection_from_json(text: &str) -> serde_json::Result<Vec<Item>> {
        let values: Vec<serde_json::Value> = serde_json::from_str(text)?;
        Ok(values.iter().map(Item::from_json).collect())
    }
}

impl From<Record> for Item {
    fn from(r: Record) -> Self {
        Item::Record(r)
    }
}

impl From<ItemValue> for Item {
    fn from(v: ItemValue) -> Self {
        Item::Value(v)
    }
}

impl From<&str> for Item {
    fn from(v: &str) -> Self {
        Item::Value(ItemValue::from(v))
    }
}

impl From<i64> for Item {
    fn from(v: i64) -> Self {
        Item::Value(ItemValue::Int(v))
    }
}
