//! Typed field values.
//!
//! Every cell of a record, every primitive list item, and every search value
//! of a filtering expression is an [`ItemValue`]. Reading a field that a
//! record does not have yields [`ItemValue::None`], the "undefined" value that
//! the sorting and filtering rules treat specially.

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;
use std::hash::{Hash, Hasher};

use chrono::NaiveDate;

/// Shared "undefined" value returned for missing fields.
pub(crate) static UNDEFINED: ItemValue = ItemValue::None;

/// A single field value.
#[derive(Debug, Clone, Default)]
pub enum ItemValue {
    /// Undefined: the field is absent.
    #[default]
    None,
    /// An explicit null.
    Null,
    /// Boolean data.
    Bool(bool),
    /// Integer data.
    Int(i64),
    /// Floating point data.
    Float(f64),
    /// String data.
    String(String),
    /// Calendar date.
    Date(NaiveDate),
}

impl ItemValue {
    /// Returns `true` if this is the undefined value.
    pub fn is_undefined(&self) -> bool {
        matches!(self, ItemValue::None)
    }

    /// Returns `true` if this is an explicit null.
    pub fn is_null(&self) -> bool {
        matches!(self, ItemValue::Null)
    }

    /// Returns `true` for anything other than undefined and null.
    pub fn is_present(&self) -> bool {
        !matches!(self, ItemValue::None | ItemValue::Null)
    }

    /// Returns `true` for undefined, null and the empty string.
    pub fn is_empty(&self) -> bool {
        match self {
            ItemValue::None | ItemValue::Null => true,
            ItemValue::String(s) => s.is_empty(),
            _ => false,
        }
    }

    /// Attempts to get the value as a string slice.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            ItemValue::String(s) => Some(s.as_str()),
            _ => None,
        }
    }

    /// Attempts to get the value as a number. Integers widen to `f64`.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            ItemValue::Int(n) => Some(*n as f64),
            ItemValue::Float(n) => Some(*n),
            _ => None,
        }
    }

    /// Attempts to get the value as a boolean.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            ItemValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Attempts to get the value as a date.
    pub fn as_date(&self) -> Option<NaiveDate> {
        match self {
            ItemValue::Date(d) => Some(*d),
            _ => None,
        }
    }

    /// Text used for display and for textual matching.
    ///
    /// Undefined and null render as the empty string.
    pub fn to_text(&self) -> String {
        match self {
            ItemValue::None | ItemValue::Null => String::new(),
            other => other.to_string(),
        }
    }

    /// Compare two values for ordering.
    ///
    /// Values of different kinds order by kind: null, booleans, numbers,
    /// strings, dates, and undefined last. Integers and floats compare
    /// numerically. With `ignore_case`, strings compare by their lowercase form.
    pub fn compare(&self, other: &ItemValue, ignore_case: bool) -> Ordering {
        match (self, other) {
            (ItemValue::String(a), ItemValue::String(b)) => {
                if ignore_case {
                    a.to_lowercase().cmp(&b.to_lowercase())
                } else {
                    a.cmp(b)
                }
            }
            (ItemValue::Int(a), ItemValue::Int(b)) => a.cmp(b),
            (ItemValue::Bool(a), ItemValue::Bool(b)) => a.cmp(b),
            (ItemValue::Date(a), ItemValue::Date(b)) => a.cmp(b),
            (a, b) if a.rank() == 2 && b.rank() == 2 => {
                let (a, b) = (a.as_f64().unwrap_or_default(), b.as_f64().unwrap_or_default());
                a.total_cmp(&b)
            }
            (a, b) => a.rank().cmp(&b.rank()),
        }
    }

    fn rank(&self) -> u8 {
        match self {
            ItemValue::Null => 0,
            ItemValue::Bool(_) => 1,
            ItemValue::Int(_) | ItemValue::Float(_) => 2,
            ItemValue::String(_) => 3,
            ItemValue::Date(_) => 4,
            ItemValue::None => 5,
        }
    }

    /// Convert a JSON value.
    ///
    /// Arrays and objects have no field-value counterpart and are kept as
    /// their JSON text.
    pub fn from_json(json: &serde_json::Value) -> Self {
        match json {
            serde_json::Value::Null => ItemValue::Null,
            serde_json::Value::Bool(b) => ItemValue::Bool(*b),
            serde_json::Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    ItemValue::Int(i)
                } else if let Some(f) = n.as_f64() {
                    ItemValue::Float(f)
                } else {
                    ItemValue::Null
                }
            }
            serde_json::Value::String(s) => ItemValue::String(s.clone()),
            other => ItemValue::String(other.to_string()),
        }
    }

    /// Convert to a JSON value. Undefined maps to null.
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            ItemValue::None | ItemValue::Null => serde_json::Value::Null,
            ItemValue::Bool(b) => serde_json::Value::Bool(*b),
            ItemValue::Int(i) => serde_json::Value::Number((*i).into()),
            ItemValue::Float(f) => serde_json::Number::from_f64(*f)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            ItemValue::String(s) => serde_json::Value::String(s.clone()),
            ItemValue::Date(d) => serde_json::Value::String(d.format("%Y-%m-%d").to_string()),
        }
    }
}

// Equality is structural: `Int(1)` and `Float(1.0)` are different keys.
impl PartialEq for ItemValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (ItemValue::None, ItemValue::None) | (ItemValue::Null, ItemValue::Null) => true,
            (ItemValue::Bool(a), ItemValue::Bool(b)) => a == b,
            (ItemValue::Int(a), ItemValue::Int(b)) => a == b,
            (ItemValue::Float(a), ItemValue::Float(b)) => a.to_bits() == b.to_bits(),
            (ItemValue::String(a), ItemValue::String(b)) => a == b,
            (ItemValue::Date(a), ItemValue::Date(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for ItemValue {}

impl Hash for ItemValue {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            ItemValue::None | ItemValue::Null => {}
            ItemValue::Bool(b) => b.hash(state),
            ItemValue::Int(i) => i.hash(state),
            ItemValue::Float(f) => f.to_bits().hash(state),
            ItemValue::String(s) => s.hash(state),
            ItemValue::Date(d) => d.hash(state),
        }
    }
}

impl fmt::Display for ItemValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ItemValue::None => write!(f, "undefined"),
            ItemValue::Null => write!(f, "null"),
            ItemValue::Bool(b) => write!(f, "{b}"),
            ItemValue::Int(i) => write!(f, "{i}"),
            ItemValue::Float(n) => write!(f, "{n}"),
            ItemValue::String(s) => write!(f, "{s}"),
            ItemValue::Date(d) => write!(f, "{}", d.format("%Y-%m-%d")),
        }
    }
}

impl From<bool> for ItemValue {
    fn from(v: bool) -> Self {
        ItemValue::Bool(v)
    }
}

impl From<i32> for ItemValue {
    fn from(v: i32) -> Self {
        ItemValue::Int(v as i64)
    }
}

impl From<i64> for ItemValue {
    fn from(v: i64) -> Self {
        ItemValue::Int(v)
    }
}

impl From<f64> for ItemValue {
    fn from(v: f64) -> Self {
        ItemValue::Float(v)
    }
}

impl From<String> for ItemValue {
    fn from(v: String) -> Self {
        ItemValue::String(v)
    }
}

impl From<&str> for ItemValue {
    fn from(v: &str) -> Self {
        ItemValue::String(v.to_string())
    }
}

impl From<NaiveDate> for ItemValue {
    fn from(v: NaiveDate) -> Self {
        ItemValue::Date(v)
    }
}

/// A keyed object item: field name to value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Record {
    fields: BTreeMap<String, ItemValue>,
}

impl Record {
    /// Create an empty record.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style field setter.
    pub fn with(mut self, field: impl Into<String>, value: impl Into<ItemValue>) -> Self {
        self.set(field, value);
        self
    }

    /// Set a field.
    pub fn set(&mut self, field: impl Into<String>, value: impl Into<ItemValue>) {
        self.fields.insert(field.into(), value.into());
    }

    /// Read a field. Missing fields read as [`ItemValue::None`].
    pub fn get(&self, field: &str) -> &ItemValue {
        self.fields.get(field).unwrap_or(&UNDEFINED)
    }

    /// Returns `true` if the field exists (even when it holds null).
    pub fn contains(&self, field: &str) -> bool {
        self.fields.contains_key(field)
    }

    /// Iterate fields in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ItemValue)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Number of fields.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Returns `true` if the record has no fields.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// All field values rendered as text and joined by a space.
    ///
    /// Used when a filtering expression has no field name and the item is a
    /// record.
    pub fn raw_text(&self) -> String {
        self.fields
            .values()
            .filter(|v| v.is_present())
            .map(ItemValue::to_text)
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Build a record from a JSON object.
    pub fn from_json_map(map: &serde_json::Map<String, serde_json::Value>) -> Self {
        Self {
            fields: map
                .iter()
                .map(|(k, v)| (k.clone(), ItemValue::from_json(v)))
                .collect(),
        }
    }
}

impl<K: Into<String>, V: Into<ItemValue>> FromIterator<(K, V)> for Record {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            fields: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_field_is_undefined() {
        let record = Record::new().with("name", "a");
        assert_eq!(record.get("name"), &ItemValue::from("a"));
        assert!(record.get("age").is_undefined());
        assert!(!record.contains("age"));
    }

    #[test]
    fn test_compare_mixed_numbers() {
        let a = ItemValue::Int(2);
        let b = ItemValue::Float(2.5);
        assert_eq!(a.compare(&b, false), Ordering::Less);
        assert_eq!(b.compare(&a, false), Ordering::Greater);
        assert_eq!(ItemValue::Int(3).compare(&ItemValue::Float(3.0), false), Ordering::Equal);
    }

    #[test]
    fn test_compare_strings_ignore_case() {
        let a = ItemValue::from("apple");
        let b = ItemValue::from("Banana");
        assert_eq!(a.compare(&b, false), Ordering::Greater);
        assert_eq!(a.compare(&b, true), Ordering::Less);
    }

    #[test]
    fn test_compare_kinds() {
        assert_eq!(ItemValue::Null.compare(&ItemValue::Int(0), false), Ordering::Less);
        assert_eq!(ItemValue::from("z").compare(&ItemValue::None, false), Ordering::Less);
        assert_eq!(ItemValue::Bool(true).compare(&ItemValue::Int(-5), false), Ordering::Less);
    }

    #[test]
    fn test_structural_equality() {
        assert_ne!(ItemValue::Int(1), ItemValue::Float(1.0));
        assert_eq!(ItemValue::Float(0.5), ItemValue::Float(0.5));
        assert_ne!(ItemValue::None, ItemValue::Null);
    }

    #[test]
    fn test_empty_and_present() {
        assert!(ItemValue::None.is_empty());
        assert!(ItemValue::Null.is_empty());
        assert!(ItemValue::from("").is_empty());
        assert!(!ItemValue::Int(0).is_empty());
        assert!(!ItemValue::Null.is_present());
    }

    #[test]
    fn test_json_conversion() {
        let json = serde_json::json!({"id": 7, "price": 1.5, "name": "x", "gone": null});
        let serde_json::Value::Object(map) = json else {
            unreachable!()
        };
        let record = Record::from_json_map(&map);
        assert_eq!(record.get("id"), &ItemValue::Int(7));
        assert_eq!(record.get("price"), &ItemValue::Float(1.5));
        assert!(record.get("gone").is_null());
        assert_eq!(record.get("name").to_json(), serde_json::json!("x"));
    }

    #[test]
    fn test_raw_text() {
        let record = Record::new().with("a", "New").with("b", 12).with("c", ItemValue::Null);
        assert_eq!(record.raw_text(), "New 12");
    }
}
