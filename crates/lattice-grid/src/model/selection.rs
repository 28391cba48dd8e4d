//! Keyed selection registry.
//!
//! This module provides [`SelectionRegistry`], a process-wide store mapping a
//! widget instance id to the ordered set of item keys selected in that widget.
//!
//! Selection values are immutable snapshots. Every mutator returns the new
//! [`Selection`]; when the operation changed nothing the returned snapshot is
//! the very same one that was stored before, so callers detect a no-op with
//! [`Selection::same_as`] and skip raising a change notification.
//!
//! # Example
//!
//! ```
//! use lattice_grid::model::SelectionRegistry;
//!
//! let registry = SelectionRegistry::<String>::new();
//! let old = registry.get_selection("g1");
//! let new = registry.select_items("g1", ["x".to_string(), "y".to_string()]);
//!
//! if !new.same_as(&old) {
//!     println!("selection changed: {:?}", new.to_vec());
//! }
//! ```

use std::collections::{HashMap, HashSet};
use std::hash::Hash;
use std::sync::Arc;

use parking_lot::RwLock;

use crate::logging::targets;

/// Requirements on an item key stored in the registry.
pub trait SelectionKey: Clone + Eq + Hash + Send + Sync + 'static {}

impl<T: Clone + Eq + Hash + Send + Sync + 'static> SelectionKey for T {}

// ============================================================================
// Selection snapshot
// ============================================================================

#[derive(Debug)]
struct SelectionInner<K> {
    order: Vec<K>,
    members: HashSet<K>,
}

/// An ordered, duplicate-free set of selected keys.
///
/// Insertion order is preserved and drives the display order of selected
/// items. Cloning is cheap.
#[derive(Debug)]
pub struct Selection<K> {
    inner: Arc<SelectionInner<K>>,
}

impl<K> Clone for Selection<K> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<K: Clone + Eq + Hash> Selection<K> {
    /// An empty selection.
    pub fn empty() -> Self {
        Self::from_keys(std::iter::empty())
    }

    /// Build a selection; later duplicates are dropped.
    pub fn from_keys(keys: impl IntoIterator<Item = K>) -> Self {
        let mut order = Vec::new();
        let mut members = HashSet::new();
        for key in keys {
            if members.insert(key.clone()) {
                order.push(key);
            }
        }
        Self {
            inner: Arc::new(SelectionInner { order, members }),
        }
    }

    /// Number of selected keys.
    pub fn len(&self) -> usize {
        self.inner.order.len()
    }

    /// Returns `true` if nothing is selected.
    pub fn is_empty(&self) -> bool {
        self.inner.order.is_empty()
    }

    /// Returns `true` if `key` is selected.
    pub fn contains(&self, key: &K) -> bool {
        self.inner.members.contains(key)
    }

    /// Iterate keys in insertion order.
    pub fn iter(&self) -> std::slice::Iter<'_, K> {
        self.inner.order.iter()
    }

    /// Keys in insertion order.
    pub fn as_slice(&self) -> &[K] {
        &self.inner.order
    }

    /// Copy the keys out.
    pub fn to_vec(&self) -> Vec<K> {
        self.inner.order.clone()
    }

    /// Returns `true` if both values are the same snapshot.
    ///
    /// This is an identity check: two separately built selections with equal
    /// keys are equal but not the same.
    pub fn same_as(&self, other: &Selection<K>) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    fn appended(&self, keys: impl IntoIterator<Item = K>) -> Self {
        let mut order = self.inner.order.clone();
        let mut members = self.inner.members.clone();
        let before = order.len();
        for key in keys {
            if members.insert(key.clone()) {
                order.push(key);
            }
        }
        if order.len() == before {
            return self.clone();
        }
        Self {
            inner: Arc::new(SelectionInner { order, members }),
        }
    }

    fn without(&self, keys: &HashSet<K>) -> Self {
        if !keys.iter().any(|k| self.contains(k)) {
            return self.clone();
        }
        Self::from_keys(self.iter().filter(|k| !keys.contains(*k)).cloned())
    }
}

impl<K: Eq> PartialEq for Selection<K> {
    fn eq(&self, other: &Self) -> bool {
        self.inner.order == other.inner.order
    }
}

impl<K: Eq> Eq for Selection<K> {}

impl<'a, K> IntoIterator for &'a Selection<K> {
    type Item = &'a K;
    type IntoIter = std::slice::Iter<'a, K>;

    fn into_iter(self) -> Self::IntoIter {
        self.inner.order.iter()
    }
}

/// Keys added and removed between two selections.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionDiff<K> {
    /// Keys in the new selection but not the old, in new-selection order.
    pub added: Vec<K>,
    /// Keys in the old selection but not the new, in old-selection order.
    pub removed: Vec<K>,
}

impl<K> SelectionDiff<K> {
    /// Returns `true` if nothing was added or removed.
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty()
    }
}

/// Compute which keys were added and removed.
pub fn diff<K: Clone + Eq + Hash>(old: &Selection<K>, new: &Selection<K>) -> SelectionDiff<K> {
    if old.same_as(new) {
        return SelectionDiff {
            added: Vec::new(),
            removed: Vec::new(),
        };
    }
    SelectionDiff {
        added: new.iter().filter(|k| !old.contains(k)).cloned().collect(),
        removed: old.iter().filter(|k| !new.contains(k)).cloned().collect(),
    }
}

// ============================================================================
// Registry
// ============================================================================

/// Process-wide store of per-widget selections.
///
/// Each widget id owns its entry exclusively; distinct ids may be read and
/// written concurrently.
pub struct SelectionRegistry<K> {
    selections: RwLock<HashMap<String, Selection<K>>>,
    empty: Selection<K>,
}

impl<K: SelectionKey> Default for SelectionRegistry<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K> std::fmt::Debug for SelectionRegistry<K> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SelectionRegistry")
            .field("widgets", &self.selections.read().len())
            .finish()
    }
}

impl<K: SelectionKey> SelectionRegistry<K> {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            selections: RwLock::new(HashMap::new()),
            empty: Selection::empty(),
        }
    }

    /// The current selection of a widget; empty if it never selected anything.
    pub fn get_selection(&self, id: &str) -> Selection<K> {
        self.selections
            .read()
            .get(id)
            .cloned()
            .unwrap_or_else(|| self.empty.clone())
    }

    /// Returns `true` if `key` is selected in widget `id`.
    pub fn is_selected(&self, id: &str, key: &K) -> bool {
        self.selections
            .read()
            .get(id)
            .is_some_and(|s| s.contains(key))
    }

    /// Append `key` if it is not selected yet.
    pub fn select_item(&self, id: &str, key: K) -> Selection<K> {
        self.update(id, |current| current.appended(std::iter::once(key)))
    }

    /// Remove `key` if it is selected.
    pub fn deselect_item(&self, id: &str, key: &K) -> Selection<K> {
        self.update(id, |current| {
            if !current.contains(key) {
                return current.clone();
            }
            Selection::from_keys(current.iter().filter(|k| *k != key).cloned())
        })
    }

    /// Select `key` if it is not selected, deselect it otherwise.
    pub fn toggle_item(&self, id: &str, key: K) -> Selection<K> {
        self.update(id, |current| {
            if current.contains(&key) {
                Selection::from_keys(current.iter().filter(|k| **k != key).cloned())
            } else {
                current.appended(std::iter::once(key))
            }
        })
    }

    /// Union with the existing selection, preserving first-seen order.
    pub fn select_items(&self, id: &str, keys: impl IntoIterator<Item = K>) -> Selection<K> {
        self.update(id, |current| current.appended(keys))
    }

    /// Remove every key in `keys`.
    pub fn deselect_items(&self, id: &str, keys: impl IntoIterator<Item = K>) -> Selection<K> {
        let keys: HashSet<K> = keys.into_iter().collect();
        self.update(id, |current| current.without(&keys))
    }

    /// Replace the selection wholesale.
    ///
    /// Replacing with an equal key sequence keeps the stored snapshot.
    pub fn set_selection(&self, id: &str, keys: impl IntoIterator<Item = K>) -> Selection<K> {
        let replacement = Selection::from_keys(keys);
        self.update(id, |current| {
            if *current == replacement {
                current.clone()
            } else {
                replacement
            }
        })
    }

    /// Drop the entry of a widget that is being torn down.
    ///
    /// Returns the selection it held, if any.
    pub fn clear(&self, id: &str) -> Option<Selection<K>> {
        let removed = self.selections.write().remove(id);
        if removed.is_some() {
            tracing::debug!(target: targets::SELECTION, %id, "cleared widget selection");
        }
        removed
    }

    /// Number of widgets with an entry.
    pub fn widget_count(&self) -> usize {
        self.selections.read().len()
    }

    fn update(&self, id: &str, op: impl FnOnce(&Selection<K>) -> Selection<K>) -> Selection<K> {
        let mut selections = self.selections.write();
        let current = selections
            .get(id)
            .cloned()
            .unwrap_or_else(|| self.empty.clone());
        let next = op(&current);

        if next.same_as(&current) {
            tracing::trace!(target: targets::SELECTION, %id, "selection unchanged");
        } else {
            tracing::trace!(
                target: targets::SELECTION,
                %id,
                old_len = current.len(),
                new_len = next.len(),
                "selection updated"
            );
            selections.insert(id.to_string(), next.clone());
        }
        next
    }
}

static_assertions::assert_impl_all!(SelectionRegistry<String>: Send, Sync);
static_assertions::assert_impl_all!(Selection<String>: Send, Sync);

#[cfg(test)]
mod tests {
    use super::*;

    fn keys(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_empty_selection() {
        let registry = SelectionRegistry::<String>::new();
        assert!(registry.get_selection("none").is_empty());
        assert!(!registry.is_selected("none", &"x".to_string()));
    }

    #[test]
    fn test_select_deselect_scenario() {
        let registry = SelectionRegistry::<String>::new();
        let selection = registry.select_items("g1", keys(&["x", "y"]));
        assert_eq!(selection.to_vec(), keys(&["x", "y"]));

        let selection = registry.deselect_item("g1", &"x".to_string());
        assert_eq!(selection.to_vec(), keys(&["y"]));
        assert!(!registry.is_selected("g1", &"x".to_string()));
        assert!(registry.is_selected("g1", &"y".to_string()));
    }

    #[test]
    fn test_select_item_idempotent() {
        let registry = SelectionRegistry::<String>::new();
        let first = registry.select_item("w", "a".to_string());
        let second = registry.select_item("w", "a".to_string());
        assert!(second.same_as(&first));
        assert_eq!(second.to_vec(), keys(&["a"]));
    }

    #[test]
    fn test_mutators_do_not_touch_previous_snapshot() {
        let registry = SelectionRegistry::<String>::new();
        let old = registry.select_items("w", keys(&["a", "b"]));
        let new = registry.select_item("w", "c".to_string());

        assert_eq!(old.to_vec(), keys(&["a", "b"]));
        assert_eq!(new.to_vec(), keys(&["a", "b", "c"]));
        assert!(!new.same_as(&old));
    }

    #[test]
    fn test_select_items_preserves_first_seen_order() {
        let registry = SelectionRegistry::<String>::new();
        registry.select_items("w", keys(&["b", "a"]));
        let selection = registry.select_items("w", keys(&["c", "a", "d", "c"]));
        assert_eq!(selection.to_vec(), keys(&["b", "a", "c", "d"]));
    }

    #[test]
    fn test_noop_mutations_return_same_snapshot() {
        let registry = SelectionRegistry::<String>::new();
        let current = registry.select_items("w", keys(&["a"]));

        assert!(registry.deselect_item("w", &"z".to_string()).same_as(&current));
        assert!(registry.deselect_items("w", keys(&["y", "z"])).same_as(&current));
        assert!(registry.select_items("w", keys(&["a"])).same_as(&current));
        assert!(registry.set_selection("w", keys(&["a"])).same_as(&current));

        let before = registry.get_selection("other");
        assert!(registry.deselect_item("other", &"a".to_string()).same_as(&before));
    }

    #[test]
    fn test_toggle_item() {
        let registry = SelectionRegistry::<String>::new();
        registry.toggle_item("w", "a".to_string());
        registry.toggle_item("w", "b".to_string());
        let selection = registry.toggle_item("w", "a".to_string());
        assert_eq!(selection.to_vec(), keys(&["b"]));
    }

    #[test]
    fn test_set_selection_replaces() {
        let registry = SelectionRegistry::<String>::new();
        registry.select_items("w", keys(&["a", "b"]));
        let selection = registry.set_selection("w", keys(&["c", "c", "d"]));
        assert_eq!(selection.to_vec(), keys(&["c", "d"]));
    }

    #[test]
    fn test_widgets_are_independent() {
        let registry = SelectionRegistry::<String>::new();
        registry.select_item("a", "x".to_string());
        registry.select_item("b", "y".to_string());
        assert_eq!(registry.widget_count(), 2);
        assert!(!registry.is_selected("a", &"y".to_string()));

        let removed = registry.clear("a").unwrap();
        assert_eq!(removed.to_vec(), keys(&["x"]));
        assert_eq!(registry.widget_count(), 1);
        assert!(registry.get_selection("a").is_empty());
        assert!(registry.clear("a").is_none());
    }

    #[test]
    fn test_diff() {
        let old = Selection::from_keys(keys(&["a", "b", "c"]));
        let new = Selection::from_keys(keys(&["b", "d"]));
        let d = diff(&old, &new);
        assert_eq!(d.added, keys(&["d"]));
        assert_eq!(d.removed, keys(&["a", "c"]));
        assert!(diff(&new, &new).is_empty());
    }
}
