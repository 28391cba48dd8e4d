//! Multi-selection combo box with search, grouping and custom values.
//!
//! The combo composes a [`NavigationController`] for focus and selection with
//! a [`DataPipeline`] for its projection. The search text drives a
//! `contains` filter on the display key; a group key inserts header
//! pseudo-items, which the filter hides while a search is active.

use std::sync::Arc;

use lattice_grid_core::IdGenerator;

use super::navigation::{ListItem, NavigationController, NavigationKey, SelectionMode, Viewport};
use crate::config::ListConfig;
use crate::error::Result;
use crate::logging::targets;
use crate::model::{
    DataPipeline, FilteringExpression, FilteringLogic, FilteringState, Item, ItemValue, Record,
    Selection, SelectionRegistry, StringCondition,
};

/// Id prefix of combo instances.
pub const COMBO_ID_PREFIX: &str = "combo";

/// Check state of a tri-state checkbox.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CheckState {
    #[default]
    Unchecked,
    /// Some but not all items are selected.
    PartiallyChecked,
    Checked,
}

impl CheckState {
    /// Returns `true` if the box is checked (fully or partially).
    pub fn is_checked(&self) -> bool {
        !matches!(self, CheckState::Unchecked)
    }
}

/// A searchable multi-selection list over primitive or keyed data.
pub struct ComboBox<V: Viewport> {
    nav: NavigationController<Item, V>,
    pipeline: DataPipeline,
    value_key: Option<String>,
    display_key: Option<String>,
    group_key: Option<String>,
    search_text: String,
    config: ListConfig,
}

impl<V: Viewport> std::fmt::Debug for ComboBox<V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ComboBox")
            .field("nav", &self.nav)
            .field("value_key", &self.value_key)
            .field("display_key", &self.display_key)
            .field("group_key", &self.group_key)
            .field("search_text", &self.search_text)
            .finish()
    }
}

impl<V: Viewport> ComboBox<V> {
    /// Create a closed, empty combo with a freshly generated id.
    pub fn new(
        ids: &IdGenerator,
        registry: Arc<SelectionRegistry<Item>>,
        viewport: V,
        config: ListConfig,
    ) -> Result<Self> {
        let id = ids.next_id(COMBO_ID_PREFIX)?;
        Ok(Self {
            nav: NavigationController::new(id, registry, viewport, SelectionMode::Multiple),
            pipeline: DataPipeline::new(),
            value_key: None,
            display_key: None,
            group_key: None,
            search_text: String::new(),
            config,
        })
    }

    // ------------------------------------------------------------------------
    // Data and keys
    // ------------------------------------------------------------------------

    /// The widget id.
    pub fn id(&self) -> &str {
        self.nav.id()
    }

    /// Replace the data.
    pub fn set_data(&mut self, data: Vec<Item>) -> Result<()> {
        self.pipeline.set_data(data)?;
        self.refresh_items();
        Ok(())
    }

    /// The raw data.
    pub fn data(&self) -> &[Item] {
        self.pipeline.data()
    }

    /// Field identifying a record. Without one, records are their own key.
    pub fn set_value_key(&mut self, value_key: Option<&str>) -> Result<()> {
        let previous = std::mem::replace(&mut self.value_key, value_key.map(str::to_string));
        self.apply_grouping().inspect_err(|_| self.value_key = previous)
    }

    /// Field shown for a record and searched by the filter.
    pub fn set_display_key(&mut self, display_key: Option<&str>) -> Result<()> {
        self.display_key = display_key.map(str::to_string);
        self.apply_search()
    }

    /// Field whose values partition the list under headers.
    pub fn set_group_key(&mut self, group_key: Option<&str>) -> Result<()> {
        let previous = std::mem::replace(&mut self.group_key, group_key.map(str::to_string));
        self.apply_grouping().inspect_err(|_| self.group_key = previous)
    }

    /// Selection key of an item; `None` for headers.
    pub fn item_key(&self, item: &Item) -> Option<Item> {
        item.key(self.value_key.as_deref())
    }

    /// Text shown for an item.
    pub fn display_text(&self, item: &Item) -> String {
        item.display_text(self.display_key.as_deref().or(self.value_key.as_deref()))
    }

    // ------------------------------------------------------------------------
    // Search
    // ------------------------------------------------------------------------

    pub fn search_text(&self) -> &str {
        &self.search_text
    }

    /// Update the search text and re-filter.
    pub fn set_search_text(&mut self, text: impl Into<String>) -> Result<()> {
        self.search_text = text.into();
        self.apply_search()
    }

    /// The displayed projection.
    pub fn filtered_items(&self) -> &[Item] {
        self.pipeline.projection()
    }

    fn apply_grouping(&mut self) -> Result<()> {
        self.pipeline
            .set_grouping(self.group_key.as_deref(), self.value_key.as_deref())?;
        self.refresh_items();
        Ok(())
    }

    fn apply_search(&mut self) -> Result<()> {
        let mut state = FilteringState::new(FilteringLogic::And);
        if self.config.filterable && !self.search_text.is_empty() {
            let field = self.display_key.clone().or_else(|| self.value_key.clone());
            let expression = match field {
                Some(field) => FilteringExpression::for_field(
                    field,
                    StringCondition::Contains,
                    self.search_text.as_str(),
                ),
                None => FilteringExpression::for_item(
                    StringCondition::Contains,
                    self.search_text.as_str(),
                ),
            };
            state.push(expression.with_ignore_case(self.config.ignore_case));
        }
        self.pipeline.set_filtering(state)?;
        self.refresh_items();
        Ok(())
    }

    fn refresh_items(&mut self) {
        let items = self.list_items(self.pipeline.projection());
        self.nav.set_items(items);
    }

    fn list_items(&self, items: &[Item]) -> Vec<ListItem<Item>> {
        let value_key = self.value_key.as_deref();
        items
            .iter()
            .map(|item| match item.key(value_key) {
                Some(key) => ListItem::new(key),
                None => ListItem::header(),
            })
            .collect()
    }

    fn filtered_keys(&self) -> Vec<Item> {
        self.filtered_items()
            .iter()
            .filter_map(|item| self.item_key(item))
            .collect()
    }

    // ------------------------------------------------------------------------
    // Selection
    // ------------------------------------------------------------------------

    /// Current selection keys, in selection order.
    pub fn selection(&self) -> Selection<Item> {
        self.nav.selection()
    }

    /// Select keys, optionally replacing the current selection.
    pub fn select_items(
        &mut self,
        keys: impl IntoIterator<Item = Item>,
        clear_current: bool,
    ) -> Selection<Item> {
        if clear_current {
            self.nav
                .update_selection(|registry, id| registry.set_selection(id, keys))
        } else {
            self.nav
                .update_selection(|registry, id| registry.select_items(id, keys))
        }
    }

    /// Deselect keys.
    pub fn deselect_items(&mut self, keys: impl IntoIterator<Item = Item>) -> Selection<Item> {
        self.nav
            .update_selection(|registry, id| registry.deselect_items(id, keys))
    }

    /// Select every item currently shown.
    pub fn select_all_filtered(&mut self) -> Selection<Item> {
        let keys = self.filtered_keys();
        self.select_items(keys, false)
    }

    /// Deselect every item currently shown.
    pub fn deselect_all_filtered(&mut self) -> Selection<Item> {
        let keys = self.filtered_keys();
        self.deselect_items(keys)
    }

    /// State of the "select all" checkbox over the shown items.
    pub fn header_check_state(&self) -> CheckState {
        let keys = self.filtered_keys();
        if keys.is_empty() {
            return CheckState::Unchecked;
        }
        let selection = self.selection();
        let selected = keys.iter().filter(|k| selection.contains(k)).count();
        match selected {
            0 => CheckState::Unchecked,
            n if n == keys.len() => CheckState::Checked,
            _ => CheckState::PartiallyChecked,
        }
    }

    /// Click on the "select all" checkbox.
    pub fn toggle_header(&mut self) -> Selection<Item> {
        match self.header_check_state() {
            CheckState::Checked => self.deselect_all_filtered(),
            CheckState::Unchecked | CheckState::PartiallyChecked => self.select_all_filtered(),
        }
    }

    /// Selected items in selection order.
    ///
    /// Keys without a matching item in the data are skipped.
    pub fn selected_items(&self) -> Vec<Item> {
        let value_key = self.value_key.as_deref();
        self.selection()
            .iter()
            .filter_map(|key| {
                self.pipeline
                    .data()
                    .iter()
                    .find(|item| item.key(value_key).as_ref() == Some(key))
                    .cloned()
            })
            .collect()
    }

    /// Display texts of the selected items joined by `", "`.
    pub fn selected_text(&self) -> String {
        self.selected_items()
            .iter()
            .map(|item| self.display_text(item))
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Add the search text as a new, selected item.
    ///
    /// Does nothing (returns `false`) unless custom values are allowed, the
    /// search text is non-empty, and no item already displays that text.
    pub fn add_custom_value(&mut self) -> Result<bool> {
        let text = self.search_text.trim().to_string();
        if !self.config.allow_custom_values || text.is_empty() {
            return Ok(false);
        }

        let exists = self.pipeline.data().iter().any(|item| {
            let shown = self.display_text(item);
            if self.config.ignore_case {
                shown.to_lowercase() == text.to_lowercase()
            } else {
                shown == text
            }
        });
        if exists {
            return Ok(false);
        }

        let item = match (&self.value_key, &self.display_key) {
            (None, None) => Item::Value(ItemValue::from(text.as_str())),
            (value_key, display_key) => {
                let mut record = Record::new();
                for key in [value_key, display_key].into_iter().flatten() {
                    record.set(key.as_str(), text.as_str());
                }
                Item::Record(record)
            }
        };

        self.pipeline.push(item.clone())?;
        self.search_text.clear();
        self.apply_search()?;
        if let Some(key) = self.item_key(&item) {
            self.select_items([key], false);
        }

        tracing::debug!(target: targets::LIST, id = %self.id(), value = %text, "custom value added");
        Ok(true)
    }

    // ------------------------------------------------------------------------
    // Open / close
    // ------------------------------------------------------------------------

    /// Open the list, resetting the search text.
    ///
    /// The search text survives a vetoed open.
    pub fn open(&mut self) -> Result<bool> {
        if self.search_text.is_empty() {
            return Ok(self.nav.open());
        }
        let items = self.list_items(self.pipeline.grouped());
        if !self.nav.open_with_items(items) {
            return Ok(false);
        }
        self.search_text.clear();
        self.apply_search()?;
        Ok(true)
    }

    pub fn close(&mut self) -> bool {
        self.nav.close()
    }

    /// Handle a navigation key.
    pub fn handle_key(&mut self, key: NavigationKey) -> bool {
        self.nav.handle_key(key)
    }

    /// Navigation state, focus and signals.
    pub fn navigation(&self) -> &NavigationController<Item, V> {
        &self.nav
    }

    pub fn navigation_mut(&mut self) -> &mut NavigationController<Item, V> {
        &mut self.nav
    }
}
