//! Single-selection drop-down list.

use std::sync::Arc;

use lattice_grid_core::IdGenerator;

use super::navigation::{ListItem, NavigationController, NavigationKey, SelectionMode, Viewport};
use crate::config::ListConfig;
use crate::error::Result;
use crate::logging::targets;
use crate::model::{ItemValue, Selection, SelectionRegistry};

/// Id prefix of drop-down instances.
pub const DROP_DOWN_ID_PREFIX: &str = "drop-down";

/// One entry of a drop-down.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DropDownItem {
    pub value: ItemValue,
    pub header: bool,
    pub disabled: bool,
}

impl DropDownItem {
    /// A selectable entry.
    pub fn new(value: impl Into<ItemValue>) -> Self {
        Self {
            value: value.into(),
            header: false,
            disabled: false,
        }
    }

    /// A non-selectable header entry.
    pub fn header(value: impl Into<ItemValue>) -> Self {
        Self {
            value: value.into(),
            header: true,
            disabled: false,
        }
    }

    /// Builder-style disabled flag.
    pub fn disabled(mut self, disabled: bool) -> Self {
        self.disabled = disabled;
        self
    }

    fn is_selectable(&self) -> bool {
        !self.header && !self.disabled
    }
}

/// A drop-down list selecting at most one value.
pub struct DropDown<V: Viewport> {
    nav: NavigationController<ItemValue, V>,
    items: Vec<DropDownItem>,
}

impl<V: Viewport> std::fmt::Debug for DropDown<V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DropDown")
            .field("nav", &self.nav)
            .field("items", &self.items.len())
            .finish()
    }
}

impl<V: Viewport> DropDown<V> {
    /// Create a closed drop-down with a freshly generated id.
    pub fn new(
        ids: &IdGenerator,
        registry: Arc<SelectionRegistry<ItemValue>>,
        viewport: V,
        config: &ListConfig,
    ) -> Result<Self> {
        let id = ids.next_id(DROP_DOWN_ID_PREFIX)?;
        let mut nav = NavigationController::new(id, registry, viewport, SelectionMode::Single);
        nav.set_close_on_select(config.close_on_select);
        Ok(Self {
            nav,
            items: Vec::new(),
        })
    }

    /// The widget id.
    pub fn id(&self) -> &str {
        self.nav.id()
    }

    /// Replace the entries.
    pub fn set_items(&mut self, items: Vec<DropDownItem>) {
        let list_items = items
            .iter()
            .map(|item| ListItem {
                key: (!item.header).then(|| item.value.clone()),
                header: item.header,
                disabled: item.disabled,
            })
            .collect();
        self.items = items;
        self.nav.set_items(list_items);
    }

    pub fn items(&self) -> &[DropDownItem] {
        &self.items
    }

    /// Index of the selected entry.
    pub fn selected_item(&self) -> Option<usize> {
        let selection = self.nav.selection();
        let key = selection.iter().next()?;
        self.items
            .iter()
            .position(|item| !item.header && &item.value == key)
    }

    /// Select the entry at `index`.
    ///
    /// Out-of-range, header and disabled indices are ignored and return `false`.
    pub fn set_selected_item(&mut self, index: usize) -> bool {
        let Some(item) = self.items.get(index).filter(|item| item.is_selectable()) else {
            tracing::trace!(target: targets::LIST, id = %self.id(), index, "ignored selection request");
            return false;
        };
        let value = item.value.clone();
        self.nav
            .update_selection(|registry, id| registry.set_selection(id, [value]));
        true
    }

    /// Drop the selection.
    pub fn clear_selection(&mut self) -> Selection<ItemValue> {
        self.nav
            .update_selection(|registry, id| registry.set_selection(id, std::iter::empty()))
    }

    pub fn open(&mut self) -> bool {
        self.nav.open()
    }

    pub fn close(&mut self) -> bool {
        self.nav.close()
    }

    pub fn toggle(&mut self) -> bool {
        self.nav.toggle()
    }

    /// Handle a navigation key.
    pub fn handle_key(&mut self, key: NavigationKey) -> bool {
        self.nav.handle_key(key)
    }

    /// Navigation state, focus and signals.
    pub fn navigation(&self) -> &NavigationController<ItemValue, V> {
        &self.nav
    }

    pub fn navigation_mut(&mut self) -> &mut NavigationController<ItemValue, V> {
        &mut self.nav
    }
}
