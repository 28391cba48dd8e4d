//! Focus and keyboard navigation for selectable lists.
//!
//! [`NavigationController`] is the navigable-list capability shared by the
//! drop-down and the combo box. It tracks the open/closed state of one list,
//! the focused item, and keeps the focused item visible by adjusting the
//! scroll offset of a host-supplied [`Viewport`].
//!
//! # State Machine
//!
//! ```text
//! Closed -> Opening -> Open -> Closing -> Closed
//! ```
//!
//! `Opening` and `Closing` are observable from the `opening` and `closing`
//! signals, whose slots may veto the transition.
//!
//! # Focus Rules
//!
//! Headers and disabled items are never focused. A single step moves past
//! any run of them. Navigating an empty or all-disabled list does nothing.

use std::sync::Arc;

use lattice_grid_core::Signal;

use crate::event::CancelFlag;
use crate::logging::targets;
use crate::model::{diff, Selection, SelectionDiff, SelectionKey, SelectionRegistry};

// ============================================================================
// Viewport adapter
// ============================================================================

/// Vertical extent of an item in content coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ItemBounds {
    pub top: f32,
    pub bottom: f32,
}

/// Geometry supplied by the host's scroll container.
///
/// The controller holds no pixel state of its own; everything it needs is
/// queried here. Item indices are positions in the list's current items.
pub trait Viewport {
    /// Number of items laid out.
    fn item_count(&self) -> usize;

    /// Lay out a new number of items, re-clamping the scroll offset.
    fn set_item_count(&mut self, item_count: usize);

    /// Height of one item.
    fn item_height(&self, index: usize) -> f32;

    /// Bounds of one item, or `None` if it is not laid out.
    fn item_bounds(&self, index: usize) -> Option<ItemBounds>;

    /// Current vertical scroll offset.
    fn scroll_top(&self) -> f32;

    /// Request a new scroll offset. The host clamps it to its valid range.
    fn set_scroll_top(&mut self, value: f32);

    /// Visible height.
    fn client_height(&self) -> f32;
}

/// A viewport over items of identical height.
#[derive(Debug, Clone, PartialEq)]
pub struct UniformViewport {
    item_count: usize,
    item_height: f32,
    client_height: f32,
    scroll_top: f32,
}

impl UniformViewport {
    /// Create a viewport scrolled to the top.
    pub fn new(item_count: usize, item_height: f32, client_height: f32) -> Self {
        Self {
            item_count,
            item_height,
            client_height,
            scroll_top: 0.0,
        }
    }

    /// Largest valid scroll offset.
    pub fn max_scroll_top(&self) -> f32 {
        (self.item_count as f32 * self.item_height - self.client_height).max(0.0)
    }
}

impl Viewport for UniformViewport {
    fn item_count(&self) -> usize {
        self.item_count
    }

    fn set_item_count(&mut self, item_count: usize) {
        self.item_count = item_count;
        let top = self.scroll_top;
        self.set_scroll_top(top);
    }

    fn item_height(&self, _index: usize) -> f32 {
        self.item_height
    }

    fn item_bounds(&self, index: usize) -> Option<ItemBounds> {
        if index >= self.item_count {
            return None;
        }
        let top = index as f32 * self.item_height;
        Some(ItemBounds {
            top,
            bottom: top + self.item_height,
        })
    }

    fn scroll_top(&self) -> f32 {
        self.scroll_top
    }

    fn set_scroll_top(&mut self, value: f32) {
        self.scroll_top = value.clamp(0.0, self.max_scroll_top());
    }

    fn client_height(&self) -> f32 {
        self.client_height
    }
}

// ============================================================================
// List items and notifications
// ============================================================================

/// Open/closed state of a list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ListState {
    #[default]
    Closed,
    Opening,
    Open,
    Closing,
}

/// Whether selecting replaces or toggles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SelectionMode {
    /// One key at most; selecting replaces.
    #[default]
    Single,
    /// Any number of keys; selecting toggles.
    Multiple,
}

/// Navigation commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavigationKey {
    ArrowUp,
    ArrowDown,
    Home,
    End,
    Enter,
    Space,
    Escape,
    /// Alt+ArrowDown: open a closed list.
    AltArrowDown,
    /// Alt+ArrowUp: close an open list.
    AltArrowUp,
}

/// What the controller needs to know about one item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListItem<K> {
    /// Selection key; `None` for headers.
    pub key: Option<K>,
    pub header: bool,
    pub disabled: bool,
}

impl<K> ListItem<K> {
    /// A selectable item.
    pub fn new(key: K) -> Self {
        Self {
            key: Some(key),
            header: false,
            disabled: false,
        }
    }

    /// A group header.
    pub fn header() -> Self {
        Self {
            key: None,
            header: true,
            disabled: false,
        }
    }

    /// Builder-style disabled flag.
    pub fn disabled(mut self, disabled: bool) -> Self {
        self.disabled = disabled;
        self
    }

    /// Returns `true` if focus may land on this item.
    pub fn is_focusable(&self) -> bool {
        !self.header && !self.disabled && self.key.is_some()
    }
}

/// Arguments of the `opening` and `closing` signals.
#[derive(Debug, Clone, Default)]
pub struct ToggleEvent {
    pub cancel: CancelFlag,
}

/// Arguments of the `focus_changed` signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FocusChange {
    pub old: Option<usize>,
    pub new: Option<usize>,
}

/// Arguments of the `selection_changed` signal.
#[derive(Debug, Clone)]
pub struct SelectionChange<K> {
    pub old_selection: Selection<K>,
    pub new_selection: Selection<K>,
    pub diff: SelectionDiff<K>,
}

// ============================================================================
// Controller
// ============================================================================

/// Per-list navigation state machine.
pub struct NavigationController<K: SelectionKey, V: Viewport> {
    id: String,
    registry: Arc<SelectionRegistry<K>>,
    viewport: V,
    mode: SelectionMode,
    close_on_select: bool,
    state: ListState,
    items: Vec<ListItem<K>>,
    focused: Option<usize>,

    /// Emitted before opening; cancelable.
    pub opening: Signal<ToggleEvent>,
    /// Emitted once open.
    pub opened: Signal<()>,
    /// Emitted before closing; cancelable.
    pub closing: Signal<ToggleEvent>,
    /// Emitted once closed.
    pub closed: Signal<()>,
    /// Emitted when the focused index changes.
    pub focus_changed: Signal<FocusChange>,
    /// Emitted when a selection made through this controller changes anything.
    pub selection_changed: Signal<SelectionChange<K>>,
}

impl<K: SelectionKey, V: Viewport> std::fmt::Debug for NavigationController<K, V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NavigationController")
            .field("id", &self.id)
            .field("state", &self.state)
            .field("items", &self.items.len())
            .field("focused", &self.focused)
            .finish()
    }
}

impl<K: SelectionKey, V: Viewport> NavigationController<K, V> {
    /// Create a closed controller for widget `id`.
    pub fn new(
        id: impl Into<String>,
        registry: Arc<SelectionRegistry<K>>,
        viewport: V,
        mode: SelectionMode,
    ) -> Self {
        Self {
            id: id.into(),
            registry,
            viewport,
            mode,
            close_on_select: mode == SelectionMode::Single,
            state: ListState::Closed,
            items: Vec::new(),
            focused: None,
            opening: Signal::new(),
            opened: Signal::new(),
            closing: Signal::new(),
            closed: Signal::new(),
            focus_changed: Signal::new(),
            selection_changed: Signal::new(),
        }
    }

    // ------------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------------

    /// The widget id keying this list's selection.
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn state(&self) -> ListState {
        self.state
    }

    pub fn is_open(&self) -> bool {
        self.state == ListState::Open
    }

    pub fn mode(&self) -> SelectionMode {
        self.mode
    }

    /// Whether selecting in single mode closes the list.
    pub fn set_close_on_select(&mut self, close_on_select: bool) {
        self.close_on_select = close_on_select;
    }

    pub fn items(&self) -> &[ListItem<K>] {
        &self.items
    }

    pub fn focused_index(&self) -> Option<usize> {
        self.focused
    }

    /// Key of the focused item.
    pub fn focused_key(&self) -> Option<&K> {
        self.focused
            .and_then(|i| self.items.get(i))
            .and_then(|item| item.key.as_ref())
    }

    pub fn viewport(&self) -> &V {
        &self.viewport
    }

    pub fn viewport_mut(&mut self) -> &mut V {
        &mut self.viewport
    }

    pub fn registry(&self) -> &Arc<SelectionRegistry<K>> {
        &self.registry
    }

    /// Current selection of this widget.
    pub fn selection(&self) -> Selection<K> {
        self.registry.get_selection(&self.id)
    }

    /// Index of the first focusable item with `key`.
    pub fn index_of(&self, key: &K) -> Option<usize> {
        self.items
            .iter()
            .position(|item| item.is_focusable() && item.key.as_ref() == Some(key))
    }

    // ------------------------------------------------------------------------
    // Items
    // ------------------------------------------------------------------------

    /// Replace the items, for example after a filter pass.
    ///
    /// The viewport is told the new item count. Focus follows the focused key
    /// to its new index, and is dropped if the key is no longer present.
    pub fn set_items(&mut self, items: Vec<ListItem<K>>) {
        let focused_key = self.focused_key().cloned();
        self.items = items;
        self.viewport.set_item_count(self.items.len());
        if self.focused.is_some() {
            let refocus = focused_key.and_then(|key| self.index_of(&key));
            self.set_focus(refocus);
        }
        tracing::trace!(target: targets::NAVIGATION, id = %self.id, len = self.items.len(), "items replaced");
    }

    // ------------------------------------------------------------------------
    // Open / close
    // ------------------------------------------------------------------------

    /// Open the list.
    ///
    /// Focus lands on the first selected item and the viewport is scrolled to
    /// center it. Returns `false` if the list was not closed or a slot vetoed.
    pub fn open(&mut self) -> bool {
        self.open_inner(None)
    }

    /// Open the list, replacing its items once no slot has vetoed.
    ///
    /// A vetoed open leaves the current items untouched.
    pub fn open_with_items(&mut self, items: Vec<ListItem<K>>) -> bool {
        self.open_inner(Some(items))
    }

    fn open_inner(&mut self, items: Option<Vec<ListItem<K>>>) -> bool {
        if self.state != ListState::Closed {
            return false;
        }

        self.state = ListState::Opening;
        let event = ToggleEvent::default();
        self.opening.emit(event.clone());
        if event.cancel.is_cancelled() {
            tracing::debug!(target: targets::NAVIGATION, id = %self.id, "open vetoed");
            self.state = ListState::Closed;
            return false;
        }
        if let Some(items) = items {
            self.set_items(items);
        }

        let selection = self.selection();
        let initial = selection.iter().find_map(|key| self.index_of(key));
        self.state = ListState::Open;
        self.set_focus(initial);
        if let Some(index) = initial {
            let offset = self.centered_offset(index);
            self.viewport.set_scroll_top(offset);
        }

        tracing::debug!(target: targets::NAVIGATION, id = %self.id, focused = ?initial, "list opened");
        self.opened.emit(());
        true
    }

    /// Close the list, discarding focus.
    ///
    /// Returns `false` if the list was not open or a slot vetoed.
    pub fn close(&mut self) -> bool {
        if self.state != ListState::Open {
            return false;
        }

        self.state = ListState::Closing;
        let event = ToggleEvent::default();
        self.closing.emit(event.clone());
        if event.cancel.is_cancelled() {
            tracing::debug!(target: targets::NAVIGATION, id = %self.id, "close vetoed");
            self.state = ListState::Open;
            return false;
        }

        self.set_focus(None);
        self.state = ListState::Closed;
        tracing::debug!(target: targets::NAVIGATION, id = %self.id, "list closed");
        self.closed.emit(());
        true
    }

    /// Open a closed list or close an open one.
    pub fn toggle(&mut self) -> bool {
        match self.state {
            ListState::Closed => self.open(),
            ListState::Open => self.close(),
            ListState::Opening | ListState::Closing => false,
        }
    }

    // ------------------------------------------------------------------------
    // Focus
    // ------------------------------------------------------------------------

    /// Focus the nearest focusable item after the focused one (or the first
    /// one if nothing is focused).
    ///
    /// Returns the new index, or `None` if focus did not move.
    pub fn focus_next(&mut self) -> Option<usize> {
        if !self.is_open() {
            return None;
        }
        let start = self.focused.map_or(0, |i| i + 1);
        let target = (start..self.items.len()).find(|&i| self.items[i].is_focusable())?;
        self.move_focus(target);
        Some(target)
    }

    /// Focus the nearest focusable item before the focused one.
    pub fn focus_prev(&mut self) -> Option<usize> {
        if !self.is_open() {
            return None;
        }
        let current = self.focused?;
        let target = (0..current).rev().find(|&i| self.items[i].is_focusable())?;
        self.move_focus(target);
        Some(target)
    }

    /// Focus the first focusable item.
    pub fn focus_first(&mut self) -> Option<usize> {
        if !self.is_open() {
            return None;
        }
        let target = (0..self.items.len()).find(|&i| self.items[i].is_focusable())?;
        self.move_focus(target);
        Some(target)
    }

    /// Focus the last focusable item.
    pub fn focus_last(&mut self) -> Option<usize> {
        if !self.is_open() {
            return None;
        }
        let target = (0..self.items.len())
            .rev()
            .find(|&i| self.items[i].is_focusable())?;
        self.move_focus(target);
        Some(target)
    }

    /// Focus a specific item. Out-of-range or unfocusable indices are ignored.
    pub fn focus_index(&mut self, index: usize) -> bool {
        if !self.is_open() || !self.items.get(index).is_some_and(ListItem::is_focusable) {
            return false;
        }
        self.move_focus(index);
        true
    }

    fn move_focus(&mut self, index: usize) {
        self.set_focus(Some(index));
        self.scroll_into_view(index);
    }

    fn set_focus(&mut self, new: Option<usize>) {
        let old = self.focused;
        if old == new {
            return;
        }
        self.focused = new;
        tracing::trace!(target: targets::NAVIGATION, id = %self.id, ?old, ?new, "focus changed");
        self.focus_changed.emit(FocusChange { old, new });
    }

    // ------------------------------------------------------------------------
    // Scrolling
    // ------------------------------------------------------------------------

    /// Scroll by the minimum amount that brings an item fully into view.
    ///
    /// Returns `true` if the scroll offset was changed.
    pub fn scroll_into_view(&mut self, index: usize) -> bool {
        let Some(bounds) = self.viewport.item_bounds(index) else {
            return false;
        };
        let top = self.viewport.scroll_top();
        let bottom = top + self.viewport.client_height();

        let target = if bounds.top < top {
            top - (top - bounds.top)
        } else if bounds.bottom > bottom {
            top + (bounds.bottom - bottom)
        } else {
            return false;
        };
        self.viewport.set_scroll_top(target);
        true
    }

    /// Scroll offset that centers an item in the viewport.
    ///
    /// Not clamped; the host clamps it when applying.
    pub fn centered_offset(&self, index: usize) -> f32 {
        let before: f32 = (0..index).map(|i| self.viewport.item_height(i)).sum();
        let client = self.viewport.client_height();
        let height = self.viewport.item_height(index);
        (before - client / 2.0 + height / 2.0).floor()
    }

    // ------------------------------------------------------------------------
    // Selection
    // ------------------------------------------------------------------------

    /// Select the focused item.
    ///
    /// Single mode replaces the selection and closes the list (unless
    /// `close_on_select` was turned off); multiple mode toggles the key.
    pub fn select_focused(&mut self) -> Option<Selection<K>> {
        if !self.is_open() {
            return None;
        }
        let key = self.focused_key()?.clone();

        let selection = match self.mode {
            SelectionMode::Single => {
                self.update_selection(|registry, id| registry.set_selection(id, [key]))
            }
            SelectionMode::Multiple => {
                self.update_selection(|registry, id| registry.toggle_item(id, key))
            }
        };

        if self.mode == SelectionMode::Single && self.close_on_select {
            self.close();
        }
        Some(selection)
    }

    /// Apply a registry mutation for this widget and emit `selection_changed`
    /// if it changed anything.
    pub fn update_selection(
        &self,
        op: impl FnOnce(&SelectionRegistry<K>, &str) -> Selection<K>,
    ) -> Selection<K> {
        let old_selection = self.registry.get_selection(&self.id);
        let new_selection = op(&self.registry, &self.id);

        if !new_selection.same_as(&old_selection) {
            let diff = diff(&old_selection, &new_selection);
            tracing::debug!(
                target: targets::NAVIGATION,
                id = %self.id,
                added = diff.added.len(),
                removed = diff.removed.len(),
                "selection changed"
            );
            self.selection_changed.emit(SelectionChange {
                old_selection,
                new_selection: new_selection.clone(),
                diff,
            });
        }
        new_selection
    }

    // ------------------------------------------------------------------------
    // Keyboard
    // ------------------------------------------------------------------------

    /// Handle a navigation key. Returns `true` if the key was consumed.
    pub fn handle_key(&mut self, key: NavigationKey) -> bool {
        match key {
            NavigationKey::AltArrowDown => return self.open(),
            NavigationKey::AltArrowUp | NavigationKey::Escape => return self.close(),
            _ => {}
        }
        if !self.is_open() {
            return false;
        }

        match key {
            NavigationKey::ArrowDown => {
                self.focus_next();
            }
            NavigationKey::ArrowUp => {
                self.focus_prev();
            }
            NavigationKey::Home => {
                self.focus_first();
            }
            NavigationKey::End => {
                self.focus_last();
            }
            NavigationKey::Enter | NavigationKey::Space => {
                self.select_focused();
            }
            NavigationKey::AltArrowDown | NavigationKey::AltArrowUp | NavigationKey::Escape => {}
        }
        true
    }
}

impl<K: SelectionKey, V: Viewport> Drop for NavigationController<K, V> {
    fn drop(&mut self) {
        self.registry.clear(&self.id);
    }
}
