//! Navigable lists.
//!
//! [`NavigationController`] is the shared capability: focus, keyboard
//! navigation, open/close and selection through the registry. [`DropDown`]
//! and [`ComboBox`] compose it with their own collaborators.

mod combo;
mod drop_down;
mod navigation;

pub use combo::{CheckState, ComboBox, COMBO_ID_PREFIX};
pub use drop_down::{DropDown, DropDownItem, DROP_DOWN_ID_PREFIX};
pub use navigation::{
    FocusChange, ItemBounds, ListItem, ListState, NavigationController, NavigationKey,
    SelectionChange, SelectionMode, ToggleEvent, UniformViewport, Viewport,
};
