//! Prelude module for Lattice Grid.
//!
//! ```
//! use lattice_grid::prelude::*;
//! ```

// ============================================================================
// Runtime
// ============================================================================

pub use lattice_grid_core::{IdGenerator, IntervalTimer, Signal, TimerManager};

pub use crate::config::{GridConfig, LatticeConfig, ListConfig};
pub use crate::error::{Error, Result};
pub use crate::event::CancelFlag;

// ============================================================================
// Data Model
// ============================================================================

pub use crate::model::{
    DataPipeline, FilteringExpression, FilteringLogic, FilteringState, Item, ItemValue, Record,
    Selection, SelectionRegistry, SortingDirection, SortingExpression, StringCondition,
};

// ============================================================================
// Lists
// ============================================================================

pub use crate::view::{
    CheckState, ComboBox, DropDown, DropDownItem, ListItem, NavigationController, NavigationKey,
    SelectionMode, UniformViewport, Viewport,
};

// ============================================================================
// Grid
// ============================================================================

pub use crate::grid::{Column, ColumnReorder, DropPosition, HorizontalScroll, PinningPlanner};
