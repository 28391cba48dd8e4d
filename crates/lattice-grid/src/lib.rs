//! Lattice Grid - a headless interaction and data-shaping engine for
//! selectable lists and data grids.
//!
//! The crate holds the logic behind drop-downs, combo boxes and a data grid,
//! independent of any rendering framework. A host toolkit draws the widgets
//! and forwards user input here:
//!
//! - [`model`]: item values, the keyed [`SelectionRegistry`](model::SelectionRegistry)
//!   and the filter/sort/group pipeline
//! - [`view`]: the list [`NavigationController`](view::NavigationController)
//!   and the [`DropDown`](view::DropDown) / [`ComboBox`](view::ComboBox)
//!   compositions built on it
//! - [`grid`]: the column [`PinningPlanner`](grid::PinningPlanner) and the
//!   [`ColumnReorder`](grid::ColumnReorder) drag protocol
//! - [`config`]: TOML-backed settings
//!
//! # Example
//!
//! ```
//! use lattice_grid::config::GridConfig;
//! use lattice_grid::grid::{Column, PinningPlanner};
//!
//! let columns = ["A", "B", "C", "D"]
//!     .into_iter()
//!     .map(|field| Column::new(field, 200.0))
//!     .collect();
//! let mut planner = PinningPlanner::new(columns, 800.0, &GridConfig::default());
//!
//! assert!(planner.pin("A"));
//! assert!(planner.pin("B"));
//! assert!(planner.pin("C"));
//! // Pinning D would leave no unpinned width.
//! assert!(!planner.pin("D"));
//! ```

pub mod config;
pub mod error;
pub mod event;
pub mod grid;
pub mod logging;
pub mod model;
pub mod prelude;
pub mod view;

pub use error::{ConfigError, Error, PipelineError, Result};
pub use lattice_grid_core::{IdGenerator, IntervalTimer, Signal, TimerId, TimerManager};
