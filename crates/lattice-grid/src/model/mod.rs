//! Data model: item values, selection, and the filter/sort/group pipeline.
//!
//! # Pipeline
//!
//! The free functions [`filter`], [`sort`] and [`group`] are pure: they take
//! a collection and an expression list and return a new projection.
//! [`DataPipeline`] composes them for a widget and caches the grouped
//! projection between search passes.
//!
//! ```
//! use lattice_grid::model::{group, Item, Record};
//!
//! let items = vec![
//!     Item::Record(Record::new().with("name", "b")),
//!     Item::Record(Record::new().with("name", "a")),
//! ];
//! let grouped = group(&items, "name", Some("name")).unwrap();
//! assert_eq!(grouped.len(), 4);
//! assert!(grouped[0].is_header());
//! ```

mod filtering;
mod grouping;
mod item;
mod pipeline;
mod selection;
mod sorting;
mod value;

pub use filtering::{
    filter, filter_condition_label, BooleanCondition, CustomCondition, DataType, DateCondition,
    FilteringCondition, FilteringExpression, FilteringLogic, FilteringState, NumberCondition,
    PresenceCondition, StringCondition,
};
pub use grouping::group;
pub use item::{GroupHeader, Item, IS_HEADER_FIELD};
pub use pipeline::DataPipeline;
pub use selection::{diff, Selection, SelectionDiff, SelectionKey, SelectionRegistry};
pub use sorting::{sort, SortingDirection, SortingExpression, SortingState};
pub use value::{ItemValue, Record};
