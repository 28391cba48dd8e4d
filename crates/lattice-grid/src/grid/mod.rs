//! Grid columns: pinning and drag-to-reorder.

mod column;
mod column_moving;
mod pinning;

pub use column::{Column, DropPosition};
pub use column_moving::{
    ColumnMovingEvent, ColumnMovingStart, ColumnReorder, DragSession, DragState,
    HorizontalScroll, ScrollEdge,
};
pub use pinning::{ColumnMove, ColumnPinningEvent, PinningChange, PinningPlanner};
