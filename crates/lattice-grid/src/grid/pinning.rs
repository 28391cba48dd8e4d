//! Column pinning.
//!
//! The [`PinningPlanner`] owns the column list of a grid. Columns keep a
//! declared order; pinned columns additionally live in a pinned order. The
//! display order is the pinned prefix followed by the unpinned columns in
//! declared order, with hidden columns skipped.
//!
//! A pin is only accepted if the unpinned region keeps at least
//! `min_unpinned_fraction` of the grid width. The check runs at the moment
//! of pinning; later width or visibility changes never revoke a pin.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use lattice_grid_core::Signal;

use super::column::{Column, DropPosition};
use crate::config::GridConfig;
use crate::logging::targets;

/// Emitted before a column is pinned.
///
/// A slot may move the column elsewhere in the pinned prefix by calling
/// [`set_insert_at_index`](Self::set_insert_at_index).
#[derive(Debug, Clone)]
pub struct ColumnPinningEvent {
    pub field: String,
    insert_at_index: Arc<AtomicUsize>,
}

impl ColumnPinningEvent {
    /// Position in the pinned prefix the column will take.
    pub fn insert_at_index(&self) -> usize {
        self.insert_at_index.load(Ordering::SeqCst)
    }

    pub fn set_insert_at_index(&self, index: usize) {
        self.insert_at_index.store(index, Ordering::SeqCst);
    }
}

/// Emitted after a column was pinned or unpinned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PinningChange {
    pub field: String,
    pub pinned: bool,
}

/// Emitted after a column was moved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnMove {
    pub source: String,
    pub target: String,
    pub position: DropPosition,
}

/// Owner of a grid's columns, their pin state and display order.
pub struct PinningPlanner {
    /// Declared order.
    columns: Vec<Column>,
    /// Fields of pinned columns in pinned order.
    pinned_order: Vec<String>,
    grid_width: f32,
    min_unpinned_fraction: f32,

    /// Emitted before a pin is committed.
    pub column_pinning: Signal<ColumnPinningEvent>,
    /// Emitted after a pin or unpin.
    pub pinning_changed: Signal<PinningChange>,
    /// Emitted after [`move_column`](Self::move_column).
    pub column_moved: Signal<ColumnMove>,
}

impl std::fmt::Debug for PinningPlanner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PinningPlanner")
            .field("columns", &self.columns)
            .field("pinned_order", &self.pinned_order)
            .field("grid_width", &self.grid_width)
            .field("min_unpinned_fraction", &self.min_unpinned_fraction)
            .finish()
    }
}

impl PinningPlanner {
    /// Create a planner over `columns` in declared order.
    ///
    /// Columns declared as pinned are accepted as-is, in declared order.
    pub fn new(columns: Vec<Column>, grid_width: f32, config: &GridConfig) -> Self {
        let pinned_order = columns
            .iter()
            .filter(|c| c.is_pinned())
            .map(|c| c.field().to_string())
            .collect();
        let mut planner = Self {
            columns,
            pinned_order,
            grid_width: grid_width.max(0.0),
            min_unpinned_fraction: config.min_unpinned_fraction,
            column_pinning: Signal::new(),
            pinning_changed: Signal::new(),
            column_moved: Signal::new(),
        };
        planner.recompute_visible_indices();
        planner
    }

    // ------------------------------------------------------------------------
    // Columns
    // ------------------------------------------------------------------------

    /// All columns in declared order.
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column(&self, field: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.field() == field)
    }

    fn position(&self, field: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.field() == field)
    }

    fn column_mut(&mut self, field: &str) -> Option<&mut Column> {
        self.columns.iter_mut().find(|c| c.field() == field)
    }

    /// Visible pinned columns in pinned order.
    pub fn pinned_columns(&self) -> Vec<&Column> {
        self.pinned_order
            .iter()
            .filter_map(|field| self.column(field))
            .filter(|c| !c.is_hidden())
            .collect()
    }

    /// Visible unpinned columns in declared order.
    pub fn unpinned_columns(&self) -> Vec<&Column> {
        self.columns
            .iter()
            .filter(|c| !c.is_pinned() && !c.is_hidden())
            .collect()
    }

    /// Visible columns in display order.
    pub fn visible_columns(&self) -> Vec<&Column> {
        let mut visible = self.pinned_columns();
        visible.extend(self.unpinned_columns());
        visible
    }

    /// Show or hide a column. Pin state is kept while hidden.
    pub fn set_hidden(&mut self, field: &str, hidden: bool) -> bool {
        let Some(column) = self.column_mut(field) else {
            return false;
        };
        if column.is_hidden() == hidden {
            return false;
        }
        column.set_hidden(hidden);
        self.recompute_visible_indices();
        true
    }

    /// Resize a column.
    pub fn set_width(&mut self, field: &str, width: f32) -> bool {
        let Some(column) = self.column_mut(field) else {
            return false;
        };
        column.set_width(width);
        true
    }

    pub fn grid_width(&self) -> f32 {
        self.grid_width
    }

    pub fn set_grid_width(&mut self, width: f32) {
        self.grid_width = width.max(0.0);
    }

    // ------------------------------------------------------------------------
    // Width accounting
    // ------------------------------------------------------------------------

    /// Sum of visible pinned column widths.
    pub fn pinned_width(&self) -> f32 {
        self.columns
            .iter()
            .filter(|c| c.is_pinned())
            .map(Column::occupied_width)
            .sum()
    }

    /// Sum of visible unpinned column widths.
    pub fn unpinned_width(&self) -> f32 {
        self.columns
            .iter()
            .filter(|c| !c.is_pinned())
            .map(Column::occupied_width)
            .sum()
    }

    /// Minimum width the unpinned region must keep.
    pub fn min_unpinned_width(&self) -> f32 {
        self.min_unpinned_fraction * self.grid_width
    }

    /// Widest the pinned region may grow.
    pub fn max_pinned_width(&self) -> f32 {
        (1.0 - self.min_unpinned_fraction) * self.grid_width
    }

    /// Returns `true` if pinning `field` now would keep enough unpinned width.
    pub fn can_pin(&self, field: &str) -> bool {
        match self.column(field) {
            Some(column) if !column.is_pinned() => {
                self.unpinned_width() - column.occupied_width() >= self.min_unpinned_width()
            }
            _ => false,
        }
    }

    // ------------------------------------------------------------------------
    // Pin / unpin
    // ------------------------------------------------------------------------

    /// Pin a column at the end of the pinned prefix.
    ///
    /// Returns `false` if the column is unknown, already pinned, or would
    /// leave too little unpinned width.
    pub fn pin(&mut self, field: &str) -> bool {
        self.pin_inner(field, None)
    }

    /// Pin a column at `index` within the pinned prefix.
    pub fn pin_at(&mut self, field: &str, index: usize) -> bool {
        self.pin_inner(field, Some(index))
    }

    fn pin_inner(&mut self, field: &str, index: Option<usize>) -> bool {
        let Some(column) = self.column(field) else {
            tracing::trace!(target: targets::PINNING, field, "pin of unknown column ignored");
            return false;
        };
        if column.is_pinned() {
            return false;
        }
        if !self.can_pin(field) {
            tracing::debug!(
                target: targets::PINNING,
                field,
                unpinned_width = self.unpinned_width(),
                min_unpinned_width = self.min_unpinned_width(),
                "pin rejected by width budget"
            );
            return false;
        }

        let requested = index.unwrap_or(self.pinned_order.len());
        let event = ColumnPinningEvent {
            field: field.to_string(),
            insert_at_index: Arc::new(AtomicUsize::new(requested)),
        };
        self.column_pinning.emit(event.clone());
        let insert_at = event.insert_at_index().min(self.pinned_order.len());

        if let Some(column) = self.column_mut(field) {
            column.set_pinned(true);
        }
        self.pinned_order.insert(insert_at, field.to_string());
        self.recompute_visible_indices();

        tracing::debug!(target: targets::PINNING, field, insert_at, "column pinned");
        self.pinning_changed.emit(PinningChange {
            field: field.to_string(),
            pinned: true,
        });
        true
    }

    /// Unpin a column. It returns to its declared position among the
    /// unpinned columns.
    ///
    /// Returns `false` if the column is unknown or not pinned.
    pub fn unpin(&mut self, field: &str) -> bool {
        match self.column_mut(field) {
            Some(column) if column.is_pinned() => column.set_pinned(false),
            _ => return false,
        }
        self.pinned_order.retain(|f| f != field);
        self.recompute_visible_indices();

        tracing::debug!(target: targets::PINNING, field, "column unpinned");
        self.pinning_changed.emit(PinningChange {
            field: field.to_string(),
            pinned: false,
        });
        true
    }

    /// Reassign declared and visible indices.
    ///
    /// Visible pinned columns take `0..k` in pinned order, visible unpinned
    /// columns continue from `k` in declared order, hidden columns get none.
    pub fn recompute_visible_indices(&mut self) {
        for (index, column) in self.columns.iter_mut().enumerate() {
            column.index = index;
            column.visible_index = None;
        }

        let mut next = 0;
        for field in &self.pinned_order {
            if let Some(column) = self
                .columns
                .iter_mut()
                .find(|c| c.field() == field && !c.is_hidden())
            {
                column.visible_index = Some(next);
                next += 1;
            }
        }
        for column in self
            .columns
            .iter_mut()
            .filter(|c| !c.is_pinned() && !c.is_hidden())
        {
            column.visible_index = Some(next);
            next += 1;
        }
    }

    // ------------------------------------------------------------------------
    // Reorder
    // ------------------------------------------------------------------------

    /// Move `source` next to `target`.
    ///
    /// The source takes the pin state of the target: dropping on a pinned
    /// column pins it (without a width check), dropping on an unpinned column
    /// unpins it. Returns `false` for unknown or identical columns.
    pub fn move_column(&mut self, source: &str, target: &str, position: DropPosition) -> bool {
        if source == target {
            return false;
        }
        let (Some(from), Some(_)) = (self.position(source), self.position(target)) else {
            tracing::trace!(target: targets::PINNING, source, drop_target = target, "move of unknown column ignored");
            return false;
        };

        let target_pinned = self.columns.iter().any(|c| c.field() == target && c.is_pinned());
        let source_was_pinned = self.columns[from].is_pinned();

        // Pinned order.
        self.pinned_order.retain(|f| f != source);
        if target_pinned {
            let at = self
                .pinned_order
                .iter()
                .position(|f| f == target)
                .map_or(self.pinned_order.len(), |i| match position {
                    DropPosition::Before => i,
                    DropPosition::After => i + 1,
                });
            self.pinned_order.insert(at, source.to_string());
        }

        // Declared order.
        let mut column = self.columns.remove(from);
        column.set_pinned(target_pinned);
        let at = self
            .position(target)
            .map_or(self.columns.len(), |i| match position {
                DropPosition::Before => i,
                DropPosition::After => i + 1,
            });
        self.columns.insert(at, column);
        self.recompute_visible_indices();

        tracing::debug!(target: targets::PINNING, source, drop_target = target, ?position, "column moved");
        if source_was_pinned != target_pinned {
            self.pinning_changed.emit(PinningChange {
                field: source.to_string(),
                pinned: target_pinned,
            });
        }
        self.column_moved.emit(ColumnMove {
            source: source.to_string(),
            target: target.to_string(),
            position,
        });
        true
    }
}

static_assertions::assert_impl_all!(PinningPlanner: Send, Sync);

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    fn planner(fields: &[&str]) -> PinningPlanner {
        let columns = fields.iter().map(|f| Column::new(*f, 200.0)).collect();
        PinningPlanner::new(columns, 800.0, &GridConfig::default())
    }

    fn visible(planner: &PinningPlanner) -> Vec<&str> {
        planner.visible_columns().iter().map(|c| c.field()).collect()
    }

    #[test]
    fn test_pin_feasibility_scenario() {
        let mut planner = planner(&["A", "B", "C", "D"]);
        assert!(planner.pin("A"));
        assert_eq!(planner.unpinned_width(), 600.0);
        assert!(planner.pin("B"));
        assert!(planner.pin("C"));
        assert_eq!(planner.unpinned_width(), 200.0);
        assert!(!planner.pin("D"));

        let pinned: Vec<&str> = planner.pinned_columns().iter().map(|c| c.field()).collect();
        assert_eq!(pinned, vec!["A", "B", "C"]);
        assert!(!planner.column("D").unwrap().is_pinned());
    }

    #[test]
    fn test_pin_rejects_pinned_and_unknown() {
        let mut planner = planner(&["A", "B", "C"]);
        assert!(planner.pin("A"));
        assert!(!planner.pin("A"));
        assert!(!planner.pin("Z"));
        assert!(!planner.unpin("Z"));
        assert!(!planner.unpin("B"));
    }

    #[test]
    fn test_pin_moves_to_pinned_prefix() {
        let mut planner = planner(&["A", "B", "C", "D"]);
        assert!(planner.pin("C"));
        assert_eq!(visible(&planner), vec!["C", "A", "B", "D"]);
        assert_eq!(planner.column("C").unwrap().visible_index(), Some(0));
        assert_eq!(planner.column("A").unwrap().visible_index(), Some(1));
        assert_eq!(planner.column("C").unwrap().index(), 2);
    }

    #[test]
    fn test_unpin_restores_declared_position() {
        let mut planner = planner(&["A", "B", "C", "D"]);
        planner.pin("C");
        planner.pin("A");
        assert_eq!(visible(&planner), vec!["C", "A", "B", "D"]);

        assert!(planner.unpin("C"));
        assert_eq!(visible(&planner), vec!["A", "B", "C", "D"]);
        assert!(planner.unpin("A"));
        assert_eq!(visible(&planner), vec!["A", "B", "C", "D"]);
    }

    #[test]
    fn test_unpin_ignores_width() {
        let mut planner = planner(&["A", "B", "C", "D"]);
        planner.pin("A");
        planner.pin("B");
        planner.set_grid_width(10_000.0);
        assert!(planner.unpin("A"));
    }

    #[test]
    fn test_pin_at_index() {
        let mut planner = planner(&["A", "B", "C", "D"]);
        planner.pin("A");
        planner.pin("B");
        assert!(planner.pin_at("C", 0));
        assert_eq!(visible(&planner), vec!["C", "A", "B", "D"]);
    }

    #[test]
    fn test_column_pinning_override() {
        let mut planner = planner(&["A", "B", "C", "D"]);
        planner.pin("A");
        planner.pin("B");
        planner.column_pinning.connect(|event| {
            assert_eq!(event.insert_at_index(), 2);
            event.set_insert_at_index(1);
        });
        assert!(planner.pin("C"));
        assert_eq!(visible(&planner), vec!["A", "C", "B", "D"]);
    }

    #[test]
    fn test_hidden_pinned_column() {
        let mut planner = planner(&["A", "B", "C", "D"]);
        planner.pin("A");
        planner.pin("B");
        assert!(planner.set_hidden("A", true));
        assert_eq!(planner.pinned_width(), 200.0);
        assert!(planner.column("A").unwrap().is_pinned());
        assert_eq!(planner.column("A").unwrap().visible_index(), None);
        assert_eq!(visible(&planner), vec!["B", "C", "D"]);

        assert!(planner.pin("C"));
        assert!(planner.set_hidden("A", false));
        assert_eq!(visible(&planner), vec!["A", "B", "C", "D"]);
        assert_eq!(planner.unpinned_width(), 200.0);
    }

    #[test]
    fn test_hidden_column_pin_still_checked() {
        let mut planner = planner(&["A", "B", "C", "D"]);
        planner.pin("A");
        planner.pin("B");
        planner.pin("C");
        planner.set_hidden("D", true);
        assert_eq!(planner.unpinned_width(), 0.0);
        assert!(!planner.pin("D"));
    }

    #[test]
    fn test_pinning_changed_signal() {
        let mut planner = planner(&["A", "B"]);
        let count = Arc::new(AtomicUsize::new(0));
        let count_clone = count.clone();
        planner.pinning_changed.connect(move |_| {
            count_clone.fetch_add(1, Ordering::SeqCst);
        });
        planner.pin("A");
        planner.pin("A");
        planner.unpin("A");
        assert_eq!(count.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_move_column_within_unpinned() {
        let mut planner = planner(&["A", "B", "C", "D"]);
        assert!(planner.move_column("A", "C", DropPosition::After));
        assert_eq!(visible(&planner), vec!["B", "C", "A", "D"]);
        assert!(planner.move_column("D", "B", DropPosition::Before));
        assert_eq!(visible(&planner), vec!["D", "B", "C", "A"]);
        assert!(!planner.move_column("A", "A", DropPosition::Before));
        assert!(!planner.move_column("A", "Z", DropPosition::Before));
    }

    #[test]
    fn test_move_column_transfers_pin_state() {
        let mut planner = planner(&["A", "B", "C", "D"]);
        planner.pin("A");
        assert!(planner.move_column("C", "A", DropPosition::Before));
        assert!(planner.column("C").unwrap().is_pinned());
        assert_eq!(visible(&planner), vec!["C", "A", "B", "D"]);

        assert!(planner.move_column("A", "D", DropPosition::After));
        assert!(!planner.column("A").unwrap().is_pinned());
        assert_eq!(visible(&planner), vec!["C", "B", "D", "A"]);
    }

    #[test]
    fn test_max_pinned_width() {
        let planner = planner(&["A"]);
        assert_eq!(planner.min_unpinned_width(), 160.0);
        assert_eq!(planner.max_pinned_width(), 640.0);
    }

    #[test]
    fn test_declared_pins() {
        let columns = vec![
            Column::new("A", 100.0),
            Column::new("B", 100.0).pinned(true),
            Column::new("C", 100.0).hidden(true),
        ];
        let planner = PinningPlanner::new(columns, 500.0, &GridConfig::default());
        assert_eq!(visible(&planner), vec!["B", "A"]);
        assert_eq!(planner.column("C").unwrap().visible_index(), None);
    }
}
