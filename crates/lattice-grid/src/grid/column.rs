//! Column descriptors.

/// A grid column.
///
/// `index` (declared order) and `visible_index` (display order) are
/// maintained by the [`PinningPlanner`](super::PinningPlanner) that owns the
/// column.
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    field: String,
    width: f32,
    pinned: bool,
    hidden: bool,
    disabled: bool,
    pub(crate) index: usize,
    pub(crate) visible_index: Option<usize>,
}

impl Column {
    /// Create a visible, unpinned, movable column.
    pub fn new(field: impl Into<String>, width: f32) -> Self {
        Self {
            field: field.into(),
            width: width.max(0.0),
            pinned: false,
            hidden: false,
            disabled: false,
            index: 0,
            visible_index: None,
        }
    }

    /// Builder-style initial pin state.
    pub fn pinned(mut self, pinned: bool) -> Self {
        self.pinned = pinned;
        self
    }

    /// Builder-style initial visibility.
    pub fn hidden(mut self, hidden: bool) -> Self {
        self.hidden = hidden;
        self
    }

    /// Builder-style disabled flag. Disabled columns cannot be dragged or
    /// dropped onto.
    pub fn disabled(mut self, disabled: bool) -> Self {
        self.disabled = disabled;
        self
    }

    pub fn field(&self) -> &str {
        &self.field
    }

    pub fn width(&self) -> f32 {
        self.width
    }

    pub fn is_pinned(&self) -> bool {
        self.pinned
    }

    pub fn is_hidden(&self) -> bool {
        self.hidden
    }

    pub fn is_disabled(&self) -> bool {
        self.disabled
    }

    /// Position in declared order.
    pub fn index(&self) -> usize {
        self.index
    }

    /// Position in display order; `None` while hidden.
    pub fn visible_index(&self) -> Option<usize> {
        self.visible_index
    }

    /// Width the column occupies on screen.
    pub fn occupied_width(&self) -> f32 {
        if self.hidden { 0.0 } else { self.width }
    }

    pub(crate) fn set_pinned(&mut self, pinned: bool) {
        self.pinned = pinned;
    }

    pub(crate) fn set_hidden(&mut self, hidden: bool) {
        self.hidden = hidden;
    }

    pub(crate) fn set_width(&mut self, width: f32) {
        self.width = width.max(0.0);
    }
}

/// Side of the target column a dragged column lands on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DropPosition {
    Before,
    After,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder() {
        let column = Column::new("name", 120.0).pinned(true).disabled(true);
        assert_eq!(column.field(), "name");
        assert!(column.is_pinned());
        assert!(column.is_disabled());
        assert!(!column.is_hidden());
        assert_eq!(column.visible_index(), None);
    }

    #[test]
    fn test_occupied_width() {
        let column = Column::new("name", 120.0);
        assert_eq!(column.occupied_width(), 120.0);
        assert_eq!(column.hidden(true).occupied_width(), 0.0);
        assert_eq!(Column::new("x", -5.0).width(), 0.0);
    }
}
