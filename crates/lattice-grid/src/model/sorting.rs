//! Multi-key stable sorting.

use std::cmp::Ordering;

use super::item::Item;
use super::value::ItemValue;
use crate::error::PipelineError;
use crate::logging::targets;
use lattice_grid_core::PerfSpan;

/// Sort direction of one key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortingDirection {
    /// Not sorted; the key is dropped from the expression list.
    #[default]
    None,
    /// Ascending order.
    Asc,
    /// Descending order.
    Desc,
}

/// One sort key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortingExpression {
    pub field_name: String,
    pub direction: SortingDirection,
    pub ignore_case: bool,
}

impl SortingExpression {
    /// Create a case-insensitive sort key.
    pub fn new(field_name: impl Into<String>, direction: SortingDirection) -> Self {
        Self {
            field_name: field_name.into(),
            direction,
            ignore_case: true,
        }
    }

    /// Set case sensitivity.
    pub fn with_ignore_case(mut self, ignore_case: bool) -> Self {
        self.ignore_case = ignore_case;
        self
    }

    fn compare(&self, a: &Item, b: &Item) -> Ordering {
        compare_field(a.field(&self.field_name), b.field(&self.field_name), self)
    }
}

/// Compare two field values under one key.
///
/// Undefined sorts after every defined value in both directions.
fn compare_field(a: &ItemValue, b: &ItemValue, expr: &SortingExpression) -> Ordering {
    match (a.is_undefined(), b.is_undefined()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => {
            let ord = a.compare(b, expr.ignore_case);
            match expr.direction {
                SortingDirection::Desc => ord.reverse(),
                _ => ord,
            }
        }
    }
}

/// The ordered sort keys of a widget.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SortingState {
    expressions: Vec<SortingExpression>,
}

impl SortingState {
    /// Create an empty state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the key for a field.
    ///
    /// An existing key on the same field is replaced in place; a `None`
    /// direction removes it. New keys append. A key without a field name is
    /// rejected and the state is left untouched.
    pub fn set(&mut self, expression: SortingExpression) -> Result<(), PipelineError> {
        if expression.field_name.is_empty() {
            return Err(PipelineError::EmptySortField);
        }
        let existing = self
            .expressions
            .iter()
            .position(|e| e.field_name == expression.field_name);

        match (existing, expression.direction) {
            (Some(i), SortingDirection::None) => {
                self.expressions.remove(i);
            }
            (Some(i), _) => self.expressions[i] = expression,
            (None, SortingDirection::None) => {}
            (None, _) => self.expressions.push(expression),
        }
        Ok(())
    }

    /// Remove every key.
    pub fn clear(&mut self) {
        self.expressions.clear();
    }

    /// The keys, most significant first.
    pub fn expressions(&self) -> &[SortingExpression] {
        &self.expressions
    }

    /// Direction currently applied to a field.
    pub fn direction_of(&self, field_name: &str) -> SortingDirection {
        self.expressions
            .iter()
            .find(|e| e.field_name == field_name)
            .map_or(SortingDirection::None, |e| e.direction)
    }
}

/// Stable multi-key sort.
///
/// Keys with a `None` direction are dropped before sorting. Items equal under
/// every key keep their input order.
pub fn sort(items: &[Item], expressions: &[SortingExpression]) -> Result<Vec<Item>, PipelineError> {
    if expressions.iter().any(|e| e.field_name.is_empty()) {
        return Err(PipelineError::EmptySortField);
    }

    let active: Vec<&SortingExpression> = expressions
        .iter()
        .filter(|e| e.direction != SortingDirection::None)
        .collect();

    let mut result = items.to_vec();
    if active.is_empty() {
        return Ok(result);
    }

    let _span = PerfSpan::with_len("sort", items.len());
    result.sort_by(|a, b| {
        active
            .iter()
            .map(|e| e.compare(a, b))
            .find(|ord| *ord != Ordering::Equal)
            .unwrap_or(Ordering::Equal)
    });

    tracing::trace!(target: targets::PIPELINE, len = items.len(), keys = active.len(), "sort pass");
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::value::Record;

    fn row(id: i64, name: &str) -> Item {
        Item::Record(Record::new().with("id", id).with("name", name))
    }

    fn ids(items: &[Item]) -> Vec<i64> {
        items
            .iter()
            .map(|i| match i.field("id") {
                ItemValue::Int(n) => *n,
                _ => -1,
            })
            .collect()
    }

    #[test]
    fn test_sort_ascending_descending() {
        let items = vec![row(1, "c"), row(2, "a"), row(3, "b")];
        let asc = sort(&items, &[SortingExpression::new("name", SortingDirection::Asc)]).unwrap();
        assert_eq!(ids(&asc), vec![2, 3, 1]);

        let desc = sort(&items, &[SortingExpression::new("name", SortingDirection::Desc)]).unwrap();
        assert_eq!(ids(&desc), vec![1, 3, 2]);
    }

    #[test]
    fn test_sort_is_stable() {
        let items = vec![row(1, "b"), row(2, "a"), row(3, "b"), row(4, "a"), row(5, "b")];
        let sorted = sort(&items, &[SortingExpression::new("name", SortingDirection::Asc)]).unwrap();
        assert_eq!(ids(&sorted), vec![2, 4, 1, 3, 5]);

        let sorted = sort(&items, &[SortingExpression::new("name", SortingDirection::Desc)]).unwrap();
        assert_eq!(ids(&sorted), vec![1, 3, 5, 2, 4]);
    }

    #[test]
    fn test_multi_key() {
        let items = vec![
            Item::Record(Record::new().with("id", 1).with("a", 1).with("b", 2)),
            Item::Record(Record::new().with("id", 2).with("a", 0).with("b", 9)),
            Item::Record(Record::new().with("id", 3).with("a", 1).with("b", 1)),
        ];
        let sorted = sort(
            &items,
            &[
                SortingExpression::new("a", SortingDirection::Asc),
                SortingExpression::new("b", SortingDirection::Asc),
            ],
        )
        .unwrap();
        assert_eq!(ids(&sorted), vec![2, 3, 1]);
    }

    #[test]
    fn test_undefined_sorts_last_in_both_directions() {
        let items = vec![
            Item::Record(Record::new().with("id", 1)),
            row(2, "b"),
            row(3, "a"),
        ];
        let asc = sort(&items, &[SortingExpression::new("name", SortingDirection::Asc)]).unwrap();
        assert_eq!(ids(&asc), vec![3, 2, 1]);
        let desc = sort(&items, &[SortingExpression::new("name", SortingDirection::Desc)]).unwrap();
        assert_eq!(ids(&desc), vec![2, 3, 1]);
    }

    #[test]
    fn test_ignore_case() {
        let items = vec![row(1, "b"), row(2, "A"), row(3, "a")];
        let sensitive = sort(
            &items,
            &[SortingExpression::new("name", SortingDirection::Asc).with_ignore_case(false)],
        )
        .unwrap();
        assert_eq!(ids(&sensitive), vec![2, 3, 1]);

        let insensitive = sort(&items, &[SortingExpression::new("name", SortingDirection::Desc)]).unwrap();
        assert_eq!(ids(&insensitive), vec![1, 2, 3]);
    }

    #[test]
    fn test_none_direction_dropped() {
        let items = vec![row(2, "b"), row(1, "a")];
        let sorted = sort(&items, &[SortingExpression::new("name", SortingDirection::None)]).unwrap();
        assert_eq!(sorted, items);
    }

    #[test]
    fn test_empty_field_is_error() {
        let err = sort(&[], &[SortingExpression::new("", SortingDirection::Asc)]).unwrap_err();
        assert_eq!(err, PipelineError::EmptySortField);
    }

    #[test]
    fn test_sorting_state_set() {
        let mut state = SortingState::new();
        state.set(SortingExpression::new("a", SortingDirection::Asc)).unwrap();
        state.set(SortingExpression::new("b", SortingDirection::Desc)).unwrap();
        state.set(SortingExpression::new("a", SortingDirection::Desc)).unwrap();
        assert_eq!(state.expressions()[0].field_name, "a");
        assert_eq!(state.direction_of("a"), SortingDirection::Desc);

        state.set(SortingExpression::new("a", SortingDirection::None)).unwrap();
        assert_eq!(state.expressions().len(), 1);
        assert_eq!(state.direction_of("a"), SortingDirection::None);

        state.set(SortingExpression::new("c", SortingDirection::None)).unwrap();
        assert_eq!(state.expressions().len(), 1);
    }

    #[test]
    fn test_sorting_state_rejects_empty_field() {
        let mut state = SortingState::new();
        state.set(SortingExpression::new("a", SortingDirection::Asc)).unwrap();
        assert_eq!(
            state.set(SortingExpression::new("", SortingDirection::Asc)).unwrap_err(),
            PipelineError::EmptySortField
        );
        assert_eq!(state.expressions().len(), 1);
    }
}
