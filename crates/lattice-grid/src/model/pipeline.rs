//! The composed data pipeline of a list or grid.
//!
//! [`DataPipeline`] owns a raw collection and produces the projection a
//! widget displays: sort, then group (which keeps the sort order within each
//! group), then filter. The grouped projection only changes when the data,
//! the sort keys or the group key change, so it is cached and a search pass
//! re-runs the filter alone.

use super::filtering::{filter, FilteringState};
use super::grouping::group;
use super::item::Item;
use super::sorting::{sort, SortingExpression, SortingState};
use crate::error::PipelineError;
use crate::logging::targets;

/// Grouping configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Grouping {
    group_key: String,
    value_key: Option<String>,
}

/// Cached sort → group → filter projection.
#[derive(Debug, Clone, Default)]
pub struct DataPipeline {
    data: Vec<Item>,
    sorting: SortingState,
    grouping: Option<Grouping>,
    filtering: FilteringState,
    /// Sorted and grouped data.
    grouped: Vec<Item>,
    /// `grouped` after filtering.
    projection: Vec<Item>,
    /// Number of times `grouped` was rebuilt.
    regroup_count: u64,
}

impl DataPipeline {
    /// Create an empty pipeline.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the raw collection.
    ///
    /// On error the previous collection and projection stay in effect.
    pub fn set_data(&mut self, data: Vec<Item>) -> Result<(), PipelineError> {
        let (grouped, projection) =
            self.project(&data, &self.sorting, self.grouping.as_ref())?;
        self.data = data;
        self.commit(grouped, projection);
        Ok(())
    }

    /// Append one item to the raw collection.
    pub fn push(&mut self, item: Item) -> Result<(), PipelineError> {
        self.data.push(item);
        match self.project(&self.data, &self.sorting, self.grouping.as_ref()) {
            Ok((grouped, projection)) => {
                self.commit(grouped, projection);
                Ok(())
            }
            Err(err) => {
                self.data.pop();
                Err(err)
            }
        }
    }

    /// Set or clear the group key.
    pub fn set_grouping(
        &mut self,
        group_key: Option<&str>,
        value_key: Option<&str>,
    ) -> Result<(), PipelineError> {
        let grouping = match group_key {
            Some("") => return Err(PipelineError::EmptyGroupKey),
            Some(key) => Some(Grouping {
                group_key: key.to_string(),
                value_key: value_key.map(str::to_string),
            }),
            None => None,
        };
        if grouping == self.grouping {
            return Ok(());
        }
        let (grouped, projection) = self.project(&self.data, &self.sorting, grouping.as_ref())?;
        self.grouping = grouping;
        self.commit(grouped, projection);
        Ok(())
    }

    /// Set one sort key (see [`SortingState::set`]).
    pub fn sort_by(&mut self, expression: SortingExpression) -> Result<(), PipelineError> {
        let mut sorting = self.sorting.clone();
        sorting.set(expression)?;
        self.set_sorting(sorting)
    }

    /// Replace all sort keys.
    ///
    /// An invalid state is rejected and the previous one stays in effect.
    pub fn set_sorting(&mut self, sorting: SortingState) -> Result<(), PipelineError> {
        let (grouped, projection) = self.project(&self.data, &sorting, self.grouping.as_ref())?;
        self.sorting = sorting;
        self.commit(grouped, projection);
        Ok(())
    }

    /// Replace the filter and re-filter the cached grouped projection.
    ///
    /// An invalid state is rejected and the previous one stays in effect.
    pub fn set_filtering(&mut self, filtering: FilteringState) -> Result<(), PipelineError> {
        let projection = filter(&self.grouped, &filtering)?;
        self.filtering = filtering;
        self.projection = projection;
        Ok(())
    }

    /// The raw collection.
    pub fn data(&self) -> &[Item] {
        &self.data
    }

    /// The sorted, grouped collection before filtering.
    pub fn grouped(&self) -> &[Item] {
        &self.grouped
    }

    /// What the widget displays.
    pub fn projection(&self) -> &[Item] {
        &self.projection
    }

    /// Current sort keys.
    pub fn sorting(&self) -> &SortingState {
        &self.sorting
    }

    /// Current filter.
    pub fn filtering(&self) -> &FilteringState {
        &self.filtering
    }

    /// Active group key.
    pub fn group_key(&self) -> Option<&str> {
        self.grouping.as_ref().map(|g| g.group_key.as_str())
    }

    /// How often the grouped projection has been rebuilt.
    pub fn regroup_count(&self) -> u64 {
        self.regroup_count
    }

    /// Sort, group and filter `data` without touching the pipeline.
    fn project(
        &self,
        data: &[Item],
        sorting: &SortingState,
        grouping: Option<&Grouping>,
    ) -> Result<(Vec<Item>, Vec<Item>), PipelineError> {
        let sorted = sort(data, sorting.expressions())?;
        let grouped = match grouping {
            Some(g) => group(&sorted, &g.group_key, g.value_key.as_deref())?,
            None => sorted,
        };
        let projection = filter(&grouped, &self.filtering)?;
        Ok((grouped, projection))
    }

    fn commit(&mut self, grouped: Vec<Item>, projection: Vec<Item>) {
        self.grouped = grouped;
        self.projection = projection;
        self.regroup_count += 1;

        tracing::debug!(
            target: targets::PIPELINE,
            data = self.data.len(),
            grouped = self.grouped.len(),
            projection = self.projection.len(),
            "pipeline rebuilt"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::filtering::{FilteringExpression, FilteringLogic, StringCondition};
    use crate::model::sorting::SortingDirection;
    use crate::model::value::{ItemValue, Record};

    fn city(name: &str, country: &str) -> Item {
        Item::Record(Record::new().with("name", name).with("country", country))
    }

    fn data() -> Vec<Item> {
        vec![
            city("Paris", "France"),
            city("Berlin", "Germany"),
            city("Lyon", "France"),
            city("Bonn", "Germany"),
        ]
    }

    fn search(text: &str) -> FilteringState {
        FilteringState::new(FilteringLogic::And)
            .with_expression(FilteringExpression::for_field("name", StringCondition::Contains, text))
    }

    #[test]
    fn test_sort_within_group() {
        let mut pipeline = DataPipeline::new();
        pipeline.set_data(data()).unwrap();
        pipeline
            .sort_by(SortingExpression::new("name", SortingDirection::Asc))
            .unwrap();
        pipeline.set_grouping(Some("country"), None).unwrap();

        let labels: Vec<String> = pipeline
            .projection()
            .iter()
            .map(|i| {
                if i.is_header() {
                    format!("[{}]", i.field("country").to_text())
                } else {
                    i.field("name").to_text()
                }
            })
            .collect();
        assert_eq!(
            labels,
            vec!["[France]", "Lyon", "Paris", "[Germany]", "Berlin", "Bonn"]
        );
    }

    #[test]
    fn test_filter_pass_does_not_regroup() {
        let mut pipeline = DataPipeline::new();
        pipeline.set_data(data()).unwrap();
        pipeline.set_grouping(Some("country"), None).unwrap();
        let regroups = pipeline.regroup_count();

        pipeline.set_filtering(search("on")).unwrap();
        assert_eq!(pipeline.regroup_count(), regroups);
        assert_eq!(pipeline.grouped().len(), 6);

        let names: Vec<&ItemValue> = pipeline.projection().iter().map(|i| i.field("name")).collect();
        assert_eq!(names, vec![&ItemValue::from("Lyon"), &ItemValue::from("Bonn")]);
        assert!(pipeline.projection().iter().all(|i| !i.is_header()));
    }

    #[test]
    fn test_filter_survives_data_change() {
        let mut pipeline = DataPipeline::new();
        pipeline.set_filtering(search("par")).unwrap();
        pipeline.set_data(data()).unwrap();
        assert_eq!(pipeline.projection().len(), 1);

        pipeline.push(city("Parma", "Italy")).unwrap();
        assert_eq!(pipeline.projection().len(), 2);
    }

    #[test]
    fn test_invalid_filter_keeps_previous() {
        let mut pipeline = DataPipeline::new();
        pipeline.set_data(data()).unwrap();
        pipeline.set_filtering(search("b")).unwrap();

        let bad = FilteringState::new(FilteringLogic::And).with_expression(
            FilteringExpression::for_field("name", StringCondition::Contains, ItemValue::None),
        );
        assert!(pipeline.set_filtering(bad).is_err());
        assert_eq!(pipeline.projection().len(), 2);
        assert_eq!(pipeline.filtering().expressions().len(), 1);
    }

    #[test]
    fn test_clear_grouping() {
        let mut pipeline = DataPipeline::new();
        pipeline.set_data(data()).unwrap();
        pipeline.set_grouping(Some("country"), None).unwrap();
        assert_eq!(pipeline.group_key(), Some("country"));
        pipeline.set_grouping(None, None).unwrap();
        assert_eq!(pipeline.projection(), data().as_slice());
        assert_eq!(
            pipeline.set_grouping(Some(""), None).unwrap_err(),
            PipelineError::EmptyGroupKey
        );
    }

    fn names(pipeline: &DataPipeline) -> Vec<String> {
        pipeline.projection().iter().map(|i| i.field("name").to_text()).collect()
    }

    #[test]
    fn test_rejected_sorting_keeps_pipeline_usable() {
        let mut pipeline = DataPipeline::new();
        pipeline.set_data(vec![city("b", "x"), city("a", "x")]).unwrap();

        let mut state = SortingState::new();
        state.set(SortingExpression::new("name", SortingDirection::Asc)).unwrap();
        let before = state.clone();
        assert!(state.set(SortingExpression::new("", SortingDirection::Asc)).is_err());
        assert_eq!(state, before);

        assert_eq!(
            pipeline
                .sort_by(SortingExpression::new("", SortingDirection::Asc))
                .unwrap_err(),
            PipelineError::EmptySortField
        );
        assert!(pipeline.sorting().expressions().is_empty());

        pipeline.set_data(vec![city("c", "x")]).unwrap();
        assert_eq!(pipeline.data().len(), 1);
        assert_eq!(names(&pipeline), vec!["c"]);

        pipeline.push(city("a", "x")).unwrap();
        assert_eq!(names(&pipeline), vec!["c", "a"]);
    }

    #[test]
    fn test_rejected_grouping_keeps_previous() {
        let mut pipeline = DataPipeline::new();
        pipeline.set_data(data()).unwrap();
        pipeline.set_grouping(Some("country"), None).unwrap();
        let regroups = pipeline.regroup_count();

        assert!(pipeline.set_grouping(Some(""), None).is_err());
        assert_eq!(pipeline.group_key(), Some("country"));
        assert_eq!(pipeline.regroup_count(), regroups);
        assert_eq!(pipeline.projection().len(), 6);

        pipeline.push(city("Rome", "Italy")).unwrap();
        assert_eq!(pipeline.projection().len(), 8);
    }

    #[test]
    fn test_rejected_filter_then_data_change() {
        let mut pipeline = DataPipeline::new();
        pipeline.set_data(data()).unwrap();
        pipeline.set_filtering(search("Par")).unwrap();

        let bad = FilteringState::new(FilteringLogic::And).with_expression(
            FilteringExpression::for_field("name", StringCondition::Contains, ItemValue::None),
        );
        assert!(pipeline.set_filtering(bad).is_err());

        pipeline.push(city("Parma", "Italy")).unwrap();
        assert_eq!(names(&pipeline), vec!["Paris", "Parma"]);
        pipeline.set_data(data()).unwrap();
        assert_eq!(names(&pipeline), vec!["Paris"]);
    }
}
