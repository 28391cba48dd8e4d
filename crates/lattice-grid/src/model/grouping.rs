//! Grouping with synthetic header pseudo-items.

use std::cmp::Ordering;

use super::item::{GroupHeader, Item};
use super::sorting::{sort, SortingDirection, SortingExpression};
use crate::error::PipelineError;
use crate::logging::targets;
use lattice_grid_core::PerfSpan;

/// Partition `items` by `group_key` and insert a header before each group.
///
/// Items are stably sorted by the group key ascending (undefined values
/// last), so any prior ordering survives within each group. Headers already
/// present in the input are discarded first, making the operation safe to
/// repeat. Group values that sort as equal (such as `1` and `1.0`) share one
/// group. Each header carries the group value under `group_key` and, when
/// given, under `value_key`.
pub fn group(
    items: &[Item],
    group_key: &str,
    value_key: Option<&str>,
) -> Result<Vec<Item>, PipelineError> {
    if group_key.is_empty() {
        return Err(PipelineError::EmptyGroupKey);
    }

    let _span = PerfSpan::with_len("group", items.len());
    let members: Vec<Item> = items.iter().filter(|i| !i.is_header()).cloned().collect();
    let sorted = sort(
        &members,
        &[SortingExpression::new(group_key, SortingDirection::Asc).with_ignore_case(false)],
    )?;

    let mut result = Vec::with_capacity(sorted.len() + 8);
    let mut groups = 0usize;
    for item in sorted {
        let value = item.field(group_key);
        let boundary = result
            .last()
            .is_none_or(|prev: &Item| {
                prev.field(group_key).compare(value, false) != Ordering::Equal
            });
        if boundary {
            result.push(Item::Header(GroupHeader::new(
                group_key,
                value_key.map(str::to_string),
                value.clone(),
            )));
            groups += 1;
        }
        result.push(item);
    }

    tracing::trace!(target: targets::PIPELINE, len = items.len(), groups, %group_key, "group pass");
    Ok(result)
}
