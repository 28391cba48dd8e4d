//! Filtering expressions and the filter pass.
//!
//! A [`FilteringExpression`] tests one field of an item (or the whole item
//! when no field is named) with a [`FilteringCondition`]. A
//! [`FilteringState`] combines a list of expressions with a
//! [`FilteringLogic`] and pins the calendar day that relative date
//! conditions ("today", "last month", ...) are evaluated against, so a filter
//! pass is a pure function of its inputs.
//!
//! Undefined field values fail every condition except the null-checking ones
//! (`null`, `notNull`, `empty`, `notEmpty`). Group headers never match.
//!
//! # Example
//!
//! ```
//! use lattice_grid::model::{
//!     filter, FilteringCondition, FilteringExpression, FilteringLogic, FilteringState,
//!     Item, Record, StringCondition,
//! };
//!
//! let items = vec![
//!     Item::Record(Record::new().with("name", "Alice")),
//!     Item::Record(Record::new().with("name", "Bob")),
//! ];
//! let state = FilteringState::new(FilteringLogic::And).with_expression(
//!     FilteringExpression::for_field("name", StringCondition::Contains, "ali"),
//! );
//!
//! let result = filter(&items, &state).unwrap();
//! assert_eq!(result.len(), 1);
//! ```

use std::fmt;
use std::sync::Arc;

use chrono::{Datelike, Months, NaiveDate};

use super::item::Item;
use super::value::ItemValue;
use crate::error::PipelineError;
use crate::logging::targets;
use lattice_grid_core::PerfSpan;

/// How the results of several expressions combine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FilteringLogic {
    /// Every expression must match.
    #[default]
    And,
    /// At least one expression must match.
    Or,
}

/// Data type a condition family applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataType {
    String,
    Number,
    Boolean,
    Date,
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DataType::String => "string",
            DataType::Number => "number",
            DataType::Boolean => "boolean",
            DataType::Date => "date",
        };
        f.write_str(name)
    }
}

// ============================================================================
// Conditions
// ============================================================================

/// Null-checking conditions, valid for every data type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PresenceCondition {
    /// Value is an explicit null.
    Null,
    /// Value is not an explicit null (undefined counts as not null).
    NotNull,
    /// Value is undefined, null or the empty string.
    Empty,
    /// Negation of `Empty`.
    NotEmpty,
}

/// String conditions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StringCondition {
    Contains,
    StartsWith,
    EndsWith,
    DoesNotContain,
    Equals,
    DoesNotEqual,
}

/// Number conditions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NumberCondition {
    Equals,
    DoesNotEqual,
    GreaterThan,
    LessThan,
    GreaterThanOrEqualTo,
    LessThanOrEqualTo,
}

/// Boolean conditions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BooleanCondition {
    /// Any boolean.
    All,
    True,
    False,
}

/// Date conditions. The relative ones compare against [`FilteringState::today`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateCondition {
    Equals,
    DoesNotEqual,
    Before,
    After,
    Today,
    Yesterday,
    ThisMonth,
    LastMonth,
    NextMonth,
    ThisYear,
    LastYear,
    NextYear,
}

type CustomFn = dyn Fn(&ItemValue, &ItemValue, bool) -> bool + Send + Sync;

/// A host-supplied condition: `(field_value, search_value, ignore_case) -> bool`.
#[derive(Clone)]
pub struct CustomCondition {
    name: String,
    func: Arc<CustomFn>,
}

impl CustomCondition {
    /// Wrap a closure under a display name.
    pub fn new<F>(name: impl Into<String>, func: F) -> Self
    where
        F: Fn(&ItemValue, &ItemValue, bool) -> bool + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            func: Arc::new(func),
        }
    }

    /// The condition's name.
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Debug for CustomCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CustomCondition")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

/// A condition an expression applies to a field value.
#[derive(Debug, Clone)]
pub enum FilteringCondition {
    Presence(PresenceCondition),
    String(StringCondition),
    Number(NumberCondition),
    Boolean(BooleanCondition),
    Date(DateCondition),
    Custom(CustomCondition),
}

impl From<PresenceCondition> for FilteringCondition {
    fn from(c: PresenceCondition) -> Self {
        FilteringCondition::Presence(c)
    }
}

impl From<StringCondition> for FilteringCondition {
    fn from(c: StringCondition) -> Self {
        FilteringCondition::String(c)
    }
}

impl From<NumberCondition> for FilteringCondition {
    fn from(c: NumberCondition) -> Self {
        FilteringCondition::Number(c)
    }
}

impl From<BooleanCondition> for FilteringCondition {
    fn from(c: BooleanCondition) -> Self {
        FilteringCondition::Boolean(c)
    }
}

impl From<DateCondition> for FilteringCondition {
    fn from(c: DateCondition) -> Self {
        FilteringCondition::Date(c)
    }
}

impl From<CustomCondition> for FilteringCondition {
    fn from(c: CustomCondition) -> Self {
        FilteringCondition::Custom(c)
    }
}

impl FilteringCondition {
    /// Look up a built-in condition by its camel-case name.
    pub fn from_name(data_type: DataType, name: &str) -> Result<Self, PipelineError> {
        let presence = match name {
            "null" => Some(PresenceCondition::Null),
            "notNull" => Some(PresenceCondition::NotNull),
            "empty" => Some(PresenceCondition::Empty),
            "notEmpty" => Some(PresenceCondition::NotEmpty),
            _ => None,
        };
        if let Some(p) = presence {
            return Ok(p.into());
        }

        let condition = match data_type {
            DataType::String => match name {
                "contains" => Some(StringCondition::Contains.into()),
                "startsWith" => Some(StringCondition::StartsWith.into()),
                "endsWith" => Some(StringCondition::EndsWith.into()),
                "doesNotContain" => Some(StringCondition::DoesNotContain.into()),
                "equals" => Some(StringCondition::Equals.into()),
                "doesNotEqual" => Some(StringCondition::DoesNotEqual.into()),
                _ => None,
            },
            DataType::Number => match name {
                "equals" => Some(NumberCondition::Equals.into()),
                "doesNotEqual" => Some(NumberCondition::DoesNotEqual.into()),
                "greaterThan" => Some(NumberCondition::GreaterThan.into()),
                "lessThan" => Some(NumberCondition::LessThan.into()),
                "greaterThanOrEqualTo" => Some(NumberCondition::GreaterThanOrEqualTo.into()),
                "lessThanOrEqualTo" => Some(NumberCondition::LessThanOrEqualTo.into()),
                _ => None,
            },
            DataType::Boolean => match name {
                "all" => Some(BooleanCondition::All.into()),
                "true" => Some(BooleanCondition::True.into()),
                "false" => Some(BooleanCondition::False.into()),
                _ => None,
            },
            DataType::Date => match name {
                "equals" => Some(DateCondition::Equals.into()),
                "doesNotEqual" => Some(DateCondition::DoesNotEqual.into()),
                "before" => Some(DateCondition::Before.into()),
                "after" => Some(DateCondition::After.into()),
                "today" => Some(DateCondition::Today.into()),
                "yesterday" => Some(DateCondition::Yesterday.into()),
                "thisMonth" => Some(DateCondition::ThisMonth.into()),
                "lastMonth" => Some(DateCondition::LastMonth.into()),
                "nextMonth" => Some(DateCondition::NextMonth.into()),
                "thisYear" => Some(DateCondition::ThisYear.into()),
                "lastYear" => Some(DateCondition::LastYear.into()),
                "nextYear" => Some(DateCondition::NextYear.into()),
                _ => None,
            },
        };

        condition.ok_or_else(|| PipelineError::unknown_condition(data_type.to_string(), name))
    }

    /// Camel-case name of the condition.
    pub fn name(&self) -> &str {
        match self {
            FilteringCondition::Presence(c) => match c {
                PresenceCondition::Null => "null",
                PresenceCondition::NotNull => "notNull",
                PresenceCondition::Empty => "empty",
                PresenceCondition::NotEmpty => "notEmpty",
            },
            FilteringCondition::String(c) => match c {
                StringCondition::Contains => "contains",
                StringCondition::StartsWith => "startsWith",
                StringCondition::EndsWith => "endsWith",
                StringCondition::DoesNotContain => "doesNotContain",
                StringCondition::Equals => "equals",
                StringCondition::DoesNotEqual => "doesNotEqual",
            },
            FilteringCondition::Number(c) => match c {
                NumberCondition::Equals => "equals",
                NumberCondition::DoesNotEqual => "doesNotEqual",
                NumberCondition::GreaterThan => "greaterThan",
                NumberCondition::LessThan => "lessThan",
                NumberCondition::GreaterThanOrEqualTo => "greaterThanOrEqualTo",
                NumberCondition::LessThanOrEqualTo => "lessThanOrEqualTo",
            },
            FilteringCondition::Boolean(c) => match c {
                BooleanCondition::All => "all",
                BooleanCondition::True => "true",
                BooleanCondition::False => "false",
            },
            FilteringCondition::Date(c) => match c {
                DateCondition::Equals => "equals",
                DateCondition::DoesNotEqual => "doesNotEqual",
                DateCondition::Before => "before",
                DateCondition::After => "after",
                DateCondition::Today => "today",
                DateCondition::Yesterday => "yesterday",
                DateCondition::ThisMonth => "thisMonth",
                DateCondition::LastMonth => "lastMonth",
                DateCondition::NextMonth => "nextMonth",
                DateCondition::ThisYear => "thisYear",
                DateCondition::LastYear => "lastYear",
                DateCondition::NextYear => "nextYear",
            },
            FilteringCondition::Custom(c) => c.name(),
        }
    }

    /// Returns `true` for the null-checking conditions.
    pub fn is_presence_check(&self) -> bool {
        matches!(self, FilteringCondition::Presence(_))
    }

    /// The search value type this condition compares against, if any.
    fn expected_search_type(&self) -> Option<DataType> {
        match self {
            FilteringCondition::String(_) => Some(DataType::String),
            FilteringCondition::Number(_) => Some(DataType::Number),
            FilteringCondition::Date(
                DateCondition::Equals
                | DateCondition::DoesNotEqual
                | DateCondition::Before
                | DateCondition::After,
            ) => Some(DataType::Date),
            _ => None,
        }
    }

    fn validate(&self, search_value: &ItemValue) -> Result<(), PipelineError> {
        let Some(expected) = self.expected_search_type() else {
            return Ok(());
        };
        if !search_value.is_present() {
            return Err(PipelineError::missing_search_value(self.name()));
        }
        let matches_type = match expected {
            DataType::String => search_value.as_str().is_some(),
            DataType::Number => search_value.as_f64().is_some(),
            DataType::Date => search_value.as_date().is_some(),
            DataType::Boolean => search_value.as_bool().is_some(),
        };
        if matches_type {
            Ok(())
        } else {
            Err(PipelineError::search_value_type(self.name(), expected.to_string()))
        }
    }

    fn evaluate(
        &self,
        target: &ItemValue,
        search: &ItemValue,
        ignore_case: bool,
        today: NaiveDate,
    ) -> bool {
        if let FilteringCondition::Presence(c) = self {
            return match c {
                PresenceCondition::Null => target.is_null(),
                PresenceCondition::NotNull => !target.is_null(),
                PresenceCondition::Empty => target.is_empty(),
                PresenceCondition::NotEmpty => !target.is_empty(),
            };
        }
        if !target.is_present() {
            return false;
        }

        match self {
            FilteringCondition::Presence(_) => false,
            FilteringCondition::String(c) => {
                let fold = |s: String| if ignore_case { s.to_lowercase() } else { s };
                let target = fold(target.to_text());
                let search = fold(search.to_text());
                match c {
                    StringCondition::Contains => target.contains(&search),
                    StringCondition::StartsWith => target.starts_with(&search),
                    StringCondition::EndsWith => target.ends_with(&search),
                    StringCondition::DoesNotContain => !target.contains(&search),
                    StringCondition::Equals => target == search,
                    StringCondition::DoesNotEqual => target != search,
                }
            }
            FilteringCondition::Number(c) => {
                let (Some(t), Some(s)) = (target.as_f64(), search.as_f64()) else {
                    return false;
                };
                match c {
                    NumberCondition::Equals => t == s,
                    NumberCondition::DoesNotEqual => t != s,
                    NumberCondition::GreaterThan => t > s,
                    NumberCondition::LessThan => t < s,
                    NumberCondition::GreaterThanOrEqualTo => t >= s,
                    NumberCondition::LessThanOrEqualTo => t <= s,
                }
            }
            FilteringCondition::Boolean(c) => match (c, target.as_bool()) {
                (_, None) => false,
                (BooleanCondition::All, Some(_)) => true,
                (BooleanCondition::True, Some(b)) => b,
                (BooleanCondition::False, Some(b)) => !b,
            },
            FilteringCondition::Date(c) => {
                let Some(t) = target.as_date() else {
                    return false;
                };
                evaluate_date(*c, t, search.as_date(), today)
            }
            FilteringCondition::Custom(c) => (c.func)(target, search, ignore_case),
        }
    }
}

fn evaluate_date(
    condition: DateCondition,
    target: NaiveDate,
    search: Option<NaiveDate>,
    today: NaiveDate,
) -> bool {
    let same_month = |a: NaiveDate, b: NaiveDate| a.year() == b.year() && a.month() == b.month();
    let first_of_month = today.with_day(1).unwrap_or(today);

    match condition {
        DateCondition::Equals => search.is_some_and(|s| target == s),
        DateCondition::DoesNotEqual => search.is_some_and(|s| target != s),
        DateCondition::Before => search.is_some_and(|s| target < s),
        DateCondition::After => search.is_some_and(|s| target > s),
        DateCondition::Today => target == today,
        DateCondition::Yesterday => today.pred_opt() == Some(target),
        DateCondition::ThisMonth => same_month(target, today),
        DateCondition::LastMonth => first_of_month
            .checked_sub_months(Months::new(1))
            .is_some_and(|m| same_month(target, m)),
        DateCondition::NextMonth => first_of_month
            .checked_add_months(Months::new(1))
            .is_some_and(|m| same_month(target, m)),
        DateCondition::ThisYear => target.year() == today.year(),
        DateCondition::LastYear => target.year() == today.year() - 1,
        DateCondition::NextYear => target.year() == today.year() + 1,
    }
}

/// Split a camel-case condition name into words for display.
///
/// `"doesNotContain"` becomes `"does Not Contain"`.
pub fn filter_condition_label(name: &str) -> String {
    let mut label = String::with_capacity(name.len() + 4);
    for (i, ch) in name.chars().enumerate() {
        if i > 0 && ch.is_uppercase() {
            label.push(' ');
        }
        label.push(ch);
    }
    label
}

// ============================================================================
// Expressions
// ============================================================================

/// One field/condition/value test.
#[derive(Debug, Clone)]
pub struct FilteringExpression {
    /// Field to test; `None` tests the whole item.
    pub field_name: Option<String>,
    /// Value compared against.
    pub search_value: ItemValue,
    /// The test.
    pub condition: FilteringCondition,
    /// Case-insensitive string comparison.
    pub ignore_case: bool,
}

impl FilteringExpression {
    /// Test a named field. String comparison ignores case by default.
    pub fn for_field(
        field_name: impl Into<String>,
        condition: impl Into<FilteringCondition>,
        search_value: impl Into<ItemValue>,
    ) -> Self {
        Self {
            field_name: Some(field_name.into()),
            search_value: search_value.into(),
            condition: condition.into(),
            ignore_case: true,
        }
    }

    /// Test the whole item.
    pub fn for_item(
        condition: impl Into<FilteringCondition>,
        search_value: impl Into<ItemValue>,
    ) -> Self {
        Self {
            field_name: None,
            search_value: search_value.into(),
            condition: condition.into(),
            ignore_case: true,
        }
    }

    /// Set case sensitivity.
    pub fn with_ignore_case(mut self, ignore_case: bool) -> Self {
        self.ignore_case = ignore_case;
        self
    }

    /// Check the expression for configuration errors.
    pub fn validate(&self) -> Result<(), PipelineError> {
        self.condition.validate(&self.search_value)
    }

    /// Evaluate against one item. Headers never match.
    pub fn matches(&self, item: &Item, today: NaiveDate) -> bool {
        if item.is_header() {
            return false;
        }
        let target = item.resolve(self.field_name.as_deref());
        self.condition
            .evaluate(&target, &self.search_value, self.ignore_case, today)
    }
}

/// An expression list plus how to combine it.
#[derive(Debug, Clone)]
pub struct FilteringState {
    expressions: Vec<FilteringExpression>,
    logic: FilteringLogic,
    today: NaiveDate,
}

impl Default for FilteringState {
    fn default() -> Self {
        Self::new(FilteringLogic::And)
    }
}

impl FilteringState {
    /// Create an empty state, capturing the local calendar day.
    pub fn new(logic: FilteringLogic) -> Self {
        Self::with_today(logic, chrono::Local::now().date_naive())
    }

    /// Create an empty state evaluated against an explicit day.
    pub fn with_today(logic: FilteringLogic, today: NaiveDate) -> Self {
        Self {
            expressions: Vec::new(),
            logic,
            today,
        }
    }

    /// Builder-style expression append.
    pub fn with_expression(mut self, expression: FilteringExpression) -> Self {
        self.expressions.push(expression);
        self
    }

    /// Append an expression.
    pub fn push(&mut self, expression: FilteringExpression) {
        self.expressions.push(expression);
    }

    /// Remove every expression on `field_name`. Returns how many were removed.
    pub fn remove_field(&mut self, field_name: &str) -> usize {
        let before = self.expressions.len();
        self.expressions
            .retain(|e| e.field_name.as_deref() != Some(field_name));
        before - self.expressions.len()
    }

    /// Remove every expression.
    pub fn clear(&mut self) {
        self.expressions.clear();
    }

    /// The expressions.
    pub fn expressions(&self) -> &[FilteringExpression] {
        &self.expressions
    }

    /// The combination logic.
    pub fn logic(&self) -> FilteringLogic {
        self.logic
    }

    /// Change the combination logic.
    pub fn set_logic(&mut self, logic: FilteringLogic) {
        self.logic = logic;
    }

    /// The day relative date conditions are evaluated against.
    pub fn today(&self) -> NaiveDate {
        self.today
    }

    /// Returns `true` if there is nothing to filter by.
    pub fn is_empty(&self) -> bool {
        self.expressions.is_empty()
    }

    /// Check every expression for configuration errors.
    pub fn validate(&self) -> Result<(), PipelineError> {
        self.expressions.iter().try_for_each(FilteringExpression::validate)
    }

    /// Evaluate the combined expressions against one item.
    pub fn matches(&self, item: &Item) -> bool {
        if item.is_header() {
            return false;
        }
        match self.logic {
            FilteringLogic::And => self.expressions.iter().all(|e| e.matches(item, self.today)),
            FilteringLogic::Or => self.expressions.iter().any(|e| e.matches(item, self.today)),
        }
    }
}

/// Keep the items matching `state`.
///
/// An empty expression list returns the collection unchanged, headers
/// included. Otherwise headers are always excluded.
pub fn filter(items: &[Item], state: &FilteringState) -> Result<Vec<Item>, PipelineError> {
    state.validate()?;
    if state.is_empty() {
        return Ok(items.to_vec());
    }

    let _span = PerfSpan::with_len("filter", items.len());
    let result: Vec<Item> = items.iter().filter(|item| state.matches(item)).cloned().collect();
    tracing::trace!(
        target: targets::PIPELINE,
        input = items.len(),
        output = result.len(),
        expressions = state.expressions.len(),
        "filter pass"
    );
    Ok(result)
}
