//! Error types for Lattice Grid.
//!
//! Only misconfiguration is an error. Data irregularities (unknown keys,
//! missing fields, rejected pins) are absorbed and reported through return
//! values instead.

use lattice_grid_core::CoreError;

/// Result type alias for Lattice Grid operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in Lattice Grid.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Malformed filtering, sorting or grouping expression.
    #[error(transparent)]
    Pipeline(#[from] PipelineError),

    /// Invalid configuration.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Core runtime error.
    #[error(transparent)]
    Core(#[from] CoreError),
}

/// A malformed expression list.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PipelineError {
    /// A condition name that does not exist for the data type.
    #[error("Unknown {data_type} filtering condition '{name}'")]
    UnknownCondition { data_type: String, name: String },

    /// The condition compares against a search value but none was given.
    #[error("Filtering condition '{condition}' requires a search value")]
    MissingSearchValue { condition: String },

    /// The search value has the wrong type for the condition.
    #[error("Filtering condition '{condition}' expects a {expected} search value")]
    SearchValueType { condition: String, expected: String },

    /// A sorting expression without a field name.
    #[error("Sorting expression has an empty field name")]
    EmptySortField,

    /// Grouping requested without a group key.
    #[error("Group key must not be empty")]
    EmptyGroupKey,
}

impl PipelineError {
    /// Create an unknown condition error.
    pub fn unknown_condition(data_type: impl Into<String>, name: impl Into<String>) -> Self {
        Self::UnknownCondition {
            data_type: data_type.into(),
            name: name.into(),
        }
    }

    /// Create a missing search value error.
    pub fn missing_search_value(condition: impl Into<String>) -> Self {
        Self::MissingSearchValue {
            condition: condition.into(),
        }
    }

    /// Create a search value type error.
    pub fn search_value_type(condition: impl Into<String>, expected: impl Into<String>) -> Self {
        Self::SearchValueType {
            condition: condition.into(),
            expected: expected.into(),
        }
    }
}

/// Invalid configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// TOML parse error.
    #[error("Failed to parse configuration: {0}")]
    Parse(#[from] toml::de::Error),

    /// TOML serialization error.
    #[error("Failed to serialize configuration: {0}")]
    Serialize(#[from] toml::ser::Error),

    /// A value outside its permitted range.
    #[error("Invalid value for '{key}': {message}")]
    InvalidValue { key: String, message: String },
}

impl ConfigError {
    /// Create an invalid value error.
    pub fn invalid_value(key: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidValue {
            key: key.into(),
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pipeline_error_messages() {
        let err = PipelineError::unknown_condition("string", "resembles");
        assert_eq!(err.to_string(), "Unknown string filtering condition 'resembles'");

        let err = PipelineError::search_value_type("greaterThan", "number");
        assert_eq!(
            err.to_string(),
            "Filtering condition 'greaterThan' expects a number search value"
        );
    }

    #[test]
    fn test_error_wraps_transparently() {
        let err: Error = PipelineError::EmptyGroupKey.into();
        assert_eq!(err.to_string(), "Group key must not be empty");
        assert!(matches!(err, Error::Pipeline(PipelineError::EmptyGroupKey)));
    }
}
