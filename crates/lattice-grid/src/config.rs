//! Configuration for lists and grids.
//!
//! Every field is optional in the serialized form and falls back to its
//! default, so a host only writes what it overrides:
//!
//! ```toml
//! [grid]
//! min_unpinned_fraction = 0.25
//! auto_scroll_interval_ms = 50
//!
//! [list]
//! allow_custom_values = true
//! ```
//!
//! Values are range-checked by [`LatticeConfig::validate`], which
//! [`LatticeConfig::from_toml_str`] runs after parsing.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::logging::targets;

/// Grid pinning and column-drag settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridConfig {
    /// Share of the grid width that must stay available to unpinned columns.
    pub min_unpinned_fraction: f32,
    /// Pixels scrolled per auto-scroll tick.
    pub auto_scroll_step: f32,
    /// Milliseconds between auto-scroll ticks.
    pub auto_scroll_interval_ms: u64,
    /// Width of the zone at each horizontal edge that triggers auto-scroll.
    pub edge_zone_width: f32,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            min_unpinned_fraction: 0.2,
            auto_scroll_step: 15.0,
            auto_scroll_interval_ms: 100,
            edge_zone_width: 50.0,
        }
    }
}

impl GridConfig {
    /// Auto-scroll interval as a duration.
    pub fn auto_scroll_interval(&self) -> Duration {
        Duration::from_millis(self.auto_scroll_interval_ms)
    }

    /// Range-check every field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..1.0).contains(&self.min_unpinned_fraction) {
            return Err(ConfigError::invalid_value(
                "grid.min_unpinned_fraction",
                format!("{} is outside [0, 1)", self.min_unpinned_fraction),
            ));
        }
        if self.auto_scroll_step.is_nan() || self.auto_scroll_step <= 0.0 {
            return Err(ConfigError::invalid_value(
                "grid.auto_scroll_step",
                "must be positive",
            ));
        }
        if self.auto_scroll_interval_ms == 0 {
            return Err(ConfigError::invalid_value(
                "grid.auto_scroll_interval_ms",
                "must be non-zero",
            ));
        }
        if self.edge_zone_width.is_nan() || self.edge_zone_width < 0.0 {
            return Err(ConfigError::invalid_value(
                "grid.edge_zone_width",
                "must not be negative",
            ));
        }
        Ok(())
    }
}

/// Drop-down and combo settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ListConfig {
    /// Close a single-selection list after an item is selected.
    pub close_on_select: bool,
    /// Allow adding the search text as a new item.
    pub allow_custom_values: bool,
    /// Filter the items by the search text.
    pub filterable: bool,
    /// Case-insensitive search.
    pub ignore_case: bool,
}

impl Default for ListConfig {
    fn default() -> Self {
        Self {
            close_on_select: true,
            allow_custom_values: false,
            filterable: true,
            ignore_case: true,
        }
    }
}

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LatticeConfig {
    pub grid: GridConfig,
    pub list: ListConfig,
}

impl LatticeConfig {
    /// Parse and validate TOML.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: LatticeConfig = toml::from_str(text)?;
        config.validate()?;
        tracing::debug!(target: targets::CONFIG, ?config, "configuration loaded");
        Ok(config)
    }

    /// Serialize to TOML.
    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Range-check every section.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.grid.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = LatticeConfig::default();
        assert_eq!(config.grid.min_unpinned_fraction, 0.2);
        assert_eq!(config.grid.auto_scroll_step, 15.0);
        assert_eq!(config.grid.auto_scroll_interval(), Duration::from_millis(100));
        assert!(config.list.close_on_select);
        assert!(config.list.ignore_case);
        assert!(!config.list.allow_custom_values);
    }

    #[test]
    fn test_partial_toml() {
        let config = LatticeConfig::from_toml_str(
            r#"
            [grid]
            min_unpinned_fraction = 0.25

            [list]
            allow_custom_values = true
            "#,
        )
        .unwrap();
        assert_eq!(config.grid.min_unpinned_fraction, 0.25);
        assert_eq!(config.grid.auto_scroll_interval_ms, 100);
        assert!(config.list.allow_custom_values);
        assert!(config.list.filterable);
    }

    #[test]
    fn test_empty_toml() {
        assert_eq!(LatticeConfig::from_toml_str("").unwrap(), LatticeConfig::default());
    }

    #[test]
    fn test_invalid_values() {
        let err = LatticeConfig::from_toml_str("[grid]\nmin_unpinned_fraction = 1.0\n").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { ref key, .. } if key == "grid.min_unpinned_fraction"));

        let err = LatticeConfig::from_toml_str("[grid]\nauto_scroll_interval_ms = 0\n").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { .. }));

        let err = LatticeConfig::from_toml_str("[grid]\nauto_scroll_step = -1.0\n").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { .. }));
    }

    #[test]
    fn test_parse_error() {
        let err = LatticeConfig::from_toml_str("[grid\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_toml_round_trip() {
        let mut config = LatticeConfig::default();
        config.grid.edge_zone_width = 30.0;
        config.list.filterable = false;
        let text = config.to_toml_string().unwrap();
        assert_eq!(LatticeConfig::from_toml_str(&text).unwrap(), config);
    }
}
