//! Series configuration.
//!
//! Series trust their producers to emit strictly ascending, date-unique
//! entries. [`SeriesConfig`] controls whether that precondition is checked as
//! entries are produced, and carries an optional label for log events.

use serde::{Deserialize, Serialize};

use crate::error::{CadenceError, CadenceResult};

/// How a series treats entries that break ascending date order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderCheck {
    /// No check at all.
    Trust,
    /// Log a warning for each out-of-order or duplicate date.
    Warn,
    /// `debug_assert!` in debug builds, warning in release builds.
    #[default]
    Assert,
}

impl OrderCheck {
    /// Returns true if entries need to be inspected at all.
    #[must_use]
    pub fn is_enabled(self) -> bool {
        !matches!(self, OrderCheck::Trust)
    }
}

/// Per-series settings.
///
/// # Example
///
/// ```rust
/// use cadence_core::config::{OrderCheck, SeriesConfig};
///
/// let config = SeriesConfig::from_json(r#"{ "order_check": "warn", "label": "rent" }"#).unwrap();
/// assert_eq!(config.order_check, OrderCheck::Warn);
/// assert_eq!(config.label.as_deref(), Some("rent"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SeriesConfig {
    /// Ordering precondition policy.
    pub order_check: OrderCheck,
    /// Name used in log events.
    pub label: Option<String>,
}

impl SeriesConfig {
    /// Creates the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the ordering policy.
    #[must_use]
    pub fn with_order_check(mut self, order_check: OrderCheck) -> Self {
        self.order_check = order_check;
        self
    }

    /// Sets the label.
    #[must_use]
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Parses and validates a configuration from JSON.
    ///
    /// Missing fields take their defaults.
    pub fn from_json(json: &str) -> CadenceResult<Self> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| CadenceError::config_error(format!("invalid series config: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Checks the configuration for values that cannot be used.
    pub fn validate(&self) -> CadenceResult<()> {
        if let Some(label) = &self.label {
            if label.trim().is_empty() {
                return Err(CadenceError::config_error("label must not be blank"));
            }
        }
        Ok(())
    }

    /// Label for log events, `"series"` when unset.
    #[must_use]
    pub fn label_or_default(&self) -> &str {
        self.label.as_deref().unwrap_or("series")
    }
}
