//! Fixture configuration

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};

/// What a request that repeats an in-flight request resolves to
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecursionPolicy {
    /// Fail with the cyclic path
    #[default]
    Throw,
    /// Resolve to null
    Null,
    /// Leave the member out
    Omit,
}

/// Fixture configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FixtureConfig {
    /// Item count for many-requests without an explicit count
    pub repeat_count: usize,
    /// Recursion behavior installed by default
    pub recursion: RecursionPolicy,
    /// Leave writable members of created objects unset
    pub omit_auto_properties: bool,
    /// Log every request and result through `tracing`
    pub trace: bool,
}

impl FixtureConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With repeat count
    #[inline]
    #[must_use]
    pub fn with_repeat_count(mut self, count: usize) -> Self {
        self.repeat_count = count;
        self
    }

    /// With recursion policy
    #[inline]
    #[must_use]
    pub fn with_recursion(mut self, policy: RecursionPolicy) -> Self {
        self.recursion = policy;
        self
    }

    /// With auto-property population switched off or on
    #[inline]
    #[must_use]
    pub fn with_omit_auto_properties(mut self, omit: bool) -> Self {
        self.omit_auto_properties = omit;
        self
    }

    /// With request tracing switched on or off
    #[inline]
    #[must_use]
    pub fn with_trace(mut self, trace: bool) -> Self {
        self.trace = trace;
        self
    }

    /// Check the settings
    ///
    /// # Errors
    /// [`ConfigError::Invalid`] when `repeat_count` is zero.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.repeat_count == 0 {
            return Err(ConfigError::invalid("repeat_count", "must be greater than zero"));
        }
        Ok(())
    }

    /// Parse and validate TOML
    ///
    /// # Errors
    /// Parse failures and [`FixtureConfig::validate`] failures.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Parse and validate JSON
    ///
    /// # Errors
    /// Parse failures and [`FixtureConfig::validate`] failures.
    pub fn from_json_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(s)?;
        config.validate()?;
        Ok(config)
    }
}

impl Default for FixtureConfig {
    fn default() -> Self {
        Self {
            repeat_count: 3,
            recursion: RecursionPolicy::Throw,
            omit_auto_properties: false,
            trace: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn defaults() {
        let config = FixtureConfig::new();
        assert_eq!(config.repeat_count, 3);
        assert_eq!(config.recursion, RecursionPolicy::Throw);
        assert!(!config.omit_auto_properties);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn toml_overrides_defaults() {
        let text = "repeat_count = 5\nrecursion = \"omit\"\n";
        let config = FixtureConfig::from_toml_str(text).unwrap();
        let expected =
            FixtureConfig::new().with_repeat_count(5).with_recursion(RecursionPolicy::Omit);
        assert_eq!(config, expected);
    }

    #[test]
    fn json_parses() {
        let text = r#"{"omit_auto_properties": true, "trace": true}"#;
        let config = FixtureConfig::from_json_str(text).unwrap();
        assert!(config.omit_auto_properties);
        assert!(config.trace);
        assert_eq!(config.repeat_count, 3);
    }

    #[test]
    fn zero_repeat_count_is_rejected() {
        assert!(matches!(
            FixtureConfig::from_toml_str("repeat_count = 0"),
            Err(ConfigError::Invalid { field: "repeat_count", .. })
        ));
    }

    #[test]
    fn unknown_policy_is_a_parse_error() {
        assert!(matches!(
            FixtureConfig::from_toml_str("recursion = \"loop\""),
            Err(ConfigError::Toml(_))
        ));
    }
}
