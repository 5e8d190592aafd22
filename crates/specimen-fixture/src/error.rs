//! Error types for the fixture
//!
//! Provides error handling for:
//! - Invalid or unparsable configuration
//! - Failures raised while composing or resolving through the fixture

use specimen_kernel::SpecimenError;

/// Configuration error
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// A setting has an unusable value
    #[error("invalid setting '{field}': {reason}")]
    Invalid {
        /// Setting name
        field: &'static str,
        /// Why it was rejected
        reason: String,
    },

    /// TOML could not be parsed
    #[error("invalid TOML configuration: {0}")]
    Toml(#[from] toml::de::Error),

    /// JSON could not be parsed
    #[error("invalid JSON configuration: {0}")]
    Json(#[from] serde_json::Error),
}

impl ConfigError {
    /// Create invalid-setting error
    #[inline]
    #[must_use]
    pub fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            field,
            reason: reason.into(),
        }
    }
}

/// Main fixture error type
#[derive(Debug, thiserror::Error)]
pub enum FixtureError {
    /// Configuration rejected
    #[error("configuration failed: {0}")]
    Config(#[from] ConfigError),

    /// Composition or resolution failed
    #[error(transparent)]
    Specimen(#[from] SpecimenError),
}

impl FixtureError {
    /// Underlying resolution error, if any
    #[inline]
    #[must_use]
    pub fn as_specimen_error(&self) -> Option<&SpecimenError> {
        match self {
            Self::Specimen(e) => Some(e),
            Self::Config(_) => None,
        }
    }

    /// Check if the error reports a circular reference
    #[inline]
    #[must_use]
    pub fn is_circular_reference(&self) -> bool {
        self.as_specimen_error().is_some_and(SpecimenError::is_circular_reference)
    }
}

/// Result alias for fixture operations
pub type Result<T> = std::result::Result<T, FixtureError>;
