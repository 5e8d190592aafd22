//! Error types for guard-clause verification

use specimen_fixture::FixtureError;
use specimen_kernel::{FailureKind, SpecimenError};
use std::fmt::{self, Display, Formatter};

/// What a member did when probed with an invalid value
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeOutcome {
    /// The member accepted the value
    Accepted,

    /// The member failed, but not with the expected kind
    WrongFailure {
        /// Kind actually raised
        kind: FailureKind,
        /// Failure message
        message: String,
    },
}

impl Display for ProbeOutcome {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Accepted => write!(f, "the value was accepted"),
            Self::WrongFailure { kind, message } => {
                write!(f, "failed with {kind} instead: {message}")
            }
        }
    }
}

/// A missing or wrong guard clause
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GuardClauseDefect {
    /// Probed member
    pub member: String,
    /// Probed parameter name
    pub parameter: String,
    /// Probed parameter position
    pub position: usize,
    /// Invalid-value kind used
    pub invalid_value: String,
    /// Observed outcome
    pub outcome: ProbeOutcome,
}

impl Display for GuardClauseDefect {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "missing guard clause on parameter {} ('{}') of {} for invalid-value kind {}: {}",
            self.position, self.parameter, self.member, self.invalid_value, self.outcome
        )
    }
}

/// Guard-clause verification error
#[derive(Debug, thiserror::Error)]
pub enum GuardClauseError {
    /// At least one member is missing a guard clause
    #[error("{} guard clause defect(s):\n{}", .0.len(), render(.0))]
    Defects(Vec<GuardClauseDefect>),

    /// The probe inputs could not be created
    #[error("failed to prepare guard clause probe: {0}")]
    Resolution(#[from] SpecimenError),

    /// The fixture could not compose its graph
    #[error("failed to compose fixture: {0}")]
    Fixture(#[from] FixtureError),

    /// The type has no catalogued shape
    #[error("type '{0}' is not in the catalog")]
    UnknownType(String),
}

impl GuardClauseError {
    /// Reported defects, empty for other errors
    #[must_use]
    pub fn defects(&self) -> &[GuardClauseDefect] {
        match self {
            Self::Defects(defects) => defects,
            Self::Resolution(_) | Self::Fixture(_) | Self::UnknownType(_) => &[],
        }
    }
}

fn render(defects: &[GuardClauseDefect]) -> String {
    defects.iter().map(|d| format!("  - {d}")).collect::<Vec<_>>().join("\n")
}

/// Result alias for verification
pub type Result<T> = std::result::Result<T, GuardClauseError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defect_message_names_member_parameter_and_kind() {
        let defect = GuardClauseDefect {
            member: "Widget::new(name: String)".to_string(),
            parameter: "name".to_string(),
            position: 0,
            invalid_value: "empty string".to_string(),
            outcome: ProbeOutcome::Accepted,
        };
        let text = GuardClauseError::Defects(vec![defect]).to_string();

        assert!(text.starts_with("1 guard clause defect(s)"));
        assert!(text.contains("parameter 0 ('name') of Widget::new(name: String)"));
        assert!(text.contains("invalid-value kind empty string: the value was accepted"));
    }
}
