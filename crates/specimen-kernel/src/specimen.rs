//! Builder results

use crate::value::Value;
use std::fmt::{self, Display, Formatter};

/// Outcome of asking a builder for a specimen
///
/// `NoSpecimen` and `Omitted` are soft sentinels: they travel back up the
/// builder tree as ordinary values and never unwind the call stack.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Specimen {
    /// A value was produced (possibly a legitimate `Value::Null`)
    Created(Value),

    /// This builder cannot satisfy the request
    NoSpecimen,

    /// The value is deliberately skipped
    Omitted,
}

impl Specimen {
    /// Wrap a produced value
    #[inline]
    #[must_use]
    pub fn created(value: impl Into<Value>) -> Self {
        Self::Created(value.into())
    }

    /// Check if a value was produced
    #[inline]
    #[must_use]
    pub fn is_created(&self) -> bool {
        matches!(self, Self::Created(_))
    }

    /// Check for the "cannot satisfy" sentinel
    #[inline]
    #[must_use]
    pub fn is_no_specimen(&self) -> bool {
        matches!(self, Self::NoSpecimen)
    }

    /// Check for the "deliberately skipped" sentinel
    #[inline]
    #[must_use]
    pub fn is_omitted(&self) -> bool {
        matches!(self, Self::Omitted)
    }

    /// Borrow the produced value
    #[inline]
    #[must_use]
    pub fn value(&self) -> Option<&Value> {
        match self {
            Self::Created(v) => Some(v),
            _ => None,
        }
    }

    /// Take the produced value
    #[inline]
    #[must_use]
    pub fn into_value(self) -> Option<Value> {
        match self {
            Self::Created(v) => Some(v),
            _ => None,
        }
    }

    /// Apply `f` to a produced value, passing sentinels through
    #[inline]
    #[must_use]
    pub fn map(self, f: impl FnOnce(Value) -> Value) -> Self {
        match self {
            Self::Created(v) => Self::Created(f(v)),
            other => other,
        }
    }
}

impl From<Value> for Specimen {
    fn from(v: Value) -> Self {
        Self::Created(v)
    }
}

impl Display for Specimen {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Created(v) => write!(f, "{v}"),
            Self::NoSpecimen => write!(f, "<no specimen>"),
            Self::Omitted => write!(f, "<omitted>"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn created_null_is_not_a_sentinel() {
        let s = Specimen::Created(Value::Null);
        assert!(s.is_created());
        assert!(!s.is_no_specimen());
        assert_eq!(s.value(), Some(&Value::Null));
    }

    #[test]
    fn map_passes_sentinels_through() {
        assert_eq!(Specimen::NoSpecimen.map(|_| Value::Int(1)), Specimen::NoSpecimen);
        assert_eq!(Specimen::Omitted.map(|_| Value::Int(1)), Specimen::Omitted);
        assert_eq!(
            Specimen::created(1).map(|_| Value::Int(2)),
            Specimen::Created(Value::Int(2))
        );
    }
}
