//! Invalid values
//!
//! Each [`InvalidValue`] is a deliberately bad input together with the
//! failure kind a well-guarded member raises when it receives it.

use specimen_kernel::type_ref::{OPTION, STRING, UUID};
use specimen_kernel::{FailureKind, TypeRef, Value};
use std::fmt;
use std::sync::Arc;
use uuid::Uuid;

/// Deliberately invalid input paired with its expected failure
pub trait InvalidValue: Send + Sync + fmt::Debug {
    /// Human-readable kind, used in defect reports
    fn description(&self) -> &str;

    /// Check if parameters of this type can be probed with the value
    fn applies_to(&self, type_ref: &TypeRef) -> bool;

    /// The invalid value
    fn value(&self) -> Value;

    /// Check if a failure of this kind is the expected reaction
    fn is_satisfied_by(&self, kind: FailureKind) -> bool;
}

/// Shared invalid-value handle
pub type InvalidValueRef = Arc<dyn InvalidValue>;

/// Null for any type that admits it, except optional types
#[derive(Debug, Clone, Copy, Default)]
pub struct NullReferenceInvalidValue;

impl InvalidValue for NullReferenceInvalidValue {
    fn description(&self) -> &str {
        "null reference"
    }

    fn applies_to(&self, type_ref: &TypeRef) -> bool {
        type_ref.is_nullable() && type_ref.name() != Some(OPTION)
    }

    fn value(&self) -> Value {
        Value::Null
    }

    fn is_satisfied_by(&self, kind: FailureKind) -> bool {
        kind == FailureKind::ArgumentNull
    }
}

/// `""` for string parameters
#[derive(Debug, Clone, Copy, Default)]
pub struct EmptyStringInvalidValue;

impl InvalidValue for EmptyStringInvalidValue {
    fn description(&self) -> &str {
        "empty string"
    }

    fn applies_to(&self, type_ref: &TypeRef) -> bool {
        !type_ref.is_generic() && type_ref.name() == Some(STRING)
    }

    fn value(&self) -> Value {
        Value::str("")
    }

    fn is_satisfied_by(&self, kind: FailureKind) -> bool {
        kind == FailureKind::Argument
    }
}

/// The nil UUID for identifier parameters
#[derive(Debug, Clone, Copy, Default)]
pub struct EmptyUuidInvalidValue;

impl InvalidValue for EmptyUuidInvalidValue {
    fn description(&self) -> &str {
        "empty identifier"
    }

    fn applies_to(&self, type_ref: &TypeRef) -> bool {
        !type_ref.is_generic() && type_ref.name() == Some(UUID)
    }

    fn value(&self) -> Value {
        Value::Uuid(Uuid::nil())
    }

    fn is_satisfied_by(&self, kind: FailureKind) -> bool {
        kind == FailureKind::Argument
    }
}

/// Null reference, empty string and empty identifier
#[must_use]
pub fn default_invalid_values() -> Vec<InvalidValueRef> {
    vec![
        Arc::new(NullReferenceInvalidValue),
        Arc::new(EmptyStringInvalidValue),
        Arc::new(EmptyUuidInvalidValue),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn null_applies_to_reference_like_types_only() {
        let null = NullReferenceInvalidValue;
        assert!(null.applies_to(&TypeRef::string()));
        assert!(null.applies_to(&TypeRef::named("Widget")));
        assert!(null.applies_to(&TypeRef::seq(TypeRef::i32())));
        assert!(!null.applies_to(&TypeRef::i32()));
        assert!(!null.applies_to(&TypeRef::uuid()));
        assert!(!null.applies_to(&TypeRef::option(TypeRef::string())));
    }

    #[test]
    fn each_value_expects_its_failure_kind() {
        assert!(NullReferenceInvalidValue.is_satisfied_by(FailureKind::ArgumentNull));
        assert!(!NullReferenceInvalidValue.is_satisfied_by(FailureKind::Argument));
        assert!(EmptyStringInvalidValue.is_satisfied_by(FailureKind::Argument));
        assert!(EmptyUuidInvalidValue.is_satisfied_by(FailureKind::Argument));
        assert!(!EmptyUuidInvalidValue.is_satisfied_by(FailureKind::TargetInvocation));
    }

    #[test]
    fn empty_values() {
        assert_eq!(EmptyStringInvalidValue.value(), Value::str(""));
        assert_eq!(EmptyUuidInvalidValue.value(), Value::Uuid(Uuid::nil()));
        assert!(EmptyUuidInvalidValue.applies_to(&TypeRef::uuid()));
        assert!(!EmptyStringInvalidValue.applies_to(&TypeRef::uuid()));
    }
}
