//! Requests
//!
//! A [`Request`] is the immutable, comparable description of "what to
//! produce". Builders match on the variant they understand and decline the
//! rest.

use crate::error::SpecimenError;
use crate::type_ref::TypeRef;
use crate::value::Value;
use std::fmt::{self, Display, Formatter};

/// Description of a desired specimen
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Request {
    /// Produce an instance of a type
    Type(TypeRef),

    /// Produce a value for a field, property or parameter
    Member(MemberRequest),

    /// Produce an instance of a type, using a seed as hint
    Seeded(SeededRequest),

    /// Produce a sequence with an optional count
    Many(ManyRequest),

    /// Produce a sequence of exactly `count` items
    FiniteSequence(FiniteSequenceRequest),

    /// Host-specific descriptor the kernel does not interpret
    Opaque(OpaqueRequest),
}

impl Request {
    /// Type request
    #[inline]
    #[must_use]
    pub fn of_type(type_ref: TypeRef) -> Self {
        Self::Type(type_ref)
    }

    /// Parameter request
    #[inline]
    #[must_use]
    pub fn parameter(name: impl Into<String>, type_ref: TypeRef) -> Self {
        Self::Member(MemberRequest::new(MemberKind::Parameter, name, type_ref))
    }

    /// Property request
    #[inline]
    #[must_use]
    pub fn property(name: impl Into<String>, type_ref: TypeRef) -> Self {
        Self::Member(MemberRequest::new(MemberKind::Property, name, type_ref))
    }

    /// Field request
    #[inline]
    #[must_use]
    pub fn field(name: impl Into<String>, type_ref: TypeRef) -> Self {
        Self::Member(MemberRequest::new(MemberKind::Field, name, type_ref))
    }

    /// Seeded request
    #[inline]
    #[must_use]
    pub fn seeded(type_ref: TypeRef, seed: Value) -> Self {
        Self::Seeded(SeededRequest::new(type_ref, seed))
    }

    /// Many request using the configured default count
    #[inline]
    #[must_use]
    pub fn many(inner: Request) -> Self {
        Self::Many(ManyRequest::new(inner))
    }

    /// Many request with an explicit count
    #[inline]
    #[must_use]
    pub fn many_with_count(inner: Request, count: usize) -> Self {
        Self::Many(ManyRequest::with_count(inner, count))
    }

    /// Finite sequence request
    #[inline]
    #[must_use]
    pub fn finite_sequence(inner: Request, count: usize) -> Self {
        Self::FiniteSequence(FiniteSequenceRequest::new(inner, count))
    }

    /// Opaque request
    #[inline]
    #[must_use]
    pub fn opaque(kind: impl Into<String>, key: Value) -> Self {
        Self::Opaque(OpaqueRequest::new(kind, key))
    }

    /// Requested type of a type request
    #[inline]
    #[must_use]
    pub fn as_type(&self) -> Option<&TypeRef> {
        match self {
            Self::Type(t) => Some(t),
            _ => None,
        }
    }

    /// Type the request ultimately asks for, when it names one directly
    ///
    /// Type, member and seeded requests name a type; sequence and opaque
    /// requests do not.
    #[must_use]
    pub fn target_type(&self) -> Option<&TypeRef> {
        match self {
            Self::Type(t) => Some(t),
            Self::Member(m) => Some(&m.type_ref),
            Self::Seeded(s) => Some(&s.type_ref),
            Self::Many(_) | Self::FiniteSequence(_) | Self::Opaque(_) => None,
        }
    }
}

impl From<TypeRef> for Request {
    fn from(t: TypeRef) -> Self {
        Self::Type(t)
    }
}

impl Display for Request {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Type(t) => write!(f, "{t}"),
            Self::Member(m) => write!(f, "{m}"),
            Self::Seeded(s) => write!(f, "{s}"),
            Self::Many(m) => write!(f, "{m}"),
            Self::FiniteSequence(s) => write!(f, "{s}"),
            Self::Opaque(o) => write!(f, "{o}"),
        }
    }
}

/// Kind of member a member request describes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MemberKind {
    /// Field
    Field,
    /// Writable property
    Property,
    /// Constructor or method parameter
    Parameter,
}

impl Display for MemberKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Field => write!(f, "field"),
            Self::Property => write!(f, "property"),
            Self::Parameter => write!(f, "parameter"),
        }
    }
}

/// Request for a member value
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MemberRequest {
    /// Member kind
    pub kind: MemberKind,

    /// Member name, used as name hint
    pub name: String,

    /// Declared type
    pub type_ref: TypeRef,
}

impl MemberRequest {
    /// Create member request
    #[inline]
    #[must_use]
    pub fn new(kind: MemberKind, name: impl Into<String>, type_ref: TypeRef) -> Self {
        Self {
            kind,
            name: name.into(),
            type_ref,
        }
    }
}

impl Display for MemberRequest {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}: {}", self.kind, self.name, self.type_ref)
    }
}

/// Request for a type with a seed
///
/// The seed is a partial hint (for strings, the name prefix) or a default;
/// builders are free to ignore it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SeededRequest {
    /// Requested type
    pub type_ref: TypeRef,

    /// Seed value (`Value::Null` when absent)
    pub seed: Value,
}

impl SeededRequest {
    /// Create seeded request
    #[inline]
    #[must_use]
    pub fn new(type_ref: TypeRef, seed: Value) -> Self {
        Self { type_ref, seed }
    }
}

impl Display for SeededRequest {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{} (seed: {})", self.type_ref, self.seed)
    }
}

/// Request for many specimens of the inner request
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ManyRequest {
    inner: Box<Request>,
    count: Option<usize>,
}

impl ManyRequest {
    /// Create with default count
    #[inline]
    #[must_use]
    pub fn new(inner: Request) -> Self {
        Self {
            inner: Box::new(inner),
            count: None,
        }
    }

    /// Create with explicit count
    #[inline]
    #[must_use]
    pub fn with_count(inner: Request, count: usize) -> Self {
        Self {
            inner: Box::new(inner),
            count: Some(count),
        }
    }

    /// Inner request
    #[inline]
    #[must_use]
    pub fn inner(&self) -> &Request {
        &self.inner
    }

    /// Explicit count, if any
    #[inline]
    #[must_use]
    pub fn count(&self) -> Option<usize> {
        self.count
    }

    /// Effective count: the explicit count when positive, else the default
    ///
    /// # Errors
    /// [`SpecimenError::InvalidArgument`] when neither is positive.
    pub fn resolve_count(&self, default_count: usize) -> Result<usize, SpecimenError> {
        match self.count {
            Some(n) if n > 0 => Ok(n),
            _ if default_count > 0 => Ok(default_count),
            _ => Err(SpecimenError::invalid_argument(
                "default_count",
                "neither the contained count nor the default count is positive",
            )),
        }
    }

    /// Expand into one inner request per item
    ///
    /// # Errors
    /// See [`ManyRequest::resolve_count`].
    pub fn create_requests(&self, default_count: usize) -> Result<Vec<Request>, SpecimenError> {
        let n = self.resolve_count(default_count)?;
        Ok(vec![(*self.inner).clone(); n])
    }
}

impl Display for ManyRequest {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self.count {
            Some(n) => write!(f, "many ({n}) of {}", self.inner),
            None => write!(f, "many of {}", self.inner),
        }
    }
}

/// Request for exactly `count` specimens of the inner request
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FiniteSequenceRequest {
    inner: Box<Request>,
    count: usize,
}

impl FiniteSequenceRequest {
    /// Create finite sequence request
    #[inline]
    #[must_use]
    pub fn new(inner: Request, count: usize) -> Self {
        Self {
            inner: Box::new(inner),
            count,
        }
    }

    /// Inner request
    #[inline]
    #[must_use]
    pub fn inner(&self) -> &Request {
        &self.inner
    }

    /// Mandatory count
    #[inline]
    #[must_use]
    pub fn count(&self) -> usize {
        self.count
    }

    /// Expand into one inner request per item
    #[must_use]
    pub fn create_requests(&self) -> Vec<Request> {
        vec![(*self.inner).clone(); self.count]
    }
}

impl Display for FiniteSequenceRequest {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{} of {}", self.count, self.inner)
    }
}

/// Host-specific request the kernel passes through untouched
///
/// Compared by kind and key so it still participates in recursion
/// detection.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct OpaqueRequest {
    /// Descriptor kind, e.g. `"lazy"`
    pub kind: String,

    /// Comparable payload
    pub key: Value,
}

impl OpaqueRequest {
    /// Create opaque request
    #[inline]
    #[must_use]
    pub fn new(kind: impl Into<String>, key: Value) -> Self {
        Self {
            kind: kind.into(),
            key,
        }
    }
}

impl Display for OpaqueRequest {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.kind, self.key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn requests_compare_by_value() {
        let a = Request::parameter("name", TypeRef::string());
        let b = Request::parameter("name", TypeRef::string());
        let c = Request::property("name", TypeRef::string());
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn many_explicit_count_wins() {
        let many = ManyRequest::with_count(Request::of_type(TypeRef::i32()), 5);
        assert_eq!(many.create_requests(3).unwrap().len(), 5);
    }

    #[test]
    fn many_falls_back_to_default() {
        let many = ManyRequest::new(Request::of_type(TypeRef::i32()));
        assert_eq!(many.create_requests(3).unwrap().len(), 3);

        let zero = ManyRequest::with_count(Request::of_type(TypeRef::i32()), 0);
        assert_eq!(zero.create_requests(2).unwrap().len(), 2);
    }

    #[test]
    fn many_rejects_non_positive_counts() {
        let many = ManyRequest::new(Request::of_type(TypeRef::i32()));
        assert!(matches!(
            many.create_requests(0),
            Err(SpecimenError::InvalidArgument { .. })
        ));
    }

    #[test]
    fn finite_sequence_allows_zero() {
        let seq = FiniteSequenceRequest::new(Request::of_type(TypeRef::i32()), 0);
        assert!(seq.create_requests().is_empty());
    }

    #[test]
    fn target_type() {
        let seeded = Request::seeded(TypeRef::string(), Value::str("name"));
        assert_eq!(seeded.target_type(), Some(&TypeRef::string()));
        assert!(Request::many(seeded).target_type().is_none());
    }

    #[test]
    fn display() {
        let r = Request::parameter("age", TypeRef::i32());
        assert_eq!(r.to_string(), "parameter age: i32");
        let s = Request::seeded(TypeRef::string(), Value::str("name"));
        assert_eq!(s.to_string(), "String (seed: \"name\")");
    }
}
