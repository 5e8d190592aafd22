//! Request specifications
//!
//! Predicates over [`Request`]s used to gate which requests a builder
//! handles. Compose them with [`AndRequestSpecification`],
//! [`OrRequestSpecification`] and [`InverseRequestSpecification`], or with
//! the [`SpecificationExt`] combinators.

use crate::request::Request;
use crate::type_ref::TypeRef;
use std::fmt;
use std::sync::Arc;

/// Boolean test over requests
pub trait RequestSpecification: Send + Sync + fmt::Debug {
    /// Check whether the request satisfies this specification
    fn is_satisfied_by(&self, request: &Request) -> bool;
}

/// Shared specification handle
pub type SpecificationRef = Arc<dyn RequestSpecification>;

/// Combinators for any specification
pub trait SpecificationExt: RequestSpecification + Sized + 'static {
    /// Both this and `other`
    fn and(self, other: impl RequestSpecification + 'static) -> AndRequestSpecification {
        AndRequestSpecification::new(vec![Arc::new(self), Arc::new(other)])
    }

    /// Either this or `other`
    fn or(self, other: impl RequestSpecification + 'static) -> OrRequestSpecification {
        OrRequestSpecification::new(vec![Arc::new(self), Arc::new(other)])
    }

    /// Negation of this
    fn not(self) -> InverseRequestSpecification {
        InverseRequestSpecification::new(Arc::new(self))
    }

    /// Erase into a shared handle
    fn shared(self) -> SpecificationRef {
        Arc::new(self)
    }
}

impl<T: RequestSpecification + Sized + 'static> SpecificationExt for T {}

/// Satisfied by every request
#[derive(Debug, Clone, Copy, Default)]
pub struct TrueRequestSpecification;

impl RequestSpecification for TrueRequestSpecification {
    fn is_satisfied_by(&self, _request: &Request) -> bool {
        true
    }
}

/// Satisfied by no request
#[derive(Debug, Clone, Copy, Default)]
pub struct FalseRequestSpecification;

impl RequestSpecification for FalseRequestSpecification {
    fn is_satisfied_by(&self, _request: &Request) -> bool {
        false
    }
}

/// Satisfied when every inner specification is (vacuously true when empty)
#[derive(Debug, Clone)]
pub struct AndRequestSpecification {
    specifications: Vec<SpecificationRef>,
}

impl AndRequestSpecification {
    /// Create conjunction
    #[inline]
    #[must_use]
    pub fn new(specifications: Vec<SpecificationRef>) -> Self {
        Self { specifications }
    }

    /// Inner specifications
    #[inline]
    #[must_use]
    pub fn specifications(&self) -> &[SpecificationRef] {
        &self.specifications
    }
}

impl RequestSpecification for AndRequestSpecification {
    fn is_satisfied_by(&self, request: &Request) -> bool {
        self.specifications.iter().all(|s| s.is_satisfied_by(request))
    }
}

/// Satisfied when any inner specification is (false when empty)
#[derive(Debug, Clone)]
pub struct OrRequestSpecification {
    specifications: Vec<SpecificationRef>,
}

impl OrRequestSpecification {
    /// Create disjunction
    #[inline]
    #[must_use]
    pub fn new(specifications: Vec<SpecificationRef>) -> Self {
        Self { specifications }
    }

    /// Inner specifications
    #[inline]
    #[must_use]
    pub fn specifications(&self) -> &[SpecificationRef] {
        &self.specifications
    }
}

impl RequestSpecification for OrRequestSpecification {
    fn is_satisfied_by(&self, request: &Request) -> bool {
        self.specifications.iter().any(|s| s.is_satisfied_by(request))
    }
}

/// Negates the inner specification
#[derive(Debug, Clone)]
pub struct InverseRequestSpecification {
    specification: SpecificationRef,
}

impl InverseRequestSpecification {
    /// Create negation
    #[inline]
    #[must_use]
    pub fn new(specification: SpecificationRef) -> Self {
        Self { specification }
    }
}

impl RequestSpecification for InverseRequestSpecification {
    fn is_satisfied_by(&self, request: &Request) -> bool {
        !self.specification.is_satisfied_by(request)
    }
}

/// Satisfied by a type request for exactly the given type
#[derive(Debug, Clone)]
pub struct ExactTypeSpecification {
    target: TypeRef,
}

impl ExactTypeSpecification {
    /// Create for type
    #[inline]
    #[must_use]
    pub fn new(target: TypeRef) -> Self {
        Self { target }
    }
}

impl RequestSpecification for ExactTypeSpecification {
    fn is_satisfied_by(&self, request: &Request) -> bool {
        request.as_type() == Some(&self.target)
    }
}

/// Satisfied by a seeded request for the given type
#[derive(Debug, Clone)]
pub struct SeedRequestSpecification {
    target: TypeRef,
}

impl SeedRequestSpecification {
    /// Create for type
    #[inline]
    #[must_use]
    pub fn new(target: TypeRef) -> Self {
        Self { target }
    }
}

impl RequestSpecification for SeedRequestSpecification {
    fn is_satisfied_by(&self, request: &Request) -> bool {
        matches!(request, Request::Seeded(s) if s.type_ref == self.target)
    }
}

/// Satisfied by a type request whose type instantiates a generic definition
///
/// Covers the list, set and map specifications: `GenericDefinitionSpecification::new("Set")`
/// matches `Set<i32>` and `Set<String>` but not `List<i32>`.
#[derive(Debug, Clone)]
pub struct GenericDefinitionSpecification {
    definition: String,
}

impl GenericDefinitionSpecification {
    /// Create for a generic definition name
    #[inline]
    #[must_use]
    pub fn new(definition: impl Into<String>) -> Self {
        Self {
            definition: definition.into(),
        }
    }
}

impl RequestSpecification for GenericDefinitionSpecification {
    fn is_satisfied_by(&self, request: &Request) -> bool {
        request
            .as_type()
            .is_some_and(|t| t.is_generic() && t.is_instance_of(&self.definition))
    }
}

/// Satisfied by any type request
#[derive(Debug, Clone, Copy, Default)]
pub struct AnyTypeSpecification;

impl RequestSpecification for AnyTypeSpecification {
    fn is_satisfied_by(&self, request: &Request) -> bool {
        matches!(request, Request::Type(_))
    }
}

/// Satisfied by a member request with a given name and type
#[derive(Debug, Clone)]
pub struct MemberSpecification {
    name: String,
    type_ref: TypeRef,
}

impl MemberSpecification {
    /// Create for member name and declared type
    #[inline]
    #[must_use]
    pub fn new(name: impl Into<String>, type_ref: TypeRef) -> Self {
        Self {
            name: name.into(),
            type_ref,
        }
    }
}

impl RequestSpecification for MemberSpecification {
    fn is_satisfied_by(&self, request: &Request) -> bool {
        matches!(request, Request::Member(m) if m.name == self.name && m.type_ref == self.type_ref)
    }
}

/// Adapts a closure into a specification
pub struct FnSpecification<F> {
    predicate: F,
}

impl<F> FnSpecification<F>
where
    F: Fn(&Request) -> bool + Send + Sync,
{
    /// Wrap predicate
    #[inline]
    #[must_use]
    pub fn new(predicate: F) -> Self {
        Self { predicate }
    }
}

impl<F> fmt::Debug for FnSpecification<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnSpecification").finish_non_exhaustive()
    }
}

impl<F> RequestSpecification for FnSpecification<F>
where
    F: Fn(&Request) -> bool + Send + Sync,
{
    fn is_satisfied_by(&self, request: &Request) -> bool {
        (self.predicate)(request)
    }
}
