//! Resolution context
//!
//! [`SpecimenContext`] is the only channel builders use to obtain nested
//! values. [`SpecimenContainer`] is the context that re-enters a builder
//! graph at its root.

use crate::builder::BuilderRef;
use crate::error::SpecimenError;
use crate::request::Request;
use crate::specimen::Specimen;
use crate::value::Value;

/// Capability to resolve a nested request by re-entering the pipeline
pub trait SpecimenContext {
    /// Resolve a request
    ///
    /// # Errors
    /// Hard failures raised anywhere in the graph.
    fn resolve(&self, request: &Request) -> Result<Specimen, SpecimenError>;
}

/// Context that resolves every request through one root builder
#[derive(Debug, Clone)]
pub struct SpecimenContainer {
    builder: BuilderRef,
}

impl SpecimenContainer {
    /// Create container around a root builder
    #[inline]
    #[must_use]
    pub fn new(builder: BuilderRef) -> Self {
        Self { builder }
    }

    /// Root builder
    #[inline]
    #[must_use]
    pub fn builder(&self) -> &BuilderRef {
        &self.builder
    }

    /// Resolve a request into a value
    ///
    /// # Errors
    /// [`SpecimenError::Unresolvable`] when the graph declined or omitted the
    /// request, otherwise any hard failure raised during resolution.
    pub fn create(&self, request: &Request) -> Result<Value, SpecimenError> {
        match self.resolve(request)? {
            Specimen::Created(value) => Ok(value),
            Specimen::NoSpecimen | Specimen::Omitted => Err(SpecimenError::unresolvable(request)),
        }
    }

    /// Resolve a many-request into its items
    ///
    /// # Errors
    /// [`SpecimenError::Unresolvable`] when the graph did not produce a sequence.
    pub fn create_many(
        &self,
        request: Request,
        count: Option<usize>,
    ) -> Result<Vec<Value>, SpecimenError> {
        let many = match count {
            Some(n) => Request::many_with_count(request, n),
            None => Request::many(request),
        };
        match self.create(&many)? {
            Value::Seq(items) => Ok(items),
            _ => Err(SpecimenError::unresolvable(&many)),
        }
    }
}

impl SpecimenContext for SpecimenContainer {
    fn resolve(&self, request: &Request) -> Result<Specimen, SpecimenError> {
        self.builder.create(request, self)
    }
}
