//! Specimen builder trait and core combinators
//!
//! Provides the [`SpecimenBuilder`] trait, the [`BuilderNode`] capability
//! that makes builder trees rewritable, and the two structural combinators
//! every graph is made of: [`CompositeSpecimenBuilder`] and
//! [`FilteringSpecimenBuilder`].

use crate::context::SpecimenContext;
use crate::error::SpecimenError;
use crate::request::Request;
use crate::specification::SpecificationRef;
use crate::specimen::Specimen;
use std::any::Any;
use std::fmt;
use std::sync::Arc;

/// Unit of resolution logic
///
/// Builders are shared immutably across the graph; any generation state a
/// builder owns must be internally synchronised.
pub trait SpecimenBuilder: AsAny + Send + Sync + fmt::Debug {
    /// Create a specimen for the request, or decline with [`Specimen::NoSpecimen`]
    ///
    /// # Errors
    /// Hard failures only (circular references, failing factories, ...).
    fn create(
        &self,
        request: &Request,
        context: &dyn SpecimenContext,
    ) -> Result<Specimen, SpecimenError>;

    /// Node view of this builder, when it has rewritable children
    fn as_node(&self) -> Option<&dyn BuilderNode> {
        None
    }
}

/// Shared builder handle
pub type BuilderRef = Arc<dyn SpecimenBuilder>;

/// Builder that exposes its children and can be recomposed around new ones
pub trait BuilderNode {
    /// Immediate child builders
    fn children(&self) -> Vec<BuilderRef>;

    /// New node of the same kind wrapping `children`
    ///
    /// Never mutates `self`. The returned builder is itself a node.
    fn compose(&self, children: Vec<BuilderRef>) -> BuilderRef;
}

/// Upcast support for downcasting builders in graph predicates
pub trait AsAny {
    /// Borrow as [`Any`]
    fn as_any(&self) -> &dyn Any;
}

impl<T: SpecimenBuilder + 'static> AsAny for T {
    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl<'a> dyn SpecimenBuilder + 'a {
    /// Check whether the builder is a `T`
    #[inline]
    #[must_use]
    pub fn is<T: SpecimenBuilder + 'static>(&self) -> bool {
        self.as_any().is::<T>()
    }

    /// Downcast to a concrete builder type
    #[inline]
    #[must_use]
    pub fn downcast_ref<T: SpecimenBuilder + 'static>(&self) -> Option<&T> {
        self.as_any().downcast_ref::<T>()
    }

    /// Check whether the builder is a node
    #[inline]
    #[must_use]
    pub fn is_node(&self) -> bool {
        self.as_node().is_some()
    }
}

/// Tries children in order and returns the first result that is not
/// [`Specimen::NoSpecimen`]
#[derive(Debug, Clone, Default)]
pub struct CompositeSpecimenBuilder {
    builders: Vec<BuilderRef>,
}

impl CompositeSpecimenBuilder {
    /// Create composite over ordered children
    #[inline]
    #[must_use]
    pub fn new(builders: Vec<BuilderRef>) -> Self {
        Self { builders }
    }

    /// Children
    #[inline]
    #[must_use]
    pub fn builders(&self) -> &[BuilderRef] {
        &self.builders
    }

    /// The single child itself, or a composite of all children
    #[must_use]
    pub fn compose_if_multiple(mut builders: Vec<BuilderRef>) -> BuilderRef {
        if builders.len() == 1 {
            if let Some(only) = builders.pop() {
                return only;
            }
        }
        Arc::new(Self::new(builders))
    }
}

impl FromIterator<BuilderRef> for CompositeSpecimenBuilder {
    fn from_iter<I: IntoIterator<Item = BuilderRef>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl SpecimenBuilder for CompositeSpecimenBuilder {
    fn create(
        &self,
        request: &Request,
        context: &dyn SpecimenContext,
    ) -> Result<Specimen, SpecimenError> {
        for builder in &self.builders {
            let result = builder.create(request, context)?;
            if !result.is_no_specimen() {
                return Ok(result);
            }
        }
        Ok(Specimen::NoSpecimen)
    }

    fn as_node(&self) -> Option<&dyn BuilderNode> {
        Some(self)
    }
}

impl BuilderNode for CompositeSpecimenBuilder {
    fn children(&self) -> Vec<BuilderRef> {
        self.builders.clone()
    }

    fn compose(&self, children: Vec<BuilderRef>) -> BuilderRef {
        Arc::new(Self::new(children))
    }
}

/// Delegates only the requests its specification accepts
///
/// Rejected requests yield [`Specimen::NoSpecimen`] without touching the
/// inner builder.
#[derive(Debug, Clone)]
pub struct FilteringSpecimenBuilder {
    builder: BuilderRef,
    specification: SpecificationRef,
}

impl FilteringSpecimenBuilder {
    /// Create filter around a builder
    #[inline]
    #[must_use]
    pub fn new(builder: BuilderRef, specification: SpecificationRef) -> Self {
        Self {
            builder,
            specification,
        }
    }

    /// Inner builder
    #[inline]
    #[must_use]
    pub fn builder(&self) -> &BuilderRef {
        &self.builder
    }

    /// Gate specification
    #[inline]
    #[must_use]
    pub fn specification(&self) -> &SpecificationRef {
        &self.specification
    }
}

impl SpecimenBuilder for FilteringSpecimenBuilder {
    fn create(
        &self,
        request: &Request,
        context: &dyn SpecimenContext,
    ) -> Result<Specimen, SpecimenError> {
        if !self.specification.is_satisfied_by(request) {
            return Ok(Specimen::NoSpecimen);
        }
        self.builder.create(request, context)
    }

    fn as_node(&self) -> Option<&dyn BuilderNode> {
        Some(self)
    }
}

impl BuilderNode for FilteringSpecimenBuilder {
    fn children(&self) -> Vec<BuilderRef> {
        vec![self.builder.clone()]
    }

    fn compose(&self, children: Vec<BuilderRef>) -> BuilderRef {
        Arc::new(Self::new(
            CompositeSpecimenBuilder::compose_if_multiple(children),
            self.specification.clone(),
        ))
    }
}
