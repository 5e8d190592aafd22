//! Leaf builders and decorators
//!
//! - [`FixedBuilder`]: always the same value
//! - [`FnBuilder`]: closure adapter
//! - [`Postprocessor`]: runs a [`SpecimenCommand`] on created values
//! - [`NoSpecimenOutputGuard`]: turns an inner decline into a hard failure
//! - [`TerminatingBuilder`]: end of the chain, every request is a failure

use crate::builder::{BuilderNode, BuilderRef, CompositeSpecimenBuilder, SpecimenBuilder};
use crate::context::SpecimenContext;
use crate::error::SpecimenError;
use crate::request::Request;
use crate::specification::{SpecificationRef, TrueRequestSpecification};
use crate::specimen::Specimen;
use crate::value::Value;
use std::any::Any;
use std::fmt;
use std::sync::Arc;

/// Returns the same value for every request
#[derive(Debug, Clone)]
pub struct FixedBuilder {
    value: Value,
}

impl FixedBuilder {
    /// Create builder for a value
    #[inline]
    #[must_use]
    pub fn new(value: Value) -> Self {
        Self { value }
    }

    /// The fixed value
    #[inline]
    #[must_use]
    pub fn value(&self) -> &Value {
        &self.value
    }
}

impl SpecimenBuilder for FixedBuilder {
    fn create(
        &self,
        _request: &Request,
        _context: &dyn SpecimenContext,
    ) -> Result<Specimen, SpecimenError> {
        Ok(Specimen::Created(self.value.clone()))
    }
}

/// Adapts a closure into a builder
pub struct FnBuilder<F> {
    f: F,
}

impl<F> FnBuilder<F>
where
    F: Fn(&Request, &dyn SpecimenContext) -> Result<Specimen, SpecimenError> + Send + Sync,
{
    /// Wrap closure
    #[inline]
    #[must_use]
    pub fn new(f: F) -> Self {
        Self { f }
    }
}

impl<F> fmt::Debug for FnBuilder<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnBuilder").finish_non_exhaustive()
    }
}

impl<F> SpecimenBuilder for FnBuilder<F>
where
    F: Fn(&Request, &dyn SpecimenContext) -> Result<Specimen, SpecimenError>
        + Send
        + Sync
        + 'static,
{
    fn create(
        &self,
        request: &Request,
        context: &dyn SpecimenContext,
    ) -> Result<Specimen, SpecimenError> {
        (self.f)(request, context)
    }
}

/// Action applied to a freshly created specimen
pub trait SpecimenCommand: CommandAsAny + Send + Sync + fmt::Debug {
    /// Mutate or inspect the specimen
    ///
    /// # Errors
    /// Hard failures while resolving values for the command.
    fn execute(
        &self,
        specimen: &mut Value,
        context: &dyn SpecimenContext,
    ) -> Result<(), SpecimenError>;
}

/// Shared command handle
pub type CommandRef = Arc<dyn SpecimenCommand>;

/// Upcast support for finding commands in a graph
pub trait CommandAsAny {
    /// Borrow as [`Any`]
    fn as_any(&self) -> &dyn Any;
}

impl<T: SpecimenCommand + 'static> CommandAsAny for T {
    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl<'a> dyn SpecimenCommand + 'a {
    /// Downcast to a concrete command type
    #[inline]
    #[must_use]
    pub fn downcast_ref<T: SpecimenCommand + 'static>(&self) -> Option<&T> {
        self.as_any().downcast_ref::<T>()
    }
}

/// Runs a command on every value the inner builder creates for requests
/// its specification accepts
#[derive(Debug, Clone)]
pub struct Postprocessor {
    builder: BuilderRef,
    command: CommandRef,
    specification: SpecificationRef,
}

impl Postprocessor {
    /// Postprocess every created value
    #[inline]
    #[must_use]
    pub fn new(builder: BuilderRef, command: CommandRef) -> Self {
        Self::with_specification(builder, command, Arc::new(TrueRequestSpecification))
    }

    /// Postprocess values created for requests the specification accepts
    #[inline]
    #[must_use]
    pub fn with_specification(
        builder: BuilderRef,
        command: CommandRef,
        specification: SpecificationRef,
    ) -> Self {
        Self {
            builder,
            command,
            specification,
        }
    }

    /// Inner builder
    #[inline]
    #[must_use]
    pub fn builder(&self) -> &BuilderRef {
        &self.builder
    }

    /// Command
    #[inline]
    #[must_use]
    pub fn command(&self) -> &CommandRef {
        &self.command
    }

    /// Requests whose values get postprocessed
    #[inline]
    #[must_use]
    pub fn specification(&self) -> &SpecificationRef {
        &self.specification
    }
}

impl SpecimenBuilder for Postprocessor {
    fn create(
        &self,
        request: &Request,
        context: &dyn SpecimenContext,
    ) -> Result<Specimen, SpecimenError> {
        match self.builder.create(request, context)? {
            Specimen::Created(mut value) if self.specification.is_satisfied_by(request) => {
                self.command.execute(&mut value, context)?;
                Ok(Specimen::Created(value))
            }
            other => Ok(other),
        }
    }

    fn as_node(&self) -> Option<&dyn BuilderNode> {
        Some(self)
    }
}

impl BuilderNode for Postprocessor {
    fn children(&self) -> Vec<BuilderRef> {
        vec![self.builder.clone()]
    }

    fn compose(&self, children: Vec<BuilderRef>) -> BuilderRef {
        Arc::new(Self::with_specification(
            CompositeSpecimenBuilder::compose_if_multiple(children),
            self.command.clone(),
            self.specification.clone(),
        ))
    }
}

/// Fails loudly when the inner builder declines a request it must handle
#[derive(Debug, Clone)]
pub struct NoSpecimenOutputGuard {
    builder: BuilderRef,
    specification: SpecificationRef,
}

impl NoSpecimenOutputGuard {
    /// Guard every request
    #[inline]
    #[must_use]
    pub fn new(builder: BuilderRef) -> Self {
        Self::with_specification(builder, Arc::new(TrueRequestSpecification))
    }

    /// Guard requests the specification accepts
    #[inline]
    #[must_use]
    pub fn with_specification(builder: BuilderRef, specification: SpecificationRef) -> Self {
        Self { builder, specification }
    }

    /// Inner builder
    #[inline]
    #[must_use]
    pub fn builder(&self) -> &BuilderRef {
        &self.builder
    }
}

impl SpecimenBuilder for NoSpecimenOutputGuard {
    fn create(
        &self,
        request: &Request,
        context: &dyn SpecimenContext,
    ) -> Result<Specimen, SpecimenError> {
        let result = self.builder.create(request, context)?;
        if result.is_no_specimen() && self.specification.is_satisfied_by(request) {
            return Err(SpecimenError::UnexpectedNoSpecimen {
                builder: format!("{:?}", self.builder),
                request: request.to_string(),
            });
        }
        Ok(result)
    }

    fn as_node(&self) -> Option<&dyn BuilderNode> {
        Some(self)
    }
}

impl BuilderNode for NoSpecimenOutputGuard {
    fn children(&self) -> Vec<BuilderRef> {
        vec![self.builder.clone()]
    }

    fn compose(&self, children: Vec<BuilderRef>) -> BuilderRef {
        Arc::new(Self::with_specification(
            CompositeSpecimenBuilder::compose_if_multiple(children),
            self.specification.clone(),
        ))
    }
}

/// Last builder of a graph: turns every request that reaches it into
/// [`SpecimenError::Unresolvable`]
#[derive(Debug, Clone, Copy, Default)]
pub struct TerminatingBuilder;

impl SpecimenBuilder for TerminatingBuilder {
    fn create(
        &self,
        request: &Request,
        _context: &dyn SpecimenContext,
    ) -> Result<Specimen, SpecimenError> {
        tracing::debug!(%request, "request reached the terminating builder");
        Err(SpecimenError::unresolvable(request))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::SpecimenContainer;
    use crate::type_ref::TypeRef;

    #[derive(Debug)]
    struct Increment;

    impl SpecimenCommand for Increment {
        fn execute(
            &self,
            specimen: &mut Value,
            _context: &dyn SpecimenContext,
        ) -> Result<(), SpecimenError> {
            if let Value::Int(i) = specimen {
                *i += 1;
            }
            Ok(())
        }
    }

    fn run(builder: BuilderRef, request: &Request) -> Result<Specimen, SpecimenError> {
        let container = SpecimenContainer::new(builder.clone());
        builder.create(request, &container)
    }

    fn int() -> Request {
        Request::of_type(TypeRef::i32())
    }

    #[test]
    fn fixed_builder_ignores_request() {
        let b: BuilderRef = Arc::new(FixedBuilder::new(Value::str("x")));
        assert_eq!(run(b.clone(), &int()).unwrap(), Specimen::created("x"));
        assert_eq!(run(b, &Request::many(int())).unwrap(), Specimen::created("x"));
    }

    #[test]
    fn postprocessor_runs_command_on_created_values() {
        let inner: BuilderRef = Arc::new(FixedBuilder::new(Value::Int(1)));
        let p: BuilderRef = Arc::new(Postprocessor::new(inner, Arc::new(Increment)));
        assert_eq!(run(p, &int()).unwrap(), Specimen::Created(Value::Int(2)));
    }

    #[test]
    fn command_is_found_by_type() {
        let inner: BuilderRef = Arc::new(FixedBuilder::new(Value::Int(1)));
        let p = Postprocessor::new(inner, Arc::new(Increment));
        assert!(p.command().downcast_ref::<Increment>().is_some());
    }

    #[test]
    fn postprocessor_skips_sentinels() {
        let inner: BuilderRef = Arc::new(FnBuilder::new(|_, _| Ok(Specimen::NoSpecimen)));
        let p: BuilderRef = Arc::new(Postprocessor::new(inner, Arc::new(Increment)));
        assert_eq!(run(p, &int()).unwrap(), Specimen::NoSpecimen);
    }

    #[test]
    fn output_guard_rejects_declines() {
        let inner: BuilderRef = Arc::new(FnBuilder::new(|_, _| Ok(Specimen::NoSpecimen)));
        let g: BuilderRef = Arc::new(NoSpecimenOutputGuard::new(inner));
        assert!(matches!(
            run(g, &int()),
            Err(SpecimenError::UnexpectedNoSpecimen { .. })
        ));
    }

    #[test]
    fn output_guard_respects_specification() {
        let inner: BuilderRef = Arc::new(FnBuilder::new(|_, _| Ok(Specimen::NoSpecimen)));
        let g: BuilderRef = Arc::new(NoSpecimenOutputGuard::with_specification(
            inner,
            Arc::new(crate::specification::FalseRequestSpecification),
        ));
        assert_eq!(run(g, &int()).unwrap(), Specimen::NoSpecimen);
    }

    #[test]
    fn terminator_fails_every_request() {
        let t: BuilderRef = Arc::new(TerminatingBuilder);
        let err = run(t, &int()).unwrap_err();
        assert!(err.to_string().contains("i32"));
    }
}
