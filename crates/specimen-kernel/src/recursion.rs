//! Recursion guard
//!
//! [`RecursionGuard`] decorates a builder and keeps the stack of requests in
//! flight on the current call path. A request equal (per the configured
//! [`RequestComparer`]) to one already on the stack is not resolved again;
//! the configured [`RecursionHandler`] decides what it resolves to instead.

use crate::builder::{BuilderNode, BuilderRef, CompositeSpecimenBuilder, SpecimenBuilder};
use crate::call_stack::CallStack;
use crate::context::SpecimenContext;
use crate::error::SpecimenError;
use crate::request::Request;
use crate::specimen::Specimen;
use crate::value::Value;
use std::fmt;
use std::sync::Arc;

/// Equality used to detect a repeated request
pub trait RequestComparer: Send + Sync + fmt::Debug {
    /// Check whether two requests are the same for recursion purposes
    fn equals(&self, a: &Request, b: &Request) -> bool;
}

/// Shared comparer handle
pub type ComparerRef = Arc<dyn RequestComparer>;

/// Value equality of requests
#[derive(Debug, Clone, Copy, Default)]
pub struct EqualityComparer;

impl RequestComparer for EqualityComparer {
    fn equals(&self, a: &Request, b: &Request) -> bool {
        a == b
    }
}

/// Adapts a closure into a comparer
pub struct FnComparer<F> {
    f: F,
}

impl<F> FnComparer<F>
where
    F: Fn(&Request, &Request) -> bool + Send + Sync,
{
    /// Wrap closure
    #[inline]
    #[must_use]
    pub fn new(f: F) -> Self {
        Self { f }
    }
}

impl<F> fmt::Debug for FnComparer<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnComparer").finish_non_exhaustive()
    }
}

impl<F> RequestComparer for FnComparer<F>
where
    F: Fn(&Request, &Request) -> bool + Send + Sync,
{
    fn equals(&self, a: &Request, b: &Request) -> bool {
        (self.f)(a, b)
    }
}

/// Policy deciding what a recursive request resolves to
pub trait RecursionHandler: Send + Sync + fmt::Debug {
    /// Handle `request`, which repeats one of `recorded` (outermost first)
    ///
    /// # Errors
    /// Policies that treat recursion as a failure.
    fn handle_recursive_request(
        &self,
        request: &Request,
        recorded: &[Request],
    ) -> Result<Specimen, SpecimenError>;
}

/// Shared handler handle
pub type HandlerRef = Arc<dyn RecursionHandler>;

/// Fails with [`SpecimenError::CircularReference`] listing the cyclic path
#[derive(Debug, Clone, Copy, Default)]
pub struct ThrowingRecursionHandler;

impl RecursionHandler for ThrowingRecursionHandler {
    fn handle_recursive_request(
        &self,
        request: &Request,
        recorded: &[Request],
    ) -> Result<Specimen, SpecimenError> {
        let path: Vec<String> = recorded
            .iter()
            .chain(std::iter::once(request))
            .map(ToString::to_string)
            .collect();
        tracing::warn!(%request, path = %path.join(" --> "), "circular reference detected");
        Err(SpecimenError::CircularReference {
            request: request.to_string(),
            path,
        })
    }
}

/// Resolves recursive requests to [`Value::Null`]
#[derive(Debug, Clone, Copy, Default)]
pub struct NullRecursionHandler;

impl RecursionHandler for NullRecursionHandler {
    fn handle_recursive_request(
        &self,
        request: &Request,
        _recorded: &[Request],
    ) -> Result<Specimen, SpecimenError> {
        tracing::debug!(%request, "recursive request resolved to null");
        Ok(Specimen::Created(Value::Null))
    }
}

/// Resolves recursive requests to [`Specimen::Omitted`]
#[derive(Debug, Clone, Copy, Default)]
pub struct OmitOnRecursionHandler;

impl RecursionHandler for OmitOnRecursionHandler {
    fn handle_recursive_request(
        &self,
        request: &Request,
        _recorded: &[Request],
    ) -> Result<Specimen, SpecimenError> {
        tracing::debug!(%request, "recursive request omitted");
        Ok(Specimen::Omitted)
    }
}

/// Cycle-detecting decorator
///
/// The request stack is kept per thread, so one guard can serve concurrent
/// resolutions of a shared graph. Frames are popped on every exit path.
#[derive(Debug)]
pub struct RecursionGuard {
    builder: BuilderRef,
    handler: HandlerRef,
    comparer: ComparerRef,
    recursion_depth: usize,
    stack: CallStack<Request>,
}

impl RecursionGuard {
    /// Guard with the throwing policy and value equality
    #[inline]
    #[must_use]
    pub fn new(builder: BuilderRef) -> Self {
        Self::with_handler(builder, Arc::new(ThrowingRecursionHandler))
    }

    /// Guard with a specific policy
    #[inline]
    #[must_use]
    pub fn with_handler(builder: BuilderRef, handler: HandlerRef) -> Self {
        Self {
            builder,
            handler,
            comparer: Arc::new(EqualityComparer),
            recursion_depth: 1,
            stack: CallStack::new(),
        }
    }

    /// Replace the request comparer
    #[inline]
    #[must_use]
    pub fn with_comparer(mut self, comparer: ComparerRef) -> Self {
        self.comparer = comparer;
        self
    }

    /// Number of equal in-flight requests tolerated before the handler runs
    ///
    /// # Errors
    /// [`SpecimenError::InvalidArgument`] when `depth` is zero.
    pub fn with_recursion_depth(mut self, depth: usize) -> Result<Self, SpecimenError> {
        if depth == 0 {
            return Err(SpecimenError::invalid_argument(
                "recursion_depth",
                "recursion depth must be at least 1",
            ));
        }
        self.recursion_depth = depth;
        Ok(self)
    }

    /// Inner builder
    #[inline]
    #[must_use]
    pub fn builder(&self) -> &BuilderRef {
        &self.builder
    }

    /// Recursion policy
    #[inline]
    #[must_use]
    pub fn handler(&self) -> &HandlerRef {
        &self.handler
    }

    /// Request comparer
    #[inline]
    #[must_use]
    pub fn comparer(&self) -> &ComparerRef {
        &self.comparer
    }

    /// Tolerated number of equal in-flight requests
    #[inline]
    #[must_use]
    pub fn recursion_depth(&self) -> usize {
        self.recursion_depth
    }

    /// Requests in flight on the calling thread, outermost first
    #[must_use]
    pub fn recorded_requests(&self) -> Vec<Request> {
        self.stack.snapshot()
    }
}

impl SpecimenBuilder for RecursionGuard {
    fn create(
        &self,
        request: &Request,
        context: &dyn SpecimenContext,
    ) -> Result<Specimen, SpecimenError> {
        let repeats = self.stack.count(|seen| self.comparer.equals(seen, request));
        if repeats >= self.recursion_depth {
            let recorded = self.stack.snapshot();
            return self.handler.handle_recursive_request(request, &recorded);
        }

        let _frame = self.stack.push(request.clone());
        self.builder.create(request, context)
    }

    fn as_node(&self) -> Option<&dyn BuilderNode> {
        Some(self)
    }
}

impl BuilderNode for RecursionGuard {
    fn children(&self) -> Vec<BuilderRef> {
        vec![self.builder.clone()]
    }

    fn compose(&self, children: Vec<BuilderRef>) -> BuilderRef {
        Arc::new(Self {
            builder: CompositeSpecimenBuilder::compose_if_multiple(children),
            handler: self.handler.clone(),
            comparer: self.comparer.clone(),
            recursion_depth: self.recursion_depth,
            stack: CallStack::new(),
        })
    }
}
