//! Graph-wide behaviors
//!
//! A behavior is a transformation of a whole builder graph applied once when
//! the graph is composed, e.g. wrapping it in a [`RecursionGuard`]. The
//! result must be a builder node; [`apply_transformation`] enforces that.

use crate::builder::BuilderRef;
use crate::error::SpecimenError;
use crate::recursion::{
    ComparerRef, HandlerRef, NullRecursionHandler, OmitOnRecursionHandler, RecursionGuard,
    ThrowingRecursionHandler,
};
use crate::specification::SpecificationRef;
use crate::trace::{SinkRef, TracingBuilder};
use std::fmt;
use std::sync::Arc;

/// Transformation of a builder graph
pub trait SpecimenBuilderTransformation: Send + Sync + fmt::Debug {
    /// Produce the transformed graph
    ///
    /// # Errors
    /// Transformation-specific failures.
    fn transform(&self, builder: BuilderRef) -> Result<BuilderRef, SpecimenError>;
}

/// Shared transformation handle
pub type TransformationRef = Arc<dyn SpecimenBuilderTransformation>;

/// Apply a transformation and require a node back
///
/// # Errors
/// [`SpecimenError::NotANode`] when the transformation returned a leaf
/// builder, or whatever the transformation itself fails with.
pub fn apply_transformation(
    transformation: &dyn SpecimenBuilderTransformation,
    graph: BuilderRef,
) -> Result<BuilderRef, SpecimenError> {
    let transformed = transformation.transform(graph)?;
    if !transformed.is_node() {
        return Err(SpecimenError::NotANode {
            transformation: format!("{transformation:?}"),
        });
    }
    Ok(transformed)
}

fn guard(
    builder: BuilderRef,
    handler: HandlerRef,
    comparer: Option<&ComparerRef>,
    depth: usize,
) -> Result<BuilderRef, SpecimenError> {
    let mut guard = RecursionGuard::with_handler(builder, handler).with_recursion_depth(depth)?;
    if let Some(comparer) = comparer {
        guard = guard.with_comparer(comparer.clone());
    }
    Ok(Arc::new(guard))
}

macro_rules! recursion_behavior {
    ($(#[$doc:meta])* $name:ident, $handler:expr) => {
        $(#[$doc])*
        #[derive(Debug, Clone)]
        pub struct $name {
            recursion_depth: usize,
            comparer: Option<ComparerRef>,
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl $name {
            /// Handle the first repeated request
            #[inline]
            #[must_use]
            pub fn new() -> Self {
                Self {
                    recursion_depth: 1,
                    comparer: None,
                }
            }

            /// Tolerate `depth` equal in-flight requests before handling
            #[inline]
            #[must_use]
            pub fn with_recursion_depth(mut self, depth: usize) -> Self {
                self.recursion_depth = depth;
                self
            }

            /// Detect repeats with a custom comparer
            #[inline]
            #[must_use]
            pub fn with_comparer(mut self, comparer: ComparerRef) -> Self {
                self.comparer = Some(comparer);
                self
            }
        }

        impl SpecimenBuilderTransformation for $name {
            fn transform(&self, builder: BuilderRef) -> Result<BuilderRef, SpecimenError> {
                guard(builder, Arc::new($handler), self.comparer.as_ref(), self.recursion_depth)
            }
        }
    };
}

recursion_behavior!(
    /// Wraps the graph in a recursion guard that fails on cycles
    ThrowingRecursionBehavior,
    ThrowingRecursionHandler
);

recursion_behavior!(
    /// Wraps the graph in a recursion guard that resolves cycles to null
    NullRecursionBehavior,
    NullRecursionHandler
);

recursion_behavior!(
    /// Wraps the graph in a recursion guard that omits recursive members
    OmitOnRecursionBehavior,
    OmitOnRecursionHandler
);

/// Wraps the graph in a [`TracingBuilder`]
#[derive(Debug, Clone)]
pub struct TracingBehavior {
    sink: SinkRef,
    filter: Option<SpecificationRef>,
}

impl TracingBehavior {
    /// Trace every request into `sink`
    #[inline]
    #[must_use]
    pub fn new(sink: SinkRef) -> Self {
        Self { sink, filter: None }
    }

    /// Only trace requests the filter accepts
    #[inline]
    #[must_use]
    pub fn with_filter(mut self, filter: SpecificationRef) -> Self {
        self.filter = Some(filter);
        self
    }
}

impl SpecimenBuilderTransformation for TracingBehavior {
    fn transform(&self, builder: BuilderRef) -> Result<BuilderRef, SpecimenError> {
        let mut traced = TracingBuilder::new(builder, self.sink.clone());
        if let Some(filter) = &self.filter {
            traced = traced.with_filter(filter.clone());
        }
        Ok(Arc::new(traced))
    }
}

/// Adapts a closure into a transformation
pub struct FnTransformation<F> {
    f: F,
}

impl<F> FnTransformation<F>
where
    F: Fn(BuilderRef) -> Result<BuilderRef, SpecimenError> + Send + Sync,
{
    /// Wrap closure
    #[inline]
    #[must_use]
    pub fn new(f: F) -> Self {
        Self { f }
    }
}

impl<F> fmt::Debug for FnTransformation<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnTransformation").finish_non_exhaustive()
    }
}

impl<F> SpecimenBuilderTransformation for FnTransformation<F>
where
    F: Fn(BuilderRef) -> Result<BuilderRef, SpecimenError> + Send + Sync,
{
    fn transform(&self, builder: BuilderRef) -> Result<BuilderRef, SpecimenError> {
        (self.f)(builder)
    }
}
