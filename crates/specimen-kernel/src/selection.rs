//! Constructor and factory selection
//!
//! A [`MethodQuery`] orders the candidate factories of a type; the
//! [`crate::invoker::MethodInvoker`] tries them in that order.

use crate::catalog::{Method, TypeShape};
use crate::type_ref::{TypeRef, LIST, SEQ, SET};
use std::fmt;
use std::sync::Arc;

/// Ordering strategy over the factories of a type
pub trait MethodQuery: Send + Sync + fmt::Debug {
    /// Candidate factories, most preferred first
    fn select_methods(&self, shape: &TypeShape) -> Vec<Method>;
}

/// Shared query handle
pub type QueryRef = Arc<dyn MethodQuery>;

/// Fewest parameters first
#[derive(Debug, Clone, Copy, Default)]
pub struct ModestConstructorQuery;

impl MethodQuery for ModestConstructorQuery {
    fn select_methods(&self, shape: &TypeShape) -> Vec<Method> {
        let mut methods = shape.constructors().to_vec();
        methods.sort_by_key(Method::arity);
        methods
    }
}

/// Most parameters first
#[derive(Debug, Clone, Copy, Default)]
pub struct GreedyConstructorQuery;

impl MethodQuery for GreedyConstructorQuery {
    fn select_methods(&self, shape: &TypeShape) -> Vec<Method> {
        let mut methods = shape.constructors().to_vec();
        methods.sort_by_key(|m| std::cmp::Reverse(m.arity()));
        methods
    }
}

/// Prefers factories taking a sequence of the element type
///
/// `Seq<T>`, `List<T>` and `Set<T>` parameters all count as sequences.
/// Only types with exactly one generic argument get a preference; for any
/// other type every candidate scores zero and the fallback order stands.
/// Ties keep the fallback order (modest by default).
#[derive(Debug, Clone)]
pub struct SequenceFavoringConstructorQuery {
    sequence_definitions: Vec<String>,
    fallback: QueryRef,
}

impl Default for SequenceFavoringConstructorQuery {
    fn default() -> Self {
        Self::new()
    }
}

impl SequenceFavoringConstructorQuery {
    /// Favor `Seq<T>`, `List<T>` and `Set<T>` parameters, ties broken modestly
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self {
            sequence_definitions: vec![SEQ.to_string(), LIST.to_string(), SET.to_string()],
            fallback: Arc::new(ModestConstructorQuery),
        }
    }

    /// Also favor parameters of another single-argument definition, e.g. `Queue`
    #[must_use]
    pub fn with_target(mut self, definition: impl Into<String>) -> Self {
        self.sequence_definitions.push(definition.into());
        self
    }

    /// Break ties with a different query
    #[inline]
    #[must_use]
    pub fn with_fallback(mut self, fallback: QueryRef) -> Self {
        self.fallback = fallback;
        self
    }

    /// Number of parameters accepting a sequence of the element type
    #[must_use]
    pub fn score(&self, method: &Method, requested: &TypeRef) -> usize {
        let Some(element) = requested.single_arg() else {
            return 0;
        };
        method
            .parameters()
            .iter()
            .filter(|p| self.accepts_sequence_of(&p.type_ref, element))
            .count()
    }

    fn accepts_sequence_of(&self, parameter: &TypeRef, element: &TypeRef) -> bool {
        parameter.single_arg() == Some(element)
            && parameter
                .name()
                .is_some_and(|name| self.sequence_definitions.iter().any(|d| d == name))
    }
}

impl MethodQuery for SequenceFavoringConstructorQuery {
    fn select_methods(&self, shape: &TypeShape) -> Vec<Method> {
        let mut methods = self.fallback.select_methods(shape);
        // stable sort keeps the fallback order among equal scores
        methods.sort_by_key(|m| std::cmp::Reverse(self.score(m, shape.type_ref())));
        methods
    }
}

/// Concatenates the candidates of several queries in priority order
#[derive(Debug, Clone, Default)]
pub struct CompositeMethodQuery {
    queries: Vec<QueryRef>,
}

impl CompositeMethodQuery {
    /// Create composite over queries, highest priority first
    #[inline]
    #[must_use]
    pub fn new(queries: Vec<QueryRef>) -> Self {
        Self { queries }
    }

    /// Inner queries
    #[inline]
    #[must_use]
    pub fn queries(&self) -> &[QueryRef] {
        &self.queries
    }
}

impl MethodQuery for CompositeMethodQuery {
    fn select_methods(&self, shape: &TypeShape) -> Vec<Method> {
        self.queries.iter().flat_map(|q| q.select_methods(shape)).collect()
    }
}

/// Only the factories named `name`, in registration order
#[derive(Debug, Clone)]
pub struct FactoryMethodQuery {
    name: String,
}

impl FactoryMethodQuery {
    /// Select factories by name
    #[inline]
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl MethodQuery for FactoryMethodQuery {
    fn select_methods(&self, shape: &TypeShape) -> Vec<Method> {
        shape
            .constructors()
            .iter()
            .filter(|m| m.name() == self.name)
            .cloned()
            .collect()
    }
}
