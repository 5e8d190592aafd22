//! Specimen Kernel (specimen-kernel)
//!
//! Resolution engine that synthesizes test values ("specimens") on demand:
//! 1. **Model**: requests, specimens and the value/type model
//! 2. **Builders**: composable resolution units arranged in a rewritable tree
//! 3. **Guards**: recursion detection with pluggable policies
//! 4. **Selection**: ordering and invocation of catalogued factories
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use specimen_kernel::prelude::*;
//!
//! let query = Arc::new(ModestConstructorQuery);
//! let invoker: BuilderRef = Arc::new(MethodInvoker::new(query, catalog));
//! let graph: BuilderRef = Arc::new(RecursionGuard::new(invoker));
//!
//! let container = SpecimenContainer::new(graph);
//! let point = container.create(&Request::of_type(TypeRef::named("Point")))?;
//! ```

// Model
pub mod error;
pub mod request;
pub mod specimen;
pub mod type_ref;
pub mod value;

// Builders and graphs
pub mod builder;
pub mod builders;
pub mod context;
pub mod node;
pub mod specification;

// Resolution state and policies
pub mod behavior;
pub mod call_stack;
pub mod recursion;
pub mod trace;

// Factories
pub mod catalog;
pub mod invoker;
pub mod selection;

// Re-exports
pub use builder::{
    AsAny, BuilderNode, BuilderRef, CompositeSpecimenBuilder, FilteringSpecimenBuilder,
    SpecimenBuilder,
};
pub use context::{SpecimenContainer, SpecimenContext};
pub use error::*;
pub use request::*;
pub use specimen::Specimen;
pub use type_ref::TypeRef;
pub use value::{Object, Value};

/// Re-export of the commonly used surface
pub mod prelude {
    pub use crate::behavior::{
        apply_transformation, NullRecursionBehavior, OmitOnRecursionBehavior,
        SpecimenBuilderTransformation, ThrowingRecursionBehavior, TracingBehavior,
        TransformationRef,
    };
    pub use crate::builder::{
        BuilderNode, BuilderRef, CompositeSpecimenBuilder, FilteringSpecimenBuilder,
        SpecimenBuilder,
    };
    pub use crate::builders::{
        FixedBuilder, FnBuilder, NoSpecimenOutputGuard, Postprocessor, SpecimenCommand,
        TerminatingBuilder,
    };
    pub use crate::catalog::{
        CatalogRef, Method, MethodKind, Parameter, Property, TypeCatalog, TypeShape,
    };
    pub use crate::context::{SpecimenContainer, SpecimenContext};
    pub use crate::error::{FailureKind, InvocationError, SpecimenError};
    pub use crate::invoker::MethodInvoker;
    pub use crate::node::{
        find_node, parents, replace_children, replace_node, replace_nodes, select_nodes,
    };
    pub use crate::recursion::{RecursionGuard, RecursionHandler, RequestComparer};
    pub use crate::request::Request;
    pub use crate::selection::{
        CompositeMethodQuery, GreedyConstructorQuery, MethodQuery, ModestConstructorQuery, QueryRef,
        SequenceFavoringConstructorQuery,
    };
    pub use crate::specification::{RequestSpecification, SpecificationExt, SpecificationRef};
    pub use crate::specimen::Specimen;
    pub use crate::trace::{TraceSink, TracingBuilder};
    pub use crate::type_ref::TypeRef;
    pub use crate::value::{Object, Value};
    pub use std::sync::Arc;
}

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
