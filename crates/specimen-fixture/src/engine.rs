//! Default engine
//!
//! The engine is the part of the fixture graph that knows how to create
//! values without any customization: primitive generators, relays that
//! translate structural requests, and a constructor invoker for catalogued
//! types.

use crate::generators::{
    BooleanSwitch, CharSequenceGenerator, NumericSequenceGenerator, StringGenerator, UuidGenerator,
};
use crate::relays::{
    FiniteSequenceRelay, MapRelay, MemberRequestRelay, OmitSequenceParameterRelay, OptionRelay,
    SeedIgnoringRelay, SequenceRelay, StringSeedRelay,
};
use specimen_kernel::catalog::CatalogRef;
use specimen_kernel::invoker::MethodInvoker;
use specimen_kernel::selection::{ModestConstructorQuery, QueryRef};
use specimen_kernel::{BuilderRef, CompositeSpecimenBuilder};
use std::sync::Arc;

/// Builders making up the default engine, in resolution order
#[derive(Debug, Clone)]
pub struct DefaultEngineParts {
    catalog: CatalogRef,
    query: QueryRef,
}

impl DefaultEngineParts {
    /// Engine parts for a catalog, constructing objects with their most
    /// modest constructor
    #[inline]
    #[must_use]
    pub fn new(catalog: CatalogRef) -> Self {
        Self {
            catalog,
            query: Arc::new(ModestConstructorQuery),
        }
    }

    /// With a different default constructor query
    #[inline]
    #[must_use]
    pub fn with_query(mut self, query: QueryRef) -> Self {
        self.query = query;
        self
    }

    /// Instantiate the parts
    #[must_use]
    pub fn builders(&self) -> Vec<BuilderRef> {
        vec![
            Arc::new(NumericSequenceGenerator::new()),
            Arc::new(BooleanSwitch::new()),
            Arc::new(CharSequenceGenerator::new()),
            Arc::new(StringGenerator),
            Arc::new(UuidGenerator),
            Arc::new(StringSeedRelay),
            Arc::new(SequenceRelay),
            Arc::new(MapRelay),
            Arc::new(OptionRelay),
            Arc::new(FiniteSequenceRelay),
            Arc::new(MethodInvoker::new(self.query.clone(), self.catalog.clone())),
            Arc::new(OmitSequenceParameterRelay),
            Arc::new(MemberRequestRelay),
            Arc::new(SeedIgnoringRelay),
        ]
    }

    /// The parts as one composite builder
    #[must_use]
    pub fn into_engine(self) -> BuilderRef {
        Arc::new(CompositeSpecimenBuilder::new(self.builders()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use specimen_kernel::catalog::TypeCatalog;
    use specimen_kernel::{Request, SpecimenContainer, TypeRef, Value};

    #[test]
    fn engine_resolves_primitives_and_members() {
        let engine = DefaultEngineParts::new(Arc::new(TypeCatalog::new())).into_engine();
        let container = SpecimenContainer::new(engine);

        assert_eq!(container.create(&Request::of_type(TypeRef::i32())).unwrap(), Value::Int(1));
        let name = container.create(&Request::parameter("name", TypeRef::string())).unwrap();
        assert!(name.as_str().is_some_and(|s| s.starts_with("name") && s.len() > "name".len()));
        let flag = container.create(&Request::field("flag", TypeRef::bool())).unwrap();
        assert_eq!(flag, Value::Bool(true));
    }

    #[test]
    fn engine_declines_unknown_types() {
        let engine = DefaultEngineParts::new(Arc::new(TypeCatalog::new())).into_engine();
        let container = SpecimenContainer::new(engine);
        assert!(container.create(&Request::of_type(TypeRef::named("Unknown"))).is_err());
    }
}
