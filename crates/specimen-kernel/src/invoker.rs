//! Factory-invoking builder

use crate::builder::SpecimenBuilder;
use crate::catalog::{CatalogRef, Method};
use crate::context::SpecimenContext;
use crate::error::SpecimenError;
use crate::request::Request;
use crate::selection::QueryRef;
use crate::specimen::Specimen;
use crate::value::Value;

/// Creates instances of catalogued types by invoking the first candidate
/// factory whose every parameter resolves
///
/// A candidate is abandoned as soon as one of its parameters resolves to
/// [`Specimen::NoSpecimen`] or [`Specimen::Omitted`]; factories are never
/// called with a partial argument list.
#[derive(Debug, Clone)]
pub struct MethodInvoker {
    query: QueryRef,
    catalog: CatalogRef,
}

impl MethodInvoker {
    /// Create invoker
    #[inline]
    #[must_use]
    pub fn new(query: QueryRef, catalog: CatalogRef) -> Self {
        Self { query, catalog }
    }

    /// Candidate ordering
    #[inline]
    #[must_use]
    pub fn query(&self) -> &QueryRef {
        &self.query
    }

    /// Catalog the invoker reads shapes from
    #[inline]
    #[must_use]
    pub fn catalog(&self) -> &CatalogRef {
        &self.catalog
    }

    fn resolve_arguments(
        &self,
        method: &Method,
        context: &dyn SpecimenContext,
    ) -> Result<Option<Vec<Value>>, SpecimenError> {
        let mut args = Vec::with_capacity(method.arity());
        for parameter in method.parameters() {
            let request = Request::parameter(parameter.name.clone(), parameter.type_ref.clone());
            match context.resolve(&request)? {
                Specimen::Created(value) => args.push(value),
                other => {
                    tracing::trace!(
                        %method,
                        parameter = %parameter,
                        outcome = %other,
                        "abandoning candidate"
                    );
                    return Ok(None);
                }
            }
        }
        Ok(Some(args))
    }
}

impl SpecimenBuilder for MethodInvoker {
    fn create(
        &self,
        request: &Request,
        context: &dyn SpecimenContext,
    ) -> Result<Specimen, SpecimenError> {
        let Some(type_ref) = request.as_type() else {
            return Ok(Specimen::NoSpecimen);
        };
        let Some(shape) = self.catalog.shape_of(type_ref) else {
            return Ok(Specimen::NoSpecimen);
        };

        for method in self.query.select_methods(&shape) {
            let Some(args) = self.resolve_arguments(&method, context)? else {
                continue;
            };
            let value = method.invoke(None, &args).map_err(|source| SpecimenError::Invocation {
                method: method.to_string(),
                source,
            })?;
            return Ok(Specimen::Created(value));
        }
        Ok(Specimen::NoSpecimen)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::{BuilderRef, CompositeSpecimenBuilder};
    use crate::builders::FnBuilder;
    use crate::catalog::{Parameter, TypeCatalog, TypeShape};
    use crate::context::SpecimenContainer;
    use crate::error::InvocationError;
    use crate::selection::{GreedyConstructorQuery, ModestConstructorQuery};
    use crate::type_ref::TypeRef;
    use crate::value::Object;
    use parking_lot::Mutex;
    use std::sync::Arc;

    fn point() -> TypeRef {
        TypeRef::named("Point")
    }

    fn catalog() -> CatalogRef {
        let shape = TypeShape::new(point())
            .with_constructor(Method::record(point(), vec![Parameter::new("x", TypeRef::i32())]))
            .with_constructor(Method::record(
                point(),
                vec![
                    Parameter::new("x", TypeRef::i32()),
                    Parameter::new("label", TypeRef::string()),
                ],
            ));
        Arc::new(TypeCatalog::new().with_shape(shape).unwrap())
    }

    /// Resolves i32 parameters to 5 and declines everything else
    fn ints_only() -> BuilderRef {
        Arc::new(FnBuilder::new(|request, _| match request {
            Request::Member(m) if m.type_ref == TypeRef::i32() => Ok(Specimen::created(5)),
            _ => Ok(Specimen::NoSpecimen),
        }))
    }

    fn graph(query: QueryRef, values: BuilderRef) -> SpecimenContainer {
        let invoker: BuilderRef = Arc::new(MethodInvoker::new(query, catalog()));
        SpecimenContainer::new(Arc::new(CompositeSpecimenBuilder::new(vec![invoker, values])))
    }

    #[test]
    fn invokes_first_fully_resolved_candidate() {
        let container = graph(Arc::new(ModestConstructorQuery), ints_only());
        let value = container.create(&Request::of_type(point())).unwrap();
        assert_eq!(value, Value::Object(Object::new(point()).with_field("x", Value::Int(5))));
    }

    #[test]
    fn abandons_candidates_with_unresolvable_parameters() {
        // Greedy tries (x, label) first; label never resolves
        let container = graph(Arc::new(GreedyConstructorQuery), ints_only());
        let value = container.create(&Request::of_type(point())).unwrap();
        assert_eq!(value.as_object().unwrap().fields.len(), 1);
    }

    #[test]
    fn omitted_parameter_abandons_candidate() {
        let omit_members: BuilderRef = Arc::new(FnBuilder::new(|request, _| match request {
            Request::Member(_) => Ok(Specimen::Omitted),
            _ => Ok(Specimen::NoSpecimen),
        }));
        let container = graph(Arc::new(ModestConstructorQuery), omit_members);
        assert_eq!(
            container.resolve(&Request::of_type(point())).unwrap(),
            Specimen::NoSpecimen
        );
    }

    #[test]
    fn never_invokes_with_partial_arguments() {
        let calls = Arc::new(Mutex::new(0));
        let counter = calls.clone();
        let t = TypeRef::named("Strict");
        let shape = TypeShape::new(t.clone()).with_constructor(Method::constructor(
            t.clone(),
            vec![Parameter::new("a", TypeRef::i32()), Parameter::new("b", TypeRef::string())],
            move |_| {
                *counter.lock() += 1;
                Ok(Value::Null)
            },
        ));
        let catalog = Arc::new(TypeCatalog::new().with_shape(shape).unwrap());
        let invoker: BuilderRef =
            Arc::new(MethodInvoker::new(Arc::new(ModestConstructorQuery), catalog));
        let graph = CompositeSpecimenBuilder::new(vec![invoker, ints_only()]);
        let container = SpecimenContainer::new(Arc::new(graph));

        assert_eq!(container.resolve(&Request::of_type(t)).unwrap(), Specimen::NoSpecimen);
        assert_eq!(*calls.lock(), 0);
    }

    #[test]
    fn factory_failure_is_reported() {
        let t = TypeRef::named("Broken");
        let broken = Method::constructor(t.clone(), vec![], |_| {
            Err(InvocationError::Failed("boom".to_string()))
        });
        let shape = TypeShape::new(t.clone()).with_constructor(broken);
        let catalog = Arc::new(TypeCatalog::new().with_shape(shape).unwrap());
        let invoker = MethodInvoker::new(Arc::new(ModestConstructorQuery), catalog);
        let container = SpecimenContainer::new(Arc::new(invoker));

        let err = container.create(&Request::of_type(t)).unwrap_err();
        assert!(matches!(err, SpecimenError::Invocation { .. }));
        assert!(err.to_string().contains("Broken::new()"));
    }

    #[test]
    fn declines_unknown_types_and_non_type_requests() {
        let container = graph(Arc::new(ModestConstructorQuery), ints_only());
        assert_eq!(
            container.resolve(&Request::of_type(TypeRef::named("Other"))).unwrap(),
            Specimen::NoSpecimen
        );
        assert_eq!(
            container.resolve(&Request::property("p", point())).unwrap(),
            Specimen::NoSpecimen
        );
    }
}
