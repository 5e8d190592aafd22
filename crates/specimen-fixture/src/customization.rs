//! Customizations
//!
//! A [`Customization`] changes how a [`Fixture`] resolves some requests.
//! Every customization here inserts its builder at the front of the
//! fixture's customization list, so the most recently applied one wins.

use crate::error::Result;
use crate::fixture::Fixture;
use specimen_kernel::builders::{FixedBuilder, FnBuilder};
use specimen_kernel::invoker::MethodInvoker;
use specimen_kernel::selection::QueryRef;
use specimen_kernel::specification::{
    ExactTypeSpecification, OrRequestSpecification, SeedRequestSpecification,
};
use specimen_kernel::{
    BuilderRef, FilteringSpecimenBuilder, Request, SpecimenContext, SpecimenError, Specimen,
    TypeRef, Value,
};
use std::fmt;
use std::sync::Arc;

/// Unit of fixture configuration
pub trait Customization: fmt::Debug {
    /// Apply to the fixture
    ///
    /// # Errors
    /// Failures while resolving values the customization needs up front.
    fn customize(&self, fixture: &mut Fixture) -> Result<()>;
}

/// Builder that only answers plain and seeded requests for `target`
fn for_type(builder: BuilderRef, target: &TypeRef) -> BuilderRef {
    let specification = OrRequestSpecification::new(vec![
        Arc::new(ExactTypeSpecification::new(target.clone())),
        Arc::new(SeedRequestSpecification::new(target.clone())),
    ]);
    Arc::new(FilteringSpecimenBuilder::new(builder, Arc::new(specification)))
}

/// Always answers a type with one fixed value
#[derive(Debug, Clone)]
pub struct InjectCustomization {
    target: TypeRef,
    value: Value,
}

impl InjectCustomization {
    /// Create for type and value
    #[inline]
    #[must_use]
    pub fn new(target: TypeRef, value: Value) -> Self {
        Self { target, value }
    }
}

impl Customization for InjectCustomization {
    fn customize(&self, fixture: &mut Fixture) -> Result<()> {
        let builder = for_type(Arc::new(FixedBuilder::new(self.value.clone())), &self.target);
        fixture.insert_customization(builder);
        Ok(())
    }
}

/// Resolves a type once and answers every later request for it with that
/// same value
#[derive(Debug, Clone)]
pub struct FreezingCustomization {
    target: TypeRef,
}

impl FreezingCustomization {
    /// Create for type
    #[inline]
    #[must_use]
    pub fn new(target: TypeRef) -> Self {
        Self { target }
    }

    /// Frozen type
    #[inline]
    #[must_use]
    pub fn target(&self) -> &TypeRef {
        &self.target
    }
}

impl Customization for FreezingCustomization {
    fn customize(&self, fixture: &mut Fixture) -> Result<()> {
        let value = fixture.create(&self.target)?;
        InjectCustomization::new(self.target.clone(), value).customize(fixture)
    }
}

/// Constructs one type with a different constructor query
#[derive(Debug, Clone)]
pub struct ConstructorCustomization {
    target: TypeRef,
    query: QueryRef,
}

impl ConstructorCustomization {
    /// Create for type and query
    #[inline]
    #[must_use]
    pub fn new(target: TypeRef, query: QueryRef) -> Self {
        Self { target, query }
    }
}

impl Customization for ConstructorCustomization {
    fn customize(&self, fixture: &mut Fixture) -> Result<()> {
        let invoker = Arc::new(MethodInvoker::new(self.query.clone(), fixture.catalog().clone()));
        let builder = Arc::new(FilteringSpecimenBuilder::new(
            invoker,
            Arc::new(ExactTypeSpecification::new(self.target.clone())),
        ));
        fixture.insert_customization(builder);
        Ok(())
    }
}

/// Factory closure type
pub type FactoryFn =
    Arc<dyn Fn(&dyn SpecimenContext) -> std::result::Result<Value, SpecimenError> + Send + Sync>;

/// Creates one type with a closure
#[derive(Clone)]
pub struct FactoryCustomization {
    target: TypeRef,
    factory: FactoryFn,
}

impl FactoryCustomization {
    /// Create for type and factory
    ///
    /// The factory gets the resolution context and can request its own
    /// inputs through it.
    #[must_use]
    pub fn new<F>(target: TypeRef, factory: F) -> Self
    where
        F: Fn(&dyn SpecimenContext) -> std::result::Result<Value, SpecimenError>
            + Send
            + Sync
            + 'static,
    {
        Self {
            target,
            factory: Arc::new(factory),
        }
    }
}

impl fmt::Debug for FactoryCustomization {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FactoryCustomization").field("target", &self.target).finish_non_exhaustive()
    }
}

impl Customization for FactoryCustomization {
    fn customize(&self, fixture: &mut Fixture) -> Result<()> {
        let factory = self.factory.clone();
        let builder = Arc::new(FnBuilder::new(move |_: &Request, context: &dyn SpecimenContext| {
            factory(context).map(Specimen::Created)
        }));
        fixture.insert_customization(for_type(builder, &self.target));
        Ok(())
    }
}

/// Applies several customizations in order
#[derive(Debug, Default)]
pub struct CompositeCustomization {
    customizations: Vec<Box<dyn Customization>>,
}

impl CompositeCustomization {
    /// Create from customizations
    #[inline]
    #[must_use]
    pub fn new(customizations: Vec<Box<dyn Customization>>) -> Self {
        Self { customizations }
    }

    /// With one more customization
    #[must_use]
    pub fn with(mut self, customization: impl Customization + 'static) -> Self {
        self.customizations.push(Box::new(customization));
        self
    }
}

impl Customization for CompositeCustomization {
    fn customize(&self, fixture: &mut Fixture) -> Result<()> {
        for customization in &self.customizations {
            customization.customize(fixture)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use specimen_kernel::catalog::TypeCatalog;
    use specimen_kernel::selection::GreedyConstructorQuery;
    use specimen_test_utils::{holder_of, sample_catalog_ref};

    fn fixture() -> Fixture {
        Fixture::new(sample_catalog_ref())
    }

    #[test]
    fn inject_answers_plain_and_seeded_requests() {
        let mut fixture = Fixture::new(Arc::new(TypeCatalog::new()));
        fixture.customize(&InjectCustomization::new(TypeRef::i32(), Value::Int(9))).unwrap();

        assert_eq!(fixture.create(&TypeRef::i32()).unwrap(), Value::Int(9));
        assert_eq!(
            fixture.create_request(&Request::parameter("n", TypeRef::i32())).unwrap(),
            Value::Int(9)
        );
    }

    #[test]
    fn last_customization_wins() {
        let mut fixture = Fixture::new(Arc::new(TypeCatalog::new()));
        let both = CompositeCustomization::default()
            .with(InjectCustomization::new(TypeRef::i32(), Value::Int(1)))
            .with(InjectCustomization::new(TypeRef::i32(), Value::Int(2)));
        fixture.customize(&both).unwrap();
        assert_eq!(fixture.create(&TypeRef::i32()).unwrap(), Value::Int(2));
    }

    #[test]
    fn freezing_returns_the_same_value() {
        let mut fixture = fixture();
        fixture.customize(&FreezingCustomization::new(TypeRef::string())).unwrap();
        let a = fixture.create(&TypeRef::string()).unwrap();
        let b = fixture.create(&TypeRef::string()).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn constructor_customization_switches_query() {
        let mut fixture = fixture();
        let holder = holder_of(TypeRef::i32());
        let modest = fixture.create(&holder).unwrap();
        assert_eq!(modest.as_object().unwrap().field("items"), Some(&Value::Seq(vec![])));

        fixture
            .customize(&ConstructorCustomization::new(
                holder.clone(),
                Arc::new(GreedyConstructorQuery),
            ))
            .unwrap();
        let greedy = fixture.create(&holder).unwrap();
        assert!(greedy
            .as_object()
            .and_then(|o| o.field("items"))
            .and_then(Value::as_seq)
            .is_some_and(|items| items.len() == 1));
    }

    #[test]
    fn factory_resolves_its_inputs_through_the_context() {
        let mut fixture = Fixture::new(Arc::new(TypeCatalog::new()));
        fixture
            .customize(&FactoryCustomization::new(TypeRef::named("Celsius"), |context| {
                match context.resolve(&Request::of_type(TypeRef::i32()))? {
                    Specimen::Created(Value::Int(n)) => Ok(Value::Int(n * 10)),
                    _ => Ok(Value::Null),
                }
            }))
            .unwrap();
        assert_eq!(fixture.create(&TypeRef::named("Celsius")).unwrap(), Value::Int(10));
    }
}
