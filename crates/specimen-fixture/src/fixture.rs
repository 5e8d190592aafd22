//! The fixture
//!
//! [`Fixture`] owns the configurable parts of a resolution graph and
//! composes them on demand:
//!
//! ```text
//! behaviors( Composite[
//!     customizations...,
//!     AutoProperties( Composite[engine, MultipleRelay] ),
//!     residue collectors...,
//!     TerminatingBuilder,
//! ])
//! ```
//!
//! Composition never mutates the stored parts, so a composed graph stays
//! valid after further customization.

use crate::auto_properties::AutoPropertiesCommand;
use crate::composer::NodeComposer;
use crate::config::{FixtureConfig, RecursionPolicy};
use crate::customization::{Customization, FactoryCustomization, InjectCustomization};
use crate::engine::DefaultEngineParts;
use crate::error::Result;
use crate::relays::MultipleRelay;
use specimen_kernel::behavior::{
    apply_transformation, NullRecursionBehavior, OmitOnRecursionBehavior, ThrowingRecursionBehavior,
    TracingBehavior, TransformationRef,
};
use specimen_kernel::builders::{Postprocessor, TerminatingBuilder};
use specimen_kernel::catalog::CatalogRef;
use specimen_kernel::specification::AnyTypeSpecification;
use specimen_kernel::trace::LoggingTraceSink;
use specimen_kernel::{
    BuilderRef, CompositeSpecimenBuilder, Request, SpecimenContainer, SpecimenContext,
    SpecimenError, Specimen, TypeRef, Value,
};
use std::sync::Arc;

/// Configured resolution root
#[derive(Debug, Clone)]
pub struct Fixture {
    catalog: CatalogRef,
    config: FixtureConfig,
    engine: BuilderRef,
    customizations: Vec<BuilderRef>,
    residue_collectors: Vec<BuilderRef>,
    behaviors: Vec<TransformationRef>,
}

impl Fixture {
    /// Create fixture with default configuration
    #[must_use]
    pub fn new(catalog: CatalogRef) -> Self {
        Self::assemble(catalog, FixtureConfig::default())
    }

    /// Create fixture with validated configuration
    ///
    /// # Errors
    /// [`crate::ConfigError`] when the configuration is rejected.
    pub fn with_config(catalog: CatalogRef, config: FixtureConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::assemble(catalog, config))
    }

    fn assemble(catalog: CatalogRef, config: FixtureConfig) -> Self {
        let engine = DefaultEngineParts::new(catalog.clone()).into_engine();
        let mut behaviors: Vec<TransformationRef> = vec![match config.recursion {
            RecursionPolicy::Throw => Arc::new(ThrowingRecursionBehavior::new()),
            RecursionPolicy::Null => Arc::new(NullRecursionBehavior::new()),
            RecursionPolicy::Omit => Arc::new(OmitOnRecursionBehavior::new()),
        }];
        if config.trace {
            behaviors.push(Arc::new(TracingBehavior::new(Arc::new(LoggingTraceSink))));
        }
        Self {
            catalog,
            config,
            engine,
            customizations: Vec::new(),
            residue_collectors: Vec::new(),
            behaviors,
        }
    }

    /// Type catalog
    #[inline]
    #[must_use]
    pub fn catalog(&self) -> &CatalogRef {
        &self.catalog
    }

    /// Configuration
    #[inline]
    #[must_use]
    pub fn config(&self) -> &FixtureConfig {
        &self.config
    }

    /// Default item count for many-requests
    #[inline]
    #[must_use]
    pub fn repeat_count(&self) -> usize {
        self.config.repeat_count
    }

    /// Change the default item count
    ///
    /// # Errors
    /// [`crate::ConfigError::Invalid`] for zero.
    pub fn set_repeat_count(&mut self, count: usize) -> Result<()> {
        let config = self.config.clone().with_repeat_count(count);
        config.validate()?;
        self.config = config;
        Ok(())
    }

    /// Engine builder
    #[inline]
    #[must_use]
    pub fn engine(&self) -> &BuilderRef {
        &self.engine
    }

    /// Replace the engine
    pub fn set_engine(&mut self, engine: BuilderRef) {
        self.engine = engine;
    }

    /// Customization builders, highest priority first
    #[inline]
    #[must_use]
    pub fn customizations(&self) -> &[BuilderRef] {
        &self.customizations
    }

    /// Residue collectors, consulted after the engine
    #[inline]
    #[must_use]
    pub fn residue_collectors(&self) -> &[BuilderRef] {
        &self.residue_collectors
    }

    /// Behaviors, applied in order
    #[inline]
    #[must_use]
    pub fn behaviors(&self) -> &[TransformationRef] {
        &self.behaviors
    }

    /// Put a builder in front of every other customization
    pub fn insert_customization(&mut self, builder: BuilderRef) {
        self.customizations.insert(0, builder);
    }

    /// Add a builder consulted when nothing else could answer
    pub fn add_residue_collector(&mut self, builder: BuilderRef) {
        self.residue_collectors.push(builder);
    }

    /// Add a behavior applied after the ones already present
    ///
    /// # Errors
    /// [`SpecimenError::NotANode`] when the behavior does not yield a
    /// node; the fixture is left unchanged.
    pub fn add_behavior(&mut self, behavior: TransformationRef) -> Result<()> {
        self.behaviors.push(behavior);
        if let Err(e) = self.compose() {
            self.behaviors.pop();
            return Err(e);
        }
        Ok(())
    }

    /// Remove every behavior matching the predicate
    pub fn remove_behaviors(&mut self, predicate: impl Fn(&TransformationRef) -> bool) {
        self.behaviors.retain(|b| !predicate(b));
    }

    /// Apply a customization
    ///
    /// # Errors
    /// Whatever the customization reports.
    pub fn customize(&mut self, customization: &dyn Customization) -> Result<()> {
        customization.customize(self)
    }

    /// Create a value for the type and answer every later request for it
    /// with that value
    ///
    /// # Errors
    /// Resolution failures for the type.
    pub fn freeze(&mut self, type_ref: &TypeRef) -> Result<Value> {
        let value = self.create(type_ref)?;
        self.inject(type_ref.clone(), value.clone())?;
        Ok(value)
    }

    /// Answer every request for the type with the value
    ///
    /// # Errors
    /// Never in practice; kept fallible like every customization.
    pub fn inject(&mut self, type_ref: TypeRef, value: Value) -> Result<()> {
        self.customize(&InjectCustomization::new(type_ref, value))
    }

    /// Create the type with a closure
    ///
    /// # Errors
    /// Never in practice; kept fallible like every customization.
    pub fn register<F>(&mut self, type_ref: TypeRef, factory: F) -> Result<()>
    where
        F: Fn(&dyn SpecimenContext) -> std::result::Result<Value, SpecimenError>
            + Send
            + Sync
            + 'static,
    {
        self.customize(&FactoryCustomization::new(type_ref, factory))
    }

    /// Start a recipe for one type
    ///
    /// Properties are filled unless the fixture omits auto-properties.
    #[must_use]
    pub fn build(&self, type_ref: &TypeRef) -> NodeComposer {
        let composer = NodeComposer::new(type_ref.clone(), self.catalog.clone());
        if self.config.omit_auto_properties {
            composer.omit_auto_properties()
        } else {
            composer
        }
    }

    /// Compose the resolution graph from the current parts
    ///
    /// # Errors
    /// [`SpecimenError::NotANode`] when a behavior does not yield a node.
    pub fn compose(&self) -> Result<BuilderRef> {
        let engine: BuilderRef = Arc::new(CompositeSpecimenBuilder::new(vec![
            self.engine.clone(),
            Arc::new(MultipleRelay::new(self.config.repeat_count)),
        ]));
        let core: BuilderRef = if self.config.omit_auto_properties {
            engine
        } else {
            Arc::new(Postprocessor::with_specification(
                engine,
                Arc::new(AutoPropertiesCommand::new(self.catalog.clone())),
                Arc::new(AnyTypeSpecification),
            ))
        };

        let mut parts = self.customizations.clone();
        parts.push(core);
        parts.extend(self.residue_collectors.iter().cloned());
        parts.push(Arc::new(TerminatingBuilder));

        let mut graph: BuilderRef = Arc::new(CompositeSpecimenBuilder::new(parts));
        for behavior in &self.behaviors {
            graph = apply_transformation(behavior.as_ref(), graph)?;
        }

        tracing::debug!(
            customizations = self.customizations.len(),
            residue_collectors = self.residue_collectors.len(),
            behaviors = self.behaviors.len(),
            "composed fixture graph"
        );
        Ok(graph)
    }

    /// Resolve a request without treating declines as errors
    ///
    /// # Errors
    /// Hard failures during resolution.
    pub fn resolve(&self, request: &Request) -> Result<Specimen> {
        Ok(SpecimenContainer::new(self.compose()?).resolve(request)?)
    }

    /// Create a value for a request
    ///
    /// # Errors
    /// Resolution failures, including unresolvable requests.
    pub fn create_request(&self, request: &Request) -> Result<Value> {
        Ok(SpecimenContainer::new(self.compose()?).create(request)?)
    }

    /// Create a value of a type
    ///
    /// # Errors
    /// Resolution failures, including unresolvable types.
    pub fn create(&self, type_ref: &TypeRef) -> Result<Value> {
        self.create_request(&Request::of_type(type_ref.clone()))
    }

    /// Create several values of a type; `None` uses the repeat count
    ///
    /// # Errors
    /// Resolution failures for any item.
    pub fn create_many(&self, type_ref: &TypeRef, count: Option<usize>) -> Result<Vec<Value>> {
        let container = SpecimenContainer::new(self.compose()?);
        Ok(container.create_many(Request::of_type(type_ref.clone()), count)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FixtureError;
    use specimen_kernel::behavior::FnTransformation;
    use specimen_kernel::builders::FixedBuilder;
    use specimen_kernel::catalog::TypeCatalog;

    fn empty() -> Fixture {
        Fixture::new(Arc::new(TypeCatalog::new()))
    }

    #[test]
    fn default_fixture_installs_throwing_recursion() {
        let fixture = empty();
        assert_eq!(fixture.behaviors().len(), 1);
        assert!(format!("{:?}", fixture.behaviors()[0]).starts_with("ThrowingRecursionBehavior"));
    }

    #[test]
    fn traced_fixture_adds_tracing_behavior() {
        let config = FixtureConfig::new().with_trace(true);
        let fixture = Fixture::with_config(Arc::new(TypeCatalog::new()), config).unwrap();
        assert_eq!(fixture.behaviors().len(), 2);
        assert_eq!(fixture.create(&TypeRef::i32()).unwrap(), Value::Int(1));
    }

    #[test]
    fn invalid_config_is_rejected() {
        let config = FixtureConfig::new().with_repeat_count(0);
        assert!(matches!(
            Fixture::with_config(Arc::new(TypeCatalog::new()), config),
            Err(FixtureError::Config(_))
        ));
        assert!(empty().set_repeat_count(0).is_err());
    }

    #[test]
    fn residue_collectors_answer_what_the_engine_declines() {
        let mut fixture = empty();
        assert!(fixture.create(&TypeRef::named("Unknown")).is_err());
        fixture.add_residue_collector(Arc::new(FixedBuilder::new(Value::str("residue"))));
        assert_eq!(fixture.create(&TypeRef::named("Unknown")).unwrap(), Value::str("residue"));
    }

    #[test]
    fn non_node_behavior_is_rejected_and_dropped() {
        let mut fixture = empty();
        let bad =
            FnTransformation::new(|_| Ok(Arc::new(FixedBuilder::new(Value::Null)) as BuilderRef));
        let err = fixture.add_behavior(Arc::new(bad)).unwrap_err();

        assert!(matches!(err.as_specimen_error(), Some(SpecimenError::NotANode { .. })));
        assert_eq!(fixture.behaviors().len(), 1);
        assert!(fixture.compose().is_ok());
    }

    #[test]
    fn composed_graph_is_unaffected_by_later_customization() {
        let mut fixture = empty();
        let before = fixture.compose().unwrap();
        fixture.inject(TypeRef::i32(), Value::Int(99)).unwrap();

        let old = SpecimenContainer::new(before).create(&Request::of_type(TypeRef::i32())).unwrap();
        assert_eq!(old, Value::Int(1));
        assert_eq!(fixture.create(&TypeRef::i32()).unwrap(), Value::Int(99));
    }
}
