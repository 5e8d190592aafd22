//! Per-type composition
//!
//! A [`NodeComposer`] is a small builder graph answering plain and seeded
//! requests for one type:
//!
//! ```text
//! Filter(exact or seeded T)[ Composite[
//!     AutoProperties( Guard( commands...( factory ) ) ),
//!     SeedIgnoringRelay,
//! ]]
//! ```
//!
//! Every refinement rewrites that graph into a new composer. The composer it
//! started from keeps its own graph, so one base recipe can be refined in
//! several directions.

use crate::auto_properties::AutoPropertiesCommand;
use crate::customization::Customization;
use crate::error::Result;
use crate::fixture::Fixture;
use crate::relays::SeedIgnoringRelay;
use specimen_kernel::builders::{
    CommandRef, FnBuilder, NoSpecimenOutputGuard, Postprocessor, SpecimenCommand,
};
use specimen_kernel::catalog::{CatalogRef, Property};
use specimen_kernel::invoker::MethodInvoker;
use specimen_kernel::node::{find_node, parents, replace_children, replace_nodes};
use specimen_kernel::selection::{ModestConstructorQuery, QueryRef};
use specimen_kernel::specification::{
    AnyTypeSpecification, ExactTypeSpecification, InverseRequestSpecification,
    OrRequestSpecification, SeedRequestSpecification,
};
use specimen_kernel::{
    BuilderRef, CompositeSpecimenBuilder, FilteringSpecimenBuilder, Request, SpecimenContext,
    Specimen, SpecimenError, TypeRef, Value,
};
use std::sync::Arc;

/// Immutable per-type recipe
#[derive(Debug, Clone)]
pub struct NodeComposer {
    target: TypeRef,
    catalog: CatalogRef,
    graph: BuilderRef,
}

impl NodeComposer {
    /// Construct `target` with its most modest constructor and fill its
    /// properties afterwards
    #[must_use]
    pub fn new(target: TypeRef, catalog: CatalogRef) -> Self {
        let factory: BuilderRef =
            Arc::new(MethodInvoker::new(Arc::new(ModestConstructorQuery), catalog.clone()));
        let guard: BuilderRef = Arc::new(NoSpecimenOutputGuard::with_specification(
            factory,
            Arc::new(InverseRequestSpecification::new(Arc::new(SeedRequestSpecification::new(
                target.clone(),
            )))),
        ));
        let auto_properties = auto_properties(guard, AutoPropertiesCommand::new(catalog.clone()));
        let body: BuilderRef = Arc::new(CompositeSpecimenBuilder::new(vec![
            auto_properties,
            Arc::new(SeedIgnoringRelay),
        ]));
        let specification = OrRequestSpecification::new(vec![
            Arc::new(SeedRequestSpecification::new(target.clone())),
            Arc::new(ExactTypeSpecification::new(target.clone())),
        ]);

        Self {
            graph: Arc::new(FilteringSpecimenBuilder::new(body, Arc::new(specification))),
            target,
            catalog,
        }
    }

    /// Composed type
    #[inline]
    #[must_use]
    pub fn target(&self) -> &TypeRef {
        &self.target
    }

    /// Builder graph of this recipe
    #[inline]
    #[must_use]
    pub fn graph(&self) -> &BuilderRef {
        &self.graph
    }

    fn rewritten(&self, graph: BuilderRef) -> Self {
        Self {
            target: self.target.clone(),
            catalog: self.catalog.clone(),
            graph,
        }
    }

    /// Create values with a closure instead of a constructor
    #[must_use]
    pub fn from_factory<F>(&self, factory: F) -> Self
    where
        F: Fn(&dyn SpecimenContext) -> std::result::Result<Value, SpecimenError>
            + Send
            + Sync
            + 'static,
    {
        let builder = FnBuilder::new(move |_: &Request, context: &dyn SpecimenContext| {
            factory(context).map(Specimen::Created)
        });
        self.with_factory(Arc::new(builder))
    }

    /// Construct with a different constructor query
    #[must_use]
    pub fn from_query(&self, query: QueryRef) -> Self {
        self.with_factory(Arc::new(MethodInvoker::new(query, self.catalog.clone())))
    }

    fn with_factory(&self, factory: BuilderRef) -> Self {
        let Some(owner) = parents(&self.graph, is_factory).into_iter().next() else {
            return self.clone();
        };
        self.rewritten(replace_children(&self.graph, &[factory], |n| Arc::ptr_eq(n, &owner)))
    }

    /// Run a command on every created value, after the commands already
    /// registered
    #[must_use]
    pub fn do_command(&self, command: CommandRef) -> Self {
        let graph = replace_nodes(
            &self.graph,
            |guard| match guard.as_node() {
                Some(node) => {
                    let inner = CompositeSpecimenBuilder::compose_if_multiple(node.children());
                    node.compose(vec![Arc::new(Postprocessor::new(inner, command.clone()))])
                }
                None => guard.clone(),
            },
            is_guard,
        );
        self.rewritten(graph)
    }

    /// Assign a fixed value to a property
    ///
    /// # Errors
    /// [`SpecimenError::InvalidArgument`] when the type has no such property.
    pub fn with(&self, property: &str, value: Value) -> Result<Self> {
        let property = self.property(property)?;
        Ok(self.do_command(Arc::new(SetPropertyCommand { property, value })))
    }

    /// Leave a property unset
    ///
    /// # Errors
    /// [`SpecimenError::InvalidArgument`] when the type has no such property.
    pub fn without(&self, property: &str) -> Result<Self> {
        let name = self.property(property)?.name().to_string();
        let graph = replace_nodes(
            &self.graph,
            |node| match node.downcast_ref::<Postprocessor>() {
                Some(post) => match post.command().downcast_ref::<AutoPropertiesCommand>() {
                    Some(command) => Arc::new(Postprocessor::with_specification(
                        post.builder().clone(),
                        Arc::new(command.clone().without(name.clone())),
                        post.specification().clone(),
                    )),
                    None => node.clone(),
                },
                None => node.clone(),
            },
            is_auto_properties,
        );
        Ok(self.rewritten(graph))
    }

    /// Stop filling properties
    #[must_use]
    pub fn omit_auto_properties(&self) -> Self {
        let graph = replace_nodes(
            &self.graph,
            |node| match node.downcast_ref::<Postprocessor>() {
                Some(post) => post.builder().clone(),
                None => node.clone(),
            },
            is_auto_properties,
        );
        self.rewritten(graph)
    }

    /// Fill properties again after [`NodeComposer::omit_auto_properties`]
    #[must_use]
    pub fn with_auto_properties(&self) -> Self {
        if find_node(&self.graph, is_auto_properties).is_some() {
            return self.clone();
        }
        let catalog = self.catalog.clone();
        let graph = replace_nodes(
            &self.graph,
            |guard| auto_properties(guard.clone(), AutoPropertiesCommand::new(catalog.clone())),
            is_guard,
        );
        self.rewritten(graph)
    }

    /// Create one value through `fixture`, with this recipe in front of its
    /// customizations
    ///
    /// # Errors
    /// Resolution failures.
    pub fn create(&self, fixture: &Fixture) -> Result<Value> {
        self.scoped(fixture).create(&self.target)
    }

    /// Create several values; `None` uses the fixture's repeat count
    ///
    /// # Errors
    /// Resolution failures for any item.
    pub fn create_many(&self, fixture: &Fixture, count: Option<usize>) -> Result<Vec<Value>> {
        self.scoped(fixture).create_many(&self.target, count)
    }

    fn scoped(&self, fixture: &Fixture) -> Fixture {
        let mut scoped = fixture.clone();
        scoped.insert_customization(self.graph.clone());
        scoped
    }

    fn property(&self, name: &str) -> std::result::Result<Property, SpecimenError> {
        self.catalog
            .shape_of(&self.target)
            .and_then(|shape| shape.properties().iter().find(|p| p.name() == name).cloned())
            .ok_or_else(|| {
                let reason = format!("{} has no property {name}", self.target);
                SpecimenError::invalid_argument("property", reason)
            })
    }
}

/// Registers the recipe for every later request of its type
impl Customization for NodeComposer {
    fn customize(&self, fixture: &mut Fixture) -> Result<()> {
        fixture.insert_customization(self.graph.clone());
        Ok(())
    }
}

#[derive(Debug, Clone)]
struct SetPropertyCommand {
    property: Property,
    value: Value,
}

impl SpecimenCommand for SetPropertyCommand {
    fn execute(
        &self,
        specimen: &mut Value,
        _context: &dyn SpecimenContext,
    ) -> std::result::Result<(), SpecimenError> {
        let owner = specimen.as_object().map(|o| o.type_ref.to_string()).unwrap_or_default();
        self.property
            .set(specimen, self.value.clone())
            .map_err(|source| SpecimenError::Invocation {
                method: format!("{owner}::set_{}", self.property.name()),
                source,
            })
    }
}

fn auto_properties(inner: BuilderRef, command: AutoPropertiesCommand) -> BuilderRef {
    Arc::new(Postprocessor::with_specification(
        inner,
        Arc::new(command),
        Arc::new(AnyTypeSpecification),
    ))
}

fn is_guard(builder: &BuilderRef) -> bool {
    builder.is::<NoSpecimenOutputGuard>()
}

fn is_factory(builder: &BuilderRef) -> bool {
    !builder.is_node() && !builder.is::<SeedIgnoringRelay>()
}

fn is_auto_properties(builder: &BuilderRef) -> bool {
    builder
        .downcast_ref::<Postprocessor>()
        .is_some_and(|post| post.command().downcast_ref::<AutoPropertiesCommand>().is_some())
}

#[cfg(test)]
mod tests {
    use super::*;
    use specimen_kernel::catalog::{TypeCatalog, TypeShape};
    use specimen_kernel::node::select_nodes;
    use specimen_kernel::Object;

    fn account() -> TypeRef {
        TypeRef::named("Account")
    }

    fn catalog() -> CatalogRef {
        let shape = TypeShape::new(account())
            .with_constructor(specimen_kernel::catalog::Method::record(account(), vec![]))
            .with_property(Property::new("owner", TypeRef::string()))
            .with_property(Property::new("balance", TypeRef::i32()));
        Arc::new(TypeCatalog::new().with_shape(shape).unwrap())
    }

    fn composer() -> NodeComposer {
        NodeComposer::new(account(), catalog())
    }

    fn fixture() -> Fixture {
        Fixture::new(catalog())
    }

    #[test]
    fn fills_properties_by_default() {
        let account = composer().create(&fixture()).unwrap();
        let object = account.as_object().unwrap();
        assert!(object.field("owner").is_some());
        assert!(object.field("balance").is_some());
    }

    #[test]
    fn with_assigns_a_fixed_value() {
        let rich = composer().with("balance", Value::Int(100)).unwrap();
        let account = rich.create(&fixture()).unwrap();
        assert_eq!(account.as_object().unwrap().field("balance"), Some(&Value::Int(100)));
    }

    #[test]
    fn without_leaves_the_property_unset() {
        let account = composer().without("owner").unwrap().create(&fixture()).unwrap();
        let object = account.as_object().unwrap();
        assert_eq!(object.field("owner"), None);
        assert!(object.field("balance").is_some());
    }

    #[test]
    fn unknown_property_is_rejected() {
        assert!(composer().with("missing", Value::Null).is_err());
        assert!(composer().without("missing").is_err());
    }

    #[test]
    fn omit_and_restore_auto_properties() {
        let bare = composer().omit_auto_properties();
        assert_eq!(bare.create(&fixture()).unwrap(), Value::Object(Object::new(account())));

        let restored = bare.with_auto_properties();
        assert!(restored.create(&fixture()).unwrap().as_object().unwrap().field("owner").is_some());
        assert_eq!(select_nodes(restored.graph(), is_auto_properties).len(), 1);
    }

    #[test]
    fn from_factory_replaces_the_constructor() {
        let composer = composer()
            .omit_auto_properties()
            .from_factory(|_| {
                let object = Object::new(account()).with_field("owner", Value::str("bank"));
                Ok(Value::Object(object))
            });
        let account = composer.create(&fixture()).unwrap();
        assert_eq!(account.as_object().unwrap().field("owner"), Some(&Value::str("bank")));
    }

    #[test]
    fn commands_run_in_registration_order() {
        let composer = composer()
            .omit_auto_properties()
            .with("balance", Value::Int(1))
            .unwrap()
            .with("balance", Value::Int(2))
            .unwrap();
        let account = composer.create(&fixture()).unwrap();
        assert_eq!(account.as_object().unwrap().field("balance"), Some(&Value::Int(2)));
    }

    #[test]
    fn refining_leaves_the_base_recipe_untouched() {
        let base = composer();
        let before = format!("{:?}", base.graph());

        let refined = base.with("balance", Value::Int(7)).unwrap().without("owner").unwrap();
        let _ = base.omit_auto_properties().from_factory(|_| Ok(Value::Null));

        assert_eq!(format!("{:?}", base.graph()), before);
        assert!(!Arc::ptr_eq(base.graph(), refined.graph()));

        let plain = base.create(&fixture()).unwrap();
        assert!(plain.as_object().unwrap().field("owner").is_some());
        assert_ne!(plain.as_object().unwrap().field("balance"), Some(&Value::Int(7)));

        let account = refined.create(&fixture()).unwrap();
        assert_eq!(account.as_object().unwrap().field("balance"), Some(&Value::Int(7)));
        assert_eq!(account.as_object().unwrap().field("owner"), None);
    }

    #[test]
    fn customizing_applies_the_recipe_to_nested_requests() {
        let mut fixture = fixture();
        fixture
            .customize(&composer().with("balance", Value::Int(9)).unwrap())
            .unwrap();
        let accounts = fixture.create(&TypeRef::list(account())).unwrap();
        let items = accounts.as_seq().unwrap();
        assert_eq!(items.len(), 3);
        assert!(items
            .iter()
            .all(|a| a.as_object().and_then(|o| o.field("balance")) == Some(&Value::Int(9))));
    }
}
