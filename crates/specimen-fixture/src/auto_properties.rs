//! Auto-property population
//!
//! [`AutoPropertiesCommand`] runs after an object is created and fills
//! every writable property its shape declares and the constructor left
//! unset. Property values are resolved through the context with property
//! requests, so customizations and recursion handling apply to them too.

use specimen_kernel::builders::SpecimenCommand;
use specimen_kernel::catalog::CatalogRef;
use specimen_kernel::{Request, SpecimenContext, SpecimenError, Specimen, Value};

/// Populates unset writable properties of created objects
#[derive(Debug, Clone)]
pub struct AutoPropertiesCommand {
    catalog: CatalogRef,
    excluded: Vec<String>,
}

impl AutoPropertiesCommand {
    /// Create command reading property lists from the catalog
    #[inline]
    #[must_use]
    pub fn new(catalog: CatalogRef) -> Self {
        Self {
            catalog,
            excluded: Vec::new(),
        }
    }

    /// Never fill the named property
    #[must_use]
    pub fn without(mut self, property: impl Into<String>) -> Self {
        self.excluded.push(property.into());
        self
    }

    /// Properties left alone
    #[inline]
    #[must_use]
    pub fn excluded(&self) -> &[String] {
        &self.excluded
    }
}

impl SpecimenCommand for AutoPropertiesCommand {
    fn execute(
        &self,
        specimen: &mut Value,
        context: &dyn SpecimenContext,
    ) -> Result<(), SpecimenError> {
        let shape = specimen.as_object().and_then(|o| self.catalog.shape_of(&o.type_ref));
        let Some(shape) = shape else {
            return Ok(());
        };

        for property in shape.properties() {
            let already_set =
                specimen.as_object().is_some_and(|o| o.field(property.name()).is_some());
            if already_set || self.excluded.iter().any(|name| name == property.name()) {
                continue;
            }
            let request = Request::property(property.name(), property.type_ref().clone());
            match context.resolve(&request)? {
                Specimen::Created(value) => {
                    property.set(specimen, value).map_err(|source| SpecimenError::Invocation {
                        method: format!("{}::set_{}", shape.type_ref(), property.name()),
                        source,
                    })?;
                }
                // omitted members stay unset
                Specimen::Omitted | Specimen::NoSpecimen => {}
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use specimen_kernel::builders::FnBuilder;
    use specimen_kernel::catalog::{Property, TypeCatalog, TypeShape};
    use specimen_kernel::{Object, SpecimenContainer, TypeRef};
    use std::sync::Arc;

    fn account() -> TypeRef {
        TypeRef::named("Account")
    }

    fn command() -> AutoPropertiesCommand {
        let shape = TypeShape::new(account())
            .with_property(Property::new("owner", TypeRef::string()))
            .with_property(Property::new("balance", TypeRef::i32()));
        AutoPropertiesCommand::new(Arc::new(TypeCatalog::new().with_shape(shape).unwrap()))
    }

    fn context() -> SpecimenContainer {
        let stub = FnBuilder::new(|request: &Request, _: &dyn SpecimenContext| {
            Ok(match request {
                Request::Member(m) if m.name == "owner" => Specimen::created("owner-1"),
                Request::Member(_) => Specimen::Omitted,
                _ => Specimen::NoSpecimen,
            })
        });
        SpecimenContainer::new(Arc::new(stub))
    }

    #[test]
    fn fills_unset_properties_and_skips_omitted() {
        let mut value = Value::Object(Object::new(account()));
        command().execute(&mut value, &context()).unwrap();

        let object = value.as_object().unwrap();
        assert_eq!(object.field("owner"), Some(&Value::str("owner-1")));
        assert_eq!(object.field("balance"), None);
    }

    #[test]
    fn keeps_values_set_by_the_constructor() {
        let mut value =
            Value::Object(Object::new(account()).with_field("owner", Value::str("ctor")));
        command().execute(&mut value, &context()).unwrap();
        assert_eq!(value.as_object().unwrap().field("owner"), Some(&Value::str("ctor")));
    }

    #[test]
    fn excluded_properties_stay_unset() {
        let mut value = Value::Object(Object::new(account()));
        command().without("owner").execute(&mut value, &context()).unwrap();
        assert_eq!(value.as_object().unwrap().field("owner"), None);
    }

    #[test]
    fn ignores_values_without_a_shape() {
        let mut value = Value::Int(3);
        command().execute(&mut value, &context()).unwrap();
        assert_eq!(value, Value::Int(3));
    }
}
