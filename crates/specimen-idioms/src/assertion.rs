//! Guard-clause assertion
//!
//! [`GuardClauseAssertion`] builds a valid argument list for a member from
//! the engine, then replaces one argument at a time with each applicable
//! invalid value and checks that the member rejects it with the expected
//! failure kind. Every miss is collected; verification reports them all at
//! once.

use crate::command::{
    GuardClauseCommand, MethodInvokeCommand, PropertySetCommand, UnwrappingCommand,
};
use crate::error::{GuardClauseDefect, GuardClauseError, ProbeOutcome, Result};
use crate::invalid_value::{default_invalid_values, InvalidValueRef};
use specimen_fixture::Fixture;
use specimen_kernel::catalog::{CatalogRef, Method, MethodKind, Property};
use specimen_kernel::{BuilderRef, Request, SpecimenContainer, TypeRef, Value};

/// Verifies that members reject invalid input
#[derive(Debug, Clone)]
pub struct GuardClauseAssertion {
    container: SpecimenContainer,
    catalog: CatalogRef,
    invalid_values: Vec<InvalidValueRef>,
}

impl GuardClauseAssertion {
    /// Create assertion resolving probe inputs through `builder`
    #[must_use]
    pub fn new(builder: BuilderRef, catalog: CatalogRef) -> Self {
        Self {
            container: SpecimenContainer::new(builder),
            catalog,
            invalid_values: default_invalid_values(),
        }
    }

    /// Create assertion resolving probe inputs through a fixture
    ///
    /// # Errors
    /// [`GuardClauseError::Fixture`] when the fixture cannot compose.
    pub fn for_fixture(fixture: &Fixture) -> Result<Self> {
        Ok(Self::new(fixture.compose()?, fixture.catalog().clone()))
    }

    /// Probe with these invalid values instead of the defaults
    #[must_use]
    pub fn with_invalid_values(mut self, invalid_values: Vec<InvalidValueRef>) -> Self {
        self.invalid_values = invalid_values;
        self
    }

    /// Invalid values in use
    #[inline]
    #[must_use]
    pub fn invalid_values(&self) -> &[InvalidValueRef] {
        &self.invalid_values
    }

    /// Verify a constructor, factory or instance method
    ///
    /// Equality overrides are skipped.
    ///
    /// # Errors
    /// [`GuardClauseError::Defects`] listing every miss, or
    /// [`GuardClauseError::Resolution`] when probe inputs cannot be created.
    pub fn verify_method(&self, method: &Method) -> Result<()> {
        let mut defects = Vec::new();
        self.probe_method(method, &mut defects)?;
        finish(defects)
    }

    /// Verify a property setter
    ///
    /// # Errors
    /// See [`GuardClauseAssertion::verify_method`].
    pub fn verify_property(&self, declaring: &TypeRef, property: &Property) -> Result<()> {
        let mut defects = Vec::new();
        self.probe_property(declaring, property, &mut defects)?;
        finish(defects)
    }

    /// Verify every constructor, method and property of a catalogued type
    ///
    /// # Errors
    /// [`GuardClauseError::UnknownType`] for uncatalogued types, otherwise
    /// see [`GuardClauseAssertion::verify_method`].
    pub fn verify_type(&self, type_ref: &TypeRef) -> Result<()> {
        let shape = self
            .catalog
            .shape_of(type_ref)
            .ok_or_else(|| GuardClauseError::UnknownType(type_ref.to_string()))?;

        let mut defects = Vec::new();
        for method in shape.constructors().iter().chain(shape.methods()) {
            self.probe_method(method, &mut defects)?;
        }
        for property in shape.properties() {
            self.probe_property(shape.type_ref(), property, &mut defects)?;
        }
        finish(defects)
    }

    fn probe_method(&self, method: &Method, defects: &mut Vec<GuardClauseDefect>) -> Result<()> {
        if method.is_equality_override() {
            tracing::debug!(%method, "skipping equality override");
            return Ok(());
        }
        let owner = match method.kind() {
            MethodKind::Instance => Some(self.create(method.declaring())?),
            MethodKind::Constructor | MethodKind::Factory => None,
        };
        let baseline = method
            .parameters()
            .iter()
            .map(|p| self.create(&p.type_ref))
            .collect::<Result<Vec<_>>>()?;

        for position in 0..method.arity() {
            let command =
                MethodInvokeCommand::new(method.clone(), owner.clone(), baseline.clone(), position);
            self.probe(&UnwrappingCommand::new(command), defects);
        }
        Ok(())
    }

    fn probe_property(
        &self,
        declaring: &TypeRef,
        property: &Property,
        defects: &mut Vec<GuardClauseDefect>,
    ) -> Result<()> {
        let owner = self.create(declaring)?;
        let command = PropertySetCommand::new(declaring.clone(), property.clone(), owner);
        self.probe(&UnwrappingCommand::new(command), defects);
        Ok(())
    }

    fn probe(&self, command: &dyn GuardClauseCommand, defects: &mut Vec<GuardClauseDefect>) {
        for invalid in &self.invalid_values {
            if !invalid.applies_to(command.requested_type()) {
                continue;
            }
            let outcome = match command.execute(invalid.value()) {
                Err(e) if invalid.is_satisfied_by(e.kind()) => continue,
                Err(e) => ProbeOutcome::WrongFailure {
                    kind: e.kind(),
                    message: e.to_string(),
                },
                Ok(()) => ProbeOutcome::Accepted,
            };
            let defect = GuardClauseDefect {
                member: command.member(),
                parameter: command.parameter().to_string(),
                position: command.position(),
                invalid_value: invalid.description().to_string(),
                outcome,
            };
            tracing::debug!(%defect, "guard clause defect");
            defects.push(defect);
        }
    }

    fn create(&self, type_ref: &TypeRef) -> Result<Value> {
        Ok(self.container.create(&Request::of_type(type_ref.clone()))?)
    }
}

fn finish(defects: Vec<GuardClauseDefect>) -> Result<()> {
    if defects.is_empty() {
        Ok(())
    } else {
        Err(GuardClauseError::Defects(defects))
    }
}
