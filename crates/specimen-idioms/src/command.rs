//! Guard-clause commands
//!
//! A command performs one call against a member with a single argument
//! replaced by a probe value. Calls are wrapped the way an invocation
//! mechanism would wrap them; [`UnwrappingCommand`] strips that wrapper so
//! the real failure can be classified.

use specimen_kernel::catalog::{Method, Property};
use specimen_kernel::{InvocationError, TypeRef, Value};
use std::fmt;

/// One probe-able call site
pub trait GuardClauseCommand: fmt::Debug {
    /// Probed member, for reports
    fn member(&self) -> String;

    /// Probed parameter name
    fn parameter(&self) -> &str;

    /// Probed parameter position
    fn position(&self) -> usize;

    /// Declared type of the probed parameter
    fn requested_type(&self) -> &TypeRef;

    /// Call the member with `value` in the probed position
    ///
    /// # Errors
    /// Whatever the member raises.
    fn execute(&self, value: Value) -> Result<(), InvocationError>;
}

/// Invokes a constructor or method with one argument replaced
#[derive(Debug, Clone)]
pub struct MethodInvokeCommand {
    method: Method,
    owner: Option<Value>,
    baseline: Vec<Value>,
    position: usize,
}

impl MethodInvokeCommand {
    /// Create command probing `position`
    ///
    /// `baseline` supplies every other argument; `owner` is the instance for
    /// instance methods.
    #[inline]
    #[must_use]
    pub fn new(
        method: Method,
        owner: Option<Value>,
        baseline: Vec<Value>,
        position: usize,
    ) -> Self {
        Self {
            method,
            owner,
            baseline,
            position,
        }
    }
}

impl GuardClauseCommand for MethodInvokeCommand {
    fn member(&self) -> String {
        self.method.to_string()
    }

    fn parameter(&self) -> &str {
        self.method.parameters().get(self.position).map_or("", |p| p.name.as_str())
    }

    fn position(&self) -> usize {
        self.position
    }

    fn requested_type(&self) -> &TypeRef {
        self.method
            .parameters()
            .get(self.position)
            .map_or(self.method.declaring(), |p| &p.type_ref)
    }

    fn execute(&self, value: Value) -> Result<(), InvocationError> {
        let mut args = self.baseline.clone();
        if let Some(slot) = args.get_mut(self.position) {
            *slot = value;
        }
        self.method
            .invoke(self.owner.as_ref(), &args)
            .map(drop)
            .map_err(InvocationError::wrapped)
    }
}

/// Assigns a property on a copy of an owner instance
#[derive(Debug, Clone)]
pub struct PropertySetCommand {
    declaring: TypeRef,
    property: Property,
    owner: Value,
}

impl PropertySetCommand {
    /// Create command for property of `owner`
    #[inline]
    #[must_use]
    pub fn new(declaring: TypeRef, property: Property, owner: Value) -> Self {
        Self {
            declaring,
            property,
            owner,
        }
    }
}

impl GuardClauseCommand for PropertySetCommand {
    fn member(&self) -> String {
        format!("{}::set_{}", self.declaring, self.property.name())
    }

    fn parameter(&self) -> &str {
        self.property.name()
    }

    fn position(&self) -> usize {
        0
    }

    fn requested_type(&self) -> &TypeRef {
        self.property.type_ref()
    }

    fn execute(&self, value: Value) -> Result<(), InvocationError> {
        let mut owner = self.owner.clone();
        self.property.set(&mut owner, value).map_err(InvocationError::wrapped)
    }
}

/// Strips invocation-mechanism wrappers from another command's failures
#[derive(Debug, Clone)]
pub struct UnwrappingCommand<C> {
    command: C,
}

impl<C: GuardClauseCommand> UnwrappingCommand<C> {
    /// Wrap command
    #[inline]
    #[must_use]
    pub fn new(command: C) -> Self {
        Self { command }
    }
}

impl<C: GuardClauseCommand> GuardClauseCommand for UnwrappingCommand<C> {
    fn member(&self) -> String {
        self.command.member()
    }

    fn parameter(&self) -> &str {
        self.command.parameter()
    }

    fn position(&self) -> usize {
        self.command.position()
    }

    fn requested_type(&self) -> &TypeRef {
        self.command.requested_type()
    }

    fn execute(&self, value: Value) -> Result<(), InvocationError> {
        self.command.execute(value).map_err(InvocationError::unwrap_target)
    }
}
