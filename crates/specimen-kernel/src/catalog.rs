//! Type catalog
//!
//! Describes the constructible surface of the types a graph can build:
//! constructors and factories ([`Method`]), instance methods, and writable
//! properties. Generic definitions are registered once with
//! [`TypeRef::Param`] placeholders and instantiated on lookup.

use crate::error::{InvocationError, SpecimenError};
use crate::type_ref::TypeRef;
use crate::value::{Object, Value};
use std::collections::HashMap;
use std::fmt::{self, Display, Formatter};
use std::sync::Arc;

/// Arguments of one call to a catalogued method
#[derive(Debug, Clone, Copy)]
pub struct Invocation<'a> {
    /// Concrete declaring type
    pub declaring: &'a TypeRef,

    /// Receiver for instance methods
    pub owner: Option<&'a Value>,

    /// Positional arguments
    pub args: &'a [Value],
}

impl<'a> Invocation<'a> {
    /// Positional argument, `Value::Null` when missing
    #[must_use]
    pub fn arg(&self, index: usize) -> &'a Value {
        const NULL: &Value = &Value::Null;
        self.args.get(index).unwrap_or(NULL)
    }
}

/// Method body
pub type InvokeFn = Arc<dyn Fn(Invocation<'_>) -> Result<Value, InvocationError> + Send + Sync>;

/// Property setter body
pub type SetterFn = Arc<dyn Fn(&mut Value, Value) -> Result<(), InvocationError> + Send + Sync>;

/// Formal parameter of a method
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Parameter {
    /// Name, used as name hint when resolving the argument
    pub name: String,

    /// Declared type
    pub type_ref: TypeRef,
}

impl Parameter {
    /// Create parameter
    #[inline]
    #[must_use]
    pub fn new(name: impl Into<String>, type_ref: TypeRef) -> Self {
        Self {
            name: name.into(),
            type_ref,
        }
    }
}

impl Display for Parameter {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.name, self.type_ref)
    }
}

/// How a method is called
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MethodKind {
    /// Constructor of the declaring type
    Constructor,
    /// Static factory returning the declaring type
    Factory,
    /// Method called on an instance of the declaring type
    Instance,
}

/// Invocable factory or method descriptor
#[derive(Clone)]
pub struct Method {
    name: String,
    kind: MethodKind,
    declaring: TypeRef,
    parameters: Vec<Parameter>,
    equality_override: bool,
    body: InvokeFn,
}

impl Method {
    /// Constructor of `declaring`
    #[must_use]
    pub fn constructor<F>(declaring: TypeRef, parameters: Vec<Parameter>, body: F) -> Self
    where
        F: Fn(Invocation<'_>) -> Result<Value, InvocationError> + Send + Sync + 'static,
    {
        Self::build("new", MethodKind::Constructor, declaring, parameters, body)
    }

    /// Constructor that stores every argument in the field named after its
    /// parameter
    #[must_use]
    pub fn record(declaring: TypeRef, parameters: Vec<Parameter>) -> Self {
        let names: Vec<String> = parameters.iter().map(|p| p.name.clone()).collect();
        Self::constructor(declaring, parameters, move |call| {
            let mut object = Object::new(call.declaring.clone());
            for (name, value) in names.iter().zip(call.args) {
                object.set_field(name.clone(), value.clone());
            }
            Ok(Value::Object(object))
        })
    }

    /// Static factory for `declaring`
    #[must_use]
    pub fn factory<F>(
        name: impl Into<String>,
        declaring: TypeRef,
        parameters: Vec<Parameter>,
        body: F,
    ) -> Self
    where
        F: Fn(Invocation<'_>) -> Result<Value, InvocationError> + Send + Sync + 'static,
    {
        Self::build(name, MethodKind::Factory, declaring, parameters, body)
    }

    /// Instance method of `declaring`
    #[must_use]
    pub fn instance<F>(
        name: impl Into<String>,
        declaring: TypeRef,
        parameters: Vec<Parameter>,
        body: F,
    ) -> Self
    where
        F: Fn(Invocation<'_>) -> Result<Value, InvocationError> + Send + Sync + 'static,
    {
        Self::build(name, MethodKind::Instance, declaring, parameters, body)
    }

    fn build<F>(
        name: impl Into<String>,
        kind: MethodKind,
        declaring: TypeRef,
        parameters: Vec<Parameter>,
        body: F,
    ) -> Self
    where
        F: Fn(Invocation<'_>) -> Result<Value, InvocationError> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            kind,
            declaring,
            parameters,
            equality_override: false,
            body: Arc::new(body),
        }
    }

    /// Mark as a trivial equality override
    #[inline]
    #[must_use]
    pub fn as_equality_override(mut self) -> Self {
        self.equality_override = true;
        self
    }

    /// Method name (`new` for constructors)
    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Call kind
    #[inline]
    #[must_use]
    pub fn kind(&self) -> MethodKind {
        self.kind
    }

    /// Declaring type
    #[inline]
    #[must_use]
    pub fn declaring(&self) -> &TypeRef {
        &self.declaring
    }

    /// Formal parameters
    #[inline]
    #[must_use]
    pub fn parameters(&self) -> &[Parameter] {
        &self.parameters
    }

    /// Number of parameters
    #[inline]
    #[must_use]
    pub fn arity(&self) -> usize {
        self.parameters.len()
    }

    /// Check whether the method is a trivial equality override
    #[inline]
    #[must_use]
    pub fn is_equality_override(&self) -> bool {
        self.equality_override
    }

    /// Invoke with positional arguments
    ///
    /// # Errors
    /// Whatever the method body raises. Instance methods called without an
    /// owner fail with [`InvocationError::InvalidOperation`].
    pub fn invoke(&self, owner: Option<&Value>, args: &[Value]) -> Result<Value, InvocationError> {
        if self.kind == MethodKind::Instance && owner.is_none() {
            return Err(InvocationError::InvalidOperation(format!("{self} requires an instance")));
        }
        (self.body)(Invocation {
            declaring: &self.declaring,
            owner,
            args,
        })
    }

    /// Instantiate placeholders with concrete generic arguments
    #[must_use]
    pub fn substitute(&self, args: &[TypeRef]) -> Self {
        Self {
            name: self.name.clone(),
            kind: self.kind,
            declaring: self.declaring.substitute(args),
            parameters: self
                .parameters
                .iter()
                .map(|p| Parameter::new(p.name.clone(), p.type_ref.substitute(args)))
                .collect(),
            equality_override: self.equality_override,
            body: self.body.clone(),
        }
    }
}

impl fmt::Debug for Method {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("Method")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .field("declaring", &self.declaring)
            .field("parameters", &self.parameters)
            .finish_non_exhaustive()
    }
}

impl Display for Method {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}::{}(", self.declaring, self.name)?;
        for (i, p) in self.parameters.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{p}")?;
        }
        write!(f, ")")
    }
}

/// Writable member of a type
#[derive(Clone)]
pub struct Property {
    name: String,
    type_ref: TypeRef,
    setter: SetterFn,
}

impl Property {
    /// Property whose setter assigns the object field of the same name
    #[must_use]
    pub fn new(name: impl Into<String>, type_ref: TypeRef) -> Self {
        let name = name.into();
        let field = name.clone();
        Self::with_setter(name, type_ref, move |target, value| match target {
            Value::Object(object) => {
                object.set_field(field.clone(), value);
                Ok(())
            }
            other => Err(InvocationError::InvalidOperation(format!(
                "cannot set '{field}' on non-object value {other}"
            ))),
        })
    }

    /// Property with a custom setter
    #[must_use]
    pub fn with_setter<F>(name: impl Into<String>, type_ref: TypeRef, setter: F) -> Self
    where
        F: Fn(&mut Value, Value) -> Result<(), InvocationError> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            type_ref,
            setter: Arc::new(setter),
        }
    }

    /// Property name
    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declared type
    #[inline]
    #[must_use]
    pub fn type_ref(&self) -> &TypeRef {
        &self.type_ref
    }

    /// Assign `value` on `target`
    ///
    /// # Errors
    /// Whatever the setter raises.
    pub fn set(&self, target: &mut Value, value: Value) -> Result<(), InvocationError> {
        (self.setter)(target, value)
    }

    /// Instantiate placeholders with concrete generic arguments
    #[must_use]
    pub fn substitute(&self, args: &[TypeRef]) -> Self {
        Self {
            name: self.name.clone(),
            type_ref: self.type_ref.substitute(args),
            setter: self.setter.clone(),
        }
    }
}

impl fmt::Debug for Property {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("Property")
            .field("name", &self.name)
            .field("type_ref", &self.type_ref)
            .finish_non_exhaustive()
    }
}

/// Constructible surface of one type
#[derive(Debug, Clone)]
pub struct TypeShape {
    type_ref: TypeRef,
    constructors: Vec<Method>,
    methods: Vec<Method>,
    properties: Vec<Property>,
}

impl TypeShape {
    /// Create empty shape
    #[inline]
    #[must_use]
    pub fn new(type_ref: TypeRef) -> Self {
        Self {
            type_ref,
            constructors: Vec::new(),
            methods: Vec::new(),
            properties: Vec::new(),
        }
    }

    /// Add a constructor or static factory
    #[must_use]
    pub fn with_constructor(mut self, method: Method) -> Self {
        self.constructors.push(method);
        self
    }

    /// Add an instance method
    #[must_use]
    pub fn with_method(mut self, method: Method) -> Self {
        self.methods.push(method);
        self
    }

    /// Add a writable property
    #[must_use]
    pub fn with_property(mut self, property: Property) -> Self {
        self.properties.push(property);
        self
    }

    /// Type described by this shape
    #[inline]
    #[must_use]
    pub fn type_ref(&self) -> &TypeRef {
        &self.type_ref
    }

    /// Constructors and factories in registration order
    #[inline]
    #[must_use]
    pub fn constructors(&self) -> &[Method] {
        &self.constructors
    }

    /// Instance methods
    #[inline]
    #[must_use]
    pub fn methods(&self) -> &[Method] {
        &self.methods
    }

    /// Writable properties
    #[inline]
    #[must_use]
    pub fn properties(&self) -> &[Property] {
        &self.properties
    }

    /// Property by name
    #[must_use]
    pub fn property(&self, name: &str) -> Option<&Property> {
        self.properties.iter().find(|p| p.name == name)
    }

    /// Instantiate placeholders with concrete generic arguments
    #[must_use]
    pub fn substitute(&self, args: &[TypeRef]) -> Self {
        Self {
            type_ref: self.type_ref.substitute(args),
            constructors: self.constructors.iter().map(|m| m.substitute(args)).collect(),
            methods: self.methods.iter().map(|m| m.substitute(args)).collect(),
            properties: self.properties.iter().map(|p| p.substitute(args)).collect(),
        }
    }
}

/// Registry of type shapes keyed by generic definition name
#[derive(Debug, Clone, Default)]
pub struct TypeCatalog {
    shapes: HashMap<String, TypeShape>,
}

/// Shared catalog handle
pub type CatalogRef = Arc<TypeCatalog>;

impl TypeCatalog {
    /// Create empty catalog
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a shape, replacing any shape with the same definition name
    ///
    /// # Errors
    /// [`SpecimenError::InvalidArgument`] when the shape's type has no name
    /// or an empty one.
    pub fn register(&mut self, shape: TypeShape) -> Result<(), SpecimenError> {
        let name = match shape.type_ref.name() {
            Some(name) if !name.is_empty() => name.to_string(),
            _ => {
                return Err(SpecimenError::invalid_argument(
                    "shape",
                    "a registered type needs a non-empty definition name",
                ))
            }
        };
        self.shapes.insert(name, shape);
        Ok(())
    }

    /// Builder-style [`TypeCatalog::register`]
    ///
    /// # Errors
    /// See [`TypeCatalog::register`].
    pub fn with_shape(mut self, shape: TypeShape) -> Result<Self, SpecimenError> {
        self.register(shape)?;
        Ok(self)
    }

    /// Shape for a concrete type, with generic placeholders substituted
    ///
    /// `None` when the definition is unknown or the number of generic
    /// arguments differs from the registered definition.
    #[must_use]
    pub fn shape_of(&self, type_ref: &TypeRef) -> Option<TypeShape> {
        let shape = self.shapes.get(type_ref.name()?)?;
        if shape.type_ref.args().len() != type_ref.args().len() {
            return None;
        }
        if type_ref.is_generic() {
            Some(shape.substitute(type_ref.args()))
        } else {
            Some(shape.clone())
        }
    }

    /// Check whether a definition is registered
    #[must_use]
    pub fn contains(&self, definition: &str) -> bool {
        self.shapes.contains_key(definition)
    }

    /// Number of registered definitions
    #[must_use]
    pub fn len(&self) -> usize {
        self.shapes.len()
    }

    /// Check whether nothing is registered
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }
}
