//! Testing utilities for the specimen workspace
//!
//! Sample type catalog and tracing setup shared by the crates' tests.

#![allow(missing_docs)]

use specimen_kernel::catalog::{Invocation, Method, Parameter, Property, TypeCatalog, TypeShape};
use specimen_kernel::{InvocationError, Object, TypeRef, Value};
use std::sync::{Arc, Once};

pub const PAIR: &str = "Pair";
pub const WIDGET: &str = "Widget";
pub const GUARDED_WIDGET: &str = "GuardedWidget";
pub const NODE: &str = "Node";
pub const HOLDER: &str = "Holder";
pub const PERSON: &str = "Person";
pub const CATEGORY: &str = "Category";

pub fn pair_of(first: TypeRef, second: TypeRef) -> TypeRef {
    TypeRef::generic(PAIR, vec![first, second])
}

pub fn holder_of(element: TypeRef) -> TypeRef {
    TypeRef::generic(HOLDER, vec![element])
}

pub fn widget() -> TypeRef {
    TypeRef::named(WIDGET)
}

pub fn guarded_widget() -> TypeRef {
    TypeRef::named(GUARDED_WIDGET)
}

pub fn node() -> TypeRef {
    TypeRef::named(NODE)
}

pub fn person() -> TypeRef {
    TypeRef::named(PERSON)
}

pub fn category() -> TypeRef {
    TypeRef::named(CATEGORY)
}

/// `Pair<A, B>(first: A, second: B)`
pub fn pair_shape() -> TypeShape {
    let definition = pair_of(TypeRef::param(0), TypeRef::param(1));
    TypeShape::new(definition.clone()).with_constructor(Method::record(
        definition,
        vec![
            Parameter::new("first", TypeRef::param(0)),
            Parameter::new("second", TypeRef::param(1)),
        ],
    ))
}

/// `Widget(name: String)` with no checks anywhere
pub fn widget_shape() -> TypeShape {
    TypeShape::new(widget())
        .with_constructor(Method::record(widget(), vec![Parameter::new("name", TypeRef::string())]))
        .with_method(Method::instance(
            "rename",
            widget(),
            vec![Parameter::new("name", TypeRef::string())],
            |call| Ok(renamed(call)),
        ))
        .with_method(
            Method::instance("equals", widget(), vec![Parameter::new("other", widget())], |call| {
                Ok(Value::Bool(call.owner == Some(call.arg(0))))
            })
            .as_equality_override(),
        )
        .with_property(Property::new("label", TypeRef::string()))
}

/// `GuardedWidget(name: String, id: Uuid)` rejecting null, empty and nil
/// inputs on every member
pub fn guarded_widget_shape() -> TypeShape {
    TypeShape::new(guarded_widget())
        .with_constructor(Method::constructor(
            guarded_widget(),
            vec![Parameter::new("name", TypeRef::string()), Parameter::new("id", TypeRef::uuid())],
            |call| {
                let name = require_text("name", call.arg(0))?;
                let id = call.arg(1);
                if id.as_uuid().map_or(true, |u| u.is_nil()) {
                    return Err(InvocationError::argument("id", "must not be the empty identifier"));
                }
                Ok(Value::Object(
                    Object::new(guarded_widget())
                        .with_field("name", Value::str(name))
                        .with_field("id", id.clone()),
                ))
            },
        ))
        .with_method(Method::instance(
            "rename",
            guarded_widget(),
            vec![Parameter::new("name", TypeRef::string())],
            |call| {
                require_text("name", call.arg(0))?;
                Ok(renamed(call))
            },
        ))
        .with_property(Property::with_setter("label", TypeRef::string(), |target, value| {
            let text = require_text("label", &value)?.to_string();
            if let Value::Object(object) = target {
                object.set_field("label", Value::str(text));
            }
            Ok(())
        }))
}

/// `Node(next: Node)`
pub fn node_shape() -> TypeShape {
    let next = Parameter::new("next", node());
    TypeShape::new(node()).with_constructor(Method::record(node(), vec![next]))
}

/// `Holder<T>` with `()`, `(item: T)` and `(items: Seq<T>)` constructors
pub fn holder_shape() -> TypeShape {
    let definition = holder_of(TypeRef::param(0));
    TypeShape::new(definition.clone())
        .with_constructor(Method::constructor(definition.clone(), vec![], |call| {
            Ok(Value::Object(
                Object::new(call.declaring.clone()).with_field("items", Value::Seq(Vec::new())),
            ))
        }))
        .with_constructor(Method::constructor(
            definition.clone(),
            vec![Parameter::new("item", TypeRef::param(0))],
            |call| {
                let items = Value::Seq(vec![call.arg(0).clone()]);
                Ok(Value::Object(Object::new(call.declaring.clone()).with_field("items", items)))
            },
        ))
        .with_constructor(Method::constructor(
            definition,
            vec![Parameter::new("items", TypeRef::seq(TypeRef::param(0)))],
            |call| {
                let items = call.arg(0).clone();
                Ok(Value::Object(Object::new(call.declaring.clone()).with_field("items", items)))
            },
        ))
}

/// `Person()` with writable `name`, `age` and `nickname`
pub fn person_shape() -> TypeShape {
    TypeShape::new(person())
        .with_constructor(Method::record(person(), vec![]))
        .with_property(Property::new("name", TypeRef::string()))
        .with_property(Property::new("age", TypeRef::i32()))
        .with_property(Property::new("nickname", TypeRef::option(TypeRef::string())))
}

/// `Category()` with writable `title` and a self-typed `parent`
pub fn category_shape() -> TypeShape {
    TypeShape::new(category())
        .with_constructor(Method::record(category(), vec![]))
        .with_property(Property::new("title", TypeRef::string()))
        .with_property(Property::new("parent", category()))
}

/// Catalog holding every sample type
pub fn sample_catalog() -> TypeCatalog {
    let mut catalog = TypeCatalog::new();
    for shape in [
        pair_shape(),
        widget_shape(),
        guarded_widget_shape(),
        node_shape(),
        holder_shape(),
        person_shape(),
        category_shape(),
    ] {
        catalog.register(shape).unwrap();
    }
    catalog
}

/// Shared [`sample_catalog`]
pub fn sample_catalog_ref() -> Arc<TypeCatalog> {
    Arc::new(sample_catalog())
}

fn require_text<'a>(parameter: &str, value: &'a Value) -> Result<&'a str, InvocationError> {
    match value {
        Value::Null => Err(InvocationError::argument_null(parameter)),
        Value::Str(s) if s.is_empty() => {
            Err(InvocationError::argument(parameter, "must not be empty"))
        }
        Value::Str(s) => Ok(s.as_str()),
        other => Err(InvocationError::argument(parameter, format!("expected text, got {other}"))),
    }
}

fn renamed(call: Invocation<'_>) -> Value {
    match call.owner {
        Some(Value::Object(object)) => {
            let mut copy = object.clone();
            copy.set_field("name", call.arg(0).clone());
            Value::Object(copy)
        }
        _ => Value::Null,
    }
}

static TRACING: Once = Once::new();

/// Install a test subscriber honouring `RUST_LOG` (once per process)
pub fn init_tracing() {
    TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
            )
            .with_test_writer()
            .try_init();
    });
}
