//! Specimen values
//!
//! [`Value`] is the dynamic representation of everything the engine can
//! produce: scalars, strings, identifiers, sequences, maps and objects
//! built by catalogued factories.

use crate::type_ref::TypeRef;
use indexmap::IndexMap;
use serde::ser::{SerializeSeq, SerializeStruct, SerializeTuple};
use serde::{Serialize, Serializer};
use std::fmt::{self, Display, Formatter};
use std::hash::{Hash, Hasher};
use uuid::Uuid;

/// A produced specimen value
///
/// Equality and hashing are structural (floats compare by bit pattern) so
/// values can be embedded in requests as seeds.
#[derive(Debug, Clone)]
pub enum Value {
    /// Legitimate null (distinct from "no specimen")
    Null,
    /// Boolean
    Bool(bool),
    /// Any built-in integer
    Int(i64),
    /// Any built-in float
    Float(f64),
    /// Character
    Char(char),
    /// String
    Str(String),
    /// Identifier
    Uuid(Uuid),
    /// Ordered sequence
    Seq(Vec<Value>),
    /// Key/value pairs in insertion order
    Map(Vec<(Value, Value)>),
    /// Object created by a catalogued factory
    Object(Object),
}

impl Value {
    /// Create string value
    #[inline]
    #[must_use]
    pub fn str(s: impl Into<String>) -> Self {
        Self::Str(s.into())
    }

    /// Check for null
    #[inline]
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Borrow as string
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Read as integer
    #[inline]
    #[must_use]
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Read as boolean
    #[inline]
    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Read as identifier
    #[inline]
    #[must_use]
    pub fn as_uuid(&self) -> Option<Uuid> {
        match self {
            Self::Uuid(u) => Some(*u),
            _ => None,
        }
    }

    /// Borrow as sequence
    #[inline]
    #[must_use]
    pub fn as_seq(&self) -> Option<&[Value]> {
        match self {
            Self::Seq(items) => Some(items),
            _ => None,
        }
    }

    /// Borrow as object
    #[inline]
    #[must_use]
    pub fn as_object(&self) -> Option<&Object> {
        match self {
            Self::Object(o) => Some(o),
            _ => None,
        }
    }

    /// Mutably borrow as object
    #[inline]
    pub fn as_object_mut(&mut self) -> Option<&mut Object> {
        match self {
            Self::Object(o) => Some(o),
            _ => None,
        }
    }

    /// Render as JSON through the [`Serialize`] impl
    #[must_use]
    pub fn to_json(&self) -> serde_json::Value {
        // every JSON object key produced here is a string
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }
}

/// Scalars map to their JSON counterparts; chars, strings and identifiers
/// become strings, maps a list of `[key, value]` pairs and objects
/// `{"type": ..., "fields": {...}}`.
impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Null => serializer.serialize_unit(),
            Self::Bool(b) => serializer.serialize_bool(*b),
            Self::Int(i) => serializer.serialize_i64(*i),
            Self::Float(x) => serializer.serialize_f64(*x),
            Self::Char(c) => serializer.serialize_char(*c),
            Self::Str(s) => serializer.serialize_str(s),
            Self::Uuid(u) => u.serialize(serializer),
            Self::Seq(items) => serializer.collect_seq(items),
            Self::Map(pairs) => {
                let mut seq = serializer.serialize_seq(Some(pairs.len()))?;
                for pair in pairs {
                    seq.serialize_element(&Entry(pair))?;
                }
                seq.end()
            }
            Self::Object(o) => o.serialize(serializer),
        }
    }
}

struct Entry<'a>(&'a (Value, Value));

impl Serialize for Entry<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut pair = serializer.serialize_tuple(2)?;
        pair.serialize_element(&self.0 .0)?;
        pair.serialize_element(&self.0 .1)?;
        pair.end()
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Null, Self::Null) => true,
            (Self::Bool(a), Self::Bool(b)) => a == b,
            (Self::Int(a), Self::Int(b)) => a == b,
            (Self::Float(a), Self::Float(b)) => a.to_bits() == b.to_bits(),
            (Self::Char(a), Self::Char(b)) => a == b,
            (Self::Str(a), Self::Str(b)) => a == b,
            (Self::Uuid(a), Self::Uuid(b)) => a == b,
            (Self::Seq(a), Self::Seq(b)) => a == b,
            (Self::Map(a), Self::Map(b)) => a == b,
            (Self::Object(a), Self::Object(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for Value {}

impl Hash for Value {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            Self::Null => {}
            Self::Bool(b) => b.hash(state),
            Self::Int(i) => i.hash(state),
            Self::Float(x) => x.to_bits().hash(state),
            Self::Char(c) => c.hash(state),
            Self::Str(s) => s.hash(state),
            Self::Uuid(u) => u.hash(state),
            Self::Seq(items) => items.hash(state),
            Self::Map(pairs) => pairs.hash(state),
            Self::Object(o) => o.hash(state),
        }
    }
}

impl Display for Value {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => write!(f, "null"),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Int(i) => write!(f, "{i}"),
            Self::Float(x) => write!(f, "{x}"),
            Self::Char(c) => write!(f, "'{c}'"),
            Self::Str(s) => write!(f, "\"{s}\""),
            Self::Uuid(u) => write!(f, "{u}"),
            Self::Seq(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{item}")?;
                }
                write!(f, "]")
            }
            Self::Map(pairs) => {
                write!(f, "{{")?;
                for (i, (k, v)) in pairs.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{k}: {v}")?;
                }
                write!(f, "}}")
            }
            Self::Object(o) => write!(f, "{o}"),
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Self::Int(i)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Self::Int(i64::from(i))
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::Str(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::Str(s)
    }
}

impl From<Uuid> for Value {
    fn from(u: Uuid) -> Self {
        Self::Uuid(u)
    }
}

/// Object produced by a catalogued factory
///
/// Fields keep the order in which they were assigned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Object {
    /// Declared type of the object
    pub type_ref: TypeRef,

    /// Assigned fields
    pub fields: IndexMap<String, Value>,
}

impl Serialize for Object {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut object = serializer.serialize_struct("Object", 2)?;
        object.serialize_field("type", &self.type_ref.to_string())?;
        object.serialize_field("fields", &self.fields)?;
        object.end()
    }
}

impl Object {
    /// Create an object with no fields
    #[inline]
    #[must_use]
    pub fn new(type_ref: TypeRef) -> Self {
        Self {
            type_ref,
            fields: IndexMap::new(),
        }
    }

    /// Builder-style field assignment
    #[inline]
    #[must_use]
    pub fn with_field(mut self, name: impl Into<String>, value: Value) -> Self {
        self.fields.insert(name.into(), value);
        self
    }

    /// Read a field
    #[inline]
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    /// Assign a field
    #[inline]
    pub fn set_field(&mut self, name: impl Into<String>, value: Value) {
        self.fields.insert(name.into(), value);
    }
}

impl Hash for Object {
    fn hash<H: Hasher>(&self, state: &mut H) {
        // field equality ignores order, so only order-free parts are hashed
        self.type_ref.hash(state);
        self.fields.len().hash(state);
    }
}

impl Display for Object {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{} {{", self.type_ref)?;
        for (i, (k, v)) in self.fields.iter().enumerate() {
            if i > 0 {
                write!(f, ",")?;
            }
            write!(f, " {k}: {v}")?;
        }
        write!(f, " }}")
    }
}

impl From<Object> for Value {
    fn from(o: Object) -> Self {
        Self::Object(o)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn float_equality_by_bits() {
        assert_eq!(Value::Float(1.5), Value::Float(1.5));
        assert_eq!(Value::Float(f64::NAN), Value::Float(f64::NAN));
        assert_ne!(Value::Float(0.0), Value::Float(-0.0));
    }

    #[test]
    fn null_differs_from_everything_else() {
        assert_ne!(Value::Null, Value::Bool(false));
        assert_ne!(Value::Null, Value::Seq(vec![]));
    }

    #[test]
    fn values_usable_in_hash_sets() {
        let mut set = HashSet::new();
        set.insert(Value::str("a"));
        set.insert(Value::str("a"));
        set.insert(Value::Int(1));
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn object_display() {
        let o = Object::new(TypeRef::named("Point"))
            .with_field("x", Value::Int(1))
            .with_field("y", Value::Int(2));
        assert_eq!(Value::from(o).to_string(), "Point { x: 1, y: 2 }");
    }

    #[test]
    fn object_to_json() {
        let o = Object::new(TypeRef::named("Tag")).with_field("name", Value::str("n"));
        let json = Value::from(o).to_json();
        assert_eq!(json["type"], "Tag");
        assert_eq!(json["fields"]["name"], "n");
    }

    #[test]
    fn json_rendering_goes_through_serialize() {
        let items = Value::Seq(vec![Value::Char('a'), Value::Null]);
        let value = Value::Map(vec![(Value::Int(1), items)]);
        assert_eq!(value.to_json(), serde_json::json!([[1, ["a", null]]]));
        assert_eq!(
            serde_json::to_string(&value).unwrap(),
            value.to_json().to_string()
        );
    }
}
