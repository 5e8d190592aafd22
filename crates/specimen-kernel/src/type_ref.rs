//! Type references
//!
//! Provides [`TypeRef`], the comparable description of a (possibly generic)
//! type that type requests, parameters and properties are expressed in.

use std::fmt::{self, Display, Formatter};

/// Name of the built-in boolean type
pub const BOOL: &str = "bool";
/// Name of the built-in 8-bit signed integer type
pub const I8: &str = "i8";
/// Name of the built-in 16-bit signed integer type
pub const I16: &str = "i16";
/// Name of the built-in 32-bit signed integer type
pub const I32: &str = "i32";
/// Name of the built-in 64-bit signed integer type
pub const I64: &str = "i64";
/// Name of the built-in 8-bit unsigned integer type
pub const U8: &str = "u8";
/// Name of the built-in 16-bit unsigned integer type
pub const U16: &str = "u16";
/// Name of the built-in 32-bit unsigned integer type
pub const U32: &str = "u32";
/// Name of the built-in 64-bit unsigned integer type
pub const U64: &str = "u64";
/// Name of the built-in 32-bit float type
pub const F32: &str = "f32";
/// Name of the built-in 64-bit float type
pub const F64: &str = "f64";
/// Name of the built-in character type
pub const CHAR: &str = "char";
/// Name of the built-in string type
pub const STRING: &str = "String";
/// Name of the built-in identifier type
pub const UUID: &str = "Uuid";
/// Generic definition of a plain sequence (`Seq<T>`)
pub const SEQ: &str = "Seq";
/// Generic definition of a list (`List<T>`)
pub const LIST: &str = "List";
/// Generic definition of a set (`Set<T>`)
pub const SET: &str = "Set";
/// Generic definition of a map (`Map<K, V>`)
pub const MAP: &str = "Map";
/// Generic definition of an optional value (`Option<T>`)
pub const OPTION: &str = "Option";

const INTEGERS: [&str; 8] = [I8, I16, I32, I64, U8, U16, U32, U64];

/// Reference to a type
///
/// Either a concrete (possibly generic) type such as `Pair<i32, String>`,
/// or a positional generic parameter placeholder used inside catalogued
/// generic definitions and substituted when the definition is closed.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum TypeRef {
    /// Concrete type with its generic arguments (empty when non-generic)
    Named {
        /// Generic definition name
        name: String,
        /// Generic arguments
        args: Vec<TypeRef>,
    },

    /// Positional generic parameter of the enclosing definition
    Param(usize),
}

impl TypeRef {
    /// Create a non-generic type reference
    #[inline]
    #[must_use]
    pub fn named(name: impl Into<String>) -> Self {
        Self::Named {
            name: name.into(),
            args: Vec::new(),
        }
    }

    /// Create a generic type reference
    #[inline]
    #[must_use]
    pub fn generic(name: impl Into<String>, args: Vec<TypeRef>) -> Self {
        Self::Named {
            name: name.into(),
            args,
        }
    }

    /// Positional generic parameter placeholder
    #[inline]
    #[must_use]
    pub fn param(index: usize) -> Self {
        Self::Param(index)
    }

    /// `bool`
    #[inline]
    #[must_use]
    pub fn bool() -> Self {
        Self::named(BOOL)
    }

    /// `i32`
    #[inline]
    #[must_use]
    pub fn i32() -> Self {
        Self::named(I32)
    }

    /// `i64`
    #[inline]
    #[must_use]
    pub fn i64() -> Self {
        Self::named(I64)
    }

    /// `f64`
    #[inline]
    #[must_use]
    pub fn f64() -> Self {
        Self::named(F64)
    }

    /// `char`
    #[inline]
    #[must_use]
    pub fn char() -> Self {
        Self::named(CHAR)
    }

    /// `String`
    #[inline]
    #[must_use]
    pub fn string() -> Self {
        Self::named(STRING)
    }

    /// `Uuid`
    #[inline]
    #[must_use]
    pub fn uuid() -> Self {
        Self::named(UUID)
    }

    /// `Seq<T>`
    #[inline]
    #[must_use]
    pub fn seq(element: TypeRef) -> Self {
        Self::generic(SEQ, vec![element])
    }

    /// `List<T>`
    #[inline]
    #[must_use]
    pub fn list(element: TypeRef) -> Self {
        Self::generic(LIST, vec![element])
    }

    /// `Set<T>`
    #[inline]
    #[must_use]
    pub fn set(element: TypeRef) -> Self {
        Self::generic(SET, vec![element])
    }

    /// `Map<K, V>`
    #[inline]
    #[must_use]
    pub fn map(key: TypeRef, value: TypeRef) -> Self {
        Self::generic(MAP, vec![key, value])
    }

    /// `Option<T>`
    #[inline]
    #[must_use]
    pub fn option(inner: TypeRef) -> Self {
        Self::generic(OPTION, vec![inner])
    }

    /// Generic definition name (`None` for a parameter placeholder)
    #[inline]
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        match self {
            Self::Named { name, .. } => Some(name),
            Self::Param(_) => None,
        }
    }

    /// Generic arguments
    #[inline]
    #[must_use]
    pub fn args(&self) -> &[TypeRef] {
        match self {
            Self::Named { args, .. } => args,
            Self::Param(_) => &[],
        }
    }

    /// Check whether this is a closed generic type
    #[inline]
    #[must_use]
    pub fn is_generic(&self) -> bool {
        !self.args().is_empty()
    }

    /// Check whether this type is an instantiation of `definition`
    #[inline]
    #[must_use]
    pub fn is_instance_of(&self, definition: &str) -> bool {
        self.name() == Some(definition)
    }

    /// Single generic argument, if the type has exactly one
    #[must_use]
    pub fn single_arg(&self) -> Option<&TypeRef> {
        match self.args() {
            [only] => Some(only),
            _ => None,
        }
    }

    /// Check whether the type still contains parameter placeholders
    #[must_use]
    pub fn is_open(&self) -> bool {
        match self {
            Self::Param(_) => true,
            Self::Named { args, .. } => args.iter().any(Self::is_open),
        }
    }

    /// Replace parameter placeholders with the given arguments
    ///
    /// Placeholders without a matching argument are left untouched.
    #[must_use]
    pub fn substitute(&self, args: &[TypeRef]) -> TypeRef {
        match self {
            Self::Param(i) => args.get(*i).cloned().unwrap_or(Self::Param(*i)),
            Self::Named { name, args: own } => Self::Named {
                name: name.clone(),
                args: own.iter().map(|a| a.substitute(args)).collect(),
            },
        }
    }

    /// Check whether this is a built-in integer type
    #[must_use]
    pub fn is_integer(&self) -> bool {
        !self.is_generic() && self.name().is_some_and(|n| INTEGERS.contains(&n))
    }

    /// Check whether this is a built-in floating point type
    #[must_use]
    pub fn is_float(&self) -> bool {
        !self.is_generic() && matches!(self.name(), Some(F32 | F64))
    }

    /// Check whether values of this type can legitimately be null
    ///
    /// Built-in scalars (numbers, `bool`, `char`, `Uuid`) cannot; strings,
    /// collections and catalogued object types can.
    #[must_use]
    pub fn is_nullable(&self) -> bool {
        if self.is_integer() || self.is_float() {
            return false;
        }
        !matches!(self.name(), Some(BOOL | CHAR | UUID) | None)
    }
}

impl Display for TypeRef {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Param(i) => write!(f, "T{i}"),
            Self::Named { name, args } if args.is_empty() => write!(f, "{name}"),
            Self::Named { name, args } => {
                write!(f, "{name}<")?;
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{arg}")?;
                }
                write!(f, ">")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_generic() {
        let t = TypeRef::generic("Pair", vec![TypeRef::i32(), TypeRef::string()]);
        assert_eq!(t.to_string(), "Pair<i32, String>");
    }

    #[test]
    fn substitute_closes_placeholders() {
        let open = TypeRef::seq(TypeRef::param(0));
        assert!(open.is_open());

        let closed = open.substitute(&[TypeRef::string()]);
        assert_eq!(closed, TypeRef::seq(TypeRef::string()));
        assert!(!closed.is_open());
    }

    #[test]
    fn substitute_keeps_missing_placeholders() {
        let open = TypeRef::map(TypeRef::param(0), TypeRef::param(1));
        let partly = open.substitute(&[TypeRef::i32()]);
        assert_eq!(partly, TypeRef::map(TypeRef::i32(), TypeRef::param(1)));
    }

    #[test]
    fn single_arg_only_for_one_parameter() {
        assert!(TypeRef::list(TypeRef::i32()).single_arg().is_some());
        assert!(TypeRef::map(TypeRef::i32(), TypeRef::i32()).single_arg().is_none());
        assert!(TypeRef::i32().single_arg().is_none());
    }

    #[test]
    fn nullability() {
        assert!(!TypeRef::i32().is_nullable());
        assert!(!TypeRef::uuid().is_nullable());
        assert!(TypeRef::string().is_nullable());
        assert!(TypeRef::named("Widget").is_nullable());
        assert!(!TypeRef::param(0).is_nullable());
    }
}
