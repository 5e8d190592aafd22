//! Relays
//!
//! A relay answers a request by translating it into another request and
//! resolving that through the context. Relays own no state.

use specimen_kernel::type_ref::{LIST, MAP, OPTION, SEQ, SET, STRING};
use specimen_kernel::{
    MemberKind, Request, SpecimenBuilder, SpecimenContext, SpecimenError, Specimen, TypeRef, Value,
};

/// Resolves a seeded request as the plain type request, dropping the seed
#[derive(Debug, Clone, Copy, Default)]
pub struct SeedIgnoringRelay;

impl SpecimenBuilder for SeedIgnoringRelay {
    fn create(
        &self,
        request: &Request,
        context: &dyn SpecimenContext,
    ) -> Result<Specimen, SpecimenError> {
        match request {
            Request::Seeded(seeded) => context.resolve(&Request::of_type(seeded.type_ref.clone())),
            _ => Ok(Specimen::NoSpecimen),
        }
    }
}

/// Prefixes a generated string with its textual seed
#[derive(Debug, Clone, Copy, Default)]
pub struct StringSeedRelay;

impl SpecimenBuilder for StringSeedRelay {
    fn create(
        &self,
        request: &Request,
        context: &dyn SpecimenContext,
    ) -> Result<Specimen, SpecimenError> {
        let Request::Seeded(seeded) = request else {
            return Ok(Specimen::NoSpecimen);
        };
        let Value::Str(prefix) = &seeded.seed else {
            return Ok(Specimen::NoSpecimen);
        };
        if seeded.type_ref.name() != Some(STRING) || seeded.type_ref.is_generic() {
            return Ok(Specimen::NoSpecimen);
        }
        match context.resolve(&Request::of_type(TypeRef::string()))? {
            Specimen::Created(Value::Str(generated)) => {
                Ok(Specimen::Created(Value::Str(format!("{prefix}{generated}"))))
            }
            _ => Ok(Specimen::NoSpecimen),
        }
    }
}

/// Turns field, property and parameter requests into seeded requests named
/// after the member
#[derive(Debug, Clone, Copy, Default)]
pub struct MemberRequestRelay;

impl SpecimenBuilder for MemberRequestRelay {
    fn create(
        &self,
        request: &Request,
        context: &dyn SpecimenContext,
    ) -> Result<Specimen, SpecimenError> {
        match request {
            Request::Member(member) => {
                let seed = Value::str(member.name.clone());
                context.resolve(&Request::seeded(member.type_ref.clone(), seed))
            }
            _ => Ok(Specimen::NoSpecimen),
        }
    }
}

/// Answers an omitted `Seq`, `List` or `Set` parameter with an empty
/// sequence
///
/// Parameters of other types, fields and properties are declined.
#[derive(Debug, Clone, Copy, Default)]
pub struct OmitSequenceParameterRelay;

impl SpecimenBuilder for OmitSequenceParameterRelay {
    fn create(
        &self,
        request: &Request,
        context: &dyn SpecimenContext,
    ) -> Result<Specimen, SpecimenError> {
        let Request::Member(member) = request else {
            return Ok(Specimen::NoSpecimen);
        };
        let is_sequence = matches!(member.type_ref.name(), Some(SEQ | LIST | SET))
            && member.type_ref.single_arg().is_some();
        if member.kind != MemberKind::Parameter || !is_sequence {
            return Ok(Specimen::NoSpecimen);
        }
        let seeded = Request::seeded(member.type_ref.clone(), Value::str(member.name.clone()));
        match context.resolve(&seeded)? {
            Specimen::Omitted => Ok(Specimen::Created(Value::Seq(Vec::new()))),
            other => Ok(other),
        }
    }
}

/// Turns a many-request into a finite sequence of the effective count
#[derive(Debug, Clone, Copy)]
pub struct MultipleRelay {
    count: usize,
}

impl MultipleRelay {
    /// Create relay with the default item count
    #[inline]
    #[must_use]
    pub fn new(count: usize) -> Self {
        Self { count }
    }

    /// Default item count
    #[inline]
    #[must_use]
    pub fn count(&self) -> usize {
        self.count
    }
}

impl SpecimenBuilder for MultipleRelay {
    fn create(
        &self,
        request: &Request,
        context: &dyn SpecimenContext,
    ) -> Result<Specimen, SpecimenError> {
        let Request::Many(many) = request else {
            return Ok(Specimen::NoSpecimen);
        };
        let count = many.resolve_count(self.count)?;
        context.resolve(&Request::finite_sequence(many.inner().clone(), count))
    }
}

/// Resolves each item of a finite sequence request
///
/// Omitted items are left out; a declined item declines the whole sequence.
#[derive(Debug, Clone, Copy, Default)]
pub struct FiniteSequenceRelay;

impl SpecimenBuilder for FiniteSequenceRelay {
    fn create(
        &self,
        request: &Request,
        context: &dyn SpecimenContext,
    ) -> Result<Specimen, SpecimenError> {
        let Request::FiniteSequence(sequence) = request else {
            return Ok(Specimen::NoSpecimen);
        };
        let mut items = Vec::with_capacity(sequence.count());
        for item in sequence.create_requests() {
            match context.resolve(&item)? {
                Specimen::Created(value) => items.push(value),
                Specimen::Omitted => {}
                Specimen::NoSpecimen => return Ok(Specimen::NoSpecimen),
            }
        }
        Ok(Specimen::Created(Value::Seq(items)))
    }
}

fn resolve_items(
    element: &TypeRef,
    context: &dyn SpecimenContext,
) -> Result<Option<Vec<Value>>, SpecimenError> {
    match context.resolve(&Request::many(Request::of_type(element.clone())))? {
        Specimen::Created(Value::Seq(items)) => Ok(Some(items)),
        _ => Ok(None),
    }
}

/// Fills `Seq<T>`, `List<T>` and `Set<T>` from a many-request for `T`
///
/// Sets drop repeated items.
#[derive(Debug, Clone, Copy, Default)]
pub struct SequenceRelay;

impl SpecimenBuilder for SequenceRelay {
    fn create(
        &self,
        request: &Request,
        context: &dyn SpecimenContext,
    ) -> Result<Specimen, SpecimenError> {
        let Some(type_ref) = request.as_type() else {
            return Ok(Specimen::NoSpecimen);
        };
        let unique = match type_ref.name() {
            Some(SEQ | LIST) => false,
            Some(SET) => true,
            _ => return Ok(Specimen::NoSpecimen),
        };
        let Some(element) = type_ref.single_arg() else {
            return Ok(Specimen::NoSpecimen);
        };
        let Some(mut items) = resolve_items(element, context)? else {
            return Ok(Specimen::NoSpecimen);
        };
        if unique {
            let mut seen = Vec::with_capacity(items.len());
            items.retain(|item| {
                if seen.contains(item) {
                    false
                } else {
                    seen.push(item.clone());
                    true
                }
            });
        }
        Ok(Specimen::Created(Value::Seq(items)))
    }
}

/// Fills `Map<K, V>` by pairing many keys with many values
#[derive(Debug, Clone, Copy, Default)]
pub struct MapRelay;

impl SpecimenBuilder for MapRelay {
    fn create(
        &self,
        request: &Request,
        context: &dyn SpecimenContext,
    ) -> Result<Specimen, SpecimenError> {
        let Some(type_ref) = request.as_type().filter(|t| t.name() == Some(MAP)) else {
            return Ok(Specimen::NoSpecimen);
        };
        let [key_type, value_type] = type_ref.args() else {
            return Ok(Specimen::NoSpecimen);
        };
        let Some(keys) = resolve_items(key_type, context)? else {
            return Ok(Specimen::NoSpecimen);
        };
        let Some(values) = resolve_items(value_type, context)? else {
            return Ok(Specimen::NoSpecimen);
        };

        let mut entries: Vec<(Value, Value)> = Vec::with_capacity(keys.len());
        for (key, value) in keys.into_iter().zip(values) {
            if !entries.iter().any(|(k, _)| *k == key) {
                entries.push((key, value));
            }
        }
        Ok(Specimen::Created(Value::Map(entries)))
    }
}

/// Resolves `Option<T>` to a present `T`
#[derive(Debug, Clone, Copy, Default)]
pub struct OptionRelay;

impl SpecimenBuilder for OptionRelay {
    fn create(
        &self,
        request: &Request,
        context: &dyn SpecimenContext,
    ) -> Result<Specimen, SpecimenError> {
        let Some(inner) = request
            .as_type()
            .filter(|t| t.name() == Some(OPTION))
            .and_then(TypeRef::single_arg)
        else {
            return Ok(Specimen::NoSpecimen);
        };
        context.resolve(&Request::of_type(inner.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use specimen_kernel::builders::FnBuilder;
    use specimen_kernel::{BuilderRef, CompositeSpecimenBuilder, SpecimenContainer};
    use std::sync::Arc;

    /// Relays over a stub answering `i32` with 5, `char` with 'c' and
    /// `String` with "gen"
    fn container(relays: Vec<BuilderRef>) -> SpecimenContainer {
        let stub = FnBuilder::new(|request: &Request, _: &dyn SpecimenContext| {
            Ok(match request.as_type().and_then(TypeRef::name) {
                Some("i32") => Specimen::created(5),
                Some("char") => Specimen::Created(Value::Char('c')),
                Some("String") => Specimen::created("gen"),
                _ => Specimen::NoSpecimen,
            })
        });
        let mut builders: Vec<BuilderRef> = vec![Arc::new(stub)];
        builders.extend(relays);
        SpecimenContainer::new(Arc::new(CompositeSpecimenBuilder::new(builders)))
    }

    fn collections() -> Vec<BuilderRef> {
        vec![
            Arc::new(MultipleRelay::new(3)),
            Arc::new(FiniteSequenceRelay),
            Arc::new(SequenceRelay),
            Arc::new(MapRelay),
        ]
    }

    #[test]
    fn member_request_resolves_through_seed_to_type() {
        let c = container(vec![
            Arc::new(MemberRequestRelay),
            Arc::new(StringSeedRelay),
            Arc::new(SeedIgnoringRelay),
        ]);
        assert_eq!(c.create(&Request::parameter("count", TypeRef::i32())).unwrap(), Value::Int(5));
        let name = c.create(&Request::property("name", TypeRef::string())).unwrap();
        assert_eq!(name, Value::str("namegen"));
    }

    #[test]
    fn omitted_sequence_parameter_becomes_empty() {
        let omit_seeded = FnBuilder::new(|request: &Request, _: &dyn SpecimenContext| {
            Ok(match request {
                Request::Seeded(_) => Specimen::Omitted,
                _ => Specimen::NoSpecimen,
            })
        });
        let c = container(vec![Arc::new(OmitSequenceParameterRelay), Arc::new(omit_seeded)]);

        let items = Request::parameter("items", TypeRef::list(TypeRef::i32()));
        assert_eq!(c.create(&items).unwrap(), Value::Seq(Vec::new()));

        // properties and scalar parameters are left to other relays
        let property = Request::property("items", TypeRef::list(TypeRef::i32()));
        assert_eq!(c.resolve(&property).unwrap(), Specimen::NoSpecimen);
        assert_eq!(
            c.resolve(&Request::parameter("n", TypeRef::i32())).unwrap(),
            Specimen::NoSpecimen
        );
    }

    #[test]
    fn sequence_parameter_resolves_normally_when_not_omitted() {
        let mut relays = collections();
        relays.insert(0, Arc::new(OmitSequenceParameterRelay));
        relays.push(Arc::new(SeedIgnoringRelay));
        let c = container(relays);
        let items = c.create(&Request::parameter("items", TypeRef::seq(TypeRef::i32()))).unwrap();
        assert_eq!(items, Value::Seq(vec![Value::Int(5); 3]));
    }

    #[test]
    fn string_seed_relay_requires_text_seed() {
        let c = container(vec![Arc::new(StringSeedRelay)]);
        let unseeded = Request::seeded(TypeRef::string(), Value::Null);
        assert_eq!(c.resolve(&unseeded).unwrap(), Specimen::NoSpecimen);
    }

    #[test]
    fn many_uses_default_or_explicit_count() {
        let c = container(collections());
        assert_eq!(c.create_many(Request::of_type(TypeRef::i32()), None).unwrap().len(), 3);
        assert_eq!(c.create_many(Request::of_type(TypeRef::i32()), Some(5)).unwrap().len(), 5);
    }

    #[test]
    fn finite_sequence_declines_when_an_item_declines() {
        let c = container(collections());
        let request = Request::finite_sequence(Request::of_type(TypeRef::named("Unknown")), 2);
        assert_eq!(c.resolve(&request).unwrap(), Specimen::NoSpecimen);
    }

    #[test]
    fn finite_sequence_skips_omitted_items() {
        let omit = FnBuilder::new(|request: &Request, _: &dyn SpecimenContext| {
            Ok(if request.as_type() == Some(&TypeRef::bool()) {
                Specimen::Omitted
            } else {
                Specimen::NoSpecimen
            })
        });
        let c = container(vec![Arc::new(omit), Arc::new(FiniteSequenceRelay)]);
        let request = Request::finite_sequence(Request::of_type(TypeRef::bool()), 4);
        assert_eq!(c.create(&request).unwrap(), Value::Seq(vec![]));
    }

    #[test]
    fn sequences_lists_and_sets() {
        let c = container(collections());
        let list = c.create(&Request::of_type(TypeRef::list(TypeRef::i32()))).unwrap();
        assert_eq!(list, Value::Seq(vec![Value::Int(5); 3]));

        let set = c.create(&Request::of_type(TypeRef::set(TypeRef::i32()))).unwrap();
        assert_eq!(set, Value::Seq(vec![Value::Int(5)]));
    }

    #[test]
    fn map_keeps_first_value_per_key() {
        let c = container(collections());
        let request = Request::of_type(TypeRef::map(TypeRef::char(), TypeRef::i32()));
        let map = c.create(&request).unwrap();
        assert_eq!(map, Value::Map(vec![(Value::Char('c'), Value::Int(5))]));
    }

    #[test]
    fn option_resolves_inner_type() {
        let c = container(vec![Arc::new(OptionRelay)]);
        let present = c.create(&Request::of_type(TypeRef::option(TypeRef::i32()))).unwrap();
        assert_eq!(present, Value::Int(5));
        assert_eq!(
            c.resolve(&Request::of_type(TypeRef::option(TypeRef::named("Unknown")))).unwrap(),
            Specimen::NoSpecimen
        );
    }
}
