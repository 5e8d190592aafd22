use pretty_assertions::assert_eq;
use proptest::prelude::*;
use specimen_fixture::prelude::*;
use specimen_kernel::trace::{RecordingTraceSink, TraceEvent};
use specimen_test_utils::{
    category, holder_of, init_tracing, node, pair_of, person, sample_catalog_ref, CATEGORY,
};

fn fixture() -> Fixture {
    init_tracing();
    Fixture::new(sample_catalog_ref())
}

fn fixture_with(policy: RecursionPolicy) -> Fixture {
    init_tracing();
    Fixture::with_config(sample_catalog_ref(), FixtureConfig::new().with_recursion(policy)).unwrap()
}

#[test]
fn test_pair_is_built_from_generated_members() {
    let pair = fixture().create(&pair_of(TypeRef::i32(), TypeRef::string())).unwrap();
    let object = pair.as_object().unwrap();

    assert!(object.field("first").and_then(Value::as_int).is_some_and(|n| n != 0));
    let second = object.field("second").and_then(Value::as_str).unwrap();
    assert!(second.starts_with("second"));
    assert!(second.len() > "second".len());
}

#[test]
fn test_self_referential_constructor_fails_by_default() {
    let err = fixture().create(&node()).unwrap_err();
    assert!(err.is_circular_reference());

    match err.as_specimen_error() {
        Some(SpecimenError::CircularReference { path, .. }) => {
            assert_eq!(path.first().map(String::as_str), Some("Node"));
            assert_eq!(path.last().map(String::as_str), Some("Node"));
        }
        other => panic!("expected circular reference, got {other:?}"),
    }
}

#[test]
fn test_null_policy_breaks_constructor_cycle_with_null() {
    let node = fixture_with(RecursionPolicy::Null).create(&node()).unwrap();
    assert_eq!(node.as_object().unwrap().field("next"), Some(&Value::Null));
}

#[test]
fn test_omit_policy_leaves_recursive_property_unset() {
    let category = fixture_with(RecursionPolicy::Omit).create(&category()).unwrap();
    let object = category.as_object().unwrap();

    assert_eq!(object.type_ref, TypeRef::named(CATEGORY));
    assert!(object.field("title").is_some());
    assert_eq!(object.field("parent"), None);
}

#[test]
fn test_null_policy_nulls_recursive_property() {
    let category = fixture_with(RecursionPolicy::Null).create(&category()).unwrap();
    assert_eq!(category.as_object().unwrap().field("parent"), Some(&Value::Null));
}

#[test]
fn test_recursive_property_fails_by_default() {
    assert!(fixture().create(&category()).unwrap_err().is_circular_reference());
}

#[test]
fn test_sequence_favoring_constructor_fills_items() {
    let mut fixture = fixture();
    let holder = holder_of(TypeRef::i32());
    fixture
        .customize(&ConstructorCustomization::new(
            holder.clone(),
            Arc::new(SequenceFavoringConstructorQuery::new()),
        ))
        .unwrap();

    let created = fixture.create(&holder).unwrap();
    let items = created.as_object().and_then(|o| o.field("items")).and_then(Value::as_seq).unwrap();
    assert_eq!(items.len(), fixture.repeat_count());
}

#[test]
fn test_auto_properties_populate_person() {
    let person = fixture().create(&person()).unwrap();
    let object = person.as_object().unwrap();

    assert!(object.field("name").and_then(Value::as_str).is_some_and(|s| s.starts_with("name")));
    assert!(object.field("age").and_then(Value::as_int).is_some());
    assert!(object.field("nickname").and_then(Value::as_str).is_some());
}

#[test]
fn test_auto_properties_can_be_switched_off() {
    let config = FixtureConfig::new().with_omit_auto_properties(true);
    let fixture = Fixture::with_config(sample_catalog_ref(), config).unwrap();
    let person = fixture.create(&person()).unwrap();
    assert!(person.as_object().unwrap().fields.is_empty());
}

#[test]
fn test_frozen_value_is_reused_inside_objects() {
    let mut fixture = fixture();
    let frozen = fixture.freeze(&TypeRef::string()).unwrap();

    let pair = fixture.create(&pair_of(TypeRef::i32(), TypeRef::string())).unwrap();
    assert_eq!(pair.as_object().unwrap().field("second"), Some(&frozen));
}

#[test]
fn test_injected_value_wins_over_engine() {
    let mut fixture = fixture();
    fixture.inject(TypeRef::i32(), Value::Int(-4)).unwrap();
    let pair = fixture.create(&pair_of(TypeRef::i32(), TypeRef::i32())).unwrap();
    let object = pair.as_object().unwrap();
    assert_eq!(object.field("first"), Some(&Value::Int(-4)));
    assert_eq!(object.field("second"), Some(&Value::Int(-4)));
}

#[test]
fn test_create_many_uses_repeat_count() {
    let mut fixture = fixture();
    assert_eq!(fixture.create_many(&TypeRef::uuid(), None).unwrap().len(), 3);

    fixture.set_repeat_count(7).unwrap();
    assert_eq!(fixture.create_many(&TypeRef::uuid(), None).unwrap().len(), 7);
    assert_eq!(fixture.create_many(&TypeRef::uuid(), Some(2)).unwrap().len(), 2);
}

#[test]
fn test_collections_resolve_through_relays() {
    let fixture = fixture();
    let map = fixture.create(&TypeRef::map(TypeRef::i32(), TypeRef::string())).unwrap();
    match map {
        Value::Map(entries) => assert_eq!(entries.len(), 3),
        other => panic!("expected map, got {other}"),
    }

    let nested = fixture.create(&TypeRef::list(pair_of(TypeRef::i32(), TypeRef::bool()))).unwrap();
    assert_eq!(nested.as_seq().map(<[Value]>::len), Some(3));
}

#[test]
fn test_registered_factory_sees_the_fixture() {
    let mut fixture = fixture();
    fixture.inject(TypeRef::i32(), Value::Int(6)).unwrap();
    fixture
        .register(TypeRef::named("Doubled"), |context| {
            match context.resolve(&Request::of_type(TypeRef::i32()))? {
                Specimen::Created(Value::Int(n)) => Ok(Value::Int(n * 2)),
                _ => Ok(Value::Null),
            }
        })
        .unwrap();
    assert_eq!(fixture.create(&TypeRef::named("Doubled")).unwrap(), Value::Int(12));
}

#[test]
fn test_tracing_behavior_sees_nested_requests() {
    let mut fixture = fixture();
    let sink = Arc::new(RecordingTraceSink::new());
    fixture.add_behavior(Arc::new(TracingBehavior::new(sink.clone()))).unwrap();

    fixture.create(&pair_of(TypeRef::i32(), TypeRef::i32())).unwrap();
    let events = sink.events();

    assert!(matches!(events.first(), Some(TraceEvent::Requested { depth: 1, .. })));
    assert!(matches!(events.last(), Some(TraceEvent::Created { depth: 1, .. })));
    assert!(events.iter().any(|e| matches!(e, TraceEvent::Requested { depth, .. } if *depth > 1)));
}

#[test]
fn test_built_recipe_sets_and_skips_properties() {
    let fixture = fixture();
    let adult = fixture
        .build(&person())
        .with("age", Value::Int(30))
        .unwrap()
        .without("nickname")
        .unwrap();

    let created = adult.create(&fixture).unwrap();
    let object = created.as_object().unwrap();
    assert_eq!(object.field("age"), Some(&Value::Int(30)));
    assert_eq!(object.field("nickname"), None);
    assert!(object.field("name").is_some());
}

#[test]
fn test_branching_a_recipe_keeps_the_original() {
    let fixture = fixture();
    let base = fixture.build(&person()).with("age", Value::Int(1)).unwrap();
    let older = base.with("age", Value::Int(2)).unwrap();
    let bare = base.omit_auto_properties();

    let first = base.create(&fixture).unwrap();
    assert_eq!(first.as_object().unwrap().field("age"), Some(&Value::Int(1)));
    assert!(first.as_object().unwrap().field("name").is_some());

    let second = older.create(&fixture).unwrap();
    assert_eq!(second.as_object().unwrap().field("age"), Some(&Value::Int(2)));

    let third = bare.create(&fixture).unwrap();
    assert_eq!(third.as_object().unwrap().fields.len(), 1);
}

#[test]
fn test_recipe_honours_fixture_without_auto_properties() {
    let config = FixtureConfig::new().with_omit_auto_properties(true);
    let fixture = Fixture::with_config(sample_catalog_ref(), config).unwrap();
    let many = fixture.build(&person()).create_many(&fixture, Some(2)).unwrap();
    assert_eq!(many.len(), 2);
    assert!(many.iter().all(|p| p.as_object().is_some_and(|o| o.fields.is_empty())));
}

#[test]
fn test_unknown_type_is_unresolvable() {
    let err = fixture().create(&TypeRef::named("Nowhere")).unwrap_err();
    assert!(matches!(err.as_specimen_error(), Some(SpecimenError::Unresolvable { .. })));
}

proptest! {
    #[test]
    fn prop_many_returns_requested_count(count in 1usize..12) {
        let fixture = Fixture::new(sample_catalog_ref());
        let items = fixture.create_many(&TypeRef::i32(), Some(count)).unwrap();
        prop_assert_eq!(items.len(), count);
    }

    #[test]
    fn prop_numbers_are_distinct_within_one_fixture(n in 2usize..20) {
        let fixture = Fixture::new(sample_catalog_ref());
        let values: Vec<Value> = (0..n).map(|_| fixture.create(&TypeRef::i64()).unwrap()).collect();
        for (i, v) in values.iter().enumerate() {
            prop_assert_eq!(v.as_int(), Some(i64::try_from(i).unwrap() + 1));
        }
    }
}
