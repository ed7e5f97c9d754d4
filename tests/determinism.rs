//! Property-based tests for masking and determinism guarantees

use proptest::prelude::*;
use stateview::addrs::{InstanceKey, ModuleInstance, ProviderAddr, ResourceAddr, ResourceMode};
use stateview::marks::redaction_mask;
use stateview::marshal::marshal_state;
use stateview::schema::{AttributeSchema, ResourceSchema, SchemaTable};
use stateview::state::{InstanceObject, State};
use stateview::value::{Mark, Repr, Type, Value};

/// Strategy producing arbitrary unmarked values
fn value_strategy() -> impl Strategy<Value = Value> {
    let leaf = prop_oneof![
        Just(Value::null(Type::String)),
        Just(Value::unknown(Type::Map(Box::new(Type::String)))),
        any::<bool>().prop_map(Value::boolean),
        any::<i64>().prop_map(Value::number_int),
        "[a-z]{0,8}".prop_map(|s| Value::string(&s)),
    ];
    leaf.prop_recursive(3, 24, 4, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..4).prop_map(Value::list),
            prop::collection::vec(inner.clone(), 0..4).prop_map(Value::set),
            prop::collection::vec(inner.clone(), 0..4).prop_map(Value::tuple),
            prop::collection::btree_map("[a-z]{1,6}", inner.clone(), 0..4).prop_map(Value::map),
            prop::collection::btree_map("[a-z]{1,6}", inner, 0..4).prop_map(Value::object),
        ]
    })
}

/// True if the mask contains `true` anywhere in its structure
fn contains_true(mask: &Value) -> bool {
    match mask.repr() {
        Repr::Bool(b) => *b,
        Repr::List(elements) | Repr::Set(elements) | Repr::Tuple(elements) => {
            elements.iter().any(contains_true)
        }
        Repr::Map(entries) | Repr::Object(entries) => entries.values().any(contains_true),
        _ => false,
    }
}

/// Masking unmarked data never produces `true` anywhere
#[test]
fn test_unmarked_values_mask_all_false() {
    let mut runner = proptest::test_runner::TestRunner::default();

    runner
        .run(&value_strategy(), |value| {
            let mask = redaction_mask(&value);
            assert!(
                !contains_true(&mask),
                "mask of unmarked value contains true: {:?}",
                mask
            );
            Ok(())
        })
        .unwrap();
}

/// A marked value masks to exactly `true`, whatever its structure
#[test]
fn test_mark_dominance() {
    let mut runner = proptest::test_runner::TestRunner::default();

    runner
        .run(&value_strategy(), |value| {
            let mask = redaction_mask(&value.mark(Mark::Sensitive));
            assert_eq!(mask, Value::boolean(true));
            Ok(())
        })
        .unwrap();
}

/// List masks always mirror the list's length, never compacted
#[test]
fn test_list_masks_preserve_length() {
    let mut runner = proptest::test_runner::TestRunner::default();

    runner
        .run(
            &prop::collection::vec(value_strategy(), 0..6),
            |elements| {
                let len = elements.len();
                let mask = redaction_mask(&Value::list(elements));
                match mask.repr() {
                    Repr::Tuple(masks) => assert_eq!(masks.len(), len),
                    other => panic!("list mask is not tuple-shaped: {:?}", other),
                }
                Ok(())
            },
        )
        .unwrap();
}

/// Masking is stable: the same value always produces the same mask
#[test]
fn test_masking_is_deterministic() {
    let mut runner = proptest::test_runner::TestRunner::default();

    runner
        .run(&value_strategy(), |value| {
            assert_eq!(redaction_mask(&value), redaction_mask(&value));
            Ok(())
        })
        .unwrap();
}

/// Document rendering is byte-identical across repeated marshals
#[test]
fn test_document_rendering_is_byte_identical() {
    let mut runner = proptest::test_runner::TestRunner::default();

    let provider = ProviderAddr::new("registry.example.org", "vendor", "test");
    let mut schemas = SchemaTable::new();
    schemas.insert(
        &provider,
        ResourceMode::Managed,
        "test_thing",
        ResourceSchema::new(vec![
            (
                "woozles".to_string(),
                AttributeSchema::optional(Type::String),
            ),
            (
                "foozles".to_string(),
                AttributeSchema::optional(Type::String).sensitive(),
            ),
        ]),
    );

    runner
        .run(
            &prop::collection::btree_map("[a-z]{1,8}", "[a-z]{0,8}", 1..4),
            |names| {
                let mut state = State::new();
                for (name, woozles) in &names {
                    let attrs = format!(r#"{{"woozles":{:?}}}"#, woozles);
                    state.set_resource_instance_current(
                        &ModuleInstance::root(),
                        &ResourceAddr::managed("test_thing", name),
                        InstanceKey::NoKey,
                        &provider,
                        InstanceObject::ready(attrs.as_bytes()),
                    );
                }

                let first = marshal_state(&state, &schemas).unwrap().render().unwrap();
                let second = marshal_state(&state, &schemas).unwrap().render().unwrap();
                assert_eq!(first, second);
                Ok(())
            },
        )
        .unwrap();
}
