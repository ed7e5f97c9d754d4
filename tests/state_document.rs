//! End-to-end snapshot to document tests

use serde_json::json;
use stateview::addrs::{
    DeposedKey, InstanceKey, ModuleInstance, ProviderAddr, ResourceAddr, ResourceMode,
};
use stateview::decode::decode_attributes;
use stateview::marshal::marshal_state;
use stateview::schema::{AttributeSchema, ResourceSchema, SchemaRegistry, SchemaTable};
use stateview::state::{InstanceObject, OutputValue, State};
use stateview::value::path::Step;
use stateview::value::{Path, PathMark, Type, Value};

fn provider() -> ProviderAddr {
    ProviderAddr::new("registry.example.org", "vendor", "test")
}

fn test_schemas() -> SchemaTable {
    let mut table = SchemaTable::new();
    table.insert(
        &provider(),
        ResourceMode::Managed,
        "test_thing",
        ResourceSchema::new(vec![
            (
                "woozles".to_string(),
                AttributeSchema::optional_computed(Type::String),
            ),
            (
                "foozles".to_string(),
                AttributeSchema::optional(Type::String).sensitive(),
            ),
        ]),
    );
    table.insert(
        &provider(),
        ResourceMode::Data,
        "test_source",
        ResourceSchema::new(vec![
            (
                "id".to_string(),
                AttributeSchema::optional_computed(Type::String),
            ),
            (
                "tags".to_string(),
                AttributeSchema::optional(Type::Map(Box::new(Type::String))),
            ),
        ]),
    );
    table
}

fn full_state() -> State {
    let mut state = State::new();

    state.set_output(
        "greeting",
        OutputValue::new(
            Value::map(vec![("beep".to_string(), Value::string("boop"))]),
            Type::Map(Box::new(Type::String)),
        ),
    );
    state.set_output(
        "password",
        OutputValue::new(Value::string("sekret"), Type::String).sensitive(),
    );

    let root_thing = ResourceAddr::managed("test_thing", "bar");
    state.set_resource_instance_current(
        &ModuleInstance::root(),
        &root_thing,
        InstanceKey::NoKey,
        &provider(),
        InstanceObject::ready(br#"{"woozles":"confuzles"}"#),
    );
    state.set_resource_instance_deposed(
        &ModuleInstance::root(),
        &root_thing,
        InstanceKey::NoKey,
        DeposedKey::new("00000002").unwrap(),
        &provider(),
        InstanceObject::ready(br#"{"woozles":"replaced"}"#),
    );

    let child = ModuleInstance::parse("module.child").unwrap();
    state.set_resource_instance_current(
        &child,
        &ResourceAddr::data("test_source", "src"),
        InstanceKey::NoKey,
        &provider(),
        InstanceObject::ready(br#"{"id":"d-1","tags":{"env":"prod","owner":"ops"}}"#)
            .with_sensitive_paths(vec![PathMark::sensitive(Path::new(vec![
                Step::field("tags"),
                Step::index_string("owner"),
            ]))]),
    );

    let submodule = ModuleInstance::parse("module.child.module.submodule").unwrap();
    state.set_resource_instance_current(
        &submodule,
        &ResourceAddr::managed("test_thing", "deep"),
        InstanceKey::Int(0),
        &provider(),
        InstanceObject::ready(br#"{"woozles":"nested","foozles":"sensuzles"}"#),
    );

    state
}

#[test]
fn test_full_document_structure() {
    let document = marshal_state(&full_state(), &test_schemas()).unwrap();
    let rendered = serde_json::to_value(&document).unwrap();

    assert_eq!(
        rendered,
        json!({
            "format_version": "1.0",
            "values": {
                "outputs": {
                    "greeting": {
                        "value": {"beep": "boop"},
                        "type": ["map", "string"],
                        "sensitive": false
                    },
                    "password": {
                        "value": "sekret",
                        "type": "string",
                        "sensitive": true
                    }
                },
                "root_module": {
                    "resources": [
                        {
                            "address": "test_thing.bar",
                            "mode": "managed",
                            "type": "test_thing",
                            "name": "bar",
                            "provider_name": "registry.example.org/vendor/test",
                            "values": {"foozles": null, "woozles": "confuzles"},
                            "sensitive_values": {"foozles": true}
                        },
                        {
                            "address": "test_thing.bar",
                            "mode": "managed",
                            "type": "test_thing",
                            "name": "bar",
                            "deposed_key": "00000002",
                            "provider_name": "registry.example.org/vendor/test",
                            "values": {"foozles": null, "woozles": "replaced"},
                            "sensitive_values": {"foozles": true}
                        }
                    ],
                    "child_modules": [
                        {
                            "address": "module.child",
                            "resources": [
                                {
                                    "address": "module.child.data.test_source.src",
                                    "mode": "data",
                                    "type": "test_source",
                                    "name": "src",
                                    "provider_name": "registry.example.org/vendor/test",
                                    "values": {
                                        "id": "d-1",
                                        "tags": {"env": "prod", "owner": "ops"}
                                    },
                                    "sensitive_values": {"tags": {"owner": true}}
                                }
                            ],
                            "child_modules": [
                                {
                                    "address": "module.child.module.submodule",
                                    "resources": [
                                        {
                                            "address": "module.child.module.submodule.test_thing.deep[0]",
                                            "mode": "managed",
                                            "type": "test_thing",
                                            "name": "deep",
                                            "index": 0,
                                            "provider_name": "registry.example.org/vendor/test",
                                            "values": {
                                                "foozles": "sensuzles",
                                                "woozles": "nested"
                                            },
                                            "sensitive_values": {"foozles": true}
                                        }
                                    ]
                                }
                            ]
                        }
                    ]
                }
            }
        })
    );
}

#[test]
fn test_rendering_is_byte_identical_across_runs() {
    let state = full_state();
    let schemas = test_schemas();
    let first = marshal_state(&state, &schemas).unwrap().render().unwrap();
    let second = marshal_state(&state, &schemas).unwrap().render().unwrap();
    assert_eq!(first, second);

    // Keys serialize sorted at every level, so the fragments themselves
    // are stable too.
    assert!(first.contains(r#""values":{"foozles":null,"woozles":"confuzles"}"#));
    assert!(first.contains(r#""tags":{"env":"prod","owner":"ops"}"#));
}

#[test]
fn test_attribute_values_round_trip_through_decode() {
    let schemas = test_schemas();
    let schema = schemas
        .lookup(&provider(), "test_thing", ResourceMode::Managed)
        .unwrap();
    let decoded = decode_attributes(br#"{"woozles":"confuzles","foozles":"sensuzles"}"#, schema)
        .unwrap();

    let document = marshal_state(&full_state(), &test_schemas()).unwrap();
    let values = &document.values.as_ref().unwrap().root_module.child_modules[0].child_modules
        [0]
    .resources[0]
        .values;
    let re_encoded = serde_json::to_vec(values).unwrap();
    let re_decoded = decode_attributes(&re_encoded, schema).unwrap();

    // Sensitivity marking never alters the plaintext attribute values.
    assert_eq!(
        re_decoded,
        decode_attributes(br#"{"woozles":"nested","foozles":"sensuzles"}"#, schema).unwrap()
    );
    assert_ne!(re_decoded, decoded);
}

#[test]
fn test_missing_schema_fails_the_whole_marshal() {
    let mut state = full_state();
    state.set_resource_instance_current(
        &ModuleInstance::root(),
        &ResourceAddr::managed("unregistered_thing", "x"),
        InstanceKey::NoKey,
        &provider(),
        InstanceObject::ready(br#"{}"#),
    );
    assert!(marshal_state(&state, &test_schemas()).is_err());
}
