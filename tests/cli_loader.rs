//! Snapshot file loading round-trip tests

use serde_json::json;
use stateview::cli::{load_schemas, load_state};
use stateview::error::MarshalError;
use stateview::marshal::marshal_state;
use std::io::Write;
use tempfile::NamedTempFile;

fn write_temp(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file
}

const SNAPSHOT: &str = r#"{
    "modules": [
        {
            "resources": [
                {
                    "mode": "managed",
                    "type": "test_thing",
                    "name": "bar",
                    "provider": "registry.example.org/vendor/test",
                    "instances": [
                        {
                            "attributes": {"woozles": "confuzles"},
                            "sensitive_paths": [
                                [{"type": "get_attr", "value": "woozles"}]
                            ]
                        }
                    ]
                }
            ]
        }
    ],
    "outputs": {
        "greeting": {"value": "hello", "type": "string"}
    }
}"#;

const SCHEMAS: &str = r#"{
    "registry.example.org/vendor/test": {
        "resource_types": {
            "test_thing": {
                "attributes": {
                    "woozles": {"type": "string", "optional": true},
                    "foozles": {"type": "string", "optional": true, "sensitive": true}
                }
            }
        }
    }
}"#;

#[test]
fn test_snapshot_files_marshal_end_to_end() {
    let state_file = write_temp(SNAPSHOT);
    let schema_file = write_temp(SCHEMAS);

    let state = load_state(state_file.path()).unwrap();
    let schemas = load_schemas(schema_file.path()).unwrap();
    let document = marshal_state(&state, &schemas).unwrap();

    let rendered = serde_json::to_value(&document).unwrap();
    assert_eq!(rendered["format_version"], json!("1.0"));
    assert_eq!(
        rendered["values"]["outputs"]["greeting"]["value"],
        json!("hello")
    );

    let resource = &rendered["values"]["root_module"]["resources"][0];
    assert_eq!(resource["address"], json!("test_thing.bar"));
    assert_eq!(resource["values"]["woozles"], json!("confuzles"));
    // Both sensitivity sources land in the mask: the recorded path and
    // the schema flag.
    assert_eq!(
        resource["sensitive_values"],
        json!({"foozles": true, "woozles": true})
    );
}

#[test]
fn test_missing_snapshot_file_is_reported() {
    let err = load_state(std::path::Path::new("/nonexistent/state.json")).unwrap_err();
    assert!(matches!(err, MarshalError::Snapshot(_)));
    assert!(err.to_string().contains("/nonexistent/state.json"));
}

#[test]
fn test_malformed_snapshot_is_reported() {
    let state_file = write_temp("{\"modules\": 42}");
    assert!(matches!(
        load_state(state_file.path()),
        Err(MarshalError::Snapshot(_))
    ));
}
