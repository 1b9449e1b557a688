//! Serde roundtrip and JsonSchema validation for the persisted entity types.

use lc_core::entities::*;
use lc_core::state::{TransitionKind, TransitionRecord};
use schemars::schema_for;

/// Validate a JSON value against a schemars-generated schema.
fn validate_against_schema(
    schema: &serde_json::Value,
    instance: &serde_json::Value,
) -> Vec<String> {
    let validator = jsonschema::validator_for(schema).expect("schema should be valid");
    validator
        .iter_errors(instance)
        .map(|e| format!("{e}"))
        .collect()
}

macro_rules! roundtrip_and_validate {
    ($name:ident, $ty:ty, $instance:expr) => {
        #[test]
        fn $name() {
            let val: $ty = $instance;

            let json_str = serde_json::to_string_pretty(&val).unwrap();
            let recovered: $ty = serde_json::from_str(&json_str).unwrap();
            assert_eq!(
                recovered,
                val,
                "serde roundtrip failed for {}",
                stringify!($ty)
            );

            let schema = serde_json::to_value(schema_for!($ty)).unwrap();
            let instance = serde_json::to_value(&val).unwrap();
            let errors = validate_against_schema(&schema, &instance);
            assert!(
                errors.is_empty(),
                "Schema validation failed for {}: {:?}",
                stringify!($ty),
                errors
            );
        }
    };
}

roundtrip_and_validate!(
    measurement_roundtrip,
    Measurement,
    Measurement {
        time: 59_612.312_5,
        magnitude: 22.13,
        magnitude_error: Some(0.081),
        filter: Some("r".into()),
    }
);

roundtrip_and_validate!(
    annotated_object_roundtrip,
    ObservedObject,
    ObservedObject {
        id: "1651589610221862935".into(),
        ra: Some(150.012),
        dec: Some(2.021),
        measurements: vec![Measurement {
            time: 59_580.1,
            magnitude: 22.4,
            magnitude_error: None,
            filter: None,
        }],
        annotations: Annotations {
            name: "DC2 SN Ia".into(),
            category: "transient".into(),
            note: "rise in g then r".into(),
        },
        snapshot: Some("data:image/svg+xml;base64,PHN2Zz48L3N2Zz4=".into()),
    }
);

roundtrip_and_validate!(
    bare_object_roundtrip,
    ObservedObject,
    ObservedObject::new("42", None, None)
);

roundtrip_and_validate!(
    query_parameters_roundtrip,
    QueryParameters,
    QueryParameters::default()
);

roundtrip_and_validate!(
    transition_record_roundtrip,
    TransitionRecord,
    TransitionRecord {
        kind: TransitionKind::AnnotationSaved,
        at: chrono::Utc::now(),
        detail: "object 42".into(),
    }
);

#[test]
fn browser_slot_layout_deserializes() {
    let stored = serde_json::json!([{
        "objectId": "7",
        "ra": 150.1,
        "dec": 2.0,
        "measurements": [{"mjd": 59_000.0, "mag": 21.0, "magerr": 0.1, "filter": "g"}],
        "annotations": {"name": "", "category": "", "note": "seen twice"},
        "png": "data:image/png;base64,iVBORw0KGgo="
    }]);
    let objects: Vec<ObservedObject> = serde_json::from_value(stored).unwrap();
    assert_eq!(objects[0].annotations.note, "seen twice");
    assert!(objects[0].snapshot.as_deref().unwrap().starts_with("data:image/png"));
}

#[test]
fn numeric_object_ids_read_as_decimal_text() {
    let stored = serde_json::json!([
        {"objectId": 1_249_537_790_362_809_267_u64, "annotations": {"name": "SN"}},
        {"objectId": " 42 "}
    ]);
    let objects: Vec<ObservedObject> = serde_json::from_value(stored).unwrap();
    assert_eq!(objects[0].id, "1249537790362809267");
    assert_eq!(objects[0].annotations.name, "SN");
    assert_eq!(objects[1].id, "42");
}

#[test]
fn null_time_or_magnitude_drops_only_that_measurement() {
    let stored = serde_json::json!([{
        "objectId": 7,
        "measurements": [
            {"mjd": 59_000.0, "mag": null, "magerr": null, "filter": "r"},
            {"mjd": 59_001.0, "mag": 21.5, "magerr": null, "filter": "g"},
            {"mjd": null, "mag": 20.0}
        ],
        "annotations": {"name": "", "category": "", "note": "keep me"}
    }]);
    let objects: Vec<ObservedObject> = serde_json::from_value(stored).unwrap();
    assert_eq!(
        objects[0].measurements,
        vec![Measurement {
            time: 59_001.0,
            magnitude: 21.5,
            magnitude_error: None,
            filter: Some("g".into()),
        }]
    );
    assert_eq!(objects[0].annotations.note, "keep me");
}

#[test]
fn missing_object_id_is_still_rejected() {
    let stored = serde_json::json!([{"objectId": null}]);
    assert!(serde_json::from_value::<Vec<ObservedObject>>(stored).is_err());
}
