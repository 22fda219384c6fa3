//! Property tests for the flattener.

use proptest::prelude::*;
use serde_json::{Map, Number, Value};
use t2c_core::flatten::{flatten, RECEIVE_TIME_COLUMN};

/// Strategy for field names: short, non-empty, no dots so paths stay
/// unambiguous in assertions.
fn field_name() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9_]{0,7}"
}

fn scalar() -> impl Strategy<Value = Value> {
    prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        any::<i64>().prop_map(|n| Value::Number(n.into())),
        // Finite floats only; NaN/inf are not representable in JSON.
        (-1e9f64..1e9f64).prop_map(|f| {
            Number::from_f64(f).map(Value::Number).unwrap_or(Value::Null)
        }),
        "[ -~]{0,12}".prop_map(Value::String),
    ]
}

fn nested_value() -> impl Strategy<Value = Value> {
    scalar().prop_recursive(3, 24, 4, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..4).prop_map(Value::Array),
            prop::collection::vec((field_name(), inner), 0..4).prop_map(|fields| {
                let mut map = Map::new();
                for (key, value) in fields {
                    map.insert(key, value);
                }
                Value::Object(map)
            }),
        ]
    })
}

fn record() -> impl Strategy<Value = Map<String, Value>> {
    prop::collection::vec((field_name(), nested_value()), 0..5).prop_map(|fields| {
        let mut map = Map::new();
        for (key, value) in fields {
            map.insert(key, value);
        }
        map
    })
}

/// Replace every scalar leaf with a fixed value, keeping the shape.
fn reshape_values(value: &Value) -> Value {
    match value {
        Value::Object(fields) => Value::Object(
            fields
                .iter()
                .map(|(k, v)| (k.clone(), reshape_values(v)))
                .collect(),
        ),
        Value::Array(items) => Value::Array(items.iter().map(reshape_values).collect()),
        _ => Value::Bool(true),
    }
}

proptest! {
    #[test]
    fn flatten_is_deterministic(t in any::<i64>(), payload in record()) {
        prop_assert_eq!(flatten(t, &payload), flatten(t, &payload));
    }

    #[test]
    fn leading_column_is_always_receive_time(t in any::<i64>(), payload in record()) {
        let row = flatten(t, &payload);
        prop_assert_eq!(row.names().next(), Some(RECEIVE_TIME_COLUMN));
        prop_assert_eq!(row.get(RECEIVE_TIME_COLUMN), Some(&Value::from(t)));
    }

    #[test]
    fn column_names_depend_only_on_shape(payload in record()) {
        let reshaped = match reshape_values(&Value::Object(payload.clone())) {
            Value::Object(map) => map,
            _ => unreachable!(),
        };
        let original = flatten(0, &payload);
        let altered = flatten(1, &reshaped);
        prop_assert_eq!(
            original.names().collect::<Vec<_>>(),
            altered.names().collect::<Vec<_>>()
        );
    }

    #[test]
    fn sequences_never_widen_the_row(
        name in field_name(),
        items in prop::collection::vec(scalar(), 0..8),
    ) {
        let mut payload = Map::new();
        payload.insert(name.clone(), Value::Array(items));
        let row = flatten(0, &payload);
        // Timestamp plus exactly one cell, regardless of sequence length.
        prop_assert_eq!(row.len(), 2);
        prop_assert!(matches!(row.get(&name), Some(Value::String(_))));
    }
}
