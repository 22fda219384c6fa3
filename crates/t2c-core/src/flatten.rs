//! Pure flattening of nested records into ordered flat rows.
//!
//! One decoded message becomes one row: object fields are recursed into
//! depth-first and named by their dot-joined path (`pose.position.x`),
//! while arrays are kept opaque and serialized whole into a single cell.
//! Keeping arrays opaque bounds the row width regardless of array length,
//! so a variable-length field can never change the column set.

use serde_json::{Map, Value};

/// Name of the distinguished leading column carrying the receipt timestamp.
pub const RECEIVE_TIME_COLUMN: &str = "receive_time_ns";

/// One flattened message: an ordered list of `(column name, cell)` pairs.
///
/// Order is the depth-first traversal order of the source record and is
/// identical for any two records with the same field-name shape. Cells are
/// scalar JSON values; a cell that stands in for a whole array (or an
/// object inside an array) holds its compact-JSON text instead.
#[derive(Debug, Clone, PartialEq)]
pub struct FlatRow {
    cells: Vec<(String, Value)>,
}

impl FlatRow {
    /// Column names in row order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.cells.iter().map(|(name, _)| name.as_str())
    }

    /// Cell values in row order.
    pub fn values(&self) -> impl Iterator<Item = &Value> {
        self.cells.iter().map(|(_, value)| value)
    }

    /// Number of columns, including the leading timestamp column.
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Look up a cell by column name.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.cells
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, value)| value)
    }
}

/// Flatten one decoded message into a row.
///
/// The first column is always [`RECEIVE_TIME_COLUMN`] with the supplied
/// timestamp; the record's fields follow in traversal order. Pure: no I/O,
/// no state, byte-identical output for identical input.
pub fn flatten(receive_time_ns: i64, record: &Map<String, Value>) -> FlatRow {
    let mut cells = Vec::with_capacity(record.len() + 1);
    cells.push((
        RECEIVE_TIME_COLUMN.to_string(),
        Value::from(receive_time_ns),
    ));
    for (key, value) in record {
        flatten_into(key.clone(), value, &mut cells);
    }
    FlatRow { cells }
}

fn flatten_into(path: String, value: &Value, out: &mut Vec<(String, Value)>) {
    match value {
        Value::Object(fields) => {
            // An empty object contributes no columns.
            for (key, child) in fields {
                flatten_into(format!("{path}.{key}"), child, out);
            }
        }
        // Arrays are one cell: compact JSON, stable key order, no whitespace.
        Value::Array(_) => out.push((path, Value::String(value.to_string()))),
        scalar => out.push((path, scalar.clone())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            other => panic!("test record must be an object, got {other}"),
        }
    }

    #[test]
    fn test_leading_column_is_receive_time() {
        let row = flatten(1000, &record(json!({"a": 1})));
        assert_eq!(row.names().next(), Some(RECEIVE_TIME_COLUMN));
        assert_eq!(row.get(RECEIVE_TIME_COLUMN), Some(&json!(1000)));
    }

    #[test]
    fn test_nested_records_use_dotted_paths() {
        let row = flatten(
            7,
            &record(json!({"pose": {"position": {"x": 0.5, "y": -1.0}}, "frame": "map"})),
        );
        let names: Vec<&str> = row.names().collect();
        assert_eq!(
            names,
            vec!["receive_time_ns", "pose.position.x", "pose.position.y", "frame"]
        );
        assert_eq!(row.get("pose.position.x"), Some(&json!(0.5)));
        assert_eq!(row.get("frame"), Some(&json!("map")));
    }

    #[test]
    fn test_arrays_stay_one_opaque_cell() {
        let row = flatten(1000, &record(json!({"a": 1, "b": {"c": 2.5, "d": [1, 2, 3]}})));
        let names: Vec<&str> = row.names().collect();
        assert_eq!(names, vec!["receive_time_ns", "a", "b.c", "b.d"]);
        assert_eq!(row.get("b.d"), Some(&json!("[1,2,3]")));
    }

    #[test]
    fn test_objects_inside_arrays_are_encoded_with_the_array() {
        let row = flatten(0, &record(json!({"points": [{"x": 1, "y": 2}]})));
        assert_eq!(row.get("points"), Some(&json!("[{\"x\":1,\"y\":2}]")));
    }

    #[test]
    fn test_empty_record_yields_timestamp_only() {
        let row = flatten(42, &record(json!({})));
        assert_eq!(row.len(), 1);
        assert_eq!(row.names().collect::<Vec<_>>(), vec!["receive_time_ns"]);
    }

    #[test]
    fn test_empty_nested_object_contributes_nothing() {
        let row = flatten(0, &record(json!({"a": {}, "b": 1})));
        assert_eq!(row.names().collect::<Vec<_>>(), vec!["receive_time_ns", "b"]);
    }

    #[test]
    fn test_empty_array_is_one_empty_structure_cell() {
        let row = flatten(0, &record(json!({"xs": []})));
        assert_eq!(row.get("xs"), Some(&json!("[]")));
    }

    #[test]
    fn test_null_passes_through_as_cell() {
        let row = flatten(0, &record(json!({"maybe": null})));
        assert_eq!(row.get("maybe"), Some(&Value::Null));
    }

    #[test]
    fn test_flatten_is_deterministic() {
        let payload = record(json!({"a": 1, "b": {"c": [1, {"d": true}]}, "e": "s"}));
        assert_eq!(flatten(99, &payload), flatten(99, &payload));
    }

    #[test]
    fn test_column_names_depend_on_shape_not_values() {
        let first = flatten(1, &record(json!({"a": 1, "b": {"c": 2.5}})));
        let second = flatten(2, &record(json!({"a": -7, "b": {"c": 0.0}})));
        assert_eq!(
            first.names().collect::<Vec<_>>(),
            second.names().collect::<Vec<_>>()
        );
    }
}
