//! Helpers for reading and writing raw result rows.
//!
//! Rows are loosely typed: scalars may be missing, integers may arrive as
//! strings, and single-valued edges come back either as an object or as a
//! one-element list.

use serde_json::{Map, Value as Json};

use crate::error::{AnalyzerError, Result};
use crate::schema::{EntityKind, Relation};

pub(crate) fn required_str(row: &Json, kind: EntityKind, field: &'static str) -> Result<String> {
    opt_str(row, kind, field)?.ok_or(AnalyzerError::MissingField { kind, field })
}

pub(crate) fn opt_str(row: &Json, kind: EntityKind, field: &str) -> Result<Option<String>> {
    match row.get(field) {
        None | Some(Json::Null) => Ok(None),
        Some(Json::String(s)) => Ok(Some(s.clone())),
        Some(other) => Err(invalid(kind, field, other)),
    }
}

/// Integer field; JSON numbers and numeric strings are both accepted.
///
/// Whole floats are taken only inside the `i64` range.
pub(crate) fn opt_int(row: &Json, kind: EntityKind, field: &str) -> Result<Option<i64>> {
    match row.get(field) {
        None | Some(Json::Null) => Ok(None),
        Some(Json::Number(n)) => n
            .as_i64()
            .or_else(|| n.as_f64().and_then(whole_i64))
            .map(Some)
            .ok_or_else(|| invalid(kind, field, &Json::Number(n.clone()))),
        Some(Json::String(s)) => s
            .trim()
            .parse::<i64>()
            .map(Some)
            .map_err(|_| invalid(kind, field, &Json::String(s.clone()))),
        Some(other) => Err(invalid(kind, field, other)),
    }
}

// `i64::MAX as f64` rounds up to 2^63, so the upper bound is exclusive.
fn whole_i64(f: f64) -> Option<i64> {
    let in_range = f >= i64::MIN as f64 && f < i64::MAX as f64;
    (in_range && f.fract() == 0.0).then(|| f as i64)
}

/// Single nested row under `key`: the object itself or a list's first element.
pub(crate) fn nested_one<'a>(row: &'a Json, key: &str) -> Option<&'a Json> {
    match row.get(key)? {
        Json::Array(items) => items.first(),
        obj @ Json::Object(_) => Some(obj),
        _ => None,
    }
}

/// Nested rows under `key`; `None` when absent or empty.
pub(crate) fn nested_many<'a>(row: &'a Json, key: &str) -> Option<Vec<&'a Json>> {
    match row.get(key)? {
        Json::Array(items) if !items.is_empty() => Some(items.iter().collect()),
        obj @ Json::Object(_) => Some(vec![obj]),
        _ => None,
    }
}

/// Hydrate the single neighbor stored under `rel`'s edge name.
pub(crate) fn one<T>(
    row: &Json,
    rel: Relation,
    hydrate: fn(&Json) -> Result<T>,
) -> Result<Option<Box<T>>> {
    debug_assert!(!rel.is_many(), "{rel} holds a list");
    nested_one(row, rel.edge_name())
        .map(|r| hydrate(r).map(Box::new))
        .transpose()
}

/// Hydrate the neighbor list stored under `rel`'s edge name.
pub(crate) fn many<T>(
    row: &Json,
    rel: Relation,
    hydrate: fn(&Json) -> Result<T>,
) -> Result<Option<Vec<T>>> {
    debug_assert!(rel.is_many(), "{rel} holds a single neighbor");
    nested_many(row, rel.edge_name())
        .map(|rows| rows.into_iter().map(hydrate).collect::<Result<Vec<T>>>())
        .transpose()
}

pub(crate) fn dicts<T>(views: &Option<Vec<T>>, to_dict: fn(&T) -> Json) -> Option<Vec<Json>> {
    views.as_ref().map(|vs| vs.iter().map(to_dict).collect())
}

fn invalid(kind: EntityKind, field: &str, found: &Json) -> AnalyzerError {
    AnalyzerError::InvalidField {
        kind,
        field: field.to_string(),
        found: found.to_string(),
    }
}

/// Builds a row in the store's shape.
pub(crate) struct RowWriter {
    map: Map<String, Json>,
}

impl RowWriter {
    pub(crate) fn new(node_key: &str) -> Self {
        let mut map = Map::new();
        map.insert("node_key".into(), Json::String(node_key.to_string()));
        Self { map }
    }

    pub(crate) fn str(&mut self, key: &str, value: &Option<String>) -> &mut Self {
        if let Some(v) = value {
            self.map.insert(key.into(), Json::String(v.clone()));
        }
        self
    }

    pub(crate) fn int(&mut self, key: &str, value: Option<i64>) -> &mut Self {
        if let Some(v) = value {
            self.map.insert(key.into(), Json::from(v));
        }
        self
    }

    pub(crate) fn rows(&mut self, key: &str, rows: Option<Vec<Json>>) -> &mut Self {
        if let Some(rows) = rows {
            self.map.insert(key.into(), Json::Array(rows));
        }
        self
    }

    pub(crate) fn finish(&mut self) -> Json {
        Json::Object(std::mem::take(&mut self.map))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const K: EntityKind = EntityKind::Process;

    #[test]
    fn test_int_accepts_numbers_and_strings() {
        let row = json!({"a": 7, "b": "12", "c": " 3 ", "d": 4.0});
        assert_eq!(opt_int(&row, K, "a").unwrap(), Some(7));
        assert_eq!(opt_int(&row, K, "b").unwrap(), Some(12));
        assert_eq!(opt_int(&row, K, "c").unwrap(), Some(3));
        assert_eq!(opt_int(&row, K, "d").unwrap(), Some(4));
        assert_eq!(opt_int(&row, K, "missing").unwrap(), None);
    }

    #[test]
    fn test_int_range_edges() {
        let row = json!({"max": i64::MAX, "min": i64::MIN, "neg": -2.0});
        assert_eq!(opt_int(&row, K, "max").unwrap(), Some(i64::MAX));
        assert_eq!(opt_int(&row, K, "min").unwrap(), Some(i64::MIN));
        assert_eq!(opt_int(&row, K, "neg").unwrap(), Some(-2));
    }

    #[test]
    fn test_one_and_many_follow_cardinality() {
        let row = json!({"~children": [{"node_key": "p0"}], "children": [{"node_key": "p2"}]});
        let key = |r: &Json| required_str(r, K, "node_key");
        let parent = one(&row, Relation::Parent, key).unwrap().map(|k| *k);
        assert_eq!(parent.as_deref(), Some("p0"));
        let children = many(&row, Relation::Children, key).unwrap();
        assert_eq!(children, Some(vec!["p2".to_string()]));
    }

    #[test]
    fn test_int_rejects_garbage() {
        let row = json!({
            "a": "twelve",
            "b": [1],
            "c": 1.5,
            "d": u64::MAX,
            "e": 1e30,
            "f": -1e30,
            "g": 9223372036854775808.0
        });
        for field in ["a", "b", "c", "d", "e", "f", "g"] {
            let err = opt_int(&row, K, field).unwrap_err();
            assert!(matches!(err, AnalyzerError::InvalidField { .. }), "{field}: {err}");
        }
    }

    #[test]
    fn test_required_str() {
        assert_eq!(required_str(&json!({"node_key": "k"}), K, "node_key").unwrap(), "k");
        assert!(matches!(
            required_str(&json!({}), K, "node_key").unwrap_err(),
            AnalyzerError::MissingField { .. }
        ));
        assert!(matches!(
            required_str(&json!({"node_key": 1}), K, "node_key").unwrap_err(),
            AnalyzerError::InvalidField { .. }
        ));
    }

    #[test]
    fn test_nested_shapes() {
        let row = json!({"list": [{"x": 1}, {"x": 2}], "obj": {"x": 3}, "empty": []});
        assert_eq!(nested_one(&row, "list").unwrap()["x"], 1);
        assert_eq!(nested_one(&row, "obj").unwrap()["x"], 3);
        assert!(nested_one(&row, "empty").is_none());
        assert_eq!(nested_many(&row, "list").unwrap().len(), 2);
        assert_eq!(nested_many(&row, "obj").unwrap().len(), 1);
        assert!(nested_many(&row, "empty").is_none());
        assert!(nested_many(&row, "absent").is_none());
    }
}
