use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// One attribute value inside an entity record.
///
/// Snapshots arrive as nested maps/sequences/scalars; this closed variant
/// replaces runtime type inspection with pattern matching. Keys within a
/// record are unique by construction (`BTreeMap`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    List(Vec<Value>),
    Record(BTreeMap<String, Value>),
}

impl Value {
    /// Variant name for diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Text(_) => "text",
            Value::List(_) => "list",
            Value::Record(_) => "record",
        }
    }

    pub fn as_record(&self) -> Option<&BTreeMap<String, Value>> {
        match self {
            Value::Record(map) => Some(map),
            _ => None,
        }
    }
}

impl From<serde_json::Value> for Value {
    fn from(v: serde_json::Value) -> Self {
        match v {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => {
                // Integers stay integers; everything else becomes a float.
                if let Some(i) = n.as_i64() {
                    Value::Int(i)
                } else {
                    Value::Float(n.as_f64().unwrap_or(f64::NAN))
                }
            }
            serde_json::Value::String(s) => Value::Text(s),
            serde_json::Value::Array(items) => {
                Value::List(items.into_iter().map(Value::from).collect())
            }
            serde_json::Value::Object(map) => Value::Record(
                map.into_iter().map(|(k, v)| (k, Value::from(v))).collect(),
            ),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(f)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_conversion_preserves_shape() {
        let json: serde_json::Value = serde_json::from_str(
            r#"{"Name": "Wall", "Height": 3.5, "Tag": null, "Ids": [1, 2, 3]}"#,
        )
        .unwrap();
        let value = Value::from(json);
        let record = value.as_record().unwrap();
        assert_eq!(record["Name"], Value::Text("Wall".into()));
        assert_eq!(record["Height"], Value::Float(3.5));
        assert_eq!(record["Tag"], Value::Null);
        assert_eq!(
            record["Ids"],
            Value::List(vec![Value::Int(1), Value::Int(2), Value::Int(3)])
        );
    }

    #[test]
    fn json_integers_stay_integers() {
        let value = Value::from(serde_json::json!(42));
        assert_eq!(value, Value::Int(42));
        let value = Value::from(serde_json::json!(42.0));
        assert_eq!(value, Value::Float(42.0));
    }

    #[test]
    fn kind_names() {
        assert_eq!(Value::Null.kind(), "null");
        assert_eq!(Value::Int(1).kind(), "int");
        assert_eq!(Value::Float(1.0).kind(), "float");
        assert_eq!(Value::List(vec![]).kind(), "list");
        assert_eq!(Value::Record(Default::default()).kind(), "record");
    }

    #[test]
    fn as_record_rejects_scalars() {
        assert!(Value::Int(1).as_record().is_none());
        assert!(Value::Record(Default::default()).as_record().is_some());
    }
}
