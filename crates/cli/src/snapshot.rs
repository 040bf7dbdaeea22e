//! Snapshot loading: identity-keyed entity records from JSON.
//!
//! Two accepted shapes: an object mapping identity to record, or an array of
//! records each carrying the identity under the configured attribute.

use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

use bimdiff_core::Value;
use bimdiff_recon::Snapshot;

#[derive(Debug)]
pub enum SnapshotError {
    Io { path: String, message: String },
    Parse { path: String, message: String },
    /// Top level is neither an object nor an array.
    BadShape { found: &'static str },
    /// An array element is not a record.
    BadEntity { index: usize, found: &'static str },
    /// An array element has no usable identity attribute.
    MissingIdentity { index: usize, key: String },
    /// The same identity appears twice within one snapshot.
    DuplicateIdentity { id: String },
}

impl fmt::Display for SnapshotError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io { path, message } => write!(f, "cannot read {path}: {message}"),
            Self::Parse { path, message } => write!(f, "cannot parse {path}: {message}"),
            Self::BadShape { found } => {
                write!(f, "snapshot must be a JSON object or array, found {found}")
            }
            Self::BadEntity { index, found } => {
                write!(f, "entity at index {index} must be an object, found {found}")
            }
            Self::MissingIdentity { index, key } => {
                write!(f, "entity at index {index} has no string attribute '{key}'")
            }
            Self::DuplicateIdentity { id } => {
                write!(f, "identity '{id}' appears more than once in one snapshot")
            }
        }
    }
}

impl std::error::Error for SnapshotError {}

pub fn load(path: &Path, name: &str, identity_key: &str) -> Result<Snapshot, SnapshotError> {
    let data = std::fs::read_to_string(path).map_err(|e| SnapshotError::Io {
        path: path.display().to_string(),
        message: e.to_string(),
    })?;
    let json: serde_json::Value =
        serde_json::from_str(&data).map_err(|e| SnapshotError::Parse {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
    from_json(name, json, identity_key)
}

pub fn from_json(
    name: &str,
    json: serde_json::Value,
    identity_key: &str,
) -> Result<Snapshot, SnapshotError> {
    match json {
        serde_json::Value::Object(map) => {
            let entities: BTreeMap<String, Value> = map
                .into_iter()
                .map(|(id, record)| (id, Value::from(record)))
                .collect();
            Ok(Snapshot::new(name, entities))
        }
        serde_json::Value::Array(items) => {
            let mut entities = BTreeMap::new();
            for (index, item) in items.into_iter().enumerate() {
                let record = Value::from(item);
                let Some(map) = record.as_record() else {
                    return Err(SnapshotError::BadEntity {
                        index,
                        found: record.kind(),
                    });
                };
                let id = match map.get(identity_key) {
                    Some(Value::Text(id)) if !id.is_empty() => id.clone(),
                    _ => {
                        return Err(SnapshotError::MissingIdentity {
                            index,
                            key: identity_key.to_string(),
                        })
                    }
                };
                if entities.insert(id.clone(), record).is_some() {
                    return Err(SnapshotError::DuplicateIdentity { id });
                }
            }
            Ok(Snapshot::new(name, entities))
        }
        other => Err(SnapshotError::BadShape {
            found: json_kind(&other),
        }),
    }
}

fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "bool",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn object_form_maps_directly() {
        let json = serde_json::json!({
            "E1": {"Name": "Wall"},
            "E2": {"Name": "Slab"}
        });
        let snapshot = from_json("before", json, "GlobalId").unwrap();
        assert_eq!(snapshot.entities.len(), 2);
        assert!(snapshot.entities.contains_key("E1"));
    }

    #[test]
    fn array_form_uses_identity_attribute() {
        let json = serde_json::json!([
            {"GlobalId": "E1", "Name": "Wall"},
            {"GlobalId": "E2", "Name": "Slab"}
        ]);
        let snapshot = from_json("before", json, "GlobalId").unwrap();
        assert_eq!(snapshot.entities.len(), 2);
        let record = snapshot.entities["E1"].as_record().unwrap();
        assert_eq!(record["Name"], Value::Text("Wall".into()));
    }

    #[test]
    fn array_form_rejects_duplicates() {
        let json = serde_json::json!([
            {"GlobalId": "E1"},
            {"GlobalId": "E1"}
        ]);
        let err = from_json("before", json, "GlobalId").unwrap_err();
        assert!(matches!(err, SnapshotError::DuplicateIdentity { .. }));
    }

    #[test]
    fn array_form_rejects_missing_identity() {
        let json = serde_json::json!([{"Name": "Wall"}]);
        let err = from_json("before", json, "GlobalId").unwrap_err();
        assert!(matches!(err, SnapshotError::MissingIdentity { index: 0, .. }));
    }

    #[test]
    fn array_form_rejects_scalar_entities() {
        let json = serde_json::json!([42]);
        let err = from_json("before", json, "GlobalId").unwrap_err();
        assert!(matches!(err, SnapshotError::BadEntity { index: 0, .. }));
    }

    #[test]
    fn scalar_top_level_is_rejected() {
        let err = from_json("before", serde_json::json!(42), "GlobalId").unwrap_err();
        assert!(matches!(err, SnapshotError::BadShape { found: "number" }));
    }

    #[test]
    fn load_reads_from_disk() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"E1": {{"Name": "Wall"}}}}"#).unwrap();
        let snapshot = load(file.path(), "before", "GlobalId").unwrap();
        assert_eq!(snapshot.entities.len(), 1);
    }

    #[test]
    fn load_reports_missing_file() {
        let err = load(Path::new("/nonexistent/snapshot.json"), "before", "GlobalId").unwrap_err();
        assert!(matches!(err, SnapshotError::Io { .. }));
    }
}
