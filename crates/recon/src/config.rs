use bimdiff_core::{
    ComparisonStrategy, DifferenceCollector, ListCollector, NumericSortStrategy, SetCollector,
    Value,
};
use serde::Deserialize;

use crate::error::ReconError;

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct CompareConfig {
    #[serde(default)]
    pub name: String,
    /// Two floats are equal iff `|a - b| <= tolerance`.
    #[serde(default = "default_tolerance")]
    pub tolerance: f64,
    /// Attribute holding the stable identity when a snapshot arrives as an
    /// array of records.
    #[serde(default = "default_identity_key")]
    pub identity_key: String,
    /// Attribute names excluded from comparison at any nesting depth.
    #[serde(default = "default_ignore_keys")]
    pub ignore_keys: Vec<String>,
    /// Keys whose sequences are compared as order-insensitive numeric
    /// multisets instead of positionally.
    #[serde(default = "default_sorted_keys")]
    pub sorted_keys: Vec<String>,
    #[serde(default)]
    pub collector: CollectorKind,
    /// Suppresses add/remove noise for entity categories whose identity is
    /// known to be unstable across exports.
    #[serde(default)]
    pub exclusion: Option<ExclusionRule>,
}

impl Default for CompareConfig {
    fn default() -> Self {
        Self {
            name: String::new(),
            tolerance: default_tolerance(),
            identity_key: default_identity_key(),
            ignore_keys: default_ignore_keys(),
            sorted_keys: default_sorted_keys(),
            collector: CollectorKind::default(),
            exclusion: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CollectorKind {
    /// Deduplicating, order-independent (summarization).
    #[default]
    Set,
    /// Insertion-ordered with duplicates (audit trail).
    List,
}

/// Records whose `attribute` value matches one of `values` are skipped when
/// they appear on only one side.
#[derive(Debug, Clone, Deserialize)]
pub struct ExclusionRule {
    pub attribute: String,
    pub values: Vec<String>,
}

impl ExclusionRule {
    pub fn matches(&self, record: &Value) -> bool {
        let Some(map) = record.as_record() else {
            return false;
        };
        match map.get(&self.attribute) {
            Some(Value::Text(s)) => self.values.iter().any(|v| v == s),
            _ => false,
        }
    }
}

fn default_tolerance() -> f64 {
    1e-5
}

fn default_identity_key() -> String {
    "GlobalId".to_string()
}

fn default_ignore_keys() -> Vec<String> {
    vec!["OwnerHistory".to_string()]
}

fn default_sorted_keys() -> Vec<String> {
    vec![
        "Coordinates".to_string(),
        "CoordIndex".to_string(),
        "CoordList".to_string(),
    ]
}

// ---------------------------------------------------------------------------
// Parse + Validate
// ---------------------------------------------------------------------------

impl CompareConfig {
    pub fn from_toml(input: &str) -> Result<Self, ReconError> {
        let config: CompareConfig =
            toml::from_str(input).map_err(|e| ReconError::ConfigParse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ReconError> {
        if !self.tolerance.is_finite() || self.tolerance < 0.0 {
            return Err(ReconError::ConfigValidation(format!(
                "tolerance must be finite and non-negative, got {}",
                self.tolerance
            )));
        }
        if self.identity_key.is_empty() {
            return Err(ReconError::ConfigValidation(
                "identity_key must not be empty".into(),
            ));
        }
        if let Some(ref rule) = self.exclusion {
            if rule.attribute.is_empty() || rule.values.is_empty() {
                return Err(ReconError::ConfigValidation(
                    "exclusion rule needs an attribute and at least one value".into(),
                ));
            }
        }
        Ok(())
    }

    /// Instantiate the configured strategy list, in order.
    pub fn strategies(&self) -> Vec<Box<dyn ComparisonStrategy>> {
        self.sorted_keys
            .iter()
            .map(|key| Box::new(NumericSortStrategy::new(key)) as Box<dyn ComparisonStrategy>)
            .collect()
    }

    /// Build the configured collector variant.
    pub fn make_collector(&self) -> Box<dyn DifferenceCollector> {
        match self.collector {
            CollectorKind::Set => Box::new(SetCollector::new()),
            CollectorKind::List => Box::new(ListCollector::new()),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    const VALID: &str = r#"
name = "Export regression"
tolerance = 1e-3
ignore_keys = ["OwnerHistory", "Tag"]
sorted_keys = ["Coordinates"]
collector = "list"

[exclusion]
attribute = "Category"
values = ["IfcOpeningElement"]
"#;

    #[test]
    fn parse_valid_config() {
        let config = CompareConfig::from_toml(VALID).unwrap();
        assert_eq!(config.name, "Export regression");
        assert_eq!(config.tolerance, 1e-3);
        assert_eq!(config.ignore_keys, vec!["OwnerHistory", "Tag"]);
        assert_eq!(config.sorted_keys, vec!["Coordinates"]);
        assert_eq!(config.collector, CollectorKind::List);
        assert!(config.exclusion.is_some());
    }

    #[test]
    fn defaults_cover_geometry_keys() {
        let config = CompareConfig::from_toml("").unwrap();
        assert_eq!(config.tolerance, 1e-5);
        assert_eq!(config.identity_key, "GlobalId");
        assert_eq!(config.ignore_keys, vec!["OwnerHistory"]);
        assert_eq!(
            config.sorted_keys,
            vec!["Coordinates", "CoordIndex", "CoordList"]
        );
        assert_eq!(config.collector, CollectorKind::Set);
    }

    #[test]
    fn reject_negative_tolerance() {
        let err = CompareConfig::from_toml("tolerance = -1.0").unwrap_err();
        assert!(err.to_string().contains("tolerance"));
    }

    #[test]
    fn reject_empty_identity_key() {
        let err = CompareConfig::from_toml(r#"identity_key = """#).unwrap_err();
        assert!(err.to_string().contains("identity_key"));
    }

    #[test]
    fn reject_empty_exclusion() {
        let toml = r#"
[exclusion]
attribute = "Category"
values = []
"#;
        let err = CompareConfig::from_toml(toml).unwrap_err();
        assert!(err.to_string().contains("exclusion"));
    }

    #[test]
    fn reject_unknown_collector() {
        let err = CompareConfig::from_toml(r#"collector = "multiset""#).unwrap_err();
        assert!(matches!(err, ReconError::ConfigParse(_)));
    }

    #[test]
    fn exclusion_rule_matches_text_attribute() {
        let rule = ExclusionRule {
            attribute: "Category".into(),
            values: vec!["IfcOpeningElement".into()],
        };
        let mut map = std::collections::BTreeMap::new();
        map.insert("Category".to_string(), Value::from("IfcOpeningElement"));
        assert!(rule.matches(&Value::Record(map.clone())));

        map.insert("Category".to_string(), Value::from("IfcWall"));
        assert!(!rule.matches(&Value::Record(map)));
        assert!(!rule.matches(&Value::Int(1)));
    }
}
