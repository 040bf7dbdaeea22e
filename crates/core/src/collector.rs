use std::collections::BTreeSet;

use serde::Serialize;

use crate::value::Value;

/// How many leading sequence elements a recorded preview shows.
const PREVIEW_LEN: usize = 10;

/// One recorded mismatch: a human-readable location plus both values as text.
///
/// Values are stringified at record time so consumers never need the original
/// runtime types. The location is display metadata, not a machine-parsable
/// address.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct Difference {
    pub location: String,
    pub left: String,
    pub right: String,
}

impl Difference {
    pub fn new(
        location: impl Into<String>,
        left: impl Into<String>,
        right: impl Into<String>,
    ) -> Self {
        Self {
            location: location.into(),
            left: left.into(),
            right: right.into(),
        }
    }
}

/// Append-only sink for differences found during a comparison run.
///
/// Created once per run and passed down into every comparison; clearable for
/// reuse across independent runs.
pub trait DifferenceCollector {
    fn record(&mut self, difference: Difference);

    /// Snapshot of everything recorded so far.
    fn differences(&self) -> Vec<Difference>;

    fn clear(&mut self);

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Deduplicating collector: identical triples are stored once, iteration is
/// ordered by location. Useful for summarization.
#[derive(Debug, Default)]
pub struct SetCollector {
    entries: BTreeSet<Difference>,
}

impl SetCollector {
    pub fn new() -> Self {
        Self::default()
    }
}

impl DifferenceCollector for SetCollector {
    fn record(&mut self, difference: Difference) {
        self.entries.insert(difference);
    }

    fn differences(&self) -> Vec<Difference> {
        self.entries.iter().cloned().collect()
    }

    fn clear(&mut self) {
        self.entries.clear();
    }

    fn len(&self) -> usize {
        self.entries.len()
    }
}

/// Insertion-ordered collector that keeps duplicates: an exact audit trail.
#[derive(Debug, Default)]
pub struct ListCollector {
    entries: Vec<Difference>,
}

impl ListCollector {
    pub fn new() -> Self {
        Self::default()
    }
}

impl DifferenceCollector for ListCollector {
    fn record(&mut self, difference: Difference) {
        self.entries.push(difference);
    }

    fn differences(&self) -> Vec<Difference> {
        self.entries.clone()
    }

    fn clear(&mut self) {
        self.entries.clear();
    }

    fn len(&self) -> usize {
        self.entries.len()
    }
}

// ---------------------------------------------------------------------------
// Preview formatting
// ---------------------------------------------------------------------------
//
// Long sequences are truncated to keep reports readable. Formatting lives
// here, with the collector, so display width choices never leak into the
// comparison algorithm.

/// Render a value for a difference entry, truncating lists to their first
/// `PREVIEW_LEN` elements.
pub fn preview(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Int(i) => i.to_string(),
        Value::Float(f) => f.to_string(),
        Value::Text(s) => format!("\"{s}\""),
        Value::List(items) => {
            let shown: Vec<String> = items.iter().take(PREVIEW_LEN).map(preview).collect();
            if items.len() > PREVIEW_LEN {
                format!("[{}, …]", shown.join(", "))
            } else {
                format!("[{}]", shown.join(", "))
            }
        }
        Value::Record(map) => {
            let fields: Vec<String> = map
                .iter()
                .map(|(k, v)| format!("{k}: {}", preview(v)))
                .collect();
            format!("{{{}}}", fields.join(", "))
        }
    }
}

/// Render a flattened numeric list (strategy output) with the same
/// truncation rule.
pub fn preview_numbers(numbers: &[f64]) -> String {
    let shown: Vec<String> = numbers
        .iter()
        .take(PREVIEW_LEN)
        .map(|n| n.to_string())
        .collect();
    if numbers.len() > PREVIEW_LEN {
        format!("[{}, …]", shown.join(", "))
    } else {
        format!("[{}]", shown.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn diff(location: &str) -> Difference {
        Difference::new(location, "1", "2")
    }

    #[test]
    fn set_collector_deduplicates() {
        let mut collector = SetCollector::new();
        collector.record(diff("Height"));
        collector.record(diff("Height"));
        collector.record(diff("Name"));
        assert_eq!(collector.len(), 2);
    }

    #[test]
    fn list_collector_keeps_order_and_duplicates() {
        let mut collector = ListCollector::new();
        collector.record(diff("b"));
        collector.record(diff("a"));
        collector.record(diff("b"));
        let entries = collector.differences();
        assert_eq!(entries.len(), 3);
        assert_eq!(entries[0].location, "b");
        assert_eq!(entries[1].location, "a");
    }

    #[test]
    fn clear_empties_both_variants() {
        let mut set = SetCollector::new();
        set.record(diff("x"));
        set.clear();
        assert!(set.is_empty());
        assert!(set.differences().is_empty());

        let mut list = ListCollector::new();
        list.record(diff("x"));
        list.clear();
        assert!(list.is_empty());
        assert!(list.differences().is_empty());
    }

    #[test]
    fn preview_truncates_long_lists() {
        let items: Vec<Value> = (0..12).map(Value::Int).collect();
        let rendered = preview(&Value::List(items));
        assert!(rendered.contains('…'));
        assert!(rendered.contains("9"));
        assert!(!rendered.contains("11"));
    }

    #[test]
    fn preview_short_list_has_no_marker() {
        let items: Vec<Value> = (0..3).map(Value::Int).collect();
        assert_eq!(preview(&Value::List(items)), "[0, 1, 2]");
    }

    #[test]
    fn preview_nested_record() {
        let mut map = std::collections::BTreeMap::new();
        map.insert("Name".to_string(), Value::from("Wall"));
        map.insert("Height".to_string(), Value::from(3.5));
        assert_eq!(
            preview(&Value::Record(map)),
            "{Height: 3.5, Name: \"Wall\"}"
        );
    }

    #[test]
    fn preview_numbers_truncates() {
        let numbers: Vec<f64> = (0..11).map(|i| i as f64).collect();
        let rendered = preview_numbers(&numbers);
        assert!(rendered.contains('…'));
        assert_eq!(preview_numbers(&[1.0, 2.0]), "[1, 2]");
    }
}
