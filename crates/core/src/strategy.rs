use crate::value::Value;

/// Outcome of offering a keyed sequence pair to a strategy.
///
/// Explicit tri-state: callers never have to guess whether an empty result
/// means "not my key" or "compared and equal".
#[derive(Debug, Clone, PartialEq)]
pub enum StrategyOutcome {
    /// The strategy does not handle this key/value shape.
    NotApplicable,
    /// Claimed and equal after the transform; default comparison is skipped.
    Equal,
    /// Claimed and unequal; the transformed (sorted) sequences to report.
    Unequal { left: Vec<f64>, right: Vec<f64> },
}

/// Per-key opt-in rule that neutralizes benign reordering before comparison.
///
/// Stateless; the first strategy in the configured list that answers
/// something other than `NotApplicable` wins.
pub trait ComparisonStrategy {
    fn compare(&self, key: &str, left: &[Value], right: &[Value]) -> StrategyOutcome;
}

/// Compares one attribute's sequences as order-insensitive numeric multisets:
/// numeric leaves are flattened out of any nesting, sorted ascending, and
/// compared exactly.
///
/// Geometry exporters reorder coordinate and index lists without semantic
/// change, so positional comparison would flag noise for those keys.
#[derive(Debug, Clone)]
pub struct NumericSortStrategy {
    key: String,
}

impl NumericSortStrategy {
    pub fn new(key: impl Into<String>) -> Self {
        Self { key: key.into() }
    }

    pub fn key(&self) -> &str {
        &self.key
    }
}

impl ComparisonStrategy for NumericSortStrategy {
    fn compare(&self, key: &str, left: &[Value], right: &[Value]) -> StrategyOutcome {
        if key != self.key {
            return StrategyOutcome::NotApplicable;
        }

        let mut flat_left = flatten_numeric(left);
        let mut flat_right = flatten_numeric(right);

        // No numeric content on either side: decline and let the default
        // positional comparison handle whatever these sequences hold.
        if flat_left.is_empty() && flat_right.is_empty() {
            return StrategyOutcome::NotApplicable;
        }

        flat_left.sort_by(f64::total_cmp);
        flat_right.sort_by(f64::total_cmp);

        if flat_left == flat_right {
            StrategyOutcome::Equal
        } else {
            StrategyOutcome::Unequal {
                left: flat_left,
                right: flat_right,
            }
        }
    }
}

/// The built-in strategy list: geometry keys whose sequences are
/// order-insensitive across exporters.
pub fn default_strategies() -> Vec<NumericSortStrategy> {
    vec![
        NumericSortStrategy::new("Coordinates"),
        NumericSortStrategy::new("CoordIndex"),
        NumericSortStrategy::new("CoordList"),
    ]
}

/// Collect every numeric leaf (int or float) from a nested sequence,
/// depth-first, as `f64`.
fn flatten_numeric(values: &[Value]) -> Vec<f64> {
    let mut out = Vec::new();
    collect_numeric(values, &mut out);
    out
}

fn collect_numeric(values: &[Value], out: &mut Vec<f64>) {
    for value in values {
        match value {
            Value::Int(i) => out.push(*i as f64),
            Value::Float(f) => out.push(*f),
            Value::List(items) => collect_numeric(items, out),
            _ => {}
        }
    }
}
