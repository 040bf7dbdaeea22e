use std::collections::BTreeMap;
use std::hash::{Hash, Hasher};

use ordered_float::OrderedFloat;

use crate::collector::{preview, preview_numbers, Difference, DifferenceCollector};
use crate::error::DiffError;
use crate::strategy::{ComparisonStrategy, StrategyOutcome};
use crate::value::Value;

/// Hard cap on record nesting. Exceeding it fails closed instead of
/// overflowing the call stack.
pub const MAX_DEPTH: usize = 128;

/// Tolerant-equality wrapper around one entity record.
///
/// Borrows the record plus the comparison configuration; instances are
/// created per comparison pair and discarded after use. Every local and
/// nested mismatch is reported through the collector passed to [`equals`],
/// which keeps accumulating for the lifetime of a run.
///
/// [`equals`]: FuzzyRecord::equals
#[derive(Clone, Copy)]
pub struct FuzzyRecord<'a> {
    data: &'a BTreeMap<String, Value>,
    tolerance: f64,
    precision: i32,
    strategies: &'a [Box<dyn ComparisonStrategy>],
    ignore_keys: &'a [String],
    owner: Option<&'a str>,
}

impl std::fmt::Debug for FuzzyRecord<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FuzzyRecord")
            .field("data", &self.data)
            .field("tolerance", &self.tolerance)
            .field("precision", &self.precision)
            .field("strategies", &self.strategies.len())
            .field("ignore_keys", &self.ignore_keys)
            .field("owner", &self.owner)
            .finish()
    }
}

impl<'a> FuzzyRecord<'a> {
    /// Wrap a record value. Fails fast when `value` is not a record or the
    /// tolerance is negative or non-finite.
    pub fn new(value: &'a Value, tolerance: f64) -> Result<Self, DiffError> {
        if !tolerance.is_finite() || tolerance < 0.0 {
            return Err(DiffError::InvalidTolerance(tolerance));
        }
        let data = value
            .as_record()
            .ok_or(DiffError::NotARecord { found: value.kind() })?;
        Ok(Self {
            data,
            tolerance,
            precision: rounding_precision(tolerance),
            strategies: &[],
            ignore_keys: &[],
            owner: None,
        })
    }

    pub fn with_strategies(mut self, strategies: &'a [Box<dyn ComparisonStrategy>]) -> Self {
        self.strategies = strategies;
        self
    }

    /// Keys excluded from comparison at any nesting depth where they appear
    /// as a direct key of a record.
    pub fn with_ignored_keys(mut self, keys: &'a [String]) -> Self {
        self.ignore_keys = keys;
        self
    }

    /// Identity of the owning entity, used only to enrich reported locations.
    pub fn with_owner(mut self, owner: &'a str) -> Self {
        self.owner = Some(owner);
        self
    }

    /// Tolerant structural equality.
    ///
    /// Records every discovered difference into `collector` rather than
    /// stopping at the first one, and returns true iff this call contributed
    /// zero entries. A key-set mismatch is fatal at its level: entities with
    /// different shapes are categorically different and per-key comparison
    /// does not run.
    pub fn equals(
        &self,
        other: &FuzzyRecord<'_>,
        collector: &mut dyn DifferenceCollector,
    ) -> Result<bool, DiffError> {
        self.equals_at_depth(other, collector, 0)
    }

    fn equals_at_depth(
        &self,
        other: &FuzzyRecord<'_>,
        collector: &mut dyn DifferenceCollector,
        depth: usize,
    ) -> Result<bool, DiffError> {
        if depth > MAX_DEPTH {
            return Err(DiffError::DepthExceeded { limit: MAX_DEPTH });
        }

        if !self.data.keys().eq(other.data.keys()) {
            collector.record(Difference::new(
                self.location("keys"),
                format_keys(self.data),
                format_keys(other.data),
            ));
            return Ok(false);
        }

        let mut clean = true;
        for (key, left) in self.data {
            if self.ignore_keys.iter().any(|k| k == key) {
                continue;
            }
            let right = &other.data[key];

            // Strings are scalars here, never sequences, so only true lists
            // are offered to the strategies.
            if let (Value::List(left_items), Value::List(right_items)) = (left, right) {
                match self.apply_strategies(key, left_items, right_items) {
                    Some(StrategyOutcome::Equal) => continue,
                    Some(StrategyOutcome::Unequal { left, right }) => {
                        collector.record(Difference::new(
                            self.location(key),
                            preview_numbers(&left),
                            preview_numbers(&right),
                        ));
                        clean = false;
                        continue;
                    }
                    _ => {}
                }
            }

            if !self.value_equals(key, left, right, collector, depth)? {
                clean = false;
            }
        }
        Ok(clean)
    }

    /// First strategy answering something other than `NotApplicable` wins;
    /// `None` means no strategy claimed the key.
    fn apply_strategies(
        &self,
        key: &str,
        left: &[Value],
        right: &[Value],
    ) -> Option<StrategyOutcome> {
        for strategy in self.strategies {
            match strategy.compare(key, left, right) {
                StrategyOutcome::NotApplicable => continue,
                outcome => return Some(outcome),
            }
        }
        None
    }

    /// Default recursive comparison for one key. Nested record mismatches
    /// are recorded by the child comparison; every other mismatch is
    /// recorded here, once, at this key's location.
    fn value_equals(
        &self,
        key: &str,
        left: &Value,
        right: &Value,
        collector: &mut dyn DifferenceCollector,
        depth: usize,
    ) -> Result<bool, DiffError> {
        match (left, right) {
            (Value::Record(left_map), Value::Record(right_map)) => self
                .child(left_map)
                .equals_at_depth(&self.child(right_map), collector, depth + 1),
            (Value::List(left_items), Value::List(right_items)) => {
                let same = left_items.len() == right_items.len()
                    && self.elements_equal(left_items, right_items, collector, depth + 1)?;
                if !same {
                    collector.record(Difference::new(
                        self.location(key),
                        preview(left),
                        preview(right),
                    ));
                }
                Ok(same)
            }
            (Value::Float(a), Value::Float(b)) => {
                if (a - b).abs() <= self.tolerance {
                    Ok(true)
                } else {
                    collector.record(Difference::new(
                        self.location(key),
                        preview(left),
                        preview(right),
                    ));
                    Ok(false)
                }
            }
            // Same scalar variant compares directly; a variant mismatch is
            // always unequal.
            (left, right) => {
                if left == right {
                    Ok(true)
                } else {
                    collector.record(Difference::new(
                        self.location(key),
                        preview(left),
                        preview(right),
                    ));
                    Ok(false)
                }
            }
        }
    }

    /// Positional element equality. Nested records still report their own
    /// detail; scalar and list elements contribute only to the boolean, so
    /// the caller records a single truncated preview per differing key.
    fn elements_equal(
        &self,
        left: &[Value],
        right: &[Value],
        collector: &mut dyn DifferenceCollector,
        depth: usize,
    ) -> Result<bool, DiffError> {
        if depth > MAX_DEPTH {
            return Err(DiffError::DepthExceeded { limit: MAX_DEPTH });
        }
        let mut all_equal = true;
        for (a, b) in left.iter().zip(right) {
            let same = match (a, b) {
                (Value::Record(left_map), Value::Record(right_map)) => self
                    .child(left_map)
                    .equals_at_depth(&self.child(right_map), collector, depth + 1)?,
                (Value::List(left_items), Value::List(right_items)) => {
                    left_items.len() == right_items.len()
                        && self.elements_equal(left_items, right_items, collector, depth + 1)?
                }
                (Value::Float(x), Value::Float(y)) => (x - y).abs() <= self.tolerance,
                (a, b) => a == b,
            };
            if !same {
                all_equal = false;
            }
        }
        Ok(all_equal)
    }

    /// Tolerance-stable content hash: floats rounded to the derived
    /// precision, record keys in sorted order, lists positionally. A coarse
    /// pre-filter for deduplication, never a substitute for [`equals`].
    ///
    /// [`equals`]: FuzzyRecord::equals
    pub fn content_hash(&self) -> u64 {
        let mut hasher = std::collections::hash_map::DefaultHasher::new();
        self.hash_record(self.data, &mut hasher);
        hasher.finish()
    }

    fn hash_record<H: Hasher>(&self, map: &BTreeMap<String, Value>, hasher: &mut H) {
        hasher.write_usize(map.len());
        for (key, value) in map {
            key.hash(hasher);
            self.hash_value(value, hasher);
        }
    }

    fn hash_value<H: Hasher>(&self, value: &Value, hasher: &mut H) {
        match value {
            Value::Null => hasher.write_u8(0),
            Value::Bool(b) => {
                hasher.write_u8(1);
                b.hash(hasher);
            }
            Value::Int(i) => {
                hasher.write_u8(2);
                i.hash(hasher);
            }
            Value::Float(f) => {
                hasher.write_u8(3);
                OrderedFloat(round_to(*f, self.precision)).hash(hasher);
            }
            Value::Text(s) => {
                hasher.write_u8(4);
                s.hash(hasher);
            }
            Value::List(items) => {
                hasher.write_u8(5);
                hasher.write_usize(items.len());
                for item in items {
                    self.hash_value(item, hasher);
                }
            }
            Value::Record(map) => {
                hasher.write_u8(6);
                self.hash_record(map, hasher);
            }
        }
    }

    /// Child comparison for a nested record: tolerance, strategies, ignore
    /// keys, and owner identity all propagate explicitly.
    fn child<'s>(&'s self, data: &'s BTreeMap<String, Value>) -> FuzzyRecord<'s> {
        FuzzyRecord {
            data,
            tolerance: self.tolerance,
            precision: self.precision,
            strategies: self.strategies,
            ignore_keys: self.ignore_keys,
            owner: self.owner,
        }
    }

    fn location(&self, key: &str) -> String {
        match self.owner {
            Some(owner) => format!("{key} [{owner}]"),
            None => key.to_string(),
        }
    }
}

/// Decimal digits floats are rounded to before hashing, derived from the
/// tolerance: `-round(log10(tolerance * 100))`. Zero tolerance means exact
/// comparison, so the precision is simply capped.
fn rounding_precision(tolerance: f64) -> i32 {
    if tolerance <= 0.0 {
        return 12;
    }
    let digits = (-(tolerance * 100.0).log10().round()) as i32;
    digits.min(12)
}

fn round_to(value: f64, precision: i32) -> f64 {
    let factor = 10f64.powi(precision);
    (value * factor).round() / factor
}

fn format_keys(map: &BTreeMap<String, Value>) -> String {
    let keys: Vec<&str> = map.keys().map(String::as_str).collect();
    format!("{{{}}}", keys.join(", "))
}
