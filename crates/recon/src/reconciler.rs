use std::collections::BTreeMap;
use std::collections::BTreeSet;

use bimdiff_core::{ComparisonStrategy, Difference, DifferenceCollector, FuzzyRecord, Value};

use crate::config::CompareConfig;
use crate::error::ReconError;

/// One named snapshot: a mapping from stable identity key to entity record.
///
/// Identity keys are unique within a snapshot by construction; the name
/// ("before"/"after", a file stem, …) only enriches reported differences.
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub name: String,
    pub entities: BTreeMap<String, Value>,
}

impl Snapshot {
    pub fn new(name: impl Into<String>, entities: BTreeMap<String, Value>) -> Self {
        Self { name: name.into(), entities }
    }
}

/// Identity-level bookkeeping from one reconciliation pass.
#[derive(Debug, Clone, Default)]
pub struct ReconOutcome {
    /// True iff the pass contributed zero difference entries.
    pub matched: bool,
    /// Identities present only in the "after" snapshot.
    pub added: BTreeSet<String>,
    /// Identities present only in the "before" snapshot.
    pub removed: BTreeSet<String>,
    /// Shared identities whose records differ beyond tolerance.
    pub changed: BTreeSet<String>,
    /// Shared identities whose records are tolerance-equal.
    pub unchanged: BTreeSet<String>,
    /// One-sided identities silently skipped by the exclusion rule.
    pub excluded: BTreeSet<String>,
}

/// Correlates two identity-keyed snapshots and produces a pass/fail verdict
/// plus full diagnostics through the shared collector.
pub struct EntityReconciler<'a> {
    config: &'a CompareConfig,
    strategies: Vec<Box<dyn ComparisonStrategy>>,
}

impl<'a> EntityReconciler<'a> {
    pub fn new(config: &'a CompareConfig) -> Self {
        Self {
            config,
            strategies: config.strategies(),
        }
    }

    /// Single linear pass: one-sided identities first, then a fuzzy record
    /// comparison per shared identity. Always completes the full pass; only
    /// structural errors (an entity that is not a record, pathological
    /// nesting) abort and surface to the caller.
    pub fn compare(
        &self,
        before: &Snapshot,
        after: &Snapshot,
        collector: &mut dyn DifferenceCollector,
    ) -> Result<ReconOutcome, ReconError> {
        let baseline = collector.len();
        let mut outcome = ReconOutcome::default();

        for (id, record) in &before.entities {
            if after.entities.contains_key(id) {
                continue;
            }
            if self.is_excluded(record) {
                outcome.excluded.insert(id.clone());
                continue;
            }
            outcome.removed.insert(id.clone());
            collector.record(Difference::new(
                format!("entity {id}"),
                format!("present in {}", before.name),
                format!("missing from {}", after.name),
            ));
        }

        for (id, record) in &after.entities {
            if before.entities.contains_key(id) {
                continue;
            }
            if self.is_excluded(record) {
                outcome.excluded.insert(id.clone());
                continue;
            }
            outcome.added.insert(id.clone());
            collector.record(Difference::new(
                format!("entity {id}"),
                format!("missing from {}", before.name),
                format!("present in {}", after.name),
            ));
        }

        for (id, before_record) in &before.entities {
            let Some(after_record) = after.entities.get(id) else {
                continue;
            };

            let lhs = self.wrap(before_record, id, &before.name)?;
            let rhs = self.wrap(after_record, id, &after.name)?;

            let detail_start = collector.len();
            let equal = lhs.equals(&rhs, collector).map_err(|source| {
                ReconError::Entity {
                    snapshot: before.name.clone(),
                    id: id.clone(),
                    source,
                }
            })?;

            if equal {
                outcome.unchanged.insert(id.clone());
            } else {
                outcome.changed.insert(id.clone());
                // Identity-level summary; the per-attribute detail was
                // already recorded by the fuzzy comparison itself.
                let detail = collector.len() - detail_start;
                collector.record(Difference::new(
                    format!("entity {id}"),
                    "attributes differ".to_string(),
                    format!("{detail} detailed difference(s)"),
                ));
            }
        }

        outcome.matched = collector.len() == baseline;
        Ok(outcome)
    }

    fn wrap<'v>(
        &'v self,
        record: &'v Value,
        id: &'v str,
        snapshot: &str,
    ) -> Result<FuzzyRecord<'v>, ReconError> {
        Ok(FuzzyRecord::new(record, self.config.tolerance)
            .map_err(|source| ReconError::Entity {
                snapshot: snapshot.to_string(),
                id: id.to_string(),
                source,
            })?
            .with_strategies(&self.strategies)
            .with_ignored_keys(&self.config.ignore_keys)
            .with_owner(id))
    }

    fn is_excluded(&self, record: &Value) -> bool {
        self.config
            .exclusion
            .as_ref()
            .is_some_and(|rule| rule.matches(record))
    }
}
