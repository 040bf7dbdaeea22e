use bimdiff_core::Difference;
use serde::Serialize;

use crate::config::CompareConfig;
use crate::error::ReconError;
use crate::reconciler::{EntityReconciler, ReconOutcome, Snapshot};

/// Summary statistics for one reconciliation run; useful even when the full
/// difference list is suppressed.
#[derive(Debug, Clone, Serialize)]
pub struct ReconSummary {
    pub entities_before: usize,
    pub entities_after: usize,
    pub shared: usize,
    pub added: usize,
    pub removed: usize,
    pub changed: usize,
    pub unchanged: usize,
    pub excluded: usize,
    pub differences: usize,
}

/// Compute summary statistics from the reconciliation outcome.
pub fn compute_summary(
    outcome: &ReconOutcome,
    before: &Snapshot,
    after: &Snapshot,
    differences: usize,
) -> ReconSummary {
    ReconSummary {
        entities_before: before.entities.len(),
        entities_after: after.entities.len(),
        shared: outcome.changed.len() + outcome.unchanged.len(),
        added: outcome.added.len(),
        removed: outcome.removed.len(),
        changed: outcome.changed.len(),
        unchanged: outcome.unchanged.len(),
        excluded: outcome.excluded.len(),
        differences,
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ReconMeta {
    pub config_name: String,
    pub tolerance: f64,
    pub engine_version: String,
    pub run_at: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReconReport {
    pub meta: ReconMeta,
    pub matched: bool,
    pub summary: ReconSummary,
    pub differences: Vec<Difference>,
}

/// One-shot entry point: build the configured collector, reconcile, report.
pub fn run(
    config: &CompareConfig,
    before: &Snapshot,
    after: &Snapshot,
) -> Result<ReconReport, ReconError> {
    let mut collector = config.make_collector();
    let reconciler = EntityReconciler::new(config);
    let outcome = reconciler.compare(before, after, collector.as_mut())?;
    let differences = collector.differences();
    let summary = compute_summary(&outcome, before, after, differences.len());

    Ok(ReconReport {
        meta: ReconMeta {
            config_name: config.name.clone(),
            tolerance: config.tolerance,
            engine_version: env!("CARGO_PKG_VERSION").to_string(),
            run_at: chrono::Utc::now().to_rfc3339(),
        },
        matched: outcome.matched,
        summary,
        differences,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use bimdiff_core::Value;
    use std::collections::BTreeSet;

    fn outcome() -> ReconOutcome {
        ReconOutcome {
            matched: false,
            added: BTreeSet::from(["z".to_string()]),
            removed: BTreeSet::from(["x".to_string()]),
            changed: BTreeSet::from(["y".to_string()]),
            unchanged: BTreeSet::new(),
            excluded: BTreeSet::new(),
        }
    }

    fn snapshot(name: &str, ids: &[&str]) -> Snapshot {
        Snapshot::new(
            name,
            ids.iter()
                .map(|id| (id.to_string(), Value::Record(Default::default())))
                .collect(),
        )
    }

    #[test]
    fn summary_counts() {
        let before = snapshot("before", &["x", "y"]);
        let after = snapshot("after", &["y", "z"]);
        let summary = compute_summary(&outcome(), &before, &after, 4);
        assert_eq!(summary.entities_before, 2);
        assert_eq!(summary.entities_after, 2);
        assert_eq!(summary.shared, 1);
        assert_eq!(summary.added, 1);
        assert_eq!(summary.removed, 1);
        assert_eq!(summary.changed, 1);
        assert_eq!(summary.differences, 4);
    }
}
