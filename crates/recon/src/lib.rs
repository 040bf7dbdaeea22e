//! `bimdiff-recon` — Entity-set reconciliation over tolerant record diffs.
//!
//! Pure engine crate: receives two identity-keyed snapshots, classifies each
//! identity as added, removed, changed, or unchanged, and aggregates a
//! pass/fail verdict plus the full difference list. No CLI or IO.

pub mod config;
pub mod error;
pub mod reconciler;
pub mod report;

pub use config::{CollectorKind, CompareConfig, ExclusionRule};
pub use error::ReconError;
pub use reconciler::{EntityReconciler, ReconOutcome, Snapshot};
pub use report::{compute_summary, run, ReconMeta, ReconReport, ReconSummary};
