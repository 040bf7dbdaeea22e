//! `bimdiff-core` — Tolerant structural diff engine.
//!
//! Pure engine crate: compares nested attribute records under a numeric
//! tolerance and reports every semantic difference found. No IO, no file
//! format knowledge; snapshots arrive as already-extracted [`Value`] trees.

pub mod collector;
pub mod error;
pub mod fuzzy;
pub mod strategy;
pub mod value;

pub use collector::{Difference, DifferenceCollector, ListCollector, SetCollector};
pub use error::DiffError;
pub use fuzzy::FuzzyRecord;
pub use strategy::{default_strategies, ComparisonStrategy, NumericSortStrategy, StrategyOutcome};
pub use value::Value;
