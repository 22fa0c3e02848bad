//! The grouping engine: decides which license records describe the same
//! obligation and merges them into report entries.
//!
//! - [`years`] — copyright-year normalization and range merging.
//! - [`classifier`] — path heuristics for umbrella projects and CCCL.
//! - [`key`] — the content equivalence key.
//! - [`grouping`] — suppression, folding and umbrella consolidation.

pub mod classifier;
pub mod grouping;
pub mod key;
pub mod years;

pub use classifier::ReferenceSets;
pub use grouping::{group, GroupingOptions, GroupingOutcome, GroupingStats};
