//! Output
//!
//! Persisting run results for downstream analysis.

pub mod results;

pub use results::{write_results, ExportedRun, SUMMARY_THRESHOLD};
