//! Results Export
//!
//! Writes finished runs as pretty JSON. Long histories are replaced by a
//! down-sampled summary.

use coop_events::{CollapseCause, Downsample, GenerationMetrics, RunResult};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::error::SimError;

/// Histories longer than this are exported as a `history_summary`
pub const SUMMARY_THRESHOLD: usize = 10;

/// One run as written to the results file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportedRun {
    pub name: String,
    pub survived: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub collapsed_at_generation: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub collapse_cause: Option<CollapseCause>,
    pub generations_recorded: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub final_metrics: Option<GenerationMetrics>,
    /// Full history, left empty when a summary is written instead
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub history: Vec<GenerationMetrics>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub history_summary: Option<Vec<GenerationMetrics>>,
}

impl ExportedRun {
    pub fn new(result: &RunResult, sampling: Downsample) -> Self {
        let (history, history_summary) = if result.history.len() > SUMMARY_THRESHOLD {
            (Vec::new(), Some(sampling.apply(&result.history)))
        } else {
            (result.history.clone(), None)
        };
        Self {
            name: result.name.clone(),
            survived: !result.is_collapsed(),
            collapsed_at_generation: result.collapsed_at_generation,
            collapse_cause: result.collapse_cause,
            generations_recorded: result.history.len(),
            final_metrics: result.final_metrics.clone(),
            history,
            history_summary,
        }
    }
}

/// Write every run to `path`, creating parent directories as needed
pub fn write_results(path: impl AsRef<Path>, results: &[RunResult], sampling: Downsample) -> Result<(), SimError> {
    let path = path.as_ref();
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    let runs: Vec<ExportedRun> = results.iter().map(|r| ExportedRun::new(r, sampling)).collect();
    let json = serde_json::to_string_pretty(&runs)?;
    fs::write(path, json)?;
    tracing::info!(path = %path.display(), runs = runs.len(), "results written");
    Ok(())
}
