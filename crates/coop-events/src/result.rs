//! Run Result Types
//!
//! What the driver hands back once a run stops, either because the
//! generation budget ran out or because the population collapsed.

use serde::{Deserialize, Serialize};

use crate::metrics::GenerationMetrics;

/// Why a run collapsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CollapseCause {
    /// Humans fell below the configured floor
    HumanExtinction,
    /// The whole population, AI included, fell below two agents
    Total,
}

impl CollapseCause {
    pub fn as_str(&self) -> &'static str {
        match self {
            CollapseCause::HumanExtinction => "human_extinction",
            CollapseCause::Total => "total",
        }
    }
}

impl std::fmt::Display for CollapseCause {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Terminal status of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RunStatus {
    /// Every requested generation executed
    Completed,
    /// The run stopped early
    Collapsed { generation: u32, cause: CollapseCause },
}

/// Outcome of one simulation run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunResult {
    pub name: String,
    /// Generation at which the collapse check fired
    #[serde(skip_serializing_if = "Option::is_none")]
    pub collapsed_at_generation: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub collapse_cause: Option<CollapseCause>,
    /// One record per generation that reached the metrics step
    pub history: Vec<GenerationMetrics>,
    /// Last recorded generation, if any generation was recorded
    #[serde(skip_serializing_if = "Option::is_none")]
    pub final_metrics: Option<GenerationMetrics>,
}

impl RunResult {
    /// Result for a run that used its whole generation budget.
    pub fn completed(name: impl Into<String>, history: Vec<GenerationMetrics>) -> Self {
        let final_metrics = history.last().cloned();
        Self {
            name: name.into(),
            collapsed_at_generation: None,
            collapse_cause: None,
            history,
            final_metrics,
        }
    }

    /// Result for a run that stopped on the collapse check.
    pub fn collapsed(
        name: impl Into<String>,
        generation: u32,
        cause: CollapseCause,
        history: Vec<GenerationMetrics>,
    ) -> Self {
        let final_metrics = history.last().cloned();
        Self {
            name: name.into(),
            collapsed_at_generation: Some(generation),
            collapse_cause: Some(cause),
            history,
            final_metrics,
        }
    }

    pub fn status(&self) -> RunStatus {
        match (self.collapsed_at_generation, self.collapse_cause) {
            (Some(generation), Some(cause)) => RunStatus::Collapsed { generation, cause },
            _ => RunStatus::Completed,
        }
    }

    pub fn is_collapsed(&self) -> bool {
        self.collapsed_at_generation.is_some()
    }

    /// One-line outcome for logs and summaries.
    pub fn summary_line(&self) -> String {
        match self.status() {
            RunStatus::Collapsed { generation, cause } => {
                format!("{}: collapsed at gen {} ({})", self.name, generation, cause)
            }
            RunStatus::Completed => match &self.final_metrics {
                Some(m) => format!(
                    "{}: survived | humans {} ais {} awakened {} teachers {} | coop {:.2} trust {:.2}",
                    self.name,
                    m.humans,
                    m.ais,
                    m.awakened,
                    m.teachers,
                    m.cooperation_ratio,
                    m.mean_trust
                ),
                None => format!("{}: survived (no generations recorded)", self.name),
            },
        }
    }
}
