//! Audit record types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// How an analysis settled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisOutcome {
    CacheHit,
    Succeeded,
    Failed,
    AlreadyInFlight,
}

impl AnalysisOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            AnalysisOutcome::CacheHit => "cache_hit",
            AnalysisOutcome::Succeeded => "succeeded",
            AnalysisOutcome::Failed => "failed",
            AnalysisOutcome::AlreadyInFlight => "already_in_flight",
        }
    }
}

/// One line of `analyses.jsonl`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisRecord {
    pub key: String,
    pub outcome: AnalysisOutcome,
    pub model: String,
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub latency_ms: u64,
    #[serde(default)]
    pub resumed: bool,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}
