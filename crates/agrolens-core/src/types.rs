//! Diagnosis domain types

use crate::key::ContentKey;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Classification taxonomy reported by the endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Disease,
    Pest,
    NutrientDeficiency,
    Healthy,
    #[serde(other)]
    Unknown,
}

impl Category {
    /// Parse a wire value leniently (case, spaces and dashes are ignored)
    pub fn parse(value: &str) -> Self {
        let normalized = value.trim().to_ascii_lowercase().replace([' ', '-'], "_");
        match normalized.as_str() {
            "disease" => Category::Disease,
            "pest" | "insect" => Category::Pest,
            "nutrient_deficiency" | "deficiency" => Category::NutrientDeficiency,
            "healthy" => Category::Healthy,
            _ => Category::Unknown,
        }
    }
}

/// How severe the detected condition is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Low,
    Moderate,
    High,
}

impl Severity {
    /// Parse a wire value; unrecognized strings yield `None`
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "low" | "mild" => Some(Severity::Low),
            "moderate" | "medium" => Some(Severity::Moderate),
            "high" | "severe" => Some(Severity::High),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Low => "low",
            Severity::Moderate => "moderate",
            Severity::High => "high",
        }
    }
}

/// A label with its confidence in `[0, 1]`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    pub label: String,
    pub confidence: f64,
}

/// Model/provider the endpoint routed the image to
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Provider {
    pub name: String,
    pub confidence: f64,
}

/// Full diagnosis returned by the endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiagnosisResult {
    pub label: String,
    pub confidence: f64,
    #[serde(default)]
    pub category: Option<Category>,
    #[serde(default)]
    pub severity: Option<Severity>,
    /// Secondary predictions, highest confidence first
    #[serde(default)]
    pub alternatives: Vec<Prediction>,
    #[serde(default)]
    pub guidance: String,
    #[serde(default)]
    pub provider: Option<Provider>,
}

/// Localized finding within the image
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Detection {
    pub label: String,
    pub confidence: f64,
    /// `[x, y, width, height]` in pixels
    #[serde(default)]
    pub bbox: Option<[f64; 4]>,
}

/// Cached analysis for one content key
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheEntry {
    pub key: ContentKey,
    pub result: DiagnosisResult,
    #[serde(default)]
    pub detections: Vec<Detection>,
    pub stored_at: DateTime<Utc>,
}

/// Minimal summary of the latest diagnosis for downstream readers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LastDiagnosis {
    pub label: String,
    #[serde(default)]
    pub category: Option<Category>,
    #[serde(default)]
    pub confidence: Option<f64>,
    #[serde(default)]
    pub severity: Option<String>,
    pub source: String,
    pub produced_at: DateTime<Utc>,
}

impl LastDiagnosis {
    /// Summarize `result`; `source` records where it came from
    pub fn from_result(result: &DiagnosisResult, source: impl Into<String>) -> Self {
        Self {
            label: result.label.clone(),
            category: result.category,
            confidence: Some(result.confidence),
            severity: result.severity.map(|s| s.as_str().to_string()),
            source: source.into(),
            produced_at: Utc::now(),
        }
    }
}

/// Parameters sent along with the image
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalyzeParams {
    pub model: String,
    #[serde(default)]
    pub save_for_training: bool,
    #[serde(default)]
    pub debug: bool,
}
