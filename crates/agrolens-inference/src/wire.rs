//! `/analyze-plant` response format

use agrolens_core::{
    Category, Detection, DiagnosisResult, EndpointError, InferenceResponse, Prediction, Provider,
    Severity,
};
use serde::Deserialize;

/// Older services use `predicted_class`, `top_predictions` and `advice`.
/// Some send both spellings; the current name wins.
#[derive(Debug, Deserialize)]
struct WireResponse {
    #[serde(default)]
    label: Option<String>,
    #[serde(default)]
    predicted_class: Option<String>,
    confidence: f64,
    #[serde(default)]
    category: Option<String>,
    #[serde(default)]
    severity: Option<String>,
    #[serde(default)]
    alternatives: Option<Vec<WirePrediction>>,
    #[serde(default)]
    top_predictions: Option<Vec<WirePrediction>>,
    #[serde(default)]
    guidance: Option<String>,
    #[serde(default)]
    advice: Option<String>,
    #[serde(default)]
    provider: Option<WireProvider>,
    #[serde(default)]
    detections: Vec<WireDetection>,
}

#[derive(Debug, Deserialize)]
struct WirePrediction {
    #[serde(default)]
    label: Option<String>,
    #[serde(default)]
    class: Option<String>,
    confidence: f64,
}

impl WirePrediction {
    fn into_prediction(self) -> Option<Prediction> {
        let label = self.label.or(self.class)?;
        if label.trim().is_empty() || !is_probability(self.confidence) {
            return None;
        }
        Some(Prediction {
            label,
            confidence: self.confidence,
        })
    }
}

#[derive(Debug, Deserialize)]
struct WireProvider {
    name: String,
    #[serde(default)]
    confidence: f64,
}

#[derive(Debug, Deserialize)]
struct WireDetection {
    label: String,
    confidence: f64,
    #[serde(default)]
    bbox: Option<[f64; 4]>,
}

fn is_probability(value: f64) -> bool {
    value.is_finite() && (0.0..=1.0).contains(&value)
}

/// Parse and validate a 2xx response body.
///
/// Only `label` and `confidence` are required. Secondary entries with
/// out-of-range confidences are dropped rather than failing the whole reply.
pub fn parse_response(body: &str) -> Result<InferenceResponse, EndpointError> {
    let wire: WireResponse =
        serde_json::from_str(body).map_err(|e| EndpointError::Malformed(e.to_string()))?;

    let label = wire.label.or(wire.predicted_class).unwrap_or_default();
    let label = label.trim();
    if label.is_empty() {
        return Err(EndpointError::Malformed("empty label".to_string()));
    }
    if !is_probability(wire.confidence) {
        return Err(EndpointError::Malformed(format!(
            "confidence {} outside [0, 1]",
            wire.confidence
        )));
    }

    let mut alternatives: Vec<Prediction> = wire
        .alternatives
        .or(wire.top_predictions)
        .unwrap_or_default()
        .into_iter()
        .filter_map(WirePrediction::into_prediction)
        .collect();
    alternatives.sort_by(|a, b| b.confidence.total_cmp(&a.confidence));

    let provider = wire
        .provider
        .filter(|p| !p.name.is_empty() && is_probability(p.confidence))
        .map(|p| Provider {
            name: p.name,
            confidence: p.confidence,
        });

    let detections = wire
        .detections
        .into_iter()
        .filter(|d| is_probability(d.confidence))
        .map(|d| Detection {
            label: d.label,
            confidence: d.confidence,
            bbox: d.bbox,
        })
        .collect();

    Ok(InferenceResponse {
        result: DiagnosisResult {
            label: label.to_string(),
            confidence: wire.confidence,
            category: wire.category.as_deref().map(Category::parse),
            severity: wire.severity.as_deref().and_then(Severity::parse),
            alternatives,
            guidance: wire.guidance.or(wire.advice).unwrap_or_default(),
            provider,
        },
        detections,
    })
}
