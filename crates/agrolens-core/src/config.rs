//! Configuration for the analysis coordinator

use crate::types::AnalyzeParams;
use std::time::Duration;

/// Coordinator configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the inference service (without `/analyze-plant`)
    pub endpoint_url: String,

    /// Model selector sent with every request
    pub model: String,

    /// Upper bound on one endpoint call; also the age after which a
    /// durable in-flight marker counts as abandoned
    pub timeout: Duration,

    /// Let the service keep the image for training
    pub save_for_training: bool,

    /// Ask the service for debug output
    pub debug: bool,
}

impl Config {
    pub fn new() -> Self {
        Self {
            endpoint_url: "http://127.0.0.1:8000".to_string(),
            model: "default".to_string(),
            timeout: Duration::from_secs(60),
            save_for_training: false,
            debug: false,
        }
    }

    /// Request parameters derived from this config
    pub fn analyze_params(&self) -> AnalyzeParams {
        AnalyzeParams {
            model: self.model.clone(),
            save_for_training: self.save_for_training,
            debug: self.debug,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let config = Config::new();
        assert_eq!(config.model, "default");
        assert_eq!(config.timeout, Duration::from_secs(60));
        assert!(!config.save_for_training);
        assert!(!config.debug);
    }

    #[test]
    fn test_analyze_params_follow_config() {
        let config = Config {
            model: "maize-v3".to_string(),
            debug: true,
            ..Config::new()
        };
        let params = config.analyze_params();
        assert_eq!(params.model, "maize-v3");
        assert!(params.debug);
        assert!(!params.save_for_training);
    }
}
