use agrolens_core::{Config, RequestCoordinator};
use agrolens_inference::HttpEndpoint;
use agrolens_store::{SharedStorage, SqliteStore};
use agrolens_telemetry::Paths;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

/// On-disk shape of `agrolens.json`; every field is optional
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct ConfigFile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub save_for_training: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub debug: Option<bool>,
}

impl ConfigFile {
    /// Every field spelled out with its default value
    pub fn defaults() -> Self {
        let config = Config::new();
        Self {
            endpoint_url: Some(config.endpoint_url),
            model: Some(config.model),
            timeout_secs: Some(config.timeout.as_secs()),
            save_for_training: Some(config.save_for_training),
            debug: Some(config.debug),
        }
    }

    fn apply(self, mut config: Config) -> Config {
        if let Some(url) = self.endpoint_url {
            config.endpoint_url = url;
        }
        if let Some(model) = self.model {
            config.model = model;
        }
        match self.timeout_secs {
            Some(0) => tracing::warn!("ignoring timeout_secs = 0; keeping the default timeout"),
            Some(secs) => config.timeout = Duration::from_secs(secs),
            None => {}
        }
        if let Some(train) = self.save_for_training {
            config.save_for_training = train;
        }
        if let Some(debug) = self.debug {
            config.debug = debug;
        }
        config
    }
}

/// Load overrides from `config_path`; a missing or invalid file yields defaults
pub fn load_config(config_path: &Path) -> Config {
    if !config_path.exists() {
        return Config::new();
    }

    let content = match std::fs::read_to_string(config_path) {
        Ok(c) => c,
        Err(_) => return Config::new(),
    };

    match serde_json::from_str::<ConfigFile>(&content) {
        Ok(file) => file.apply(Config::new()),
        Err(e) => {
            tracing::warn!(path = %config_path.display(), error = %e, "ignoring invalid config");
            Config::new()
        }
    }
}

pub fn open_storage(paths: &Paths) -> anyhow::Result<SharedStorage> {
    let store = SqliteStore::new(&paths.state_db())?;
    Ok(Arc::new(store))
}

/// Coordinator over the on-disk store talking to the configured service
pub fn coordinator(paths: &Paths) -> anyhow::Result<RequestCoordinator<HttpEndpoint>> {
    let config = load_config(&paths.config_file());
    let endpoint = HttpEndpoint::new(&config.endpoint_url);
    Ok(RequestCoordinator::new(open_storage(paths)?, endpoint, config))
}
