use crate::audit;
use crate::settings;
use agrolens_core::{AnalyzeParams, CoordinatorError, Outcome};
use agrolens_telemetry::Paths;
use std::time::Instant;

/// JSON shape printed for a settled analysis
pub fn outcome_json(outcome: &Outcome) -> serde_json::Value {
    match outcome {
        Outcome::CacheHit(entry) => serde_json::json!({
            "status": "cache_hit",
            "entry": entry,
        }),
        Outcome::Fresh(entry) => serde_json::json!({
            "status": "analyzed",
            "entry": entry,
        }),
        Outcome::AlreadyInFlight(key) => serde_json::json!({
            "status": "already_in_flight",
            "key": key,
        }),
    }
}

pub async fn run(model: Option<String>, train: bool, debug: bool) -> anyhow::Result<()> {
    let paths = Paths::new()?;
    let coordinator = settings::coordinator(&paths)?;

    // Startup reconciliation comes first so an interrupted request is not
    // issued twice.
    if let Err(e) = super::resume::reconcile(&paths, &coordinator, true).await {
        eprintln!("Interrupted analysis failed again: {}", e);
    }

    let defaults = coordinator.config().analyze_params();
    let params = AnalyzeParams {
        model: model.unwrap_or(defaults.model),
        save_for_training: train || defaults.save_for_training,
        debug: debug || defaults.debug,
    };

    let Some(session) = coordinator.current_upload() else {
        anyhow::bail!("No image uploaded. Run `agrolens upload <path>` first.");
    };

    let started = Instant::now();
    let result = coordinator.analyze_with(params.clone()).await;
    let record = audit::record_for(
        session.key().as_str(),
        &params.model,
        &result,
        started.elapsed(),
        false,
    );
    audit::append(&paths, &record);

    match result {
        Ok(outcome) => {
            println!("{}", serde_json::to_string_pretty(&outcome_json(&outcome))?);
            Ok(())
        }
        Err(CoordinatorError::NoUpload) => {
            anyhow::bail!("No image uploaded. Run `agrolens upload <path>` first.")
        }
        Err(e) => anyhow::bail!("Analysis failed: {}. Run `agrolens analyze` again to retry.", e),
    }
}
