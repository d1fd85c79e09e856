use crate::audit;
use crate::settings;
use agrolens_core::{CoordinatorError, InferenceEndpoint, Outcome, RequestCoordinator};
use agrolens_telemetry::Paths;
use std::time::Instant;

/// Run the startup resume check and log what it did.
///
/// With `respect_lease` a marker younger than the request timeout is left to
/// whichever process wrote it.
pub async fn reconcile<E: InferenceEndpoint>(
    paths: &Paths,
    coordinator: &RequestCoordinator<E>,
    respect_lease: bool,
) -> Result<Option<Outcome>, CoordinatorError> {
    let Some(marker) = coordinator.in_flight_marker() else {
        return Ok(None);
    };

    let started = Instant::now();
    let result = if respect_lease {
        coordinator.resume_abandoned().await
    } else {
        coordinator.resume().await
    };
    let settled = match &result {
        Ok(None) | Ok(Some(Outcome::AlreadyInFlight(_))) => return result,
        Ok(Some(outcome)) => Ok(outcome.clone()),
        Err(e) => Err(e.clone()),
    };

    let record = audit::record_for(
        marker.key().as_str(),
        &marker.request_params.params.model,
        &settled,
        started.elapsed(),
        true,
    );
    audit::append(paths, &record);
    result
}

pub async fn run() -> anyhow::Result<()> {
    let paths = Paths::new()?;
    let coordinator = settings::coordinator(&paths)?;

    match reconcile(&paths, &coordinator, false).await {
        Ok(Some(outcome)) => {
            let output = super::analyze::outcome_json(&outcome);
            println!("{}", serde_json::to_string_pretty(&output)?);
            Ok(())
        }
        Ok(None) => {
            println!("Nothing to resume");
            Ok(())
        }
        Err(e) => anyhow::bail!(
            "Resumed analysis failed: {}. Run `agrolens analyze` to retry.",
            e
        ),
    }
}
