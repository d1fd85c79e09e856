use crate::settings;
use agrolens_core::{CacheEntry, InFlightMarker, UploadSession};
use agrolens_telemetry::Paths;

fn build_status(
    upload: Option<&UploadSession>,
    marker: Option<&InFlightMarker>,
    cached: Option<&CacheEntry>,
) -> serde_json::Value {
    let mut output = serde_json::json!({
        "upload": null,
        "in_flight": null,
        "cached": cached.is_some(),
    });

    if let Some(session) = upload {
        output["upload"] = serde_json::json!({
            "file_name": session.file_name,
            "mime_type": session.mime_type,
            "size_bytes": session.size_bytes,
            "captured_at": session.captured_at,
            "key": session.key(),
        });
    }

    if let Some(marker) = marker {
        output["in_flight"] = serde_json::json!({
            "key": marker.key(),
            "model": marker.request_params.params.model,
            "started_at": marker.started_at,
        });
    }

    if let Some(entry) = cached {
        output["label"] = serde_json::json!(entry.result.label);
        output["confidence"] = serde_json::json!(entry.result.confidence);
    }

    output
}

pub fn run() -> anyhow::Result<()> {
    let paths = Paths::new()?;
    let coordinator = settings::coordinator(&paths)?;

    let upload = coordinator.current_upload();
    let marker = coordinator.in_flight_marker();
    let cached = upload.as_ref().and_then(|s| coordinator.lookup(&s.key()));

    let output = build_status(upload.as_ref(), marker.as_ref(), cached.as_ref());
    println!("{output}");
    Ok(())
}
