use agrolens_core::{CoordinatorError, Outcome};
use agrolens_telemetry::{append_jsonl, AnalysisOutcome, AnalysisRecord, Paths};
use chrono::Utc;
use std::time::Duration;

/// Build the audit line for a settled analysis
pub fn record_for(
    key: &str,
    model: &str,
    result: &Result<Outcome, CoordinatorError>,
    elapsed: Duration,
    resumed: bool,
) -> AnalysisRecord {
    let (outcome, label, error) = match result {
        Ok(Outcome::CacheHit(entry)) => (
            AnalysisOutcome::CacheHit,
            Some(entry.result.label.clone()),
            None,
        ),
        Ok(Outcome::Fresh(entry)) => (
            AnalysisOutcome::Succeeded,
            Some(entry.result.label.clone()),
            None,
        ),
        Ok(Outcome::AlreadyInFlight(_)) => (AnalysisOutcome::AlreadyInFlight, None, None),
        Err(e) => (AnalysisOutcome::Failed, None, Some(e.to_string())),
    };

    AnalysisRecord {
        key: key.to_string(),
        outcome,
        model: model.to_string(),
        timestamp: Utc::now(),
        latency_ms: elapsed.as_millis() as u64,
        resumed,
        label,
        error,
    }
}

/// Append to the audit log; a log failure never fails the command
pub fn append(paths: &Paths, record: &AnalysisRecord) {
    if let Err(e) = append_jsonl(&paths.analyses_file(), record) {
        tracing::warn!(error = %e, "failed to append analysis record");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use agrolens_core::EndpointError;

    #[test]
    fn test_failed_record_keeps_error() {
        let result: Result<Outcome, CoordinatorError> = Err(CoordinatorError::Endpoint(
            EndpointError::Transport("connection refused".to_string()),
        ));
        let record = record_for("abc", "default", &result, Duration::from_millis(12), false);

        assert_eq!(record.outcome, AnalysisOutcome::Failed);
        assert_eq!(record.latency_ms, 12);
        assert!(record.error.unwrap().contains("connection refused"));
        assert!(record.label.is_none());
    }

    #[test]
    fn test_in_flight_record() {
        let result = Ok(Outcome::AlreadyInFlight(agrolens_core::ContentKey::derive(
            b"x",
        )));
        let record = record_for("abc", "default", &result, Duration::ZERO, true);
        assert_eq!(record.outcome, AnalysisOutcome::AlreadyInFlight);
        assert!(record.resumed);
    }

    #[test]
    fn test_append_writes_jsonl() {
        let temp = tempfile::TempDir::new().unwrap();
        let paths = Paths::at(temp.path());
        let record = record_for(
            "abc",
            "default",
            &Err(CoordinatorError::NoUpload),
            Duration::ZERO,
            false,
        );
        append(&paths, &record);
        append(&paths, &record);

        let read: Vec<AnalysisRecord> =
            agrolens_telemetry::read_jsonl(&paths.analyses_file()).unwrap();
        assert_eq!(read.len(), 2);
    }
}
