use agrolens_telemetry::{read_jsonl, AnalysisOutcome, AnalysisRecord, Paths};

#[derive(Default)]
struct HistoryFilter {
    key: Option<String>,
    hours: Option<u64>,
    limit: Option<usize>,
}

fn filter_records<'a>(
    records: &'a [AnalysisRecord],
    filter: &HistoryFilter,
) -> Vec<&'a AnalysisRecord> {
    let cutoff = filter
        .hours
        .map(|h| chrono::Utc::now() - chrono::Duration::hours(h as i64));

    records
        .iter()
        .filter(|r| {
            if let Some(ref cutoff) = cutoff {
                if r.timestamp < *cutoff {
                    return false;
                }
            }
            if let Some(ref key) = filter.key {
                if &r.key != key {
                    return false;
                }
            }
            true
        })
        .collect()
}

fn compute_stats(records: &[AnalysisRecord]) -> String {
    if records.is_empty() {
        return "No analyses recorded.".to_string();
    }
    let total = records.len();
    let count = |outcome: AnalysisOutcome| records.iter().filter(|r| r.outcome == outcome).count();
    let hits = count(AnalysisOutcome::CacheHit);

    // Cache hits never touch the network, keep them out of the latency figure
    let calls: Vec<_> = records
        .iter()
        .filter(|r| matches!(r.outcome, AnalysisOutcome::Succeeded | AnalysisOutcome::Failed))
        .collect();
    let avg_latency = if calls.is_empty() {
        0
    } else {
        calls.iter().map(|r| r.latency_ms).sum::<u64>() / calls.len() as u64
    };

    format!(
        "Total analyses: {}\n\
         Cache hits: {} ({:.0}%)\n\
         Succeeded: {}\n\
         Failed: {}\n\
         Already in flight: {}\n\
         Avg service latency: {} ms",
        total,
        hits,
        hits as f64 / total as f64 * 100.0,
        count(AnalysisOutcome::Succeeded),
        count(AnalysisOutcome::Failed),
        count(AnalysisOutcome::AlreadyInFlight),
        avg_latency
    )
}

pub fn run(
    stats: bool,
    key: Option<String>,
    hours: Option<u64>,
    limit: usize,
) -> anyhow::Result<()> {
    let paths = Paths::new()?;
    let records: Vec<AnalysisRecord> = read_jsonl(&paths.analyses_file())?;

    if records.is_empty() {
        println!("No analysis history");
        return Ok(());
    }

    let filter = HistoryFilter {
        key,
        hours,
        limit: Some(limit),
    };
    let filtered = filter_records(&records, &filter);

    if stats {
        let selected: Vec<AnalysisRecord> = filtered.into_iter().cloned().collect();
        println!("{}", compute_stats(&selected));
        return Ok(());
    }

    let display: Vec<_> = filtered
        .into_iter()
        .rev()
        .take(filter.limit.unwrap_or(20))
        .collect();

    println!("Recent Analyses (last {})", display.len());
    println!("=========================");
    for record in &display {
        let detail = record
            .label
            .as_deref()
            .or(record.error.as_deref())
            .unwrap_or("-");
        println!(
            "  {} | {} {:<17} {:>6}ms{} | {}",
            record.timestamp.format("%Y-%m-%d %H:%M"),
            record.key,
            record.outcome.as_str(),
            record.latency_ms,
            if record.resumed { " resumed" } else { "" },
            detail,
        );
    }
    Ok(())
}
