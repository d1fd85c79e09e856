use crate::settings;
use agrolens_core::LastDiagnosisPublisher;
use agrolens_telemetry::Paths;

/// Reads the mailbox the way any downstream feature would: through the
/// storage port, without a coordinator.
pub fn run() -> anyhow::Result<()> {
    let paths = Paths::new()?;
    let publisher = LastDiagnosisPublisher::new(settings::open_storage(&paths)?);

    match publisher.read_latest() {
        Some(latest) => println!("{}", serde_json::to_string_pretty(&latest)?),
        None => println!("No diagnosis yet"),
    }
    Ok(())
}
