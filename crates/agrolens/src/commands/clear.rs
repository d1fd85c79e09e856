use crate::settings;
use agrolens_telemetry::Paths;

pub fn run() -> anyhow::Result<()> {
    let paths = Paths::new()?;
    let coordinator = settings::coordinator(&paths)?;

    if coordinator.current_upload().is_none() && coordinator.in_flight_marker().is_none() {
        println!("Nothing to clear");
        return Ok(());
    }

    coordinator.clear_upload()?;
    println!("Cleared current upload (cached diagnoses kept)");
    Ok(())
}
