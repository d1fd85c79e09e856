use crate::settings::ConfigFile;
use agrolens_telemetry::Paths;

pub fn run() -> anyhow::Result<()> {
    let paths = Paths::new()?;
    let config_path = paths.config_file();

    if config_path.exists() {
        println!("Config already exists at {}", config_path.display());
        return Ok(());
    }

    write_default_config(&config_path)?;
    println!("✓ Wrote default config to {}", config_path.display());
    println!("\nEdit endpoint_url to point at your inference service.");
    Ok(())
}

fn write_default_config(path: &std::path::Path) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(&ConfigFile::defaults())?;
    agrolens_telemetry::atomic_write(path, json.as_bytes())?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::load_config;

    #[test]
    fn test_default_config_loads_back() {
        let temp = tempfile::TempDir::new().unwrap();
        let path = temp.path().join("agrolens.json");

        write_default_config(&path).unwrap();
        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("endpoint_url"));
        assert!(content.contains("timeout_secs"));

        let config = load_config(&path);
        assert_eq!(config.model, "default");
    }
}
