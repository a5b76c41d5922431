//! Show, and optionally save, the effective configuration.

use memtree_common::config::{config_file_path, AppConfig};

pub fn run(config: &AppConfig, init: bool) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(config)?;
    println!("{json}");
    println!();

    if init {
        let path = config
            .save()
            .map_err(|e| anyhow::anyhow!("Failed to save config: {e}"))?;
        println!("Config saved to: {}", path.display());
    } else {
        println!("Config file: {}", config_file_path().display());
    }
    Ok(())
}
