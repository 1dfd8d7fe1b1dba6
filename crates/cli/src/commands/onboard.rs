//! `memoclaw onboard` — Write a starter configuration file.

use anyhow::Context;
use memoclaw_config::AppConfig;

pub async fn run() -> anyhow::Result<()> {
    let config_dir = AppConfig::config_dir();
    let config_path = config_dir.join("config.toml");

    if config_path.exists() {
        println!("Config already exists at {}", config_path.display());
        return Ok(());
    }

    std::fs::create_dir_all(&config_dir)
        .with_context(|| format!("Failed to create {}", config_dir.display()))?;
    std::fs::write(&config_path, AppConfig::default_toml())
        .with_context(|| format!("Failed to write {}", config_path.display()))?;

    println!("Wrote starter config to {}", config_path.display());
    println!();
    println!("Next steps:");
    println!("  1. Set GROQ_API_KEY (or add api_key to the config file)");
    println!("  2. Run: memoclaw chat");
    Ok(())
}
