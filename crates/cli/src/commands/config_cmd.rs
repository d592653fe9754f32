//! `daybook config` — initialize or inspect the configuration.

use daybook_config::AppConfig;

/// Write a default config file if none exists.
pub fn init() -> Result<(), Box<dyn std::error::Error>> {
    let dir = AppConfig::config_dir();
    let path = dir.join("config.toml");

    if path.exists() {
        println!("Config already exists at {}", path.display());
        return Ok(());
    }

    std::fs::create_dir_all(&dir)?;
    std::fs::write(&path, AppConfig::default_toml())?;
    println!("Wrote default config to {}", path.display());
    println!("Set llm.api_key, channel.authorized_user and channel.bot_token to go online.");

    Ok(())
}

/// Print the active configuration with secrets redacted.
pub fn show() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load()?;
    println!("{config:#?}");
    Ok(())
}
