use anyhow::Result;

use timerstore::config::Config;

/// Print the effective configuration as TOML
pub fn show_config(config: &Config) -> Result<()> {
    println!("{}", config.to_toml()?);
    Ok(())
}
