use std::fs;
use std::path::Path;

use pinata_core::PinataConfig;

use crate::error::Result;

/// Parse and validate a TOML configuration. Missing sections and fields
/// take their defaults.
pub fn parse_config(text: &str) -> Result<PinataConfig> {
    let config: PinataConfig = toml::from_str(text)?;
    config.validate()?;
    Ok(config)
}

pub fn load_config(path: &Path) -> Result<PinataConfig> {
    let text = fs::read_to_string(path)?;
    let config = parse_config(&text)?;
    tracing::debug!(path = %path.display(), "config loaded");
    Ok(config)
}

pub fn to_toml(config: &PinataConfig) -> Result<String> {
    Ok(toml::to_string_pretty(config)?)
}

pub fn save_config(path: &Path, config: &PinataConfig) -> Result<()> {
    config.validate()?;
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, to_toml(config)?)?;
    tracing::debug!(path = %path.display(), "config saved");
    Ok(())
}
