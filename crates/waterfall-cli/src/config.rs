use serde::Deserialize;
use std::fs;
use std::path::PathBuf;

use waterfall_core::sensitivity::SensitivityConfig;

const DEFAULT_STORE: &str = "scenarios.json";

/// Settings read from `--config`. Every key is optional.
///
/// ```toml
/// store_path = "data/scenarios.json"
///
/// [sensitivity]
/// defaultSteps = 50
/// minRangeSpan = 500000
/// ```
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct CliConfig {
    pub sensitivity: SensitivityConfig,
    pub store_path: Option<PathBuf>,
}

impl CliConfig {
    pub fn store_path(&self) -> PathBuf {
        self.store_path
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_STORE))
    }
}

pub fn load(path: Option<&str>) -> Result<CliConfig, Box<dyn std::error::Error>> {
    let Some(path) = path else {
        return Ok(CliConfig::default());
    };
    let contents =
        fs::read_to_string(path).map_err(|e| format!("Failed to read config '{}': {}", path, e))?;
    let config: CliConfig = toml::from_str(&contents)
        .map_err(|e| format!("Failed to parse config '{}': {}", path, e))?;
    config.sensitivity.validate()?;
    tracing::debug!(path, "configuration loaded");
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_toml() {
        let config: CliConfig = toml::from_str(
            r#"
            store_path = "funds.json"

            [sensitivity]
            defaultSteps = 50
            "#,
        )
        .unwrap();
        assert_eq!(config.sensitivity.default_steps, 50);
        assert_eq!(config.sensitivity.step_options, vec![10, 20, 50, 100]);
        assert_eq!(config.store_path(), PathBuf::from("funds.json"));
    }

    #[test]
    fn test_defaults_without_file() {
        let config = load(None).unwrap();
        assert_eq!(config.store_path(), PathBuf::from(DEFAULT_STORE));
    }
}
