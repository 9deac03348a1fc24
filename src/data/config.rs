//! `assets/config/cultivation.ron` — tunables for the cultivation subsystem.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::shared::*;
use super::crops::default_crops;

pub const CONFIG_PATH: &str = "assets/config/cultivation.ron";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed config: {0}")]
    Parse(#[from] ron::error::SpannedError),
    #[error("invalid config: {0}")]
    Invalid(String),
}

impl ConfigError {
    pub fn is_missing_file(&self) -> bool {
        matches!(self, ConfigError::Io { source, .. } if source.kind() == std::io::ErrorKind::NotFound)
    }
}

/// On-disk shape of the config. Every field is optional in the file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CultivationConfig {
    pub rain_chance: f64,
    pub growth_tick_seconds: f32,
    pub save_path: PathBuf,
    pub crops: Vec<CropDef>,
}

impl Default for CultivationConfig {
    fn default() -> Self {
        let settings = CultivationSettings::default();
        Self {
            rain_chance: settings.rain_chance,
            growth_tick_seconds: settings.growth_tick_seconds,
            save_path: settings.save_path,
            crops: default_crops(),
        }
    }
}

impl CultivationConfig {
    pub fn parse(text: &str) -> Result<Self, ConfigError> {
        let config: Self = ron::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&text)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=1.0).contains(&self.rain_chance) {
            return Err(ConfigError::Invalid(format!(
                "rain_chance {} is not a probability",
                self.rain_chance
            )));
        }
        if !(self.growth_tick_seconds >= 0.0 && self.growth_tick_seconds.is_finite()) {
            return Err(ConfigError::Invalid(format!(
                "growth_tick_seconds {} must be zero or positive",
                self.growth_tick_seconds
            )));
        }
        for def in &self.crops {
            if def.stages == 0 {
                return Err(ConfigError::Invalid(format!("crop {} has no stages", def.name)));
            }
            if !(def.growth_rate > 0.0 && def.growth_rate.is_finite()) {
                return Err(ConfigError::Invalid(format!(
                    "crop {} growth_rate {} must be positive",
                    def.name, def.growth_rate
                )));
            }
        }
        Ok(())
    }

    pub fn settings(&self) -> CultivationSettings {
        CultivationSettings {
            rain_chance: self.rain_chance,
            growth_tick_seconds: self.growth_tick_seconds,
            save_path: self.save_path.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_is_all_defaults() {
        assert_eq!(CultivationConfig::parse("()").unwrap(), CultivationConfig::default());
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let config = CultivationConfig::parse("(rain_chance: 0.5, growth_tick_seconds: 2.0)").unwrap();
        assert_eq!(config.rain_chance, 0.5);
        assert_eq!(config.growth_tick_seconds, 2.0);
        assert_eq!(config.crops, default_crops());
        assert_eq!(config.save_path, PathBuf::from("saves/cultivation.json"));
    }

    #[test]
    fn crop_list_overrides_defaults() {
        let text = r#"(
            crops: [
                (
                    kind: Corn,
                    name: "Corn",
                    growth_rate: 0.5,
                    stages: 6,
                    y_offset: -16.0,
                    frame_width: 64.0,
                    frame_height: 96.0,
                    hitbox_inset: 26.0,
                ),
            ],
        )"#;
        let config = CultivationConfig::parse(text).unwrap();
        assert_eq!(config.crops.len(), 1);
        assert_eq!(config.crops[0].max_age(), 5);
        assert_eq!(config.crops[0].frame_height, 96.0);
    }

    #[test]
    fn syntax_errors_are_parse_errors() {
        let err = CultivationConfig::parse("(rain_chance: ").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)), "{err}");
    }

    #[test]
    fn out_of_range_values_are_rejected() {
        assert!(matches!(
            CultivationConfig::parse("(rain_chance: 1.5)"),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            CultivationConfig::parse("(growth_tick_seconds: -1.0)"),
            Err(ConfigError::Invalid(_))
        ));
    }

    #[test]
    fn missing_file_is_reported_as_such() {
        let err = CultivationConfig::load(Path::new("does/not/exist.ron")).unwrap_err();
        assert!(err.is_missing_file());
    }

    #[test]
    fn shipped_config_parses() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join(CONFIG_PATH);
        let config = CultivationConfig::load(&path).unwrap();
        assert_eq!(config.crops.len(), CropKind::ALL.len());
    }
}
