//! Data layer — populates the cultivation registries at game startup.
//!
//! This plugin runs in OnEnter(GameState::Loading), reads the cultivation
//! config, fills `CultivationSettings` and `CropRegistry`, then transitions
//! the game into GameState::Playing.
//!
//! No other domain needs to seed these resources. All domain plugins can
//! safely read them once GameState has advanced past Loading.

pub mod config;
pub mod crops;

use bevy::prelude::*;
use std::path::PathBuf;

use crate::shared::*;
pub use config::{ConfigError, CultivationConfig, CONFIG_PATH};

pub struct DataPlugin {
    pub config_path: PathBuf,
}

impl Default for DataPlugin {
    fn default() -> Self {
        Self {
            config_path: PathBuf::from(CONFIG_PATH),
        }
    }
}

#[derive(Resource, Debug, Clone)]
struct ConfigPath(PathBuf);

impl Plugin for DataPlugin {
    fn build(&self, app: &mut App) {
        app.insert_resource(ConfigPath(self.config_path.clone()))
            .add_systems(OnEnter(GameState::Loading), load_all_data);
    }
}

/// A missing file is normal on a fresh checkout; anything else is worth a warning.
pub fn read_config(path: &std::path::Path) -> CultivationConfig {
    match CultivationConfig::load(path) {
        Ok(config) => config,
        Err(err) if err.is_missing_file() => {
            info!("[Data] No config at {}; using defaults", path.display());
            CultivationConfig::default()
        }
        Err(err) => {
            warn!("[Data] Ignoring {}: {err}", path.display());
            CultivationConfig::default()
        }
    }
}

fn load_all_data(
    path: Res<ConfigPath>,
    mut settings: ResMut<CultivationSettings>,
    mut crop_registry: ResMut<CropRegistry>,
    mut next_state: ResMut<NextState<GameState>>,
) {
    info!("[Data] Populating registries…");

    let config = read_config(&path.0);
    *settings = config.settings();
    crops::populate_crops(&mut crop_registry, &config.crops);
    info!(
        "[Data] Crops loaded: {}, rain chance {:.2}",
        crop_registry.crops.len(),
        settings.rain_chance
    );

    next_state.set(GameState::Playing);
}
