//! Farming domain — soil grid, autotiled soil, watering, planting, crop growth, harvest.
//!
//! Communicates with other domains exclusively through crate::shared events/resources.
//! All grid mutation goes through [`Cultivation`].

use bevy::prelude::*;
use std::collections::HashMap;

use crate::shared::*;

pub mod autotile;
pub mod controller;
pub mod crops;
pub mod events_handler;
pub mod grid;
pub mod harvest;
pub mod render;
pub mod soil;

pub use autotile::{resolve_layout, resolve_variant, Neighbors, SoilTilePlacement, SoilVariant};
pub use controller::Cultivation;
pub use crops::{Crop, CropStage, GrowthClock};
pub use grid::{CellFlags, SoilGrid, WateredSoil};
pub use render::{FarmingAssets, FarmingRenderPlugin};
pub use soil::{SoilTile, WaterTile};

/// Tracks which soil/water/crop entities exist keyed by grid position.
#[derive(Resource, Default, Debug)]
pub struct FarmEntities {
    pub soil: HashMap<GridPos, Entity>,
    pub water: HashMap<GridPos, Entity>,
    pub crops: HashMap<GridPos, Entity>,
}

/// Frame phases of the farming domain, run in this order.
#[derive(SystemSet, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FarmingSet {
    /// Tool, seed and harvest requests.
    Actions,
    /// Day rollover and rain.
    Weather,
    /// Growth ticks.
    Growth,
}

/// Gameplay half of the domain. Needs no window or GPU, so headless apps add
/// it directly; [`FarmingRenderPlugin`] fills in the textures.
pub struct FarmingPlugin;

impl Plugin for FarmingPlugin {
    fn build(&self, app: &mut App) {
        app
            // Internal resources
            .init_resource::<SoilGrid>()
            .init_resource::<FarmEntities>()
            .init_resource::<FarmingAssets>()
            .init_resource::<GrowthClock>()
            .configure_sets(
                Update,
                (FarmingSet::Actions, FarmingSet::Weather, FarmingSet::Growth)
                    .chain()
                    .run_if(in_state(GameState::Playing)),
            )
            .add_systems(OnEnter(GameState::Playing), configure_growth_clock)
            // ------------------------------------------------------------------
            // Player requests, in the order a single frame should apply them
            // ------------------------------------------------------------------
            .add_systems(
                Update,
                (
                    soil::handle_hoe_tool_use,
                    soil::handle_watering_can_tool_use,
                    crops::handle_plant_seed,
                    harvest::handle_harvest_attempt,
                )
                    .chain()
                    .in_set(FarmingSet::Actions),
            )
            // ------------------------------------------------------------------
            // DayEnd processing and rain
            // ------------------------------------------------------------------
            .add_systems(
                Update,
                (
                    events_handler::on_day_end,
                    events_handler::on_weather_change,
                    events_handler::water_while_raining,
                )
                    .chain()
                    .in_set(FarmingSet::Weather),
            )
            .add_systems(
                Update,
                (crops::tick_growth_clock, crops::handle_growth_tick)
                    .chain()
                    .in_set(FarmingSet::Growth),
            )
            // ------------------------------------------------------------------
            // Visual sync, after all state mutations
            // ------------------------------------------------------------------
            .add_systems(
                PostUpdate,
                render::sync_crop_sprites.run_if(in_state(GameState::Playing)),
            );
    }
}

fn configure_growth_clock(settings: Res<CultivationSettings>, mut clock: ResMut<GrowthClock>) {
    *clock = GrowthClock::every(settings.growth_tick_seconds);
    if clock.timer.is_some() {
        info!(
            "[Farming] Growth ticks every {:.1}s during the day",
            settings.growth_tick_seconds
        );
    }
}
