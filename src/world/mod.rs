//! World domain plugin for Sproutfield.
//!
//! Responsible for:
//! - Turning the farm layout into the soil grid
//! - Drawing the ground under the farm
//! - Rolling daily weather

use bevy::prelude::*;
use bevy::sprite::Anchor;

use crate::farming::FarmingSet;
use crate::shared::*;

pub mod maps;
pub mod weather;

use maps::MapDef;

pub struct WorldPlugin;

impl Plugin for WorldPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(OnEnter(GameState::Loading), load_farm_map)
            .add_systems(OnEnter(GameState::Playing), spawn_ground)
            // Day-end and rain keys are dispatched before FarmingSet::Actions;
            // the new weather must settle before farming reacts to it.
            .add_systems(
                Update,
                (weather::roll_daily_weather, weather::apply_weather_override)
                    .chain()
                    .after(FarmingSet::Actions)
                    .before(FarmingSet::Weather)
                    .run_if(in_state(GameState::Playing)),
            );
    }
}

/// The farm currently loaded.
#[derive(Resource, Debug, Clone)]
pub struct WorldMap(pub MapDef);

#[derive(Component, Debug)]
pub struct Ground;

fn load_farm_map(mut commands: Commands) {
    let map = MapDef::farm();
    info!(
        "[World] Farm map {}x{} with {} farmable cells",
        map.rows,
        map.cols,
        map.farmable.len()
    );
    commands.insert_resource(map.soil_grid());
    commands.insert_resource(WorldMap(map));
}

fn spawn_ground(mut commands: Commands, map: Option<Res<WorldMap>>) {
    let Some(map) = map else {
        return;
    };
    commands.spawn((
        Sprite {
            color: Color::srgb(0.42, 0.62, 0.29),
            custom_size: Some(map.0.pixel_size()),
            anchor: Anchor::TopLeft,
            ..default()
        },
        Transform::from_translation(map_to_world(Vec2::ZERO, RenderLayer::Ground.z())),
        Ground,
    ));
}
