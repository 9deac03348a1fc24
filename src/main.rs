use bevy::prelude::*;
use bevy::window::{PresentMode, WindowResolution};

use sproutfield::data::DataPlugin;
use sproutfield::farming::{FarmingPlugin, FarmingRenderPlugin};
use sproutfield::input::InputPlugin;
use sproutfield::save::SavePlugin;
use sproutfield::shared::*;
use sproutfield::world::maps::MapDef;
use sproutfield::world::WorldPlugin;

fn main() {
    App::new()
        .add_plugins(
            DefaultPlugins
                .set(WindowPlugin {
                    primary_window: Some(Window {
                        title: "Sproutfield".into(),
                        resolution: WindowResolution::new(SCREEN_WIDTH, SCREEN_HEIGHT),
                        present_mode: PresentMode::AutoVsync,
                        resizable: true,
                        ..default()
                    }),
                    ..default()
                })
                .set(ImagePlugin::default_nearest()),
        )
        // Game state
        .init_state::<GameState>()
        // Shared resources
        .init_resource::<CropRegistry>()
        .init_resource::<CultivationSettings>()
        .init_resource::<WeatherState>()
        // Events
        .add_event::<ToolUseEvent>()
        .add_event::<PlantSeedEvent>()
        .add_event::<HarvestAttemptEvent>()
        .add_event::<GrowthTickEvent>()
        .add_event::<DayEndEvent>()
        .add_event::<WeatherChangedEvent>()
        .add_event::<WeatherOverrideEvent>()
        .add_event::<CropHarvestedEvent>()
        .add_event::<PlaySfxEvent>()
        // Domain plugins
        .add_plugins(InputPlugin)
        .add_plugins(WorldPlugin)
        .add_plugins(FarmingPlugin)
        .add_plugins(FarmingRenderPlugin)
        .add_plugins(SavePlugin)
        // Data loading
        .add_plugins(DataPlugin::default())
        // Camera
        .add_systems(Startup, setup_camera)
        .run();
}

/// Frames the whole farm, which is a little taller than the window.
fn setup_camera(mut commands: Commands) {
    let farm = MapDef::farm().pixel_size();
    let scale = (farm.x / SCREEN_WIDTH).max(farm.y / SCREEN_HEIGHT);
    commands.spawn((
        Camera2d,
        Transform::from_translation(map_to_world(farm * 0.5, 0.0)).with_scale(Vec3::splat(scale)),
    ));
}
