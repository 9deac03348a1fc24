//! Hardware input → gameplay events.
//!
//! Digit keys pick what the player holds, the left mouse button uses it on the
//! cell under the cursor. No cultivation rules live here; the farming domain
//! decides what a swing or a seed actually does.

use bevy::prelude::*;
use bevy::window::PrimaryWindow;

use crate::farming::FarmingSet;
use crate::shared::*;

pub struct InputPlugin;

impl Plugin for InputPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<PlayerInput>()
            .init_resource::<KeyBindings>()
            .init_resource::<ActiveHand>()
            .add_systems(PreUpdate, reset_and_read_input)
            .add_systems(
                Update,
                (select_hand, dispatch_actions)
                    .chain()
                    .before(FarmingSet::Actions)
                    .run_if(in_state(GameState::Playing)),
            );
    }
}

/// What the left mouse button does.
#[derive(Resource, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ActiveHand {
    #[default]
    Hoe,
    WateringCan,
    Seed(CropKind),
}

impl ActiveHand {
    /// Order of the digit keys: 1 hoe, 2 can, then one seed per crop.
    pub const SLOTS: [ActiveHand; 4] = [
        ActiveHand::Hoe,
        ActiveHand::WateringCan,
        ActiveHand::Seed(CropKind::Corn),
        ActiveHand::Seed(CropKind::Tomato),
    ];

    pub fn from_slot(slot: usize) -> Option<Self> {
        Self::SLOTS.get(slot).copied()
    }
}

/// The event a use of `hand` at `target` produces.
#[derive(Debug, Clone)]
pub enum HandAction {
    Tool(ToolUseEvent),
    Seed(PlantSeedEvent),
}

impl HandAction {
    pub fn new(hand: ActiveHand, target: Vec2) -> Self {
        match hand {
            ActiveHand::Hoe => HandAction::Tool(ToolUseEvent { tool: ToolKind::Hoe, target }),
            ActiveHand::WateringCan => HandAction::Tool(ToolUseEvent {
                tool: ToolKind::WateringCan,
                target,
            }),
            ActiveHand::Seed(crop) => HandAction::Seed(PlantSeedEvent { crop, target }),
        }
    }
}

const DIGIT_KEYS: [KeyCode; 9] = [
    KeyCode::Digit1,
    KeyCode::Digit2,
    KeyCode::Digit3,
    KeyCode::Digit4,
    KeyCode::Digit5,
    KeyCode::Digit6,
    KeyCode::Digit7,
    KeyCode::Digit8,
    KeyCode::Digit9,
];

/// The single point where hardware input becomes game actions.
fn reset_and_read_input(
    keys: Res<ButtonInput<KeyCode>>,
    mouse: Res<ButtonInput<MouseButton>>,
    bindings: Res<KeyBindings>,
    windows: Query<&Window, With<PrimaryWindow>>,
    cameras: Query<(&Camera, &GlobalTransform)>,
    mut input: ResMut<PlayerInput>,
) {
    *input = PlayerInput::default();

    input.cursor = windows
        .get_single()
        .ok()
        .and_then(Window::cursor_position)
        .and_then(|cursor| {
            let (camera, transform) = cameras.get_single().ok()?;
            camera.viewport_to_world_2d(transform, cursor).ok()
        })
        .map(world_to_map);

    input.hand_select = DIGIT_KEYS.iter().position(|&key| keys.just_pressed(key));
    input.use_hand = mouse.just_pressed(MouseButton::Left);
    input.harvest = keys.just_pressed(bindings.harvest);
    input.end_day = keys.just_pressed(bindings.end_day);
    input.toggle_rain = keys.just_pressed(bindings.toggle_rain);
    input.quicksave = keys.just_pressed(bindings.quicksave);
    input.quickload = keys.just_pressed(bindings.quickload);
}

fn select_hand(input: Res<PlayerInput>, mut hand: ResMut<ActiveHand>) {
    let Some(next) = input.hand_select.and_then(ActiveHand::from_slot) else {
        return;
    };
    if *hand != next {
        *hand = next;
        info!("[Input] Holding {:?}", next);
    }
}

fn dispatch_actions(
    input: Res<PlayerInput>,
    hand: Res<ActiveHand>,
    weather: Res<WeatherState>,
    mut tool_events: EventWriter<ToolUseEvent>,
    mut seed_events: EventWriter<PlantSeedEvent>,
    mut harvest_events: EventWriter<HarvestAttemptEvent>,
    mut day_end_events: EventWriter<DayEndEvent>,
    mut weather_overrides: EventWriter<WeatherOverrideEvent>,
) {
    if let Some(target) = input.cursor {
        if input.use_hand {
            match HandAction::new(*hand, target) {
                HandAction::Tool(event) => {
                    tool_events.send(event);
                }
                HandAction::Seed(event) => {
                    seed_events.send(event);
                }
            }
        }
        if input.harvest {
            harvest_events.send(HarvestAttemptEvent { target });
        }
    }

    if input.end_day {
        day_end_events.send(DayEndEvent { day: weather.day });
    }
    if input.toggle_rain {
        weather_overrides.send(WeatherOverrideEvent {
            raining: !weather.raining,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn digit_slots_cover_tools_and_every_seed() {
        assert_eq!(ActiveHand::from_slot(0), Some(ActiveHand::Hoe));
        assert_eq!(ActiveHand::from_slot(1), Some(ActiveHand::WateringCan));
        for crop in CropKind::ALL {
            assert!(ActiveHand::SLOTS.contains(&ActiveHand::Seed(crop)));
        }
        assert_eq!(ActiveHand::from_slot(8), None);
    }

    #[test]
    fn hands_map_to_events() {
        let target = Vec2::new(100.0, 40.0);
        assert!(matches!(
            HandAction::new(ActiveHand::WateringCan, target),
            HandAction::Tool(ToolUseEvent { tool: ToolKind::WateringCan, target: t }) if t == target
        ));
        assert!(matches!(
            HandAction::new(ActiveHand::Seed(CropKind::Tomato), target),
            HandAction::Seed(PlantSeedEvent { crop: CropKind::Tomato, .. })
        ));
    }
}
