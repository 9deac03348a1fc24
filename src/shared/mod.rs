//! Shared components, resources, events, and states for Sproutfield.
//!
//! This is the type contract. Every domain plugin imports from here.
//! No domain imports from any other domain directly, except through the
//! public farming API that collaborators are allowed to read.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

// ═══════════════════════════════════════════════════════════════════════
// GAME STATE — top-level state machine
// ═══════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, States, Default)]
pub enum GameState {
    #[default]
    Loading,
    Playing,
}

// ═══════════════════════════════════════════════════════════════════════
// GRID
// ═══════════════════════════════════════════════════════════════════════

/// A cell of the soil grid. Rows grow downward, columns to the right.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GridPos {
    pub row: u32,
    pub col: u32,
}

impl GridPos {
    pub const fn new(row: u32, col: u32) -> Self {
        Self { row, col }
    }

    /// Top-left corner of the cell in map pixels.
    pub fn top_left(self) -> Vec2 {
        Vec2::new(self.col as f32 * TILE_SIZE, self.row as f32 * TILE_SIZE)
    }

    /// Centre of the cell in map pixels.
    pub fn center(self) -> Vec2 {
        self.top_left() + Vec2::splat(TILE_SIZE * 0.5)
    }

    /// Middle of the cell's bottom edge in map pixels.
    pub fn mid_bottom(self) -> Vec2 {
        self.top_left() + Vec2::new(TILE_SIZE * 0.5, TILE_SIZE)
    }
}

// ═══════════════════════════════════════════════════════════════════════
// TOOLS & CROPS
// ═══════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ToolKind {
    Hoe,
    WateringCan,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CropKind {
    Corn,
    Tomato,
}

impl CropKind {
    pub const ALL: [CropKind; 2] = [CropKind::Corn, CropKind::Tomato];

    /// Stable identifier used for asset folders and log lines.
    pub fn id(self) -> &'static str {
        match self {
            CropKind::Corn => "corn",
            CropKind::Tomato => "tomato",
        }
    }
}

/// Per-type growth parameters. Loaded from the cultivation config.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CropDef {
    pub kind: CropKind,
    pub name: String,
    /// Age gained per watered growth tick.
    pub growth_rate: f32,
    /// Number of growth-stage images; the last one is the harvestable stage.
    pub stages: u32,
    /// Vertical shift of the sprite's bottom edge from the soil's bottom edge (map pixels, y-down).
    pub y_offset: f32,
    pub frame_width: f32,
    pub frame_height: f32,
    /// Total horizontal shrink of the hitbox relative to the sprite.
    pub hitbox_inset: f32,
}

impl CropDef {
    pub fn max_age(&self) -> u32 {
        self.stages.saturating_sub(1)
    }

    pub fn frame_size(&self) -> Vec2 {
        Vec2::new(self.frame_width, self.frame_height)
    }
}

#[derive(Resource, Debug, Clone, Default)]
pub struct CropRegistry {
    pub crops: HashMap<CropKind, CropDef>,
}

impl CropRegistry {
    pub fn get(&self, kind: CropKind) -> Option<&CropDef> {
        self.crops.get(&kind)
    }
}

/// Tunables read from `assets/config/cultivation.ron` by the data domain.
#[derive(Resource, Debug, Clone, PartialEq)]
pub struct CultivationSettings {
    /// Probability that a new day starts with rain.
    pub rain_chance: f64,
    /// Seconds between growth ticks during the day; zero leaves growth to day end.
    pub growth_tick_seconds: f32,
    pub save_path: PathBuf,
}

impl Default for CultivationSettings {
    fn default() -> Self {
        Self {
            rain_chance: DEFAULT_RAIN_CHANCE,
            growth_tick_seconds: 0.0,
            save_path: PathBuf::from("saves/cultivation.json"),
        }
    }
}

/// Three chances in eleven.
pub const DEFAULT_RAIN_CHANCE: f64 = 3.0 / 11.0;

// ═══════════════════════════════════════════════════════════════════════
// WEATHER
// ═══════════════════════════════════════════════════════════════════════

/// Current weather as seen by gameplay. Rolled by the world domain; the save
/// domain puts it back when a snapshot is loaded.
#[derive(Resource, Debug, Clone, Default, Serialize, Deserialize)]
pub struct WeatherState {
    pub raining: bool,
    /// Days completed since the session started.
    pub day: u32,
}

// ═══════════════════════════════════════════════════════════════════════
// RENDER LAYERS
// ═══════════════════════════════════════════════════════════════════════

/// Draw order of the cultivation sprites, lowest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RenderLayer {
    Ground,
    Soil,
    SoilWater,
    GroundPlant,
    Main,
}

impl RenderLayer {
    pub fn z(self) -> f32 {
        match self {
            RenderLayer::Ground => 1.0,
            RenderLayer::Soil => 2.0,
            RenderLayer::SoilWater => 3.0,
            RenderLayer::GroundPlant => 6.0,
            RenderLayer::Main => 7.0,
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════
// INPUT
// ═══════════════════════════════════════════════════════════════════════

/// This frame's actions, rebuilt from hardware input every PreUpdate.
#[derive(Resource, Debug, Clone, Default, PartialEq)]
pub struct PlayerInput {
    /// Cursor position in map pixels, if it is over the window.
    pub cursor: Option<Vec2>,
    /// Digit key pressed this frame, 0-based.
    pub hand_select: Option<usize>,
    pub use_hand: bool,
    pub harvest: bool,
    pub end_day: bool,
    pub toggle_rain: bool,
    pub quicksave: bool,
    pub quickload: bool,
}

#[derive(Resource, Debug, Clone)]
pub struct KeyBindings {
    pub harvest: KeyCode,
    pub end_day: KeyCode,
    pub toggle_rain: KeyCode,
    pub quicksave: KeyCode,
    pub quickload: KeyCode,
}

impl Default for KeyBindings {
    fn default() -> Self {
        Self {
            harvest: KeyCode::Space,
            end_day: KeyCode::KeyN,
            toggle_rain: KeyCode::KeyR,
            quicksave: KeyCode::F5,
            quickload: KeyCode::F9,
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════
// EVENTS
// ═══════════════════════════════════════════════════════════════════════

/// A tool was swung at `target` (map pixels).
#[derive(Event, Debug, Clone)]
pub struct ToolUseEvent {
    pub tool: ToolKind,
    pub target: Vec2,
}

/// A seed of `crop` was used at `target` (map pixels).
#[derive(Event, Debug, Clone)]
pub struct PlantSeedEvent {
    pub crop: CropKind,
    pub target: Vec2,
}

/// The player tried to pick whatever grows at `target`.
#[derive(Event, Debug, Clone)]
pub struct HarvestAttemptEvent {
    pub target: Vec2,
}

/// One growth step for every crop.
#[derive(Event, Debug, Clone, Default)]
pub struct GrowthTickEvent;

/// The player slept; `day` is the day that just ended.
#[derive(Event, Debug, Clone)]
pub struct DayEndEvent {
    pub day: u32,
}

/// Sent by the world domain whenever `WeatherState::raining` flips.
#[derive(Event, Debug, Clone)]
pub struct WeatherChangedEvent {
    pub raining: bool,
}

/// Force the current weather from the debug rain key.
#[derive(Event, Debug, Clone)]
pub struct WeatherOverrideEvent {
    pub raining: bool,
}

#[derive(Event, Debug, Clone)]
pub struct CropHarvestedEvent {
    pub crop: CropKind,
    pub cell: GridPos,
}

#[derive(Event, Debug, Clone)]
pub struct PlaySfxEvent {
    pub sfx_id: String,
}

impl PlaySfxEvent {
    pub fn new(sfx_id: impl Into<String>) -> Self {
        Self { sfx_id: sfx_id.into() }
    }
}

// ═══════════════════════════════════════════════════════════════════════
// CONSTANTS
// ═══════════════════════════════════════════════════════════════════════

pub const TILE_SIZE: f32 = 64.0;
pub const SCREEN_WIDTH: f32 = 1280.0;
pub const SCREEN_HEIGHT: f32 = 720.0;

/// Map pixels are y-down; world space is y-up.
pub fn map_to_world(point: Vec2, z: f32) -> Vec3 {
    Vec3::new(point.x, -point.y, z)
}

pub fn world_to_map(point: Vec2) -> Vec2 {
    Vec2::new(point.x, -point.y)
}
