//! Crop entities and their growth state machine.
//!
//! A crop only ever moves forward: dormant → growing → harvestable. Age grows
//! by the type's rate on every growth tick where its soil is wet, is clamped
//! at the type's maximum, and the harvestable flag latches once it gets there.

use bevy::prelude::*;

use crate::shared::*;
use super::controller::Cultivation;
use super::grid::WateredSoil;

/// Fraction of the sprite height trimmed off the hitbox.
const HITBOX_HEIGHT_TRIM: f32 = 0.4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CropStage {
    Dormant,
    Growing,
    Harvestable,
}

#[derive(Component, Debug, Clone, PartialEq)]
pub struct Crop {
    kind: CropKind,
    cell: GridPos,
    age: f32,
    max_age: u32,
    growth_rate: f32,
    harvestable: bool,
    /// Bottom-centre of the sprite in map pixels.
    anchor: Vec2,
    frame_size: Vec2,
    hitbox_inset: f32,
    hitbox: Option<Rect>,
    layer: RenderLayer,
}

impl Crop {
    /// A freshly planted seed on `cell`.
    pub fn new(def: &CropDef, cell: GridPos) -> Self {
        Self::with_age(def, cell, 0.0)
    }

    /// A crop that has already grown to `age`, e.g. when restoring a save.
    pub fn with_age(def: &CropDef, cell: GridPos, age: f32) -> Self {
        let max_age = def.max_age();
        let mut crop = Self {
            kind: def.kind,
            cell,
            age: age.clamp(0.0, max_age as f32),
            max_age,
            growth_rate: def.growth_rate,
            harvestable: false,
            anchor: cell.mid_bottom() + Vec2::new(0.0, def.y_offset),
            frame_size: def.frame_size(),
            hitbox_inset: def.hitbox_inset,
            hitbox: None,
            layer: RenderLayer::GroundPlant,
        };
        crop.refresh();
        crop
    }

    /// One growth tick. Returns whether the crop changed.
    pub fn grow<S: WateredSoil + ?Sized>(&mut self, soil: &S) -> bool {
        if self.harvestable || !soil.is_watered_at(self.cell.center()) {
            return false;
        }
        self.age = (self.age + self.growth_rate).min(self.max_age as f32);
        self.refresh();
        true
    }

    fn refresh(&mut self) {
        if self.frame() > 0 {
            self.layer = RenderLayer::Main;
            let rect = self.rect();
            let size = (rect.size() - Vec2::new(self.hitbox_inset, rect.height() * HITBOX_HEIGHT_TRIM))
                .max(Vec2::ZERO);
            self.hitbox = Some(Rect::from_center_size(rect.center(), size));
        }
        if self.age >= self.max_age as f32 {
            self.harvestable = true;
        }
    }

    pub fn kind(&self) -> CropKind {
        self.kind
    }

    pub fn cell(&self) -> GridPos {
        self.cell
    }

    pub fn age(&self) -> f32 {
        self.age
    }

    pub fn max_age(&self) -> u32 {
        self.max_age
    }

    pub fn is_harvestable(&self) -> bool {
        self.harvestable
    }

    /// Index of the growth-stage image to show.
    pub fn frame(&self) -> usize {
        self.age as usize
    }

    pub fn stage(&self) -> CropStage {
        if self.harvestable {
            CropStage::Harvestable
        } else if self.age > 0.0 {
            CropStage::Growing
        } else {
            CropStage::Dormant
        }
    }

    pub fn anchor(&self) -> Vec2 {
        self.anchor
    }

    /// Sprite bounds in map pixels.
    pub fn rect(&self) -> Rect {
        let half_w = self.frame_size.x * 0.5;
        Rect::new(
            self.anchor.x - half_w,
            self.anchor.y - self.frame_size.y,
            self.anchor.x + half_w,
            self.anchor.y,
        )
    }

    /// Collision box; absent until the first stage change.
    pub fn hitbox(&self) -> Option<Rect> {
        self.hitbox
    }

    pub fn layer(&self) -> RenderLayer {
        self.layer
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Growth clock
// ─────────────────────────────────────────────────────────────────────────────

/// Emits a `GrowthTickEvent` every `growth_tick_seconds`. Disabled when the
/// interval is zero, leaving growth to the day-end rollover.
#[derive(Resource, Debug, Default)]
pub struct GrowthClock {
    pub timer: Option<Timer>,
}

impl GrowthClock {
    pub fn every(seconds: f32) -> Self {
        Self {
            timer: (seconds > 0.0).then(|| Timer::from_seconds(seconds, TimerMode::Repeating)),
        }
    }
}

pub fn tick_growth_clock(
    time: Res<Time>,
    mut clock: ResMut<GrowthClock>,
    mut ticks: EventWriter<GrowthTickEvent>,
) {
    let Some(timer) = clock.timer.as_mut() else {
        return;
    };
    timer.tick(time.delta());
    for _ in 0..timer.times_finished_this_tick() {
        ticks.send(GrowthTickEvent);
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Systems
// ─────────────────────────────────────────────────────────────────────────────

pub fn handle_plant_seed(
    mut plant_events: EventReader<PlantSeedEvent>,
    mut cultivation: Cultivation,
) {
    for event in plant_events.read() {
        cultivation.plant(event.target, event.crop);
    }
}

pub fn handle_growth_tick(
    mut tick_events: EventReader<GrowthTickEvent>,
    mut cultivation: Cultivation,
) {
    for _ in tick_events.read() {
        let grown = cultivation.grow_all_crops();
        if grown > 0 {
            debug!("[Farming] Growth tick advanced {} crop(s)", grown);
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
