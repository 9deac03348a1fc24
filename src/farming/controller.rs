//! Cultivation controller — the only writer of the soil grid.
//!
//! Every farming system goes through [`Cultivation`], a `SystemParam` bundling
//! the grid, the entity index and the sprite catalog, so the grid flags and
//! the soil/water/crop entities can never drift apart.

use bevy::ecs::system::SystemParam;
use bevy::prelude::*;
use bevy::sprite::Anchor;
use rand::seq::SliceRandom;

use crate::shared::*;
use super::autotile::resolve_layout;
use super::crops::Crop;
use super::grid::{SoilGrid, WateredSoil};
use super::render::FarmingAssets;
use super::{FarmEntities, SoilTile, WaterTile};

#[derive(SystemParam)]
pub struct Cultivation<'w, 's> {
    grid: ResMut<'w, SoilGrid>,
    entities: ResMut<'w, FarmEntities>,
    weather: Res<'w, WeatherState>,
    registry: Res<'w, CropRegistry>,
    assets: Res<'w, FarmingAssets>,
    crops: Query<'w, 's, &'static mut Crop>,
    commands: Commands<'w, 's>,
    sfx_events: EventWriter<'w, PlaySfxEvent>,
    harvest_events: EventWriter<'w, CropHarvestedEvent>,
}

impl Cultivation<'_, '_> {
    pub fn grid(&self) -> &SoilGrid {
        &self.grid
    }

    pub fn is_raining(&self) -> bool {
        self.weather.raining
    }

    pub fn is_watered(&self, point: Vec2) -> bool {
        self.grid.is_watered_at(point)
    }

    pub fn play_sfx(&mut self, sfx_id: &str) {
        self.sfx_events.send(PlaySfxEvent::new(sfx_id));
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Tilling
    // ─────────────────────────────────────────────────────────────────────────

    /// Break the farmable cell under `point`. Returns whether anything changed.
    pub fn till(&mut self, point: Vec2) -> bool {
        let Some(pos) = self.grid.farmable_cell_at(point) else {
            return false;
        };
        if !self.grid.set_tilled(pos) {
            return false;
        }

        self.sfx_events.send(PlaySfxEvent::new("hoe"));
        self.rebuild_soil_tiles();
        debug!("[Farming] Tilled ({}, {})", pos.row, pos.col);

        if self.weather.raining {
            self.water_cell(pos);
        }
        true
    }

    /// Throw away every soil tile entity and spawn one per tilled cell with
    /// its freshly resolved variant.
    pub fn rebuild_soil_tiles(&mut self) {
        for (_, entity) in self.entities.soil.drain() {
            self.commands.entity(entity).despawn();
        }

        for placement in resolve_layout(&self.grid) {
            let entity = self
                .commands
                .spawn((
                    Sprite {
                        image: self.assets.soil_image(placement.variant),
                        custom_size: Some(Vec2::splat(TILE_SIZE)),
                        anchor: Anchor::TopLeft,
                        ..default()
                    },
                    Transform::from_translation(map_to_world(
                        placement.pos.top_left(),
                        RenderLayer::Soil.z(),
                    )),
                    SoilTile {
                        pos: placement.pos,
                        variant: placement.variant,
                    },
                ))
                .id();
            self.entities.soil.insert(placement.pos, entity);
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Watering
    // ─────────────────────────────────────────────────────────────────────────

    /// Wet the tilled cell under `point`.
    pub fn water(&mut self, point: Vec2) -> bool {
        let Some(pos) = self.grid.cell_at(point) else {
            return false;
        };
        if !self.grid.is_tilled(pos) {
            return false;
        }
        self.water_cell(pos)
    }

    /// Wet every tilled cell that is still dry. Returns how many were wetted.
    pub fn water_all(&mut self) -> usize {
        let dry: Vec<GridPos> = self
            .grid
            .tilled_cells()
            .filter(|&pos| !self.grid.is_watered(pos))
            .collect();
        dry.into_iter().filter(|&pos| self.water_cell(pos)).count()
    }

    fn water_cell(&mut self, pos: GridPos) -> bool {
        if !self.grid.set_watered(pos) {
            return false;
        }

        let image = self
            .assets
            .water
            .choose(&mut rand::thread_rng())
            .cloned()
            .unwrap_or_default();
        let entity = self
            .commands
            .spawn((
                Sprite {
                    image,
                    custom_size: Some(Vec2::splat(TILE_SIZE)),
                    anchor: Anchor::TopLeft,
                    ..default()
                },
                Transform::from_translation(map_to_world(pos.top_left(), RenderLayer::SoilWater.z())),
                WaterTile { pos },
            ))
            .id();
        self.entities.water.insert(pos, entity);
        true
    }

    /// Dry out the whole grid and drop every water overlay.
    pub fn remove_water(&mut self) {
        for (_, entity) in self.entities.water.drain() {
            self.commands.entity(entity).despawn();
        }
        let positions: Vec<GridPos> = self.grid.positions().collect();
        for pos in positions {
            self.grid.clear_watered(pos);
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Crops
    // ─────────────────────────────────────────────────────────────────────────

    /// Sow `kind` on the tilled, empty cell under `point`.
    pub fn plant(&mut self, point: Vec2, kind: CropKind) -> bool {
        let Some(pos) = self.grid.cell_at(point) else {
            return false;
        };
        if !self.grid.is_tilled(pos) || self.grid.is_planted(pos) {
            return false;
        }
        let Some(def) = self.registry.get(kind).cloned() else {
            warn!("[Farming] No crop definition for {:?}; seed ignored", kind);
            return false;
        };

        self.grid.set_planted(pos);
        self.sfx_events.send(PlaySfxEvent::new("plant"));
        self.spawn_crop(Crop::new(&def, pos));
        info!("[Farming] Planted {} at ({}, {})", kind.id(), pos.row, pos.col);
        true
    }

    fn spawn_crop(&mut self, crop: Crop) {
        let pos = crop.cell();
        let entity = self
            .commands
            .spawn((
                Sprite {
                    image: self.assets.crop_frame(crop.kind(), crop.frame()),
                    anchor: Anchor::BottomCenter,
                    ..default()
                },
                Transform::from_translation(map_to_world(crop.anchor(), crop.layer().z())),
                crop,
            ))
            .id();
        self.entities.crops.insert(pos, entity);
    }

    /// One growth step for every live crop. Returns how many advanced. Only
    /// crops that grew are marked changed, so their sprites alone get resynced.
    pub fn grow_all_crops(&mut self) -> usize {
        let grid = &*self.grid;
        let mut grown = 0;
        for mut crop in self.crops.iter_mut() {
            if crop.bypass_change_detection().grow(grid) {
                crop.set_changed();
                grown += 1;
            }
        }
        grown
    }

    /// Pick the harvestable crop under `point`, freeing its cell.
    pub fn harvest(&mut self, point: Vec2) -> Option<CropKind> {
        let pos = self.grid.cell_at(point)?;
        let entity = *self.entities.crops.get(&pos)?;
        let crop = self.crops.get(entity).ok()?;
        if !crop.is_harvestable() {
            return None;
        }
        let kind = crop.kind();

        self.entities.crops.remove(&pos);
        self.commands.entity(entity).despawn();
        self.grid.clear_planted(pos);
        self.harvest_events.send(CropHarvestedEvent { crop: kind, cell: pos });
        info!("[Farming] Harvested {} at ({}, {})", kind.id(), pos.row, pos.col);
        Some(kind)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Restore
    // ─────────────────────────────────────────────────────────────────────────

    /// Replace the whole cultivation state, respawning every entity from
    /// `grid` and `crops`. Crops on cells that are not planted in `grid`, or
    /// whose type is unknown, are dropped with a warning.
    pub fn restore(&mut self, grid: SoilGrid, crops: impl IntoIterator<Item = (GridPos, CropKind, f32)>) {
        let FarmEntities { soil, water, crops: crop_entities } = &mut *self.entities;
        for (_, entity) in soil.drain().chain(water.drain()).chain(crop_entities.drain()) {
            self.commands.entity(entity).despawn();
        }

        // Watered and planted flags are re-applied below so each one gets its entity.
        let watered: Vec<GridPos> = grid.positions().filter(|&pos| grid.is_watered(pos)).collect();
        let planted: Vec<GridPos> = grid.positions().filter(|&pos| grid.is_planted(pos)).collect();
        *self.grid = grid;
        for &pos in &watered {
            self.grid.clear_watered(pos);
        }
        for &pos in &planted {
            self.grid.clear_planted(pos);
        }

        self.rebuild_soil_tiles();
        for pos in watered {
            self.water_cell(pos);
        }
        for (pos, kind, age) in crops {
            if !planted.contains(&pos) || self.grid.is_planted(pos) {
                warn!("[Farming] Dropping saved {} at ({}, {}): cell not planted", kind.id(), pos.row, pos.col);
                continue;
            }
            let Some(def) = self.registry.get(kind).cloned() else {
                warn!("[Farming] Dropping saved {}: no crop definition", kind.id());
                continue;
            };
            self.grid.set_planted(pos);
            self.spawn_crop(Crop::with_age(&def, pos, age));
        }
    }
}
