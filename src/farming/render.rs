//! Farming textures and visual synchronisation.
//!
//! Assets:
//!   assets/soil/<key>.png          — one 64×64 image per soil variant
//!   assets/soil_water/<n>.png      — wet overlays, one picked at random per cell
//!   assets/fruit/<crop>/<n>.png    — growth stages, 0 = seed, last = harvestable

use bevy::asset::LoadState;
use bevy::prelude::*;
use std::collections::HashMap;

use crate::shared::*;
use super::autotile::SoilVariant;
use super::crops::Crop;

const WATER_OVERLAYS: usize = 3;

/// Image handles for every farming sprite. Empty (default handles) in headless
/// apps, where sprites are still spawned but never drawn.
#[derive(Resource, Debug, Default, Clone)]
pub struct FarmingAssets {
    pub soil: HashMap<SoilVariant, Handle<Image>>,
    pub water: Vec<Handle<Image>>,
    pub crop_frames: HashMap<CropKind, Vec<Handle<Image>>>,
}

impl FarmingAssets {
    pub fn soil_image(&self, variant: SoilVariant) -> Handle<Image> {
        self.soil.get(&variant).cloned().unwrap_or_default()
    }

    /// Stage image for `kind`, holding on the last frame if `frame` runs past it.
    pub fn crop_frame(&self, kind: CropKind, frame: usize) -> Handle<Image> {
        self.crop_frames
            .get(&kind)
            .and_then(|frames| frames.get(frame).or_else(|| frames.last()))
            .cloned()
            .unwrap_or_default()
    }
}

/// Loads and checks the farming textures. Only added by the windowed binary.
pub struct FarmingRenderPlugin;

impl Plugin for FarmingRenderPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(OnEnter(GameState::Playing), load_farming_assets)
            .add_systems(
                Update,
                check_farming_assets.run_if(in_state(GameState::Playing)),
            );
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Loading
// ─────────────────────────────────────────────────────────────────────────────

pub fn load_farming_assets(
    asset_server: Res<AssetServer>,
    crop_registry: Res<CropRegistry>,
    mut assets: ResMut<FarmingAssets>,
) {
    assets.soil = SoilVariant::ALL
        .iter()
        .map(|&variant| (variant, asset_server.load(format!("soil/{}.png", variant.key()))))
        .collect();

    assets.water = (0..WATER_OVERLAYS)
        .map(|n| asset_server.load(format!("soil_water/{n}.png")))
        .collect();

    assets.crop_frames = crop_registry
        .crops
        .values()
        .map(|def| {
            let frames = (0..def.stages)
                .map(|n| asset_server.load(format!("fruit/{}/{n}.png", def.kind.id())))
                .collect();
            (def.kind, frames)
        })
        .collect();

    info!(
        "[Farming] Requested {} soil, {} water and {} crop textures",
        assets.soil.len(),
        assets.water.len(),
        assets.crop_frames.values().map(Vec::len).sum::<usize>()
    );
}

/// Every soil variant must have a texture; a missing one is unrecoverable.
pub fn check_farming_assets(
    asset_server: Res<AssetServer>,
    assets: Res<FarmingAssets>,
    mut verified: Local<bool>,
) {
    if *verified || assets.soil.is_empty() {
        return;
    }

    let mut pending = 0;
    for (variant, handle) in &assets.soil {
        match asset_server.get_load_state(handle.id()) {
            Some(LoadState::Loaded) => {}
            Some(LoadState::Failed(err)) => {
                panic!("soil texture soil/{}.png failed to load: {err}", variant.key())
            }
            _ => pending += 1,
        }
    }

    if pending == 0 {
        *verified = true;
        info!("[Farming] All {} soil variant textures loaded", assets.soil.len());
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Crop sprite sync
// ─────────────────────────────────────────────────────────────────────────────

/// Swap the stage image and draw layer of every crop that changed this frame.
pub fn sync_crop_sprites(
    assets: Res<FarmingAssets>,
    mut crop_query: Query<(&Crop, &mut Sprite, &mut Transform), Changed<Crop>>,
) {
    for (crop, mut sprite, mut transform) in crop_query.iter_mut() {
        sprite.image = assets.crop_frame(crop.kind(), crop.frame());
        sprite.custom_size = Some(crop.rect().size());
        transform.translation = map_to_world(crop.anchor(), crop.layer().z());
    }
}
