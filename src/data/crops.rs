use crate::shared::*;

/// Built-in crop definitions, used when the config file has no `crops` list.
///
/// Both crops have four stage images (seed, two growing, ripe), so they are
/// harvestable at age 3. Tomatoes grow at 0.7 per watered tick and need five
/// wet days; corn needs three.
pub fn default_crops() -> Vec<CropDef> {
    vec![
        CropDef {
            kind: CropKind::Corn,
            name: "Corn".into(),
            growth_rate: 1.0,
            stages: 4,
            y_offset: -16.0,
            frame_width: 64.0,
            frame_height: 64.0,
            hitbox_inset: 26.0,
        },
        CropDef {
            kind: CropKind::Tomato,
            name: "Tomato".into(),
            growth_rate: 0.7,
            stages: 4,
            y_offset: -8.0,
            frame_width: 64.0,
            frame_height: 64.0,
            hitbox_inset: 26.0,
        },
    ]
}

/// Replace the registry contents with `defs`. Later duplicates win.
pub fn populate_crops(registry: &mut CropRegistry, defs: &[CropDef]) {
    registry.crops = defs.iter().map(|def| (def.kind, def.clone())).collect();
}
