//! Soil tilling and watering systems.

use bevy::prelude::*;

use crate::shared::*;
use super::autotile::SoilVariant;
use super::controller::Cultivation;

/// A tilled patch drawn with the texture picked by the autotiler.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq)]
pub struct SoilTile {
    pub pos: GridPos,
    pub variant: SoilVariant,
}

/// Wet overlay drawn over a watered soil tile.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaterTile {
    pub pos: GridPos,
}

// ─────────────────────────────────────────────────────────────────────────────
// Hoe — till a farmable cell
// ─────────────────────────────────────────────────────────────────────────────

pub fn handle_hoe_tool_use(
    mut tool_events: EventReader<ToolUseEvent>,
    mut cultivation: Cultivation,
) {
    for event in tool_events.read() {
        if event.tool != ToolKind::Hoe {
            continue;
        }
        cultivation.till(event.target);
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Watering Can — water a tilled cell
// ─────────────────────────────────────────────────────────────────────────────

pub fn handle_watering_can_tool_use(
    mut tool_events: EventReader<ToolUseEvent>,
    mut cultivation: Cultivation,
) {
    for event in tool_events.read() {
        if event.tool != ToolKind::WateringCan {
            continue;
        }
        // The can splashes whether or not there is tilled soil underneath.
        cultivation.play_sfx("water");
        if cultivation.water(event.target) {
            debug!("[Farming] Watered soil at {:?}", event.target);
        }
    }
}
