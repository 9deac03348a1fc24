//! Handlers for cross-domain events: DayEndEvent, WeatherChangedEvent.
//!
//! The world domain rolls the next day's weather before `FarmingSet::Weather`
//! runs, so `WeatherState` already describes the new day when these read it.
//! That is what `on_day_end` wants: the ended day's water is used for growth
//! first, then dropped, then the new day's rain is applied.

use bevy::prelude::*;

use crate::shared::*;
use super::controller::Cultivation;

// ─────────────────────────────────────────────────────────────────────────────
// Day End
// ─────────────────────────────────────────────────────────────────────────────

/// Overnight: grow every crop once on the old day's water, dry the field, and
/// let the new day's rain soak it again.
pub fn on_day_end(
    mut day_end_events: EventReader<DayEndEvent>,
    mut cultivation: Cultivation,
) {
    for event in day_end_events.read() {
        let grown = cultivation.grow_all_crops();
        cultivation.remove_water();

        let rained = if cultivation.is_raining() {
            cultivation.water_all()
        } else {
            0
        };

        info!(
            "[Farming] Day {} ended: {} crop(s) grew, {} cell(s) wet from rain",
            event.day, grown, rained
        );
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Weather
// ─────────────────────────────────────────────────────────────────────────────

pub fn on_weather_change(
    mut weather_events: EventReader<WeatherChangedEvent>,
    mut cultivation: Cultivation,
) {
    for event in weather_events.read() {
        if event.raining {
            let wetted = cultivation.water_all();
            info!("[Farming] Rain started; {} cell(s) wetted", wetted);
        } else {
            cultivation.remove_water();
            info!("[Farming] Rain stopped; soil dried out");
        }
    }
}

/// Keeps soil tilled during a shower wet without waiting for the next tick.
pub fn water_while_raining(mut cultivation: Cultivation) {
    if !cultivation.is_raining() {
        return;
    }
    let wetted = cultivation.water_all();
    if wetted > 0 {
        debug!("[Farming] Rain wetted {} fresh cell(s)", wetted);
    }
}
