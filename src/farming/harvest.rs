//! Harvest system — player picks mature crops.

use bevy::prelude::*;

use crate::shared::*;
use super::controller::Cultivation;

pub fn handle_harvest_attempt(
    mut harvest_events: EventReader<HarvestAttemptEvent>,
    mut cultivation: Cultivation,
) {
    for event in harvest_events.read() {
        if cultivation.harvest(event.target).is_some() {
            cultivation.play_sfx("harvest");
        }
    }
}
