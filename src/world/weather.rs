//! Daily weather.
//!
//! A new day rolls rain with `CultivationSettings::rain_chance`;
//! `WeatherOverrideEvent` forces a value. Either way `WeatherChangedEvent`
//! goes out only when `raining` flips. Loading a save writes `WeatherState`
//! directly and sends nothing.

use bevy::prelude::*;
use rand::Rng;

use crate::shared::*;

pub fn roll_rain<R: Rng + ?Sized>(rng: &mut R, chance: f64) -> bool {
    rng.gen::<f64>() < chance
}

/// Returns whether the value flipped.
fn set_raining(
    weather: &mut WeatherState,
    raining: bool,
    changed: &mut EventWriter<WeatherChangedEvent>,
) -> bool {
    if weather.raining == raining {
        return false;
    }
    weather.raining = raining;
    changed.send(WeatherChangedEvent { raining });
    true
}

pub fn roll_daily_weather(
    mut day_end_events: EventReader<DayEndEvent>,
    settings: Res<CultivationSettings>,
    mut weather: ResMut<WeatherState>,
    mut changed: EventWriter<WeatherChangedEvent>,
) {
    let mut rng = rand::thread_rng();
    for event in day_end_events.read() {
        weather.day = event.day + 1;
        let raining = roll_rain(&mut rng, settings.rain_chance);
        set_raining(&mut weather, raining, &mut changed);
        info!(
            "[World] Day {} begins {}",
            weather.day,
            if raining { "with rain" } else { "dry" }
        );
    }
}

pub fn apply_weather_override(
    mut overrides: EventReader<WeatherOverrideEvent>,
    mut weather: ResMut<WeatherState>,
    mut changed: EventWriter<WeatherChangedEvent>,
) {
    for event in overrides.read() {
        if set_raining(&mut weather, event.raining, &mut changed) {
            info!(
                "[World] Weather forced to {}",
                if event.raining { "rain" } else { "clear" }
            );
        }
    }
}
