//! Per-field derivation functions.
//!
//! Each function reads the vehicle state as updated so far in the current
//! tick and draws its own randomness.

use rand::{seq::SliceRandom, Rng};

use crate::core::{EventType, VehicleState, OBD_FAULTS_MAX, OBD_FAULT_CODES};

/// Probability the ignition flips per tick.
pub const IGNITION_TOGGLE_PROBABILITY: f64 = 0.05;
/// Probability the movement status flips per tick while the ignition is on.
pub const MOTION_TOGGLE_PROBABILITY: f64 = 0.3;
/// Probability of reporting OBD faults per tick.
pub const OBD_FAULT_PROBABILITY: f64 = 0.15;
/// Probability of a curve event when speed is steady.
pub const CURVE_PROBABILITY: f64 = 0.3;
/// Speed delta in km/h above which acceleration or braking is reported.
pub const EVENT_SPEED_THRESHOLD: i32 = 5;
/// Maximum GPS drift per tick in degrees.
pub const GPS_DRIFT: f64 = 0.001;
/// Converts L/h into liters per tick of five seconds.
pub const CONSUMPTION_TICK_DIVISOR: f64 = 7_200.0;

/// Round to the given number of decimals.
#[inline]
pub fn round(value: f64, decimals: i32) -> f64 {
    let factor = 10_f64.powi(decimals);
    (value * factor).round() / factor
}

/// Flip the ignition with a small probability.
pub fn toggle_ignition<R: Rng + ?Sized>(state: &mut VehicleState, rng: &mut R) {
    if rng.gen_bool(IGNITION_TOGGLE_PROBABILITY) {
        state.ignition_on = !state.ignition_on;
    }
}

/// Flip the movement status while the ignition is on.
///
/// The vehicle is never in motion with the ignition off.
pub fn toggle_motion<R: Rng + ?Sized>(state: &mut VehicleState, rng: &mut R) {
    if state.ignition_on {
        if rng.gen_bool(MOTION_TOGGLE_PROBABILITY) {
            state.in_motion = !state.in_motion;
        }
    } else {
        state.in_motion = false;
    }
}

/// Update the speed and return the speed before the update.
pub fn update_speed<R: Rng + ?Sized>(state: &mut VehicleState, rng: &mut R) -> u16 {
    let prev_speed = state.speed;
    let speed = prev_speed as i32;

    if !state.ignition_on {
        state.set_speed(0);
    } else if !state.in_motion {
        state.set_speed(speed - rng.gen_range(0..=5));
    } else {
        state.set_speed(speed + rng.gen_range(-3..=8));
    }

    prev_speed
}

/// Engine RPM banded by speed.
pub fn rpm<R: Rng + ?Sized>(ignition_on: bool, speed: u16, rng: &mut R) -> u16 {
    if !ignition_on {
        return 0;
    }

    match speed {
        0 => rng.gen_range(700..=900),
        1..=39 => rng.gen_range(1_200..=2_500),
        40..=79 => rng.gen_range(2_000..=3_500),
        _ => rng.gen_range(3_500..=6_000),
    }
}

/// Engine load in percent.
#[inline]
pub fn engine_load<R: Rng + ?Sized>(rng: &mut R) -> u8 {
    rng.gen_range(30..=70)
}

/// Engine temperature in degrees Celsius.
///
/// A stopped engine cools down towards ambient temperature.
pub fn engine_temp<R: Rng + ?Sized>(ignition_on: bool, engine_load: u8, rng: &mut R) -> i16 {
    if !ignition_on {
        return rng.gen_range(-60..=40);
    }

    let base = if engine_load < 30 { 75 } else { 95 };
    rng.gen_range(base - 5..=base + 5)
}

/// Instantaneous fuel consumption in L/h, rounded to one decimal.
pub fn instant_consumption<R: Rng + ?Sized>(
    in_motion: bool,
    speed: u16,
    engine_load: u8,
    rng: &mut R,
) -> f64 {
    if !in_motion {
        return round(rng.gen_range(0.2..0.8), 1);
    }

    let base = 8.0 + speed as f64 / 20.0 + engine_load as f64 / 10.0;
    round(base + rng.gen_range(-2.0..3.0), 1).max(0.0)
}

/// Advance the odometers while moving.
pub fn update_odometer<R: Rng + ?Sized>(state: &mut VehicleState, rng: &mut R) {
    if state.in_motion {
        let total = rng.gen_range(200..=500);
        let trip = rng.gen_range(200..=500);
        state.advance_odometer(total, trip);
    }
}

/// Drain the fuel tank while driving.
pub fn update_fuel_level<R: Rng + ?Sized>(state: &mut VehicleState, rng: &mut R) {
    if state.in_motion && state.ignition_on {
        state.burn_fuel(rng.gen_range(0.01..0.05));
    }
}

/// Accumulate the fuel used over one tick.
pub fn update_fuel_used(state: &mut VehicleState, instant_consumption: f64) {
    if state.in_motion {
        state.add_fuel_used(instant_consumption / CONSUMPTION_TICK_DIVISOR);
    }
}

/// Drift the GPS position.
pub fn drift_position<R: Rng + ?Sized>(state: &mut VehicleState, rng: &mut R) {
    let latitude = rng.gen_range(-GPS_DRIFT..=GPS_DRIFT);
    let longitude = rng.gen_range(-GPS_DRIFT..=GPS_DRIFT);
    state.drift(latitude, longitude);
}

/// Occasionally report between one and three distinct OBD faults.
pub fn obd_faults<R: Rng + ?Sized>(rng: &mut R) -> Vec<&'static str> {
    if !rng.gen_bool(OBD_FAULT_PROBABILITY) {
        return vec![];
    }

    let count = rng.gen_range(1..=OBD_FAULTS_MAX);
    OBD_FAULT_CODES
        .choose_multiple(rng, count)
        .copied()
        .collect()
}

/// Derive the driving event from the speed delta.
///
/// Without harsh acceleration or braking a curve may be reported. In that
/// branch the G-value is always present, even without an event.
pub fn driving_event<R: Rng + ?Sized>(
    speed: u16,
    prev_speed: u16,
    rng: &mut R,
) -> (Option<EventType>, Option<u8>) {
    let delta = speed as i32 - prev_speed as i32;

    if delta > EVENT_SPEED_THRESHOLD {
        let g_value = (15 + 2 * delta).min(255) as u8;
        (Some(EventType::Acceleration), Some(g_value))
    } else if delta < -EVENT_SPEED_THRESHOLD {
        let g_value = (20 + 2 * delta.abs()).min(255) as u8;
        (Some(EventType::Braking), Some(g_value))
    } else {
        let event = rng.gen_bool(CURVE_PROBABILITY).then_some(EventType::Curve);
        (event, Some(rng.gen_range(10..=40)))
    }
}

/// GSM signal level, biased towards acceptable reception.
pub fn gsm_signal<R: Rng + ?Sized>(rng: &mut R) -> u8 {
    if rng.gen_bool(0.9) {
        rng.gen_range(1..=5)
    } else {
        rng.gen_range(3..=5)
    }
}

/// Oil level reading around the nominal level.
pub fn oil_level<R: Rng + ?Sized>(nominal: f32, rng: &mut R) -> u8 {
    use crate::core::{OIL_LEVEL_MAX, OIL_LEVEL_MIN};

    let level = nominal + rng.gen_range(-2_i32..=1) as f32;
    level.clamp(OIL_LEVEL_MIN, OIL_LEVEL_MAX) as u8
}
