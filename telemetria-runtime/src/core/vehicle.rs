use rand::Rng;

use crate::util::OnOffExt;

/// Maximum vehicle speed in km/h.
pub const SPEED_MAX: u16 = 350;
/// Lower bound of the oil level in percent.
pub const OIL_LEVEL_MIN: f32 = 70.0;
/// Upper bound of the oil level in percent.
pub const OIL_LEVEL_MAX: f32 = 100.0;

/// Vehicle state carried between generation ticks.
///
/// The state is exclusively owned by a single generator and mutated once per
/// tick. Bounded fields are clamped, never rejected. Odometers and the
/// cumulative fuel counter never decrease.
#[derive(Clone, Debug, PartialEq)]
pub struct VehicleState {
    /// Ignition status.
    pub ignition_on: bool,
    /// Movement status.
    pub in_motion: bool,
    /// Speed in km/h.
    pub speed: u16,
    /// Latitude in decimal degrees.
    pub latitude: f64,
    /// Longitude in decimal degrees.
    pub longitude: f64,
    /// Total odometer in meters.
    pub odometer_total: u32,
    /// Trip odometer in meters.
    pub odometer_trip: u32,
    /// Fuel level in percent.
    pub fuel_level: f32,
    /// Cumulative fuel used in liters.
    pub fuel_used_total: f64,
    /// Nominal oil level in percent.
    pub oil_level: f32,
}

impl VehicleState {
    /// Construct the initial state with randomized ignition and motion.
    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let ignition_on = rng.gen_bool(0.5);

        Self {
            ignition_on,
            in_motion: rng.gen_bool(0.5),
            speed: if ignition_on { rng.gen_range(0..=80) } else { 0 },
            ..Default::default()
        }
    }

    /// Set the speed, clamped to the valid range.
    ///
    /// Speed is forced to zero when the ignition is off.
    #[inline]
    pub fn set_speed(&mut self, speed: i32) {
        self.speed = if self.ignition_on {
            speed.clamp(0, SPEED_MAX as i32) as u16
        } else {
            0
        };
    }

    /// Advance both odometers.
    pub fn advance_odometer(&mut self, total: u32, trip: u32) {
        self.odometer_total = self.odometer_total.saturating_add(total);
        self.odometer_trip = self.odometer_trip.saturating_add(trip);
    }

    /// Burn fuel from the tank, floored at empty.
    pub fn burn_fuel(&mut self, percent: f32) {
        self.fuel_level = (self.fuel_level - percent.max(0.0)).max(0.0);
    }

    /// Add to the cumulative fuel counter.
    pub fn add_fuel_used(&mut self, liters: f64) {
        self.fuel_used_total += liters.max(0.0);
    }

    /// Move the position by the given delta in degrees.
    pub fn drift(&mut self, latitude: f64, longitude: f64) {
        self.latitude = (self.latitude + latitude).clamp(-90.0, 90.0);
        self.longitude = (self.longitude + longitude).clamp(-180.0, 180.0);
    }
}

impl Default for VehicleState {
    fn default() -> Self {
        Self {
            ignition_on: false,
            in_motion: false,
            speed: 0,
            latitude: 4.60971,
            longitude: -74.08175,
            odometer_total: 2_456_789,
            odometer_trip: 34_567,
            fuel_level: 68.0,
            fuel_used_total: 150.0,
            oil_level: 80.0,
        }
    }
}

impl std::fmt::Display for VehicleState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Ignition: {} Motion: {} Speed: {} km/h Odometer: {} m Fuel: {:.2}%",
            self.ignition_on.as_on_off_str(),
            self.in_motion.as_on_off_str(),
            self.speed,
            self.odometer_total,
            self.fuel_level
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_speed_clamp() {
        let mut state = VehicleState {
            ignition_on: true,
            ..Default::default()
        };

        state.set_speed(400);
        assert_eq!(state.speed, SPEED_MAX);

        state.set_speed(-4);
        assert_eq!(state.speed, 0);

        state.set_speed(120);
        state.ignition_on = false;
        state.set_speed(120);
        assert_eq!(state.speed, 0);
    }

    #[test]
    fn test_fuel_floor() {
        let mut state = VehicleState {
            fuel_level: 0.02,
            ..Default::default()
        };

        state.burn_fuel(0.05);
        assert_eq!(state.fuel_level, 0.0);
    }

    #[test]
    fn test_counters_monotonic() {
        let mut state = VehicleState::default();

        state.advance_odometer(250, 300);
        assert_eq!(state.odometer_total, 2_457_039);
        assert_eq!(state.odometer_trip, 34_867);

        state.add_fuel_used(-1.0);
        assert_eq!(state.fuel_used_total, 150.0);
    }
}
