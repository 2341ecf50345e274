use rand::{rngs::StdRng, Rng, SeedableRng};

use crate::{
    core::{iso6709, TelemetryPacket, TelemetryRecord, VehicleState},
    identity::IdentityProvider,
};

pub mod field;

/// Stateful telemetry generator.
///
/// Each tick derives a new vehicle state from the previous one and produces a
/// record from it. The generator owns its vehicle state and identity pool, so
/// multiple generators never share state.
pub struct TelemetryGenerator<R = StdRng> {
    /// Vehicle state carried between ticks.
    state: VehicleState,
    /// Device identity pool.
    identity: IdentityProvider,
    /// Randomness source.
    rng: R,
}

impl TelemetryGenerator<StdRng> {
    /// Construct a generator with a randomized initial state.
    pub fn new(identity: IdentityProvider) -> Self {
        Self::with_rng(identity, StdRng::from_entropy())
    }
}

impl<R: Rng> TelemetryGenerator<R> {
    /// Construct a generator with the given randomness source.
    pub fn with_rng(identity: IdentityProvider, mut rng: R) -> Self {
        let state = VehicleState::random(&mut rng);

        log::debug!("Initial vehicle state: {}", state);

        Self {
            state,
            identity,
            rng,
        }
    }

    /// Construct a generator from an explicit vehicle state.
    pub fn with_state(identity: IdentityProvider, state: VehicleState, rng: R) -> Self {
        Self {
            state,
            identity,
            rng,
        }
    }

    /// Current vehicle state.
    #[inline]
    pub fn state(&self) -> &VehicleState {
        &self.state
    }

    /// Device identity pool.
    #[inline]
    pub fn identity(&self) -> &IdentityProvider {
        &self.identity
    }

    /// Apply one state transition and derive the telemetry record.
    ///
    /// Every step may read fields already updated in this tick. The record is
    /// validated against its bounds before it is returned.
    pub fn tick(&mut self) -> crate::Result<TelemetryRecord> {
        let rng = &mut self.rng;
        let state = &mut self.state;

        field::toggle_ignition(state, rng);
        field::toggle_motion(state, rng);

        let prev_speed = field::update_speed(state, rng);

        let rpm = field::rpm(state.ignition_on, state.speed, rng);
        let engine_load = field::engine_load(rng);
        let engine_temp = field::engine_temp(state.ignition_on, engine_load, rng);
        let instant_consumption =
            field::instant_consumption(state.in_motion, state.speed, engine_load, rng);

        field::update_odometer(state, rng);
        field::update_fuel_level(state, rng);
        field::update_fuel_used(state, instant_consumption);
        field::drift_position(state, rng);

        let obd_faults = field::obd_faults(rng);
        let (event_type, event_g_value) = field::driving_event(state.speed, prev_speed, rng);
        let gsm_signal = field::gsm_signal(rng);
        let oil_level = field::oil_level(state.oil_level, rng);

        let record = TelemetryRecord {
            ignition_status: state.ignition_on as u8,
            movement_status: state.in_motion as u8,
            speed: state.speed,
            gps_location: iso6709(state.latitude, state.longitude),
            gsm_signal,
            rpm,
            engine_temp,
            engine_load,
            oil_level,
            fuel_level: state.fuel_level as u8,
            fuel_used_gps: field::round(state.fuel_used_total, 2),
            instant_consumption,
            obd_faults,
            odometer_total: state.odometer_total,
            odometer_trip: state.odometer_trip,
            event_type,
            event_g_value,
        };

        log::trace!("Vehicle state: {}", state);

        record.validate()?;

        Ok(record)
    }

    /// Assemble the next telemetry packet.
    ///
    /// The identifier is taken in round-robin order and the packet is
    /// stamped with the current wall-clock time.
    pub fn generate(&mut self) -> crate::Result<TelemetryPacket> {
        let imei = self.identity.next(&mut self.rng);
        let record = self.tick()?;

        let packet = TelemetryPacket::now(imei, record);

        log::debug!("Packet generated - {}", packet);

        Ok(packet)
    }
}
