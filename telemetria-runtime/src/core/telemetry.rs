use serde_derive::Serialize;

/// Distinct OBD trouble codes the simulator can report.
pub const OBD_FAULT_CODES: [&str; 13] = [
    "P0135", "P0420", "P0300", "P0171", "P0174", "P0301", "P0302", "P0303", "P0304", "U0100",
    "U0101", "B0001", "B0002",
];

/// Maximum number of faults reported per record.
pub const OBD_FAULTS_MAX: usize = 3;

/// Driving event.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EventType {
    /// Harsh acceleration.
    Acceleration = 1,
    /// Harsh braking.
    Braking = 2,
    /// Cornering.
    Curve = 3,
}

impl serde::Serialize for EventType {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(*self as u8)
    }
}

/// Format a position as an ISO 6709 style string.
///
/// Latitude is padded to two integer digits and longitude to three, both with
/// an explicit sign and five decimals, followed by a solidus.
pub fn iso6709(latitude: f64, longitude: f64) -> String {
    format!("{:+09.5}{:+010.5}/", latitude, longitude)
}

/// Telemetry measurements of a single tick.
///
/// Field names match the wire format.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TelemetryRecord {
    /// Ignition status, 0 is off.
    pub ignition_status: u8,
    /// Movement status, 0 is stationary.
    pub movement_status: u8,
    /// Speed in km/h.
    pub speed: u16,
    /// Position in ISO 6709 notation.
    pub gps_location: String,
    /// GSM signal, 1 is excellent, 5 is lost.
    pub gsm_signal: u8,
    /// Engine revolutions per minute.
    pub rpm: u16,
    /// Engine temperature in degrees Celsius.
    pub engine_temp: i16,
    /// Engine load in percent.
    pub engine_load: u8,
    /// Oil level in percent.
    pub oil_level: u8,
    /// Fuel level in percent.
    pub fuel_level: u8,
    /// Cumulative fuel used in liters.
    pub fuel_used_gps: f64,
    /// Instantaneous consumption in L/h.
    pub instant_consumption: f64,
    /// Active OBD trouble codes.
    pub obd_faults: Vec<&'static str>,
    /// Total odometer in meters.
    pub odometer_total: u32,
    /// Trip odometer in meters.
    pub odometer_trip: u32,
    /// Driving event.
    pub event_type: Option<EventType>,
    /// Driving event G-value.
    pub event_g_value: Option<u8>,
}

impl TelemetryRecord {
    /// Check every field against its declared bounds.
    ///
    /// The event G-value may be present without an event type.
    pub fn validate(&self) -> crate::Result {
        fn check(ok: bool, field: &str, value: impl std::fmt::Display) -> crate::Result {
            if ok {
                Ok(())
            } else {
                Err(crate::Error::Generation(format!(
                    "{} out of bounds: {}",
                    field, value
                )))
            }
        }

        check(self.ignition_status <= 1, "ignition_status", self.ignition_status)?;
        check(self.movement_status <= 1, "movement_status", self.movement_status)?;
        check(self.speed <= 350, "speed", self.speed)?;
        check(
            (1..=5).contains(&self.gsm_signal),
            "gsm_signal",
            self.gsm_signal,
        )?;
        check(self.rpm <= 16_384, "rpm", self.rpm)?;
        check(
            (-60..=127).contains(&self.engine_temp),
            "engine_temp",
            self.engine_temp,
        )?;
        check(self.engine_load <= 100, "engine_load", self.engine_load)?;
        check(self.oil_level <= 100, "oil_level", self.oil_level)?;
        check(self.fuel_level <= 100, "fuel_level", self.fuel_level)?;
        check(
            (0.0..=4_294_967.0).contains(&self.fuel_used_gps),
            "fuel_used_gps",
            self.fuel_used_gps,
        )?;
        check(
            (0.0..=32_767.0).contains(&self.instant_consumption),
            "instant_consumption",
            self.instant_consumption,
        )?;
        check(
            self.odometer_total <= i32::MAX as u32,
            "odometer_total",
            self.odometer_total,
        )?;
        check(
            self.odometer_trip <= i32::MAX as u32,
            "odometer_trip",
            self.odometer_trip,
        )?;
        check(
            self.obd_faults.len() <= OBD_FAULTS_MAX,
            "obd_faults",
            self.obd_faults.len(),
        )?;

        for (idx, code) in self.obd_faults.iter().enumerate() {
            if self.obd_faults[..idx].contains(code) {
                return Err(crate::Error::Generation(format!(
                    "duplicate fault code: {}",
                    code
                )));
            }
        }

        Ok(())
    }
}
