use chrono::{DateTime, SecondsFormat, Utc};
use serde_derive::Serialize;

use super::{Imei, TelemetryRecord};

/// Telemetry packet as sent over the wire.
///
/// A packet is assembled once per tick, serialized and then discarded.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TelemetryPacket {
    /// Device identifier.
    imei: Imei,
    /// UTC timestamp with microsecond precision.
    timestamp: String,
    /// Telemetry measurements.
    data: TelemetryRecord,
}

impl TelemetryPacket {
    /// Assemble a packet at the given instant.
    pub fn new(imei: Imei, data: TelemetryRecord, instant: DateTime<Utc>) -> Self {
        Self {
            imei,
            timestamp: format_timestamp(instant),
            data,
        }
    }

    /// Assemble a packet at the current wall-clock time.
    #[inline]
    pub fn now(imei: Imei, data: TelemetryRecord) -> Self {
        Self::new(imei, data, Utc::now())
    }

    #[inline]
    pub fn imei(&self) -> &Imei {
        &self.imei
    }

    #[inline]
    pub fn timestamp(&self) -> &str {
        &self.timestamp
    }

    #[inline]
    pub fn data(&self) -> &TelemetryRecord {
        &self.data
    }

    /// Serialize the packet as a JSON text message.
    pub fn to_json(&self) -> crate::Result<String> {
        serde_json::to_string(self).map_err(|e| crate::Error::Generation(e.to_string()))
    }
}

/// Format an instant as ISO 8601 with microseconds and a literal `Z`.
pub fn format_timestamp(instant: DateTime<Utc>) -> String {
    instant.to_rfc3339_opts(SecondsFormat::Micros, true)
}

impl std::fmt::Display for TelemetryPacket {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "IMEI: {} TS: {}", self.imei, self.timestamp)
    }
}
