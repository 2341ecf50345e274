// Copyright (C) 2024 Laixer Equipment B.V.
// All rights reserved.
//
// This software may be modified and distributed under the terms
// of the included license.  See the LICENSE file for details.

//! The `telemetria` library provides the runtime of the vehicle telemetry simulator.
//!
//! A `TelemetryGenerator` owns the vehicle state and derives a new, coherent
//! state on every tick: speed, RPM, temperatures, fuel, odometer, position,
//! OBD faults and driving events. Each tick is packaged into a
//! `TelemetryPacket` stamped with a device identifier from the
//! `IdentityProvider` and the current UTC time.
//!
//! The `Broadcaster` drives the generator from a single timer loop and fans
//! the serialized packets out to any number of subscribers.

pub mod config;
pub mod core;
pub mod identity;
pub mod runtime;
pub mod service;
pub mod simulator;
pub mod util;

pub use self::config::*;
pub use self::runtime::{Error, Result, RuntimeContext};

pub use rand;

/// Telemetria runtime module containing various constants.
pub mod consts {
    use std::time::Duration;

    /// Telemetria runtime version.
    pub const VERSION: &str = env!("CARGO_PKG_VERSION");

    /// Default network address to listen on.
    pub const DEFAULT_LISTEN: &str = "0.0.0.0:8000";

    /// Telemetry stream endpoint.
    pub const TELEMETRY_PATH: &str = "/ws/telemetria";

    /// Default interval between telemetry ticks.
    pub const TICK_INTERVAL: Duration = Duration::from_secs(5);

    /// Queue size per subscriber.
    ///
    /// A subscriber falling this many packets behind is dropped.
    pub const QUEUE_SIZE_SUBSCRIBER: usize = 4;

    /// Maximum time a single socket write may take.
    pub const SEND_TIMEOUT: Duration = Duration::from_secs(5);

    /// Default maximum number of network clients.
    pub const NETWORK_MAX_CLIENTS: usize = 64;

    /// Interval between daemon status reports.
    pub const STATUS_INTERVAL: Duration = Duration::from_secs(60);
}
