pub use imei::*;
pub use packet::*;
pub use telemetry::*;
pub use vehicle::*;

mod imei;
mod packet;
mod telemetry;
mod vehicle;
