// ── Unified domain model ──
//
// Canonical representation of Pentair pool equipment, independent of
// the cloud's wire shapes. Consumers (host runtimes, entity adapters)
// depend on these types only.

pub mod device;
pub mod device_id;

pub use device::{Device, DeviceType, Program, STOPPED_PROGRAM};
pub use device_id::DeviceId;
