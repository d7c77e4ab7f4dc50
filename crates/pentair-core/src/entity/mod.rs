// ── Presentation adapters ──
//
// Declarative entity layer over the coordinator's device collection.
// Descriptors are static data (device-type tag -> field tag); a single
// generic accessor per platform evaluates them. Entities hold only a
// device id and a coordinator handle -- every read re-resolves the
// device from the current snapshot.

pub mod binary_sensor;
pub mod select;
pub mod sensor;

use crate::model::Device;

pub use binary_sensor::{
    binary_sensors, BinarySensor, BinarySensorClass, BinarySensorDescription, BinarySensorField,
};
pub use select::{pump_program_selects, PumpProgramSelect};
pub use sensor::{sensors, Sensor, SensorClass, SensorDescription, SensorField, SensorValue};

/// Host-facing grouping hint for an entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum EntityCategory {
    Diagnostic,
}

/// Registry metadata for the physical unit an entity belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceInfo {
    pub manufacturer: Option<String>,
    pub model: Option<String>,
    pub name: Option<String>,
    pub software_version: Option<String>,
}

impl DeviceInfo {
    fn from_device(device: &Device) -> Self {
        Self {
            manufacturer: device.maker.clone(),
            model: device.model.clone(),
            name: device.nickname.clone(),
            software_version: device.software_version.clone(),
        }
    }
}

/// Stable per-entity identifier: `"{device_id}-{key}"`.
fn unique_id(device: &Device, key: &str) -> String {
    format!("{}-{key}", device.id)
}
