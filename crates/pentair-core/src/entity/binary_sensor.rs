// Binary sensor adapters
//
// Boolean flags read straight off a device snapshot. The descriptor
// map pairs a device-type tag with field tags; `BinarySensorField::read`
// is the single generic accessor.

use crate::coordinator::Coordinator;
use crate::model::{Device, DeviceId, DeviceType};

use super::{unique_id, DeviceInfo, EntityCategory};

/// Host-facing device class for a binary sensor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum BinarySensorClass {
    Battery,
    Connectivity,
    Power,
}

/// Which boolean attribute of a device snapshot to report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinarySensorField {
    LowBattery,
    Online,
    Power,
}

impl BinarySensorField {
    /// Read this field from a device snapshot.
    pub fn read(self, device: &Device) -> Option<bool> {
        match self {
            Self::LowBattery => device.low_battery,
            Self::Online => device.online,
            Self::Power => device.power,
        }
    }
}

/// Static description of one binary sensor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BinarySensorDescription {
    pub key: &'static str,
    pub class: BinarySensorClass,
    pub category: Option<EntityCategory>,
    pub field: BinarySensorField,
}

/// Binary sensors declared for PPA0 battery backup pumps.
const PPA0_BINARY_SENSORS: [BinarySensorDescription; 3] = [
    BinarySensorDescription {
        key: "low_battery",
        class: BinarySensorClass::Battery,
        category: Some(EntityCategory::Diagnostic),
        field: BinarySensorField::LowBattery,
    },
    BinarySensorDescription {
        key: "online",
        class: BinarySensorClass::Connectivity,
        category: Some(EntityCategory::Diagnostic),
        field: BinarySensorField::Online,
    },
    BinarySensorDescription {
        key: "power",
        class: BinarySensorClass::Power,
        category: Some(EntityCategory::Diagnostic),
        field: BinarySensorField::Power,
    },
];

/// The declared binary sensors for a device type.
pub fn descriptions_for(device_type: &DeviceType) -> &'static [BinarySensorDescription] {
    match device_type {
        DeviceType::BackupPump => &PPA0_BINARY_SENSORS,
        _ => &[],
    }
}

/// A boolean flag entity bound to one device.
pub struct BinarySensor {
    coordinator: Coordinator,
    device_id: DeviceId,
    description: &'static BinarySensorDescription,
    unique_id: String,
    device_info: DeviceInfo,
}

impl BinarySensor {
    fn new(
        coordinator: Coordinator,
        device: &Device,
        description: &'static BinarySensorDescription,
    ) -> Self {
        Self {
            coordinator,
            device_id: device.id.clone(),
            description,
            unique_id: unique_id(device, description.key),
            device_info: DeviceInfo::from_device(device),
        }
    }

    /// The flag's current value, read from the live snapshot.
    /// `None` when the device has vanished or does not report the field.
    pub fn is_on(&self) -> Option<bool> {
        self.coordinator
            .get_device(&self.device_id)
            .and_then(|device| self.description.field.read(&device))
    }

    pub fn description(&self) -> &'static BinarySensorDescription {
        self.description
    }

    pub fn unique_id(&self) -> &str {
        &self.unique_id
    }

    pub fn device_info(&self) -> &DeviceInfo {
        &self.device_info
    }
}

/// Build the binary sensors for every device currently known to the
/// coordinator, matching descriptors by device-type tag.
pub fn binary_sensors(coordinator: &Coordinator) -> Vec<BinarySensor> {
    coordinator
        .get_devices(None)
        .iter()
        .flat_map(|device| {
            descriptions_for(&device.device_type)
                .iter()
                .map(|description| BinarySensor::new(coordinator.clone(), device, description))
        })
        .collect()
}
