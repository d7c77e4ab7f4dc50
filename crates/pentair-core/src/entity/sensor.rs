// Sensor adapters
//
// Numeric and timestamp readings. The universal map applies to every
// device type; per-type maps add the equipment-specific readings.

use chrono::{DateTime, Utc};

use crate::coordinator::Coordinator;
use crate::model::{Device, DeviceId, DeviceType};

use super::{unique_id, DeviceInfo, EntityCategory};

/// Host-facing device class for a sensor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum SensorClass {
    Battery,
    Power,
    Speed,
    Timestamp,
    VolumeFlowRate,
    Weight,
}

/// A sensor reading.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SensorValue {
    Float(f64),
    Int(i64),
    Timestamp(DateTime<Utc>),
}

impl std::fmt::Display for SensorValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Float(v) => write!(f, "{v}"),
            Self::Int(v) => write!(f, "{v}"),
            Self::Timestamp(v) => write!(f, "{}", v.to_rfc3339()),
        }
    }
}

/// Which attribute of a device snapshot to report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SensorField {
    LastReport,
    BatteryLevel,
    AverageSaltUsagePerDay,
    SaltLevel,
    /// Reports 0 when the device has no active program.
    ActiveProgramNumber,
    CurrentPowerConsumption,
    CurrentMotorSpeed,
    CurrentEstimatedFlow,
}

impl SensorField {
    /// Read this field from a device snapshot.
    pub fn read(self, device: &Device) -> Option<SensorValue> {
        match self {
            Self::LastReport => device.last_report.map(SensorValue::Timestamp),
            Self::BatteryLevel => device.battery_level.map(SensorValue::Float),
            Self::AverageSaltUsagePerDay => {
                device.average_salt_usage_per_day.map(SensorValue::Float)
            }
            Self::SaltLevel => device.salt_level.map(SensorValue::Float),
            Self::ActiveProgramNumber => Some(SensorValue::Int(
                device.active_program_number.unwrap_or(0).into(),
            )),
            Self::CurrentPowerConsumption => {
                device.current_power_consumption.map(SensorValue::Float)
            }
            Self::CurrentMotorSpeed => device.current_motor_speed.map(SensorValue::Float),
            Self::CurrentEstimatedFlow => device.current_estimated_flow.map(SensorValue::Float),
        }
    }
}

/// Static description of one sensor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SensorDescription {
    pub key: &'static str,
    pub class: Option<SensorClass>,
    pub unit: Option<&'static str>,
    pub category: Option<EntityCategory>,
    pub field: SensorField,
}

/// Sensors declared for every device type.
const UNIVERSAL_SENSORS: [SensorDescription; 1] = [SensorDescription {
    key: "last_report",
    class: Some(SensorClass::Timestamp),
    unit: None,
    category: Some(EntityCategory::Diagnostic),
    field: SensorField::LastReport,
}];

const PPA0_SENSORS: [SensorDescription; 1] = [SensorDescription {
    key: "battery_level",
    class: Some(SensorClass::Battery),
    unit: Some("%"),
    category: Some(EntityCategory::Diagnostic),
    field: SensorField::BatteryLevel,
}];

const SSS1_SENSORS: [SensorDescription; 3] = [
    SensorDescription {
        key: "average_salt_usage_per_day",
        class: Some(SensorClass::Weight),
        unit: Some("lb"),
        category: None,
        field: SensorField::AverageSaltUsagePerDay,
    },
    SensorDescription {
        key: "battery_level",
        class: None,
        unit: None,
        category: Some(EntityCategory::Diagnostic),
        field: SensorField::BatteryLevel,
    },
    SensorDescription {
        key: "salt_level",
        class: None,
        unit: None,
        category: None,
        field: SensorField::SaltLevel,
    },
];

const IF31_SENSORS: [SensorDescription; 4] = [
    SensorDescription {
        key: "active_program_number",
        class: None,
        unit: None,
        category: Some(EntityCategory::Diagnostic),
        field: SensorField::ActiveProgramNumber,
    },
    SensorDescription {
        key: "current_power_consumption",
        class: Some(SensorClass::Power),
        unit: Some("W"),
        category: None,
        field: SensorField::CurrentPowerConsumption,
    },
    SensorDescription {
        key: "current_motor_speed",
        class: Some(SensorClass::Speed),
        unit: Some("%"),
        category: None,
        field: SensorField::CurrentMotorSpeed,
    },
    SensorDescription {
        key: "current_estimated_flow",
        class: Some(SensorClass::VolumeFlowRate),
        unit: Some("gal/min"),
        category: None,
        field: SensorField::CurrentEstimatedFlow,
    },
];

/// The declared sensors for a device type: the universal set plus the
/// equipment-specific map.
pub fn descriptions_for(
    device_type: &DeviceType,
) -> impl Iterator<Item = &'static SensorDescription> {
    let specific: &'static [SensorDescription] = match device_type {
        DeviceType::BackupPump => &PPA0_SENSORS,
        DeviceType::SaltSensor => &SSS1_SENSORS,
        DeviceType::PumpController => &IF31_SENSORS,
        DeviceType::Other(_) => &[],
    };
    UNIVERSAL_SENSORS.iter().chain(specific.iter())
}

/// A reading entity bound to one device.
pub struct Sensor {
    coordinator: Coordinator,
    device_id: DeviceId,
    description: &'static SensorDescription,
    unique_id: String,
    device_info: DeviceInfo,
}

impl Sensor {
    fn new(
        coordinator: Coordinator,
        device: &Device,
        description: &'static SensorDescription,
    ) -> Self {
        Self {
            coordinator,
            device_id: device.id.clone(),
            description,
            unique_id: unique_id(device, description.key),
            device_info: DeviceInfo::from_device(device),
        }
    }

    /// The reading's current value from the live snapshot.
    pub fn value(&self) -> Option<SensorValue> {
        self.coordinator
            .get_device(&self.device_id)
            .and_then(|device| self.description.field.read(&device))
    }

    pub fn description(&self) -> &'static SensorDescription {
        self.description
    }

    pub fn unique_id(&self) -> &str {
        &self.unique_id
    }

    pub fn device_info(&self) -> &DeviceInfo {
        &self.device_info
    }
}

/// Build the sensors for every device currently known to the coordinator.
pub fn sensors(coordinator: &Coordinator) -> Vec<Sensor> {
    coordinator
        .get_devices(None)
        .iter()
        .flat_map(|device| {
            descriptions_for(&device.device_type)
                .map(|description| Sensor::new(coordinator.clone(), device, description))
        })
        .collect()
}
