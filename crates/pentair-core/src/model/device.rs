// ── Device domain types ──
//
// Canonical representation of one piece of pool equipment, normalized
// from the cloud's flat attribute bag. One struct covers every
// equipment class; which fields are populated depends on the type tag.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::device_id::DeviceId;

/// The select option (and implicit program) that stops the pump.
///
/// Maps to program number 0 unconditionally; the cloud's numbering
/// contract for "off" is not validated per device.
pub const STOPPED_PROGRAM: &str = "Stopped";

/// Equipment class, keyed by the vendor's short type tag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum DeviceType {
    /// `PPA0` -- battery backup sump pump controller.
    BackupPump,
    /// `SSS1` -- salt level sensor.
    SaltSensor,
    /// `IF31` -- IntelliFlo3 variable-speed pump controller.
    PumpController,
    /// Any tag this crate does not model explicitly.
    Other(String),
}

impl DeviceType {
    /// Parse a vendor type tag.
    pub fn from_tag(tag: &str) -> Self {
        match tag {
            "PPA0" => Self::BackupPump,
            "SSS1" => Self::SaltSensor,
            "IF31" => Self::PumpController,
            other => Self::Other(other.to_owned()),
        }
    }

    /// The vendor's short type tag.
    pub fn tag(&self) -> &str {
        match self {
            Self::BackupPump => "PPA0",
            Self::SaltSensor => "SSS1",
            Self::PumpController => "IF31",
            Self::Other(tag) => tag,
        }
    }
}

impl From<String> for DeviceType {
    fn from(s: String) -> Self {
        Self::from_tag(&s)
    }
}

impl From<DeviceType> for String {
    fn from(t: DeviceType) -> Self {
        t.tag().to_owned()
    }
}

impl std::fmt::Display for DeviceType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.tag())
    }
}

/// A named, numbered pump operating mode (IF31).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Program {
    pub number: u32,
    pub name: String,
}

/// Point-in-time record of one physical unit's reported attributes.
///
/// Immutable per refresh cycle: the coordinator replaces whole device
/// collections rather than mutating individual records.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Device {
    pub id: DeviceId,
    pub device_type: DeviceType,

    // Metadata
    pub nickname: Option<String>,
    pub maker: Option<String>,
    pub model: Option<String>,
    pub software_version: Option<String>,

    // Status flags
    pub online: Option<bool>,
    pub power: Option<bool>,
    pub low_battery: Option<bool>,
    pub battery_charging: Option<bool>,
    pub primary_pump_alert: Option<bool>,
    pub secondary_pump_alert: Option<bool>,
    pub water_level_alert: Option<bool>,

    // Readings
    pub last_report: Option<DateTime<Utc>>,
    pub battery_level: Option<f64>,
    pub average_salt_usage_per_day: Option<f64>,
    pub salt_level: Option<f64>,
    pub current_power_consumption: Option<f64>,
    pub current_motor_speed: Option<f64>,
    pub current_estimated_flow: Option<f64>,

    // Pump programs (IF31)
    pub active_program_number: Option<u32>,
    pub active_program_name: Option<String>,
    pub enabled_programs: Vec<Program>,
}

impl Device {
    pub fn is_online(&self) -> bool {
        self.online.unwrap_or(false)
    }

    /// Resolve a human-readable program name to its program number.
    ///
    /// `"Stopped"` is always 0, bypassing the enabled-program list.
    /// Names absent from the list also resolve to 0.
    pub fn resolve_program_number(&self, name: &str) -> u32 {
        if name == STOPPED_PROGRAM {
            return 0;
        }
        self.enabled_programs
            .iter()
            .find(|p| p.name == name)
            .map_or(0, |p| p.number)
    }
}
