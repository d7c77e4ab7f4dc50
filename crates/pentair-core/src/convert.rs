// ── API-to-domain type conversions ──
//
// Bridges raw `pentair_api` response types into canonical
// `pentair_core::model` domain types. Normalizes the vendor's
// inconsistent epoch timestamps and maps program entries.

use chrono::{DateTime, Utc};

use pentair_api::types::{DeviceDetails, ProgramEntry};

use crate::model::{Device, DeviceId, DeviceType, Program};

/// Convert a vendor epoch timestamp to `DateTime<Utc>`.
///
/// Firmware reports `lastReport` as epoch seconds or epoch milliseconds
/// depending on version. Values beyond the current epoch-seconds clock
/// are treated as milliseconds.
fn convert_timestamp(ts: f64) -> Option<DateTime<Utc>> {
    let now_secs = Utc::now().timestamp() as f64;
    let secs = if ts > now_secs { ts / 1000.0 } else { ts };
    let millis = (secs * 1000.0) as i64;
    DateTime::from_timestamp_millis(millis)
}

impl From<ProgramEntry> for Program {
    fn from(entry: ProgramEntry) -> Self {
        Self {
            number: entry.id,
            name: entry.name,
        }
    }
}

impl From<DeviceDetails> for Device {
    fn from(details: DeviceDetails) -> Self {
        Self {
            id: DeviceId::new(details.device_id),
            device_type: DeviceType::from_tag(&details.device_type),

            nickname: details.nick_name,
            maker: details.maker,
            model: details.model,
            software_version: details.software_version,

            online: details.online,
            power: details.power,
            low_battery: details.low_battery,
            battery_charging: details.battery_charging,
            primary_pump_alert: details.primary_pump,
            secondary_pump_alert: details.secondary_pump,
            water_level_alert: details.water_level,

            last_report: details.last_report.and_then(convert_timestamp),
            battery_level: details.battery_level,
            average_salt_usage_per_day: details.average_salt_usage_per_day,
            salt_level: details.salt_level,
            current_power_consumption: details.current_power_consumption,
            current_motor_speed: details.current_motor_speed,
            current_estimated_flow: details.current_estimated_flow,

            active_program_number: details.active_program_number,
            active_program_name: details.active_program_name,
            enabled_programs: details
                .enabled_programs
                .into_iter()
                .map(Program::from)
                .collect(),
        }
    }
}
