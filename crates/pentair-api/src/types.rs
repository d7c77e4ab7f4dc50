// Wire types for the Pentair cloud API.
//
// Field names follow the vendor's camelCase JSON. Everything here is a
// straight pass-through shape -- domain normalization happens in
// `pentair-core`'s convert module.

use serde::Deserialize;

// ── Envelope ────────────────────────────────────────────────────────

/// Successful responses wrap their payload in `{ "data": ... }`.
#[derive(Debug, Deserialize)]
pub(crate) struct Envelope<T> {
    pub data: T,
}

/// Error responses carry a machine code and a human message.
#[derive(Debug, Deserialize)]
pub(crate) struct ApiErrorBody {
    pub code: Option<String>,
    pub message: Option<String>,
}

// ── Session ─────────────────────────────────────────────────────────

/// Token payload from `auth/login` and `auth/refresh`.
///
/// Refresh responses omit `refreshToken`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct TokenResponse {
    pub access_token: String,
    pub id_token: String,
    pub refresh_token: Option<String>,
    pub expires_in: Option<i64>,
}

// ── Devices ─────────────────────────────────────────────────────────

/// Entry in the account's device list. Identity and type only --
/// fetch the detail record for readings.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceStub {
    pub device_id: String,
    pub device_type: String,
    pub nick_name: Option<String>,
}

/// An enabled pump program on an IF31 pump controller.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgramEntry {
    pub id: u32,
    pub name: String,
}

/// Full per-device detail record.
///
/// The cloud reports one flat attribute bag for every equipment class;
/// which fields are populated depends on `deviceType` (PPA0 battery
/// backup pumps report battery/pump flags, SSS1 salt sensors report
/// salt readings, IF31 pump controllers report program and motor data).
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceDetails {
    pub device_id: String,
    pub device_type: String,

    // Identity / metadata
    pub nick_name: Option<String>,
    pub maker: Option<String>,
    pub model: Option<String>,
    pub software_version: Option<String>,

    /// Epoch timestamp of the last report. Seconds or milliseconds,
    /// depending on firmware.
    pub last_report: Option<f64>,

    // Status flags
    pub online: Option<bool>,
    pub power: Option<bool>,
    pub low_battery: Option<bool>,
    pub battery_charging: Option<bool>,
    pub primary_pump: Option<bool>,
    pub secondary_pump: Option<bool>,
    pub water_level: Option<bool>,

    // Readings
    pub battery_level: Option<f64>,
    pub average_salt_usage_per_day: Option<f64>,
    pub salt_level: Option<f64>,
    pub current_power_consumption: Option<f64>,
    pub current_motor_speed: Option<f64>,
    pub current_estimated_flow: Option<f64>,

    // Pump programs (IF31)
    pub active_program_number: Option<u32>,
    pub active_program_name: Option<String>,
    #[serde(default)]
    pub enabled_programs: Vec<ProgramEntry>,
}
