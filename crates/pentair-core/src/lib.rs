//! pentair-core: domain model, refresh coordination, and entity
//! adapters for Pentair pool equipment.
//!
//! The [`Coordinator`] owns the current device collection and keeps it
//! fresh on a fixed interval; the [`entity`] module exposes the
//! declarative sensor/select layer a host runtime registers.

pub mod config;
pub mod convert;
pub mod coordinator;
pub mod diff;
pub mod entity;
pub mod error;
pub mod model;

// ── Primary re-exports ──────────────────────────────────────────────
pub use config::{AccountConfig, AuthCredentials, DEFAULT_BASE_URL, DEFAULT_REFRESH_INTERVAL_SECS};
pub use coordinator::Coordinator;
pub use diff::SnapshotDiff;
pub use error::CoreError;
pub use model::{Device, DeviceId, DeviceType, Program, STOPPED_PROGRAM};
