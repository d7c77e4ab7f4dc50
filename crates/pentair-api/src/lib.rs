//! Async client for the Pentair Home cloud API.
//!
//! Covers the three surfaces the cloud exposes for pool equipment:
//! session management (login, token refresh), device telemetry
//! (list + per-device detail), and the single control endpoint
//! (active pump program). `pentair-core` layers the domain model and
//! refresh coordination on top of this crate.

pub mod auth;
pub mod client;
pub mod error;
pub mod transport;
pub mod types;

pub use auth::AuthTokens;
pub use client::PentairClient;
pub use error::Error;
pub use transport::TransportConfig;
pub use types::{DeviceDetails, DeviceStub, ProgramEntry};
