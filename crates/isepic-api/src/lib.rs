// isepic-api: Async Rust client for the Cisco ISE-PIC Passive Identity API

pub mod auth;
pub mod client;
pub mod error;
pub mod identity;
pub mod models;
pub mod transport;

pub use auth::{AuthState, Credentials};
pub use client::{ClientConfig, DEFAULT_PORT, IdentityClient};
pub use error::Error;
pub use models::{IdentityMapping, MappingRecord, PatRange, format_timestamp, parse_timestamp};
pub use transport::{TlsMode, TransportConfig};
