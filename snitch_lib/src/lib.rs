//! Dead Man's Snitch API client library.
//!
//! Provides a typed client for the snitch endpoints of the Dead Man's Snitch REST
//! API: list, fetch, create, edit, tag, pause, and delete heartbeat monitors.

pub mod client;
pub mod error;
pub mod helpers;
pub mod secret;
pub mod snitch;

pub use client::{Client, SnitchRef, API_BASE};
pub use error::{ApiError, AuthError, Error, PreconditionError, ValidationError};
pub use helpers::{format_timestamp_display, get_api_key, parse_time, ApiKeySource};
pub use secret::SecretBackend;
pub use snitch::{Interval, Snitch, SnitchOptions, SnitchPayload};

/// Library version for User-Agent and diagnostics.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
