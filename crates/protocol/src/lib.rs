//! Wire types for the device broker protocol.
//!
//! This crate contains the serde-serializable types exchanged with the broker
//! service that leases remote devices. These types represent the "protocol
//! layer" - the shapes of request and response bodies as they appear on the
//! wire.
//!
//! Types in this crate are:
//! - **Pure data**: No behavior beyond serialization/deserialization
//! - **1:1 with the broker API**: Field names follow the broker's camelCase
//! - **Tolerant of opaque payloads**: Recognized fields are typed, the rest of
//!   a response body is carried through untouched
//!
//! Orchestration and transport live in `tether-cli`.

pub mod types;

pub use types::*;
