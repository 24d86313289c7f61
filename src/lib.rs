//! bt2amp - bridges a BLE MIDI footswitch to a guitar-amp control
//! dispatcher.
//!
//! The library holds all protocol logic and is testable on the host
//! with plain `cargo test` (no embedded hardware required). The
//! embedded binary (`src/main.rs`, behind the `embedded` feature)
//! adapts it to an nRF52840 running the Nordic SoftDevice S140 in the
//! Central role.
//!
//! Layout:
//!
//! - [`ble`] - scan filtering, session bookkeeping, and the
//!   event-driven GATT client state machine that finds the footswitch,
//!   subscribes to its MIDI characteristic, and recovers on disconnect.
//! - [`midi`] - BLE-MIDI notification decoding plus the wired serial
//!   MIDI input scanner.
//! - [`footswitch`] - debounce machine for the two wired switches.
//! - [`control`] - the narrow seam toward the amp control dispatcher.

#![cfg_attr(not(test), no_std)]

mod fmt;

pub mod ble;
pub mod config;
pub mod control;
pub mod error;
pub mod footswitch;
pub mod midi;
