//! Bluetooth Low Energy subsystem.
//!
//! Drives a single GATT-client link to the wireless MIDI footswitch:
//!
//! 1. **Advertisement filter** ([`adv_parser`]) - matches scan reports
//!    against the footswitch's complete local name.
//! 2. **Session** ([`session`]) - the one connection's state: link
//!    stage, combined service handle range, resolved characteristic.
//! 3. **Backend** ([`backend`]) - the narrow command surface toward the
//!    underlying BLE stack; completions come back as events.
//! 4. **Client** ([`client`]) - the event-driven state machine that
//!    sequences scan, connect, MTU, discovery, subscription, and the
//!    disconnect/rescan recovery loop.
//!
//! Everything here is transport-agnostic and host-testable; the
//! SoftDevice adapter lives behind the `embedded` feature.

pub mod adv_parser;
pub mod backend;
pub mod client;
pub mod session;

#[cfg(feature = "embedded")]
pub mod scanner;
#[cfg(feature = "embedded")]
pub mod softdevice;

/// Address type bit from an advertisement report.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AddrKind {
    Public,
    Random,
}

/// 6-byte peripheral identity as delivered by the stack.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PeerAddress {
    pub bytes: [u8; 6],
    pub kind: AddrKind,
}

/// Status code attached to completion events; zero is success,
/// anything else is the stack's error code for the stage.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Status(pub u8);

impl Status {
    pub const OK: Status = Status(0);

    pub fn failed(self) -> bool {
        self.0 != 0
    }
}

/// 16-bit or 128-bit attribute UUID.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Uuid {
    Uuid16(u16),
    Uuid128(u128),
}

/// GATT characteristic property bits.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CharProps(pub u8);

impl CharProps {
    pub const NOTIFY: u8 = 0x10;

    pub fn can_notify(self) -> bool {
        self.0 & Self::NOTIFY != 0
    }
}

/// One row from a characteristic lookup.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CharacteristicInfo {
    pub handle: u16,
    pub uuid: Uuid,
    pub props: CharProps,
}

/// One row from a descriptor lookup.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DescriptorInfo {
    pub handle: u16,
    pub uuid: Uuid,
}
