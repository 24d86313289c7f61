//! Seam toward the amp control dispatcher.
//!
//! The dispatcher itself (command queue, USB amp link, display) is a
//! separate subsystem; this crate only ever calls the two operations
//! below and pushes [`ControlMessage`]s across a channel in the
//! embedded build.

use crate::footswitch::PresetStep;

/// Outbound operations the protocol driver invokes on the dispatcher.
///
/// Implementations must not block: they are called from the BLE stack's
/// event-dispatch context.
pub trait ControlPort {
    /// Bluetooth link indicator: `true` once notification registration
    /// succeeds, `false` when the tracked footswitch disconnects.
    fn set_bt_status(&mut self, connected: bool);

    /// Select the 0-based preset, once per decoded Program Change.
    fn request_preset_index(&mut self, index: u8);
}

/// Messages carried over the control channel in the embedded build.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ControlMessage {
    /// Bluetooth link indicator changed.
    BtStatus(bool),
    /// Absolute preset selection (BLE or wired MIDI).
    PresetIndex(u8),
    /// Relative preset step from a wired footswitch.
    PresetStep(PresetStep),
}
