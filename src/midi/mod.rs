//! MIDI message decoding.
//!
//! Two inputs produce preset changes: BLE-MIDI notification frames from
//! the wireless footswitch (decoded here) and the wired DIN input
//! ([`serial`]). Both decoders are pure functions with no state.

pub mod serial;

/// Both sentinel bytes (BLE-MIDI header + timestamp) the footswitch
/// puts in front of every message.
const BLE_MIDI_SENTINEL: [u8; 2] = [0x80, 0x80];

/// MIDI Program Change status (channel bits masked off on the wire).
pub(crate) const STATUS_PROGRAM_CHANGE: u8 = 0xC0;

/// MIDI Control Change status; the footswitch sends this for bank
/// switching.
const STATUS_CONTROL_CHANGE: u8 = 0xB0;

/// A logical command decoded from the footswitch.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MidiCommand {
    /// Select the 0-based preset index.
    ProgramChange(u8),
}

/// Decode one BLE-MIDI notification frame into at most one command.
///
/// A valid frame is 4+ bytes: `0x80 0x80`, a status byte, one data
/// byte. Trailing bytes are ignored. Control Change (bank select on
/// this peripheral) is recognized but not acted on yet.
pub fn decode_notification(data: &[u8]) -> Option<MidiCommand> {
    if data.len() < 4 {
        return None;
    }
    if data[0] != BLE_MIDI_SENTINEL[0] || data[1] != BLE_MIDI_SENTINEL[1] {
        return None;
    }

    match data[2] {
        STATUS_PROGRAM_CHANGE => Some(MidiCommand::ProgramChange(data[3])),
        STATUS_CONTROL_CHANGE => {
            // Bank change from the footswitch; reserved for future
            // bank switching support.
            None
        }
        _ => None,
    }
}
