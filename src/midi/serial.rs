//! Wired (DIN, 31250 baud) MIDI input scanning.
//!
//! Pulls Program Change messages addressed to one channel out of a raw
//! UART read buffer. Real-time status bytes may appear between any two
//! bytes of another message and are skipped outright; other messages
//! are skipped along with their data bytes.

use heapless::Vec;

use crate::midi::STATUS_PROGRAM_CHANGE;

/// First real-time status byte (0xF8..=0xFF carry no data).
const REALTIME_FIRST: u8 = 0xF8;

/// Most Program Changes harvested from one read buffer.
pub const MAX_PROGRAM_CHANGES: usize = 16;

/// Scan `buf` for Program Change messages on `channel` (0-based) and
/// return their program numbers in order.
///
/// A Program Change cut off at the end of the buffer is dropped.
pub fn program_changes(buf: &[u8], channel: u8) -> Vec<u8, MAX_PROGRAM_CHANGES> {
    let mut out = Vec::new();
    let mut i = 0;

    while i < buf.len() {
        let b = buf[i];

        if b >= REALTIME_FIRST {
            i += 1;
            continue;
        }

        if b & 0xF0 == STATUS_PROGRAM_CHANGE {
            // The data byte may be separated from the status by any
            // number of real-time bytes.
            let mut j = i + 1;
            while j < buf.len() && buf[j] >= REALTIME_FIRST {
                j += 1;
            }
            if j >= buf.len() {
                warn!("incomplete program change at end of buffer");
                break;
            }
            let data = buf[j];
            if data & 0x80 != 0 {
                // Interrupted by another message's status byte.
                i = j;
                continue;
            }
            if b & 0x0F == channel && out.push(data).is_err() {
                break;
            }
            i = j + 1;
            continue;
        }

        if b & 0x80 != 0 {
            // Some other message; skip up to its next status byte.
            i += 1;
            while i < buf.len() && buf[i] & 0x80 == 0 {
                i += 1;
            }
            continue;
        }

        // Stray data byte outside any message we track.
        i += 1;
    }

    out
}
