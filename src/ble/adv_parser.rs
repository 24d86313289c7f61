//! Advertisement payload parsing.
//!
//! Raw advertisement data is a run of length-prefixed AD structures:
//! `len | type | len-1 payload bytes`. The footswitch is identified by
//! its Complete Local Name field alone.

/// AD type: Complete Local Name.
const AD_TYPE_NAME_COMPLETE: u8 = 0x09;

/// Find the Complete Local Name field in raw advertisement data.
///
/// Shortened names (AD type 0x08) deliberately do not count: matching
/// against a truncated name could pull in lookalike peripherals.
pub fn complete_local_name(data: &[u8]) -> Option<&[u8]> {
    let mut i = 0;
    while i < data.len() {
        let len = data[i] as usize;
        if len == 0 || i + len >= data.len() {
            break;
        }
        if data[i + 1] == AD_TYPE_NAME_COMPLETE {
            return Some(&data[i + 2..i + 1 + len]);
        }
        i += len + 1;
    }
    None
}

/// Exact-match test against the configured footswitch name: same
/// length, same bytes. Prefix or substring sightings do not match.
pub fn is_target_device(data: &[u8], target: &[u8]) -> bool {
    complete_local_name(data) == Some(target)
}

// ═══════════════════════════════════════════════════════════════════════════
// Unit Tests (run on host, not embedded)
// ═══════════════════════════════════════════════════════════════════════════
