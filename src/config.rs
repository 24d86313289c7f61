//! Application-wide constants and compile-time configuration.
//!
//! All protocol constants and timing parameters live here so they can
//! be tuned in one place. The BLE values must match the physical
//! footswitch peripheral.

// BLE footswitch peripheral

/// Complete local name the footswitch advertises (M-Vave Chocolate).
/// Matching is exact: same length, same bytes.
pub const TARGET_DEVICE_NAME: &[u8] = b"FootCtrl";

/// BLE-MIDI I/O characteristic on the footswitch,
/// `7772e5db-3868-4112-a1a9-f2669d106bf3`.
pub const MIDI_CHARACTERISTIC_UUID: u128 = 0x7772e5db_3868_4112_a1a9_f2669d106bf3;

/// Client Characteristic Configuration descriptor (Bluetooth SIG, 16-bit).
pub const CCCD_UUID: u16 = 0x2902;

/// Value written to the CCCD to enable notifications (little-endian u16).
pub const NOTIFY_ENABLE: u16 = 1;

/// Length of the incrementing pattern written to the MIDI
/// characteristic once the subscription is up (compatibility write of
/// unclear intent, preserved from the original bring-up sequence).
pub const PATTERN_WRITE_LEN: usize = 35;

/// ATT MTU requested once a connection is open.
pub const REQUESTED_MTU: u16 = 200;

// Scanning

/// Scan interval in 0.625 ms units.
pub const SCAN_INTERVAL: u16 = 0x50;

/// Scan window in 0.625 ms units.
pub const SCAN_WINDOW: u16 = 0x30;

/// Upper bound on one scan cycle. The stack stops scanning on its own
/// when this expires; the driver only re-arms scanning from the
/// disconnect path.
pub const SCAN_DURATION: u16 = 1800;

// Discovery buffers
//
// Transient lookup results live in fixed-capacity stack buffers; a
// peripheral exceeding these bounds is reported as an overflow rather
// than allocated for.

/// Most characteristics one UUID lookup may return.
pub const MAX_CHARACTERISTICS: usize = 4;

/// Most descriptors one characteristic lookup may return.
pub const MAX_DESCRIPTORS: usize = 4;

// Wired MIDI (DIN input)

/// Standard MIDI baud rate.
pub const SERIAL_MIDI_BAUD: u32 = 31250;

/// MIDI channel (0-based) the wired input listens on.
pub const SERIAL_MIDI_CHANNEL: u8 = 0;

// Wired footswitches

/// Sampling period for the two footswitch inputs (ms).
pub const FOOTSWITCH_SAMPLE_MS: u64 = 20;

/// Consecutive released samples required before a switch re-arms.
pub const FOOTSWITCH_RELEASE_SAMPLES: u32 = 5;
