//! Unified error type for bt2amp.
//!
//! No `alloc` - all error variants carry only fixed-size data, so the
//! type stays `Copy`-friendly and cheap to log.

/// Top-level error type used across the application.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    /// The stack returned a BLE-level error.
    Ble(BleError),

    /// A fixed-capacity discovery buffer was too small for the
    /// peripheral's attribute table.
    BufferOverflow,
}

/// BLE-level failures the driver handles stage-locally.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BleError {
    /// Connection open request could not be issued.
    ConnectFailed,
    /// Service or characteristic discovery failed.
    DiscoveryFailed,
    /// Notification registration failed.
    NotifyFailed,
    /// Descriptor or characteristic write failed.
    WriteFailed,
}

// Convenience conversions

impl From<BleError> for Error {
    fn from(e: BleError) -> Self {
        Error::Ble(e)
    }
}
