//! Command surface toward the underlying BLE stack.
//!
//! The protocol client only ever talks to the stack through
//! [`BleBackend`]. Requests are non-blocking: each one either fails
//! immediately or completes later as a [`GattEvent`] delivered back to
//! the client. Lookups into the stack's attribute cache
//! (characteristics, descriptors) return synchronously.
//!
//! [`GattEvent`]: crate::ble::client::GattEvent

use heapless::Vec;

use crate::ble::session::HandleRange;
use crate::ble::{CharacteristicInfo, DescriptorInfo, PeerAddress, Uuid};
use crate::config::{MAX_CHARACTERISTICS, MAX_DESCRIPTORS, SCAN_INTERVAL, SCAN_WINDOW};
use crate::error::Error;

/// Scan parameters pushed to the stack before scanning starts.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ScanParams {
    /// Active scanning (request scan responses).
    pub active: bool,
    /// Interval in 0.625 ms units.
    pub interval: u16,
    /// Window in 0.625 ms units.
    pub window: u16,
    /// Let the stack suppress duplicate reports. Disabled here: repeat
    /// sightings drive the connected-stop-scan guard.
    pub filter_duplicates: bool,
}

impl ScanParams {
    /// The footswitch link's fixed scan configuration.
    pub const fn footswitch() -> Self {
        ScanParams {
            active: true,
            interval: SCAN_INTERVAL,
            window: SCAN_WINDOW,
            filter_duplicates: false,
        }
    }
}

/// Operations the protocol client issues against the BLE stack.
///
/// Implementations must not block; they run inside the stack's own
/// event-dispatch context.
pub trait BleBackend {
    /// Push scan parameters; completes as `ScanParamsSet`.
    fn set_scan_params(&mut self, params: &ScanParams) -> Result<(), Error>;

    /// Start scanning for at most `duration` time-units; completes as
    /// `ScanStarted`, reports arrive as `AdvReport`.
    fn start_scan(&mut self, duration: u16) -> Result<(), Error>;

    /// Stop an active scan; completes as `ScanStopped`.
    fn stop_scan(&mut self) -> Result<(), Error>;

    /// Open a connection to `peer`; completes as `Opened`.
    fn connect(&mut self, peer: &PeerAddress) -> Result<(), Error>;

    /// Negotiate the ATT MTU; completes as `MtuConfigured`.
    fn request_mtu(&mut self, conn: u16, mtu: u16) -> Result<(), Error>;

    /// Enumerate every service on the peripheral (no UUID filter).
    /// Each service arrives as `ServiceFound`, then
    /// `ServiceSearchComplete`.
    fn discover_services(&mut self, conn: u16) -> Result<(), Error>;

    /// Look up characteristics by UUID within `range` from the stack's
    /// attribute cache. `Error::BufferOverflow` if more than
    /// `MAX_CHARACTERISTICS` match.
    fn characteristics_by_uuid(
        &mut self,
        conn: u16,
        range: HandleRange,
        uuid: &Uuid,
        out: &mut Vec<CharacteristicInfo, MAX_CHARACTERISTICS>,
    ) -> Result<(), Error>;

    /// Register for notifications on `handle`; completes as
    /// `NotifyRegistered`.
    fn register_notify(&mut self, peer: &PeerAddress, handle: u16) -> Result<(), Error>;

    /// Count descriptors under `char_handle` within `range`.
    fn descriptor_count(
        &mut self,
        conn: u16,
        range: HandleRange,
        char_handle: u16,
    ) -> Result<usize, Error>;

    /// Look up descriptors under `char_handle` filtered by UUID.
    /// `Error::BufferOverflow` if more than `MAX_DESCRIPTORS` match.
    fn descriptors_by_uuid(
        &mut self,
        conn: u16,
        char_handle: u16,
        uuid: &Uuid,
        out: &mut Vec<DescriptorInfo, MAX_DESCRIPTORS>,
    ) -> Result<(), Error>;

    /// Write a descriptor value with response; completes as
    /// `DescriptorWritten`.
    fn write_descriptor(&mut self, conn: u16, handle: u16, value: &[u8]) -> Result<(), Error>;

    /// Write a characteristic value with response; completes as
    /// `CharacteristicWritten`.
    fn write_characteristic(&mut self, conn: u16, handle: u16, value: &[u8]) -> Result<(), Error>;
}
