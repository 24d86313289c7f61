//! Footswitch GATT client - the protocol state machine.
//!
//! One [`FootswitchClient`] owns the session and consumes every
//! asynchronous event the BLE stack delivers, in the stack's dispatch
//! context. Each stage finishes by issuing the next request on the
//! [`BleBackend`] and returning; all waiting is implicit in the event
//! flow, so no handler ever blocks.
//!
//! Stage sequence on the happy path:
//!
//! ```text
//! Registered -> scan params -> scanning
//! AdvReport(name match) -> stop scan, connect
//! Opened -> request MTU
//! MtuConfigured -> discover services (range accumulates per result)
//! ServiceSearchComplete -> resolve MIDI characteristic, register notify
//! NotifyRegistered -> report connected, find CCCD, write enable
//! DescriptorWritten -> subscribed; compatibility write; resume scanning
//! Notification -> decode, request preset
//! Disconnected -> report disconnected, invalidate, scan again
//! ```
//!
//! Failures are handled stage-locally: the stage is logged and
//! abandoned, and the attempt makes no further progress until the
//! peripheral disconnects and scanning finds it again. Nothing beyond
//! the two [`ControlPort`] operations ever leaves the driver.

use heapless::Vec;

use crate::ble::adv_parser;
use crate::ble::backend::{BleBackend, ScanParams};
use crate::ble::session::{HandleRange, LinkState, Session};
use crate::ble::{CharacteristicInfo, DescriptorInfo, PeerAddress, Status, Uuid};
use crate::config::{
    CCCD_UUID, MAX_CHARACTERISTICS, MAX_DESCRIPTORS, MIDI_CHARACTERISTIC_UUID, NOTIFY_ENABLE,
    PATTERN_WRITE_LEN, REQUESTED_MTU, SCAN_DURATION, TARGET_DEVICE_NAME,
};
use crate::control::ControlPort;
use crate::midi::{self, MidiCommand};

/// Asynchronous events from the underlying BLE stack.
///
/// Events for one connection attempt arrive in protocol-causal order;
/// the client relies on that and validates status codes only.
#[derive(Clone, Copy, Debug)]
pub enum GattEvent<'a> {
    /// Stack registration finished; scanning can be configured.
    Registered { status: Status },
    /// Scan parameters accepted or rejected.
    ScanParamsSet { status: Status },
    ScanStarted { status: Status },
    ScanStopped { status: Status },
    /// One advertisement sighting of some candidate device.
    AdvReport { peer: PeerAddress, data: &'a [u8] },
    /// Connection open finished, either way.
    Opened {
        status: Status,
        conn: u16,
        peer: PeerAddress,
    },
    /// MTU negotiation finished, either way.
    MtuConfigured { status: Status, mtu: u16 },
    /// One service discovery result row.
    ServiceFound { range: HandleRange },
    ServiceSearchComplete { status: Status },
    /// Notification registration finished for `handle`.
    NotifyRegistered { status: Status, handle: u16 },
    DescriptorWritten { status: Status },
    CharacteristicWritten { status: Status },
    /// Notification payload from the subscribed characteristic.
    Notification { data: &'a [u8] },
    /// The peripheral's attribute table changed.
    ServiceChanged,
    /// A connection dropped; `peer` identifies whose.
    Disconnected { peer: PeerAddress },
}

/// The BLE MIDI footswitch protocol driver.
pub struct FootswitchClient {
    session: Session,
}

impl FootswitchClient {
    pub const fn new() -> Self {
        FootswitchClient {
            session: Session::new(),
        }
    }

    /// Read-only view of the session, for status display.
    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Single entry point for all stack events.
    ///
    /// Must only be called from the stack's event-dispatch context; the
    /// session is never touched from anywhere else.
    pub fn handle_event<B: BleBackend, C: ControlPort>(
        &mut self,
        event: GattEvent<'_>,
        ble: &mut B,
        control: &mut C,
    ) {
        match event {
            GattEvent::Registered { status } => self.on_registered(status, ble),
            GattEvent::ScanParamsSet { status } => self.on_scan_params_set(status, ble),
            GattEvent::ScanStarted { status } => {
                if status.failed() {
                    error!("scan start failed, status {}", status.0);
                } else {
                    debug!("scan started");
                }
            }
            GattEvent::ScanStopped { status } => {
                if status.failed() {
                    error!("scan stop failed, status {}", status.0);
                } else {
                    debug!("scan stopped");
                }
            }
            GattEvent::AdvReport { peer, data } => self.on_adv_report(peer, data, ble),
            GattEvent::Opened { status, conn, peer } => self.on_opened(status, conn, peer, ble),
            GattEvent::MtuConfigured { status, mtu } => self.on_mtu_configured(status, mtu, ble),
            GattEvent::ServiceFound { range } => {
                self.session.services.widen(range);
                self.session.found_services = true;
            }
            GattEvent::ServiceSearchComplete { status } => self.on_search_complete(status, ble),
            GattEvent::NotifyRegistered { status, handle } => {
                self.on_notify_registered(status, handle, ble, control)
            }
            GattEvent::DescriptorWritten { status } => self.on_descriptor_written(status, ble),
            GattEvent::CharacteristicWritten { status } => {
                self.on_characteristic_written(status, ble)
            }
            GattEvent::Notification { data } => self.on_notification(data, control),
            GattEvent::ServiceChanged => debug!("peripheral service table changed"),
            GattEvent::Disconnected { peer } => self.on_disconnected(peer, ble, control),
        }
    }

    fn on_registered<B: BleBackend>(&mut self, status: Status, ble: &mut B) {
        if status.failed() {
            // Fatal: without registration nothing below can run. The
            // outer supervisor has to restart us.
            error!("stack registration failed, status {}", status.0);
            return;
        }
        if ble.set_scan_params(&ScanParams::footswitch()).is_err() {
            error!("set scan params failed");
        }
    }

    fn on_scan_params_set<B: BleBackend>(&mut self, status: Status, ble: &mut B) {
        if status.failed() {
            error!("scan params rejected, status {}", status.0);
            return;
        }
        self.resume_scanning(ble);
    }

    /// Scan filter: guards first, then the exact name match.
    fn on_adv_report<B: BleBackend>(&mut self, peer: PeerAddress, data: &[u8], ble: &mut B) {
        if self.session.is_connecting() {
            return;
        }

        if self.session.is_connected() {
            // Repeat sighting while connected: stop scanning, once.
            if !self.session.stop_scan_requested {
                self.session.stop_scan_requested = true;
                info!("footswitch connected, stopping scan");
                if ble.stop_scan().is_err() {
                    warn!("stop scan request failed");
                }
            }
            return;
        }

        if !adv_parser::is_target_device(data, TARGET_DEVICE_NAME) {
            return;
        }

        info!("footswitch sighted, connecting");
        if ble.stop_scan().is_err() {
            warn!("stop scan request failed");
        }
        match ble.connect(&peer) {
            Ok(()) => self.session.state = LinkState::Connecting,
            Err(_) => error!("connection open request failed"),
        }
    }

    fn on_opened<B: BleBackend>(
        &mut self,
        status: Status,
        conn: u16,
        peer: PeerAddress,
        ble: &mut B,
    ) {
        if status.failed() {
            // Clear the in-flight guard; the next matching sighting
            // simply retries. No candidate-ordering preference exists.
            error!("connection open failed, status {}", status.0);
            self.session.state = LinkState::Scanning;
            return;
        }

        self.session.conn = conn;
        self.session.peer = Some(peer);
        self.session.state = LinkState::MtuExchange;
        info!("footswitch link open, conn {}", conn);

        if ble.request_mtu(conn, REQUESTED_MTU).is_err() {
            error!("MTU request failed");
        }
    }

    fn on_mtu_configured<B: BleBackend>(&mut self, status: Status, mtu: u16, ble: &mut B) {
        // The negotiated size is informational; discovery proceeds
        // whether or not the exchange succeeded.
        if status.failed() {
            warn!("MTU negotiation failed, status {}", status.0);
        } else {
            debug!("MTU configured: {}", mtu);
        }

        self.session.services = HandleRange::EMPTY;
        self.session.found_services = false;
        self.session.state = LinkState::Discovering;

        if ble.discover_services(self.session.conn).is_err() {
            error!("service discovery request failed");
        }
    }

    /// Discovery resolver: MIDI characteristic lookup over the combined
    /// handle range, then notification registration.
    fn on_search_complete<B: BleBackend>(&mut self, status: Status, ble: &mut B) {
        if status.failed() {
            error!("service search failed, status {}", status.0);
            return;
        }
        if !self.session.found_services {
            warn!("service search finished without results");
            return;
        }
        let Some(peer) = self.session.peer else {
            return;
        };

        let uuid = Uuid::Uuid128(MIDI_CHARACTERISTIC_UUID);
        let mut found: Vec<CharacteristicInfo, MAX_CHARACTERISTICS> = Vec::new();
        if ble
            .characteristics_by_uuid(self.session.conn, self.session.services, &uuid, &mut found)
            .is_err()
        {
            error!("MIDI characteristic lookup failed");
            return;
        }
        debug!("characteristic lookup returned {}", found.len());

        for ch in &found {
            if !ch.props.can_notify() {
                continue;
            }
            // Every notify-capable match is registered; with several
            // matches the last handle is the one tracked.
            self.session.midi_char = Some(ch.handle);
            if ble.register_notify(&peer, ch.handle).is_err() {
                error!("register for notify failed, handle {}", ch.handle);
            } else {
                info!("registered for notify on handle {}", ch.handle);
            }
        }
    }

    /// Subscription bring-up: resolve the CCCD and enable notifications.
    fn on_notify_registered<B: BleBackend, C: ControlPort>(
        &mut self,
        status: Status,
        handle: u16,
        ble: &mut B,
        control: &mut C,
    ) {
        if status.failed() {
            error!("notify registration failed, status {}", status.0);
            return;
        }

        control.set_bt_status(true);

        let Some(char_handle) = self.session.midi_char else {
            return;
        };

        let count = match ble.descriptor_count(self.session.conn, self.session.services, char_handle)
        {
            Ok(n) => n,
            Err(_) => {
                error!("descriptor count query failed");
                return;
            }
        };
        if count == 0 {
            error!("no descriptors under the MIDI characteristic");
            return;
        }

        let cccd = Uuid::Uuid16(CCCD_UUID);
        let mut descriptors: Vec<DescriptorInfo, MAX_DESCRIPTORS> = Vec::new();
        if ble
            .descriptors_by_uuid(self.session.conn, handle, &cccd, &mut descriptors)
            .is_err()
        {
            error!("descriptor lookup failed");
            return;
        }

        match descriptors.first() {
            Some(d) if d.uuid == cccd => {
                if ble
                    .write_descriptor(self.session.conn, d.handle, &NOTIFY_ENABLE.to_le_bytes())
                    .is_err()
                {
                    error!("CCCD write failed");
                }
            }
            _ => error!("client configuration descriptor not found"),
        }
    }

    fn on_descriptor_written<B: BleBackend>(&mut self, status: Status, ble: &mut B) {
        if status.failed() {
            error!("CCCD write failed, status {}", status.0);
            return;
        }

        self.session.subscribed = true;
        self.session.state = LinkState::Subscribed;
        info!("notifications enabled");

        // One fixed incrementing pattern is written back to the
        // characteristic before scanning resumes. Carried over from the
        // original bring-up sequence; whether the peripheral needs it
        // is unclear. TODO: confirm against the M-Vave Chocolate and
        // drop if it is leftover diagnostics.
        let Some(handle) = self.session.midi_char else {
            return;
        };
        let mut pattern = [0u8; PATTERN_WRITE_LEN];
        for (i, b) in pattern.iter_mut().enumerate() {
            *b = i as u8;
        }
        if ble
            .write_characteristic(self.session.conn, handle, &pattern)
            .is_err()
        {
            error!("characteristic write failed");
        }
    }

    fn on_characteristic_written<B: BleBackend>(&mut self, status: Status, ble: &mut B) {
        if status.failed() {
            warn!("characteristic write failed, status {}", status.0);
        } else {
            debug!("characteristic write done");
        }
        // The link stays up; scanning restarts regardless and the
        // connected-stop-scan guard re-arms.
        self.resume_scanning(ble);
    }

    fn on_notification<C: ControlPort>(&mut self, data: &[u8], control: &mut C) {
        if let Some(MidiCommand::ProgramChange(preset)) = midi::decode_notification(data) {
            info!("program change -> preset {}", preset);
            control.request_preset_index(preset);
        }
    }

    fn on_disconnected<B: BleBackend, C: ControlPort>(
        &mut self,
        peer: PeerAddress,
        ble: &mut B,
        control: &mut C,
    ) {
        // The indicator drops and scanning restarts for any disconnect;
        // the session is only reset when the tracked footswitch is the
        // one that went away.
        control.set_bt_status(false);

        if self.session.peer == Some(peer) {
            info!("footswitch disconnected");
            self.session.invalidate();
        }

        self.resume_scanning(ble);
    }

    fn resume_scanning<B: BleBackend>(&mut self, ble: &mut B) {
        self.session.stop_scan_requested = false;
        if !self.session.is_connected() {
            self.session.state = LinkState::Scanning;
        }
        if ble.start_scan(SCAN_DURATION).is_err() {
            error!("scan start request failed");
        }
    }
}

impl Default for FootswitchClient {
    fn default() -> Self {
        Self::new()
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// Unit Tests (run on host, not embedded)
// ═══════════════════════════════════════════════════════════════════════════
