//! Connection session state.
//!
//! One [`Session`] exists for the lifetime of the driver. Fields fill
//! in as protocol stages complete and are invalidated again when the
//! footswitch disconnects; the object itself is reused for the next
//! attempt.

use crate::ble::PeerAddress;

/// Attribute handle range; accumulated across service results to the
/// minimal range spanning every discovered service.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct HandleRange {
    pub start: u16,
    pub end: u16,
}

impl HandleRange {
    /// Degenerate range that matches nothing; widening folds service
    /// results into it in any order.
    pub const EMPTY: HandleRange = HandleRange {
        start: 0xFFFF,
        end: 0,
    };

    pub const fn new(start: u16, end: u16) -> Self {
        HandleRange { start, end }
    }

    /// Fold another service's range in: minimum start, maximum end.
    /// Safe because handle ranges on one peripheral are non-overlapping
    /// and monotonically increasing.
    pub fn widen(&mut self, other: HandleRange) {
        if other.start < self.start {
            self.start = other.start;
        }
        if other.end > self.end {
            self.end = other.end;
        }
    }

    pub fn is_empty(&self) -> bool {
        self.start > self.end
    }
}

/// Canonical protocol stage of the footswitch link.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LinkState {
    /// Stack registration not finished yet.
    Idle,
    Scanning,
    /// Connection open request in flight; blocks further connect
    /// attempts on repeat advertisement sightings.
    Connecting,
    /// Waiting for MTU negotiation to complete.
    MtuExchange,
    /// Service/characteristic/descriptor discovery in progress.
    Discovering,
    /// CCCD written; notifications flowing.
    Subscribed,
}

/// The single footswitch session.
pub struct Session {
    pub state: LinkState,
    /// Connection handle; only meaningful while connected.
    pub conn: u16,
    /// Identity of the tracked footswitch, set on successful open.
    pub peer: Option<PeerAddress>,
    /// Combined handle range over all discovered services; meaningless
    /// before the first service result of an attempt.
    pub services: HandleRange,
    /// Handle of the resolved MIDI characteristic.
    pub midi_char: Option<u16>,
    /// CCCD write completed; the peripheral is pushing notifications.
    pub subscribed: bool,
    /// Stop-scan was already issued for this connected session.
    pub stop_scan_requested: bool,
    /// At least one service result arrived for this attempt.
    pub found_services: bool,
}

impl Session {
    pub const fn new() -> Self {
        Session {
            state: LinkState::Idle,
            conn: 0,
            peer: None,
            services: HandleRange::EMPTY,
            midi_char: None,
            subscribed: false,
            stop_scan_requested: false,
            found_services: false,
        }
    }

    /// Scan-filter guard: a connection open is in flight.
    pub fn is_connecting(&self) -> bool {
        self.state == LinkState::Connecting
    }

    /// A link is open (whatever discovery stage it is in).
    pub fn is_connected(&self) -> bool {
        matches!(
            self.state,
            LinkState::MtuExchange | LinkState::Discovering | LinkState::Subscribed
        )
    }

    /// Drop everything tied to the lost connection and fall back to
    /// scanning. The session object itself lives on.
    pub fn invalidate(&mut self) {
        self.state = LinkState::Scanning;
        self.conn = 0;
        self.peer = None;
        self.services = HandleRange::EMPTY;
        self.midi_char = None;
        self.subscribed = false;
        self.stop_scan_requested = false;
        self.found_services = false;
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ble::AddrKind;

    #[test]
    fn widen_accumulates_min_start_max_end() {
        let mut range = HandleRange::EMPTY;
        range.widen(HandleRange::new(10, 20));
        range.widen(HandleRange::new(5, 8));
        assert_eq!(range, HandleRange::new(5, 20));
    }

    #[test]
    fn widen_is_order_independent() {
        let mut forward = HandleRange::EMPTY;
        forward.widen(HandleRange::new(10, 20));
        forward.widen(HandleRange::new(5, 8));

        let mut reverse = HandleRange::EMPTY;
        reverse.widen(HandleRange::new(5, 8));
        reverse.widen(HandleRange::new(10, 20));

        assert_eq!(forward, reverse);
        assert_eq!(forward, HandleRange::new(5, 20));
    }

    #[test]
    fn empty_range_matches_nothing() {
        assert!(HandleRange::EMPTY.is_empty());
        assert!(!HandleRange::new(1, 1).is_empty());
    }

    #[test]
    fn invalidate_resets_discovery_fields() {
        let mut session = Session::new();
        session.state = LinkState::Subscribed;
        session.conn = 3;
        session.peer = Some(PeerAddress {
            bytes: [1, 2, 3, 4, 5, 6],
            kind: AddrKind::Public,
        });
        session.services = HandleRange::new(100, 150);
        session.midi_char = Some(142);
        session.subscribed = true;
        session.found_services = true;
        session.stop_scan_requested = true;

        session.invalidate();

        assert_eq!(session.state, LinkState::Scanning);
        assert_eq!(session.peer, None);
        assert_eq!(session.services, HandleRange::EMPTY);
        assert_eq!(session.midi_char, None);
        assert!(!session.subscribed);
        assert!(!session.stop_scan_requested);
        assert!(!session.found_services);
    }
}
