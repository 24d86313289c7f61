//! Integration tests for bt2amp host-testable logic.

use bt2amp::ble::backend::{BleBackend, ScanParams};
use bt2amp::ble::client::{FootswitchClient, GattEvent};
use bt2amp::ble::session::HandleRange;
use bt2amp::ble::{
    AddrKind, CharProps, CharacteristicInfo, DescriptorInfo, PeerAddress, Status, Uuid,
};
use bt2amp::config::{CCCD_UUID, MIDI_CHARACTERISTIC_UUID, SERIAL_MIDI_CHANNEL, TARGET_DEVICE_NAME};
use bt2amp::control::ControlPort;
use bt2amp::error::Error;
use bt2amp::footswitch::{Footswitches, PresetStep};
use bt2amp::midi;
use heapless::Vec;

const FOOTSWITCH: PeerAddress = PeerAddress {
    bytes: [0x10, 0x20, 0x30, 0x40, 0x50, 0x60],
    kind: AddrKind::Random,
};

/// Minimal peripheral double: accepts every command, answers lookups
/// with one notify-capable MIDI characteristic and its CCCD.
#[derive(Default)]
struct FakeFootswitch {
    connects: usize,
    scans: usize,
    cccd_value: Option<[u8; 2]>,
}

impl BleBackend for FakeFootswitch {
    fn set_scan_params(&mut self, _params: &ScanParams) -> Result<(), Error> {
        Ok(())
    }

    fn start_scan(&mut self, _duration: u16) -> Result<(), Error> {
        self.scans += 1;
        Ok(())
    }

    fn stop_scan(&mut self) -> Result<(), Error> {
        Ok(())
    }

    fn connect(&mut self, _peer: &PeerAddress) -> Result<(), Error> {
        self.connects += 1;
        Ok(())
    }

    fn request_mtu(&mut self, _conn: u16, _mtu: u16) -> Result<(), Error> {
        Ok(())
    }

    fn discover_services(&mut self, _conn: u16) -> Result<(), Error> {
        Ok(())
    }

    fn characteristics_by_uuid(
        &mut self,
        _conn: u16,
        _range: HandleRange,
        _uuid: &Uuid,
        out: &mut Vec<CharacteristicInfo, 4>,
    ) -> Result<(), Error> {
        out.push(CharacteristicInfo {
            handle: 0x2A,
            uuid: Uuid::Uuid128(MIDI_CHARACTERISTIC_UUID),
            props: CharProps(CharProps::NOTIFY),
        })
        .map_err(|_| Error::BufferOverflow)
    }

    fn register_notify(&mut self, _peer: &PeerAddress, _handle: u16) -> Result<(), Error> {
        Ok(())
    }

    fn descriptor_count(
        &mut self,
        _conn: u16,
        _range: HandleRange,
        _char_handle: u16,
    ) -> Result<usize, Error> {
        Ok(1)
    }

    fn descriptors_by_uuid(
        &mut self,
        _conn: u16,
        _char_handle: u16,
        _uuid: &Uuid,
        out: &mut Vec<DescriptorInfo, 4>,
    ) -> Result<(), Error> {
        out.push(DescriptorInfo {
            handle: 0x2B,
            uuid: Uuid::Uuid16(CCCD_UUID),
        })
        .map_err(|_| Error::BufferOverflow)
    }

    fn write_descriptor(&mut self, _conn: u16, _handle: u16, value: &[u8]) -> Result<(), Error> {
        let mut v = [0u8; 2];
        v.copy_from_slice(&value[..2]);
        self.cccd_value = Some(v);
        Ok(())
    }

    fn write_characteristic(&mut self, _conn: u16, _handle: u16, _value: &[u8]) -> Result<(), Error> {
        Ok(())
    }
}

#[derive(Default)]
struct Dispatcher {
    bt_connected: Option<bool>,
    presets: std::vec::Vec<u8>,
}

impl ControlPort for Dispatcher {
    fn set_bt_status(&mut self, connected: bool) {
        self.bt_connected = Some(connected);
    }

    fn request_preset_index(&mut self, index: u8) {
        self.presets.push(index);
    }
}

fn adv_payload() -> std::vec::Vec<u8> {
    let mut data = vec![TARGET_DEVICE_NAME.len() as u8 + 1, 0x09];
    data.extend_from_slice(TARGET_DEVICE_NAME);
    data
}

/// Full lifecycle through the public API: sighting, bring-up, preset
/// presses, disconnect, and a second bring-up.
#[test]
fn footswitch_lifecycle() {
    let mut client = FootswitchClient::new();
    let mut ble = FakeFootswitch::default();
    let mut amp = Dispatcher::default();
    let adv = adv_payload();

    client.handle_event(GattEvent::Registered { status: Status::OK }, &mut ble, &mut amp);
    client.handle_event(GattEvent::ScanParamsSet { status: Status::OK }, &mut ble, &mut amp);

    for round in 0..2u8 {
        client.handle_event(
            GattEvent::AdvReport { peer: FOOTSWITCH, data: &adv },
            &mut ble,
            &mut amp,
        );
        client.handle_event(
            GattEvent::Opened { status: Status::OK, conn: 3, peer: FOOTSWITCH },
            &mut ble,
            &mut amp,
        );
        client.handle_event(
            GattEvent::MtuConfigured { status: Status::OK, mtu: 200 },
            &mut ble,
            &mut amp,
        );
        client.handle_event(
            GattEvent::ServiceFound { range: HandleRange::new(0x28, 0x30) },
            &mut ble,
            &mut amp,
        );
        client.handle_event(
            GattEvent::ServiceSearchComplete { status: Status::OK },
            &mut ble,
            &mut amp,
        );
        client.handle_event(
            GattEvent::NotifyRegistered { status: Status::OK, handle: 0x2A },
            &mut ble,
            &mut amp,
        );
        client.handle_event(
            GattEvent::DescriptorWritten { status: Status::OK },
            &mut ble,
            &mut amp,
        );

        assert_eq!(amp.bt_connected, Some(true));
        assert_eq!(ble.cccd_value, Some([0x01, 0x00]));

        client.handle_event(
            GattEvent::Notification { data: &[0x80, 0x80, 0xC0, 7 + round] },
            &mut ble,
            &mut amp,
        );

        client.handle_event(
            GattEvent::Disconnected { peer: FOOTSWITCH },
            &mut ble,
            &mut amp,
        );
        assert_eq!(amp.bt_connected, Some(false));
    }

    assert_eq!(amp.presets, vec![7, 8]);
    assert_eq!(ble.connects, 2);
    assert!(ble.scans >= 3); // initial + after each disconnect
}

#[test]
fn control_change_frames_never_reach_the_dispatcher() {
    let mut client = FootswitchClient::new();
    let mut ble = FakeFootswitch::default();
    let mut amp = Dispatcher::default();

    client.handle_event(
        GattEvent::Notification { data: &[0x80, 0x80, 0xB0, 0x40] },
        &mut ble,
        &mut amp,
    );

    assert!(amp.presets.is_empty());
}

#[test]
fn wired_midi_program_change_scan() {
    // Realtime clock bytes interleaved inside a Program Change.
    let stream = [0xF8, 0xC0, 0xF8, 0x09, 0xFE];
    let presets = midi::serial::program_changes(&stream, SERIAL_MIDI_CHANNEL);
    assert_eq!(presets.as_slice(), &[9]);
}

#[test]
fn wired_footswitch_steps_once_per_press() {
    let mut switches = Footswitches::new();

    assert_eq!(switches.sample(true, false), Some(PresetStep::Down));
    for _ in 0..10 {
        assert_eq!(switches.sample(true, false), None); // held
    }
    for _ in 0..5 {
        assert_eq!(switches.sample(false, false), None); // releasing
    }
    assert_eq!(switches.sample(false, true), Some(PresetStep::Up));
}
