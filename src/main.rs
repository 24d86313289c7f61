//! nRF52840 firmware entry point.
//!
//! Task layout:
//! - `softdevice_task` - runs the SoftDevice event loop.
//! - `ble_task` - scan / connect / subscribe / listen cycle for the
//!   BLE-MIDI footswitch, forever.
//! - `serial_midi_task` - wired DIN MIDI input over UARTE.
//! - `footswitch_task` - two wired preset-step switches.
//! - `control_task` - consumes the control channel; drives the
//!   Bluetooth status LED and hands preset requests to the amp link.

#![no_std]
#![no_main]

use bt2amp::ble::{scanner, softdevice};
use bt2amp::config::{FOOTSWITCH_SAMPLE_MS, SERIAL_MIDI_BAUD, SERIAL_MIDI_CHANNEL};
use bt2amp::control::ControlMessage;
use bt2amp::footswitch::Footswitches;
use bt2amp::midi;
use core::mem;
use defmt::{info, unwrap, warn};
use embassy_executor::Spawner;
use embassy_nrf::gpio::{Input, Level, Output, OutputDrive, Pull};
use embassy_nrf::interrupt::{self, InterruptExt, Priority};
use embassy_nrf::peripherals::UARTE0;
use embassy_nrf::uarte::{self, UarteRx};
use embassy_nrf::{bind_interrupts, peripherals};
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::{Channel, Receiver, Sender};
use embassy_time::{Duration, Timer};
use nrf_softdevice::{raw, Softdevice};
use {defmt_rtt as _, panic_probe as _};

bind_interrupts!(struct Irqs {
    UARTE0_UART0 => uarte::InterruptHandler<UARTE0>;
});

/// Control channel between the input drivers and the dispatcher.
static CONTROL: Channel<CriticalSectionRawMutex, ControlMessage, 8> = Channel::new();

// The UARTE below is hardwired to the standard MIDI baud rate.
const _: () = assert!(SERIAL_MIDI_BAUD == 31250);

#[embassy_executor::task]
async fn softdevice_task(sd: &'static Softdevice) -> ! {
    sd.run().await
}

/// Scan / connect / subscribe / listen, forever.
#[embassy_executor::task]
async fn ble_task(
    sd: &'static Softdevice,
    control_tx: Sender<'static, CriticalSectionRawMutex, ControlMessage, 8>,
) -> ! {
    loop {
        let addr = scanner::find_footswitch(sd).await;

        let conn = match softdevice::connect(sd, &addr).await {
            Ok(conn) => conn,
            Err(_) => {
                warn!("connection open failed, rescanning");
                continue;
            }
        };

        let client = match softdevice::subscribe(&conn).await {
            Ok(client) => client,
            Err(_) => {
                warn!("subscription failed, rescanning");
                continue;
            }
        };

        control_tx.send(ControlMessage::BtStatus(true)).await;
        softdevice::run_midi_loop(&conn, &client, &control_tx).await;
        control_tx.send(ControlMessage::BtStatus(false)).await;
    }
}

/// Wired DIN MIDI input: scan each received chunk for Program Changes.
#[embassy_executor::task]
async fn serial_midi_task(
    mut rx: UarteRx<'static, UARTE0>,
    control_tx: Sender<'static, CriticalSectionRawMutex, ControlMessage, 8>,
) -> ! {
    let mut byte = [0u8; 1];
    let mut pending: heapless::Vec<u8, 16> = heapless::Vec::new();

    loop {
        if rx.read(&mut byte).await.is_err() {
            warn!("UARTE read error");
            continue;
        }

        if pending.push(byte[0]).is_err() {
            // No Program Change in a full window; start over.
            pending.clear();
            continue;
        }

        // Only rescan once the stream is not mid-message, so the
        // scanner never sees a status byte with its data still in
        // flight.
        if byte[0] >= 0x80 && byte[0] < 0xF8 {
            continue;
        }

        let presets = midi::serial::program_changes(&pending, SERIAL_MIDI_CHANNEL);
        if !presets.is_empty() {
            pending.clear();
            for preset in presets {
                control_tx.send(ControlMessage::PresetIndex(preset)).await;
            }
        }
    }
}

/// Two wired switches stepping the preset down / up.
#[embassy_executor::task]
async fn footswitch_task(
    down: Input<'static, peripherals::P0_11>,
    up: Input<'static, peripherals::P0_12>,
    control_tx: Sender<'static, CriticalSectionRawMutex, ControlMessage, 8>,
) -> ! {
    let mut switches = Footswitches::new();

    loop {
        Timer::after(Duration::from_millis(FOOTSWITCH_SAMPLE_MS)).await;
        // Active low.
        if let Some(step) = switches.sample(down.is_low(), up.is_low()) {
            control_tx.send(ControlMessage::PresetStep(step)).await;
        }
    }
}

/// Dispatcher stub: status LED plus the amp-link handoff point.
#[embassy_executor::task]
async fn control_task(
    mut bt_led: Output<'static, peripherals::P0_13>,
    control_rx: Receiver<'static, CriticalSectionRawMutex, ControlMessage, 8>,
) -> ! {
    loop {
        match control_rx.receive().await {
            ControlMessage::BtStatus(connected) => {
                if connected {
                    bt_led.set_high();
                } else {
                    bt_led.set_low();
                }
                info!("bluetooth status: {}", connected);
            }
            ControlMessage::PresetIndex(index) => {
                info!("preset request: {}", index);
            }
            ControlMessage::PresetStep(step) => {
                info!("preset step: {}", step);
            }
        }
    }
}

fn softdevice_config() -> nrf_softdevice::Config {
    nrf_softdevice::Config {
        clock: Some(raw::nrf_clock_lf_cfg_t {
            source: raw::NRF_CLOCK_LF_SRC_XTAL as u8,
            rc_ctiv: 0,
            rc_temp_ctiv: 0,
            accuracy: raw::NRF_CLOCK_LF_ACCURACY_20_PPM as u8,
        }),
        conn_gap: Some(raw::ble_gap_conn_cfg_t {
            conn_count: 1,
            event_length: 24,
        }),
        conn_gatt: Some(raw::ble_gatt_conn_cfg_t {
            att_mtu: bt2amp::config::REQUESTED_MTU,
        }),
        gatts_attr_tab_size: Some(raw::ble_gatts_cfg_attr_tab_size_t {
            attr_tab_size: raw::BLE_GATTS_ATTR_TAB_SIZE_DEFAULT,
        }),
        gap_role_count: Some(raw::ble_gap_cfg_role_count_t {
            adv_set_count: 0,
            periph_role_count: 0,
            central_role_count: 1,
            central_sec_count: 0,
            _bitfield_1: raw::ble_gap_cfg_role_count_t::new_bitfield_1(0),
        }),
        gap_device_name: Some(raw::ble_gap_cfg_device_name_t {
            p_value: b"bt2amp" as *const u8 as _,
            current_len: 6,
            max_len: 6,
            write_perm: unsafe { mem::zeroed() },
            _bitfield_1: raw::ble_gap_cfg_device_name_t::new_bitfield_1(
                raw::BLE_GATTS_VLOC_STACK as u8,
            ),
        }),
        ..Default::default()
    }
}

#[embassy_executor::main]
async fn main(spawner: Spawner) {
    // The SoftDevice reserves the highest interrupt priorities; keep
    // the application below them.
    let mut config = embassy_nrf::config::Config::default();
    config.gpiote_interrupt_priority = Priority::P2;
    config.time_interrupt_priority = Priority::P2;
    let p = embassy_nrf::init(config);

    info!("bt2amp starting");

    let sd: &'static Softdevice = Softdevice::enable(&softdevice_config());

    // Wired DIN MIDI input at the standard baud rate.
    let mut uarte_config = uarte::Config::default();
    uarte_config.baudrate = uarte::Baudrate::BAUD31250;
    interrupt::UARTE0_UART0.set_priority(Priority::P3);
    let uart = uarte::Uarte::new(p.UARTE0, Irqs, p.P0_08, p.P0_06, uarte_config);
    let (_tx, rx) = uart.split();

    let down = Input::new(p.P0_11, Pull::Up);
    let up = Input::new(p.P0_12, Pull::Up);
    let bt_led = Output::new(p.P0_13, Level::Low, OutputDrive::Standard);

    unwrap!(spawner.spawn(softdevice_task(sd)));
    unwrap!(spawner.spawn(ble_task(sd, CONTROL.sender())));
    unwrap!(spawner.spawn(serial_midi_task(rx, CONTROL.sender())));
    unwrap!(spawner.spawn(footswitch_task(down, up, CONTROL.sender())));
    unwrap!(spawner.spawn(control_task(bt_led, CONTROL.receiver())));
}
