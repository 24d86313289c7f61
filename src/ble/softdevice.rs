//! SoftDevice binding for the BLE-MIDI link.
//!
//! After GAP connection is established, this module:
//! 1. Discovers the BLE-MIDI service (`03b80e5a-ede8-4b33-a751-6ce34ec4c700`).
//! 2. Enables CCCD notifications on the MIDI I/O characteristic.
//! 3. Decodes each notification and forwards preset selections to the
//!    control channel.

use crate::config::{PATTERN_WRITE_LEN, SCAN_INTERVAL, SCAN_WINDOW};
use crate::control::ControlMessage;
use crate::error::BleError;
use crate::midi::{self, MidiCommand};
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Sender;
use heapless::Vec;
use nrf_softdevice::ble::{central, gatt_client, Address, Connection};
use nrf_softdevice::Softdevice;

/// nrf-softdevice GATT client struct for the BLE-MIDI service.
///
/// The `#[nrf_softdevice::gatt_client]` macro generates discovery and
/// write/notify helpers for the listed characteristic.
#[nrf_softdevice::gatt_client(uuid = "03b80e5a-ede8-4b33-a751-6ce34ec4c700")]
pub struct MidiServiceClient {
    /// MIDI I/O - notifications carry live footswitch frames.
    #[characteristic(uuid = "7772e5db-3868-4112-a1a9-f2669d106bf3", write, notify)]
    pub midi_io: Vec<u8, 64>,
}

/// Connect to a previously sighted footswitch.
pub async fn connect(sd: &Softdevice, addr: &Address) -> Result<Connection, BleError> {
    let whitelist = [addr];
    let config = central::ConnectConfig {
        scan_config: central::ScanConfig {
            whitelist: Some(&whitelist),
            interval: SCAN_INTERVAL as u32,
            window: SCAN_WINDOW as u32,
            ..Default::default()
        },
        ..Default::default()
    };

    let conn = central::connect(sd, &config)
        .await
        .map_err(|_| BleError::ConnectFailed)?;

    info!("footswitch link open");
    Ok(conn)
}

/// Discover the MIDI service and enable notifications.
///
/// Returns the client on success so the caller can run the
/// notification loop for the lifetime of the subscription.
pub async fn subscribe(conn: &Connection) -> Result<MidiServiceClient, BleError> {
    // The SoftDevice negotiates the ATT MTU on its own, up to the
    // att_mtu configured at enable time (200 bytes). A peripheral that
    // declines stays at the default 23, which still fits every
    // footswitch frame.
    let client: MidiServiceClient = gatt_client::discover(conn)
        .await
        .map_err(|_| BleError::DiscoveryFailed)?;

    info!("MIDI service discovered");

    client
        .midi_io_cccd_write(true)
        .await
        .map_err(|_| BleError::NotifyFailed)?;

    info!("notifications enabled");

    // One fixed incrementing pattern is written back before listening.
    // Carried over from the original bring-up sequence; whether the
    // peripheral needs it is unclear. TODO: confirm against the M-Vave
    // Chocolate and drop if it is leftover diagnostics.
    let mut pattern: Vec<u8, 64> = Vec::new();
    for i in 0..PATTERN_WRITE_LEN {
        let _ = pattern.push(i as u8);
    }
    if client.midi_io_write(&pattern).await.is_err() {
        warn!("compatibility write failed");
    }

    Ok(client)
}

/// Run the notification listener loop.
///
/// Blocks until the connection drops. Each decoded Program Change is
/// sent to `control_tx` for the amp dispatcher to consume.
pub async fn run_midi_loop(
    conn: &Connection,
    client: &MidiServiceClient,
    control_tx: &Sender<'_, CriticalSectionRawMutex, ControlMessage, 8>,
) {
    info!("MIDI notification loop started");

    let _result = gatt_client::run(conn, client, |event| match event {
        MidiServiceClientEvent::MidiIoNotification(data) => {
            if let Some(MidiCommand::ProgramChange(preset)) = midi::decode_notification(&data) {
                info!("program change -> preset {}", preset);
                // try_send avoids blocking the SoftDevice event context;
                // if the dispatcher is behind, we drop.
                if control_tx
                    .try_send(ControlMessage::PresetIndex(preset))
                    .is_err()
                {
                    warn!("control channel full - dropping preset request");
                }
            }
        }
    })
    .await;

    info!("MIDI notification loop ended (connection closed)");
}
