//! BLE GAP scanner - finds the footswitch by its advertised name.
//!
//! Uses the SoftDevice Central-role scanning API. Reports are filtered
//! on the Complete Local Name field only; nothing else in the payload
//! matters for the match.

use crate::ble::adv_parser;
use crate::config::{SCAN_DURATION, SCAN_INTERVAL, SCAN_WINDOW, TARGET_DEVICE_NAME};
use nrf_softdevice::ble::{central, Address};
use nrf_softdevice::Softdevice;

/// Scan until the footswitch is sighted and return its address.
///
/// Scan passes are retried indefinitely: the footswitch may be powered
/// off for hours, and there is nothing else for the radio to do.
pub async fn find_footswitch(sd: &Softdevice) -> Address {
    let config = central::ScanConfig {
        // Active scan so name-in-scan-response peripherals match too.
        active: true,
        interval: SCAN_INTERVAL as u32,
        window: SCAN_WINDOW as u32,
        // The SoftDevice stops the scan on its own when this expires;
        // the loop below starts the next pass.
        timeout: SCAN_DURATION,
        ..Default::default()
    };

    loop {
        // The SoftDevice scan callback receives each advertisement;
        // returning Some stops the scan and yields the value.
        let res = central::scan(sd, &config, |params| {
            let data = unsafe {
                core::slice::from_raw_parts(params.data.p_data, params.data.len as usize)
            };

            if adv_parser::is_target_device(data, TARGET_DEVICE_NAME) {
                Some(Address::from_raw(params.peer_addr))
            } else {
                None
            }
        })
        .await;

        match res {
            Ok(addr) => {
                info!("footswitch sighted");
                return addr;
            }
            Err(_) => {
                warn!("scan pass ended without a match, restarting");
            }
        }
    }
}
