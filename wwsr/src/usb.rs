//! USB transport to the station receiver.
//!
//! With the `native-usb` feature the station is driven through libusb
//! (`rusb`). Without it, [`open_station`] always fails so the offline
//! commands (`decode`, `image`, `tags`, `config`) still work.

use wwsr_core::station::StationIo;
use wwsr_core::{DeviceId, Result};

/// Open the station identified by `device`.
#[cfg(feature = "native-usb")]
pub fn open_station(device: DeviceId) -> Result<Box<dyn StationIo>> {
    Ok(Box::new(native::UsbStation::open(device)?))
}

#[cfg(not(feature = "native-usb"))]
pub fn open_station(device: DeviceId) -> Result<Box<dyn StationIo>> {
    Err(wwsr_core::WwsrError::Usb(format!(
        "cannot open {device}: built without the `native-usb` feature"
    )))
}

#[cfg(feature = "native-usb")]
mod native {
    use log::{debug, error, warn};
    use rusb::{DeviceHandle, GlobalContext};

    use wwsr_core::station::{
        StationIo, CHUNK_SIZE, CONTROL_INDEX, CONTROL_REQUEST, CONTROL_REQUEST_TYPE,
        CONTROL_VALUE, INTERFACE, INTERRUPT_ENDPOINT, TIMEOUT,
    };
    use wwsr_core::{DeviceId, Result, WwsrError};

    fn usb_err(context: &str, e: rusb::Error) -> WwsrError {
        WwsrError::Usb(format!("{context}: {e}"))
    }

    /// An opened receiver with interface 0 claimed.
    ///
    /// The interface is released when the station is dropped.
    pub struct UsbStation {
        handle: DeviceHandle<GlobalContext>,
        device: DeviceId,
    }

    impl UsbStation {
        pub fn open(device: DeviceId) -> Result<Self> {
            debug!("Scan for device {device}");
            let devices = rusb::devices().map_err(|e| usb_err("enumerate devices", e))?;

            let found = devices.iter().find(|d| {
                d.device_descriptor()
                    .map(|desc| {
                        desc.vendor_id() == device.vendor && desc.product_id() == device.product
                    })
                    .unwrap_or(false)
            });
            let Some(usb_device) = found else {
                return Err(WwsrError::DeviceNotFound(device));
            };

            debug!(
                "Found device {device} on bus {} address {}",
                usb_device.bus_number(),
                usb_device.address()
            );
            let mut handle = usb_device
                .open()
                .map_err(|e| usb_err(&format!("open {device}"), e))?;

            match handle.kernel_driver_active(INTERFACE) {
                Ok(true) => {
                    warn!("Interface {INTERFACE} already claimed by kernel driver, detaching it");
                    handle
                        .detach_kernel_driver(INTERFACE)
                        .map_err(|e| usb_err("detach kernel driver", e))?;
                }
                Ok(false) => {}
                Err(e) => debug!("Kernel driver query not available: {e}"),
            }

            debug!("Claim interface {INTERFACE}");
            handle
                .claim_interface(INTERFACE)
                .map_err(|e| usb_err("claim interface", e))?;

            debug!("Set alt interface");
            if let Err(e) = handle.set_alternate_setting(INTERFACE, 0) {
                let _ = handle.release_interface(INTERFACE);
                return Err(usb_err("set alternate setting", e));
            }

            debug!("Device {device} opened");
            Ok(UsbStation { handle, device })
        }
    }

    impl StationIo for UsbStation {
        fn send_command(&mut self, cmd: &[u8; 8]) -> Result<()> {
            let sent = self
                .handle
                .write_control(
                    CONTROL_REQUEST_TYPE,
                    CONTROL_REQUEST,
                    CONTROL_VALUE,
                    CONTROL_INDEX,
                    cmd,
                    TIMEOUT,
                )
                .map_err(|e| usb_err("send command", e))?;
            debug!("Sent {sent} of {} bytes", cmd.len());
            Ok(())
        }

        fn read_block(&mut self, buf: &mut [u8; CHUNK_SIZE]) -> Result<usize> {
            let read = self
                .handle
                .read_interrupt(INTERRUPT_ENDPOINT, buf, TIMEOUT)
                .map_err(|e| usb_err("interrupt read", e))?;
            if read < CHUNK_SIZE {
                warn!("Short read from {}: {read} of {CHUNK_SIZE} bytes", self.device);
                buf[read..].fill(0);
            } else {
                debug!("Read {read} of {CHUNK_SIZE} bytes");
            }
            Ok(read)
        }
    }

    impl Drop for UsbStation {
        fn drop(&mut self) {
            if let Err(e) = self.handle.release_interface(INTERFACE) {
                error!("Could not release interface of {}: {e}", self.device);
            }
        }
    }
}
