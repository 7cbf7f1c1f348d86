//! Decoder for the scan protocol of the YDLiDAR G2.
//!
//! [`ScanSession`] owns the serial device, negotiates continuous scan mode and
//! runs a worker that turns the raw byte stream into [`ScanPacket`]s with
//! calibrated per-sample angles.
//!
//! ```no_run
//! use ydlidar_g2_driver::{DriverConfig, ScanSession};
//!
//! let mut session = ScanSession::open("/dev/ttyUSB0", DriverConfig::default())?;
//! for item in session.start_scan()?.take(100) {
//!     match item {
//!         Ok(packet) => println!("{} samples", packet.samples.len()),
//!         Err(e) => eprintln!("{e}"),
//!     }
//! }
//! session.stop_scan()?;
//! # Ok::<(), ydlidar_g2_driver::YDLidarError>(())
//! ```

mod angle;
mod checksum;
mod config;
mod constants;
mod error;
mod frame;
mod numeric;
mod packet;
mod revolution;
mod sample;
mod serial;
mod session;
#[cfg(test)]
mod test_utils;
#[cfg(test)]
mod time;

use crate::constants::{
    LIDAR_ANS_LENGTH_DEVHEALTH, LIDAR_ANS_LENGTH_DEVINFO, LIDAR_ANS_TYPE_DEVHEALTH,
    LIDAR_ANS_TYPE_DEVINFO, LIDAR_CMD_GET_DEVICE_HEALTH, LIDAR_CMD_GET_DEVICE_INFO,
    LIDAR_CMD_RESET,
};
use crate::packet::validate_response_header;
use crate::serial::{read, read_response_header, send_command};
use byteorder::{ByteOrder, LittleEndian};
use log::info;
use std::io::{Read, Write};

pub use crate::config::DriverConfig;
pub use crate::error::{ChecksumError, FramingError, Result, YDLidarError};
pub use crate::frame::FrameHeader;
pub use crate::packet::{decode_packet, ResponseHeader};
pub use crate::revolution::{RevolutionAssembler, Revolutions};
pub use crate::serial::{open_port, LidarPort};
pub use crate::session::{ScanItem, ScanSession, ScanStream, SessionState};
pub use ydlidar_g2_data::{
    DecodedSample, DeviceInfo, HealthStatus, PacketKind, Scan, ScanPacket, YdlidarModel,
};

pub fn get_health_status<P: Read + Write + ?Sized>(port: &mut P) -> Result<HealthStatus> {
    send_command(port, LIDAR_CMD_GET_DEVICE_HEALTH)?;
    let header = read_response_header(port)?;
    validate_response_header(
        &header,
        Some(LIDAR_ANS_LENGTH_DEVHEALTH),
        LIDAR_ANS_TYPE_DEVHEALTH,
    )?;
    let health = read(port, LIDAR_ANS_LENGTH_DEVHEALTH.into())?;

    Ok(HealthStatus {
        status: health[0],
        error_code: LittleEndian::read_u16(&health[1..3]),
    })
}

pub fn check_device_health<P: Read + Write + ?Sized>(port: &mut P) -> Result<()> {
    let health = get_health_status(port)?;
    match health.is_healthy() {
        true => Ok(()),
        false => Err(YDLidarError::DeviceHealthError(
            health.status,
            health.error_code,
        )),
    }
}

pub fn get_device_info<P: Read + Write + ?Sized>(port: &mut P) -> Result<DeviceInfo> {
    send_command(port, LIDAR_CMD_GET_DEVICE_INFO)?;
    let header = read_response_header(port)?;
    validate_response_header(
        &header,
        Some(LIDAR_ANS_LENGTH_DEVINFO),
        LIDAR_ANS_TYPE_DEVINFO,
    )?;
    let info = read(port, LIDAR_ANS_LENGTH_DEVINFO.into())?;
    let mut serial_number = [0u8; 16];
    serial_number.copy_from_slice(&info[4..20]);
    let info = DeviceInfo {
        model_number: info[0],
        firmware_major_version: info[2],
        firmware_minor_version: info[1],
        hardware_version: info[3],
        serial_number,
    };
    info!(
        "Device {:?}, firmware {}, hardware {}",
        info.model(),
        info.firmware_version(),
        info.hardware_version
    );
    Ok(info)
}

/// Soft-restarts the device. The device sends no response.
pub fn reboot<P: Write + ?Sized>(port: &mut P) -> Result<()> {
    send_command(port, LIDAR_CMD_RESET)
}
