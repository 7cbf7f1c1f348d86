pub(crate) const HEADER_SIZE: usize = 7;
pub(crate) const PACKET_HEADER_SIZE: usize = 10;
pub(crate) const SAMPLE_SIZE: usize = 3;
pub(crate) const PREAMBLE: u16 = 0x5AA5;
pub(crate) const LIDAR_CMD_SYNC_BYTE: u8 = 0xA5;
pub(crate) const LIDAR_CMD_GET_DEVICE_HEALTH: u8 = 0x92;
pub(crate) const LIDAR_CMD_GET_DEVICE_INFO: u8 = 0x90;
pub(crate) const LIDAR_CMD_RESET: u8 = 0x40;
pub(crate) const LIDAR_CMD_STOP: u8 = 0x65;
pub(crate) const LIDAR_CMD_SCAN: u8 = 0x60;
pub(crate) const LIDAR_ANS_TYPE_DEVINFO: u8 = 0x04;
pub(crate) const LIDAR_ANS_LENGTH_DEVINFO: u8 = 20;
pub(crate) const LIDAR_ANS_TYPE_DEVHEALTH: u8 = 0x06;
pub(crate) const LIDAR_ANS_LENGTH_DEVHEALTH: u8 = 3;
pub(crate) const LIDAR_ANS_TYPE_MEASUREMENT: u8 = 0x81;
pub(crate) const LIDAR_RESP_MODE_CONTINUOUS: u8 = 0x01;
// Upper bound on bytes skipped while hunting for a preamble
pub(crate) const MAX_RESYNC_BYTES: usize = 4096;
