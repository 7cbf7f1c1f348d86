use std::io;
use thiserror::Error;

/// Failures to obtain a well-formed scan packet header.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FramingError {
    #[error("Short read: expected {expected} bytes, got {got}.")]
    ShortRead { expected: usize, got: usize },
    /// A complete read whose size does not match what the header announced.
    #[error("Length mismatch: expected {expected} bytes, got {got}.")]
    LengthMismatch { expected: usize, got: usize },
    #[error("Header must start with 0xA5 0x5A. Observed = {0:#06X}.")]
    BadPreamble(u16),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Checksum mismatched. Calculated = {calculated:04X}, expected = {expected:04X}.")]
pub struct ChecksumError {
    pub expected: u16,
    pub calculated: u16,
}

#[derive(Error, Debug)]
pub enum YDLidarError {
    #[error(transparent)]
    Framing(#[from] FramingError),
    #[error(transparent)]
    Checksum(#[from] ChecksumError),
    #[error("Point cloud packet without samples.")]
    EmptyPointCloud,
    #[error("Expected response length of {0} bytes but found {1} bytes.")]
    InvalidResponseLength(usize, usize),
    #[error("Expected type code {0:#04X} but obtained {1:#04X}.")]
    InvalidTypeCode(u8, u8),
    #[error("Expected response mode {0} but obtained {1}.")]
    InvalidResponseMode(u8, u8),
    // The last two bits of the status are reserved.
    #[error("Device health error. Status = {0:#04X}, error code = {1:#06X}. See the development manual for details.")]
    DeviceHealthError(u8, u16),
    #[error("The device is owned by a running scan.")]
    SessionBusy,
    #[error("The serial port is no longer available.")]
    PortUnavailable,
    #[error("The scan worker panicked.")]
    WorkerPanicked,
    #[error(transparent)]
    SerialError(#[from] serialport::Error),
    #[error(transparent)]
    IoError(#[from] io::Error),
}

impl YDLidarError {
    /// Whether the start-scan negotiation was rejected by the device.
    pub fn is_negotiation_error(&self) -> bool {
        matches!(
            self,
            YDLidarError::InvalidTypeCode(..) | YDLidarError::InvalidResponseMode(..)
        )
    }

    /// Whether the underlying byte stream is gone for good.
    pub fn is_stream_closed(&self) -> bool {
        match self {
            YDLidarError::IoError(e) => matches!(
                e.kind(),
                io::ErrorKind::UnexpectedEof
                    | io::ErrorKind::BrokenPipe
                    | io::ErrorKind::NotConnected
                    | io::ErrorKind::ConnectionAborted
            ),
            _ => false,
        }
    }
}

pub type Result<T> = std::result::Result<T, YDLidarError>;
