use crate::config::DriverConfig;
use crate::constants::{
    HEADER_SIZE, LIDAR_ANS_TYPE_MEASUREMENT, LIDAR_CMD_SCAN, LIDAR_CMD_STOP, LIDAR_CMD_SYNC_BYTE,
    LIDAR_RESP_MODE_CONTINUOUS,
};
use crate::error::{FramingError, Result, YDLidarError};
use crate::packet::{parse_response_header, validate_response_header, ResponseHeader};
use log::debug;
use serialport::{ClearBuffer, DataBits, FlowControl, Parity, SerialPort, StopBits};
use std::io::{self, Read, Write};

/// Byte stream connected to the lidar.
///
/// Implemented for serial ports; anything else that can stand in for the
/// device (a replay file, a socket) only has to say how to drop buffered bytes.
pub trait LidarPort: Read + Write + Send {
    fn clear_buffers(&mut self) -> Result<()>;
}

impl LidarPort for Box<dyn SerialPort> {
    fn clear_buffers(&mut self) -> Result<()> {
        self.clear(ClearBuffer::All)?;
        Ok(())
    }
}

/// Opens `port_name` as 8N1 without flow control.
pub fn open_port(port_name: &str, config: &DriverConfig) -> Result<Box<dyn SerialPort>> {
    let port = serialport::new(port_name, config.baud_rate)
        .data_bits(DataBits::Eight)
        .parity(Parity::None)
        .stop_bits(StopBits::One)
        .flow_control(FlowControl::None)
        .timeout(config.read_timeout)
        .open()?;
    debug!("Opened {} at {} baud", port_name, config.baud_rate);
    Ok(port)
}

pub(crate) fn send_command<P: Write + ?Sized>(port: &mut P, command: u8) -> Result<()> {
    let data: [u8; 2] = [LIDAR_CMD_SYNC_BYTE, command];
    port.write_all(&data)?;
    port.flush()?;
    Ok(())
}

/// Fills `buffer` until it is full, the read times out or the stream ends.
///
/// Returns the number of bytes read. Reaching the end of the stream before
/// any byte arrived is reported as `UnexpectedEof`.
pub(crate) fn read_up_to<P: Read + ?Sized>(port: &mut P, buffer: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buffer.len() {
        match port.read(&mut buffer[filled..]) {
            Ok(0) if filled == 0 => {
                return Err(io::Error::new(
                    io::ErrorKind::UnexpectedEof,
                    "device stream closed",
                ))
            }
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::TimedOut => break,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}

pub(crate) fn read<P: Read + ?Sized>(port: &mut P, data_size: usize) -> Result<Vec<u8>> {
    let mut data: Vec<u8> = vec![0; data_size];
    if data_size == 0 {
        return Ok(data);
    }
    let got = read_up_to(port, &mut data)?;
    if got < data_size {
        return Err(FramingError::ShortRead {
            expected: data_size,
            got,
        }
        .into());
    }
    Ok(data)
}

pub(crate) fn read_response_header<P: Read + ?Sized>(port: &mut P) -> Result<ResponseHeader> {
    let header = read(port, HEADER_SIZE)?;
    parse_response_header(&header)
}

/// Sends the scan command and checks that the device answers with a
/// continuous measurement stream.
pub(crate) fn start_scan<P: Read + Write + ?Sized>(port: &mut P) -> Result<()> {
    send_command(port, LIDAR_CMD_SCAN)?;
    let header = read_response_header(port)?;
    validate_response_header(&header, None, LIDAR_ANS_TYPE_MEASUREMENT)?;
    if header.response_mode != LIDAR_RESP_MODE_CONTINUOUS {
        return Err(YDLidarError::InvalidResponseMode(
            LIDAR_RESP_MODE_CONTINUOUS,
            header.response_mode,
        ));
    }
    Ok(())
}

pub(crate) fn stop_scan_and_flush<P: LidarPort + ?Sized>(port: &mut P) -> Result<()> {
    send_command(port, LIDAR_CMD_STOP)?;
    port.clear_buffers()?;
    Ok(())
}
