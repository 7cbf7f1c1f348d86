use crate::constants::{MAX_RESYNC_BYTES, PACKET_HEADER_SIZE, PREAMBLE};
use crate::error::{FramingError, Result, YDLidarError};
use crate::serial::read_up_to;
use byteorder::{ByteOrder, LittleEndian};
use log::trace;
use std::io::Read;

/// Fixed 10-byte header preceding every scan packet.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FrameHeader {
    pub preamble: u16,
    /// Bit 0 is the packet type, bits 1 to 7 the scan frequency code.
    pub freq_and_type: u8,
    pub sample_count: u8,
    pub start_angle_code: u16,
    pub end_angle_code: u16,
    pub checksum: u16,
}

impl FrameHeader {
    pub fn from_bytes(bytes: &[u8; PACKET_HEADER_SIZE]) -> FrameHeader {
        FrameHeader {
            preamble: LittleEndian::read_u16(&bytes[0..2]),
            freq_and_type: bytes[2],
            sample_count: bytes[3],
            start_angle_code: LittleEndian::read_u16(&bytes[4..6]),
            end_angle_code: LittleEndian::read_u16(&bytes[6..8]),
            checksum: LittleEndian::read_u16(&bytes[8..10]),
        }
    }

    pub fn parse(
        bytes: &[u8; PACKET_HEADER_SIZE],
    ) -> std::result::Result<FrameHeader, FramingError> {
        let header = FrameHeader::from_bytes(bytes);
        if header.preamble != PREAMBLE {
            return Err(FramingError::BadPreamble(header.preamble));
        }
        Ok(header)
    }

    /// The header words covered by the checksum, in wire order.
    pub(crate) fn checked_words(&self) -> [u16; 4] {
        [
            self.preamble,
            ((self.sample_count as u16) << 8) | (self.freq_and_type as u16),
            self.start_angle_code,
            self.end_angle_code,
        ]
    }
}

/// Reads scan packet headers off the device stream.
///
/// By default every call is one bounded read of a whole header; after a bad
/// preamble the next call simply reads the following 10 bytes. With `resync`
/// enabled the reader instead keeps the rejected bytes and skips forward to
/// the next preamble, looking at those bytes before reading more.
#[derive(Debug, Default)]
pub(crate) struct FrameReader {
    resync: bool,
    lost_sync: bool,
    /// Bytes read after the start of the last rejected header.
    carry: Vec<u8>,
}

impl FrameReader {
    pub(crate) fn new(resync: bool) -> FrameReader {
        FrameReader {
            resync,
            lost_sync: false,
            carry: Vec::new(),
        }
    }

    pub(crate) fn read_header<P: Read + ?Sized>(&mut self, port: &mut P) -> Result<FrameHeader> {
        let mut buffer = [0u8; PACKET_HEADER_SIZE];
        let mut filled = 0;
        if self.lost_sync {
            filled = self.resync_into(port, &mut buffer)?;
            self.lost_sync = false;
        }

        let got = filled + read_up_to(port, &mut buffer[filled..])?;
        if got < PACKET_HEADER_SIZE {
            return Err(FramingError::ShortRead {
                expected: PACKET_HEADER_SIZE,
                got,
            }
            .into());
        }

        FrameHeader::parse(&buffer).map_err(|e| {
            if self.resync {
                self.lost_sync = true;
                self.carry = buffer[1..].to_vec();
            }
            YDLidarError::from(e)
        })
    }

    /// Puts the start of the next header into `buffer` and returns how many
    /// of its bytes are already there.
    fn resync_into<P: Read + ?Sized>(
        &mut self,
        port: &mut P,
        buffer: &mut [u8; PACKET_HEADER_SIZE],
    ) -> Result<usize> {
        if let Some(offset) = find_preamble(&self.carry) {
            let start = &self.carry[offset..];
            buffer[..start.len()].copy_from_slice(start);
            trace!("Found preamble {} bytes into the rejected header", offset + 1);
            let filled = start.len();
            self.carry.clear();
            return Ok(filled);
        }

        let mut previous = self.carry.last().copied();
        self.carry.clear();
        let found = seek_preamble(port, &mut previous);
        // Keep the last byte so a preamble split across calls is still found
        self.carry.extend(previous);
        found?;
        buffer[..2].copy_from_slice(&PREAMBLE.to_le_bytes());
        Ok(2)
    }
}

fn find_preamble(bytes: &[u8]) -> Option<usize> {
    let preamble = PREAMBLE.to_le_bytes();
    bytes.windows(2).position(|w| w == preamble.as_slice())
}

/// Consumes bytes up to and including the next preamble. `previous` is the
/// byte read just before; it is left holding the last byte read on failure.
fn seek_preamble<P: Read + ?Sized>(port: &mut P, previous: &mut Option<u8>) -> Result<()> {
    let [first, second] = PREAMBLE.to_le_bytes();
    let mut last = 0u16;
    let mut byte = [0u8; 1];
    for consumed in 1..=MAX_RESYNC_BYTES {
        if read_up_to(port, &mut byte)? == 0 {
            return Err(FramingError::ShortRead {
                expected: PACKET_HEADER_SIZE,
                got: 0,
            }
            .into());
        }
        if *previous == Some(first) && byte[0] == second {
            trace!("Found preamble after reading {} more bytes", consumed);
            *previous = None;
            return Ok(());
        }
        last = u16::from_le_bytes([previous.unwrap_or(0), byte[0]]);
        *previous = Some(byte[0]);
    }
    Err(FramingError::BadPreamble(last).into())
}
