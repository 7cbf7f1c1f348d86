use crate::angle::{heading_marker_angle, point_cloud_angles};
use crate::checksum::err_if_checksum_mismatched;
use crate::constants::{HEADER_SIZE, PREAMBLE, SAMPLE_SIZE};
use crate::error::{FramingError, Result, YDLidarError};
use crate::frame::FrameHeader;
use crate::numeric::{code_to_degree, to_string};
use crate::sample::decode_samples;
use crate::serial::read;
use byteorder::{ByteOrder, LittleEndian};
use log::{debug, warn};
use std::io::Read;
use ydlidar_g2_data::{DecodedSample, PacketKind, ScanPacket};

/// Header of a plain command response.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ResponseHeader {
    pub payload_size: u8,
    pub response_mode: u8,
    pub type_code: u8,
}

pub(crate) fn parse_response_header(header: &[u8]) -> Result<ResponseHeader> {
    if header.len() != HEADER_SIZE {
        return Err(FramingError::LengthMismatch {
            expected: HEADER_SIZE,
            got: header.len(),
        }
        .into());
    }
    let preamble = LittleEndian::read_u16(&header[0..2]);
    if preamble != PREAMBLE {
        debug!("Rejected response header {}", to_string(header));
        return Err(FramingError::BadPreamble(preamble).into());
    }
    Ok(ResponseHeader {
        payload_size: header[2] & 0x3F,
        response_mode: (header[5] & 0xC0) >> 6,
        type_code: header[6],
    })
}

pub(crate) fn validate_response_header(
    header: &ResponseHeader,
    maybe_response_length: Option<u8>,
    type_code: u8,
) -> Result<()> {
    if header.type_code != type_code {
        return Err(YDLidarError::InvalidTypeCode(type_code, header.type_code));
    }
    match maybe_response_length {
        None => (),
        Some(len) => {
            if header.payload_size != len {
                return Err(YDLidarError::InvalidResponseLength(
                    len.into(),
                    header.payload_size.into(),
                ));
            }
        }
    }
    Ok(())
}

impl FrameHeader {
    pub fn kind(&self) -> PacketKind {
        PacketKind::from_type_bit(self.freq_and_type)
    }

    /// Scan frequency in Hz. Only meaningful for point cloud packets.
    pub fn frequency_hz(&self) -> f64 {
        (((self.freq_and_type >> 1) & 0x7F) as f64) / 10.
    }

    pub fn start_angle(&self) -> f64 {
        code_to_degree(self.start_angle_code)
    }

    pub fn end_angle(&self) -> f64 {
        code_to_degree(self.end_angle_code)
    }

    /// Number of payload bytes following this header on the wire.
    pub fn payload_size(&self) -> usize {
        match self.kind() {
            PacketKind::PointCloud => (self.sample_count as usize) * SAMPLE_SIZE,
            PacketKind::HeadingMarker => 0,
        }
    }
}

/// Reads the payload announced by `header` and decodes the packet.
pub(crate) fn read_packet<P: Read + ?Sized>(
    port: &mut P,
    header: &FrameHeader,
) -> Result<ScanPacket> {
    if header.kind() == PacketKind::PointCloud && header.sample_count == 0 {
        return Err(YDLidarError::EmptyPointCloud);
    }
    let payload = read(port, header.payload_size())?;
    decode_packet(header, &payload)
}

/// Validates and decodes one frame. Nothing is returned for a frame that
/// fails validation.
pub fn decode_packet(header: &FrameHeader, payload: &[u8]) -> Result<ScanPacket> {
    let expected = header.payload_size();
    if payload.len() != expected {
        return Err(FramingError::LengthMismatch {
            expected,
            got: payload.len(),
        }
        .into());
    }

    match header.kind() {
        PacketKind::PointCloud => decode_point_cloud(header, payload),
        PacketKind::HeadingMarker => decode_heading_marker(header),
    }
}

fn decode_point_cloud(header: &FrameHeader, payload: &[u8]) -> Result<ScanPacket> {
    if header.sample_count == 0 {
        return Err(YDLidarError::EmptyPointCloud);
    }
    err_if_checksum_mismatched(header, payload)?;

    let readings = decode_samples(payload);
    let distances = readings.iter().map(|r| r.distance_mm).collect::<Vec<_>>();
    let angles = point_cloud_angles(header.start_angle(), header.end_angle(), &distances);
    let samples = readings
        .iter()
        .zip(angles)
        .map(|(r, angle_degree)| DecodedSample {
            distance_mm: r.distance_mm,
            intensity: r.intensity,
            angle_degree,
        })
        .collect::<Vec<_>>();

    debug!(
        "Point cloud packet: {} samples, {:.1} Hz",
        samples.len(),
        header.frequency_hz()
    );
    Ok(ScanPacket {
        kind: PacketKind::PointCloud,
        samples,
        frequency_hz: Some(header.frequency_hz()),
    })
}

fn decode_heading_marker(header: &FrameHeader) -> Result<ScanPacket> {
    if header.sample_count != 1 {
        warn!(
            "Heading marker should carry 1 sample, got {}",
            header.sample_count
        );
    }
    err_if_checksum_mismatched(header, &[])?;

    // The marker has no range payload
    let distance_mm = 0.;
    debug!("Heading marker at {:.2} degree", header.start_angle());
    Ok(ScanPacket {
        kind: PacketKind::HeadingMarker,
        samples: vec![DecodedSample {
            distance_mm,
            intensity: 0,
            angle_degree: heading_marker_angle(header.start_angle(), distance_mm),
        }],
        frequency_hz: None,
    })
}
