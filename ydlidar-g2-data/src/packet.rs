#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Type of a scan packet, taken from bit 0 of the frequency-and-type byte.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum PacketKind {
    /// Regular packet carrying one or more range samples.
    PointCloud,
    /// Zero packet marking the start of a new revolution.
    HeadingMarker,
}

impl PacketKind {
    pub fn from_type_bit(bit: u8) -> PacketKind {
        match bit & 0x01 {
            0 => PacketKind::PointCloud,
            _ => PacketKind::HeadingMarker,
        }
    }
}

/// One calibrated observation.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DecodedSample {
    /// Distance to the object in millimeters. Zero means no return.
    pub distance_mm: f64,
    /// Return strength, 0 to 1023.
    pub intensity: u16,
    /// Calibrated angle in degrees, always within [0, 360).
    pub angle_degree: f64,
}

impl DecodedSample {
    pub fn angle_radian(&self) -> f64 {
        self.angle_degree.to_radians()
    }

    /// Cartesian position in millimeters, x along 0°.
    pub fn to_cartesian(&self) -> (f64, f64) {
        let w = self.angle_radian();
        (self.distance_mm * w.cos(), self.distance_mm * w.sin())
    }
}

/// A decoded packet handed to the consumer.
///
/// For [`PacketKind::HeadingMarker`] `samples` always holds exactly one entry,
/// which marks the revolution boundary and is not a real range reading.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ScanPacket {
    pub kind: PacketKind,
    pub samples: Vec<DecodedSample>,
    /// Scan frequency in Hz. Only reported by point cloud packets.
    pub frequency_hz: Option<f64>,
}

impl ScanPacket {
    pub fn is_heading_marker(&self) -> bool {
        self.kind == PacketKind::HeadingMarker
    }
}
