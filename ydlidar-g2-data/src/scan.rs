#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Struct to hold one revolution of lidar scan data.
#[derive(Clone, Debug, Default, PartialEq, PartialOrd)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Scan {
    /// Scan angle in degree, within [0, 360).
    pub angles_degree: Vec<f64>,
    /// Distance to an object in mm.
    pub distances_mm: Vec<f64>,
    /// Return strength of the laser pulse.
    pub intensities: Vec<u16>,
    /// Last scan frequency reported during the revolution.
    pub frequency_hz: Option<f64>,
    /// Number of frames lost to decode errors during the revolution.
    pub dropped_frames: usize,
}

impl Scan {
    pub fn new() -> Scan {
        Scan::default()
    }

    pub fn len(&self) -> usize {
        self.angles_degree.len()
    }

    pub fn is_empty(&self) -> bool {
        self.angles_degree.is_empty()
    }

    pub fn angles_radian(&self) -> impl Iterator<Item = f64> + '_ {
        self.angles_degree.iter().map(|a| a.to_radians())
    }
}
