//! Per-sample angle calibration.
//!
//! The G2 measures range by triangulation, so the optical axis of each return
//! is offset from the mirror angle by an amount that depends on the distance.

use crate::numeric::normalize_degree;
use std::f64::consts::PI;

const CORRECTION_GAIN: f64 = 21.8;
const CORRECTION_BASELINE_MM: f64 = 155.3;

/// Angular offset in degrees for a return at `distance_mm`. Zero when there is no return.
pub(crate) fn angle_correction(distance_mm: f64) -> f64 {
    if distance_mm == 0. {
        return 0.;
    }
    let ratio = CORRECTION_GAIN * (CORRECTION_BASELINE_MM - distance_mm)
        / (CORRECTION_BASELINE_MM * distance_mm);
    180. / PI * ratio.atan()
}

/// Angle of the single sample of a heading marker packet.
pub(crate) fn heading_marker_angle(start_angle: f64, distance_mm: f64) -> f64 {
    normalize_degree(start_angle + angle_correction(distance_mm))
}

/// Interpolates calibrated angles for the samples of a point cloud packet.
///
/// The span between first and last sample is taken modulo 360, so packets
/// crossing the 0° boundary still interpolate forward.
pub(crate) fn point_cloud_angles(start_angle: f64, end_angle: f64, distances: &[f64]) -> Vec<f64> {
    let n = distances.len();
    match n {
        0 => return Vec::new(),
        1 => return vec![heading_marker_angle(start_angle, distances[0])],
        _ => (),
    }

    let first = start_angle + angle_correction(distances[0]);
    let last = end_angle + angle_correction(distances[n - 1]);
    let angle_span = (last - first).rem_euclid(360.);
    let angle_rate = angle_span / ((n - 1) as f64);

    distances
        .iter()
        .enumerate()
        .map(|(i, d)| normalize_degree(first + angle_rate * (i as f64) + angle_correction(*d)))
        .collect()
}
