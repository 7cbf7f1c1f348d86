pub(crate) fn to_u16(high: u8, low: u8) -> u16 {
    ((high as u16) << 8) + (low as u16)
}

/// The low bit of an angle code is the correction flag and is discarded.
pub(crate) fn code_to_degree(code: u16) -> f64 {
    ((code >> 1) as f64) / 64.
}

pub(crate) fn normalize_degree(degree: f64) -> f64 {
    let d = degree.rem_euclid(360.);
    // rem_euclid rounds tiny negative inputs up to exactly 360
    if d >= 360. {
        0.
    } else {
        d
    }
}

pub(crate) fn to_string(data: &[u8]) -> String {
    data.iter()
        .map(|e| format!("{:02X}", e))
        .collect::<Vec<_>>()
        .join(" ")
}
