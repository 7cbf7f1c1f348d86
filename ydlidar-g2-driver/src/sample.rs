use crate::constants::SAMPLE_SIZE;

/// Intensity and distance carried by one 3-byte sample.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct RawReading {
    pub(crate) intensity: u16,
    pub(crate) distance_mm: f64,
}

pub(crate) fn calc_intensity(b0: u8, b1: u8) -> u16 {
    (b0 as u16) + ((b1 & 0x03) as u16) * 256
}

pub(crate) fn calc_distance(b1: u8, b2: u8) -> u16 {
    ((b2 as u16) << 6) + ((b1 as u16) >> 2)
}

pub(crate) fn decode_sample(sample: &[u8; SAMPLE_SIZE]) -> RawReading {
    let [b0, b1, b2] = *sample;
    RawReading {
        intensity: calc_intensity(b0, b1),
        distance_mm: calc_distance(b1, b2) as f64,
    }
}

/// Decodes a payload of consecutive samples. A trailing partial sample is ignored.
pub(crate) fn decode_samples(payload: &[u8]) -> Vec<RawReading> {
    payload
        .chunks_exact(SAMPLE_SIZE)
        .map(|s| decode_sample(&[s[0], s[1], s[2]]))
        .collect()
}
