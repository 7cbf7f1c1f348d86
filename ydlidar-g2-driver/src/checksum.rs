use crate::error::ChecksumError;
use crate::frame::FrameHeader;
use crate::numeric::to_u16;

/// Exclusive-or of the little-endian 16-bit words of the header (without the
/// checksum field) followed by the payload. An odd trailing payload byte is
/// taken as a word with a zero high byte.
pub(crate) fn calc_checksum(header: &FrameHeader, payload: &[u8]) -> u16 {
    let payload_words = payload
        .chunks(2)
        .map(|w| to_u16(w.get(1).copied().unwrap_or(0), w[0]));
    header
        .checked_words()
        .into_iter()
        .chain(payload_words)
        .fold(0, |checksum, word| checksum ^ word)
}

pub(crate) fn err_if_checksum_mismatched(
    header: &FrameHeader,
    payload: &[u8],
) -> Result<(), ChecksumError> {
    let calculated = calc_checksum(header, payload);
    let expected = header.checksum;
    match calculated != expected {
        true => Err(ChecksumError {
            expected,
            calculated,
        }),
        false => Ok(()),
    }
}
