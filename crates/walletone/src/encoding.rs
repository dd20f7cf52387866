//!
//! Windows-1251 transcoding.
//!
//! The gateway checks the signature against cp1251 bytes, so every value put into the form and
//! every byte fed into the digest goes through [`encode_cp1251`]. Characters outside the code page
//! become [`CP1251_PLACEHOLDER`] instead of being dropped: dropping would let two different inputs
//! share a signature.
//!

use encoding_rs::{EncoderResult, WINDOWS_1251};

use crate::consts::CP1251_PLACEHOLDER;

/// Encode `text` into Windows-1251. Produces exactly one byte per character and never fails.
pub fn encode_cp1251(text: &str) -> Vec<u8> {
    let mut encoder = WINDOWS_1251.new_encoder();
    // Single-byte target: a char never needs more than one byte, and a char is at least one byte
    // of UTF-8.
    let mut output = vec![0_u8; text.len()];
    let mut read_total = 0;
    let mut written_total = 0;

    loop {
        let (result, read, written) = encoder.encode_from_utf8_without_replacement(
            text.get(read_total..).unwrap_or_default(),
            output.get_mut(written_total..).unwrap_or_default(),
            true,
        );
        read_total += read;
        written_total += written;

        match result {
            EncoderResult::InputEmpty => break,
            EncoderResult::Unmappable(_) => {
                if let Some(slot) = output.get_mut(written_total) {
                    *slot = CP1251_PLACEHOLDER;
                } else {
                    output.push(CP1251_PLACEHOLDER);
                }
                written_total += 1;
            }
            EncoderResult::OutputFull => output.resize(output.len() * 2 + 1, 0),
        }
    }

    output.truncate(written_total);
    output
}

/// The text the gateway will see for `text`: cp1251 round trip with placeholders.
pub fn transcode_cp1251(text: &str) -> String {
    let bytes = encode_cp1251(text);
    let (decoded, _) = WINDOWS_1251.decode_without_bom_handling(&bytes);
    decoded.into_owned()
}
