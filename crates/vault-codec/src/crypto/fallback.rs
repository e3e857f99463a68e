//! Unencrypted base64 representation, the last-resort tier

use base64::{
    alphabet,
    engine::{
        general_purpose::{GeneralPurpose, GeneralPurposeConfig, STANDARD},
        DecodePaddingMode,
    },
    Engine,
};

use crate::outcome::FailureReason;

/// Accepts padded and unpadded input, as older writers produced both
const LENIENT: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new()
        .with_decode_padding_mode(DecodePaddingMode::Indifferent)
        .with_decode_allow_trailing_bits(true),
);

pub fn encode(plaintext: &str) -> String {
    STANDARD.encode(plaintext.as_bytes())
}

pub fn decode(encoded: &str) -> Result<String, FailureReason> {
    let bytes = LENIENT
        .decode(encoded)
        .map_err(|_| FailureReason::NotBase64)?;
    String::from_utf8(bytes).map_err(|_| FailureReason::InvalidUtf8)
}
