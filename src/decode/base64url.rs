//! base64url body decoding with padding repair.
//!
//! Mail APIs hand out bodies in the URL-safe alphabet, usually without
//! padding and occasionally with folded lines. Both alphabets are accepted.

use base64::alphabet;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use base64::Engine;

use crate::error::DecodeError;

/// Standard alphabet, padding required (we always pad), trailing bits tolerated.
const PADDED_LENIENT: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new()
        .with_decode_allow_trailing_bits(true)
        .with_decode_padding_mode(DecodePaddingMode::RequireCanonical),
);

/// Decode a base64url (or standard base64) string into UTF-8 text.
///
/// `-`/`_` are mapped to `+`/`/`, ASCII whitespace is dropped and missing
/// `=` padding is restored. An input of length `4n + 1` is rejected rather
/// than guessed at.
pub fn decode(input: &str) -> Result<String, DecodeError> {
    let bytes = decode_bytes(input)?;
    String::from_utf8(bytes).map_err(|e| {
        DecodeError::InvalidBytes(format!(
            "decoded bytes are not UTF-8 (valid up to byte {})",
            e.utf8_error().valid_up_to()
        ))
    })
}

/// Byte-level half of [`decode`].
pub fn decode_bytes(input: &str) -> Result<Vec<u8>, DecodeError> {
    let normalized = normalize(input)?;
    PADDED_LENIENT
        .decode(normalized.as_bytes())
        .map_err(|e| match e {
            base64::DecodeError::InvalidLength(len) => DecodeError::InvalidLength { len },
            other => DecodeError::InvalidBytes(other.to_string()),
        })
}

/// Map the URL-safe alphabet onto the standard one and pad to a multiple of 4.
fn normalize(input: &str) -> Result<String, DecodeError> {
    let mut out = String::with_capacity(input.len() + 3);
    for ch in input.chars() {
        match ch {
            '-' => out.push('+'),
            '_' => out.push('/'),
            c if c.is_ascii_whitespace() => {}
            c if !c.is_ascii() => {
                return Err(DecodeError::InvalidBytes(format!(
                    "non-ASCII character {c:?} in encoded body"
                )))
            }
            c => out.push(c),
        }
    }

    match out.len() % 4 {
        0 => {}
        1 => return Err(DecodeError::InvalidLength { len: out.len() }),
        rem => out.extend(std::iter::repeat('=').take(4 - rem)),
    }
    Ok(out)
}
