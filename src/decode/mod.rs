//! Body decoding: base64url with padding repair, then mojibake cleanup.

pub mod base64url;
pub mod mojibake;
