//! Encoding utilities for the entropy keys worker.
//! Includes base64 helpers for EIP-1024 fields and `0x` hex helpers for secp256k1 output
//! and host-supplied entropy.

use base64ct::{Base64, Encoding};

// === BASE64 STANDARD (EIP-1024 FIELDS) ===

/// Encode bytes to a standard (padded) base64 string.
/// EIP-1024 nonces, ephemeral keys and ciphertexts all use this alphabet.
pub fn base64_standard_encode(data: &[u8]) -> String {
    Base64::encode_string(data)
}

/// Decode a standard (padded) base64 string.
/// `base64ct` decodes in constant time and rejects non-canonical padding.
pub fn base64_standard_decode(input: &str) -> Result<Vec<u8>, String> {
    Base64::decode_vec(input).map_err(|e| format!("Base64 decode error: {}", e))
}

// === 0x HEX ===

/// Encode bytes as lowercase hex with a `0x` prefix.
pub fn hex_prefixed_encode(data: &[u8]) -> String {
    format!("0x{}", hex::encode(data))
}

/// Decode hex with or without a `0x` prefix.
pub fn hex_prefixed_decode(input: &str) -> Result<Vec<u8>, String> {
    let digits = input
        .strip_prefix("0x")
        .or_else(|| input.strip_prefix("0X"))
        .unwrap_or(input);
    hex::decode(digits).map_err(|e| format!("Hex decode error: {}", e))
}
