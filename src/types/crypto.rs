// === CRYPTOGRAPHIC TYPES ===
// EIP-1024 envelope as it travels over JSON

use serde::{Deserialize, Serialize};

/// EIP-1024 encrypted data.
///
/// The wire name of the ephemeral key field is `ephemPublicKey`;
/// `ephemeralPublicKey` is accepted on input for hosts that spell it out.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Eip1024EncryptedPayload {
    /// Algorithm literal, only `x25519-xsalsa20-poly1305` is supported
    pub version: String,
    /// Base64-encoded 24-byte XSalsa20 nonce
    pub nonce: String,
    /// Base64-encoded 32-byte sender X25519 public key
    #[serde(rename = "ephemPublicKey", alias = "ephemeralPublicKey")]
    pub ephem_public_key: String,
    /// Base64-encoded ciphertext with the 16-byte Poly1305 tag in front
    pub ciphertext: String,
}
