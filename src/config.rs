// === CONFIGURATION CONSTANTS ===
// Configuration values for the entropy keys worker

/// Change this constant and recompile to adjust logging verbosity
/// Available levels: Error, Warn, Info, Debug, Trace
pub const CURRENT_LOG_LEVEL: log::Level = log::Level::Info;

// === ORIGIN SALTING ===

/// Request origins that derive unsalted keys.
/// Matched by exact string comparison only.
pub const INTERNAL_ORIGINS: [&str; 5] = [
    "https://portfolio.metamask.io",
    "https://portfolio-builds.metafi-dev.codefi.network",
    "https://docs.metamask.io",
    "https://developer.metamask.io",
    // Calls coming from the extension or mobile app carry this preset origin.
    "metamask",
];

// === CRYPTOGRAPHIC CONSTANTS ===

/// Minimum accepted root entropy length in bytes (256 bits)
pub const MIN_ENTROPY_SIZE: usize = 32;

/// HKDF candidates tried before a secp256k1 derivation gives up.
/// The counter is a single byte, so this is also the hard ceiling.
pub const MAX_SCALAR_CANDIDATES: usize = 256;

/// secp256k1 private scalar size in bytes
pub const SECP256K1_PRIVATE_KEY_SIZE: usize = 32;

/// Compressed SEC1 secp256k1 public key size in bytes
pub const SECP256K1_COMPRESSED_PUBLIC_KEY_SIZE: usize = 33;

/// Recoverable ECDSA signature size (r || s || v)
pub const RECOVERABLE_SIGNATURE_SIZE: usize = 65;

/// X25519 secret and public key size in bytes
pub const X25519_KEY_SIZE: usize = 32;

/// XSalsa20 nonce size in bytes (192 bits / 24 bytes)
pub const XSALSA20_NONCE_SIZE: usize = 24;

/// Poly1305 authentication tag size in bytes
pub const POLY1305_TAG_SIZE: usize = 16;

/// Domain tag mixed into every HKDF salt, ahead of the encoded origin
pub const ENTROPY_KEYS_SALT_DOMAIN: &[u8] = b"entropy-keys/origin-salt/v1";

/// Info string for secp256k1 signing key derivation
pub const SECP256K1_SIGNING_HKDF_INFO: &[u8] = b"entropy-keys/secp256k1-signing/v1";

/// Info string for X25519 encryption key derivation
pub const X25519_ENCRYPTION_HKDF_INFO: &[u8] = b"entropy-keys/x25519-encryption/v1";

// === PROTOCOL CONSTANTS ===

/// The only EIP-1024 envelope version this worker decrypts
pub const EIP1024_VERSION: &str = "x25519-xsalsa20-poly1305";

/// Required prefix for application-scoped messages passed to `signMessage`
pub const SIGN_MESSAGE_PREFIX: &str = "metamask:";

/// EIP-191 personal message prefix (followed by the decimal message length)
pub const PERSONAL_MESSAGE_PREFIX: &str = "\x19Ethereum Signed Message:\n";

/// Base64 lengths of the fixed-size EIP-1024 fields
pub const EIP1024_NONCE_B64_LEN: usize = 32;
pub const EIP1024_EPHEMERAL_KEY_B64_LEN: usize = 44;

// === ERROR MESSAGES ===

pub const ERROR_GET_PUBLIC_KEY_PARAMS: &str =
    "`getPublicKey`, must take an optional `entropySourceId` parameter";

pub const ERROR_SIGN_MESSAGE_PARAMS: &str =
    "`signMessage`, must take a `message` parameter that must begin with `metamask:`";

pub const ERROR_GET_ENCRYPTION_PUBLIC_KEY_PARAMS: &str =
    "`getEncryptionPublicKey`, expects an optional `entropySourceId` parameter";

pub const ERROR_DECRYPT_MESSAGE_PARAMS: &str =
    "`decryptMessage`, expects a `data` parameter that must match the Eip1024EncryptedData schema, and an optional entropySourceId string parameter";

// === UTILITY FUNCTIONS ===

/// Encode an origin salt into the HKDF extract salt.
///
/// Layout: `ENTROPY_KEYS_SALT_DOMAIN || 0x00` when unsalted, otherwise
/// `ENTROPY_KEYS_SALT_DOMAIN || 0x01 || u32_be(len) || origin`.
pub fn hkdf_salt_for_origin(salt: Option<&str>) -> Vec<u8> {
    let mut out = Vec::with_capacity(ENTROPY_KEYS_SALT_DOMAIN.len() + 5 + salt.map_or(0, str::len));
    out.extend_from_slice(ENTROPY_KEYS_SALT_DOMAIN);
    match salt {
        None => out.push(0x00),
        Some(origin) => {
            out.push(0x01);
            out.extend_from_slice(&(origin.len() as u32).to_be_bytes());
            out.extend_from_slice(origin.as_bytes());
        }
    }
    out
}
