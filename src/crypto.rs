use std::fmt;

use crypto_box::SecretKey;
use hkdf::Hkdf;
use k256::ecdsa::{SigningKey, VerifyingKey};
use k256::elliptic_curve::sec1::ToEncodedPoint;
use log::debug;
use sha2::Sha256;
use zeroize::Zeroizing;

use crate::config::{
    hkdf_salt_for_origin, MAX_SCALAR_CANDIDATES, MIN_ENTROPY_SIZE,
    SECP256K1_COMPRESSED_PUBLIC_KEY_SIZE, SECP256K1_PRIVATE_KEY_SIZE, SECP256K1_SIGNING_HKDF_INFO,
    X25519_ENCRYPTION_HKDF_INFO, X25519_KEY_SIZE,
};
use crate::encoders::{base64_standard_encode, hex_prefixed_encode};
use crate::error::{EntropyKeysError, EntropyKeysResult};

// === KEY PURPOSES ===

/// What a derived key is for. Each purpose has its own HKDF info tag, so the
/// signing and encryption derivations never share output even for identical
/// entropy and salt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyPurpose {
    Signing,
    Encryption,
}

impl KeyPurpose {
    pub fn hkdf_info(self) -> &'static [u8] {
        match self {
            KeyPurpose::Signing => SECP256K1_SIGNING_HKDF_INFO,
            KeyPurpose::Encryption => X25519_ENCRYPTION_HKDF_INFO,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            KeyPurpose::Signing => "signing",
            KeyPurpose::Encryption => "encryption",
        }
    }
}

// === KEY DERIVATION ===

/// HKDF-SHA256 over the root entropy.
///
/// Extract salt is the length-prefixed origin salt (see
/// [`hkdf_salt_for_origin`]); expand info is the purpose tag followed by a
/// one-byte candidate counter.
pub(crate) fn derive_key_material(
    entropy: &[u8],
    salt: Option<&str>,
    purpose: KeyPurpose,
    counter: u8,
) -> EntropyKeysResult<Zeroizing<[u8; 32]>> {
    if entropy.len() < MIN_ENTROPY_SIZE {
        return Err(EntropyKeysError::DerivationFault(format!(
            "entropy must be at least {} bytes, got {}",
            MIN_ENTROPY_SIZE,
            entropy.len()
        )));
    }

    let hkdf_salt = hkdf_salt_for_origin(salt);
    let hk = Hkdf::<Sha256>::new(Some(&hkdf_salt), entropy);

    let tag = purpose.hkdf_info();
    let mut info = Vec::with_capacity(tag.len() + 1);
    info.extend_from_slice(tag);
    info.push(counter);

    let mut okm = Zeroizing::new([0u8; SECP256K1_PRIVATE_KEY_SIZE]);
    hk.expand(&info, &mut okm[..])
        .map_err(|_| EntropyKeysError::DerivationFault("HKDF expand failed".to_string()))?;
    Ok(okm)
}

/// Derive the secp256k1 signing keypair for `(entropy, salt)`.
///
/// A candidate that is zero or not below the group order is skipped and the
/// next counter is tried, as BIP-32 does for invalid child keys. Exhausting
/// every counter is a [`EntropyKeysError::DerivationFault`].
pub fn derive_signing_keypair(
    entropy: &[u8],
    salt: Option<&str>,
) -> EntropyKeysResult<SigningKeypair> {
    for counter in (0..=u8::MAX).take(MAX_SCALAR_CANDIDATES) {
        let material = derive_key_material(entropy, salt, KeyPurpose::Signing, counter)?;
        match SigningKey::from_slice(material.as_slice()) {
            Ok(signing_key) => return Ok(SigningKeypair { signing_key }),
            Err(_) => debug!("secp256k1 candidate {} out of range, trying next", counter),
        }
    }
    Err(EntropyKeysError::DerivationFault(
        "no valid secp256k1 scalar in candidate range".to_string(),
    ))
}

/// Derive the X25519 encryption keypair for `(entropy, salt)`.
/// Every 32-byte string is a valid X25519 secret once clamped.
pub fn derive_encryption_keypair(
    entropy: &[u8],
    salt: Option<&str>,
) -> EntropyKeysResult<EncryptionKeypair> {
    let material = derive_key_material(entropy, salt, KeyPurpose::Encryption, 0)?;
    EncryptionKeypair::from_secret_bytes(material.as_slice())
}

/// Purpose-dispatching entry point.
pub fn derive_keypair(
    entropy: &[u8],
    salt: Option<&str>,
    purpose: KeyPurpose,
) -> EntropyKeysResult<DerivedKeypair> {
    match purpose {
        KeyPurpose::Signing => derive_signing_keypair(entropy, salt).map(DerivedKeypair::Signing),
        KeyPurpose::Encryption => {
            derive_encryption_keypair(entropy, salt).map(DerivedKeypair::Encryption)
        }
    }
}

// === DERIVED KEYPAIRS ===

/// Either half of the derived key material. Private parts zeroize on drop.
#[derive(Debug)]
pub enum DerivedKeypair {
    Signing(SigningKeypair),
    Encryption(EncryptionKeypair),
}

impl DerivedKeypair {
    pub fn purpose(&self) -> KeyPurpose {
        match self {
            DerivedKeypair::Signing(_) => KeyPurpose::Signing,
            DerivedKeypair::Encryption(_) => KeyPurpose::Encryption,
        }
    }

    /// Public export: `0x` compressed hex for signing, base64 for encryption.
    pub fn public_key_export(&self) -> String {
        match self {
            DerivedKeypair::Signing(keypair) => keypair.public_key_hex(),
            DerivedKeypair::Encryption(keypair) => keypair.public_key_base64(),
        }
    }
}

pub struct SigningKeypair {
    signing_key: SigningKey,
}

impl SigningKeypair {
    #[cfg(test)]
    pub(crate) fn from_secret_bytes(bytes: &[u8]) -> EntropyKeysResult<Self> {
        SigningKey::from_slice(bytes)
            .map(|signing_key| Self { signing_key })
            .map_err(|e| EntropyKeysError::DerivationFault(e.to_string()))
    }

    pub fn verifying_key(&self) -> &VerifyingKey {
        self.signing_key.verifying_key()
    }

    /// 33-byte SEC1 compressed point.
    pub fn public_key_bytes(&self) -> [u8; SECP256K1_COMPRESSED_PUBLIC_KEY_SIZE] {
        let point = k256::PublicKey::from(self.verifying_key()).to_encoded_point(true);
        let mut out = [0u8; SECP256K1_COMPRESSED_PUBLIC_KEY_SIZE];
        out.copy_from_slice(point.as_bytes());
        out
    }

    pub fn public_key_hex(&self) -> String {
        hex_prefixed_encode(&self.public_key_bytes())
    }

    pub(crate) fn signing_key(&self) -> &SigningKey {
        &self.signing_key
    }
}

// Never print the scalar.
impl fmt::Debug for SigningKeypair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SigningKeypair")
            .field("public_key", &self.public_key_hex())
            .finish_non_exhaustive()
    }
}

pub struct EncryptionKeypair {
    secret_key: SecretKey,
}

impl EncryptionKeypair {
    /// Borrowed so the caller's zeroizing buffer stays the only copy.
    pub(crate) fn from_secret_bytes(bytes: &[u8]) -> EntropyKeysResult<Self> {
        SecretKey::from_slice(bytes)
            .map(|secret_key| Self { secret_key })
            .map_err(|_| {
                EntropyKeysError::DerivationFault(format!(
                    "X25519 secret must be {} bytes, got {}",
                    X25519_KEY_SIZE,
                    bytes.len()
                ))
            })
    }

    pub fn public_key_bytes(&self) -> [u8; X25519_KEY_SIZE] {
        *self.secret_key.public_key().as_bytes()
    }

    /// Standard base64 of the 32-byte public key (44 characters).
    pub fn public_key_base64(&self) -> String {
        base64_standard_encode(&self.public_key_bytes())
    }

    pub(crate) fn secret_key(&self) -> &SecretKey {
        &self.secret_key
    }
}

impl fmt::Debug for EncryptionKeypair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EncryptionKeypair")
            .field("public_key", &self.public_key_base64())
            .finish_non_exhaustive()
    }
}
