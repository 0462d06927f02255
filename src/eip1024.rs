//! EIP-1024 `x25519-xsalsa20-poly1305` envelopes.
//!
//! This is the NaCl `box` construction: X25519 agreement between the sender's
//! ephemeral key and the recipient's derived key, HSalsa20 to turn the shared
//! point into a key, then XSalsa20-Poly1305. Decoding and length checks all
//! run before any cryptography, so a malformed envelope never reaches the
//! cipher.

use crypto_box::aead::generic_array::GenericArray;
use crypto_box::aead::Aead;
use crypto_box::{PublicKey, SalsaBox, SecretKey};
use zeroize::Zeroizing;

use crate::config::{EIP1024_VERSION, POLY1305_TAG_SIZE, X25519_KEY_SIZE, XSALSA20_NONCE_SIZE};
use crate::crypto::EncryptionKeypair;
use crate::encoders::{base64_standard_decode, base64_standard_encode};
use crate::error::{EntropyKeysError, EntropyKeysResult};
use crate::types::Eip1024EncryptedPayload;

/// Base64 public key a sender encrypts to.
pub fn encryption_public_key(keypair: &EncryptionKeypair) -> String {
    keypair.public_key_base64()
}

struct DecodedPayload {
    nonce: [u8; XSALSA20_NONCE_SIZE],
    ephemeral_public_key: [u8; X25519_KEY_SIZE],
    ciphertext: Vec<u8>,
}

fn decode_fixed<const N: usize>(field: &str, value: &str) -> EntropyKeysResult<[u8; N]> {
    let bytes = base64_standard_decode(value)
        .map_err(|e| EntropyKeysError::MalformedEncryptedPayload(format!("{}: {}", field, e)))?;
    <[u8; N]>::try_from(bytes.as_slice()).map_err(|_| {
        EntropyKeysError::MalformedEncryptedPayload(format!(
            "{} must decode to {} bytes, got {}",
            field,
            N,
            bytes.len()
        ))
    })
}

fn decode_payload(payload: &Eip1024EncryptedPayload) -> EntropyKeysResult<DecodedPayload> {
    if payload.version != EIP1024_VERSION {
        return Err(EntropyKeysError::UnsupportedEncryptionVersion(
            payload.version.clone(),
        ));
    }

    let nonce = decode_fixed::<XSALSA20_NONCE_SIZE>("nonce", &payload.nonce)?;
    let ephemeral_public_key =
        decode_fixed::<X25519_KEY_SIZE>("ephemPublicKey", &payload.ephem_public_key)?;

    let ciphertext = base64_standard_decode(&payload.ciphertext).map_err(|e| {
        EntropyKeysError::MalformedEncryptedPayload(format!("ciphertext: {}", e))
    })?;
    if ciphertext.len() < POLY1305_TAG_SIZE {
        return Err(EntropyKeysError::MalformedEncryptedPayload(format!(
            "ciphertext shorter than the {}-byte authentication tag",
            POLY1305_TAG_SIZE
        )));
    }

    Ok(DecodedPayload {
        nonce,
        ephemeral_public_key,
        ciphertext,
    })
}

/// Open an EIP-1024 envelope addressed to `keypair`.
///
/// # Errors
/// * `UnsupportedEncryptionVersion` for any version other than `x25519-xsalsa20-poly1305`
/// * `MalformedEncryptedPayload` for bad base64, wrong nonce or key length, or a
///   ciphertext too short to hold the tag
/// * `DecryptionAuthenticationFailure` when the tag does not verify
pub fn decrypt(
    keypair: &EncryptionKeypair,
    payload: &Eip1024EncryptedPayload,
) -> EntropyKeysResult<Zeroizing<Vec<u8>>> {
    let decoded = decode_payload(payload)?;

    // Canonical X25519 points never set the top bit and the ladder masks it,
    // so a set bit means the key was altered in transit.
    if decoded.ephemeral_public_key[X25519_KEY_SIZE - 1] & 0x80 != 0 {
        return Err(EntropyKeysError::DecryptionAuthenticationFailure);
    }

    let sender = PublicKey::from(decoded.ephemeral_public_key);
    let salsa_box = SalsaBox::new(&sender, keypair.secret_key());
    salsa_box
        .decrypt(
            GenericArray::from_slice(&decoded.nonce),
            decoded.ciphertext.as_slice(),
        )
        .map(Zeroizing::new)
        .map_err(|_| EntropyKeysError::DecryptionAuthenticationFailure)
}

/// [`decrypt`], then interpret the plaintext as UTF-8.
pub fn decrypt_to_string(
    keypair: &EncryptionKeypair,
    payload: &Eip1024EncryptedPayload,
) -> EntropyKeysResult<String> {
    let plaintext = decrypt(keypair, payload)?;
    std::str::from_utf8(&plaintext)
        .map(str::to_owned)
        .map_err(|_| {
            EntropyKeysError::MalformedEncryptedPayload("plaintext is not valid UTF-8".to_string())
        })
}

/// Encrypt `plaintext` to a base64 X25519 public key with a fresh ephemeral
/// key and random nonce.
pub fn encrypt(
    recipient_public_key_b64: &str,
    plaintext: &[u8],
) -> EntropyKeysResult<Eip1024EncryptedPayload> {
    let recipient = decode_fixed::<X25519_KEY_SIZE>("publicKey", recipient_public_key_b64)
        .map_err(|_| {
            EntropyKeysError::EncryptionFault(
                "recipient public key must be 32 bytes of base64".to_string(),
            )
        })?;

    let mut ephemeral_bytes = Zeroizing::new([0u8; X25519_KEY_SIZE]);
    let mut nonce = [0u8; XSALSA20_NONCE_SIZE];
    getrandom::getrandom(ephemeral_bytes.as_mut_slice())
        .and_then(|_| getrandom::getrandom(&mut nonce))
        .map_err(|e| EntropyKeysError::EncryptionFault(format!("RNG failure: {}", e)))?;

    let ephemeral_secret = SecretKey::from_slice(ephemeral_bytes.as_slice()).map_err(|_| {
        EntropyKeysError::EncryptionFault("ephemeral key must be 32 bytes".to_string())
    })?;
    let ephemeral_public = ephemeral_secret.public_key();

    let salsa_box = SalsaBox::new(&PublicKey::from(recipient), &ephemeral_secret);
    let ciphertext = salsa_box
        .encrypt(GenericArray::from_slice(&nonce), plaintext)
        .map_err(|_| {
            EntropyKeysError::EncryptionFault("XSalsa20-Poly1305 seal failed".to_string())
        })?;

    Ok(Eip1024EncryptedPayload {
        version: EIP1024_VERSION.to_string(),
        nonce: base64_standard_encode(&nonce),
        ephem_public_key: base64_standard_encode(ephemeral_public.as_bytes()),
        ciphertext: base64_standard_encode(&ciphertext),
    })
}
