//! EIP-191 personal-message signing over derived secp256k1 keys.
//!
//! The message is signed exactly as given. Callers gate on the `metamask:`
//! prefix before reaching this module; nothing here strips or adds it.

use k256::ecdsa::signature::hazmat::PrehashVerifier;
use k256::ecdsa::{RecoveryId, Signature, VerifyingKey};
use k256::elliptic_curve::sec1::ToEncodedPoint;
use tiny_keccak::{Hasher, Keccak};

use crate::config::{PERSONAL_MESSAGE_PREFIX, RECOVERABLE_SIGNATURE_SIZE};
use crate::crypto::SigningKeypair;
use crate::encoders::{hex_prefixed_decode, hex_prefixed_encode};
use crate::error::{EntropyKeysError, EntropyKeysResult};

/// Ethereum's legacy `v` offset for recoverable signatures.
const RECOVERY_ID_OFFSET: u8 = 27;

/// `keccak256("\x19Ethereum Signed Message:\n" || len(message) || message)`
pub fn hash_personal_message(message: &[u8]) -> [u8; 32] {
    let mut hasher = Keccak::v256();
    let mut hash = [0u8; 32];
    hasher.update(PERSONAL_MESSAGE_PREFIX.as_bytes());
    hasher.update(message.len().to_string().as_bytes());
    hasher.update(message);
    hasher.finalize(&mut hash);
    hash
}

/// Sign `message` with RFC6979 deterministic ECDSA (low-s).
///
/// # Returns
/// `0x`-prefixed hex of `r || s || v`, with `v` in {27, 28}.
pub fn sign_personal_message(keypair: &SigningKeypair, message: &str) -> EntropyKeysResult<String> {
    let digest = hash_personal_message(message.as_bytes());
    let (signature, recovery_id) = keypair
        .signing_key()
        .sign_prehash_recoverable(&digest)
        .map_err(|e| EntropyKeysError::SigningFault(e.to_string()))?;

    let mut out = [0u8; RECOVERABLE_SIGNATURE_SIZE];
    out[..64].copy_from_slice(&signature.to_bytes());
    out[64] = RECOVERY_ID_OFFSET + recovery_id.to_byte();
    Ok(hex_prefixed_encode(&out))
}

fn parse_signature(signature_hex: &str) -> EntropyKeysResult<(Signature, RecoveryId)> {
    let bytes = hex_prefixed_decode(signature_hex).map_err(EntropyKeysError::InvalidParams)?;
    if bytes.len() != RECOVERABLE_SIGNATURE_SIZE {
        return Err(EntropyKeysError::InvalidParams(format!(
            "signature must be {} bytes, got {}",
            RECOVERABLE_SIGNATURE_SIZE,
            bytes.len()
        )));
    }
    let signature = Signature::from_slice(&bytes[..64])
        .map_err(|_| EntropyKeysError::InvalidParams("invalid signature scalars".to_string()))?;
    let v = bytes[64];
    let recovery_id = RecoveryId::from_byte(v.checked_sub(RECOVERY_ID_OFFSET).unwrap_or(v))
        .ok_or_else(|| EntropyKeysError::InvalidParams(format!("invalid recovery byte {}", v)))?;
    Ok((signature, recovery_id))
}

/// Recover the compressed `0x` public key that produced `signature_hex` over `message`.
pub fn recover_public_key(message: &str, signature_hex: &str) -> EntropyKeysResult<String> {
    let (signature, recovery_id) = parse_signature(signature_hex)?;
    let digest = hash_personal_message(message.as_bytes());
    let verifying_key = VerifyingKey::recover_from_prehash(&digest, &signature, recovery_id)
        .map_err(|_| EntropyKeysError::InvalidParams("signature is not recoverable".to_string()))?;
    let point = k256::PublicKey::from(&verifying_key).to_encoded_point(true);
    Ok(hex_prefixed_encode(point.as_bytes()))
}

/// Check `signature_hex` over `message` against a compressed or uncompressed
/// `0x` public key. Malformed inputs are errors; a well-formed signature by a
/// different key is `Ok(false)`.
pub fn verify_personal_message(
    public_key_hex: &str,
    message: &str,
    signature_hex: &str,
) -> EntropyKeysResult<bool> {
    let public_key_bytes =
        hex_prefixed_decode(public_key_hex).map_err(EntropyKeysError::InvalidParams)?;
    let verifying_key = VerifyingKey::from_sec1_bytes(&public_key_bytes)
        .map_err(|_| EntropyKeysError::InvalidParams("invalid secp256k1 public key".to_string()))?;
    let (signature, _) = parse_signature(signature_hex)?;
    let digest = hash_personal_message(message.as_bytes());
    Ok(verifying_key.verify_prehash(&digest, &signature).is_ok())
}
