// ******************************************************************************
// *                                                                            *
// *                      HANDLER 2: GET ALL PUBLIC KEYS                        *
// *                                                                            *
// ******************************************************************************
use log::debug;

use crate::crypto::KeyPurpose;
use crate::entropy::{derive_all_public_keys, EntropySourceRegistry};
use crate::error::EntropyKeysResult;

/// **Handles:** `getAllPublicKeys`
/// One signing public key per registered source, in registry order. Params
/// are ignored. The first failing source fails the whole call.
pub async fn handle_get_all_public_keys<R>(
    registry: &R,
    salt: Option<&str>,
) -> EntropyKeysResult<Vec<String>>
where
    R: EntropySourceRegistry + ?Sized,
{
    debug!("getAllPublicKeys (salted: {})", salt.is_some());
    derive_all_public_keys(registry, KeyPurpose::Signing, salt).await
}
