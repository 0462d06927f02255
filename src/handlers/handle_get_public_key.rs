// ******************************************************************************
// *                                                                            *
// *                        HANDLER 1: GET PUBLIC KEY                           *
// *                                                                            *
// ******************************************************************************
use log::debug;
use serde::Deserialize;
use serde_json::Value;

use super::invalid_params;
use crate::config::ERROR_GET_PUBLIC_KEY_PARAMS;
use crate::crypto::derive_signing_keypair;
use crate::entropy::{resolve_source, EntropySourceRegistry};
use crate::error::EntropyKeysResult;
use crate::types::{deserialize_source_id, parse_typed_params, EntropyKeysMethod};

#[derive(Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct GetPublicKeyRequest {
    #[serde(default, deserialize_with = "deserialize_source_id")]
    pub entropy_source_id: Option<String>, // Primary source when omitted
}

impl GetPublicKeyRequest {
    /// Absent or `null` params select the primary source.
    pub fn from_params(params: Option<&Value>) -> EntropyKeysResult<Self> {
        match params {
            None | Some(Value::Null) => Ok(Self::default()),
            Some(_) => parse_typed_params(params, EntropyKeysMethod::GetPublicKey)
                .map_err(|e| invalid_params(e, ERROR_GET_PUBLIC_KEY_PARAMS)),
        }
    }
}

/// **Handles:** `getPublicKey`
/// Derives the origin-scoped secp256k1 key for one entropy source.
///
/// # Returns
/// `0x`-prefixed hex of the 33-byte compressed public key
pub async fn handle_get_public_key<R>(
    request: GetPublicKeyRequest,
    registry: &R,
    salt: Option<&str>,
) -> EntropyKeysResult<String>
where
    R: EntropySourceRegistry + ?Sized,
{
    let source = resolve_source(registry, request.entropy_source_id.as_deref()).await?;
    debug!(
        "getPublicKey: source {} (salted: {})",
        source.id(),
        salt.is_some()
    );
    let keypair = derive_signing_keypair(source.entropy(), salt)?;
    Ok(keypair.public_key_hex())
}
