// ******************************************************************************
// *                                                                            *
// *                   HANDLER 4: GET ENCRYPTION PUBLIC KEY                     *
// *                                                                            *
// ******************************************************************************
use log::debug;
use serde::Deserialize;
use serde_json::Value;

use super::invalid_params;
use crate::config::ERROR_GET_ENCRYPTION_PUBLIC_KEY_PARAMS;
use crate::crypto::derive_encryption_keypair;
use crate::eip1024::encryption_public_key;
use crate::entropy::{resolve_source, EntropySourceRegistry};
use crate::error::EntropyKeysResult;
use crate::types::{deserialize_source_id, parse_typed_params, EntropyKeysMethod};

#[derive(Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct GetEncryptionPublicKeyRequest {
    #[serde(default, deserialize_with = "deserialize_source_id")]
    pub entropy_source_id: Option<String>,
}

impl GetEncryptionPublicKeyRequest {
    pub fn from_params(params: Option<&Value>) -> EntropyKeysResult<Self> {
        match params {
            None | Some(Value::Null) => Ok(Self::default()),
            Some(_) => parse_typed_params(params, EntropyKeysMethod::GetEncryptionPublicKey)
                .map_err(|e| invalid_params(e, ERROR_GET_ENCRYPTION_PUBLIC_KEY_PARAMS)),
        }
    }
}

/// **Handles:** `getEncryptionPublicKey`
///
/// # Returns
/// Standard base64 of the origin-scoped X25519 public key (44 characters)
pub async fn handle_get_encryption_public_key<R>(
    request: GetEncryptionPublicKeyRequest,
    registry: &R,
    salt: Option<&str>,
) -> EntropyKeysResult<String>
where
    R: EntropySourceRegistry + ?Sized,
{
    let source = resolve_source(registry, request.entropy_source_id.as_deref()).await?;
    debug!(
        "getEncryptionPublicKey: source {} (salted: {})",
        source.id(),
        salt.is_some()
    );
    let keypair = derive_encryption_keypair(source.entropy(), salt)?;
    Ok(encryption_public_key(&keypair))
}
