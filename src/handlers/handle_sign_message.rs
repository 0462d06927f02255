// ******************************************************************************
// *                                                                            *
// *                          HANDLER 3: SIGN MESSAGE                           *
// *                                                                            *
// ******************************************************************************
use log::debug;
use serde::Deserialize;
use serde_json::Value;

use super::invalid_params;
use crate::config::{ERROR_SIGN_MESSAGE_PARAMS, SIGN_MESSAGE_PREFIX};
use crate::crypto::derive_signing_keypair;
use crate::entropy::{resolve_source, EntropySourceRegistry};
use crate::error::{EntropyKeysResult, ParsePayloadError};
use crate::personal_sign::sign_personal_message;
use crate::types::{deserialize_source_id, parse_typed_params, EntropyKeysMethod};

#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SignMessageRequest {
    pub message: String, // Must begin with `metamask:`
    #[serde(default, deserialize_with = "deserialize_source_id")]
    pub entropy_source_id: Option<String>,
}

impl SignMessageRequest {
    pub fn from_params(params: Option<&Value>) -> EntropyKeysResult<Self> {
        let request: Self = parse_typed_params(params, EntropyKeysMethod::SignMessage)
            .map_err(|e| invalid_params(e, ERROR_SIGN_MESSAGE_PARAMS))?;
        request.validate()?;
        Ok(request)
    }

    pub fn validate(&self) -> EntropyKeysResult<()> {
        if !self.message.starts_with(SIGN_MESSAGE_PREFIX) {
            return Err(invalid_params(
                ParsePayloadError::new(
                    EntropyKeysMethod::SignMessage.name(),
                    format!("message must begin with {}", SIGN_MESSAGE_PREFIX),
                ),
                ERROR_SIGN_MESSAGE_PARAMS,
            ));
        }
        Ok(())
    }
}

/// **Handles:** `signMessage`
/// Signs the full message, prefix included, with the origin-scoped
/// secp256k1 key using EIP-191 personal_sign.
///
/// # Returns
/// `0x`-prefixed 65-byte `r || s || v` signature
pub async fn handle_sign_message<R>(
    request: SignMessageRequest,
    registry: &R,
    salt: Option<&str>,
) -> EntropyKeysResult<String>
where
    R: EntropySourceRegistry + ?Sized,
{
    // Library callers may build the request directly.
    request.validate()?;

    let source = resolve_source(registry, request.entropy_source_id.as_deref()).await?;
    debug!(
        "signMessage: source {}, {} byte message (salted: {})",
        source.id(),
        request.message.len(),
        salt.is_some()
    );
    let keypair = derive_signing_keypair(source.entropy(), salt)?;
    sign_personal_message(&keypair, &request.message)
}
