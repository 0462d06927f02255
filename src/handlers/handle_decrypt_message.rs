// ******************************************************************************
// *                                                                            *
// *                        HANDLER 5: DECRYPT MESSAGE                          *
// *                                                                            *
// ******************************************************************************
use log::debug;
use serde::Deserialize;
use serde_json::Value;

use super::invalid_params;
use crate::config::{
    EIP1024_EPHEMERAL_KEY_B64_LEN, EIP1024_NONCE_B64_LEN, EIP1024_VERSION,
    ERROR_DECRYPT_MESSAGE_PARAMS,
};
use crate::crypto::derive_encryption_keypair;
use crate::eip1024::decrypt_to_string;
use crate::encoders::base64_standard_decode;
use crate::entropy::{resolve_source, EntropySourceRegistry};
use crate::error::{EntropyKeysResult, ParsePayloadError};
use crate::types::{
    deserialize_source_id, parse_typed_params, Eip1024EncryptedPayload, EntropyKeysMethod,
};

#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DecryptMessageRequest {
    pub data: Eip1024EncryptedPayload,
    #[serde(default, deserialize_with = "deserialize_source_id")]
    pub entropy_source_id: Option<String>,
}

impl DecryptMessageRequest {
    pub fn from_params(params: Option<&Value>) -> EntropyKeysResult<Self> {
        let request: Self = parse_typed_params(params, EntropyKeysMethod::DecryptMessage)
            .map_err(|e| invalid_params(e, ERROR_DECRYPT_MESSAGE_PARAMS))?;
        request
            .check_shape()
            .map_err(|e| invalid_params(e, ERROR_DECRYPT_MESSAGE_PARAMS))?;
        Ok(request)
    }

    // Field shapes only. Decoded lengths are checked again by the decryptor.
    fn check_shape(&self) -> Result<(), ParsePayloadError> {
        let method = EntropyKeysMethod::DecryptMessage.name();
        let data = &self.data;
        if data.version != EIP1024_VERSION {
            return Err(ParsePayloadError::new(method, "unsupported data.version"));
        }
        check_base64_field(method, "data.nonce", &data.nonce, Some(EIP1024_NONCE_B64_LEN))?;
        check_base64_field(
            method,
            "data.ephemPublicKey",
            &data.ephem_public_key,
            Some(EIP1024_EPHEMERAL_KEY_B64_LEN),
        )?;
        check_base64_field(method, "data.ciphertext", &data.ciphertext, None)
    }
}

fn check_base64_field(
    method: &str,
    field: &str,
    value: &str,
    expected_len: Option<usize>,
) -> Result<(), ParsePayloadError> {
    if let Some(len) = expected_len {
        if value.len() != len {
            return Err(ParsePayloadError::new(
                method,
                format!("{} must be {} characters", field, len),
            ));
        }
    }
    base64_standard_decode(value)
        .map(|_| ())
        .map_err(|e| ParsePayloadError::new(method, format!("{}: {}", field, e)))
}

/// **Handles:** `decryptMessage`
/// Opens an EIP-1024 envelope with the origin-scoped X25519 key.
///
/// # Returns
/// The plaintext as a UTF-8 string
pub async fn handle_decrypt_message<R>(
    request: DecryptMessageRequest,
    registry: &R,
    salt: Option<&str>,
) -> EntropyKeysResult<String>
where
    R: EntropySourceRegistry + ?Sized,
{
    let source = resolve_source(registry, request.entropy_source_id.as_deref()).await?;
    debug!(
        "decryptMessage: source {} (salted: {})",
        source.id(),
        salt.is_some()
    );
    let keypair = derive_encryption_keypair(source.entropy(), salt)?;
    decrypt_to_string(&keypair, &request.data)
}
