mod config;
mod crypto;
mod eip1024;
mod encoders;
mod entropy;
mod error;
mod handlers;
mod logger;
mod personal_sign;
mod salt_policy;
#[cfg(test)]
mod tests;
mod types;

use log::debug;
use serde_json::Value;
use wasm_bindgen::prelude::*;

use crate::error::ParsePayloadError;

pub use crate::config::{EIP1024_VERSION, INTERNAL_ORIGINS, SIGN_MESSAGE_PREFIX};
pub use crate::crypto::{
    derive_encryption_keypair, derive_keypair, derive_signing_keypair, DerivedKeypair,
    EncryptionKeypair, KeyPurpose, SigningKeypair,
};
pub use crate::eip1024::{decrypt, decrypt_to_string, encrypt, encryption_public_key};
#[cfg(target_arch = "wasm32")]
pub use crate::entropy::JsEntropyRegistry;
pub use crate::entropy::{
    derive_all_public_keys, primary_source_id, resolve_source, EntropySource,
    EntropySourceDescriptor, EntropySourceRegistry, InMemoryEntropyRegistry,
};
pub use crate::error::{
    scrub_error_message, EntropyKeysError, EntropyKeysErrorCode, EntropyKeysResult,
};
pub use crate::personal_sign::{
    hash_personal_message, recover_public_key, sign_personal_message, verify_personal_message,
};
pub use crate::salt_policy::{salt_for_origin, SaltPolicy};
pub use crate::types::{Eip1024EncryptedPayload, EntropyKeysMethod, EntropyKeysRequest};
pub use handlers::{
    // Get Public Key
    handle_get_public_key,
    GetPublicKeyRequest,
    // Get All Public Keys
    handle_get_all_public_keys,
    // Sign Message
    handle_sign_message,
    SignMessageRequest,
    // Get Encryption Public Key
    handle_get_encryption_public_key,
    GetEncryptionPublicKeyRequest,
    // Decrypt Message
    handle_decrypt_message,
    DecryptMessageRequest,
};

#[wasm_bindgen]
pub fn init_worker() {
    logger::init(config::CURRENT_LOG_LEVEL);
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

/// Route one `{ method, params }` request.
///
/// `origin` is only used to pick the derivation salt through `policy`.
/// Params are validated before any entropy is fetched.
pub async fn handle_entropy_keys_request<R>(
    registry: &R,
    policy: &SaltPolicy,
    origin: &str,
    request: EntropyKeysRequest,
) -> EntropyKeysResult<Value>
where
    R: EntropySourceRegistry + ?Sized,
{
    let method: EntropyKeysMethod = request.method.parse()?;
    let salt = policy.salt_for(origin);
    let params = request.params.as_ref();

    debug!(
        "Entropy keys worker: received {} (salted: {})",
        method,
        salt.is_some()
    );

    let response = match method {
        EntropyKeysMethod::GetPublicKey => {
            let request = GetPublicKeyRequest::from_params(params)?;
            Value::String(handlers::handle_get_public_key(request, registry, salt).await?)
        }
        EntropyKeysMethod::GetAllPublicKeys => {
            Value::from(handlers::handle_get_all_public_keys(registry, salt).await?)
        }
        EntropyKeysMethod::SignMessage => {
            let request = SignMessageRequest::from_params(params)?;
            Value::String(handlers::handle_sign_message(request, registry, salt).await?)
        }
        EntropyKeysMethod::GetEncryptionPublicKey => {
            let request = GetEncryptionPublicKeyRequest::from_params(params)?;
            Value::String(
                handlers::handle_get_encryption_public_key(request, registry, salt).await?,
            )
        }
        EntropyKeysMethod::DecryptMessage => {
            let request = DecryptMessageRequest::from_params(params)?;
            Value::String(handlers::handle_decrypt_message(request, registry, salt).await?)
        }
    };

    Ok(response)
}

/// JSON-in, JSON-out variant of [`handle_entropy_keys_request`].
pub async fn handle_entropy_keys_json<R>(
    registry: &R,
    policy: &SaltPolicy,
    origin: &str,
    request_json: &str,
) -> EntropyKeysResult<String>
where
    R: EntropySourceRegistry + ?Sized,
{
    let request: EntropyKeysRequest = serde_json::from_str(request_json)
        .map_err(|e| EntropyKeysError::from(ParsePayloadError::new("request", e)))?;
    let response = handle_entropy_keys_request(registry, policy, origin, request).await?;
    Ok(response.to_string())
}

/// Unified wasm entry point. Uses the default internal-origin allow-list.
///
/// Errors reject with a JSON `{ code, message }` string, secrets scrubbed.
#[cfg(target_arch = "wasm32")]
#[wasm_bindgen]
pub async fn handle_entropy_keys_message(
    origin: String,
    message_val: JsValue,
    registry: JsEntropyRegistry,
) -> Result<JsValue, JsValue> {
    use serde::Serialize;

    init_worker();

    let request: EntropyKeysRequest = serde_wasm_bindgen::from_value(message_val)
        .map_err(|e| EntropyKeysError::from(ParsePayloadError::new("request", e)))?;
    let response =
        handle_entropy_keys_request(&registry, &SaltPolicy::default(), &origin, request).await?;

    response
        .serialize(&serde_wasm_bindgen::Serializer::json_compatible())
        .map_err(|e| JsValue::from_str(&format!("Failed to serialize result: {:?}", e)))
}
