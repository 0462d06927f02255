pub mod handle_decrypt_message;
pub mod handle_get_all_public_keys;
pub mod handle_get_encryption_public_key;
pub mod handle_get_public_key;
pub mod handle_sign_message;

pub use handle_decrypt_message::{handle_decrypt_message, DecryptMessageRequest};
pub use handle_get_all_public_keys::handle_get_all_public_keys;
pub use handle_get_encryption_public_key::{
    handle_get_encryption_public_key, GetEncryptionPublicKeyRequest,
};
pub use handle_get_public_key::{handle_get_public_key, GetPublicKeyRequest};
pub use handle_sign_message::{handle_sign_message, SignMessageRequest};

use log::debug;

use crate::error::{EntropyKeysError, ParsePayloadError};

/// Callers only ever see the fixed per-method message; the parser detail is
/// kept for debug logs.
pub(crate) fn invalid_params(err: ParsePayloadError, message: &str) -> EntropyKeysError {
    debug!("{}", err);
    EntropyKeysError::InvalidParams(message.to_string())
}
