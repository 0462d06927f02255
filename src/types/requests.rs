// === REQUEST TYPES ===
// Method names and the `{ method, params }` envelope

use std::fmt;
use std::str::FromStr;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::error::{EntropyKeysError, ParsePayloadError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntropyKeysMethod {
    GetPublicKey,
    GetAllPublicKeys,
    SignMessage,
    GetEncryptionPublicKey,
    DecryptMessage,
}

impl EntropyKeysMethod {
    pub const ALL: [EntropyKeysMethod; 5] = [
        EntropyKeysMethod::GetPublicKey,
        EntropyKeysMethod::GetAllPublicKeys,
        EntropyKeysMethod::SignMessage,
        EntropyKeysMethod::GetEncryptionPublicKey,
        EntropyKeysMethod::DecryptMessage,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            EntropyKeysMethod::GetPublicKey => "getPublicKey",
            EntropyKeysMethod::GetAllPublicKeys => "getAllPublicKeys",
            EntropyKeysMethod::SignMessage => "signMessage",
            EntropyKeysMethod::GetEncryptionPublicKey => "getEncryptionPublicKey",
            EntropyKeysMethod::DecryptMessage => "decryptMessage",
        }
    }
}

impl fmt::Display for EntropyKeysMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for EntropyKeysMethod {
    type Err = EntropyKeysError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        EntropyKeysMethod::ALL
            .into_iter()
            .find(|method| method.name() == s)
            .ok_or_else(|| EntropyKeysError::MethodNotFound(s.to_string()))
    }
}

/// Incoming request. `params` stays raw until the method is known.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct EntropyKeysRequest {
    pub method: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub params: Option<Value>,
}

impl EntropyKeysRequest {
    pub fn new(method: impl Into<String>, params: Option<Value>) -> Self {
        Self {
            method: method.into(),
            params,
        }
    }
}

/// Deserialize method params into a typed request.
///
/// Params must be a JSON object; absent params are treated as an empty one.
/// Unknown fields are ignored.
pub fn parse_typed_params<T: DeserializeOwned>(
    params: Option<&Value>,
    method: EntropyKeysMethod,
) -> Result<T, ParsePayloadError> {
    let value = match params {
        None => Value::Object(Default::default()),
        Some(value @ Value::Object(_)) => value.clone(),
        Some(_) => return Err(ParsePayloadError::new(method.name(), "params must be an object")),
    };
    serde_json::from_value(value).map_err(|e| ParsePayloadError::new(method.name(), e))
}

/// `entropySourceId` is optional but never `null`.
///
/// Pair with `#[serde(default)]`: an absent key stays `None`, while an
/// explicit `null` fails like any other non-string value.
pub fn deserialize_source_id<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    String::deserialize(deserializer).map(Some)
}
