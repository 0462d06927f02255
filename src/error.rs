use std::fmt;
use thiserror::Error;
use wasm_bindgen::JsValue;

pub type EntropyKeysResult<T> = std::result::Result<T, EntropyKeysError>;

/// JSON-RPC style error codes surfaced to the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum EntropyKeysErrorCode {
    /// Application-level failure (authentication of an envelope failed)
    Application = -32000,
    /// Unknown method
    MethodNotFound = -32601,
    /// Malformed caller input
    InvalidParams = -32602,
    /// Internal invariant violation or registry failure
    Internal = -32603,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EntropyKeysError {
    /// Malformed caller input, rejected at the request boundary.
    #[error("{0}")]
    InvalidParams(String),

    #[error("The method does not exist / is not available: {0}")]
    MethodNotFound(String),

    #[error("Unknown entropy source: {0}")]
    UnknownEntropySource(String),

    /// The registry failed to enumerate or supply a source.
    #[error("Entropy registry error: {0}")]
    EntropyRegistry(String),

    /// Internal invariant violation during derivation. Not user-retryable.
    #[error("Key derivation fault: {0}")]
    DerivationFault(String),

    #[error("Signing fault: {0}")]
    SigningFault(String),

    #[error("Encryption fault: {0}")]
    EncryptionFault(String),

    #[error("Unsupported encryption version: {0}")]
    UnsupportedEncryptionVersion(String),

    #[error("Malformed encrypted payload: {0}")]
    MalformedEncryptedPayload(String),

    /// Tag mismatch. Carries no detail about the cause.
    #[error("Decryption failed")]
    DecryptionAuthenticationFailure,
}

impl EntropyKeysError {
    pub fn code(&self) -> EntropyKeysErrorCode {
        match self {
            EntropyKeysError::InvalidParams(_)
            | EntropyKeysError::UnknownEntropySource(_)
            | EntropyKeysError::UnsupportedEncryptionVersion(_)
            | EntropyKeysError::MalformedEncryptedPayload(_) => EntropyKeysErrorCode::InvalidParams,
            EntropyKeysError::MethodNotFound(_) => EntropyKeysErrorCode::MethodNotFound,
            EntropyKeysError::DecryptionAuthenticationFailure => EntropyKeysErrorCode::Application,
            EntropyKeysError::EntropyRegistry(_)
            | EntropyKeysError::DerivationFault(_)
            | EntropyKeysError::SigningFault(_)
            | EntropyKeysError::EncryptionFault(_) => EntropyKeysErrorCode::Internal,
        }
    }

    /// Internal faults indicate a bug or a broken host, never bad input.
    pub fn is_internal(&self) -> bool {
        self.code() == EntropyKeysErrorCode::Internal
    }
}

impl From<EntropyKeysError> for JsValue {
    fn from(err: EntropyKeysError) -> Self {
        let body = serde_json::json!({
            "code": err.code() as i32,
            "message": scrub_error_message(&err.to_string()),
        });
        JsValue::from_str(&body.to_string())
    }
}

// === SECRET SCRUBBING ===

const REDACTED: &str = "[REDACTED]";

/// JSON string fields whose values must never leave the worker.
const SECRET_FIELDS: [&str; 8] = [
    "entropy",
    "privateKey",
    "private_key",
    "secretKey",
    "secret_key",
    "seed",
    "mnemonic",
    "plaintext",
];

/// Redact the values of known secret JSON string fields, in both plain
/// (`"entropy":"..."`) and escaped (`\"entropy\":\"...\"`) form.
pub fn scrub_error_message(message: &str) -> String {
    let mut output = message.to_string();
    for field in SECRET_FIELDS {
        output = scrub_field(&output, &format!("\"{field}\""), "\"");
        output = scrub_field(&output, &format!("\\\"{field}\\\""), "\\\"");
    }
    output
}

fn scrub_field(input: &str, key: &str, quote: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut rest = input;

    while let Some(pos) = rest.find(key) {
        let (head, tail) = rest.split_at(pos + key.len());
        out.push_str(head);
        rest = tail;

        let trimmed = rest.trim_start();
        let Some(after_colon) = trimmed.strip_prefix(':') else {
            continue;
        };
        let value = after_colon.trim_start();
        let Some(after_open) = value.strip_prefix(quote) else {
            continue;
        };

        // Keep the separator bytes exactly as they were.
        out.push_str(&rest[..rest.len() - value.len()]);
        out.push_str(quote);
        out.push_str(REDACTED);
        out.push_str(quote);

        rest = match find_closing_quote(after_open, quote) {
            Some(end) => &after_open[end + quote.len()..],
            None => return out,
        };
    }

    out.push_str(rest);
    out
}

fn find_closing_quote(s: &str, quote: &str) -> Option<usize> {
    if quote != "\"" {
        return s.find(quote);
    }
    let mut escaped = false;
    for (idx, ch) in s.char_indices() {
        match ch {
            _ if escaped => escaped = false,
            '\\' => escaped = true,
            '"' => return Some(idx),
            _ => {}
        }
    }
    None
}

// === PAYLOAD PARSING ===

/// Envelope or params parse failure with method context.
///
/// Deserializer errors can echo the offending value, so the rendered
/// message always goes through [`scrub_error_message`].
pub struct ParsePayloadError {
    pub message_name: String,
    pub detail: String,
}

impl ParsePayloadError {
    pub fn new(message_name: &str, detail: impl fmt::Display) -> Self {
        Self {
            message_name: message_name.to_string(),
            detail: detail.to_string(),
        }
    }
}

impl fmt::Debug for ParsePayloadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ParsePayloadError")
            .field("message_name", &self.message_name)
            .field("error", &self.to_string())
            .finish()
    }
}

impl fmt::Display for ParsePayloadError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let message = format!("Invalid payload for {}: {}", self.message_name, self.detail);
        write!(f, "{}", scrub_error_message(&message))
    }
}

impl From<ParsePayloadError> for EntropyKeysError {
    fn from(err: ParsePayloadError) -> Self {
        EntropyKeysError::InvalidParams(err.to_string())
    }
}
