use async_trait::async_trait;
use serde_json::{json, Value};
use zeroize::Zeroizing;

use crate::config::{
    ERROR_DECRYPT_MESSAGE_PARAMS, ERROR_GET_ENCRYPTION_PUBLIC_KEY_PARAMS,
    ERROR_GET_PUBLIC_KEY_PARAMS, ERROR_SIGN_MESSAGE_PARAMS,
};
use crate::eip1024::encrypt;
use crate::entropy::{
    resolve_source, EntropySourceDescriptor, EntropySourceRegistry, InMemoryEntropyRegistry,
};
use crate::error::{EntropyKeysError, EntropyKeysErrorCode, EntropyKeysResult};
use crate::personal_sign::verify_personal_message;
use crate::salt_policy::SaltPolicy;
use crate::types::EntropyKeysRequest;
use crate::{handle_entropy_keys_json, handle_entropy_keys_request};

use super::test_registry;

const EXTERNAL_ORIGIN: &str = "https://example.com";

async fn call(origin: &str, method: &str, params: Option<Value>) -> EntropyKeysResult<Value> {
    handle_entropy_keys_request(
        &test_registry(),
        &SaltPolicy::default(),
        origin,
        EntropyKeysRequest::new(method, params),
    )
    .await
}

async fn call_str(origin: &str, method: &str, params: Option<Value>) -> String {
    match call(origin, method, params).await.unwrap() {
        Value::String(s) => s,
        other => panic!("expected string result, got {}", other),
    }
}

// === getPublicKey ===

#[tokio::test]
async fn get_public_key_defaults_to_primary_source() {
    let implicit = call_str(EXTERNAL_ORIGIN, "getPublicKey", None).await;
    let null_params = call_str(EXTERNAL_ORIGIN, "getPublicKey", Some(Value::Null)).await;
    let empty = call_str(EXTERNAL_ORIGIN, "getPublicKey", Some(json!({}))).await;
    let explicit = call_str(
        EXTERNAL_ORIGIN,
        "getPublicKey",
        Some(json!({ "entropySourceId": "primary" })),
    )
    .await;

    assert_eq!(implicit, explicit);
    assert_eq!(null_params, explicit);
    assert_eq!(empty, explicit);
    assert_eq!(implicit.len(), 68);
}

#[tokio::test]
async fn published_keys_are_stable_per_origin() {
    for (origin, signing, encryption) in [
        (
            EXTERNAL_ORIGIN,
            "0x0299d050249235080ffc903bb0d4ac94bed1f5f6efa2cd33751c62af6dbcca9eba",
            "sfvhn9NwnoKzxuPioO2p8mhjPMt7AVkNEV+oLgi55BI=",
        ),
        (
            "metamask",
            "0x03ddefd2eb4df15996e4caf9c2156284e1cad349e756c7b5caeb0d8dde152b5b50",
            "Czkua7+C3bNN079xZpopZI+9EVIPUjsms5+nxlybezI=",
        ),
    ] {
        assert_eq!(call_str(origin, "getPublicKey", None).await, signing);
        assert_eq!(
            call_str(origin, "getEncryptionPublicKey", None).await,
            encryption
        );
    }
}

#[tokio::test]
async fn get_public_key_differs_per_source() {
    let primary = call_str(EXTERNAL_ORIGIN, "getPublicKey", None).await;
    let secondary = call_str(
        EXTERNAL_ORIGIN,
        "getPublicKey",
        Some(json!({ "entropySourceId": "secondary" })),
    )
    .await;
    assert_ne!(primary, secondary);
}

#[tokio::test]
async fn internal_origins_share_the_unsalted_key() {
    let from_extension = call_str("metamask", "getPublicKey", None).await;
    let from_docs = call_str("https://docs.metamask.io", "getPublicKey", None).await;
    let from_empty = call_str("", "getPublicKey", None).await;
    let from_dapp = call_str(EXTERNAL_ORIGIN, "getPublicKey", None).await;

    assert_eq!(from_extension, from_docs);
    assert_eq!(from_extension, from_empty);
    assert_ne!(from_extension, from_dapp);
}

#[tokio::test]
async fn unknown_source_is_reported() {
    let err = call(
        EXTERNAL_ORIGIN,
        "getPublicKey",
        Some(json!({ "entropySourceId": "missing" })),
    )
    .await
    .unwrap_err();
    assert_eq!(err, EntropyKeysError::UnknownEntropySource("missing".into()));
}

#[tokio::test]
async fn non_string_source_id_is_invalid_params() {
    let err = call(
        EXTERNAL_ORIGIN,
        "getPublicKey",
        Some(json!({ "entropySourceId": 5 })),
    )
    .await
    .unwrap_err();
    assert_eq!(
        err,
        EntropyKeysError::InvalidParams(ERROR_GET_PUBLIC_KEY_PARAMS.to_string())
    );
    assert_eq!(err.code(), EntropyKeysErrorCode::InvalidParams);
}

#[tokio::test]
async fn null_source_id_is_invalid_params_for_every_method() {
    let public_key = call_str(EXTERNAL_ORIGIN, "getEncryptionPublicKey", None).await;
    let payload = encrypt(&public_key, b"hi").unwrap();

    let cases = [
        (
            "getPublicKey",
            json!({ "entropySourceId": null }),
            ERROR_GET_PUBLIC_KEY_PARAMS,
        ),
        (
            "signMessage",
            json!({ "message": "metamask:x", "entropySourceId": null }),
            ERROR_SIGN_MESSAGE_PARAMS,
        ),
        (
            "getEncryptionPublicKey",
            json!({ "entropySourceId": null }),
            ERROR_GET_ENCRYPTION_PUBLIC_KEY_PARAMS,
        ),
        (
            "decryptMessage",
            json!({ "data": payload, "entropySourceId": null }),
            ERROR_DECRYPT_MESSAGE_PARAMS,
        ),
    ];

    for (method, params, message) in cases {
        let err = call(EXTERNAL_ORIGIN, method, Some(params)).await.unwrap_err();
        assert_eq!(
            err,
            EntropyKeysError::InvalidParams(message.to_string()),
            "{method}"
        );
    }
}

// === getAllPublicKeys ===

#[tokio::test]
async fn get_all_public_keys_follows_registry_order() {
    let all = call(EXTERNAL_ORIGIN, "getAllPublicKeys", Some(json!({ "ignored": true })))
        .await
        .unwrap();
    let primary = call_str(EXTERNAL_ORIGIN, "getPublicKey", None).await;
    let secondary = call_str(
        EXTERNAL_ORIGIN,
        "getPublicKey",
        Some(json!({ "entropySourceId": "secondary" })),
    )
    .await;

    assert_eq!(all, json!([primary, secondary]));
}

#[tokio::test]
async fn get_all_public_keys_on_empty_registry_is_empty() {
    let result = handle_entropy_keys_request(
        &InMemoryEntropyRegistry::new(),
        &SaltPolicy::default(),
        EXTERNAL_ORIGIN,
        EntropyKeysRequest::new("getAllPublicKeys", None),
    )
    .await
    .unwrap();
    assert_eq!(result, json!([]));
}

#[tokio::test]
async fn get_all_public_keys_fails_fast() {
    let registry = test_registry().with_source("truncated", vec![1u8; 8]);
    let err = handle_entropy_keys_request(
        &registry,
        &SaltPolicy::default(),
        EXTERNAL_ORIGIN,
        EntropyKeysRequest::new("getAllPublicKeys", None),
    )
    .await
    .unwrap_err();
    assert!(matches!(err, EntropyKeysError::DerivationFault(_)));
}

// === signMessage ===

#[tokio::test]
async fn sign_message_verifies_against_get_public_key() {
    let message = "metamask:sign-in";
    let signature = call_str(
        EXTERNAL_ORIGIN,
        "signMessage",
        Some(json!({ "message": message })),
    )
    .await;
    let public_key = call_str(EXTERNAL_ORIGIN, "getPublicKey", None).await;
    let unsalted_key = call_str("metamask", "getPublicKey", None).await;

    assert!(verify_personal_message(&public_key, message, &signature).unwrap());
    assert!(!verify_personal_message(&unsalted_key, message, &signature).unwrap());
}

#[tokio::test]
async fn sign_message_rejects_missing_prefix() {
    for params in [
        None,
        Some(json!({})),
        Some(json!({ "message": "hello" })),
        Some(json!({ "message": "MetaMask:hello" })),
        Some(json!({ "message": 42 })),
    ] {
        let err = call(EXTERNAL_ORIGIN, "signMessage", params).await.unwrap_err();
        assert_eq!(
            err,
            EntropyKeysError::InvalidParams(ERROR_SIGN_MESSAGE_PARAMS.to_string())
        );
    }
}

#[tokio::test]
async fn sign_message_with_bare_prefix_is_accepted() {
    let signature = call_str(
        EXTERNAL_ORIGIN,
        "signMessage",
        Some(json!({ "message": "metamask:" })),
    )
    .await;
    assert_eq!(signature.len(), 2 + 65 * 2);
}

// === getEncryptionPublicKey ===

#[tokio::test]
async fn encryption_public_key_is_origin_scoped() {
    let dapp = call_str(EXTERNAL_ORIGIN, "getEncryptionPublicKey", None).await;
    let extension = call_str("metamask", "getEncryptionPublicKey", None).await;

    assert_eq!(dapp.len(), 44);
    assert_eq!(extension.len(), 44);
    assert_ne!(dapp, extension);
}

#[tokio::test]
async fn encryption_public_key_rejects_bad_params() {
    let err = call(
        EXTERNAL_ORIGIN,
        "getEncryptionPublicKey",
        Some(json!({ "entropySourceId": ["primary"] })),
    )
    .await
    .unwrap_err();
    assert_eq!(
        err,
        EntropyKeysError::InvalidParams(ERROR_GET_ENCRYPTION_PUBLIC_KEY_PARAMS.to_string())
    );
}

// === decryptMessage ===

#[tokio::test]
async fn decrypt_message_round_trips_through_dispatch() {
    let public_key = call_str(EXTERNAL_ORIGIN, "getEncryptionPublicKey", None).await;
    let payload = encrypt(&public_key, "metamask rocks".as_bytes()).unwrap();

    let plaintext = call_str(
        EXTERNAL_ORIGIN,
        "decryptMessage",
        Some(json!({ "data": payload })),
    )
    .await;
    assert_eq!(plaintext, "metamask rocks");

    let err = call(
        "metamask",
        "decryptMessage",
        Some(json!({ "data": payload })),
    )
    .await
    .unwrap_err();
    assert_eq!(err, EntropyKeysError::DecryptionAuthenticationFailure);
}

#[tokio::test]
async fn decrypt_message_validates_payload_shape() {
    let public_key = call_str(EXTERNAL_ORIGIN, "getEncryptionPublicKey", None).await;
    let payload = serde_json::to_value(encrypt(&public_key, b"x").unwrap()).unwrap();

    let mut wrong_version = payload.clone();
    wrong_version["version"] = json!("x25519-chacha20-poly1305");
    let mut short_nonce = payload.clone();
    short_nonce["nonce"] = json!("AAAA");
    let mut bad_key = payload.clone();
    bad_key["ephemPublicKey"] = json!("!".repeat(44));
    let mut bad_ciphertext = payload.clone();
    bad_ciphertext["ciphertext"] = json!("not base64");

    for data in [wrong_version, short_nonce, bad_key, bad_ciphertext] {
        let err = call(
            EXTERNAL_ORIGIN,
            "decryptMessage",
            Some(json!({ "data": data })),
        )
        .await
        .unwrap_err();
        assert_eq!(
            err,
            EntropyKeysError::InvalidParams(ERROR_DECRYPT_MESSAGE_PARAMS.to_string())
        );
    }

    let err = call(EXTERNAL_ORIGIN, "decryptMessage", None).await.unwrap_err();
    assert_eq!(
        err,
        EntropyKeysError::InvalidParams(ERROR_DECRYPT_MESSAGE_PARAMS.to_string())
    );
}

#[tokio::test]
async fn decrypt_message_uses_requested_source() {
    let public_key = call_str(
        EXTERNAL_ORIGIN,
        "getEncryptionPublicKey",
        Some(json!({ "entropySourceId": "secondary" })),
    )
    .await;
    let payload = encrypt(&public_key, b"for secondary").unwrap();

    let plaintext = call_str(
        EXTERNAL_ORIGIN,
        "decryptMessage",
        Some(json!({ "data": payload, "entropySourceId": "secondary" })),
    )
    .await;
    assert_eq!(plaintext, "for secondary");

    let err = call(
        EXTERNAL_ORIGIN,
        "decryptMessage",
        Some(json!({ "data": payload })),
    )
    .await
    .unwrap_err();
    assert_eq!(err, EntropyKeysError::DecryptionAuthenticationFailure);
}

// === routing ===

#[tokio::test]
async fn unknown_method_is_method_not_found() {
    let err = call(EXTERNAL_ORIGIN, "getPrivateKey", None).await.unwrap_err();
    assert_eq!(err, EntropyKeysError::MethodNotFound("getPrivateKey".into()));
    assert_eq!(err.code() as i32, -32601);
}

#[tokio::test]
async fn custom_salt_policy_changes_unsalted_origins() {
    let policy = SaltPolicy::new([EXTERNAL_ORIGIN]);
    let registry = test_registry();
    let request = || EntropyKeysRequest::new("getPublicKey", None);

    let custom = handle_entropy_keys_request(&registry, &policy, EXTERNAL_ORIGIN, request())
        .await
        .unwrap();
    let unsalted = handle_entropy_keys_request(&registry, &policy, "", request())
        .await
        .unwrap();
    let metamask = handle_entropy_keys_request(&registry, &policy, "metamask", request())
        .await
        .unwrap();

    assert_eq!(custom, unsalted);
    assert_ne!(metamask, unsalted);
}

#[tokio::test]
async fn json_entry_point_returns_json_text() {
    let registry = test_registry();
    let output = handle_entropy_keys_json(
        &registry,
        &SaltPolicy::default(),
        EXTERNAL_ORIGIN,
        r#"{"method":"getAllPublicKeys"}"#,
    )
    .await
    .unwrap();
    let parsed: Vec<String> = serde_json::from_str(&output).unwrap();
    assert_eq!(parsed.len(), 2);

    let err = handle_entropy_keys_json(&registry, &SaltPolicy::default(), "", "{not json")
        .await
        .unwrap_err();
    assert!(matches!(err, EntropyKeysError::InvalidParams(_)));
}

// === registry behaviour ===

struct UnavailableRegistry;

#[async_trait]
impl EntropySourceRegistry for UnavailableRegistry {
    async fn entropy(&self, _source_id: &str) -> EntropyKeysResult<Option<Zeroizing<Vec<u8>>>> {
        Err(EntropyKeysError::EntropyRegistry("locked".to_string()))
    }

    async fn list_sources(&self) -> EntropyKeysResult<Vec<EntropySourceDescriptor>> {
        Err(EntropyKeysError::EntropyRegistry("locked".to_string()))
    }
}

#[tokio::test]
async fn registry_failures_propagate() {
    let err = handle_entropy_keys_request(
        &UnavailableRegistry,
        &SaltPolicy::default(),
        EXTERNAL_ORIGIN,
        EntropyKeysRequest::new("getPublicKey", Some(json!({ "entropySourceId": "primary" }))),
    )
    .await
    .unwrap_err();
    assert_eq!(err, EntropyKeysError::EntropyRegistry("locked".into()));
    assert!(err.is_internal());
}

#[tokio::test]
async fn with_primary_moves_the_default_source() {
    let registry = test_registry().with_primary("secondary");
    let source = resolve_source(&registry, None).await.unwrap();
    assert_eq!(source.id(), "secondary");

    let listed = registry.list_sources().await.unwrap();
    assert_eq!(listed.len(), 2);
    assert!(!listed[0].primary);
    assert!(listed[1].primary);
    assert_eq!(listed[0].name.as_deref(), Some("Primary SRP"));
}

#[tokio::test]
async fn empty_registry_has_no_primary() {
    let err = resolve_source(&InMemoryEntropyRegistry::new(), None)
        .await
        .unwrap_err();
    assert!(matches!(err, EntropyKeysError::EntropyRegistry(_)));
}
