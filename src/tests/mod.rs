mod handlers_tests;

use crate::entropy::InMemoryEntropyRegistry;

/// 64-byte BIP-39 seed used as the primary source across tests.
pub(crate) const TEST_SEED_HEX: &str = "16270f7b026afe7a3746efbfcf43e083500951db9e2699d1e4f372515dabcc80459b9181c3937b5faa4b8f7602f886553d2c32c5f12f3331cef40153aead4de6";

pub(crate) fn primary_entropy() -> Vec<u8> {
    hex::decode(TEST_SEED_HEX).unwrap()
}

pub(crate) fn secondary_entropy() -> Vec<u8> {
    vec![0x42u8; 32]
}

/// Two sources: `primary` (primary) then `secondary`.
pub(crate) fn test_registry() -> InMemoryEntropyRegistry {
    InMemoryEntropyRegistry::new()
        .with_named_source("primary", "Primary SRP", primary_entropy())
        .with_source("secondary", secondary_entropy())
}
