//! Entropy sources and multi-source orchestration.
//!
//! The worker never stores entropy. Every request asks the injected
//! [`EntropySourceRegistry`] for the bytes it needs and drops them (zeroized)
//! before returning.

use std::fmt;

use async_trait::async_trait;
use log::debug;
use serde::{Deserialize, Serialize};
use zeroize::Zeroizing;

use crate::crypto::{derive_keypair, KeyPurpose};
use crate::error::{EntropyKeysError, EntropyKeysResult};

// === REGISTRY ===

/// One entry of a registry listing. Carries no secret material.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct EntropySourceDescriptor {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default)]
    pub primary: bool,
}

/// Host-provided access to root entropy.
///
/// Futures are `Send` natively so a registry can be shared across a
/// multi-threaded runtime; on wasm32 the host objects are single-threaded.
#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
pub trait EntropySourceRegistry {
    /// Raw entropy for `source_id`, or `None` if no such source exists.
    async fn entropy(&self, source_id: &str) -> EntropyKeysResult<Option<Zeroizing<Vec<u8>>>>;

    /// All sources in stable registry order.
    async fn list_sources(&self) -> EntropyKeysResult<Vec<EntropySourceDescriptor>>;
}

/// Resolved source for the duration of one call.
pub struct EntropySource {
    id: String,
    entropy: Zeroizing<Vec<u8>>,
}

impl EntropySource {
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn entropy(&self) -> &[u8] {
        &self.entropy
    }
}

impl fmt::Debug for EntropySource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EntropySource")
            .field("id", &self.id)
            .field("entropy", &"[REDACTED]")
            .finish()
    }
}

// === IN-MEMORY REGISTRY ===

struct StoredSource {
    descriptor: EntropySourceDescriptor,
    entropy: Zeroizing<Vec<u8>>,
}

/// Ordered, read-only registry for native hosts and tests.
///
/// The first source added is primary unless [`with_primary`](Self::with_primary)
/// names another one.
#[derive(Default)]
pub struct InMemoryEntropyRegistry {
    sources: Vec<StoredSource>,
}

impl InMemoryEntropyRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_source(self, id: impl Into<String>, entropy: impl Into<Vec<u8>>) -> Self {
        self.insert(id.into(), None, entropy.into())
    }

    pub fn with_named_source(
        self,
        id: impl Into<String>,
        name: impl Into<String>,
        entropy: impl Into<Vec<u8>>,
    ) -> Self {
        self.insert(id.into(), Some(name.into()), entropy.into())
    }

    /// Mark `id` as the primary source. Unknown ids leave the registry unchanged.
    pub fn with_primary(mut self, id: &str) -> Self {
        if self.sources.iter().any(|s| s.descriptor.id == id) {
            for source in &mut self.sources {
                source.descriptor.primary = source.descriptor.id == id;
            }
        }
        self
    }

    pub fn len(&self) -> usize {
        self.sources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }

    // Re-adding an id replaces its bytes in place and keeps its position.
    fn insert(mut self, id: String, name: Option<String>, entropy: Vec<u8>) -> Self {
        let entropy = Zeroizing::new(entropy);
        if let Some(existing) = self.sources.iter_mut().find(|s| s.descriptor.id == id) {
            existing.entropy = entropy;
            existing.descriptor.name = name;
            return self;
        }
        let primary = self.sources.is_empty();
        self.sources.push(StoredSource {
            descriptor: EntropySourceDescriptor { id, name, primary },
            entropy,
        });
        self
    }
}

#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
impl EntropySourceRegistry for InMemoryEntropyRegistry {
    async fn entropy(&self, source_id: &str) -> EntropyKeysResult<Option<Zeroizing<Vec<u8>>>> {
        Ok(self
            .sources
            .iter()
            .find(|s| s.descriptor.id == source_id)
            .map(|s| s.entropy.clone()))
    }

    async fn list_sources(&self) -> EntropyKeysResult<Vec<EntropySourceDescriptor>> {
        Ok(self.sources.iter().map(|s| s.descriptor.clone()).collect())
    }
}

// === ORCHESTRATION ===

/// Id of the source the registry marks as primary.
pub async fn primary_source_id<R>(registry: &R) -> EntropyKeysResult<String>
where
    R: EntropySourceRegistry + ?Sized,
{
    registry
        .list_sources()
        .await?
        .into_iter()
        .find(|s| s.primary)
        .map(|s| s.id)
        .ok_or_else(|| EntropyKeysError::EntropyRegistry("no primary entropy source".to_string()))
}

/// Fetch the entropy for `source_id`, or for the primary source when omitted.
pub async fn resolve_source<R>(
    registry: &R,
    source_id: Option<&str>,
) -> EntropyKeysResult<EntropySource>
where
    R: EntropySourceRegistry + ?Sized,
{
    let id = match source_id {
        Some(id) => id.to_string(),
        None => primary_source_id(registry).await?,
    };
    match registry.entropy(&id).await? {
        Some(entropy) => Ok(EntropySource { id, entropy }),
        None => Err(EntropyKeysError::UnknownEntropySource(id)),
    }
}

/// Public key export for every source, in registry order.
///
/// Fails on the first source that cannot be fetched or derived; no partial
/// list is ever returned.
pub async fn derive_all_public_keys<R>(
    registry: &R,
    purpose: KeyPurpose,
    salt: Option<&str>,
) -> EntropyKeysResult<Vec<String>>
where
    R: EntropySourceRegistry + ?Sized,
{
    let sources = registry.list_sources().await?;
    debug!(
        "Deriving {} public keys for {} sources",
        purpose.name(),
        sources.len()
    );

    let mut keys = Vec::with_capacity(sources.len());
    for descriptor in sources {
        let source = resolve_source(registry, Some(&descriptor.id)).await?;
        let keypair = derive_keypair(source.entropy(), salt, purpose)?;
        keys.push(keypair.public_key_export());
    }
    Ok(keys)
}

// === WASM HOST ADAPTER ===

#[cfg(target_arch = "wasm32")]
pub use js_registry::JsEntropyRegistry;

#[cfg(target_arch = "wasm32")]
mod js_registry {
    use async_trait::async_trait;
    use wasm_bindgen::prelude::*;
    use wasm_bindgen_futures::JsFuture;
    use zeroize::Zeroizing;

    use super::{EntropySourceDescriptor, EntropySourceRegistry};
    use crate::encoders::hex_prefixed_decode;
    use crate::error::{EntropyKeysError, EntropyKeysResult};

    #[wasm_bindgen]
    extern "C" {
        /// Host object with `getEntropy(id): Promise<string | undefined>` (hex)
        /// and `listEntropySources(): Promise<{ id, name?, primary }[]>`.
        pub type JsEntropyRegistry;

        #[wasm_bindgen(method, catch, js_name = getEntropy)]
        fn get_entropy(this: &JsEntropyRegistry, source_id: &str) -> Result<js_sys::Promise, JsValue>;

        #[wasm_bindgen(method, catch, js_name = listEntropySources)]
        fn list_entropy_sources(this: &JsEntropyRegistry) -> Result<js_sys::Promise, JsValue>;
    }

    fn registry_error(err: JsValue) -> EntropyKeysError {
        EntropyKeysError::EntropyRegistry(err.as_string().unwrap_or_else(|| format!("{:?}", err)))
    }

    #[async_trait(?Send)]
    impl EntropySourceRegistry for JsEntropyRegistry {
        async fn entropy(&self, source_id: &str) -> EntropyKeysResult<Option<Zeroizing<Vec<u8>>>> {
            let promise = self.get_entropy(source_id).map_err(registry_error)?;
            let value = JsFuture::from(promise).await.map_err(registry_error)?;
            if value.is_undefined() || value.is_null() {
                return Ok(None);
            }
            let hex = Zeroizing::new(value.as_string().ok_or_else(|| {
                EntropyKeysError::EntropyRegistry(
                    "getEntropy must resolve to a hex string".to_string(),
                )
            })?);
            let bytes = hex_prefixed_decode(&hex).map_err(|_| {
                EntropyKeysError::EntropyRegistry("getEntropy returned invalid hex".to_string())
            })?;
            Ok(Some(Zeroizing::new(bytes)))
        }

        async fn list_sources(&self) -> EntropyKeysResult<Vec<EntropySourceDescriptor>> {
            let promise = self.list_entropy_sources().map_err(registry_error)?;
            let value = JsFuture::from(promise).await.map_err(registry_error)?;
            serde_wasm_bindgen::from_value(value)
                .map_err(|e| EntropyKeysError::EntropyRegistry(e.to_string()))
        }
    }
}
