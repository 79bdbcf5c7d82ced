//! PKCE code verifier generation, persistence and challenge derivation.

use std::sync::Arc;

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use rand::RngCore;
use sha2::{Digest, Sha256};

use super::store::OptionStore;
use crate::error::{KitError, Result};

/// Option key the verifier is stored under between `oauth_url()` and the
/// code exchange.
pub const CODE_VERIFIER_OPTION: &str = "ck_code_verifier";

const VERIFIER_BYTES: usize = 64;

/// Base64URL without padding.
pub fn base64_urlencode(input: impl AsRef<[u8]>) -> String {
    URL_SAFE_NO_PAD.encode(input)
}

/// Inverse of [`base64_urlencode`].
pub fn base64_urldecode(input: &str) -> Result<Vec<u8>> {
    URL_SAFE_NO_PAD
        .decode(input.trim_end_matches('='))
        .map_err(|e| KitError::InvalidArgument(format!("invalid base64url input: {e}")))
}

/// Fresh verifier: 64 random bytes, base64url encoded.
pub fn generate_code_verifier() -> String {
    let mut buf = [0u8; VERIFIER_BYTES];
    rand::thread_rng().fill_bytes(&mut buf);
    base64_urlencode(buf)
}

/// S256 challenge for a verifier.
pub fn code_challenge(code_verifier: &str) -> String {
    base64_urlencode(Sha256::digest(code_verifier.as_bytes()))
}

/// Stored verifier, reused until a code exchange is attempted.
///
/// # Example
/// ```
/// use std::sync::Arc;
/// use kit_api::auth::{MemoryOptionStore, PkceVerifier};
///
/// let pkce = PkceVerifier::new(Arc::new(MemoryOptionStore::new()));
/// let first = pkce.get_or_create()?;
/// assert_eq!(pkce.get_or_create()?, first);
/// pkce.delete()?;
/// assert_ne!(pkce.get_or_create()?, first);
/// # Ok::<(), kit_api::error::KitError>(())
/// ```
#[derive(Clone)]
pub struct PkceVerifier {
    store: Arc<dyn OptionStore>,
}

impl PkceVerifier {
    pub fn new(store: Arc<dyn OptionStore>) -> Self {
        Self { store }
    }

    /// The stored verifier, generating and storing one if none exists.
    pub fn get_or_create(&self) -> Result<String> {
        if let Some(existing) = self.get()? {
            return Ok(existing);
        }
        let verifier = generate_code_verifier();
        self.store.set(CODE_VERIFIER_OPTION, &verifier)?;
        Ok(verifier)
    }

    pub fn get(&self) -> Result<Option<String>> {
        Ok(self
            .store
            .get(CODE_VERIFIER_OPTION)?
            .filter(|v| !v.is_empty()))
    }

    pub fn delete(&self) -> Result<()> {
        self.store.delete(CODE_VERIFIER_OPTION)
    }
}
