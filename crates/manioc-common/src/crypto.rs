//! Content encryption primitives
//!
//! AES-256-GCM envelope encryption: every sealed value gets a fresh random data key,
//! and the data key itself is sealed with the master key. The sealed data key is the
//! opaque "encrypted data key" persisted next to the content.
//!
//! Sealed format (before base64): 12 byte nonce, ciphertext, 16 byte tag.

use aes_gcm::{
    Aes256Gcm, Nonce,
    aead::{Aead, KeyInit},
};
use base64::{Engine as _, engine::general_purpose::STANDARD as BASE64};
use rand::RngCore;
use thiserror::Error;

const NONCE_LEN: usize = 12;
const KEY_LEN: usize = 32;

/// Error types for encryption operations
#[derive(Error, Debug)]
pub enum CryptoError {
    #[error("Encryption failed: {0}")]
    EncryptionFailed(String),

    #[error("Decryption failed: {0}")]
    DecryptionFailed(String),

    #[error("Invalid key: {0}")]
    InvalidKey(String),

    #[error("Invalid data: {0}")]
    InvalidData(String),

    #[error("Base64 decode error: {0}")]
    Base64Error(String),
}

/// Result type for crypto operations
pub type CryptoResult<T> = Result<T, CryptoError>;

fn random_bytes<const N: usize>() -> [u8; N] {
    let mut bytes = [0u8; N];
    rand::rng().fill_bytes(&mut bytes);
    bytes
}

fn decode_key(key_bytes: Vec<u8>) -> CryptoResult<[u8; KEY_LEN]> {
    let len = key_bytes.len();
    key_bytes
        .try_into()
        .map_err(|_| CryptoError::InvalidKey(format!("Key must be {} bytes, got {}", KEY_LEN, len)))
}

fn seal_with(cipher: &Aes256Gcm, plaintext: &[u8]) -> CryptoResult<String> {
    let nonce_bytes = random_bytes::<NONCE_LEN>();
    let ciphertext = cipher
        .encrypt(Nonce::from_slice(&nonce_bytes), plaintext)
        .map_err(|e| CryptoError::EncryptionFailed(e.to_string()))?;

    let mut combined = Vec::with_capacity(NONCE_LEN + ciphertext.len());
    combined.extend_from_slice(&nonce_bytes);
    combined.extend_from_slice(&ciphertext);
    Ok(BASE64.encode(combined))
}

fn open_with(cipher: &Aes256Gcm, sealed: &str) -> CryptoResult<Vec<u8>> {
    let combined = BASE64
        .decode(sealed)
        .map_err(|e| CryptoError::Base64Error(e.to_string()))?;

    if combined.len() < NONCE_LEN {
        return Err(CryptoError::InvalidData("Ciphertext too short".to_string()));
    }

    let (nonce_bytes, ciphertext) = combined.split_at(NONCE_LEN);
    cipher
        .decrypt(Nonce::from_slice(nonce_bytes), ciphertext)
        .map_err(|e| CryptoError::DecryptionFailed(e.to_string()))
}

fn into_utf8(bytes: Vec<u8>) -> CryptoResult<String> {
    String::from_utf8(bytes)
        .map_err(|e| CryptoError::DecryptionFailed(format!("Invalid UTF-8: {}", e)))
}

/// AES-256-GCM cipher keyed by the master key
pub struct MasterKeyCipher {
    cipher: Aes256Gcm,
}

impl MasterKeyCipher {
    pub fn new(key: &[u8; KEY_LEN]) -> Self {
        Self {
            cipher: Aes256Gcm::new(key.into()),
        }
    }

    /// Create a cipher from a base64-encoded 256-bit key
    pub fn from_base64_key(key: &str) -> CryptoResult<Self> {
        let key_bytes = BASE64
            .decode(key.trim())
            .map_err(|e| CryptoError::Base64Error(e.to_string()))?;
        Ok(Self::new(&decode_key(key_bytes)?))
    }

    pub fn generate_key() -> [u8; KEY_LEN] {
        random_bytes::<KEY_LEN>()
    }

    pub fn generate_base64_key() -> String {
        BASE64.encode(Self::generate_key())
    }

    /// Seal plaintext with the master key, returns base64 text
    pub fn seal(&self, plaintext: &str) -> CryptoResult<String> {
        seal_with(&self.cipher, plaintext.as_bytes())
    }

    /// Open a value produced by [`MasterKeyCipher::seal`]
    pub fn open(&self, sealed: &str) -> CryptoResult<String> {
        into_utf8(open_with(&self.cipher, sealed)?)
    }

    /// Seal plaintext with a fresh data key.
    ///
    /// Returns `(sealed_content, sealed_data_key)`.
    pub fn seal_envelope(&self, plaintext: &str) -> CryptoResult<(String, String)> {
        let data_key = Self::generate_key();
        let content = seal_with(&Aes256Gcm::new((&data_key).into()), plaintext.as_bytes())?;
        let sealed_key = self.seal(&BASE64.encode(data_key))?;
        Ok((content, sealed_key))
    }

    /// Open a value produced by [`MasterKeyCipher::seal_envelope`]
    pub fn open_envelope(&self, sealed_content: &str, sealed_data_key: &str) -> CryptoResult<String> {
        let data_key_base64 = self.open(sealed_data_key)?;
        let data_key = decode_key(
            BASE64
                .decode(&data_key_base64)
                .map_err(|e| CryptoError::Base64Error(e.to_string()))?,
        )?;
        let data_cipher = Aes256Gcm::new((&data_key).into());
        into_utf8(open_with(&data_cipher, sealed_content)?)
    }
}

/// Trait for encryption plugins
///
/// Implement this trait to plug in another encryption backend.
#[async_trait::async_trait]
pub trait EncryptionPlugin: Send + Sync {
    /// Plugin name
    fn name(&self) -> &str;

    /// Encrypt content, returns `(encrypted_content, encrypted_data_key)`
    async fn encrypt(&self, plaintext: &str) -> CryptoResult<(String, String)>;

    /// Decrypt content sealed under `encrypted_data_key`
    async fn decrypt(&self, ciphertext: &str, encrypted_data_key: &str) -> CryptoResult<String>;

    fn is_enabled(&self) -> bool;
}

/// Default AES-GCM envelope encryption plugin
pub struct AesGcmEncryptionPlugin {
    cipher: Option<MasterKeyCipher>,
}

impl AesGcmEncryptionPlugin {
    /// A plugin that passes content through untouched
    pub fn disabled() -> Self {
        Self { cipher: None }
    }

    /// Create an enabled plugin, an empty key yields a disabled plugin
    pub fn new(key: &str) -> CryptoResult<Self> {
        if key.trim().is_empty() {
            return Ok(Self::disabled());
        }
        Ok(Self {
            cipher: Some(MasterKeyCipher::from_base64_key(key)?),
        })
    }
}

#[async_trait::async_trait]
impl EncryptionPlugin for AesGcmEncryptionPlugin {
    fn name(&self) -> &str {
        "aes-gcm"
    }

    async fn encrypt(&self, plaintext: &str) -> CryptoResult<(String, String)> {
        match &self.cipher {
            Some(cipher) => cipher.seal_envelope(plaintext),
            None => Ok((plaintext.to_string(), String::new())),
        }
    }

    async fn decrypt(&self, ciphertext: &str, encrypted_data_key: &str) -> CryptoResult<String> {
        match &self.cipher {
            Some(cipher) if !encrypted_data_key.is_empty() => {
                cipher.open_envelope(ciphertext, encrypted_data_key)
            }
            _ => Ok(ciphertext.to_string()),
        }
    }

    fn is_enabled(&self) -> bool {
        self.cipher.is_some()
    }
}
