//! Config content encryption
//!
//! Encryption is chosen per data id: only data ids matching one of the configured
//! patterns are sealed, everything else passes through with an empty data key.

use std::fmt::{Display, Formatter};
use std::str::FromStr;
use std::sync::Arc;

use async_trait::async_trait;
use regex::Regex;
use tracing::debug;

use manioc_common::crypto::{AesGcmEncryptionPlugin, CryptoError, CryptoResult, EncryptionPlugin};

/// Default data id prefix selecting encryption
pub const DEFAULT_CIPHER_PREFIX: &str = "cipher-";

/// Content after the encryption strategy ran
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EncryptedContent {
    /// Empty when the content was left in plaintext
    pub encrypted_data_key: String,
    pub content: String,
}

impl EncryptedContent {
    pub fn plain(content: &str) -> Self {
        Self {
            encrypted_data_key: String::new(),
            content: content.to_string(),
        }
    }

    pub fn is_encrypted(&self) -> bool {
        !self.encrypted_data_key.is_empty()
    }
}

/// Per-entry encryption strategy
#[async_trait]
pub trait EncryptionAdapter: Send + Sync {
    /// Encrypt content for `data_id`, or pass it through unchanged
    async fn encrypt(&self, data_id: &str, content: &str) -> CryptoResult<EncryptedContent>;

    /// Decrypt content stored with `encrypted_data_key`; empty key means plaintext
    async fn decrypt(
        &self,
        data_id: &str,
        encrypted_data_key: &str,
        content: &str,
    ) -> CryptoResult<String>;
}

/// Passthrough strategy
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopEncryption;

#[async_trait]
impl EncryptionAdapter for NoopEncryption {
    async fn encrypt(&self, _data_id: &str, content: &str) -> CryptoResult<EncryptedContent> {
        Ok(EncryptedContent::plain(content))
    }

    async fn decrypt(
        &self,
        _data_id: &str,
        _encrypted_data_key: &str,
        content: &str,
    ) -> CryptoResult<String> {
        Ok(content.to_string())
    }
}

/// Pattern for determining which configs should be encrypted
#[derive(Clone, Debug)]
pub enum EncryptionPattern {
    /// Match by prefix (e.g., "cipher-")
    Prefix(String),
    /// Match by suffix (e.g., "-secret")
    Suffix(String),
    /// Match by substring (e.g., "password")
    Contains(String),
    /// Match by exact name
    Exact(String),
    /// Match by regex
    Regex(Regex),
}

impl EncryptionPattern {
    pub fn matches(&self, data_id: &str) -> bool {
        match self {
            EncryptionPattern::Prefix(prefix) => data_id.starts_with(prefix),
            EncryptionPattern::Suffix(suffix) => data_id.ends_with(suffix),
            EncryptionPattern::Contains(substring) => data_id.contains(substring),
            EncryptionPattern::Exact(exact) => data_id == exact,
            EncryptionPattern::Regex(re) => re.is_match(data_id),
        }
    }
}

/// Parses `kind:value`, a bare value is a prefix
impl FromStr for EncryptionPattern {
    type Err = CryptoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (kind, value) = s.split_once(':').unwrap_or(("prefix", s));
        if value.is_empty() {
            return Err(CryptoError::InvalidData(format!("empty encryption pattern '{}'", s)));
        }

        match kind {
            "prefix" => Ok(EncryptionPattern::Prefix(value.to_string())),
            "suffix" => Ok(EncryptionPattern::Suffix(value.to_string())),
            "contains" => Ok(EncryptionPattern::Contains(value.to_string())),
            "exact" => Ok(EncryptionPattern::Exact(value.to_string())),
            "regex" => Regex::new(value)
                .map(EncryptionPattern::Regex)
                .map_err(|e| CryptoError::InvalidData(format!("invalid pattern regex: {}", e))),
            _ => Err(CryptoError::InvalidData(format!(
                "unknown encryption pattern kind '{}'",
                kind
            ))),
        }
    }
}

impl Display for EncryptionPattern {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            EncryptionPattern::Prefix(v) => write!(f, "prefix:{}", v),
            EncryptionPattern::Suffix(v) => write!(f, "suffix:{}", v),
            EncryptionPattern::Contains(v) => write!(f, "contains:{}", v),
            EncryptionPattern::Exact(v) => write!(f, "exact:{}", v),
            EncryptionPattern::Regex(re) => write!(f, "regex:{}", re.as_str()),
        }
    }
}

/// Pattern driven envelope encryption
///
/// Wraps an [`EncryptionPlugin`]; with a disabled plugin every call is a passthrough.
pub struct ConfigEncryptionService {
    plugin: Arc<dyn EncryptionPlugin>,
    patterns: Vec<EncryptionPattern>,
}

impl ConfigEncryptionService {
    /// Create a service with the default `cipher-` prefix pattern
    ///
    /// An empty key disables encryption.
    pub fn new(encryption_key: &str) -> CryptoResult<Self> {
        Self::with_patterns(
            encryption_key,
            vec![EncryptionPattern::Prefix(DEFAULT_CIPHER_PREFIX.to_string())],
        )
    }

    pub fn with_patterns(
        encryption_key: &str,
        patterns: Vec<EncryptionPattern>,
    ) -> CryptoResult<Self> {
        let plugin = AesGcmEncryptionPlugin::new(encryption_key)?;
        Ok(Self::with_plugin(Arc::new(plugin), patterns))
    }

    pub fn with_plugin(plugin: Arc<dyn EncryptionPlugin>, patterns: Vec<EncryptionPattern>) -> Self {
        Self { plugin, patterns }
    }

    pub fn disabled() -> Self {
        Self::with_plugin(Arc::new(AesGcmEncryptionPlugin::disabled()), vec![])
    }

    pub fn is_enabled(&self) -> bool {
        self.plugin.is_enabled()
    }

    pub fn patterns(&self) -> &[EncryptionPattern] {
        &self.patterns
    }

    pub fn should_encrypt(&self, data_id: &str) -> bool {
        self.patterns.iter().any(|p| p.matches(data_id))
    }
}

#[async_trait]
impl EncryptionAdapter for ConfigEncryptionService {
    async fn encrypt(&self, data_id: &str, content: &str) -> CryptoResult<EncryptedContent> {
        if !self.is_enabled() || !self.should_encrypt(data_id) {
            return Ok(EncryptedContent::plain(content));
        }

        let (content, encrypted_data_key) = self.plugin.encrypt(content).await?;
        debug!(data_id, plugin = self.plugin.name(), "Encrypted config content");
        Ok(EncryptedContent {
            encrypted_data_key,
            content,
        })
    }

    async fn decrypt(
        &self,
        data_id: &str,
        encrypted_data_key: &str,
        content: &str,
    ) -> CryptoResult<String> {
        if encrypted_data_key.is_empty() || !self.is_enabled() {
            return Ok(content.to_string());
        }

        let plaintext = self.plugin.decrypt(content, encrypted_data_key).await?;
        debug!(data_id, plugin = self.plugin.name(), "Decrypted config content");
        Ok(plaintext)
    }
}

/// Builder for ConfigEncryptionService with custom rules
pub struct ConfigEncryptionServiceBuilder {
    encryption_key: String,
    patterns: Vec<EncryptionPattern>,
    regexes: Vec<String>,
}

impl ConfigEncryptionServiceBuilder {
    /// Start with the default `cipher-` prefix pattern
    pub fn new() -> Self {
        Self {
            encryption_key: String::new(),
            patterns: vec![EncryptionPattern::Prefix(DEFAULT_CIPHER_PREFIX.to_string())],
            regexes: vec![],
        }
    }

    /// Start with no patterns at all
    pub fn empty() -> Self {
        Self {
            encryption_key: String::new(),
            patterns: vec![],
            regexes: vec![],
        }
    }

    pub fn encryption_key(mut self, key: &str) -> Self {
        self.encryption_key = key.to_string();
        self
    }

    /// Regexes are compiled by [`Self::build`]
    pub fn regex_pattern(mut self, regex: &str) -> Self {
        self.regexes.push(regex.to_string());
        self
    }

    pub fn pattern(mut self, pattern: EncryptionPattern) -> Self {
        self.patterns.push(pattern);
        self
    }

    pub fn build(self) -> CryptoResult<ConfigEncryptionService> {
        let mut patterns = self.patterns;
        for regex in self.regexes {
            patterns.push(format!("regex:{}", regex).parse()?);
        }
        ConfigEncryptionService::with_patterns(&self.encryption_key, patterns)
    }
}

impl Default for ConfigEncryptionServiceBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use manioc_common::crypto::MasterKeyCipher;

    use super::*;

    #[tokio::test]
    async fn test_disabled_service() {
        let service = ConfigEncryptionService::disabled();
        assert!(!service.is_enabled());

        let encrypted = service.encrypt("cipher-test", "secret").await.unwrap();
        assert_eq!(encrypted, EncryptedContent::plain("secret"));
    }

    #[tokio::test]
    async fn test_encrypt_selected_data_ids_only() {
        let service = ConfigEncryptionService::new(&MasterKeyCipher::generate_base64_key()).unwrap();
        assert!(service.is_enabled());

        let plain = service.encrypt("normal-config", "value").await.unwrap();
        assert!(!plain.is_encrypted());
        assert_eq!(plain.content, "value");

        let sealed = service.encrypt("cipher-database-password", "secret123").await.unwrap();
        assert!(sealed.is_encrypted());
        assert_ne!(sealed.content, "secret123");

        let decrypted = service
            .decrypt("cipher-database-password", &sealed.encrypted_data_key, &sealed.content)
            .await
            .unwrap();
        assert_eq!(decrypted, "secret123");
    }

    #[tokio::test]
    async fn test_decrypt_with_foreign_key_fails() {
        let service = ConfigEncryptionService::new(&MasterKeyCipher::generate_base64_key()).unwrap();
        let other = ConfigEncryptionService::new(&MasterKeyCipher::generate_base64_key()).unwrap();

        let sealed = service.encrypt("cipher-a", "secret").await.unwrap();
        assert!(other
            .decrypt("cipher-a", &sealed.encrypted_data_key, &sealed.content)
            .await
            .is_err());
    }

    #[tokio::test]
    async fn test_noop_encryption() {
        let noop = NoopEncryption;
        assert_eq!(
            noop.encrypt("cipher-a", "x").await.unwrap(),
            EncryptedContent::plain("x")
        );
        assert_eq!(noop.decrypt("cipher-a", "key", "x").await.unwrap(), "x");
    }

    #[test]
    fn test_encryption_pattern_matching() {
        assert!(EncryptionPattern::Prefix("cipher-".to_string()).matches("cipher-password"));
        assert!(!EncryptionPattern::Prefix("cipher-".to_string()).matches("my-cipher-config"));
        assert!(EncryptionPattern::Suffix("-secret".to_string()).matches("db-secret"));
        assert!(!EncryptionPattern::Suffix("-secret".to_string()).matches("secretfile"));
        assert!(EncryptionPattern::Contains("password".to_string()).matches("user-password-hash"));
        assert!(EncryptionPattern::Exact("secret-config".to_string()).matches("secret-config"));
        assert!(!EncryptionPattern::Exact("secret-config".to_string()).matches("secret-config-v2"));
    }

    #[test]
    fn test_encryption_pattern_from_str() {
        let pattern: EncryptionPattern = "regex:^secret-.*-key$".parse().unwrap();
        assert!(pattern.matches("secret-api-key"));
        assert!(!pattern.matches("my-secret-api-key"));
        assert_eq!(pattern.to_string(), "regex:^secret-.*-key$");

        let bare: EncryptionPattern = "cipher-".parse().unwrap();
        assert!(matches!(bare, EncryptionPattern::Prefix(ref p) if p == "cipher-"));

        assert!("regex:(".parse::<EncryptionPattern>().is_err());
        assert!("glob:*".parse::<EncryptionPattern>().is_err());
        assert!("suffix:".parse::<EncryptionPattern>().is_err());
    }

    #[test]
    fn test_builder_with_custom_patterns() {
        let service = ConfigEncryptionServiceBuilder::empty()
            .encryption_key(&MasterKeyCipher::generate_base64_key())
            .pattern(EncryptionPattern::Suffix("-secret".to_string()))
            .regex_pattern(r"^(prod|staging)-secrets?-.*$")
            .build()
            .unwrap();

        assert!(service.should_encrypt("db-secret"));
        assert!(service.should_encrypt("staging-secret-db"));
        assert!(!service.should_encrypt("cipher-key"));
        assert_eq!(service.patterns().len(), 2);
    }

    #[test]
    fn test_builder_rejects_bad_regex() {
        assert!(ConfigEncryptionServiceBuilder::new().regex_pattern("(").build().is_err());
    }
}
