use serde::{Deserialize, Serialize};

use crate::error::{VaultError, VaultResult};

/// Supported symmetric key length profiles (AES-128/192/256-GCM).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyLength {
    Aes128,
    Aes192,
    Aes256,
}

impl KeyLength {
    /// Map a configured byte count onto a profile.
    pub fn from_bytes(n: usize) -> VaultResult<Self> {
        match n {
            16 => Ok(Self::Aes128),
            24 => Ok(Self::Aes192),
            32 => Ok(Self::Aes256),
            other => Err(VaultError::InvalidKeyLength(other)),
        }
    }

    pub fn bytes(self) -> usize {
        match self {
            Self::Aes128 => 16,
            Self::Aes192 => 24,
            Self::Aes256 => 32,
        }
    }
}

/// Deployment configuration for one vault (loaded from TOML by the host).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VaultConfig {
    /// Derived key length in bytes: 16, 24, or 32 (default: 32)
    pub key_length: usize,
    /// Embed a key-binding digest in each envelope so a wrong secret is
    /// rejected cheaply before the AEAD path (default: true)
    pub embed_key_digest: bool,
    /// Upper bound on the blob-name collision loop (default: 64)
    pub max_name_attempts: u32,
    pub kdf: KdfConfig,
}

/// Argon2id cost parameters for key derivation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct KdfConfig {
    /// Memory cost in KiB (default: 19456 = 19 MiB)
    pub mem_cost_kib: u32,
    /// Time cost / iterations (default: 2)
    pub time_cost: u32,
    /// Parallelism (default: 1)
    pub parallelism: u32,
}

impl Default for VaultConfig {
    fn default() -> Self {
        Self {
            key_length: 32,
            embed_key_digest: true,
            max_name_attempts: 64,
            kdf: KdfConfig::default(),
        }
    }
}

impl Default for KdfConfig {
    // Sized for a single derivation in the low tens of milliseconds so
    // upload/download latency stays dominated by the KDF, not hidden by it.
    fn default() -> Self {
        Self {
            mem_cost_kib: 19456,
            time_cost: 2,
            parallelism: 1,
        }
    }
}

impl VaultConfig {
    /// Parse from TOML and validate.
    pub fn from_toml_str(s: &str) -> VaultResult<Self> {
        let cfg: Self = toml::from_str(s)
            .map_err(|e| VaultError::Other(anyhow::anyhow!("config parse: {e}")))?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> VaultResult<()> {
        KeyLength::from_bytes(self.key_length)?;
        if self.max_name_attempts == 0 {
            return Err(VaultError::Other(anyhow::anyhow!(
                "max_name_attempts must be at least 1"
            )));
        }
        if self.kdf.time_cost == 0 || self.kdf.parallelism == 0 {
            return Err(VaultError::Other(anyhow::anyhow!(
                "Argon2id time_cost and parallelism must be at least 1"
            )));
        }
        Ok(())
    }

    pub fn key_length_profile(&self) -> VaultResult<KeyLength> {
        KeyLength::from_bytes(self.key_length)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let cfg = VaultConfig::default();
        assert!(cfg.validate().is_ok());
        assert_eq!(cfg.key_length_profile().unwrap(), KeyLength::Aes256);
    }

    #[test]
    fn test_parse_full_config() {
        let toml_str = r#"
key_length = 16
embed_key_digest = false
max_name_attempts = 8

[kdf]
mem_cost_kib = 65536
time_cost = 3
parallelism = 4
"#;
        let cfg = VaultConfig::from_toml_str(toml_str).unwrap();
        assert_eq!(cfg.key_length_profile().unwrap(), KeyLength::Aes128);
        assert!(!cfg.embed_key_digest);
        assert_eq!(cfg.max_name_attempts, 8);
        assert_eq!(cfg.kdf.mem_cost_kib, 65536);
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let cfg = VaultConfig::from_toml_str("key_length = 24").unwrap();
        assert_eq!(cfg.key_length_profile().unwrap(), KeyLength::Aes192);
        assert_eq!(cfg.kdf.time_cost, KdfConfig::default().time_cost);
    }

    #[test]
    fn test_unsupported_key_length_rejected() {
        let err = VaultConfig::from_toml_str("key_length = 20").unwrap_err();
        assert!(matches!(err, VaultError::InvalidKeyLength(20)));
    }

    #[test]
    fn test_zero_attempts_rejected() {
        assert!(VaultConfig::from_toml_str("max_name_attempts = 0").is_err());
    }
}
