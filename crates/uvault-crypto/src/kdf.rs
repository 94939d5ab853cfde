//! Key derivation: Argon2id user secret → per-user data key

use argon2::{Algorithm, Argon2, Params, Version};
use secrecy::{ExposeSecret, SecretString};
use sha2::{Digest, Sha256};
use zeroize::Zeroize;

use uvault_core::{KdfConfig, KeyLength, VaultError, VaultResult};

/// A symmetric data key derived from a user secret, 16/24/32 bytes per the
/// deployment's key-length profile.
///
/// Lives only on the call stack of one store/retrieve operation; zeroized
/// on drop so key material never lingers in memory.
pub struct DerivedKey {
    bytes: Vec<u8>,
}

impl DerivedKey {
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        Self { bytes }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

impl Drop for DerivedKey {
    fn drop(&mut self) {
        self.bytes.zeroize();
    }
}

impl std::fmt::Debug for DerivedKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DerivedKey")
            .field("bytes", &"[REDACTED]")
            .finish()
    }
}

/// Salt = SHA-256 digest of the identity.
///
/// Hashing rather than using the identity verbatim keeps salts fixed-width
/// and uncorrelated with whatever shape the host's identifiers have, while
/// still giving every user a distinct salt: the same weak secret under two
/// identities derives two unrelated keys.
fn identity_salt(identity: &str) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(identity.as_bytes());
    hasher.finalize().into()
}

/// Derive the per-user data key from a user-supplied secret via Argon2id,
/// salted by the user's identity.
///
/// Deterministic in (secret, identity, params, length). The secret must be
/// non-empty; the host's auth layer enforces any stronger policy before
/// calling in. Neither the secret nor the key is ever logged.
pub fn derive_data_key(
    secret: &SecretString,
    identity: &str,
    params: &KdfConfig,
    length: KeyLength,
) -> VaultResult<DerivedKey> {
    if secret.expose_secret().is_empty() {
        return Err(VaultError::InvalidSecret);
    }

    let argon2_params = Params::new(
        params.mem_cost_kib,
        params.time_cost,
        params.parallelism,
        Some(length.bytes()),
    )
    .map_err(|e| anyhow::anyhow!("invalid Argon2id params: {e}"))?;

    let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, argon2_params);

    let salt = identity_salt(identity);
    let mut key = vec![0u8; length.bytes()];
    argon2
        .hash_password_into(secret.expose_secret().as_bytes(), &salt, &mut key)
        .map_err(|e| anyhow::anyhow!("Argon2id KDF failed: {e}"))?;

    Ok(DerivedKey::from_bytes(key))
}

#[cfg(test)]
mod tests {
    use super::*;

    // Fast params so the suite stays quick; production costs live in config.
    fn test_params() -> KdfConfig {
        KdfConfig {
            mem_cost_kib: 1024,
            time_cost: 1,
            parallelism: 1,
        }
    }

    #[test]
    fn test_kdf_deterministic() {
        let secret = SecretString::from("supersecret123");
        let params = test_params();

        let k1 = derive_data_key(&secret, "user123", &params, KeyLength::Aes256).unwrap();
        let k2 = derive_data_key(&secret, "user123", &params, KeyLength::Aes256).unwrap();

        assert_eq!(k1.as_bytes(), k2.as_bytes(), "KDF must be deterministic");
    }

    #[test]
    fn test_kdf_identity_salt_separation() {
        let secret = SecretString::from("same-secret-for-both");
        let params = test_params();

        let k1 = derive_data_key(&secret, "user123", &params, KeyLength::Aes256).unwrap();
        let k2 = derive_data_key(&secret, "different_user", &params, KeyLength::Aes256).unwrap();

        assert_ne!(
            k1.as_bytes(),
            k2.as_bytes(),
            "same secret under different identities must produce different keys"
        );
    }

    #[test]
    fn test_kdf_different_secrets() {
        let params = test_params();

        let k1 =
            derive_data_key(&SecretString::from("a"), "user123", &params, KeyLength::Aes256)
                .unwrap();
        let k2 =
            derive_data_key(&SecretString::from("b"), "user123", &params, KeyLength::Aes256)
                .unwrap();

        assert_ne!(k1.as_bytes(), k2.as_bytes());
    }

    #[test]
    fn test_kdf_output_lengths() {
        let secret = SecretString::from("supersecret123");
        let params = test_params();

        for (profile, want) in [
            (KeyLength::Aes128, 16),
            (KeyLength::Aes192, 24),
            (KeyLength::Aes256, 32),
        ] {
            let key = derive_data_key(&secret, "user123", &params, profile).unwrap();
            assert_eq!(key.len(), want);
        }
    }

    #[test]
    fn test_kdf_empty_secret_rejected() {
        let err = derive_data_key(
            &SecretString::from(""),
            "user123",
            &test_params(),
            KeyLength::Aes256,
        )
        .unwrap_err();
        assert!(matches!(err, VaultError::InvalidSecret));
    }

    #[test]
    fn test_derived_key_debug_redacts() {
        let key = derive_data_key(
            &SecretString::from("supersecret123"),
            "user123",
            &test_params(),
            KeyLength::Aes128,
        )
        .unwrap();
        let rendered = format!("{key:?}");
        assert!(rendered.contains("REDACTED"));
        assert!(!rendered.contains("supersecret123"));
    }
}
