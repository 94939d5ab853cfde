//! The vault orchestrator: derive → encrypt → name → persist, and back.

use chrono::Utc;
use secrecy::SecretString;
use tracing::{debug, warn};

use uvault_core::{BlobRecord, KeyLength, StorageError, VaultConfig, VaultError, VaultResult};
use uvault_crypto::{blob_name, derive_data_key, CipherEnvelope};

use crate::blob::{BlobStore, PutOutcome};
use crate::index::MetadataIndex;

/// Per-user encrypted file vault.
///
/// Stateless beyond immutable configuration; construct one per deployment
/// profile and share it freely across threads. The caller is the host's
/// auth layer: it has already authenticated the user and hands in a
/// validated identity plus the user's encryption secret for the duration
/// of one call.
pub struct Vault<S, M> {
    config: VaultConfig,
    key_length: KeyLength,
    blobs: S,
    index: M,
}

impl<S: BlobStore, M: MetadataIndex> Vault<S, M> {
    pub fn new(config: VaultConfig, blobs: S, index: M) -> VaultResult<Self> {
        config.validate()?;
        let key_length = config.key_length_profile()?;
        Ok(Self {
            config,
            key_length,
            blobs,
            index,
        })
    }

    /// Encrypt `plaintext` under the user's secret and persist it.
    ///
    /// Nothing touches storage until derivation and encryption have
    /// succeeded, so a crypto failure leaves no partial blob behind. The
    /// byte write and the metadata insert form one logical unit: if the
    /// insert fails, the just-written blob is removed again.
    pub fn store(
        &self,
        identity: &str,
        secret: &SecretString,
        logical_name: &str,
        plaintext: &[u8],
    ) -> VaultResult<BlobRecord> {
        let key = derive_data_key(secret, identity, &self.config.kdf, self.key_length)?;
        let envelope = uvault_crypto::encrypt(plaintext, &key, self.config.embed_key_digest)?;
        let bytes = envelope.to_bytes();

        let name = self.claim_free_name(identity, logical_name, &bytes)?;

        let record = BlobRecord {
            identity: identity.to_string(),
            logical_name: logical_name.to_string(),
            blob_name: name.clone(),
            created_at: Utc::now(),
        };

        if let Err(e) = self.index.insert(record.clone()) {
            // Roll back the byte write so no unrecorded blob survives.
            if let Err(cleanup) = self.blobs.delete(&name) {
                warn!(blob = %name, error = %cleanup, "rollback delete failed after index error");
            }
            return Err(e.into());
        }

        debug!(identity, blob = %name, bytes = bytes.len(), "stored encrypted blob");
        Ok(record)
    }

    /// Load and decrypt the blob behind `record`.
    ///
    /// The identity gate comes first: a caller may never decrypt another
    /// user's blob, even with the correct secret in hand.
    pub fn retrieve(
        &self,
        identity: &str,
        secret: &SecretString,
        record: &BlobRecord,
    ) -> VaultResult<Vec<u8>> {
        if record.identity != identity {
            return Err(VaultError::Unauthorized);
        }

        let key = derive_data_key(secret, identity, &self.config.kdf, self.key_length)?;
        let bytes = self.blobs.get(&record.blob_name)?;
        let envelope = CipherEnvelope::from_bytes(&bytes, self.config.embed_key_digest)?;
        let plaintext = uvault_crypto::decrypt(&envelope, &key)?;

        debug!(identity, blob = %record.blob_name, "retrieved blob");
        Ok(plaintext)
    }

    /// List the caller's blob records.
    pub fn list(&self, identity: &str) -> VaultResult<Vec<BlobRecord>> {
        Ok(self.index.list_by_identity(identity)?)
    }

    /// Remove a blob and its record. Terminal: nothing resurrects the name.
    ///
    /// Bytes go first, then the record; a record pointing at missing bytes
    /// would surface as a user-visible error, while recorded-but-deleted
    /// bytes are merely invisible. Missing bytes are tolerated so a
    /// half-deleted blob can still be cleaned up.
    pub fn delete(&self, identity: &str, record: &BlobRecord) -> VaultResult<()> {
        if record.identity != identity {
            return Err(VaultError::Unauthorized);
        }

        match self.blobs.delete(&record.blob_name) {
            Ok(()) => {}
            Err(StorageError::NotFound) => {
                warn!(blob = %record.blob_name, "blob bytes already gone, removing record");
            }
            Err(e) => return Err(e.into()),
        }
        self.index.delete_by_name(&record.blob_name)?;

        debug!(identity, blob = %record.blob_name, "deleted blob");
        Ok(())
    }

    /// Claim a free persisted name via the atomic create-if-absent
    /// primitive, disambiguating repeated uploads of the same logical name
    /// with an incrementing suffix.
    fn claim_free_name(
        &self,
        identity: &str,
        logical_name: &str,
        bytes: &[u8],
    ) -> VaultResult<String> {
        for attempt in 0..self.config.max_name_attempts {
            let candidate = blob_name(identity, logical_name, attempt);
            match self.blobs.put_if_absent(&candidate, bytes)? {
                PutOutcome::Created => return Ok(candidate),
                PutOutcome::AlreadyExists => continue,
            }
        }
        Err(StorageError::NameExhausted(self.config.max_name_attempts).into())
    }
}
