//! AES-GCM envelope encryption/decryption
//!
//! Persisted envelope format (binary):
//! ```text
//! [12 bytes: random nonce][16 bytes: GCM tag][32 bytes: key-binding digest, if embedded][N bytes: ciphertext]
//! ```
//!
//! All field widths are fixed per deployment profile, so parsing needs no
//! length prefixes. The key-binding digest is a one-way hash of the derived
//! key: it lets decryption reject a wrong secret cheaply before the AEAD
//! path runs. It is defense in depth, not a security boundary — the GCM
//! tag still authenticates everything.

use aes_gcm::{
    aead::{consts::U12, generic_array::GenericArray, Aead, AeadCore, KeyInit},
    aes::Aes192,
    Aes128Gcm, Aes256Gcm, AesGcm,
};
use rand::RngCore;

use uvault_core::{VaultError, VaultResult};

use crate::kdf::DerivedKey;
use crate::{KEY_DIGEST_SIZE, NONCE_SIZE, TAG_SIZE};

type Aes192Gcm = AesGcm<Aes192, U12>;

const KEY_BINDING_CONTEXT: &str = "uvault-crypto 2026-08 key binding";

/// Parsed form of one persisted encrypted blob.
///
/// Self-contained: decryption needs only this plus the re-derived key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CipherEnvelope {
    pub nonce: [u8; NONCE_SIZE],
    pub tag: [u8; TAG_SIZE],
    /// Present iff the deployment profile embeds the key-binding digest.
    pub key_digest: Option<[u8; KEY_DIGEST_SIZE]>,
    pub ciphertext: Vec<u8>,
}

impl CipherEnvelope {
    fn header_len(with_key_digest: bool) -> usize {
        let digest = if with_key_digest { KEY_DIGEST_SIZE } else { 0 };
        NONCE_SIZE + TAG_SIZE + digest
    }

    /// Serialize to the on-disk byte layout.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out =
            Vec::with_capacity(Self::header_len(self.key_digest.is_some()) + self.ciphertext.len());
        out.extend_from_slice(&self.nonce);
        out.extend_from_slice(&self.tag);
        if let Some(digest) = &self.key_digest {
            out.extend_from_slice(digest);
        }
        out.extend_from_slice(&self.ciphertext);
        out
    }

    /// Parse persisted bytes.
    ///
    /// `expect_key_digest` reflects the deployment profile the blob was
    /// written under; the layout has no self-describing flag. Anything
    /// shorter than the fixed header fails before any crypto runs.
    pub fn from_bytes(data: &[u8], expect_key_digest: bool) -> VaultResult<Self> {
        let min = Self::header_len(expect_key_digest);
        if data.len() < min {
            return Err(VaultError::MalformedEnvelope {
                got: data.len(),
                min,
            });
        }

        let (nonce_bytes, rest) = data.split_at(NONCE_SIZE);
        let (tag_bytes, rest) = rest.split_at(TAG_SIZE);

        let mut nonce = [0u8; NONCE_SIZE];
        nonce.copy_from_slice(nonce_bytes);
        let mut tag = [0u8; TAG_SIZE];
        tag.copy_from_slice(tag_bytes);

        let (key_digest, ciphertext) = if expect_key_digest {
            let (digest_bytes, ct) = rest.split_at(KEY_DIGEST_SIZE);
            let mut digest = [0u8; KEY_DIGEST_SIZE];
            digest.copy_from_slice(digest_bytes);
            (Some(digest), ct.to_vec())
        } else {
            (None, rest.to_vec())
        };

        Ok(Self {
            nonce,
            tag,
            key_digest,
            ciphertext,
        })
    }
}

/// One-way digest binding an envelope to the key that sealed it.
pub fn key_binding_digest(key: &DerivedKey) -> [u8; KEY_DIGEST_SIZE] {
    blake3::derive_key(KEY_BINDING_CONTEXT, key.as_bytes())
}

/// Encrypt a payload under a derived key.
///
/// Draws a fresh random nonce from the thread CSPRNG on every call, so
/// encrypting the same plaintext twice never yields identical envelopes
/// and nonce reuse under one key cannot happen.
pub fn encrypt(
    plaintext: &[u8],
    key: &DerivedKey,
    embed_key_digest: bool,
) -> VaultResult<CipherEnvelope> {
    let mut nonce = [0u8; NONCE_SIZE];
    rand::thread_rng().fill_bytes(&mut nonce);

    let mut sealed = seal(key, &nonce, plaintext)?;

    // AES-GCM appends the tag to the ciphertext; the envelope keeps it in
    // its own fixed-width field.
    let tag_start = sealed.len() - TAG_SIZE;
    let mut tag = [0u8; TAG_SIZE];
    tag.copy_from_slice(&sealed[tag_start..]);
    sealed.truncate(tag_start);

    Ok(CipherEnvelope {
        nonce,
        tag,
        key_digest: embed_key_digest.then(|| key_binding_digest(key)),
        ciphertext: sealed,
    })
}

/// Decrypt an envelope with a derived key, returning the exact original
/// plaintext.
///
/// If the envelope carries a key-binding digest it is checked first and a
/// mismatch fails with `KeyMismatch` without touching the AEAD path. AEAD
/// authentication failure (tampering, truncation, or a wrong key on a
/// digest-less profile) fails with `IntegrityViolation`.
pub fn decrypt(envelope: &CipherEnvelope, key: &DerivedKey) -> VaultResult<Vec<u8>> {
    if let Some(stored) = &envelope.key_digest {
        if *stored != key_binding_digest(key) {
            return Err(VaultError::KeyMismatch);
        }
    }

    let mut combined = Vec::with_capacity(envelope.ciphertext.len() + TAG_SIZE);
    combined.extend_from_slice(&envelope.ciphertext);
    combined.extend_from_slice(&envelope.tag);

    open(key, &envelope.nonce, &combined)
}

fn seal(key: &DerivedKey, nonce: &[u8; NONCE_SIZE], plaintext: &[u8]) -> VaultResult<Vec<u8>> {
    match key.len() {
        16 => seal_with::<Aes128Gcm>(key.as_bytes(), nonce, plaintext),
        24 => seal_with::<Aes192Gcm>(key.as_bytes(), nonce, plaintext),
        32 => seal_with::<Aes256Gcm>(key.as_bytes(), nonce, plaintext),
        other => Err(VaultError::InvalidKeyLength(other)),
    }
}

fn open(key: &DerivedKey, nonce: &[u8; NONCE_SIZE], combined: &[u8]) -> VaultResult<Vec<u8>> {
    match key.len() {
        16 => open_with::<Aes128Gcm>(key.as_bytes(), nonce, combined),
        24 => open_with::<Aes192Gcm>(key.as_bytes(), nonce, combined),
        32 => open_with::<Aes256Gcm>(key.as_bytes(), nonce, combined),
        other => Err(VaultError::InvalidKeyLength(other)),
    }
}

fn seal_with<C>(key: &[u8], nonce: &[u8; NONCE_SIZE], plaintext: &[u8]) -> VaultResult<Vec<u8>>
where
    C: KeyInit + Aead + AeadCore<NonceSize = U12>,
{
    let cipher = C::new_from_slice(key).map_err(|_| VaultError::InvalidKeyLength(key.len()))?;
    cipher
        .encrypt(GenericArray::from_slice(nonce), plaintext)
        .map_err(|_| VaultError::Other(anyhow::anyhow!("AES-GCM encryption failed")))
}

fn open_with<C>(key: &[u8], nonce: &[u8; NONCE_SIZE], combined: &[u8]) -> VaultResult<Vec<u8>>
where
    C: KeyInit + Aead + AeadCore<NonceSize = U12>,
{
    let cipher = C::new_from_slice(key).map_err(|_| VaultError::InvalidKeyLength(key.len()))?;
    cipher
        .decrypt(GenericArray::from_slice(nonce), combined)
        .map_err(|_| VaultError::IntegrityViolation)
}
