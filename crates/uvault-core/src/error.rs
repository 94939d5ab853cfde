use thiserror::Error;

pub type VaultResult<T> = Result<T, VaultError>;

/// Errors surfaced by vault operations.
///
/// Every failure keeps its identity all the way to the caller: a wrong
/// secret, a tampered envelope, and a storage fault are three different
/// variants, never one generic message.
#[derive(Debug, Error)]
pub enum VaultError {
    /// The user-supplied secret is empty.
    #[error("secret must not be empty")]
    InvalidSecret,

    /// The configured key length is not one of the supported profiles.
    #[error("unsupported key length: {0} bytes (expected 16, 24, or 32)")]
    InvalidKeyLength(usize),

    /// Persisted envelope bytes are too short to contain the fixed header.
    #[error("malformed envelope: {got} bytes, minimum is {min}")]
    MalformedEnvelope { got: usize, min: usize },

    /// The key-binding digest in the envelope does not match the derived
    /// key. Cheap pre-AEAD rejection of a wrong secret.
    #[error("key mismatch: the supplied secret does not match this blob")]
    KeyMismatch,

    /// AEAD authentication failed: tampered ciphertext, wrong tag, or a
    /// wrong key on a profile without the key-binding digest.
    #[error("integrity violation: ciphertext failed authentication")]
    IntegrityViolation,

    /// The record belongs to a different identity than the caller's.
    #[error("unauthorized: blob belongs to a different user")]
    Unauthorized,

    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Failures reported by the storage and metadata collaborators.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("blob already exists")]
    AlreadyExists,

    #[error("blob not found")]
    NotFound,

    /// The blob-name collision loop ran out of attempts.
    #[error("no free blob name after {0} attempts")]
    NameExhausted(u32),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_storage_error_converts() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err: VaultError = StorageError::from(io).into();
        assert!(matches!(err, VaultError::Storage(StorageError::Io(_))));
    }

    #[test]
    fn test_error_messages_name_the_failure() {
        assert!(VaultError::KeyMismatch.to_string().contains("key mismatch"));
        assert!(VaultError::Unauthorized.to_string().contains("unauthorized"));
        assert!(StorageError::NameExhausted(64).to_string().contains("64"));
    }
}
