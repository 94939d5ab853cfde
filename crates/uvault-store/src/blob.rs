//! Name-addressed byte storage collaborator

use std::collections::HashMap;
use std::io::Write;
use std::path::PathBuf;
use std::sync::{Mutex, PoisonError};

use uvault_core::StorageError;

/// Result of a create-if-absent write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PutOutcome {
    Created,
    AlreadyExists,
}

/// Name-addressed, byte-exact blob storage.
///
/// The vault assumes nothing about the medium; it only needs an atomic
/// create-if-absent primitive so concurrent uploads racing on the same
/// name resolve deterministically through the collision loop.
pub trait BlobStore {
    /// Write `bytes` under `name` iff no blob with that name exists.
    fn put_if_absent(&self, name: &str, bytes: &[u8]) -> Result<PutOutcome, StorageError>;

    fn get(&self, name: &str) -> Result<Vec<u8>, StorageError>;

    fn delete(&self, name: &str) -> Result<(), StorageError>;
}

impl<T: BlobStore + ?Sized> BlobStore for &T {
    fn put_if_absent(&self, name: &str, bytes: &[u8]) -> Result<PutOutcome, StorageError> {
        (**self).put_if_absent(name, bytes)
    }

    fn get(&self, name: &str) -> Result<Vec<u8>, StorageError> {
        (**self).get(name)
    }

    fn delete(&self, name: &str) -> Result<(), StorageError> {
        (**self).delete(name)
    }
}

/// In-memory blob store for tests and embedded use.
#[derive(Debug, Default)]
pub struct MemoryBlobStore {
    blobs: Mutex<HashMap<String, Vec<u8>>>,
}

impl MemoryBlobStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl BlobStore for MemoryBlobStore {
    fn put_if_absent(&self, name: &str, bytes: &[u8]) -> Result<PutOutcome, StorageError> {
        let mut blobs = self.blobs.lock().unwrap_or_else(PoisonError::into_inner);
        if blobs.contains_key(name) {
            return Ok(PutOutcome::AlreadyExists);
        }
        blobs.insert(name.to_string(), bytes.to_vec());
        Ok(PutOutcome::Created)
    }

    fn get(&self, name: &str) -> Result<Vec<u8>, StorageError> {
        let blobs = self.blobs.lock().unwrap_or_else(PoisonError::into_inner);
        blobs.get(name).cloned().ok_or(StorageError::NotFound)
    }

    fn delete(&self, name: &str) -> Result<(), StorageError> {
        let mut blobs = self.blobs.lock().unwrap_or_else(PoisonError::into_inner);
        blobs.remove(name).map(|_| ()).ok_or(StorageError::NotFound)
    }
}

/// Directory-backed blob store: one `.enc` file per blob.
///
/// `create_new` gives the atomic create-if-absent semantics; two processes
/// racing on the same name see exactly one `Created`.
#[derive(Debug, Clone)]
pub struct FsBlobStore {
    root: PathBuf,
}

impl FsBlobStore {
    /// Open a store rooted at `root`, creating the directory if needed.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let root = root.into();
        std::fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    fn path_for(&self, name: &str) -> PathBuf {
        // Names are hex digests with an optional suffix; they never contain
        // path separators, so a plain join is safe.
        self.root.join(name)
    }
}

impl BlobStore for FsBlobStore {
    fn put_if_absent(&self, name: &str, bytes: &[u8]) -> Result<PutOutcome, StorageError> {
        let mut file = match std::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(self.path_for(name))
        {
            Ok(file) => file,
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {
                return Ok(PutOutcome::AlreadyExists);
            }
            Err(e) => return Err(e.into()),
        };
        file.write_all(bytes)?;
        file.sync_all()?;
        Ok(PutOutcome::Created)
    }

    fn get(&self, name: &str) -> Result<Vec<u8>, StorageError> {
        match std::fs::read(self.path_for(name)) {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(StorageError::NotFound),
            Err(e) => Err(e.into()),
        }
    }

    fn delete(&self, name: &str) -> Result<(), StorageError> {
        match std::fs::remove_file(self.path_for(name)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(StorageError::NotFound),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn exercise_store(store: &dyn BlobStore) {
        assert_eq!(
            store.put_if_absent("blob.enc", b"first").unwrap(),
            PutOutcome::Created
        );
        assert_eq!(
            store.put_if_absent("blob.enc", b"second").unwrap(),
            PutOutcome::AlreadyExists
        );
        // The losing write must not clobber the existing bytes.
        assert_eq!(store.get("blob.enc").unwrap(), b"first");

        store.delete("blob.enc").unwrap();
        assert!(matches!(store.get("blob.enc"), Err(StorageError::NotFound)));
        assert!(matches!(
            store.delete("blob.enc"),
            Err(StorageError::NotFound)
        ));
    }

    #[test]
    fn test_memory_store_contract() {
        exercise_store(&MemoryBlobStore::new());
    }

    #[test]
    fn test_fs_store_contract() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsBlobStore::open(dir.path().join("encrypted")).unwrap();
        exercise_store(&store);
    }

    #[test]
    fn test_fs_store_persists_across_opens() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("encrypted");

        let store = FsBlobStore::open(&root).unwrap();
        store.put_if_absent("keep.enc", b"payload").unwrap();

        let reopened = FsBlobStore::open(&root).unwrap();
        assert_eq!(reopened.get("keep.enc").unwrap(), b"payload");
    }
}
