//! Blob metadata collaborator

use std::sync::{Mutex, PoisonError};

use uvault_core::{BlobRecord, StorageError};

/// Per-user index of blob records.
///
/// The host application typically backs this with its relational store;
/// the vault treats inserts and deletes as transactional with the byte
/// writes it pairs them with.
pub trait MetadataIndex {
    fn insert(&self, record: BlobRecord) -> Result<(), StorageError>;

    fn list_by_identity(&self, identity: &str) -> Result<Vec<BlobRecord>, StorageError>;

    fn delete_by_name(&self, blob_name: &str) -> Result<(), StorageError>;
}

impl<T: MetadataIndex + ?Sized> MetadataIndex for &T {
    fn insert(&self, record: BlobRecord) -> Result<(), StorageError> {
        (**self).insert(record)
    }

    fn list_by_identity(&self, identity: &str) -> Result<Vec<BlobRecord>, StorageError> {
        (**self).list_by_identity(identity)
    }

    fn delete_by_name(&self, blob_name: &str) -> Result<(), StorageError> {
        (**self).delete_by_name(blob_name)
    }
}

/// In-memory metadata index for tests and embedded use.
#[derive(Debug, Default)]
pub struct MemoryIndex {
    records: Mutex<Vec<BlobRecord>>,
}

impl MemoryIndex {
    pub fn new() -> Self {
        Self::default()
    }
}

impl MetadataIndex for MemoryIndex {
    fn insert(&self, record: BlobRecord) -> Result<(), StorageError> {
        let mut records = self.records.lock().unwrap_or_else(PoisonError::into_inner);
        if records.iter().any(|r| r.blob_name == record.blob_name) {
            return Err(StorageError::AlreadyExists);
        }
        records.push(record);
        Ok(())
    }

    fn list_by_identity(&self, identity: &str) -> Result<Vec<BlobRecord>, StorageError> {
        let records = self.records.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(records
            .iter()
            .filter(|r| r.identity == identity)
            .cloned()
            .collect())
    }

    fn delete_by_name(&self, blob_name: &str) -> Result<(), StorageError> {
        let mut records = self.records.lock().unwrap_or_else(PoisonError::into_inner);
        let before = records.len();
        records.retain(|r| r.blob_name != blob_name);
        if records.len() == before {
            return Err(StorageError::NotFound);
        }
        Ok(())
    }
}
