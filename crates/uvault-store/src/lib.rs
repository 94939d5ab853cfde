//! uvault-store: storage collaborators + the vault orchestrator
//!
//! `Vault` wires the crypto primitives from `uvault-crypto` to two
//! collaborator traits the host application implements: `BlobStore`
//! (name-addressed bytes) and `MetadataIndex` (per-user blob records).
//! In-memory implementations ship for tests and embedding; `FsBlobStore`
//! persists envelopes as `.enc` files in a directory.

pub mod blob;
pub mod index;
pub mod vault;

pub use blob::{BlobStore, FsBlobStore, MemoryBlobStore, PutOutcome};
pub use index::{MemoryIndex, MetadataIndex};
pub use vault::Vault;
