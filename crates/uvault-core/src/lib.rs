//! uvault-core: shared types, config schema, and error taxonomy
//!
//! The vault core is a library embedded inside a larger application; the
//! host owns authentication, routing, and persistence schema. This crate
//! defines the vocabulary the other uvault crates share: the error
//! taxonomy every operation reports through, the deployment configuration
//! (key length profile, Argon2id costs), and the `BlobRecord` metadata
//! entry that links a user's logical filename to its opaque on-disk name.

pub mod config;
pub mod error;
pub mod types;

pub use config::{KdfConfig, KeyLength, VaultConfig};
pub use error::{StorageError, VaultError, VaultResult};
pub use types::BlobRecord;
