//! uvault-crypto: per-user key derivation, AEAD envelope codec, blob naming
//!
//! Envelope wire format (binary, fixed-width fields):
//! ```text
//! [12 bytes: random nonce][16 bytes: GCM tag][32 bytes: key-binding digest, optional][N bytes: ciphertext]
//! ```
//!
//! Key flow:
//! ```text
//! user secret ─┐
//!              ├─ Argon2id(salt = SHA-256(identity)) ─→ DerivedKey (16/24/32 bytes)
//! identity ────┘                                            │
//!                                                           ├─ AES-GCM seal/open
//!                                                           └─ BLAKE3 key-binding digest
//! ```
//!
//! Everything here is pure and stateless: no I/O, no shared state, safe to
//! run fully in parallel across requests.

pub mod envelope;
pub mod kdf;
pub mod names;

pub use envelope::{decrypt, encrypt, key_binding_digest, CipherEnvelope};
pub use kdf::{derive_data_key, DerivedKey};
pub use names::blob_name;

/// Size of an AES-GCM nonce
pub const NONCE_SIZE: usize = 12;

/// Size of a GCM authentication tag
pub const TAG_SIZE: usize = 16;

/// Size of the optional key-binding digest
pub const KEY_DIGEST_SIZE: usize = 32;
