//! Persistent blob naming
//!
//! Blob names are a one-way BLAKE3 digest over (identity, logical name),
//! hex-encoded with a `.enc` suffix. The persisted name reveals neither the
//! plaintext filename nor the owning user, yet stays deterministic for a
//! given (user, filename) pair so the same upload always targets the same
//! base name. Repeated uploads are disambiguated by an incrementing
//! `attempt` suffix driven by the store's collision loop — never by
//! wall-clock time, which could collide under concurrency.

const NAMING_CONTEXT: &str = "uvault-crypto 2026-08 blob naming";

/// Compute the persisted name for attempt `attempt` (0 = base name).
pub fn blob_name(identity: &str, logical_name: &str, attempt: u32) -> String {
    let mut hasher = blake3::Hasher::new_derive_key(NAMING_CONTEXT);
    // Length-prefix the identity so ("ab", "c.txt") and ("a", "bc.txt")
    // cannot hash to the same name.
    hasher.update(&(identity.len() as u64).to_le_bytes());
    hasher.update(identity.as_bytes());
    hasher.update(logical_name.as_bytes());
    let digest = hasher.finalize().to_hex();

    if attempt == 0 {
        format!("{digest}.enc")
    } else {
        format!("{digest}-{attempt}.enc")
    }
}
