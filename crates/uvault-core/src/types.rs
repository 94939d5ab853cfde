use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Metadata entry for one stored blob.
///
/// Links the owning identity and the user's logical filename to the
/// opaque persisted name. The vault treats the record as the locator for
/// retrieval and deletion; the host application owns where records live.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlobRecord {
    /// Owning user's stable identifier. Never secret, never reused.
    pub identity: String,
    /// Filename as the user knows it (not revealed by the blob name).
    pub logical_name: String,
    /// Opaque persisted name chosen at store time.
    pub blob_name: String,
    pub created_at: DateTime<Utc>,
}
