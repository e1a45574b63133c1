//! PAN verification records.

use crate::StoreError;
use idgate_types::{RecordStatus, ReferenceId, Timestamp};
use serde::{Deserialize, Serialize};

/// A completed PAN verification, keyed by the task id the gateway generated
/// for the submit call. The full vendor task document is kept for audit,
/// with the PAN number inside it replaced by an encrypted token before it
/// ever reaches the store.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PanRecord {
    pub task_id: ReferenceId,
    pub status: RecordStatus,
    /// Full vendor task document, PAN number redacted via the field cipher.
    pub task_document: serde_json::Value,
    pub received_at: Timestamp,
}

/// Storage for PAN verification records.
pub trait PanStore: Send + Sync {
    /// Persist a terminal PAN task document.
    ///
    /// Must be atomic per key: a record already stored under the same
    /// `task_id` rejects the write with [`StoreError::Duplicate`].
    fn insert_completed(&self, record: PanRecord) -> Result<(), StoreError>;

    /// Look up by task id (the `Reference-id` clients hold).
    fn find_by_task_id(&self, task_id: &ReferenceId) -> Result<Option<PanRecord>, StoreError>;
}
