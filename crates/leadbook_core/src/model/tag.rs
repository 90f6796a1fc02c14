//! Classification tag record.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable identifier for a tag.
pub type TagId = Uuid;

/// A free-form classification tag referenced from lead tag sets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    pub id: TagId,
    pub name: String,
    /// Creation time in epoch milliseconds, stamped by the store.
    pub created_at: i64,
}
