//! Comment record.
//!
//! # Invariants
//! - `lead` and `author` resolve to existing records at creation time.
//! - Deleting the referenced lead or agent later does not cascade here.

use crate::model::agent::AgentId;
use crate::model::lead::LeadId;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable identifier for a comment.
pub type CommentId = Uuid;

/// A comment left by an agent on a lead.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    pub id: CommentId,
    pub lead: LeadId,
    pub author: AgentId,
    pub comment_text: String,
    /// Creation time in epoch milliseconds, stamped by the store.
    pub created_at: i64,
}
