//! Sales agent record.
//!
//! # Invariants
//! - `email` is unique across all agents (enforced by the store).
//! - Agents are only ever created explicitly, never auto-created.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable identifier for a sales agent.
pub type AgentId = Uuid;

/// A sales agent who owns leads and authors comments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Agent {
    pub id: AgentId,
    pub name: String,
    pub email: String,
    /// Creation time in epoch milliseconds, stamped by the store.
    pub created_at: i64,
}
