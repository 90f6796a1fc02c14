//! Domain model for the lead-pipeline core.
//!
//! # Responsibility
//! - Define the canonical records for the four entity kinds.
//! - Keep identifier and enum wire shapes stable for callers.
//!
//! # Invariants
//! - Every record is identified by a store-generated `Uuid`.
//! - `created_at` is server-stamped; callers never set it.

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

pub mod agent;
pub mod comment;
pub mod lead;
pub mod tag;

pub use agent::{Agent, AgentId};
pub use comment::{Comment, CommentId};
pub use lead::{Lead, LeadId, LeadPriority, LeadStatus};
pub use tag::{Tag, TagId};

/// The four entity kinds held by the store.
///
/// Used by error reporting to say which collection an operation missed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Agent,
    Lead,
    Comment,
    Tag,
}

impl Display for EntityKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Self::Agent => "agent",
            Self::Lead => "lead",
            Self::Comment => "comment",
            Self::Tag => "tag",
        };
        write!(f, "{label}")
    }
}
