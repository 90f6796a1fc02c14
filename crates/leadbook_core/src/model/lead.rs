//! Lead record and its pipeline enums.
//!
//! # Responsibility
//! - Define the lead shape shared by store, integrity rules and reports.
//! - Map pipeline enums to their persisted string values.
//!
//! # Invariants
//! - `sales_agent` resolves to an existing agent at creation time.
//! - `status == Closed` is the trigger for closed-lead reporting;
//!   `closed_at` is stamped on the transition into Closed.

use crate::model::agent::AgentId;
use crate::model::tag::TagId;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable identifier for a lead.
pub type LeadId = Uuid;

/// Pipeline stage of a lead. New leads start in `New`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LeadStatus {
    New,
    Contacted,
    Qualified,
    ProposalSent,
    Closed,
}

impl LeadStatus {
    /// String value persisted in the `leads.status` column.
    pub fn as_db_str(self) -> &'static str {
        match self {
            Self::New => "new",
            Self::Contacted => "contacted",
            Self::Qualified => "qualified",
            Self::ProposalSent => "proposal_sent",
            Self::Closed => "closed",
        }
    }

    /// Parses a persisted status value. Returns `None` for unknown input.
    pub fn from_db_str(value: &str) -> Option<Self> {
        match value {
            "new" => Some(Self::New),
            "contacted" => Some(Self::Contacted),
            "qualified" => Some(Self::Qualified),
            "proposal_sent" => Some(Self::ProposalSent),
            "closed" => Some(Self::Closed),
            _ => None,
        }
    }

    /// Whether this status is the terminal pipeline stage.
    pub fn is_closed(self) -> bool {
        matches!(self, Self::Closed)
    }
}

/// Optional triage priority for a lead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LeadPriority {
    High,
    Medium,
    Low,
}

impl LeadPriority {
    pub fn as_db_str(self) -> &'static str {
        match self {
            Self::High => "high",
            Self::Medium => "medium",
            Self::Low => "low",
        }
    }

    pub fn from_db_str(value: &str) -> Option<Self> {
        match value {
            "high" => Some(Self::High),
            "medium" => Some(Self::Medium),
            "low" => Some(Self::Low),
            _ => None,
        }
    }
}

/// A sales lead assigned to one agent.
///
/// `tags` holds non-owning tag references; the store does not validate
/// them against the tag collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lead {
    pub id: LeadId,
    pub name: String,
    /// Where the lead came from (referral, website, cold call, ...).
    pub source: String,
    pub sales_agent: AgentId,
    pub status: LeadStatus,
    pub tags: Vec<TagId>,
    /// Estimated days to close, when the agent has one.
    pub time_to_close: Option<i64>,
    pub priority: Option<LeadPriority>,
    /// Epoch milliseconds of the transition into `Closed`.
    pub closed_at: Option<i64>,
    /// Creation time in epoch milliseconds, stamped by the store.
    pub created_at: i64,
}
