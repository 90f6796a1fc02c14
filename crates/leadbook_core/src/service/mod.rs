//! Service facade and integrity enforcement.
//!
//! # Responsibility
//! - Map each external intent to one rule-check + store-call sequence.
//! - Translate every expected failure into a typed [`ServiceError`].
//!
//! # Invariants
//! - Cross-entity rules run before the store mutation, so no
//!   partially-invalid state is ever persisted.
//! - Services stay storage-agnostic behind the repository traits.

use crate::model::agent::AgentId;
use crate::model::EntityKind;
use crate::repo::RepoError;
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

pub mod agent_service;
pub mod comment_service;
pub mod integrity;
pub mod lead_service;
pub mod tag_service;

pub use agent_service::{AgentService, CreateAgentRequest, UpdateAgentRequest};
pub use comment_service::{CommentService, CreateCommentRequest, UpdateCommentRequest};
pub use lead_service::{CreateLeadRequest, LeadService, UpdateLeadRequest};
pub use tag_service::{CreateTagRequest, TagService};

pub type ServiceResult<T> = Result<T, ServiceError>;

/// Uniqueness or referential-deletion constraint violation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConflictError {
    /// Another agent already uses this email.
    DuplicateEmail(String),
    /// The agent still owns leads and cannot be deleted.
    AgentAssigned { agent: AgentId, leads: u64 },
}

impl Display for ConflictError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DuplicateEmail(email) => {
                write!(f, "agent with email `{email}` already exists")
            }
            Self::AgentAssigned { agent, leads } => {
                write!(f, "agent {agent} is still assigned to {leads} lead(s)")
            }
        }
    }
}

/// Facade-level error taxonomy.
///
/// Every rejected mutation states which rule failed so the caller can
/// correct and retry.
#[derive(Debug)]
pub enum ServiceError {
    /// A required input field is absent or blank.
    MissingField(&'static str),
    /// A referenced entity id does not resolve.
    InvalidReference { field: &'static str, id: Uuid },
    Conflict(ConflictError),
    /// The targeted record does not exist.
    NotFound { kind: EntityKind, id: Uuid },
    /// Write/read-back mismatch inside one operation.
    Inconsistent(&'static str),
    /// Unexpected store failure, propagated unchanged.
    Repo(RepoError),
}

impl ServiceError {
    /// Maps a store error for an operation targeting `kind`.
    pub(crate) fn repo(kind: EntityKind, err: RepoError) -> Self {
        match err {
            RepoError::NotFound(id) => Self::NotFound { kind, id },
            other => Self::Repo(other),
        }
    }
}

impl Display for ServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingField(field) => write!(f, "missing required field: {field}"),
            Self::InvalidReference { field, id } => {
                write!(f, "invalid {field} reference: {id}")
            }
            Self::Conflict(conflict) => write!(f, "{conflict}"),
            Self::NotFound { kind, id } => write!(f, "{kind} not found: {id}"),
            Self::Inconsistent(details) => write!(f, "inconsistent state: {details}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}
