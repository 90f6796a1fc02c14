//! Cross-entity integrity rules.
//!
//! # Responsibility
//! - Gate mutating operations with presence and reference checks
//!   before anything reaches the store.
//!
//! # Invariants
//! - Rules only read the store; writes stay in the repositories.
//! - First failing rule wins; later rules are not evaluated.

use crate::model::agent::AgentId;
use crate::model::lead::LeadId;
use crate::repo::{AgentRepository, LeadRepository};
use crate::service::{ConflictError, ServiceError, ServiceResult};

/// Unwraps a required field or fails with `MissingField`.
pub fn require<T>(field: &'static str, value: Option<T>) -> ServiceResult<T> {
    value.ok_or(ServiceError::MissingField(field))
}

/// Unwraps a required text field, trimming it and treating blank input
/// as absent.
pub fn require_text(field: &'static str, value: Option<&str>) -> ServiceResult<String> {
    let text = value.map(str::trim).unwrap_or_default();
    if text.is_empty() {
        return Err(ServiceError::MissingField(field));
    }
    Ok(text.to_string())
}

/// Rejects agent creation for an email already in use.
pub fn ensure_email_available<A: AgentRepository>(agents: &A, email: &str) -> ServiceResult<()> {
    if agents.email_exists(email).map_err(ServiceError::Repo)? {
        return Err(ServiceError::Conflict(ConflictError::DuplicateEmail(
            email.to_string(),
        )));
    }
    Ok(())
}

/// Requires `id` to resolve to an existing agent.
pub fn ensure_agent_resolves<A: AgentRepository>(
    agents: &A,
    field: &'static str,
    id: AgentId,
) -> ServiceResult<()> {
    if !agents.agent_exists(id).map_err(ServiceError::Repo)? {
        return Err(ServiceError::InvalidReference { field, id });
    }
    Ok(())
}

/// Requires `id` to resolve to an existing lead.
pub fn ensure_lead_resolves<L: LeadRepository>(
    leads: &L,
    field: &'static str,
    id: LeadId,
) -> ServiceResult<()> {
    if !leads.lead_exists(id).map_err(ServiceError::Repo)? {
        return Err(ServiceError::InvalidReference { field, id });
    }
    Ok(())
}

/// Blocks agent deletion while any lead still references the agent.
pub fn ensure_agent_unassigned<L: LeadRepository>(leads: &L, agent: AgentId) -> ServiceResult<()> {
    let assigned = leads
        .count_leads_for_agent(agent)
        .map_err(ServiceError::Repo)?;
    if assigned > 0 {
        return Err(ServiceError::Conflict(ConflictError::AgentAssigned {
            agent,
            leads: assigned,
        }));
    }
    Ok(())
}
