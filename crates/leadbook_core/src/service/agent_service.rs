//! Agent use-case service.
//!
//! # Responsibility
//! - Provide create/get/list/update/delete entry points for agents.
//! - Enforce email uniqueness on creation and the referenced-by-leads
//!   deletion block.

use crate::model::agent::{Agent, AgentId};
use crate::model::EntityKind;
use crate::repo::{AgentRepository, AgentUpdate, LeadRepository, RepoError};
use crate::service::{integrity, ConflictError, ServiceError, ServiceResult};
use serde::{Deserialize, Serialize};

/// Creation intent for an agent. Both fields are required.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateAgentRequest {
    pub name: Option<String>,
    pub email: Option<String>,
}

/// Partial update intent for an agent. `None` fields stay unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateAgentRequest {
    pub name: Option<String>,
    pub email: Option<String>,
}

/// Facade for agent operations.
pub struct AgentService<A: AgentRepository, L: LeadRepository> {
    agents: A,
    leads: L,
}

impl<A: AgentRepository, L: LeadRepository> AgentService<A, L> {
    pub fn new(agents: A, leads: L) -> Self {
        Self { agents, leads }
    }

    /// Creates an agent.
    ///
    /// # Contract
    /// - `name` and `email` must be present and non-blank.
    /// - A duplicate email is rejected with `Conflict`, never merged.
    pub fn create_agent(&self, request: &CreateAgentRequest) -> ServiceResult<Agent> {
        let name = integrity::require_text("name", request.name.as_deref())?;
        let email = integrity::require_text("email", request.email.as_deref())?;
        integrity::ensure_email_available(&self.agents, &email)?;

        let id = self
            .agents
            .create_agent(&name, &email)
            .map_err(|err| match err {
                // Store-level backstop for the check-then-act window.
                RepoError::Duplicate { .. } => {
                    ServiceError::Conflict(ConflictError::DuplicateEmail(email.clone()))
                }
                other => ServiceError::Repo(other),
            })?;

        self.agents
            .get_agent(id)
            .map_err(|err| ServiceError::repo(EntityKind::Agent, err))?
            .ok_or(ServiceError::Inconsistent(
                "created agent missing on read-back",
            ))
    }

    pub fn get_agent(&self, id: AgentId) -> ServiceResult<Agent> {
        self.agents
            .get_agent(id)
            .map_err(|err| ServiceError::repo(EntityKind::Agent, err))?
            .ok_or(ServiceError::NotFound {
                kind: EntityKind::Agent,
                id,
            })
    }

    pub fn list_agents(&self) -> ServiceResult<Vec<Agent>> {
        self.agents.list_agents().map_err(ServiceError::Repo)
    }

    /// Updates agent fields. Provided fields must still be non-blank.
    pub fn update_agent(&self, id: AgentId, request: &UpdateAgentRequest) -> ServiceResult<Agent> {
        let mut changes = AgentUpdate::default();
        if let Some(name) = request.name.as_deref() {
            changes.name = Some(integrity::require_text("name", Some(name))?);
        }
        if let Some(email) = request.email.as_deref() {
            changes.email = Some(integrity::require_text("email", Some(email))?);
        }

        self.agents.update_agent(id, &changes).map_err(|err| {
            match err {
                RepoError::Duplicate { .. } => ServiceError::Conflict(
                    ConflictError::DuplicateEmail(changes.email.clone().unwrap_or_default()),
                ),
                other => ServiceError::repo(EntityKind::Agent, other),
            }
        })?;

        self.agents
            .get_agent(id)
            .map_err(|err| ServiceError::repo(EntityKind::Agent, err))?
            .ok_or(ServiceError::Inconsistent(
                "updated agent missing on read-back",
            ))
    }

    /// Deletes an agent.
    ///
    /// # Contract
    /// - Rejected with `Conflict` while any lead references the agent;
    ///   checked before target existence, so an assigned agent id never
    ///   reports `NotFound`.
    pub fn delete_agent(&self, id: AgentId) -> ServiceResult<()> {
        integrity::ensure_agent_unassigned(&self.leads, id)?;
        self.agents
            .delete_agent(id)
            .map_err(|err| ServiceError::repo(EntityKind::Agent, err))
    }
}
