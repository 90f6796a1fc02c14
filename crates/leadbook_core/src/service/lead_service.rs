//! Lead use-case service.
//!
//! # Responsibility
//! - Provide create/get/list/update/delete entry points for leads.
//! - Resolve the `sales_agent` reference before any write reaches the
//!   store, and apply the pipeline default status at the boundary.
//!
//! # Invariants
//! - `sales_agent` is re-resolved on update only when the reference
//!   itself changes.
//! - A transition into `Closed` stamps `closed_at` unless the caller
//!   supplies an explicit close time.

use crate::current_epoch_ms;
use crate::model::agent::AgentId;
use crate::model::lead::{LeadId, LeadPriority, LeadStatus};
use crate::model::tag::TagId;
use crate::model::EntityKind;
use crate::repo::{
    AgentRepository, LeadDraft, LeadListQuery, LeadRecord, LeadRepository, LeadUpdate,
};
use crate::service::{integrity, ServiceError, ServiceResult};
use serde::{Deserialize, Serialize};

/// Creation intent for a lead. `name`, `source` and `sales_agent` are
/// required; `status` defaults to `New` when absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateLeadRequest {
    pub name: Option<String>,
    pub source: Option<String>,
    pub sales_agent: Option<AgentId>,
    pub status: Option<LeadStatus>,
    #[serde(default)]
    pub tags: Vec<TagId>,
    pub time_to_close: Option<i64>,
    pub priority: Option<LeadPriority>,
}

/// Partial update intent for a lead. `None` fields stay unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateLeadRequest {
    pub name: Option<String>,
    pub source: Option<String>,
    pub sales_agent: Option<AgentId>,
    pub status: Option<LeadStatus>,
    /// Replaces the whole tag set when present.
    pub tags: Option<Vec<TagId>>,
    pub time_to_close: Option<i64>,
    pub priority: Option<LeadPriority>,
    /// Explicit close time in epoch milliseconds; wins over stamping.
    pub closed_at: Option<i64>,
}

/// Facade for lead operations.
pub struct LeadService<L: LeadRepository, A: AgentRepository> {
    leads: L,
    agents: A,
}

impl<L: LeadRepository, A: AgentRepository> LeadService<L, A> {
    pub fn new(leads: L, agents: A) -> Self {
        Self { leads, agents }
    }

    /// Creates a lead.
    ///
    /// # Contract
    /// - `name`, `source`, `sales_agent` must be present.
    /// - `sales_agent` must resolve to an existing agent.
    /// - Absent `status` becomes `New`; a lead created directly in
    ///   `Closed` gets `closed_at` stamped.
    pub fn create_lead(&self, request: &CreateLeadRequest) -> ServiceResult<LeadRecord> {
        let name = integrity::require_text("name", request.name.as_deref())?;
        let source = integrity::require_text("source", request.source.as_deref())?;
        let sales_agent = integrity::require("sales_agent", request.sales_agent)?;
        integrity::ensure_agent_resolves(&self.agents, "sales_agent", sales_agent)?;

        let status = request.status.unwrap_or(LeadStatus::New);
        let draft = LeadDraft {
            name,
            source,
            sales_agent,
            status,
            tags: request.tags.clone(),
            time_to_close: request.time_to_close,
            priority: request.priority,
            closed_at: status.is_closed().then(current_epoch_ms),
        };

        let id = self
            .leads
            .create_lead(&draft)
            .map_err(|err| ServiceError::repo(EntityKind::Lead, err))?;

        self.read_back(id, "created lead missing on read-back")
    }

    pub fn get_lead(&self, id: LeadId) -> ServiceResult<LeadRecord> {
        self.leads
            .get_lead_record(id)
            .map_err(|err| ServiceError::repo(EntityKind::Lead, err))?
            .ok_or(ServiceError::NotFound {
                kind: EntityKind::Lead,
                id,
            })
    }

    pub fn list_leads(&self, query: &LeadListQuery) -> ServiceResult<Vec<LeadRecord>> {
        self.leads.list_leads(query).map_err(ServiceError::Repo)
    }

    /// Updates lead fields.
    ///
    /// # Contract
    /// - Provided text fields must still be non-blank.
    /// - A changed `sales_agent` must resolve; an unchanged one is not
    ///   re-validated.
    /// - A transition into `Closed` without an explicit `closed_at`
    ///   stamps the current time.
    pub fn update_lead(&self, id: LeadId, request: &UpdateLeadRequest) -> ServiceResult<LeadRecord> {
        let current = self
            .leads
            .get_lead(id)
            .map_err(|err| ServiceError::repo(EntityKind::Lead, err))?
            .ok_or(ServiceError::NotFound {
                kind: EntityKind::Lead,
                id,
            })?;

        let mut changes = LeadUpdate {
            status: request.status,
            tags: request.tags.clone(),
            time_to_close: request.time_to_close,
            priority: request.priority,
            closed_at: request.closed_at,
            ..LeadUpdate::default()
        };

        if let Some(name) = request.name.as_deref() {
            changes.name = Some(integrity::require_text("name", Some(name))?);
        }
        if let Some(source) = request.source.as_deref() {
            changes.source = Some(integrity::require_text("source", Some(source))?);
        }
        if let Some(agent) = request.sales_agent {
            if agent != current.sales_agent {
                integrity::ensure_agent_resolves(&self.agents, "sales_agent", agent)?;
            }
            changes.sales_agent = Some(agent);
        }

        let becomes_closed = changes.status == Some(LeadStatus::Closed);
        if changes.closed_at.is_none() && becomes_closed && current.closed_at.is_none() {
            changes.closed_at = Some(current_epoch_ms());
        }

        self.leads
            .update_lead(id, &changes)
            .map_err(|err| ServiceError::repo(EntityKind::Lead, err))?;

        self.read_back(id, "updated lead missing on read-back")
    }

    /// Deletes a lead unconditionally. Comments referencing it remain.
    pub fn delete_lead(&self, id: LeadId) -> ServiceResult<()> {
        self.leads
            .delete_lead(id)
            .map_err(|err| ServiceError::repo(EntityKind::Lead, err))
    }

    fn read_back(&self, id: LeadId, context: &'static str) -> ServiceResult<LeadRecord> {
        self.leads
            .get_lead_record(id)
            .map_err(|err| ServiceError::repo(EntityKind::Lead, err))?
            .ok_or(ServiceError::Inconsistent(context))
    }
}
