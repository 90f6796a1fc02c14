//! Core domain logic for the leadbook CRM backend.
//! This crate is the single source of truth for pipeline invariants.

pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod report;
pub mod service;

pub use logging::{default_log_level, init_logging, logging_status};
pub use model::{
    Agent, AgentId, Comment, CommentId, EntityKind, Lead, LeadId, LeadPriority, LeadStatus, Tag,
    TagId,
};
pub use repo::{
    AgentRepository, AgentUpdate, CommentListQuery, CommentRecord, CommentRepository, LeadDraft,
    LeadListQuery, LeadRecord, LeadRepository, LeadUpdate, RepoError, RepoResult,
    SqliteAgentRepository, SqliteCommentRepository, SqliteLeadRepository, SqliteTagRepository,
    TagRepository,
};
pub use report::{
    closed_by_agent, pipeline_backlog, recently_closed, AgentClosedCount, ClosedLeadSummary,
    ReportError, ReportResult, RECENT_CLOSE_WINDOW_MS,
};
pub use service::{
    AgentService, CommentService, ConflictError, CreateAgentRequest, CreateCommentRequest,
    CreateLeadRequest, CreateTagRequest, LeadService, ServiceError, ServiceResult, TagService,
    UpdateAgentRequest, UpdateCommentRequest, UpdateLeadRequest,
};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

/// Current wall-clock time in epoch milliseconds.
///
/// Transport callers pass this as "now" to time-windowed reports;
/// services use it to stamp close transitions.
pub fn current_epoch_ms() -> i64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_millis() as i64)
        .unwrap_or(0)
}
