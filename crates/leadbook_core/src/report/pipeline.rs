//! Pipeline report queries.
//!
//! # Responsibility
//! - Compute the recently-closed, backlog and closed-by-agent views as
//!   pure functions of current lead/agent state.
//!
//! # Invariants
//! - Only `status = closed` leads count as closed, regardless of
//!   `closed_at` content.
//! - Result ordering is deterministic.

use crate::db::DbError;
use crate::model::agent::AgentId;
use crate::model::lead::{LeadId, LeadStatus};
use crate::repo::parse_uuid;
use rusqlite::{params, Connection, OptionalExtension, Row};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Reporting window for the recently-closed view: the last 7 days,
/// lower bound inclusive, upper bound (now) exclusive.
pub const RECENT_CLOSE_WINDOW_MS: i64 = 7 * 24 * 60 * 60 * 1000;

/// Result type for report queries.
pub type ReportResult<T> = Result<T, ReportError>;

/// Report-layer error for DB interaction and result decoding.
#[derive(Debug)]
pub enum ReportError {
    Db(DbError),
    InvalidData(String),
}

impl Display for ReportError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::InvalidData(message) => write!(f, "invalid report row: {message}"),
        }
    }
}

impl Error for ReportError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::InvalidData(_) => None,
        }
    }
}

impl From<DbError> for ReportError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for ReportError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// One lead in the recently-closed view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClosedLeadSummary {
    pub lead_id: LeadId,
    pub name: String,
    pub sales_agent: AgentId,
    /// Assigned agent's display name, when the reference still resolves.
    pub agent_name: Option<String>,
    pub closed_at: i64,
    pub created_at: i64,
}

/// One group in the closed-by-agent breakdown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentClosedCount {
    pub sales_agent: AgentId,
    /// Display name, or the literal `"Unknown"` when the agent record
    /// no longer exists.
    pub agent_name: String,
    pub closed_leads: u64,
}

/// Leads closed within the last 7 days relative to `now_epoch_ms`.
///
/// The caller supplies "now" so the window is testable and consistent
/// across one transport request.
pub fn recently_closed(
    conn: &Connection,
    now_epoch_ms: i64,
) -> ReportResult<Vec<ClosedLeadSummary>> {
    let lower = now_epoch_ms - RECENT_CLOSE_WINDOW_MS;
    let mut stmt = conn.prepare(
        "SELECT
            l.uuid,
            l.name,
            l.sales_agent,
            l.closed_at,
            l.created_at,
            a.name AS agent_name
         FROM leads l
         LEFT JOIN agents a ON a.uuid = l.sales_agent
         WHERE l.status = ?1
           AND l.closed_at IS NOT NULL
           AND l.closed_at >= ?2
           AND l.closed_at < ?3
         ORDER BY l.created_at DESC, l.uuid ASC;",
    )?;

    let mut rows = stmt.query(params![
        LeadStatus::Closed.as_db_str(),
        lower,
        now_epoch_ms
    ])?;
    let mut summaries = Vec::new();
    while let Some(row) = rows.next()? {
        summaries.push(parse_closed_lead_row(row)?);
    }
    Ok(summaries)
}

/// Count of leads not yet in the terminal `Closed` status.
pub fn pipeline_backlog(conn: &Connection) -> ReportResult<u64> {
    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM leads WHERE status <> ?1;",
        [LeadStatus::Closed.as_db_str()],
        |row| row.get(0),
    )?;
    Ok(count.max(0) as u64)
}

/// Closed-lead counts grouped by agent, with display names resolved.
///
/// Group keys are resolved one lookup per distinct agent; a stale agent
/// id degrades to `"Unknown"` instead of failing the report.
pub fn closed_by_agent(conn: &Connection) -> ReportResult<Vec<AgentClosedCount>> {
    let mut stmt = conn.prepare(
        "SELECT sales_agent, COUNT(*) AS closed_leads
         FROM leads
         WHERE status = ?1
         GROUP BY sales_agent
         ORDER BY closed_leads DESC, sales_agent ASC;",
    )?;

    let mut rows = stmt.query([LeadStatus::Closed.as_db_str()])?;
    let mut groups: Vec<(AgentId, u64)> = Vec::new();
    while let Some(row) = rows.next()? {
        let agent_text: String = row.get("sales_agent")?;
        let agent = parse_uuid(&agent_text, "leads.sales_agent")
            .map_err(|err| ReportError::InvalidData(err.to_string()))?;
        let closed_leads: i64 = row.get("closed_leads")?;
        groups.push((agent, closed_leads.max(0) as u64));
    }

    let mut breakdown = Vec::with_capacity(groups.len());
    for (sales_agent, closed_leads) in groups {
        let agent_name: Option<String> = conn
            .query_row(
                "SELECT name FROM agents WHERE uuid = ?1;",
                [sales_agent.to_string()],
                |row| row.get(0),
            )
            .optional()?;
        breakdown.push(AgentClosedCount {
            sales_agent,
            agent_name: agent_name.unwrap_or_else(|| "Unknown".to_string()),
            closed_leads,
        });
    }

    Ok(breakdown)
}

fn parse_closed_lead_row(row: &Row<'_>) -> ReportResult<ClosedLeadSummary> {
    let uuid_text: String = row.get("uuid")?;
    let agent_text: String = row.get("sales_agent")?;
    let map_invalid = |err: crate::repo::RepoError| ReportError::InvalidData(err.to_string());

    Ok(ClosedLeadSummary {
        lead_id: parse_uuid(&uuid_text, "leads.uuid").map_err(map_invalid)?,
        name: row.get("name")?,
        sales_agent: parse_uuid(&agent_text, "leads.sales_agent").map_err(map_invalid)?,
        agent_name: row.get("agent_name")?,
        closed_at: row.get("closed_at")?,
        created_at: row.get("created_at")?,
    })
}
