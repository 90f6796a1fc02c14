//! Lead repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Persist lead rows and their tag-set link rows.
//! - Serve display records with the assigned agent resolved by join.
//!
//! # Invariants
//! - A lead row and its tag links change together in one transaction.
//! - `sales_agent` is stored as an opaque uuid; resolution rules live
//!   above the store.

use crate::model::agent::AgentId;
use crate::model::lead::{Lead, LeadId, LeadPriority, LeadStatus};
use crate::model::tag::TagId;
use crate::repo::{ensure_connection_ready, parse_uuid, RepoError, RepoResult};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, Row};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

const LEAD_SELECT_SQL: &str = "SELECT
    l.uuid,
    l.name,
    l.source,
    l.sales_agent,
    l.status,
    l.time_to_close,
    l.priority,
    l.closed_at,
    l.created_at
FROM leads l";

/// Fully validated field set for a new lead.
///
/// Built by the service layer after integrity checks; `status` has the
/// pipeline default already applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeadDraft {
    pub name: String,
    pub source: String,
    pub sales_agent: AgentId,
    pub status: LeadStatus,
    pub tags: Vec<TagId>,
    pub time_to_close: Option<i64>,
    pub priority: Option<LeadPriority>,
    pub closed_at: Option<i64>,
}

/// Partial update for a lead. `None` fields stay unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LeadUpdate {
    pub name: Option<String>,
    pub source: Option<String>,
    pub sales_agent: Option<AgentId>,
    pub status: Option<LeadStatus>,
    /// Replaces the whole tag set when present.
    pub tags: Option<Vec<TagId>>,
    pub time_to_close: Option<i64>,
    pub priority: Option<LeadPriority>,
    pub closed_at: Option<i64>,
}

/// Query options for listing leads.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LeadListQuery {
    pub status: Option<LeadStatus>,
    pub sales_agent: Option<AgentId>,
    pub limit: Option<u32>,
    pub offset: u32,
}

/// Lead plus the assigned agent resolved for display.
///
/// Agent fields are `None` only when the stored reference no longer
/// resolves; deletion blocking makes that unusual but stale data must
/// still load.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeadRecord {
    pub lead: Lead,
    pub agent_name: Option<String>,
    pub agent_email: Option<String>,
}

/// Repository interface for lead records.
pub trait LeadRepository {
    /// Creates a lead with its tag links and returns the generated id.
    fn create_lead(&self, draft: &LeadDraft) -> RepoResult<LeadId>;
    fn get_lead(&self, id: LeadId) -> RepoResult<Option<Lead>>;
    fn get_lead_record(&self, id: LeadId) -> RepoResult<Option<LeadRecord>>;
    fn list_leads(&self, query: &LeadListQuery) -> RepoResult<Vec<LeadRecord>>;
    fn update_lead(&self, id: LeadId, changes: &LeadUpdate) -> RepoResult<()>;
    fn delete_lead(&self, id: LeadId) -> RepoResult<()>;
    fn lead_exists(&self, id: LeadId) -> RepoResult<bool>;
    /// Number of leads currently referencing this agent.
    fn count_leads_for_agent(&self, agent: AgentId) -> RepoResult<u64>;
}

/// SQLite-backed lead repository.
pub struct SqliteLeadRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteLeadRepository<'conn> {
    /// Constructs a repository from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn, &["leads", "lead_tags", "agents"])?;
        Ok(Self { conn })
    }
}

impl LeadRepository for SqliteLeadRepository<'_> {
    fn create_lead(&self, draft: &LeadDraft) -> RepoResult<LeadId> {
        let id = Uuid::new_v4();
        let tx = self.conn.unchecked_transaction()?;

        tx.execute(
            "INSERT INTO leads (
                uuid,
                name,
                source,
                sales_agent,
                status,
                time_to_close,
                priority,
                closed_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8);",
            params![
                id.to_string(),
                draft.name.as_str(),
                draft.source.as_str(),
                draft.sales_agent.to_string(),
                draft.status.as_db_str(),
                draft.time_to_close,
                draft.priority.map(LeadPriority::as_db_str),
                draft.closed_at,
            ],
        )?;

        insert_tag_links(&tx, &id.to_string(), &draft.tags)?;
        tx.commit()?;

        Ok(id)
    }

    fn get_lead(&self, id: LeadId) -> RepoResult<Option<Lead>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{LEAD_SELECT_SQL} WHERE l.uuid = ?1;"))?;
        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            let mut lead = parse_lead_row(row)?;
            lead.tags = load_tag_links(self.conn, &lead.id.to_string())?;
            return Ok(Some(lead));
        }
        Ok(None)
    }

    fn get_lead_record(&self, id: LeadId) -> RepoResult<Option<LeadRecord>> {
        let sql = format!(
            "{} WHERE l.uuid = ?1;",
            lead_record_select_sql("")
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_lead_record_row(self.conn, row)?));
        }
        Ok(None)
    }

    fn list_leads(&self, query: &LeadListQuery) -> RepoResult<Vec<LeadRecord>> {
        let mut filters = String::from(" WHERE 1 = 1");
        let mut bind_values: Vec<Value> = Vec::new();

        if let Some(status) = query.status {
            filters.push_str(" AND l.status = ?");
            bind_values.push(Value::Text(status.as_db_str().to_string()));
        }
        if let Some(agent) = query.sales_agent {
            filters.push_str(" AND l.sales_agent = ?");
            bind_values.push(Value::Text(agent.to_string()));
        }

        filters.push_str(" ORDER BY l.created_at DESC, l.uuid ASC");

        if let Some(limit) = query.limit {
            filters.push_str(" LIMIT ?");
            bind_values.push(Value::Integer(i64::from(limit)));
            if query.offset > 0 {
                filters.push_str(" OFFSET ?");
                bind_values.push(Value::Integer(i64::from(query.offset)));
            }
        } else if query.offset > 0 {
            filters.push_str(" LIMIT -1 OFFSET ?");
            bind_values.push(Value::Integer(i64::from(query.offset)));
        }

        let sql = lead_record_select_sql(&filters);
        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut records = Vec::new();
        while let Some(row) = rows.next()? {
            records.push(parse_lead_record_row(self.conn, row)?);
        }
        Ok(records)
    }

    fn update_lead(&self, id: LeadId, changes: &LeadUpdate) -> RepoResult<()> {
        let id_text = id.to_string();
        let tx = self.conn.unchecked_transaction()?;

        let mut sets: Vec<&'static str> = Vec::new();
        let mut bind_values: Vec<Value> = Vec::new();

        if let Some(name) = &changes.name {
            sets.push("name = ?");
            bind_values.push(Value::Text(name.clone()));
        }
        if let Some(source) = &changes.source {
            sets.push("source = ?");
            bind_values.push(Value::Text(source.clone()));
        }
        if let Some(agent) = changes.sales_agent {
            sets.push("sales_agent = ?");
            bind_values.push(Value::Text(agent.to_string()));
        }
        if let Some(status) = changes.status {
            sets.push("status = ?");
            bind_values.push(Value::Text(status.as_db_str().to_string()));
        }
        if let Some(time_to_close) = changes.time_to_close {
            sets.push("time_to_close = ?");
            bind_values.push(Value::Integer(time_to_close));
        }
        if let Some(priority) = changes.priority {
            sets.push("priority = ?");
            bind_values.push(Value::Text(priority.as_db_str().to_string()));
        }
        if let Some(closed_at) = changes.closed_at {
            sets.push("closed_at = ?");
            bind_values.push(Value::Integer(closed_at));
        }
        sets.push("updated_at = (strftime('%s', 'now') * 1000)");

        let sql = format!("UPDATE leads SET {} WHERE uuid = ?;", sets.join(", "));
        bind_values.push(Value::Text(id_text.clone()));

        let changed = tx.execute(&sql, params_from_iter(bind_values))?;
        if changed == 0 {
            return Err(RepoError::NotFound(id));
        }

        if let Some(tags) = &changes.tags {
            tx.execute("DELETE FROM lead_tags WHERE lead_uuid = ?1;", [&id_text])?;
            insert_tag_links(&tx, &id_text, tags)?;
        }

        tx.commit()?;
        Ok(())
    }

    fn delete_lead(&self, id: LeadId) -> RepoResult<()> {
        // Tag links cascade with the lead row; comments stay behind as
        // dangling references by design.
        let changed = self
            .conn
            .execute("DELETE FROM leads WHERE uuid = ?1;", [id.to_string()])?;
        if changed == 0 {
            return Err(RepoError::NotFound(id));
        }
        Ok(())
    }

    fn lead_exists(&self, id: LeadId) -> RepoResult<bool> {
        let exists: i64 = self.conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM leads WHERE uuid = ?1);",
            [id.to_string()],
            |row| row.get(0),
        )?;
        Ok(exists == 1)
    }

    fn count_leads_for_agent(&self, agent: AgentId) -> RepoResult<u64> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM leads WHERE sales_agent = ?1;",
            [agent.to_string()],
            |row| row.get(0),
        )?;
        Ok(count.max(0) as u64)
    }
}

fn lead_record_select_sql(suffix: &str) -> String {
    format!(
        "SELECT
            l.uuid,
            l.name,
            l.source,
            l.sales_agent,
            l.status,
            l.time_to_close,
            l.priority,
            l.closed_at,
            l.created_at,
            a.name AS agent_name,
            a.email AS agent_email
         FROM leads l
         LEFT JOIN agents a ON a.uuid = l.sales_agent{suffix}"
    )
}

fn insert_tag_links(
    tx: &rusqlite::Transaction<'_>,
    lead_uuid: &str,
    tags: &[TagId],
) -> RepoResult<()> {
    for tag in tags {
        tx.execute(
            "INSERT OR IGNORE INTO lead_tags (lead_uuid, tag_uuid) VALUES (?1, ?2);",
            params![lead_uuid, tag.to_string()],
        )?;
    }
    Ok(())
}

fn load_tag_links(conn: &Connection, lead_uuid: &str) -> RepoResult<Vec<TagId>> {
    let mut stmt = conn.prepare(
        "SELECT tag_uuid FROM lead_tags WHERE lead_uuid = ?1 ORDER BY tag_uuid ASC;",
    )?;
    let mut rows = stmt.query([lead_uuid])?;
    let mut tags = Vec::new();
    while let Some(row) = rows.next()? {
        let value: String = row.get(0)?;
        tags.push(parse_uuid(&value, "lead_tags.tag_uuid")?);
    }
    Ok(tags)
}

fn parse_lead_row(row: &Row<'_>) -> RepoResult<Lead> {
    let uuid_text: String = row.get("uuid")?;
    let agent_text: String = row.get("sales_agent")?;

    let status_text: String = row.get("status")?;
    let status = LeadStatus::from_db_str(&status_text).ok_or_else(|| {
        RepoError::InvalidData(format!("invalid status `{status_text}` in leads.status"))
    })?;

    let priority = match row.get::<_, Option<String>>("priority")? {
        Some(value) => Some(LeadPriority::from_db_str(&value).ok_or_else(|| {
            RepoError::InvalidData(format!("invalid priority `{value}` in leads.priority"))
        })?),
        None => None,
    };

    Ok(Lead {
        id: parse_uuid(&uuid_text, "leads.uuid")?,
        name: row.get("name")?,
        source: row.get("source")?,
        sales_agent: parse_uuid(&agent_text, "leads.sales_agent")?,
        status,
        tags: Vec::new(),
        time_to_close: row.get("time_to_close")?,
        priority,
        closed_at: row.get("closed_at")?,
        created_at: row.get("created_at")?,
    })
}

fn parse_lead_record_row(conn: &Connection, row: &Row<'_>) -> RepoResult<LeadRecord> {
    let mut lead = parse_lead_row(row)?;
    lead.tags = load_tag_links(conn, &lead.id.to_string())?;
    Ok(LeadRecord {
        lead,
        agent_name: row.get("agent_name")?,
        agent_email: row.get("agent_email")?,
    })
}
