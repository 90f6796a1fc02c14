//! Agent repository contract and SQLite implementation.
//!
//! # Invariants
//! - `agents.email` is unique; violations surface as `RepoError::Duplicate`.
//! - Deletion is a plain single-row delete; the referenced-by-leads rule
//!   is enforced above the store.

use crate::model::agent::{Agent, AgentId};
use crate::repo::{
    ensure_connection_ready, parse_uuid, unique_violation, RepoError, RepoResult,
};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, Row};
use uuid::Uuid;

const AGENT_SELECT_SQL: &str = "SELECT uuid, name, email, created_at FROM agents";

/// Partial update for an agent. `None` fields stay unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AgentUpdate {
    pub name: Option<String>,
    pub email: Option<String>,
}

/// Repository interface for agent records.
pub trait AgentRepository {
    /// Creates an agent and returns its store-generated id.
    fn create_agent(&self, name: &str, email: &str) -> RepoResult<AgentId>;
    fn get_agent(&self, id: AgentId) -> RepoResult<Option<Agent>>;
    /// Lists all agents, newest first.
    fn list_agents(&self) -> RepoResult<Vec<Agent>>;
    fn update_agent(&self, id: AgentId, changes: &AgentUpdate) -> RepoResult<()>;
    fn delete_agent(&self, id: AgentId) -> RepoResult<()>;
    fn agent_exists(&self, id: AgentId) -> RepoResult<bool>;
    fn email_exists(&self, email: &str) -> RepoResult<bool>;
}

/// SQLite-backed agent repository.
pub struct SqliteAgentRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteAgentRepository<'conn> {
    /// Constructs a repository from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn, &["agents"])?;
        Ok(Self { conn })
    }
}

impl AgentRepository for SqliteAgentRepository<'_> {
    fn create_agent(&self, name: &str, email: &str) -> RepoResult<AgentId> {
        let id = Uuid::new_v4();
        self.conn
            .execute(
                "INSERT INTO agents (uuid, name, email) VALUES (?1, ?2, ?3);",
                params![id.to_string(), name, email],
            )
            .map_err(|err| {
                if unique_violation(&err, "agents.email") {
                    RepoError::Duplicate {
                        table: "agents",
                        column: "email",
                    }
                } else {
                    RepoError::from(err)
                }
            })?;

        Ok(id)
    }

    fn get_agent(&self, id: AgentId) -> RepoResult<Option<Agent>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{AGENT_SELECT_SQL} WHERE uuid = ?1;"))?;
        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_agent_row(row)?));
        }
        Ok(None)
    }

    fn list_agents(&self) -> RepoResult<Vec<Agent>> {
        let mut stmt = self.conn.prepare(&format!(
            "{AGENT_SELECT_SQL} ORDER BY created_at DESC, uuid ASC;"
        ))?;
        let mut rows = stmt.query([])?;
        let mut agents = Vec::new();
        while let Some(row) = rows.next()? {
            agents.push(parse_agent_row(row)?);
        }
        Ok(agents)
    }

    fn update_agent(&self, id: AgentId, changes: &AgentUpdate) -> RepoResult<()> {
        let mut sets: Vec<&'static str> = Vec::new();
        let mut bind_values: Vec<Value> = Vec::new();

        if let Some(name) = &changes.name {
            sets.push("name = ?");
            bind_values.push(Value::Text(name.clone()));
        }
        if let Some(email) = &changes.email {
            sets.push("email = ?");
            bind_values.push(Value::Text(email.clone()));
        }
        sets.push("updated_at = (strftime('%s', 'now') * 1000)");

        let sql = format!("UPDATE agents SET {} WHERE uuid = ?;", sets.join(", "));
        bind_values.push(Value::Text(id.to_string()));

        let changed = self
            .conn
            .execute(&sql, params_from_iter(bind_values))
            .map_err(|err| {
                if unique_violation(&err, "agents.email") {
                    RepoError::Duplicate {
                        table: "agents",
                        column: "email",
                    }
                } else {
                    RepoError::from(err)
                }
            })?;

        if changed == 0 {
            return Err(RepoError::NotFound(id));
        }
        Ok(())
    }

    fn delete_agent(&self, id: AgentId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM agents WHERE uuid = ?1;", [id.to_string()])?;
        if changed == 0 {
            return Err(RepoError::NotFound(id));
        }
        Ok(())
    }

    fn agent_exists(&self, id: AgentId) -> RepoResult<bool> {
        let exists: i64 = self.conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM agents WHERE uuid = ?1);",
            [id.to_string()],
            |row| row.get(0),
        )?;
        Ok(exists == 1)
    }

    fn email_exists(&self, email: &str) -> RepoResult<bool> {
        let exists: i64 = self.conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM agents WHERE email = ?1);",
            [email],
            |row| row.get(0),
        )?;
        Ok(exists == 1)
    }
}

fn parse_agent_row(row: &Row<'_>) -> RepoResult<Agent> {
    let uuid_text: String = row.get("uuid")?;
    Ok(Agent {
        id: parse_uuid(&uuid_text, "agents.uuid")?,
        name: row.get("name")?,
        email: row.get("email")?,
        created_at: row.get("created_at")?,
    })
}
