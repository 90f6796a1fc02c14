//! Comment repository contract and SQLite implementation.
//!
//! # Invariants
//! - Reference columns are opaque uuids; dangling references load fine
//!   and resolve to `None` display fields.

use crate::model::agent::AgentId;
use crate::model::comment::{Comment, CommentId};
use crate::model::lead::LeadId;
use crate::repo::{ensure_connection_ready, parse_uuid, RepoError, RepoResult};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, Row};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Query options for listing comments.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommentListQuery {
    /// Restrict to comments on one lead.
    pub lead: Option<LeadId>,
    pub limit: Option<u32>,
    pub offset: u32,
}

/// Comment plus its lead and author resolved for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommentRecord {
    pub comment: Comment,
    pub lead_name: Option<String>,
    pub author_name: Option<String>,
    pub author_email: Option<String>,
}

/// Repository interface for comment records.
pub trait CommentRepository {
    /// Creates a comment and returns its store-generated id.
    fn create_comment(
        &self,
        lead: LeadId,
        author: AgentId,
        comment_text: &str,
    ) -> RepoResult<CommentId>;
    fn get_comment(&self, id: CommentId) -> RepoResult<Option<Comment>>;
    fn list_comments(&self, query: &CommentListQuery) -> RepoResult<Vec<CommentRecord>>;
    fn update_comment_text(&self, id: CommentId, comment_text: &str) -> RepoResult<()>;
    fn delete_comment(&self, id: CommentId) -> RepoResult<()>;
}

/// SQLite-backed comment repository.
pub struct SqliteCommentRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteCommentRepository<'conn> {
    /// Constructs a repository from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn, &["comments", "leads", "agents"])?;
        Ok(Self { conn })
    }
}

impl CommentRepository for SqliteCommentRepository<'_> {
    fn create_comment(
        &self,
        lead: LeadId,
        author: AgentId,
        comment_text: &str,
    ) -> RepoResult<CommentId> {
        let id = Uuid::new_v4();
        self.conn.execute(
            "INSERT INTO comments (uuid, lead_uuid, author_uuid, comment_text)
             VALUES (?1, ?2, ?3, ?4);",
            params![
                id.to_string(),
                lead.to_string(),
                author.to_string(),
                comment_text
            ],
        )?;
        Ok(id)
    }

    fn get_comment(&self, id: CommentId) -> RepoResult<Option<Comment>> {
        let mut stmt = self.conn.prepare(
            "SELECT uuid, lead_uuid, author_uuid, comment_text, created_at
             FROM comments
             WHERE uuid = ?1;",
        )?;
        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_comment_row(row)?));
        }
        Ok(None)
    }

    fn list_comments(&self, query: &CommentListQuery) -> RepoResult<Vec<CommentRecord>> {
        let mut sql = String::from(
            "SELECT
                c.uuid,
                c.lead_uuid,
                c.author_uuid,
                c.comment_text,
                c.created_at,
                l.name AS lead_name,
                a.name AS author_name,
                a.email AS author_email
             FROM comments c
             LEFT JOIN leads l ON l.uuid = c.lead_uuid
             LEFT JOIN agents a ON a.uuid = c.author_uuid
             WHERE 1 = 1",
        );
        let mut bind_values: Vec<Value> = Vec::new();

        if let Some(lead) = query.lead {
            sql.push_str(" AND c.lead_uuid = ?");
            bind_values.push(Value::Text(lead.to_string()));
        }

        sql.push_str(" ORDER BY c.created_at DESC, c.uuid ASC");

        if let Some(limit) = query.limit {
            sql.push_str(" LIMIT ?");
            bind_values.push(Value::Integer(i64::from(limit)));
            if query.offset > 0 {
                sql.push_str(" OFFSET ?");
                bind_values.push(Value::Integer(i64::from(query.offset)));
            }
        } else if query.offset > 0 {
            sql.push_str(" LIMIT -1 OFFSET ?");
            bind_values.push(Value::Integer(i64::from(query.offset)));
        }

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut records = Vec::new();
        while let Some(row) = rows.next()? {
            records.push(CommentRecord {
                comment: parse_comment_row(row)?,
                lead_name: row.get("lead_name")?,
                author_name: row.get("author_name")?,
                author_email: row.get("author_email")?,
            });
        }
        Ok(records)
    }

    fn update_comment_text(&self, id: CommentId, comment_text: &str) -> RepoResult<()> {
        let changed = self.conn.execute(
            "UPDATE comments
             SET comment_text = ?2, updated_at = (strftime('%s', 'now') * 1000)
             WHERE uuid = ?1;",
            params![id.to_string(), comment_text],
        )?;
        if changed == 0 {
            return Err(RepoError::NotFound(id));
        }
        Ok(())
    }

    fn delete_comment(&self, id: CommentId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM comments WHERE uuid = ?1;", [id.to_string()])?;
        if changed == 0 {
            return Err(RepoError::NotFound(id));
        }
        Ok(())
    }
}

fn parse_comment_row(row: &Row<'_>) -> RepoResult<Comment> {
    let uuid_text: String = row.get("uuid")?;
    let lead_text: String = row.get("lead_uuid")?;
    let author_text: String = row.get("author_uuid")?;
    Ok(Comment {
        id: parse_uuid(&uuid_text, "comments.uuid")?,
        lead: parse_uuid(&lead_text, "comments.lead_uuid")?,
        author: parse_uuid(&author_text, "comments.author_uuid")?,
        comment_text: row.get("comment_text")?,
        created_at: row.get("created_at")?,
    })
}
