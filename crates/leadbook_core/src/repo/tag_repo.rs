//! Tag repository contract and SQLite implementation.

use crate::model::tag::{Tag, TagId};
use crate::repo::{ensure_connection_ready, parse_uuid, RepoResult};
use rusqlite::{params, Connection, Row};
use uuid::Uuid;

/// Repository interface for tag records.
pub trait TagRepository {
    /// Creates a tag and returns its store-generated id.
    fn create_tag(&self, name: &str) -> RepoResult<TagId>;
    fn get_tag(&self, id: TagId) -> RepoResult<Option<Tag>>;
    /// Lists all tags, newest first.
    fn list_tags(&self) -> RepoResult<Vec<Tag>>;
}

/// SQLite-backed tag repository.
pub struct SqliteTagRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteTagRepository<'conn> {
    /// Constructs a repository from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn, &["tags"])?;
        Ok(Self { conn })
    }
}

impl TagRepository for SqliteTagRepository<'_> {
    fn create_tag(&self, name: &str) -> RepoResult<TagId> {
        let id = Uuid::new_v4();
        self.conn.execute(
            "INSERT INTO tags (uuid, name) VALUES (?1, ?2);",
            params![id.to_string(), name],
        )?;
        Ok(id)
    }

    fn get_tag(&self, id: TagId) -> RepoResult<Option<Tag>> {
        let mut stmt = self.conn.prepare(
            "SELECT uuid, name, created_at FROM tags WHERE uuid = ?1;",
        )?;
        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_tag_row(row)?));
        }
        Ok(None)
    }

    fn list_tags(&self) -> RepoResult<Vec<Tag>> {
        let mut stmt = self.conn.prepare(
            "SELECT uuid, name, created_at FROM tags ORDER BY created_at DESC, uuid ASC;",
        )?;
        let mut rows = stmt.query([])?;
        let mut tags = Vec::new();
        while let Some(row) = rows.next()? {
            tags.push(parse_tag_row(row)?);
        }
        Ok(tags)
    }
}

fn parse_tag_row(row: &Row<'_>) -> RepoResult<Tag> {
    let uuid_text: String = row.get("uuid")?;
    Ok(Tag {
        id: parse_uuid(&uuid_text, "tags.uuid")?,
        name: row.get("name")?,
        created_at: row.get("created_at")?,
    })
}
