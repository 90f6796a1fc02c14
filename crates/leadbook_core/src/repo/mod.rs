//! Entity store: repository contracts and SQLite implementations.
//!
//! # Responsibility
//! - Provide keyed CRUD access per entity kind over migrated storage.
//! - Generate identifiers and stamp timestamps on the server side.
//! - Isolate SQL details from integrity rules and services.
//!
//! # Invariants
//! - Identifiers are store-generated; callers never supply them.
//! - Default list order is `created_at DESC, uuid ASC`.
//! - Read paths reject invalid persisted state instead of masking it.

use crate::db::DbError;
use rusqlite::Connection;
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

pub mod agent_repo;
pub mod comment_repo;
pub mod lead_repo;
pub mod tag_repo;

pub use agent_repo::{AgentRepository, AgentUpdate, SqliteAgentRepository};
pub use comment_repo::{
    CommentListQuery, CommentRecord, CommentRepository, SqliteCommentRepository,
};
pub use lead_repo::{
    LeadDraft, LeadListQuery, LeadRecord, LeadRepository, LeadUpdate, SqliteLeadRepository,
};
pub use tag_repo::{SqliteTagRepository, TagRepository};

pub type RepoResult<T> = Result<T, RepoError>;

/// Store-level error shared by all entity repositories.
#[derive(Debug)]
pub enum RepoError {
    Db(DbError),
    /// No record with this id in the targeted collection.
    NotFound(Uuid),
    /// A unique key already holds the written value.
    Duplicate {
        table: &'static str,
        column: &'static str,
    },
    /// Persisted state failed to decode into a domain record.
    InvalidData(String),
    /// Connection has not been migrated to the supported schema version.
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    MissingRequiredTable(&'static str),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "record not found: {id}"),
            Self::Duplicate { table, column } => {
                write!(f, "duplicate value for unique column {table}.{column}")
            }
            Self::InvalidData(message) => write!(f, "invalid persisted data: {message}"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "connection schema version {actual_version} does not match expected {expected_version}"
            ),
            Self::MissingRequiredTable(table) => {
                write!(f, "required table `{table}` is missing")
            }
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Verifies the connection is migrated and carries the listed tables.
///
/// Called by every repository constructor so no query ever runs against
/// an unmigrated or partial schema.
pub(crate) fn ensure_connection_ready(
    conn: &Connection,
    tables: &[&'static str],
) -> RepoResult<()> {
    let expected = crate::db::migrations::latest_version();
    let actual = conn.query_row("PRAGMA user_version;", [], |row| row.get::<_, u32>(0))?;
    if actual != expected {
        return Err(RepoError::UninitializedConnection {
            expected_version: expected,
            actual_version: actual,
        });
    }

    for table in tables {
        let exists: i64 = conn.query_row(
            "SELECT EXISTS(
                SELECT 1
                FROM sqlite_master
                WHERE type = 'table' AND name = ?1
            );",
            [table],
            |row| row.get(0),
        )?;
        if exists != 1 {
            return Err(RepoError::MissingRequiredTable(table));
        }
    }

    Ok(())
}

pub(crate) fn parse_uuid(value: &str, context: &str) -> RepoResult<Uuid> {
    Uuid::parse_str(value)
        .map_err(|_| RepoError::InvalidData(format!("invalid uuid value `{value}` in {context}")))
}

/// Whether this SQLite failure is a unique-constraint hit on `needle`.
pub(crate) fn unique_violation(err: &rusqlite::Error, needle: &str) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(failure, Some(message))
            if failure.code == rusqlite::ErrorCode::ConstraintViolation
                && message.contains(needle)
    )
}
