//! Comment use-case service.
//!
//! # Responsibility
//! - Provide create/list/update-text/delete entry points for comments.
//! - Resolve both the lead and the author before a comment is written,
//!   so no comment with a dangling reference is ever persisted.

use crate::model::agent::AgentId;
use crate::model::comment::{Comment, CommentId};
use crate::model::lead::LeadId;
use crate::model::EntityKind;
use crate::repo::{
    AgentRepository, CommentListQuery, CommentRecord, CommentRepository, LeadRepository,
};
use crate::service::{integrity, ServiceError, ServiceResult};
use serde::{Deserialize, Serialize};

/// Creation intent for a comment. All fields are required.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateCommentRequest {
    pub lead: Option<LeadId>,
    pub author: Option<AgentId>,
    pub comment_text: Option<String>,
}

/// Text replacement intent for a comment.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateCommentRequest {
    pub comment_text: Option<String>,
}

/// Facade for comment operations.
pub struct CommentService<C: CommentRepository, L: LeadRepository, A: AgentRepository> {
    comments: C,
    leads: L,
    agents: A,
}

impl<C: CommentRepository, L: LeadRepository, A: AgentRepository> CommentService<C, L, A> {
    pub fn new(comments: C, leads: L, agents: A) -> Self {
        Self {
            comments,
            leads,
            agents,
        }
    }

    /// Creates a comment.
    ///
    /// # Contract
    /// - `lead`, `author` and `comment_text` must be present.
    /// - `lead` must resolve to an existing lead, `author` to an
    ///   existing agent; on failure nothing is persisted.
    pub fn create_comment(&self, request: &CreateCommentRequest) -> ServiceResult<Comment> {
        let lead = integrity::require("lead", request.lead)?;
        let author = integrity::require("author", request.author)?;
        let comment_text =
            integrity::require_text("comment_text", request.comment_text.as_deref())?;

        integrity::ensure_lead_resolves(&self.leads, "lead", lead)?;
        integrity::ensure_agent_resolves(&self.agents, "author", author)?;

        let id = self
            .comments
            .create_comment(lead, author, &comment_text)
            .map_err(|err| ServiceError::repo(EntityKind::Comment, err))?;

        self.comments
            .get_comment(id)
            .map_err(|err| ServiceError::repo(EntityKind::Comment, err))?
            .ok_or(ServiceError::Inconsistent(
                "created comment missing on read-back",
            ))
    }

    /// Lists comments, optionally narrowed to one lead, with the lead
    /// and author resolved for display.
    pub fn list_comments(&self, query: &CommentListQuery) -> ServiceResult<Vec<CommentRecord>> {
        self.comments
            .list_comments(query)
            .map_err(ServiceError::Repo)
    }

    /// Replaces the comment text.
    pub fn update_comment_text(
        &self,
        id: CommentId,
        request: &UpdateCommentRequest,
    ) -> ServiceResult<Comment> {
        let comment_text =
            integrity::require_text("comment_text", request.comment_text.as_deref())?;

        self.comments
            .update_comment_text(id, &comment_text)
            .map_err(|err| ServiceError::repo(EntityKind::Comment, err))?;

        self.comments
            .get_comment(id)
            .map_err(|err| ServiceError::repo(EntityKind::Comment, err))?
            .ok_or(ServiceError::Inconsistent(
                "updated comment missing on read-back",
            ))
    }

    pub fn delete_comment(&self, id: CommentId) -> ServiceResult<()> {
        self.comments
            .delete_comment(id)
            .map_err(|err| ServiceError::repo(EntityKind::Comment, err))
    }
}
