//! Tag use-case service.

use crate::model::tag::Tag;
use crate::model::EntityKind;
use crate::repo::TagRepository;
use crate::service::{integrity, ServiceError, ServiceResult};
use serde::{Deserialize, Serialize};

/// Creation intent for a tag.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateTagRequest {
    pub name: Option<String>,
}

/// Facade for tag operations.
pub struct TagService<T: TagRepository> {
    tags: T,
}

impl<T: TagRepository> TagService<T> {
    pub fn new(tags: T) -> Self {
        Self { tags }
    }

    /// Creates a tag. `name` must be present and non-blank.
    pub fn create_tag(&self, request: &CreateTagRequest) -> ServiceResult<Tag> {
        let name = integrity::require_text("name", request.name.as_deref())?;

        let id = self
            .tags
            .create_tag(&name)
            .map_err(|err| ServiceError::repo(EntityKind::Tag, err))?;

        self.tags
            .get_tag(id)
            .map_err(|err| ServiceError::repo(EntityKind::Tag, err))?
            .ok_or(ServiceError::Inconsistent(
                "created tag missing on read-back",
            ))
    }

    pub fn list_tags(&self) -> ServiceResult<Vec<Tag>> {
        self.tags.list_tags().map_err(ServiceError::Repo)
    }
}
