use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::error::DomainError;
use crate::domain::post::{Post, PostId};

#[derive(Debug, Clone)]
pub(crate) struct NewPost {
    pub(crate) title: String,
    pub(crate) content: String,
    pub(crate) tags: Vec<String>,
}

/// Shallow patch: `None` leaves the stored value untouched, `Some` replaces it.
#[derive(Debug, Clone, Default)]
pub(crate) struct PostPatch {
    pub(crate) title: Option<String>,
    pub(crate) content: Option<String>,
    pub(crate) tags: Option<Vec<String>>,
}

#[async_trait]
pub(crate) trait PostRepository: Send + Sync {
    async fn create_post(&self, input: NewPost) -> Result<Post, DomainError>;
    async fn get_post(&self, id: PostId) -> Result<Option<Post>, DomainError>;
    async fn update_post(&self, id: PostId, patch: PostPatch)
    -> Result<Option<Post>, DomainError>;
    async fn delete_post(&self, id: PostId) -> Result<bool, DomainError>;
    /// Newest first, ties broken by descending id.
    async fn list_posts(&self) -> Result<Vec<Post>, DomainError>;
}

#[async_trait]
impl<T: PostRepository + ?Sized> PostRepository for Arc<T> {
    async fn create_post(&self, input: NewPost) -> Result<Post, DomainError> {
        (**self).create_post(input).await
    }

    async fn get_post(&self, id: PostId) -> Result<Option<Post>, DomainError> {
        (**self).get_post(id).await
    }

    async fn update_post(
        &self,
        id: PostId,
        patch: PostPatch,
    ) -> Result<Option<Post>, DomainError> {
        (**self).update_post(id, patch).await
    }

    async fn delete_post(&self, id: PostId) -> Result<bool, DomainError> {
        (**self).delete_post(id).await
    }

    async fn list_posts(&self) -> Result<Vec<Post>, DomainError> {
        (**self).list_posts().await
    }
}
