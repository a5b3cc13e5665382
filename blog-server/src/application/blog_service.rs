use crate::data::post_repository::{NewPost, PostPatch, PostRepository};
use crate::domain::error::DomainError;
use crate::domain::post::{CreatePostRequest, Post, PostId, UpdatePostRequest};

pub(crate) struct BlogService<R: PostRepository> {
    repo: R,
}

impl<R: PostRepository> BlogService<R> {
    pub(crate) fn new(repo: R) -> Self {
        Self { repo }
    }

    pub(crate) async fn create_post(&self, req: CreatePostRequest) -> Result<Post, DomainError> {
        let req = req.validate()?;

        let new_post = NewPost {
            title: req.title,
            content: req.content,
            tags: req.tags,
        };
        self.repo.create_post(new_post).await
    }

    pub(crate) async fn get_post(&self, id: PostId) -> Result<Post, DomainError> {
        self.repo
            .get_post(id)
            .await?
            .ok_or_else(|| not_found(id))
    }

    pub(crate) async fn update_post(
        &self,
        id: PostId,
        req: UpdatePostRequest,
    ) -> Result<Post, DomainError> {
        let req = req.validate()?;
        if req.is_empty() {
            return self.get_post(id).await;
        }

        let patch = PostPatch {
            title: req.title,
            content: req.content,
            tags: req.tags,
        };
        self.repo
            .update_post(id, patch)
            .await?
            .ok_or_else(|| not_found(id))
    }

    pub(crate) async fn delete_post(&self, id: PostId) -> Result<(), DomainError> {
        let deleted = self.repo.delete_post(id).await?;
        if !deleted {
            return Err(not_found(id));
        }
        Ok(())
    }

    pub(crate) async fn list_posts(&self) -> Result<Vec<Post>, DomainError> {
        self.repo.list_posts().await
    }
}

fn not_found(id: PostId) -> DomainError {
    DomainError::NotFound(format!("post id: {id}"))
}
