use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use crate::data::post_repository::{NewPost, PostPatch, PostRepository};
use crate::domain::error::DomainError;
use crate::domain::post::{Post, PostId};

/// Process-local storage backend. Contents are lost on restart.
#[derive(Debug, Default)]
pub(crate) struct InMemoryPostRepository {
    state: RwLock<MemoryState>,
}

#[derive(Debug, Default)]
struct MemoryState {
    posts: BTreeMap<PostId, Post>,
    last_id: i64,
    last_created_at: Option<DateTime<Utc>>,
}

impl InMemoryPostRepository {
    pub(crate) fn new() -> Self {
        Self::default()
    }
}

impl MemoryState {
    fn next_id(&mut self) -> Result<PostId, DomainError> {
        let next = self
            .last_id
            .checked_add(1)
            .ok_or_else(|| DomainError::Unexpected("post id sequence exhausted".to_string()))?;
        self.last_id = next;
        PostId::new(next)
    }

    // Wall clock may step backwards; creation times must not.
    fn next_created_at(&mut self) -> DateTime<Utc> {
        let now = Utc::now();
        let created_at = match self.last_created_at {
            Some(last) if last > now => last,
            _ => now,
        };
        self.last_created_at = Some(created_at);
        created_at
    }
}

#[async_trait]
impl PostRepository for InMemoryPostRepository {
    async fn create_post(&self, input: NewPost) -> Result<Post, DomainError> {
        let mut state = self.state.write().await;
        let id = state.next_id()?;
        let created_at = state.next_created_at();

        let post = Post::new(id.get(), input.title, input.content, input.tags, created_at)?;
        state.posts.insert(id, post.clone());
        Ok(post)
    }

    async fn get_post(&self, id: PostId) -> Result<Option<Post>, DomainError> {
        Ok(self.state.read().await.posts.get(&id).cloned())
    }

    async fn update_post(
        &self,
        id: PostId,
        patch: PostPatch,
    ) -> Result<Option<Post>, DomainError> {
        let mut state = self.state.write().await;
        let Some(post) = state.posts.get_mut(&id) else {
            return Ok(None);
        };

        if let Some(title) = patch.title {
            post.title = title;
        }
        if let Some(content) = patch.content {
            post.content = content;
        }
        if let Some(tags) = patch.tags {
            post.tags = tags;
        }
        Ok(Some(post.clone()))
    }

    async fn delete_post(&self, id: PostId) -> Result<bool, DomainError> {
        Ok(self.state.write().await.posts.remove(&id).is_some())
    }

    async fn list_posts(&self) -> Result<Vec<Post>, DomainError> {
        let state = self.state.read().await;
        let mut posts: Vec<Post> = state.posts.values().cloned().collect();
        posts.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| b.id.cmp(&a.id))
        });
        Ok(posts)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::InMemoryPostRepository;
    use crate::data::post_repository::{NewPost, PostPatch, PostRepository};
    use crate::domain::post::PostId;

    fn new_post(title: &str) -> NewPost {
        NewPost {
            title: title.to_string(),
            content: format!("{title} content"),
            tags: vec!["x".to_string()],
        }
    }

    #[tokio::test]
    async fn create_assigns_unique_ids_and_non_decreasing_timestamps() {
        let repo = InMemoryPostRepository::new();

        let mut ids = HashSet::new();
        let mut last_created_at = None;
        for i in 0..20 {
            let post = repo
                .create_post(new_post(&format!("post {i}")))
                .await
                .expect("create must succeed");
            assert!(ids.insert(post.id), "duplicate id {}", post.id);
            if let Some(last) = last_created_at {
                assert!(post.created_at >= last);
            }
            last_created_at = Some(post.created_at);
        }
    }

    #[tokio::test]
    async fn get_returns_what_create_returned() {
        let repo = InMemoryPostRepository::new();
        let created = repo.create_post(new_post("a")).await.expect("create");

        let fetched = repo
            .get_post(created.id)
            .await
            .expect("get")
            .expect("post must exist");
        assert_eq!(fetched, created);
    }

    #[tokio::test]
    async fn update_merges_supplied_fields_only() {
        let repo = InMemoryPostRepository::new();
        let created = repo.create_post(new_post("a")).await.expect("create");

        let updated = repo
            .update_post(
                created.id,
                PostPatch {
                    tags: Some(vec!["y".to_string(), "z".to_string()]),
                    ..PostPatch::default()
                },
            )
            .await
            .expect("update")
            .expect("post must exist");

        assert_eq!(updated.tags, vec!["y", "z"]);
        assert_eq!(updated.title, created.title);
        assert_eq!(updated.content, created.content);
        assert_eq!(updated.created_at, created.created_at);
        assert_eq!(updated.id, created.id);
    }

    #[tokio::test]
    async fn missing_ids_report_absence() {
        let repo = InMemoryPostRepository::new();
        let id = PostId::new(99).expect("positive id");

        assert!(repo.get_post(id).await.expect("get").is_none());
        assert!(
            repo.update_post(id, PostPatch::default())
                .await
                .expect("update")
                .is_none()
        );
        assert!(!repo.delete_post(id).await.expect("delete"));
    }

    #[tokio::test]
    async fn delete_is_reported_once() {
        let repo = InMemoryPostRepository::new();
        let created = repo.create_post(new_post("a")).await.expect("create");

        assert!(repo.delete_post(created.id).await.expect("delete"));
        assert!(!repo.delete_post(created.id).await.expect("delete"));
        assert!(repo.get_post(created.id).await.expect("get").is_none());
    }

    #[tokio::test]
    async fn list_is_newest_first_and_stable() {
        let repo = InMemoryPostRepository::new();
        for title in ["first", "second", "third"] {
            repo.create_post(new_post(title)).await.expect("create");
        }

        let listed = repo.list_posts().await.expect("list");
        let titles: Vec<_> = listed.iter().map(|p| p.title.as_str()).collect();
        assert_eq!(titles, vec!["third", "second", "first"]);

        let again = repo.list_posts().await.expect("list");
        assert_eq!(listed, again);
    }

    #[tokio::test]
    async fn ids_are_not_reused_after_delete() {
        let repo = InMemoryPostRepository::new();
        let first = repo.create_post(new_post("a")).await.expect("create");
        repo.delete_post(first.id).await.expect("delete");

        let second = repo.create_post(new_post("b")).await.expect("create");
        assert!(second.id > first.id);
    }
}
