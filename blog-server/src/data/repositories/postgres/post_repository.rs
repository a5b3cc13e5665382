use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::data::post_repository::{NewPost, PostPatch, PostRepository};
use crate::domain::error::DomainError;
use crate::domain::post::{Post, PostId};

#[derive(Debug, Clone)]
pub(crate) struct PostgresPostRepository {
    pool: PgPool,
}

impl PostgresPostRepository {
    pub(crate) fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct PostRow {
    id: i64,
    title: String,
    content: String,
    tags: Vec<String>,
    created_at: DateTime<Utc>,
}

#[async_trait]
impl PostRepository for PostgresPostRepository {
    async fn create_post(&self, input: NewPost) -> Result<Post, DomainError> {
        let row = sqlx::query_as::<_, PostRow>(
            r#"
            INSERT INTO posts (title, content, tags)
            VALUES ($1, $2, $3)
            RETURNING id, title, content, tags, created_at
            "#,
        )
        .bind(input.title)
        .bind(input.content)
        .bind(input.tags)
        .fetch_one(&self.pool)
        .await
        .map_err(map_post_db_error)?;

        map_row_to_post(row)
    }

    async fn get_post(&self, id: PostId) -> Result<Option<Post>, DomainError> {
        let row = sqlx::query_as::<_, PostRow>(
            r#"
            SELECT
                id,
                title,
                content,
                tags,
                created_at
            FROM posts
            WHERE id = $1
            "#,
        )
        .bind(id.get())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_post_db_error)?;

        row.map(map_row_to_post).transpose()
    }

    async fn update_post(
        &self,
        id: PostId,
        patch: PostPatch,
    ) -> Result<Option<Post>, DomainError> {
        let row = sqlx::query_as::<_, PostRow>(
            r#"
            UPDATE posts
            SET title = COALESCE($2, title),
                content = COALESCE($3, content),
                tags = COALESCE($4, tags)
            WHERE id = $1
            RETURNING id, title, content, tags, created_at
            "#,
        )
        .bind(id.get())
        .bind(patch.title)
        .bind(patch.content)
        .bind(patch.tags)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_post_db_error)?;

        row.map(map_row_to_post).transpose()
    }

    async fn delete_post(&self, id: PostId) -> Result<bool, DomainError> {
        let result = sqlx::query(
            r#"
            DELETE FROM posts
            WHERE id = $1
            "#,
        )
        .bind(id.get())
        .execute(&self.pool)
        .await
        .map_err(map_post_db_error)?;

        Ok(result.rows_affected() > 0)
    }

    async fn list_posts(&self) -> Result<Vec<Post>, DomainError> {
        let rows = sqlx::query_as::<_, PostRow>(
            r#"
            SELECT
                id,
                title,
                content,
                tags,
                created_at
            FROM posts
            ORDER BY created_at DESC, id DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(map_post_db_error)?;

        rows.into_iter().map(map_row_to_post).collect()
    }
}

fn map_row_to_post(row: PostRow) -> Result<Post, DomainError> {
    Post::new(row.id, row.title, row.content, row.tags, row.created_at)
        .map_err(|err| DomainError::Unexpected(format!("corrupt post row {}: {err}", row.id)))
}

fn map_post_db_error(err: sqlx::Error) -> DomainError {
    DomainError::Unexpected(err.to_string())
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use chrono::Utc;
    use sqlx::postgres::PgPoolOptions;

    use super::{PostRow, PostgresPostRepository, map_row_to_post};
    use crate::data::post_repository::{NewPost, PostPatch, PostRepository};
    use crate::domain::error::DomainError;
    use crate::domain::post::PostId;
    use crate::infrastructure::database::MIGRATOR;

    async fn connect() -> PostgresPostRepository {
        let url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");
        let options = sqlx::postgres::PgConnectOptions::from_str(&url).expect("valid url");
        let pool = PgPoolOptions::new()
            .max_connections(2)
            .connect_with(options)
            .await
            .expect("database must be reachable");
        MIGRATOR.run(&pool).await.expect("migrations must apply");
        PostgresPostRepository::new(pool)
    }

    fn row(id: i64, title: &str) -> PostRow {
        PostRow {
            id,
            title: title.to_string(),
            content: "body".to_string(),
            tags: vec!["x".to_string()],
            created_at: Utc::now(),
        }
    }

    #[test]
    fn stored_row_with_blank_title_still_maps() {
        let post = map_row_to_post(row(7, "")).expect("stored rows are trusted");
        assert_eq!(post.id.get(), 7);
        assert_eq!(post.title, "");
        assert_eq!(post.tags, vec!["x"]);
    }

    #[test]
    fn row_with_non_positive_id_is_a_storage_fault() {
        let err = map_row_to_post(row(0, "t")).expect_err("id must be > 0");
        assert!(matches!(err, DomainError::Unexpected(_)));
    }

    #[tokio::test]
    #[ignore = "requires running PostgreSQL (DATABASE_URL)"]
    async fn crud_round_trip_against_postgres() {
        let repo = connect().await;

        let created = repo
            .create_post(NewPost {
                title: "pg title".to_string(),
                content: "pg content".to_string(),
                tags: vec!["a".to_string(), "b".to_string()],
            })
            .await
            .expect("create must succeed");

        let fetched = repo
            .get_post(created.id)
            .await
            .expect("get must succeed")
            .expect("post must exist");
        assert_eq!(fetched, created);

        let updated = repo
            .update_post(
                created.id,
                PostPatch {
                    tags: Some(vec!["c".to_string()]),
                    ..PostPatch::default()
                },
            )
            .await
            .expect("update must succeed")
            .expect("post must exist");
        assert_eq!(updated.tags, vec!["c"]);
        assert_eq!(updated.title, "pg title");
        assert_eq!(updated.created_at, created.created_at);

        let listed = repo.list_posts().await.expect("list must succeed");
        assert!(listed.iter().any(|post| post.id == created.id));

        assert!(repo.delete_post(created.id).await.expect("delete must succeed"));
        assert!(!repo.delete_post(created.id).await.expect("delete must succeed"));
    }

    #[tokio::test]
    #[ignore = "requires running PostgreSQL (DATABASE_URL)"]
    async fn missing_post_is_none_against_postgres() {
        let repo = connect().await;
        let id = PostId::new(i64::MAX).expect("positive id");

        assert!(repo.get_post(id).await.expect("query must succeed").is_none());
        assert!(
            repo.update_post(id, PostPatch::default())
                .await
                .expect("query must succeed")
                .is_none()
        );
    }
}
