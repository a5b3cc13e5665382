//! Клиентская библиотека для работы с REST API blog-server.
//!
//! Предоставляет `BlogClient` поверх HTTP (`reqwest`), а также
//! вспомогательные модули для отображения постов:
//! - [`filter`]: поиск, фильтр по тегам, похожие посты, превью
//! - [`markdown`]: рендер содержимого поста в HTML
#![warn(missing_docs)]

mod error;
pub mod filter;
mod http_client;
pub mod markdown;
mod models;

pub use error::{BlogClientError, BlogClientResult};
pub use models::{FieldError, NewPost, Post, PostUpdate};

use http_client::HttpClient;

#[derive(Debug, Clone)]
/// Клиент блог-сервиса.
pub struct BlogClient {
    http_client: HttpClient,
}

impl BlogClient {
    /// Создаёт клиент для сервера с базовым URL, например `http://127.0.0.1:8080`.
    pub fn new(base_url: impl Into<String>) -> BlogClientResult<Self> {
        Ok(Self {
            http_client: HttpClient::new(base_url)?,
        })
    }

    /// Базовый URL сервера.
    pub fn base_url(&self) -> &str {
        self.http_client.base_url()
    }

    /// Возвращает все посты, новые первыми.
    pub async fn list_posts(&self) -> BlogClientResult<Vec<Post>> {
        self.http_client.list_posts().await
    }

    /// Возвращает пост по идентификатору.
    pub async fn get_post(&self, id: i64) -> BlogClientResult<Post> {
        self.http_client.get_post(id).await
    }

    /// Создаёт новый пост.
    pub async fn create_post(&self, post: NewPost) -> BlogClientResult<Post> {
        self.http_client.create_post(&post).await
    }

    /// Обновляет только заданные поля поста.
    pub async fn update_post(&self, id: i64, update: PostUpdate) -> BlogClientResult<Post> {
        self.http_client.update_post(id, &update).await
    }

    /// Удаляет пост по идентификатору.
    pub async fn delete_post(&self, id: i64) -> BlogClientResult<()> {
        self.http_client.delete_post(id).await
    }
}
