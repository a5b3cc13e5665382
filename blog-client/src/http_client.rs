use reqwest::{Client, Method, RequestBuilder};
use serde::{Deserialize, de::DeserializeOwned};
use std::time::Duration;

use crate::error::{BlogClientError, BlogClientResult};
use crate::models::{FieldError, NewPost, Post, PostUpdate};

#[derive(Debug, Deserialize)]
struct ErrorResponseDto {
    message: Option<String>,
    #[serde(default)]
    errors: Vec<FieldError>,
}

#[derive(Debug, Clone)]
/// HTTP-клиент для работы с REST API `blog-server`.
pub(crate) struct HttpClient {
    base_url: String,
    client: Client,
}

impl HttpClient {
    /// Создаёт новый HTTP-клиент с базовым URL сервера.
    pub(crate) fn new(base_url: impl Into<String>) -> BlogClientResult<Self> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(5))
            .timeout(Duration::from_secs(15))
            .build()?;

        Ok(Self {
            base_url: base_url.into(),
            client,
        })
    }

    pub(crate) fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    fn post_path(id: i64) -> String {
        format!("/api/posts/{id}")
    }

    async fn decode_error(response: reqwest::Response) -> BlogClientError {
        let status = response.status();

        match response.json::<ErrorResponseDto>().await {
            Ok(body) => BlogClientError::from_http_status(status, body.message, body.errors),
            Err(_) => BlogClientError::from_http_status(status, None, Vec::new()),
        }
    }

    async fn send(&self, request: RequestBuilder) -> BlogClientResult<reqwest::Response> {
        let response = request
            .send()
            .await
            .map_err(BlogClientError::from_reqwest)?;
        if !response.status().is_success() {
            return Err(Self::decode_error(response).await);
        }
        Ok(response)
    }

    /// отправляет запрос и разбирает json-ответ
    async fn fetch<TRes>(&self, request: RequestBuilder) -> BlogClientResult<TRes>
    where
        TRes: DeserializeOwned,
    {
        self.send(request)
            .await?
            .json::<TRes>()
            .await
            .map_err(BlogClientError::from_reqwest)
    }

    /// Возвращает все посты, новые первыми.
    pub(crate) async fn list_posts(&self) -> BlogClientResult<Vec<Post>> {
        let request = self.client.request(Method::GET, self.endpoint("/api/posts"));
        self.fetch(request).await
    }

    /// Получает пост по идентификатору.
    pub(crate) async fn get_post(&self, id: i64) -> BlogClientResult<Post> {
        let request = self
            .client
            .request(Method::GET, self.endpoint(&Self::post_path(id)));
        self.fetch(request).await
    }

    /// Создаёт пост.
    pub(crate) async fn create_post(&self, post: &NewPost) -> BlogClientResult<Post> {
        let request = self
            .client
            .request(Method::POST, self.endpoint("/api/posts"))
            .json(post);
        self.fetch(request).await
    }

    /// Частично обновляет пост.
    pub(crate) async fn update_post(&self, id: i64, update: &PostUpdate) -> BlogClientResult<Post> {
        let request = self
            .client
            .request(Method::PUT, self.endpoint(&Self::post_path(id)))
            .json(update);
        self.fetch(request).await
    }

    /// Удаляет пост по идентификатору.
    pub(crate) async fn delete_post(&self, id: i64) -> BlogClientResult<()> {
        let request = self
            .client
            .request(Method::DELETE, self.endpoint(&Self::post_path(id)));
        self.send(request).await?;
        Ok(())
    }
}
