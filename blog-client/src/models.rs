use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
/// Публичная модель поста.
pub struct Post {
    /// Идентификатор поста.
    pub id: i64,
    /// Заголовок поста.
    pub title: String,
    /// Содержимое поста (markdown).
    pub content: String,
    /// Теги поста.
    #[serde(default)]
    pub tags: Vec<String>,
    /// Дата и время создания поста (UTC).
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Serialize)]
/// Данные для создания поста.
pub struct NewPost {
    /// Заголовок (не должен быть пустым).
    pub title: String,
    /// Содержимое.
    pub content: String,
    /// Теги.
    pub tags: Vec<String>,
}

impl NewPost {
    /// Создаёт пост без тегов.
    pub fn new(title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            content: content.into(),
            tags: Vec::new(),
        }
    }

    /// Задаёт теги поста.
    pub fn with_tags<I, T>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
/// Частичное обновление поста: отправляются только заданные поля.
pub struct PostUpdate {
    /// Новый заголовок.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Новое содержимое.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    /// Новый набор тегов (заменяет текущий целиком).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
}

impl PostUpdate {
    /// Возвращает `true`, если ни одно поле не задано.
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.content.is_none() && self.tags.is_none()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
/// Ошибка валидации отдельного поля.
pub struct FieldError {
    /// Имя поля.
    pub field: String,
    /// Машинный код ошибки.
    pub code: String,
    /// Описание ошибки.
    pub message: String,
}
