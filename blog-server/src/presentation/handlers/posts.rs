use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::{HeaderName, StatusCode, header},
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use utoipa::ToSchema;
use validator::{Validate, ValidationError};

use crate::domain::post::{CreatePostRequest, Post, UpdatePostRequest, title_violation};
use crate::presentation::AppState;
use crate::presentation::app_error::{AppResult, ErrorBody};
use crate::presentation::extractors::PostIdPath;
use crate::presentation::json_fields::JsonFields;

#[derive(Debug, Validate, ToSchema)]
pub(crate) struct CreatePostDto {
    #[validate(
        required(message = "is required"),
        custom(function = "validate_title")
    )]
    pub(crate) title: Option<String>,
    #[validate(required(message = "is required"))]
    pub(crate) content: Option<String>,
    pub(crate) tags: Option<Vec<String>>,
}

impl CreatePostDto {
    fn read(fields: &mut JsonFields<'_>) -> Self {
        Self {
            title: fields.string("title"),
            content: fields.string("content"),
            tags: fields.string_list("tags"),
        }
    }
}

impl From<CreatePostDto> for CreatePostRequest {
    fn from(dto: CreatePostDto) -> Self {
        Self {
            title: dto.title.unwrap_or_default(),
            content: dto.content.unwrap_or_default(),
            tags: dto.tags.unwrap_or_default(),
        }
    }
}

#[derive(Debug, Validate, ToSchema)]
pub(crate) struct UpdatePostDto {
    #[validate(custom(function = "validate_title"))]
    pub(crate) title: Option<String>,
    pub(crate) content: Option<String>,
    pub(crate) tags: Option<Vec<String>>,
}

impl UpdatePostDto {
    fn read(fields: &mut JsonFields<'_>) -> Self {
        Self {
            title: fields.string("title"),
            content: fields.string("content"),
            tags: fields.string_list("tags"),
        }
    }
}

impl From<UpdatePostDto> for UpdatePostRequest {
    fn from(dto: UpdatePostDto) -> Self {
        Self {
            title: dto.title,
            content: dto.content,
            tags: dto.tags,
        }
    }
}

fn validate_title(title: &str) -> Result<(), ValidationError> {
    match title_violation(title) {
        Some(violation) => {
            Err(ValidationError::new(violation.code).with_message(violation.message.into()))
        }
        None => Ok(()),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct PostDto {
    pub(crate) id: i64,
    pub(crate) title: String,
    pub(crate) content: String,
    pub(crate) tags: Vec<String>,
    pub(crate) created_at: DateTime<Utc>,
}

impl From<Post> for PostDto {
    fn from(post: Post) -> Self {
        Self {
            id: post.id.get(),
            title: post.title,
            content: post.content,
            tags: post.tags,
            created_at: post.created_at,
        }
    }
}

#[utoipa::path(
    get,
    path = "/api/posts",
    tag = "posts",
    responses(
        (status = 200, description = "All posts, newest first", body = [PostDto]),
        (status = 500, description = "Internal error", body = ErrorBody)
    )
)]
pub(crate) async fn list_posts(State(state): State<AppState>) -> AppResult<Json<Vec<PostDto>>> {
    let posts = state.blog_service.list_posts().await?;

    Ok(Json(posts.into_iter().map(PostDto::from).collect()))
}

#[utoipa::path(
    get,
    path = "/api/posts/{id}",
    tag = "posts",
    params(
        ("id" = i64, Path, description = "Post id")
    ),
    responses(
        (status = 200, description = "Post found", body = PostDto),
        (status = 400, description = "Invalid post id", body = ErrorBody),
        (status = 404, description = "Post not found", body = ErrorBody),
        (status = 500, description = "Internal error", body = ErrorBody)
    )
)]
pub(crate) async fn get_post(
    State(state): State<AppState>,
    PostIdPath(id): PostIdPath,
) -> AppResult<Json<PostDto>> {
    let post = state.blog_service.get_post(id).await?;

    Ok(Json(PostDto::from(post)))
}

#[utoipa::path(
    post,
    path = "/api/posts",
    tag = "posts",
    request_body = CreatePostDto,
    responses(
        (status = 201, description = "Post created", body = PostDto,
            headers(("Location" = String, description = "Path of the new post"))),
        (status = 400, description = "Validation error", body = ErrorBody),
        (status = 500, description = "Internal error", body = ErrorBody)
    )
)]
pub(crate) async fn create_post(
    State(state): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> AppResult<(StatusCode, [(HeaderName, String); 1], Json<PostDto>)> {
    let Json(body) = payload?;
    let mut fields = JsonFields::new(&body)?;
    let dto = CreatePostDto::read(&mut fields);
    fields.finish(dto.validate())?;

    let post = state.blog_service.create_post(dto.into()).await?;
    let location = format!("/api/posts/{}", post.id);
    Ok((
        StatusCode::CREATED,
        [(header::LOCATION, location)],
        Json(PostDto::from(post)),
    ))
}

#[utoipa::path(
    put,
    path = "/api/posts/{id}",
    tag = "posts",
    params(
        ("id" = i64, Path, description = "Post id")
    ),
    request_body = UpdatePostDto,
    responses(
        (status = 200, description = "Post updated", body = PostDto),
        (status = 400, description = "Invalid post id or validation error", body = ErrorBody),
        (status = 404, description = "Post not found", body = ErrorBody),
        (status = 500, description = "Internal error", body = ErrorBody)
    )
)]
pub(crate) async fn update_post(
    State(state): State<AppState>,
    PostIdPath(id): PostIdPath,
    payload: Result<Json<Value>, JsonRejection>,
) -> AppResult<Json<PostDto>> {
    let Json(body) = payload?;
    let mut fields = JsonFields::new(&body)?;
    let dto = UpdatePostDto::read(&mut fields);
    fields.finish(dto.validate())?;

    let post = state.blog_service.update_post(id, dto.into()).await?;
    Ok(Json(PostDto::from(post)))
}

#[utoipa::path(
    delete,
    path = "/api/posts/{id}",
    tag = "posts",
    params(
        ("id" = i64, Path, description = "Post id")
    ),
    responses(
        (status = 204, description = "Post deleted"),
        (status = 400, description = "Invalid post id", body = ErrorBody),
        (status = 404, description = "Post not found", body = ErrorBody),
        (status = 500, description = "Internal error", body = ErrorBody)
    )
)]
pub(crate) async fn delete_post(
    State(state): State<AppState>,
    PostIdPath(id): PostIdPath,
) -> AppResult<StatusCode> {
    state.blog_service.delete_post(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
