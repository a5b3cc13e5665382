use utoipa::OpenApi;

use crate::presentation::app_error::{ErrorBody, FieldErrorDto};
use crate::presentation::handlers::posts::{CreatePostDto, PostDto, UpdatePostDto};

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::presentation::handlers::posts::list_posts,
        crate::presentation::handlers::posts::get_post,
        crate::presentation::handlers::posts::create_post,
        crate::presentation::handlers::posts::update_post,
        crate::presentation::handlers::posts::delete_post
    ),
    components(
        schemas(
            CreatePostDto,
            UpdatePostDto,
            PostDto,
            ErrorBody,
            FieldErrorDto
        )
    ),
    tags(
        (name = "posts", description = "Post endpoints")
    )
)]
pub(crate) struct ApiDoc;
