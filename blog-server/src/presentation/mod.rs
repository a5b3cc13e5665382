use std::sync::Arc;

use crate::application::blog_service::BlogService;
use crate::data::post_repository::PostRepository;

pub(crate) mod app_error;
pub(crate) mod extractors;
pub(crate) mod handlers;
pub(crate) mod http_handlers;
pub(crate) mod json_fields;
pub(crate) mod middleware;
pub(crate) mod openapi;
pub(crate) mod routes;

pub(crate) type SharedPostRepository = Arc<dyn PostRepository>;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) blog_service: Arc<BlogService<SharedPostRepository>>,
}

impl AppState {
    pub(crate) fn new(repo: SharedPostRepository) -> Self {
        Self {
            blog_service: Arc::new(BlogService::new(repo)),
        }
    }
}
