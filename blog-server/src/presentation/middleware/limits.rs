use std::time::Duration;

use axum::error_handling::HandleErrorLayer;
use axum::extract::DefaultBodyLimit;
use axum::{BoxError, Router};
use tower::ServiceBuilder;
use tower::limit::GlobalConcurrencyLimitLayer;
use tower::timeout::TimeoutLayer;
use tower::timeout::error::Elapsed;
use tower_http::limit::RequestBodyLimitLayer;

use crate::domain::error::DomainError;
use crate::infrastructure::settings::Settings;
use crate::presentation::app_error::AppError;

pub(crate) fn apply_limits(router: Router, settings: &Settings) -> Router {
    let router = router
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(
            settings.http_request_body_limit_bytes,
        ));

    apply_timeout(
        router,
        Duration::from_secs(settings.http_request_timeout_secs),
    )
    .layer(GlobalConcurrencyLimitLayer::new(
        settings.http_concurrency_limit,
    ))
}

/// Slow requests get the regular JSON error body rather than a bare status.
pub(crate) fn apply_timeout(router: Router, timeout: Duration) -> Router {
    router.layer(
        ServiceBuilder::new()
            .layer(HandleErrorLayer::new(handle_timeout))
            .layer(TimeoutLayer::new(timeout)),
    )
}

async fn handle_timeout(err: BoxError) -> AppError {
    if err.is::<Elapsed>() {
        AppError::Timeout
    } else {
        AppError::Domain(DomainError::Unexpected(err.to_string()))
    }
}
