use axum::{
    extract::{FromRequestParts, Path},
    http::request::Parts,
};

use crate::domain::error::DomainError;
use crate::domain::post::PostId;
use crate::presentation::app_error::AppError;

/// `/{id}` segment parsed as a positive post id; anything else is a 400 before the handler runs.
#[derive(Debug, Clone, Copy)]
pub(crate) struct PostIdPath(pub(crate) PostId);

impl<S> FromRequestParts<S> for PostIdPath
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(raw) = Path::<String>::from_request_parts(parts, state)
            .await
            .map_err(|rejection| DomainError::InvalidId(rejection.body_text()))?;

        Ok(Self(raw.parse::<PostId>()?))
    }
}
