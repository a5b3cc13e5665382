use anyhow::{Context, Result};
use axum::Router;
use axum::http::{HeaderValue, Method, header};
use tower_http::cors::{AllowOrigin, CorsLayer};

use crate::infrastructure::settings::Settings;

const POST_METHODS: [Method; 5] = [
    Method::GET,
    Method::POST,
    Method::PUT,
    Method::DELETE,
    Method::OPTIONS,
];

/// `*` anywhere in the list opens the API to every origin.
fn allowed_origins(origins: &[String]) -> Result<AllowOrigin> {
    if origins.iter().any(|origin| origin == "*") {
        return Ok(AllowOrigin::any());
    }

    let parsed = origins
        .iter()
        .map(|origin| {
            origin
                .parse::<HeaderValue>()
                .with_context(|| format!("invalid CORS origin '{origin}'"))
        })
        .collect::<Result<Vec<_>>>()?;
    Ok(AllowOrigin::list(parsed))
}

pub(crate) fn build_cors_layer(settings: &Settings) -> Result<CorsLayer> {
    Ok(CorsLayer::new()
        .allow_origin(allowed_origins(&settings.cors_origins)?)
        .allow_methods(POST_METHODS)
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT])
        .expose_headers([header::LOCATION]))
}

pub(crate) fn apply_cors(router: Router, settings: &Settings) -> Result<Router> {
    let cors = build_cors_layer(settings)?;
    Ok(router.layer(cors))
}

#[cfg(test)]
mod tests {
    use axum::{
        Router,
        body::Body,
        http::{Method, Request, StatusCode, header},
        routing::get,
    };
    use tower::ServiceExt;

    use super::{allowed_origins, apply_cors};
    use crate::infrastructure::settings::Settings;

    fn settings(origins: &str) -> Settings {
        Settings::from_lookup(|key| match key {
            "STORAGE_BACKEND" => Some("memory".to_string()),
            "CORS_ORIGINS" => Some(origins.to_string()),
            _ => None,
        })
        .expect("settings must parse")
    }

    async fn preflight(origins: &str, origin: &str) -> Option<String> {
        let router = apply_cors(Router::new().route("/", get(|| async {})), &settings(origins))
            .expect("cors must build");
        let req = Request::builder()
            .method(Method::OPTIONS)
            .uri("/")
            .header(header::ORIGIN, origin)
            .header(header::ACCESS_CONTROL_REQUEST_METHOD, "PUT")
            .body(Body::empty())
            .expect("request must build");

        let resp = router.oneshot(req).await.expect("router must respond");
        assert_eq!(resp.status(), StatusCode::OK);
        resp.headers()
            .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string)
    }

    #[tokio::test]
    async fn listed_origin_is_echoed() {
        let allowed = preflight("http://app.test", "http://app.test").await;
        assert_eq!(allowed.as_deref(), Some("http://app.test"));
    }

    #[tokio::test]
    async fn unlisted_origin_gets_no_allow_header() {
        assert!(preflight("http://app.test", "http://evil.test").await.is_none());
    }

    #[tokio::test]
    async fn wildcard_allows_any_origin() {
        let allowed = preflight("*", "http://anything.test").await;
        assert_eq!(allowed.as_deref(), Some("*"));
    }

    #[test]
    fn origin_with_control_characters_is_rejected() {
        let err = allowed_origins(&["http://bad\nhost".to_string()]).expect_err("must reject");
        assert!(err.to_string().contains("invalid CORS origin"));
    }
}
