//! HTTP face of the access gate: the route-guard middleware, the
//! key-generation (verification-choice) page and the cookie-granting
//! endpoints. The decision logic itself lives in `lib_platform::access`;
//! this module only wires it to requests, responses and cookies.

use axum::{
    extract::{Path, Query, Request, State},
    http::header,
    middleware::Next,
    response::{Html, IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tracing::info;

use lib_platform::access::{AccessState, ads_cookie, evaluate_access, verified_cookie};
use lib_platform::monetization::DEFAULT_ACCESS_DURATION;

use crate::platform_logic::error::AppError;
use crate::platform_logic::state::AppState;

/// Route guard wrapping every protected page. Evaluates the cookie header
/// once per request; no network call, no server-side verification.
/// Denied visitors are redirected to the key-generation page and the
/// wrapped handler never runs. Admitted requests carry their
/// [`AccessState`] as an extension so HTML handlers can render the ads
/// panel when appropriate.
pub async fn access_gate(mut request: Request, next: Next) -> Response {
    let cookie_header = request
        .headers()
        .get(header::COOKIE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");

    match evaluate_access(cookie_header) {
        AccessState::Denied => Redirect::to("/key-generation").into_response(),
        state => {
            request.extensions_mut().insert(state);
            next.run(request).await
        }
    }
}

/// Verification-choice page shown to denied visitors: two verification
/// servers or free access with ads. Settings that are missing or broken
/// fall back to defaults silently; this page never hard-fails.
pub async fn key_generation_page(State(state): State<AppState>) -> Html<String> {
    let config = state.store().monetization_config().await;
    let label = config.duration_label();

    Html(format!(
        concat!(
            "<!DOCTYPE html><html><head><title>Access Verification</title></head><body>",
            "<h1>Access Verification</h1>",
            "<p>Choose your preferred access method</p>",
            "<p>Access Duration: {label}</p>",
            r#"<div class="options">"#,
            r#"<a href="/key-generation/server/1">Access via Server 1</a>"#,
            r#"<a href="/key-generation/server/2">Access via Server 2</a>"#,
            r#"<a href="/key-generation/ads">Continue with Ads</a>"#,
            "</div>",
            "<p>Access expires after {label}</p>",
            "</body></html>"
        ),
        label = label,
    ))
}

/// One of the two "server" choices. Shows the configured original URL
/// (for the operator to shorten through LinkShortify out of band) and,
/// after a fixed 3-second delay, navigates to the local mark-verified
/// endpoint. A placeholder for the external monetized redirect chain;
/// this verifies nothing by itself.
pub async fn server_choice(
    State(state): State<AppState>,
    Path(server): Path<u8>,
) -> Result<Html<String>, AppError> {
    let config = state.store().monetization_config().await;
    let original_url = match server {
        1 => &config.server1_url,
        2 => &config.server2_url,
        _ => return Err(AppError::BadRequest(format!("unknown server {}", server))),
    };

    info!(
        "original link for LinkShortify (server {}): {}",
        server, original_url
    );

    Ok(Html(format!(
        concat!(
            "<!DOCTYPE html><html><head>",
            r#"<meta http-equiv="refresh" content="3;url=/set-verified?duration={duration}">"#,
            "<title>Server {server}</title></head><body>",
            "<h1>Redirecting…</h1>",
            "<p>Original link for LinkShortify: {url}</p>",
            "</body></html>"
        ),
        duration = config.access_duration,
        server = server,
        url = original_url,
    )))
}

/// "Continue with ads": grants the `ads` flag for the configured duration
/// and sends the visitor back to the site root after a short delay.
pub async fn ads_choice(State(state): State<AppState>) -> impl IntoResponse {
    let config = state.store().monetization_config().await;
    let cookie = ads_cookie(config.access_duration);

    (
        [(header::SET_COOKIE, cookie)],
        Html(
            concat!(
                "<!DOCTYPE html><html><head>",
                r#"<meta http-equiv="refresh" content="2;url=/">"#,
                "<title>Ads Mode</title></head><body>",
                "<h1>Ads Mode Activated</h1>",
                "<p>You can now access the website with ads.</p>",
                "</body></html>"
            )
            .to_string(),
        ),
    )
}

#[derive(Debug, Deserialize)]
pub struct SetVerifiedParams {
    // Kept as a string so an unparsable value falls back to the default
    // instead of rejecting the request.
    duration: Option<String>,
}

/// Landing endpoint for the external verification chain: grants the
/// `verified` flag for the requested duration and redirects to the root.
/// A missing or unparsable duration falls back to the default silently.
pub async fn set_verified(Query(params): Query<SetVerifiedParams>) -> impl IntoResponse {
    let duration = params
        .duration
        .as_deref()
        .and_then(|d| d.parse::<u64>().ok())
        .unwrap_or(DEFAULT_ACCESS_DURATION);

    (
        [(header::SET_COOKIE, verified_cookie(duration))],
        Redirect::to("/"),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        Extension, Router,
        body::{Body, to_bytes},
        http::{Request as HttpRequest, StatusCode},
        middleware,
        routing::get,
    };
    use lib_platform::access::inject_ad_markup;
    use tower::ServiceExt;

    const TEST_AD_URL: &str = "//cdn.monetag.io/js/monetag.js";

    // A protected page in the shape the real home handler has: renders
    // content, appends the ad markup in ads mode.
    async fn protected_page(Extension(access): Extension<AccessState>) -> Html<String> {
        let page = "<html><body><h1>Batches</h1></body></html>".to_string();
        match access {
            AccessState::Ads => Html(inject_ad_markup(&page, TEST_AD_URL)),
            _ => Html(page),
        }
    }

    // Ads grant with the default duration, store-free for tests.
    async fn grant_ads() -> impl IntoResponse {
        (
            [(header::SET_COOKIE, ads_cookie(DEFAULT_ACCESS_DURATION))],
            Redirect::to("/"),
        )
    }

    fn test_router() -> Router {
        let protected = Router::new()
            .route("/", get(protected_page))
            .layer(middleware::from_fn(access_gate));

        Router::new()
            .merge(protected)
            .route("/key-generation/ads", get(grant_ads))
            .route("/set-verified", get(set_verified))
    }

    async fn request(router: Router, uri: &str, cookie: Option<&str>) -> Response {
        let mut builder = HttpRequest::builder().uri(uri);
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        router
            .oneshot(builder.body(Body::empty()).unwrap())
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn no_cookies_redirects_to_key_generation_once() {
        let response = request(test_router(), "/", None).await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(
            response.headers().get(header::LOCATION).unwrap(),
            "/key-generation"
        );
    }

    #[tokio::test]
    async fn verified_cookie_admits_without_ads() {
        let response = request(test_router(), "/", Some("verified=true")).await;
        assert_eq!(response.status(), StatusCode::OK);

        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = String::from_utf8(body.to_vec()).unwrap();
        assert!(body.contains("Batches"));
        assert!(!body.contains("ads-container"));
    }

    #[tokio::test]
    async fn ads_cookie_admits_with_ad_panel() {
        let response = request(test_router(), "/", Some("theme=dark; ads=true")).await;
        assert_eq!(response.status(), StatusCode::OK);

        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = String::from_utf8(body.to_vec()).unwrap();
        assert!(body.contains("ads-container"));
        assert_eq!(body.matches(TEST_AD_URL).count(), 1);
    }

    #[tokio::test]
    async fn malformed_cookies_deny() {
        let response = request(test_router(), "/", Some(";;noequals;=true;")).await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
    }

    #[tokio::test]
    async fn set_verified_honours_the_duration_parameter() {
        let response = request(test_router(), "/set-verified?duration=7200", None).await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(response.headers().get(header::LOCATION).unwrap(), "/");
        assert_eq!(
            response.headers().get(header::SET_COOKIE).unwrap(),
            "verified=true; max-age=7200; path=/"
        );
    }

    #[tokio::test]
    async fn set_verified_falls_back_on_junk_duration() {
        for uri in ["/set-verified", "/set-verified?duration=soon"] {
            let response = request(test_router(), uri, None).await;
            assert_eq!(
                response.headers().get(header::SET_COOKIE).unwrap(),
                "verified=true; max-age=3600; path=/"
            );
        }
    }

    // The full denied → ads → admitted walk a new visitor takes.
    #[tokio::test]
    async fn end_to_end_ads_flow() {
        // 1. No cookies: bounced to the key-generation page.
        let response = request(test_router(), "/", None).await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(
            response.headers().get(header::LOCATION).unwrap(),
            "/key-generation"
        );

        // 2. Choose "Continue with ads": the ads flag is granted with the
        //    configured max-age.
        let response = request(test_router(), "/key-generation/ads", None).await;
        let set_cookie = response
            .headers()
            .get(header::SET_COOKIE)
            .unwrap()
            .to_str()
            .unwrap()
            .to_string();
        assert_eq!(set_cookie, "ads=true; max-age=3600; path=/");

        // 3. Back on the protected route the content renders with ads.
        let cookie_pair = set_cookie.split(';').next().unwrap().to_string();
        let response = request(test_router(), "/", Some(&cookie_pair)).await;
        assert_eq!(response.status(), StatusCode::OK);
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert!(String::from_utf8(body.to_vec()).unwrap().contains("ads-container"));
    }
}
