use axum::{
    extract::{ConnectInfo, Request, State},
    http::{HeaderName, HeaderValue},
    middleware::Next,
    response::Response,
};
use std::net::SocketAddr;

use crate::models::errors::AppError;
use crate::AppState;

pub const REMAINING_HEADER: HeaderName = HeaderName::from_static("x-ratelimit-remaining");

fn forwarded_for(request: &Request) -> Option<&str> {
    request
        .headers()
        .get("x-forwarded-for")
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(',').next())
        .map(str::trim)
        .filter(|hop| !hop.is_empty())
}

/// Client address: the socket peer, or the first `X-Forwarded-For` hop when
/// the server sits behind a trusted proxy
pub fn client_identifier(request: &Request, trust_forwarded_for: bool) -> String {
    if trust_forwarded_for {
        if let Some(forwarded) = forwarded_for(request) {
            return forwarded.to_string();
        }
    }

    request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip().to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

/// Applies the auth rate limit before the wrapped route runs
pub async fn limit_auth_requests(
    State(app_state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let identifier = client_identifier(&request, app_state.config.trust_forwarded_for);
    app_state.rate_limiter.check_rate_limit(&identifier).await?;
    let remaining = app_state.rate_limiter.get_remaining_requests(&identifier).await;

    let mut response = next.run(request).await;
    response
        .headers_mut()
        .insert(REMAINING_HEADER, HeaderValue::from(remaining));
    Ok(response)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;

    fn with_peer(request: &mut Request, peer: &str) {
        request
            .extensions_mut()
            .insert(ConnectInfo(peer.parse::<SocketAddr>().unwrap()));
    }

    #[test]
    fn test_forwarded_header_ignored_unless_trusted() {
        let mut request = axum::http::Request::builder()
            .header("x-forwarded-for", "203.0.113.9, 10.0.0.1")
            .body(Body::empty())
            .unwrap();
        with_peer(&mut request, "192.0.2.1:5000");

        assert_eq!(client_identifier(&request, false), "192.0.2.1");
        assert_eq!(client_identifier(&request, true), "203.0.113.9");
    }

    #[test]
    fn test_connect_info_fallback() {
        let mut request = axum::http::Request::builder().body(Body::empty()).unwrap();
        with_peer(&mut request, "192.0.2.1:5000");
        assert_eq!(client_identifier(&request, true), "192.0.2.1");

        let bare = axum::http::Request::builder().body(Body::empty()).unwrap();
        assert_eq!(client_identifier(&bare, false), "unknown");
    }
}
