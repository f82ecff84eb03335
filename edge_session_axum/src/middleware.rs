use std::sync::Arc;

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use http::header::SET_COOKIE;

use super::session::EdgeSession;
use edge_session::{GatewayOutcome, SessionGateway, request_is_secure, rewrite_request_cookies};

/// Refreshes the session carried by the request cookies before the handler runs.
///
/// Use with `axum::middleware::from_fn_with_state`. When a refresh succeeds the
/// handler already sees the new cookies and the response gets the matching
/// `Set-Cookie` headers. Any failure leaves both request and response as they
/// were.
pub async fn refresh_session(
    State(gateway): State<Arc<SessionGateway>>,
    mut req: Request,
    next: Next,
) -> Response {
    let secure = request_is_secure(req.headers(), req.uri());
    let outcome = gateway.process_now(req.headers(), secure).await;

    if let GatewayOutcome::Refreshed(refreshed) = &outcome {
        if let Err(e) = rewrite_request_cookies(
            req.headers_mut(),
            &gateway.config().cookie_name,
            &refreshed.chunks,
        ) {
            tracing::error!("Failed to rewrite request cookies: {}", e);
        }
    }

    if let Some(session) = outcome.session() {
        let refreshed = matches!(outcome, GatewayOutcome::Refreshed(_));
        req.extensions_mut()
            .insert(EdgeSession::new(session.clone(), refreshed));
    }

    let mut response = next.run(req).await;

    if let Some(set_cookie) = outcome.set_cookie_headers() {
        for value in set_cookie.get_all(SET_COOKIE) {
            response.headers_mut().append(SET_COOKIE, value.clone());
        }
    }
    response
}
