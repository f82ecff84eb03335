use axum::{Json, response::Html};
use serde_json::{Value, json};

use edge_session_axum::EdgeSession;

pub(crate) async fn index(session: Option<EdgeSession>) -> Html<String> {
    match session {
        Some(session) => Html(format!(
            "<p>Signed in. Access token valid until {}.</p><p><a href=\"/whoami\">whoami</a></p>",
            session
                .expires_at_utc()
                .map(|t| t.to_rfc3339())
                .unwrap_or_else(|| session.expires_at().to_string())
        )),
        None => Html("<p>No session cookie on this request.</p>".to_string()),
    }
}

pub(crate) async fn whoami(session: EdgeSession) -> Json<Value> {
    Json(json!({
        "user": session.user(),
        "expires_at": session.expires_at(),
        "refreshed": session.was_refreshed(),
    }))
}
