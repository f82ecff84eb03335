mod handlers;
mod server;

use std::sync::Arc;

use axum::{Router, middleware::from_fn_with_state, routing::get};
use dotenvy::dotenv;

use edge_session_axum::refresh_session;

use handlers::{index, whoami};
use server::{init_tracing, serve_http};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    init_tracing("demo_edge_session");

    dotenv().ok();
    let gateway = Arc::new(edge_session_axum::init()?);

    let app = Router::new()
        .route("/", get(index))
        .route("/whoami", get(whoami))
        .layer(from_fn_with_state(gateway, refresh_session));

    serve_http(3001, app).await?;
    Ok(())
}
