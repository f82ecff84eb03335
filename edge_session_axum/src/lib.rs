mod middleware;
mod session;

pub use middleware::refresh_session;
pub use session::{EdgeSession, SessionRejection};

// Re-export the gateway types needed to build the middleware state
pub use edge_session::{GatewayConfig, HttpTokenEndpoint, SessionGateway, TokenEndpoint, init};
