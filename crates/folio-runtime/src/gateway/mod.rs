mod handlers;
mod response;
mod server;
mod tracing;

pub use handlers::ContentKind;
pub use response::ApiError;
pub use server::{GatewayConfig, GatewayServer, GatewayState, HealthResponse};
pub use tracing::{RequestState, REQUEST_ID_HEADER};
