use std::time::{Duration, Instant};

use uuid::Uuid;

/// Header carrying the request ID back to the client.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Per-request state attached by the logging middleware.
#[derive(Debug, Clone)]
pub struct RequestState {
    /// Unique request ID.
    pub request_id: String,
    /// When the request started.
    pub start_time: Instant,
}

impl RequestState {
    pub fn new() -> Self {
        Self::with_request_id(Uuid::new_v4().to_string())
    }

    /// Reuse a request ID supplied by a proxy.
    pub fn with_request_id(request_id: String) -> Self {
        Self {
            request_id,
            start_time: Instant::now(),
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.start_time.elapsed()
    }
}

impl Default for RequestState {
    fn default() -> Self {
        Self::new()
    }
}
