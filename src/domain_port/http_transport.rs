use crate::domain_model::{HttpResponse, RequestContext};

#[derive(Debug, Clone, Eq, PartialEq, thiserror::Error)]
pub enum TransportError {
    #[error("request timed out: {0}")]
    Timeout(String),
    #[error("connection failed: {0}")]
    Connection(String),
    #[error("invalid request: {0}")]
    InvalidRequest(String),
    #[error("transport error: {0}")]
    Other(String),
}

/// Sends one request and hands back whatever the server answered.
/// Non-2xx statuses are responses, not errors; only failures to get a
/// response at all surface as [`TransportError`].
#[async_trait::async_trait]
pub trait HttpTransport: Send + Sync {
    async fn execute(&self, context: &RequestContext) -> Result<HttpResponse, TransportError>;
}
