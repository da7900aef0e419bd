use crate::domain_model::{ApiRequest, HttpResponse};
use crate::domain_port::TransportError;

/// A non-2xx answer, passed to the caller unmodified.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct ErrorResponse {
    pub status: u16,
    pub message: String,
    pub body: Vec<u8>,
}

impl ErrorResponse {
    pub fn from_response(response: HttpResponse) -> Self {
        let message = serde_json::from_slice::<serde_json::Value>(&response.body)
            .ok()
            .and_then(|v| v.get("message").and_then(|m| m.as_str()).map(str::to_owned))
            .unwrap_or_else(|| format!("HTTP {}", response.status));
        Self {
            status: response.status,
            message,
            body: response.body,
        }
    }
}

#[derive(Debug, Clone, Eq, PartialEq, thiserror::Error)]
pub enum RefreshError {
    #[error("session renewal rejected with status {status}: {message}")]
    Rejected { status: u16, message: String },
    #[error("session renewal failed: {0}")]
    Transport(TransportError),
    #[error("session renewal abandoned before it settled")]
    Abandoned,
    #[error("session was reset")]
    Reset,
}

#[derive(Debug, Clone, Eq, PartialEq, thiserror::Error)]
pub enum ApiError {
    #[error("request failed with status {}: {}", .0.status, .0.message)]
    Status(ErrorResponse),
    #[error("request rejected: {message}")]
    Rejected { message: String },
    #[error("session refresh failed: {0}")]
    Refresh(#[from] RefreshError),
    #[error(transparent)]
    Transport(#[from] TransportError),
    #[error("invalid response: {0}")]
    Decode(String),
}

impl ApiError {
    /// Status of the caller's own request. A failed session renewal is not
    /// reported here; match on [`ApiError::Refresh`] for that.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Status(response) => Some(response.status),
            _ => None,
        }
    }

    /// A plain 401 on the request itself, as left over after the one retry.
    pub fn is_unauthorized(&self) -> bool {
        self.status() == Some(401)
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(error: serde_json::Error) -> Self {
        ApiError::Decode(error.to_string())
    }
}

#[async_trait::async_trait]
pub trait ApiClient: Send + Sync {
    /// Issue `request` against the configured base URL with session cookies
    /// attached. Resolves to the 2xx response; anything else is an error.
    async fn send(&self, request: ApiRequest) -> Result<HttpResponse, ApiError>;
}
