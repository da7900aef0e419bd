use crate::application_port::ApiError;
use crate::domain_model::CurrentUser;
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct LoginInput {
    pub email: String,
    pub password: String,
}

#[async_trait::async_trait]
pub trait SessionService: Send + Sync {
    async fn login(&self, input: LoginInput) -> Result<CurrentUser, ApiError>;
    /// Ends the session and resets local session state (pending refresh
    /// waiters, cached reads).
    async fn logout(&self) -> Result<(), ApiError>;
    async fn current_user(&self) -> Result<CurrentUser, ApiError>;
}
