use crate::api::v1::envelope::{decode_data, ensure_success};
use crate::application_impl::{QueryClient, RefreshCoordinator, fetch_data};
use crate::application_port::{ApiClient, ApiError, LoginInput, SessionService};
use crate::domain_model::{ApiRequest, CurrentUser, QueryKey};
use std::sync::Arc;

#[derive(Debug, Clone)]
pub struct SessionPaths {
    pub login_path: String,
    pub logout_path: String,
    pub me_path: String,
}

pub struct RestSessionService {
    client: Arc<dyn ApiClient>,
    queries: Arc<QueryClient>,
    coordinator: Arc<RefreshCoordinator>,
    paths: SessionPaths,
}

impl RestSessionService {
    pub fn new(
        client: Arc<dyn ApiClient>,
        queries: Arc<QueryClient>,
        coordinator: Arc<RefreshCoordinator>,
        paths: SessionPaths,
    ) -> Self {
        Self {
            client,
            queries,
            coordinator,
            paths,
        }
    }
}

#[async_trait::async_trait]
impl SessionService for RestSessionService {
    async fn login(&self, input: LoginInput) -> Result<CurrentUser, ApiError> {
        let request = ApiRequest::post(self.paths.login_path.clone()).with_json(&input)?;
        let response = self.client.send(request).await?;
        let user: CurrentUser = decode_data(&response)?;
        // reads cached for a previous user must not leak into this session
        self.queries.clear();
        tracing::info!(user_id = %user.id, "logged in");
        Ok(user)
    }

    async fn logout(&self) -> Result<(), ApiError> {
        let result = match self
            .client
            .send(ApiRequest::post(self.paths.logout_path.clone()))
            .await
        {
            Ok(response) => ensure_success(&response),
            Err(e) => Err(e),
        };
        self.coordinator.reset();
        self.queries.clear();
        tracing::info!(ok = result.is_ok(), "logged out");
        result
    }

    async fn current_user(&self) -> Result<CurrentUser, ApiError> {
        let request = ApiRequest::get(self.paths.me_path.clone());
        self.queries
            .read(QueryKey::new(["me"]), || fetch_data(self.client.clone(), request))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application_impl::{RefreshTicket, ResilientApiClient, SessionEndpoints};
    use crate::application_port::RefreshError;
    use crate::infra_http::{FAKE_EMAIL, FAKE_PASSWORD, FakeAuthRoutes, FakeBackendTransport};
    use crate::infra_local::{MemoryQueryCache, RecordingNavigator};

    struct Fixture {
        service: RestSessionService,
        coordinator: Arc<RefreshCoordinator>,
        cache: Arc<MemoryQueryCache>,
    }

    fn fixture(logout_path: &str) -> Fixture {
        let backend = Arc::new(FakeBackendTransport::seeded(FakeAuthRoutes::default()));
        let coordinator = Arc::new(RefreshCoordinator::new());
        let client = Arc::new(ResilientApiClient::new(
            backend,
            coordinator.clone(),
            Arc::new(RecordingNavigator::new()),
            SessionEndpoints {
                refresh_path: "/auth/refresh".to_string(),
                login_url: "/login".to_string(),
                skip_refresh_paths: vec!["/auth/login".to_string(), logout_path.to_string()],
            },
        ));
        let cache = Arc::new(MemoryQueryCache::new());
        let queries = Arc::new(QueryClient::new(cache.clone(), None));
        let service = RestSessionService::new(
            client,
            queries,
            coordinator.clone(),
            SessionPaths {
                login_path: "/auth/login".to_string(),
                logout_path: logout_path.to_string(),
                me_path: "/auth/me".to_string(),
            },
        );
        Fixture {
            service,
            coordinator,
            cache,
        }
    }

    fn login_input(password: &str) -> LoginInput {
        LoginInput {
            email: FAKE_EMAIL.to_string(),
            password: password.to_string(),
        }
    }

    #[tokio::test]
    async fn login_drops_reads_of_the_previous_session() {
        let f = fixture("/auth/logout");
        f.service.current_user().await.unwrap();
        assert_eq!(f.cache.len(), 1);

        let user = f.service.login(login_input(FAKE_PASSWORD)).await.unwrap();
        assert_eq!(user.email, FAKE_EMAIL);
        assert!(f.cache.is_empty());
    }

    #[tokio::test]
    async fn wrong_password_keeps_cache() {
        let f = fixture("/auth/logout");
        f.service.current_user().await.unwrap();

        let err = f.service.login(login_input("nope")).await.unwrap_err();
        assert_eq!(err.status(), Some(401));
        assert_eq!(f.cache.len(), 1);
    }

    #[tokio::test]
    async fn logout_rejects_pending_refresh_waiters() {
        let f = fixture("/auth/logout");
        let RefreshTicket::Lead(_lease) = f.coordinator.begin() else {
            panic!("expected to lead");
        };
        let RefreshTicket::Wait(waiter) = f.coordinator.begin() else {
            panic!("expected to wait");
        };

        f.service.logout().await.unwrap();
        assert_eq!(waiter.outcome().await, Err(RefreshError::Reset));
        assert!(!f.coordinator.is_refreshing());
    }

    #[tokio::test]
    async fn failed_logout_still_clears_local_state() {
        // the fake backend has no such route and answers 404
        let f = fixture("/auth/sign-out");
        f.service.current_user().await.unwrap();
        assert_eq!(f.cache.len(), 1);

        let err = f.service.logout().await.unwrap_err();
        assert_eq!(err.status(), Some(404));
        assert!(f.cache.is_empty());
    }
}
