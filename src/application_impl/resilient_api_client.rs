use crate::application_impl::{RefreshCoordinator, RefreshTicket};
use crate::application_port::{ApiClient, ApiError, ErrorResponse, RefreshError};
use crate::domain_model::{ApiRequest, HttpResponse, RequestContext};
use crate::domain_port::{HttpTransport, Navigator};
use std::sync::Arc;

#[derive(Debug, Clone)]
pub struct SessionEndpoints {
    pub refresh_path: String,
    pub login_url: String,
    /// A 401 on these paths is a plain failure (e.g. wrong password on login).
    pub skip_refresh_paths: Vec<String>,
}

pub struct ResilientApiClient {
    transport: Arc<dyn HttpTransport>,
    coordinator: Arc<RefreshCoordinator>,
    navigator: Arc<dyn Navigator>,
    endpoints: SessionEndpoints,
}

impl ResilientApiClient {
    pub fn new(
        transport: Arc<dyn HttpTransport>,
        coordinator: Arc<RefreshCoordinator>,
        navigator: Arc<dyn Navigator>,
        endpoints: SessionEndpoints,
    ) -> Self {
        Self {
            transport,
            coordinator,
            navigator,
            endpoints,
        }
    }

    pub fn coordinator(&self) -> &Arc<RefreshCoordinator> {
        &self.coordinator
    }

    fn may_refresh(&self, context: &RequestContext) -> bool {
        !context.retried
            && context.request.path != self.endpoints.refresh_path
            && !self
                .endpoints
                .skip_refresh_paths
                .iter()
                .any(|p| *p == context.request.path)
    }

    async fn dispatch(&self, context: &RequestContext) -> Result<HttpResponse, ApiError> {
        tracing::debug!(
            request_id = %context.request_id,
            method = %context.request.method,
            path = %context.request.path,
            retried = context.retried,
            "sending request"
        );
        let response = self.transport.execute(context).await?;
        tracing::debug!(request_id = %context.request_id, status = response.status, "response");
        Ok(response)
    }

    async fn renew_session(&self) -> Result<(), RefreshError> {
        let context = RequestContext::new(ApiRequest::post(self.endpoints.refresh_path.clone()));
        match self.transport.execute(&context).await {
            Ok(response) if response.is_success() => Ok(()),
            Ok(response) => {
                let error = ErrorResponse::from_response(response);
                Err(RefreshError::Rejected {
                    status: error.status,
                    message: error.message,
                })
            }
            Err(e) => Err(RefreshError::Transport(e)),
        }
    }

    /// Wait for the in-flight refresh, or run it. Waiters are settled before
    /// the leader's own request is re-issued.
    async fn refresh(&self) -> Result<(), RefreshError> {
        match self.coordinator.begin() {
            RefreshTicket::Wait(wait) => wait.outcome().await,
            RefreshTicket::Lead(lease) => {
                tracing::info!("session expired, refreshing");
                let outcome = self.renew_session().await;
                lease.settle(outcome.clone());
                match &outcome {
                    Ok(()) => tracing::info!("session refreshed"),
                    Err(e) => {
                        tracing::warn!(error = %e, "session refresh failed");
                        self.navigator.redirect_to_login(&self.endpoints.login_url);
                    }
                }
                outcome
            }
        }
    }
}

#[async_trait::async_trait]
impl ApiClient for ResilientApiClient {
    async fn send(&self, request: ApiRequest) -> Result<HttpResponse, ApiError> {
        let mut context = RequestContext::new(request);
        loop {
            let response = self.dispatch(&context).await?;
            if response.is_success() {
                return Ok(response);
            }
            if response.is_unauthorized() && self.may_refresh(&context) {
                context.mark_retried();
                self.refresh().await?;
                continue;
            }
            return Err(ApiError::Status(ErrorResponse::from_response(response)));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain_port::TransportError;
    use crate::infra_local::RecordingNavigator;
    use serde_json::json;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use tokio::sync::Notify;

    const REFRESH: &str = "/auth/refresh";
    const LOGIN_URL: &str = "https://armeta.test/login";

    /// Backend stub: `/data` needs a live session, `/auth/refresh` renews it
    /// (or fails with `refresh_status`), `/boom` is a server error.
    struct StubBackend {
        session_valid: AtomicBool,
        refresh_status: u16,
        refresh_calls: AtomicUsize,
        refresh_gate: Option<Notify>,
        log: Mutex<Vec<(String, bool)>>,
    }

    impl StubBackend {
        fn new(session_valid: bool, refresh_status: u16, gated: bool) -> Self {
            Self {
                session_valid: AtomicBool::new(session_valid),
                refresh_status,
                refresh_calls: AtomicUsize::new(0),
                refresh_gate: gated.then(Notify::new),
                log: Mutex::new(Vec::new()),
            }
        }

        fn calls_to(&self, path: &str) -> Vec<bool> {
            self.log
                .lock()
                .unwrap()
                .iter()
                .filter(|(p, _)| p == path)
                .map(|(_, retried)| *retried)
                .collect()
        }
    }

    #[async_trait::async_trait]
    impl HttpTransport for StubBackend {
        async fn execute(&self, context: &RequestContext) -> Result<HttpResponse, TransportError> {
            let path = context.request.path.clone();
            self.log.lock().unwrap().push((path.clone(), context.retried));
            match path.as_str() {
                REFRESH => {
                    self.refresh_calls.fetch_add(1, Ordering::SeqCst);
                    if let Some(gate) = &self.refresh_gate {
                        gate.notified().await;
                    }
                    if self.refresh_status == 200 {
                        self.session_valid.store(true, Ordering::SeqCst);
                        Ok(HttpResponse::json_body(200, &json!({ "success": true })))
                    } else {
                        Ok(HttpResponse::json_body(
                            self.refresh_status,
                            &json!({ "success": false, "message": "refresh token expired" }),
                        ))
                    }
                }
                "/data" if self.session_valid.load(Ordering::SeqCst) => Ok(
                    HttpResponse::json_body(200, &json!({ "success": true, "data": 1 })),
                ),
                "/data" | "/always-401" | "/auth/login" => Ok(HttpResponse::json_body(
                    401,
                    &json!({ "success": false, "message": "unauthorized" }),
                )),
                "/boom" => Ok(HttpResponse::json_body(
                    500,
                    &json!({ "success": false, "message": "database down" }),
                )),
                "/offline" => Err(TransportError::Connection("refused".to_string())),
                _ => Ok(HttpResponse::new(404, Vec::new())),
            }
        }
    }

    fn client(backend: Arc<StubBackend>, navigator: Arc<RecordingNavigator>) -> ResilientApiClient {
        ResilientApiClient::new(
            backend,
            Arc::new(RefreshCoordinator::new()),
            navigator,
            SessionEndpoints {
                refresh_path: REFRESH.to_string(),
                login_url: LOGIN_URL.to_string(),
                skip_refresh_paths: vec!["/auth/login".to_string()],
            },
        )
    }

    async fn wait_for_waiters(client: &ResilientApiClient, count: usize) {
        while client.coordinator().waiter_count() < count {
            tokio::task::yield_now().await;
        }
    }

    #[tokio::test]
    async fn expired_session_is_refreshed_and_request_retried() {
        let backend = Arc::new(StubBackend::new(false, 200, false));
        let navigator = Arc::new(RecordingNavigator::new());
        let client = client(backend.clone(), navigator.clone());

        let response = client.send(ApiRequest::get("/data")).await.unwrap();
        assert_eq!(response.status, 200);
        assert_eq!(backend.refresh_calls.load(Ordering::SeqCst), 1);
        assert_eq!(backend.calls_to("/data"), vec![false, true]);
        assert!(navigator.redirects().is_empty());
        assert!(!client.coordinator().is_refreshing());
    }

    #[tokio::test]
    async fn concurrent_unauthorized_requests_share_one_refresh() {
        let backend = Arc::new(StubBackend::new(false, 200, true));
        let navigator = Arc::new(RecordingNavigator::new());
        let client = Arc::new(client(backend.clone(), navigator.clone()));

        let first = tokio::spawn({
            let client = client.clone();
            async move { client.send(ApiRequest::get("/data")).await }
        });
        let second = tokio::spawn({
            let client = client.clone();
            async move { client.send(ApiRequest::get("/data")).await }
        });

        wait_for_waiters(&client, 1).await;
        backend.refresh_gate.as_ref().unwrap().notify_one();

        assert_eq!(first.await.unwrap().unwrap().status, 200);
        assert_eq!(second.await.unwrap().unwrap().status, 200);
        assert_eq!(backend.refresh_calls.load(Ordering::SeqCst), 1);
        assert_eq!(backend.calls_to("/data"), vec![false, false, true, true]);
    }

    #[tokio::test]
    async fn refresh_failure_rejects_all_and_redirects_once() {
        let backend = Arc::new(StubBackend::new(false, 403, true));
        let navigator = Arc::new(RecordingNavigator::new());
        let client = Arc::new(client(backend.clone(), navigator.clone()));

        let first = tokio::spawn({
            let client = client.clone();
            async move { client.send(ApiRequest::get("/data")).await }
        });
        let second = tokio::spawn({
            let client = client.clone();
            async move { client.send(ApiRequest::get("/data")).await }
        });

        wait_for_waiters(&client, 1).await;
        backend.refresh_gate.as_ref().unwrap().notify_one();

        let expected = ApiError::Refresh(RefreshError::Rejected {
            status: 403,
            message: "refresh token expired".to_string(),
        });
        assert_eq!(first.await.unwrap().unwrap_err(), expected);
        assert_eq!(second.await.unwrap().unwrap_err(), expected);
        assert_eq!(backend.refresh_calls.load(Ordering::SeqCst), 1);
        assert_eq!(navigator.redirects(), vec![LOGIN_URL.to_string()]);
        assert!(!client.coordinator().is_refreshing());
        assert_eq!(client.coordinator().waiter_count(), 0);
    }

    #[tokio::test]
    async fn retried_request_is_not_retried_again() {
        let backend = Arc::new(StubBackend::new(false, 200, false));
        let navigator = Arc::new(RecordingNavigator::new());
        let client = client(backend.clone(), navigator.clone());

        let err = client
            .send(ApiRequest::get("/always-401"))
            .await
            .unwrap_err();
        match err {
            ApiError::Status(response) => {
                assert_eq!(response.status, 401);
                assert_eq!(response.message, "unauthorized");
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(backend.refresh_calls.load(Ordering::SeqCst), 1);
        assert_eq!(backend.calls_to("/always-401"), vec![false, true]);
        assert!(navigator.redirects().is_empty());
    }

    #[tokio::test]
    async fn other_statuses_propagate_without_refresh() {
        let backend = Arc::new(StubBackend::new(true, 200, false));
        let navigator = Arc::new(RecordingNavigator::new());
        let client = client(backend.clone(), navigator);

        let err = client.send(ApiRequest::get("/boom")).await.unwrap_err();
        assert_eq!(err.status(), Some(500));
        assert_eq!(backend.calls_to("/boom"), vec![false]);

        let err = client.send(ApiRequest::get("/offline")).await.unwrap_err();
        assert!(matches!(err, ApiError::Transport(TransportError::Connection(_))));
        assert_eq!(backend.refresh_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn login_failure_does_not_trigger_refresh() {
        let backend = Arc::new(StubBackend::new(false, 200, false));
        let navigator = Arc::new(RecordingNavigator::new());
        let client = client(backend.clone(), navigator);

        let err = client
            .send(ApiRequest::post("/auth/login"))
            .await
            .unwrap_err();
        assert_eq!(err.status(), Some(401));
        assert_eq!(backend.calls_to("/auth/login"), vec![false]);
        assert_eq!(backend.refresh_calls.load(Ordering::SeqCst), 0);
    }
}
