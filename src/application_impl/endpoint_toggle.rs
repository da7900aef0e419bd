use crate::api::v1::envelope::ensure_success;
use crate::api::v1::routes;
use crate::application_port::{ApiClient, ApiError, ToggleMutations};
use crate::domain_model::{EntityRef, InteractionKind, MutationRequest, ToggleDirection};
use std::sync::Arc;

/// Like/unlike or bookmark/unbookmark over the REST toggle endpoints.
/// Counters in the response body are ignored.
pub struct EndpointToggle {
    client: Arc<dyn ApiClient>,
    kind: InteractionKind,
}

impl EndpointToggle {
    pub fn new(client: Arc<dyn ApiClient>, kind: InteractionKind) -> Self {
        Self { client, kind }
    }

    async fn call(&self, target: &EntityRef, direction: ToggleDirection) -> Result<(), ApiError> {
        let mutation = MutationRequest::toggle(target, self.kind, direction);
        let request = routes::mutation_request(&mutation)?;
        let response = self.client.send(request).await?;
        ensure_success(&response)
    }
}

#[async_trait::async_trait]
impl ToggleMutations for EndpointToggle {
    async fn activate(&self, target: &EntityRef) -> Result<(), ApiError> {
        self.call(target, ToggleDirection::Activate).await
    }

    async fn deactivate(&self, target: &EntityRef) -> Result<(), ApiError> {
        self.call(target, ToggleDirection::Deactivate).await
    }
}
